//! Profile configuration for the rappi CLI.
//!
//! TOML profiles, secret resolution (env var, keyring, plaintext) and
//! translation into `rappi_api` client configs. The CLI layers its
//! `GlobalOpts` overrides on top of what this crate resolves.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use rappi_api::{AvailabilityConfig, MarketplaceConfig, TlsMode, TransportConfig};

/// Service name used for every keyring entry.
pub const KEYRING_SERVICE: &str = "rappi";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' has no {field} configured")]
    MissingField { profile: String, field: &'static str },

    #[error("no {secret} configured for profile '{profile}'")]
    NoCredentials {
        profile: String,
        secret: &'static str,
    },

    #[error("profile '{0}' not found")]
    UnknownProfile(String),

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named integration profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use when none is given explicitly.
    pub fn active_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile(name.into()))
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds between polls in `orders watch`.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_poll_interval() -> u64 {
    5
}

/// A named integration profile.
///
/// A profile may configure the marketplace, the availability service, or
/// both. Missing pieces are reported when a command actually needs them.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Marketplace API root.
    pub marketplace_url: Option<String>,

    /// Marketplace partner token (plaintext; prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the partner token.
    pub token_env: Option<String>,

    /// Availability API root, also sent as the OAuth audience.
    pub availability_url: Option<String>,

    /// Client-credentials token endpoint.
    pub availability_login_url: Option<String>,

    pub client_id: Option<String>,

    /// Client secret (plaintext; prefer keyring or env var).
    pub client_secret: Option<String>,

    /// Environment variable name containing the client secret.
    pub client_secret_env: Option<String>,

    /// Endpoint polled for cancelled orders.
    pub cancellations_url: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "rappi", "rappi").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("rappi");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the Config from `path` + environment.
///
/// Nested keys are reached with a double underscore, e.g.
/// `RAPPI_DEFAULTS__TIMEOUT=10`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("RAPPI_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Secret resolution ───────────────────────────────────────────────

/// The two secrets a profile can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    /// Marketplace partner token.
    Token,
    /// Availability client secret.
    ClientSecret,
}

impl SecretKind {
    /// Keyring account for this secret under `profile_name`.
    pub fn keyring_key(self, profile_name: &str) -> String {
        match self {
            Self::Token => format!("{profile_name}/token"),
            Self::ClientSecret => format!("{profile_name}/client-secret"),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Token => "marketplace token",
            Self::ClientSecret => "client secret",
        }
    }
}

/// Resolve a secret: named env var, then keyring, then plaintext.
pub fn resolve_secret(
    kind: SecretKind,
    env_name: Option<&str>,
    plaintext: Option<&str>,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    // 1. Named env var
    if let Some(env_name) = env_name {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &kind.keyring_key(profile_name)) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(value) = plaintext {
        return Ok(SecretString::from(value.to_owned()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
        secret: kind.label(),
    })
}

/// Resolve the marketplace partner token.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_secret(
        SecretKind::Token,
        profile.token_env.as_deref(),
        profile.token.as_deref(),
        profile_name,
    )
}

/// Resolve the availability client secret.
pub fn resolve_client_secret(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    resolve_secret(
        SecretKind::ClientSecret,
        profile.client_secret_env.as_deref(),
        profile.client_secret.as_deref(),
        profile_name,
    )
}

/// Store a secret in the system keyring.
pub fn store_secret(kind: SecretKind, profile_name: &str, value: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &kind.keyring_key(profile_name))
        .map_err(|e| ConfigError::Keyring(e.to_string()))?;
    entry
        .set_password(value)
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

// ── Translation into client configs ─────────────────────────────────

fn require<'a>(
    value: Option<&'a str>,
    profile_name: &str,
    field: &'static str,
) -> Result<&'a str, ConfigError> {
    value.ok_or_else(|| ConfigError::MissingField {
        profile: profile_name.into(),
        field,
    })
}

/// Parse a configured URL, naming the field on failure.
pub fn parse_url(field: &str, value: &str) -> Result<Url, ConfigError> {
    value.parse().map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {value}"),
    })
}

/// Build a `MarketplaceConfig` from a profile.
pub fn profile_to_marketplace_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<MarketplaceConfig, ConfigError> {
    let raw = require(
        profile.marketplace_url.as_deref(),
        profile_name,
        "marketplace_url",
    )?;
    Ok(MarketplaceConfig {
        base_url: parse_url("marketplace_url", raw)?,
        seed_token: resolve_token(profile, profile_name)?,
    })
}

/// Build an `AvailabilityConfig` from a profile.
pub fn profile_to_availability_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<AvailabilityConfig, ConfigError> {
    let audience = require(
        profile.availability_url.as_deref(),
        profile_name,
        "availability_url",
    )?;
    let login_url = require(
        profile.availability_login_url.as_deref(),
        profile_name,
        "availability_login_url",
    )?;
    let client_id = require(profile.client_id.as_deref(), profile_name, "client_id")?;

    Ok(AvailabilityConfig {
        audience: parse_url("availability_url", audience)?,
        login_url: parse_url("availability_login_url", login_url)?,
        client_id: client_id.to_owned(),
        client_secret: resolve_client_secret(profile, profile_name)?,
    })
}

/// Transport settings for a profile, falling back to the global defaults.
pub fn profile_to_transport_config(profile: &Profile, defaults: &Defaults) -> TransportConfig {
    let tls = profile
        .ca_cert
        .clone()
        .map_or(TlsMode::System, TlsMode::CustomCa);
    TransportConfig {
        tls,
        ..TransportConfig::default()
    }
    .with_timeout(Duration::from_secs(
        profile.timeout.unwrap_or(defaults.timeout),
    ))
}
