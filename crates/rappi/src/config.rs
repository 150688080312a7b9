//! CLI configuration: thin wrapper around `rappi_config`.
//!
//! Adds the resolution that respects `GlobalOpts` flag overrides
//! (--marketplace-url, --token, --client-id, ...).

use std::time::Duration;

use clap::ValueEnum;
use secrecy::SecretString;

use rappi_api::{AvailabilityConfig, MarketplaceConfig, TransportConfig};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use rappi_config::{
    Config, Profile, SecretKind, config_path, load_config_or_default, save_config, store_secret,
};

// ── Session ─────────────────────────────────────────────────────────

/// The active profile with command-line overrides already applied.
#[derive(Debug)]
pub struct Session {
    pub profile_name: String,
    pub profile: Profile,
    pub output: OutputFormat,
    pub poll_interval: Duration,
    transport: TransportConfig,
    token: Option<String>,
    client_secret: Option<String>,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name().to_owned())
}

/// Output format: flag > env > config default > table.
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    global.output.unwrap_or_else(|| {
        OutputFormat::from_str(&config.defaults.output, true).unwrap_or(OutputFormat::Table)
    })
}

impl Session {
    /// Load the config file and merge `global` over the active profile.
    ///
    /// An explicitly requested profile must exist. When the default profile
    /// is absent the session starts from an empty profile, so flags and
    /// `RAPPI_*` variables alone are enough to run a command.
    pub fn load(global: &GlobalOpts) -> Result<Self, CliError> {
        let cfg = load_config_or_default();
        Self::from_config(&cfg, global)
    }

    pub fn from_config(cfg: &Config, global: &GlobalOpts) -> Result<Self, CliError> {
        let profile_name = active_profile_name(global, cfg);

        let mut profile = match cfg.profiles.get(&profile_name) {
            Some(profile) => profile.clone(),
            None if global.profile.is_some() => {
                let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
                available.sort();
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                });
            }
            None => Profile::default(),
        };

        // Flag > env > profile
        override_with(&mut profile.marketplace_url, global.marketplace_url.as_ref());
        override_with(
            &mut profile.availability_url,
            global.availability_url.as_ref(),
        );
        override_with(
            &mut profile.availability_login_url,
            global.availability_login_url.as_ref(),
        );
        override_with(&mut profile.client_id, global.client_id.as_ref());
        if global.timeout.is_some() {
            profile.timeout = global.timeout;
        }

        let transport = rappi_config::profile_to_transport_config(&profile, &cfg.defaults);

        Ok(Self {
            profile_name,
            output: output_format(global, cfg),
            poll_interval: Duration::from_secs(cfg.defaults.poll_interval),
            transport,
            token: global.token.clone(),
            client_secret: global.client_secret.clone(),
            profile,
        })
    }

    pub fn transport(&self) -> &TransportConfig {
        &self.transport
    }

    /// Marketplace settings; a `--token` flag wins over the secret chain.
    pub fn marketplace_config(&self) -> Result<MarketplaceConfig, CliError> {
        let Some(token) = &self.token else {
            return Ok(rappi_config::profile_to_marketplace_config(
                &self.profile,
                &self.profile_name,
            )?);
        };
        let url = self.require(self.profile.marketplace_url.as_deref(), "marketplace_url")?;
        Ok(MarketplaceConfig {
            base_url: rappi_config::parse_url("marketplace_url", url)?,
            seed_token: SecretString::from(token.clone()),
        })
    }

    /// Availability settings; a `--client-secret` flag wins over the secret chain.
    pub fn availability_config(&self) -> Result<AvailabilityConfig, CliError> {
        let Some(secret) = &self.client_secret else {
            return Ok(rappi_config::profile_to_availability_config(
                &self.profile,
                &self.profile_name,
            )?);
        };
        let profile = &self.profile;
        let audience = self.require(profile.availability_url.as_deref(), "availability_url")?;
        let login_url = self.require(
            profile.availability_login_url.as_deref(),
            "availability_login_url",
        )?;
        let client_id = self.require(profile.client_id.as_deref(), "client_id")?;
        Ok(AvailabilityConfig {
            audience: rappi_config::parse_url("availability_url", audience)?,
            login_url: rappi_config::parse_url("availability_login_url", login_url)?,
            client_id: client_id.to_owned(),
            client_secret: SecretString::from(secret.clone()),
        })
    }

    fn require<'a>(&self, value: Option<&'a str>, field: &'static str) -> Result<&'a str, CliError> {
        value.ok_or_else(|| CliError::MissingSetting {
            profile: self.profile_name.clone(),
            field,
            path: config_path().display().to_string(),
        })
    }
}

fn override_with(slot: &mut Option<String>, flag: Option<&String>) {
    if let Some(value) = flag {
        *slot = Some(value.clone());
    }
}
