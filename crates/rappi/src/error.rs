//! CLI error types with miette diagnostics.
//!
//! Maps `rappi_api::Error` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use rappi_api::Error as ApiError;
use rappi_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach {url}")]
    #[diagnostic(
        code(rappi::connection_failed),
        help(
            "Check the configured URL and your network connection.\n\
             Run with -vv to see every request."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(rappi::tls_error),
        help("Check the ca_cert path configured for this profile.")
    )]
    TlsError { message: String },

    #[error("Unreadable response: {message}")]
    #[diagnostic(
        code(rappi::invalid_response),
        help("The service answered with a body that could not be decoded. Run with -vv for details.")
    )]
    InvalidResponse { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(rappi::auth_failed),
        help(
            "Verify the token or client credentials for this profile.\n\
             Store a new one with: rappi config store-secret token --value <TOKEN>"
        )
    )]
    AuthFailed { message: String },

    #[error("No {secret} configured for profile '{profile}'")]
    #[diagnostic(
        code(rappi::no_credentials),
        help(
            "Store it with: rappi config store-secret <token|client-secret> --value <VALUE>\n\
             Or set RAPPI_TOKEN / RAPPI_CLIENT_SECRET."
        )
    )]
    NoCredentials {
        profile: String,
        secret: &'static str,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Rejected by the marketplace ({code}): {message}")]
    #[diagnostic(
        code(rappi::rejected),
        help("Run: rappi orders list to see orders that can still be taken or rejected")
    )]
    Rejected { code: i32, message: String },

    #[error("API error (HTTP {status}){}", body_suffix(.body))]
    #[diagnostic(code(rappi::api_error))]
    Api { status: u16, body: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(rappi::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{profile}' has no {field} configured")]
    #[diagnostic(
        code(rappi::missing_setting),
        help(
            "Add {field} to the profile in {path}\n\
             or pass it on the command line (see: rappi --help)."
        )
    )]
    MissingSetting {
        profile: String,
        field: &'static str,
        path: String,
    },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(rappi::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Keyring error: {message}")]
    #[diagnostic(code(rappi::keyring))]
    Keyring { message: String },

    #[error(transparent)]
    #[diagnostic(code(rappi::config))]
    Config(Box<ConfigError>),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(rappi::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("YAML rendering failed: {0}")]
    #[diagnostic(code(rappi::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

fn body_suffix(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!(": {body}")
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. }
            | Self::TlsError { .. }
            | Self::InvalidResponse { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Rejected { .. } => exit_code::NOT_FOUND,
            Self::Api { status, .. } if *status == 404 => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::MissingSetting { .. }
            | Self::ProfileNotFound { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── rappi_api::Error → CliError ─────────────────────────────────────

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized { message } => Self::AuthFailed { message },
            ApiError::MissingCredential { source_name } => Self::AuthFailed {
                message: format!("no credential received from {source_name}"),
            },
            ApiError::BadRequest(order_error) => Self::Rejected {
                code: order_error.error_code,
                message: order_error.message,
            },
            ApiError::UnexpectedStatus { status, body } => Self::Api { status, body },
            ApiError::Transport(e) => Self::ConnectionFailed {
                url: e
                    .url()
                    .map_or_else(|| "(unknown)".into(), ToString::to_string),
                source: Box::new(e),
            },
            ApiError::Deserialization { message, .. } => Self::InvalidResponse { message },
            ApiError::InvalidUrl(e) => Self::Validation {
                field: "url".into(),
                reason: e.to_string(),
            },
            ApiError::InvalidPath(reason) => Self::Validation {
                field: "url".into(),
                reason,
            },
            ApiError::InvalidHeader(reason) => Self::Validation {
                field: "credential".into(),
                reason,
            },
            ApiError::Tls(message) => Self::TlsError { message },
        }
    }
}

// ── ConfigError → CliError ──────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::MissingField { profile, field } => Self::MissingSetting {
                profile,
                field,
                path: rappi_config::config_path().display().to_string(),
            },
            ConfigError::NoCredentials { profile, secret } => {
                Self::NoCredentials { profile, secret }
            }
            ConfigError::UnknownProfile(name) => Self::ProfileNotFound {
                name,
                available: "(see: rappi config profiles)".into(),
            },
            ConfigError::Keyring(message) => Self::Keyring { message },
            other => Self::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use rappi_api::OrderError;

    use super::*;

    #[test]
    fn api_errors_map_to_exit_codes() {
        let auth: CliError = ApiError::Unauthorized {
            message: "invalid token".into(),
        }
        .into();
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let rejected: CliError = ApiError::BadRequest(OrderError {
            error_code: 12,
            message: "order already taken".into(),
        })
        .into();
        assert_eq!(rejected.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(
            rejected.to_string(),
            "Rejected by the marketplace (12): order already taken"
        );

        let garbled: CliError = ApiError::Deserialization {
            message: "expected value".into(),
            body: "<html>".into(),
        }
        .into();
        assert_eq!(garbled.exit_code(), exit_code::CONNECTION);

        let server: CliError = ApiError::UnexpectedStatus {
            status: 503,
            body: String::new(),
        }
        .into();
        assert_eq!(server.exit_code(), exit_code::GENERAL);
        assert_eq!(server.to_string(), "API error (HTTP 503)");

        let missing: CliError = ApiError::UnexpectedStatus {
            status: 404,
            body: "no route".into(),
        }
        .into();
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(missing.to_string(), "API error (HTTP 404): no route");
    }

    #[test]
    fn config_errors_map_to_exit_codes() {
        let missing: CliError = ConfigError::MissingField {
            profile: "default".into(),
            field: "marketplace_url",
        }
        .into();
        assert_eq!(missing.exit_code(), exit_code::USAGE);

        let no_secret: CliError = ConfigError::NoCredentials {
            profile: "default".into(),
            secret: "client secret",
        }
        .into();
        assert_eq!(no_secret.exit_code(), exit_code::AUTH);
    }
}
