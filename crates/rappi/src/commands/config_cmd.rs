//! Config subcommand handlers.

use std::fmt::Write;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, SecretArg};
use crate::config::{self, Config, SecretKind};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking secrets.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "poll_interval = {}", cfg.defaults.poll_interval);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let plain = [
            ("marketplace_url", &p.marketplace_url),
            ("token_env", &p.token_env),
            ("availability_url", &p.availability_url),
            ("availability_login_url", &p.availability_login_url),
            ("client_id", &p.client_id),
            ("client_secret_env", &p.client_secret_env),
            ("cancellations_url", &p.cancellations_url),
        ];
        for (key, value) in plain {
            if let Some(value) = value {
                let _ = writeln!(out, "{key} = \"{value}\"");
            }
        }
        if p.token.is_some() {
            let _ = writeln!(out, "token = \"****\"");
        }
        if p.client_secret.is_some() {
            let _ = writeln!(out, "client_secret = \"****\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    out
}

/// Same config with plaintext secrets masked, for structured output.
fn redacted(mut cfg: Config) -> Config {
    for profile in cfg.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some("****".into());
        }
        if profile.client_secret.is_some() {
            profile.client_secret = Some("****".into());
        }
    }
    cfg
}

fn available_profiles(cfg: &Config) -> String {
    let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
    available.sort();
    if available.is_empty() {
        "(none)".into()
    } else {
        available.join(", ")
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = redacted(config::load_config_or_default());
            let format = config::output_format(global, &cfg);
            let out = output::render_single(format, &cfg, format_config_redacted, |_| {
                "config".into()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            if cfg.profiles.is_empty() {
                eprintln!(
                    "No profiles configured. Add one to {}",
                    config::config_path().display()
                );
                return Ok(());
            }
            let default = cfg.active_profile_name();
            let mut names: Vec<_> = cfg.profiles.keys().collect();
            names.sort();
            for name in names {
                let marker = if name == default { " *" } else { "" };
                println!("{name}{marker}");
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: available_profiles(&cfg),
                    name,
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        ConfigCommand::StoreSecret { kind, value } => {
            if value.is_empty() {
                return Err(CliError::Validation {
                    field: "value".into(),
                    reason: "secret cannot be empty".into(),
                });
            }
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let kind = match kind {
                SecretArg::Token => SecretKind::Token,
                SecretArg::ClientSecret => SecretKind::ClientSecret,
            };
            config::store_secret(kind, &profile_name, &value)?;
            eprintln!(
                "✓ Stored {} in the system keyring for profile '{profile_name}'",
                kind.keyring_key(&profile_name)
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use rappi_config::Profile;

    use super::*;

    fn sample() -> Config {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "bogota".into(),
            Profile {
                marketplace_url: Some("https://example.test/api".into()),
                token: Some("plain-token".into()),
                client_secret_env: Some("BOGOTA_SECRET".into()),
                ..Profile::default()
            },
        );
        cfg
    }

    #[test]
    fn redacted_text_masks_secrets() {
        let text = format_config_redacted(&sample());
        assert!(text.contains("[profiles.bogota]"));
        assert!(text.contains("marketplace_url = \"https://example.test/api\""));
        assert!(text.contains("token = \"****\""));
        assert!(text.contains("client_secret_env = \"BOGOTA_SECRET\""));
        assert!(!text.contains("plain-token"));
    }

    #[test]
    fn redacted_struct_masks_secrets() {
        let cfg = redacted(sample());
        assert_eq!(cfg.profiles["bogota"].token.as_deref(), Some("****"));
        assert!(cfg.profiles["bogota"].client_secret.is_none());
    }
}
