//! Config subcommand handlers.

use vnc_config::{Config, KEYRING_SERVICE, keyring_account};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

const MASK: &str = "********";

// ── Helpers ─────────────────────────────────────────────────────────

/// Replace plaintext secrets before the config is echoed anywhere.
fn masked(mut cfg: Config) -> Config {
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(MASK.into());
        }
        if profile.token.is_some() {
            profile.token = Some(MASK.into());
        }
    }
    cfg
}

fn keyring_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "keyring".into(),
        reason: e.to_string(),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(
    args: ConfigArgs,
    cfg: Config,
    format: OutputFormat,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = masked(cfg);
            let out = output::render_single(format, &cfg, |c| {
                toml::to_string_pretty(c).unwrap_or_else(|e| format!("<unrenderable: {e}>"))
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword { target_profile } => {
            let profile_name =
                target_profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));

            let prof = cfg
                .profiles
                .get(&profile_name)
                .ok_or_else(|| CliError::ProfileNotFound {
                    name: profile_name.clone(),
                    available: config::available_profiles(&cfg),
                })?;

            let (kind, prompt_label) = match prof.auth_mode.as_str() {
                "keystone" => ("password", "Keystone password: "),
                "token" => ("token", "Token: "),
                other => {
                    return Err(CliError::Validation {
                        field: "auth_mode".into(),
                        reason: format!("profile '{profile_name}' uses auth_mode '{other}', which has no secret"),
                    });
                }
            };

            let secret = rpassword::prompt_password(prompt_label)?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: kind.into(),
                    reason: "value cannot be empty".into(),
                });
            }

            let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_account(&profile_name, kind))
                .map_err(keyring_err)?;
            entry.set_password(&secret).map_err(keyring_err)?;

            eprintln!("✓ {kind} stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}
