//! CLI-side profile resolution: layers `GlobalOpts` overrides on top of
//! `vnc_config` and produces the `ControllerConfig` handed to core.

use std::time::Duration;

use clap::ValueEnum;
use secrecy::SecretString;

use vnc_config::{Config, Defaults, Profile};
use vnc_core::{AuthCredentials, ControllerConfig, TlsVerification};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use vnc_config::{config_path, load_config_or_default};

// ── Profile resolution ───────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Output format: flag > `defaults.output` > table.
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    global.output.unwrap_or_else(|| {
        OutputFormat::from_str(&config.defaults.output, true).unwrap_or(OutputFormat::Table)
    })
}

/// Translate a profile + global flags into a `ControllerConfig`.
///
/// This is the single boundary where CLI config types cross into core types.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<ControllerConfig, CliError> {
    // 1. API server URL (flag > env > profile)
    let url_str = global.api_server.as_deref().unwrap_or(&profile.api_server);
    let url = parse_api_server(url_str)?;

    // 2. Auth credentials (token flag > profile auth mode)
    let auth = match global.token {
        Some(ref token) => AuthCredentials::Token(SecretString::from(token.clone())),
        None => vnc_config::resolve_auth(profile, profile_name)?,
    };

    // 3. TLS verification
    let tls = if global.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        vnc_config::profile_tls(profile, defaults)
    };

    // 4. Timeout and page size (flag > profile > defaults)
    let timeout = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(defaults.timeout);
    let page_limit = global
        .page_limit
        .or(profile.page_limit)
        .or(defaults.page_limit);

    Ok(ControllerConfig {
        url,
        auth,
        tls,
        timeout: Duration::from_secs(timeout),
        page_limit,
    })
}

/// Build a `ControllerConfig` from the config file, profile, and CLI overrides.
///
/// Without a matching profile, `--api-server` alone is enough: the API
/// server is then reached unauthenticated unless `--token` is given.
pub fn build_controller_config(
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<ControllerConfig, CliError> {
    let profile_name = active_profile_name(global, cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, &cfg.defaults, global);
    }

    if global.profile.is_some() && global.api_server.is_none() {
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: available_profiles(cfg),
        });
    }

    let url_str = global.api_server.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;

    let bare = Profile {
        api_server: url_str.to_owned(),
        ..Profile::default()
    };
    resolve_profile(&bare, &profile_name, &cfg.defaults, global)
}

/// Comma-separated profile names, or `(none)`.
pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        return "(none)".into();
    }
    let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
    names.sort_unstable();
    names.join(", ")
}

fn parse_api_server(raw: &str) -> Result<url::Url, CliError> {
    raw.parse().map_err(|_| CliError::Validation {
        field: "api_server".into(),
        reason: format!("invalid URL: {raw}"),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["vncctl"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["network", "list"]);
        Cli::try_parse_from(argv).unwrap().global
    }

    fn lab_profile() -> Profile {
        Profile {
            api_server: "http://10.0.0.10:8082".into(),
            timeout: Some(15),
            page_limit: Some(50),
            ..Profile::default()
        }
    }

    #[test]
    fn flags_override_profile() {
        let g = global(&[
            "--api-server",
            "http://192.0.2.1:8082",
            "--token",
            "abc",
            "--insecure",
            "--timeout",
            "5",
            "--page-limit",
            "0",
        ]);
        let cc = resolve_profile(&lab_profile(), "lab", &Defaults::default(), &g).unwrap();

        assert_eq!(cc.url.as_str(), "http://192.0.2.1:8082/");
        assert!(matches!(cc.auth, AuthCredentials::Token(_)));
        assert_eq!(cc.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(cc.timeout, Duration::from_secs(5));
        assert_eq!(cc.page_limit, Some(0));
    }

    #[test]
    fn profile_values_apply_without_flags() {
        let g = global(&[]);
        let cc = resolve_profile(&lab_profile(), "lab", &Defaults::default(), &g).unwrap();

        assert_eq!(cc.url.as_str(), "http://10.0.0.10:8082/");
        assert!(matches!(cc.auth, AuthCredentials::None));
        assert_eq!(cc.tls, TlsVerification::SystemDefaults);
        assert_eq!(cc.timeout, Duration::from_secs(15));
        assert_eq!(cc.page_limit, Some(50));
    }

    #[test]
    fn bare_api_server_connects_without_credentials() {
        let g = global(&["--api-server", "http://192.0.2.7:8082"]);
        let cc = build_controller_config(&g, &Config::default()).unwrap();

        assert_eq!(cc.url.as_str(), "http://192.0.2.7:8082/");
        assert!(matches!(cc.auth, AuthCredentials::None));
        assert_eq!(cc.tls, TlsVerification::SystemDefaults);
    }

    #[test]
    fn output_falls_back_to_config_default() {
        let mut cfg = Config::default();
        cfg.defaults.output = "yaml".into();

        assert_eq!(output_format(&global(&[]), &cfg), OutputFormat::Yaml);
        assert_eq!(
            output_format(&global(&["-o", "json-compact"]), &cfg),
            OutputFormat::JsonCompact
        );

        cfg.defaults.output = "bogus".into();
        assert_eq!(output_format(&global(&[]), &cfg), OutputFormat::Table);
    }

    #[test]
    fn available_profiles_are_sorted() {
        let mut cfg = Config::default();
        assert_eq!(available_profiles(&cfg), "(none)");
        cfg.profiles.insert("prod".into(), Profile::default());
        cfg.profiles.insert("lab".into(), Profile::default());
        assert_eq!(available_profiles(&cfg), "lab, prod");
    }
}
