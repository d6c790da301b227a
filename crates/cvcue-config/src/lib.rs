//! Configuration for the cvcue CLI.
//!
//! TOML profiles, credential resolution (flag/env + profile), session
//! cache location, and translation to `cvcue_core::ClientConfig`. The
//! core never reads any of this; it receives a finished `ClientConfig`.

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

use cvcue_core::{ApiKeyCredentials, ClientConfig, TlsMode, TransportConfig};

/// Environment variables consulted (through the CLI) for each credential.
pub mod env {
    pub const BASE_URL: &str = "CV_CUE_BASE_URL";
    pub const KEY_ID: &str = "CV_CUE_KEY_ID";
    pub const KEY_VALUE: &str = "CV_CUE_KEY_VALUE";
    pub const CLIENT_ID: &str = "CV_CUE_CLIENT_ID";
}

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("missing {field}: set {env} or configure it in profile '{profile}'")]
    MissingField {
        field: &'static str,
        env: &'static str,
        profile: String,
    },

    #[error("profile '{name}' not found in configuration")]
    ProfileNotFound { name: String, available: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
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
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named tenant profiles.
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

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Page size for `list-aps`.
    #[serde(default = "default_list_page_size")]
    pub list_page_size: u32,

    /// Page size for `get-all-aps`.
    #[serde(default = "default_sweep_page_size")]
    pub sweep_page_size: u32,

    /// Session lifetime requested at login, in seconds.
    #[serde(default = "default_session_timeout")]
    pub session_timeout: u64,

    /// Seconds before expiry at which a cached session is replaced.
    #[serde(default = "default_safety_margin")]
    pub safety_margin: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            list_page_size: default_list_page_size(),
            sweep_page_size: default_sweep_page_size(),
            session_timeout: default_session_timeout(),
            safety_margin: default_safety_margin(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_list_page_size() -> u32 {
    10
}
fn default_sweep_page_size() -> u32 {
    100
}
fn default_session_timeout() -> u64 {
    cvcue_core::DEFAULT_SESSION_TIMEOUT_SECS
}
fn default_safety_margin() -> u64 {
    cvcue_core::DEFAULT_SAFETY_MARGIN.as_secs()
}

/// A named CV-CUE tenant.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// API root, e.g. "https://tenant.wifi.arista.com/wifi/api".
    pub base_url: Option<String>,

    pub key_id: Option<String>,

    /// Key value (plaintext -- prefer `key_value_env` or CV_CUE_KEY_VALUE).
    pub key_value: Option<String>,

    /// Environment variable name containing the key value.
    pub key_value_env: Option<String>,

    pub client_id: Option<String>,

    /// Session cache file for this profile.
    pub session_file: Option<PathBuf>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Accept invalid TLS certificates.
    pub insecure: Option<bool>,

    /// Override request timeout.
    pub timeout: Option<u64>,
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "cvcue", "cvcue")
}

fn dirs_fallback(kind: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(kind);
    p.push("cvcue");
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default session cache file, under the platform cache directory.
pub fn session_cache_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".cache").join("session.json"),
        |dirs| dirs.cache_dir().join("session.json"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from a specific file + `CVCUE_`-prefixed environment.
///
/// Nested keys use a double underscore: `CVCUE_DEFAULTS__TIMEOUT=60`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CVCUE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Resolution ──────────────────────────────────────────────────────

/// Values supplied on the command line (or through `CV_CUE_*` env vars,
/// which the CLI parser folds into the same flags). Each one wins over the
/// profile.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub key_id: Option<String>,
    pub key_value: Option<SecretString>,
    pub client_id: Option<String>,
    pub session_file: Option<PathBuf>,
    pub insecure: bool,
    pub timeout: Option<u64>,
}

/// Name of the profile to use: `--profile`, then `default_profile`.
pub fn active_profile_name(requested: Option<&str>, config: &Config) -> String {
    requested
        .map(str::to_owned)
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Look up a profile.
///
/// An explicitly requested profile must exist. The implicit default may
/// be absent, in which case everything comes from flags and environment.
pub fn find_profile<'a>(
    config: &'a Config,
    name: &str,
    explicit: bool,
) -> Result<Option<&'a Profile>, ConfigError> {
    match config.profiles.get(name) {
        Some(profile) => Ok(Some(profile)),
        None if explicit => {
            let mut names: Vec<_> = config.profiles.keys().map(String::as_str).collect();
            names.sort_unstable();
            Err(ConfigError::ProfileNotFound {
                name: name.into(),
                available: if names.is_empty() {
                    "(none)".into()
                } else {
                    names.join(", ")
                },
            })
        }
        None => Ok(None),
    }
}

/// Session cache file: flag, then profile, then the platform default.
pub fn resolve_session_file(profile: Option<&Profile>, overrides: &Overrides) -> PathBuf {
    overrides
        .session_file
        .clone()
        .or_else(|| profile.and_then(|p| p.session_file.clone()))
        .unwrap_or_else(session_cache_path)
}

/// Strip trailing slashes and check the URL parses.
pub fn normalize_base_url(raw: &str) -> Result<url::Url, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    url::Url::parse(trimmed).map_err(|e| ConfigError::Validation {
        field: "base_url".into(),
        reason: format!("{e}: {raw}"),
    })
}

/// API root: flag/env, then the profile.
pub fn resolve_base_url(
    profile: Option<&Profile>,
    profile_name: &str,
    overrides: &Overrides,
) -> Result<url::Url, ConfigError> {
    let raw_url = overrides
        .base_url
        .clone()
        .or_else(|| profile.and_then(|p| p.base_url.clone()))
        .ok_or_else(|| ConfigError::MissingField {
            field: "base URL",
            env: env::BASE_URL,
            profile: profile_name.into(),
        })?;
    normalize_base_url(&raw_url)
}

/// TLS mode and request timeout (flag > profile > defaults).
pub fn resolve_transport(
    config: &Config,
    profile: Option<&Profile>,
    overrides: &Overrides,
) -> TransportConfig {
    let tls = if overrides.insecure || profile.and_then(|p| p.insecure).unwrap_or(false) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ca_path) = profile.and_then(|p| p.ca_cert.clone()) {
        TlsMode::CustomCa(ca_path)
    } else {
        TlsMode::System
    };

    let timeout = overrides
        .timeout
        .or_else(|| profile.and_then(|p| p.timeout))
        .unwrap_or(config.defaults.timeout);

    TransportConfig {
        tls,
        timeout: Duration::from_secs(timeout),
    }
}

/// Translate profile + overrides into a `ClientConfig`.
///
/// This is the single boundary where config types cross into core types.
pub fn resolve_client_config(
    config: &Config,
    profile: Option<&Profile>,
    profile_name: &str,
    overrides: &Overrides,
) -> Result<ClientConfig, ConfigError> {
    let missing = |field, var| ConfigError::MissingField {
        field,
        env: var,
        profile: profile_name.into(),
    };

    let base_url = resolve_base_url(profile, profile_name, overrides)?;

    let key_id = overrides
        .key_id
        .clone()
        .or_else(|| profile.and_then(|p| p.key_id.clone()))
        .ok_or_else(|| missing("key id", env::KEY_ID))?;
    let key_value = resolve_key_value(profile, overrides)
        .ok_or_else(|| missing("key value", env::KEY_VALUE))?;
    let client_id = overrides
        .client_id
        .clone()
        .or_else(|| profile.and_then(|p| p.client_id.clone()))
        .ok_or_else(|| missing("client id", env::CLIENT_ID))?;

    let mut client = ClientConfig::new(
        base_url,
        ApiKeyCredentials {
            key_id,
            key_value,
            client_id,
            timeout_secs: config.defaults.session_timeout,
        },
        resolve_session_file(profile, overrides),
    );
    client.transport = resolve_transport(config, profile, overrides);
    client.safety_margin = Duration::from_secs(config.defaults.safety_margin);
    Ok(client)
}

/// Key value chain: flag/env, then the profile's `key_value_env`, then
/// plaintext in the profile.
fn resolve_key_value(profile: Option<&Profile>, overrides: &Overrides) -> Option<SecretString> {
    if let Some(key) = &overrides.key_value {
        return Some(key.clone());
    }
    let profile = profile?;
    if let Some(val) = profile
        .key_value_env
        .as_ref()
        .and_then(|name| std::env::var(name).ok())
    {
        return Some(SecretString::from(val));
    }
    profile.key_value.clone().map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn write_config(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, body).expect("write config");
        path
    }

    fn full_overrides() -> Overrides {
        Overrides {
            base_url: Some("https://cue.example.com/wifi/api/".into()),
            key_id: Some("kid".into()),
            key_value: Some(SecretString::from("kval".to_owned())),
            client_id: Some("cli".into()),
            ..Overrides::default()
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config_from(&dir.path().join("absent.toml")).expect("defaults");
        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert_eq!(config.defaults.list_page_size, 10);
        assert_eq!(config.defaults.sweep_page_size, 100);
        assert_eq!(config.defaults.session_timeout, 300);
        assert_eq!(config.defaults.safety_margin, 30);
    }

    #[test]
    fn profile_fields_load_from_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(
            &dir,
            r#"
default_profile = "lab"

[defaults]
timeout = 45

[profiles.lab]
base_url = "https://lab.example.com/wifi/api"
key_id = "lab-key"
key_value = "lab-secret"
client_id = "lab-client"
insecure = true
"#,
        );
        let config = load_config_from(&path).expect("load");
        let name = active_profile_name(None, &config);
        assert_eq!(name, "lab");

        let profile = find_profile(&config, &name, false).expect("lookup");
        let client = resolve_client_config(&config, profile, &name, &Overrides::default())
            .expect("resolve");

        assert_eq!(client.base_url.as_str(), "https://lab.example.com/wifi/api");
        assert_eq!(client.credentials.key_id, "lab-key");
        assert_eq!(client.credentials.key_value.expose_secret(), "lab-secret");
        assert!(matches!(client.transport.tls, TlsMode::DangerAcceptInvalid));
        assert_eq!(client.transport.timeout, Duration::from_secs(45));
    }

    #[test]
    fn overrides_beat_profile() {
        let profile = Profile {
            base_url: Some("https://profile.example.com/api".into()),
            key_id: Some("profile-key".into()),
            key_value: Some("profile-secret".into()),
            client_id: Some("profile-client".into()),
            timeout: Some(10),
            ..Profile::default()
        };
        let overrides = Overrides {
            timeout: Some(99),
            ..full_overrides()
        };
        let client =
            resolve_client_config(&Config::default(), Some(&profile), "default", &overrides)
                .expect("resolve");

        assert_eq!(client.credentials.key_id, "kid");
        assert_eq!(client.credentials.client_id, "cli");
        assert_eq!(client.credentials.key_value.expose_secret(), "kval");
        assert_eq!(client.transport.timeout, Duration::from_secs(99));
    }

    #[test]
    fn trailing_slash_is_removed() {
        let url = normalize_base_url("https://cue.example.com/wifi/api/").expect("valid");
        assert_eq!(url.as_str(), "https://cue.example.com/wifi/api");
    }

    #[test]
    fn base_url_and_transport_resolve_without_credentials() {
        let overrides = Overrides {
            base_url: Some("https://cue.example.com/wifi/api/".into()),
            insecure: true,
            ..Overrides::default()
        };
        let url = resolve_base_url(None, "default", &overrides).expect("base url");
        assert_eq!(url.as_str(), "https://cue.example.com/wifi/api");

        let transport = resolve_transport(&Config::default(), None, &overrides);
        assert!(matches!(transport.tls, TlsMode::DangerAcceptInvalid));
        assert_eq!(transport.timeout, Duration::from_secs(30));
    }

    #[test]
    fn missing_key_id_names_the_env_var() {
        let overrides = Overrides {
            key_id: None,
            ..full_overrides()
        };
        let err = resolve_client_config(&Config::default(), None, "default", &overrides)
            .expect_err("key id missing");
        assert!(err.to_string().contains(env::KEY_ID), "{err}");
    }

    #[test]
    fn unknown_explicit_profile_lists_alternatives() {
        let mut config = Config::default();
        config.profiles.insert("prod".into(), Profile::default());
        config.profiles.insert("lab".into(), Profile::default());

        match find_profile(&config, "staging", true) {
            Err(ConfigError::ProfileNotFound { name, available }) => {
                assert_eq!(name, "staging");
                assert_eq!(available, "lab, prod");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(find_profile(&config, "default", false).expect("ok").is_none());
    }

    #[test]
    fn session_file_precedence() {
        let profile = Profile {
            session_file: Some(PathBuf::from("/tmp/profile-session.json")),
            ..Profile::default()
        };
        let flag = Overrides {
            session_file: Some(PathBuf::from("/tmp/flag-session.json")),
            ..Overrides::default()
        };

        assert_eq!(
            resolve_session_file(Some(&profile), &flag),
            PathBuf::from("/tmp/flag-session.json")
        );
        assert_eq!(
            resolve_session_file(Some(&profile), &Overrides::default()),
            PathBuf::from("/tmp/profile-session.json")
        );
        assert!(
            resolve_session_file(None, &Overrides::default()).ends_with("session.json")
        );
    }
}
