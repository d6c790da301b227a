//! Glue between `GlobalOpts` and the config crate.
//!
//! Loads the TOML config once per run and resolves the active profile;
//! core only ever sees the resulting `ClientConfig` / `SessionStore`.

use std::time::Duration;

use secrecy::SecretString;

use cvcue_config::{Config, Overrides, Profile};
use cvcue_core::{ClientConfig, CueClient, SessionStore};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Config file contents plus the profile this run uses.
pub struct Settings {
    pub config: Config,
    pub profile_name: String,
    overrides: Overrides,
    explicit_profile: bool,
}

impl Settings {
    pub fn load(global: &GlobalOpts) -> Result<Self, CliError> {
        let config = cvcue_config::load_config()?;
        let profile_name = cvcue_config::active_profile_name(global.profile.as_deref(), &config);
        Ok(Self {
            config,
            profile_name,
            overrides: overrides(global),
            explicit_profile: global.profile.is_some(),
        })
    }

    fn profile(&self) -> Result<Option<&Profile>, CliError> {
        Ok(cvcue_config::find_profile(
            &self.config,
            &self.profile_name,
            self.explicit_profile,
        )?)
    }

    /// Session cache for this profile. Needs no credentials.
    pub fn session_store(&self) -> Result<SessionStore, CliError> {
        let path = cvcue_config::resolve_session_file(self.profile()?, &self.overrides);
        Ok(SessionStore::new(path)
            .with_safety_margin(Duration::from_secs(self.config.defaults.safety_margin)))
    }

    /// HTTP client for calls that only need a cached token, not credentials.
    pub fn remote_client(&self) -> Result<CueClient, CliError> {
        let profile = self.profile()?;
        let base_url =
            cvcue_config::resolve_base_url(profile, &self.profile_name, &self.overrides)?;
        let transport = cvcue_config::resolve_transport(&self.config, profile, &self.overrides);
        Ok(CueClient::new(base_url.as_str(), &transport)?)
    }

    /// Full connection settings: base URL, credentials, transport.
    pub fn client_config(&self) -> Result<ClientConfig, CliError> {
        Ok(cvcue_config::resolve_client_config(
            &self.config,
            self.profile()?,
            &self.profile_name,
            &self.overrides,
        )?)
    }
}

fn overrides(global: &GlobalOpts) -> Overrides {
    Overrides {
        base_url: global.base_url.clone(),
        key_id: global.key_id.clone(),
        key_value: global.key_value.clone().map(SecretString::from),
        client_id: global.client_id.clone(),
        session_file: global.session_file.clone(),
        insecure: global.insecure,
        timeout: global.timeout,
    }
}
