use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, SessionApi};
use crate::auth::Session;
use crate::types::User;

/// Saved CLI state: which backend to talk to and as whom
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliProfile {
    pub base_url: Option<String>,
    pub session_cookie: Option<String>,
    pub current_user: Option<User>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CliProfile {
    /// Saved URL, else the configured default
    pub fn base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| crate::config::config().api.base_url.clone())
    }

    pub fn client(&self) -> anyhow::Result<ApiClient> {
        let mut api_config = crate::config::config().api.clone();
        api_config.base_url = self.base_url();

        let client = ApiClient::from_config(&api_config)?;
        Ok(match &self.session_cookie {
            Some(cookie) => client.with_session_cookie(cookie.clone()),
            None => client,
        })
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("CASEDESK_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("casedesk").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_profile() -> anyhow::Result<CliProfile> {
    let config_dir = get_config_dir()?;
    let env_file = config_dir.join("env.json");

    if !env_file.exists() {
        return Ok(CliProfile::default());
    }

    let content = fs::read_to_string(env_file)?;
    let profile: CliProfile = serde_json::from_str(&content)?;
    Ok(profile)
}

pub fn save_profile(profile: &CliProfile) -> anyhow::Result<()> {
    let config_dir = get_config_dir()?;
    let env_file = config_dir.join("env.json");

    let content = serde_json::to_string_pretty(profile)?;
    fs::write(env_file, content)?;
    Ok(())
}

/// The acting user: the remembered one, else whoever the backend session
/// belongs to (which is then remembered).
pub async fn require_user<A: SessionApi>(api: A, profile: &mut CliProfile) -> anyhow::Result<User> {
    if let Some(user) = &profile.current_user {
        return Ok(user.clone());
    }

    let mut session = Session::new(api);
    match session.restore().await {
        Some(user) => {
            let user = user.clone();
            profile.current_user = Some(user.clone());
            profile.touch();
            save_profile(profile)?;
            Ok(user)
        }
        None => Err(anyhow::anyhow!(
            "Not signed in; set a session cookie with `casedesk session set-cookie`"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_round_trips_through_json() {
        let mut profile = CliProfile {
            base_url: Some("https://firm.example/api".into()),
            session_cookie: Some("sid=abc".into()),
            ..CliProfile::default()
        };
        profile.touch();

        let text = serde_json::to_string(&profile).unwrap();
        let back: CliProfile = serde_json::from_str(&text).unwrap();
        assert_eq!(back.base_url(), "https://firm.example/api");
        assert_eq!(back.session_cookie.as_deref(), Some("sid=abc"));
        assert!(back.updated_at.is_some());
    }

    #[test]
    fn test_missing_url_falls_back_to_config() {
        let profile = CliProfile::default();
        assert_eq!(profile.base_url(), crate::config::config().api.base_url);
    }
}
