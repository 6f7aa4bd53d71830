//! Configuration loading and management.
//!
//! Configuration merges defaults, an optional TOML file, and `STUDYBELL_*`
//! environment variables. Required values are validated once at startup;
//! a missing credential or channel ID is fatal there, never at event time.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default bind address for the ingress/health server.
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// A required configuration value was missing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("missing required configuration value: {field}")]
pub struct MissingConfig {
    pub field: &'static str,
}

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Discord bot token used for outbound notifications.
    pub discord_token: String,
    /// Voice channel whose entries and exits are tracked.
    pub watched_channel_id: String,
    /// Text channel that receives notifications.
    pub notification_channel_id: String,
    /// Gemini API key for praise generation.
    pub gemini_api_key: String,
    /// Address the ingress/health server binds to.
    pub bind_addr: String,
    /// Optional shared secret required on gateway POSTs.
    pub ingress_token: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"[REDACTED]")
            .field("watched_channel_id", &self.watched_channel_id)
            .field("notification_channel_id", &self.notification_channel_id)
            .field("gemini_api_key", &"[REDACTED]")
            .field("bind_addr", &self.bind_addr)
            .field("ingress_token", &self.ingress_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discord_token: String::new(),
            watched_channel_id: String::new(),
            notification_channel_id: String::new(),
            gemini_api_key: String::new(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            ingress_token: None,
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (STUDYBELL_*)
        figment = figment.merge(Env::prefixed("STUDYBELL_"));

        figment.extract()
    }

    /// Checks that every required value is present.
    pub fn validate(&self) -> Result<(), MissingConfig> {
        let required = [
            ("discord_token", &self.discord_token),
            ("watched_channel_id", &self.watched_channel_id),
            ("notification_channel_id", &self.notification_channel_id),
            ("gemini_api_key", &self.gemini_api_key),
            ("bind_addr", &self.bind_addr),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(MissingConfig { field });
            }
        }
        Ok(())
    }
}

/// Returns the platform-specific config directory for studybell.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("studybell"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    fn populated() -> Config {
        Config {
            discord_token: "bot-token".into(),
            watched_channel_id: "voice-1".into(),
            notification_channel_id: "text-1".into(),
            gemini_api_key: "AIza-key".into(),
            bind_addr: DEFAULT_BIND_ADDR.into(),
            ingress_token: None,
        }
    }

    #[test]
    fn default_config_is_incomplete() {
        let err = Config::default().validate().unwrap_err();
        assert_eq!(err.field, "discord_token");
    }

    #[test]
    fn validate_accepts_populated_config() {
        assert!(populated().validate().is_ok());
    }

    #[test]
    fn validate_reports_first_missing_field() {
        let mut config = populated();
        config.notification_channel_id = "   ".into();
        let err = config.validate().unwrap_err();
        assert_eq!(err.field, "notification_channel_id");
    }

    #[test]
    fn load_from_reads_toml_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "discord_token = \"bot-token\"\nwatched_channel_id = \"voice-1\"\n\
             notification_channel_id = \"text-1\"\ngemini_api_key = \"AIza-key\""
        )
        .unwrap();

        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.watched_channel_id, "voice-1");
        // Unset values keep their defaults.
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert!(config.ingress_token.is_none());
    }

    #[test]
    fn debug_redacts_credentials() {
        let debug = format!("{:?}", populated());
        assert!(!debug.contains("bot-token"));
        assert!(!debug.contains("AIza-key"));
        assert!(debug.contains("voice-1"));
    }
}
