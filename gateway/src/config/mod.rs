//! Configuration module for the voice bridge
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use voicebridge_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use crate::core::relay::RelayConfig;

mod env;
mod merge;
mod validation;
mod yaml;

pub use yaml::{OpenAIYaml, RelayYaml, ServerYaml, YamlConfig};

/// Server configuration
///
/// Holds the listener settings, the realtime AI credentials and endpoint,
/// and the [`RelayConfig`] handed to every call.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Host name placed in the call-setup markup; falls back to the request `Host` header
    pub public_host: Option<String>,

    pub openai_api_key: String,
    pub realtime_url: String,

    pub relay: RelayConfig,
}

impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        self.openai_api_key.zeroize();
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Reads `HOST`, `PORT`, `PUBLIC_HOST`, `OPENAI_API_KEY`,
    /// `OPENAI_REALTIME_URL` and the relay settings (`REALTIME_MODEL`,
    /// `REALTIME_VOICE`, `SYSTEM_MESSAGE`, `AUDIO_CODEC_MODE`,
    /// `TURN_DETECTION_MODE`, `SILENCE_TIMEOUT_MS`, `MIN_TURN_MS`,
    /// `FLUSH_DELAY_MS`, `VAD_THRESHOLD`, `VAD_PREFIX_PADDING_MS`,
    /// `VAD_SILENCE_DURATION_MS`).
    ///
    /// # Errors
    /// Returns an error if a variable has an invalid format or the merged
    /// configuration fails validation.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = merge::merge_config(None)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Environment variables provide the base configuration and YAML values
    /// override them. The `.env` file is loaded in `main` before this runs.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let yaml_config = yaml::YamlConfig::from_file(path)?;

        let config = merge::merge_config(Some(yaml_config))?;
        config.validate()?;

        Ok(config)
    }

    /// Check required values and ranges.
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        validation::validate_api_key(&self.openai_api_key)?;
        validation::validate_realtime_url(&self.realtime_url)?;
        validation::validate_relay(&self.relay)?;
        Ok(())
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audio::AudioCodecMode;
    use crate::core::realtime::openai::{OPENAI_REALTIME_URL, OpenAIRealtimeVoice};
    use crate::core::relay::TurnDetectionMode;
    use serial_test::serial;
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    // Helper to clean up environment variables
    fn cleanup_env_vars() {
        unsafe {
            env::remove_var("HOST");
            env::remove_var("PORT");
            env::remove_var("PUBLIC_HOST");
            env::remove_var("OPENAI_API_KEY");
            env::remove_var("OPENAI_REALTIME_URL");
            env::remove_var("REALTIME_MODEL");
            env::remove_var("REALTIME_VOICE");
            env::remove_var("SYSTEM_MESSAGE");
            env::remove_var("AUDIO_CODEC_MODE");
            env::remove_var("TURN_DETECTION_MODE");
            env::remove_var("SILENCE_TIMEOUT_MS");
            env::remove_var("MIN_TURN_MS");
            env::remove_var("FLUSH_DELAY_MS");
            env::remove_var("VAD_THRESHOLD");
            env::remove_var("VAD_PREFIX_PADDING_MS");
            env::remove_var("VAD_SILENCE_DURATION_MS");
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        cleanup_env_vars();
        unsafe {
            env::set_var("OPENAI_API_KEY", "sk-env");
        }

        let config = ServerConfig::from_env().unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5050);
        assert_eq!(config.address(), "0.0.0.0:5050");
        assert_eq!(config.public_host, None);
        assert_eq!(config.openai_api_key, "sk-env");
        assert_eq!(config.realtime_url, OPENAI_REALTIME_URL);
        assert_eq!(config.relay, RelayConfig::default());

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_missing_api_key() {
        cleanup_env_vars();

        let result = ServerConfig::from_env();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    #[serial]
    fn test_from_env_relay_settings() {
        cleanup_env_vars();
        unsafe {
            env::set_var("OPENAI_API_KEY", "sk-env");
            env::set_var("PORT", "6060");
            env::set_var("REALTIME_VOICE", "shimmer");
            env::set_var("AUDIO_CODEC_MODE", "linear_pcm");
            env::set_var("TURN_DETECTION_MODE", "hybrid");
            env::set_var("SILENCE_TIMEOUT_MS", "800");
            env::set_var("SYSTEM_MESSAGE", "Answer in one sentence.");
        }

        let config = ServerConfig::from_env().unwrap();

        assert_eq!(config.port, 6060);
        assert_eq!(config.relay.voice, OpenAIRealtimeVoice::Shimmer);
        assert_eq!(config.relay.codec, AudioCodecMode::LinearPcm);
        assert_eq!(config.relay.turn_detection, TurnDetectionMode::Hybrid);
        assert_eq!(config.relay.silence_timeout_ms, 800);
        assert_eq!(config.relay.instructions, "Answer in one sentence.");

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_port() {
        cleanup_env_vars();
        unsafe {
            env::set_var("OPENAI_API_KEY", "sk-env");
            env::set_var("PORT", "not-a-port");
        }

        let result = ServerConfig::from_env();
        assert!(result.unwrap_err().to_string().contains("Invalid PORT"));

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_http_realtime_url() {
        cleanup_env_vars();
        unsafe {
            env::set_var("OPENAI_API_KEY", "sk-env");
            env::set_var("OPENAI_REALTIME_URL", "https://api.openai.com/v1/realtime");
        }

        assert!(ServerConfig::from_env().is_err());

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_overrides_env() {
        cleanup_env_vars();
        unsafe {
            env::set_var("OPENAI_API_KEY", "sk-env");
            env::set_var("HOST", "10.0.0.1");
            env::set_var("REALTIME_VOICE", "echo");
            env::set_var("MIN_TURN_MS", "100");
        }

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        let yaml_content = r#"
server:
  port: 7070
  public_host: "voice.example.com"

openai:
  api_key: "sk-yaml"

relay:
  voice: "coral"
  turn_detection: "peer_vad"
"#;
        fs::write(&config_path, yaml_content).unwrap();

        let config = ServerConfig::from_file(&config_path).unwrap();

        // Env value kept where YAML is silent
        assert_eq!(config.host, "10.0.0.1");
        assert_eq!(config.relay.min_turn_ms, 100);

        // YAML wins where both are set
        assert_eq!(config.port, 7070);
        assert_eq!(config.openai_api_key, "sk-yaml");
        assert_eq!(config.relay.voice, OpenAIRealtimeVoice::Coral);
        assert_eq!(config.relay.turn_detection, TurnDetectionMode::PeerVad);
        assert_eq!(config.public_host, Some("voice.example.com".to_string()));

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_invalid_relay_value() {
        cleanup_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        let yaml_content = r#"
openai:
  api_key: "sk-yaml"
relay:
  vad_threshold: 2.0
"#;
        fs::write(&config_path, yaml_content).unwrap();

        let result = ServerConfig::from_file(&config_path);
        assert!(result.unwrap_err().to_string().contains("vad_threshold"));

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_unknown_mode() {
        cleanup_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        let yaml_content = r#"
openai:
  api_key: "sk-yaml"
relay:
  turn_detection: "semantic"
"#;
        fs::write(&config_path, yaml_content).unwrap();

        let result = ServerConfig::from_file(&config_path);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Unknown turn detection mode")
        );

        cleanup_env_vars();
    }
}
