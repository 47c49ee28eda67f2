use serde::Deserialize;
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present
/// here override the ones taken from environment variables.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 5050
///   public_host: "voice.example.com"
///
/// openai:
///   api_key: "sk-..."
///   realtime_url: "wss://api.openai.com/v1/realtime"
///
/// relay:
///   model: "gpt-realtime"
///   voice: "alloy"
///   instructions: "You are a helpful assistant."
///   codec: "passthrough"
///   turn_detection: "local_silence"
///   silence_timeout_ms: 500
///   min_turn_ms: 250
///   flush_delay_ms: 100
///   vad_threshold: 0.5
///   vad_prefix_padding_ms: 300
///   vad_silence_duration_ms: 500
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub openai: Option<OpenAIYaml>,
    pub relay: Option<RelayYaml>,
}

/// HTTP listener settings
#[derive(Debug, Default, Deserialize)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Host name the telephony provider uses to reach this server
    pub public_host: Option<String>,
}

/// Realtime AI provider settings
#[derive(Debug, Default, Deserialize)]
pub struct OpenAIYaml {
    pub api_key: Option<String>,
    pub realtime_url: Option<String>,
}

/// Relay behavior settings
///
/// Enumerated values stay as strings here and are parsed during merging so
/// that YAML and environment values share the same parsing and error text.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct RelayYaml {
    pub model: Option<String>,
    pub voice: Option<String>,
    pub instructions: Option<String>,
    pub codec: Option<String>,
    pub turn_detection: Option<String>,
    pub silence_timeout_ms: Option<u64>,
    pub min_turn_ms: Option<u64>,
    pub flush_delay_ms: Option<u64>,
    pub vad_threshold: Option<f32>,
    pub vad_prefix_padding_ms: Option<u32>,
    pub vad_silence_duration_ms: Option<u32>,
}

impl RelayYaml {
    /// Values set in `overrides` win over values set in `self`.
    pub fn overlay(self, overrides: RelayYaml) -> RelayYaml {
        RelayYaml {
            model: overrides.model.or(self.model),
            voice: overrides.voice.or(self.voice),
            instructions: overrides.instructions.or(self.instructions),
            codec: overrides.codec.or(self.codec),
            turn_detection: overrides.turn_detection.or(self.turn_detection),
            silence_timeout_ms: overrides.silence_timeout_ms.or(self.silence_timeout_ms),
            min_turn_ms: overrides.min_turn_ms.or(self.min_turn_ms),
            flush_delay_ms: overrides.flush_delay_ms.or(self.flush_delay_ms),
            vad_threshold: overrides.vad_threshold.or(self.vad_threshold),
            vad_prefix_padding_ms: overrides
                .vad_prefix_padding_ms
                .or(self.vad_prefix_padding_ms),
            vad_silence_duration_ms: overrides
                .vad_silence_duration_ms
                .or(self.vad_silence_duration_ms),
        }
    }
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be read
    /// - The YAML is malformed
    /// - Fields have invalid types
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_config_full() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 8080
  public_host: "voice.example.com"

openai:
  api_key: "sk-yaml"
  realtime_url: "ws://localhost:9000/v1/realtime"

relay:
  model: "gpt-realtime-mini"
  voice: "marin"
  instructions: "Be brief."
  codec: "linear_pcm"
  turn_detection: "hybrid"
  silence_timeout_ms: 700
  min_turn_ms: 300
  flush_delay_ms: 50
  vad_threshold: 0.6
  vad_prefix_padding_ms: 200
  vad_silence_duration_ms: 400
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();

        let server = config.server.unwrap();
        assert_eq!(server.host, Some("127.0.0.1".to_string()));
        assert_eq!(server.port, Some(8080));
        assert_eq!(server.public_host, Some("voice.example.com".to_string()));

        let openai = config.openai.unwrap();
        assert_eq!(openai.api_key, Some("sk-yaml".to_string()));

        let relay = config.relay.unwrap();
        assert_eq!(relay.voice, Some("marin".to_string()));
        assert_eq!(relay.turn_detection, Some("hybrid".to_string()));
        assert_eq!(relay.silence_timeout_ms, Some(700));
        assert_eq!(relay.vad_threshold, Some(0.6));
    }

    #[test]
    fn test_yaml_config_empty() {
        let config: YamlConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.server.is_none());
        assert!(config.openai.is_none());
        assert!(config.relay.is_none());
    }

    #[test]
    fn test_relay_overlay_prefers_overrides() {
        let base = RelayYaml {
            voice: Some("echo".to_string()),
            min_turn_ms: Some(100),
            ..Default::default()
        };
        let overrides = RelayYaml {
            voice: Some("sage".to_string()),
            ..Default::default()
        };

        let merged = base.overlay(overrides);
        assert_eq!(merged.voice, Some("sage".to_string()));
        assert_eq!(merged.min_turn_ms, Some(100));
        assert_eq!(merged.codec, None);
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let yaml_content = r#"
server:
  host: "localhost"
  port: 3000
"#;

        fs::write(&config_path, yaml_content).unwrap();

        let config = YamlConfig::from_file(&config_path).unwrap();

        assert_eq!(
            config.server.as_ref().unwrap().host,
            Some("localhost".to_string())
        );
        assert_eq!(config.server.as_ref().unwrap().port, Some(3000));
    }

    #[test]
    fn test_from_file_not_found() {
        let path = PathBuf::from("/nonexistent/config.yaml");
        let result = YamlConfig::from_file(&path);

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }

    #[test]
    fn test_from_file_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("invalid.yaml");

        fs::write(&config_path, "invalid: yaml: content:").unwrap();

        let result = YamlConfig::from_file(&config_path);

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse YAML")
        );
    }
}
