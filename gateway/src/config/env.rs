//! Environment variable loading.

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use super::yaml::RelayYaml;

/// Configuration values read from the process environment.
#[derive(Debug, Default)]
pub(super) struct EnvConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub public_host: Option<String>,
    pub openai_api_key: Option<String>,
    pub realtime_url: Option<String>,
    pub relay: RelayYaml,
}

impl EnvConfig {
    pub(super) fn load() -> Result<Self, String> {
        Ok(Self {
            host: var("HOST"),
            port: parse_var("PORT")?,
            public_host: var("PUBLIC_HOST"),
            openai_api_key: var("OPENAI_API_KEY"),
            realtime_url: var("OPENAI_REALTIME_URL"),
            relay: RelayYaml {
                model: var("REALTIME_MODEL"),
                voice: var("REALTIME_VOICE"),
                instructions: var("SYSTEM_MESSAGE"),
                codec: var("AUDIO_CODEC_MODE"),
                turn_detection: var("TURN_DETECTION_MODE"),
                silence_timeout_ms: parse_var("SILENCE_TIMEOUT_MS")?,
                min_turn_ms: parse_var("MIN_TURN_MS")?,
                flush_delay_ms: parse_var("FLUSH_DELAY_MS")?,
                vad_threshold: parse_var("VAD_THRESHOLD")?,
                vad_prefix_padding_ms: parse_var("VAD_PREFIX_PADDING_MS")?,
                vad_silence_duration_ms: parse_var("VAD_SILENCE_DURATION_MS")?,
            },
        })
    }
}

/// Read a variable, treating empty values as unset.
fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T>(name: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: Display,
{
    var(name)
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|e| format!("Invalid {name} value {value:?}: {e}"))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_empty_values_are_unset() {
        unsafe {
            env::set_var("PUBLIC_HOST", "   ");
        }
        assert_eq!(var("PUBLIC_HOST"), None);
        unsafe {
            env::remove_var("PUBLIC_HOST");
        }
    }

    #[test]
    #[serial]
    fn test_invalid_number_is_reported() {
        unsafe {
            env::set_var("MIN_TURN_MS", "soon");
        }
        let err = parse_var::<u64>("MIN_TURN_MS").unwrap_err();
        assert!(err.contains("Invalid MIN_TURN_MS"));
        unsafe {
            env::remove_var("MIN_TURN_MS");
        }
    }
}
