//! Merging environment and YAML configuration.

use crate::core::audio::AudioCodecMode;
use crate::core::realtime::openai::{OPENAI_REALTIME_URL, OpenAIRealtimeModel, OpenAIRealtimeVoice};
use crate::core::relay::{RelayConfig, TurnDetectionMode};

use super::ServerConfig;
use super::env::EnvConfig;
use super::yaml::{RelayYaml, YamlConfig};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5050;

/// Build a [`ServerConfig`] from environment variables, with values from
/// `yaml` taking precedence when present.
pub(super) fn merge_config(
    yaml: Option<YamlConfig>,
) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let env = EnvConfig::load()?;
    let yaml = yaml.unwrap_or_default();
    let server = yaml.server.unwrap_or_default();
    let openai = yaml.openai.unwrap_or_default();

    let relay = env.relay.overlay(yaml.relay.unwrap_or_default());

    Ok(ServerConfig {
        host: server
            .host
            .or(env.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: server.port.or(env.port).unwrap_or(DEFAULT_PORT),
        public_host: server.public_host.or(env.public_host),
        openai_api_key: openai.api_key.or(env.openai_api_key).unwrap_or_default(),
        realtime_url: openai
            .realtime_url
            .or(env.realtime_url)
            .unwrap_or_else(|| OPENAI_REALTIME_URL.to_string()),
        relay: build_relay_config(relay)?,
    })
}

fn build_relay_config(raw: RelayYaml) -> Result<RelayConfig, String> {
    let defaults = RelayConfig::default();

    let model = match raw.model {
        Some(value) => OpenAIRealtimeModel::parse(&value)
            .ok_or_else(|| format!("Unknown realtime model: {value}"))?,
        None => defaults.model,
    };
    let voice = match raw.voice {
        Some(value) => OpenAIRealtimeVoice::parse(&value)
            .ok_or_else(|| format!("Unknown realtime voice: {value}"))?,
        None => defaults.voice,
    };
    let codec = match raw.codec {
        Some(value) => AudioCodecMode::parse(&value)
            .ok_or_else(|| format!("Unknown audio codec mode: {value}"))?,
        None => defaults.codec,
    };
    let turn_detection = match raw.turn_detection {
        Some(value) => TurnDetectionMode::parse(&value)
            .ok_or_else(|| format!("Unknown turn detection mode: {value}"))?,
        None => defaults.turn_detection,
    };

    Ok(RelayConfig {
        model,
        voice,
        instructions: raw.instructions.unwrap_or(defaults.instructions),
        codec,
        turn_detection,
        silence_timeout_ms: raw.silence_timeout_ms.unwrap_or(defaults.silence_timeout_ms),
        min_turn_ms: raw.min_turn_ms.unwrap_or(defaults.min_turn_ms),
        flush_delay_ms: raw.flush_delay_ms.unwrap_or(defaults.flush_delay_ms),
        vad_threshold: raw.vad_threshold.unwrap_or(defaults.vad_threshold),
        vad_prefix_padding_ms: raw
            .vad_prefix_padding_ms
            .unwrap_or(defaults.vad_prefix_padding_ms),
        vad_silence_duration_ms: raw
            .vad_silence_duration_ms
            .unwrap_or(defaults.vad_silence_duration_ms),
    })
}
