use crate::engine::Device;
use crate::i18n::LanguageCode;
use anyhow::{Context, Result};

pub const DEFAULT_MODEL: &str = "facebook/nllb-200-distilled-600M";

#[derive(Debug, Clone)]
pub struct Config {
    // Inference engine
    pub engine_url: String,
    pub model: String,
    pub devices: Vec<Device>,
    pub request_timeout_secs: u64,

    // Languages
    pub source_language: LanguageCode,
    pub target_language: LanguageCode,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            engine_url: std::env::var("TRANSLATION_ENGINE_URL")
                .context("TRANSLATION_ENGINE_URL not set")?,
            model: std::env::var("TRANSLATION_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            devices: match std::env::var("TRANSLATION_DEVICES") {
                Ok(value) => parse_devices(&value).context("Invalid TRANSLATION_DEVICES")?,
                Err(_) => Device::PREFERENCE.to_vec(),
            },
            request_timeout_secs: std::env::var("TRANSLATION_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),

            source_language: match std::env::var("TRANSLATION_SOURCE_LANGUAGE") {
                Ok(code) => code.parse().context("Invalid TRANSLATION_SOURCE_LANGUAGE")?,
                Err(_) => LanguageCode::canonical(),
            },
            target_language: match std::env::var("TRANSLATION_TARGET_LANGUAGE") {
                Ok(code) => code.parse().context("Invalid TRANSLATION_TARGET_LANGUAGE")?,
                Err(_) => LanguageCode::Telugu,
            },
        })
    }
}

/// Parse a comma-separated device order such as `accelerated,cpu`.
pub fn parse_devices(value: &str) -> Result<Vec<Device>> {
    let devices = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect::<Result<Vec<Device>>>()?;

    if devices.is_empty() {
        anyhow::bail!("at least one device is required");
    }

    Ok(devices)
}
