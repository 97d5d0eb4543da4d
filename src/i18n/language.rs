//! Language type: closed set of supported languages.
//!
//! `LanguageCode` is the only place that knows about engine-specific codes.
//! Every mapping is an exhaustive `match`, so adding a language is a
//! compile-time checked change: add a variant and fix every arm the compiler
//! points at.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageCode {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "te")]
    Telugu,
}

impl LanguageCode {
    /// Every supported language, canonical first.
    pub const ALL: [LanguageCode; 2] = [LanguageCode::English, LanguageCode::Telugu];

    /// Create a LanguageCode from an ISO 639-1 code string.
    ///
    /// # Arguments
    /// * `code` - The ISO 639-1 language code (e.g., "en", "te")
    ///
    /// # Returns
    /// * `Ok(LanguageCode)` if the code is supported
    /// * `Err` if the code is unknown
    pub fn from_code(code: &str) -> Result<LanguageCode> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(LanguageCode::English),
            "te" => Ok(LanguageCode::Telugu),
            "" => bail!("Empty language code"),
            other => bail!("Unknown language code: '{}'", other),
        }
    }

    /// Get the canonical (source) language.
    ///
    /// All dynamic content is authored in this language; translating into
    /// it is always the identity.
    pub fn canonical() -> LanguageCode {
        LanguageCode::English
    }

    /// Check if this is the canonical language.
    pub fn is_canonical(&self) -> bool {
        *self == Self::canonical()
    }

    /// ISO 639-1 code (e.g., "en", "te").
    pub fn code(&self) -> &'static str {
        match self {
            LanguageCode::English => "en",
            LanguageCode::Telugu => "te",
        }
    }

    /// FLORES-200 code understood by the NLLB engine.
    pub fn engine_code(&self) -> &'static str {
        match self {
            LanguageCode::English => "eng_Latn",
            LanguageCode::Telugu => "tel_Telu",
        }
    }

    /// English name of the language.
    pub fn name(&self) -> &'static str {
        match self {
            LanguageCode::English => "English",
            LanguageCode::Telugu => "Telugu",
        }
    }

    /// Name of the language in its own script, as shown on the language toggle.
    pub fn native_name(&self) -> &'static str {
        match self {
            LanguageCode::English => "English",
            LanguageCode::Telugu => "తెలుగు",
        }
    }
}

impl Default for LanguageCode {
    fn default() -> Self {
        Self::canonical()
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for LanguageCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        LanguageCode::from_code(s)
    }
}
