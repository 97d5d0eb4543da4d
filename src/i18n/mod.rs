//! Internationalization (i18n) module for multi-language support.
//!
//! All language-related data lives here: the closed set of supported
//! languages and their engine codes, the curated static UI strings, engine
//! output validation, and translation metrics.
//!
//! # Architecture
//!
//! - `language`: `LanguageCode`, the exhaustive language → engine code mapping
//! - `strings`: curated UI literals for the synchronous fast path
//! - `validator`: checks engine output before it may be cached
//! - `metrics`: cache, engine and passthrough counters
//!
//! # Example
//!
//! ```rust,ignore
//! use dynamic_translate::i18n::{static_lookup, LanguageCode};
//!
//! let telugu = LanguageCode::from_code("te")?;
//! assert_eq!(telugu.engine_code(), "tel_Telu");
//! assert_eq!(static_lookup("Recipes", telugu), "వంటకాలు");
//! ```

mod language;
mod metrics;
mod strings;
mod validator;

pub use language::LanguageCode;
pub use metrics::{
    CacheStats, EngineStats, MetricsReport, PassthroughReason, PassthroughStats, TranslationMetrics,
};
pub use strings::{static_lookup, StaticDictionary, ENGLISH_STRINGS, TELUGU_STRINGS};
pub use validator::{OutputValidator, ValidationReport};
