//! On-demand machine translation of dynamic UI text with a fail-open contract.
//!
//! Curated literals come from a static dictionary; everything else is
//! translated through a lazily loaded NLLB engine, cached per
//! `(text, language)`, and falls back to the original text on any failure.

pub mod cache;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod i18n;
pub mod loader;
pub mod retry;
pub mod service;

pub use cache::TranslationCache;
pub use client::{TranslationClient, TranslationOutcome};
pub use config::Config;
pub use error::{EngineError, EngineResult};
pub use i18n::{static_lookup, LanguageCode};
pub use loader::{ModelLoader, ModelState};
pub use service::{TranslateOptions, TranslationRuntime, Translator, TranslatorState};
