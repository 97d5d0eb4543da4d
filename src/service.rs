//! Orchestration layer: what UI code talks to.
//!
//! A `TranslationRuntime` is built once per process and owns the model
//! loader, the translation cache, the client and the metrics. Any number of
//! `Translator`s are handed out from it; each one tracks its own current
//! language and in-flight work, while all of them share the same engine and
//! the same cache.
//!
//! # Example
//!
//! ```rust,ignore
//! use dynamic_translate::engine::MockEngineLoader;
//! use dynamic_translate::i18n::LanguageCode;
//! use dynamic_translate::service::{TranslateOptions, TranslationRuntime};
//! use std::sync::Arc;
//!
//! let runtime = TranslationRuntime::new(Arc::new(MockEngineLoader::new()));
//! let translator = runtime.translator(LanguageCode::Telugu);
//! translator.initialize().await;
//!
//! let title = translator.static_lookup("Recipes");
//! let body = translator.translate("Spicy tamarind rice", TranslateOptions::default()).await;
//! ```

use crate::cache::TranslationCache;
use crate::client::{TranslationClient, TranslationOutcome};
use crate::engine::EngineLoader;
use crate::i18n::{static_lookup, LanguageCode, MetricsReport, TranslationMetrics};
use crate::loader::{ModelLoader, ModelState};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Per-call options for `Translator::translate`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TranslateOptions {
    /// Ignore any cached translation and ask the engine again
    pub skip_cache: bool,
}

impl TranslateOptions {
    pub fn skip_cache() -> Self {
        Self { skip_cache: true }
    }
}

/// Snapshot of a translator's observable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TranslatorState {
    pub is_initialized: bool,
    pub is_translating: bool,
    pub current_language: LanguageCode,
    pub model: ModelState,
}

/// Process-wide translation resources, shared by every `Translator`.
pub struct TranslationRuntime {
    loader: Arc<ModelLoader>,
    cache: TranslationCache,
    client: TranslationClient,
    metrics: Arc<TranslationMetrics>,
    source_language: LanguageCode,
}

impl TranslationRuntime {
    /// Runtime loading engines from `engine_loader`, hardware first, with
    /// the canonical language as the source of all dynamic text.
    pub fn new(engine_loader: Arc<dyn EngineLoader>) -> Arc<Self> {
        Self::with_loader(ModelLoader::new(engine_loader), LanguageCode::canonical())
    }

    pub fn with_loader(loader: ModelLoader, source_language: LanguageCode) -> Arc<Self> {
        let loader = Arc::new(loader);
        let metrics = Arc::new(TranslationMetrics::new());
        let client = TranslationClient::new(Arc::clone(&loader), Arc::clone(&metrics));

        Arc::new(Self {
            loader,
            cache: TranslationCache::new(),
            client,
            metrics,
            source_language,
        })
    }

    /// A new translator showing text in `language`.
    pub fn translator(self: &Arc<Self>, language: LanguageCode) -> Translator {
        Translator {
            runtime: Arc::clone(self),
            current_language: RwLock::new(language),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn loader(&self) -> &ModelLoader {
        &self.loader
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn client(&self) -> &TranslationClient {
        &self.client
    }

    pub fn source_language(&self) -> LanguageCode {
        self.source_language
    }

    pub fn metrics(&self) -> MetricsReport {
        self.metrics.report()
    }
}

/// Marks an engine round trip as outstanding for as long as it lives.
///
/// Only taken once an engine is in hand, so waiting on model start-up does
/// not count as translating.
struct RoundTrip<'a>(&'a AtomicUsize);

impl<'a> RoundTrip<'a> {
    fn begin(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for RoundTrip<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Translation front end for one consumer (a page, a view, a session).
pub struct Translator {
    runtime: Arc<TranslationRuntime>,
    current_language: RwLock<LanguageCode>,
    in_flight: AtomicUsize,
}

impl Translator {
    /// Start (or join) model initialization; resolves once it is ready or has failed.
    pub async fn initialize(&self) {
        self.runtime.loader.initialize().await;
    }

    /// Whether model initialization has finished, successfully or not.
    pub fn is_initialized(&self) -> bool {
        self.runtime.loader.is_settled()
    }

    /// Whether an engine round trip started by this translator is outstanding.
    pub fn is_translating(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn current_language(&self) -> LanguageCode {
        *self
            .current_language
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Switch the display language.
    ///
    /// Calls already in flight keep their original target language and still
    /// populate the cache when they complete.
    pub fn set_language(&self, language: LanguageCode) {
        let mut current = self
            .current_language
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if *current != language {
            info!("Display language changed: {} -> {}", *current, language);
            *current = language;
        }
    }

    pub fn state(&self) -> TranslatorState {
        TranslatorState {
            is_initialized: self.is_initialized(),
            is_translating: self.is_translating(),
            current_language: self.current_language(),
            model: self.runtime.loader.state(),
        }
    }

    pub fn runtime(&self) -> &Arc<TranslationRuntime> {
        &self.runtime
    }

    /// Translate `text` from the source language into the current language.
    ///
    /// Served from the cache unless `options.skip_cache` is set. Never fails:
    /// anything that goes wrong yields `text` unchanged.
    pub async fn translate(&self, text: &str, options: TranslateOptions) -> String {
        let source = self.runtime.source_language;
        let target = self.current_language();

        if text.is_empty() || target == source {
            return text.to_string();
        }

        let runtime = &self.runtime;
        if !options.skip_cache {
            if let Some(cached) = runtime.cache.get(text, target) {
                runtime.metrics.record_lookups(1, 0);
                return cached;
            }
            runtime.metrics.record_lookups(0, 1);
        }

        let Some(engine) = runtime.client.engine().await else {
            return runtime.client.unavailable(text).into_text();
        };

        let outcome = {
            let _round_trip = RoundTrip::begin(&self.in_flight);
            runtime
                .client
                .translate_on(engine.as_ref(), text, source, target)
                .await
        };

        if let TranslationOutcome::Translated(translated) = &outcome {
            runtime.cache.insert(text, target, translated);
        }

        outcome.into_text()
    }

    /// Translate `texts` into the current language, preserving order.
    ///
    /// Cached entries are reused; only the misses go to the engine, and
    /// their fresh results are written back to the cache.
    pub async fn translate_batch(&self, texts: &[String]) -> Vec<String> {
        let source = self.runtime.source_language;
        let target = self.current_language();

        if target == source {
            return texts.to_vec();
        }

        let runtime = &self.runtime;
        let partition = runtime.cache.partition(texts, target);
        runtime
            .metrics
            .record_lookups(partition.hits.len(), partition.misses.len());

        if partition.is_fully_cached() {
            return partition.merge(Vec::new(), texts.len());
        }

        let missing: Vec<String> = partition
            .misses
            .iter()
            .map(|&index| texts[index].clone())
            .collect();

        debug!(
            "Batch of {}: {} cached, {} to translate",
            texts.len(),
            partition.hits.len(),
            missing.len()
        );

        let outcomes: Vec<TranslationOutcome> = if missing.iter().all(String::is_empty) {
            missing
                .iter()
                .cloned()
                .map(TranslationOutcome::Passthrough)
                .collect()
        } else if let Some(engine) = runtime.client.engine().await {
            let _round_trip = RoundTrip::begin(&self.in_flight);
            runtime
                .client
                .translate_batch_on(engine.as_ref(), &missing, source, target)
                .await
        } else {
            missing
                .iter()
                .map(|text| runtime.client.unavailable(text))
                .collect()
        };

        let fresh = outcomes
            .into_iter()
            .zip(&missing)
            .map(|(outcome, text)| {
                if let TranslationOutcome::Translated(translated) = &outcome {
                    runtime.cache.insert(text, target, translated);
                }
                outcome.into_text()
            })
            .collect();

        partition.merge(fresh, texts.len())
    }

    /// Curated literal for `key` in the current language, or `key` itself.
    ///
    /// Synchronous; never touches the model or the cache.
    pub fn static_lookup<'a>(&self, key: &'a str) -> &'a str {
        static_lookup(key, self.current_language())
    }

    /// Curated literal for `key` in `language`, or `key` itself.
    pub fn static_lookup_in<'a>(&self, key: &'a str, language: LanguageCode) -> &'a str {
        static_lookup(key, language)
    }
}
