//! Translation client: the only component that talks to the engine.
//!
//! Every path is fail-open. Same-language requests, empty text, a failed
//! model and a failed inference call all hand back the original text; none
//! of them is an error to the caller. `TranslationOutcome` tells the caller
//! which of the two happened so that only real engine output gets cached.
//!
//! Acquiring the engine (`engine`) is separate from using it
//! (`translate_on`, `translate_batch_on`), so callers can tell model start-up
//! apart from the engine round trip itself.

use crate::engine::InferenceEngine;
use crate::error::{EngineError, EngineResult};
use crate::i18n::{LanguageCode, OutputValidator, PassthroughReason, TranslationMetrics};
use crate::loader::ModelLoader;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of one translation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    /// Fresh output from a successful inference call
    Translated(String),
    /// The original text, returned unchanged
    Passthrough(String),
}

impl TranslationOutcome {
    pub fn into_text(self) -> String {
        match self {
            TranslationOutcome::Translated(text) | TranslationOutcome::Passthrough(text) => text,
        }
    }

    pub fn is_translated(&self) -> bool {
        matches!(self, TranslationOutcome::Translated(_))
    }
}

pub struct TranslationClient {
    loader: Arc<ModelLoader>,
    metrics: Arc<TranslationMetrics>,
}

impl TranslationClient {
    pub fn new(loader: Arc<ModelLoader>, metrics: Arc<TranslationMetrics>) -> Self {
        Self { loader, metrics }
    }

    /// Translate `text`, returning it unchanged on any failure.
    pub async fn translate(&self, text: &str, source: LanguageCode, target: LanguageCode) -> String {
        self.translate_outcome(text, source, target).await.into_text()
    }

    /// Translate `text`, reporting whether the engine actually produced the result.
    pub async fn translate_outcome(
        &self,
        text: &str,
        source: LanguageCode,
        target: LanguageCode,
    ) -> TranslationOutcome {
        if source == target || text.is_empty() {
            return TranslationOutcome::Passthrough(text.to_string());
        }

        match self.engine().await {
            Some(engine) => self.translate_on(engine.as_ref(), text, source, target).await,
            None => self.unavailable(text),
        }
    }

    /// Translate every text concurrently; output order always matches input order.
    pub async fn translate_batch(
        &self,
        texts: &[String],
        source: LanguageCode,
        target: LanguageCode,
    ) -> Vec<String> {
        self.translate_batch_outcomes(texts, source, target)
            .await
            .into_iter()
            .map(TranslationOutcome::into_text)
            .collect()
    }

    /// Batch form of `translate_outcome`.
    pub async fn translate_batch_outcomes(
        &self,
        texts: &[String],
        source: LanguageCode,
        target: LanguageCode,
    ) -> Vec<TranslationOutcome> {
        if source == target || texts.iter().all(String::is_empty) {
            return texts
                .iter()
                .map(|text| TranslationOutcome::Passthrough(text.clone()))
                .collect();
        }

        match self.engine().await {
            Some(engine) => {
                self.translate_batch_on(engine.as_ref(), texts, source, target)
                    .await
            }
            None => texts.iter().map(|text| self.unavailable(text)).collect(),
        }
    }

    /// The ready engine, initializing the model on first use.
    ///
    /// `None` once initialization has failed for good.
    pub async fn engine(&self) -> Option<Arc<dyn InferenceEngine>> {
        let engine = self.loader.initialize().await;
        if engine.is_none() {
            debug!("Model unavailable, passing text through");
        }
        engine
    }

    /// Passthrough for a text that could not reach the engine because the
    /// model never loaded.
    pub fn unavailable(&self, text: &str) -> TranslationOutcome {
        if !text.is_empty() {
            self.metrics
                .record_passthrough(PassthroughReason::ModelUnavailable);
        }
        TranslationOutcome::Passthrough(text.to_string())
    }

    /// Translate `text` on an engine already obtained from `engine()`.
    pub async fn translate_on(
        &self,
        engine: &dyn InferenceEngine,
        text: &str,
        source: LanguageCode,
        target: LanguageCode,
    ) -> TranslationOutcome {
        if source == target || text.is_empty() {
            return TranslationOutcome::Passthrough(text.to_string());
        }
        self.run(engine, text, source, target).await
    }

    /// Batch form of `translate_on`.
    ///
    /// Duplicate texts are sent to the engine once and the result is fanned
    /// out to every position holding that text.
    pub async fn translate_batch_on(
        &self,
        engine: &dyn InferenceEngine,
        texts: &[String],
        source: LanguageCode,
        target: LanguageCode,
    ) -> Vec<TranslationOutcome> {
        if source == target {
            return texts
                .iter()
                .map(|text| TranslationOutcome::Passthrough(text.clone()))
                .collect();
        }

        // slot in `unique` for every input position; None for empty text
        let mut unique: Vec<&str> = Vec::new();
        let mut slot_of: HashMap<&str, usize> = HashMap::new();
        let slots: Vec<Option<usize>> = texts
            .iter()
            .map(|text| {
                if text.is_empty() {
                    return None;
                }
                let slot = *slot_of.entry(text.as_str()).or_insert_with(|| {
                    unique.push(text.as_str());
                    unique.len() - 1
                });
                Some(slot)
            })
            .collect();

        if unique.len() < texts.len() {
            debug!(
                "Batch of {} texts has {} distinct entries to translate",
                texts.len(),
                unique.len()
            );
        }

        // Completion order is arbitrary: each future carries its slot back
        let mut pending: FuturesUnordered<_> = unique
            .iter()
            .enumerate()
            .map(|(slot, text)| async move { (slot, self.run(engine, text, source, target).await) })
            .collect();

        let mut results: Vec<Option<TranslationOutcome>> = vec![None; unique.len()];
        while let Some((slot, outcome)) = pending.next().await {
            results[slot] = Some(outcome);
        }

        texts
            .iter()
            .zip(slots)
            .map(|(text, slot)| {
                slot.and_then(|slot| results[slot].clone())
                    .unwrap_or_else(|| TranslationOutcome::Passthrough(text.clone()))
            })
            .collect()
    }

    async fn run(
        &self,
        engine: &dyn InferenceEngine,
        text: &str,
        source: LanguageCode,
        target: LanguageCode,
    ) -> TranslationOutcome {
        self.metrics.record_engine_call();

        let result = engine
            .run_inference(text, source.engine_code(), target.engine_code())
            .await
            .and_then(|output| Self::check_output(text, output));

        match result {
            Ok(translated) => TranslationOutcome::Translated(translated),
            Err(e) => {
                let reason = match &e {
                    EngineError::MalformedOutput(_) => PassthroughReason::MalformedOutput,
                    _ => PassthroughReason::InferenceError,
                };
                self.metrics.record_passthrough(reason);
                warn!(
                    "Translation {} -> {} failed on {}, returning original text: {}",
                    source,
                    target,
                    engine.name(),
                    e
                );
                TranslationOutcome::Passthrough(text.to_string())
            }
        }
    }

    fn check_output(original: &str, output: String) -> EngineResult<String> {
        let report = OutputValidator::validate(original, &output);
        if report.has_errors() {
            return Err(EngineError::MalformedOutput(report.errors.join("; ")));
        }
        if report.has_warnings() {
            warn!("Translation output warnings: {:?}", report.warnings);
        }
        Ok(output)
    }
}
