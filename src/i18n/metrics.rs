//! Counters for one translation runtime.
//!
//! A request that does not come back translated is a passthrough, and the
//! reason is kept: the model never loaded, the engine errored, or the engine
//! answered with output the validator rejected. Cache lookups are counted
//! apart from engine traffic, so a report shows how much of the UI was
//! served without touching the model at all.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Why a text was handed back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassthroughReason {
    /// Model initialization ended in `Failed`; the engine was never called
    ModelUnavailable,
    /// The engine call returned an error
    InferenceError,
    /// The engine answered, but the output failed validation
    MalformedOutput,
}

impl PassthroughReason {
    pub const ALL: [PassthroughReason; 3] = [
        PassthroughReason::ModelUnavailable,
        PassthroughReason::InferenceError,
        PassthroughReason::MalformedOutput,
    ];

    /// Whether an engine call was spent before giving up.
    pub fn reached_engine(self) -> bool {
        !matches!(self, PassthroughReason::ModelUnavailable)
    }

    fn slot(self) -> usize {
        match self {
            PassthroughReason::ModelUnavailable => 0,
            PassthroughReason::InferenceError => 1,
            PassthroughReason::MalformedOutput => 2,
        }
    }
}

/// Shared by the client (engine traffic) and the translators (cache lookups).
#[derive(Debug, Default)]
pub struct TranslationMetrics {
    cache_hits: AtomicUsize,
    cache_misses: AtomicUsize,
    engine_calls: AtomicUsize,
    passthroughs: [AtomicUsize; 3],
}

impl TranslationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of cache lookups: one per single call, or a whole
    /// batch partition at once.
    pub fn record_lookups(&self, hits: usize, misses: usize) {
        self.cache_hits.fetch_add(hits, Ordering::Relaxed);
        self.cache_misses.fetch_add(misses, Ordering::Relaxed);
    }

    pub fn record_engine_call(&self) {
        self.engine_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_passthrough(&self, reason: PassthroughReason) {
        self.record_passthroughs(reason, 1);
    }

    pub fn record_passthroughs(&self, reason: PassthroughReason, count: usize) {
        self.passthroughs[reason.slot()].fetch_add(count, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn engine_calls(&self) -> usize {
        self.engine_calls.load(Ordering::Relaxed)
    }

    pub fn passthroughs(&self, reason: PassthroughReason) -> usize {
        self.passthroughs[reason.slot()].load(Ordering::Relaxed)
    }

    /// Engine calls that did not yield a usable translation.
    pub fn engine_failures(&self) -> usize {
        PassthroughReason::ALL
            .into_iter()
            .filter(|reason| reason.reached_engine())
            .map(|reason| self.passthroughs(reason))
            .sum()
    }

    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let calls = self.engine_calls();
        let translated = calls.saturating_sub(self.engine_failures());

        MetricsReport {
            cache: CacheStats {
                hits,
                misses,
                hit_ratio: ratio(hits, hits + misses),
            },
            engine: EngineStats {
                calls,
                translated,
                success_ratio: ratio(translated, calls),
            },
            passthroughs: PassthroughStats {
                model_unavailable: self.passthroughs(PassthroughReason::ModelUnavailable),
                inference_error: self.passthroughs(PassthroughReason::InferenceError),
                malformed_output: self.passthroughs(PassthroughReason::MalformedOutput),
            },
        }
    }
}

/// `None` until there is something to divide by.
fn ratio(part: usize, whole: usize) -> Option<f64> {
    (whole > 0).then(|| part as f64 / whole as f64)
}

/// Point-in-time snapshot, serialized into the binary's exit log line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub cache: CacheStats,
    pub engine: EngineStats,
    pub passthroughs: PassthroughStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    /// Fraction of lookups served from the cache, 0.0 to 1.0
    pub hit_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStats {
    pub calls: usize,
    /// Calls whose output was accepted
    pub translated: usize,
    pub success_ratio: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PassthroughStats {
    pub model_unavailable: usize,
    pub inference_error: usize,
    pub malformed_output: usize,
}

impl PassthroughStats {
    pub fn total(&self) -> usize {
        self.model_unavailable + self.inference_error + self.malformed_output
    }
}
