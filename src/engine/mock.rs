//! Mock inference engine for testing
//!
//! A deterministic, network-free engine for exercising the translation
//! pipeline without a model server. It records every inference call so tests
//! can assert how often the engine was actually reached.
//!
//! # Example
//!
//! ```ignore
//! use dynamic_translate::engine::{Device, EngineLoader, MockEngineLoader};
//!
//! let loader = MockEngineLoader::new();
//! let engine = loader.load(Device::Cpu).await?;
//! let out = engine.run_inference("hello", "eng_Latn", "tel_Telu").await?;
//! assert_eq!(out, "hello_tel_Telu");
//! ```

use crate::engine::{load_error, Device, EngineLoader, InferenceEngine};
use crate::error::{EngineError, EngineResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock engine that appends the target code unless a mapping says otherwise.
///
/// - `"hello"` → `"hello_tel_Telu"` by default
/// - explicit `(text, target code) → translation` mappings win
/// - texts marked failing return `EngineError::Inference`
/// - per-text delays let tests force out-of-order completion
#[derive(Debug)]
pub struct MockEngine {
    device: Device,
    mappings: HashMap<(String, String), String>,
    delays: HashMap<String, Duration>,
    failing: Mutex<HashSet<String>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    history: Mutex<Vec<String>>,
}

impl MockEngine {
    pub fn new(device: Device) -> Self {
        Self {
            device,
            mappings: HashMap::new(),
            delays: HashMap::new(),
            failing: Mutex::new(HashSet::new()),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Use `translation` for `text` when the target is `tgt_code`.
    pub fn with_mapping(mut self, text: &str, tgt_code: &str, translation: &str) -> Self {
        self.mappings
            .insert((text.to_string(), tgt_code.to_string()), translation.to_string());
        self
    }

    /// Sleep for `delay` before answering for `text`.
    pub fn with_delay(mut self, text: &str, delay: Duration) -> Self {
        self.delays.insert(text.to_string(), delay);
        self
    }

    /// Fail every inference call for `text` until `recover` is called.
    pub fn with_failure(self, text: &str) -> Self {
        self.fail(text);
        self
    }

    pub fn fail(&self, text: &str) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(text.to_string());
        }
    }

    pub fn recover(&self, text: &str) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.remove(text);
        }
    }

    /// Number of inference calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of inference calls received for `text`.
    pub fn calls_for(&self, text: &str) -> usize {
        self.history
            .lock()
            .map(|history| history.iter().filter(|t| t.as_str() == text).count())
            .unwrap_or(0)
    }

    /// Most calls ever outstanding at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Texts in the order their calls completed.
    pub fn completion_order(&self) -> Vec<String> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    fn is_failing(&self, text: &str) -> bool {
        self.failing
            .lock()
            .map(|failing| failing.contains(text))
            .unwrap_or(false)
    }
}

#[async_trait]
impl InferenceEngine for MockEngine {
    async fn run_inference(
        &self,
        text: &str,
        _src_code: &str,
        tgt_code: &str,
    ) -> EngineResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outstanding = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(outstanding, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(text) {
            tokio::time::sleep(*delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Ok(mut history) = self.history.lock() {
            history.push(text.to_string());
        }

        if self.is_failing(text) {
            return Err(EngineError::Inference(format!(
                "mock failure for {:?}",
                text
            )));
        }

        let key = (text.to_string(), tgt_code.to_string());
        Ok(self
            .mappings
            .get(&key)
            .cloned()
            .unwrap_or_else(|| format!("{}_{}", text, tgt_code)))
    }

    fn device(&self) -> Device {
        self.device
    }

    fn name(&self) -> &str {
        "Mock Engine"
    }
}

/// Loader handing out one shared `MockEngine`.
///
/// Devices can be marked unavailable to simulate a missing GPU or a host
/// where nothing loads at all.
#[derive(Debug)]
pub struct MockEngineLoader {
    engine: Arc<MockEngine>,
    unavailable: HashSet<Device>,
    load_delay: Duration,
    attempts: Mutex<Vec<Device>>,
}

impl MockEngineLoader {
    pub fn new() -> Self {
        Self::with_engine(MockEngine::new(Device::Accelerated))
    }

    /// Serve `engine` for whichever device loads successfully.
    pub fn with_engine(engine: MockEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            unavailable: HashSet::new(),
            load_delay: Duration::ZERO,
            attempts: Mutex::new(Vec::new()),
        }
    }

    /// Make loading on `device` fail.
    pub fn without_device(mut self, device: Device) -> Self {
        self.unavailable.insert(device);
        self
    }

    /// Sleep for `delay` inside every load attempt.
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    /// The engine instance handed out by this loader.
    pub fn engine(&self) -> Arc<MockEngine> {
        Arc::clone(&self.engine)
    }

    /// Devices requested so far, in order.
    pub fn attempts(&self) -> Vec<Device> {
        self.attempts
            .lock()
            .map(|attempts| attempts.clone())
            .unwrap_or_default()
    }
}

impl Default for MockEngineLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EngineLoader for MockEngineLoader {
    async fn load(&self, device: Device) -> EngineResult<Arc<dyn InferenceEngine>> {
        if let Ok(mut attempts) = self.attempts.lock() {
            attempts.push(device);
        }

        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }

        if self.unavailable.contains(&device) {
            return Err(load_error(device, "device unavailable"));
        }

        Ok(self.engine.clone() as Arc<dyn InferenceEngine>)
    }
}
