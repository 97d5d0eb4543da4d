//! Model lifecycle: acquire exactly one inference engine, hardware first.
//!
//! ```text
//! Uninitialized -> Initializing(Accelerated) -> Ready(Accelerated)
//!                        | load failed
//!                        v
//!                  Initializing(Cpu) -> Ready(Cpu)
//!                        | load failed
//!                        v
//!                      Failed   (terminal, never retried)
//! ```
//!
//! The load runs on its own spawned task. Callers only await a shared handle
//! to it, so concurrent `initialize()` calls observe one attempt, and a
//! caller that is cancelled mid-load (task abort, `select!`, `timeout`)
//! leaves the attempt running for everyone else.

use crate::engine::{Device, EngineLoader, InferenceEngine};
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use tracing::{error, info, warn};

/// Lifecycle state of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "device", rename_all = "snake_case")]
pub enum ModelState {
    Uninitialized,
    Initializing(Device),
    Ready(Device),
    Failed,
}

impl ModelState {
    /// `Ready` or `Failed`: initialization will not do anything more.
    pub fn is_settled(&self) -> bool {
        matches!(self, ModelState::Ready(_) | ModelState::Failed)
    }
}

/// Outcome of the one load attempt, awaitable by any number of callers.
type LoadAttempt = Shared<BoxFuture<'static, Option<Arc<dyn InferenceEngine>>>>;

/// Everything the spawned load task needs, owned independently of callers.
struct LoadPlan {
    engine_loader: Arc<dyn EngineLoader>,
    devices: Vec<Device>,
    state: Mutex<ModelState>,
}

impl LoadPlan {
    fn lock_state(&self) -> MutexGuard<'_, ModelState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_state(&self, state: ModelState) {
        *self.lock_state() = state;
    }

    async fn run(&self) -> Option<Arc<dyn InferenceEngine>> {
        for &device in &self.devices {
            self.set_state(ModelState::Initializing(device));

            match self.engine_loader.load(device).await {
                Ok(engine) => {
                    info!("Translation model ready on {} ({})", device, engine.name());
                    self.set_state(ModelState::Ready(device));
                    return Some(engine);
                }
                Err(e) => {
                    warn!("Model load on {} failed: {}", device, e);
                }
            }
        }

        error!(
            "Translation model initialization failed on all devices ({:?}); translations will pass through unchanged",
            self.devices
        );
        self.set_state(ModelState::Failed);
        None
    }
}

pub struct ModelLoader {
    plan: Arc<LoadPlan>,
    attempt: OnceLock<LoadAttempt>,
}

impl ModelLoader {
    /// Loader trying `Device::PREFERENCE` in order (hardware, then CPU).
    pub fn new(engine_loader: Arc<dyn EngineLoader>) -> Self {
        Self::with_devices(engine_loader, Device::PREFERENCE.to_vec())
    }

    /// Loader trying `devices` in the given order.
    pub fn with_devices(engine_loader: Arc<dyn EngineLoader>, devices: Vec<Device>) -> Self {
        Self {
            plan: Arc::new(LoadPlan {
                engine_loader,
                devices,
                state: Mutex::new(ModelState::Uninitialized),
            }),
            attempt: OnceLock::new(),
        }
    }

    /// Bring the model up, or wait for the attempt already in flight.
    ///
    /// Returns the ready engine, or `None` once the loader has failed for good.
    /// Must be called from within a tokio runtime.
    pub async fn initialize(&self) -> Option<Arc<dyn InferenceEngine>> {
        self.attempt.get_or_init(|| self.spawn_load()).clone().await
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ModelState {
        *self.plan.lock_state()
    }

    pub fn is_settled(&self) -> bool {
        self.state().is_settled()
    }

    /// The ready engine, without triggering initialization.
    pub fn engine(&self) -> Option<Arc<dyn InferenceEngine>> {
        self.attempt
            .get()
            .and_then(|attempt| attempt.peek().cloned())
            .flatten()
    }

    fn spawn_load(&self) -> LoadAttempt {
        let plan = Arc::clone(&self.plan);
        let task = tokio::spawn(async move { plan.run().await });

        let plan = Arc::clone(&self.plan);
        async move {
            match task.await {
                Ok(engine) => engine,
                Err(e) => {
                    error!("Model load task ended abnormally: {}", e);
                    plan.set_state(ModelState::Failed);
                    None
                }
            }
        }
        .boxed()
        .shared()
    }
}
