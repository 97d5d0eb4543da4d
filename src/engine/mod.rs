//! Inference engine adapters.
//!
//! An `InferenceEngine` turns text in one engine language code into text in
//! another. Engines are produced by an `EngineLoader`, which is asked for one
//! device at a time; the model loader decides the order.
//!
//! - `http`: NLLB inference server spoken to over JSON/HTTP
//! - `mock`: deterministic in-process engine for tests and demos

pub mod http;
pub mod mock;

use crate::error::{EngineError, EngineResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub use http::{HttpEngine, HttpEngineLoader};
pub use mock::{MockEngine, MockEngineLoader};

/// Where the model runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// GPU / WebGPU / NPU, whatever the engine calls hardware acceleration
    Accelerated,
    /// Plain CPU execution, always expected to be available
    Cpu,
}

impl Device {
    /// Default load order: hardware first, CPU as the fallback.
    pub const PREFERENCE: [Device; 2] = [Device::Accelerated, Device::Cpu];

    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Accelerated => "accelerated",
            Device::Cpu => "cpu",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Device {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accelerated" | "gpu" | "webgpu" => Ok(Device::Accelerated),
            "cpu" => Ok(Device::Cpu),
            other => anyhow::bail!("Unknown device: '{}'", other),
        }
    }
}

/// A loaded translation model.
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    /// Translate `text` from `src_code` to `tgt_code` (FLORES-200 codes,
    /// e.g. `eng_Latn`, `tel_Telu`).
    async fn run_inference(&self, text: &str, src_code: &str, tgt_code: &str)
        -> EngineResult<String>;

    /// Device this engine instance was loaded on.
    fn device(&self) -> Device;

    /// Name used in logs.
    fn name(&self) -> &str;
}

/// Produces engine instances for a requested device.
#[async_trait]
pub trait EngineLoader: Send + Sync {
    async fn load(&self, device: Device) -> EngineResult<Arc<dyn InferenceEngine>>;
}

/// Shorthand for a load failure on `device`.
pub(crate) fn load_error(device: Device, reason: impl Into<String>) -> EngineError {
    EngineError::Load {
        device,
        reason: reason.into(),
    }
}
