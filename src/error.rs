use crate::engine::Device;
use thiserror::Error;

/// Errors raised by inference engines and engine loaders.
///
/// None of these ever reach a `Translator` caller: the loader turns load
/// errors into the `Failed` state and the client turns inference errors into
/// passthrough of the original text.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to load model on {device}: {reason}")]
    Load { device: Device, reason: String },

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("engine API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("malformed engine output: {0}")]
    MalformedOutput(String),

    #[error("HTTP request to engine failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl EngineError {
    /// Whether retrying the same request could plausibly succeed.
    ///
    /// Rate limits, server errors and transport failures are transient;
    /// other 4xx responses and malformed output are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::Api { status, .. } => *status == 429 || *status >= 500,
            EngineError::Http(_) => true,
            EngineError::Load { .. }
            | EngineError::Inference(_)
            | EngineError::MalformedOutput(_) => false,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
