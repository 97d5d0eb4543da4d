//! NLLB inference server adapter.
//!
//! Talks JSON over HTTP to a model server hosting
//! `facebook/nllb-200-distilled-600M` (or any model using FLORES-200 codes).
//!
//! - `POST {base}/load` with `{"model", "device"}` asks the server to load
//!   the model on a device; any 2xx means ready
//! - `POST {base}/translate` with `{"model", "text", "src_lang", "tgt_lang"}`
//!   answers `{"translation_text": "..."}`

use crate::config::Config;
use crate::engine::{load_error, Device, EngineLoader, InferenceEngine};
use crate::error::{EngineError, EngineResult};
use crate::retry::{with_retry_if, RetryConfig};
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct LoadRequest<'a> {
    model: &'a str,
    device: Device,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    model: &'a str,
    text: &'a str,
    src_lang: &'a str,
    tgt_lang: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translation_text: String,
}

/// Read a non-success response into an `EngineError::Api`.
async fn api_error(response: reqwest::Response) -> EngineError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
    EngineError::Api { status, body }
}

/// Produces `HttpEngine`s after asking the server to load the model.
#[derive(Debug, Clone)]
pub struct HttpEngineLoader {
    client: reqwest::Client,
    base_url: String,
    model: String,
    load_retry: RetryConfig,
    inference_retry: RetryConfig,
}

impl HttpEngineLoader {
    pub fn new(client: reqwest::Client, base_url: &str, model: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            load_retry: RetryConfig::engine_load(),
            inference_retry: RetryConfig::inference(),
        }
    }

    /// Build a loader from configuration, with the configured request timeout.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client for translation engine")?;

        Ok(Self::new(client, &config.engine_url, &config.model))
    }

    pub fn with_load_retry(mut self, retry: RetryConfig) -> Self {
        self.load_retry = retry;
        self
    }

    pub fn with_inference_retry(mut self, retry: RetryConfig) -> Self {
        self.inference_retry = retry;
        self
    }
}

#[async_trait]
impl EngineLoader for HttpEngineLoader {
    async fn load(&self, device: Device) -> EngineResult<Arc<dyn InferenceEngine>> {
        let url = format!("{}/load", self.base_url);
        let request = LoadRequest {
            model: &self.model,
            device,
        };

        info!("Loading {} on {} via {}", self.model, device, url);

        with_retry_if(
            &self.load_retry,
            &format!("Model load on {}", device),
            || async {
                let response = self.client.post(&url).json(&request).send().await?;

                if !response.status().is_success() {
                    return Err(api_error(response).await);
                }

                Ok(())
            },
            EngineError::is_retryable,
        )
        .await
        .map_err(|e| load_error(device, e.to_string()))?;

        Ok(Arc::new(HttpEngine {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            device,
            retry: self.inference_retry.clone(),
        }))
    }
}

/// A model loaded on the inference server.
#[derive(Debug, Clone)]
pub struct HttpEngine {
    client: reqwest::Client,
    base_url: String,
    model: String,
    device: Device,
    retry: RetryConfig,
}

#[async_trait]
impl InferenceEngine for HttpEngine {
    async fn run_inference(
        &self,
        text: &str,
        src_code: &str,
        tgt_code: &str,
    ) -> EngineResult<String> {
        let url = format!("{}/translate", self.base_url);
        let request = TranslateRequest {
            model: &self.model,
            text,
            src_lang: src_code,
            tgt_lang: tgt_code,
        };

        debug!("Inference {} -> {} ({} chars)", src_code, tgt_code, text.len());

        with_retry_if(
            &self.retry,
            &format!("Translation to {}", tgt_code),
            || async {
                let response = self.client.post(&url).json(&request).send().await?;

                if !response.status().is_success() {
                    return Err(api_error(response).await);
                }

                let body = response.text().await?;
                let parsed: TranslateResponse = serde_json::from_str(&body)
                    .map_err(|e| EngineError::MalformedOutput(format!("{}: {}", e, body)))?;

                Ok(parsed.translation_text)
            },
            EngineError::is_retryable,
        )
        .await
    }

    fn device(&self) -> Device {
        self.device
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{body_partial_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn loader(server: &MockServer) -> HttpEngineLoader {
        HttpEngineLoader::new(
            reqwest::Client::new(),
            &server.uri(),
            "facebook/nllb-200-distilled-600M",
        )
        .with_load_retry(RetryConfig::new(2, Duration::from_millis(1)))
        .with_inference_retry(RetryConfig::new(3, Duration::from_millis(1)))
    }

    async fn mount_load_ok(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/load"))
            .respond_with(ResponseTemplate::new(200))
            .mount(server)
            .await;
    }

    // ==================== Load Tests ====================

    #[tokio::test]
    async fn test_load_sends_device() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/load"))
            .and(body_partial_json(serde_json::json!({"device": "cpu"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let engine = loader(&server).load(Device::Cpu).await.expect("Should load");
        assert_eq!(engine.device(), Device::Cpu);
        assert_eq!(engine.name(), "facebook/nllb-200-distilled-600M");
    }

    #[tokio::test]
    async fn test_load_failure_is_load_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/load"))
            .respond_with(ResponseTemplate::new(400).set_body_string("no gpu"))
            .expect(1)
            .mount(&server)
            .await;

        let result = loader(&server).load(Device::Accelerated).await;
        match result {
            Err(EngineError::Load { device, reason }) => {
                assert_eq!(device, Device::Accelerated);
                assert!(reason.contains("no gpu"));
            }
            _ => panic!("Expected load error"),
        }
    }

    #[tokio::test]
    async fn test_load_retries_on_503() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/load"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;

        assert!(loader(&server).load(Device::Cpu).await.is_err());
    }

    // ==================== Inference Tests ====================

    #[tokio::test]
    async fn test_translate_success() {
        let server = MockServer::start().await;
        mount_load_ok(&server).await;

        Mock::given(method("POST"))
            .and(path("/translate"))
            .and(body_partial_json(serde_json::json!({
                "text": "Recipes",
                "src_lang": "eng_Latn",
                "tgt_lang": "tel_Telu"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"translation_text": "వంటకాలు"})),
            )
            .mount(&server)
            .await;

        let engine = loader(&server).load(Device::Cpu).await.unwrap();
        let result = engine
            .run_inference("Recipes", "eng_Latn", "tel_Telu")
            .await
            .expect("Should succeed");
        assert_eq!(result, "వంటకాలు");
    }

    #[tokio::test]
    async fn test_translate_retries_on_500() {
        let server = MockServer::start().await;
        mount_load_ok(&server).await;

        Mock::given(method("POST"))
            .and(path("/translate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .expect(3)
            .mount(&server)
            .await;

        let engine = loader(&server).load(Device::Cpu).await.unwrap();
        let result = engine.run_inference("x", "eng_Latn", "tel_Telu").await;
        assert!(matches!(result, Err(EngineError::Api { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_translate_no_retry_on_400() {
        let server = MockServer::start().await;
        mount_load_ok(&server).await;

        Mock::given(method("POST"))
            .and(path("/translate"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad lang"))
            .expect(1)
            .mount(&server)
            .await;

        let engine = loader(&server).load(Device::Cpu).await.unwrap();
        let result = engine.run_inference("x", "eng_Latn", "tel_Telu").await;
        assert!(matches!(result, Err(EngineError::Api { status: 400, .. })));
    }

    #[tokio::test]
    async fn test_translate_malformed_body() {
        let server = MockServer::start().await;
        mount_load_ok(&server).await;

        Mock::given(method("POST"))
            .and(path("/translate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"oops": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let engine = loader(&server).load(Device::Cpu).await.unwrap();
        let result = engine.run_inference("x", "eng_Latn", "tel_Telu").await;
        assert!(matches!(result, Err(EngineError::MalformedOutput(_))));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let loader = HttpEngineLoader::new(reqwest::Client::new(), "http://localhost:8000/", "m");
        assert_eq!(loader.base_url, "http://localhost:8000");
    }
}
