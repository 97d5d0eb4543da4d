//! Integration tests for dynamic-translate
//!
//! These tests drive the public API end to end: a runtime built on either
//! the in-process mock engine or the HTTP engine against a wiremock server.

use std::sync::Arc;
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

use dynamic_translate::engine::{Device, HttpEngineLoader, MockEngine, MockEngineLoader};
use dynamic_translate::retry::RetryConfig;
use dynamic_translate::{
    static_lookup, LanguageCode, ModelLoader, ModelState, TranslateOptions, TranslationRuntime,
};

// ==================== Test Helpers ====================

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn http_runtime(server: &MockServer, devices: Vec<Device>) -> Arc<TranslationRuntime> {
    let engine_loader = HttpEngineLoader::new(
        reqwest::Client::new(),
        &server.uri(),
        "facebook/nllb-200-distilled-600M",
    )
    .with_load_retry(RetryConfig::none())
    .with_inference_retry(RetryConfig::none());

    TranslationRuntime::with_loader(
        ModelLoader::with_devices(Arc::new(engine_loader), devices),
        LanguageCode::English,
    )
}

async fn mount_translation(server: &MockServer, text: &str, translation: &str) {
    Mock::given(method("POST"))
        .and(path("/translate"))
        .and(body_partial_json(serde_json::json!({
            "text": text,
            "src_lang": "eng_Latn",
            "tgt_lang": "tel_Telu",
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "translation_text": translation })),
        )
        .mount(server)
        .await;
}

// ==================== HTTP Engine Workflow ====================

#[tokio::test]
async fn test_http_workflow_translates_and_caches() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/load"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .and(body_partial_json(serde_json::json!({"text": "Recipes"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "translation_text": "వంటకాలు" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let runtime = http_runtime(&server, Device::PREFERENCE.to_vec());
    let translator = runtime.translator(LanguageCode::Telugu);

    translator.initialize().await;
    assert_eq!(runtime.loader().state(), ModelState::Ready(Device::Accelerated));

    let first = translator.translate("Recipes", TranslateOptions::default()).await;
    let second = translator.translate("Recipes", TranslateOptions::default()).await;

    assert_eq!(first, "వంటకాలు");
    assert_eq!(second, "వంటకాలు");
    assert_eq!(runtime.metrics().engine.calls, 1);
    assert_eq!(runtime.metrics().cache.hits, 1);
}

#[tokio::test]
async fn test_http_hardware_rejected_falls_back_to_cpu() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/load"))
        .and(body_partial_json(serde_json::json!({"device": "accelerated"})))
        .respond_with(ResponseTemplate::new(501).set_body_string("no GPU"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/load"))
        .and(body_partial_json(serde_json::json!({"device": "cpu"})))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    mount_translation(&server, "Dal", "పప్పు").await;

    let runtime = http_runtime(&server, Device::PREFERENCE.to_vec());
    let translator = runtime.translator(LanguageCode::Telugu);

    assert_eq!(
        translator.translate("Dal", TranslateOptions::default()).await,
        "పప్పు"
    );
    assert_eq!(runtime.loader().state(), ModelState::Ready(Device::Cpu));
}

#[tokio::test]
async fn test_http_model_unavailable_passes_through() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/load"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let runtime = http_runtime(&server, Device::PREFERENCE.to_vec());
    let translator = runtime.translator(LanguageCode::Telugu);

    let result = translator
        .translate_batch(&texts(&["Recipes", "Shopping list"]))
        .await;

    assert_eq!(result, texts(&["Recipes", "Shopping list"]));
    assert!(translator.is_initialized());
    assert_eq!(runtime.loader().state(), ModelState::Failed);
    assert!(runtime.cache().is_empty());

    // Failed is terminal: no further load requests
    translator.translate("Recipes", TranslateOptions::default()).await;
}

#[tokio::test]
async fn test_http_batch_mixes_success_and_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/load"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    mount_translation(&server, "Rice", "అన్నం").await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .and(body_partial_json(serde_json::json!({"text": "Broken"})))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad input"))
        .mount(&server)
        .await;

    let runtime = http_runtime(&server, vec![Device::Cpu]);
    let translator = runtime.translator(LanguageCode::Telugu);

    let result = translator
        .translate_batch(&texts(&["Rice", "Broken", "Rice"]))
        .await;

    assert_eq!(result, texts(&["అన్నం", "Broken", "అన్నం"]));
    assert_eq!(runtime.cache().len(), 1);
    assert_eq!(runtime.metrics().passthroughs.inference_error, 1);
}

// ==================== Mock Engine Workflow ====================

#[tokio::test]
async fn test_page_render_flow() {
    let mock = MockEngineLoader::with_engine(
        MockEngine::new(Device::Accelerated)
            .with_mapping("Spicy tamarind rice", "tel_Telu", "కారమైన పులిహోర"),
    );
    let engine = mock.engine();
    let runtime = TranslationRuntime::new(Arc::new(mock));
    let translator = runtime.translator(LanguageCode::Telugu);

    // Chrome renders immediately from the dictionary
    assert_eq!(translator.static_lookup("Recipes"), "వంటకాలు");
    assert!(!translator.is_initialized());

    translator.initialize().await;

    let body = translator
        .translate_batch(&texts(&["Spicy tamarind rice", "Lemon rice"]))
        .await;
    assert_eq!(body, texts(&["కారమైన పులిహోర", "Lemon rice_tel_Telu"]));

    // Re-render is fully cached
    translator
        .translate_batch(&texts(&["Lemon rice", "Spicy tamarind rice"]))
        .await;
    assert_eq!(engine.calls(), 2);

    // Switching back to the source language short-circuits
    translator.set_language(LanguageCode::English);
    assert_eq!(
        translator.translate("Lemon rice", TranslateOptions::default()).await,
        "Lemon rice"
    );
    assert_eq!(translator.static_lookup("Recipes"), "Recipes");
    assert_eq!(engine.calls(), 2);
}

#[tokio::test]
async fn test_concurrent_translators_share_one_load() {
    let mock = Arc::new(
        MockEngineLoader::new().with_load_delay(std::time::Duration::from_millis(20)),
    );
    let runtime = TranslationRuntime::new(mock.clone());

    let translators: Vec<_> = (0..4)
        .map(|_| runtime.translator(LanguageCode::Telugu))
        .collect();
    let results = futures::future::join_all(
        translators
            .iter()
            .map(|t| t.translate("Dal", TranslateOptions::default())),
    )
    .await;

    assert!(results.iter().all(|r| r == "Dal_tel_Telu"));
    assert_eq!(mock.attempts(), vec![Device::Accelerated]);
}

#[tokio::test]
async fn test_initialize_timeout_keeps_single_load() {
    let mock = Arc::new(
        MockEngineLoader::new().with_load_delay(std::time::Duration::from_millis(80)),
    );
    let runtime = TranslationRuntime::new(mock.clone());
    let translator = runtime.translator(LanguageCode::Telugu);

    let gave_up = tokio::time::timeout(
        std::time::Duration::from_millis(10),
        translator.initialize(),
    )
    .await;
    assert!(gave_up.is_err());
    assert!(!translator.is_initialized());

    assert_eq!(
        translator.translate("Dal", TranslateOptions::default()).await,
        "Dal_tel_Telu"
    );
    assert_eq!(runtime.loader().state(), ModelState::Ready(Device::Accelerated));
    assert_eq!(mock.attempts(), vec![Device::Accelerated]);
}

#[test]
fn test_static_lookup_free_function() {
    assert_eq!(static_lookup("Languages", LanguageCode::Telugu), "భాషలు");
    assert_eq!(static_lookup("Unknown key", LanguageCode::Telugu), "Unknown key");
}

// ==================== Property Tests ====================

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_same_language_is_identity(text in "\\PC{0,40}") {
            let mock = MockEngineLoader::new();
            let engine = mock.engine();
            let runtime = TranslationRuntime::new(Arc::new(mock));
            let translator = runtime.translator(LanguageCode::English);

            let result = tokio_test::block_on(
                translator.translate(&text, TranslateOptions::default()),
            );

            prop_assert_eq!(result, text);
            prop_assert_eq!(engine.calls(), 0);
        }

        #[test]
        fn prop_batch_preserves_length_and_order(items in prop::collection::vec("[a-z]{1,8}", 0..12)) {
            let mock = MockEngineLoader::new();
            let runtime = TranslationRuntime::new(Arc::new(mock));
            let translator = runtime.translator(LanguageCode::Telugu);

            let result = tokio_test::block_on(translator.translate_batch(&items));

            prop_assert_eq!(result.len(), items.len());
            for (input, output) in items.iter().zip(&result) {
                prop_assert_eq!(output, &format!("{}_tel_Telu", input));
            }
        }

        #[test]
        fn prop_unknown_key_is_identity(key in "zz[A-Za-z ]{0,20}") {
            prop_assert_eq!(static_lookup(&key, LanguageCode::Telugu), key.as_str());
        }
    }
}
