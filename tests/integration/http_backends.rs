//! Wire-format tests for the built-in backends against a mock HTTP server.

use crate::mock_server::{MockServerFixture, OPENROUTER_PATH, YANDEX_PATH};
use article_digest::drivers::Backend;
use article_digest::{BackendId, Credentials, Error, ErrorCategory, GenerationConfig, Message};
use serde_json::json;

fn prompt() -> Vec<Message> {
    vec![Message::system("You summarize."), Message::user("Text to summarize.")]
}

#[tokio::test]
async fn yandex_request_shape_and_text_extraction() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_yandex_ok(
            "k1",
            "f1",
            json!({
                "modelUri": "gpt://f1/yandexgpt/latest",
                "completionOptions": { "stream": false, "maxTokens": 2000 },
                "messages": [
                    { "role": "system", "text": "You summarize." },
                    { "role": "user", "text": "Text to summarize." }
                ]
            }),
            "Summary.",
        )
        .await;

    let backend = fixture.yandex(&Credentials::default().with_yandex("k1", "f1"));
    let result = backend
        .complete(&prompt(), &GenerationConfig::new(BackendId::Yandex))
        .await
        .unwrap();

    assert_eq!(result.content, "Summary.");
    assert_eq!(result.backend, BackendId::Yandex);
    assert_eq!(result.model.as_deref(), Some("yandexgpt/latest"));
    mock.assert_async().await;
}

#[tokio::test]
async fn openrouter_sends_bearer_referer_and_model() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", OPENROUTER_PATH)
        .match_header("authorization", "Bearer or-key")
        .match_header("http-referer", "https://digest.example")
        .match_body(mockito::Matcher::PartialJson(json!({
            "model": "deepseek/deepseek-r1",
            "max_tokens": 2000,
            "messages": [
                { "role": "system", "content": "You summarize." },
                { "role": "user", "content": "Text to summarize." }
            ]
        })))
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Post."}}]}"#)
        .create_async()
        .await;

    let credentials = Credentials::default()
        .with_openrouter("or-key")
        .with_app_url("https://digest.example");
    let config = GenerationConfig::new(BackendId::OpenRouter).with_model("deepseek/deepseek-r1");
    let result = fixture
        .openrouter(&credentials)
        .complete(&prompt(), &config)
        .await
        .unwrap();

    assert_eq!(result.content, "Post.");
    assert_eq!(result.model.as_deref(), Some("deepseek/deepseek-r1"));
    mock.assert_async().await;
}

#[tokio::test]
async fn error_status_carries_provider_message() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json(OPENROUTER_PATH, 429, r#"{"error":{"message":"Rate limit exceeded"}}"#, 1)
        .await;

    let err = fixture
        .openrouter(&Credentials::default().with_openrouter("k"))
        .complete(&prompt(), &GenerationConfig::new(BackendId::OpenRouter))
        .await
        .unwrap_err();

    match &err {
        Error::Backend {
            backend,
            status,
            message,
        } => {
            assert_eq!(*backend, BackendId::OpenRouter);
            assert_eq!(*status, 429);
            assert_eq!(message, "Rate limit exceeded");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.category(), ErrorCategory::Quota);
}

#[tokio::test]
async fn non_json_error_body_is_truncated_raw_text() {
    let mut fixture = MockServerFixture::new().await;
    let raw = "<html>".to_string() + &"x".repeat(400);
    let _mock = fixture.mock_json(YANDEX_PATH, 502, &raw, 1).await;

    let err = fixture
        .yandex(&Credentials::default().with_yandex("k", "f"))
        .complete(&prompt(), &GenerationConfig::default())
        .await
        .unwrap_err();

    match err {
        Error::Backend { status, message, .. } => {
            assert_eq!(status, 502);
            assert!(message.starts_with("<html>"));
            assert_eq!(message.chars().count(), 200);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn malformed_success_body_is_a_backend_error() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture.mock_json(YANDEX_PATH, 200, "not json at all", 1).await;

    let err = fixture
        .yandex(&Credentials::default().with_yandex("k", "f"))
        .complete(&prompt(), &GenerationConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Backend { status: 200, .. }), "{err}");
}

#[tokio::test]
async fn blank_or_missing_text_is_an_empty_response() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json(OPENROUTER_PATH, 200, r#"{"choices":[{"message":{"content":"   "}}]}"#, 1)
        .await;
    let err = fixture
        .openrouter(&Credentials::default().with_openrouter("k"))
        .complete(&prompt(), &GenerationConfig::new(BackendId::OpenRouter))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EmptyResponse { backend: BackendId::OpenRouter }));

    let _mock = fixture.mock_json(YANDEX_PATH, 200, r#"{"result":{"alternatives":[]}}"#, 1).await;
    let err = fixture
        .yandex(&Credentials::default().with_yandex("k", "f"))
        .complete(&prompt(), &GenerationConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EmptyResponse { backend: BackendId::Yandex }));
}

#[tokio::test]
async fn missing_credentials_fail_before_any_request() {
    let mut fixture = MockServerFixture::new().await;
    let yandex_mock = fixture.mock_json(YANDEX_PATH, 200, "{}", 0).await;
    let openrouter_mock = fixture.mock_json(OPENROUTER_PATH, 200, "{}", 0).await;

    // Folder id alone is not enough.
    let partial = Credentials {
        yandex_folder_id: Some("f".into()),
        ..Credentials::default()
    };
    let err = fixture
        .yandex(&partial)
        .complete(&prompt(), &GenerationConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
    assert_eq!(err.category(), ErrorCategory::Configuration);

    let err = fixture
        .openrouter(&Credentials::default())
        .complete(&prompt(), &GenerationConfig::new(BackendId::OpenRouter))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));

    yandex_mock.assert_async().await;
    openrouter_mock.assert_async().await;
}

#[tokio::test]
async fn unreachable_host_is_a_network_error() {
    let backend = article_digest::drivers::HttpBackend::new(
        article_digest::drivers::YandexDriver::new(
            "http://127.0.0.1:1",
            &Credentials::default().with_yandex("k", "f"),
        ),
        article_digest::transport::HttpTransport::new(std::time::Duration::from_secs(2)).unwrap(),
    );
    let err = backend
        .complete(&prompt(), &GenerationConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Network(_)), "{err}");
}
