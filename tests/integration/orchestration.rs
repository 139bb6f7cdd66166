//! Retry and fallback ordering across scripted backends.

use crate::mock_server::{ScriptedBackend, Step};
use article_digest::drivers::BackendSet;
use article_digest::resilience::{Orchestrator, RetryPolicy};
use article_digest::{BackendId, Error, GenerationConfig, Message};
use std::sync::Arc;
use std::time::Duration;

const ORDER: [BackendId; 2] = [BackendId::Yandex, BackendId::OpenRouter];

fn orchestrator(
    primary: &Arc<ScriptedBackend>,
    secondary: &Arc<ScriptedBackend>,
    policy: RetryPolicy,
) -> Orchestrator {
    Orchestrator::new(
        BackendSet::new().with(primary.clone()).with(secondary.clone()),
        policy,
    )
}

fn prompt() -> Vec<Message> {
    vec![Message::system("sys"), Message::user("hello")]
}

#[tokio::test(start_paused = true)]
async fn falls_back_after_primary_uses_all_attempts() {
    let primary = Arc::new(ScriptedBackend::always_failing(BackendId::Yandex, 500));
    let secondary = Arc::new(ScriptedBackend::new(BackendId::OpenRouter, [Step::Reply("from fallback")]));
    let orch = orchestrator(&primary, &secondary, RetryPolicy::linear(Duration::from_secs(1)));

    let result = orch
        .run(&prompt(), &GenerationConfig::default(), &ORDER, 2)
        .await
        .unwrap();

    assert_eq!(result.content, "from fallback");
    assert_eq!(result.backend, BackendId::OpenRouter);
    assert_eq!(primary.call_count(), 3);
    assert_eq!(secondary.call_count(), 1);

    // Backoff of 1s then 2s on the primary, no delay before falling back.
    let first = primary.call_times()[0];
    let offsets: Vec<Duration> = primary.call_times()[1..]
        .iter()
        .chain(secondary.call_times().iter())
        .map(|t| *t - first)
        .collect();
    for (offset, expected) in offsets.iter().zip([1u64, 3, 3]) {
        assert!(*offset >= Duration::from_secs(expected), "{offset:?}");
        assert!(*offset < Duration::from_secs(expected) + Duration::from_millis(50), "{offset:?}");
    }
}

#[tokio::test]
async fn exhaustion_reports_total_attempts_and_last_error() {
    let primary = Arc::new(ScriptedBackend::always_failing(BackendId::Yandex, 500));
    let secondary = Arc::new(ScriptedBackend::always_failing(BackendId::OpenRouter, 503));
    let orch = orchestrator(&primary, &secondary, RetryPolicy::immediate());

    let err = orch
        .run(&prompt(), &GenerationConfig::default(), &ORDER, 2)
        .await
        .unwrap_err();

    match err {
        Error::AllBackendsExhausted { attempts, last_error } => {
            assert_eq!(attempts, 6);
            assert!(matches!(
                *last_error,
                Error::Backend {
                    backend: BackendId::OpenRouter,
                    status: 503,
                    ..
                }
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(primary.call_count(), 3);
    assert_eq!(secondary.call_count(), 3);
}

#[tokio::test]
async fn zero_retries_means_one_attempt_per_backend() {
    let primary = Arc::new(ScriptedBackend::always_failing(BackendId::Yandex, 500));
    let secondary = Arc::new(ScriptedBackend::always_failing(BackendId::OpenRouter, 500));
    let orch = orchestrator(&primary, &secondary, RetryPolicy::immediate());

    let err = orch
        .run(&prompt(), &GenerationConfig::default(), &ORDER, 0)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::AllBackendsExhausted { attempts: 2, .. }));
    assert_eq!((primary.call_count(), secondary.call_count()), (1, 1));
}

#[tokio::test]
async fn success_on_third_attempt_never_touches_fallback() {
    let primary = Arc::new(ScriptedBackend::new(
        BackendId::Yandex,
        [Step::Fail(500), Step::Fail(502), Step::Reply("third time")],
    ));
    let secondary = Arc::new(ScriptedBackend::new(BackendId::OpenRouter, Vec::new()));
    let orch = orchestrator(&primary, &secondary, RetryPolicy::immediate());

    let result = orch
        .run(&prompt(), &GenerationConfig::default(), &ORDER, 2)
        .await
        .unwrap();

    assert_eq!(result.content, "third time");
    assert_eq!(primary.call_count(), 3);
    assert_eq!(secondary.call_count(), 0);
}

#[tokio::test]
async fn fallback_does_not_reuse_the_primary_model() {
    let primary = Arc::new(ScriptedBackend::always_failing(BackendId::Yandex, 500));
    let secondary = Arc::new(ScriptedBackend::new(BackendId::OpenRouter, Vec::new()));
    let orch = orchestrator(&primary, &secondary, RetryPolicy::immediate());
    let config = GenerationConfig::new(BackendId::Yandex).with_model("yandexgpt-lite/latest");

    let result = orch.run(&prompt(), &config, &ORDER, 0).await.unwrap();

    assert_eq!(result.backend, BackendId::OpenRouter);
    assert_eq!(result.model, None);
}
