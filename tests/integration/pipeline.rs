//! End-to-end document processing over scripted backends.

use crate::mock_server::{ScriptedBackend, Step};
use article_digest::drivers::BackendSet;
use article_digest::pipeline::{DocumentPipeline, PipelineOptions, ReduceStrategy};
use article_digest::resilience::{Orchestrator, RetryPolicy};
use article_digest::{BackendId, Error, GenerationConfig};
use std::sync::Arc;
use std::time::Duration;

const SYSTEM: &str = "You summarize articles.";
const TEMPLATE: &str = "Summarize:\n\n{text}";

fn pipeline(backend: &Arc<ScriptedBackend>, retries: u32) -> DocumentPipeline {
    let orchestrator = Orchestrator::new(BackendSet::new().with(backend.clone()), RetryPolicy::immediate());
    DocumentPipeline::new(
        Arc::new(orchestrator),
        PipelineOptions::default()
            .with_retries(retries)
            .with_backend_order(vec![BackendId::Yandex]),
    )
}

/// `count` sentences of exactly 50 characters each.
fn article(count: usize) -> String {
    (0..count).map(|_| format!("{}. ", "w".repeat(48))).collect()
}

#[tokio::test]
async fn short_text_costs_one_unframed_call() {
    let backend = Arc::new(ScriptedBackend::new(BackendId::Yandex, [Step::Reply("short summary")]));
    let text = article(10);
    assert_eq!(text.chars().count(), 500);

    let out = pipeline(&backend, 2)
        .process(&text, SYSTEM, TEMPLATE, &GenerationConfig::default())
        .await
        .unwrap();

    assert_eq!(out, "short summary");
    assert_eq!(backend.prompts(), vec![format!("Summarize:\n\n{}", text)]);
}

#[tokio::test(start_paused = true)]
async fn long_text_is_chunked_paced_and_joined_in_order() {
    let backend = Arc::new(ScriptedBackend::new(BackendId::Yandex, Vec::new()));
    let text = article(400);
    assert_eq!(text.chars().count(), 20_000);

    let out = pipeline(&backend, 2)
        .process_with(&text, SYSTEM, TEMPLATE, &GenerationConfig::default(), &ReduceStrategy::Concatenate)
        .await
        .unwrap();

    assert_eq!(out.content, "out1\n\nout2\n\nout3");
    assert_eq!(out.chunk_count, 3);
    assert_eq!(out.backends, vec![BackendId::Yandex; 3]);

    let prompts = backend.prompts();
    assert_eq!(prompts.len(), 3);
    assert!(prompts[0].starts_with("Summarize:\n\n"));
    assert!(prompts[0].ends_with("do not draw conclusions about the text as a whole."));
    assert!(prompts[1].starts_with("This is part 2 of 3 of the article. Summarize:"));
    assert!(prompts[2].starts_with("This is part 3 of 3 of the article. Summarize:"));
    assert!(!prompts[2].contains("do not draw conclusions"));

    // One call at a time, 500ms apart.
    let times = backend.call_times();
    for pair in times.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_millis(500));
    }
}

#[tokio::test(start_paused = true)]
async fn failing_chunk_aborts_the_document() {
    let backend = Arc::new(ScriptedBackend::new(
        BackendId::Yandex,
        [Step::Reply("first"), Step::Fail(500)],
    ));

    let err = pipeline(&backend, 0)
        .process(&article(400), SYSTEM, TEMPLATE, &GenerationConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::AllBackendsExhausted { attempts: 1, .. }));
    assert_eq!(backend.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn compose_makes_one_extra_call_over_the_joined_parts() {
    let backend = Arc::new(ScriptedBackend::new(BackendId::Yandex, Vec::new()));
    let compose = ReduceStrategy::Compose {
        system_prompt: "Write a post.".into(),
        user_template: "Notes:\n{text}".into(),
    };

    let out = pipeline(&backend, 0)
        .process_with(&article(400), SYSTEM, TEMPLATE, &GenerationConfig::default(), &compose)
        .await
        .unwrap();

    assert_eq!(out.content, "out4");
    assert_eq!(out.chunk_count, 3);
    assert_eq!(out.backends.len(), 4);
    assert_eq!(backend.prompts()[3], "Notes:\nout1\n\nout2\n\nout3");
}

#[tokio::test]
async fn compose_is_skipped_for_a_single_chunk() {
    let backend = Arc::new(ScriptedBackend::new(BackendId::Yandex, Vec::new()));
    let compose = ReduceStrategy::Compose {
        system_prompt: "Write a post.".into(),
        user_template: "Notes:\n{text}".into(),
    };

    let out = pipeline(&backend, 0)
        .process_with("One short sentence.", SYSTEM, TEMPLATE, &GenerationConfig::default(), &compose)
        .await
        .unwrap();

    assert_eq!(out.content, "out1");
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn invalid_input_makes_no_calls() {
    let backend = Arc::new(ScriptedBackend::new(BackendId::Yandex, Vec::new()));
    let p = pipeline(&backend, 2);

    let empty = p
        .process("   ", SYSTEM, TEMPLATE, &GenerationConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(empty, Error::Input { .. }));

    let no_slot = p
        .process("Text.", SYSTEM, "Summarize please", &GenerationConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(no_slot, Error::Input { .. }));

    assert_eq!(backend.call_count(), 0);
}
