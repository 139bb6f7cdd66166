use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, info_span, Instrument};

use super::chunker::{chunk, Chunk};
use super::reduce::{concatenate, ReduceStrategy};
use super::schedule::{SequentialSchedule, Task};
use crate::config::Settings;
use crate::resilience::Orchestrator;
use crate::types::{BackendId, GenerationConfig, GenerationResult, Message};
use crate::{Error, ErrorContext, Result};

/// Placeholder replaced by the chunk text in user templates.
pub const TEXT_PLACEHOLDER: &str = "{text}";

pub const DEFAULT_MAX_CHUNK_CHARS: usize = 8000;

/// Knobs for [`DocumentPipeline`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub max_chunk_chars: usize,
    /// Delay before every chunk call after the first.
    pub pacing: Duration,
    /// Retries per backend, passed through to the orchestrator.
    pub retries: u32,
    /// Explicit backend order. `None` means the configured backend followed
    /// by every other backend.
    pub backend_order: Option<Vec<BackendId>>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            pacing: Duration::from_millis(500),
            retries: 2,
            backend_order: None,
        }
    }
}

impl PipelineOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_chunk_chars: settings.max_chunk_chars,
            pacing: settings.pacing_delay(),
            retries: settings.retries,
            backend_order: None,
        }
    }

    pub fn with_max_chunk_chars(mut self, max: usize) -> Self {
        self.max_chunk_chars = max;
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_backend_order(mut self, order: Vec<BackendId>) -> Self {
        self.backend_order = Some(order);
        self
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    pub content: String,
    pub chunk_count: usize,
    /// Backend that answered each call, in call order.
    pub backends: Vec<BackendId>,
}

/// Turns arbitrarily long text into one generated artifact.
///
/// Text that fits in one chunk costs exactly one orchestrator call. Longer
/// text is split on sentence boundaries and each chunk is sent in order,
/// with positional framing, through a paced [`SequentialSchedule`]. Any chunk
/// failure fails the whole run.
#[derive(Debug, Clone)]
pub struct DocumentPipeline {
    orchestrator: Arc<Orchestrator>,
    options: PipelineOptions,
}

impl DocumentPipeline {
    pub fn new(orchestrator: Arc<Orchestrator>, options: PipelineOptions) -> Self {
        Self {
            orchestrator,
            options,
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Process with plain ordered concatenation of chunk outputs.
    pub async fn process(
        &self,
        text: &str,
        system_prompt: &str,
        user_template: &str,
        config: &GenerationConfig,
    ) -> Result<String> {
        self.process_with(text, system_prompt, user_template, config, &ReduceStrategy::Concatenate)
            .await
            .map(|out| out.content)
    }

    pub async fn process_with(
        &self,
        text: &str,
        system_prompt: &str,
        user_template: &str,
        config: &GenerationConfig,
        reduce: &ReduceStrategy,
    ) -> Result<PipelineOutput> {
        validate_input(text, user_template)?;

        let order = self.backend_order(config);
        let chunks = chunk(text, self.options.max_chunk_chars);
        let total = chunks.len();
        info!(
            chars = text.chars().count(),
            chunks = total,
            reduce = reduce.name(),
            "processing document"
        );

        if total == 1 {
            let messages = vec![
                Message::system(system_prompt),
                Message::user(substitute(user_template, chunks[0].text)),
            ];
            let result = self
                .orchestrator
                .run(&messages, config, &order, self.options.retries)
                .await?;
            return Ok(PipelineOutput {
                content: result.content,
                chunk_count: 1,
                backends: vec![result.backend],
            });
        }

        let schedule = SequentialSchedule::new(self.options.pacing);
        let tasks: Vec<Task<'_, GenerationResult>> = chunks
            .iter()
            .map(|c| self.chunk_task(c, system_prompt, user_template, config, &order))
            .collect();
        let results = schedule.run(tasks).await?;

        let mut backends: Vec<BackendId> = results.iter().map(|r| r.backend).collect();
        let parts: Vec<&str> = results.iter().map(|r| r.content.as_str()).collect();
        let joined = concatenate(&parts);

        let content = match reduce {
            ReduceStrategy::Concatenate => joined,
            ReduceStrategy::Compose {
                system_prompt,
                user_template,
            } => {
                if !schedule.pacing().is_zero() {
                    tokio::time::sleep(schedule.pacing()).await;
                }
                let messages = vec![
                    Message::system(system_prompt.as_str()),
                    Message::user(substitute(user_template, &joined)),
                ];
                let composed = self
                    .orchestrator
                    .run(&messages, config, &order, self.options.retries)
                    .instrument(info_span!("compose", parts = total))
                    .await?;
                backends.push(composed.backend);
                composed.content
            }
        };

        Ok(PipelineOutput {
            content,
            chunk_count: total,
            backends,
        })
    }

    fn backend_order(&self, config: &GenerationConfig) -> Vec<BackendId> {
        self.options
            .backend_order
            .clone()
            .unwrap_or_else(|| BackendId::fallback_order(config.backend))
    }

    fn chunk_task<'a>(
        &'a self,
        chunk: &Chunk<'_>,
        system_prompt: &str,
        user_template: &str,
        config: &'a GenerationConfig,
        order: &'a [BackendId],
    ) -> Task<'a, GenerationResult> {
        let messages = vec![
            Message::system(system_prompt),
            Message::user(frame_part(user_template, chunk)),
        ];
        let span = info_span!("chunk", index = chunk.index, total = chunk.total);
        let orchestrator = &self.orchestrator;
        let retries = self.options.retries;
        Box::new(move || {
            async move { orchestrator.run(&messages, config, order, retries).await }
                .instrument(span)
                .boxed()
        })
    }
}

fn validate_input(text: &str, user_template: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(Error::input_with_context(
            "text is empty",
            ErrorContext::new()
                .with_field_path("text")
                .with_source("document_pipeline"),
        ));
    }
    if !user_template.contains(TEXT_PLACEHOLDER) {
        return Err(Error::input_with_context(
            format!("user template has no {} placeholder", TEXT_PLACEHOLDER),
            ErrorContext::new()
                .with_field_path("user_template")
                .with_source("document_pipeline"),
        ));
    }
    Ok(())
}

fn substitute(template: &str, text: &str) -> String {
    template.replacen(TEXT_PLACEHOLDER, text, 1)
}

/// User prompt for one chunk of a multi-chunk document.
fn frame_part(template: &str, chunk: &Chunk<'_>) -> String {
    let body = substitute(template, chunk.text);
    if chunk.total <= 1 {
        return body;
    }
    let mut prompt = String::with_capacity(body.len() + 128);
    if !chunk.is_first() {
        prompt.push_str(&format!(
            "This is part {} of {} of the article. ",
            chunk.index, chunk.total
        ));
    }
    prompt.push_str(&body);
    if !chunk.is_last() {
        prompt.push_str("\n\nProcess only this part and do not draw conclusions about the text as a whole.");
    }
    prompt
}
