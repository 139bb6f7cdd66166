//! Long-document processing: chunk, map through the orchestrator, reduce.
//!
//! ## Overview
//!
//! 1. [`chunk`] splits the text into sentence-bounded [`Chunk`]s.
//! 2. Each chunk becomes a system/user message pair; the user message is
//!    framed with its position when there is more than one chunk.
//! 3. A [`SequentialSchedule`] issues one orchestrator call per chunk, in
//!    order and paced, never in parallel.
//! 4. The [`ReduceStrategy`] combines the outputs: ordered concatenation,
//!    or concatenation followed by a single compose call.
//!
//! ```rust,no_run
//! use article_digest::pipeline::{DocumentPipeline, PipelineOptions};
//! use article_digest::resilience::Orchestrator;
//! use article_digest::GenerationConfig;
//! use std::sync::Arc;
//!
//! # async fn demo(orchestrator: Arc<Orchestrator>, article: &str) -> article_digest::Result<()> {
//! let pipeline = DocumentPipeline::new(orchestrator, PipelineOptions::default());
//! let summary = pipeline
//!     .process(article, "You summarize articles.", "Summarize:\n\n{text}", &GenerationConfig::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod chunker;
mod document;
mod reduce;
mod schedule;

pub use chunker::{chunk, sentences, Chunk};
pub use document::{
    DocumentPipeline, PipelineOptions, PipelineOutput, DEFAULT_MAX_CHUNK_CHARS, TEXT_PLACEHOLDER,
};
pub use reduce::{concatenate, ReduceStrategy, PART_SEPARATOR};
pub use schedule::{SequentialSchedule, Task};
