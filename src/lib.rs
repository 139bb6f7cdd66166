//! # article-digest
//!
//! Resilient text generation over interchangeable LLM backends, with
//! sentence-bounded chunking for long articles and a TTL result cache.
//!
//! ## Overview
//!
//! A request flows through four layers:
//!
//! - **Backends**: each remote service is a [`drivers::Backend`] that completes
//!   a chat prompt. Yandex and OpenRouter are built in.
//! - **Resilience**: [`resilience::Orchestrator`] retries a backend with linear
//!   backoff, then falls back to the next one in order.
//! - **Pipeline**: [`pipeline::DocumentPipeline`] splits long text into chunks,
//!   processes them one at a time with pacing and combines the outputs.
//! - **Cache**: [`cache::ResultCache`] remembers artifacts per
//!   `(resource, operation)` for an hour.
//!
//! [`ArticleDigester`] wires all of them together.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use article_digest::{ArticleDigester, Credentials, Operation, Settings};
//!
//! #[tokio::main]
//! async fn main() -> article_digest::Result<()> {
//!     let settings = Settings::load(None)?;
//!     let digester = ArticleDigester::from_settings(&settings, &Credentials::resolve())?;
//!
//!     let article = std::fs::read_to_string("article.txt")?;
//!     let artifact = digester
//!         .digest("https://example.com/post", &article, Operation::About)
//!         .await?;
//!     println!("{}", artifact.content);
//!
//!     digester.shutdown();
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Messages, backend ids, generation config and results |
//! | [`config`] | Settings (YAML + environment) and credentials |
//! | [`transport`] | Shared HTTP client |
//! | [`drivers`] | Backend trait and the built-in wire formats |
//! | [`resilience`] | Retry policy and fallback orchestrator |
//! | [`pipeline`] | Chunking, paced scheduling and reduce strategies |
//! | [`cache`] | TTL result cache |
//! | [`operation`] | Digest operations and their prompts |
//! | [`service`] | Cached end-to-end digests |

pub mod cache;
pub mod config;
pub mod drivers;
pub mod error_category;
pub mod operation;
pub mod pipeline;
pub mod resilience;
pub mod service;
pub mod transport;
pub mod types;

pub use config::{Credentials, Settings};
pub use error_category::ErrorCategory;
pub use operation::Operation;
pub use service::{Artifact, ArticleDigester};
pub use types::{BackendId, GenerationConfig, GenerationResult, Message, MessageRole};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext, TransportError};
