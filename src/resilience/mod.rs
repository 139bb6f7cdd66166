//! Retry and fallback across generation backends.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`RetryPolicy`] | Linear backoff between attempts on the same backend |
//! | [`AttemptState`] | Position in the (backend, attempt) grid and its transitions |
//! | [`Orchestrator`] | Runs a prompt against an ordered backend list |
//!
//! ```rust,no_run
//! use article_digest::drivers::BackendSet;
//! use article_digest::resilience::{Orchestrator, RetryPolicy};
//! use article_digest::{BackendId, GenerationConfig, Message};
//! use std::time::Duration;
//!
//! # async fn demo(backends: BackendSet) -> article_digest::Result<()> {
//! let orchestrator = Orchestrator::new(backends, RetryPolicy::linear(Duration::from_secs(1)));
//! let messages = vec![Message::system("Summarize."), Message::user("...")];
//! let result = orchestrator
//!     .run(&messages, &GenerationConfig::default(), &BackendId::fallback_order(BackendId::Yandex), 2)
//!     .await?;
//! println!("{} answered: {}", result.backend, result.content);
//! # Ok(())
//! # }
//! ```

mod orchestrator;
mod retry;

pub use orchestrator::Orchestrator;
pub use retry::{AttemptState, RetryPolicy, Transition};
