//! Core data types shared by the backends, the orchestrator and the pipeline.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | Prompt message with role and text content |
//! | [`MessageRole`] | system, user or assistant |
//! | [`BackendId`] | Closed set of generation backends |
//! | [`GenerationConfig`] | Backend, model, temperature and output budget for one call |
//! | [`GenerationResult`] | Generated text plus the backend/model that produced it |

pub mod generation;
pub mod message;

pub use generation::{BackendId, GenerationConfig, GenerationResult};
pub use message::{Message, MessageRole};
