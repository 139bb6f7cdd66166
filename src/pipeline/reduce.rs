//! How per-chunk outputs become one result.

use serde::{Deserialize, Serialize};

/// Separator between per-chunk outputs.
pub const PART_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReduceStrategy {
    /// Ordered join with a blank line. No further model calls.
    #[default]
    Concatenate,
    /// Join the partial outputs, then make one more call that rewrites them
    /// into the final artifact. `user_template` receives the joined parts as
    /// `{text}`.
    Compose {
        system_prompt: String,
        user_template: String,
    },
}

impl ReduceStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            ReduceStrategy::Concatenate => "concatenate",
            ReduceStrategy::Compose { .. } => "compose",
        }
    }
}

pub fn concatenate<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(PART_SEPARATOR)
}
