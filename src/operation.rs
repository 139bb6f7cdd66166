//! Digest operations and their default prompts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::pipeline::ReduceStrategy;
use crate::{Error, ErrorContext};

/// What to produce from an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Short summary of what the article is about.
    About,
    /// Key points as a bulleted list.
    Thesis,
    /// Ready-to-publish channel post.
    Telegram,
    /// Full translation into Russian.
    Translate,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::About,
        Operation::Thesis,
        Operation::Telegram,
        Operation::Translate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::About => "about",
            Operation::Thesis => "thesis",
            Operation::Telegram => "telegram",
            Operation::Translate => "translate",
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            Operation::About => {
                "You are an editor who writes concise article summaries. \
                 Answer in 3-5 sentences in plain prose."
            }
            Operation::Thesis => {
                "You are an analyst who extracts the key points of an article. \
                 Answer with a bulleted list, one thesis per line."
            }
            Operation::Telegram => {
                "You are the author of a popular Telegram channel. \
                 Write engaging posts of at most 1000 characters."
            }
            Operation::Translate => {
                "You are a professional translator. Translate faithfully into Russian \
                 and keep the original paragraph structure."
            }
        }
    }

    /// User prompt template. Always contains `{text}`.
    pub fn user_template(&self) -> &'static str {
        match self {
            Operation::About => "Describe what this article is about:\n\n{text}",
            Operation::Thesis => "List the main theses of this article:\n\n{text}",
            Operation::Telegram => "Collect the key facts for a channel post from this text:\n\n{text}",
            Operation::Translate => "Translate the following text:\n\n{text}",
        }
    }

    pub fn reduce_strategy(&self) -> ReduceStrategy {
        match self {
            Operation::Telegram => ReduceStrategy::Compose {
                system_prompt: self.system_prompt().to_string(),
                user_template: "Write one channel post from these notes on consecutive parts \
                                of the same article:\n\n{text}"
                    .to_string(),
            },
            _ => ReduceStrategy::Concatenate,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "about" => Ok(Operation::About),
            "thesis" => Ok(Operation::Thesis),
            "telegram" => Ok(Operation::Telegram),
            "translate" => Ok(Operation::Translate),
            other => Err(Error::input_with_context(
                format!("unknown operation '{}'", other),
                ErrorContext::new()
                    .with_field_path("operation")
                    .with_details("expected one of: about, thesis, telegram, translate"),
            )),
        }
    }
}
