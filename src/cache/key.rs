//! Cache key: one entry per (resource, operation) pair.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub resource_id: String,
    pub operation: String,
}

impl CacheKey {
    pub fn new(resource_id: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            operation: operation.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "analyze:{}:{}", self.operation, self.resource_id)
    }
}
