//! Process configuration: tunables from YAML/environment and backend credentials.
//!
//! Both are loaded once at start-up and then shared read-only.

mod credentials;
mod settings;

pub use credentials::Credentials;
pub use settings::{Settings, MAX_CACHE_SWEEP_INTERVAL_SECS, MAX_CACHE_TTL_SECS};
