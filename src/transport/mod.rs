//! HTTP transport shared by every backend driver.

mod http;

pub use http::{HttpReply, HttpTransport};
