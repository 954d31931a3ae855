mod client;
mod stream;
pub mod types;

use std::fmt;

use reqwest::StatusCode;

pub use client::OpenAIClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    RateLimited,
    Server,
    Network,
    Timeout,
    Client,
    Cancelled,
    Unknown,
}

impl fmt::Display for LlmErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LlmErrorKind::RateLimited => "rate limited",
            LlmErrorKind::Server => "server error",
            LlmErrorKind::Network => "network error",
            LlmErrorKind::Timeout => "timeout",
            LlmErrorKind::Client => "client error",
            LlmErrorKind::Cancelled => "cancelled",
            LlmErrorKind::Unknown => "unknown error",
        };
        f.write_str(s)
    }
}

impl std::error::Error for LlmErrorKind {}

pub fn classify_error(status: Option<StatusCode>, err: &anyhow::Error) -> LlmErrorKind {
    if let Some(st) = status {
        if st == StatusCode::TOO_MANY_REQUESTS {
            return LlmErrorKind::RateLimited;
        }
        if st.is_server_error() {
            return LlmErrorKind::Server;
        }
        if st.is_client_error() {
            return LlmErrorKind::Client;
        }
    }
    if let Some(e) = err.downcast_ref::<reqwest::Error>() {
        if e.is_timeout() {
            return LlmErrorKind::Timeout;
        }
        if e.is_connect() || e.is_body() || e.is_request() {
            return LlmErrorKind::Network;
        }
    }
    LlmErrorKind::Unknown
}
