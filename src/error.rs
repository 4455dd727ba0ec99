//! Unified error type for http-echo.
//!
//! [`EchoError`] covers startup failures only: bad flags, an unusable
//! listen address, or I/O while binding and serving. Per-request
//! failures never surface here; they are HTTP responses.

use std::net::AddrParseError;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EchoError {
    #[error("Missing --text option or ECHO_TEXT env var")]
    MissingText,

    #[error("Invalid status code: {0} (expected 100-999)")]
    InvalidStatusCode(u16),

    #[error("Invalid listen address '{addr}': {source}")]
    ListenAddress {
        addr: String,
        #[source]
        source: AddrParseError,
    },

    #[error("Invalid value for header {name}: {value:?}")]
    InvalidHeaderValue { name: &'static str, value: String },

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl EchoError {
    /// Process exit code for this error.
    ///
    /// Usage errors exit with 127, everything else with 1.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::MissingText => 127,
            _ => 1,
        }
    }
}
