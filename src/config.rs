//! Validated runtime configuration.
//!
//! [`Config::from_cli`] turns raw flags into typed values: the listen
//! address becomes a [`SocketAddr`], the status code a [`StatusCode`], and
//! missing echo text is rejected before anything binds a socket.

use std::net::SocketAddr;

use axum::http::StatusCode;

use crate::cli::{AccessLogFormat, Cli};
use crate::error::EchoError;
use crate::version::AppIdentity;

#[derive(Debug, Clone)]
pub struct Config {
    pub listen: SocketAddr,
    pub text: String,
    pub status_code: StatusCode,
    pub identity: AppIdentity,
    pub access_log: AccessLogFormat,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self, EchoError> {
        let text = cli
            .text
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(EchoError::MissingText)?
            .to_string();

        Ok(Self {
            listen: parse_listen(&cli.listen)?,
            text,
            status_code: parse_status(cli.status_code)?,
            identity: AppIdentity::new(&cli.app_name, &cli.app_version)?,
            access_log: cli.access_log,
        })
    }
}

/// Parse a listen address. A bare `:port` binds every IPv4 interface.
pub fn parse_listen(addr: &str) -> Result<SocketAddr, EchoError> {
    let full = if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_string()
    };
    full.parse().map_err(|source| EchoError::ListenAddress {
        addr: addr.to_string(),
        source,
    })
}

pub fn parse_status(code: u16) -> Result<StatusCode, EchoError> {
    StatusCode::from_u16(code).map_err(|_| EchoError::InvalidStatusCode(code))
}
