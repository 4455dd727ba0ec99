//! Build metadata and the application identity stamped on responses.
//!
//! The git commit comes from `build.rs`; name and version come from the
//! crate manifest and serve as defaults for `--app-name`/`--app-version`.

use axum::http::HeaderValue;

use crate::error::EchoError;

pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_COMMIT: &str = env!("HTTP_ECHO_GIT_COMMIT");

/// Version string shown by `--version`, e.g. `0.2.3 (a1b2c3d)`.
pub const DISPLAY_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("HTTP_ECHO_GIT_COMMIT"),
    ")"
);

/// Human-readable `name vX.Y.Z (commit)` line used in startup logs.
#[must_use]
pub fn human_version() -> String {
    format!("{NAME} v{VERSION} ({GIT_COMMIT})")
}

/// Application name and version, validated once as header values.
///
/// Cloning is cheap: `HeaderValue` is backed by `Bytes`.
#[derive(Debug, Clone)]
pub struct AppIdentity {
    name: HeaderValue,
    version: HeaderValue,
}

impl AppIdentity {
    pub fn new(name: &str, version: &str) -> Result<Self, EchoError> {
        Ok(Self {
            name: header_value("X-App-Name", name)?,
            version: header_value("X-App-Version", version)?,
        })
    }

    #[must_use]
    pub const fn name(&self) -> &HeaderValue {
        &self.name
    }

    #[must_use]
    pub const fn version(&self) -> &HeaderValue {
        &self.version
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, EchoError> {
    HeaderValue::from_str(value).map_err(|_| EchoError::InvalidHeaderValue {
        name,
        value: value.to_string(),
    })
}
