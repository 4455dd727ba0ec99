//! `GET /health` endpoint handler.
//!
//! Writes a fixed [`HealthResponse`] JSON payload. The status line and
//! identity headers are committed by the surrounding middleware, so this
//! handler only produces the body.

use serde::{Deserialize, Serialize};

use crate::handler::{RequestContext, ResponseWriter};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

pub fn health_handler(w: &mut dyn ResponseWriter, _req: &RequestContext) {
    match serde_json::to_vec(&HealthResponse::ok()) {
        Ok(body) => {
            if let Err(e) = w.write(&body) {
                tracing::debug!(error = %e, "failed to write health response");
            }
        }
        Err(e) => tracing::error!(error = %e, "failed to encode health response"),
    }
}
