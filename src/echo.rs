//! The echo handler: writes the configured text followed by a newline.

use bytes::Bytes;

use crate::handler::{Handler, RequestContext, ResponseWriter};

/// Build a handler that answers every request with `text` and a trailing
/// newline.
pub fn echo_handler(text: &str) -> impl Handler {
    let body = Bytes::from(format!("{text}\n"));
    move |w: &mut dyn ResponseWriter, req: &RequestContext| {
        if let Err(e) = w.write(&body) {
            tracing::debug!(path = %req.path(), error = %e, "failed to write echo response");
        }
    }
}
