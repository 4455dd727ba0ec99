//! The real response sink behind every writer-style handler.
//!
//! [`BufferedResponse`] collects status, headers and body in memory and
//! converts into an axum [`Response`] once the handler returns. It keeps
//! the usual HTTP/1.1 server rules so handlers behave the same as they
//! would against a streaming writer:
//!
//! - the first status commit wins, later ones are ignored,
//! - headers are frozen when the status is committed,
//! - writing body bytes before committing commits `200 OK`.

use std::io;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use bytes::BytesMut;

use crate::handler::ResponseWriter;

#[derive(Debug, Default)]
pub struct BufferedResponse {
    headers: HeaderMap,
    committed: Option<(StatusCode, HeaderMap)>,
    body: BytesMut,
}

impl BufferedResponse {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Status committed so far, if any.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.committed.as_ref().map(|(status, _)| *status)
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Finish the response. Uncommitted responses go out as an empty
    /// `200 OK` carrying whatever headers were set.
    #[must_use]
    pub fn into_response(self) -> Response {
        let (status, mut headers) = self
            .committed
            .unwrap_or((StatusCode::OK, self.headers));

        if !self.body.is_empty() && !headers.contains_key(header::CONTENT_TYPE) {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            );
        }

        let mut response = Response::new(Body::from(self.body.freeze()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

impl ResponseWriter for BufferedResponse {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_header(&mut self, status: StatusCode) {
        if let Some((current, _)) = &self.committed {
            tracing::warn!(
                current = current.as_u16(),
                ignored = status.as_u16(),
                "superfluous status commit"
            );
            return;
        }
        self.committed = Some((status, self.headers.clone()));
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.committed.is_none() {
            self.write_header(StatusCode::OK);
        }
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }
}
