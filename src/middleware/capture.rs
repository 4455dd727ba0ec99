//! Response-capturing writer proxy.

use std::io;

use axum::http::{HeaderMap, StatusCode};

use crate::handler::ResponseWriter;

/// Wraps another [`ResponseWriter`] and remembers the status and length of
/// what passed through it. Every call is forwarded unchanged.
///
/// `length` holds the size of the most recent write only, not a running
/// total.
pub struct CaptureWriter<'a> {
    inner: &'a mut dyn ResponseWriter,
    status: Option<StatusCode>,
    length: usize,
}

impl<'a> CaptureWriter<'a> {
    pub fn new(inner: &'a mut dyn ResponseWriter) -> Self {
        Self {
            inner,
            status: None,
            length: 0,
        }
    }

    /// Recorded status, `None` if the handler neither committed nor wrote.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        self.status
    }

    #[must_use]
    pub const fn length(&self) -> usize {
        self.length
    }
}

impl ResponseWriter for CaptureWriter<'_> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_header(&mut self, status: StatusCode) {
        self.status = Some(status);
        self.inner.write_header(status);
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.length = buf.len();
        self.inner.write(buf)
    }
}
