//! Writer-style handler model and its axum adapter.
//!
//! Handlers here do not return a response value. They receive a
//! [`ResponseWriter`] and drive it: mutate headers, commit a status, write
//! body bytes. Middleware can then substitute its own writer to observe
//! what the handler did, which is how the access log captures status and
//! length without touching the bytes sent to the client.
//!
//! [`into_route`] bridges this model into axum: it builds a
//! [`RequestContext`] from the incoming request, runs the handler against a
//! [`BufferedResponse`](crate::response::BufferedResponse) and hands the
//! result back to hyper.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request};
use axum::http::{header, HeaderMap, Method, StatusCode, Version};
use axum::response::Response;
use axum::routing::{any, MethodRouter};

use crate::response::BufferedResponse;

/// The sink a handler writes its response into.
///
/// Implemented by the real buffered response and by any proxy that wraps
/// one. Object safe so decorators can swap writers at runtime.
pub trait ResponseWriter {
    /// Response headers. Changes after the status is committed may be
    /// ignored by the underlying transport.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Commit the status line.
    fn write_header(&mut self, status: StatusCode);

    /// Append body bytes, committing `200 OK` first if no status was set.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
}

/// A request handler in the writer style.
///
/// Automatically implemented for closures with the matching signature, so
/// most handlers are plain functions or `move` closures.
pub trait Handler: Send + Sync + 'static {
    fn serve(&self, w: &mut dyn ResponseWriter, req: &RequestContext);
}

impl<F> Handler for F
where
    F: Fn(&mut dyn ResponseWriter, &RequestContext) + Send + Sync + 'static,
{
    fn serve(&self, w: &mut dyn ResponseWriter, req: &RequestContext) {
        self(w, req);
    }
}

/// Read-only view of an inbound request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    host: String,
    remote_addr: Option<SocketAddr>,
    method: Method,
    path: String,
    version: Version,
    headers: HeaderMap,
}

impl RequestContext {
    /// Build a context from request parts; `remote_addr` is the peer socket
    /// when the transport knows it.
    #[must_use]
    pub fn new(
        method: Method,
        uri: &axum::http::Uri,
        version: Version,
        headers: HeaderMap,
        remote_addr: Option<SocketAddr>,
    ) -> Self {
        let host = uri
            .authority()
            .map(|a| a.as_str().to_string())
            .or_else(|| {
                headers
                    .get(header::HOST)
                    .and_then(|v| v.to_str().ok())
                    .map(String::from)
            })
            .unwrap_or_default();

        Self {
            host,
            remote_addr,
            method,
            path: uri.path().to_string(),
            version,
            headers,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub const fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Protocol as it appears on the request line, e.g. `HTTP/1.1`.
    #[must_use]
    pub fn protocol(&self) -> String {
        format!("{:?}", self.version)
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// `User-Agent` header, or an empty string.
    pub fn user_agent(&self) -> &str {
        self.headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }
}

/// Mount a writer-style handler as an axum method router accepting every
/// method.
pub fn into_route<H: Handler>(handler: H) -> MethodRouter {
    let handler = Arc::new(handler);
    any(move |req: Request| {
        let handler = Arc::clone(&handler);
        async move { dispatch(handler.as_ref(), req) }
    })
}

fn dispatch<H: Handler + ?Sized>(handler: &H, req: Request) -> Response {
    let (parts, _body) = req.into_parts();
    let remote_addr = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ctx = RequestContext::new(
        parts.method,
        &parts.uri,
        parts.version,
        parts.headers,
        remote_addr,
    );

    let mut sink = BufferedResponse::new();
    handler.serve(&mut sink, &ctx);
    sink.into_response()
}
