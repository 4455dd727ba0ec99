//! Structured access logging.
//!
//! [`with_access_log`] wraps a handler so that every invocation produces
//! exactly one [`AccessRecord`]. The inner handler writes through a
//! [`CaptureWriter`]; a drop guard assembles the record once the handler
//! returns or unwinds, so a panicking handler is still logged before the
//! panic continues up the stack.
//!
//! Records go to a [`RecordSink`]. Two are provided:
//!
//! | Sink | Output |
//! |------|--------|
//! | [`TracingSink`] | one `tracing` INFO event, target `http_echo::access` |
//! | [`JsonSink`] | one JSON object per line, every attribute top-level |
//!
//! Request headers are logged one attribute per distinct name as
//! `header_<name>`, lower-cased with `-` turned into `_`. A header sent
//! more than once is rendered as `[v1, v2]`. `Host` is skipped since it
//! already appears as `host`.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use axum::http::{header, HeaderMap, StatusCode};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::Level;

use crate::handler::{Handler, RequestContext, ResponseWriter};
use crate::middleware::capture::CaptureWriter;

/// One request/response cycle, ready to be emitted.
#[derive(Debug, Clone, Serialize)]
pub struct AccessRecord {
    pub host: String,
    pub remote_addr: String,
    pub method: String,
    pub path: String,
    pub protocol: String,
    /// `0` when the handler neither committed a status nor wrote a body.
    pub status_code: u16,
    /// Size of the last body write.
    pub response_length: usize,
    pub user_agent: String,
    pub duration_ms: u64,
    #[serde(flatten)]
    pub headers: HeaderAttrs,
}

impl AccessRecord {
    #[must_use]
    pub fn new(
        req: &RequestContext,
        status: Option<StatusCode>,
        response_length: usize,
        elapsed: Duration,
    ) -> Self {
        Self {
            host: req.host().to_string(),
            remote_addr: req
                .remote_addr()
                .map(|addr| addr.to_string())
                .unwrap_or_default(),
            method: req.method().to_string(),
            path: req.path().to_string(),
            protocol: req.protocol(),
            status_code: status.map_or(0, |s| s.as_u16()),
            response_length,
            user_agent: req.user_agent().to_string(),
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            headers: HeaderAttrs::from_headers(req.headers()),
        }
    }
}

/// Header-derived attributes, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderAttrs(Vec<(String, String)>);

impl HeaderAttrs {
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let attrs = headers
            .keys()
            .filter(|name| **name != header::HOST)
            .map(|name| {
                let values: Vec<String> = headers
                    .get_all(name)
                    .iter()
                    .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                    .collect();
                (attribute_name(name.as_str()), render_values(&values))
            })
            .collect();
        Self(attrs)
    }

    /// Value of an attribute by its full name, e.g. `header_accept`.
    #[must_use]
    pub fn get(&self, attr: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == attr)
            .map(|(_, value)| value.as_str())
    }
}

impl Serialize for HeaderAttrs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Renders as a JSON object so the whole set fits in one tracing field.
impl fmt::Display for HeaderAttrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => f.write_str("{}"),
        }
    }
}

/// `User-Agent` -> `header_user_agent`.
#[must_use]
pub fn attribute_name(header_name: &str) -> String {
    format!("header_{}", header_name.to_ascii_lowercase().replace('-', "_"))
}

/// One value as-is, several as `[a, b]`.
#[must_use]
pub fn render_values(values: &[String]) -> String {
    match values {
        [] => String::new(),
        [single] => single.clone(),
        many => format!("[{}]", many.join(", ")),
    }
}

/// Destination for access records.
///
/// Emission is best-effort: implementations swallow their own failures and
/// must not panic, since they also run while a handler panic unwinds.
pub trait RecordSink: Send + Sync {
    fn emit(&self, record: &AccessRecord);
}

/// Emits each record as a `tracing` INFO event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl RecordSink for TracingSink {
    fn emit(&self, record: &AccessRecord) {
        tracing::info!(
            target: "http_echo::access",
            host = %record.host,
            remote_addr = %record.remote_addr,
            method = %record.method,
            path = %record.path,
            protocol = %record.protocol,
            status_code = record.status_code,
            response_length = record.response_length,
            user_agent = %record.user_agent,
            duration_ms = record.duration_ms,
            headers = %record.headers,
            "request"
        );
    }
}

/// Writes each record as one JSON line to `W`.
///
/// Records are INFO; a sink whose max level is below that writes nothing,
/// the same way the tracing subscriber would drop them.
#[derive(Debug)]
pub struct JsonSink<W> {
    out: Mutex<W>,
    max_level: Level,
}

#[derive(Serialize)]
struct JsonLine<'a> {
    ts: u64,
    level: &'static str,
    msg: &'static str,
    #[serde(flatten)]
    record: &'a AccessRecord,
}

impl<W: Write + Send> JsonSink<W> {
    pub const fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            max_level: Level::TRACE,
        }
    }

    #[must_use]
    pub fn with_max_level(mut self, level: Level) -> Self {
        self.max_level = level;
        self
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> RecordSink for JsonSink<W> {
    fn emit(&self, record: &AccessRecord) {
        if Level::INFO > self.max_level {
            return;
        }
        let line = JsonLine {
            ts: unix_ms(),
            level: "INFO",
            msg: "request",
            record,
        };
        let Ok(mut buf) = serde_json::to_vec(&line) else {
            return;
        };
        buf.push(b'\n');

        let Ok(mut out) = self.out.lock() else {
            return;
        };
        let _ = out.write_all(&buf);
        let _ = out.flush();
    }
}

fn unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Handler returned by [`with_access_log`].
pub struct AccessLog<H> {
    sink: Arc<dyn RecordSink>,
    inner: H,
}

/// Log one [`AccessRecord`] per invocation of `inner` to `sink`.
pub fn with_access_log<H: Handler>(sink: Arc<dyn RecordSink>, inner: H) -> AccessLog<H> {
    AccessLog { sink, inner }
}

impl<H: Handler> Handler for AccessLog<H> {
    fn serve(&self, w: &mut dyn ResponseWriter, req: &RequestContext) {
        let mut pending = PendingRecord {
            request: req,
            sink: self.sink.as_ref(),
            started: Instant::now(),
            writer: CaptureWriter::new(w),
        };
        self.inner.serve(&mut pending.writer, req);
    }
}

/// Emits the record when dropped, on return or unwind alike.
struct PendingRecord<'a> {
    request: &'a RequestContext,
    sink: &'a dyn RecordSink,
    started: Instant,
    writer: CaptureWriter<'a>,
}

impl Drop for PendingRecord<'_> {
    fn drop(&mut self) {
        let record = AccessRecord::new(
            self.request,
            self.writer.status(),
            self.writer.length(),
            self.started.elapsed(),
        );
        self.sink.emit(&record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::app_headers::with_app_headers;
    use crate::response::BufferedResponse;
    use crate::version::AppIdentity;
    use axum::http::{HeaderValue, Method, Uri, Version};
    use std::panic::{self, AssertUnwindSafe};

    #[derive(Default)]
    struct MemorySink(Mutex<Vec<AccessRecord>>);

    impl MemorySink {
        fn records(&self) -> Vec<AccessRecord> {
            self.0.lock().unwrap().clone()
        }
    }

    impl RecordSink for MemorySink {
        fn emit(&self, record: &AccessRecord) {
            self.0.lock().unwrap().push(record.clone());
        }
    }

    fn request(path: &str, headers: HeaderMap) -> RequestContext {
        RequestContext::new(
            Method::GET,
            &path.parse::<Uri>().unwrap(),
            Version::HTTP_11,
            headers,
            Some("10.1.2.3:40000".parse().unwrap()),
        )
    }

    fn run<H: Handler>(handler: H, req: &RequestContext) -> (Vec<AccessRecord>, BufferedResponse) {
        let sink = Arc::new(MemorySink::default());
        let logged = with_access_log(sink.clone(), handler);
        let mut res = BufferedResponse::new();
        logged.serve(&mut res, req);
        (sink.records(), res)
    }

    #[test]
    fn attribute_names_are_normalized() {
        assert_eq!(attribute_name("User-Agent"), "header_user_agent");
        assert_eq!(attribute_name("x-forwarded-for"), "header_x_forwarded_for");
        assert_eq!(attribute_name("accept"), "header_accept");
    }

    #[test]
    fn multiple_values_are_bracketed() {
        assert_eq!(render_values(&[]), "");
        assert_eq!(render_values(&["a".into()]), "a");
        assert_eq!(render_values(&["a".into(), "b".into()]), "[a, b]");
    }

    #[test]
    fn one_attribute_per_distinct_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("echo.local"));
        headers.append(header::ACCEPT, HeaderValue::from_static("a"));
        headers.append(header::ACCEPT, HeaderValue::from_static("b"));
        headers.insert("x-request-id", HeaderValue::from_static("r-1"));

        let attrs = HeaderAttrs::from_headers(&headers);

        let json = serde_json::to_value(&attrs).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 2);
        assert_eq!(attrs.get("header_accept"), Some("[a, b]"));
        assert_eq!(attrs.get("header_x_request_id"), Some("r-1"));
        assert_eq!(attrs.get("header_host"), None);
    }

    #[test]
    fn body_without_commit_logs_ok_and_length() {
        let req = request("/", HeaderMap::new());
        let (records, _) = run(
            |w: &mut dyn ResponseWriter, _: &RequestContext| {
                let _ = w.write(b"ok");
            },
            &req,
        );

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status_code, 200);
        assert_eq!(records[0].response_length, 2);
    }

    #[test]
    fn explicit_no_content_logs_zero_length() {
        let req = request("/healthz", HeaderMap::new());
        let (records, res) = run(
            |w: &mut dyn ResponseWriter, _: &RequestContext| {
                w.write_header(StatusCode::NO_CONTENT);
            },
            &req,
        );

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, "/healthz");
        assert_eq!(records[0].status_code, 204);
        assert_eq!(records[0].response_length, 0);
        assert_eq!(res.status(), Some(StatusCode::NO_CONTENT));
    }

    #[test]
    fn multiple_writes_log_once_with_last_chunk() {
        let req = request("/", HeaderMap::new());
        let (records, res) = run(
            |w: &mut dyn ResponseWriter, _: &RequestContext| {
                let _ = w.write(b"first chunk, ");
                let _ = w.write(b"last");
            },
            &req,
        );

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].response_length, 4);
        assert_eq!(res.body(), b"first chunk, last");
    }

    #[test]
    fn silent_handler_still_logs() {
        let req = request("/", HeaderMap::new());
        let (records, _) = run(|_: &mut dyn ResponseWriter, _: &RequestContext| {}, &req);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status_code, 0);
        assert_eq!(records[0].response_length, 0);
    }

    #[test]
    fn panicking_handler_is_logged_and_panic_propagates() {
        let sink = Arc::new(MemorySink::default());
        let logged = with_access_log(
            sink.clone(),
            |w: &mut dyn ResponseWriter, _: &RequestContext| {
                w.write_header(StatusCode::ACCEPTED);
                panic!("handler blew up");
            },
        );
        let req = request("/boom", HeaderMap::new());

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut res = BufferedResponse::new();
            logged.serve(&mut res, &req);
        }));

        assert!(result.is_err());
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, "/boom");
        assert_eq!(records[0].status_code, 202);
    }

    #[test]
    fn fixed_fields_come_from_the_request() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("echo.local:5678"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.4.0"));
        let req = request("/hello?x=1", headers);

        let (records, _) = run(
            |w: &mut dyn ResponseWriter, _: &RequestContext| {
                let _ = w.write(b"hi\n");
            },
            &req,
        );
        let record = &records[0];

        assert_eq!(record.host, "echo.local:5678");
        assert_eq!(record.remote_addr, "10.1.2.3:40000");
        assert_eq!(record.method, "GET");
        assert_eq!(record.path, "/hello");
        assert_eq!(record.protocol, "HTTP/1.1");
        assert_eq!(record.user_agent, "curl/8.4.0");
        assert_eq!(record.headers.get("header_user_agent"), Some("curl/8.4.0"));
    }

    #[test]
    fn duration_covers_the_handler() {
        let req = request("/", HeaderMap::new());
        let outer = Instant::now();
        let (records, _) = run(
            |w: &mut dyn ResponseWriter, _: &RequestContext| {
                std::thread::sleep(Duration::from_millis(25));
                let _ = w.write(b".");
            },
            &req,
        );
        let outer_ms = u64::try_from(outer.elapsed().as_millis()).unwrap();

        assert!(records[0].duration_ms >= 25);
        assert!(records[0].duration_ms <= outer_ms);
    }

    #[test]
    fn composed_with_app_headers() {
        let req = request("/", HeaderMap::new());
        let handler = with_app_headers(
            AppIdentity::new("echo", "1.2.3").unwrap(),
            StatusCode::CREATED,
            |w: &mut dyn ResponseWriter, _: &RequestContext| {
                let _ = w.write(b"made");
            },
        );
        let (records, res) = run(handler, &req);

        assert_eq!(records[0].status_code, 201);
        assert_eq!(records[0].response_length, 4);
        let response = res.into_response();
        assert_eq!(response.headers()["x-app-name"], "echo");
        assert_eq!(response.headers()["x-app-version"], "1.2.3");
    }

    #[test]
    fn json_sink_flattens_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::ACCEPT, HeaderValue::from_static("text/plain"));
        headers.append(header::ACCEPT, HeaderValue::from_static("*/*"));
        let req = request("/json", headers);
        let record = AccessRecord::new(&req, Some(StatusCode::OK), 3, Duration::from_millis(7));

        let sink = JsonSink::new(Vec::new());
        sink.emit(&record);
        sink.emit(&record);
        let out = String::from_utf8(sink.into_inner()).unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["level"], "INFO");
        assert_eq!(value["msg"], "request");
        assert_eq!(value["path"], "/json");
        assert_eq!(value["status_code"], 200);
        assert_eq!(value["response_length"], 3);
        assert_eq!(value["duration_ms"], 7);
        assert_eq!(value["header_accept"], "[text/plain, */*]");
    }

    #[test]
    fn json_sink_respects_max_level() {
        let req = request("/quiet", HeaderMap::new());
        let record = AccessRecord::new(&req, Some(StatusCode::OK), 0, Duration::ZERO);

        let quiet = JsonSink::new(Vec::new()).with_max_level(Level::WARN);
        quiet.emit(&record);
        assert!(quiet.into_inner().is_empty());

        let info = JsonSink::new(Vec::new()).with_max_level(Level::INFO);
        info.emit(&record);
        assert_eq!(info.into_inner().iter().filter(|b| **b == b'\n').count(), 1);
    }

    #[test]
    fn header_attrs_display_as_json_object() {
        let mut headers = HeaderMap::new();
        headers.insert("x-a", HeaderValue::from_static("1"));
        let attrs = HeaderAttrs::from_headers(&headers);

        assert_eq!(attrs.to_string(), r#"{"header_x_a":"1"}"#);
    }
}
