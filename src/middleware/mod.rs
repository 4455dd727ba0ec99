//! Handler decorators.
//!
//! Each decorator wraps a [`Handler`](crate::handler::Handler) and returns
//! another one, so they compose by nesting:
//!
//! ```rust,ignore
//! let handler = with_access_log(sink, with_app_headers(identity, StatusCode::OK, echo));
//! ```
//!
//! - [`app_headers`] -- identity headers plus a fixed status.
//! - [`capture`] -- writer proxy recording status and length.
//! - [`access_log`] -- one structured record per request.

pub mod access_log;
pub mod app_headers;
pub mod capture;

pub use access_log::{with_access_log, AccessRecord, JsonSink, RecordSink, TracingSink};
pub use app_headers::with_app_headers;
pub use capture::CaptureWriter;
