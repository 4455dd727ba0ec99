//! Stamps responses with the application identity.

use axum::http::{HeaderName, StatusCode};

use crate::handler::{Handler, RequestContext, ResponseWriter};
use crate::version::AppIdentity;

pub const X_APP_NAME: HeaderName = HeaderName::from_static("x-app-name");
pub const X_APP_VERSION: HeaderName = HeaderName::from_static("x-app-version");

/// Handler returned by [`with_app_headers`].
pub struct AppHeaders<H> {
    identity: AppIdentity,
    status: StatusCode,
    inner: H,
}

/// Set `X-App-Name` and `X-App-Version`, commit `status`, then run `inner`
/// with the same writer and request.
pub fn with_app_headers<H: Handler>(
    identity: AppIdentity,
    status: StatusCode,
    inner: H,
) -> AppHeaders<H> {
    AppHeaders {
        identity,
        status,
        inner,
    }
}

impl<H: Handler> Handler for AppHeaders<H> {
    fn serve(&self, w: &mut dyn ResponseWriter, req: &RequestContext) {
        let headers = w.headers_mut();
        headers.insert(X_APP_NAME, self.identity.name().clone());
        headers.insert(X_APP_VERSION, self.identity.version().clone());
        w.write_header(self.status);
        self.inner.serve(w, req);
    }
}
