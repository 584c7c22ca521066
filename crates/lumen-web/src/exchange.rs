//! The in-flight request/response pair observed by the middlewares.

use std::fmt;

use actix_web::HttpRequest;
use actix_web::body::{BodySize, MessageBody};
use actix_web::dev::ServiceResponse;
use actix_web::http::header::{self, HeaderMap};
use actix_web::http::{Method, StatusCode, Version};

use crate::context::{RecordedErrors, RequestScope};

/// Owned copy of the request facts a log record needs.
///
/// Taken before the request is handed to the inner service. Routing requires
/// the `HttpRequest` to be uniquely owned, so it is never cloned across the
/// call; the snapshot covers the paths where no response carries it back.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: String,
    pub(crate) version: Version,
    pub(crate) scheme: String,
    pub(crate) host: String,
    pub(crate) realip: Option<String>,
    pub(crate) headers: HeaderMap,
    scope: RequestScope,
}

impl RequestSnapshot {
    /// Capture `req` and attach (or join) its [`RequestScope`].
    pub fn capture(req: &HttpRequest) -> Self {
        let (scheme, host, realip) = {
            let conn = req.connection_info();
            (
                conn.scheme().to_string(),
                conn.host().to_string(),
                conn.realip_remote_addr().map(str::to_string),
            )
        };

        // Only the headers the log record draws on.
        let mut headers = HeaderMap::new();
        for name in [
            header::CONTENT_LENGTH,
            header::CONTENT_TYPE,
            header::REFERER,
            header::USER_AGENT,
        ] {
            if let Some(value) = req.headers().get(&name) {
                let value = value.clone();
                headers.insert(name, value);
            }
        }

        Self {
            method: req.method().clone(),
            path: req.path().to_string(),
            query: req.query_string().to_string(),
            version: req.version(),
            scheme,
            host,
            realip,
            headers,
            scope: RequestScope::of(req),
        }
    }

    pub fn scope(&self) -> &RequestScope {
        &self.scope
    }
}

/// Response facts needed for a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseMeta {
    pub status: u16,
    /// Body length in bytes; `0` for empty or streamed bodies.
    pub body_bytes: i64,
}

impl ResponseMeta {
    pub fn new(status: StatusCode, body_bytes: i64) -> Self {
        Self {
            status: status.as_u16(),
            body_bytes,
        }
    }

    /// Summarise a finished response.
    pub fn of<B: MessageBody>(res: &ServiceResponse<B>) -> Self {
        let body_bytes = match res.response().body().size() {
            BodySize::Sized(n) => i64::try_from(n).unwrap_or(i64::MAX),
            BodySize::None | BodySize::Stream => 0,
        };
        Self::new(res.status(), body_bytes)
    }

    /// The response an inner service error will be rendered as.
    pub fn from_error(err: &actix_web::Error) -> Self {
        Self::new(err.as_response_error().status_code(), 0)
    }

    /// The empty `500` sent after a contained panic.
    pub fn aborted() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, 0)
    }
}

/// One request paired with its (possibly synthetic) response.
pub struct Exchange {
    request: RequestSnapshot,
    response: ResponseMeta,
    errors: RecordedErrors,
}

impl Exchange {
    /// Pair `request` with `response`, picking up the errors recorded so far.
    pub fn new(request: RequestSnapshot, response: ResponseMeta) -> Self {
        let errors = request.scope().recorded_errors();
        Self {
            request,
            response,
            errors,
        }
    }

    /// View of a finished response. An error attached to the response
    /// (a handler returning `Err`) counts as a recorded error.
    pub fn completed<B: MessageBody>(request: RequestSnapshot, res: &ServiceResponse<B>) -> Self {
        let exchange = Self::new(request, ResponseMeta::of(res));
        match res.response().error() {
            Some(err) => exchange.with_error(err),
            None => exchange,
        }
    }

    pub fn with_error(mut self, error: impl fmt::Display) -> Self {
        self.errors.push(error);
        self
    }

    pub fn request(&self) -> &RequestSnapshot {
        &self.request
    }

    pub fn response(&self) -> ResponseMeta {
        self.response
    }

    pub fn errors(&self) -> &RecordedErrors {
        &self.errors
    }
}
