//! Panic recovery middleware.
//!
//! A panic in a handler would otherwise unwind through the actix worker. This
//! middleware turns it into one error record, a failed trace span and an empty
//! `500` response.
//!
//! Register it *after* [`RequestLogger`](crate::RequestLogger) so it encloses
//! the logger and catches panics raised inside it too:
//!
//! ```ignore
//! lumen_web::install_panic_hook();
//!
//! App::new()
//!     .wrap(RequestLogger::default())
//!     .wrap(PanicRecoverer::default())
//! ```
//!
//! The unwound request can no longer carry a response, so a contained panic
//! resolves to a [`RequestPanicked`] error. Actix renders it as the empty `500`.

use std::any::Any;
use std::fmt;
use std::future::{Future, Ready, ready};
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;

use actix_web::{
    Error, HttpResponse, ResponseError,
    body::MessageBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::StatusCode,
};
use chrono::Utc;
use futures::FutureExt;
use lumen_core::ports::{LogSink, SpanReporter};
use lumen_infra::{TracingLogSink, TracingSpanReporter};

use crate::exchange::{Exchange, RequestSnapshot, ResponseMeta};
use crate::fields::extract_fields;
use crate::panic_hook;

/// Message of the record emitted for a contained panic.
pub const PANIC_MESSAGE: &str = "a panic occurred";

/// Status description set on the failed span.
pub const SPAN_DESCRIPTION: &str = "panic occurred";

/// Error standing in for the response of a request whose handling panicked.
#[derive(Debug)]
pub struct RequestPanicked;

impl fmt::Display for RequestPanicked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(PANIC_MESSAGE)
    }
}

impl ResponseError for RequestPanicked {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    /// No body: nothing about the failure is disclosed to the client.
    fn error_response(&self) -> HttpResponse {
        HttpResponse::new(self.status_code())
    }
}

/// Middleware that contains panics raised anywhere in the wrapped chain.
///
/// Stack traces are taken at the catch site unless the host has called
/// [`install_panic_hook`](crate::install_panic_hook), in which case the
/// panic-site trace is used.
pub struct PanicRecoverer {
    reporter: Arc<FaultReporter>,
}

impl PanicRecoverer {
    pub fn new(sink: Arc<dyn LogSink>, spans: Arc<dyn SpanReporter>) -> Self {
        Self {
            reporter: Arc::new(FaultReporter { sink, spans }),
        }
    }
}

impl Default for PanicRecoverer {
    fn default() -> Self {
        Self::new(Arc::new(TracingLogSink), Arc::new(TracingSpanReporter))
    }
}

impl<S, B> Transform<S, ServiceRequest> for PanicRecoverer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = PanicRecovererService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(PanicRecovererService {
            service,
            reporter: Arc::clone(&self.reporter),
        }))
    }
}

pub struct PanicRecovererService<S> {
    service: S,
    reporter: Arc<FaultReporter>,
}

impl<S, B> Service<ServiceRequest> for PanicRecovererService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let snapshot = RequestSnapshot::capture(req.request());
        let reporter = Arc::clone(&self.reporter);

        // Services may panic while building their future, not only while polling it.
        let fut = match panic::catch_unwind(AssertUnwindSafe(|| self.service.call(req))) {
            Ok(fut) => fut,
            Err(payload) => return Box::pin(ready(Err(reporter.contain(snapshot, payload)))),
        };

        Box::pin(async move {
            match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => Err(reporter.contain(snapshot, payload)),
            }
        })
    }
}

struct FaultReporter {
    sink: Arc<dyn LogSink>,
    spans: Arc<dyn SpanReporter>,
}

impl FaultReporter {
    /// Report the panic and produce the error the request resolves to.
    ///
    /// Reporting runs under its own guard: a sink or span reporter that
    /// panics still yields the `500`.
    fn contain(&self, snapshot: RequestSnapshot, payload: Box<dyn Any + Send>) -> Error {
        let path = snapshot.path.clone();
        let reported = panic::catch_unwind(AssertUnwindSafe(|| {
            self.report(snapshot, payload.as_ref());
        }));
        if reported.is_err() {
            tracing::error!(path = %path, "panic while reporting a contained panic");
        }

        RequestPanicked.into()
    }

    fn report(&self, snapshot: RequestSnapshot, payload: &(dyn Any + Send)) {
        // The original start time is lost with the unwound frames.
        let start = Utc::now();
        let stack = panic_hook::take_stack();

        let exchange = Exchange::new(snapshot, ResponseMeta::aborted());
        let mut fields = extract_fields(&exchange, start);
        fields.insert("error.message", panic_message(payload));
        fields.insert("error.stack_trace", stack.as_str());

        self.sink.error(PANIC_MESSAGE, &fields);
        self.spans.mark_failed(SPAN_DESCRIPTION);
    }
}

/// Text of a panic payload; `panic!` produces either `&str` or `String`.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
