//! Request logging middleware - one structured record per request.

use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::sync::Arc;

use actix_web::{
    Error,
    body::MessageBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use chrono::{DateTime, Utc};
use lumen_core::ports::LogSink;
use lumen_infra::TracingLogSink;

use crate::exchange::{Exchange, RequestSnapshot, ResponseMeta};
use crate::fields::extract_fields;

/// Message of the record emitted for requests without recorded errors.
pub const SUCCESS_MESSAGE: &str = "request processed successfully";

/// Middleware that emits exactly one log record after the wrapped chain finishes.
///
/// Requests with recorded errors (see [`RequestContextExt::record_error`]) or
/// an error response from the handler are logged at error level with all
/// errors joined into the message; everything else is logged at info level.
/// The response itself is passed through untouched.
///
/// [`RequestContextExt::record_error`]: crate::RequestContextExt::record_error
pub struct RequestLogger {
    sink: Arc<dyn LogSink>,
}

impl RequestLogger {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }
}

impl Default for RequestLogger {
    fn default() -> Self {
        Self::new(Arc::new(TracingLogSink))
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequestLoggerService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerService {
            service,
            sink: Arc::clone(&self.sink),
        }))
    }
}

pub struct RequestLoggerService<S> {
    service: S,
    sink: Arc<dyn LogSink>,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerService<S>
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
        let start = Utc::now();
        // The request itself must stay uniquely owned for routing; the
        // snapshot describes it if the chain fails without a response.
        let snapshot = RequestSnapshot::capture(req.request());
        let sink = Arc::clone(&self.sink);

        let fut = self.service.call(req);

        Box::pin(async move {
            match fut.await {
                Ok(res) => {
                    emit(sink.as_ref(), &Exchange::completed(snapshot, &res), start);
                    Ok(res)
                }
                Err(err) => {
                    let exchange =
                        Exchange::new(snapshot, ResponseMeta::from_error(&err)).with_error(&err);
                    emit(sink.as_ref(), &exchange, start);
                    Err(err)
                }
            }
        })
    }
}

fn emit(sink: &dyn LogSink, exchange: &Exchange, start: DateTime<Utc>) {
    let fields = extract_fields(exchange, start);
    let errors = exchange.errors();

    if errors.is_empty() {
        sink.info(SUCCESS_MESSAGE, &fields);
    } else {
        sink.error(&format!("request failed: {}", errors), &fields);
    }
}
