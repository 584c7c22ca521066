//! # Lumen Web
//!
//! actix-web middlewares for request observability.
//!
//! - [`RequestLogger`] emits one structured record per request.
//! - [`PanicRecoverer`] turns a handler panic into an error record, a failed
//!   trace span and an empty `500`. [`install_panic_hook`] (optional, once per
//!   process) lets it report the panic-site stack instead of its own.
//! - [`extract_fields`] builds the attribute set both of them log.
//!
//! ```ignore
//! use actix_web::{App, HttpServer};
//! use lumen_web::{PanicRecoverer, RequestLogger};
//! use tracing_actix_web::TracingLogger;
//!
//! lumen_web::install_panic_hook();
//!
//! HttpServer::new(|| {
//!     App::new()
//!         .wrap(RequestLogger::default())
//!         .wrap(PanicRecoverer::default())
//!         .wrap(TracingLogger::default())
//! })
//! ```
//!
//! Identity reaches the log through the request-scoped store: an upstream
//! authentication layer calls [`RequestContextExt::set_identity`] and every
//! record for that request carries `user.id`.

mod context;
mod exchange;
mod fields;
mod logger;
mod panic_hook;
mod recover;

pub use context::{RecordedErrors, RequestContextExt, RequestScope};
pub use exchange::{Exchange, RequestSnapshot, ResponseMeta};
pub use fields::{FIELD_KEYS, TIMESTAMP_FORMAT, USER_ID_FIELD, extract_fields};
pub use logger::{RequestLogger, RequestLoggerService, SUCCESS_MESSAGE};
pub use panic_hook::install_panic_hook;
pub use recover::{
    PANIC_MESSAGE, PanicRecoverer, PanicRecovererService, RequestPanicked, SPAN_DESCRIPTION,
};
