//! Request-scoped values and recorded errors.
//!
//! Both live in a [`RequestScope`] kept in the request extensions. The scope is
//! a shared handle: the middlewares hold their own copy, so it stays readable
//! after the inner service has consumed (or unwound past) the request.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use actix_web::HttpMessage;
use lumen_core::ClaimsError;
use lumen_core::domain::{IdentityClaims, USER_CLAIMS_KEY, user_id_from_claims};
use serde_json::Value;

/// Non-fatal errors accumulated while handling one request.
#[derive(Debug, Default, Clone)]
pub struct RecordedErrors(Vec<String>);

impl RecordedErrors {
    pub(crate) fn push(&mut self, error: impl fmt::Display) {
        self.0.push(error.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One numbered line per error: `Error #01: ...`.
impl fmt::Display for RecordedErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "Error #{:02}: {}", i + 1, error)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct ScopeState {
    values: HashMap<String, Value>,
    errors: RecordedErrors,
}

/// Shared handle to the side channel of one request.
///
/// Borrows never span caller code, so a panic elsewhere in the request cannot
/// leave the state borrowed.
#[derive(Debug, Clone, Default)]
pub struct RequestScope(Rc<RefCell<ScopeState>>);

impl RequestScope {
    /// The scope attached to `msg`, attaching a fresh one first if there is none.
    pub fn of<M: HttpMessage>(msg: &M) -> Self {
        let existing = msg.extensions().get::<RequestScope>().cloned();
        existing.unwrap_or_else(|| {
            let scope = RequestScope::default();
            msg.extensions_mut().insert(scope.clone());
            scope
        })
    }

    pub fn set_value(&self, key: impl Into<String>, value: Value) {
        self.0.borrow_mut().values.insert(key.into(), value);
    }

    pub fn value(&self, key: &str) -> Option<Value> {
        self.0.borrow().values.get(key).cloned()
    }

    /// User identifier from the claims entry, if it has the expected shape.
    pub fn user_id(&self) -> Option<String> {
        self.0
            .borrow()
            .values
            .get(USER_CLAIMS_KEY)
            .and_then(user_id_from_claims)
            .map(str::to_string)
    }

    /// Typed claims, or `None` when no identity was attached.
    pub fn identity(&self) -> Result<Option<IdentityClaims>, ClaimsError> {
        self.value(USER_CLAIMS_KEY)
            .map(|claims| IdentityClaims::from_context_map(&claims))
            .transpose()
    }

    pub fn record_error(&self, error: impl fmt::Display) {
        let text = error.to_string();
        self.0.borrow_mut().errors.push(text);
    }

    pub fn recorded_errors(&self) -> RecordedErrors {
        self.0.borrow().errors.clone()
    }
}

/// Accessors for the request-scoped store on `HttpRequest` / `ServiceRequest`.
///
/// ```ignore
/// async fn handler(req: HttpRequest) -> HttpResponse {
///     if let Err(e) = audit(&req).await {
///         req.record_error(e);
///     }
///     HttpResponse::Ok().finish()
/// }
/// ```
pub trait RequestContextExt {
    /// Store `value` under `key`, replacing any previous value.
    fn set_value(&self, key: impl Into<String>, value: Value);

    /// Clone of the value stored under `key`.
    fn value(&self, key: &str) -> Option<Value>;

    /// Store identity claims under the well-known claims key.
    fn set_identity(&self, claims: &IdentityClaims);

    /// Read the identity claims back, if any were stored.
    fn identity(&self) -> Result<Option<IdentityClaims>, ClaimsError>;

    fn user_id(&self) -> Option<String>;

    /// Append a non-fatal error; it is reported by the request logger.
    fn record_error(&self, error: impl fmt::Display);

    fn recorded_errors(&self) -> RecordedErrors;
}

impl<T: HttpMessage> RequestContextExt for T {
    fn set_value(&self, key: impl Into<String>, value: Value) {
        RequestScope::of(self).set_value(key, value);
    }

    fn value(&self, key: &str) -> Option<Value> {
        RequestScope::of(self).value(key)
    }

    fn set_identity(&self, claims: &IdentityClaims) {
        self.set_value(USER_CLAIMS_KEY, Value::Object(claims.to_context_map()));
    }

    fn identity(&self) -> Result<Option<IdentityClaims>, ClaimsError> {
        RequestScope::of(self).identity()
    }

    fn user_id(&self) -> Option<String> {
        RequestScope::of(self).user_id()
    }

    fn record_error(&self, error: impl fmt::Display) {
        RequestScope::of(self).record_error(error);
    }

    fn recorded_errors(&self) -> RecordedErrors {
        RequestScope::of(self).recorded_errors()
    }
}
