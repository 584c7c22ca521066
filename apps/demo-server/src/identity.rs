//! Stand-in for an upstream authentication layer.
//!
//! Requests carrying an `X-Demo-User` UUID get identity claims attached, so
//! their log records include `user.id`.

use actix_web::{HttpMessage, http::header::HeaderMap};
use lumen_core::domain::IdentityClaims;
use lumen_web::RequestContextExt;
use uuid::Uuid;

pub const USER_HEADER: &str = "x-demo-user";
pub const EMAIL_HEADER: &str = "x-demo-email";

/// Attach claims derived from the demo headers, if any.
pub fn attach<R: HttpMessage>(req: &R) {
    if let Some(claims) = demo_claims(req.headers()) {
        tracing::debug!(user_id = %claims.user_id, "demo identity attached");
        req.set_identity(&claims);
    }
}

fn demo_claims(headers: &HeaderMap) -> Option<IdentityClaims> {
    let user_id = headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v.trim()).ok())?;

    Some(IdentityClaims {
        email: headers
            .get(EMAIL_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string(),
        user_id,
        organisation_id: Uuid::nil(),
        tenant_id: Uuid::nil(),
    })
}
