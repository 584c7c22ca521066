//! Field extraction - turns an [`Exchange`] into the attributes of one log record.
//!
//! Attribute names follow the Elastic Common Schema / OpenTelemetry HTTP
//! conventions. Every key in [`FIELD_KEYS`] is always present; sources that are
//! missing on the request produce `""` or `0`. `user.id` is added only when
//! identity claims are available.

use std::net::{IpAddr, SocketAddr};

use actix_web::http::header::{self, HeaderMap, HeaderName};
use actix_web::http::uri::Authority;
use chrono::{DateTime, Utc};
use lumen_core::domain::FieldSet;

use crate::exchange::Exchange;

/// Timestamp layout for `event.start` / `event.end`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Identity attribute merged when claims are present.
pub const USER_ID_FIELD: &str = "user.id";

/// Keys populated on every call to [`extract_fields`].
pub const FIELD_KEYS: [&str; 24] = [
    "url.domain",
    "url.fragment",
    "url.full",
    "url.original",
    "url.path",
    "url.port",
    "url.query",
    "url.registered_domain",
    "url.scheme",
    "http.request.bytes",
    "http.request.method",
    "http.request.mime_type",
    "http.request.referrer",
    "http.response.body.bytes",
    "http.response.status_code",
    "http.version",
    "client.address",
    "client.ip",
    "server.address",
    "server.ip",
    "user_agent.original",
    "event.duration",
    "event.start",
    "event.end",
];

/// Build the attribute set for `exchange`, timing it from `start`.
pub fn extract_fields(exchange: &Exchange, start: DateTime<Utc>) -> FieldSet {
    let end = Utc::now();
    let req = exchange.request();
    let response = exchange.response();

    let client_ip = req.realip.as_deref().map(strip_port).unwrap_or_default();
    let (hostname, port) = split_host(&req.host);

    let full = if req.query.is_empty() {
        format!("{}://{}{}", req.scheme, req.host, req.path)
    } else {
        format!("{}://{}{}?{}", req.scheme, req.host, req.path, req.query)
    };

    // Negative durations (clock stepped backwards) clamp to zero.
    let duration = (end - start).to_std().unwrap_or_default().as_secs_f64();

    let mut fields = FieldSet::new()
        .with("url.domain", req.host.as_str())
        .with("url.fragment", "")
        .with("url.full", full.as_str())
        .with("url.original", full)
        .with("url.path", req.path.as_str())
        .with("url.port", port)
        .with("url.query", req.query.as_str())
        .with("url.registered_domain", hostname)
        .with("url.scheme", req.scheme.as_str())
        .with("http.request.bytes", content_length(&req.headers))
        .with("http.request.method", req.method.as_str())
        .with("http.request.mime_type", mime_type(&req.headers))
        .with("http.request.referrer", header_str(&req.headers, &header::REFERER))
        .with("http.response.body.bytes", response.body_bytes)
        .with("http.response.status_code", response.status)
        .with("http.version", format!("{:?}", req.version))
        .with("client.address", client_ip.as_str())
        .with("client.ip", client_ip)
        .with("server.address", req.host.as_str())
        .with("server.ip", req.host.as_str())
        .with("user_agent.original", header_str(&req.headers, &header::USER_AGENT))
        .with("event.duration", duration)
        .with("event.start", start.format(TIMESTAMP_FORMAT).to_string())
        .with("event.end", end.format(TIMESTAMP_FORMAT).to_string());

    if let Some(user_id) = req.scope().user_id() {
        fields.insert(USER_ID_FIELD, user_id);
    }

    fields
}

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// `Content-Length` as sent; non-numeric or absent values become `0`.
fn content_length(headers: &HeaderMap) -> i64 {
    header_str(headers, &header::CONTENT_LENGTH)
        .trim()
        .parse()
        .unwrap_or_default()
}

/// Media type without parameters: `application/json; charset=utf-8` -> `application/json`.
fn mime_type(headers: &HeaderMap) -> &str {
    let raw = header_str(headers, &header::CONTENT_TYPE);
    raw.split(';').next().unwrap_or_default().trim()
}

fn split_host(host: &str) -> (String, String) {
    match host.parse::<Authority>() {
        Ok(authority) => (
            authority.host().to_string(),
            authority.port().map(|p| p.to_string()).unwrap_or_default(),
        ),
        Err(_) => (host.to_string(), String::new()),
    }
}

fn strip_port(addr: &str) -> String {
    if let Ok(socket) = addr.parse::<SocketAddr>() {
        return socket.ip().to_string();
    }
    match addr.parse::<IpAddr>() {
        Ok(ip) => ip.to_string(),
        Err(_) => addr.to_string(),
    }
}
