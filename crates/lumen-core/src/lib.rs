//! # Lumen Core
//!
//! The domain layer of Lumen request observability.
//! This crate holds the log-record vocabulary and the ports that logging and
//! tracing backends implement. It has no web-framework dependency.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::ClaimsError;
