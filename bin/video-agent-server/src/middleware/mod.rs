//! HTTP middleware stack: request tracing, CORS, admin auth.

pub mod auth;
pub mod cors;
pub mod trace;
