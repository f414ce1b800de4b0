//! HTTP middleware stack: permissive CORS and per-request tracing.

pub mod cors;
pub mod trace;
