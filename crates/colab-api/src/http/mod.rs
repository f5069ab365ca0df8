//! HTTP and WebSocket layer.
//!
//! Flat JSON POST routes, a health check and the `/ws` real-time channel,
//! with permissive CORS and request tracing.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
