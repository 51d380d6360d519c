//! Luv Observability
//!
//! Logging, distributed tracing and Prometheus metrics for the Luv API.
//!
//! Everything beyond console logging sits behind the `observability` cargo
//! feature (on by default). At runtime the `OBSERVABILITY_ENABLED`
//! environment variable can switch it off again; the binary then falls back
//! to [`basic_logging::init_basic_console_logging`].
//!
//! # Examples
//!
//! ```no_run
//! use luv_observability::{init_metrics, init_tracing, is_observability_enabled, shutdown_tracer};
//! use luv_observability::basic_logging::init_basic_console_logging;
//!
//! #[tokio::main]
//! async fn main() {
//!     if is_observability_enabled() {
//!         init_tracing();
//!     } else {
//!         init_basic_console_logging();
//!     }
//!     let _metrics = init_metrics();
//!     // ... application code ...
//!     shutdown_tracer().await;
//! }
//! ```

use std::sync::OnceLock;

pub mod basic_logging;

#[cfg(feature = "observability")]
pub mod logging;
#[cfg(feature = "observability")]
pub mod metrics;

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// Whether the full observability stack is active.
///
/// Always false when the crate is built without the `observability` feature.
/// Otherwise reads `OBSERVABILITY_ENABLED` once (default: true).
pub fn is_observability_enabled() -> bool {
    cfg!(feature = "observability")
        && *OBSERVABILITY_ENABLED.get_or_init(|| {
            std::env::var("OBSERVABILITY_ENABLED")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true)
        })
}

#[cfg(feature = "observability")]
pub use logging::{init_tracing, logging_middleware, shutdown_tracer};
#[cfg(feature = "observability")]
pub use metrics::{
    MetricsHandle, init_metrics, metrics_app, metrics_middleware, track_donation_created,
    track_google_login, track_jwt_issued, track_login_failure, track_login_success,
    track_stream_ended, track_stream_started, track_user_registered,
};

// No-op stubs when observability is disabled
#[cfg(not(feature = "observability"))]
pub mod stubs {
    use axum::{Router, extract::Request, middleware::Next, response::Response};

    /// Placeholder for the Prometheus handle.
    #[derive(Clone, Debug)]
    pub struct MetricsHandle;

    pub async fn logging_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub async fn metrics_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub fn init_tracing() {}

    pub async fn shutdown_tracer() {}

    pub fn init_metrics() -> Option<MetricsHandle> {
        None
    }

    pub fn metrics_app(_handle: MetricsHandle) -> Router {
        Router::new()
    }

    pub fn track_user_registered(_method: &str) {}
    pub fn track_login_success(_role: &str, _method: &str) {}
    pub fn track_login_failure(_reason: &str) {}
    pub fn track_jwt_issued(_kind: &str) {}
    pub fn track_google_login(_outcome: &str) {}
    pub fn track_stream_started() {}
    pub fn track_stream_ended() {}
    pub fn track_donation_created() {}
}

#[cfg(not(feature = "observability"))]
pub use stubs::*;
