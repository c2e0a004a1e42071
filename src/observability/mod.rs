//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers, upstream client, lifecycle
//!     → tracing events with structured fields (request_id, app_name, status)
//!     → logging.rs subscriber (EnvFilter + fmt layer)
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the tower-http request-id layers
//! - Per-request spans come from tower-http's TraceLayer

pub mod logging;
