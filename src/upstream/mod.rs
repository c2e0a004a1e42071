//! Upstream subsystem.
//!
//! # Data Flow
//! ```text
//! Validated run request (app name, passcode, raw body)
//!     → client.rs (template URL, attach passcode + secret-key)
//!     → LAM API
//!     → reqwest::Response handed back to the relay
//! ```
//!
//! # Design Decisions
//! - One client per process, shared by all requests
//! - One send per inbound request: no retries, no fan-out

pub mod client;

pub use client::{UpstreamClient, UpstreamError};
