//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace layer)
//!     → forward.rs (run handler: validate, forward once)
//!     → request.rs (passcode, app name, stream flag)
//!     → [upstream client sends the run request]
//!     → response.rs (status mirror, buffered or streamed body)
//!     → Send to client
//! ```

pub mod error;
pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use error::ForwardError;
pub use request::{RunOptions, RACCOON_PASSCODE, SECRET_KEY, X_REQUEST_ID};
pub use response::RelayMode;
pub use server::{build_router, AppState, HttpServer};
