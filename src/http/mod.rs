//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (bound by lifecycle::coordinator)
//!     → headers.rs (standard no-cache headers on the way out)
//!     → request.rs (assign request ID)
//!     → server.rs (Axum router, timeout, metrics)
//!     → handlers.rs (lookup, /live, /ready)
//!     → response.rs (JSON or RFC 7807 problem body)
//!     → Send to client
//! ```

pub mod handlers;
pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::{ProblemDetail, ServiceResponse, JSON_UTF8, PROBLEM_JSON_UTF8};
pub use server::{build_router, serve, with_middleware, AppState};
