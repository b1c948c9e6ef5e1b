//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID generation)
//!     → rest::Dispatcher (authenticate, negotiate, dispatch)
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{MakeGatewayRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
