//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → resolver.rs (find the credential in params or headers)
//!     → token.rs (opaque SecurityToken handed to the dispatcher)
//! ```
//!
//! # Design Decisions
//! - Fail closed: a request without a resolvable token never reaches a handler
//! - Tokens are request-scoped and read-only once resolved

pub mod resolver;
pub mod token;

pub use resolver::{PlaintextTokenResolver, TokenResolver};
pub use token::{BasicToken, SecurityToken};
