//! REST entry point for a social-data API gateway.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rest;
pub mod security;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
