//! Downstream data handlers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::rest::descriptor::RequestDescriptor;
use crate::rest::errors::BoxError;
use crate::rest::outcome::{ErrorKind, ResponseOutcome};

pub const PEOPLE_ROUTE: &str = "people";
pub const ACTIVITY_ROUTE: &str = "activities";
pub const APPDATA_ROUTE: &str = "appdata";
pub const MESSAGE_ROUTE: &str = "messages";

/// Handles one normalized request.
///
/// Expected failures are reported as `ResponseOutcome::Failure`; an `Err` is
/// treated as an internal fault and answered with a 500.
#[async_trait]
pub trait DataHandler: Send + Sync {
    async fn handle(&self, request: &RequestDescriptor) -> Result<ResponseOutcome, BoxError>;
}

/// Picks a service by the first path segment of the request.
#[derive(Default, Clone)]
pub struct ServiceRouter {
    services: HashMap<String, Arc<dyn DataHandler>>,
}

impl ServiceRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service(mut self, route: impl Into<String>, handler: Arc<dyn DataHandler>) -> Self {
        self.services.insert(route.into(), handler);
        self
    }

    /// Registered route names, sorted.
    pub fn routes(&self) -> Vec<&str> {
        let mut routes: Vec<&str> = self.services.keys().map(String::as_str).collect();
        routes.sort_unstable();
        routes
    }
}

#[async_trait]
impl DataHandler for ServiceRouter {
    async fn handle(&self, request: &RequestDescriptor) -> Result<ResponseOutcome, BoxError> {
        let route = request.route();
        match self.services.get(route) {
            Some(service) => service.handle(request).await,
            None => {
                tracing::debug!(route = %route, "No service registered for route");
                Ok(ResponseOutcome::failure(
                    ErrorKind::NotImplemented,
                    format!("The service {route} is not implemented"),
                ))
            }
        }
    }
}
