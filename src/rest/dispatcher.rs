//! Request dispatch.
//!
//! # Flow
//! ```text
//! RequestContext
//!     → token present?            no  → 401
//!     → negotiate input/output    bad → 500 Unknown format param
//!     → RequestDescriptor
//!     → DataHandler::handle
//!     → Success → output converter (200)
//!       Failure → ErrorResponder
//! Any Fault on the way → 500 page
//! ```

use std::sync::Arc;

use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};

use crate::config::RestConfig;
use crate::observability::metrics;
use crate::rest::context::RequestContext;
use crate::rest::converter::ConverterRegistry;
use crate::rest::descriptor::RequestDescriptor;
use crate::rest::errors::{ErrorResponder, Fault};
use crate::rest::handler::DataHandler;
use crate::rest::negotiation::FormatNegotiator;
use crate::rest::outcome::ResponseOutcome;

/// Orchestrates one REST request from authentication to response.
pub struct Dispatcher {
    config: RestConfig,
    api_prefix: String,
    converters: ConverterRegistry,
    handler: Arc<dyn DataHandler>,
    errors: ErrorResponder,
}

impl Dispatcher {
    pub fn new(config: RestConfig, converters: ConverterRegistry, handler: Arc<dyn DataHandler>) -> Self {
        Self {
            api_prefix: config.api_prefix(),
            errors: ErrorResponder::new(config.debug),
            config,
            converters,
            handler,
        }
    }

    pub fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    pub fn error_responder(&self) -> ErrorResponder {
        self.errors
    }

    /// Handle a request, always producing exactly one response.
    pub async fn handle(&self, ctx: RequestContext) -> Response {
        match self.process(&ctx).await {
            Ok(response) => response,
            Err(fault) => {
                tracing::error!(
                    method = %ctx.method(),
                    uri = %ctx.uri(),
                    error = %fault,
                    "Request failed"
                );
                metrics::record_fault(fault.kind());
                self.errors.fault(&fault)
            }
        }
    }

    /// Run the dispatch steps. Typed failures are already rendered; only
    /// faults are left for the caller.
    ///
    /// GET, PUT and DELETE take exactly the same path as POST.
    pub async fn process(&self, ctx: &RequestContext) -> Result<Response, Fault> {
        let Some(token) = ctx.token() else {
            tracing::warn!(uri = %ctx.uri(), "Rejecting request without security token");
            metrics::record_auth_failure();
            return Ok(self.errors.unauthenticated());
        };

        let negotiator = FormatNegotiator::new(ctx);
        let input_format = negotiator.resolve_input_format()?;
        let output_format = negotiator.resolve_output_format();

        let descriptor = RequestDescriptor::build(
            ctx,
            &self.api_prefix,
            self.config.unescape_body,
            Arc::clone(token),
            self.converters.input(input_format),
            self.converters.output(output_format),
        );

        tracing::debug!(
            method = %descriptor.method(),
            path = %descriptor.path(),
            input = %input_format,
            output = %output_format,
            "Dispatching request"
        );

        let outcome = self
            .handler
            .handle(&descriptor)
            .await
            .map_err(Fault::Handler)?;

        match outcome {
            ResponseOutcome::Success(payload) => {
                let converter = descriptor.output_converter();
                let body = converter.render(&payload, &descriptor)?;
                Ok((
                    [(CONTENT_TYPE, HeaderValue::from_static(converter.content_type()))],
                    body,
                )
                    .into_response())
            }
            ResponseOutcome::Failure { kind, message } => {
                tracing::debug!(kind = %kind, message = %message, "Handler reported failure");
                Ok(self.errors.respond(kind, &message))
            }
        }
    }
}
