//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router mounting the REST transport under the API prefix
//! - Wire up middleware (tracing, limits, request ID, panic recovery)
//! - Build the immutable RequestContext at the transport boundary
//! - Serve until the shutdown signal fires

use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Request, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    middleware::{self, Next},
    response::Response,
    routing::{get, MethodRouter},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::request::{MakeGatewayRequestId, X_REQUEST_ID};
use crate::observability::metrics;
use crate::rest::{ConverterRegistry, DataHandler, Dispatcher, RequestContext};
use crate::security::{PlaintextTokenResolver, TokenResolver};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub tokens: Arc<dyn TokenResolver>,
}

/// HTTP server for the social gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a server with the default converter registry.
    pub fn new(config: GatewayConfig, handler: Arc<dyn DataHandler>) -> Self {
        Self::with_converters(config, ConverterRegistry::default(), handler)
    }

    pub fn with_converters(
        config: GatewayConfig,
        converters: ConverterRegistry,
        handler: Arc<dyn DataHandler>,
    ) -> Self {
        let state = AppState {
            dispatcher: Arc::new(Dispatcher::new(config.rest.clone(), converters, handler)),
            tokens: Arc::new(PlaintextTokenResolver::from_config(&config.auth)),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let prefix = state.dispatcher.api_prefix().to_string();
        let errors = state.dispatcher.error_responder();

        Router::new()
            .route(&prefix, rest_methods())
            .route(&format!("{prefix}/"), rest_methods())
            .route(&format!("{prefix}/{{*route}}"), rest_methods())
            .with_state(state)
            .layer(CatchPanicLayer::custom(
                move |payload: Box<dyn Any + Send + 'static>| {
                    metrics::record_fault("panic");
                    errors.panic(payload)
                },
            ))
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ))
            .layer(middleware::from_fn(track_requests))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeGatewayRequestId))
    }

    /// Router with all layers applied, for embedding or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            api_prefix = %self.config.rest.api_prefix(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn rest_methods() -> MethodRouter<AppState> {
    get(rest_handler)
        .post(rest_handler)
        .put(rest_handler)
        .delete(rest_handler)
}

/// Count every response, including panics and timeouts turned into errors.
async fn track_requests(request: Request, next: Next) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let response = next.run(request).await;
    metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
    response
}

/// Entry point for every REST request.
async fn rest_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let ctx = RequestContext::new(method, uri, headers, body);
    let token = state.tokens.resolve(&ctx);
    state.dispatcher.handle(ctx.with_token(token)).await
}
