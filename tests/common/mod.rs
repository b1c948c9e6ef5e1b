//! Shared utilities for integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use social_gateway::config::GatewayConfig;
use social_gateway::rest::{BoxError, DataHandler, RequestDescriptor, ResponseOutcome};
use social_gateway::HttpServer;
use tower::ServiceExt;

/// What a scripted handler does when called.
#[allow(dead_code)]
pub enum Script {
    Succeed(Value),
    Fail(social_gateway::rest::ErrorKind, &'static str),
    Error(&'static str),
    Panic(&'static str),
    Stall(std::time::Duration),
    EchoBody,
}

/// Handler that records every descriptor it sees.
pub struct ScriptedHandler {
    script: Script,
    calls: AtomicUsize,
    paths: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedHandler {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
            paths: Mutex::new(Vec::new()),
        })
    }

    pub fn succeeding() -> Arc<Self> {
        Self::new(Script::Succeed(json!({"id": "john.doe", "name": "John"})))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

#[async_trait]
impl DataHandler for ScriptedHandler {
    async fn handle(&self, request: &RequestDescriptor) -> Result<ResponseOutcome, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.paths.lock().unwrap().push(request.path().to_string());

        match &self.script {
            Script::Succeed(value) => Ok(ResponseOutcome::success(value.clone())),
            Script::Fail(kind, message) => Ok(ResponseOutcome::failure(*kind, *message)),
            Script::Error(message) => Err((*message).into()),
            Script::Panic(message) => panic!("{}", message),
            Script::Stall(duration) => {
                tokio::time::sleep(*duration).await;
                Ok(ResponseOutcome::success(Value::Null))
            }
            Script::EchoBody => {
                let body = request.parsed_body()?.unwrap_or(Value::Null);
                Ok(ResponseOutcome::success(body))
            }
        }
    }
}

/// Router for `config` backed by `handler`.
#[allow(dead_code)]
pub fn app(config: GatewayConfig, handler: Arc<dyn DataHandler>) -> Router {
    HttpServer::new(config, handler).router()
}

/// Send one request through the router, returning status, headers and body text.
#[allow(dead_code)]
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Response<()>, String) {
    let response = router.clone().oneshot(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    let status = parts.status;
    (
        status,
        Response::from_parts(parts, ()),
        String::from_utf8_lossy(&bytes).into_owned(),
    )
}
