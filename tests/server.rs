//! End-to-end test over a real TCP listener.

use std::time::Duration;

use social_gateway::config::GatewayConfig;
use social_gateway::{HttpServer, Shutdown};

mod common;
use common::ScriptedHandler;

#[tokio::test]
async fn test_serves_until_shutdown() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handler = ScriptedHandler::succeeding();
    let server = HttpServer::new(GatewayConfig::default(), handler.clone());
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let task = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    let res = client
        .get(format!("http://{addr}/social/rest/people/@me/@self"))
        .query(&[("st", "john.doe"), ("format", "json")])
        .send()
        .await
        .expect("gateway unreachable");
    assert_eq!(res.status(), 200);
    assert_eq!(
        res.headers().get("content-type").unwrap(),
        "application/json"
    );
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["entry"]["id"], "john.doe");

    let res = client
        .delete(format!("http://{addr}/social/rest/people/@me/@self"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);
    assert_eq!(handler.calls(), 1);

    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}
