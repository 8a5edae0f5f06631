use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::{routing::get, Router};
use catalog_core::config::{ConfigOverrides, LoadOptions};
use catalog_server::{bootstrap::bootstrap, router, serve_until};
use reqwest::StatusCode;
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const SLOW_ROUTE_DELAY: Duration = Duration::from_millis(800);

struct RunningServer {
    base_url: String,
    address: SocketAddr,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl RunningServer {
    async fn spawn(app: Router, drain: Duration) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
        let address = listener.local_addr().expect("local addr");
        let (stop, stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(serve_until(
            listener,
            app,
            async move {
                let _ = stop_rx.await;
            },
            drain,
        ));

        Self { base_url: format!("http://{address}"), address, stop, handle }
    }
}

fn slow_app() -> Router {
    Router::new().route(
        "/slow",
        get(|| async {
            tokio::time::sleep(SLOW_ROUTE_DELAY).await;
            "done"
        }),
    )
}

#[tokio::test]
async fn end_to_end_lookup_from_empty_store_then_graceful_shutdown() {
    let app = bootstrap(LoadOptions {
        overrides: ConfigOverrides {
            database_url: Some("sqlite::memory:".to_string()),
            ..ConfigOverrides::default()
        },
        ..LoadOptions::default()
    })
    .await
    .expect("bootstrap from empty store");
    assert_eq!(app.seed.inserted, 3, "empty store should be seeded on startup");

    let server = RunningServer::spawn(
        router(app.resolver.clone(), app.db_pool.clone()),
        Duration::from_secs(5),
    )
    .await;
    let client = reqwest::Client::new();

    let found = client
        .get(format!("{}/?code=E33", server.base_url))
        .send()
        .await
        .expect("lookup request");
    assert_eq!(found.status(), StatusCode::OK);
    let payload = found.json::<Value>().await.expect("json product body");
    assert_eq!(payload["code"], "E33");
    assert_eq!(payload["price"], 200);

    let missing = client
        .get(format!("{}/?code=ZZZ", server.base_url))
        .send()
        .await
        .expect("lookup request");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let payload = missing.json::<Value>().await.expect("json error body");
    assert_eq!(payload["error"], "product not found");
    assert!(!payload.to_string().contains("products"));

    let health = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await
        .expect("health request");
    assert_eq!(health.status(), StatusCode::OK);
    let payload = health.json::<Value>().await.expect("json health body");
    assert_eq!(payload["catalog"]["live_products"], 3);

    drop(client);
    server.stop.send(()).expect("signal shutdown");
    let result = tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server stops within the drain window")
        .expect("server task joins");
    assert!(result.is_ok());

    assert!(TcpStream::connect(server.address).await.is_err(), "listener should be closed");

    app.db_pool.close().await;
}

#[tokio::test]
async fn in_flight_request_completes_within_drain_window() {
    let server = RunningServer::spawn(slow_app(), Duration::from_secs(5)).await;
    let url = format!("{}/slow", server.base_url);

    let request = tokio::spawn(async move { reqwest::Client::new().get(url).send().await });
    tokio::time::sleep(Duration::from_millis(200)).await;

    server.stop.send(()).expect("signal shutdown");

    let response = request.await.expect("client task joins").expect("in-flight request answered");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.expect("body"), "done");

    let result = tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server stops once drained")
        .expect("server task joins");
    assert!(result.is_ok());
}

#[tokio::test]
async fn drain_window_bounds_shutdown_with_requests_in_flight() {
    let drain = Duration::from_millis(100);
    let server = RunningServer::spawn(slow_app(), drain).await;
    let url = format!("{}/slow", server.base_url);

    let request = tokio::spawn(async move { reqwest::Client::new().get(url).send().await });
    tokio::time::sleep(Duration::from_millis(200)).await;

    let stopped_at = Instant::now();
    server.stop.send(()).expect("signal shutdown");
    let result = tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server returns at the drain deadline")
        .expect("server task joins");
    let elapsed = stopped_at.elapsed();

    assert!(result.is_ok());
    assert!(elapsed >= drain, "returned before the drain window: {elapsed:?}");
    assert!(
        elapsed < SLOW_ROUTE_DELAY - Duration::from_millis(200),
        "waited for the slow request instead of the deadline: {elapsed:?}"
    );

    request.abort();
}
