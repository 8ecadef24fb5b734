use crate::integration::init_tracing;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::post;
use std::net::SocketAddr;
use viaduct_client::{ExchangeFault, HttpExchange, SignalingExchange};
use viaduct_core::SessionDocument;

async fn spawn_routes() -> SocketAddr {
    let app = Router::new()
        .route("/failing", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route("/not-json", post(|| async { "certainly not json" }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    addr
}

#[tokio::test]
async fn non_2xx_status_is_a_status_fault() {
    init_tracing();
    let addr = spawn_routes().await;

    let fault = HttpExchange::new()
        .exchange(
            &format!("http://{addr}/failing"),
            &SessionDocument::offer("v=0\r\n"),
        )
        .await
        .expect_err("exchange must fail");
    assert!(matches!(fault, ExchangeFault::Status(500)));
}

#[tokio::test]
async fn non_json_body_is_a_body_fault() {
    init_tracing();
    let addr = spawn_routes().await;

    let fault = HttpExchange::new()
        .exchange(
            &format!("http://{addr}/not-json"),
            &SessionDocument::offer("v=0\r\n"),
        )
        .await
        .expect_err("exchange must fail");
    assert!(matches!(fault, ExchangeFault::Body(_)));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_request_fault() {
    init_tracing();

    // Nothing listens on the discard port.
    let fault = HttpExchange::new()
        .exchange("http://127.0.0.1:9/sdp", &SessionDocument::offer("v=0\r\n"))
        .await
        .expect_err("exchange must fail");
    assert!(matches!(fault, ExchangeFault::Request(_)));
}
