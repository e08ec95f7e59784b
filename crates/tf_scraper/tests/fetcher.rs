use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    http::{HeaderMap, StatusCode},
    routing::get,
    Router,
};
use tf_scraper::prelude::*;
use tf_scraper::USER_AGENT;

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn test_app() -> Router {
    Router::new()
        .route("/article", get(|| async { "<html><body><p>Hello</p></body></html>" }))
        .route(
            "/agent",
            get(|headers: HeaderMap| async move {
                headers
                    .get("user-agent")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string()
            }),
        )
        .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "gone") }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "too late"
            }),
        )
}

#[tokio::test]
async fn test_fetches_page_body() {
    let addr = serve(test_app()).await;
    let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();

    let body = fetcher.fetch(&format!("http://{}/article", addr)).await.unwrap();
    assert_eq!(body, "<html><body><p>Hello</p></body></html>");
}

#[tokio::test]
async fn test_sends_browser_user_agent() {
    let addr = serve(test_app()).await;
    let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();

    let agent = fetcher.fetch(&format!("http://{}/agent", addr)).await.unwrap();
    assert_eq!(agent, USER_AGENT);
}

#[tokio::test]
async fn test_error_status_is_a_failure() {
    let addr = serve(test_app()).await;
    let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();

    assert!(fetcher.fetch(&format!("http://{}/missing", addr)).await.is_err());
}

#[tokio::test]
async fn test_timeout_is_a_failure() {
    let addr = serve(test_app()).await;
    let fetcher = HttpFetcher::new(Duration::from_millis(200)).unwrap();

    assert!(fetcher.fetch(&format!("http://{}/slow", addr)).await.is_err());
}
