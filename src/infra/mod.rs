pub mod config;
pub mod payment;

use std::time::Duration;

/// Shared HTTP client for every remote adapter. Cloning it shares the connection pool.
pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(timeout).build()
}

/// Serves `router` on an ephemeral local port and returns its base URL.
/// Remote adapter tests point their clients at it in place of the real service.
#[cfg(test)]
pub(crate) async fn serve_fake(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}
