//! Liveness endpoint for hosts that expect the process to answer HTTP.

use {
    axum::{Router, routing::get},
    tokio::net::TcpListener,
    tokio_util::sync::CancellationToken,
    tracing::info,
};

use chatrelay_config::ServerConfig;

pub const ALIVE: &str = "I am alive";

pub fn router() -> Router {
    Router::new().route("/", get(|| async { ALIVE }))
}

/// Bind `config.bind:config.port` and serve until `shutdown` is cancelled.
pub async fn serve(config: ServerConfig, shutdown: CancellationToken) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.bind, config.port);
    let listener = TcpListener::bind(&addr).await?;
    serve_on(listener, shutdown).await
}

pub async fn serve_on(listener: TcpListener, shutdown: CancellationToken) -> anyhow::Result<()> {
    info!(addr = %listener.local_addr()?, "liveness server listening");
    axum::serve(listener, router())
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    info!("liveness server stopped");
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn root_reports_alive_until_cancelled() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let token = CancellationToken::new();
        let server = tokio::spawn(serve_on(listener, token.clone()));

        let resp = reqwest::get(format!("http://{addr}/")).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.text().await.unwrap(), ALIVE);

        let missing = reqwest::get(format!("http://{addr}/nope")).await.unwrap();
        assert_eq!(missing.status(), 404);

        token.cancel();
        server.await.unwrap().unwrap();
    }
}
