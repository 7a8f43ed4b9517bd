use axum::{Router, body::Bytes, extract::State, response::Html, routing::get};
use tracing::info;

use crate::domain::DashboardError;

/// Single route: the pre-rendered page at `/`. Everything else is a 404.
pub fn router(page: Bytes) -> Router {
    Router::new().route("/", get(index)).with_state(page)
}

/// Binds `addr` and serves the page until the process is stopped.
pub async fn serve(page: Bytes, addr: &str) -> Result<(), DashboardError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Dashboard listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(page)).await?;
    Ok(())
}

async fn index(State(page): State<Bytes>) -> Html<Bytes> {
    Html(page)
}
