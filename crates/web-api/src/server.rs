use crate::handlers::{self, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    #[must_use]
    pub const fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/webhook", post(handlers::webhook))
            .route("/health", get(handlers::health))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Starts the webhook server listening on the specified address.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the address or serve
    /// requests.
    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Webhook API listening on {}", addr);

        axum::serve(
            listener,
            self.router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;

        Ok(())
    }
}
