//! Republishes the reconciled GTFS-realtime data over HTTP, content-negotiated
//! between the binary `FeedMessage` and a JSON view, with an optional
//! response cache in front of it.

use std::sync::{Arc, Mutex};

use database::StoreReader;
use tokio::net::TcpListener;

pub mod api;
pub mod cache;
pub mod config;
pub mod feed;

pub use api::WebState;
pub use cache::ResponseCache;
pub use config::WebConfig;

/// Binds and serves the Read API until `shutdown` resolves. The reader
/// connection is owned by `state` for the lifetime of the server, never
/// touched by any other task.
pub async fn start_web_server(
    reader: StoreReader,
    config: WebConfig,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let cache = config.caching.enabled.then(|| Arc::new(ResponseCache::new()));
    let bind = config.bind.clone();

    let state = WebState {
        reader: Arc::new(Mutex::new(reader)),
        config: Arc::new(config),
        cache,
    };

    let router = api::router(state);
    let listener = TcpListener::bind(&bind).await?;
    tracing::info!(bind = %bind, "HTTP read API listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
}
