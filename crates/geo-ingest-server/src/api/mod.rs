pub mod response;
pub mod routes;

use crate::{
    config::{Config, ServerConfig},
    middleware,
    storage::{ObjectFetcher, S3Fetcher},
};
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use geo_ingest::service::IngestService;
use std::{
    future::{Future, IntoFuture},
    net::SocketAddr,
    sync::Arc,
    time::Duration,
};
use tokio::{net::TcpListener, signal, sync::Notify};
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub service: IngestService,
    pub fetcher: Arc<dyn ObjectFetcher>,
}

impl AppState {
    pub fn new(service: IngestService, fetcher: Arc<dyn ObjectFetcher>) -> Self {
        Self { service, fetcher }
    }

    /// DynamoDB, SNS and S3 clients from one shared SDK configuration
    pub async fn from_config(config: &Config) -> Self {
        let sdk_config = config.ingest.sdk_config().await;
        let service = IngestService::from_config(&config.ingest).await;
        Self::new(service, Arc::new(S3Fetcher::from_sdk_config(&sdk_config)))
    }
}

/// Create the application router with all routes and middleware
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(routes::health_check))
        .nest("/api/v1", routes::ingest_routes())
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(middleware::tracing_layer())
}

pub async fn serve(config: Config) -> anyhow::Result<()> {
    let state = AppState::from_config(&config).await;
    info!(
        table = state.service.pipeline().table_name(),
        batch_size = state.service.pipeline().batch_size().get(),
        alerts = config.ingest.topic_arn.is_some(),
        "Ingestion service ready"
    );

    let app = create_router(state, &config.server);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    serve_until(
        listener,
        app,
        shutdown_signal(),
        Duration::from_secs(config.server.shutdown_timeout_secs),
    )
    .await?;

    Ok(())
}

/// Serve until `signal` resolves, then wait at most `drain_timeout` for
/// in-flight requests before returning
pub async fn serve_until<F>(
    listener: TcpListener,
    app: Router,
    signal: F,
    drain_timeout: Duration,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let draining = Arc::new(Notify::new());
    let server = axum::serve(listener, app).with_graceful_shutdown({
        let draining = draining.clone();
        async move {
            signal.await;
            draining.notify_one();
        }
    });

    let drain_deadline = async {
        draining.notified().await;
        info!("Waiting up to {:?} for in-flight requests", drain_timeout);
        tokio::time::sleep(drain_timeout).await;
    };

    tokio::select! {
        result = server.into_future() => {
            result?;
            info!("Server shut down gracefully");
        },
        _ = drain_deadline => {
            warn!("In-flight requests still running after {:?}, shutting down", drain_timeout);
        },
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_shutdown_without_requests_is_immediate() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

        tokio::time::timeout(
            Duration::from_secs(5),
            serve_until(listener, Router::new(), async {}, Duration::from_secs(30)),
        )
        .await
        .expect("server did not stop")
        .unwrap();
    }

    #[tokio::test]
    async fn test_drain_is_bounded_by_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let entered = Arc::new(Notify::new());
        let app = Router::new().route(
            "/stuck",
            get({
                let entered = entered.clone();
                move || {
                    let entered = entered.clone();
                    async move {
                        entered.notify_one();
                        std::future::pending::<()>().await
                    }
                }
            }),
        );

        tokio::spawn(async move {
            let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
            stream
                .write_all(b"GET /stuck HTTP/1.1\r\nHost: localhost\r\n\r\n")
                .await
                .unwrap();
            let mut buf = [0u8; 64];
            let _ = stream.read(&mut buf).await;
        });

        let started = Instant::now();
        let signal = {
            let entered = entered.clone();
            async move { entered.notified().await }
        };

        tokio::time::timeout(
            Duration::from_secs(5),
            serve_until(listener, app, signal, Duration::from_millis(200)),
        )
        .await
        .expect("drain was not bounded")
        .unwrap();

        assert!(started.elapsed() >= Duration::from_millis(200));
    }
}
