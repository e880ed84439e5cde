use std::path::PathBuf;

use tokio::net::TcpListener;
use todo_server::ServerConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Loaded before the subscriber so RUST_LOG can come from .env.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_server=debug,todo_core=debug,tower_http=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(err) = dotenv_failure(dotenv) {
        tracing::warn!(error = %err, "failed to load .env");
    }

    let config = ServerConfig::from_env()?;
    let addr = config.bind_address();
    tracing::info!(
        environment = %config.environment,
        cors_origins = ?config.cors_origins,
        "configuration loaded"
    );

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("listening on http://{addr}");

    axum::serve(listener, todo_server::app(config))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// A missing `.env` is fine; one that fails to parse is not.
fn dotenv_failure(result: Result<PathBuf, dotenvy::Error>) -> Option<dotenvy::Error> {
    match result {
        Ok(_) => None,
        Err(err) if err.not_found() => None,
        Err(err) => Some(err),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn missing_dotenv_is_ignored() {
        let missing = dotenvy::Error::Io(io::Error::from(io::ErrorKind::NotFound));
        assert!(dotenv_failure(Err(missing)).is_none());
        assert!(dotenv_failure(Ok(PathBuf::from(".env"))).is_none());
    }

    #[test]
    fn unparsable_dotenv_is_reported() {
        let bad = dotenvy::Error::LineParse("PORT 5000".into(), 5);
        assert!(matches!(dotenv_failure(Err(bad)), Some(dotenvy::Error::LineParse(..))));
    }
}
