use std::net::SocketAddr;

use anyhow::Context;
use dotenvy::dotenv;
use tokio::signal;

use contact_relay::app::create_app;
use contact_relay::config::AppConfig;
use contact_relay::state::SharedAppState;
use contact_relay::utils::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenv().ok();

  init_tracing();

  let config = AppConfig::from_env()?;
  let app_state = SharedAppState::new(&config)?;
  let app = create_app(app_state, &config.allowed_origins);

  let listener = tokio::net::TcpListener::bind(&config.bind_addr)
    .await
    .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

  tracing::info!("Contact relay listening on http://{}", config.bind_addr);

  axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
    .with_graceful_shutdown(shutdown_signal())
    .await?;

  Ok(())
}

async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = signal::ctrl_c().await {
      tracing::error!("Failed to install Ctrl+C handler: {}", e);
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
      Ok(mut sigterm) => {
        sigterm.recv().await;
      }
      Err(e) => {
        tracing::error!("Failed to install SIGTERM handler: {}", e);
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
      _ = ctrl_c => {},
      _ = terminate => {},
  }

  tracing::info!("Received termination signal, shutting down gracefully...");
}
