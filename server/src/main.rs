// slicehouse_server/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use slicehouse_server::config::AppConfig;
use slicehouse_server::errors::json_error_handler;
use slicehouse_server::web::configure_app_routes;
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting Slicehouse order server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
    }
  };

  let (app_state, outbox_worker) = match slicehouse_server::bootstrap(app_config.clone()).await {
    Ok(parts) => parts,
    Err(e) => {
      tracing::error!(error = %e, "Failed to start the order service.");
      return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
    }
  };

  let server_address = app_config.bind_address();
  tracing::info!("Attempting to bind server to {}...", server_address);

  let server_state = app_state.clone();
  let result = HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(server_state.clone()))
      .app_data(actix_data::JsonConfig::default().error_handler(json_error_handler))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await;

  // Dropping the last state handle closes the outbox; let queued
  // notifications finish before exiting.
  drop(app_state);
  if let Err(e) = outbox_worker.await {
    tracing::warn!(error = %e, "Outbox worker ended abnormally.");
  }
  result
}
