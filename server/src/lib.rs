// slicehouse_server/src/lib.rs

//! HTTP front end for the Slicehouse order pipeline.

pub mod config;
pub mod errors;
pub mod notify;
pub mod persistence;
pub mod state;
pub mod web;

use crate::config::{AppConfig, StoreBackend};
use crate::errors::{AppError, Result};
use crate::persistence::PgStore;
use crate::state::AppState;
use chrono::Utc;
use slicehouse::store::{MemoryStore, NotificationLogRepository};
use slicehouse::Ports;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Connects the configured backend, applies migrations, backfills invoice
/// numbers and returns the shared state plus the outbox worker handle.
pub async fn bootstrap(config: Arc<AppConfig>) -> Result<(AppState, JoinHandle<()>)> {
  let (ports, logs): (Ports, Arc<dyn NotificationLogRepository>) = match config.store_backend {
    StoreBackend::Postgres => {
      let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| AppError::Config("DATABASE_URL is required for the postgres backend".to_string()))?;
      let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
      info!("Successfully connected to the database.");
      sqlx::migrate!("./migrations").run(&pool).await?;
      info!("Database migrations applied.");

      let store = Arc::new(PgStore::new(pool));
      if config.seed_db {
        store
          .seed_demo_data(&MemoryStore::with_demo_data(Utc::now()))
          .await
          .map_err(slicehouse::OrderError::from)?;
      }
      let logs: Arc<dyn NotificationLogRepository> = store.clone();
      (Ports::from_store(store), logs)
    }
    StoreBackend::Memory => {
      info!("Using the in-memory store with the demo menu.");
      let store = Arc::new(MemoryStore::with_demo_data(Utc::now()));
      let logs: Arc<dyn NotificationLogRepository> = store.clone();
      (Ports::from_store(store), logs)
    }
  };

  let (state, worker) = AppState::spawn(config, ports, logs)?;
  let backfilled = state.orders.backfill_invoice_numbers().await?;
  if backfilled > 0 {
    info!(backfilled, "Assigned invoice numbers to older orders.");
  }
  Ok((state, worker))
}
