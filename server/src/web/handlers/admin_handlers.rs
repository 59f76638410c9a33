// slicehouse_server/src/web/handlers/admin_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AdminCaller;

#[instrument(name = "handler::kitchen_board", skip_all)]
pub async fn kitchen_board_handler(
  app_state: web::Data<AppState>,
  _admin: AdminCaller,
) -> Result<HttpResponse, AppError> {
  let board = app_state.orders.kitchen_board().await?;
  Ok(HttpResponse::Ok().json(board))
}

#[instrument(name = "handler::backfill_invoices", skip_all)]
pub async fn backfill_invoices_handler(
  app_state: web::Data<AppState>,
  _admin: AdminCaller,
) -> Result<HttpResponse, AppError> {
  let backfilled = app_state.orders.backfill_invoice_numbers().await?;
  info!(backfilled, "Invoice backfill finished.");
  Ok(HttpResponse::Ok().json(json!({ "backfilled": backfilled })))
}
