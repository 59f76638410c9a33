// slicehouse_server/src/web/handlers/menu_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;

#[instrument(name = "handler::menu", skip(app_state))]
pub async fn menu_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let items = app_state.orders.menu().await?;
  info!("Fetched {} menu items.", items.len());
  Ok(HttpResponse::Ok().json(items))
}
