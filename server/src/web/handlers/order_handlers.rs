// slicehouse_server/src/web/handlers/order_handlers.rs

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use slicehouse::model::OrderStatus;
use slicehouse::orders::RepeatRequest;
use slicehouse::PlaceOrderRequest;
use tracing::{info, instrument};
use uuid::Uuid;

use super::PhoneQuery;
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::RequestCaller;

#[instrument(
  name = "handler::place_order",
  skip(app_state, req_payload),
  fields(caller = ?caller.0, items = req_payload.items.len())
)]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  caller: RequestCaller,
  req_payload: web::Json<PlaceOrderRequest>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.orders.place_order(caller.0, req_payload.into_inner()).await?;
  info!(order_id = %order.id, order_number = order.order_number, total = %order.total, "Order placed.");
  Ok(HttpResponse::Created().json(order))
}

#[instrument(name = "handler::get_order", skip(app_state, query), fields(order_id = %path.as_ref()))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  caller: RequestCaller,
  path: web::Path<Uuid>,
  query: web::Query<PhoneQuery>,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .orders
    .get_order(caller.0, path.into_inner(), query.phone.as_deref())
    .await?;
  Ok(HttpResponse::Ok().json(order))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdatePayload {
  pub status: OrderStatus,
}

#[instrument(
  name = "handler::update_status",
  skip(app_state, req_payload),
  fields(order_id = %path.as_ref(), status = %req_payload.status)
)]
pub async fn update_status_handler(
  app_state: web::Data<AppState>,
  caller: RequestCaller,
  path: web::Path<Uuid>,
  req_payload: web::Json<StatusUpdatePayload>,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .orders
    .update_status(caller.0, path.into_inner(), req_payload.status)
    .await?;
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::invoice", skip(app_state, query), fields(order_id = %path.as_ref()))]
pub async fn invoice_handler(
  app_state: web::Data<AppState>,
  caller: RequestCaller,
  path: web::Path<Uuid>,
  query: web::Query<PhoneQuery>,
) -> Result<HttpResponse, AppError> {
  let document = app_state
    .orders
    .invoice_document(caller.0, path.into_inner(), query.phone.as_deref())
    .await?;
  Ok(
    HttpResponse::Ok()
      .content_type("text/plain; charset=utf-8")
      .insert_header(ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(document.file_name)],
      })
      .body(document.body),
  )
}

#[instrument(name = "handler::repeat_order", skip(app_state, req_payload), fields(order_id = %req_payload.order_id))]
pub async fn repeat_order_handler(
  app_state: web::Data<AppState>,
  caller: RequestCaller,
  req_payload: web::Json<RepeatRequest>,
) -> Result<HttpResponse, AppError> {
  let cart = app_state.orders.repeat_order(caller.0, req_payload.into_inner()).await?;
  Ok(HttpResponse::Ok().json(cart))
}
