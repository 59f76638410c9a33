// slicehouse_server/src/web/handlers/coupon_handlers.rs

use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponPayload {
  pub code: String,
  pub cart_total: Decimal,
}

/// Pre-checkout check. Answers with the discount the coupon would grant;
/// nothing is redeemed.
#[instrument(name = "handler::validate_coupon", skip(app_state), fields(code = %req_payload.code))]
pub async fn validate_coupon_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<ValidateCouponPayload>,
) -> Result<HttpResponse, AppError> {
  let applied = app_state
    .orders
    .validate_coupon(&req_payload.code, req_payload.cart_total)
    .await?;
  Ok(HttpResponse::Ok().json(applied))
}
