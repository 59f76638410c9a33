// slicehouse_server/src/web/extractors.rs

//! Caller identification from request headers.
//!
//! `X-Admin-Key` must match `ADMIN_API_KEY`; `X-User-ID` names a registered
//! user. A request with neither is a guest.

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use slicehouse::Caller;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";
pub const USER_ID_HEADER: &str = "X-User-ID";

#[derive(Debug, Clone, Copy)]
pub struct RequestCaller(pub Caller);

fn identify(req: &HttpRequest) -> Result<Caller, AppError> {
  let state = req
    .app_data::<web::Data<AppState>>()
    .ok_or_else(|| AppError::Internal("application state is not registered".to_string()))?;

  if let Some(key) = req.headers().get(ADMIN_KEY_HEADER) {
    if key.as_bytes() == state.config.admin_api_key.as_bytes() {
      return Ok(Caller::Admin);
    }
    warn!("Rejected request with a wrong admin key.");
    return Err(AppError::Forbidden("Invalid admin key".to_string()));
  }

  match req.headers().get(USER_ID_HEADER) {
    None => Ok(Caller::Guest),
    Some(raw) => raw
      .to_str()
      .ok()
      .and_then(|s| Uuid::parse_str(s.trim()).ok())
      .map(Caller::User)
      .ok_or_else(|| AppError::Validation(format!("{} must be a UUID", USER_ID_HEADER))),
  }
}

impl FromRequest for RequestCaller {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(identify(req).map(RequestCaller))
  }
}

/// Only lets admin callers through.
#[derive(Debug, Clone, Copy)]
pub struct AdminCaller;

impl FromRequest for AdminCaller {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(match identify(req) {
      Ok(Caller::Admin) => Ok(AdminCaller),
      Ok(_) => Err(AppError::Forbidden("Admin access required".to_string())),
      Err(e) => Err(e),
    })
  }
}
