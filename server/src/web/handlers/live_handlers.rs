// slicehouse_server/src/web/handlers/live_handlers.rs

//! Live order status over a WebSocket.
//!
//! The socket first receives the current status, then one JSON `StatusEvent`
//! per change. Subscribing has the same access rules as reading the order.

use actix_web::{web, HttpRequest, HttpResponse};
use actix_ws::{CloseCode, CloseReason, Message};
use chrono::Utc;
use slicehouse::StatusEvent;
use std::time::{Duration, Instant};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::PhoneQuery;
use crate::state::AppState;
use crate::web::extractors::RequestCaller;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

#[instrument(name = "handler::order_live", skip(app_state, req, body, query), fields(order_id = %path.as_ref()))]
pub async fn order_live_handler(
  app_state: web::Data<AppState>,
  caller: RequestCaller,
  path: web::Path<Uuid>,
  query: web::Query<PhoneQuery>,
  req: HttpRequest,
  body: web::Payload,
) -> actix_web::Result<HttpResponse> {
  let order_id = path.into_inner();
  let order = app_state
    .orders
    .get_order(caller.0, order_id, query.phone.as_deref())
    .await
    .map_err(crate::errors::AppError::from)?;

  // Subscribe before answering so no change between the read and the
  // upgrade is lost.
  let mut events = app_state.orders.broadcaster().subscribe(order_id);
  let (response, mut session, mut messages) = actix_ws::handle(&req, body)?;

  let snapshot = StatusEvent {
    order_id,
    order_number: order.order_number,
    previous: None,
    status: order.status,
    at: Utc::now(),
  };

  actix_web::rt::spawn(async move {
    info!(%order_id, "Live status socket opened.");
    if let Ok(text) = serde_json::to_string(&snapshot) {
      if session.text(text).await.is_err() {
        return;
      }
    }

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    let mut last_seen = Instant::now();

    let reason = loop {
      tokio::select! {
        event = events.recv() => match event {
          Ok(event) => {
            let Ok(text) = serde_json::to_string(&event) else { continue };
            if session.text(text).await.is_err() {
              break None;
            }
          }
          Err(RecvError::Lagged(skipped)) => {
            warn!(%order_id, skipped, "Live subscriber fell behind; events dropped.");
          }
          Err(RecvError::Closed) => break Some(CloseReason::from(CloseCode::Normal)),
        },
        msg = messages.recv() => match msg {
          Some(Ok(Message::Ping(bytes))) => {
            last_seen = Instant::now();
            if session.pong(&bytes).await.is_err() {
              break None;
            }
          }
          Some(Ok(Message::Pong(_))) | Some(Ok(Message::Text(_))) => last_seen = Instant::now(),
          Some(Ok(Message::Close(reason))) => break reason,
          Some(Ok(_)) => {}
          Some(Err(e)) => {
            debug!(%order_id, error = %e, "Live socket protocol error.");
            break None;
          }
          None => break None,
        },
        _ = heartbeat.tick() => {
          if last_seen.elapsed() > CLIENT_TIMEOUT {
            debug!(%order_id, "Live socket client stopped answering pings.");
            break None;
          }
          if session.ping(b"").await.is_err() {
            break None;
          }
        }
      }
    };

    let _ = session.close(reason).await;
    info!(%order_id, "Live status socket closed.");
  });

  Ok(response)
}
