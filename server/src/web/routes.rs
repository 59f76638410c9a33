// slicehouse_server/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{admin_handlers, coupon_handlers, live_handlers, menu_handlers, order_handlers};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .route("/menu", web::get().to(menu_handlers::menu_handler))
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::place_order_handler))
          // Registered before `/{id}` so "repeat" is never read as an id.
          .route("/repeat", web::post().to(order_handlers::repeat_order_handler))
          .route("/{id}", web::get().to(order_handlers::get_order_handler))
          .route("/{id}/status", web::put().to(order_handlers::update_status_handler))
          .route("/{id}/invoice", web::get().to(order_handlers::invoice_handler))
          .route("/{id}/live", web::get().to(live_handlers::order_live_handler)),
      )
      .service(
        web::scope("/coupons").route("/validate", web::post().to(coupon_handlers::validate_coupon_handler)),
      )
      .service(
        web::scope("/admin")
          .route("/kitchen", web::get().to(admin_handlers::kitchen_board_handler))
          .route(
            "/invoices/backfill",
            web::post().to(admin_handlers::backfill_invoices_handler),
          ),
      ),
  );
}
