// slicehouse_server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use rust_decimal::Decimal;
use slicehouse::orders::invoice::InvoiceHeader;
use slicehouse::orders::{AddonRepricing, TransitionPolicy};
use slicehouse::OrderPolicy;
use std::env;
use std::str::FromStr;

/// Where orders, catalog and coupons live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
  Postgres,
  /// In-process store seeded with a demo menu. Data is lost on restart.
  Memory,
}

#[derive(Debug, Clone)]
pub struct NotifyConfig {
  pub sms_enabled: bool,
  pub whatsapp_enabled: bool,
  pub sms_gateway_url: Option<String>,
  pub whatsapp_gateway_url: Option<String>,
  pub timeout_ms: u64,
  pub max_attempts: u32,
  pub outbox_capacity: usize,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub store_backend: StoreBackend,
  pub database_url: Option<String>,
  pub seed_db: bool,
  pub admin_api_key: String,

  pub gst_rate: Decimal,
  pub schedule_min_lead_minutes: i64,
  pub transitions: TransitionPolicy,
  pub addon_repricing: AddonRepricing,
  pub store_name: String,
  pub store_gstin: Option<String>,

  pub notify: NotifyConfig,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from any key lookup. `from_env` passes the process
  /// environment.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let require = |name: &str| {
      get(name).ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", name)))
    };

    let server_host = get("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = parse_or("SERVER_PORT", get("SERVER_PORT"), 8080u16)?;

    let store_backend = match get("STORE_BACKEND").as_deref().map(str::to_ascii_lowercase).as_deref() {
      None | Some("postgres") => StoreBackend::Postgres,
      Some("memory") => StoreBackend::Memory,
      Some(other) => {
        return Err(AppError::Config(format!(
          "Invalid STORE_BACKEND '{}': expected 'postgres' or 'memory'",
          other
        )))
      }
    };
    let database_url = match store_backend {
      StoreBackend::Postgres => Some(require("DATABASE_URL")?),
      StoreBackend::Memory => get("DATABASE_URL"),
    };
    let seed_db = parse_or("SEED_DB", get("SEED_DB"), false)?;
    let admin_api_key = require("ADMIN_API_KEY")?;

    let gst_rate = parse_or("GST_RATE", get("GST_RATE"), Decimal::from(5))?;
    if gst_rate.is_sign_negative() || gst_rate > Decimal::from(100) {
      return Err(AppError::Config(format!("Invalid GST_RATE {}: must be between 0 and 100", gst_rate)));
    }
    let schedule_min_lead_minutes = parse_or("SCHEDULE_MIN_LEAD_MINUTES", get("SCHEDULE_MIN_LEAD_MINUTES"), 30i64)?;
    if schedule_min_lead_minutes < 0 {
      return Err(AppError::Config("Invalid SCHEDULE_MIN_LEAD_MINUTES: must not be negative".to_string()));
    }

    let transitions = match get("STATUS_TRANSITIONS") {
      None => TransitionPolicy::default(),
      Some(raw) => TransitionPolicy::parse(&raw).ok_or_else(|| {
        AppError::Config(format!("Invalid STATUS_TRANSITIONS '{}': expected 'strict' or 'permissive'", raw))
      })?,
    };
    let addon_repricing = match get("REPEAT_ADDON_PRICING") {
      None => AddonRepricing::default(),
      Some(raw) => AddonRepricing::parse(&raw).ok_or_else(|| {
        AppError::Config(format!(
          "Invalid REPEAT_ADDON_PRICING '{}': expected 'historical' or 'current'",
          raw
        ))
      })?,
    };

    let store_name = get("STORE_NAME").unwrap_or_else(|| InvoiceHeader::default().store_name);
    let store_gstin = get("STORE_GSTIN");

    let notify = NotifyConfig {
      sms_enabled: parse_or("NOTIFY_SMS_ENABLED", get("NOTIFY_SMS_ENABLED"), false)?,
      whatsapp_enabled: parse_or("NOTIFY_WHATSAPP_ENABLED", get("NOTIFY_WHATSAPP_ENABLED"), false)?,
      sms_gateway_url: get("SMS_GATEWAY_URL"),
      whatsapp_gateway_url: get("WHATSAPP_GATEWAY_URL"),
      timeout_ms: parse_or("NOTIFY_TIMEOUT_MS", get("NOTIFY_TIMEOUT_MS"), 5000u64)?,
      max_attempts: parse_or("NOTIFY_MAX_ATTEMPTS", get("NOTIFY_MAX_ATTEMPTS"), 2u32)?,
      outbox_capacity: parse_or("OUTBOX_CAPACITY", get("OUTBOX_CAPACITY"), 256usize)?,
    };
    if notify.max_attempts == 0 {
      return Err(AppError::Config("Invalid NOTIFY_MAX_ATTEMPTS: must be at least 1".to_string()));
    }
    if notify.sms_enabled && notify.sms_gateway_url.is_none() {
      return Err(AppError::Config("NOTIFY_SMS_ENABLED requires SMS_GATEWAY_URL".to_string()));
    }
    if notify.whatsapp_enabled && notify.whatsapp_gateway_url.is_none() {
      return Err(AppError::Config("NOTIFY_WHATSAPP_ENABLED requires WHATSAPP_GATEWAY_URL".to_string()));
    }

    tracing::info!(backend = ?store_backend, "Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      store_backend,
      database_url,
      seed_db,
      admin_api_key,
      gst_rate,
      schedule_min_lead_minutes,
      transitions,
      addon_repricing,
      store_name,
      store_gstin,
      notify,
    })
  }

  /// The business policy handed to the order service.
  pub fn order_policy(&self) -> OrderPolicy {
    OrderPolicy {
      gst_rate: self.gst_rate,
      min_schedule_lead: chrono::Duration::minutes(self.schedule_min_lead_minutes),
      transitions: self.transitions,
      addon_repricing: self.addon_repricing,
      invoice: InvoiceHeader {
        store_name: self.store_name.clone(),
        gstin: self.store_gstin.clone(),
      },
    }
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match raw {
    None => Ok(default),
    Some(raw) => raw
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} '{}': {}", name, raw, e))),
  }
}
