// tests/config_tests.rs
mod common;

use common::config_with;
use rust_decimal_macros::dec;
use serial_test::serial;
use slicehouse::orders::{AddonRepricing, TransitionPolicy};
use slicehouse_server::config::{AppConfig, StoreBackend};
use slicehouse_server::errors::AppError;
use std::collections::HashMap;
use std::env;

const CONFIG_VARS: &[&str] = &[
  "SERVER_HOST",
  "SERVER_PORT",
  "STORE_BACKEND",
  "DATABASE_URL",
  "SEED_DB",
  "ADMIN_API_KEY",
  "GST_RATE",
  "SCHEDULE_MIN_LEAD_MINUTES",
  "STATUS_TRANSITIONS",
  "REPEAT_ADDON_PRICING",
  "STORE_NAME",
  "STORE_GSTIN",
  "NOTIFY_SMS_ENABLED",
  "NOTIFY_WHATSAPP_ENABLED",
  "SMS_GATEWAY_URL",
  "WHATSAPP_GATEWAY_URL",
  "NOTIFY_TIMEOUT_MS",
  "NOTIFY_MAX_ATTEMPTS",
  "OUTBOX_CAPACITY",
];

fn with_env(vars: &[(&str, &str)]) {
  for name in CONFIG_VARS {
    env::remove_var(name);
  }
  for (name, value) in vars {
    env::set_var(name, value);
  }
}

fn lookup_error(vars: &[(&str, &str)]) -> String {
  let map: HashMap<&str, &str> = vars.iter().copied().collect();
  match AppConfig::from_lookup(|name| map.get(name).map(|v| v.to_string())) {
    Err(AppError::Config(message)) => message,
    other => panic!("expected a config error, got {:?}", other.map(|_| ())),
  }
}

#[test]
#[serial]
fn defaults_fill_everything_but_the_secrets() {
  with_env(&[("DATABASE_URL", "postgres://localhost/slicehouse"), ("ADMIN_API_KEY", "k")]);
  let config = AppConfig::from_env().unwrap();

  assert_eq!(config.bind_address(), "127.0.0.1:8080");
  assert_eq!(config.store_backend, StoreBackend::Postgres);
  assert_eq!(config.gst_rate, dec!(5));
  assert_eq!(config.schedule_min_lead_minutes, 30);
  assert_eq!(config.transitions, TransitionPolicy::Strict);
  assert_eq!(config.addon_repricing, AddonRepricing::Historical);
  assert!(!config.seed_db);
  assert!(!config.notify.sms_enabled);
  assert_eq!(config.notify.max_attempts, 2);
  assert_eq!(config.notify.timeout_ms, 5000);
}

#[test]
#[serial]
fn missing_admin_key_is_rejected() {
  with_env(&[("STORE_BACKEND", "memory")]);
  match AppConfig::from_env() {
    Err(AppError::Config(message)) => assert!(message.contains("ADMIN_API_KEY")),
    other => panic!("unexpected: {:?}", other.map(|_| ())),
  }
}

#[test]
#[serial]
fn postgres_backend_needs_a_database_url() {
  with_env(&[("ADMIN_API_KEY", "k"), ("DATABASE_URL", "   ")]);
  match AppConfig::from_env() {
    Err(AppError::Config(message)) => assert!(message.contains("DATABASE_URL")),
    other => panic!("unexpected: {:?}", other.map(|_| ())),
  }
}

#[test]
#[serial]
fn env_values_are_trimmed_and_parsed() {
  with_env(&[
    ("STORE_BACKEND", " Memory "),
    ("ADMIN_API_KEY", "k"),
    ("SERVER_PORT", "9090"),
    ("GST_RATE", "12"),
    ("STATUS_TRANSITIONS", "permissive"),
    ("REPEAT_ADDON_PRICING", "current"),
    ("STORE_GSTIN", "29ABCDE1234F1Z5"),
  ]);
  let config = AppConfig::from_env().unwrap();
  assert_eq!(config.store_backend, StoreBackend::Memory);
  assert_eq!(config.server_port, 9090);

  let policy = config.order_policy();
  assert_eq!(policy.gst_rate, dec!(12));
  assert_eq!(policy.transitions, TransitionPolicy::Permissive);
  assert_eq!(policy.addon_repricing, AddonRepricing::Current);
  assert_eq!(policy.invoice.gstin.as_deref(), Some("29ABCDE1234F1Z5"));
  assert_eq!(policy.min_schedule_lead, chrono::Duration::minutes(30));
}

#[test]
fn invalid_values_name_the_variable() {
  let base = [("STORE_BACKEND", "memory"), ("ADMIN_API_KEY", "k")];
  let with = |extra: (&'static str, &'static str)| {
    let mut vars = base.to_vec();
    vars.push(extra);
    lookup_error(&vars)
  };

  assert!(with(("STATUS_TRANSITIONS", "loose")).contains("STATUS_TRANSITIONS"));
  assert!(with(("GST_RATE", "105")).contains("GST_RATE"));
  assert!(with(("SERVER_PORT", "eighty")).contains("SERVER_PORT"));
  assert!(with(("NOTIFY_MAX_ATTEMPTS", "0")).contains("NOTIFY_MAX_ATTEMPTS"));
  assert!(with(("SCHEDULE_MIN_LEAD_MINUTES", "-5")).contains("SCHEDULE_MIN_LEAD_MINUTES"));
  assert!(with(("STORE_BACKEND", "redis")).contains("STORE_BACKEND"));
}

#[test]
fn enabled_channels_need_a_gateway() {
  let message = lookup_error(&[
    ("STORE_BACKEND", "memory"),
    ("ADMIN_API_KEY", "k"),
    ("NOTIFY_SMS_ENABLED", "true"),
  ]);
  assert!(message.contains("SMS_GATEWAY_URL"));

  let config = config_with(&[
    ("NOTIFY_WHATSAPP_ENABLED", "true"),
    ("WHATSAPP_GATEWAY_URL", "http://gateway.local/whatsapp"),
  ]);
  assert!(config.notify.whatsapp_enabled);
  assert!(!config.notify.sms_enabled);
}
