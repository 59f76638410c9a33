// slicehouse_server/src/notify/gateway.rs

//! SMS and WhatsApp delivery through HTTP gateways.

use crate::config::NotifyConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use slicehouse::model::Channel;
use slicehouse::notify::{Delivery, LogProvider, NotificationProvider, OutboundMessage, ProviderError};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GatewayRequest<'a> {
  to: &'a str,
  message: &'a str,
  order_id: String,
  event: &'a str,
}

/// Posts `{ to, message, orderId, event }` as JSON to a gateway URL.
///
/// A 202 means the gateway queued the message; any other 2xx is a send. 4xx
/// answers are rejections, everything else counts as a transport failure
/// and may be retried by the dispatcher.
pub struct HttpGatewayProvider {
  channel: Channel,
  enabled: bool,
  url: Option<String>,
  client: reqwest::Client,
}

impl HttpGatewayProvider {
  pub fn new(channel: Channel, enabled: bool, url: Option<String>, client: reqwest::Client) -> Self {
    Self {
      channel,
      enabled,
      url,
      client,
    }
  }
}

#[async_trait]
impl NotificationProvider for HttpGatewayProvider {
  fn channel(&self) -> Channel {
    self.channel
  }

  fn is_enabled(&self) -> bool {
    self.enabled && self.url.is_some()
  }

  async fn send(&self, message: &OutboundMessage) -> std::result::Result<Delivery, ProviderError> {
    let url = self
      .url
      .as_deref()
      .ok_or_else(|| ProviderError::Transport(format!("no gateway URL configured for {}", self.channel)))?;
    let to = message
      .recipient
      .as_deref()
      .ok_or(ProviderError::MissingRecipient(self.channel))?;

    let response = self
      .client
      .post(url)
      .json(&GatewayRequest {
        to,
        message: &message.body,
        order_id: message.order_id.to_string(),
        event: message.event.as_str(),
      })
      .send()
      .await
      .map_err(|e| ProviderError::Transport(e.to_string()))?;

    let status = response.status();
    debug!(channel = %self.channel, status = status.as_u16(), "Gateway answered.");
    match status {
      StatusCode::ACCEPTED => Ok(Delivery::Queued),
      s if s.is_success() => Ok(Delivery::Sent),
      s if s.is_client_error() => {
        let body = response.text().await.unwrap_or_default();
        Err(ProviderError::Rejected(format!("{}: {}", s, body)))
      }
      s => Err(ProviderError::Transport(format!("gateway returned {}", s.as_u16()))),
    }
  }
}

/// The provider list for the dispatcher: log first, then SMS and WhatsApp.
///
/// Disabled gateways stay in the list so every dispatch still records a
/// SKIPPED row for them.
pub fn providers_from_config(config: &NotifyConfig) -> Result<Vec<Arc<dyn NotificationProvider>>> {
  let client = reqwest::Client::builder()
    .timeout(Duration::from_millis(config.timeout_ms))
    .build()
    .map_err(|e| AppError::Config(format!("Failed to build notification HTTP client: {}", e)))?;

  Ok(vec![
    Arc::new(LogProvider),
    Arc::new(HttpGatewayProvider::new(
      Channel::Sms,
      config.sms_enabled,
      config.sms_gateway_url.clone(),
      client.clone(),
    )),
    Arc::new(HttpGatewayProvider::new(
      Channel::Whatsapp,
      config.whatsapp_enabled,
      config.whatsapp_gateway_url.clone(),
      client,
    )),
  ])
}
