// slicehouse_server/src/state.rs

use crate::config::AppConfig;
use crate::errors::Result;
use crate::notify::providers_from_config;
use slicehouse::notify::{DispatchPolicy, NotificationDispatcher, NotificationProvider, Outbox};
use slicehouse::store::NotificationLogRepository;
use slicehouse::{Clock, OrderService, Ports, StatusBroadcaster, SystemClock};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Clone)]
pub struct AppState {
  pub orders: Arc<OrderService>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Wires the order service with a background outbox worker on the current
  /// runtime. The returned handle finishes once the state is dropped and the
  /// queue drains.
  pub fn spawn(
    config: Arc<AppConfig>,
    ports: Ports,
    logs: Arc<dyn NotificationLogRepository>,
  ) -> Result<(Self, JoinHandle<()>)> {
    let providers = providers_from_config(&config.notify)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let dispatcher = Arc::new(NotificationDispatcher::new(
      providers,
      logs,
      clock.clone(),
      dispatch_policy(&config),
    ));
    let (outbox, worker) = Outbox::spawn(dispatcher, config.notify.outbox_capacity);
    Ok((Self::assemble(config, ports, Arc::new(outbox), clock), worker))
  }

  /// Same wiring with caller-supplied providers and synchronous dispatch.
  pub fn inline(
    config: Arc<AppConfig>,
    ports: Ports,
    logs: Arc<dyn NotificationLogRepository>,
    providers: Vec<Arc<dyn NotificationProvider>>,
    clock: Arc<dyn Clock>,
  ) -> Self {
    let dispatcher = Arc::new(NotificationDispatcher::new(
      providers,
      logs,
      clock.clone(),
      dispatch_policy(&config),
    ));
    Self::assemble(config, ports, Arc::new(Outbox::inline(dispatcher)), clock)
  }

  fn assemble(config: Arc<AppConfig>, ports: Ports, outbox: Arc<Outbox>, clock: Arc<dyn Clock>) -> Self {
    let orders = OrderService::new(
      ports,
      outbox,
      Arc::new(StatusBroadcaster::new()),
      clock,
      config.order_policy(),
    );
    Self {
      orders: Arc::new(orders),
      config,
    }
  }
}

fn dispatch_policy(config: &AppConfig) -> DispatchPolicy {
  DispatchPolicy {
    timeout: Duration::from_millis(config.notify.timeout_ms),
    max_attempts: config.notify.max_attempts,
  }
}
