// slicehouse_server/src/notify/mod.rs

pub mod gateway;

pub use gateway::{providers_from_config, HttpGatewayProvider};
