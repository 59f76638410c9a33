// slicehouse_server/src/persistence/mod.rs

//! Postgres implementations of the order pipeline's storage ports.

pub mod postgres;
mod rows;

pub use postgres::PgStore;
