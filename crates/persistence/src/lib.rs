//! Persistence layer for the Green Life Expo backend.
//!
//! This crate contains:
//! - The hosted REST backend gateway (tables and file storage)
//! - A direct Postgres gateway with pool management and migrations
//! - Gateway metrics

pub mod db;
pub mod metrics;
pub mod postgres;
pub mod rest;
pub mod tables;

pub use postgres::PgGateway;
pub use rest::{RestConfig, RestGateway};
pub use tables::TableNames;
