//! Domain layer for the Green Life Expo backend.
//!
//! This crate contains:
//! - Domain models (site settings, page content, packages, FAQs, submissions)
//! - The generic entity editor and the gateway traits it runs against
//! - Dashboard aggregation, colour conversion and the admin session context

pub mod models;
pub mod services;
