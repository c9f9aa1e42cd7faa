//! Shared utilities for the Green Life Expo backend.
//!
//! This crate provides functionality used across the other crates:
//! - Session token verification (JWT)
//! - Common validation logic

pub mod jwt;
pub mod validation;
