//! Connections to the hosted backend and its identity service.

pub mod backend;
pub mod identity;

pub use backend::{Backend, BackendError};
pub use identity::HttpIdentityProvider;
