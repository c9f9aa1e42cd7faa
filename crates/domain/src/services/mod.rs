//! Domain services for the Green Life Expo site.
//!
//! Services contain the logic that operates on domain models. The remote
//! backend is only reached through the gateway traits.

pub mod color;
pub mod dashboard;
pub mod editor;
pub mod entity;
pub mod gateway;
pub mod memory;
pub mod notifier;
pub mod session;

pub use color::{hsl_to_hex, ColorError, Hsl};
pub use dashboard::DashboardAggregator;
pub use editor::{Deletion, EditorError, EditorStatus, EntityEditor};
pub use entity::{EditorScope, Entity, ManagedEntity, Messages};
pub use gateway::{
    Filter, GatewayError, ObjectStorage, OrderBy, Query, Row, TableGateway,
};
pub use memory::{GatewayCall, InMemoryGateway, InMemoryStorage};
pub use notifier::{Confirm, Notifier, RecordingNotifier};
pub use session::{AdminContext, AuthSession, Identity, IdentityProvider, SessionError};
