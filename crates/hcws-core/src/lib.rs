// hcws-core: Entity state, enum translation and access-gated writes for appliance control points.

pub mod config;
pub mod description;
pub mod entity;
pub mod enumeration;
pub mod error;
pub mod outbound;
pub mod policy;
pub mod stream;
pub mod update;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{EntityConfig, UnknownCodePolicy};
pub use description::{Access, EntityDescription, EnumKey};
pub use entity::{Callback, CallbackId, Entity, EntityBuilder, EntityState};
pub use enumeration::EnumTranslator;
pub use error::{CoreError, EnumerationError};
pub use outbound::VALUES_RESOURCE;
pub use policy::AccessPolicy;
pub use stream::{StateChange, Subscription, ValueStream};
pub use update::{EntityUpdate, ValueChange};
