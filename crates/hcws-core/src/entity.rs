// ── Live entity state ──
//
// One `Entity` mirrors one device control point. State changes arrive only
// through `update`; writes go out through the session and never touch
// local state. The whole state lives in a single `watch` slot so a reader
// always sees fields from the same update.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hcws_api::Session;
use indexmap::IndexMap;
use serde_json::Value;
use tokio::sync::watch;

use crate::config::{EntityConfig, UnknownCodePolicy};
use crate::description::{Access, EntityDescription};
use crate::enumeration::EnumTranslator;
use crate::error::CoreError;
use crate::outbound;
use crate::policy::AccessPolicy;
use crate::stream::Subscription;
use crate::update::EntityUpdate;

/// Observer invoked with the entity after every applied update.
///
/// Identity is the `Arc` allocation: registering a clone of an already
/// registered callback is a no-op.
pub type Callback = Arc<dyn Fn(&Entity) + Send + Sync>;

/// Handle returned by [`Entity::register_callback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(u64);

// ── EntityState ─────────────────────────────────────────────────────

/// Consistent snapshot of an entity's mutable fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityState {
    pub available: bool,
    pub access: Access,
    /// Display value; the raw value translated through the enumeration.
    pub value: Option<Value>,
    /// Raw wire value, `None` until first observed.
    pub value_raw: Option<Value>,
}

// ── Entity ──────────────────────────────────────────────────────────

/// Local mirror of one addressable point on the device.
pub struct Entity {
    description: Arc<EntityDescription>,
    enumeration: Option<EnumTranslator>,
    policy: AccessPolicy,
    config: EntityConfig,
    session: Arc<dyn Session>,
    state: watch::Sender<Arc<EntityState>>,
    callbacks: Mutex<IndexMap<CallbackId, Callback>>,
    next_callback_id: AtomicU64,
}

impl Entity {
    /// A permissive entity: writes are always forwarded to the device.
    pub fn new(
        description: impl Into<Arc<EntityDescription>>,
        session: Arc<dyn Session>,
    ) -> Result<Self, CoreError> {
        Self::builder(description, session).build()
    }

    /// A status entity: writes require the device to grant them first.
    pub fn status(
        description: impl Into<Arc<EntityDescription>>,
        session: Arc<dyn Session>,
    ) -> Result<Self, CoreError> {
        Self::builder(description, session)
            .policy(AccessPolicy::DeviceGranted)
            .build()
    }

    pub fn builder(
        description: impl Into<Arc<EntityDescription>>,
        session: Arc<dyn Session>,
    ) -> EntityBuilder {
        EntityBuilder {
            description: description.into(),
            session,
            policy: AccessPolicy::default(),
            config: EntityConfig::default(),
        }
    }

    // ── Identity ─────────────────────────────────────────────────────

    pub fn uid(&self) -> u32 {
        self.description.uid
    }

    pub fn name(&self) -> &str {
        &self.description.name
    }

    pub fn description(&self) -> &EntityDescription {
        &self.description
    }

    pub fn enumeration(&self) -> Option<&EnumTranslator> {
        self.enumeration.as_ref()
    }

    pub fn policy(&self) -> AccessPolicy {
        self.policy
    }

    // ── State reads ──────────────────────────────────────────────────

    /// Current snapshot (cheap `Arc` clone).
    pub fn state(&self) -> Arc<EntityState> {
        self.state.borrow().clone()
    }

    pub fn value(&self) -> Option<Value> {
        self.state.borrow().value.clone()
    }

    pub fn value_raw(&self) -> Option<Value> {
        self.state.borrow().value_raw.clone()
    }

    pub fn available(&self) -> bool {
        self.state.borrow().available
    }

    pub fn access(&self) -> Access {
        self.state.borrow().access
    }

    /// Subscribe to state transitions, starting from the current state.
    pub fn subscribe(&self) -> Subscription {
        Subscription::new(self.state.subscribe())
    }

    // ── Observers ────────────────────────────────────────────────────

    /// Register an observer, returning its handle.
    ///
    /// Observers run synchronously after each update, in registration order.
    pub fn register_callback(&self, callback: Callback) -> CallbackId {
        let mut callbacks = self.lock_callbacks();
        if let Some(id) = callbacks
            .iter()
            .find(|(_, existing)| std::ptr::addr_eq(Arc::as_ptr(*existing), Arc::as_ptr(&callback)))
            .map(|(id, _)| *id)
        {
            return id;
        }

        let id = CallbackId(self.next_callback_id.fetch_add(1, Ordering::Relaxed));
        callbacks.insert(id, callback);
        id
    }

    /// Remove an observer. Returns `false` if the handle was not registered.
    pub fn unregister_callback(&self, id: CallbackId) -> bool {
        self.lock_callbacks().shift_remove(&id).is_some()
    }

    pub fn callback_count(&self) -> usize {
        self.lock_callbacks().len()
    }

    // ── Inbound ──────────────────────────────────────────────────────

    /// Merge a partial update from the device and notify observers.
    ///
    /// Absent fields are left untouched. The new state is published as one
    /// snapshot before any observer runs. A panicking observer is not caught.
    #[allow(clippy::unused_async)]
    pub async fn update(&self, changes: EntityUpdate) -> Result<(), CoreError> {
        let EntityUpdate {
            available,
            access,
            value,
        } = changes;
        let value = value.map(|raw| self.translate_inbound(raw)).transpose()?;

        tracing::debug!(
            uid = self.uid(),
            name = %self.name(),
            ?available,
            ?access,
            has_value = value.is_some(),
            "Applying entity update"
        );

        self.state.send_modify(|state| {
            let next = Arc::make_mut(state);
            if let Some(available) = available {
                next.available = available;
            }
            if let Some(access) = access {
                next.access = access;
            }
            if let Some((display, raw)) = value {
                next.value = Some(display);
                next.value_raw = Some(raw);
            }
        });

        self.notify();
        Ok(())
    }

    // ── Outbound ─────────────────────────────────────────────────────

    /// Write a display value, translating it through the enumeration.
    pub async fn set_value(&self, value: impl Into<Value> + Send) -> Result<(), CoreError> {
        let value = value.into();
        self.ensure_writable()?;
        let raw = self.translate_outbound(value)?;
        self.send_value(raw).await
    }

    /// Write a raw value as-is, without consulting the enumeration.
    pub async fn set_value_raw(&self, value: impl Into<Value> + Send) -> Result<(), CoreError> {
        let value = value.into();
        self.ensure_writable()?;
        self.send_value(value).await
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn lock_callbacks(&self) -> MutexGuard<'_, IndexMap<CallbackId, Callback>> {
        self.callbacks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot the observers, then call them without holding the lock so
    /// they can register or unregister freely.
    fn notify(&self) {
        let observers: Vec<Callback> = self.lock_callbacks().values().cloned().collect();
        for observer in observers {
            observer(self);
        }
    }

    fn ensure_writable(&self) -> Result<(), CoreError> {
        let state = self.state();
        if self.policy.permits_write(state.available, state.access) {
            return Ok(());
        }

        tracing::warn!(
            uid = self.uid(),
            name = %self.name(),
            available = state.available,
            access = %state.access,
            "Refusing write to entity"
        );
        Err(CoreError::Access {
            uid: self.uid(),
            name: self.name().to_owned(),
            available: state.available,
            access: state.access,
        })
    }

    /// Raw wire value -> (display, raw).
    fn translate_inbound(&self, raw: Value) -> Result<(Value, Value), CoreError> {
        let Some(enumeration) = &self.enumeration else {
            return Ok((raw.clone(), raw));
        };

        if let Some(name) = raw_code(&raw).and_then(|code| enumeration.name(code)) {
            return Ok((Value::from(name), raw));
        }

        tracing::warn!(
            uid = self.uid(),
            name = %self.name(),
            value = %raw,
            policy = %self.config.unknown_codes,
            "Unknown raw code for enumerated entity"
        );
        match self.config.unknown_codes {
            UnknownCodePolicy::PassThrough => Ok((raw.clone(), raw)),
            UnknownCodePolicy::Reject => Err(CoreError::UnknownCode {
                uid: self.uid(),
                value: raw,
            }),
        }
    }

    /// Display value -> raw value to send.
    fn translate_outbound(&self, display: Value) -> Result<Value, CoreError> {
        let Some(enumeration) = &self.enumeration else {
            return Ok(display);
        };

        match display.as_str().and_then(|name| enumeration.code(name)) {
            Some(code) => Ok(Value::from(code)),
            None => Err(CoreError::UnknownEnumValue {
                uid: self.uid(),
                value: display,
            }),
        }
    }

    async fn send_value(&self, raw: Value) -> Result<(), CoreError> {
        let message = outbound::set_value_message(self.uid(), raw);
        tracing::debug!(
            uid = self.uid(),
            name = %self.name(),
            data = %message.data,
            "Sending value write"
        );
        self.session.send_sync(message).await?;
        Ok(())
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("uid", &self.uid())
            .field("name", &self.name())
            .field("policy", &self.policy)
            .field("state", &*self.state())
            .finish_non_exhaustive()
    }
}

/// Integer code carried by a raw value, if any.
fn raw_code(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

// ── EntityBuilder ───────────────────────────────────────────────────

/// Builder for [`Entity`] when the defaults are not enough.
pub struct EntityBuilder {
    description: Arc<EntityDescription>,
    session: Arc<dyn Session>,
    policy: AccessPolicy,
    config: EntityConfig,
}

impl EntityBuilder {
    pub fn policy(mut self, policy: AccessPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(mut self, config: EntityConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the entity, validating the description's enumeration.
    pub fn build(self) -> Result<Entity, CoreError> {
        let uid = self.description.uid;
        let enumeration = self
            .description
            .enumeration
            .as_ref()
            .map(EnumTranslator::new)
            .transpose()
            .map_err(|source| CoreError::Enumeration { uid, source })?;

        let initial = EntityState {
            available: self.description.available,
            access: self.description.access,
            value: None,
            value_raw: None,
        };
        let (state, _) = watch::channel(Arc::new(initial));

        Ok(Entity {
            description: self.description,
            enumeration,
            policy: self.policy,
            config: self.config,
            session: self.session,
            state,
            callbacks: Mutex::new(IndexMap::new()),
            next_callback_id: AtomicU64::new(0),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hcws_api::Message;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    struct NullSession;

    #[async_trait]
    impl Session for NullSession {
        async fn send_sync(&self, message: Message) -> Result<Message, hcws_api::Error> {
            Ok(message.response(Value::Null))
        }
    }

    fn door() -> EntityDescription {
        EntityDescription::new(1, "Test_Entity").with_enumeration([("0", "Open"), ("1", "Closed")])
    }

    fn counter(count: &Arc<AtomicUsize>) -> Callback {
        let count = Arc::clone(count);
        Arc::new(move |_: &Entity| {
            count.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn new_entity_mirrors_description() {
        let entity = Entity::new(door(), Arc::new(NullSession)).unwrap();

        assert_eq!(entity.uid(), 1);
        assert_eq!(entity.name(), "Test_Entity");
        assert_eq!(entity.value(), None);
        assert_eq!(entity.value_raw(), None);
        assert!(!entity.available());
        assert_eq!(entity.access(), Access::Read);
        assert_eq!(entity.policy(), AccessPolicy::Permissive);
        assert_eq!(entity.enumeration().unwrap().name(1), Some("Closed"));
    }

    #[test]
    fn malformed_enumeration_fails_construction() {
        let desc = EntityDescription::new(9, "Broken").with_enumeration([("a", "Open")]);
        let err = Entity::new(desc, Arc::new(NullSession)).unwrap_err();
        assert!(matches!(err, CoreError::Enumeration { uid: 9, .. }));
    }

    #[test]
    fn raw_code_accepts_numbers_and_numeric_strings() {
        assert_eq!(raw_code(&json!(2)), Some(2));
        assert_eq!(raw_code(&json!("3")), Some(3));
        assert_eq!(raw_code(&json!(1.5)), None);
        assert_eq!(raw_code(&json!(true)), None);
    }

    #[tokio::test]
    async fn unknown_code_passes_through_by_default() {
        let entity = Entity::new(door(), Arc::new(NullSession)).unwrap();
        entity.update(EntityUpdate::new().value(7)).await.unwrap();

        assert_eq!(entity.value(), Some(json!(7)));
        assert_eq!(entity.value_raw(), Some(json!(7)));
    }

    #[tokio::test]
    async fn unknown_code_rejected_leaves_state_untouched() {
        let entity = Entity::builder(door(), Arc::new(NullSession))
            .config(EntityConfig {
                unknown_codes: UnknownCodePolicy::Reject,
            })
            .build()
            .unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        entity.register_callback(counter(&count));

        let err = entity
            .update(EntityUpdate::new().available(true).value(7))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::UnknownCode { uid: 1, .. }));
        assert!(!entity.available());
        assert_eq!(entity.value_raw(), None);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn numeric_string_code_translates() {
        let entity = Entity::new(door(), Arc::new(NullSession)).unwrap();
        entity.update(EntityUpdate::new().value("0")).await.unwrap();

        assert_eq!(entity.value(), Some(json!("Open")));
        assert_eq!(entity.value_raw(), Some(json!("0")));
    }

    #[test]
    fn duplicate_registration_returns_same_handle() {
        let entity = Entity::new(door(), Arc::new(NullSession)).unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        let callback = counter(&count);

        let first = entity.register_callback(Arc::clone(&callback));
        let second = entity.register_callback(callback);

        assert_eq!(first, second);
        assert_eq!(entity.callback_count(), 1);
    }

    #[test]
    fn unregister_unknown_handle_is_noop() {
        let entity = Entity::new(door(), Arc::new(NullSession)).unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        let id = entity.register_callback(counter(&count));

        assert!(entity.unregister_callback(id));
        assert!(!entity.unregister_callback(id));
        assert_eq!(entity.callback_count(), 0);
    }

    #[test]
    fn debug_output_names_entity() {
        let entity = Entity::status(door(), Arc::new(NullSession)).unwrap();
        let rendered = format!("{entity:?}");
        assert!(rendered.contains("Test_Entity"));
        assert!(rendered.contains("DeviceGranted"));
    }
}
