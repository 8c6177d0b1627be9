// ── Partial state updates ──
//
// Inbound notifications carry only the fields that changed. Every field is
// optional; `None` means "leave as is".

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::description::Access;

/// A partial set of entity fields to merge into current state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,

    /// Raw wire value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl EntityUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn available(mut self, available: bool) -> Self {
        self.available = Some(available);
        self
    }

    pub fn access(mut self, access: Access) -> Self {
        self.access = Some(access);
        self
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Returns `true` if no field is present.
    pub fn is_empty(&self) -> bool {
        self.available.is_none() && self.access.is_none() && self.value.is_none()
    }
}

/// One element of a device value notification, addressed by `uid`.
///
/// The appliance decodes these and routes `update` to the entity with the
/// matching identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueChange {
    pub uid: u32,

    #[serde(flatten)]
    pub update: EntityUpdate,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn builder_sets_only_named_fields() {
        let update = EntityUpdate::new().access(Access::ReadWrite);
        assert_eq!(update.access, Some(Access::ReadWrite));
        assert_eq!(update.available, None);
        assert_eq!(update.value, None);
        assert!(!update.is_empty());
        assert!(EntityUpdate::new().is_empty());
    }

    #[test]
    fn decodes_notification_items() {
        let items: Vec<ValueChange> = serde_json::from_value(json!([
            {"uid": 1, "value": 1},
            {"uid": 2, "available": true, "access": "readWrite"},
        ]))
        .unwrap();

        assert_eq!(
            items,
            vec![
                ValueChange {
                    uid: 1,
                    update: EntityUpdate::new().value(1),
                },
                ValueChange {
                    uid: 2,
                    update: EntityUpdate::new()
                        .available(true)
                        .access(Access::ReadWrite),
                },
            ]
        );
    }

    #[test]
    fn serializes_present_fields_only() {
        let update = EntityUpdate::new().available(false);
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"available": false})
        );
    }
}
