// ── Write gating ──
//
// Plain entities forward every write. Status entities only accept writes
// the device has explicitly granted: the point must be available and its
// access level must allow writing.

use crate::description::Access;

/// How an entity gates `set_value` / `set_value_raw`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Always proceed.
    #[default]
    Permissive,
    /// Require `available == true` and a writable access level.
    DeviceGranted,
}

impl AccessPolicy {
    /// Whether a write may proceed in the given state.
    pub fn permits_write(self, available: bool, access: Access) -> bool {
        match self {
            Self::Permissive => true,
            Self::DeviceGranted => available && access.is_writable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permissive_allows_everything() {
        for access in [Access::Read, Access::ReadWrite, Access::WriteOnly] {
            assert!(AccessPolicy::Permissive.permits_write(false, access));
            assert!(AccessPolicy::Permissive.permits_write(true, access));
        }
    }

    #[test]
    fn device_granted_requires_availability() {
        for access in [Access::Read, Access::ReadWrite, Access::WriteOnly] {
            assert!(!AccessPolicy::DeviceGranted.permits_write(false, access));
        }
    }

    #[test]
    fn device_granted_requires_writable_access() {
        assert!(!AccessPolicy::DeviceGranted.permits_write(true, Access::Read));
        assert!(AccessPolicy::DeviceGranted.permits_write(true, Access::ReadWrite));
        assert!(AccessPolicy::DeviceGranted.permits_write(true, Access::WriteOnly));
    }
}
