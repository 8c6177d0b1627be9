// ── Entity behaviour configuration ──
//
// Runtime knobs for how entities treat device data. Loaded by
// `hcws-config`; core never reads files.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// What to do when the device reports a raw code missing from the enumeration.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UnknownCodePolicy {
    /// Store the raw value as the display value and log a warning.
    #[default]
    PassThrough,
    /// Refuse the whole update; entity state is left untouched.
    Reject,
}

/// Configuration applied to every entity built with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityConfig {
    #[serde(default)]
    pub unknown_codes: UnknownCodePolicy,
}
