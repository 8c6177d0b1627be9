// ── Static entity metadata ──
//
// What the device profile says about one addressable point. Built once by
// the catalog loader and never mutated afterwards.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// ── Access ──────────────────────────────────────────────────────────

/// Device-declared permission on an entity, ordered by increasing permission.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "camelCase", try_from = "String")]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum Access {
    #[default]
    Read,
    ReadWrite,
    WriteOnly,
}

impl Access {
    pub fn is_readable(self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite)
    }

    pub fn is_writable(self) -> bool {
        matches!(self, Self::ReadWrite | Self::WriteOnly)
    }
}

// Catalogs spell levels inconsistently; accept what `FromStr` accepts.
impl TryFrom<String> for Access {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ── EnumKey ─────────────────────────────────────────────────────────

/// A raw enumeration key as written in catalog data.
///
/// Profiles spell codes either as integers or as strings (`"0"`), and
/// JSON object keys are always strings. Both normalize to the same code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumKey {
    Code(i64),
    Text(String),
}

impl EnumKey {
    /// Coerce to an integer code, if possible.
    pub fn to_code(&self) -> Option<i64> {
        match self {
            Self::Code(code) => Some(*code),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl fmt::Display for EnumKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{code}"),
            Self::Text(text) => write!(f, "{text}"),
        }
    }
}

impl From<i64> for EnumKey {
    fn from(code: i64) -> Self {
        Self::Code(code)
    }
}

impl From<String> for EnumKey {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for EnumKey {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

// ── EntityDescription ───────────────────────────────────────────────

/// Immutable metadata for one addressable point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescription {
    /// Device-assigned identifier, stable for the session's lifetime.
    pub uid: u32,

    /// Human-readable identifier, unique within an appliance.
    pub name: String,

    /// Initial availability.
    #[serde(default)]
    pub available: bool,

    /// Initial access level.
    #[serde(default)]
    pub access: Access,

    /// Raw code -> display name. `None` for scalar values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<IndexMap<EnumKey, String>>,
}

impl EntityDescription {
    pub fn new(uid: u32, name: impl Into<String>) -> Self {
        Self {
            uid,
            name: name.into(),
            available: false,
            access: Access::default(),
            enumeration: None,
        }
    }

    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn with_enumeration<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<EnumKey>,
        V: Into<String>,
    {
        self.enumeration = Some(
            entries
                .into_iter()
                .map(|(key, name)| (key.into(), name.into()))
                .collect(),
        );
        self
    }
}
