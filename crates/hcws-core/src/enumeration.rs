// ── Enumeration translation ──
//
// Bidirectional raw code <-> display name tables, built once from the
// description and read-only afterwards.

use std::collections::{BTreeMap, HashMap};

use crate::description::EnumKey;
use crate::error::EnumerationError;

/// Forward (code -> name) and reverse (name -> code) lookup tables.
///
/// Both tables are bijective over the source enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumTranslator {
    forward: BTreeMap<i64, String>,
    reverse: HashMap<String, i64>,
}

impl EnumTranslator {
    /// Build the tables, coercing every key to an integer code.
    pub fn new<'a, I>(entries: I) -> Result<Self, EnumerationError>
    where
        I: IntoIterator<Item = (&'a EnumKey, &'a String)>,
    {
        let mut forward = BTreeMap::new();
        let mut reverse = HashMap::new();

        for (key, name) in entries {
            let code = key.to_code().ok_or_else(|| EnumerationError::InvalidKey {
                key: key.to_string(),
            })?;

            if forward.insert(code, name.clone()).is_some() {
                return Err(EnumerationError::DuplicateCode { code });
            }
            if reverse.insert(name.clone(), code).is_some() {
                return Err(EnumerationError::DuplicateName { name: name.clone() });
            }
        }

        Ok(Self { forward, reverse })
    }

    /// Display name for a raw code.
    pub fn name(&self, code: i64) -> Option<&str> {
        self.forward.get(&code).map(String::as_str)
    }

    /// Raw code for a display name.
    pub fn code(&self, name: &str) -> Option<i64> {
        self.reverse.get(name).copied()
    }

    pub fn forward(&self) -> &BTreeMap<i64, String> {
        &self.forward
    }

    pub fn reverse(&self) -> &HashMap<String, i64> {
        &self.reverse
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Iterate `(code, name)` pairs in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &str)> {
        self.forward.iter().map(|(code, name)| (*code, name.as_str()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn table(entries: &[(EnumKey, &str)]) -> IndexMap<EnumKey, String> {
        entries
            .iter()
            .map(|(key, name)| (key.clone(), (*name).to_owned()))
            .collect()
    }

    #[test]
    fn string_keys_normalize_to_codes() {
        let raw = table(&[("0".into(), "Open"), ("1".into(), "Closed")]);
        let translator = EnumTranslator::new(&raw).unwrap();

        assert_eq!(
            translator.forward(),
            &BTreeMap::from([(0, "Open".to_owned()), (1, "Closed".to_owned())])
        );
        assert_eq!(
            translator.reverse(),
            &HashMap::from([("Open".to_owned(), 0), ("Closed".to_owned(), 1)])
        );
    }

    #[test]
    fn integer_and_string_keys_agree() {
        let from_text = table(&[("0".into(), "Open"), ("1".into(), "Closed")]);
        let from_code = table(&[(EnumKey::Code(0), "Open"), (EnumKey::Code(1), "Closed")]);

        assert_eq!(
            EnumTranslator::new(&from_text).unwrap(),
            EnumTranslator::new(&from_code).unwrap()
        );
    }

    #[test]
    fn tables_are_inverse() {
        let raw = table(&[
            (EnumKey::Code(0), "Off"),
            ("1".into(), "On"),
            (" 2".into(), "Standby"),
            ("-1".into(), "Error"),
        ]);
        let translator = EnumTranslator::new(&raw).unwrap();

        assert_eq!(translator.len(), 4);
        for (code, name) in translator.iter() {
            assert_eq!(translator.code(name), Some(code));
            assert_eq!(translator.name(code), Some(name));
        }
        for (name, code) in translator.reverse() {
            assert_eq!(translator.name(*code), Some(name.as_str()));
        }
    }

    #[test]
    fn rejects_non_numeric_key() {
        let raw = table(&[("zero".into(), "Open")]);
        assert_eq!(
            EnumTranslator::new(&raw).unwrap_err(),
            EnumerationError::InvalidKey { key: "zero".into() }
        );
    }

    #[test]
    fn rejects_duplicate_display_name() {
        let raw = table(&[(EnumKey::Code(0), "Open"), (EnumKey::Code(1), "Open")]);
        assert_eq!(
            EnumTranslator::new(&raw).unwrap_err(),
            EnumerationError::DuplicateName {
                name: "Open".into()
            }
        );
    }

    #[test]
    fn rejects_codes_colliding_after_coercion() {
        let raw = table(&[("1".into(), "Open"), (EnumKey::Code(1), "Closed")]);
        assert_eq!(
            EnumTranslator::new(&raw).unwrap_err(),
            EnumerationError::DuplicateCode { code: 1 }
        );
    }

    #[test]
    fn empty_enumeration_is_allowed() {
        let translator = EnumTranslator::new(&IndexMap::<EnumKey, String>::new()).unwrap();
        assert!(translator.is_empty());
        assert_eq!(translator.name(0), None);
        assert_eq!(translator.code("Open"), None);
    }
}
