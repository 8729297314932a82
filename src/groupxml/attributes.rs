//! Accumulated element attributes and per-field numeric coercion.

use std::collections::HashMap;
use std::str::FromStr;

use super::error::FieldCoercionError;

/// Attribute set of one element, keyed by attribute name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(HashMap<String, String>);

impl Attributes {
    /// Create an empty attribute set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an attribute
    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) {
        self.0.insert(name.into(), value.into());
    }

    /// Value of an attribute
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Whether the attribute is present, regardless of its value
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Remove every attribute
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Replace the content with the attributes of `source` named in `keys`
    pub fn absorb(&mut self, source: Attributes, keys: &[&str]) {
        self.0.clear();
        self.0.extend(
            source
                .0
                .into_iter()
                .filter(|(name, _)| keys.contains(&name.as_str())),
        );
    }

    /// Parse an attribute as `T`
    ///
    /// Absent attributes are `Ok(None)`; present but unparseable ones are an error
    /// for this field only.
    pub fn parse<T: FromStr>(&self, name: &'static str) -> Result<Option<T>, FieldCoercionError> {
        self.get(name).map(|raw| coerce_value(name, raw)).transpose()
    }
}

/// Parse a single raw value of the named field
pub fn coerce_value<T: FromStr>(field: &'static str, raw: &str) -> Result<T, FieldCoercionError> {
    raw.trim().parse().map_err(|_| FieldCoercionError {
        field,
        value: raw.to_string(),
        expected: short_type_name::<T>(),
    })
}

fn short_type_name<T>() -> &'static str {
    let name = std::any::type_name::<T>();
    name.rsplit("::").next().unwrap_or(name)
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorb_keeps_only_requested_keys() {
        let mut attrs = Attributes::from_iter([("stale", "1")]);
        let source = Attributes::from_iter([("id", "s1"), ("other", "x")]);
        attrs.absorb(source, &["id", "precursormass"]);

        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("id"), Some("s1"));
        assert!(!attrs.contains("stale"));
        assert!(!attrs.contains("other"));
    }

    #[test]
    fn test_parse() {
        let attrs = Attributes::from_iter([("charge", " 2 "), ("mz", "abc")]);
        assert_eq!(attrs.parse::<i64>("charge"), Ok(Some(2)));
        assert_eq!(attrs.parse::<f64>("missing"), Ok(None));

        let err = attrs.parse::<f64>("mz").unwrap_err();
        assert_eq!(err.field, "mz");
        assert_eq!(err.value, "abc");
        assert_eq!(err.to_string(), "cannot read mz=\"abc\" as f64");
    }
}
