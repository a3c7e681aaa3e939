//! The open attribute value type.
//!
//! Node and edge declarations carry a free-form `data: { ... }` bag. The
//! bag is a mapping from string keys to a tagged [`Value`] rather than an
//! untyped blob, so profile converters can pattern-match exhaustively
//! without runtime type inspection.

use indexmap::IndexMap;

use crate::identifier::Id;

/// A tagged attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A quoted string (escape sequences already resolved).
    String(String),
    /// A numeric literal.
    Number(f64),
    /// `true` or `false`.
    Bool(bool),
    /// A bare identifier referring to another declaration (style name,
    /// net name, and so on).
    Ref(Id),
    /// A nested `{ key: value, ... }` object literal.
    Map(ValueMap),
}

/// An ordered mapping from attribute key to [`Value`].
///
/// Declaration order is preserved; it is semantic for deterministic
/// output downstream.
pub type ValueMap = IndexMap<String, Value>;

/// One flat record of an external data source.
pub type Record = IndexMap<String, Value>;

impl Value {
    /// The string form of this value when it has one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Renders the value as display text for label substitution.
    ///
    /// Numbers drop a trailing `.0` so `Item ${count}` reads naturally.
    pub fn display_text(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            Value::Bool(b) => b.to_string(),
            Value::Ref(id) => id.to_string(),
            Value::Map(_) => String::new(),
        }
    }

    /// Follows a dotted path (`a.b.c`) through nested maps.
    ///
    /// Returns `None` when any segment is missing or a non-map value is
    /// indexed further.
    pub fn lookup_path<'a>(map: &'a ValueMap, path: &str) -> Option<&'a Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = map.get(first)?;
        for segment in segments {
            current = current.as_map()?.get(segment)?;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        assert_eq!(Value::String("x".into()).as_str(), Some("x"));
        assert_eq!(Value::Number(2.5).as_number(), Some(2.5));
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Number(1.0).as_str(), None);
    }

    #[test]
    fn test_display_text() {
        assert_eq!(Value::Number(3.0).display_text(), "3");
        assert_eq!(Value::Number(2.5).display_text(), "2.5");
        assert_eq!(Value::Bool(false).display_text(), "false");
        assert_eq!(Value::String("abc".into()).display_text(), "abc");
    }

    #[test]
    fn test_lookup_path() {
        let mut inner = ValueMap::new();
        inner.insert("bin".into(), Value::String("B1".into()));
        let mut map = ValueMap::new();
        map.insert("sku".into(), Value::String("a1".into()));
        map.insert("loc".into(), Value::Map(inner));

        assert_eq!(
            Value::lookup_path(&map, "sku").and_then(|v| v.as_str()),
            Some("a1")
        );
        assert_eq!(
            Value::lookup_path(&map, "loc.bin").and_then(|v| v.as_str()),
            Some("B1")
        );
        assert!(Value::lookup_path(&map, "loc.missing").is_none());
        assert!(Value::lookup_path(&map, "sku.deeper").is_none());
    }
}
