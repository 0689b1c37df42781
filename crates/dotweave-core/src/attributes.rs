//! Ordered DOT attribute maps.

use indexmap::IndexMap;

/// An insertion-ordered map of DOT attribute names to raw values.
///
/// Used both for attributes an application passes through to the engine and
/// for attributes the parser does not interpret. Values are stored unquoted
/// and unescaped; writers handle quoting.
///
/// # Examples
///
/// ```
/// # use dotweave_core::attributes::Attributes;
/// let mut attrs = Attributes::new();
/// attrs.set("rankdir", "LR");
/// attrs.set("nodesep", "0.5");
/// attrs.set("rankdir", "TB");
///
/// assert_eq!(attrs.get("rankdir"), Some("TB"));
/// let names: Vec<_> = attrs.iter().map(|(k, _)| k).collect();
/// assert_eq!(names, ["rankdir", "nodesep"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: IndexMap<String, String>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute, keeping the original position if it already exists.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Builder-style variant of [`set`](Self::set).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Removes an attribute, preserving the order of the remaining entries.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.shift_remove(name)
    }

    /// Copies every entry of `other` into `self`, overriding duplicates.
    pub fn extend_from(&mut self, other: &Attributes) {
        for (name, value) in other.iter() {
            self.set(name, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (name, value) in iter {
            attrs.set(name, value);
        }
        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_keeps_order() {
        let mut attrs: Attributes = [("a", "1"), ("b", "2"), ("c", "3")].into_iter().collect();
        assert_eq!(attrs.remove("b").as_deref(), Some("2"));
        let names: Vec<_> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["a", "c"]);
        assert_eq!(attrs.remove("missing"), None);
    }

    #[test]
    fn test_extend_from_overrides() {
        let mut base = Attributes::new().with("color", "red").with("style", "bold");
        let overrides = Attributes::new().with("color", "blue").with("penwidth", "2");
        base.extend_from(&overrides);

        assert_eq!(base.len(), 3);
        assert_eq!(base.get("color"), Some("blue"));
        assert_eq!(base.get("penwidth"), Some("2"));
        assert!(base.contains("style"));
    }

    #[test]
    fn test_empty() {
        let attrs = Attributes::default();
        assert!(attrs.is_empty());
        assert_eq!(attrs.get("anything"), None);
    }
}
