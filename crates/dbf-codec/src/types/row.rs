//! Ordered row mapping.

use super::DbfValue;

/// A record as an ordered field-name → value mapping.
///
/// Keys are unique and keep insertion order, which for parsed rows is the
/// field order of the table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, DbfValue)>,
}

impl Row {
    /// Create an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty row with room for `capacity` cells.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: Vec::with_capacity(capacity),
        }
    }

    /// Value stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DbfValue> {
        self.cells
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Set `name` to `value`, replacing in place or appending.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<DbfValue>) {
        let name = name.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.cells.push((name, value)),
        }
    }

    /// Remove `name`, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<DbfValue> {
        let idx = self.cells.iter().position(|(key, _)| key == name)?;
        Some(self.cells.remove(idx).1)
    }

    /// Field names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(key, _)| key.as_str())
    }

    /// Name/value pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DbfValue)> {
        self.cells.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True if the row has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>, V: Into<DbfValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (name, value) in iter {
            row.insert(name, value);
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_order_and_replaces() {
        let mut row = Row::new();
        row.insert("B", "1");
        row.insert("A", 2.0);
        row.insert("B", "3");

        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["B", "A"]);
        assert_eq!(row.get("B"), Some(&DbfValue::text("3")));
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn test_remove() {
        let mut row: Row = [("X", "1"), ("Y", "2")].into_iter().collect();
        assert_eq!(row.remove("X"), Some(DbfValue::text("1")));
        assert!(row.remove("X").is_none());
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["Y"]);
    }
}
