//! Cell values.

use std::fmt;

use chrono::NaiveDate;

use super::FieldType;

/// A single cell, tagged by the shape the field type produces.
///
/// Dates stay in their `DD.MM.YYYY` text form and logicals keep the raw
/// character read from the file, so a read-then-write cycle reproduces the
/// stored bytes without going through native date or boolean types.
#[derive(Debug, Clone, PartialEq)]
pub enum DbfValue {
    /// Parsed numeric cell.
    Numeric(f64),
    /// Character cell, or a numeric cell whose text did not parse.
    Text(String),
    /// `DD.MM.YYYY`, or empty for a blank date.
    Date(String),
    /// Raw logical character (`T`, `F`, `?`, ...), possibly empty.
    Logical(String),
    /// Blank numeric cell.
    Null,
}

impl DbfValue {
    /// Create a text value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Create a numeric value.
    #[must_use]
    pub fn numeric(value: f64) -> Self {
        Self::Numeric(value)
    }

    /// The value a field of this type holds when its bytes are absent.
    #[must_use]
    pub fn empty_for(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Numeric => Self::Null,
            FieldType::Date => Self::Date(String::new()),
            FieldType::Logical => Self::Logical(String::new()),
            FieldType::Character | FieldType::Other(_) => Self::Text(String::new()),
        }
    }

    /// True for `Null` and for empty text of any kind.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Numeric(_) => false,
            Self::Text(s) | Self::Date(s) | Self::Logical(s) => s.is_empty(),
        }
    }

    /// Numeric payload, if this is a parsed number.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Numeric(v) => Some(*v),
            _ => None,
        }
    }

    /// Text payload for the string-shaped variants.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Date(s) | Self::Logical(s) => Some(s),
            Self::Numeric(_) | Self::Null => None,
        }
    }
}

impl fmt::Display for DbfValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(v) => write!(f, "{v}"),
            Self::Text(s) | Self::Date(s) | Self::Logical(s) => f.write_str(s),
            Self::Null => Ok(()),
        }
    }
}

impl From<f64> for DbfValue {
    fn from(value: f64) -> Self {
        Self::Numeric(value)
    }
}

impl From<&str> for DbfValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for DbfValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for DbfValue {
    fn from(value: bool) -> Self {
        Self::Logical(if value { "T" } else { "F" }.to_string())
    }
}

impl From<NaiveDate> for DbfValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value.format("%d.%m.%Y").to_string())
    }
}

impl<T: Into<DbfValue>> From<Option<T>> for DbfValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(DbfValue::numeric(1234.5).to_string(), "1234.5");
        assert_eq!(DbfValue::numeric(5.0).to_string(), "5");
        assert_eq!(DbfValue::Null.to_string(), "");
        assert_eq!(DbfValue::text("abc").to_string(), "abc");
    }

    #[test]
    fn test_native_date_becomes_text() {
        let date = NaiveDate::from_ymd_opt(2023, 10, 5).unwrap();
        assert_eq!(DbfValue::from(date), DbfValue::Date("05.10.2023".to_string()));
    }

    #[test]
    fn test_empty_for_type() {
        assert_eq!(DbfValue::empty_for(FieldType::Numeric), DbfValue::Null);
        assert_eq!(
            DbfValue::empty_for(FieldType::Date),
            DbfValue::Date(String::new())
        );
        assert!(DbfValue::empty_for(FieldType::Logical).is_empty());
        assert!(DbfValue::empty_for(FieldType::Other(b'M')).is_empty());
    }

    #[test]
    fn test_conversions() {
        assert_eq!(DbfValue::from(true), DbfValue::Logical("T".to_string()));
        assert_eq!(DbfValue::from(None::<f64>), DbfValue::Null);
        assert_eq!(DbfValue::from(Some(2.5)).as_f64(), Some(2.5));
        assert_eq!(DbfValue::from("x").as_str(), Some("x"));
    }
}
