//! Field descriptor types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest field width a descriptor may declare.
pub const MAX_FIELD_SIZE: u8 = 254;

/// Field names occupy at most 10 bytes in the header.
pub const MAX_NAME_BYTES: usize = 10;

/// DBF field type, stored as a single ASCII letter in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// `C`: fixed-width text.
    Character,
    /// `N`: right-aligned decimal text.
    Numeric,
    /// `D`: `YYYYMMDD`.
    Date,
    /// `L`: single `T`/`F` byte.
    Logical,
    /// Any other type code, carried through untouched.
    Other(u8),
}

impl FieldType {
    /// Interpret a header type byte.
    #[must_use]
    pub fn from_code(code: u8) -> Self {
        match code {
            b'C' => Self::Character,
            b'N' => Self::Numeric,
            b'D' => Self::Date,
            b'L' => Self::Logical,
            other => Self::Other(other),
        }
    }

    /// Header type byte.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Character => b'C',
            Self::Numeric => b'N',
            Self::Date => b'D',
            Self::Logical => b'L',
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(self.code()))
    }
}

/// One column definition: name, type, width and decimal count.
///
/// The same descriptor list drives both reading and writing; decimals are
/// meaningful for numeric fields only and are written as 0 otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name (at most 10 bytes once encoded).
    pub name: String,
    /// Field type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Width in bytes, 1..=254.
    pub size: u8,
    /// Fractional digits for numeric fields.
    #[serde(default)]
    pub decimal: u8,
}

impl FieldDescriptor {
    /// Create a descriptor.
    pub fn new(name: impl Into<String>, field_type: FieldType, size: u8, decimal: u8) -> Self {
        Self {
            name: name.into(),
            field_type,
            size,
            decimal,
        }
    }

    /// Create a character field.
    pub fn character(name: impl Into<String>, size: u8) -> Self {
        Self::new(name, FieldType::Character, size, 0)
    }

    /// Create a numeric field.
    pub fn numeric(name: impl Into<String>, size: u8, decimal: u8) -> Self {
        Self::new(name, FieldType::Numeric, size, decimal)
    }

    /// Create a date field (always 8 bytes).
    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Date, 8, 0)
    }

    /// Create a logical field (always 1 byte).
    pub fn logical(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Logical, 1, 0)
    }

    /// Decimal count as written to the header.
    #[must_use]
    pub fn header_decimal(&self) -> u8 {
        match self.field_type {
            FieldType::Numeric => self.decimal,
            _ => 0,
        }
    }
}
