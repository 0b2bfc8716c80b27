//! Field layout inference from sample data.
//!
//! Each column is typed from a single sample, the value in the first row.
//! The guess is deliberately simple; callers that need a different layout
//! edit the returned descriptors before writing.

use tracing::debug;

use crate::date::looks_like_date;
use crate::types::{DbfDocument, DbfValue, FieldDescriptor, MAX_FIELD_SIZE, Row};

/// Widest numeric field inference will produce.
pub const MAX_NUMERIC_SIZE: u8 = 20;

/// Width used for every column when inference is disabled.
pub const DEFAULT_CHARACTER_SIZE: u8 = 20;

/// Guess a descriptor for one column from one sample value.
///
/// A missing sample is treated as empty text.
#[must_use]
pub fn infer_field(name: &str, sample: Option<&DbfValue>) -> FieldDescriptor {
    let text = sample.map(ToString::to_string).unwrap_or_default();

    if looks_like_date(&text) {
        return FieldDescriptor::date(name);
    }

    if let Some((size, decimal)) = numeric_shape(&text) {
        return FieldDescriptor::numeric(name, size, decimal);
    }

    let length = text.chars().count().clamp(1, usize::from(MAX_FIELD_SIZE));
    FieldDescriptor::character(name, u8::try_from(length).unwrap_or(MAX_FIELD_SIZE))
}

/// Build a layout for every column of `sample_row`, in row order.
///
/// With `auto_detect` off every column becomes `C(20)`.
#[must_use]
pub fn infer_fields(sample_row: &Row, auto_detect: bool) -> Vec<FieldDescriptor> {
    let fields: Vec<FieldDescriptor> = sample_row
        .iter()
        .map(|(name, value)| {
            if auto_detect {
                infer_field(name, Some(value))
            } else {
                FieldDescriptor::character(name, DEFAULT_CHARACTER_SIZE)
            }
        })
        .collect();
    debug!(columns = fields.len(), auto_detect, "inferred field layout");
    fields
}

/// Reuse the layout of an imported table.
#[must_use]
pub fn extract_fields(document: &DbfDocument) -> Vec<FieldDescriptor> {
    document.fields.clone()
}

/// Size and decimal count for text that reads as a finite number.
///
/// A comma counts as the decimal separator. Size is the formatted length
/// (sign and point included) capped at [`MAX_NUMERIC_SIZE`].
fn numeric_shape(text: &str) -> Option<(u8, u8)> {
    let normalized = text.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    let value: f64 = normalized.parse().ok()?;
    if !value.is_finite() {
        return None;
    }

    let decimal = normalized
        .split_once('.')
        .map_or(0, |(_, fraction)| fraction.bytes().take_while(u8::is_ascii_digit).count());
    let formatted = format!("{value:.decimal$}");
    let size = formatted.len().clamp(1, usize::from(MAX_NUMERIC_SIZE));
    let decimal = if decimal == 0 {
        0
    } else {
        decimal.min(size.saturating_sub(2))
    };

    Some((
        u8::try_from(size).unwrap_or(MAX_NUMERIC_SIZE),
        u8::try_from(decimal).unwrap_or(0),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldType;

    #[test]
    fn test_infer_date() {
        let field = infer_field("BORN", Some(&DbfValue::text("05.10.2023")));
        assert_eq!(field, FieldDescriptor::date("BORN"));

        let field = infer_field("SEEN", Some(&DbfValue::text("1/2/23")));
        assert_eq!(field.field_type, FieldType::Date);
    }

    #[test]
    fn test_infer_numeric() {
        let field = infer_field("PRICE", Some(&DbfValue::text("1234,50")));
        assert_eq!(field, FieldDescriptor::numeric("PRICE", 7, 2));

        let field = infer_field("QTY", Some(&DbfValue::numeric(42.0)));
        assert_eq!(field, FieldDescriptor::numeric("QTY", 2, 0));

        let field = infer_field("DELTA", Some(&DbfValue::text("-0.5")));
        assert_eq!(field, FieldDescriptor::numeric("DELTA", 4, 1));
    }

    #[test]
    fn test_infer_numeric_capped() {
        let field = infer_field("BIG", Some(&DbfValue::text("123456789012345678901234")));
        assert_eq!(field.field_type, FieldType::Numeric);
        assert_eq!(field.size, 20);
    }

    #[test]
    fn test_infer_character() {
        let field = infer_field("CITY", Some(&DbfValue::text("Київ")));
        assert_eq!(field, FieldDescriptor::character("CITY", 4));

        let field = infer_field("NOTE", None);
        assert_eq!(field, FieldDescriptor::character("NOTE", 1));

        let long = "x".repeat(400);
        let field = infer_field("TEXT", Some(&DbfValue::text(long)));
        assert_eq!(field.size, 254);
    }

    #[test]
    fn test_infer_fields_in_row_order() {
        let row: Row = [
            ("NAME", DbfValue::text("Ann")),
            ("AGE", DbfValue::numeric(31.0)),
            ("BORN", DbfValue::text("01.02.1993")),
        ]
        .into_iter()
        .collect();

        let fields = infer_fields(&row, true);
        let types: Vec<FieldType> = fields.iter().map(|f| f.field_type).collect();
        assert_eq!(
            types,
            vec![FieldType::Character, FieldType::Numeric, FieldType::Date]
        );

        let plain = infer_fields(&row, false);
        assert!(plain.iter().all(|f| *f == FieldDescriptor::character(&f.name, 20)));
    }
}
