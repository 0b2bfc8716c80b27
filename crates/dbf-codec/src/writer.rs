//! DBF file writer.
//!
//! [`serialize`] is a pure function of its inputs; with a fixed
//! `last_update` in [`DbfWriterOptions`] the output is byte-reproducible.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::codepage::CodePage;
use crate::date::normalize_date;
use crate::error::{DbfError, Result};
use crate::header::{
    DbfHeader, END_OF_FILE, FIELD_TERMINATOR, LIVE_FLAG, VERSION_NO_MEMO, build_field,
    build_header, header_size_for,
};
use crate::types::{
    DbfDocument, DbfValue, DbfWriterOptions, FieldDescriptor, FieldType, MAX_FIELD_SIZE,
    MAX_NAME_BYTES, Row,
};

const PAD: u8 = b' ';
const OVERFLOW_FILL: u8 = b'*';

/// DBF file writer.
pub struct DbfWriter<W: Write> {
    writer: BufWriter<W>,
    options: DbfWriterOptions,
}

impl<W: Write> DbfWriter<W> {
    /// Create a new DBF writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            options: DbfWriterOptions::default(),
        }
    }

    /// Create a new DBF writer with options.
    pub fn with_options(writer: W, options: DbfWriterOptions) -> Self {
        Self {
            writer: BufWriter::new(writer),
            options,
        }
    }

    /// Write a table.
    pub fn write_table(mut self, fields: &[FieldDescriptor], rows: &[Row]) -> Result<()> {
        let bytes = serialize(fields, rows, &self.options)?;
        self.writer.write_all(&bytes)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a parsed document back out under this writer's options.
    pub fn write_document(self, document: &DbfDocument) -> Result<()> {
        self.write_table(&document.fields, &document.rows)
    }
}

impl DbfWriter<File> {
    /// Create a DBF file for writing.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(file))
    }

    /// Create a DBF file with options.
    pub fn create_with_options(path: &Path, options: DbfWriterOptions) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::with_options(file, options))
    }
}

/// Write a table to a path.
pub fn write_dbf_file(
    path: &Path,
    fields: &[FieldDescriptor],
    rows: &[Row],
    options: &DbfWriterOptions,
) -> Result<()> {
    DbfWriter::create_with_options(path, options.clone())?.write_table(fields, rows)
}

/// Serialize a table under `code_page`, stamped with today's date.
pub fn write_dbf(
    fields: &[FieldDescriptor],
    rows: &[Row],
    code_page: &CodePage,
) -> Result<Vec<u8>> {
    let options = DbfWriterOptions::new().with_code_page(code_page.clone());
    serialize(fields, rows, &options)
}

/// Serialize a table to DBF bytes.
///
/// Rows are matched to fields by name; a missing key writes the field
/// type's empty value and keys without a field are ignored.
///
/// # Errors
/// - `InvalidField` for an empty name or a size outside 1..=254.
/// - `DuplicateField` when two descriptors share a name once encoded and
///   cut to the 10-byte header slot.
/// - `RecordTooLarge` / `TooManyFields` when the layout overflows the
///   16-bit header slots.
pub fn serialize(
    fields: &[FieldDescriptor],
    rows: &[Row],
    options: &DbfWriterOptions,
) -> Result<Vec<u8>> {
    let code_page = &options.code_page;
    validate_fields(fields, code_page)?;

    let record_size = record_size_for(fields)?;
    let header_size = header_size_for(fields.len())?;
    let record_count = u32::try_from(rows.len()).map_err(|_| {
        DbfError::format(format!("{} rows exceed the DBF record count limit", rows.len()))
    })?;

    let header = DbfHeader {
        version: VERSION_NO_MEMO,
        last_update: Some(options.get_last_update()),
        record_count,
        header_size,
        record_size,
        language_driver: code_page.language_driver().unwrap_or(0),
    };

    let mut out = Vec::with_capacity(
        usize::from(header_size) + rows.len() * usize::from(record_size) + 1,
    );
    out.extend_from_slice(&build_header(&header));
    for field in fields {
        out.extend_from_slice(&build_field(field, code_page));
    }
    out.push(FIELD_TERMINATOR);
    debug_assert_eq!(out.len(), usize::from(header_size));

    for row in rows {
        out.push(LIVE_FLAG);
        for field in fields {
            encode_cell(field, row.get(&field.name), code_page, &mut out);
        }
    }
    out.push(END_OF_FILE);

    debug!(
        fields = fields.len(),
        rows = rows.len(),
        bytes = out.len(),
        code_page = %code_page,
        "serialized DBF table"
    );
    Ok(out)
}

fn validate_fields(fields: &[FieldDescriptor], code_page: &CodePage) -> Result<()> {
    let mut seen: HashSet<Vec<u8>> = HashSet::new();
    for field in fields {
        if field.name.trim().is_empty() {
            return Err(DbfError::invalid_field(&field.name, "name is empty"));
        }
        if field.size == 0 || field.size > MAX_FIELD_SIZE {
            return Err(DbfError::invalid_field(
                &field.name,
                format!("size {} is outside 1..={MAX_FIELD_SIZE}", field.size),
            ));
        }
        if !seen.insert(code_page.encode_within(&field.name, MAX_NAME_BYTES)) {
            return Err(DbfError::duplicate_field(&field.name));
        }
    }
    Ok(())
}

/// `1 + Σ size`, the leading byte being the deletion flag.
fn record_size_for(fields: &[FieldDescriptor]) -> Result<u16> {
    let size = 1 + fields
        .iter()
        .map(|field| usize::from(field.size))
        .sum::<usize>();
    u16::try_from(size).map_err(|_| DbfError::RecordTooLarge { size })
}

/// Append exactly `field.size` bytes for one cell.
fn encode_cell(
    field: &FieldDescriptor,
    value: Option<&DbfValue>,
    code_page: &CodePage,
    out: &mut Vec<u8>,
) {
    let size = usize::from(field.size);
    let start = out.len();

    match field.field_type {
        FieldType::Numeric => encode_numeric(field, value, out),
        FieldType::Date => out.extend_from_slice(&encode_date(value)),
        FieldType::Logical => out.push(encode_logical(value)),
        FieldType::Character | FieldType::Other(_) => {
            let text = value.map(ToString::to_string).unwrap_or_default();
            out.extend_from_slice(&code_page.encode_within(&text, size));
        }
    }

    // Date and logical cells are fixed-width; fit them to edited sizes too.
    out.truncate(start + size);
    out.resize(start + size, PAD);
}

fn encode_numeric(field: &FieldDescriptor, value: Option<&DbfValue>, out: &mut Vec<u8>) {
    let size = usize::from(field.size);
    let Some(number) = value.and_then(numeric_value) else {
        out.resize(out.len() + size, PAD);
        return;
    };

    let text = format_fixed(number, usize::from(field.decimal));
    if text.len() > size {
        warn!(
            field = %field.name,
            value = %text,
            size,
            "numeric value wider than field, writing overflow marker"
        );
        out.resize(out.len() + size, OVERFLOW_FILL);
        return;
    }

    out.resize(out.len() + size - text.len(), PAD);
    out.extend_from_slice(text.as_bytes());
}

/// `number` with `decimal` fractional digits, exact ties rounded away from
/// zero (`2.5` gives `3`, `0.125` at two places gives `0.13`).
fn format_fixed(number: f64, decimal: usize) -> String {
    if fraction_digits(number) != Some(decimal + 1) {
        return format!("{number:.decimal$}");
    }

    // The value has exactly one digit past the cut and it is a 5.
    let exact = format!("{number:.prec$}", prec = decimal + 1);
    let mut digits = exact.into_bytes();
    digits.pop();
    if digits.last() == Some(&b'.') {
        digits.pop();
    }

    let mut carry = true;
    for byte in digits.iter_mut().rev() {
        match *byte {
            b'9' => *byte = b'0',
            b'0'..=b'8' => {
                *byte += 1;
                carry = false;
                break;
            }
            _ => {}
        }
    }
    if carry {
        let first_digit = usize::from(digits.first() == Some(&b'-'));
        digits.insert(first_digit, b'1');
    }
    String::from_utf8(digits).unwrap_or_default()
}

/// Length of the exact decimal expansion of the fractional part.
///
/// Every finite `f64` is `m / 2^k`, whose expansion has exactly `k`
/// fractional digits (the last one a 5). Integers give `None`.
fn fraction_digits(number: f64) -> Option<usize> {
    if number == 0.0 || !number.is_finite() {
        return None;
    }
    let bits = number.to_bits();
    let biased = i64::try_from((bits >> 52) & 0x7ff).unwrap_or(0);
    let mut mantissa = bits & ((1 << 52) - 1);
    let exponent = if biased == 0 {
        -1074
    } else {
        mantissa |= 1 << 52;
        biased - 1075
    };
    let shift = exponent + i64::from(mantissa.trailing_zeros());
    usize::try_from(-shift).ok().filter(|&digits| digits > 0)
}

/// Number carried by a cell; text is parsed with `,` as decimal separator.
fn numeric_value(value: &DbfValue) -> Option<f64> {
    let number = match value {
        DbfValue::Numeric(number) => *number,
        DbfValue::Null => return None,
        DbfValue::Text(text) | DbfValue::Date(text) | DbfValue::Logical(text) => {
            let normalized = text.trim().replace(',', ".");
            if normalized.is_empty() {
                return None;
            }
            normalized.parse().ok()?
        }
    };
    number.is_finite().then_some(number)
}

fn encode_date(value: Option<&DbfValue>) -> [u8; 8] {
    let text = value.map(ToString::to_string).unwrap_or_default();
    if text.trim().is_empty() {
        return [PAD; 8];
    }

    normalize_date(&text)
        .and_then(|stored| <[u8; 8]>::try_from(stored.as_bytes()).ok())
        .unwrap_or(*b"00000000")
}

fn encode_logical(value: Option<&DbfValue>) -> u8 {
    let text = value.map(ToString::to_string).unwrap_or_default();
    match text.trim().to_lowercase().as_str() {
        "true" | "t" | "1" => b'T',
        _ => b'F',
    }
}
