//! CSV and field-layout files around the codec.
//!
//! CSV is always UTF-8 on this side; code pages only apply to the DBF.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use tracing::debug;

use dbf_codec::{DbfValue, FieldDescriptor, Row, resolve_field_names};

/// Read CSV rows from a file.
pub fn read_csv_rows(path: &Path) -> Result<Vec<Row>> {
    let file = File::open(path).with_context(|| format!("open csv: {}", path.display()))?;
    read_csv(file).with_context(|| format!("read csv: {}", path.display()))
}

/// Read CSV rows, one [`Row`] per record keyed by the header line.
///
/// Header names are BOM-stripped and trimmed; repeated headers get `_1`,
/// `_2`, ... so no column is lost. Short records leave trailing keys out,
/// which the writer fills with empty values.
pub fn read_csv<R: Read>(source: R) -> Result<Vec<Row>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let raw_headers: Vec<String> = reader
        .headers()
        .context("read headers")?
        .iter()
        .map(|name| name.trim_matches('\u{feff}').trim().to_string())
        .collect();
    let headers = resolve_field_names(&raw_headers);

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("read record {}", index + 1))?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (name.clone(), DbfValue::text(value.trim())))
            .collect();
        rows.push(row);
    }
    debug!(columns = headers.len(), rows = rows.len(), "read csv");
    Ok(rows)
}

/// Write rows as CSV to a file.
pub fn write_csv_rows(path: &Path, fields: &[FieldDescriptor], rows: &[Row]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create csv: {}", path.display()))?;
    write_csv(file, fields, rows).with_context(|| format!("write csv: {}", path.display()))
}

/// Write rows as CSV with one column per field, in field order.
///
/// Numbers use their shortest form and blank cells stay empty.
pub fn write_csv<W: Write>(sink: W, fields: &[FieldDescriptor], rows: &[Row]) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(sink);
    writer.write_record(fields.iter().map(|field| field.name.as_str()))?;
    for row in rows {
        writer.write_record(fields.iter().map(|field| {
            row.get(&field.name)
                .map(ToString::to_string)
                .unwrap_or_default()
        }))?;
    }
    writer.flush()?;
    Ok(())
}

/// Load a field layout saved as JSON.
pub fn load_layout(path: &Path) -> Result<Vec<FieldDescriptor>> {
    let file = File::open(path).with_context(|| format!("open layout: {}", path.display()))?;
    serde_json::from_reader(file).with_context(|| format!("parse layout: {}", path.display()))
}

/// Render a field layout as pretty JSON.
pub fn layout_json(fields: &[FieldDescriptor]) -> Result<String> {
    serde_json::to_string_pretty(fields).context("serialize layout")
}
