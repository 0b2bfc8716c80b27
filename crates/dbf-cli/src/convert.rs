//! Conversions the commands are built from.
//!
//! Each function takes bytes or rows in and hands bytes or rows back; file
//! handling stays in the binary.

use anyhow::{Result, bail};
use tracing::{debug, info, warn};

use dbf_codec::header::parse_header;
use dbf_codec::{
    CodePage, DbfDocument, DbfValue, DbfWriterOptions, FieldDescriptor, FieldType, Row,
    extract_fields, fit_field_names, infer_fields, parse_dbf, serialize, sniff_code_page,
};

/// Where an import takes its field layout from.
#[derive(Debug, Clone)]
pub enum LayoutSource {
    /// Infer from the first row (`auto_detect = false` gives all `C(20)`).
    Infer { auto_detect: bool },
    /// An explicit layout, e.g. loaded from JSON.
    Explicit(Vec<FieldDescriptor>),
    /// The layout of an existing DBF table.
    FromDocument(DbfDocument),
}

/// Resolve the code page for reading `data`.
///
/// An explicit label always wins. Without one the buffer is sniffed, and
/// UTF-8 is used when sniffing finds nothing.
pub fn choose_code_page(label: Option<&str>, data: &[u8]) -> CodePage {
    if let Some(label) = label {
        return CodePage::resolve(label);
    }
    match sniff_code_page(data) {
        Ok(Some(code_page)) => {
            info!(code_page = %code_page, "detected code page");
            code_page
        }
        Ok(None) | Err(_) => CodePage::utf8(),
    }
}

/// Pick the field layout for importing `rows`.
pub fn resolve_layout(source: LayoutSource, rows: &[Row]) -> Result<Vec<FieldDescriptor>> {
    let fields = match source {
        LayoutSource::Explicit(fields) => fields,
        LayoutSource::FromDocument(document) => extract_fields(&document),
        LayoutSource::Infer { auto_detect } => {
            let Some(first) = rows.first() else {
                bail!("no rows to infer a field layout from");
            };
            infer_fields(first, auto_detect)
        }
    };
    if fields.is_empty() {
        bail!("field layout is empty");
    }

    let unknown: Vec<&str> = rows
        .first()
        .map(|row| {
            row.keys()
                .filter(|key| !fields.iter().any(|field| field.name == *key))
                .collect()
        })
        .unwrap_or_default();
    if !unknown.is_empty() {
        warn!(columns = ?unknown, "columns without a field are dropped");
    }
    Ok(fields)
}

/// Rename row keys so every column gets a distinct 10-byte field name
/// under `code_page`.
///
/// Columns keep their first-seen order across all rows, so a short first
/// row does not hide later columns.
pub fn fit_column_names(rows: Vec<Row>, code_page: &CodePage) -> Vec<Row> {
    let mut columns: Vec<String> = Vec::new();
    for row in &rows {
        for key in row.keys() {
            if !columns.iter().any(|column| column == key) {
                columns.push(key.to_string());
            }
        }
    }
    let fitted = fit_field_names(&columns, code_page);
    if columns == fitted {
        return rows;
    }
    for (column, name) in columns.iter().zip(&fitted) {
        if column != name {
            info!(column = %column, field = %name, "shortened column name");
        }
    }

    rows.into_iter()
        .map(|row| {
            row.iter()
                .map(|(key, value)| {
                    let index = columns.iter().position(|column| column == key);
                    let name = index.map_or(key, |index| fitted[index].as_str());
                    (name.to_string(), value.clone())
                })
                .collect()
        })
        .collect()
}

/// Re-encode the text of a DBF table from one code page to another.
///
/// Layout and values are kept. Numeric cells that did not read as numbers
/// (`***` overflow markers, stray text) are copied through right-aligned
/// rather than blanked. The last-update stamp is carried over when the
/// source header holds a valid date.
pub fn recode(data: &[u8], from: &CodePage, to: &CodePage) -> Result<Vec<u8>> {
    let header = parse_header(data)?;
    let document = parse_dbf(data, from)?;

    let mut options = DbfWriterOptions::new().with_code_page(to.clone());
    if let Some(date) = header.last_update {
        options = options.with_last_update(date);
    }
    let mut bytes = serialize(&document.fields, &document.rows, &options)?;
    let restored = restore_raw_numbers(&mut bytes, &document, to)?;
    info!(
        from = %from,
        to = %to,
        rows = document.rows.len(),
        restored,
        "recoded table"
    );
    Ok(bytes)
}

/// Write unparsed numeric text back over the blanks the writer left.
fn restore_raw_numbers(bytes: &mut [u8], document: &DbfDocument, to: &CodePage) -> Result<usize> {
    let header = parse_header(bytes)?;
    let header_size = usize::from(header.header_size);
    let record_size = usize::from(header.record_size);
    let mut restored = 0;

    for (index, row) in document.rows.iter().enumerate() {
        let mut offset = header_size + index * record_size + 1;
        for field in &document.fields {
            let size = usize::from(field.size);
            if field.field_type == FieldType::Numeric
                && let Some(DbfValue::Text(text)) = row.get(&field.name)
                && !text.trim().is_empty()
                && !reads_as_number(text)
                && let Some(cell) = bytes.get_mut(offset..offset + size)
            {
                let raw = to.encode_within(text.trim(), size);
                cell.fill(b' ');
                cell[size - raw.len()..].copy_from_slice(&raw);
                debug!(field = %field.name, record = index, value = %text, "kept raw numeric text");
                restored += 1;
            }
            offset += size;
        }
    }
    Ok(restored)
}

/// Whether the writer would format `text` as a number.
fn reads_as_number(text: &str) -> bool {
    text.trim()
        .replace(',', ".")
        .parse::<f64>()
        .is_ok_and(f64::is_finite)
}
