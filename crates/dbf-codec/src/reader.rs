//! DBF file reader.
//!
//! Parsing is a pure function over an in-memory buffer. Damaged headers are
//! repaired where possible and every repair is reported as a
//! [`Diagnostic`] on the returned document; only a buffer that cannot hold a
//! header or a record size that cannot be right aborts the parse.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::{debug, warn};

use crate::codepage::{CodePage, DEFAULT_DETECTION_ORDER, detect_code_page};
use crate::date::display_date;
use crate::error::{DbfError, Result};
use crate::header::{DELETED_FLAG, DbfHeader, parse_field_table, parse_header};
use crate::names::dedupe_fields;
use crate::types::{
    DbfDocument, DbfValue, Diagnostic, DiagnosticKind, FieldDescriptor, FieldType, ReadStats, Row,
};

/// DBF file reader.
///
/// Reads the whole source into memory, then hands it to [`parse_dbf`].
pub struct DbfReader<R: Read> {
    reader: BufReader<R>,
    code_page: CodePage,
}

impl<R: Read> DbfReader<R> {
    /// Create a reader decoding text under `code_page`.
    pub fn new(reader: R, code_page: CodePage) -> Self {
        Self {
            reader: BufReader::new(reader),
            code_page,
        }
    }

    /// Read and parse the table.
    pub fn read_document(mut self) -> Result<DbfDocument> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        parse_dbf(&data, &self.code_page)
    }
}

impl DbfReader<File> {
    /// Open a DBF file for reading.
    pub fn open(path: &Path, code_page: CodePage) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DbfError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                DbfError::Io(e)
            }
        })?;
        Ok(Self::new(file, code_page))
    }
}

/// Read a DBF file from a path.
pub fn read_dbf(path: &Path, code_page: &CodePage) -> Result<DbfDocument> {
    DbfReader::open(path, code_page.clone())?.read_document()
}

/// Parse a DBF table from bytes.
///
/// # Errors
/// - `Format` if the buffer is shorter than the 32-byte header.
/// - `CorruptFile` if the record size is zero or larger than the buffer.
pub fn parse_dbf(data: &[u8], code_page: &CodePage) -> Result<DbfDocument> {
    let header = parse_header(data)?;
    let mut diagnostics = Vec::new();
    let layout = plan_records(data.len(), &header, &mut diagnostics)?;

    if !code_page.is_supported() {
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::UnsupportedCodePage,
            format!(
                "code page '{}' is not supported, text passed through undecoded",
                code_page.label()
            ),
        ));
    }

    let mut fields = parse_field_table(data, code_page);
    dedupe_fields(&mut fields);

    let mut stats = ReadStats {
        declared_records: header.record_count,
        usable_records: layout.usable_records,
        ..ReadStats::default()
    };
    let mut rows = Vec::with_capacity(layout.usable_records);

    for (offset, record) in layout.records(data) {
        stats.records_scanned += 1;
        if record[0] == DELETED_FLAG {
            stats.deleted_records += 1;
            continue;
        }
        rows.push(decode_record(
            record,
            offset,
            &fields,
            code_page,
            &mut diagnostics,
        ));
    }

    debug!(
        fields = fields.len(),
        rows = rows.len(),
        deleted = stats.deleted_records,
        diagnostics = diagnostics.len(),
        code_page = %code_page,
        "parsed DBF table"
    );

    Ok(DbfDocument {
        fields,
        rows,
        diagnostics,
        stats,
    })
}

/// Guess the code page of a DBF buffer.
///
/// The language driver byte wins when it names a known code page; otherwise
/// the raw bytes of every character cell of every live record are tried
/// against the default candidates. Advisory only: [`parse_dbf`] never calls
/// this.
///
/// # Errors
/// Same header errors as [`parse_dbf`].
pub fn sniff_code_page(data: &[u8]) -> Result<Option<CodePage>> {
    let header = parse_header(data)?;
    if let Some(code_page) = CodePage::from_language_driver(header.language_driver) {
        debug!(
            language_driver = header.language_driver,
            code_page = %code_page,
            "code page from language driver"
        );
        return Ok(Some(code_page));
    }

    let mut ignored = Vec::new();
    let layout = plan_records(data.len(), &header, &mut ignored)?;
    let fields = parse_field_table(data, &CodePage::passthrough());

    let mut samples: Vec<&[u8]> = Vec::new();
    for (_, record) in layout.records(data) {
        if record[0] == DELETED_FLAG {
            continue;
        }
        for (field, bytes) in field_slices(record, &fields) {
            if field.field_type == FieldType::Character
                && let Some(bytes) = bytes
            {
                samples.push(bytes);
            }
        }
    }

    Ok(detect_code_page(&samples, DEFAULT_DETECTION_ORDER))
}

/// Where the records live and how many of them can be read.
#[derive(Debug, Clone, Copy)]
struct RecordLayout {
    start: usize,
    record_size: usize,
    usable_records: usize,
}

impl RecordLayout {
    /// Records in file order with their byte offsets.
    ///
    /// Every yielded slice is exactly `record_size` bytes long.
    fn records<'a>(self, data: &'a [u8]) -> impl Iterator<Item = (usize, &'a [u8])> + 'a {
        (0..self.usable_records).filter_map(move |index| {
            let offset = self.start + index * self.record_size;
            data.get(offset..offset + self.record_size)
                .map(|record| (offset, record))
        })
    }
}

/// Check the record geometry and repair the record count.
///
/// Repairs, in order: a zero count over a non-empty data section is
/// recomputed from the data size; a count overrunning the data is clamped to
/// the whole records that fit. Both are recorded as header diagnostics.
fn plan_records(
    total: usize,
    header: &DbfHeader,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<RecordLayout> {
    let header_size = usize::from(header.header_size);
    let record_size = usize::from(header.record_size);

    if record_size == 0 || record_size > total {
        return Err(DbfError::corrupt(format!(
            "record size {record_size} is out of bounds for a {total}-byte file"
        )));
    }

    // Signed: a header size past the end of the buffer leaves no data.
    let data_section = i64::try_from(total).unwrap_or(i64::MAX) - i64::from(header.header_size);
    let record_len = i64::from(header.record_size);
    let fitting = (data_section / record_len).max(0);
    let mut count = i64::from(header.record_count);

    if count == 0 && data_section >= record_len {
        warn!(
            declared = 0,
            recomputed = fitting,
            "record count is zero but data is present, recomputing"
        );
        diagnostics.push(
            Diagnostic::new(
                DiagnosticKind::RecoverableHeaderInconsistency,
                format!("declared record count 0, recomputed {fitting} from data size"),
            )
            .at_offset(4),
        );
        count = fitting;
    }

    if count * record_len > data_section {
        warn!(
            declared = count,
            clamped = fitting,
            "record count overruns data, clamping"
        );
        diagnostics.push(
            Diagnostic::new(
                DiagnosticKind::RecoverableHeaderInconsistency,
                format!("record count {count} overruns data, clamped to {fitting}"),
            )
            .at_offset(4),
        );
        count = fitting;
    }

    let first_fits = header_size + record_size <= total;
    let usable_records = if count > 0 && first_fits {
        usize::try_from(count).unwrap_or(0)
    } else {
        total.saturating_sub(header_size) / record_size
    };

    Ok(RecordLayout {
        start: header_size,
        record_size,
        usable_records,
    })
}

/// Byte range of each field inside a record, clipped to the record.
///
/// Fields lying wholly past the end of the record yield `None`.
fn field_slices<'a>(
    record: &'a [u8],
    fields: &'a [FieldDescriptor],
) -> impl Iterator<Item = (&'a FieldDescriptor, Option<&'a [u8]>)> + 'a {
    let mut start = 1usize;
    fields.iter().map(move |field| {
        let end = start + usize::from(field.size);
        let bytes = (start < record.len()).then(|| &record[start..end.min(record.len())]);
        start = end;
        (field, bytes)
    })
}

fn decode_record(
    record: &[u8],
    offset: usize,
    fields: &[FieldDescriptor],
    code_page: &CodePage,
    diagnostics: &mut Vec<Diagnostic>,
) -> Row {
    let mut row = Row::with_capacity(fields.len());
    for (field, bytes) in field_slices(record, fields) {
        let value = match bytes {
            Some(bytes) => decode_cell(field, bytes, offset, code_page, diagnostics),
            None => DbfValue::empty_for(field.field_type),
        };
        row.insert(field.name.clone(), value);
    }
    row
}

fn decode_cell(
    field: &FieldDescriptor,
    bytes: &[u8],
    offset: usize,
    code_page: &CodePage,
    diagnostics: &mut Vec<Diagnostic>,
) -> DbfValue {
    match field.field_type {
        FieldType::Numeric => {
            let text = code_page.decode(bytes);
            let text = text.trim();
            if text.is_empty() {
                return DbfValue::Null;
            }
            match text.parse::<f64>() {
                Ok(value) if value.is_finite() => DbfValue::Numeric(value),
                _ => {
                    debug!(field = %field.name, offset, raw = text, "numeric cell kept as text");
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticKind::FieldDecodeAnomaly,
                            format!("not a number: '{text}'"),
                        )
                        .in_field(field.name.clone())
                        .at_offset(offset),
                    );
                    DbfValue::Text(text.to_string())
                }
            }
        }
        FieldType::Date => DbfValue::Date(display_date(bytes, |raw| code_page.decode(raw))),
        FieldType::Logical => DbfValue::Logical(code_page.decode(bytes).trim_end().to_string()),
        FieldType::Character | FieldType::Other(_) => {
            DbfValue::Text(code_page.decode(bytes).trim_end().to_string())
        }
    }
}
