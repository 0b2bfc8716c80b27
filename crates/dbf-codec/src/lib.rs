//! dBASE (DBF) table reader and writer.
//!
//! This crate reads and writes DBF tables without memo files, with text in
//! legacy single-byte code pages (windows-1251, cp866, KOI8-U, ...) or UTF-8.
//!
//! # Features
//!
//! - Byte-exact reader and writer for `C`, `N`, `D` and `L` fields
//! - Recovery from zero or overrunning record counts, reported as diagnostics
//! - Deleted-record skipping
//! - Code page resolution, encoding and detection via `encoding_rs`
//! - Field layout inference from a sample row
//! - Field name collision resolution (`NAME`, `NAME_1`, `NAME_2`)
//!
//! # Example
//!
//! ```
//! use dbf_codec::{CodePage, DbfValue, FieldDescriptor, Row, parse_dbf, write_dbf};
//!
//! let cp = CodePage::resolve("windows-1251");
//! let fields = vec![
//!     FieldDescriptor::character("CITY", 20),
//!     FieldDescriptor::numeric("POP", 10, 0),
//! ];
//! let rows: Vec<Row> = vec![
//!     [("CITY", DbfValue::text("Київ")), ("POP", DbfValue::numeric(2952301.0))]
//!         .into_iter()
//!         .collect(),
//! ];
//!
//! let bytes = write_dbf(&fields, &rows, &cp).unwrap();
//! let doc = parse_dbf(&bytes, &cp).unwrap();
//!
//! assert_eq!(doc.fields, fields);
//! assert_eq!(doc.rows[0].get("CITY"), Some(&DbfValue::text("Київ")));
//! ```
//!
//! # Damaged Files
//!
//! ```
//! use dbf_codec::{CodePage, DiagnosticKind, FieldDescriptor, Row, parse_dbf, write_dbf};
//!
//! let fields = vec![FieldDescriptor::character("A", 3)];
//! let rows: Vec<Row> = (0..5).map(|_| [("A", "x")].into_iter().collect()).collect();
//! let mut bytes = write_dbf(&fields, &rows, &CodePage::utf8()).unwrap();
//! bytes[4..8].copy_from_slice(&0u32.to_le_bytes());
//!
//! let doc = parse_dbf(&bytes, &CodePage::utf8()).unwrap();
//! assert_eq!(doc.num_rows(), 5);
//! assert!(doc.has_diagnostic(DiagnosticKind::RecoverableHeaderInconsistency));
//! ```

pub mod codepage;
pub mod date;
mod error;
pub mod header;
mod infer;
mod names;
mod reader;
mod types;
mod writer;

// Re-export error types
pub use error::{DbfError, Result};

// Re-export core types
pub use types::{
    DbfDocument, DbfValue, DbfWriterOptions, Diagnostic, DiagnosticKind, FieldDescriptor,
    FieldType, MAX_FIELD_SIZE, MAX_NAME_BYTES, ReadStats, Row,
};

// Re-export code page handling
pub use codepage::{
    CodePage, DEFAULT_DETECTION_ORDER, SUPPORTED_CODE_PAGES, decode, detect_code_page, encode,
};

// Re-export inference and naming
pub use infer::{extract_fields, infer_field, infer_fields};
pub use names::{fit_field_names, resolve_field_names};

// Re-export reader functionality
pub use reader::{DbfReader, parse_dbf, read_dbf, sniff_code_page};

// Re-export writer functionality
pub use writer::{DbfWriter, serialize, write_dbf, write_dbf_file};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
