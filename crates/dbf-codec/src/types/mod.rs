//! Core types for DBF table handling.
//!
//! This module provides the fundamental data structures for representing
//! DBF field layouts, cell values, rows and parsed documents.

mod document;
mod field;
mod options;
mod row;
mod value;

pub use document::{DbfDocument, Diagnostic, DiagnosticKind, ReadStats};
pub use field::{FieldDescriptor, FieldType, MAX_FIELD_SIZE, MAX_NAME_BYTES};
pub use options::DbfWriterOptions;
pub use row::Row;
pub use value::DbfValue;
