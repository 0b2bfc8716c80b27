//! Parsed table and its diagnostics.

use std::fmt;

use super::{DbfValue, FieldDescriptor, Row};

/// Kind of non-fatal condition met while reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Declared record count was zero or overran the data; it was corrected.
    RecoverableHeaderInconsistency,
    /// A numeric cell did not parse and was kept as text.
    FieldDecodeAnomaly,
    /// The requested code page is unknown; bytes were passed through.
    UnsupportedCodePage,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RecoverableHeaderInconsistency => "header",
            Self::FieldDecodeAnomaly => "field",
            Self::UnsupportedCodePage => "code-page",
        };
        f.write_str(name)
    }
}

/// A non-fatal condition, recorded where it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// What went wrong.
    pub kind: DiagnosticKind,
    /// Human-readable message.
    pub message: String,
    /// Byte offset in the buffer, when meaningful.
    pub offset: Option<usize>,
    /// Field name, for cell-level conditions.
    pub field: Option<String>,
}

impl Diagnostic {
    /// Create a diagnostic without location.
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            offset: None,
            field: None,
        }
    }

    /// Attach a byte offset.
    #[must_use]
    pub fn at_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Attach a field name.
    #[must_use]
    pub fn in_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(field) = &self.field {
            write!(f, " (field {field})")?;
        }
        if let Some(offset) = self.offset {
            write!(f, " (offset {offset})")?;
        }
        Ok(())
    }
}

/// Record accounting for one parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    /// Record count stored in the header.
    pub declared_records: u32,
    /// Record count after header repair.
    pub usable_records: usize,
    /// Records visited, deleted ones included.
    pub records_scanned: usize,
    /// Records skipped because of the `*` deletion flag.
    pub deleted_records: usize,
}

/// A parsed DBF table: field layout, live rows and read diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DbfDocument {
    /// Field layout, names already de-duplicated.
    pub fields: Vec<FieldDescriptor>,
    /// Live rows, each keyed by exactly the field names in field order.
    pub rows: Vec<Row>,
    /// Non-fatal conditions met while reading.
    pub diagnostics: Vec<Diagnostic>,
    /// Record accounting.
    pub stats: ReadStats,
}

impl DbfDocument {
    /// Create a document from a layout and rows.
    #[must_use]
    pub fn new(fields: Vec<FieldDescriptor>, rows: Vec<Row>) -> Self {
        Self {
            fields,
            rows,
            diagnostics: Vec::new(),
            stats: ReadStats::default(),
        }
    }

    /// Number of live rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Field descriptor by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// All values of one column, in row order.
    pub fn column<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Option<&'a DbfValue>> {
        self.rows.iter().map(move |row| row.get(name))
    }

    /// Diagnostics of a given kind.
    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }

    /// True if any diagnostic of `kind` was recorded.
    #[must_use]
    pub fn has_diagnostic(&self, kind: DiagnosticKind) -> bool {
        self.diagnostics_of(kind).next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::new(DiagnosticKind::FieldDecodeAnomaly, "not a number: '1a'")
            .in_field("AMOUNT")
            .at_offset(97);
        assert_eq!(
            diag.to_string(),
            "[field] not a number: '1a' (field AMOUNT) (offset 97)"
        );
    }

    #[test]
    fn test_document_lookup() {
        let mut row = Row::new();
        row.insert("NAME", "Ann");
        let doc = DbfDocument::new(vec![FieldDescriptor::character("NAME", 10)], vec![row]);

        assert_eq!(doc.num_rows(), 1);
        assert!(doc.field("NAME").is_some());
        assert_eq!(
            doc.column("NAME").collect::<Vec<_>>(),
            vec![Some(&DbfValue::text("Ann"))]
        );
        assert!(!doc.has_diagnostic(DiagnosticKind::FieldDecodeAnomaly));
    }
}
