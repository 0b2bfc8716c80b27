//! Terminal tables for command output.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use dbf_codec::header::DbfHeader;
use dbf_codec::{CodePage, DbfDocument, DbfValue, Diagnostic, FieldDescriptor, FieldType};

/// Header facts and record accounting.
pub fn header_table(header: &DbfHeader, document: &DbfDocument, code_page: &CodePage) -> Table {
    let last_update = header
        .last_update
        .map_or_else(|| "-".to_string(), |date| date.format("%Y-%m-%d").to_string());
    let stats = &document.stats;

    let mut table = Table::new();
    table.set_header(vec![header_cell("Property"), header_cell("Value")]);
    apply_table_style(&mut table);
    let rows: Vec<(&str, String)> = vec![
        ("Version", format!("0x{:02X}", header.version)),
        ("Last update", last_update),
        ("Language driver", format!("0x{:02X}", header.language_driver)),
        ("Code page", code_page.to_string()),
        ("Header size", header.header_size.to_string()),
        ("Record size", header.record_size.to_string()),
        ("Declared records", stats.declared_records.to_string()),
        ("Records read", stats.records_scanned.to_string()),
        ("Deleted records", stats.deleted_records.to_string()),
        ("Live rows", document.num_rows().to_string()),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    table
}

/// One line per field.
pub fn fields_table(fields: &[FieldDescriptor]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Name"),
        header_cell("Type"),
        header_cell("Size"),
        header_cell("Decimal"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Center);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    for (index, field) in fields.iter().enumerate() {
        table.add_row(vec![
            dim_cell(index + 1),
            Cell::new(&field.name).fg(Color::Blue).add_attribute(Attribute::Bold),
            Cell::new(field.field_type),
            Cell::new(field.size),
            if field.field_type == FieldType::Numeric {
                Cell::new(field.decimal)
            } else {
                dim_cell("-")
            },
        ]);
    }
    table
}

/// The first `limit` rows, one column per field.
pub fn rows_table(document: &DbfDocument, limit: usize) -> Table {
    let mut table = Table::new();
    table.set_header(
        document
            .fields
            .iter()
            .map(|field| header_cell(&field.name))
            .collect::<Vec<_>>(),
    );
    apply_table_style(&mut table);
    for (index, field) in document.fields.iter().enumerate() {
        if field.field_type == FieldType::Numeric {
            align_column(&mut table, index, CellAlignment::Right);
        }
    }
    for row in document.rows.iter().take(limit) {
        table.add_row(
            document
                .fields
                .iter()
                .map(|field| value_cell(row.get(&field.name)))
                .collect::<Vec<_>>(),
        );
    }
    table
}

/// Non-fatal conditions recorded while reading.
pub fn diagnostics_table(diagnostics: &[Diagnostic]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Kind"),
        header_cell("Field"),
        header_cell("Offset"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for diagnostic in diagnostics {
        table.add_row(vec![
            Cell::new(diagnostic.kind).fg(Color::Yellow),
            diagnostic
                .field
                .as_deref()
                .map_or_else(|| dim_cell("-"), Cell::new),
            diagnostic
                .offset
                .map_or_else(|| dim_cell("-"), Cell::new),
            Cell::new(&diagnostic.message),
        ]);
    }
    table
}

/// Supported code page labels with the mapping each resolves to.
pub fn encodings_table(labels: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Label"),
        header_cell("Resolves to"),
        header_cell("Driver"),
    ]);
    apply_table_style(&mut table);
    for label in labels {
        let code_page = CodePage::resolve(label);
        let driver = code_page
            .language_driver()
            .map_or_else(|| dim_cell("-"), |id| Cell::new(format!("0x{id:02X}")));
        table.add_row(vec![Cell::new(label), Cell::new(code_page.name()), driver]);
    }
    table
}

/// Shared look of every table.
pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn value_cell(value: Option<&DbfValue>) -> Cell {
    match value {
        None | Some(DbfValue::Null) => dim_cell("-"),
        Some(DbfValue::Numeric(number)) => Cell::new(number),
        Some(value) => Cell::new(value),
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(mut table: Table) -> String {
        table.force_no_tty();
        table.to_string()
    }

    #[test]
    fn test_fields_table_lists_every_field() {
        let fields = vec![
            FieldDescriptor::character("NAME", 20),
            FieldDescriptor::numeric("PRICE", 10, 2),
        ];
        let out = plain(fields_table(&fields));
        assert!(out.contains("NAME"));
        assert!(out.contains("PRICE"));
        assert!(out.contains("10"));
        assert_eq!(out.lines().count(), 6);
    }

    #[test]
    fn test_encodings_table() {
        let out = plain(encodings_table(&["cp1251", "koi8-u"]));
        assert!(out.contains("windows-1251"));
        assert!(out.contains("0xC9"));
        assert!(out.contains("KOI8-U"));
    }
}
