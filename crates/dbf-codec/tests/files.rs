//! Path and stream wrapper tests.

use std::io::Cursor;

use chrono::NaiveDate;
use tempfile::TempDir;

use dbf_codec::{
    CodePage, DbfError, DbfReader, DbfValue, DbfWriter, DbfWriterOptions, FieldDescriptor, Row,
    extract_fields, infer_fields, read_dbf, sniff_code_page, write_dbf_file,
};

fn sample() -> (Vec<FieldDescriptor>, Vec<Row>) {
    let fields = vec![
        FieldDescriptor::character("CITY", 20),
        FieldDescriptor::numeric("AREA", 8, 1),
    ];
    let rows = vec![
        [("CITY", DbfValue::text("Одеса")), ("AREA", DbfValue::numeric(236.9))]
            .into_iter()
            .collect(),
        [("CITY", DbfValue::text("Полтава")), ("AREA", DbfValue::numeric(182.0))]
            .into_iter()
            .collect(),
    ];
    (fields, rows)
}

#[test]
fn test_file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cities.dbf");
    let (fields, rows) = sample();
    let options = DbfWriterOptions::new()
        .with_code_page_label("cp866")
        .with_last_update(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());

    write_dbf_file(&path, &fields, &rows, &options).unwrap();
    let doc = read_dbf(&path, &options.code_page).unwrap();

    assert_eq!(doc.fields, fields);
    assert_eq!(doc.rows, rows);
}

#[test]
fn test_language_driver_sniffed_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cities.dbf");
    let (fields, rows) = sample();
    let options = DbfWriterOptions::new().with_code_page_label("windows-1251");
    write_dbf_file(&path, &fields, &rows, &options).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let sniffed = sniff_code_page(&bytes).unwrap().unwrap();
    assert_eq!(sniffed.name(), "windows-1251");
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = read_dbf(&dir.path().join("absent.dbf"), &CodePage::utf8()).unwrap_err();
    assert!(matches!(err, DbfError::FileNotFound { .. }));
    assert!(err.to_string().contains("absent.dbf"));
}

#[test]
fn test_stream_wrappers() {
    let (fields, rows) = sample();
    let mut buffer = Vec::new();
    DbfWriter::with_options(
        Cursor::new(&mut buffer),
        DbfWriterOptions::new().with_code_page_label("koi8-u"),
    )
    .write_table(&fields, &rows)
    .unwrap();

    let doc = DbfReader::new(Cursor::new(&buffer), CodePage::resolve("koi8-u"))
        .read_document()
        .unwrap();
    assert_eq!(doc.rows, rows);
}

#[test]
fn test_rewrite_with_extracted_layout() {
    let (fields, rows) = sample();
    let mut first = Vec::new();
    DbfWriter::new(&mut first).write_table(&fields, &rows).unwrap();
    let doc = DbfReader::new(first.as_slice(), CodePage::utf8())
        .read_document()
        .unwrap();

    let layout = extract_fields(&doc);
    assert_eq!(layout, fields);

    let mut second = Vec::new();
    DbfWriter::new(&mut second).write_document(&doc).unwrap();
    let again = DbfReader::new(second.as_slice(), CodePage::utf8())
        .read_document()
        .unwrap();
    assert_eq!(again.rows, doc.rows);
}

#[test]
fn test_inferred_layout_writes_readable_table() {
    let rows: Vec<Row> = vec![
        [("NAME", "Ann"), ("BORN", "02.03.1990"), ("SCORE", "17,5")]
            .into_iter()
            .collect(),
        [("NAME", "Bob"), ("BORN", "11.12.1985"), ("SCORE", "9,25")]
            .into_iter()
            .collect(),
    ];
    let fields = infer_fields(&rows[0], true);
    assert_eq!(
        fields,
        vec![
            FieldDescriptor::character("NAME", 3),
            FieldDescriptor::date("BORN"),
            FieldDescriptor::numeric("SCORE", 4, 1),
        ]
    );

    let mut buffer = Vec::new();
    DbfWriter::new(&mut buffer).write_table(&fields, &rows).unwrap();
    let doc = DbfReader::new(buffer.as_slice(), CodePage::utf8())
        .read_document()
        .unwrap();

    assert_eq!(doc.rows[1].get("BORN"), Some(&DbfValue::Date("11.12.1985".into())));
    // Written with the one decimal inferred from the first row.
    let score = doc.rows[1].get("SCORE").and_then(DbfValue::as_f64).unwrap();
    assert!((score - 9.25).abs() <= 0.051);
}
