//! Write-then-read tests.
//!
//! A table written by the serializer must read back with the same field
//! layout and the same values: numbers exactly, dates as `DD.MM.YYYY`
//! strings, text up to trailing padding.

use chrono::NaiveDate;
use proptest::prelude::*;

use dbf_codec::{
    CodePage, DbfValue, DbfWriterOptions, FieldDescriptor, FieldType, Row, parse_dbf, serialize,
};

fn options(code_page: &str) -> DbfWriterOptions {
    DbfWriterOptions::new()
        .with_code_page_label(code_page)
        .with_last_update(NaiveDate::from_ymd_opt(2023, 10, 5).unwrap())
}

/// Helper to write and read back a table.
fn roundtrip(fields: &[FieldDescriptor], rows: &[Row], code_page: &str) -> dbf_codec::DbfDocument {
    let opts = options(code_page);
    let bytes = serialize(fields, rows, &opts).unwrap();
    parse_dbf(&bytes, &opts.code_page).unwrap()
}

#[test]
fn test_mixed_table_roundtrip() {
    let fields = vec![
        FieldDescriptor::character("NAME", 20),
        FieldDescriptor::numeric("PRICE", 10, 2),
        FieldDescriptor::date("SOLD"),
        FieldDescriptor::logical("PAID"),
    ];
    let rows: Vec<Row> = vec![
        [
            ("NAME", DbfValue::text("Чай")),
            ("PRICE", DbfValue::numeric(12.5)),
            ("SOLD", DbfValue::Date("01.03.2024".into())),
            ("PAID", DbfValue::Logical("T".into())),
        ]
        .into_iter()
        .collect(),
        [
            ("NAME", DbfValue::text("Кава")),
            ("PRICE", DbfValue::Null),
            ("SOLD", DbfValue::Date(String::new())),
            ("PAID", DbfValue::Logical("F".into())),
        ]
        .into_iter()
        .collect(),
    ];

    for code_page in ["utf-8", "windows-1251", "cp866", "koi8-u"] {
        let doc = roundtrip(&fields, &rows, code_page);
        assert_eq!(doc.fields, fields, "{code_page}");
        assert_eq!(doc.rows, rows, "{code_page}");
        assert!(doc.diagnostics.is_empty(), "{code_page}");
    }
}

#[test]
fn test_numeric_written_with_fixed_decimals() {
    let fields = vec![FieldDescriptor::numeric("AMT", 9, 2)];
    let rows: Vec<Row> = vec![[("AMT", 1234.5)].into_iter().collect()];

    let opts = options("utf-8");
    let bytes = serialize(&fields, &rows, &opts).unwrap();
    let record = &bytes[bytes.len() - 11..bytes.len() - 1];
    assert_eq!(record, b"   1234.50");

    let doc = parse_dbf(&bytes, &opts.code_page).unwrap();
    assert_eq!(doc.rows[0].get("AMT"), Some(&DbfValue::Numeric(1234.5)));
}

#[test]
fn test_date_stored_as_yyyymmdd() {
    let fields = vec![FieldDescriptor::date("DAY")];
    let rows: Vec<Row> = vec![[("DAY", "05.10.2023")].into_iter().collect()];

    let opts = options("utf-8");
    let bytes = serialize(&fields, &rows, &opts).unwrap();
    assert_eq!(&bytes[bytes.len() - 9..bytes.len() - 1], b"20231005");

    let doc = parse_dbf(&bytes, &opts.code_page).unwrap();
    assert_eq!(
        doc.rows[0].get("DAY"),
        Some(&DbfValue::Date("05.10.2023".into()))
    );
}

#[test]
fn test_native_date_and_us_shapes_normalised() {
    let fields = vec![FieldDescriptor::date("D")];
    let rows: Vec<Row> = vec![
        [("D", DbfValue::from(NaiveDate::from_ymd_opt(1999, 12, 31).unwrap()))]
            .into_iter()
            .collect(),
        [("D", DbfValue::text("7/4/76"))].into_iter().collect(),
        [("D", DbfValue::text("2021-06-30T00:00:00"))].into_iter().collect(),
    ];

    let doc = roundtrip(&fields, &rows, "utf-8");
    let dates: Vec<String> = doc.column("D").map(|v| v.unwrap().to_string()).collect();
    assert_eq!(dates, vec!["31.12.1999", "04.07.1976", "30.06.2021"]);
}

#[test]
fn test_text_truncated_to_field_size() {
    let fields = vec![FieldDescriptor::character("CITY", 6)];
    let rows: Vec<Row> = vec![[("CITY", "Дніпропетровськ")].into_iter().collect()];

    // Two bytes per Cyrillic letter in UTF-8, one in windows-1251.
    let doc = roundtrip(&fields, &rows, "utf-8");
    assert_eq!(doc.rows[0].get("CITY"), Some(&DbfValue::text("Дні")));

    let doc = roundtrip(&fields, &rows, "windows-1251");
    assert_eq!(doc.rows[0].get("CITY"), Some(&DbfValue::text("Дніпро")));
}

#[test]
fn test_overflowing_numeric_reads_back_as_text() {
    let fields = vec![FieldDescriptor::numeric("N", 3, 0)];
    let rows: Vec<Row> = vec![[("N", 99999.0)].into_iter().collect()];

    let doc = roundtrip(&fields, &rows, "utf-8");
    assert_eq!(doc.rows[0].get("N"), Some(&DbfValue::text("***")));
    assert_eq!(doc.diagnostics.len(), 1);
}

#[test]
fn test_missing_keys_and_extra_keys() {
    let fields = vec![
        FieldDescriptor::character("A", 2),
        FieldDescriptor::numeric("B", 2, 0),
    ];
    let rows: Vec<Row> = vec![[("B", "7"), ("EXTRA", "ignored")].into_iter().collect()];

    let doc = roundtrip(&fields, &rows, "utf-8");
    let row = &doc.rows[0];
    assert_eq!(row.keys().collect::<Vec<_>>(), vec!["A", "B"]);
    assert_eq!(row.get("A"), Some(&DbfValue::text("")));
    assert_eq!(row.get("B"), Some(&DbfValue::Numeric(7.0)));
}

#[test]
fn test_same_input_same_bytes_across_calls() {
    let fields = vec![FieldDescriptor::character("A", 4)];
    let rows: Vec<Row> = vec![[("A", "Ёж")].into_iter().collect()];
    let first = serialize(&fields, &rows, &options("cp866")).unwrap();
    let second = serialize(&fields, &rows, &options("cp866")).unwrap();
    assert_eq!(first, second);
}

fn layout_strategy() -> impl Strategy<Value = Vec<FieldDescriptor>> {
    let field = prop_oneof![
        (1u8..=30).prop_map(|size| (FieldType::Character, size, 0)),
        (1u8..=6, 0u8..=3, 0u8..=2).prop_map(|(int, decimal, slack)| {
            let point = u8::from(decimal > 0);
            (FieldType::Numeric, int + decimal + point + slack, decimal)
        }),
        Just((FieldType::Date, 8, 0)),
        Just((FieldType::Logical, 1, 0)),
    ];
    prop::collection::vec(field, 1..6).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (field_type, size, decimal))| {
                FieldDescriptor::new(format!("F{i}"), field_type, size, decimal)
            })
            .collect()
    })
}

fn value_strategy(field: &FieldDescriptor) -> BoxedStrategy<DbfValue> {
    match field.field_type {
        FieldType::Numeric => {
            let decimal = u32::from(field.decimal);
            let point = u32::from(field.decimal > 0);
            let digits = u32::from(field.size) - decimal - point;
            let scale = 10f64.powi(field.decimal.into());
            prop_oneof![
                Just(DbfValue::Null),
                (0u64..10u64.pow(digits + decimal))
                    .prop_map(move |m| DbfValue::Numeric(m as f64 / scale)),
            ]
            .boxed()
        }
        FieldType::Date => prop_oneof![
            Just(DbfValue::Date(String::new())),
            (1900u32..2100, 1u32..=12, 1u32..=28)
                .prop_map(|(y, m, d)| DbfValue::Date(format!("{d:02}.{m:02}.{y}"))),
        ]
        .boxed(),
        FieldType::Logical => prop_oneof![Just("T"), Just("F")]
            .prop_map(|v| DbfValue::Logical(v.to_string()))
            .boxed(),
        FieldType::Character | FieldType::Other(_) => {
            let pattern = format!("[a-zA-Zа-яА-ЯіїєІЇЄ0-9 .,-]{{0,{}}}", field.size);
            proptest::string::string_regex(&pattern)
                .unwrap()
                .prop_map(DbfValue::Text)
                .boxed()
        }
    }
}

fn table_strategy() -> impl Strategy<Value = (Vec<FieldDescriptor>, Vec<Vec<DbfValue>>)> {
    layout_strategy().prop_flat_map(|fields| {
        let row: Vec<BoxedStrategy<DbfValue>> = fields.iter().map(value_strategy).collect();
        (Just(fields), prop::collection::vec(row, 0..8))
    })
}

/// Text comes back without trailing padding; everything else exactly.
fn expected(value: &DbfValue) -> DbfValue {
    match value {
        DbfValue::Text(text) => DbfValue::Text(text.trim_end().to_string()),
        other => other.clone(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_write_then_read_is_lossless((fields, values) in table_strategy()) {
        let rows: Vec<Row> = values
            .iter()
            .map(|cells| {
                fields
                    .iter()
                    .zip(cells)
                    .map(|(field, value)| (field.name.clone(), value.clone()))
                    .collect()
            })
            .collect();

        let opts = options("windows-1251");
        let bytes = serialize(&fields, &rows, &opts);
        prop_assert!(bytes.is_ok(), "serialize failed: {:?}", bytes.err());
        let doc = parse_dbf(&bytes.unwrap(), &opts.code_page).unwrap();

        prop_assert_eq!(&doc.fields, &fields);
        prop_assert_eq!(doc.rows.len(), rows.len());
        prop_assert!(doc.diagnostics.is_empty());
        for (read, written) in doc.rows.iter().zip(&rows) {
            for (name, value) in written.iter() {
                let want = expected(value);
                prop_assert_eq!(read.get(name), Some(&want), "field {}", name);
            }
        }
    }

    #[test]
    fn prop_parse_never_panics(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = parse_dbf(&data, &CodePage::utf8());
    }
}
