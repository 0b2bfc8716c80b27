use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, info_span, warn};

use dbf_cli::convert::{
    LayoutSource, choose_code_page, fit_column_names, recode, resolve_layout,
};
use dbf_cli::summary::{
    diagnostics_table, encodings_table, fields_table, header_table, rows_table,
};
use dbf_cli::tabular::{layout_json, load_layout, read_csv_rows, write_csv_rows};
use dbf_codec::header::parse_header;
use dbf_codec::{
    CodePage, DbfDocument, DbfWriterOptions, SUPPORTED_CODE_PAGES, parse_dbf, sniff_code_page,
    write_dbf_file,
};

use crate::cli::{
    DetectArgs, ExportArgs, FieldsArgs, ImportArgs, InspectArgs, RecodeArgs,
};

/// Read a DBF file and parse it, detecting the code page when not given.
fn load_table(path: &Path, encoding: Option<&str>) -> Result<(Vec<u8>, DbfDocument, CodePage)> {
    let data = fs::read(path).with_context(|| format!("read dbf: {}", path.display()))?;
    let code_page = choose_code_page(encoding, &data);
    let document =
        parse_dbf(&data, &code_page).with_context(|| format!("parse dbf: {}", path.display()))?;
    for diagnostic in &document.diagnostics {
        warn!(file = %path.display(), "{diagnostic}");
    }
    Ok((data, document, code_page))
}

pub fn run_inspect(args: &InspectArgs) -> Result<()> {
    let span = info_span!("inspect", file = %args.file.display());
    let _guard = span.enter();

    let (data, document, code_page) = load_table(&args.file, args.encoding.encoding.as_deref())?;
    let header = parse_header(&data)?;

    println!("{}", header_table(&header, &document, &code_page));
    println!();
    println!("Fields:");
    println!("{}", fields_table(&document.fields));
    if !document.diagnostics.is_empty() {
        println!();
        println!("Diagnostics:");
        println!("{}", diagnostics_table(&document.diagnostics));
    }
    if args.rows > 0 && document.num_rows() > 0 {
        println!();
        println!(
            "Rows ({} of {}):",
            args.rows.min(document.num_rows()),
            document.num_rows()
        );
        println!("{}", rows_table(&document, args.rows));
    }
    Ok(())
}

pub fn run_export(args: &ExportArgs) -> Result<()> {
    let span = info_span!("export", file = %args.file.display());
    let _guard = span.enter();

    let (_, document, code_page) = load_table(&args.file, args.encoding.encoding.as_deref())?;
    write_csv_rows(&args.output, &document.fields, &document.rows)?;
    info!(
        output = %args.output.display(),
        rows = document.num_rows(),
        code_page = %code_page,
        "exported csv"
    );
    Ok(())
}

pub fn run_import(args: &ImportArgs) -> Result<()> {
    let span = info_span!("import", file = %args.file.display());
    let _guard = span.enter();

    let options = DbfWriterOptions::new().with_code_page_label(&args.encoding);
    let mut rows = read_csv_rows(&args.file)?;
    let source = if let Some(path) = &args.fields {
        LayoutSource::Explicit(load_layout(path)?)
    } else if let Some(path) = &args.fields_from {
        let (_, document, _) = load_table(path, None)?;
        LayoutSource::FromDocument(document)
    } else {
        rows = fit_column_names(rows, &options.code_page);
        LayoutSource::Infer {
            auto_detect: !args.no_detect,
        }
    };
    let fields = resolve_layout(source, &rows)?;

    write_dbf_file(&args.output, &fields, &rows, &options)
        .with_context(|| format!("write dbf: {}", args.output.display()))?;
    info!(
        output = %args.output.display(),
        fields = fields.len(),
        rows = rows.len(),
        code_page = %options.code_page,
        "imported csv"
    );
    Ok(())
}

pub fn run_recode(args: &RecodeArgs) -> Result<()> {
    let span = info_span!("recode", file = %args.file.display());
    let _guard = span.enter();

    let data = fs::read(&args.file).with_context(|| format!("read dbf: {}", args.file.display()))?;
    let bytes = recode(
        &data,
        &CodePage::resolve(&args.from),
        &CodePage::resolve(&args.to),
    )
    .with_context(|| format!("recode: {}", args.file.display()))?;
    fs::write(&args.output, bytes)
        .with_context(|| format!("write dbf: {}", args.output.display()))?;
    Ok(())
}

pub fn run_fields(args: &FieldsArgs) -> Result<()> {
    let (_, document, _) = load_table(&args.file, args.encoding.encoding.as_deref())?;
    match &args.output {
        Some(path) => {
            fs::write(path, layout_json(&document.fields)?)
                .with_context(|| format!("write layout: {}", path.display()))?;
            info!(output = %path.display(), fields = document.fields.len(), "saved layout");
        }
        None => println!("{}", fields_table(&document.fields)),
    }
    Ok(())
}

pub fn run_detect(args: &DetectArgs) -> Result<()> {
    let data = fs::read(&args.file).with_context(|| format!("read dbf: {}", args.file.display()))?;
    match sniff_code_page(&data).with_context(|| format!("parse dbf: {}", args.file.display()))? {
        Some(code_page) => println!("{code_page}"),
        None => println!("unknown (text is plain ASCII or matches no candidate)"),
    }
    Ok(())
}

pub fn run_encodings() -> Result<()> {
    println!("{}", encodings_table(SUPPORTED_CODE_PAGES));
    Ok(())
}
