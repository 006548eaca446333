//! Multi-format upload normalization.
//!
//! Converts raw uploaded bytes into one or more [`NormalizedDocument`]s with
//! provenance. The format is a closed tagged union over the supported
//! extensions; an unknown extension is a typed error, never a fallthrough.
//!
//! Tabular inputs (xlsx/xls/csv) are rendered as "data cards": the sheet or
//! file name, the ordered header list, a markdown sample of the first rows,
//! and a markdown rendering of the full table. Keeping the sample and the
//! full table in one blob preserves schema visibility even when chunking
//! later splits the full table away from the header line.

use std::io::{Read, Write};
use std::path::Path;

use calamine::{Data, Reader};

use crate::error::{Error, Result};
use crate::models::NormalizedDocument;

/// Maximum decompressed bytes read from a single ZIP entry (zip-bomb guard).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Supported upload formats. Script-like text extensions map to `Txt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Pdf,
    Docx,
    Xlsx,
    Xls,
    Csv,
    Txt,
    Md,
}

impl FileFormat {
    pub fn from_filename(name: &str) -> Option<FileFormat> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(FileFormat::Pdf),
            "docx" => Some(FileFormat::Docx),
            "xlsx" => Some(FileFormat::Xlsx),
            "xls" => Some(FileFormat::Xls),
            "csv" => Some(FileFormat::Csv),
            "md" => Some(FileFormat::Md),
            "txt" | "py" | "rs" | "sh" | "toml" | "json" | "yaml" | "yml" | "log" => {
                Some(FileFormat::Txt)
            }
            _ => None,
        }
    }
}

/// Normalize an upload into logical text documents.
///
/// The bytes are written to a scoped temporary file (suffix preserving the
/// upload's extension, which some parsers sniff) and parsers read from that
/// path. The temp file is removed on every exit path by RAII drop.
///
/// Documents whose extracted text is empty are dropped rather than failing;
/// `sample_rows` controls the sample section of tabular data cards.
pub fn normalize_upload(
    bytes: &[u8],
    filename: &str,
    sample_rows: usize,
) -> Result<Vec<NormalizedDocument>> {
    let format = FileFormat::from_filename(filename).ok_or_else(|| {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)");
        Error::UnsupportedFormat(format!(".{}", ext))
    })?;

    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin");
    let mut tmp = tempfile::Builder::new()
        .prefix("docsense-upload-")
        .suffix(&format!(".{}", ext))
        .tempfile()?;
    tmp.write_all(bytes)?;
    tmp.flush()?;

    let docs = match format {
        FileFormat::Pdf => normalize_pdf(tmp.path(), filename)?,
        FileFormat::Docx => normalize_docx(tmp.path(), filename)?,
        FileFormat::Xlsx | FileFormat::Xls => normalize_workbook(tmp.path(), filename, sample_rows)?,
        FileFormat::Csv => normalize_csv(tmp.path(), filename, sample_rows)?,
        FileFormat::Txt | FileFormat::Md => normalize_text(tmp.path(), filename)?,
    };

    Ok(docs
        .into_iter()
        .filter(|doc| !doc.text.trim().is_empty())
        .collect())
}

fn normalize_pdf(path: &Path, source: &str) -> Result<Vec<NormalizedDocument>> {
    let text =
        pdf_extract::extract_text(path).map_err(|e| Error::Extract(format!("PDF: {}", e)))?;
    Ok(vec![NormalizedDocument {
        text,
        source: source.to_string(),
    }])
}

fn normalize_text(path: &Path, source: &str) -> Result<Vec<NormalizedDocument>> {
    let bytes = std::fs::read(path)?;
    Ok(vec![NormalizedDocument {
        text: String::from_utf8_lossy(&bytes).into_owned(),
        source: source.to_string(),
    }])
}

fn normalize_docx(path: &Path, source: &str) -> Result<Vec<NormalizedDocument>> {
    let file = std::fs::File::open(path)?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| Error::Extract(format!("DOCX: {}", e)))?;
    let entry = archive
        .by_name("word/document.xml")
        .map_err(|_| Error::Extract("DOCX: word/document.xml not found".to_string()))?;
    let mut doc_xml = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut doc_xml)
        .map_err(|e| Error::Extract(format!("DOCX: {}", e)))?;
    if doc_xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(Error::Extract(
            "DOCX: word/document.xml exceeds size limit".to_string(),
        ));
    }
    let text = extract_docx_text(&doc_xml)?;
    Ok(vec![NormalizedDocument {
        text,
        source: source.to_string(),
    }])
}

/// Collects `<w:t>` text runs; paragraph ends become newlines.
fn extract_docx_text(xml: &[u8]) -> Result<String> {
    let mut out = String::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    if let Ok(quick_xml::events::Event::Text(te)) = reader.read_event_into(&mut buf)
                    {
                        out.push_str(te.unescape().unwrap_or_default().as_ref());
                    }
                }
            }
            Ok(quick_xml::events::Event::End(e)) => {
                if e.local_name().as_ref() == b"p" && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(Error::Extract(format!("DOCX: {}", e))),
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}

/// One data-card document per sheet. Headers come from the first row,
/// coerced to text; missing cells render as empty strings.
fn normalize_workbook(
    path: &Path,
    source: &str,
    sample_rows: usize,
) -> Result<Vec<NormalizedDocument>> {
    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|e| Error::Extract(format!("spreadsheet: {}", e)))?;

    let mut docs = Vec::new();
    for sheet_name in workbook.sheet_names().to_vec() {
        let range = match workbook.worksheet_range(&sheet_name) {
            Ok(range) => range,
            Err(e) => return Err(Error::Extract(format!("sheet '{}': {}", sheet_name, e))),
        };

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(row) => row.iter().map(cell_to_string).collect(),
            None => continue, // blank sheet
        };
        let data: Vec<Vec<String>> = rows
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();

        let card = render_card(&format!("SHEET: {}", sheet_name), &headers, &data, sample_rows);
        docs.push(NormalizedDocument {
            text: card,
            source: source.to_string(),
        });
    }
    Ok(docs)
}

/// Identical card construction to a sheet, single document, no sheet
/// dimension: headed by the filename instead.
fn normalize_csv(path: &Path, source: &str, sample_rows: usize) -> Result<Vec<NormalizedDocument>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| Error::Extract(format!("CSV: {}", e)))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| Error::Extract(format!("CSV: {}", e)))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut data = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::Extract(format!("CSV: {}", e)))?;
        data.push(record.iter().map(str::to_string).collect::<Vec<String>>());
    }

    let card = render_card(&format!("FILE: {}", source), &headers, &data, sample_rows);
    Ok(vec![NormalizedDocument {
        text: card,
        source: source.to_string(),
    }])
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(d) => d.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}

fn render_card(
    heading: &str,
    headers: &[String],
    rows: &[Vec<String>],
    sample_rows: usize,
) -> String {
    let sample: Vec<&[String]> = rows
        .iter()
        .take(sample_rows)
        .map(|r| r.as_slice())
        .collect();
    let full: Vec<&[String]> = rows.iter().map(|r| r.as_slice()).collect();

    format!(
        "{heading}\nCOLUMN HEADERS: [{headers_list}]\n\nFIRST {n} ROWS:\n{sample_table}\n\nFULL DATA:\n{full_table}\n",
        heading = heading,
        headers_list = headers.join(", "),
        n = sample.len(),
        sample_table = render_markdown_table(headers, &sample),
        full_table = render_markdown_table(headers, &full),
    )
}

/// Rows shorter than the header set are padded with empty cells; pipes in
/// cell values are escaped so the table stays parseable.
fn render_markdown_table(headers: &[String], rows: &[&[String]]) -> String {
    let mut out = String::new();
    out.push_str(&render_row(headers.iter().map(String::as_str), headers.len()));
    out.push('\n');
    out.push_str(&render_row(
        std::iter::repeat("---").take(headers.len().max(1)),
        headers.len(),
    ));
    for row in rows {
        out.push('\n');
        out.push_str(&render_row(row.iter().map(String::as_str), headers.len()));
    }
    out
}

fn render_row<'a>(cells: impl Iterator<Item = &'a str>, width: usize) -> String {
    let mut cells: Vec<String> = cells.map(|c| c.replace('|', "\\|")).collect();
    while cells.len() < width {
        cells.push(String::new());
    }
    format!("| {} |", cells.join(" | "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_docx_with_text(phrase: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
            zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            let xml = format!(
                "<?xml version=\"1.0\"?><w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:body></w:document>",
                phrase
            );
            zip.write_all(xml.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        buf
    }

    /// Minimal well-formed single-page PDF: body objects first, then an
    /// xref with correct byte offsets so pdf-extract accepts it.
    fn minimal_pdf() -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n");
        let o1 = out.len();
        out.extend_from_slice(b"1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");
        let o2 = out.len();
        out.extend_from_slice(b"2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n");
        let o3 = out.len();
        out.extend_from_slice(b"3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >> endobj\n");
        let o4 = out.len();
        let stream = b"BT /F1 12 Tf 100 700 Td (quarterly rent summary) Tj ET\n";
        out.extend_from_slice(format!("4 0 obj << /Length {} >> stream\n", stream.len()).as_bytes());
        out.extend_from_slice(stream);
        out.extend_from_slice(b"endstream endobj\n");
        let o5 = out.len();
        out.extend_from_slice(
            b"5 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> endobj\n",
        );
        let xref_start = out.len();
        out.extend_from_slice(b"xref\n0 6\n");
        for offset in [0, o1, o2, o3, o4, o5] {
            let kind = if offset == 0 { "65535 f" } else { "00000 n" };
            out.extend_from_slice(format!("{:010} {} \n", offset, kind).as_bytes());
        }
        out.extend_from_slice(b"trailer << /Size 6 /Root 1 0 R >>\nstartxref\n");
        out.extend_from_slice(format!("{}\n", xref_start).as_bytes());
        out.extend_from_slice(b"%%EOF\n");
        out
    }

    #[test]
    fn unsupported_extension_is_typed_error() {
        let err = normalize_upload(b"binary", "archive.tar.gz", 20).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        assert_eq!(FileFormat::from_filename("NOTES.TXT"), Some(FileFormat::Txt));
        assert_eq!(FileFormat::from_filename("Budget.XLSX"), Some(FileFormat::Xlsx));
        assert_eq!(FileFormat::from_filename("no_extension"), None);
    }

    #[test]
    fn script_like_extensions_are_plain_text() {
        assert_eq!(FileFormat::from_filename("tool.py"), Some(FileFormat::Txt));
        assert_eq!(FileFormat::from_filename("Cargo.toml"), Some(FileFormat::Txt));
    }

    #[test]
    fn plain_text_carries_source_filename() {
        let docs = normalize_upload(b"hello world\n", "notes.txt", 20).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].source, "notes.txt");
        assert_eq!(docs[0].text, "hello world\n");
    }

    #[test]
    fn empty_text_documents_are_dropped() {
        let docs = normalize_upload(b"   \n  ", "blank.txt", 20).unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn well_formed_pdf_is_not_an_extract_error() {
        // pdf-extract may yield no text for a bare fixture page; an empty
        // extraction drops the document instead of failing.
        let docs = normalize_upload(&minimal_pdf(), "report.pdf", 20).unwrap();
        assert!(docs.len() <= 1);
        if let Some(doc) = docs.first() {
            assert_eq!(doc.source, "report.pdf");
        }
    }

    #[test]
    fn invalid_pdf_is_extract_error() {
        let err = normalize_upload(b"not a pdf", "bad.pdf", 20).unwrap_err();
        assert!(matches!(err, Error::Extract(_)));
    }

    #[test]
    fn invalid_zip_is_extract_error_for_docx() {
        let err = normalize_upload(b"not a zip", "bad.docx", 20).unwrap_err();
        assert!(matches!(err, Error::Extract(_)));
    }

    #[test]
    fn docx_text_runs_are_extracted() {
        let bytes = minimal_docx_with_text("quarterly report body");
        let docs = normalize_upload(&bytes, "report.docx", 20).unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].text.contains("quarterly report body"));
        assert_eq!(docs[0].source, "report.docx");
    }

    #[test]
    fn csv_card_lists_headers_once_in_order() {
        let csv = b"name,amount,category\nrent,1200,fixed\ncoffee,4,variable\n";
        let docs = normalize_upload(csv, "budget.csv", 20).unwrap();
        assert_eq!(docs.len(), 1);
        let card = &docs[0].text;
        assert!(card.starts_with("FILE: budget.csv"));

        let header_line = card
            .lines()
            .find(|l| l.starts_with("COLUMN HEADERS:"))
            .unwrap();
        assert_eq!(header_line, "COLUMN HEADERS: [name, amount, category]");
        assert_eq!(header_line.matches("amount").count(), 1);
        assert!(card.contains("| rent | 1200 | fixed |"));
        assert!(card.contains("FULL DATA:"));
    }

    #[test]
    fn csv_sample_is_capped_but_full_table_is_complete() {
        let mut csv = String::from("id,value\n");
        for i in 0..30 {
            csv.push_str(&format!("{},v{}\n", i, i));
        }
        let docs = normalize_upload(csv.as_bytes(), "long.csv", 20).unwrap();
        let card = &docs[0].text;
        assert!(card.contains("FIRST 20 ROWS:"));
        // Row 25 is beyond the sample but must appear in the full table.
        assert_eq!(card.matches("| 25 | v25 |").count(), 1);
        assert_eq!(card.matches("| 5 | v5 |").count(), 2);
    }

    #[test]
    fn ragged_csv_rows_are_padded() {
        let csv = b"a,b,c\n1,2\n";
        let docs = normalize_upload(csv, "ragged.csv", 20).unwrap();
        assert!(docs[0].text.contains("| 1 | 2 |  |"));
    }
}
