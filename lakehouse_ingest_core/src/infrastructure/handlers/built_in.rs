use async_trait::async_trait;
use lakehouse_ingest_domain::entities::{Chunk, FileDescriptor};
use lakehouse_ingest_domain::error::IngestionError;
use lakehouse_ingest_domain::repositories::handler_registry::ExtractionResult;
use lakehouse_ingest_domain::repositories::Handler;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Below this ratio of printable-to-total bytes, a text-layer extraction
/// is considered too sparse and the OCR fallback seam should be tried
/// instead.
const OCR_FALLBACK_FLOOR: f32 = 0.05;

fn bytes_to_lossy_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

async fn read_file(file: &FileDescriptor) -> Result<Vec<u8>, IngestionError> {
    tokio::fs::read(&file.path).await.map_err(IngestionError::from)
}

fn result_of(text: String) -> ExtractionResult {
    ExtractionResult { text, chunks: Vec::new() }
}

/// PDF text-layer extraction via `pdf-extract`. Below `OCR_FALLBACK_FLOOR`
/// printable density the handler reports the sample as scan-only so the
/// orchestrator can route it to an OCR/vision port instead of silently
/// persisting noise.
pub struct PdfHandler;

#[async_trait]
impl Handler for PdfHandler {
    fn extensions(&self) -> &[&'static str] {
        &[".pdf"]
    }

    async fn extract(&self, file: &FileDescriptor) -> Result<ExtractionResult, IngestionError> {
        let bytes = read_file(file).await?;
        let filename = file.filename.clone();
        let text = match tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)).await {
            Ok(Ok(text)) => text,
            Ok(Err(err)) => {
                return Err(IngestionError::extraction(format!(
                    "{filename}: pdf text-layer extraction failed ({err})"
                )));
            }
            Err(join_err) => {
                return Err(IngestionError::internal_error(format!("pdf extraction task panicked: {join_err}")));
            }
        };

        let printable = text.chars().filter(|c| !c.is_control() || c.is_whitespace()).count();
        let density = if text.is_empty() { 0.0 } else { printable as f32 / text.len() as f32 };
        if density < OCR_FALLBACK_FLOOR {
            return Err(IngestionError::extraction(format!(
                "{filename}: text layer below OCR fallback floor ({density:.3})"
            )));
        }
        Ok(result_of(text))
    }
}

/// Word-processor documents (`docx`, `odt`). Both formats are zip-packaged
/// XML; the body text is pulled from `word/document.xml` (OOXML) or
/// `content.xml` (ODF) with the same tag-walk the XML handler uses.
pub struct OfficeDocumentHandler;

#[async_trait]
impl Handler for OfficeDocumentHandler {
    fn extensions(&self) -> &[&'static str] {
        &[".docx", ".odt"]
    }

    async fn extract(&self, file: &FileDescriptor) -> Result<ExtractionResult, IngestionError> {
        let bytes = read_file(file).await?;
        let filename = file.filename.clone();
        let text = tokio::task::spawn_blocking(move || extract_office_package_text(&bytes))
            .await
            .unwrap_or_else(|e| Err(format!("office document extraction task panicked: {e}")))
            .map_err(|err| IngestionError::extraction(format!("{filename}: office document extraction failed ({err})")))?;
        Ok(result_of(text))
    }
}

/// Opens the zip package and extracts whichever document-body part it
/// recognizes, then tag-walks that part's XML for text content.
fn extract_office_package_text(bytes: &[u8]) -> Result<String, String> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).map_err(|e| e.to_string())?;
    for part in ["word/document.xml", "content.xml"] {
        if let Ok(mut entry) = archive.by_name(part) {
            let mut xml = Vec::new();
            std::io::Read::read_to_end(&mut entry, &mut xml).map_err(|e| e.to_string())?;
            return extract_xml_text(&xml).map_err(|e| e.to_string());
        }
    }
    Err("no recognizable document body part (word/document.xml or content.xml) in package".to_string())
}

/// Spreadsheets (`xlsx`, legacy `xls`), rendered row-major via `calamine`
/// with cells joined by ` | ` so the chunker sees sentence-shaped lines.
pub struct SpreadsheetHandler;

#[async_trait]
impl Handler for SpreadsheetHandler {
    fn extensions(&self) -> &[&'static str] {
        &[".xlsx", ".xls"]
    }

    async fn extract(&self, file: &FileDescriptor) -> Result<ExtractionResult, IngestionError> {
        let path = file.path.clone();
        let filename = file.filename.clone();
        let rows = tokio::task::spawn_blocking(move || extract_spreadsheet_rows(&path))
            .await
            .unwrap_or_else(|e| Err(format!("spreadsheet extraction task panicked: {e}")))
            .map_err(|err| IngestionError::extraction(format!("{filename}: spreadsheet extraction failed ({err})")))?;
        Ok(result_of(rows.join("\n")))
    }
}

fn extract_spreadsheet_rows(path: &std::path::Path) -> Result<Vec<String>, String> {
    use calamine::Reader as _;
    let mut workbook = calamine::open_workbook_auto(path).map_err(|e| e.to_string())?;
    let mut rendered = Vec::new();
    for sheet_name in workbook.sheet_names().to_vec() {
        let range = workbook.worksheet_range(&sheet_name).map_err(|e| e.to_string())?;
        for row in range.rows() {
            rendered.push(row.iter().map(|cell| cell.to_string()).collect::<Vec<_>>().join(" | "));
        }
    }
    Ok(rendered)
}

/// CSV/TSV: delimiter auto-detection (try `,` then `\t`, keep whichever
/// yields a consistent field count across the first few lines - the `csv`
/// crate has no sniffing mode of its own), then the `csv` crate handles
/// the actual record parsing (quoting, embedded delimiters, escapes).
pub struct CsvTsvHandler;

#[async_trait]
impl Handler for CsvTsvHandler {
    fn extensions(&self) -> &[&'static str] {
        &[".csv", ".tsv"]
    }

    async fn extract(&self, file: &FileDescriptor) -> Result<ExtractionResult, IngestionError> {
        let bytes = read_file(file).await?;
        let text = bytes_to_lossy_text(&bytes);
        let delimiter = detect_delimiter(&text);
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter as u8)
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut chunks = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|err| {
                IngestionError::extraction(format!("{}: csv row {i} failed to parse ({err})", file.filename))
            })?;
            let rendered = record.iter().collect::<Vec<_>>().join(" | ");
            chunks.push(Chunk::new(file.id.clone(), i, rendered));
        }
        Ok(ExtractionResult { text, chunks })
    }
}

fn detect_delimiter(text: &str) -> char {
    let sample: Vec<&str> = text.lines().take(5).collect();
    let comma_consistent = field_counts_consistent(&sample, ',');
    let tab_consistent = field_counts_consistent(&sample, '\t');
    if tab_consistent && !comma_consistent {
        '\t'
    } else {
        ','
    }
}

fn field_counts_consistent(lines: &[&str], delimiter: char) -> bool {
    if lines.len() < 2 {
        return true;
    }
    let first = lines[0].matches(delimiter).count();
    first > 0 && lines.iter().all(|l| l.matches(delimiter).count() == first)
}

/// Generic `quick-xml` tag-walk extractor: keeps text and CDATA content,
/// drops markup.
pub struct XmlHandler;

#[async_trait]
impl Handler for XmlHandler {
    fn extensions(&self) -> &[&'static str] {
        &[".xml"]
    }

    async fn extract(&self, file: &FileDescriptor) -> Result<ExtractionResult, IngestionError> {
        let bytes = read_file(file).await?;
        Ok(result_of(extract_xml_text(&bytes)?))
    }
}

/// BMEcat/ETIM-style product catalog XML. Shares the XML handler's
/// tag-walk; kept as a distinct handler because `catalog.xml` files feed
/// the Structured Extractor's product schema rather than the documents
/// table.
pub struct CatalogXmlHandler;

#[async_trait]
impl Handler for CatalogXmlHandler {
    fn extensions(&self) -> &[&'static str] {
        &["catalog.xml"]
    }

    async fn extract(&self, file: &FileDescriptor) -> Result<ExtractionResult, IngestionError> {
        let bytes = read_file(file).await?;
        Ok(result_of(extract_xml_text(&bytes)?))
    }
}

fn extract_xml_text(bytes: &[u8]) -> Result<String, IngestionError> {
    let mut reader = Reader::from_reader(bytes);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut out = String::new();
    loop {
        match reader.read_event(&mut buf) {
            Ok(Event::Text(e)) => {
                let decoded = e
                    .unescape_and_decode(&reader)
                    .map_err(|err| IngestionError::extraction(format!("xml text decode failed: {err}")))?;
                if !decoded.trim().is_empty() {
                    out.push_str(&decoded);
                    out.push(' ');
                }
            }
            Ok(Event::CData(e)) => {
                out.push_str(&String::from_utf8_lossy(&e));
                out.push(' ');
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(IngestionError::extraction(format!("xml parse error: {err}"))),
        }
        buf.clear();
    }
    Ok(out.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// HTML text extraction via `scraper`: parses the DOM and collects every
/// text node under the document root.
pub struct HtmlHandler;

#[async_trait]
impl Handler for HtmlHandler {
    fn extensions(&self) -> &[&'static str] {
        &[".html", ".htm"]
    }

    async fn extract(&self, file: &FileDescriptor) -> Result<ExtractionResult, IngestionError> {
        let bytes = read_file(file).await?;
        let markup = bytes_to_lossy_text(&bytes);
        let document = scraper::Html::parse_document(&markup);
        let text = document.root_element().text().collect::<Vec<_>>().join(" ");
        Ok(result_of(text.split_whitespace().collect::<Vec<_>>().join(" ")))
    }
}

/// Recursive key-path rendering of JSON: `{"a": {"b": 1}}` becomes lines
/// like `a.b: 1`, giving the chunker and NER something sentence-shaped to
/// work with instead of raw braces.
pub struct JsonHandler;

#[async_trait]
impl Handler for JsonHandler {
    fn extensions(&self) -> &[&'static str] {
        &[".json"]
    }

    async fn extract(&self, file: &FileDescriptor) -> Result<ExtractionResult, IngestionError> {
        let bytes = read_file(file).await?;
        let value: serde_json::Value = serde_json::from_slice(&bytes)?;
        let mut lines = Vec::new();
        render_json_paths(&value, String::new(), &mut lines);
        Ok(result_of(lines.join("\n")))
    }
}

fn render_json_paths(value: &serde_json::Value, prefix: String, out: &mut Vec<String>) {
    match value {
        serde_json::Value::Object(map) => {
            for (k, v) in map {
                let path = if prefix.is_empty() { k.clone() } else { format!("{prefix}.{k}") };
                render_json_paths(v, path, out);
            }
        }
        serde_json::Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                render_json_paths(v, format!("{prefix}[{i}]"), out);
            }
        }
        other => out.push(format!("{prefix}: {other}")),
    }
}

/// Email (`eml`/`msg`): splits the RFC-5322-style header block from the
/// body at the first blank line and decodes the body as plain text.
pub struct EmailHandler;

#[async_trait]
impl Handler for EmailHandler {
    fn extensions(&self) -> &[&'static str] {
        &[".eml", ".msg"]
    }

    async fn extract(&self, file: &FileDescriptor) -> Result<ExtractionResult, IngestionError> {
        let bytes = read_file(file).await?;
        let raw = bytes_to_lossy_text(&bytes);
        let (headers, body) = raw.split_once("\n\n").unwrap_or((raw.as_str(), ""));
        let subject = headers
            .lines()
            .find(|l| l.to_lowercase().starts_with("subject:"))
            .map(|l| l.splitn(2, ':').nth(1).unwrap_or("").trim())
            .unwrap_or("");
        Ok(result_of(format!("{subject}\n\n{body}")))
    }
}

/// Images, routed entirely through an OCR/vision port - there's no
/// text-layer fallback here, unlike PDFs.
pub struct ImageHandler;

#[async_trait]
impl Handler for ImageHandler {
    fn extensions(&self) -> &[&'static str] {
        &[".png", ".jpg", ".jpeg", ".tiff"]
    }

    async fn extract(&self, _file: &FileDescriptor) -> Result<ExtractionResult, IngestionError> {
        Err(IngestionError::unsupported(
            "image extraction requires an OCR/vision port; none configured",
        ))
    }
}

/// CAD header reader (`step`/`stp`): STEP files carry a `HEADER;` section
/// with `FILE_DESCRIPTION`/`FILE_NAME`/`FILE_SCHEMA` entries; the rest of
/// the file (the geometry) is not extracted as text.
pub struct CadHandler;

#[async_trait]
impl Handler for CadHandler {
    fn extensions(&self) -> &[&'static str] {
        &[".step", ".stp"]
    }

    async fn extract(&self, file: &FileDescriptor) -> Result<ExtractionResult, IngestionError> {
        let bytes = read_file(file).await?;
        let text = bytes_to_lossy_text(&bytes);
        let header: String = text
            .lines()
            .skip_while(|l| !l.trim().eq_ignore_ascii_case("HEADER;"))
            .take_while(|l| !l.trim().eq_ignore_ascii_case("ENDSEC;"))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(result_of(header))
    }
}

/// Fallback for plain-text and unrecognized-but-textual extensions.
pub struct PlainTextHandler;

#[async_trait]
impl Handler for PlainTextHandler {
    fn extensions(&self) -> &[&'static str] {
        &[".txt", ".md"]
    }

    async fn extract(&self, file: &FileDescriptor) -> Result<ExtractionResult, IngestionError> {
        let bytes = read_file(file).await?;
        Ok(result_of(bytes_to_lossy_text(&bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_delimiter_detection_prefers_tabs_when_consistent() {
        let text = "a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(text), '\t');
    }

    #[test]
    fn csv_delimiter_detection_falls_back_to_comma() {
        let text = "a,b,c\n1,2,3";
        assert_eq!(detect_delimiter(text), ',');
    }

    #[test]
    fn xml_tag_walk_keeps_only_text_content() {
        let text = extract_xml_text(b"<a><b>hello</b> world</a>").unwrap();
        assert_eq!(text, "hello world");
    }

    #[test]
    fn xml_tag_walk_decodes_entities_and_cdata() {
        let text = extract_xml_text(b"<a>&amp; tea<![CDATA[ & crumpets]]></a>").unwrap();
        assert_eq!(text, "& tea & crumpets");
    }

    #[test]
    fn html_extraction_drops_tags_and_keeps_text() {
        let document = scraper::Html::parse_document("<html><body><p>hello</p> <p>world</p></body></html>");
        let text = document.root_element().text().collect::<Vec<_>>().join(" ");
        assert_eq!(text.split_whitespace().collect::<Vec<_>>().join(" "), "hello world");
    }

    #[test]
    fn office_package_extraction_rejects_unrecognized_archives() {
        // An empty zip has neither word/document.xml nor content.xml.
        let mut buf = Vec::new();
        {
            let cursor = std::io::Cursor::new(&mut buf);
            let writer = zip::ZipWriter::new(cursor);
            writer.finish().unwrap();
        }
        assert!(extract_office_package_text(&buf).is_err());
    }

    #[test]
    fn json_paths_render_nested_keys() {
        let value: serde_json::Value = serde_json::from_str(r#"{"a":{"b":1}}"#).unwrap();
        let mut out = Vec::new();
        render_json_paths(&value, String::new(), &mut out);
        assert_eq!(out, vec!["a.b: 1".to_string()]);
    }
}
