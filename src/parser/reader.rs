//! Reader for parsed-document JSON.

use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{Element, Page, ParsedDocument, Table};

use super::{Anomaly, ParseOptions};

/// Identifier used when neither the JSON nor the caller provides one.
const DEFAULT_DOCUMENT_ID: &str = "document";

/// A parsed document plus the anomalies recovered while reading it.
#[derive(Debug, Clone)]
pub struct ParsedInput {
    /// The document
    pub document: ParsedDocument,

    /// Problems skipped over in lenient mode
    pub anomalies: Vec<Anomaly>,
}

impl ParsedInput {
    /// Wrap a document that needed no recovery.
    pub fn clean(document: ParsedDocument) -> Self {
        Self {
            document,
            anomalies: Vec::new(),
        }
    }

    /// Anomalies rendered as warning strings.
    pub fn warnings(&self) -> Vec<String> {
        self.anomalies.iter().map(ToString::to_string).collect()
    }
}

/// Reader for parser JSON output.
pub struct ReportParser {
    value: Value,
    options: ParseOptions,
}

impl ReportParser {
    /// Open a JSON file. The file stem becomes the fallback document id.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a JSON file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, mut options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        let data = read_json_text(path)?;

        if options.fallback_id.is_none() {
            options.fallback_id = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned());
        }

        Self::from_json_with_options(&data, options)
    }

    /// Read from a JSON string.
    pub fn from_json(data: &str) -> Result<Self> {
        Self::from_json_with_options(data, ParseOptions::default())
    }

    /// Read from a JSON string with custom options.
    pub fn from_json_with_options(data: &str, options: ParseOptions) -> Result<Self> {
        let value: Value = serde_json::from_str(data)?;
        Ok(Self::from_value(value, options))
    }

    /// Read from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Read from any reader with custom options.
    pub fn from_reader_with_options<R: Read>(reader: R, options: ParseOptions) -> Result<Self> {
        let value: Value = serde_json::from_reader(reader)?;
        Ok(Self::from_value(value, options))
    }

    /// Use an already decoded JSON value.
    pub fn from_value(value: Value, options: ParseOptions) -> Self {
        Self { value, options }
    }

    /// Validate the JSON against the input schema and build the document.
    pub fn parse(&self) -> Result<ParsedInput> {
        let root = self
            .value
            .as_object()
            .ok_or_else(|| Error::MalformedInput("top-level value is not an object".into()))?;

        let pages = match root.get("pages") {
            Some(Value::Array(pages)) => pages,
            Some(_) => return Err(Error::MalformedInput("'pages' is not an array".into())),
            None => return Err(Error::MalformedInput("'pages' is missing".into())),
        };

        let mut state = ReadState::new(&self.options);

        let document_id = match root.get("document_id").and_then(Value::as_str) {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => {
                let fallback = self
                    .options
                    .fallback_id
                    .clone()
                    .unwrap_or_else(|| DEFAULT_DOCUMENT_ID.to_string());
                state.record(Anomaly::MissingDocumentId {
                    fallback: fallback.clone(),
                })?;
                fallback
            }
        };

        let mut document = ParsedDocument::new(document_id);
        let mut seen = HashSet::new();

        for (index, page_value) in pages.iter().enumerate() {
            if let Some(page) = state.read_page(index, page_value)? {
                if !seen.insert(page.page_number) {
                    state.record(Anomaly::DuplicatePage {
                        page_number: page.page_number,
                    })?;
                    continue;
                }
                document.add_page(page);
            }
        }

        if !document
            .pages
            .windows(2)
            .all(|w| w[0].page_number < w[1].page_number)
        {
            state.record(Anomaly::PagesReordered)?;
            document.pages.sort_by_key(|p| p.page_number);
        }

        for anomaly in &state.anomalies {
            log::warn!("{}: {}", document.document_id, anomaly);
        }

        Ok(ParsedInput {
            document,
            anomalies: state.anomalies,
        })
    }
}

/// Read a JSON file; bytes that are not UTF-8 are malformed input.
pub(crate) fn read_json_text(path: &Path) -> Result<String> {
    decode_utf8(fs::read(path)?)
}

pub(crate) fn decode_utf8(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| {
        Error::MalformedInput(format!("file is not valid UTF-8: {}", e.utf8_error()))
    })
}

struct ReadState<'a> {
    options: &'a ParseOptions,
    anomalies: Vec<Anomaly>,
}

impl<'a> ReadState<'a> {
    fn new(options: &'a ParseOptions) -> Self {
        Self {
            options,
            anomalies: Vec::new(),
        }
    }

    fn record(&mut self, anomaly: Anomaly) -> Result<()> {
        if self.options.is_strict() {
            return Err(Error::MalformedInput(anomaly.to_string()));
        }
        self.anomalies.push(anomaly);
        Ok(())
    }

    fn read_page(&mut self, index: usize, value: &Value) -> Result<Option<Page>> {
        let Some(object) = value.as_object() else {
            self.record(Anomaly::InvalidPage {
                index,
                reason: "page is not an object".into(),
            })?;
            return Ok(None);
        };

        let page_number = match object.get("page_number") {
            None => None,
            Some(v) => Some(
                v.as_u64()
                    .filter(|n| *n > 0)
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or(v),
            ),
        };
        let page_number = match page_number {
            Some(Ok(n)) => n,
            Some(Err(v)) => {
                self.record(Anomaly::InvalidPage {
                    index,
                    reason: format!("page_number {} is not a positive integer", v),
                })?;
                return Ok(None);
            }
            None => {
                self.record(Anomaly::InvalidPage {
                    index,
                    reason: "page_number missing".into(),
                })?;
                return Ok(None);
            }
        };

        let mut page = Page::new(page_number);
        let elements = match object.get("elements") {
            Some(Value::Array(elements)) => elements,
            _ => {
                self.record(Anomaly::MissingElements { page_number })?;
                return Ok(Some(page));
            }
        };

        for (i, element) in elements.iter().enumerate() {
            if let Some(element) = self.read_element(page_number, i, element)? {
                page.add_element(element);
            }
        }

        Ok(Some(page))
    }

    fn read_element(
        &mut self,
        page_number: u32,
        index: usize,
        value: &Value,
    ) -> Result<Option<Element>> {
        let Some(object) = value.as_object() else {
            self.record(Anomaly::InvalidElement {
                page_number,
                index,
                reason: "element is not an object".into(),
            })?;
            return Ok(None);
        };

        let Some(kind) = object.get("type").and_then(Value::as_str) else {
            self.record(Anomaly::InvalidElement {
                page_number,
                index,
                reason: "element type missing".into(),
            })?;
            return Ok(None);
        };

        let text = self.read_text(page_number, index, object)?;
        let element = match kind {
            "paragraph" | "text" | "footnote" | "formula" => Element::paragraph(text),
            "heading" | "page_header" => {
                Element::heading(text, self.read_level(page_number, index, object, 1)?)
            }
            "section_header" => {
                Element::heading(text, self.read_level(page_number, index, object, 2)?)
            }
            "list_item" => Element::list_item(text),
            "checkbox_selected" => Element::list_item(format!("[x] {}", text)),
            "checkbox_unselected" => Element::list_item(format!("[ ] {}", text)),
            "figure_caption" | "caption" => Element::figure_caption(text),
            "table" => Element::Table(self.read_table(page_number, index, object)?),
            "page_footer" | "picture" => {
                log::debug!("page {}: ignored {} at {}", page_number, kind, index);
                return Ok(None);
            }
            other => {
                self.record(Anomaly::UnknownElementType {
                    page_number,
                    index,
                    kind: other.to_string(),
                })?;
                return Ok(None);
            }
        };

        Ok(Some(element))
    }

    fn read_text(
        &mut self,
        page_number: u32,
        index: usize,
        object: &Map<String, Value>,
    ) -> Result<String> {
        match object.get("text") {
            None | Some(Value::Null) => Ok(String::new()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(v.to_string()),
            Some(_) => {
                self.record(Anomaly::InvalidElement {
                    page_number,
                    index,
                    reason: "text is not a string".into(),
                })?;
                Ok(String::new())
            }
        }
    }

    fn read_level(
        &mut self,
        page_number: u32,
        index: usize,
        object: &Map<String, Value>,
        default: u8,
    ) -> Result<u8> {
        let Some(level) = object.get("level").and_then(Value::as_i64) else {
            return Ok(default);
        };
        if !(1..=6).contains(&level) {
            self.record(Anomaly::HeadingLevelClamped {
                page_number,
                index,
                level,
            })?;
        }
        Ok(level.clamp(1, 6) as u8)
    }

    fn read_table(
        &mut self,
        page_number: u32,
        index: usize,
        object: &Map<String, Value>,
    ) -> Result<Table> {
        let rows = match object.get("rows") {
            None | Some(Value::Null) => return Ok(Table::new()),
            Some(Value::Array(rows)) => rows,
            Some(_) => {
                self.record(Anomaly::InvalidElement {
                    page_number,
                    index,
                    reason: "table rows is not an array".into(),
                })?;
                return Ok(Table::new());
            }
        };

        let mut table = Table::new();
        let mut non_text = false;
        for row in rows {
            let cells = match row {
                Value::Array(cells) => cells
                    .iter()
                    .map(|cell| match cell {
                        Value::String(s) => s.clone(),
                        Value::Null => String::new(),
                        Value::Number(_) | Value::Bool(_) => cell.to_string(),
                        Value::Array(_) | Value::Object(_) => {
                            non_text = true;
                            cell.to_string()
                        }
                    })
                    .collect(),
                // A scalar row is a one-cell row
                Value::String(s) => vec![s.clone()],
                other => {
                    non_text = true;
                    vec![other.to_string()]
                }
            };
            table.add_row(cells);
        }

        if non_text {
            self.record(Anomaly::NonTextCell { page_number, index })?;
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ErrorMode;
    use serde_json::json;

    fn read(value: Value) -> Result<ParsedInput> {
        ReportParser::from_value(value, ParseOptions::default()).parse()
    }

    fn read_strict(value: Value) -> Result<ParsedInput> {
        ReportParser::from_value(value, ParseOptions::new().strict()).parse()
    }

    #[test]
    fn test_read_well_formed() {
        let input = read(json!({
            "document_id": "report",
            "pages": [
                { "page_number": 1, "elements": [
                    { "type": "heading", "level": 2, "text": "Intro" },
                    { "type": "paragraph", "text": "Body" },
                    { "type": "table", "rows": [["A", "B"], ["1", "2"]] }
                ]},
                { "page_number": 2, "elements": [
                    { "type": "list_item", "text": "Point" },
                    { "type": "figure_caption", "text": "Figure 1" }
                ]}
            ]
        }))
        .unwrap();

        assert!(input.anomalies.is_empty());
        let doc = input.document;
        assert_eq!(doc.document_id, "report");
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.element_count(), 5);
        assert_eq!(doc.table_count(), 1);
        assert_eq!(doc.pages[0].elements[0], Element::heading("Intro", 2));
    }

    #[test]
    fn test_missing_page_number_skips_page() {
        let input = read(json!({
            "document_id": "d",
            "pages": [
                { "page_number": 1, "elements": [{ "type": "paragraph", "text": "a" }] },
                { "elements": [{ "type": "paragraph", "text": "lost" }] },
                { "page_number": 3, "elements": [] }
            ]
        }))
        .unwrap();

        assert_eq!(input.document.page_count(), 2);
        assert_eq!(input.anomalies.len(), 1);
        assert!(input.warnings()[0].contains("page_number missing"));
    }

    #[test]
    fn test_strict_mode_fails_on_anomaly() {
        let value = json!({
            "document_id": "d",
            "pages": [{ "elements": [] }]
        });
        assert!(matches!(read_strict(value), Err(Error::MalformedInput(_))));
    }

    #[test]
    fn test_structural_errors() {
        assert!(matches!(read(json!([1, 2])), Err(Error::MalformedInput(_))));
        assert!(matches!(
            read(json!({ "document_id": "d" })),
            Err(Error::MalformedInput(_))
        ));
        assert!(matches!(
            read(json!({ "document_id": "d", "pages": {} })),
            Err(Error::MalformedInput(_))
        ));
        assert!(matches!(
            ReportParser::from_json("{ not json"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_fallback_document_id() {
        let options = ParseOptions::new().with_fallback_id("stem");
        let input = ReportParser::from_value(json!({ "pages": [] }), options)
            .parse()
            .unwrap();
        assert_eq!(input.document.document_id, "stem");
        assert_eq!(
            input.anomalies,
            vec![Anomaly::MissingDocumentId {
                fallback: "stem".into()
            }]
        );
    }

    #[test]
    fn test_duplicate_and_unordered_pages() {
        let input = read(json!({
            "document_id": "d",
            "pages": [
                { "page_number": 2, "elements": [] },
                { "page_number": 1, "elements": [] },
                { "page_number": 2, "elements": [] }
            ]
        }))
        .unwrap();

        let numbers: Vec<u32> = input.document.pages.iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert!(input.anomalies.contains(&Anomaly::DuplicatePage { page_number: 2 }));
        assert!(input.anomalies.contains(&Anomaly::PagesReordered));
    }

    #[test]
    fn test_element_aliases_and_ignored_types() {
        let input = read(json!({
            "document_id": "d",
            "pages": [{ "page_number": 1, "elements": [
                { "type": "text", "text": "plain" },
                { "type": "section_header", "text": "Section" },
                { "type": "page_header", "text": "Annual Report" },
                { "type": "checkbox_selected", "text": "done" },
                { "type": "caption", "text": "cap" },
                { "type": "page_footer", "text": "footer" },
                { "type": "picture" },
                { "type": "sidebar", "text": "?" }
            ]}]
        }))
        .unwrap();

        let elements = &input.document.pages[0].elements;
        assert_eq!(elements.len(), 5);
        assert_eq!(elements[0], Element::paragraph("plain"));
        assert_eq!(elements[1], Element::heading("Section", 2));
        assert_eq!(elements[2], Element::heading("Annual Report", 1));
        assert_eq!(elements[3], Element::list_item("[x] done"));
        assert_eq!(elements[4], Element::figure_caption("cap"));
        assert_eq!(input.anomalies.len(), 1);
        assert!(matches!(
            &input.anomalies[0],
            Anomaly::UnknownElementType { kind, .. } if kind == "sidebar"
        ));
    }

    #[test]
    fn test_heading_level_and_missing_text() {
        let input = read(json!({
            "document_id": "d",
            "pages": [{ "page_number": 1, "elements": [
                { "type": "heading", "level": 9, "text": "Deep" },
                { "type": "heading" }
            ]}]
        }))
        .unwrap();

        let elements = &input.document.pages[0].elements;
        assert_eq!(elements[0], Element::heading("Deep", 6));
        assert_eq!(elements[1], Element::heading("", 1));
        assert_eq!(input.anomalies.len(), 1);
    }

    #[test]
    fn test_table_cell_conversion() {
        let input = read(json!({
            "document_id": "d",
            "pages": [{ "page_number": 1, "elements": [
                { "type": "table", "rows": [["Year", "Value"], [2023, null], [true, ["x"]]] },
                { "type": "table" }
            ]}]
        }))
        .unwrap();

        let elements = &input.document.pages[0].elements;
        let Element::Table(table) = &elements[0] else {
            panic!("expected table");
        };
        assert_eq!(table.rows[1], vec!["2023".to_string(), String::new()]);
        assert_eq!(table.rows[2], vec!["true".to_string(), "[\"x\"]".to_string()]);
        assert_eq!(elements[1], Element::Table(Table::new()));
        assert!(matches!(input.anomalies[0], Anomaly::NonTextCell { .. }));
    }

    #[test]
    fn test_error_mode_builder() {
        let options = ParseOptions::new().with_error_mode(ErrorMode::Strict);
        let result = ReportParser::from_value(json!({ "pages": [] }), options).parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_open_uses_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annual_2023.json");
        fs::write(&path, r#"{ "pages": [] }"#).unwrap();

        let input = ReportParser::open(&path).unwrap().parse().unwrap();
        assert_eq!(input.document.document_id, "annual_2023");
    }

    #[test]
    fn test_open_non_utf8_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.json");
        fs::write(&path, b"{ \"document_id\": \"caf\xe9\", \"pages\": [] }").unwrap();

        let err = ReportParser::open(&path).err().unwrap();
        assert!(matches!(err, Error::MalformedInput(_)));
        assert_eq!(err.failure_kind(), crate::FailureKind::MalformedInput);
    }
}
