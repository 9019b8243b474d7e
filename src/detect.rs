//! Document kind detection.

use serde_json::Value;
use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};
use crate::merge::SUMMARY_FILE_NAME;
use crate::parser::read_json_text;

/// What a JSON file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Parser output, not yet merged
    Parsed,
    /// Output of the merge stage
    Merged,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Parsed => write!(f, "parsed"),
            DocumentKind::Merged => write!(f, "merged"),
        }
    }
}

/// Detect the document kind of a JSON file.
///
/// # Example
/// ```no_run
/// use reportmd::detect::detect_kind_from_path;
///
/// let kind = detect_kind_from_path("merged/report.json").unwrap();
/// println!("{}", kind);
/// ```
pub fn detect_kind_from_path<P: AsRef<Path>>(path: P) -> Result<DocumentKind> {
    let data = read_json_text(path.as_ref())?;
    let value: Value = serde_json::from_str(&data)?;
    detect_kind_from_value(&value)
}

/// Detect the document kind of a decoded JSON value.
///
/// Merged documents carry a `table_rendering`; both kinds carry `pages`.
pub fn detect_kind_from_value(value: &Value) -> Result<DocumentKind> {
    let object = value.as_object().ok_or(Error::UnknownKind)?;
    if !object.contains_key("pages") {
        return Err(Error::UnknownKind);
    }

    if object.contains_key("table_rendering") {
        Ok(DocumentKind::Merged)
    } else {
        Ok(DocumentKind::Parsed)
    }
}

/// Check if a path names a processing summary.
pub fn is_summary_file<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .file_name()
        .map_or(false, |name| name == SUMMARY_FILE_NAME)
}

/// Check if a path has a `.json` extension.
pub fn is_json_file<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_kind() {
        assert_eq!(
            detect_kind_from_value(&json!({ "document_id": "d", "pages": [] })).unwrap(),
            DocumentKind::Parsed
        );
        assert_eq!(
            detect_kind_from_value(&json!({
                "document_id": "d",
                "table_rendering": "markdown",
                "pages": []
            }))
            .unwrap(),
            DocumentKind::Merged
        );
    }

    #[test]
    fn test_detect_unknown() {
        assert!(matches!(
            detect_kind_from_value(&json!({ "report": {} })),
            Err(Error::UnknownKind)
        ));
        assert!(matches!(
            detect_kind_from_value(&json!("text")),
            Err(Error::UnknownKind)
        ));
    }

    #[test]
    fn test_file_names() {
        assert!(is_summary_file("out/processing_summary.json"));
        assert!(!is_summary_file("out/report.json"));
        assert!(is_json_file("a/b.JSON"));
        assert!(!is_json_file("a/b.md"));
    }
}
