//! Parsed-document JSON reading.

mod anomaly;
mod options;
mod reader;

pub use anomaly::Anomaly;
pub use options::{ErrorMode, ParseOptions};
pub use reader::{ParsedInput, ReportParser};

pub(crate) use reader::{decode_utf8, read_json_text};
