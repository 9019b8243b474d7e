//! Unique output keys for documents in one run.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::parser::Anomaly;

/// Key used when a document id sanitizes to nothing.
const EMPTY_KEY: &str = "document";

/// Stem of the summary file, which documents must not overwrite.
const RESERVED_KEY: &str = "processing_summary";

/// Hands out one distinct key per document.
///
/// A repeated id gets a `-2`, `-3`, ... suffix, so output files never
/// overwrite each other and the summary has one entry per input.
#[derive(Debug, Default)]
pub struct KeyRegistry {
    claimed: Mutex<HashSet<String>>,
}

impl KeyRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a key for a document id.
    ///
    /// Returns the key and, if the id could not be used as is, the anomaly
    /// to report for it.
    pub fn claim(&self, document_id: &str) -> (String, Option<Anomaly>) {
        let base = sanitize_key(document_id);
        let mut claimed = match self.claimed.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let mut suffix = 1;
        let mut key = base.clone();
        while claimed.contains(&key) || key == RESERVED_KEY {
            suffix += 1;
            key = format!("{}-{}", base, suffix);
        }
        claimed.insert(key.clone());

        let anomaly = if base == RESERVED_KEY {
            Some(Anomaly::ReservedDocumentId {
                document_id: document_id.to_string(),
                key: key.clone(),
            })
        } else if suffix > 1 {
            Some(Anomaly::DuplicateDocumentId {
                document_id: document_id.to_string(),
                key: key.clone(),
            })
        } else {
            None
        };
        (key, anomaly)
    }

    /// Number of keys handed out.
    pub fn len(&self) -> usize {
        match self.claimed.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Check if no key was handed out.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Make a document id safe to use as a file name.
pub fn sanitize_key(document_id: &str) -> String {
    let key: String = document_id
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let key = key.trim_matches('.');

    if key.is_empty() {
        EMPTY_KEY.to_string()
    } else {
        key.to_string()
    }
}
