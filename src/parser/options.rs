//! Reader options and configuration.

/// Options for reading parsed-document JSON.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Identifier used when the JSON carries no `document_id`
    pub fallback_id: Option<String>,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip invalid content).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable strict mode (fail on invalid content).
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Set the identifier used when `document_id` is missing.
    pub fn with_fallback_id(mut self, id: impl Into<String>) -> Self {
        self.fallback_id = Some(id.into());
        self
    }

    /// Check if strict mode is enabled.
    pub fn is_strict(&self) -> bool {
        self.error_mode == ErrorMode::Strict
    }
}

/// Error handling mode during reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any anomaly
    Strict,
    /// Skip invalid content and continue
    #[default]
    Lenient,
}
