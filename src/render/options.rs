//! Export options and configuration.

/// Options for rendering merged documents to Markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Heading level of the per-page marker (1-6)
    pub page_heading_level: u8,

    /// Insert a `---` rule between pages
    pub page_separator: bool,

    /// Character to use for list item markers
    pub list_marker: char,

    /// Include YAML frontmatter with document facts
    pub include_frontmatter: bool,
}

impl ExportOptions {
    /// Create new export options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page marker heading level.
    pub fn with_page_heading_level(mut self, level: u8) -> Self {
        self.page_heading_level = level.clamp(1, 6);
        self
    }

    /// Enable or disable the rule between pages.
    pub fn with_page_separator(mut self, separator: bool) -> Self {
        self.page_separator = separator;
        self
    }

    /// Set the list marker character.
    pub fn with_list_marker(mut self, marker: char) -> Self {
        self.list_marker = marker;
        self
    }

    /// Enable or disable frontmatter.
    pub fn with_frontmatter(mut self, include: bool) -> Self {
        self.include_frontmatter = include;
        self
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            page_heading_level: 2,
            page_separator: false,
            list_marker: '-',
            include_frontmatter: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_options_builder() {
        let options = ExportOptions::new()
            .with_frontmatter(true)
            .with_page_heading_level(9)
            .with_page_separator(true)
            .with_list_marker('*');

        assert!(options.include_frontmatter);
        assert_eq!(options.page_heading_level, 6);
        assert!(options.page_separator);
        assert_eq!(options.list_marker, '*');
    }

    #[test]
    fn test_export_options_defaults() {
        let options = ExportOptions::default();
        assert_eq!(options.page_heading_level, 2);
        assert!(!options.page_separator);
        assert!(!options.include_frontmatter);
    }
}
