//! Markdown rendering for merged documents.

use crate::model::{MergedDocument, MergedElement, MergedPage};

use super::ExportOptions;

/// Convert a merged document to Markdown.
pub fn to_markdown(doc: &MergedDocument, options: &ExportOptions) -> String {
    let renderer = MarkdownRenderer::new(options.clone());
    renderer.render(doc)
}

/// Markdown renderer.
///
/// Rendering is a pure walk over already-merged content: text is emitted as
/// stored and tables use their stored serialization.
pub struct MarkdownRenderer {
    options: ExportOptions,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    /// Render a document to Markdown.
    pub fn render(&self, doc: &MergedDocument) -> String {
        let mut output = String::new();

        if self.options.include_frontmatter {
            output.push_str(&doc.to_yaml_frontmatter());
            output.push('\n');
        }

        for (i, page) in doc.pages.iter().enumerate() {
            if i > 0 && self.options.page_separator {
                output.push_str("---\n\n");
            }
            self.render_page(&mut output, page);
        }

        let mut output = output.trim_end().to_string();
        output.push('\n');
        output
    }

    fn render_page(&self, output: &mut String, page: &MergedPage) {
        output.push_str(&"#".repeat(self.options.page_heading_level as usize));
        output.push_str(&format!(" Page {}\n\n", page.page_number));

        for element in &page.elements {
            self.render_element(output, element);
        }
    }

    fn render_element(&self, output: &mut String, element: &MergedElement) {
        let block = match element {
            MergedElement::Heading { level, text } => {
                format!("{} {}", "#".repeat((*level).clamp(1, 6) as usize), text)
            }
            MergedElement::Paragraph { text } => escape_block_start(text),
            MergedElement::ListItem { text } => format!("{} {}", self.options.list_marker, text),
            MergedElement::Table(table) => table.rendered_text(),
            MergedElement::FigureCaption { text } => format!("*{}*", text),
        };

        if block.trim().is_empty() {
            return;
        }
        output.push_str(&block);
        output.push_str("\n\n");
    }
}

/// Escape a leading marker that would turn a paragraph into another block.
fn escape_block_start(text: &str) -> String {
    let digits = text.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let (number, rest) = text.split_at(digits);
        let is_list = rest.starts_with(". ")
            || rest.starts_with(") ")
            || rest == "."
            || rest == ")";
        return if is_list {
            format!("{}\\{}", number, rest)
        } else {
            text.to_string()
        };
    }

    let Some(first) = text.chars().next() else {
        return String::new();
    };
    let escape = match first {
        '#' | '>' => true,
        // Bullets, and rules such as `---`
        '-' | '*' | '+' | '_' => {
            text[1..].starts_with(' ') || text.chars().all(|c| c == first || c == ' ')
        }
        _ => false,
    };

    if escape {
        format!("\\{}", text)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MergedTable, TableRendering};

    fn sample_document() -> MergedDocument {
        let mut doc = MergedDocument::new("report", TableRendering::Markdown);

        let mut page1 = MergedPage::new(1);
        page1.elements.push(MergedElement::Heading {
            level: 1,
            text: "Annual Report".into(),
        });
        page1.elements.push(MergedElement::Paragraph {
            text: "Revenue grew.".into(),
        });
        page1.elements.push(MergedElement::ListItem {
            text: "First point".into(),
        });
        doc.pages.push(page1);

        let mut page2 = MergedPage::new(2);
        page2.elements.push(MergedElement::Table(MergedTable {
            rows: vec![],
            rendering: TableRendering::Markdown,
            markdown: Some("| A | B |\n| --- | --- |\n| 1 | 2 |".into()),
            natural_text: None,
        }));
        page2.elements.push(MergedElement::FigureCaption {
            text: "Figure 1: Growth".into(),
        });
        doc.pages.push(page2);

        doc
    }

    #[test]
    fn test_render_pages() {
        let markdown = to_markdown(&sample_document(), &ExportOptions::default());
        assert_eq!(
            markdown,
            "## Page 1\n\n# Annual Report\n\nRevenue grew.\n\n- First point\n\n\
             ## Page 2\n\n| A | B |\n| --- | --- |\n| 1 | 2 |\n\n*Figure 1: Growth*\n"
        );
    }

    #[test]
    fn test_render_with_separator_and_frontmatter() {
        let options = ExportOptions::new()
            .with_page_separator(true)
            .with_frontmatter(true);
        let markdown = to_markdown(&sample_document(), &options);

        assert!(markdown.starts_with("---\ndocument_id: \"report\"\npages: 2\n"));
        assert!(markdown.contains("- First point\n\n---\n\n## Page 2"));
    }

    #[test]
    fn test_empty_page_keeps_marker() {
        let mut doc = MergedDocument::new("empty", TableRendering::Markdown);
        doc.pages.push(MergedPage::new(1));
        doc.pages.push(MergedPage::new(2));
        assert_eq!(
            to_markdown(&doc, &ExportOptions::default()),
            "## Page 1\n\n## Page 2\n"
        );
    }

    #[test]
    fn test_empty_table_emits_nothing() {
        let mut doc = MergedDocument::new("t", TableRendering::Markdown);
        let mut page = MergedPage::new(1);
        page.elements.push(MergedElement::Table(MergedTable {
            rows: vec![],
            rendering: TableRendering::Markdown,
            markdown: Some(String::new()),
            natural_text: None,
        }));
        doc.pages.push(page);
        assert_eq!(to_markdown(&doc, &ExportOptions::default()), "## Page 1\n");
    }

    #[test]
    fn test_render_is_deterministic() {
        let doc = sample_document();
        let options = ExportOptions::default();
        assert_eq!(to_markdown(&doc, &options), to_markdown(&doc, &options));
    }

    #[test]
    fn test_paragraph_markers_are_escaped() {
        assert_eq!(escape_block_start("# not a heading"), "\\# not a heading");
        assert_eq!(escape_block_start("- not a bullet"), "\\- not a bullet");
        assert_eq!(escape_block_start("1. not a list"), "1\\. not a list");
        assert_eq!(escape_block_start("> quote"), "\\> quote");
        assert_eq!(escape_block_start("---"), "\\---");
        assert_eq!(escape_block_start("2023 results"), "2023 results");
        assert_eq!(escape_block_start("-5% change"), "-5% change");
        assert_eq!(escape_block_start("Plain text"), "Plain text");

        let mut doc = MergedDocument::new("d", TableRendering::Markdown);
        let mut page = MergedPage::new(1);
        page.elements.push(MergedElement::Paragraph {
            text: "# Revenue".into(),
        });
        page.elements.push(MergedElement::ListItem {
            text: "real item".into(),
        });
        doc.pages.push(page);

        assert_eq!(
            to_markdown(&doc, &ExportOptions::default()),
            "## Page 1\n\n\\# Revenue\n\n- real item\n"
        );
    }
}
