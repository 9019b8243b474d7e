//! Text cleanup pipeline for extracted report text.
//!
//! Cleaning is an ordered list of [`CleanupRule`]s built from
//! [`CleanupOptions`]. The list always ends with whitespace collapsing and
//! trimming, and it is re-applied until the text stops changing, so
//! `clean(clean(x)) == clean(x)` for any input.
//!
//! Repeated running headers and footers are detected per document by
//! [`HeaderFooterStats`] and removed through [`CleanContext`].

use regex::{Captures, Regex};
use std::collections::{HashMap, HashSet};
use unicode_normalization::UnicodeNormalization;

use crate::model::ParsedDocument;

/// Glyph names emitted by some PDF fonts and the characters they stand for.
const GLYPH_NAMES: &[(&str, &str)] = &[
    ("zero", "0"),
    ("one", "1"),
    ("two", "2"),
    ("three", "3"),
    ("four", "4"),
    ("five", "5"),
    ("six", "6"),
    ("seven", "7"),
    ("eight", "8"),
    ("nine", "9"),
    ("period", "."),
    ("comma", ","),
    ("colon", ":"),
    ("hyphen", "-"),
    ("percent", "%"),
    ("dollar", "$"),
    ("space", " "),
    ("plus", "+"),
    ("minus", "-"),
    ("slash", "/"),
    ("asterisk", "*"),
    ("lparen", "("),
    ("rparen", ")"),
    ("parenright", ")"),
    ("parenleft", "("),
    ("wedge.1_E", ""),
];

/// Cleanup preset levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupPreset {
    /// Minimal cleanup: hyphenation, whitespace and trimming only
    Minimal,
    /// Standard cleanup: NFC, ligatures, glyph repair, header/footer removal
    #[default]
    Standard,
    /// Aggressive cleanup: also strips PUA characters, lower header threshold
    Aggressive,
}

/// Options for text cleanup.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanupOptions {
    /// Normalize Unicode to NFC form
    pub normalize_unicode: bool,

    /// Fix ligatures (fi, fl, etc.)
    pub fix_ligatures: bool,

    /// Replace PDF glyph names (`/zero.tnum`, `glyph<..>`, `/A.cap`)
    pub repair_glyphs: bool,

    /// Remove Private Use Area (PUA) characters
    pub remove_pua: bool,

    /// Remove Unicode replacement character (U+FFFD)
    pub remove_replacement_char: bool,

    /// Join words hyphenated at line breaks
    pub fix_hyphenation: bool,

    /// Drop text repeated verbatim across pages
    pub remove_headers_footers: bool,

    /// Share of pages a text must appear on to count as header/footer (0.0-1.0)
    pub header_footer_threshold: f64,

    /// Longest text (in characters) considered for header/footer detection
    pub max_header_footer_length: usize,
}

impl CleanupOptions {
    /// Create options from a preset.
    pub fn from_preset(preset: CleanupPreset) -> Self {
        match preset {
            CleanupPreset::Minimal => Self::minimal(),
            CleanupPreset::Standard => Self::standard(),
            CleanupPreset::Aggressive => Self::aggressive(),
        }
    }

    /// Minimal cleanup options.
    pub fn minimal() -> Self {
        Self {
            normalize_unicode: false,
            fix_ligatures: false,
            repair_glyphs: false,
            remove_pua: false,
            remove_replacement_char: false,
            fix_hyphenation: true,
            remove_headers_footers: false,
            header_footer_threshold: 0.5,
            max_header_footer_length: 100,
        }
    }

    /// Standard cleanup options.
    pub fn standard() -> Self {
        Self {
            normalize_unicode: true,
            fix_ligatures: true,
            repair_glyphs: true,
            remove_pua: false,
            remove_replacement_char: false,
            fix_hyphenation: true,
            remove_headers_footers: true,
            header_footer_threshold: 0.5,
            max_header_footer_length: 100,
        }
    }

    /// Aggressive cleanup options.
    pub fn aggressive() -> Self {
        Self {
            normalize_unicode: true,
            fix_ligatures: true,
            repair_glyphs: true,
            remove_pua: true,
            remove_replacement_char: true,
            fix_hyphenation: true,
            remove_headers_footers: true,
            header_footer_threshold: 0.4, // Lower threshold = more aggressive
            max_header_footer_length: 150,
        }
    }

    /// Set the header/footer recurrence threshold, clamped to (0, 1].
    pub fn with_header_footer_threshold(mut self, threshold: f64) -> Self {
        self.header_footer_threshold = if threshold.is_nan() {
            0.5
        } else {
            threshold.clamp(f64::EPSILON, 1.0)
        };
        self
    }

    /// Enable or disable header/footer removal.
    pub fn with_header_footer_removal(mut self, remove: bool) -> Self {
        self.remove_headers_footers = remove;
        self
    }

    /// Ordered rule list these options produce.
    pub fn rules(&self) -> Vec<CleanupRule> {
        let mut rules = Vec::new();
        if self.normalize_unicode {
            rules.push(CleanupRule::NormalizeUnicode);
        }
        if self.fix_ligatures {
            rules.push(CleanupRule::FixLigatures);
        }
        if self.repair_glyphs {
            rules.push(CleanupRule::RepairGlyphs);
        }
        if self.remove_pua {
            rules.push(CleanupRule::RemovePua);
        }
        if self.remove_replacement_char {
            rules.push(CleanupRule::RemoveReplacementChar);
        }
        if self.fix_hyphenation {
            rules.push(CleanupRule::FixHyphenation);
        }
        rules.push(CleanupRule::CollapseWhitespace);
        rules.push(CleanupRule::Trim);
        rules
    }
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self::standard()
    }
}

/// A single text-rewrite step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupRule {
    /// Unicode NFC normalization
    NormalizeUnicode,
    /// Expand typographic ligatures
    FixLigatures,
    /// Replace PDF glyph names with their characters
    RepairGlyphs,
    /// Drop Private Use Area characters
    RemovePua,
    /// Drop U+FFFD
    RemoveReplacementChar,
    /// `exam-\nple` → `example`
    FixHyphenation,
    /// Any whitespace run → one space
    CollapseWhitespace,
    /// Strip leading and trailing whitespace
    Trim,
}

/// Document-level facts about the text being cleaned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanContext {
    /// The text recurs across enough pages to be a running header/footer
    pub is_repeated_header: bool,
}

impl CleanContext {
    /// Context for text recognized as a repeated header/footer.
    pub fn repeated_header() -> Self {
        Self {
            is_repeated_header: true,
        }
    }
}

/// Cleaned text plus the number of glyph corrections made.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanOutcome {
    /// Cleaned text
    pub text: String,
    /// Glyph names replaced or removed
    pub corrections: usize,
}

/// Text cleanup pipeline.
pub struct TextCleaner {
    options: CleanupOptions,
    rules: Vec<CleanupRule>,
    glyph_name_regex: Regex,
    glyph_tag_regex: Regex,
    glyph_cap_regex: Regex,
    hyphenation_regex: Regex,
    whitespace_regex: Regex,
    ligature_map: Vec<(&'static str, &'static str)>,
}

impl TextCleaner {
    /// Create a new cleaner with the given options.
    pub fn new(options: CleanupOptions) -> Self {
        let names = GLYPH_NAMES
            .iter()
            .map(|(name, _)| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");
        let glyph_name_pattern =
            format!(r"/({})(\.pl\.tnum|\.tnum\.pl|\.pl|\.tnum|\.case|\.sups)", names);

        Self {
            rules: options.rules(),
            options,
            glyph_name_regex: Regex::new(&glyph_name_pattern).unwrap(),
            glyph_tag_regex: Regex::new(r"glyph<[^>]*>").unwrap(),
            glyph_cap_regex: Regex::new(r"/([A-Z])\.cap").unwrap(),
            hyphenation_regex: Regex::new(r"([A-Za-z])-[ \t]*\r?\n\s*([a-z])").unwrap(),
            whitespace_regex: Regex::new(r"\s+").unwrap(),
            ligature_map: vec![
                ("\u{FB00}", "ff"),  // ﬀ
                ("\u{FB01}", "fi"),  // ﬁ
                ("\u{FB02}", "fl"),  // ﬂ
                ("\u{FB03}", "ffi"), // ﬃ
                ("\u{FB04}", "ffl"), // ﬄ
                ("\u{FB05}", "st"),  // ﬅ (long s + t)
                ("\u{FB06}", "st"),  // ﬆ
            ],
        }
    }

    /// Create a cleaner from a preset.
    pub fn from_preset(preset: CleanupPreset) -> Self {
        Self::new(CleanupOptions::from_preset(preset))
    }

    /// Options this cleaner was built with.
    pub fn options(&self) -> &CleanupOptions {
        &self.options
    }

    /// Rules in application order.
    pub fn rules(&self) -> &[CleanupRule] {
        &self.rules
    }

    /// Clean a text.
    pub fn clean(&self, text: &str, context: CleanContext) -> String {
        self.clean_counted(text, context).text
    }

    /// Clean a text and report how many glyph names were repaired.
    pub fn clean_counted(&self, text: &str, context: CleanContext) -> CleanOutcome {
        if context.is_repeated_header && self.options.remove_headers_footers {
            return CleanOutcome::default();
        }

        // Past the first pass NFC and ligature expansion are no-ops and every
        // other rule either leaves the text alone or shortens it
        let mut corrections = 0;
        let mut current = self.apply_rules(text, &mut corrections);
        loop {
            let next = self.apply_rules(&current, &mut corrections);
            if next == current {
                break;
            }
            current = next;
        }

        CleanOutcome {
            text: current,
            corrections,
        }
    }

    fn apply_rules(&self, text: &str, corrections: &mut usize) -> String {
        let mut result = text.to_string();
        for rule in &self.rules {
            result = match rule {
                CleanupRule::NormalizeUnicode => result.nfc().collect(),
                CleanupRule::FixLigatures => self.fix_ligatures(&result),
                CleanupRule::RepairGlyphs => self.repair_glyphs(&result, corrections),
                CleanupRule::RemovePua => remove_pua_chars(&result),
                CleanupRule::RemoveReplacementChar => result.replace('\u{FFFD}', ""),
                CleanupRule::FixHyphenation => self
                    .hyphenation_regex
                    .replace_all(&result, "$1$2")
                    .into_owned(),
                CleanupRule::CollapseWhitespace => {
                    self.whitespace_regex.replace_all(&result, " ").into_owned()
                }
                CleanupRule::Trim => result.trim().to_string(),
            };
        }
        result
    }

    fn fix_ligatures(&self, text: &str) -> String {
        let mut result = text.to_string();
        for (ligature, replacement) in &self.ligature_map {
            result = result.replace(ligature, replacement);
        }
        result
    }

    fn repair_glyphs(&self, text: &str, corrections: &mut usize) -> String {
        let result = self
            .glyph_name_regex
            .replace_all(text, |caps: &Captures| {
                *corrections += 1;
                glyph_replacement(&caps[1]).to_string()
            })
            .into_owned();

        let result = self
            .glyph_tag_regex
            .replace_all(&result, |_: &Captures| {
                *corrections += 1;
                String::new()
            })
            .into_owned();

        self.glyph_cap_regex
            .replace_all(&result, |caps: &Captures| {
                *corrections += 1;
                caps[1].to_string()
            })
            .into_owned()
    }
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::new(CleanupOptions::default())
    }
}

fn glyph_replacement(name: &str) -> &'static str {
    GLYPH_NAMES
        .iter()
        .find(|(glyph, _)| *glyph == name)
        .map(|(_, replacement)| *replacement)
        .unwrap_or("")
}

fn remove_pua_chars(text: &str) -> String {
    text.chars()
        .filter(|c| {
            let code = *c as u32;
            !(0xE000..=0xF8FF).contains(&code)
                && !(0xF0000..=0xFFFFD).contains(&code)
                && !(0x100000..=0x10FFFD).contains(&code)
        })
        .collect()
}

/// Running headers and footers of one document.
///
/// A text counts as repeated when, after the cleanup rules, it appears
/// verbatim on at least `max(2, ceil(threshold × pages))` distinct pages.
/// Documents with fewer than two pages never have repeated text.
#[derive(Debug, Clone, Default)]
pub struct HeaderFooterStats {
    repeated: HashSet<String>,
    page_count: usize,
}

impl HeaderFooterStats {
    /// Stats for a parsed document.
    pub fn from_document(doc: &ParsedDocument, cleaner: &TextCleaner) -> Self {
        let pages: Vec<Vec<String>> = doc
            .pages
            .iter()
            .map(|page| {
                page.elements
                    .iter()
                    .filter_map(|e| e.text())
                    .map(|t| cleaner.clean(t, CleanContext::default()))
                    .collect()
            })
            .collect();

        Self::from_page_texts(
            pages.iter().map(|p| p.iter().map(String::as_str)),
            cleaner.options(),
        )
    }

    /// Stats from already-cleaned texts, grouped by page.
    pub fn from_page_texts<'a, P, T>(pages: P, options: &CleanupOptions) -> Self
    where
        P: IntoIterator<Item = T>,
        T: IntoIterator<Item = &'a str>,
    {
        let mut counts: HashMap<&'a str, usize> = HashMap::new();
        let mut page_count = 0;

        for page in pages {
            page_count += 1;
            let distinct: HashSet<&'a str> = page
                .into_iter()
                .filter(|t| !t.is_empty())
                .filter(|t| t.chars().count() <= options.max_header_footer_length)
                .collect();
            for text in distinct {
                *counts.entry(text).or_insert(0) += 1;
            }
        }

        if !options.remove_headers_footers || page_count < 2 {
            return Self {
                repeated: HashSet::new(),
                page_count,
            };
        }

        let min = Self::min_occurrences(page_count, options.header_footer_threshold);
        let repeated = counts
            .into_iter()
            .filter(|(_, count)| *count >= min)
            .map(|(text, _)| text.to_string())
            .collect();

        Self {
            repeated,
            page_count,
        }
    }

    /// Number of distinct pages a text must appear on.
    pub fn min_occurrences(page_count: usize, threshold: f64) -> usize {
        let needed = (threshold * page_count as f64).ceil() as usize;
        needed.max(2)
    }

    /// Check whether a cleaned text is a running header/footer.
    pub fn is_repeated(&self, cleaned: &str) -> bool {
        self.repeated.contains(cleaned)
    }

    /// Context for a cleaned text.
    pub fn context_for(&self, cleaned: &str) -> CleanContext {
        CleanContext {
            is_repeated_header: self.is_repeated(cleaned),
        }
    }

    /// Number of distinct repeated texts.
    pub fn len(&self) -> usize {
        self.repeated.len()
    }

    /// Check if no repeated text was found.
    pub fn is_empty(&self) -> bool {
        self.repeated.is_empty()
    }

    /// Pages the stats were computed over.
    pub fn page_count(&self) -> usize {
        self.page_count
    }
}
