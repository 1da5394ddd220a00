//! Types for the envelope splitter.

use crate::error::{Result, SplitError};

/// Element tag used to find element boundaries.
///
/// Matching is a literal prefix test on the trimmed line. There is no
/// attribute or namespace awareness, so `<item` also matches `<items>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    name: String,
    open_prefix: String,
    close_prefix: String,
}

impl Tag {
    /// Normalize a user supplied tag by stripping `<` and `>`.
    ///
    /// # Errors
    /// Returns `SplitError::EmptyTag` if nothing is left after stripping.
    ///
    /// # Examples
    /// ```
    /// use xmlsplit::splitter::Tag;
    ///
    /// let tag = Tag::parse("<record>").unwrap();
    /// assert_eq!(tag.name(), "record");
    /// assert_eq!(tag.open_prefix(), "<record");
    /// assert_eq!(tag.close_prefix(), "</record");
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        let name: String = raw.chars().filter(|c| *c != '<' && *c != '>').collect();
        let name = name.trim();
        if name.is_empty() {
            return Err(SplitError::EmptyTag(raw.to_string()));
        }

        Ok(Self {
            open_prefix: format!("<{name}"),
            close_prefix: format!("</{name}"),
            name: name.to_string(),
        })
    }

    /// Tag name without brackets.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `<tag`
    #[must_use]
    pub fn open_prefix(&self) -> &str {
        &self.open_prefix
    }

    /// `</tag`
    #[must_use]
    pub fn close_prefix(&self) -> &str {
        &self.close_prefix
    }

    /// Whether a trimmed line opens an element.
    #[must_use]
    pub fn opens(&self, trimmed: &[u8]) -> bool {
        trimmed.starts_with(self.open_prefix.as_bytes())
    }

    /// Whether a trimmed line starts with the close prefix.
    #[must_use]
    pub fn closes(&self, trimmed: &[u8]) -> bool {
        trimmed.starts_with(self.close_prefix.as_bytes())
    }

    /// Whether an opening line also closes its element.
    ///
    /// True for `<tag>..</tag>` on one line and for a lone self-closing
    /// `<tag .../>`. Only meaningful for the line that opens an element; a
    /// child such as `<tagRef/>` inside an element must not end it.
    #[must_use]
    pub fn opens_and_closes(&self, trimmed: &[u8]) -> bool {
        if !self.opens(trimmed) {
            return false;
        }

        let rest = &trimmed[self.open_prefix.len()..];
        let close = self.close_prefix.as_bytes();
        let has_close = rest.windows(close.len()).any(|w| w == close);
        let self_closing = trimmed.ends_with(b"/>") && !rest.contains(&b'<');
        has_close || self_closing
    }
}

/// State of the splitter's single forward scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Collecting header lines, no opening tag seen yet.
    SeekingOpenTag,
    /// Header written, routing elements to slots.
    InBody,
    /// Input exhausted and footer written.
    Done,
}

impl ScanState {
    /// Lowercase name for log output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SeekingOpenTag => "seeking_open_tag",
            Self::InBody => "in_body",
            Self::Done => "done",
        }
    }
}

/// Counters gathered during one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Total input lines read, blank lines included.
    pub lines_read: u64,

    /// Blank lines skipped.
    pub blank_lines: u64,

    /// Lines in the header written to every slot.
    pub header_lines: usize,

    /// Lines in the footer written to every slot.
    pub footer_lines: usize,

    /// Elements routed to slots.
    pub elements_written: u64,

    /// Elements per slot, indexed by slot.
    pub slot_elements: Vec<u64>,

    /// Lines written across all slots, not counting the header and footer copies.
    pub element_lines: u64,

    /// Whether the footer absorbed an element that was never closed.
    pub unterminated_element: bool,
}

impl ScanSummary {
    /// Non-blank lines read.
    #[must_use]
    pub fn content_lines(&self) -> u64 {
        self.lines_read - self.blank_lines
    }
}
