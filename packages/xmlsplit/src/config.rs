//! Configuration constants, run options and validation for the splitter.

use std::path::{Path, PathBuf};

use crate::error::{Result, SplitError};
use crate::splitter::Tag;

/// Default number of output files.
pub const DEFAULT_FILE_COUNT: usize = 5;

/// Default number of lines to scan for the first opening tag before giving up.
///
/// A wrong tag argument on a multi-gigabyte input would otherwise only be
/// reported after reading the whole file.
pub const DEFAULT_MAX_HEADER_LINES: u64 = 10_000;

/// Emit a `LinesRead` progress event every this many input lines.
pub const LINE_PROGRESS_INTERVAL: u64 = 1_000_000;

/// Emit an `ElementsProcessed` progress event every this many elements.
pub const ELEMENT_PROGRESS_INTERVAL: u64 = 10_000;

/// Line separator written after every output line.
pub const LINE_SEPARATOR: &str = "\n";

/// Options for a single split run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOptions {
    /// Input document.
    pub input: PathBuf,

    /// Directory receiving the output files. Created if missing.
    pub output_dir: PathBuf,

    /// Element tag as given by the user, angle brackets allowed.
    pub tag: String,

    /// Number of output files.
    pub file_count: usize,

    /// Header line budget; `None` scans the whole input for the opening tag.
    pub max_header_lines: Option<u64>,

    /// Interval for `LinesRead` progress events.
    pub line_progress_interval: u64,

    /// Interval for `ElementsProcessed` progress events.
    pub element_progress_interval: u64,
}

impl SplitOptions {
    /// Create options with default file count, header budget and progress intervals.
    #[must_use]
    pub fn new(
        input: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            tag: tag.into(),
            file_count: DEFAULT_FILE_COUNT,
            max_header_lines: Some(DEFAULT_MAX_HEADER_LINES),
            line_progress_interval: LINE_PROGRESS_INTERVAL,
            element_progress_interval: ELEMENT_PROGRESS_INTERVAL,
        }
    }

    /// Set the number of output files.
    #[must_use]
    pub fn with_file_count(mut self, file_count: usize) -> Self {
        self.file_count = file_count;
        self
    }

    /// Set the header line budget. `None` disables the early abort.
    #[must_use]
    pub fn with_max_header_lines(mut self, limit: Option<u64>) -> Self {
        self.max_header_lines = limit;
        self
    }

    /// Set both progress intervals.
    #[must_use]
    pub fn with_progress_intervals(mut self, lines: u64, elements: u64) -> Self {
        self.line_progress_interval = lines;
        self.element_progress_interval = elements;
        self
    }

    /// Check everything that can be checked before an output file is created.
    ///
    /// Returns the normalized tag on success.
    ///
    /// # Errors
    /// * `SplitError::InvalidFileCount` if `file_count` is 0
    /// * `SplitError::EmptyTag` if the tag is empty once brackets are stripped
    /// * `SplitError::InputNotFound` / `SplitError::InputNotAFile` for a bad input path
    pub fn validate(&self) -> Result<Tag> {
        validate_file_count(self.file_count)?;
        let tag = Tag::parse(&self.tag)?;

        if !self.input.exists() {
            return Err(SplitError::InputNotFound(self.input.clone()));
        }
        if !self.input.is_file() {
            return Err(SplitError::InputNotAFile(self.input.clone()));
        }

        Ok(tag)
    }
}

/// Validate the number of output files.
///
/// # Examples
/// ```
/// use xmlsplit::config::validate_file_count;
///
/// assert!(validate_file_count(1).is_ok());
/// assert!(validate_file_count(0).is_err());
/// ```
pub fn validate_file_count(file_count: usize) -> Result<()> {
    if file_count == 0 {
        Err(SplitError::InvalidFileCount(file_count))
    } else {
        Ok(())
    }
}

/// Build the file name of output slot `index`.
///
/// The name is `<base name>_<two digit index>` followed by `.<extension>`
/// when the input had one.
///
/// # Examples
/// ```
/// use xmlsplit::config::output_file_name;
///
/// assert_eq!(output_file_name("dump", Some("xml"), 3), "dump_03.xml");
/// assert_eq!(output_file_name("dump", None, 10), "dump_10");
/// ```
pub fn output_file_name(base_name: &str, extension: Option<&str>, index: usize) -> String {
    match extension {
        Some(ext) => format!("{base_name}_{index:02}.{ext}"),
        None => format!("{base_name}_{index:02}"),
    }
}

/// Split an input path into the base name and extension used for output names.
pub fn input_name_parts(input: &Path) -> (String, Option<String>) {
    let base = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = input.extension().map(|e| e.to_string_lossy().into_owned());
    (base, ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_validate_file_count() {
        assert!(validate_file_count(1).is_ok());
        assert!(validate_file_count(10).is_ok());
        assert!(matches!(
            validate_file_count(0),
            Err(SplitError::InvalidFileCount(0))
        ));
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("records", Some("xml"), 0), "records_00.xml");
        assert_eq!(output_file_name("records", Some("xml"), 9), "records_09.xml");
        assert_eq!(output_file_name("records", Some("xml"), 123), "records_123.xml");
    }

    #[test]
    fn test_input_name_parts() {
        assert_eq!(
            input_name_parts(Path::new("/data/records.xml")),
            ("records".to_string(), Some("xml".to_string()))
        );
        assert_eq!(
            input_name_parts(Path::new("records")),
            ("records".to_string(), None)
        );
    }

    #[test]
    fn test_input_name_parts_multiple_dots() {
        let (base, ext) = input_name_parts(Path::new("dump.2024.xml"));
        assert_eq!(output_file_name(&base, ext.as_deref(), 1), "dump.2024_01.xml");
    }

    #[test]
    fn test_output_name_without_extension() {
        let (base, ext) = input_name_parts(Path::new("/in/records"));
        assert_eq!(output_file_name(&base, ext.as_deref(), 7), "records_07");
    }

    #[test]
    fn test_options_defaults() {
        let options = SplitOptions::new("in.xml", "out", "item");
        assert_eq!(options.file_count, DEFAULT_FILE_COUNT);
        assert_eq!(options.max_header_lines, Some(DEFAULT_MAX_HEADER_LINES));
        assert_eq!(options.line_progress_interval, LINE_PROGRESS_INTERVAL);
        assert_eq!(options.element_progress_interval, ELEMENT_PROGRESS_INTERVAL);
    }

    #[test]
    fn test_validate_rejects_zero_files() {
        let options = SplitOptions::new("in.xml", "out", "item").with_file_count(0);
        assert!(matches!(
            options.validate(),
            Err(SplitError::InvalidFileCount(0))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_tag() {
        let options = SplitOptions::new("in.xml", "out", "<>");
        assert!(matches!(options.validate(), Err(SplitError::EmptyTag(_))));
    }

    #[test]
    fn test_validate_missing_input() {
        let dir = tempdir().unwrap();
        let options = SplitOptions::new(dir.path().join("missing.xml"), dir.path(), "item");
        assert!(matches!(
            options.validate(),
            Err(SplitError::InputNotFound(_))
        ));
    }

    #[test]
    fn test_validate_input_is_directory() {
        let dir = tempdir().unwrap();
        let options = SplitOptions::new(dir.path(), dir.path().join("out"), "item");
        assert!(matches!(
            options.validate(),
            Err(SplitError::InputNotAFile(_))
        ));
    }

    #[test]
    fn test_validate_returns_normalized_tag() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.xml");
        fs::write(&input, "<root>\n</root>\n").unwrap();

        let options = SplitOptions::new(&input, dir.path().join("out"), "<item>");
        let tag = options.validate().unwrap();
        assert_eq!(tag.name(), "item");
    }
}
