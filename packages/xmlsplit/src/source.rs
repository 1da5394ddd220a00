//! Lazy, forward-only line reader over the input document.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{Result, SplitError};

/// Read buffer size for the input file.
const READ_BUFFER_SIZE: usize = 256 * 1024;

/// One line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based position in the input.
    pub number: u64,

    /// Bytes as read, without the line terminator. Not required to be UTF-8.
    pub raw: Vec<u8>,
}

impl Line {
    /// Create a new line.
    #[must_use]
    pub fn new(number: u64, raw: impl Into<Vec<u8>>) -> Self {
        Self {
            number,
            raw: raw.into(),
        }
    }

    /// Bytes with surrounding ASCII whitespace removed, used for classification.
    #[must_use]
    pub fn trimmed(&self) -> &[u8] {
        self.raw.trim_ascii()
    }

    /// Whether the line holds nothing but whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.trimmed().is_empty()
    }
}

/// Iterator of [`Line`]s read one at a time from a buffered reader.
///
/// Lines are split on `\n` and passed through as bytes, so documents in any
/// ASCII-compatible encoding work. Only the current line is held in memory.
/// The source cannot be rewound; after the first read error it yields `None`.
pub struct LineSource<R> {
    reader: R,
    path: PathBuf,
    number: u64,
    failed: bool,
}

impl LineSource<BufReader<File>> {
    /// Open `path` for reading.
    ///
    /// # Errors
    /// Returns `SplitError::Read` if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| SplitError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_reader(
            BufReader::with_capacity(READ_BUFFER_SIZE, file),
            path,
        ))
    }
}

impl<R: BufRead> LineSource<R> {
    /// Wrap an already buffered reader. `path` is only used in error messages.
    pub fn from_reader(reader: R, path: impl Into<PathBuf>) -> Self {
        Self {
            reader,
            path: path.into(),
            number: 0,
            failed: false,
        }
    }
}

impl<R: BufRead> Iterator for LineSource<R> {
    type Item = Result<Line>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let mut raw = Vec::new();
        match self.reader.read_until(b'\n', &mut raw) {
            Ok(0) => None,
            Ok(_) => {
                if raw.last() == Some(&b'\n') {
                    raw.pop();
                    if raw.last() == Some(&b'\r') {
                        raw.pop();
                    }
                }
                self.number += 1;
                Some(Ok(Line::new(self.number, raw)))
            }
            Err(source) => {
                self.failed = true;
                Some(Err(SplitError::Read {
                    path: self.path.clone(),
                    source,
                }))
            }
        }
    }
}
