//! Error types for the splitter.
//!
//! Errors fall into three groups: configuration problems detected before any
//! output file exists, malformed input (no element boundary found), and I/O
//! failures while reading the input or writing an output slot.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the splitter library.
#[derive(Debug, Error)]
pub enum SplitError {
    /// Requested number of output files is not at least 1.
    #[error("Invalid number of output files: {0}. Expected a value of at least 1")]
    InvalidFileCount(usize),

    /// Tag is empty after stripping angle brackets.
    #[error("Invalid element tag: '{0}'. Expected a tag name such as 'item' or '<item>'")]
    EmptyTag(String),

    /// Input file does not exist.
    #[error("Input file does not exist: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Input path exists but is not a regular file.
    #[error("Input path is not a file: {}", .0.display())]
    InputNotAFile(PathBuf),

    /// Output directory could not be created.
    #[error("Failed to create output directory {}: {source}", .path.display())]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reached end of input without seeing a line that opens the element.
    #[error("Finished reading {lines_read} lines but couldn't find opening tag '<{tag}'")]
    OpenTagNotFound { tag: String, lines_read: u64 },

    /// Gave up looking for the opening tag after the header line budget.
    #[error("Couldn't find opening tag '<{tag}' within the first {limit} lines")]
    OpenTagNotFoundWithin { tag: String, limit: u64 },

    /// Reading the input failed.
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Creating an output file failed.
    #[error("Failed to create output file {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing or flushing an output slot failed.
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SplitError {
    /// Whether this error was raised while validating the run configuration.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFileCount(_)
                | Self::EmptyTag(_)
                | Self::InputNotFound(_)
                | Self::InputNotAFile(_)
                | Self::OutputDirectory { .. }
        )
    }

    /// Whether the input had no detectable element boundary.
    #[must_use]
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            Self::OpenTagNotFound { .. } | Self::OpenTagNotFoundWithin { .. }
        )
    }
}

/// Result type alias for splitter operations.
pub type Result<T> = std::result::Result<T, SplitError>;
