//! xmlsplit - Split one large line-oriented XML document into N smaller documents.
//!
//! The document is scanned once, line by line. Lines before the first element
//! form a header and lines after the last element form a footer; both are
//! copied into every output file. Elements, delimited by a user supplied tag,
//! are distributed over the output files round-robin: element `k` goes to
//! file `k % N`. Memory use is bounded by the header, the footer and the
//! largest single element.
//!
//! # Example
//!
//! ```
//! use xmlsplit::splitter::{EnvelopeSplitter, NoProgress, Tag};
//! use xmlsplit::{LineSource, SinkSet};
//!
//! let input = "<root>\n<item>A</item>\n<item>B</item>\n<item>C</item>\n</root>\n";
//! let source = LineSource::from_reader(input.as_bytes(), "inline.xml");
//! let mut sinks = SinkSet::from_writers(vec![Vec::<u8>::new(), Vec::new()]).unwrap();
//!
//! let summary = EnvelopeSplitter::new(Tag::parse("item").unwrap())
//!     .run(source, &mut sinks, &mut NoProgress)
//!     .unwrap();
//! assert_eq!(summary.slot_elements, vec![2, 1]);
//!
//! let outputs = sinks.into_writers().unwrap();
//! assert_eq!(outputs[1], b"<root>\n<item>B</item>\n</root>\n");
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Defaults, run options, output file naming
//! - [`error`]: Error types and Result alias
//! - [`source`]: Lazy line reader over the input
//! - [`splitter`]: Header/element/footer state machine and progress events
//! - [`sink`]: Buffered output slots
//! - [`runner`]: A complete file-to-files run
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod runner;
pub mod sink;
pub mod source;
pub mod splitter;

// Re-export main functions
pub use runner::{split_file, SplitReport};

// Re-export commonly used items
pub use config::SplitOptions;
pub use error::{Result, SplitError};
pub use sink::SinkSet;
pub use source::{Line, LineSource};
