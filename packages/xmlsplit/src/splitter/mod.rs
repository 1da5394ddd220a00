//! Envelope splitting of line-oriented XML documents.
//!
//! A document is read as a header, a run of elements delimited by a tag, and
//! a footer. The header and footer are copied into every output slot while
//! the elements are distributed over the slots round-robin.

mod engine;
mod progress;
mod types;

pub use engine::EnvelopeSplitter;
pub use progress::{NoProgress, ProgressEvent, ProgressObserver, TracingObserver};
pub use types::{ScanState, ScanSummary, Tag};
