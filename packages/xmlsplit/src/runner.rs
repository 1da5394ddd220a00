//! One split run: read the input file, split it, write the output files.

use std::io::BufRead;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::config::{input_name_parts, SplitOptions};
use crate::error::Result;
use crate::sink::SinkSet;
use crate::source::LineSource;
use crate::splitter::{EnvelopeSplitter, ProgressEvent, ProgressObserver, ScanSummary, Tag};

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct SplitReport {
    /// Counters from the scan.
    pub summary: ScanSummary,

    /// Output files in slot order.
    pub outputs: Vec<PathBuf>,

    /// Wall clock time of the run.
    pub elapsed: Duration,
}

/// Split `options.input` into `options.file_count` files in `options.output_dir`.
///
/// Options are validated before any file is created. If the input turns out
/// to contain no opening tag, the output files created for this run are
/// removed again. On I/O errors the outputs are flushed and left in place.
///
/// # Errors
/// * Configuration errors from [`SplitOptions::validate`] and output directory creation
/// * `SplitError::OpenTagNotFound` / `SplitError::OpenTagNotFoundWithin` for malformed input
/// * `SplitError::Read` / `SplitError::Create` / `SplitError::Write` for I/O failures
pub fn split_file<O>(options: &SplitOptions, observer: &mut O) -> Result<SplitReport>
where
    O: ProgressObserver + ?Sized,
{
    let start = Instant::now();
    let tag = options.validate()?;

    // Open the input before creating outputs so an unreadable file leaves nothing behind
    let source = LineSource::open(&options.input)?;
    let (summary, outputs) = split_source(options, tag, source, observer)?;

    Ok(SplitReport {
        summary,
        outputs,
        elapsed: start.elapsed(),
    })
}

/// Create the output slots and run the splitter over `source`.
fn split_source<R, O>(
    options: &SplitOptions,
    tag: Tag,
    source: LineSource<R>,
    observer: &mut O,
) -> Result<(ScanSummary, Vec<PathBuf>)>
where
    R: BufRead,
    O: ProgressObserver + ?Sized,
{
    let (base_name, extension) = input_name_parts(&options.input);
    let mut sinks = SinkSet::create(
        options.file_count,
        &options.output_dir,
        &base_name,
        extension.as_deref(),
    )?;
    for slot in sinks.slots() {
        observer.on_event(&ProgressEvent::SlotCreated {
            index: slot.index(),
            path: slot.path().to_path_buf(),
        });
    }

    tracing::info!(
        input = %options.input.display(),
        tag = %tag.name(),
        files = options.file_count,
        "Splitting"
    );

    let splitter = EnvelopeSplitter::new(tag)
        .with_max_header_lines(options.max_header_lines)
        .with_progress_intervals(
            options.line_progress_interval,
            options.element_progress_interval,
        );

    let summary = match splitter.run(source, &mut sinks, observer) {
        Ok(summary) => summary,
        Err(e) if e.is_malformed_input() => {
            sinks.discard();
            return Err(e);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Split failed, keeping partial output files");
            return Err(e);
        }
    };

    let outputs = sinks.paths();
    sinks.close_all()?;
    Ok((summary, outputs))
}
