//! Envelope splitter: classifies lines as header, element or footer and
//! routes complete elements to output slots round-robin.

use std::io::Write;

use super::progress::{ProgressEvent, ProgressObserver};
use super::types::{ScanState, ScanSummary, Tag};
use crate::config::{DEFAULT_MAX_HEADER_LINES, ELEMENT_PROGRESS_INTERVAL, LINE_PROGRESS_INTERVAL};
use crate::error::{Result, SplitError};
use crate::sink::SinkSet;
use crate::source::Line;

/// Streaming state machine over the lines of one document.
///
/// Lines before the first opening tag form the header, which is written to
/// every slot as soon as that tag shows up. After that, lines accumulate in a
/// pending buffer until a closing line completes the element; element `k`
/// goes to slot `k % N`. Whatever is pending when input ends is the footer.
///
/// The pending buffer is both the element under construction and the footer
/// candidate: it is cleared whenever an element closes, so at end of input it
/// holds exactly the lines after the last closed element. Memory use is
/// bounded by the header, the footer and the largest single element.
pub struct EnvelopeSplitter {
    tag: Tag,
    state: ScanState,
    max_header_lines: Option<u64>,
    line_progress_interval: u64,
    element_progress_interval: u64,
    header: Vec<Vec<u8>>,
    header_lines: usize,
    pending: Vec<Vec<u8>>,
    pending_has_open: bool,
    assignment_index: u64,
    lines_read: u64,
    blank_lines: u64,
}

impl EnvelopeSplitter {
    /// Create a splitter with the default header budget and progress intervals.
    #[must_use]
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            state: ScanState::SeekingOpenTag,
            max_header_lines: Some(DEFAULT_MAX_HEADER_LINES),
            line_progress_interval: LINE_PROGRESS_INTERVAL,
            element_progress_interval: ELEMENT_PROGRESS_INTERVAL,
            header: Vec::new(),
            header_lines: 0,
            pending: Vec::new(),
            pending_has_open: false,
            assignment_index: 0,
            lines_read: 0,
            blank_lines: 0,
        }
    }

    /// Set the header line budget. `None` scans the whole input.
    #[must_use]
    pub fn with_max_header_lines(mut self, limit: Option<u64>) -> Self {
        self.max_header_lines = limit;
        self
    }

    /// Set the progress intervals. An interval of 0 disables that event.
    #[must_use]
    pub fn with_progress_intervals(mut self, lines: u64, elements: u64) -> Self {
        self.line_progress_interval = lines;
        self.element_progress_interval = elements;
        self
    }

    /// Current scan state.
    #[must_use]
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Elements routed so far.
    #[must_use]
    pub fn elements_written(&self) -> u64 {
        self.assignment_index
    }

    /// Feed every line of `lines` and finish.
    ///
    /// # Errors
    /// Propagates read errors from `lines` and any error from [`push`](Self::push)
    /// or [`finish`](Self::finish).
    pub fn run<I, W, O>(
        mut self,
        lines: I,
        sinks: &mut SinkSet<W>,
        observer: &mut O,
    ) -> Result<ScanSummary>
    where
        I: IntoIterator<Item = Result<Line>>,
        W: Write,
        O: ProgressObserver + ?Sized,
    {
        for line in lines {
            self.push(&line?, sinks, observer)?;
        }
        self.finish(sinks, observer)
    }

    /// Process one input line.
    ///
    /// # Errors
    /// * `SplitError::OpenTagNotFoundWithin` once the header budget is exceeded
    /// * `SplitError::Write` if writing to a slot fails
    pub fn push<W, O>(&mut self, line: &Line, sinks: &mut SinkSet<W>, observer: &mut O) -> Result<()>
    where
        W: Write,
        O: ProgressObserver + ?Sized,
    {
        if self.state == ScanState::Done {
            tracing::warn!(line = line.number, "Line received after end of input, ignoring");
            return Ok(());
        }

        self.lines_read += 1;
        if self.line_progress_interval > 0 && self.lines_read % self.line_progress_interval == 0 {
            observer.on_event(&ProgressEvent::LinesRead {
                count: self.lines_read,
            });
        }

        if self.state == ScanState::SeekingOpenTag {
            if let Some(limit) = self.max_header_lines {
                if self.lines_read > limit {
                    return Err(SplitError::OpenTagNotFoundWithin {
                        tag: self.tag.name().to_string(),
                        limit,
                    });
                }
            }
        }

        if line.is_blank() {
            self.blank_lines += 1;
            return Ok(());
        }

        if self.state == ScanState::SeekingOpenTag {
            if !self.tag.opens(line.trimmed()) {
                self.header.push(line.raw.clone());
                return Ok(());
            }
            self.enter_body(line.number, sinks, observer)?;
        }

        self.push_body_line(line, sinks, observer)
    }

    /// Write the header to every slot and switch to `InBody`.
    fn enter_body<W, O>(&mut self, line_number: u64, sinks: &mut SinkSet<W>, observer: &mut O) -> Result<()>
    where
        W: Write,
        O: ProgressObserver + ?Sized,
    {
        let header = std::mem::take(&mut self.header);
        tracing::info!(
            tag = %self.tag.name(),
            line = line_number,
            header_lines = header.len(),
            "Found first element"
        );

        sinks.write_header(&header)?;
        self.header_lines = header.len();
        self.state = ScanState::InBody;

        observer.on_event(&ProgressEvent::HeaderWritten {
            lines: header.len(),
            slots: sinks.len(),
        });
        Ok(())
    }

    fn push_body_line<W, O>(&mut self, line: &Line, sinks: &mut SinkSet<W>, observer: &mut O) -> Result<()>
    where
        W: Write,
        O: ProgressObserver + ?Sized,
    {
        let trimmed = line.trimmed();
        // Only the line that opens the element may also close it; a one-line
        // child like `<itemName>x</itemName>` must not.
        let opening = !self.pending_has_open && self.tag.opens(trimmed);
        self.pending_has_open |= opening;
        self.pending.push(line.raw.clone());

        let closes = self.tag.closes(trimmed) || (opening && self.tag.opens_and_closes(trimmed));
        if !closes {
            return Ok(());
        }

        let slot = (self.assignment_index % sinks.len() as u64) as usize;
        sinks.write_element(slot, &self.pending)?;
        self.assignment_index += 1;
        self.pending.clear();
        self.pending_has_open = false;

        if self.element_progress_interval > 0
            && self.assignment_index % self.element_progress_interval == 0
        {
            observer.on_event(&ProgressEvent::ElementsProcessed {
                count: self.assignment_index,
            });
        }
        Ok(())
    }

    /// End of input: write the footer to every slot.
    ///
    /// An element that was opened but never closed is written as part of the
    /// footer, with a warning.
    ///
    /// # Errors
    /// * `SplitError::OpenTagNotFound` if no opening tag was ever seen
    /// * `SplitError::Write` if writing to a slot fails
    pub fn finish<W, O>(&mut self, sinks: &mut SinkSet<W>, observer: &mut O) -> Result<ScanSummary>
    where
        W: Write,
        O: ProgressObserver + ?Sized,
    {
        let previous = self.state;
        self.state = ScanState::Done;

        match previous {
            ScanState::SeekingOpenTag => {
                return Err(SplitError::OpenTagNotFound {
                    tag: self.tag.name().to_string(),
                    lines_read: self.lines_read,
                });
            }
            ScanState::Done => {
                tracing::warn!("Splitter finished twice");
            }
            ScanState::InBody => {}
        }

        let footer = std::mem::take(&mut self.pending);
        let unterminated = std::mem::take(&mut self.pending_has_open);
        if unterminated {
            tracing::warn!(
                tag = %self.tag.name(),
                lines = footer.len(),
                "Input ended inside an unterminated element, writing its lines with the footer"
            );
        }

        sinks.write_footer(&footer)?;
        observer.on_event(&ProgressEvent::FooterWritten {
            lines: footer.len(),
            slots: sinks.len(),
        });

        tracing::info!(
            lines = self.lines_read,
            elements = self.assignment_index,
            state = self.state.as_str(),
            "Scan complete"
        );

        let envelope_lines = ((self.header_lines + footer.len()) * sinks.len()) as u64;
        let total_lines: u64 = sinks.slots().iter().map(|s| s.lines_written()).sum();

        Ok(ScanSummary {
            lines_read: self.lines_read,
            blank_lines: self.blank_lines,
            header_lines: self.header_lines,
            footer_lines: footer.len(),
            elements_written: self.assignment_index,
            slot_elements: sinks.slots().iter().map(|s| s.elements_written()).collect(),
            element_lines: total_lines.saturating_sub(envelope_lines),
            unterminated_element: unterminated,
        })
    }
}
