//! Progress reporting for split runs.
//!
//! The splitter emits [`ProgressEvent`]s to a [`ProgressObserver`] instead of
//! printing. Closures implement the trait, so callers can render progress
//! however they like.

use std::fmt;
use std::path::PathBuf;

/// Something worth telling the user about while a run is in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// An output file was created.
    SlotCreated { index: usize, path: PathBuf },

    /// The header was written to every slot.
    HeaderWritten { lines: usize, slots: usize },

    /// Periodic line count.
    LinesRead { count: u64 },

    /// Periodic element count.
    ElementsProcessed { count: u64 },

    /// The footer was written to every slot.
    FooterWritten { lines: usize, slots: usize },
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SlotCreated { path, .. } => {
                write!(f, "Creating output file: {}", path.display())
            }
            Self::HeaderWritten { lines, slots } => {
                write!(f, "Writing {lines} header lines to {slots} files")
            }
            Self::LinesRead { count } => write!(f, "Read {count} lines"),
            Self::ElementsProcessed { count } => write!(f, "Processed {count} elements"),
            Self::FooterWritten { lines, slots } => {
                write!(f, "Writing {lines} footer lines to {slots} files")
            }
        }
    }
}

/// Receiver of progress events.
pub trait ProgressObserver {
    /// Called for every event, in the order the events happen.
    fn on_event(&mut self, event: &ProgressEvent);
}

impl<F> ProgressObserver for F
where
    F: FnMut(&ProgressEvent),
{
    fn on_event(&mut self, event: &ProgressEvent) {
        self(event);
    }
}

/// Observer that ignores all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_event(&mut self, _event: &ProgressEvent) {}
}

/// Observer that turns events into `tracing` records.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ProgressObserver for TracingObserver {
    fn on_event(&mut self, event: &ProgressEvent) {
        match event {
            ProgressEvent::SlotCreated { index, path } => {
                tracing::debug!(slot = index, path = %path.display(), "Created output file");
            }
            other => tracing::info!("{other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_display() {
        assert_eq!(
            ProgressEvent::SlotCreated {
                index: 0,
                path: PathBuf::from("out/data_00.xml"),
            }
            .to_string(),
            "Creating output file: out/data_00.xml"
        );
        assert_eq!(
            ProgressEvent::LinesRead { count: 1_000_000 }.to_string(),
            "Read 1000000 lines"
        );
        assert_eq!(
            ProgressEvent::ElementsProcessed { count: 10 }.to_string(),
            "Processed 10 elements"
        );
        assert_eq!(
            ProgressEvent::HeaderWritten { lines: 2, slots: 3 }.to_string(),
            "Writing 2 header lines to 3 files"
        );
    }

    #[test]
    fn test_closure_observer_receives_events() {
        let mut seen = Vec::new();
        {
            let mut observer = |event: &ProgressEvent| seen.push(event.clone());
            observer.on_event(&ProgressEvent::LinesRead { count: 1 });
            observer.on_event(&ProgressEvent::ElementsProcessed { count: 2 });
        }
        assert_eq!(
            seen,
            vec![
                ProgressEvent::LinesRead { count: 1 },
                ProgressEvent::ElementsProcessed { count: 2 },
            ]
        );
    }

    #[test]
    fn test_no_progress_accepts_events() {
        let mut observer = NoProgress;
        observer.on_event(&ProgressEvent::LinesRead { count: 1 });
    }
}
