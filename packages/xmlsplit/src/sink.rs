//! Output slots: N buffered append targets owned by a single run.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::{output_file_name, validate_file_count, LINE_SEPARATOR};
use crate::error::{Result, SplitError};

/// Write buffer size per output file.
const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// One output destination.
#[derive(Debug)]
pub struct Slot<W: Write> {
    index: usize,
    path: PathBuf,
    writer: W,
    header_written: bool,
    elements_written: u64,
    lines_written: u64,
}

impl<W: Write> Slot<W> {
    fn new(index: usize, path: PathBuf, writer: W) -> Self {
        Self {
            index,
            path,
            writer,
            header_written: false,
            elements_written: 0,
            lines_written: 0,
        }
    }

    /// Position of this slot in the set.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Backing file, or a `slot-NN` label for in-memory writers.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the header has been written.
    #[must_use]
    pub fn header_written(&self) -> bool {
        self.header_written
    }

    /// Elements written so far.
    #[must_use]
    pub fn elements_written(&self) -> u64 {
        self.elements_written
    }

    /// Lines written so far, header and footer included.
    #[must_use]
    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    fn write_lines(&mut self, lines: &[Vec<u8>]) -> Result<()> {
        for line in lines {
            self.writer
                .write_all(line)
                .and_then(|()| self.writer.write_all(LINE_SEPARATOR.as_bytes()))
                .map_err(|source| SplitError::Write {
                    path: self.path.clone(),
                    source,
                })?;
        }
        self.lines_written += lines.len() as u64;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|source| SplitError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// The set of N output slots.
///
/// Slots that were not released through [`SinkSet::close_all`] are flushed
/// when the set is dropped, so an aborted run still leaves complete lines on
/// disk.
#[derive(Debug)]
pub struct SinkSet<W: Write> {
    slots: Vec<Slot<W>>,
}

impl SinkSet<BufWriter<File>> {
    /// Create `count` empty files in `output_dir`, creating the directory if needed.
    ///
    /// Files are named `<base_name>_<NN>[.<extension>]` for `NN` in `00..count`.
    /// Existing files with the same names are truncated.
    ///
    /// # Errors
    /// * `SplitError::InvalidFileCount` if `count` is 0
    /// * `SplitError::OutputDirectory` if the directory cannot be created
    /// * `SplitError::Create` if a file cannot be created
    pub fn create(
        count: usize,
        output_dir: &Path,
        base_name: &str,
        extension: Option<&str>,
    ) -> Result<Self> {
        validate_file_count(count)?;

        fs::create_dir_all(output_dir).map_err(|source| SplitError::OutputDirectory {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let mut sinks = Self {
            slots: Vec::with_capacity(count),
        };
        for index in 0..count {
            let path = output_dir.join(output_file_name(base_name, extension, index));
            let file = match File::create(&path) {
                Ok(file) => file,
                Err(source) => {
                    // Files created so far would be empty leftovers
                    sinks.discard();
                    return Err(SplitError::Create { path, source });
                }
            };
            tracing::debug!(slot = index, path = %path.display(), "Created output file");
            sinks.slots.push(Slot::new(
                index,
                path,
                BufWriter::with_capacity(WRITE_BUFFER_SIZE, file),
            ));
        }

        Ok(sinks)
    }

    /// Release every slot and delete the files it created.
    ///
    /// Used when the run turned out to have nothing to split, or when not all
    /// files could be created. Removal failures are logged, not returned.
    pub fn discard(mut self) {
        for slot in std::mem::take(&mut self.slots) {
            let Slot { path, writer, .. } = slot;
            drop(writer);
            if let Err(e) = fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove output file");
            } else {
                tracing::debug!(path = %path.display(), "Removed output file");
            }
        }
    }
}

impl<W: Write> SinkSet<W> {
    /// Build a set from existing writers. Slots are labelled `slot-NN`.
    ///
    /// # Errors
    /// Returns `SplitError::InvalidFileCount` if `writers` is empty.
    pub fn from_writers(writers: Vec<W>) -> Result<Self> {
        validate_file_count(writers.len())?;
        let slots = writers
            .into_iter()
            .enumerate()
            .map(|(index, writer)| Slot::new(index, PathBuf::from(format!("slot-{index:02}")), writer))
            .collect();
        Ok(Self { slots })
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always false for a set built through `create` or `from_writers`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All slots in index order.
    #[must_use]
    pub fn slots(&self) -> &[Slot<W>] {
        &self.slots
    }

    /// Paths of all slots in index order.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.slots.iter().map(|s| s.path.clone()).collect()
    }

    /// Append `lines` to slot `index`, each followed by the line separator.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn write_lines(&mut self, index: usize, lines: &[Vec<u8>]) -> Result<()> {
        self.slots[index].write_lines(lines)
    }

    /// Write the header to every slot and mark it written.
    pub fn write_header(&mut self, lines: &[Vec<u8>]) -> Result<()> {
        for slot in &mut self.slots {
            slot.write_lines(lines)?;
            slot.header_written = true;
        }
        Ok(())
    }

    /// Write one complete element to slot `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn write_element(&mut self, index: usize, lines: &[Vec<u8>]) -> Result<()> {
        let slot = &mut self.slots[index];
        slot.write_lines(lines)?;
        slot.elements_written += 1;
        Ok(())
    }

    /// Append the footer to every slot.
    pub fn write_footer(&mut self, lines: &[Vec<u8>]) -> Result<()> {
        for slot in &mut self.slots {
            slot.write_lines(lines)?;
        }
        Ok(())
    }

    /// Flush every slot and hand back the writers.
    ///
    /// # Errors
    /// Returns `SplitError::Write` for the first slot that fails to flush.
    /// The remaining slots are still flushed when the set is dropped.
    pub fn into_writers(mut self) -> Result<Vec<W>> {
        for slot in &mut self.slots {
            slot.flush()?;
        }
        Ok(std::mem::take(&mut self.slots)
            .into_iter()
            .map(|slot| slot.writer)
            .collect())
    }

    /// Flush and release every slot.
    ///
    /// # Errors
    /// Returns `SplitError::Write` for the first slot that fails to flush.
    pub fn close_all(self) -> Result<()> {
        self.into_writers().map(drop)
    }
}

impl<W: Write> Drop for SinkSet<W> {
    fn drop(&mut self) {
        for slot in &mut self.slots {
            if let Err(e) = slot.flush() {
                tracing::warn!(error = %e, "Failed to flush output on release");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn lines(items: &[&str]) -> Vec<Vec<u8>> {
        items.iter().map(|s| s.as_bytes().to_vec()).collect()
    }

    fn text(bytes: &[u8]) -> String {
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_from_writers_rejects_empty() {
        let result = SinkSet::<Vec<u8>>::from_writers(Vec::new());
        assert!(matches!(result, Err(SplitError::InvalidFileCount(0))));
    }

    #[test]
    fn test_header_element_footer_layout() {
        let mut sinks = SinkSet::from_writers(vec![Vec::<u8>::new(), Vec::new()]).unwrap();
        sinks.write_header(&lines(&["<root>"])).unwrap();
        sinks.write_element(1, &lines(&["<item>", "B", "</item>"])).unwrap();
        sinks.write_footer(&lines(&["</root>"])).unwrap();

        assert!(sinks.slots().iter().all(Slot::header_written));
        assert_eq!(sinks.slots()[0].elements_written(), 0);
        assert_eq!(sinks.slots()[1].elements_written(), 1);
        assert_eq!(sinks.slots()[1].lines_written(), 5);

        let writers = sinks.into_writers().unwrap();
        assert_eq!(text(&writers[0]), "<root>\n</root>\n");
        assert_eq!(text(&writers[1]), "<root>\n<item>\nB\n</item>\n</root>\n");
    }

    #[test]
    fn test_write_lines_incrementally() {
        let mut sinks = SinkSet::from_writers(vec![Vec::<u8>::new()]).unwrap();
        sinks.write_lines(0, &lines(&["a"])).unwrap();
        sinks.write_lines(0, &lines(&["b", "c"])).unwrap();
        sinks.write_lines(0, &[]).unwrap();

        let writers = sinks.into_writers().unwrap();
        assert_eq!(text(&writers[0]), "a\nb\nc\n");
    }

    #[test]
    fn test_in_memory_labels() {
        let sinks = SinkSet::from_writers(vec![Vec::<u8>::new(), Vec::new()]).unwrap();
        assert_eq!(
            sinks.paths(),
            vec![PathBuf::from("slot-00"), PathBuf::from("slot-01")]
        );
        assert_eq!(sinks.len(), 2);
        assert!(!sinks.is_empty());
    }

    #[test]
    fn test_create_names_files_deterministically() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("nested").join("out");

        let sinks = SinkSet::create(3, &out, "records", Some("xml")).unwrap();
        assert_eq!(
            sinks.paths(),
            vec![
                out.join("records_00.xml"),
                out.join("records_01.xml"),
                out.join("records_02.xml"),
            ]
        );
        sinks.close_all().unwrap();

        for i in 0..3 {
            let path = out.join(format!("records_{i:02}.xml"));
            assert!(path.exists());
            assert_eq!(fs::read_to_string(path).unwrap(), "");
        }
    }

    #[test]
    fn test_create_rejects_zero() {
        let dir = tempdir().unwrap();
        let result = SinkSet::create(0, dir.path(), "records", Some("xml"));
        assert!(matches!(result, Err(SplitError::InvalidFileCount(0))));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_create_fails_when_directory_is_a_file() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();

        let result = SinkSet::create(2, &blocker.join("out"), "records", Some("xml"));
        assert!(matches!(result, Err(SplitError::OutputDirectory { .. })));
    }

    #[test]
    fn test_create_failure_removes_earlier_files() {
        let dir = tempdir().unwrap();
        // A directory where the second file should go makes File::create fail
        fs::create_dir_all(dir.path().join("data_01.xml")).unwrap();

        let err = SinkSet::create(3, dir.path(), "data", Some("xml")).unwrap_err();
        assert!(matches!(err, SplitError::Create { .. }));
        assert!(err.to_string().contains("data_01.xml"));
        assert!(!dir.path().join("data_00.xml").exists());
        assert!(!dir.path().join("data_02.xml").exists());
    }

    #[test]
    fn test_raw_bytes_written_unchanged() {
        let mut sinks = SinkSet::from_writers(vec![Vec::<u8>::new()]).unwrap();
        sinks
            .write_element(0, &[b"<item>caf\xe9</item>".to_vec()])
            .unwrap();

        let writers = sinks.into_writers().unwrap();
        assert_eq!(writers[0], b"<item>caf\xe9</item>\n");
    }

    #[test]
    fn test_drop_flushes_buffered_output() {
        let dir = tempdir().unwrap();
        {
            let mut sinks = SinkSet::create(1, dir.path(), "data", Some("xml")).unwrap();
            sinks.write_header(&lines(&["<root>"])).unwrap();
        }
        assert_eq!(
            fs::read_to_string(dir.path().join("data_00.xml")).unwrap(),
            "<root>\n"
        );
    }

    #[test]
    fn test_discard_removes_files() {
        let dir = tempdir().unwrap();
        let mut sinks = SinkSet::create(2, dir.path(), "data", None).unwrap();
        sinks.write_header(&lines(&["<root>"])).unwrap();
        let paths = sinks.paths();

        sinks.discard();
        assert!(paths.iter().all(|p| !p.exists()));
    }

    #[test]
    fn test_write_failure_names_slot() {
        struct FailingWriter;

        impl Write for FailingWriter {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("disk full"))
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut sinks = SinkSet::from_writers(vec![FailingWriter]).unwrap();
        let err = sinks.write_element(0, &lines(&["<item/>"])).unwrap_err();
        assert!(matches!(err, SplitError::Write { .. }));
        assert!(err.to_string().contains("slot-00"));
        assert_eq!(sinks.slots()[0].elements_written(), 0);
    }
}
