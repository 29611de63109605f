// logtriage - app/tail.rs
//
// Incremental ("tail") reading of a growing log file.
//
// Two pieces:
//   - `TailReader` is the cursor state machine: each `poll` returns the
//     lines appended since the previous poll, holding back a trailing
//     partial line until a later poll completes it. The offset advances
//     by exactly the bytes read each tick; bytes past the final newline
//     are carried in an in-memory partial buffer, so a line longer than
//     the per-tick read cap is assembled across polls instead of
//     stalling the cursor. Truncation or rotation (size decrease)
//     resets the cursor to the start of the new content. Not
//     thread-safe by design: one reader per file, polled by one caller.
//   - `TailManager` runs a `TailReader` on a background thread with a
//     fixed poll interval, classifies new lines, and streams
//     `TailProgress` events to the front-end over an mpsc channel. An
//     `Arc<AtomicBool>` cancel flag stops it; the poll sleep is
//     sub-divided so cancellation is observed promptly.
//
// Transient file errors (stat/read failure, file momentarily missing
// during rotation) are non-fatal in the managed loop: a FileError event
// is sent and the next tick retries, since log rotation tools commonly
// recreate the file.

use crate::core::classify::RuleSet;
use crate::core::model::ClassifiedLine;
use crate::platform::fs;
use crate::util::constants::{
    MAX_TAIL_PARTIAL_BYTES, MAX_TAIL_READ_BYTES_PER_TICK, TAIL_CANCEL_CHECK_INTERVAL_MS,
};
use crate::util::error::{Result, TriageError};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

// =============================================================================
// Read cursor
// =============================================================================

/// Position state for an incremental read session. In-memory only;
/// discarded when the session ends.
///
/// Invariant: `offset <= last_size`. If the file shrinks below
/// `offset`, the next poll resets `offset` to 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadCursor {
    /// Byte position of the last byte examined. Advances by exactly the
    /// number of bytes read each tick, whether or not those bytes
    /// completed a line; the unterminated remainder lives in the
    /// reader's partial buffer.
    pub offset: u64,

    /// File size observed on the most recent poll.
    pub last_size: u64,
}

// =============================================================================
// TailReader
// =============================================================================

/// Stateful incremental reader over a single file.
#[derive(Debug)]
pub struct TailReader {
    path: PathBuf,
    cursor: ReadCursor,
    /// Bytes already consumed from the file that followed the final
    /// newline -- an in-progress line. Kept as raw bytes so the lossy
    /// decode never straddles a poll boundary. Bounded by
    /// `MAX_TAIL_PARTIAL_BYTES`.
    partial: Vec<u8>,
}

impl TailReader {
    /// Start a tail session at the beginning of the file: the first
    /// poll returns all complete lines currently present.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cursor: ReadCursor::default(),
            partial: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cursor(&self) -> ReadCursor {
        self.cursor
    }

    /// Return the lines newly completed since the last poll (possibly
    /// empty). A trailing line not yet terminated by `\n` is withheld
    /// until a later poll completes it.
    ///
    /// Fails with an I/O error if the file cannot be stat'ed or read
    /// (e.g. it disappeared between polls); the caller decides whether
    /// to retry or abort.
    pub fn poll(&mut self) -> Result<Vec<String>> {
        let size = fs::file_size(&self.path)
            .map_err(|e| TriageError::io(&self.path, "stat tailed file", e))?;

        if size < self.cursor.last_size {
            tracing::info!(
                file = %self.path.display(),
                old_offset = self.cursor.offset,
                new_size = size,
                "Tail: file truncated or rotated, resetting offset to 0"
            );
            self.cursor.offset = 0;
            self.partial.clear();
        }
        self.cursor.last_size = size;

        if size <= self.cursor.offset {
            return Ok(Vec::new());
        }

        // Cap the bytes consumed per poll; the remainder is picked up
        // on subsequent polls.
        let available = (size - self.cursor.offset) as usize;
        let limit = available.min(MAX_TAIL_READ_BYTES_PER_TICK);
        let bytes = fs::read_bytes_at(&self.path, self.cursor.offset, limit)
            .map_err(|e| TriageError::io(&self.path, "read tailed file", e))?;
        if bytes.is_empty() {
            return Ok(Vec::new());
        }

        // Advance unconditionally: these bytes are consumed whether or
        // not they completed a line. A line longer than one read cap is
        // assembled in the partial buffer across ticks.
        self.cursor.offset += bytes.len() as u64;
        self.partial.extend_from_slice(&bytes);

        let Some(last_nl) = self.partial.iter().rposition(|&b| b == b'\n') else {
            // No complete line yet. Bound the buffer so a newline-free
            // file (binary content, one enormous line) cannot grow it
            // without limit; the fragment is abandoned with a warning.
            if self.partial.len() > MAX_TAIL_PARTIAL_BYTES {
                tracing::warn!(
                    file = %self.path.display(),
                    bytes = self.partial.len(),
                    "Tail: discarding oversized unterminated line fragment"
                );
                self.partial.clear();
            }
            return Ok(Vec::new());
        };

        // Split at the final newline *before* decoding, so a lossy
        // decode never straddles a poll boundary.
        let remainder = self.partial.split_off(last_nl + 1);
        let complete = std::mem::replace(&mut self.partial, remainder);

        let text = String::from_utf8_lossy(&complete);
        Ok(text.lines().map(str::to_string).collect())
    }
}

// =============================================================================
// Managed background tail
// =============================================================================

/// Progress messages sent from the tail thread to the front-end.
#[derive(Debug, Clone)]
pub enum TailProgress {
    /// The watcher thread is running.
    Started,

    /// Newly completed lines, already classified.
    NewLines { lines: Vec<ClassifiedLine> },

    /// A non-fatal error on this tick; the watcher retries next tick.
    FileError { path: PathBuf, message: String },

    /// The watcher observed the cancel flag and exited.
    Stopped,
}

/// Manages a live tail on a background thread.
///
/// Lives on the front-end side and exposes a start/stop/poll interface;
/// the front-end drains `poll_progress` on its own cadence.
pub struct TailManager {
    progress_rx: Option<mpsc::Receiver<TailProgress>>,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl TailManager {
    pub fn new() -> Self {
        Self {
            progress_rx: None,
            cancel_flag: None,
        }
    }

    /// Start tailing `path` from the beginning of the file. If a tail
    /// is already running it is stopped first.
    pub fn start(&mut self, path: PathBuf, rules: RuleSet, poll_interval_ms: u64) {
        self.stop();

        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));

        self.progress_rx = Some(rx);
        self.cancel_flag = Some(Arc::clone(&cancel));

        tracing::info!(file = %path.display(), interval_ms = poll_interval_ms, "Live tail started");

        std::thread::spawn(move || {
            run_tail_watcher(TailReader::new(path), rules, poll_interval_ms, tx, cancel);
        });
    }

    /// Request the background tail thread to stop.
    ///
    /// The thread exits within `TAIL_CANCEL_CHECK_INTERVAL_MS` and
    /// sends `TailProgress::Stopped` before terminating.
    pub fn stop(&mut self) {
        if let Some(flag) = &self.cancel_flag {
            flag.store(true, Ordering::SeqCst);
        }
        self.cancel_flag = None;
        self.progress_rx = None;
    }

    /// Returns `true` if a tail background thread is currently active.
    pub fn is_active(&self) -> bool {
        self.cancel_flag.is_some()
    }

    /// Drain all currently queued progress messages without blocking.
    pub fn poll_progress(&self) -> Vec<TailProgress> {
        let mut messages = Vec::new();
        if let Some(ref rx) = self.progress_rx {
            while let Ok(msg) = rx.try_recv() {
                messages.push(msg);
            }
        }
        messages
    }

    /// Block until the next progress message, with a timeout. Used by
    /// the CLI follow loop, which has nothing else to do between events.
    pub fn recv_progress_timeout(&self, timeout: Duration) -> Option<TailProgress> {
        self.progress_rx
            .as_ref()
            .and_then(|rx| rx.recv_timeout(timeout).ok())
    }
}

impl Default for TailManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Background poll loop. Runs until cancelled; it has no internal
/// timeout or terminal state of its own.
fn run_tail_watcher(
    mut reader: TailReader,
    rules: RuleSet,
    poll_interval_ms: u64,
    tx: mpsc::Sender<TailProgress>,
    cancel: Arc<AtomicBool>,
) {
    macro_rules! send {
        ($msg:expr) => {
            if tx.send($msg).is_err() {
                // Front-end channel closed -- exit silently.
                return;
            }
        };
    }

    send!(TailProgress::Started);

    // Sub-divide each poll interval into cancel-check slices.
    let slices = (poll_interval_ms / TAIL_CANCEL_CHECK_INTERVAL_MS).max(1);

    loop {
        // Interruptible sleep: check cancel flag between slices.
        for _ in 0..slices {
            std::thread::sleep(Duration::from_millis(TAIL_CANCEL_CHECK_INTERVAL_MS));
            if cancel.load(Ordering::SeqCst) {
                send!(TailProgress::Stopped);
                return;
            }
        }

        match reader.poll() {
            Ok(lines) if lines.is_empty() => {}
            Ok(lines) => {
                let classified: Vec<ClassifiedLine> = lines
                    .into_iter()
                    .map(|text| ClassifiedLine {
                        category: rules.classify(&text),
                        text,
                    })
                    .collect();
                tracing::debug!(
                    file = %reader.path().display(),
                    count = classified.len(),
                    "Tail: new lines"
                );
                send!(TailProgress::NewLines { lines: classified });
            }
            Err(e) => {
                // Retry next tick: rotation tools may recreate the file.
                tracing::warn!(file = %reader.path().display(), error = %e, "Tail: poll error");
                send!(TailProgress::FileError {
                    path: reader.path().to_path_buf(),
                    message: e.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;
    use std::io::Write;

    fn append(path: &Path, data: &str) {
        let mut f = OpenOptions::new().append(true).open(path).unwrap();
        f.write_all(data.as_bytes()).unwrap();
    }

    #[test]
    fn poll_returns_lines_per_burst() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grow.log");
        std::fs::write(&path, "").unwrap();

        let mut reader = TailReader::new(&path);
        assert!(reader.poll().unwrap().is_empty());

        append(&path, "line1\n");
        assert_eq!(reader.poll().unwrap(), vec!["line1"]);

        append(&path, "line2\nline3\n");
        assert_eq!(reader.poll().unwrap(), vec!["line2", "line3"]);

        // Nothing new.
        assert!(reader.poll().unwrap().is_empty());
    }

    #[test]
    fn partial_line_is_withheld_until_completed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grow.log");
        std::fs::write(&path, "done\npart").unwrap();

        let mut reader = TailReader::new(&path);
        assert_eq!(reader.poll().unwrap(), vec!["done"]);
        // The unterminated "part" is held back.
        assert!(reader.poll().unwrap().is_empty());

        append(&path, "ial\nnext\n");
        assert_eq!(reader.poll().unwrap(), vec!["partial", "next"]);
    }

    #[test]
    fn truncation_resets_to_start_of_new_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rotate.log");
        std::fs::write(&path, "old1\nold2\nold3\n").unwrap();

        let mut reader = TailReader::new(&path);
        assert_eq!(reader.poll().unwrap().len(), 3);

        // Rewritten smaller than the prior offset.
        std::fs::write(&path, "fresh\n").unwrap();
        assert_eq!(reader.poll().unwrap(), vec!["fresh"]);
        assert_eq!(reader.cursor().offset, 6);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.log");
        std::fs::write(&path, "aaaa\n").unwrap();

        let mut reader = TailReader::new(&path);
        assert_eq!(reader.poll().unwrap(), vec!["aaaa"]);

        std::fs::remove_file(&path).unwrap();
        let err = reader.poll().unwrap_err();
        assert!(matches!(err, TriageError::Io { .. }), "got {err:?}");

        // Recreated smaller: the reset path fires and polling resumes.
        std::fs::write(&path, "b\n").unwrap();
        assert_eq!(reader.poll().unwrap(), vec!["b"]);
    }

    #[test]
    fn crlf_terminators_are_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crlf.log");
        std::fs::write(&path, "one\r\ntwo\r\n").unwrap();

        let mut reader = TailReader::new(&path);
        assert_eq!(reader.poll().unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn line_longer_than_read_cap_spans_multiple_polls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.log");

        // One line wider than a single read cap, then a short one.
        let big = "x".repeat(MAX_TAIL_READ_BYTES_PER_TICK + 1024);
        std::fs::write(&path, format!("{big}\nline2\n")).unwrap();

        let mut reader = TailReader::new(&path);
        let mut lines = Vec::new();
        for _ in 0..4 {
            lines.extend(reader.poll().unwrap());
            if lines.len() >= 2 {
                break;
            }
        }

        assert_eq!(lines, vec![big.clone(), "line2".to_string()]);
        assert_eq!(reader.cursor().offset, (big.len() + 1 + 6) as u64);
    }

    #[test]
    fn oversized_newline_free_fragment_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.log");

        // Newline-free blob past the partial-buffer bound.
        let blob = "y".repeat(MAX_TAIL_PARTIAL_BYTES + MAX_TAIL_READ_BYTES_PER_TICK);
        std::fs::write(&path, &blob).unwrap();

        let mut reader = TailReader::new(&path);
        for _ in 0..8 {
            assert!(reader.poll().unwrap().is_empty());
        }
        // The whole blob has been consumed.
        assert_eq!(reader.cursor().offset, blob.len() as u64);

        // Later terminated content still comes through.
        append(&path, "end\n");
        assert_eq!(reader.poll().unwrap(), vec!["end"]);
    }

    #[test]
    fn manager_streams_classified_lines_and_stops() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("live.log");
        std::fs::write(&path, "ERROR: boom\n").unwrap();

        let mut manager = TailManager::new();
        manager.start(
            path.clone(),
            RuleSet::builtin(),
            crate::util::constants::MIN_TAIL_POLL_INTERVAL_MS,
        );
        assert!(manager.is_active());

        let mut classified = Vec::new();
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while classified.is_empty() && std::time::Instant::now() < deadline {
            if let Some(msg) = manager.recv_progress_timeout(Duration::from_millis(200)) {
                if let TailProgress::NewLines { lines } = msg {
                    classified.extend(lines);
                }
            }
        }

        assert_eq!(classified.len(), 1);
        assert_eq!(classified[0].text, "ERROR: boom");
        assert_eq!(classified[0].category, crate::core::model::Category::Error);

        manager.stop();
        assert!(!manager.is_active());
    }
}
