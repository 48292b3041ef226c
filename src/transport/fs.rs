use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::constants::reporting::LOG_TARGET;
use crate::data::ResourceRecord;
use crate::errors::MonitorError;
use crate::feed::{FeedCapability, ResourceFeed, Subscription};

/// Feed over a JSON-lines capture of resource-timing entries.
///
/// Each line holds one record (`{"name": ..., "initiatorType": ...}`). The snapshot
/// is read when the feed is opened; subscriptions tail the file and deliver lines
/// appended after that point.
pub struct JsonLinesFeed {
    path: PathBuf,
    loaded: Vec<ResourceRecord>,
    snapshot_end: LinePosition,
}

/// Read position inside a capture: byte offset plus lines consumed before it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct LinePosition {
    offset: u64,
    line: usize,
}

impl JsonLinesFeed {
    /// Open `path` and decode every complete line as the initial snapshot.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, MonitorError> {
        let path = path.into();
        let mut file = File::open(&path)?;
        let (loaded, snapshot_end) = read_complete_lines(&mut file, LinePosition::default())?;
        debug!(
            target: LOG_TARGET,
            path = %path.display(),
            records = loaded.len(),
            "opened resource capture"
        );
        Ok(Self {
            path,
            loaded,
            snapshot_end,
        })
    }

    /// Capture file backing this feed.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResourceFeed for JsonLinesFeed {
    fn loaded_resources(&self) -> Vec<ResourceRecord> {
        self.loaded.clone()
    }

    fn subscribe(&self) -> Result<Box<dyn Subscription>, MonitorError> {
        if !self.path.is_file() {
            return Err(MonitorError::SubscriptionFailed {
                reason: format!("capture '{}' is no longer readable", self.path.display()),
            });
        }
        Ok(Box::new(TailSubscription {
            path: self.path.clone(),
            position: self.snapshot_end,
            cancelled: false,
        }))
    }
}

/// Probe for a file-backed feed; a missing or unreadable file is `Unavailable`.
pub fn file_capability(path: impl AsRef<Path>) -> FeedCapability {
    match JsonLinesFeed::open(path.as_ref()) {
        Ok(feed) => FeedCapability::available(feed),
        Err(err) => FeedCapability::unavailable(err.to_string()),
    }
}

/// Subscription that re-reads a capture from the last consumed byte offset.
///
/// A capture that shrinks below that offset was truncated or rotated and is read
/// again from the start.
struct TailSubscription {
    path: PathBuf,
    position: LinePosition,
    cancelled: bool,
}

impl Subscription for TailSubscription {
    fn next_batch(&mut self) -> Option<Vec<ResourceRecord>> {
        if self.cancelled {
            return None;
        }
        match self.poll() {
            Ok((records, position)) => {
                self.position = position;
                (!records.is_empty()).then_some(records)
            }
            Err(err) => {
                debug!(
                    target: LOG_TARGET,
                    path = %self.path.display(),
                    error = %err,
                    "resource capture poll failed"
                );
                None
            }
        }
    }

    fn cancel(&mut self) {
        self.cancelled = true;
    }
}

impl TailSubscription {
    fn poll(&mut self) -> Result<(Vec<ResourceRecord>, LinePosition), MonitorError> {
        let mut file = File::open(&self.path)?;
        let len = file.metadata()?.len();
        if len < self.position.offset {
            debug!(
                target: LOG_TARGET,
                path = %self.path.display(),
                len,
                offset = self.position.offset,
                "resource capture shrank; reading from the start"
            );
            self.position = LinePosition::default();
        }
        read_complete_lines(&mut file, self.position)
    }
}

/// Decode every newline-terminated line after `start`.
///
/// A trailing line without a newline is still being written and is left for the
/// next read. Lines that are not valid UTF-8 or not a record are skipped. Returns
/// the records plus the position after the last complete line.
fn read_complete_lines(
    file: &mut File,
    start: LinePosition,
) -> Result<(Vec<ResourceRecord>, LinePosition), MonitorError> {
    file.seek(SeekFrom::Start(start.offset))?;
    let mut reader = BufReader::new(file);
    let mut records = Vec::new();
    let mut position = start;
    let mut line = Vec::new();
    loop {
        line.clear();
        let read = reader.read_until(b'\n', &mut line)?;
        if read == 0 || line.last() != Some(&b'\n') {
            break;
        }
        position.offset += read as u64;
        position.line += 1;
        if line.trim_ascii().is_empty() {
            continue;
        }
        match decode_line(&line, position.line) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(target: LOG_TARGET, error = %err, "skipping undecodable resource line");
            }
        }
    }
    Ok((records, position))
}

fn decode_line(line: &[u8], line_no: usize) -> Result<ResourceRecord, MonitorError> {
    serde_json::from_slice(line).map_err(|source| MonitorError::RecordDecode {
        line: line_no,
        source,
    })
}
