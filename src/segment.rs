//! Segment descriptor files and their chronological ordering.
//!
//! Every index segment is described by a `<id>.ix` file in the segment
//! directory, where `<id>` is a chronological identifier: the number of
//! 100 ns ticks elapsed since [`BEGINNING_OF_TIME_UNIX_SECS`]. Ordering the
//! descriptors by that id yields the order in which segments were written.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Extension of segment descriptor files
pub const INDEX_FILE_EXTENSION: &str = "ix";

/// 2016-04-23T00:00:00Z, the zero point of chronological ids
pub const BEGINNING_OF_TIME_UNIX_SECS: u64 = 1_461_369_600;

const NANOS_PER_TICK: u128 = 100;

#[derive(Error, Debug)]
pub enum SegmentError {
    #[error("segment file name is not valid UTF-8: {0}")]
    NonUtf8FileName(PathBuf),

    #[error("segment file {path} does not carry a numeric id")]
    InvalidFileId {
        path: PathBuf,
        #[source]
        source: ParseIntError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, SegmentError>;

/// Descriptor of one on-disk segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IxInfo {
    pub version: u32,
    pub segment_id: u64,
    pub document_count: usize,
}

impl IxInfo {
    pub const VERSION: u32 = 1;

    pub fn new(segment_id: u64, document_count: usize) -> Self {
        Self {
            version: Self::VERSION,
            segment_id,
            document_count,
        }
    }

    /// Path of this descriptor inside `directory`
    pub fn path_in<P: AsRef<Path>>(&self, directory: P) -> PathBuf {
        directory
            .as_ref()
            .join(format!("{}.{}", self.segment_id, INDEX_FILE_EXTENSION))
    }

    pub fn save<P: AsRef<Path>>(&self, directory: P) -> Result<PathBuf> {
        let path = self.path_in(directory);
        let mut writer = BufWriter::new(File::create(&path)?);
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;
        Ok(path)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(bincode::deserialize_from(reader)?)
    }
}

fn index_file_names<P: AsRef<Path>>(directory: P) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        let is_descriptor = path.is_file()
            && path.extension().map_or(false, |ext| ext == INDEX_FILE_EXTENSION);
        if is_descriptor {
            paths.push(path);
        }
    }
    Ok(paths)
}

/// Parse the chronological id out of a descriptor path.
pub fn parse_segment_id(path: &Path) -> Result<u64> {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| SegmentError::NonUtf8FileName(path.to_path_buf()))?;

    stem.parse().map_err(|source| SegmentError::InvalidFileId {
        path: path.to_path_buf(),
        source,
    })
}

/// All descriptor files in `directory`, oldest first.
///
/// A descriptor whose name is not a number means the directory is corrupt;
/// the whole listing fails rather than skipping it.
pub fn index_file_names_in_chronological_order<P: AsRef<Path>>(directory: P) -> Result<Vec<PathBuf>> {
    let mut ids = index_file_names(&directory)?
        .into_iter()
        .map(|path| parse_segment_id(&path).map(|id| (id, path)))
        .collect::<Result<Vec<_>>>()?;

    ids.sort_by_key(|(id, _)| *id);

    tracing::debug!(
        directory = %directory.as_ref().display(),
        segments = ids.len(),
        "listed segment descriptors"
    );

    Ok(ids.into_iter().map(|(_, path)| path).collect())
}

/// Sum of `document_count` over every descriptor in `directory`.
///
/// A document rewritten in a later segment is counted once per segment it
/// appears in. Callers that need the number of distinct documents must
/// deduplicate by document id themselves.
pub fn document_count<P: AsRef<Path>>(directory: P) -> Result<usize> {
    let infos = index_file_names_in_chronological_order(directory)?
        .iter()
        .map(IxInfo::load)
        .collect::<Result<Vec<_>>>()?;

    Ok(document_count_of(&infos))
}

/// Sum of `document_count` over already loaded descriptors, with the same
/// per-segment double counting as [`document_count`].
pub fn document_count_of(infos: &[IxInfo]) -> usize {
    infos.iter().map(|info| info.document_count).sum()
}

/// Source of wall-clock time for id generation
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(SystemTime);

impl FixedClock {
    pub fn new(now: SystemTime) -> Self {
        Self(now)
    }

    /// Clock frozen `ticks` chronological ticks after the epoch
    pub fn at_ticks(ticks: u64) -> Self {
        Self(beginning_of_time() + Duration::from_nanos(ticks * NANOS_PER_TICK as u64))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        self.0
    }
}

pub fn beginning_of_time() -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(BEGINNING_OF_TIME_UNIX_SECS)
}

/// Produces ids for new segments
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> u64;
}

/// Ids derived purely from the clock.
///
/// Two calls within the same tick return the same id; wrap it in a
/// [`MonotonicIdGenerator`] when ids must be unique.
#[derive(Debug, Clone, Default)]
pub struct ChronologicalIdGenerator<C = SystemClock> {
    clock: C,
}

impl<C: Clock> ChronologicalIdGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for ChronologicalIdGenerator<C> {
    fn next_id(&self) -> u64 {
        // Clocks set before the epoch collapse to id 0.
        let elapsed = self
            .clock
            .now()
            .duration_since(beginning_of_time())
            .unwrap_or_default();
        (elapsed.as_nanos() / NANOS_PER_TICK) as u64
    }
}

/// Wraps another generator and never hands out the same or a smaller id
/// twice within this process.
#[derive(Debug, Default)]
pub struct MonotonicIdGenerator<G> {
    inner: G,
    last: AtomicU64,
}

impl<G: IdGenerator> MonotonicIdGenerator<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            last: AtomicU64::new(0),
        }
    }
}

impl<G: IdGenerator> IdGenerator for MonotonicIdGenerator<G> {
    fn next_id(&self) -> u64 {
        let candidate = self.inner.next_id();
        let previous = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(candidate.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        candidate.max(previous + 1)
    }
}
