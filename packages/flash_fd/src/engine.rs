use std::io::SeekFrom;

use crate::{EngineError, OpenFlags};

/// A filesystem engine that [`Storage`][crate::Storage] delegates to.
///
/// The engine owns the actual on-media filesystem logic: how bytes are laid
/// out, wear-leveled and recovered is entirely its business. This crate adds
/// the descriptor table, the reserved standard streams and the path-level
/// convenience operations on top, calling down through this trait.
///
/// `File` and `Dir` are whatever per-handle state the engine needs. The
/// storage layer keeps them in its handle table and hands them back on every
/// call; it never inspects them. The bounds are deliberately minimal so an
/// engine wrapping C driver state can use that state directly.
///
/// Implementations can assume a strict call order: every `File` or `Dir`
/// value passed in was previously returned by [`open()`][Self::open] or
/// [`open_dir()`][Self::open_dir] on the same engine and has not been passed
/// to [`close()`][Self::close] or [`close_dir()`][Self::close_dir] yet.
pub trait StorageEngine {
    /// Per-handle state for an open file.
    type File;

    /// Per-handle state for an open directory listing.
    type Dir;

    /// Brings an existing filesystem into a usable state.
    ///
    /// Failing with [`EngineError::Corrupt`] signals that the media holds no
    /// mountable filesystem; [`Storage::mount_or_format()`][crate::Storage::mount_or_format]
    /// reacts to any mount failure by formatting and retrying.
    fn mount(&mut self) -> Result<(), EngineError>;

    /// Flushes all state and detaches from the media. The engine must not
    /// be used again until the next [`mount()`][Self::mount].
    fn unmount(&mut self) -> Result<(), EngineError>;

    /// Writes a fresh, empty filesystem to the media, destroying whatever
    /// was there. Called only while unmounted.
    fn format(&mut self) -> Result<(), EngineError>;

    /// Opens the file at `path` according to `flags`.
    fn open(&mut self, path: &str, flags: OpenFlags) -> Result<Self::File, EngineError>;

    /// Closes an open file, flushing any buffered writes.
    fn close(&mut self, file: Self::File) -> Result<(), EngineError>;

    /// Reads up to `buffer.len()` bytes at the file's cursor, returning how
    /// many bytes were read. Zero means end of file (unless the buffer is
    /// empty).
    fn read(&mut self, file: &mut Self::File, buffer: &mut [u8]) -> Result<usize, EngineError>;

    /// Writes up to `buffer.len()` bytes at the file's cursor (or at the end
    /// of the file when opened for appending), returning how many bytes were
    /// written.
    fn write(&mut self, file: &mut Self::File, buffer: &[u8]) -> Result<usize, EngineError>;

    /// Moves the file's cursor, returning the new position from the start
    /// of the file.
    fn seek(&mut self, file: &mut Self::File, position: SeekFrom) -> Result<u64, EngineError>;

    /// Opens a directory for listing.
    fn open_dir(&mut self, path: &str) -> Result<Self::Dir, EngineError>;

    /// Closes an open directory listing.
    fn close_dir(&mut self, dir: Self::Dir) -> Result<(), EngineError>;

    /// Returns the next entry of the listing, or `None` once all entries
    /// have been reported.
    fn read_dir(&mut self, dir: &mut Self::Dir) -> Result<Option<FileInfo>, EngineError>;

    /// Removes the file or empty directory at `path`.
    fn remove(&mut self, path: &str) -> Result<(), EngineError>;

    /// Renames or moves the entry at `from` to `to`.
    fn rename(&mut self, from: &str, to: &str) -> Result<(), EngineError>;

    /// Creates a directory at `path`.
    fn make_dir(&mut self, path: &str) -> Result<(), EngineError>;

    /// Reports metadata for the entry at `path`.
    fn stat(&mut self, path: &str) -> Result<FileInfo, EngineError>;

    /// Reports how much of the media is occupied.
    fn usage(&mut self) -> Result<StorageUsage, EngineError>;
}

/// Metadata for one filesystem entry, as reported by
/// [`StorageEngine::stat()`] and by directory listings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileInfo {
    name: String,
    kind: FileKind,
    size: u64,
}

impl FileInfo {
    /// Creates a metadata record.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FileKind, size: u64) -> Self {
        Self {
            name: name.into(),
            kind,
            size,
        }
    }

    /// The entry's name, without any directory components.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the entry is a file or a directory.
    #[must_use]
    pub fn kind(&self) -> FileKind {
        self.kind
    }

    /// The entry's size in bytes. Always zero for directories.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }
}

/// The two kinds of entry a flash filesystem distinguishes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[expect(
    clippy::exhaustive_enums,
    reason = "mirroring the two-kind entry model of flash filesystem APIs"
)]
pub enum FileKind {
    /// A regular file.
    File,

    /// A directory.
    Directory,
}

/// Media occupancy as reported by [`StorageEngine::usage()`].
///
/// Sizes are in bytes. Flash filesystems typically account in whole blocks,
/// so `used_bytes` is an upper bound on live data rather than an exact byte
/// count.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StorageUsage {
    used_bytes: u64,
    total_bytes: u64,
}

impl StorageUsage {
    /// Creates a usage report.
    #[must_use]
    pub const fn new(used_bytes: u64, total_bytes: u64) -> Self {
        Self {
            used_bytes,
            total_bytes,
        }
    }

    /// Bytes currently occupied by filesystem data.
    #[must_use]
    pub const fn used_bytes(&self) -> u64 {
        self.used_bytes
    }

    /// Total capacity of the media in bytes.
    #[must_use]
    pub const fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Bytes still available for new data.
    #[must_use]
    pub const fn free_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.used_bytes)
    }
}
