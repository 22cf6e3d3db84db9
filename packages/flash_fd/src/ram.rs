//! An in-memory [`StorageEngine`] for host-side development and tests.
//!
//! [`RamEngine`] keeps an entire filesystem in a [`BTreeMap`], which makes it
//! deterministic and free of setup: doctests and examples mount it directly
//! instead of talking to real media. It carries none of the flash semantics a
//! production engine has (no wear leveling, no power-loss recovery), but it
//! honors the engine contract strictly: mount state is enforced, open flags
//! behave like [`std::fs::OpenOptions`], directory listings come back in a
//! stable sorted order, and media capacity is accounted in 256-byte blocks so
//! exhaustion and [`usage()`][StorageEngine::usage] behave realistically.
//!
//! # Example
//!
//! ```
//! use flash_fd::ram::RamEngine;
//! use flash_fd::{Storage, StorageError};
//!
//! # fn main() -> Result<(), StorageError> {
//! // A blank medium holds no filesystem yet; mounting formats it first.
//! let mut storage: Storage<RamEngine> = Storage::mount_or_format(RamEngine::unformatted())?;
//!
//! storage.write_file("motd", b"welcome")?;
//! assert_eq!(storage.read_to_vec("motd")?, b"welcome");
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::io::SeekFrom;
use std::vec;

use crate::{EngineError, FileInfo, FileKind, OpenFlags, StorageEngine, StorageUsage};

/// A [`StorageEngine`] that stores its whole filesystem in process memory.
///
/// The engine starts out formatted (an empty filesystem) unless constructed
/// with [`unformatted()`][Self::unformatted], in which case the first mount
/// fails with [`EngineError::Corrupt`] until the media is formatted - the
/// same first-boot sequence a blank flash chip goes through.
///
/// Contents survive unmounting and remounting but not the engine value being
/// dropped; formatting discards them.
#[derive(Debug)]
pub struct RamEngine {
    /// Whether the media holds a filesystem at all. Cleared only by
    /// constructing via `unformatted()`; set by `format()`.
    formatted: bool,

    mounted: bool,

    /// Nominal media size; capacity checks round every entry up to whole
    /// blocks the way flash allocation does.
    capacity_bytes: u64,

    /// Normalized path ("a/b/c", no leading or trailing separator) to entry.
    /// The root directory is implicit and never stored.
    nodes: BTreeMap<String, Node>,
}

#[derive(Debug)]
enum Node {
    File(Vec<u8>),
    Directory,
}

/// Open-file state handed out by [`RamEngine`].
///
/// The handle refers to its file by name. Renaming or removing a file that
/// is still open therefore leaves the handle dangling; operations on it
/// report [`EngineError::NotFound`] from then on.
#[derive(Debug)]
pub struct RamFile {
    path: String,
    cursor: u64,
    flags: OpenFlags,
}

/// Directory-listing state handed out by [`RamEngine`].
///
/// The listing is a snapshot taken when the directory was opened; entries
/// created or removed afterwards do not appear in it.
#[derive(Debug)]
pub struct RamDir {
    entries: vec::IntoIter<FileInfo>,
}

impl RamEngine {
    /// Nominal media capacity used by [`new()`][Self::new]: 64 KiB.
    pub const DEFAULT_CAPACITY_BYTES: u64 = 65_536;

    /// Allocation granularity for capacity accounting. Every entry occupies
    /// at least one block, mirroring how flash filesystems charge for
    /// metadata.
    const BLOCK_BYTES: u64 = 256;

    /// Longest accepted path component, matching common flash filesystem
    /// name limits.
    const NAME_MAX: usize = 255;

    /// Creates a formatted, empty engine with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY_BYTES)
    }

    /// Creates a formatted, empty engine with the given nominal media size.
    ///
    /// Capacity is spent in whole 256-byte blocks, so a partial trailing
    /// block is never usable.
    #[must_use]
    pub fn with_capacity(total_bytes: u64) -> Self {
        Self {
            formatted: true,
            mounted: false,
            capacity_bytes: total_bytes,
            nodes: BTreeMap::new(),
        }
    }

    /// Creates an engine whose media holds no filesystem yet.
    ///
    /// Mounting fails with [`EngineError::Corrupt`] until the media is
    /// formatted, which is exactly the situation
    /// [`Storage::mount_or_format()`][crate::Storage::mount_or_format]
    /// recovers from.
    #[must_use]
    pub fn unformatted() -> Self {
        let mut engine = Self::new();
        engine.formatted = false;
        engine
    }

    fn require_mounted(&self) -> Result<(), EngineError> {
        if self.mounted {
            Ok(())
        } else {
            Err(EngineError::InvalidInput)
        }
    }

    /// Collapses a path to its canonical key form: separators deduplicated,
    /// no leading or trailing separator. The root maps to the empty key.
    fn normalize(path: &str) -> Result<String, EngineError> {
        let mut key = String::new();

        for component in path.split('/') {
            if component.is_empty() {
                continue;
            }
            if component == "." || component == ".." {
                // Relative components are path-resolution logic, which is
                // out of contract for an engine.
                return Err(EngineError::InvalidInput);
            }
            if component.len() > Self::NAME_MAX {
                return Err(EngineError::NameTooLong);
            }

            if !key.is_empty() {
                key.push('/');
            }
            key.push_str(component);
        }

        Ok(key)
    }

    fn parent_of(key: &str) -> &str {
        key.rsplit_once('/').map_or("", |(parent, _)| parent)
    }

    fn leaf_of(key: &str) -> &str {
        key.rsplit_once('/').map_or(key, |(_, leaf)| leaf)
    }

    fn require_parent(&self, key: &str) -> Result<(), EngineError> {
        let parent = Self::parent_of(key);
        if parent.is_empty() {
            // The implicit root.
            return Ok(());
        }

        match self.nodes.get(parent) {
            Some(Node::Directory) => Ok(()),
            Some(Node::File(_)) => Err(EngineError::NotADirectory),
            None => Err(EngineError::NotFound),
        }
    }

    fn has_children(&self, key: &str) -> bool {
        let prefix = format!("{key}/");
        self.nodes.keys().any(|candidate| candidate.starts_with(&prefix))
    }

    /// Direct children of a directory, in lexicographic name order.
    fn children_of(&self, key: &str) -> Vec<FileInfo> {
        let mut entries = Vec::new();

        for (path, node) in &self.nodes {
            let name = if key.is_empty() {
                if path.contains('/') {
                    continue;
                }
                path.as_str()
            } else {
                let Some(name) = path
                    .strip_prefix(key)
                    .and_then(|rest| rest.strip_prefix('/'))
                else {
                    continue;
                };
                if name.is_empty() || name.contains('/') {
                    continue;
                }
                name
            };

            entries.push(match node {
                Node::File(data) => FileInfo::new(name, FileKind::File, length_as_u64(data.len())),
                Node::Directory => FileInfo::new(name, FileKind::Directory, 0),
            });
        }

        entries
    }

    fn blocks_for_length(length: usize) -> u64 {
        length_as_u64(length).div_ceil(Self::BLOCK_BYTES).max(1)
    }

    fn used_blocks(&self) -> u64 {
        self.nodes
            .values()
            .map(|node| match node {
                Node::File(data) => Self::blocks_for_length(data.len()),
                Node::Directory => 1,
            })
            .fold(0_u64, |total, blocks| {
                total
                    .checked_add(blocks)
                    .expect("block counts are bounded by the media capacity")
            })
    }

    fn total_blocks(&self) -> u64 {
        self.capacity_bytes
            .checked_div(Self::BLOCK_BYTES)
            .expect("BLOCK_BYTES is a non-zero constant")
    }

    /// Verifies that one more metadata-sized entry fits on the media.
    fn require_room_for_entry(&self) -> Result<(), EngineError> {
        let prospective = self
            .used_blocks()
            .checked_add(1)
            .expect("block counts are bounded by the media capacity");

        if prospective > self.total_blocks() {
            return Err(EngineError::NoSpace);
        }

        Ok(())
    }

    fn is_inside(candidate: &str, ancestor: &str) -> bool {
        candidate
            .strip_prefix(ancestor)
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl Default for RamEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageEngine for RamEngine {
    type File = RamFile;
    type Dir = RamDir;

    fn mount(&mut self) -> Result<(), EngineError> {
        if self.mounted {
            return Err(EngineError::InvalidInput);
        }
        if !self.formatted {
            return Err(EngineError::Corrupt);
        }

        self.mounted = true;
        Ok(())
    }

    fn unmount(&mut self) -> Result<(), EngineError> {
        self.require_mounted()?;

        self.mounted = false;
        Ok(())
    }

    fn format(&mut self) -> Result<(), EngineError> {
        if self.mounted {
            return Err(EngineError::InvalidInput);
        }

        self.nodes.clear();
        self.formatted = true;
        Ok(())
    }

    fn open(&mut self, path: &str, flags: OpenFlags) -> Result<RamFile, EngineError> {
        self.require_mounted()?;

        if !flags.is_read() && !flags.is_write() {
            return Err(EngineError::InvalidInput);
        }
        // Every flag that modifies the file implies write access.
        if (flags.is_truncate() || flags.is_create() || flags.is_create_new() || flags.is_append())
            && !flags.is_write()
        {
            return Err(EngineError::InvalidInput);
        }

        let key = Self::normalize(path)?;
        if key.is_empty() {
            return Err(EngineError::IsADirectory);
        }

        let missing = match self.nodes.get_mut(&key) {
            Some(Node::Directory) => return Err(EngineError::IsADirectory),
            Some(Node::File(data)) => {
                if flags.is_create_new() {
                    return Err(EngineError::AlreadyExists);
                }
                if flags.is_truncate() {
                    data.clear();
                }
                false
            }
            None => true,
        };

        if missing {
            if !flags.is_create() && !flags.is_create_new() {
                return Err(EngineError::NotFound);
            }
            self.require_parent(&key)?;
            self.require_room_for_entry()?;
            self.nodes.insert(key.clone(), Node::File(Vec::new()));
        }

        Ok(RamFile {
            path: key,
            cursor: 0,
            flags,
        })
    }

    fn close(&mut self, file: RamFile) -> Result<(), EngineError> {
        self.require_mounted()?;

        // Writes land in the node map as they are made; there is nothing
        // left to flush.
        drop(file);
        Ok(())
    }

    fn read(&mut self, file: &mut RamFile, buffer: &mut [u8]) -> Result<usize, EngineError> {
        self.require_mounted()?;

        if !file.flags.is_read() {
            return Err(EngineError::InvalidInput);
        }

        let data = match self.nodes.get(&file.path) {
            Some(Node::File(data)) => data,
            Some(Node::Directory) => return Err(EngineError::IsADirectory),
            None => return Err(EngineError::NotFound),
        };

        let Ok(start) = usize::try_from(file.cursor) else {
            // A cursor beyond addressable memory is necessarily past the end.
            return Ok(0);
        };

        let remaining = data.get(start..).unwrap_or_default();
        let count = remaining.len().min(buffer.len());

        let (filled, _) = buffer.split_at_mut(count);
        filled.copy_from_slice(
            remaining
                .get(..count)
                .expect("count is bounded by the remaining length"),
        );

        file.cursor = file
            .cursor
            .checked_add(length_as_u64(count))
            .expect("the cursor stays within a file that fits in memory");

        Ok(count)
    }

    fn write(&mut self, file: &mut RamFile, buffer: &[u8]) -> Result<usize, EngineError> {
        self.require_mounted()?;

        if !file.flags.is_write() {
            return Err(EngineError::InvalidInput);
        }

        let current_length = match self.nodes.get(&file.path) {
            Some(Node::File(data)) => data.len(),
            Some(Node::Directory) => return Err(EngineError::IsADirectory),
            None => return Err(EngineError::NotFound),
        };

        let write_at = if file.flags.is_append() {
            current_length
        } else {
            usize::try_from(file.cursor).map_err(|_overflow| EngineError::FileTooLarge)?
        };

        let end = write_at
            .checked_add(buffer.len())
            .ok_or(EngineError::FileTooLarge)?;
        let new_length = current_length.max(end);

        // Capacity check before touching the data: a write either fits in
        // whole or is rejected.
        let prospective = self
            .used_blocks()
            .checked_sub(Self::blocks_for_length(current_length))
            .expect("the used total includes this file's blocks")
            .checked_add(Self::blocks_for_length(new_length))
            .expect("block counts are bounded by the media capacity");
        if prospective > self.total_blocks() {
            return Err(EngineError::NoSpace);
        }

        let Some(Node::File(data)) = self.nodes.get_mut(&file.path) else {
            panic!("the entry was verified to be a file above");
        };

        if data.len() < end {
            // Writing past the end zero-fills the gap, like a sparse write.
            data.resize(end, 0);
        }
        data.get_mut(write_at..end)
            .expect("resized to cover the write range")
            .copy_from_slice(buffer);

        file.cursor = length_as_u64(end);

        Ok(buffer.len())
    }

    fn seek(&mut self, file: &mut RamFile, position: SeekFrom) -> Result<u64, EngineError> {
        self.require_mounted()?;

        let size = match self.nodes.get(&file.path) {
            Some(Node::File(data)) => length_as_u64(data.len()),
            Some(Node::Directory) => return Err(EngineError::IsADirectory),
            None => return Err(EngineError::NotFound),
        };

        let target = match position {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::End(delta) => i128::from(size)
                .checked_add(i128::from(delta))
                .expect("sums of 64-bit values cannot overflow 128 bits"),
            SeekFrom::Current(delta) => i128::from(file.cursor)
                .checked_add(i128::from(delta))
                .expect("sums of 64-bit values cannot overflow 128 bits"),
        };

        // Seeking past the end is allowed; seeking before the start is not.
        file.cursor = u64::try_from(target).map_err(|_negative| EngineError::InvalidInput)?;

        Ok(file.cursor)
    }

    fn open_dir(&mut self, path: &str) -> Result<RamDir, EngineError> {
        self.require_mounted()?;

        let key = Self::normalize(path)?;
        if !key.is_empty() {
            match self.nodes.get(&key) {
                Some(Node::Directory) => {}
                Some(Node::File(_)) => return Err(EngineError::NotADirectory),
                None => return Err(EngineError::NotFound),
            }
        }

        Ok(RamDir {
            entries: self.children_of(&key).into_iter(),
        })
    }

    fn close_dir(&mut self, dir: RamDir) -> Result<(), EngineError> {
        self.require_mounted()?;

        drop(dir);
        Ok(())
    }

    fn read_dir(&mut self, dir: &mut RamDir) -> Result<Option<FileInfo>, EngineError> {
        self.require_mounted()?;

        Ok(dir.entries.next())
    }

    fn remove(&mut self, path: &str) -> Result<(), EngineError> {
        self.require_mounted()?;

        let key = Self::normalize(path)?;
        if key.is_empty() {
            return Err(EngineError::InvalidInput);
        }

        match self.nodes.get(&key) {
            Some(Node::Directory) if self.has_children(&key) => {
                Err(EngineError::DirectoryNotEmpty)
            }
            Some(_) => {
                self.nodes.remove(&key);
                Ok(())
            }
            None => Err(EngineError::NotFound),
        }
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<(), EngineError> {
        self.require_mounted()?;

        let from_key = Self::normalize(from)?;
        let to_key = Self::normalize(to)?;
        if from_key.is_empty() || to_key.is_empty() {
            return Err(EngineError::InvalidInput);
        }

        let source_is_dir = match self.nodes.get(&from_key) {
            Some(Node::Directory) => true,
            Some(Node::File(_)) => false,
            None => return Err(EngineError::NotFound),
        };

        if from_key == to_key {
            return Ok(());
        }
        if source_is_dir && Self::is_inside(&to_key, &from_key) {
            // A directory cannot move into its own subtree.
            return Err(EngineError::InvalidInput);
        }

        self.require_parent(&to_key)?;

        match self.nodes.get(&to_key) {
            None => {}
            Some(Node::File(_)) => {
                if source_is_dir {
                    return Err(EngineError::NotADirectory);
                }
                // A file rename replaces an existing file.
            }
            Some(Node::Directory) => {
                if !source_is_dir {
                    return Err(EngineError::IsADirectory);
                }
                if self.has_children(&to_key) {
                    return Err(EngineError::DirectoryNotEmpty);
                }
            }
        }

        self.nodes.remove(&to_key);
        let node = self
            .nodes
            .remove(&from_key)
            .expect("presence was verified above");
        self.nodes.insert(to_key.clone(), node);

        if source_is_dir {
            let prefix = format!("{from_key}/");
            let moved: Vec<String> = self
                .nodes
                .keys()
                .filter(|key| key.starts_with(&prefix))
                .cloned()
                .collect();

            for old_key in moved {
                let node = self
                    .nodes
                    .remove(&old_key)
                    .expect("the key was just listed from the map");
                let suffix = old_key
                    .strip_prefix(&prefix)
                    .expect("the key was filtered on the prefix");
                self.nodes.insert(format!("{to_key}/{suffix}"), node);
            }
        }

        Ok(())
    }

    fn make_dir(&mut self, path: &str) -> Result<(), EngineError> {
        self.require_mounted()?;

        let key = Self::normalize(path)?;
        if key.is_empty() {
            // The root always exists.
            return Err(EngineError::AlreadyExists);
        }
        if self.nodes.contains_key(&key) {
            return Err(EngineError::AlreadyExists);
        }

        self.require_parent(&key)?;
        self.require_room_for_entry()?;

        self.nodes.insert(key, Node::Directory);
        Ok(())
    }

    fn stat(&mut self, path: &str) -> Result<FileInfo, EngineError> {
        self.require_mounted()?;

        let key = Self::normalize(path)?;
        if key.is_empty() {
            return Ok(FileInfo::new("/", FileKind::Directory, 0));
        }

        match self.nodes.get(&key) {
            Some(Node::File(data)) => Ok(FileInfo::new(
                Self::leaf_of(&key),
                FileKind::File,
                length_as_u64(data.len()),
            )),
            Some(Node::Directory) => Ok(FileInfo::new(Self::leaf_of(&key), FileKind::Directory, 0)),
            None => Err(EngineError::NotFound),
        }
    }

    fn usage(&mut self) -> Result<StorageUsage, EngineError> {
        self.require_mounted()?;

        Ok(StorageUsage::new(
            self.used_blocks()
                .checked_mul(Self::BLOCK_BYTES)
                .expect("used blocks never exceed the media capacity"),
            self.capacity_bytes,
        ))
    }
}

fn length_as_u64(length: usize) -> u64 {
    u64::try_from(length).expect("usize fits in u64 on supported targets")
}
