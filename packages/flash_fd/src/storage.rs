use std::fmt;
use std::io::{self, Read, SeekFrom, Write};

use slot_pool::SlotPool;

use crate::error::Result;
use crate::{
    Descriptor, EngineError, FileInfo, OpenFlags, StorageEngine, StorageError, StorageFile,
    StorageUsage,
};

/// Chunk size for the path-level convenience operations that stream file
/// contents. Sized to match common flash filesystem cache buffers.
const COPY_CHUNK_BYTES: usize = 512;

/// A descriptor table over a [`StorageEngine`].
///
/// `Storage` owns the engine and a fixed table of `MAX_HANDLES` slots. Every
/// [`open()`][Self::open] or [`open_dir()`][Self::open_dir] stores the
/// engine's per-handle state in a slot and hands back the slot's position as
/// a small integer [`Descriptor`]; every later operation translates the
/// descriptor back to the slot and delegates to the engine. The first three
/// descriptor values are reserved for the standard streams and bypass the
/// table entirely.
///
/// The handle table never allocates: its capacity is fixed at compile time,
/// and opening more than `MAX_HANDLES` handles at once is reported as
/// [`StorageError::OutOfHandles`] without consulting the engine.
///
/// `Storage` is single-threaded by design and carries no locking of its own;
/// a multi-threaded host wraps it in a `Mutex` (or equivalent) and serializes
/// access externally.
///
/// # Example
///
/// ```
/// use flash_fd::ram::RamEngine;
/// use flash_fd::{OpenFlags, Storage, StorageError};
///
/// # fn main() -> Result<(), StorageError> {
/// let mut storage: Storage<RamEngine> = Storage::mount(RamEngine::new())?;
///
/// let fd = storage.open("greeting", OpenFlags::create_truncate())?;
/// storage.write(fd, b"hello")?;
/// storage.close(fd)?;
///
/// assert_eq!(storage.read_to_vec("greeting")?, b"hello");
/// # Ok(())
/// # }
/// ```
pub struct Storage<E: StorageEngine, const MAX_HANDLES: usize = 16> {
    engine: E,

    /// Slot position p backs descriptor p + 3.
    handles: SlotPool<Handle<E>, MAX_HANDLES>,
}

/// The per-slot payload: whatever the engine handed out for one open handle.
enum Handle<E: StorageEngine> {
    File(E::File),
    Dir(E::Dir),
}

impl<E: StorageEngine, const MAX_HANDLES: usize> Storage<E, MAX_HANDLES> {
    /// Mounts the engine and wraps it in a fresh handle table.
    ///
    /// # Errors
    ///
    /// Propagates the engine's mount failure; the engine is consumed either
    /// way. Use [`mount_or_format()`][Self::mount_or_format] to recover from
    /// unformatted media automatically.
    pub fn mount(mut engine: E) -> Result<Self> {
        engine.mount()?;

        Ok(Self {
            engine,
            handles: SlotPool::new(),
        })
    }

    /// Mounts the engine, formatting the media first if the initial mount
    /// fails.
    ///
    /// This is the first-boot sequence: blank media holds no filesystem, so
    /// the first mount attempt fails, the media is formatted and the mount
    /// is retried.
    ///
    /// # Errors
    ///
    /// Propagates the engine's format or second-mount failure.
    ///
    /// # Example
    ///
    /// ```
    /// use flash_fd::Storage;
    /// use flash_fd::ram::RamEngine;
    ///
    /// // Blank media: a plain mount would fail with `Corrupt`.
    /// let storage: Storage<RamEngine> =
    ///     Storage::mount_or_format(RamEngine::unformatted()).unwrap();
    /// ```
    pub fn mount_or_format(mut engine: E) -> Result<Self> {
        if engine.mount().is_ok() {
            return Ok(Self {
                engine,
                handles: SlotPool::new(),
            });
        }

        engine.format()?;
        engine.mount()?;

        Ok(Self {
            engine,
            handles: SlotPool::new(),
        })
    }

    /// Wipes the filesystem and remounts it empty.
    ///
    /// # Errors
    ///
    /// Refused with [`StorageError::Busy`] while any descriptor is open,
    /// since formatting under live handles would leave them dangling. Engine
    /// failures during the unmount-format-mount sequence propagate.
    pub fn format(&mut self) -> Result<()> {
        if !self.handles.is_empty() {
            return Err(StorageError::Busy {
                open_handles: self.handles.len(),
            });
        }

        self.engine.unmount()?;
        self.engine.format()?;
        self.engine.mount()?;

        Ok(())
    }

    /// Closes every open handle, unmounts and returns the engine for reuse.
    ///
    /// # Errors
    ///
    /// Every handle is closed and every slot released even when some of the
    /// closes fail; the first error encountered (close or unmount) is the
    /// one reported.
    pub fn unmount(mut self) -> Result<E> {
        let mut first_error = None;

        for position in 0..MAX_HANDLES {
            let Some(handle) = self.handles.release(position) else {
                continue;
            };

            let outcome = match handle {
                Handle::File(file) => self.engine.close(file),
                Handle::Dir(dir) => self.engine.close_dir(dir),
            };

            if let Err(error) = outcome {
                first_error.get_or_insert(error);
            }
        }

        let unmount_outcome = self.engine.unmount();
        if let Some(error) = first_error {
            return Err(error.into());
        }
        unmount_outcome?;

        Ok(self.engine)
    }

    /// Opens the file at `path` and returns a descriptor for it.
    ///
    /// A handle table slot is reserved before the engine is consulted, so an
    /// exhausted table is reported without side effects; an engine failure
    /// abandons the reservation and leaves the table unchanged.
    ///
    /// # Errors
    ///
    /// [`StorageError::OutOfHandles`] when every slot is in use; engine
    /// failures propagate.
    pub fn open(&mut self, path: &str, flags: OpenFlags) -> Result<Descriptor> {
        let reservation = self
            .handles
            .begin_allocate()
            .map_err(|exhausted| StorageError::OutOfHandles {
                capacity: exhausted.capacity(),
            })?;

        // Failing here drops the reservation, which leaves the table
        // untouched: no leaked slot on the error path.
        let file = self.engine.open(path, flags)?;

        let position = reservation.position();
        reservation.fill(Handle::File(file));

        Ok(Descriptor::from_position(position))
    }

    /// Opens the directory at `path` for listing and returns a descriptor
    /// for it.
    ///
    /// # Errors
    ///
    /// Same contract as [`open()`][Self::open].
    pub fn open_dir(&mut self, path: &str) -> Result<Descriptor> {
        let reservation = self
            .handles
            .begin_allocate()
            .map_err(|exhausted| StorageError::OutOfHandles {
                capacity: exhausted.capacity(),
            })?;

        let dir = self.engine.open_dir(path)?;

        let position = reservation.position();
        reservation.fill(Handle::Dir(dir));

        Ok(Descriptor::from_position(position))
    }

    /// Closes the handle behind `descriptor`.
    ///
    /// The slot is released unconditionally: even when the engine reports a
    /// close failure, the descriptor is dead and the slot is available for
    /// the next open. The engine's error, if any, is reported after the
    /// release.
    ///
    /// # Errors
    ///
    /// [`StorageError::InvalidDescriptor`] for reserved streams and for
    /// descriptors that do not refer to an open handle; engine close
    /// failures propagate.
    pub fn close(&mut self, descriptor: Descriptor) -> Result<()> {
        let handle = descriptor
            .position()
            .and_then(|position| self.handles.release(position))
            .ok_or(StorageError::InvalidDescriptor { descriptor })?;

        match handle {
            Handle::File(file) => self.engine.close(file)?,
            Handle::Dir(dir) => self.engine.close_dir(dir)?,
        }

        Ok(())
    }

    /// Reads up to `buffer.len()` bytes from the handle behind `descriptor`,
    /// returning how many bytes were read. Zero means end of file.
    ///
    /// [`Descriptor::STDIN`] bypasses the handle table and reads from the
    /// process's standard input.
    ///
    /// # Errors
    ///
    /// [`StorageError::InvalidDescriptor`] for unknown descriptors and for
    /// the write-only reserved streams; [`EngineError::IsADirectory`] for
    /// directory descriptors; engine failures propagate.
    pub fn read(&mut self, descriptor: Descriptor, buffer: &mut [u8]) -> Result<usize> {
        if descriptor == Descriptor::STDIN {
            return io::stdin().lock().read(buffer).map_err(StorageError::Stream);
        }
        if descriptor.is_reserved_stream() {
            // Standard output and error have no read side.
            return Err(StorageError::InvalidDescriptor { descriptor });
        }

        match Self::handle_at(&mut self.handles, descriptor)? {
            Handle::File(file) => Ok(self.engine.read(file, buffer)?),
            Handle::Dir(_) => Err(EngineError::IsADirectory.into()),
        }
    }

    /// Writes up to `buffer.len()` bytes to the handle behind `descriptor`,
    /// returning how many bytes were written.
    ///
    /// [`Descriptor::STDOUT`] and [`Descriptor::STDERR`] bypass the handle
    /// table and write to the process's standard output and error streams.
    ///
    /// # Errors
    ///
    /// Same contract as [`read()`][Self::read], with the read-only
    /// [`Descriptor::STDIN`] rejected instead of the output streams.
    pub fn write(&mut self, descriptor: Descriptor, buffer: &[u8]) -> Result<usize> {
        if descriptor == Descriptor::STDOUT {
            return io::stdout()
                .lock()
                .write(buffer)
                .map_err(StorageError::Stream);
        }
        if descriptor == Descriptor::STDERR {
            return io::stderr()
                .lock()
                .write(buffer)
                .map_err(StorageError::Stream);
        }
        if descriptor.is_reserved_stream() {
            // Standard input has no write side.
            return Err(StorageError::InvalidDescriptor { descriptor });
        }

        match Self::handle_at(&mut self.handles, descriptor)? {
            Handle::File(file) => Ok(self.engine.write(file, buffer)?),
            Handle::Dir(_) => Err(EngineError::IsADirectory.into()),
        }
    }

    /// Moves the cursor of the file behind `descriptor`, returning the new
    /// position from the start of the file.
    ///
    /// # Errors
    ///
    /// [`StorageError::NotSeekable`] for the reserved streams,
    /// [`EngineError::IsADirectory`] for directory descriptors,
    /// [`StorageError::InvalidDescriptor`] otherwise for unknown
    /// descriptors; engine failures propagate.
    pub fn seek(&mut self, descriptor: Descriptor, position: SeekFrom) -> Result<u64> {
        if descriptor.is_reserved_stream() {
            return Err(StorageError::NotSeekable { descriptor });
        }

        match Self::handle_at(&mut self.handles, descriptor)? {
            Handle::File(file) => Ok(self.engine.seek(file, position)?),
            Handle::Dir(_) => Err(EngineError::IsADirectory.into()),
        }
    }

    /// Returns the next entry of the directory listing behind `descriptor`,
    /// or `None` once all entries have been reported.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotADirectory`] when the descriptor refers to a file;
    /// [`StorageError::InvalidDescriptor`] for reserved streams and unknown
    /// descriptors; engine failures propagate.
    pub fn read_dir(&mut self, descriptor: Descriptor) -> Result<Option<FileInfo>> {
        match Self::handle_at(&mut self.handles, descriptor)? {
            Handle::Dir(dir) => Ok(self.engine.read_dir(dir)?),
            Handle::File(_) => Err(EngineError::NotADirectory.into()),
        }
    }

    /// The current cursor position of the file behind `descriptor`.
    ///
    /// # Errors
    ///
    /// Same contract as [`seek()`][Self::seek].
    pub fn tell(&mut self, descriptor: Descriptor) -> Result<u64> {
        self.seek(descriptor, SeekFrom::Current(0))
    }

    /// The size in bytes of the file behind `descriptor`.
    ///
    /// The cursor position is preserved across the call.
    ///
    /// # Errors
    ///
    /// Same contract as [`seek()`][Self::seek].
    pub fn size(&mut self, descriptor: Descriptor) -> Result<u64> {
        let cursor = self.seek(descriptor, SeekFrom::Current(0))?;
        let size = self.seek(descriptor, SeekFrom::End(0))?;
        self.seek(descriptor, SeekFrom::Start(cursor))?;

        Ok(size)
    }

    /// Whether the cursor of the file behind `descriptor` is at or past the
    /// end of the file.
    ///
    /// # Errors
    ///
    /// Same contract as [`seek()`][Self::seek].
    pub fn is_eof(&mut self, descriptor: Descriptor) -> Result<bool> {
        let cursor = self.tell(descriptor)?;
        let size = self.size(descriptor)?;

        Ok(cursor >= size)
    }

    /// Reads the single byte at the cursor of the file behind `descriptor`,
    /// or `None` at end of file.
    ///
    /// # Errors
    ///
    /// Same contract as [`read()`][Self::read].
    pub fn read_byte(&mut self, descriptor: Descriptor) -> Result<Option<u8>> {
        let mut byte = [0_u8; 1];

        if self.read(descriptor, &mut byte)? == 0 {
            return Ok(None);
        }

        Ok(Some(byte[0]))
    }

    /// Wraps a descriptor in an adapter implementing the [`std::io`] traits.
    ///
    /// The adapter borrows the storage exclusively and routes every
    /// [`Read`], [`Write`] and [`Seek`][std::io::Seek] call through the
    /// handle table, so code written against the standard traits runs
    /// unmodified on top of the engine. Dropping the adapter does not close
    /// the descriptor.
    pub fn file(&mut self, descriptor: Descriptor) -> StorageFile<'_, E, MAX_HANDLES> {
        StorageFile::new(self, descriptor)
    }

    /// Reads the whole file at `path` into a vector.
    ///
    /// A convenience that opens, reads and closes internally without
    /// occupying a handle table slot.
    ///
    /// # Errors
    ///
    /// Engine failures propagate; the internal handle is closed either way.
    pub fn read_to_vec(&mut self, path: &str) -> Result<Vec<u8>> {
        let mut file = self.engine.open(path, OpenFlags::read_only())?;

        let outcome = self.drain_file(&mut file);
        let close_outcome = self.engine.close(file);

        let data = outcome?;
        close_outcome?;

        Ok(data)
    }

    /// Reads up to `buffer.len()` bytes from the file at `path`, starting at
    /// byte `offset`, returning how many bytes were read.
    ///
    /// Reads short only at end of file.
    ///
    /// # Errors
    ///
    /// Engine failures propagate; the internal handle is closed either way.
    pub fn read_range(&mut self, path: &str, offset: u64, buffer: &mut [u8]) -> Result<usize> {
        let mut file = self.engine.open(path, OpenFlags::read_only())?;

        let outcome = self.read_at(&mut file, offset, buffer);
        let close_outcome = self.engine.close(file);

        let count = outcome?;
        close_outcome?;

        Ok(count)
    }

    /// Replaces the file at `path` with `data`, creating it if missing.
    ///
    /// # Errors
    ///
    /// Engine failures propagate; the internal handle is closed either way.
    pub fn write_file(&mut self, path: &str, data: &[u8]) -> Result<()> {
        self.spill_file(path, OpenFlags::create_truncate(), data)
    }

    /// Appends `data` to the file at `path`, creating it if missing.
    ///
    /// # Errors
    ///
    /// Engine failures propagate; the internal handle is closed either way.
    pub fn append_file(&mut self, path: &str, data: &[u8]) -> Result<()> {
        self.spill_file(path, OpenFlags::create_append(), data)
    }

    /// Creates an empty file at `path`. Existing content is left alone.
    ///
    /// # Errors
    ///
    /// Engine failures propagate.
    pub fn create_empty(&mut self, path: &str) -> Result<()> {
        let file = self
            .engine
            .open(path, OpenFlags::new().write(true).create(true))?;
        self.engine.close(file)?;

        Ok(())
    }

    /// Whether an entry exists at `path`.
    ///
    /// # Errors
    ///
    /// A missing entry is `Ok(false)`, not an error; any other engine
    /// failure propagates.
    pub fn exists(&mut self, path: &str) -> Result<bool> {
        match self.engine.stat(path) {
            Ok(_) => Ok(true),
            Err(EngineError::NotFound) => Ok(false),
            Err(error) => Err(error.into()),
        }
    }

    /// Copies the file at `from` to `to`, replacing `to` if it exists.
    ///
    /// Contents are streamed in fixed-size chunks, so the copy does not
    /// require the whole file to fit in memory at once.
    ///
    /// # Errors
    ///
    /// Engine failures propagate; both internal handles are closed either
    /// way.
    pub fn copy_file(&mut self, from: &str, to: &str) -> Result<()> {
        let mut source = self.engine.open(from, OpenFlags::read_only())?;

        let mut destination = match self.engine.open(to, OpenFlags::create_truncate()) {
            Ok(destination) => destination,
            Err(error) => {
                // The destination failure is the error to report; closing
                // the source can only add noise at this point.
                drop(self.engine.close(source));
                return Err(error.into());
            }
        };

        let outcome = self.stream_between(&mut source, &mut destination);
        let source_close = self.engine.close(source);
        let destination_close = self.engine.close(destination);

        outcome?;
        source_close?;
        destination_close?;

        Ok(())
    }

    /// Removes the file or empty directory at `path`.
    ///
    /// # Errors
    ///
    /// Engine failures propagate.
    pub fn remove(&mut self, path: &str) -> Result<()> {
        Ok(self.engine.remove(path)?)
    }

    /// Renames or moves the entry at `from` to `to`.
    ///
    /// # Errors
    ///
    /// Engine failures propagate.
    pub fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        Ok(self.engine.rename(from, to)?)
    }

    /// Creates a directory at `path`.
    ///
    /// # Errors
    ///
    /// Engine failures propagate.
    pub fn make_dir(&mut self, path: &str) -> Result<()> {
        Ok(self.engine.make_dir(path)?)
    }

    /// Reports metadata for the entry at `path`.
    ///
    /// # Errors
    ///
    /// Engine failures propagate.
    pub fn stat(&mut self, path: &str) -> Result<FileInfo> {
        Ok(self.engine.stat(path)?)
    }

    /// Reports how much of the media is occupied.
    ///
    /// # Errors
    ///
    /// Engine failures propagate.
    pub fn usage(&mut self) -> Result<StorageUsage> {
        Ok(self.engine.usage()?)
    }

    /// The number of descriptors currently open.
    #[must_use]
    pub fn open_descriptors(&self) -> usize {
        self.handles.len()
    }

    /// The maximum number of descriptors that can be open at once.
    #[expect(
        clippy::unused_self,
        reason = "method form matches the capacity accessors callers already know"
    )]
    #[must_use]
    pub const fn max_handles(&self) -> usize {
        MAX_HANDLES
    }

    /// Takes the pool as a parameter rather than `&mut self` so that the
    /// engine field stays borrowable alongside the returned handle.
    fn handle_at(
        handles: &mut SlotPool<Handle<E>, MAX_HANDLES>,
        descriptor: Descriptor,
    ) -> Result<&mut Handle<E>> {
        descriptor
            .position()
            .and_then(|position| handles.lookup_mut(position))
            .ok_or(StorageError::InvalidDescriptor { descriptor })
    }

    fn drain_file(&mut self, file: &mut E::File) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        let mut chunk = [0_u8; COPY_CHUNK_BYTES];

        loop {
            let count = self.engine.read(file, &mut chunk)?;
            if count == 0 {
                break;
            }

            data.extend_from_slice(
                chunk
                    .get(..count)
                    .expect("the engine reports at most the buffer length"),
            );
        }

        Ok(data)
    }

    fn read_at(&mut self, file: &mut E::File, offset: u64, buffer: &mut [u8]) -> Result<usize> {
        self.engine.seek(file, SeekFrom::Start(offset))?;

        let mut filled = 0_usize;
        while filled < buffer.len() {
            let remainder = buffer
                .get_mut(filled..)
                .expect("filled is bounded by the buffer length");

            let count = self.engine.read(file, remainder)?;
            if count == 0 {
                break;
            }

            filled = filled
                .checked_add(count)
                .expect("the engine reports at most the buffer length");
        }

        Ok(filled)
    }

    fn spill_file(&mut self, path: &str, flags: OpenFlags, data: &[u8]) -> Result<()> {
        let mut file = self.engine.open(path, flags)?;

        let outcome = self.write_all(&mut file, data);
        let close_outcome = self.engine.close(file);

        outcome?;
        close_outcome?;

        Ok(())
    }

    fn write_all(&mut self, file: &mut E::File, data: &[u8]) -> Result<()> {
        let mut remaining = data;

        while !remaining.is_empty() {
            let count = self.engine.write(file, remaining)?;

            // A zero-length write would loop forever; treat it as the media
            // being unable to take more data.
            if count == 0 {
                return Err(EngineError::NoSpace.into());
            }

            remaining = remaining.get(count..).unwrap_or_default();
        }

        Ok(())
    }

    fn stream_between(&mut self, source: &mut E::File, destination: &mut E::File) -> Result<()> {
        let mut chunk = [0_u8; COPY_CHUNK_BYTES];

        loop {
            let count = self.engine.read(source, &mut chunk)?;
            if count == 0 {
                return Ok(());
            }

            self.write_all(
                destination,
                chunk
                    .get(..count)
                    .expect("the engine reports at most the buffer length"),
            )?;
        }
    }
}

impl<E: StorageEngine, const MAX_HANDLES: usize> fmt::Debug for Storage<E, MAX_HANDLES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("open_descriptors", &self.handles.len())
            .field("max_handles", &MAX_HANDLES)
            .finish_non_exhaustive()
    }
}
