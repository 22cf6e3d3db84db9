use std::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::{Descriptor, Storage, StorageEngine};

/// Adapter that exposes one descriptor of a [`Storage`] through the
/// [`std::io`] traits.
///
/// Obtained from [`Storage::file()`]. Code written against [`Read`],
/// [`Write`] and [`Seek`] runs on top of the storage engine unchanged; this
/// is the seam that replaces intercepting standard-library file calls at
/// link time.
///
/// The adapter borrows the storage exclusively for its lifetime and holds no
/// state of its own beyond the descriptor. Dropping it does not close the
/// descriptor; closing stays an explicit [`Storage::close()`] call.
///
/// # Example
///
/// ```
/// use std::io::Read;
///
/// use flash_fd::ram::RamEngine;
/// use flash_fd::{OpenFlags, Storage, StorageError};
///
/// fn read_all(reader: &mut dyn Read) -> std::io::Result<Vec<u8>> {
///     let mut data = Vec::new();
///     reader.read_to_end(&mut data)?;
///     Ok(data)
/// }
///
/// # fn main() -> Result<(), StorageError> {
/// let mut storage: Storage<RamEngine> = Storage::mount(RamEngine::new())?;
/// storage.write_file("config", b"key=value")?;
///
/// let fd = storage.open("config", OpenFlags::read_only())?;
/// let data = read_all(&mut storage.file(fd)).expect("in-memory reads do not fail");
/// assert_eq!(data, b"key=value");
///
/// storage.close(fd)?;
/// # Ok(())
/// # }
/// ```
pub struct StorageFile<'s, E: StorageEngine, const MAX_HANDLES: usize> {
    storage: &'s mut Storage<E, MAX_HANDLES>,
    descriptor: Descriptor,
}

impl<'s, E: StorageEngine, const MAX_HANDLES: usize> StorageFile<'s, E, MAX_HANDLES> {
    pub(crate) fn new(storage: &'s mut Storage<E, MAX_HANDLES>, descriptor: Descriptor) -> Self {
        Self {
            storage,
            descriptor,
        }
    }

    /// The descriptor this adapter wraps.
    #[must_use]
    pub fn descriptor(&self) -> Descriptor {
        self.descriptor
    }
}

impl<E: StorageEngine, const MAX_HANDLES: usize> Read for StorageFile<'_, E, MAX_HANDLES> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.storage
            .read(self.descriptor, buf)
            .map_err(io::Error::from)
    }
}

impl<E: StorageEngine, const MAX_HANDLES: usize> Write for StorageFile<'_, E, MAX_HANDLES> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.storage
            .write(self.descriptor, buf)
            .map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        // Writes reach the engine as they are made; flushing to media is the
        // engine's business and happens at close.
        Ok(())
    }
}

impl<E: StorageEngine, const MAX_HANDLES: usize> Seek for StorageFile<'_, E, MAX_HANDLES> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.storage
            .seek(self.descriptor, pos)
            .map_err(io::Error::from)
    }
}

impl<E: StorageEngine, const MAX_HANDLES: usize> fmt::Debug
    for StorageFile<'_, E, MAX_HANDLES>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageFile")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}
