use std::io;

use thiserror::Error;

use crate::Descriptor;

/// Errors reported by a [`StorageEngine`][crate::StorageEngine]
/// implementation.
///
/// The set mirrors the error space of embedded flash filesystems, which is
/// kept small and stable so it can cross a C ABI unchanged.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum EngineError {
    /// No entry exists at the given path.
    #[error("no such file or directory")]
    NotFound,

    /// An entry already exists at the given path.
    #[error("entry already exists")]
    AlreadyExists,

    /// A file was found where a directory was required.
    #[error("not a directory")]
    NotADirectory,

    /// A directory was found where a file was required.
    #[error("is a directory")]
    IsADirectory,

    /// The directory cannot be removed because it still has entries.
    #[error("directory is not empty")]
    DirectoryNotEmpty,

    /// An argument was malformed, such as conflicting open flags.
    #[error("invalid argument")]
    InvalidInput,

    /// The media has no room left for new data.
    #[error("no space left on device")]
    NoSpace,

    /// The engine could not allocate the working memory it needed.
    #[error("out of memory")]
    NoMemory,

    /// A path component exceeds the engine's name length limit.
    #[error("file name too long")]
    NameTooLong,

    /// The file would grow beyond the engine's file size limit.
    #[error("file too large")]
    FileTooLarge,

    /// The on-media state is not a valid filesystem.
    #[error("filesystem is corrupt")]
    Corrupt,

    /// The underlying block device failed.
    #[error("device error")]
    Io,
}

/// Errors reported by [`Storage`][crate::Storage] operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    /// Every handle table slot is in use; close something first.
    #[error("all {capacity} handle table slots are in use")]
    OutOfHandles {
        /// Total number of slots in the handle table.
        capacity: usize,
    },

    /// The descriptor does not refer to an open handle.
    #[error("descriptor {descriptor} does not refer to an open handle")]
    InvalidDescriptor {
        /// The descriptor that was rejected.
        descriptor: Descriptor,
    },

    /// The descriptor refers to something without a movable cursor.
    #[error("descriptor {descriptor} is not seekable")]
    NotSeekable {
        /// The descriptor that was rejected.
        descriptor: Descriptor,
    },

    /// The operation requires that no handles are open.
    #[error("operation requires exclusive access but {open_handles} handles are open")]
    Busy {
        /// Number of handles currently open.
        open_handles: usize,
    },

    /// The engine rejected the operation.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A reserved standard stream failed.
    #[error(transparent)]
    Stream(#[from] io::Error),
}

impl From<StorageError> for io::Error {
    fn from(error: StorageError) -> Self {
        let kind = match error {
            StorageError::Stream(inner) => return inner,
            StorageError::OutOfHandles { .. } => io::ErrorKind::Other,
            StorageError::InvalidDescriptor { .. } => io::ErrorKind::InvalidInput,
            StorageError::NotSeekable { .. } => io::ErrorKind::NotSeekable,
            StorageError::Busy { .. } => io::ErrorKind::ResourceBusy,
            StorageError::Engine(engine) => match engine {
                EngineError::NotFound => io::ErrorKind::NotFound,
                EngineError::AlreadyExists => io::ErrorKind::AlreadyExists,
                EngineError::NotADirectory => io::ErrorKind::NotADirectory,
                EngineError::IsADirectory => io::ErrorKind::IsADirectory,
                EngineError::DirectoryNotEmpty => io::ErrorKind::DirectoryNotEmpty,
                EngineError::InvalidInput => io::ErrorKind::InvalidInput,
                EngineError::NoSpace => io::ErrorKind::StorageFull,
                EngineError::NoMemory => io::ErrorKind::OutOfMemory,
                EngineError::NameTooLong => io::ErrorKind::InvalidFilename,
                EngineError::FileTooLarge => io::ErrorKind::FileTooLarge,
                EngineError::Corrupt => io::ErrorKind::InvalidData,
                EngineError::Io => io::ErrorKind::Other,
            },
        };

        Self::new(kind, error)
    }
}

pub(crate) type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(EngineError: Copy, Send, Sync);
    assert_impl_all!(StorageError: Send, Sync);

    #[test]
    fn engine_errors_map_to_matching_io_kinds() {
        let error = io::Error::from(StorageError::from(EngineError::NotFound));
        assert_eq!(error.kind(), io::ErrorKind::NotFound);

        let error = io::Error::from(StorageError::from(EngineError::NoSpace));
        assert_eq!(error.kind(), io::ErrorKind::StorageFull);

        let error = io::Error::from(StorageError::from(EngineError::Corrupt));
        assert_eq!(error.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn storage_errors_map_to_matching_io_kinds() {
        let error = io::Error::from(StorageError::OutOfHandles { capacity: 16 });
        assert_eq!(error.kind(), io::ErrorKind::Other);

        let error = io::Error::from(StorageError::NotSeekable {
            descriptor: Descriptor::STDOUT,
        });
        assert_eq!(error.kind(), io::ErrorKind::NotSeekable);

        let error = io::Error::from(StorageError::Busy { open_handles: 2 });
        assert_eq!(error.kind(), io::ErrorKind::ResourceBusy);
    }

    #[test]
    fn stream_errors_pass_through_unchanged() {
        let inner = io::Error::new(io::ErrorKind::UnexpectedEof, "stream went away");

        let error = io::Error::from(StorageError::Stream(inner));

        assert_eq!(error.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(error.to_string(), "stream went away");
    }

    #[test]
    fn messages_name_the_offending_values() {
        let error = StorageError::InvalidDescriptor {
            descriptor: Descriptor::from_raw(9),
        };
        assert_eq!(
            error.to_string(),
            "descriptor 9 does not refer to an open handle"
        );

        let error = StorageError::Busy { open_handles: 3 };
        assert_eq!(
            error.to_string(),
            "operation requires exclusive access but 3 handles are open"
        );
    }
}
