#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Descriptor-based access to flash filesystem engines through a
//! fixed-capacity handle table.
//!
//! Embedded storage stacks typically pair a flash filesystem engine
//! (littlefs or similar) with a thin shim that hands out POSIX-style integer
//! descriptors. This crate is that shim: [`Storage`] owns an engine behind
//! the [`StorageEngine`] trait and a [`slot_pool`]-backed table of open
//! handles, translating small integer [`Descriptor`]s to per-handle
//! engine state on every call. The table's capacity is a compile-time
//! constant and no allocation happens per open, so the memory cost of "how
//! many files can be open at once" is fixed up front.
//!
//! What the crate deliberately does not do: implement flash semantics. Block
//! allocation, wear leveling and power-loss recovery belong to the engine;
//! this crate only routes calls to it and guarantees descriptor bookkeeping
//! (no leaked handle table slots, even on engine failure paths).
//!
//! # Features
//!
//! * POSIX-like descriptor surface: [`Storage::open()`],
//!   [`close()`][Storage::close], [`read()`][Storage::read],
//!   [`write()`][Storage::write], [`seek()`][Storage::seek], plus directory
//!   listings via [`open_dir()`][Storage::open_dir] and
//!   [`read_dir()`][Storage::read_dir].
//! * The first three descriptors are reserved for the standard streams and
//!   bypass the engine entirely, mirroring the conventional stdin/stdout/
//!   stderr numbering.
//! * Path-level conveniences ([`write_file()`][Storage::write_file],
//!   [`read_to_vec()`][Storage::read_to_vec],
//!   [`copy_file()`][Storage::copy_file], ...) that never occupy a handle
//!   table slot.
//! * A [`std::io`] adapter ([`Storage::file()`]) so code written against
//!   [`Read`][std::io::Read]/[`Write`][std::io::Write]/[`Seek`][std::io::Seek]
//!   runs on the engine unchanged.
//! * [`ram::RamEngine`], an in-memory engine for host-side development,
//!   examples and tests.
//!
//! # Example
//!
//! ```
//! use std::io::SeekFrom;
//!
//! use flash_fd::ram::RamEngine;
//! use flash_fd::{OpenFlags, Storage, StorageError};
//!
//! # fn main() -> Result<(), StorageError> {
//! // Blank media: the first mount fails, so format-and-retry.
//! let mut storage: Storage<RamEngine> = Storage::mount_or_format(RamEngine::unformatted())?;
//!
//! let fd = storage.open("boot.cfg", OpenFlags::create_truncate().read(true))?;
//! storage.write(fd, b"console=tty0")?;
//!
//! storage.seek(fd, SeekFrom::Start(0))?;
//! let mut buffer = [0_u8; 7];
//! storage.read(fd, &mut buffer)?;
//! assert_eq!(&buffer, b"console");
//!
//! storage.close(fd)?;
//! # Ok(())
//! # }
//! ```
//!
//! The handle table is fixed-size; exhaustion is a recoverable error rather
//! than a reallocation:
//!
//! ```
//! use flash_fd::ram::RamEngine;
//! use flash_fd::{OpenFlags, Storage, StorageError};
//!
//! let mut storage: Storage<RamEngine, 2> = Storage::mount(RamEngine::new()).unwrap();
//!
//! let a = storage.open("a", OpenFlags::create_truncate()).unwrap();
//! let b = storage.open("b", OpenFlags::create_truncate()).unwrap();
//!
//! let error = storage.open("c", OpenFlags::create_truncate()).unwrap_err();
//! assert!(matches!(error, StorageError::OutOfHandles { capacity: 2 }));
//!
//! // Closing frees the slot for the next open.
//! storage.close(a).unwrap();
//! let c = storage.open("c", OpenFlags::create_truncate()).unwrap();
//! assert_eq!(c, a);
//! # storage.close(b).unwrap();
//! ```

mod descriptor;
mod engine;
mod error;
mod file;
mod flags;
pub mod ram;
mod storage;

pub use descriptor::*;
pub use engine::*;
pub use error::*;
pub use file::*;
pub use flags::*;
pub use storage::*;
