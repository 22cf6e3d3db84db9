//! Failure-injection tests: a mock engine fails at chosen points and the
//! descriptor table must keep its bookkeeping straight regardless.

use std::io::SeekFrom;

use flash_fd::{
    EngineError, FileInfo, OpenFlags, Storage, StorageEngine, StorageError, StorageUsage,
};
use mockall::{Sequence, mock};

mock! {
    Engine {}

    impl StorageEngine for Engine {
        type File = u32;
        type Dir = u32;

        fn mount(&mut self) -> Result<(), EngineError>;
        fn unmount(&mut self) -> Result<(), EngineError>;
        fn format(&mut self) -> Result<(), EngineError>;
        fn open(&mut self, path: &str, flags: OpenFlags) -> Result<u32, EngineError>;
        fn close(&mut self, file: u32) -> Result<(), EngineError>;
        fn read(&mut self, file: &mut u32, buffer: &mut [u8]) -> Result<usize, EngineError>;
        fn write(&mut self, file: &mut u32, buffer: &[u8]) -> Result<usize, EngineError>;
        fn seek(&mut self, file: &mut u32, position: SeekFrom) -> Result<u64, EngineError>;
        fn open_dir(&mut self, path: &str) -> Result<u32, EngineError>;
        fn close_dir(&mut self, dir: u32) -> Result<(), EngineError>;
        fn read_dir(&mut self, dir: &mut u32) -> Result<Option<FileInfo>, EngineError>;
        fn remove(&mut self, path: &str) -> Result<(), EngineError>;
        fn rename(&mut self, from: &str, to: &str) -> Result<(), EngineError>;
        fn make_dir(&mut self, path: &str) -> Result<(), EngineError>;
        fn stat(&mut self, path: &str) -> Result<FileInfo, EngineError>;
        fn usage(&mut self) -> Result<StorageUsage, EngineError>;
    }
}

impl std::fmt::Debug for MockEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MockEngine")
    }
}

fn mounted_engine() -> MockEngine {
    let mut engine = MockEngine::new();
    engine.expect_mount().times(1).returning(|| Ok(()));
    engine
}

#[test]
fn exhausted_table_never_consults_the_engine() {
    let mut engine = mounted_engine();
    // Exactly one open reaches the engine; the second is cut off by the
    // table before any engine call happens.
    engine.expect_open().times(1).returning(|_, _| Ok(7));

    let mut storage: Storage<MockEngine, 1> = Storage::mount(engine).unwrap();

    storage.open("first", OpenFlags::read_only()).unwrap();

    let error = storage.open("second", OpenFlags::read_only()).unwrap_err();
    assert!(matches!(error, StorageError::OutOfHandles { capacity: 1 }));
}

#[test]
fn failed_open_does_not_leak_a_slot() {
    let mut engine = mounted_engine();

    let mut sequence = Sequence::new();
    engine
        .expect_open()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_, _| Err(EngineError::NoSpace));
    engine
        .expect_open()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_, _| Ok(7));

    let mut storage: Storage<MockEngine, 1> = Storage::mount(engine).unwrap();

    let error = storage.open("doomed", OpenFlags::read_only()).unwrap_err();
    assert!(matches!(
        error,
        StorageError::Engine(EngineError::NoSpace)
    ));
    assert_eq!(storage.open_descriptors(), 0);

    // The single slot is still available: the failed open abandoned its
    // reservation instead of consuming it.
    let fd = storage.open("fine", OpenFlags::read_only()).unwrap();
    assert_eq!(fd.into_raw(), 3);
}

#[test]
fn failed_dir_open_does_not_leak_a_slot() {
    let mut engine = mounted_engine();
    engine
        .expect_open_dir()
        .times(1)
        .returning(|_| Err(EngineError::NotADirectory));

    let mut storage: Storage<MockEngine, 1> = Storage::mount(engine).unwrap();

    assert!(storage.open_dir("file-not-dir").is_err());
    assert_eq!(storage.open_descriptors(), 0);
}

#[test]
fn failed_close_still_frees_the_slot() {
    let mut engine = mounted_engine();
    engine.expect_open().times(2).returning(|_, _| Ok(7));
    let mut sequence = Sequence::new();
    engine
        .expect_close()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_| Err(EngineError::Io));
    engine
        .expect_close()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_| Ok(()));

    let mut storage: Storage<MockEngine, 1> = Storage::mount(engine).unwrap();

    let fd = storage.open("flaky", OpenFlags::read_only()).unwrap();

    // The engine's close fails, but the descriptor is dead regardless and
    // the slot is free again.
    let error = storage.close(fd).unwrap_err();
    assert!(matches!(error, StorageError::Engine(EngineError::Io)));
    assert_eq!(storage.open_descriptors(), 0);

    let fd = storage.open("retry", OpenFlags::read_only()).unwrap();
    storage.close(fd).unwrap();
}

#[test]
fn unmount_closes_everything_and_reports_the_first_error() {
    let mut engine = mounted_engine();

    let mut handle = 0_u32;
    engine.expect_open().times(2).returning(move |_, _| {
        handle += 1;
        Ok(handle)
    });

    // Both closes must happen even though the first one fails; the unmount
    // itself must also still happen.
    engine
        .expect_close()
        .times(2)
        .returning(|file| if file == 1 { Err(EngineError::Io) } else { Ok(()) });
    engine.expect_unmount().times(1).returning(|| Ok(()));

    let mut storage: Storage<MockEngine, 4> = Storage::mount(engine).unwrap();
    storage.open("a", OpenFlags::read_only()).unwrap();
    storage.open("b", OpenFlags::read_only()).unwrap();

    let error = storage.unmount().unwrap_err();
    assert!(matches!(error, StorageError::Engine(EngineError::Io)));
}

#[test]
fn mount_or_format_recovers_from_unmountable_media() {
    let mut engine = MockEngine::new();

    let mut sequence = Sequence::new();
    engine
        .expect_mount()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|| Err(EngineError::Corrupt));
    engine
        .expect_format()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|| Ok(()));
    engine
        .expect_mount()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|| Ok(()));

    let storage: Storage<MockEngine, 4> = Storage::mount_or_format(engine).unwrap();
    assert_eq!(storage.open_descriptors(), 0);
}

#[test]
fn mount_or_format_propagates_a_format_failure() {
    let mut engine = MockEngine::new();

    let mut sequence = Sequence::new();
    engine
        .expect_mount()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|| Err(EngineError::Corrupt));
    engine
        .expect_format()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|| Err(EngineError::Io));

    let error = Storage::<MockEngine, 4>::mount_or_format(engine).unwrap_err();
    assert!(matches!(error, StorageError::Engine(EngineError::Io)));
}

#[test]
fn format_runs_the_unmount_format_mount_sequence() {
    let mut engine = mounted_engine();

    let mut sequence = Sequence::new();
    engine
        .expect_unmount()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|| Ok(()));
    engine
        .expect_format()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|| Ok(()));
    engine
        .expect_mount()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|| Ok(()));

    let mut storage: Storage<MockEngine, 4> = Storage::mount(engine).unwrap();
    storage.format().unwrap();
}

#[test]
fn format_with_open_handles_never_reaches_the_engine() {
    let mut engine = mounted_engine();
    engine.expect_open().times(1).returning(|_, _| Ok(7));
    // No unmount/format expectations: reaching the engine would fail the test.

    let mut storage: Storage<MockEngine, 4> = Storage::mount(engine).unwrap();
    storage.open("busy", OpenFlags::read_only()).unwrap();

    let error = storage.format().unwrap_err();
    assert!(matches!(error, StorageError::Busy { open_handles: 1 }));
}

#[test]
fn exists_distinguishes_missing_from_failing() {
    let mut engine = mounted_engine();

    let mut sequence = Sequence::new();
    engine
        .expect_stat()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_| Err(EngineError::NotFound));
    engine
        .expect_stat()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_| Err(EngineError::Io));

    let mut storage: Storage<MockEngine, 4> = Storage::mount(engine).unwrap();

    // A missing entry is an answer, not an error.
    assert!(!storage.exists("missing").unwrap());

    // Any other stat failure must surface instead of masquerading as
    // "does not exist".
    let error = storage.exists("unreadable").unwrap_err();
    assert!(matches!(error, StorageError::Engine(EngineError::Io)));
}

#[test]
fn io_errors_pass_through_with_slot_state_intact() {
    let mut engine = mounted_engine();
    engine.expect_open().times(1).returning(|_, _| Ok(7));
    engine
        .expect_read()
        .times(1)
        .returning(|_, _| Err(EngineError::Corrupt));
    engine
        .expect_write()
        .times(1)
        .returning(|_, _| Err(EngineError::NoSpace));
    engine.expect_close().times(1).returning(|_| Ok(()));

    let mut storage: Storage<MockEngine, 4> = Storage::mount(engine).unwrap();
    let fd = storage.open("f", OpenFlags::read_only()).unwrap();

    let mut buffer = [0_u8; 4];
    assert!(matches!(
        storage.read(fd, &mut buffer).unwrap_err(),
        StorageError::Engine(EngineError::Corrupt)
    ));
    assert!(matches!(
        storage.write(fd, b"x").unwrap_err(),
        StorageError::Engine(EngineError::NoSpace)
    ));

    // The handle survives engine-level I/O failures; only close frees it.
    assert_eq!(storage.open_descriptors(), 1);
    storage.close(fd).unwrap();
    assert_eq!(storage.open_descriptors(), 0);
}
