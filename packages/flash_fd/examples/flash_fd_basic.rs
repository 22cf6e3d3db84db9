//! Mounts an in-memory engine, exercises the descriptor surface and shows
//! what happens when the handle table runs out.

use std::io::SeekFrom;

use flash_fd::ram::RamEngine;
use flash_fd::{OpenFlags, Storage, StorageError};

fn main() -> Result<(), StorageError> {
    // Blank media: mount fails, so the media is formatted and remounted.
    let mut storage: Storage<RamEngine, 4> =
        Storage::mount_or_format(RamEngine::unformatted())?;

    let fd = storage.open("boot.log", OpenFlags::create_truncate().read(true))?;
    println!("Opened boot.log as descriptor {fd}");

    storage.write(fd, b"boot: ok\n")?;
    storage.write(fd, b"net: ok\n")?;

    storage.seek(fd, SeekFrom::Start(0))?;
    let mut contents = Vec::new();
    while let Some(byte) = storage.read_byte(fd)? {
        contents.push(byte);
    }
    println!("Read back {} bytes:", contents.len());
    print!("{}", String::from_utf8_lossy(&contents));

    storage.close(fd)?;

    // The table is fixed-size; the fifth concurrent open is refused.
    let mut open = Vec::new();
    for index in 0..4 {
        open.push(storage.open(&format!("slot-{index}"), OpenFlags::create_truncate())?);
    }
    match storage.open("one-too-many", OpenFlags::create_truncate()) {
        Err(StorageError::OutOfHandles { capacity }) => {
            println!("Handle table full at {capacity} descriptors, as configured.");
        }
        other => println!("Unexpected outcome: {other:?}"),
    }
    for fd in open {
        storage.close(fd)?;
    }

    let usage = storage.usage()?;
    println!(
        "Media usage: {} of {} bytes.",
        usage.used_bytes(),
        usage.total_bytes()
    );

    Ok(())
}
