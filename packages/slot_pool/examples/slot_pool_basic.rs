//! Basic example of allocating and releasing slots in a [`SlotPool`].

use slot_pool::SlotPool;

fn main() {
    let mut pool = SlotPool::<&str, 4>::new();

    let first = pool.allocate("first").unwrap();
    let second = pool.allocate("second").unwrap();

    println!(
        "Allocated {:?} at position {first}",
        pool.lookup(first).unwrap()
    );
    println!(
        "Allocated {:?} at position {second}",
        pool.lookup(second).unwrap()
    );

    pool.allocate("third").unwrap();
    pool.allocate("fourth").unwrap();

    // Capacity is fixed, so the fifth allocation reports exhaustion.
    match pool.allocate("fifth") {
        Ok(position) => println!("Unexpectedly allocated at {position}"),
        Err(error) => println!("Allocation failed: {error}"),
    }

    let released = pool.release(second).unwrap();
    println!("Released {released:?} from position {second}");

    let reused = pool.allocate("fifth").unwrap();
    println!("Allocated \"fifth\" at recycled position {reused}");

    println!(
        "Pool now holds {} of {} values.",
        pool.len(),
        pool.capacity()
    );
}
