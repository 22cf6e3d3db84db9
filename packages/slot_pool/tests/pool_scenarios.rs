//! End-to-end scenarios exercising the pool the way a descriptor table
//! does: fill, exhaust, recycle and drain.

use slot_pool::SlotPool;

#[test]
fn descriptor_table_lifecycle() {
    let mut pool = SlotPool::<String, 4>::new();

    let a = pool.allocate("resource-0".to_string()).unwrap();
    let b = pool.allocate("resource-1".to_string()).unwrap();
    let c = pool.allocate("resource-2".to_string()).unwrap();
    let d = pool.allocate("resource-3".to_string()).unwrap();

    assert!(pool.is_full());

    let error = pool
        .allocate("overflow".to_string())
        .expect_err("pool is full");
    assert_eq!(error.capacity(), 4);
    assert_eq!(pool.len(), 4);

    assert_eq!(pool.release(b), Some("resource-1".to_string()));
    assert_eq!(pool.lookup(b), None);
    assert_eq!(pool.lookup(a).map(String::as_str), Some("resource-0"));
    assert_eq!(pool.lookup(c).map(String::as_str), Some("resource-2"));
    assert_eq!(pool.lookup(d).map(String::as_str), Some("resource-3"));

    let reused = pool.allocate("resource-4".to_string()).unwrap();
    assert_eq!(reused, b);

    for position in [a, b, c, d] {
        assert!(pool.release(position).is_some());
    }
    assert!(pool.is_empty());

    for index in 0..4_u32 {
        pool.allocate(format!("second-wave-{index}")).unwrap();
    }
    assert!(pool.is_full());
}

#[test]
fn interleaved_churn_never_leaks_slots() {
    let mut pool = SlotPool::<u32, 8>::new();

    let mut live = Vec::new();
    for value in 0..8_u32 {
        live.push(pool.allocate(value).unwrap());
    }

    // Release every other slot, then refill; the full capacity must remain
    // reachable with no slot lost to bookkeeping.
    let released = live.iter().copied().step_by(2).collect::<Vec<_>>();
    for position in &released {
        assert!(pool.release(*position).is_some());
    }
    assert_eq!(pool.free_slots(), 4);

    for value in 100..104_u32 {
        pool.allocate(value).unwrap();
    }
    assert!(pool.is_full());
    assert!(pool.allocate(999).is_err());

    // Drain completely and prove the whole capacity is reusable.
    for position in 0..8_usize {
        assert!(pool.release(position).is_some());
    }
    assert!(pool.is_empty());

    for value in 0..8_u32 {
        pool.allocate(value).unwrap();
    }
    assert!(pool.is_full());
}

#[test]
fn failed_acquisition_leaves_capacity_intact() {
    let mut pool = SlotPool::<u32, 2>::new();

    // A caller that reserves a slot but fails to produce a value abandons
    // the reservation; the pool must not lose the slot.
    for _ in 0..5 {
        let reservation = pool.begin_allocate().unwrap();
        assert_eq!(reservation.position(), 0);
        drop(reservation);
    }

    assert_eq!(pool.free_slots(), 2);

    pool.allocate(1).unwrap();
    pool.allocate(2).unwrap();
    assert!(pool.is_full());
}
