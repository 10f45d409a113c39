//! Integration tests for `memtrack` with real memory acquisitions.
//!
//! These tests exercise the full path through the system allocator, so every
//! acquisition here must be matched by a release before the test ends.

use memtrack::{Ledger, origin};

#[test]
fn fresh_ledger_is_empty() {
    let ledger = Ledger::new();

    assert!(ledger.is_empty());
    assert_eq!(ledger.live_blocks(), 0);
    assert_eq!(ledger.live_bytes(), 0);
    assert_eq!(ledger.to_report().to_string(), "[memtrack] No leaks detected.\n");
}

#[test]
fn acquired_memory_is_really_usable() {
    let ledger = Ledger::new();

    let block = ledger.acquire(128, origin!()).expect("allocation failed");

    // The ledger only records; the memory itself belongs to us.
    // SAFETY: we own the 128 freshly acquired bytes.
    unsafe {
        block.as_ptr().write_bytes(0x5A, 128);
        assert_eq!(*block.as_ptr(), 0x5A);
    }

    // SAFETY: `block` came from this ledger.
    unsafe { ledger.release(block.as_ptr()) };
    assert!(ledger.is_empty());
}

#[test]
fn ledger_holds_exactly_the_unreleased_addresses() {
    let ledger = Ledger::new();

    let kept = ledger.acquire(48, origin!()).expect("allocation failed");
    let released = ledger.acquire(16, origin!()).expect("allocation failed");

    // SAFETY: `released` came from this ledger.
    unsafe { ledger.release(released.as_ptr()) };

    assert!(ledger.is_tracked(kept.as_ptr()));
    assert!(!ledger.is_tracked(released.as_ptr()));
    assert_eq!(ledger.live_blocks(), 1);
    assert_eq!(ledger.live_bytes(), 48);

    // SAFETY: `kept` came from this ledger.
    unsafe { ledger.release(kept.as_ptr()) };
    assert!(ledger.is_empty());
}

#[test]
fn leak_report_names_the_leaking_call_site() {
    let ledger = Ledger::new();

    let first = ledger.acquire(4, origin!()).expect("allocation failed");
    let second = ledger.acquire(4, origin!()).expect("allocation failed");
    let leaked_origin = origin!();
    let third = ledger.acquire(4, leaked_origin).expect("allocation failed");

    // SAFETY: both blocks came from this ledger.
    unsafe {
        ledger.release(first.as_ptr());
        ledger.release(second.as_ptr());
    }

    let report = ledger.to_report();
    let rendered = report.to_string();

    assert_eq!(report.leaked_blocks(), 1);
    assert_eq!(report.leaked_bytes(), 4);
    assert!(rendered.contains("[memtrack] MEMORY LEAK REPORT"));
    assert!(rendered.contains("Leaked blocks: 1"));
    assert!(rendered.contains("Leaked bytes : 4"));
    assert!(rendered.contains(&format!("allocated at {leaked_origin}")));

    // Clean up so this test leaks nothing for real.
    // SAFETY: `third` came from this ledger.
    unsafe { ledger.release(third.as_ptr()) };
    assert_eq!(ledger.to_report().to_string(), "[memtrack] No leaks detected.\n");
}

#[test]
fn report_is_stable_when_nothing_changes() {
    let ledger = Ledger::new();

    let block = ledger.acquire(32, origin!()).expect("allocation failed");

    let first_pass = ledger.to_report().to_string();
    let second_pass = ledger.to_report().to_string();
    assert_eq!(first_pass, second_pass);

    // Taking a report released nothing.
    assert!(ledger.is_tracked(block.as_ptr()));

    // SAFETY: `block` came from this ledger.
    unsafe { ledger.release(block.as_ptr()) };
}

#[test]
fn counters_stay_consistent_through_interleaved_operations() {
    let ledger = Ledger::new();
    let mut live = Vec::new();
    let mut expected_bytes = 0_usize;

    for round in 1_usize..=8 {
        let size = round * 10;
        live.push((ledger.acquire(size, origin!()).expect("allocation failed"), size));
        expected_bytes += size;

        // Release every other round to interleave acquisitions and releases.
        if round % 2 == 0 {
            let (block, released_size) = live.remove(0);
            // SAFETY: every block in `live` came from this ledger.
            unsafe { ledger.release(block.as_ptr()) };
            expected_bytes -= released_size;
        }

        assert_eq!(ledger.live_blocks(), live.len());
        assert_eq!(ledger.live_bytes(), expected_bytes);
    }

    for (block, _) in live {
        // SAFETY: every block in `live` came from this ledger.
        unsafe { ledger.release(block.as_ptr()) };
    }

    assert!(ledger.is_empty());
    assert_eq!(ledger.live_bytes(), 0);
}

#[test]
fn zero_size_acquisition_round_trips() {
    let ledger = Ledger::new();

    // malloc(0) may legally return either a unique block or null; only a
    // unique block produces a record to round-trip.
    if let Ok(block) = ledger.acquire(0, origin!()) {
        assert_eq!(ledger.live_blocks(), 1);
        assert_eq!(ledger.live_bytes(), 0);

        // SAFETY: `block` came from this ledger.
        unsafe { ledger.release(block.as_ptr()) };
        assert!(ledger.is_empty());
    }
}
