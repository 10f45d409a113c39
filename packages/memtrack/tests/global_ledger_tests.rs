//! Integration tests for the process-wide ledger.
//!
//! All assertions live in a single test function because every test in this
//! binary shares the one process-wide ledger; separate functions would race
//! against each other's counters.

use memtrack::{acquire, global, origin};

#[test]
fn process_wide_ledger_tracks_and_releases() {
    let ledger = global::ledger();
    let blocks_before = ledger.live_blocks();
    let bytes_before = ledger.live_bytes();

    // The macro form fills in the call site.
    let first = acquire!(96).expect("allocation failed");
    assert!(ledger.is_tracked(first.as_ptr()));

    // The function form takes an explicit origin.
    let second = global::acquire(32, origin!()).expect("allocation failed");
    assert!(ledger.is_tracked(second.as_ptr()));

    assert_eq!(ledger.live_blocks(), blocks_before + 2);
    assert_eq!(ledger.live_bytes(), bytes_before + 128);

    // The report names both while they are live.
    let report = ledger.to_report();
    assert!(report.leaked_blocks() >= 2);

    // SAFETY: both blocks came from the process-wide ledger.
    unsafe {
        global::release(first.as_ptr());
        global::release(second.as_ptr());
    }

    assert_eq!(ledger.live_blocks(), blocks_before);
    assert_eq!(ledger.live_bytes(), bytes_before);

    // Null release is always accepted and touches nothing.
    // SAFETY: null is always legal to release.
    unsafe { global::release(std::ptr::null_mut()) };
    assert_eq!(ledger.live_blocks(), blocks_before);

    // When this process exits, the atexit hook registered by the first
    // acquisition prints the report; with everything balanced it will say
    // "[memtrack] No leaks detected." on stderr.
}
