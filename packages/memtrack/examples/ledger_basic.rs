//! Basic `memtrack` usage with an explicit [`Ledger`] instance.
//!
//! Run with: `cargo run --example ledger_basic`

use memtrack::{Ledger, origin};

fn main() {
    let ledger = Ledger::new();

    // Acquire a few blocks through the ledger. The memory is real and ours
    // to use; the ledger only writes down what we took and where.
    let buffer = ledger.acquire(256, origin!()).expect("allocation failed");
    let scratch = ledger.acquire(64, origin!()).expect("allocation failed");

    println!(
        "Live: {} blocks, {} bytes",
        ledger.live_blocks(),
        ledger.live_bytes()
    );

    // Give one back; its record is crossed off.
    // SAFETY: `scratch` came from this ledger.
    unsafe { ledger.release(scratch.as_ptr()) };

    println!(
        "After one release: {} blocks, {} bytes",
        ledger.live_blocks(),
        ledger.live_bytes()
    );

    // Whatever is still recorded shows up as a leak in the report.
    eprint!("{ledger}");

    // Balance the books before exiting.
    // SAFETY: `buffer` came from this ledger.
    unsafe { ledger.release(buffer.as_ptr()) };
    eprint!("{ledger}");
}
