//! Demonstrates the automatic end-of-process leak report.
//!
//! Two blocks are acquired through the process-wide ledger and only one is
//! released. No reporting code appears below: the first acquisition schedules
//! the report, and at exit stderr shows the remaining block with the file and
//! line it was acquired at.
//!
//! Run with: `cargo run --example leak_demo`

fn main() {
    let released = memtrack::acquire!(128).expect("allocation failed");
    let _leaked = memtrack::acquire!(512).expect("allocation failed");

    // SAFETY: `released` came from the process-wide ledger.
    unsafe { memtrack::global::release(released.as_ptr()) };

    println!("exiting with one block still unreleased...");
}
