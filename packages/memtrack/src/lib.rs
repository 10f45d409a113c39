#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Heap allocation ledger for leak diagnostics.
//!
//! This package records every heap acquisition made through it, crosses the
//! record off again on release, and reports whatever is left at process exit
//! as a leak. It is **not** an allocator: every real acquisition and release
//! is delegated to the underlying system allocator, and the ledger only keeps
//! bookkeeping metadata alongside it.
//!
//! This package is not meant for use in production, serving only as a
//! development tool.
//!
//! # Simple usage
//!
//! An explicit [`Ledger`] can be embedded anywhere:
//!
//! ```
//! use memtrack::{Ledger, origin};
//!
//! let ledger = Ledger::new();
//!
//! let block = ledger.acquire(64, origin!()).expect("allocation failed");
//! assert_eq!(ledger.live_blocks(), 1);
//! assert_eq!(ledger.live_bytes(), 64);
//!
//! // SAFETY: `block` came from this ledger's `acquire`.
//! unsafe { ledger.release(block.as_ptr()) };
//! assert!(ledger.is_empty());
//! ```
//!
//! # Process-wide tracking
//!
//! The [`global`] module owns one process-wide ledger. The first successful
//! acquisition through it schedules a leak report to run at normal process
//! termination, so leaking callers are named without any extra code in `main`:
//!
//! ```
//! let block = memtrack::acquire!(128).expect("allocation failed");
//!
//! // SAFETY: `block` came from the process-wide ledger.
//! unsafe { memtrack::global::release(block.as_ptr()) };
//! ```
//!
//! Anything still recorded when the process ends is printed to stderr:
//!
//! ```text
//! ========================================
//! [memtrack] MEMORY LEAK REPORT
//! ----------------------------------------
//! Leak #1: ptr=0x55a3f2d3e010 size=128 allocated at src/main.rs:7
//! ----------------------------------------
//! Leaked blocks: 1
//! Leaked bytes : 128
//! ========================================
//! ```
//!
//! # What this package does not do
//!
//! The ledger never prevents, repairs or mitigates leaks, manages no pools or
//! alignment, and does not detect use-after-release or buffer overruns. A
//! release of an address it has no record of is logged as a warning and
//! forwarded to the real allocator anyway; execution always continues.

mod allocator;
mod constants;
mod ledger;
mod origin;
mod record;
mod report;

pub mod global;

pub use allocator::*;
pub use ledger::*;
pub use origin::*;
pub use report::*;
