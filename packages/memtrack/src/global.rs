//! The process-wide ledger and its end-of-process report.
//!
//! There is exactly one ledger behind this module. The first successful
//! [`acquire`] schedules the leak report to run at normal process
//! termination; registration happens exactly once no matter how many
//! acquisitions occur, and the report pass itself only reads.
//!
//! # Examples
//!
//! ```
//! let block = memtrack::acquire!(64).expect("allocation failed");
//!
//! // SAFETY: `block` came from the process-wide ledger.
//! unsafe { memtrack::global::release(block.as_ptr()) };
//! ```

use std::ptr::NonNull;
use std::sync::{LazyLock, Once};

use crate::{AcquireError, Ledger, Origin, SystemAllocator};

static LEDGER: LazyLock<Ledger<SystemAllocator>> = LazyLock::new(Ledger::new);

// One-shot: the report must be scheduled exactly once per process.
static REPORT_HOOK: Once = Once::new();

/// The process-wide ledger behind [`acquire`] and [`release`].
#[must_use]
pub fn ledger() -> &'static Ledger<SystemAllocator> {
    &LEDGER
}

/// Acquires `size` bytes through the process-wide ledger.
///
/// The first successful call schedules the leak report to run at normal
/// process termination; nothing further is required from the caller's main
/// logic.
///
/// # Errors
///
/// Same contract as [`Ledger::acquire`]: the caller holds no memory and the
/// ledger is unchanged.
pub fn acquire(size: usize, origin: Origin) -> Result<NonNull<u8>, AcquireError> {
    let block = LEDGER.acquire(size, origin)?;

    REPORT_HOOK.call_once(|| {
        // SAFETY: `report_at_exit` is a plain extern "C" fn; atexit has no
        // other preconditions.
        unsafe {
            libc::atexit(report_at_exit);
        }
    });

    Ok(block)
}

/// Releases `ptr` through the process-wide ledger.
///
/// # Safety
///
/// Same contract as [`Ledger::release`]: `ptr` must be null or a pointer
/// previously returned by [`acquire`] and not released since.
pub unsafe fn release(ptr: *mut u8) {
    // SAFETY: the caller's contract is forwarded unchanged.
    unsafe { LEDGER.release(ptr) };
}

/// Walks whatever records remain when the process terminates normally.
extern "C" fn report_at_exit() {
    LEDGER.to_report().print_to_stderr();
}

/// Acquires memory through the process-wide ledger, capturing the call site.
///
/// Expands to [`global::acquire`](crate::global::acquire) with
/// [`origin!`](crate::origin) filled in. This is the explicit-wrapper
/// counterpart of a C-style `malloc` redirection macro: call sites opt in by
/// name instead of being rewritten invisibly.
///
/// # Examples
///
/// ```
/// let block = memtrack::acquire!(256).expect("allocation failed");
///
/// // SAFETY: `block` came from the process-wide ledger.
/// unsafe { memtrack::global::release(block.as_ptr()) };
/// ```
#[macro_export]
macro_rules! acquire {
    ($size:expr) => {
        $crate::global::acquire($size, $crate::origin!())
    };
}
