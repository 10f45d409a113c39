//! The seam between the ledger and the real memory allocator.

use std::ptr::NonNull;

/// Performs the real acquisitions and releases that the ledger merely records.
///
/// The ledger owns no memory management logic of its own; everything flows
/// through an implementation of this trait. Production use goes through
/// [`SystemAllocator`]; tests inject doubles that fail on demand or hand out
/// fake addresses.
pub trait RawAllocator: Send + Sync {
    /// Acquires `size` bytes from the real allocator.
    ///
    /// Returns `None` when the allocator cannot provide the memory. A zero
    /// `size` is legal and behaves like the underlying allocator's zero-size
    /// acquisition.
    fn allocate(&self, size: usize) -> Option<NonNull<u8>>;

    /// Releases a block previously returned by [`allocate`](Self::allocate).
    ///
    /// Implementations must treat a null pointer as a no-op.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a pointer the real allocator accepts for
    /// release.
    unsafe fn deallocate(&self, ptr: *mut u8);
}

/// The process's C runtime allocator (`malloc`/`free`).
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemAllocator;

impl RawAllocator for SystemAllocator {
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        // SAFETY: malloc has no preconditions; any size is legal, including zero.
        let ptr = unsafe { libc::malloc(size) };
        NonNull::new(ptr.cast())
    }

    unsafe fn deallocate(&self, ptr: *mut u8) {
        // SAFETY: free accepts null and any pointer malloc returned; the
        // caller guarantees `ptr` is one of those.
        unsafe { libc::free(ptr.cast()) };
    }
}
