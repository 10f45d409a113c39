//! The bookkeeping engine that records live allocations.

use std::collections::HashMap;
use std::fmt;
use std::ptr::NonNull;
use std::sync::Mutex;

use thiserror::Error;

use crate::Origin;
use crate::allocator::{RawAllocator, SystemAllocator};
use crate::constants::ERR_POISONED_LOCK;
use crate::record::AllocationRecord;
use crate::report::{Leak, LeakReport};

/// Errors returned by [`Ledger::acquire`].
///
/// The error contract mirrors the real allocator's own: failure means the
/// caller holds no usable memory and the ledger's state is unchanged.
#[derive(Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum AcquireError {
    /// The real allocator could not provide the requested block.
    #[error("real allocator failed to provide {size} bytes")]
    AllocationFailed {
        /// Bytes the caller requested.
        size: usize,
    },

    /// The block itself was acquired but the ledger could not store a record
    /// for it. The block has already been given back to the real allocator so
    /// that the bookkeeping's own failure does not leak.
    #[error("ledger could not store a record for a {size} byte block")]
    RecordAllocationFailed {
        /// Bytes the caller requested.
        size: usize,
    },
}

/// Records plus running aggregates, guarded as one unit so the aggregates can
/// never be observed out of sync with the record collection.
#[derive(Debug, Default)]
struct LedgerState {
    records: HashMap<usize, AllocationRecord>,

    /// Always equals `records.len()`.
    live_blocks: usize,

    /// Always equals the sum of the record sizes.
    live_bytes: usize,

    next_seq: u64,
}

/// The allocation ledger: records every acquisition made through it and
/// crosses the record off again on release.
///
/// The ledger delegates the real memory work to its [`RawAllocator`] and only
/// maintains metadata. It never releases a caller's memory on its own; a
/// block whose release never happens stays in the ledger and shows up in
/// [`to_report()`](Self::to_report) as a leak.
///
/// All operations take a single internal lock, so a ledger can be shared
/// freely across threads; concurrent calls execute in some total order.
///
/// # Examples
///
/// ```
/// use memtrack::{Ledger, origin};
///
/// let ledger = Ledger::new();
///
/// let block = ledger.acquire(16, origin!()).expect("allocation failed");
/// assert_eq!(ledger.live_blocks(), 1);
///
/// // SAFETY: `block` came from this ledger's `acquire`.
/// unsafe { ledger.release(block.as_ptr()) };
/// assert!(ledger.is_empty());
/// ```
#[derive(Debug)]
pub struct Ledger<A = SystemAllocator>
where
    A: RawAllocator,
{
    allocator: A,
    state: Mutex<LedgerState>,
}

impl Ledger<SystemAllocator> {
    /// Creates a ledger that delegates to the system allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_allocator(SystemAllocator)
    }
}

impl Default for Ledger<SystemAllocator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Ledger<A>
where
    A: RawAllocator,
{
    /// Creates a ledger that delegates to the provided real allocator.
    #[must_use]
    pub fn with_allocator(allocator: A) -> Self {
        Self {
            allocator,
            state: Mutex::new(LedgerState::default()),
        }
    }

    /// Acquires `size` bytes and records the acquisition.
    ///
    /// The returned memory belongs entirely to the caller; the ledger only
    /// keeps metadata about it. Every call creates a fresh record, even for
    /// identical arguments. `size` may be zero.
    ///
    /// # Errors
    ///
    /// [`AcquireError::AllocationFailed`] when the real allocator has no
    /// memory to give. [`AcquireError::RecordAllocationFailed`] when the
    /// bookkeeping itself cannot be stored; the just-acquired block has
    /// already been released by then. Either way the ledger is unchanged.
    pub fn acquire(&self, size: usize, origin: Origin) -> Result<NonNull<u8>, AcquireError> {
        let block = self
            .allocator
            .allocate(size)
            .ok_or(AcquireError::AllocationFailed { size })?;

        let mut state = self.state.lock().expect(ERR_POISONED_LOCK);

        if state.records.try_reserve(1).is_err() {
            drop(state);

            // Do not leak the block just because its bookkeeping failed.
            // SAFETY: `block` came from our own allocator and was never
            // handed to the caller.
            unsafe { self.allocator.deallocate(block.as_ptr()) };

            return Err(AcquireError::RecordAllocationFailed { size });
        }

        let seq = state.next_seq;
        state.next_seq = state.next_seq.wrapping_add(1);

        state
            .records
            .insert(block.as_ptr() as usize, AllocationRecord { size, origin, seq });

        state.live_blocks = state
            .live_blocks
            .checked_add(1)
            .expect("live block count overflows usize - this indicates an unrealistic scenario");
        state.live_bytes = state
            .live_bytes
            .checked_add(size)
            .expect("live byte total overflows usize - this indicates an unrealistic scenario");

        Ok(block)
    }

    /// Releases a block and crosses its record off the ledger.
    ///
    /// A null `ptr` performs the real no-op release without consulting the
    /// ledger. A pointer the ledger has no record of (a double release, or
    /// memory not obtained through [`acquire`](Self::acquire)) emits a
    /// warning on stderr and is still released for real: the caller's release
    /// intent is never silently dropped, since swallowing it would itself
    /// leak at the real-allocator level. Execution always continues.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a pointer previously returned by this ledger's
    /// [`acquire`](Self::acquire) and not released since. Anything else is
    /// forwarded to the real allocator, which the ledger survives but the
    /// allocator may not.
    pub unsafe fn release(&self, ptr: *mut u8) {
        if ptr.is_null() {
            // SAFETY: the real allocator treats null as a no-op.
            unsafe { self.allocator.deallocate(ptr) };
            return;
        }

        let removed = {
            let mut state = self.state.lock().expect(ERR_POISONED_LOCK);
            let removed = state.records.remove(&(ptr as usize));

            if let Some(record) = removed {
                state.live_blocks = state
                    .live_blocks
                    .checked_sub(1)
                    .expect("live block count underflow - counters out of sync with records");
                state.live_bytes = state
                    .live_bytes
                    .checked_sub(record.size)
                    .expect("live byte total underflow - counters out of sync with records");
            }

            removed
        };

        if removed.is_none() {
            eprintln!("{}", unknown_release_warning(ptr));
        }

        // SAFETY: the caller guarantees `ptr` is acceptable to the real
        // allocator.
        unsafe { self.allocator.deallocate(ptr) };
    }

    /// Takes a snapshot of every acquisition still outstanding.
    ///
    /// Purely observational: the ledger is not modified and the leaked blocks
    /// are not released. Leaks are listed most recent acquisition first.
    #[must_use]
    pub fn to_report(&self) -> LeakReport {
        let mut leaks: Vec<(u64, Leak)> = {
            let state = self.state.lock().expect(ERR_POISONED_LOCK);
            state
                .records
                .iter()
                .map(|(&address, record)| {
                    (record.seq, Leak::new(address, record.size, record.origin))
                })
                .collect()
        };

        leaks.sort_unstable_by(|a, b| b.0.cmp(&a.0));

        LeakReport::new(leaks.into_iter().map(|(_, leak)| leak).collect())
    }

    /// The number of currently live acquisitions.
    #[must_use]
    pub fn live_blocks(&self) -> usize {
        self.state.lock().expect(ERR_POISONED_LOCK).live_blocks
    }

    /// The total bytes across all currently live acquisitions.
    #[must_use]
    pub fn live_bytes(&self) -> usize {
        self.state.lock().expect(ERR_POISONED_LOCK).live_bytes
    }

    /// Whether the ledger holds no live acquisitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state
            .lock()
            .expect(ERR_POISONED_LOCK)
            .records
            .is_empty()
    }

    /// Whether `ptr` is currently recorded as live.
    #[must_use]
    pub fn is_tracked(&self, ptr: *const u8) -> bool {
        self.state
            .lock()
            .expect(ERR_POISONED_LOCK)
            .records
            .contains_key(&(ptr as usize))
    }
}

impl<A> fmt::Display for Ledger<A>
where
    A: RawAllocator,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Delegate to the report's rendering for consistency.
        write!(f, "{}", self.to_report())
    }
}

/// The warning emitted when a release has no matching record.
pub(crate) fn unknown_release_warning(ptr: *mut u8) -> String {
    format!("[memtrack] Warning: free({ptr:p}) not found in tracker records")
}
