//! Bookkeeping records for live allocations.

use crate::Origin;

/// One outstanding acquisition.
///
/// The address is not stored here; the ledger keys its record collection by
/// address, so the record only carries what the report needs.
#[derive(Clone, Copy, Debug)]
pub(crate) struct AllocationRecord {
    /// Bytes requested by the caller, not the allocator's rounded-up size.
    pub(crate) size: usize,

    pub(crate) origin: Origin,

    /// Position in acquisition order; later acquisitions get larger values.
    /// Lets the report list most-recent-first even though the record
    /// collection itself is unordered.
    pub(crate) seq: u64,
}
