//! Leak reports produced by walking a ledger's remaining records.

use std::fmt;

use crate::Origin;

/// One leaked block in a [`LeakReport`].
#[derive(Clone, Copy, Debug)]
pub struct Leak {
    address: usize,
    size: usize,
    origin: Origin,
}

impl Leak {
    pub(crate) fn new(address: usize, size: usize, origin: Origin) -> Self {
        Self {
            address,
            size,
            origin,
        }
    }

    /// The address that was handed to the caller and never released.
    ///
    /// Only an identity; the report never dereferences it.
    #[must_use]
    pub fn address(&self) -> usize {
        self.address
    }

    /// Bytes the caller requested for this block.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// The call site that made the acquisition.
    #[must_use]
    pub fn origin(&self) -> Origin {
        self.origin
    }
}

impl fmt::Display for Leak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ptr={:p} size={} allocated at {}",
            self.address as *const u8, self.size, self.origin
        )
    }
}

/// Snapshot of every acquisition that had no matching release when the
/// snapshot was taken.
///
/// Purely observational: producing and rendering a report changes nothing and
/// releases nothing. Rendering the same report twice gives identical text.
///
/// # Examples
///
/// ```
/// use memtrack::Ledger;
///
/// let ledger = Ledger::new();
/// let report = ledger.to_report();
///
/// assert!(report.is_empty());
/// assert_eq!(report.to_string(), "[memtrack] No leaks detected.\n");
/// ```
#[derive(Clone, Debug)]
pub struct LeakReport {
    /// Most recent acquisition first.
    leaks: Vec<Leak>,
    leaked_bytes: usize,
}

impl LeakReport {
    pub(crate) fn new(leaks: Vec<Leak>) -> Self {
        let leaked_bytes = leaks.iter().fold(0_usize, |total, leak| {
            total
                .checked_add(leak.size())
                .expect("leaked byte total overflows usize - this indicates an unrealistic scenario")
        });

        Self {
            leaks,
            leaked_bytes,
        }
    }

    /// Whether the report holds no leaks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaks.is_empty()
    }

    /// The number of leaked blocks.
    #[must_use]
    pub fn leaked_blocks(&self) -> usize {
        self.leaks.len()
    }

    /// The total bytes across all leaked blocks.
    #[must_use]
    pub fn leaked_bytes(&self) -> usize {
        self.leaked_bytes
    }

    /// Iterates over the leaks, most recent acquisition first.
    pub fn leaks(&self) -> impl Iterator<Item = &Leak> {
        self.leaks.iter()
    }

    /// Writes the report to stderr, the diagnostic stream.
    ///
    /// Leaks are a terminal diagnostic, not a runtime error; printing them
    /// does not affect the process exit code.
    #[cfg_attr(test, mutants::skip)] // Too difficult to test stderr output reliably - manually tested.
    pub fn print_to_stderr(&self) {
        eprint!("{self}");
    }
}

impl fmt::Display for LeakReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.leaks.is_empty() {
            return writeln!(f, "[memtrack] No leaks detected.");
        }

        writeln!(f, "========================================")?;
        writeln!(f, "[memtrack] MEMORY LEAK REPORT")?;
        writeln!(f, "----------------------------------------")?;

        for (n, leak) in (1_usize..).zip(self.leaks.iter()) {
            writeln!(f, "Leak #{n}: {leak}")?;
        }

        writeln!(f, "----------------------------------------")?;
        writeln!(f, "Leaked blocks: {}", self.leaks.len())?;
        writeln!(f, "Leaked bytes : {}", self.leaked_bytes)?;
        writeln!(f, "========================================")
    }
}
