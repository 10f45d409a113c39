//! Call-site provenance tags.

use std::fmt;

/// Identifies the code location that requested an acquisition.
///
/// An origin is a lightweight (file, line) tag recorded with every
/// acquisition and echoed back in the leak report. The ledger never
/// interprets it further.
///
/// # Examples
///
/// ```
/// use memtrack::Origin;
///
/// let origin = Origin::new("src/parser.rs", 42);
/// assert_eq!(origin.to_string(), "src/parser.rs:42");
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Origin {
    file: &'static str,
    line: u32,
}

impl Origin {
    /// Creates an origin from a file name and line number.
    ///
    /// Usually invoked through the [`origin!`](crate::origin) macro, which
    /// fills in the call site automatically.
    #[must_use]
    pub const fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }

    /// The source file that made the acquisition call.
    #[must_use]
    pub const fn file(&self) -> &'static str {
        self.file
    }

    /// The line within [`file()`](Self::file) that made the acquisition call.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Captures the current source location as an [`Origin`].
///
/// # Examples
///
/// ```
/// use memtrack::origin;
///
/// let here = origin!();
/// assert_eq!(here.file(), file!());
/// ```
#[macro_export]
macro_rules! origin {
    () => {
        $crate::Origin::new(file!(), line!())
    };
}
