//! Error numbers and the crate-wide error type.
//!
//! Every fallible operation in this crate returns [`Error`]. Each variant maps
//! onto the `<errno.h>` value a C caller would observe through [`Error::errno`].
//! "Not found" is never an error: scanning functions return `Option<usize>`.

use thiserror::Error;

/// Well-known errno constants.
pub const ENOENT: i32 = 2;
pub const EIO: i32 = 5;
pub const ENOMEM: i32 = 12;
pub const EACCES: i32 = 13;
pub const EINVAL: i32 = 22;
pub const ERANGE: i32 = 34;

/// Failure kinds shared by the string, path, and codec modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// Unparseable mode, size, or escape syntax.
    #[error("invalid format: {what} at offset {offset}")]
    InvalidFormat { what: &'static str, offset: usize },
    /// Numeric overflow while accumulating a value.
    #[error("value out of range")]
    OutOfRange,
    /// The allocator could not provide a buffer of the requested size.
    #[error("allocation of {requested} bytes failed")]
    AllocationFailure { requested: usize },
    /// The working-directory collaborator failed.
    #[error("current directory unavailable (errno {errno})")]
    CurrentDirectory { errno: i32 },
}

impl Error {
    pub(crate) const fn invalid(what: &'static str, offset: usize) -> Self {
        Self::InvalidFormat { what, offset }
    }

    /// The errno value a C caller would see for this failure.
    #[must_use]
    pub const fn errno(&self) -> i32 {
        match self {
            Self::InvalidFormat { .. } => EINVAL,
            Self::OutOfRange => ERANGE,
            Self::AllocationFailure { .. } => ENOMEM,
            Self::CurrentDirectory { errno } => *errno,
        }
    }
}

/// Returns the symbolic name of a known errno value.
#[must_use]
pub fn errno_name(errno: i32) -> Option<&'static str> {
    Some(match errno {
        ENOENT => "ENOENT",
        EIO => "EIO",
        ENOMEM => "ENOMEM",
        EACCES => "EACCES",
        EINVAL => "EINVAL",
        ERANGE => "ERANGE",
        _ => return None,
    })
}
