//! Runtime defaults.
//!
//! Two environment variables select the defaults used by the `*_default`
//! entry points of the codecs:
//! - `FERROLIBC_SIZE_UNITS`: `si`/`decimal` (default) or `iec`/`binary`/`jedec`.
//!   Decides whether a bare unit prefix such as `K` means 1000 or 1024.
//! - `FERROLIBC_ESCAPE_UNKNOWN`: `fail` (default), `keep`, or `drop`.
//!   Decides what `unescape_default` does with an unrecognized `\c` sequence.
//!
//! Unknown values fall back to the default. Each variable is read once and the
//! result is cached for the life of the process.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::escape::UnescapeMode;
use crate::size::SizeMode;

/// Policy for backslash sequences the unescaper does not recognize.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnknownEscape {
    /// Reject the whole input with an invalid-format error.
    #[default]
    Fail,
    /// Copy the backslash and the following byte through unchanged.
    Keep,
    /// Drop the backslash and copy the following byte.
    Drop,
}

impl UnknownEscape {
    /// Parse from string (case-insensitive).
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" | "verbatim" => Self::Keep,
            "drop" | "strip" => Self::Drop,
            _ => Self::Fail,
        }
    }

    /// The unescape flags carrying this policy, UTF-8 target.
    #[must_use]
    pub const fn mode(self) -> UnescapeMode {
        match self {
            Self::Fail => UnescapeMode::empty(),
            Self::Keep => UnescapeMode::KEEP_UNKNOWN,
            Self::Drop => UnescapeMode::DROP_UNKNOWN,
        }
    }
}

impl SizeMode {
    /// Parse from string (case-insensitive).
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "iec" | "binary" | "jedec" | "1024" => Self::Binary,
            _ => Self::Decimal,
        }
    }
}

// Cache states: 0=unresolved, 255=resolving, otherwise 1 + the enum index.
const UNRESOLVED: u8 = 0;
const RESOLVING: u8 = 255;

static CACHED_SIZE_UNITS: AtomicU8 = AtomicU8::new(UNRESOLVED);
static CACHED_ESCAPE_UNKNOWN: AtomicU8 = AtomicU8::new(UNRESOLVED);

/// Resolves one cached setting. Concurrent first calls that lose the race see
/// `None` and use the default until the winner has stored the value.
fn resolve_cached(slot: &AtomicU8, var: &str, parse: impl FnOnce(&str) -> u8) -> Option<u8> {
    let cached = slot.load(Ordering::Acquire);
    if cached != UNRESOLVED && cached != RESOLVING {
        return Some(cached);
    }
    if cached == RESOLVING
        || slot
            .compare_exchange(UNRESOLVED, RESOLVING, Ordering::SeqCst, Ordering::Relaxed)
            .is_err()
    {
        let v = slot.load(Ordering::Acquire);
        return (v != UNRESOLVED && v != RESOLVING).then_some(v);
    }

    let raw = std::env::var(var).unwrap_or_default();
    let value = parse(&raw);
    slot.store(value, Ordering::Release);
    Some(value)
}

fn size_mode_to_u8(mode: SizeMode) -> u8 {
    match mode {
        SizeMode::Decimal => 1,
        SizeMode::Binary => 2,
    }
}

fn u8_to_size_mode(v: u8) -> SizeMode {
    if v == 2 { SizeMode::Binary } else { SizeMode::Decimal }
}

fn unknown_to_u8(policy: UnknownEscape) -> u8 {
    match policy {
        UnknownEscape::Fail => 1,
        UnknownEscape::Keep => 2,
        UnknownEscape::Drop => 3,
    }
}

fn u8_to_unknown(v: u8) -> UnknownEscape {
    match v {
        2 => UnknownEscape::Keep,
        3 => UnknownEscape::Drop,
        _ => UnknownEscape::Fail,
    }
}

/// The configured meaning of unit prefixes without an explicit `i` marker.
#[must_use]
pub fn size_units() -> SizeMode {
    resolve_cached(&CACHED_SIZE_UNITS, "FERROLIBC_SIZE_UNITS", |raw| {
        size_mode_to_u8(SizeMode::from_str_loose(raw))
    })
    .map_or(SizeMode::Decimal, u8_to_size_mode)
}

/// The configured unknown-escape policy.
#[must_use]
pub fn escape_unknown() -> UnknownEscape {
    resolve_cached(&CACHED_ESCAPE_UNKNOWN, "FERROLIBC_ESCAPE_UNKNOWN", |raw| {
        unknown_to_u8(UnknownEscape::from_str_loose(raw))
    })
    .map_or(UnknownEscape::Fail, u8_to_unknown)
}
