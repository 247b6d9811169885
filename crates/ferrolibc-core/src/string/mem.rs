//! Memory operations: memchr, memrchr, rawmemchr, memcpy, mempcpy, memmove,
//! memccpy, memset, bzero, memcmp, memmem.
//!
//! The scanning and copying loops are written once, generically over
//! [`CharUnit`], and shared by the byte (`mem*`) and wide (`wmem*`) families.
//! Buffers are caller-owned slices; nothing here allocates.

use core::cmp::Ordering;

/// A code unit of a NUL-terminated string: `u8` for `char`, `u32` for `wchar_t`.
pub trait CharUnit: Copy + Eq + Ord + Default + core::fmt::Debug {
    /// The terminating sentinel.
    const NUL: Self;

    /// Lowercases `[A-Z]`; every other value is returned unchanged.
    fn ascii_lower(self) -> Self;

    /// Widens the unit for difference-style comparison results.
    fn to_i64(self) -> i64;
}

impl CharUnit for u8 {
    const NUL: Self = 0;

    #[inline]
    fn ascii_lower(self) -> Self {
        self.to_ascii_lowercase()
    }

    #[inline]
    fn to_i64(self) -> i64 {
        i64::from(self)
    }
}

impl CharUnit for u32 {
    const NUL: Self = 0;

    #[inline]
    fn ascii_lower(self) -> Self {
        if (u32::from(b'A')..=u32::from(b'Z')).contains(&self) {
            self + 32
        } else {
            self
        }
    }

    // wchar_t is a signed 32-bit type on Linux.
    #[inline]
    fn to_i64(self) -> i64 {
        i64::from(self as i32)
    }
}

/// Outcome of [`copy_until`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyUntil {
    /// The stop unit was found at offset `at`; units `0..at` were copied and
    /// the stop unit itself was not.
    Stopped { at: usize },
    /// The limit was reached without meeting the stop unit.
    Exhausted { copied: usize },
}

// ----------------------------------------------------------------------------
// Generic scanning
// ----------------------------------------------------------------------------

/// Returns the offset of the first `needle` within the first `limit` units.
///
/// An empty buffer or a zero limit never matches.
#[inline]
pub fn scan_forward<T: CharUnit>(buf: &[T], needle: T, limit: usize) -> Option<usize> {
    let count = limit.min(buf.len());
    buf[..count].iter().position(|&u| u == needle)
}

/// Returns the offset of the last `needle` within the first `limit` units.
///
/// This searches raw content only: a `needle` of `NUL` finds a zero unit
/// stored inside the view, not the implicit end of a C string. Use
/// [`super::str::strrchr`] for the latter question.
#[inline]
pub fn scan_backward<T: CharUnit>(buf: &[T], needle: T, limit: usize) -> Option<usize> {
    let count = limit.min(buf.len());
    buf[..count].iter().rposition(|&u| u == needle)
}

/// Unbounded scan for a `needle` the caller guarantees is present.
///
/// Safe slices cannot be over-read, so a broken contract yields `buf.len()`
/// in release builds and a panic in debug builds.
#[inline]
pub fn scan_assume_present<T: CharUnit>(buf: &[T], needle: T) -> usize {
    let found = buf.iter().position(|&u| u == needle);
    debug_assert!(found.is_some(), "needle {needle:?} is not present");
    found.unwrap_or(buf.len())
}

// ----------------------------------------------------------------------------
// Generic copying
// ----------------------------------------------------------------------------

/// Forward copy between two disjoint views. Returns the number of units copied,
/// `min(n, dest.len(), src.len())`.
#[inline]
pub fn copy_disjoint<T: CharUnit>(dest: &mut [T], src: &[T], n: usize) -> usize {
    let count = n.min(dest.len()).min(src.len());
    dest[..count].copy_from_slice(&src[..count]);
    count
}

/// Moves `n` units from offset `src` to offset `dest` inside one buffer.
///
/// When the destination starts inside the source region the copy runs from
/// the highest offset down, otherwise it runs forward; either way the result
/// equals a copy through a temporary buffer. The count is clamped so both
/// regions stay inside `buf`. Returns the number of units moved.
pub fn copy_overlapping<T: CharUnit>(buf: &mut [T], dest: usize, src: usize, n: usize) -> usize {
    let count = n
        .min(buf.len().saturating_sub(dest))
        .min(buf.len().saturating_sub(src));
    if count == 0 || dest == src {
        return count;
    }

    if dest > src && dest < src + count {
        for i in (0..count).rev() {
            buf[dest + i] = buf[src + i];
        }
    } else {
        for i in 0..count {
            buf[dest + i] = buf[src + i];
        }
    }
    count
}

/// Copies units from `src` to `dest` until `stop` is met or `limit` units
/// have been copied, whichever comes first.
pub fn copy_until<T: CharUnit>(dest: &mut [T], src: &[T], stop: T, limit: usize) -> CopyUntil {
    let count = limit.min(dest.len()).min(src.len());
    for i in 0..count {
        if src[i] == stop {
            return CopyUntil::Stopped { at: i };
        }
        dest[i] = src[i];
    }
    CopyUntil::Exhausted { copied: count }
}

/// Sets the first `n` units of `dest` to `value`. Returns the number set.
#[inline]
pub fn fill<T: CharUnit>(dest: &mut [T], value: T, n: usize) -> usize {
    let count = n.min(dest.len());
    dest[..count].fill(value);
    count
}

// ----------------------------------------------------------------------------
// Byte wrappers
// ----------------------------------------------------------------------------

/// Scans the first `n` bytes of `haystack` for `needle`.
///
/// Equivalent to C `memchr`.
pub fn memchr(haystack: &[u8], needle: u8, n: usize) -> Option<usize> {
    scan_forward(haystack, needle, n)
}

/// Scans the first `n` bytes of `haystack` for the last `needle`.
///
/// Equivalent to GNU `memrchr`.
pub fn memrchr(haystack: &[u8], needle: u8, n: usize) -> Option<usize> {
    scan_backward(haystack, needle, n)
}

/// Equivalent to GNU `rawmemchr`: the caller guarantees `needle` is present.
pub fn rawmemchr(haystack: &[u8], needle: u8) -> usize {
    scan_assume_present(haystack, needle)
}

/// Copies `n` bytes from `src` to `dest`.
///
/// Equivalent to C `memcpy`. Two Rust slices can never overlap, so the
/// disjointness precondition is enforced by the borrow checker. Only copies
/// `min(n, src.len(), dest.len())` bytes; returns that count.
pub fn memcpy(dest: &mut [u8], src: &[u8], n: usize) -> usize {
    copy_disjoint(dest, src, n)
}

/// Like [`memcpy`] but named after GNU `mempcpy`: the return value is the
/// index of the first unwritten byte in `dest`.
pub fn mempcpy(dest: &mut [u8], src: &[u8], n: usize) -> usize {
    copy_disjoint(dest, src, n)
}

/// Moves `n` bytes from offset `src` to offset `dest` within `buf`.
///
/// Equivalent to C `memmove`; overlap in either direction is handled.
pub fn memmove(buf: &mut [u8], dest: usize, src: usize, n: usize) -> usize {
    copy_overlapping(buf, dest, src, n)
}

/// Copies bytes until `c` is copied or `n` bytes are done.
///
/// Equivalent to POSIX `memccpy`. Returns the index one past the copied `c`,
/// or `None` when `c` did not occur within the copied range.
pub fn memccpy(dest: &mut [u8], src: &[u8], c: u8, n: usize) -> Option<usize> {
    match copy_until(dest, src, c, n) {
        CopyUntil::Stopped { at } => {
            dest[at] = c;
            Some(at + 1)
        }
        CopyUntil::Exhausted { .. } => None,
    }
}

/// Fills the first `n` bytes of `dest` with `value`.
///
/// Equivalent to C `memset(dest, c, n)`. Returns the number of bytes set.
pub fn memset(dest: &mut [u8], value: u8, n: usize) -> usize {
    fill(dest, value, n)
}

/// Zeroes the first `n` bytes of `dest`.
pub fn bzero(dest: &mut [u8], n: usize) {
    fill(dest, 0, n);
}

/// Compares the first `n` bytes of `a` and `b` as unsigned bytes.
///
/// Equivalent to C `memcmp`. Only compares `min(n, a.len(), b.len())` bytes.
pub fn memcmp(a: &[u8], b: &[u8], n: usize) -> Ordering {
    let count = n.min(a.len()).min(b.len());
    a[..count].cmp(&b[..count])
}

/// Finds `needle` inside `haystack`. An empty needle matches at 0.
///
/// Equivalent to GNU `memmem`.
pub fn memmem(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    let first = needle[0];
    let last_start = haystack.len() - needle.len();
    let mut pos = 0;
    while pos <= last_start {
        let hit = pos + scan_forward(&haystack[pos..], first, last_start - pos + 1)?;
        if &haystack[hit..hit + needle.len()] == needle {
            return Some(hit);
        }
        pos = hit + 1;
    }
    None
}
