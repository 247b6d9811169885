//! String operations: strlen, strnlen, strcpy, stpcpy, strncpy, stpncpy,
//! strcat, strncat, strlcpy, strlcat, strcmp, strncmp, strcasecmp,
//! strncasecmp, strchr, strchrnul, strrchr, strstr, strcasestr, strspn,
//! strcspn, strpbrk, strdup, strndup.
//!
//! These are safe Rust implementations operating on byte slices that represent
//! NUL-terminated C strings. A NUL byte (`0x00`) marks the logical end of the
//! string; reading past the end of a slice behaves as if a NUL were there.
//!
//! The `unit_*` helpers are generic over [`CharUnit`] and also back the wide
//! functions in [`super::wide`].

use super::mem::{CharUnit, CopyUntil, copy_disjoint, copy_until, fill, scan_backward, scan_forward};
use crate::errno::Error;
use crate::malloc;

// ----------------------------------------------------------------------------
// Generic C-string helpers
// ----------------------------------------------------------------------------

#[inline]
fn unit_at<T: CharUnit>(s: &[T], i: usize) -> T {
    s.get(i).copied().unwrap_or(T::NUL)
}

#[inline]
fn clamp_diff(d: i64) -> i32 {
    d.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Offset of the first sentinel, or the slice length when there is none.
#[inline]
pub(crate) fn unit_len<T: CharUnit>(s: &[T]) -> usize {
    scan_forward(s, T::NUL, s.len()).unwrap_or(s.len())
}

#[inline]
pub(crate) fn unit_nlen<T: CharUnit>(s: &[T], maxlen: usize) -> usize {
    let bound = maxlen.min(s.len());
    scan_forward(s, T::NUL, bound).unwrap_or(bound)
}

/// Compares at most `n` units, optionally folding `[A-Z]` to lowercase.
pub(crate) fn unit_compare<T: CharUnit>(s1: &[T], s2: &[T], n: usize, fold: bool) -> i32 {
    for i in 0..n {
        let a = unit_at(s1, i);
        let b = unit_at(s2, i);
        let (la, lb) = if fold {
            (a.ascii_lower(), b.ascii_lower())
        } else {
            (a, b)
        };
        if la != lb {
            return clamp_diff(la.to_i64() - lb.to_i64());
        }
        if a == T::NUL {
            return 0;
        }
    }
    0
}

/// Copies `src` and its terminator into `dest`. Returns the string length.
pub(crate) fn unit_copy<T: CharUnit>(dest: &mut [T], src: &[T], what: &str) -> usize {
    let len = unit_len(src);
    assert!(
        dest.len() > len,
        "{what}: destination buffer too small ({} units for {len} unit string + NUL)",
        dest.len(),
    );
    copy_disjoint(dest, src, len);
    dest[len] = T::NUL;
    len
}

/// `strncpy` core: copies up to `n` units and NUL-pads the rest of the window.
///
/// Returns `(copied, window)`: `copied` is the number of string units copied
/// (also the offset of the first pad unit) and `window` is `min(n, dest.len())`.
/// When `copied == window` no terminator was written.
pub(crate) fn unit_ncopy<T: CharUnit>(dest: &mut [T], src: &[T], n: usize) -> (usize, usize) {
    let window = n.min(dest.len());
    let copied = match copy_until(dest, src, T::NUL, window) {
        CopyUntil::Stopped { at } => at,
        CopyUntil::Exhausted { copied } => copied,
    };
    fill(&mut dest[copied..window], T::NUL, window - copied);
    (copied, window)
}

pub(crate) fn unit_cat<T: CharUnit>(dest: &mut [T], src: &[T], n: usize, what: &str) -> usize {
    let dest_len = unit_len(dest);
    let src_len = unit_nlen(src, n);
    let total = dest_len + src_len;
    assert!(
        dest.len() > total,
        "{what}: destination buffer too small ({} units for {total} unit result + NUL)",
        dest.len(),
    );
    copy_disjoint(&mut dest[dest_len..], src, src_len);
    dest[total] = T::NUL;
    total
}

pub(crate) fn unit_chr<T: CharUnit>(s: &[T], c: T) -> Option<usize> {
    let len = unit_len(s);
    if c == T::NUL {
        // The terminator is part of the searchable buffer.
        return Some(len);
    }
    scan_forward(s, c, len)
}

pub(crate) fn unit_rchr<T: CharUnit>(s: &[T], c: T) -> Option<usize> {
    let len = unit_len(s);
    if c == T::NUL {
        return Some(len);
    }
    scan_backward(s, c, len)
}

/// Length of the prefix of `s` whose units are (or, with `accept == false`,
/// are not) in the NUL-terminated `set`.
pub(crate) fn unit_span<T: CharUnit>(s: &[T], set: &[T], accept: bool) -> usize {
    let s_len = unit_len(s);
    let set = &set[..unit_len(set)];
    s[..s_len]
        .iter()
        .position(|u| set.contains(u) != accept)
        .unwrap_or(s_len)
}

pub(crate) fn unit_find<T: CharUnit>(haystack: &[T], needle: &[T], fold: bool) -> Option<usize> {
    let h_len = unit_len(haystack);
    let n_len = unit_len(needle);
    if n_len == 0 {
        return Some(0);
    }
    if n_len > h_len {
        return None;
    }
    let needle = &needle[..n_len];
    haystack[..h_len].windows(n_len).position(|window| {
        window
            .iter()
            .zip(needle)
            .all(|(&a, &b)| if fold { a.ascii_lower() == b.ascii_lower() } else { a == b })
    })
}

/// Allocates a terminated copy of the first `len` units of `s`.
pub(crate) fn unit_dup<T: CharUnit>(s: &[T], len: usize) -> Result<Vec<T>, Error> {
    let mut out = malloc::allocate(len + 1)?;
    out.extend_from_slice(&s[..len]);
    out.push(T::NUL);
    Ok(out)
}

// ----------------------------------------------------------------------------
// Length
// ----------------------------------------------------------------------------

/// Returns the length of a NUL-terminated byte string (not counting the NUL).
///
/// Equivalent to C `strlen`. If no NUL is found, returns the full slice length.
pub fn strlen(s: &[u8]) -> usize {
    unit_len(s)
}

/// Equivalent to POSIX `strnlen`: like [`strlen`] but never looks past `maxlen`.
pub fn strnlen(s: &[u8], maxlen: usize) -> usize {
    unit_nlen(s, maxlen)
}

// ----------------------------------------------------------------------------
// Copying
// ----------------------------------------------------------------------------

/// Copies a NUL-terminated string from `src` into `dest`.
///
/// Equivalent to C `strcpy`. Returns the number of bytes copied (including the NUL).
///
/// # Panics
///
/// Panics if `dest` is too small to hold the source string plus NUL.
pub fn strcpy(dest: &mut [u8], src: &[u8]) -> usize {
    unit_copy(dest, src, "strcpy") + 1
}

/// Equivalent to POSIX `stpcpy`. Returns the index of the NUL written to `dest`.
///
/// # Panics
///
/// Panics if `dest` is too small to hold the source string plus NUL.
pub fn stpcpy(dest: &mut [u8], src: &[u8]) -> usize {
    unit_copy(dest, src, "stpcpy")
}

/// Copies at most `n` bytes from `src` into `dest`.
///
/// Equivalent to C `strncpy`. If `src` is shorter than `n`, the remainder of
/// the window is filled with NUL bytes. If `src` is `n` or longer, `dest` will
/// NOT be NUL-terminated.
///
/// Returns the number of bytes written to `dest` (always `min(n, dest.len())`).
pub fn strncpy(dest: &mut [u8], src: &[u8], n: usize) -> usize {
    unit_ncopy(dest, src, n).1
}

/// Equivalent to POSIX `stpncpy`: returns the index of the first NUL written,
/// or `min(n, dest.len())` when the copy filled the window without one.
pub fn stpncpy(dest: &mut [u8], src: &[u8], n: usize) -> usize {
    unit_ncopy(dest, src, n).0
}

/// Appends `src` to the end of the NUL-terminated string in `dest`.
///
/// Equivalent to C `strcat`. Returns the length of the result (not counting the NUL).
///
/// # Panics
///
/// Panics if `dest` is too small.
pub fn strcat(dest: &mut [u8], src: &[u8]) -> usize {
    unit_cat(dest, src, usize::MAX, "strcat")
}

/// Appends at most `n` bytes of `src` and always terminates the result.
///
/// Equivalent to C `strncat`.
///
/// # Panics
///
/// Panics if `dest` is too small.
pub fn strncat(dest: &mut [u8], src: &[u8], n: usize) -> usize {
    unit_cat(dest, src, n, "strncat")
}

/// BSD `strlcpy`: copies as much of `src` as fits, always terminating a
/// non-empty `dest`. Returns `strlen(src)`; truncation happened when the
/// return value is `>= dest.len()`.
pub fn strlcpy(dest: &mut [u8], src: &[u8]) -> usize {
    let src_len = strlen(src);
    if let Some(room) = dest.len().checked_sub(1) {
        let n = copy_disjoint(dest, src, src_len.min(room));
        dest[n] = 0;
    }
    src_len
}

/// BSD `strlcat`: appends to the string in `dest` without overrunning it.
/// Returns the length of the string it tried to create.
pub fn strlcat(dest: &mut [u8], src: &[u8]) -> usize {
    let dest_len = strnlen(dest, dest.len());
    if dest_len == dest.len() {
        return dest_len + strlen(src);
    }
    dest_len + strlcpy(&mut dest[dest_len..], src)
}

// ----------------------------------------------------------------------------
// Comparison
// ----------------------------------------------------------------------------

/// Compares two NUL-terminated byte strings lexicographically.
///
/// Equivalent to C `strcmp`. Returns a negative value if `s1 < s2`, zero if
/// equal, positive if `s1 > s2`.
pub fn strcmp(s1: &[u8], s2: &[u8]) -> i32 {
    unit_compare(s1, s2, usize::MAX, false)
}

/// Compares at most `n` bytes of two NUL-terminated byte strings.
///
/// Equivalent to C `strncmp`.
pub fn strncmp(s1: &[u8], s2: &[u8], n: usize) -> i32 {
    unit_compare(s1, s2, n, false)
}

/// Case-insensitive comparison. Only `[A-Z]` is folded; other bytes,
/// including non-ASCII ones, compare raw.
///
/// Equivalent to POSIX `strcasecmp` in the C locale.
pub fn strcasecmp(s1: &[u8], s2: &[u8]) -> i32 {
    unit_compare(s1, s2, usize::MAX, true)
}

/// Bounded [`strcasecmp`]; stops at the first terminator even inside the bound.
pub fn strncasecmp(s1: &[u8], s2: &[u8], n: usize) -> i32 {
    unit_compare(s1, s2, n, true)
}

// ----------------------------------------------------------------------------
// Searching
// ----------------------------------------------------------------------------

/// Locates the first occurrence of `c` in `s`.
///
/// Equivalent to C `strchr`. Searching for NUL returns the index of the terminator.
pub fn strchr(s: &[u8], c: u8) -> Option<usize> {
    unit_chr(s, c)
}

/// Equivalent to GNU `strchrnul`: like [`strchr`] but returns the terminator
/// index instead of `None`.
pub fn strchrnul(s: &[u8], c: u8) -> usize {
    unit_chr(s, c).unwrap_or_else(|| strlen(s))
}

/// Locates the last occurrence of `c` in `s`.
///
/// Equivalent to C `strrchr`. Searching for NUL returns the index of the
/// terminator, which is a different question from [`super::mem::memrchr`]
/// searching for a zero byte.
pub fn strrchr(s: &[u8], c: u8) -> Option<usize> {
    unit_rchr(s, c)
}

/// Finds the first occurrence of `needle` in `haystack`.
///
/// Equivalent to C `strstr`. An empty needle matches at 0.
pub fn strstr(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    unit_find(haystack, needle, false)
}

/// ASCII case-insensitive [`strstr`]. Equivalent to GNU `strcasestr`.
pub fn strcasestr(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    unit_find(haystack, needle, true)
}

/// Length of the initial segment of `s` made only of bytes in `accept`.
///
/// Equivalent to C `strspn`.
pub fn strspn(s: &[u8], accept: &[u8]) -> usize {
    unit_span(s, accept, true)
}

/// Length of the initial segment of `s` made only of bytes NOT in `reject`.
///
/// Equivalent to C `strcspn`.
pub fn strcspn(s: &[u8], reject: &[u8]) -> usize {
    unit_span(s, reject, false)
}

/// Locates the first byte of `s` that is in `accept`.
///
/// Equivalent to C `strpbrk`.
pub fn strpbrk(s: &[u8], accept: &[u8]) -> Option<usize> {
    let at = strcspn(s, accept);
    (at < strlen(s)).then_some(at)
}

// ----------------------------------------------------------------------------
// Duplication
// ----------------------------------------------------------------------------

/// Duplicates a NUL-terminated string, terminator included.
///
/// An absent input is not an error and yields `Ok(None)`; allocator failure
/// is reported as [`Error::AllocationFailure`].
pub fn strdup(s: Option<&[u8]>) -> Result<Option<Vec<u8>>, Error> {
    s.map(|s| unit_dup(s, strlen(s))).transpose()
}

/// Duplicates at most `n` bytes of a string; the copy is always terminated.
pub fn strndup(s: Option<&[u8]>, n: usize) -> Result<Option<Vec<u8>>, Error> {
    s.map(|s| unit_dup(s, strnlen(s, n))).transpose()
}
