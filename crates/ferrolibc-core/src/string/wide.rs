//! Wide-character string operations.
//!
//! Corresponds to `<wchar.h>` functions. These operate on `u32` slices
//! representing `wchar_t` strings (NUL-terminated with `0u32`) and share their
//! loops with the byte functions through the generic [`CharUnit`] helpers.
//! Comparisons treat units as signed to match Linux `wchar_t`.

use super::mem::{CharUnit, copy_disjoint, copy_overlapping, fill, scan_backward, scan_forward};
use super::str::{
    unit_cat, unit_chr, unit_compare, unit_copy, unit_dup, unit_find, unit_len, unit_ncopy,
    unit_nlen, unit_rchr, unit_span,
};
use super::strtok::unit_tok;
use crate::errno::Error;

/// Returns the length of a NUL-terminated wide string (not counting the NUL).
///
/// Equivalent to C `wcslen`. If no NUL is found, returns the full slice length.
pub fn wcslen(s: &[u32]) -> usize {
    unit_len(s)
}

/// Equivalent to C `wcsnlen`.
pub fn wcsnlen(s: &[u32], maxlen: usize) -> usize {
    unit_nlen(s, maxlen)
}

/// Copies a NUL-terminated wide string from `src` into `dest`.
///
/// Equivalent to C `wcscpy`. Returns the number of elements copied (including NUL).
///
/// # Panics
///
/// Panics if `dest` is too small to hold `src` plus the NUL terminator.
pub fn wcscpy(dest: &mut [u32], src: &[u32]) -> usize {
    unit_copy(dest, src, "wcscpy") + 1
}

/// Equivalent to GNU `wcpcpy`: returns the index of the NUL written.
///
/// # Panics
///
/// Panics if `dest` is too small.
pub fn wcpcpy(dest: &mut [u32], src: &[u32]) -> usize {
    unit_copy(dest, src, "wcpcpy")
}

/// Copies at most `n` wide characters, NUL-padding a short source.
///
/// Equivalent to C `wcsncpy`. If `src` is `n` or longer, `dest` will NOT be
/// NUL-terminated. Returns `min(n, dest.len())`.
pub fn wcsncpy(dest: &mut [u32], src: &[u32], n: usize) -> usize {
    unit_ncopy(dest, src, n).1
}

/// Appends the wide string `src` to the end of `dest`.
///
/// Equivalent to C `wcscat`. Returns the length of the result (not counting NUL).
///
/// # Panics
///
/// Panics if `dest` does not have room for the result.
pub fn wcscat(dest: &mut [u32], src: &[u32]) -> usize {
    unit_cat(dest, src, usize::MAX, "wcscat")
}

/// Equivalent to C `wcsncat`.
///
/// # Panics
///
/// Panics if `dest` does not have room for the result.
pub fn wcsncat(dest: &mut [u32], src: &[u32], n: usize) -> usize {
    unit_cat(dest, src, n, "wcsncat")
}

/// Compares two NUL-terminated wide strings lexicographically.
///
/// Equivalent to C `wcscmp`.
pub fn wcscmp(s1: &[u32], s2: &[u32]) -> i32 {
    unit_compare(s1, s2, usize::MAX, false).signum()
}

/// Compares at most `n` wide characters of two strings.
///
/// Equivalent to C `wcsncmp`.
pub fn wcsncmp(s1: &[u32], s2: &[u32], n: usize) -> i32 {
    unit_compare(s1, s2, n, false).signum()
}

/// Case-insensitive comparison folding only ASCII letters.
///
/// Equivalent to `wcscasecmp` in the C locale.
pub fn wcscasecmp(s1: &[u32], s2: &[u32]) -> i32 {
    unit_compare(s1, s2, usize::MAX, true).signum()
}

/// Bounded [`wcscasecmp`].
pub fn wcsncasecmp(s1: &[u32], s2: &[u32], n: usize) -> i32 {
    unit_compare(s1, s2, n, true).signum()
}

/// Locates the first occurrence of wide character `c` in string `s`.
///
/// Equivalent to C `wcschr`. The terminating NUL is considered part of the string.
pub fn wcschr(s: &[u32], c: u32) -> Option<usize> {
    unit_chr(s, c)
}

/// Locates the last occurrence of wide character `c` in string `s`.
///
/// Equivalent to C `wcsrchr`. The terminating NUL is considered part of the string.
pub fn wcsrchr(s: &[u32], c: u32) -> Option<usize> {
    unit_rchr(s, c)
}

/// Locates the first occurrence of substring `needle` in `haystack`.
///
/// Equivalent to C `wcsstr`.
pub fn wcsstr(haystack: &[u32], needle: &[u32]) -> Option<usize> {
    unit_find(haystack, needle, false)
}

/// Equivalent to C `wcsspn`.
pub fn wcsspn(s: &[u32], accept: &[u32]) -> usize {
    unit_span(s, accept, true)
}

/// Equivalent to C `wcscspn`.
pub fn wcscspn(s: &[u32], reject: &[u32]) -> usize {
    unit_span(s, reject, false)
}

/// Equivalent to C `wcspbrk`.
pub fn wcspbrk(s: &[u32], accept: &[u32]) -> Option<usize> {
    let at = wcscspn(s, accept);
    (at < wcslen(s)).then_some(at)
}

/// Duplicates a wide string, terminator included. Equivalent to `wcsdup`.
pub fn wcsdup(s: &[u32]) -> Result<Vec<u32>, Error> {
    unit_dup(s, wcslen(s))
}

/// Equivalent to C `wcstok`, with the save pointer made explicit.
pub fn wcstok(s: &mut [u32], delimiters: &[u32], save: &mut Option<usize>) -> Option<(usize, usize)> {
    unit_tok(s, delimiters, save)
}

/// Copies `n` wide characters from `src` to `dest`.
///
/// Equivalent to C `wmemcpy`.
pub fn wmemcpy(dest: &mut [u32], src: &[u32], n: usize) -> usize {
    copy_disjoint(dest, src, n)
}

/// Moves `n` wide characters from offset `src` to offset `dest` within `buf`.
///
/// Equivalent to C `wmemmove`; overlap in either direction is handled.
pub fn wmemmove(buf: &mut [u32], dest: usize, src: usize, n: usize) -> usize {
    copy_overlapping(buf, dest, src, n)
}

/// Fills `n` wide characters of `dest` with `c`.
///
/// Equivalent to C `wmemset`.
pub fn wmemset(dest: &mut [u32], c: u32, n: usize) -> usize {
    fill(dest, c, n)
}

/// Compares `n` wide characters.
///
/// Equivalent to C `wmemcmp`.
pub fn wmemcmp(s1: &[u32], s2: &[u32], n: usize) -> i32 {
    let count = n.min(s1.len()).min(s2.len());
    s1[..count]
        .iter()
        .zip(&s2[..count])
        .find(|(a, b)| a != b)
        .map_or(0, |(a, b)| if a.to_i64() < b.to_i64() { -1 } else { 1 })
}

/// Locates the first occurrence of `c` in the first `n` wide characters of `s`.
///
/// Equivalent to C `wmemchr`.
pub fn wmemchr(s: &[u32], c: u32, n: usize) -> Option<usize> {
    scan_forward(s, c, n)
}

/// Wide counterpart of GNU `memrchr`.
pub fn wmemrchr(s: &[u32], c: u32, n: usize) -> Option<usize> {
    scan_backward(s, c, n)
}

/// Equivalent to GNU `wmempcpy`: returns the index one past the last copied unit.
pub fn wmempcpy(dest: &mut [u32], src: &[u32], n: usize) -> usize {
    copy_disjoint(dest, src, n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(s: &str) -> Vec<u32> {
        s.chars().map(u32::from).chain(core::iter::once(0)).collect()
    }

    #[test]
    fn test_wcslen_basic() {
        assert_eq!(wcslen(&[b'h' as u32, b'i' as u32, 0]), 2);
        assert_eq!(wcslen(&[0]), 0);
        assert_eq!(wcslen(&[65, 66, 67]), 3); // no NUL found
        assert_eq!(wcsnlen(&w("hello"), 2), 2);
    }

    #[test]
    fn test_wcscpy_and_wcpcpy() {
        let mut dest = [7u32; 8];
        assert_eq!(wcscpy(&mut dest, &w("héllo")), 6);
        assert_eq!(&dest[..6], &w("héllo")[..]);
        assert_eq!(wcpcpy(&mut dest, &w("ab")), 2);
    }

    #[test]
    fn test_wcsncpy_padding_trap() {
        let mut dest = [9u32; 4];
        assert_eq!(wcsncpy(&mut dest, &w("abcdef"), 3), 3);
        assert_eq!(dest[3], 9);
        assert_eq!(wcsncpy(&mut dest, &w("a"), 4), 4);
        assert_eq!(&dest, &[u32::from(b'a'), 0, 0, 0]);
    }

    #[test]
    fn test_wcscat() {
        let mut dest = [0u32; 8];
        wcscpy(&mut dest, &w("ab"));
        assert_eq!(wcscat(&mut dest, &w("cd")), 4);
        assert_eq!(&dest[..5], &w("abcd")[..]);
        assert_eq!(wcsncat(&mut dest, &w("xyz"), 1), 5);
    }

    #[test]
    fn test_wcscmp_signed() {
        assert_eq!(wcscmp(&w("abc"), &w("abc")), 0);
        assert_eq!(wcscmp(&w("abc"), &w("abd")), -1);
        // 0xFFFFFFFF is -1 as wchar_t and sorts before 'a'.
        assert_eq!(wcscmp(&[0xFFFF_FFFF, 0], &w("a")), -1);
        assert_eq!(wcsncmp(&w("abcx"), &w("abcy"), 3), 0);
    }

    #[test]
    fn test_wcscasecmp() {
        assert_eq!(wcscasecmp(&w("HeLLo"), &w("hello")), 0);
        assert_ne!(wcscasecmp(&w("É"), &w("é")), 0);
        assert_eq!(wcsncasecmp(&w("ABx"), &w("aby"), 2), 0);
    }

    #[test]
    fn test_wcschr_wcsrchr_terminator() {
        let s = w("abca");
        assert_eq!(wcschr(&s, u32::from(b'a')), Some(0));
        assert_eq!(wcsrchr(&s, u32::from(b'a')), Some(3));
        assert_eq!(wcschr(&s, 0), Some(4));
        assert_eq!(wcsrchr(&s, 0), Some(4));
        assert_eq!(wcschr(&s, u32::from(b'z')), None);
    }

    #[test]
    fn test_wcsstr_and_spans() {
        assert_eq!(wcsstr(&w("hello world"), &w("world")), Some(6));
        assert_eq!(wcsspn(&w("aab"), &w("a")), 2);
        assert_eq!(wcscspn(&w("ab,c"), &w(",")), 2);
        assert_eq!(wcspbrk(&w("ab,c"), &w(",")), Some(2));
        assert_eq!(wcspbrk(&w("abc"), &w(",")), None);
    }

    #[test]
    fn test_wcstok() {
        let mut s = w("a  b");
        let delim = w(" ");
        let mut save = Some(0);
        assert_eq!(wcstok(&mut s, &delim, &mut save), Some((0, 1)));
        assert_eq!(wcstok(&mut s, &delim, &mut save), Some((3, 1)));
        assert_eq!(wcstok(&mut s, &delim, &mut save), None);
    }

    #[test]
    fn test_wmem_family() {
        let mut buf = [1u32, 2, 3, 4, 5];
        assert_eq!(wmemmove(&mut buf, 1, 0, 4), 4);
        assert_eq!(buf, [1, 1, 2, 3, 4]);
        assert_eq!(wmemset(&mut buf, 0, 2), 2);
        assert_eq!(buf, [0, 0, 2, 3, 4]);
        let mut dest = [0u32; 3];
        assert_eq!(wmemcpy(&mut dest, &buf, 3), 3);
        assert_eq!(dest, [0, 0, 2]);
        assert_eq!(wmemchr(&buf, 3, 5), Some(3));
        assert_eq!(wmemrchr(&buf, 0, 5), Some(1));
        assert_eq!(wmempcpy(&mut dest, &[9, 9], 2), 2);
        assert_eq!(wmemcmp(&[1, 2], &[1, 3], 2), -1);
        assert_eq!(wmemcmp(&[0xFFFF_FFFF], &[1], 1), -1);
    }

    #[test]
    fn test_wcsdup() {
        assert_eq!(wcsdup(&w("hi")).unwrap(), w("hi"));
    }
}
