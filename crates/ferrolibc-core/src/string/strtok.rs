//! String tokenization: strsep, strtok_r, strtok, and the [`Tokenizer`] context.
//!
//! Tokens are reported as `(start, len)` pairs into the caller's buffer. The
//! delimiter that ends a token is overwritten with NUL, so after the call
//! `&s[start..start + len]` is itself a terminated C string.
//!
//! The cursor is an `Option<usize>`: `Some(offset)` is where the next scan
//! begins and `None` is the exhausted state, after which every call reports
//! "no more tokens".

use parking_lot::{Mutex, const_mutex};

use super::mem::CharUnit;
use super::str::unit_len;

/// Returns true if `u` is in the NUL-terminated `delimiters` set.
fn is_delim<T: CharUnit>(u: T, delimiters: &[T]) -> bool {
    delimiters
        .iter()
        .take_while(|&&d| d != T::NUL)
        .any(|&d| d == u)
}

/// `strsep` core: every delimiter ends a token, so empty tokens are reported.
pub(crate) fn unit_sep<T: CharUnit>(
    s: &mut [T],
    cursor: &mut Option<usize>,
    delimiters: &[T],
) -> Option<(usize, usize)> {
    let start = (*cursor)?;
    let end = start + unit_len(s.get(start..).unwrap_or(&[]));
    match (start..end).find(|&i| is_delim(s[i], delimiters)) {
        Some(at) => {
            s[at] = T::NUL;
            *cursor = Some(at + 1);
            Some((start, at - start))
        }
        None => {
            *cursor = None;
            Some((start, end - start))
        }
    }
}

/// `strtok_r` core: runs of delimiters are skipped, empty tokens never appear.
pub(crate) fn unit_tok<T: CharUnit>(
    s: &mut [T],
    delimiters: &[T],
    cursor: &mut Option<usize>,
) -> Option<(usize, usize)> {
    let mut pos = (*cursor)?;
    let len = s.len();

    // Skip leading delimiters.
    while pos < len && s[pos] != T::NUL && is_delim(s[pos], delimiters) {
        pos += 1;
    }

    if pos >= len || s[pos] == T::NUL {
        *cursor = None;
        return None;
    }

    let token_start = pos;
    while pos < len && s[pos] != T::NUL && !is_delim(s[pos], delimiters) {
        pos += 1;
    }
    let token_len = pos - token_start;

    if pos < len && s[pos] != T::NUL {
        s[pos] = T::NUL;
        *cursor = Some(pos + 1);
    } else {
        *cursor = None;
    }
    Some((token_start, token_len))
}

/// BSD `strsep`.
///
/// Returns the next token starting at `cursor`, which may be empty when two
/// delimiters are adjacent or the string ends with a delimiter. Start with
/// `Some(0)`.
pub fn strsep(s: &mut [u8], cursor: &mut Option<usize>, delimiters: &[u8]) -> Option<(usize, usize)> {
    unit_sep(s, cursor, delimiters)
}

/// Reentrant string tokenizer, POSIX `strtok_r`.
///
/// `save` holds the position for the next call (start with `Some(0)`), making
/// this safe for concurrent use on different strings.
pub fn strtok_r(s: &mut [u8], delimiters: &[u8], save: &mut Option<usize>) -> Option<(usize, usize)> {
    unit_tok(s, delimiters, save)
}

/// Whether a [`Tokenizer`] reports empty tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStyle {
    /// `strsep` behavior: adjacent delimiters produce empty tokens.
    Separate,
    /// `strtok` behavior: delimiter runs are skipped.
    SkipEmpty,
}

/// Explicit tokenizer context: the cursor that C hides in a static,
/// carried by the caller instead.
#[derive(Debug, Clone)]
pub struct Tokenizer<'d> {
    delimiters: &'d [u8],
    style: TokenStyle,
    cursor: Option<usize>,
}

impl<'d> Tokenizer<'d> {
    /// Creates a tokenizer positioned at the start of the string.
    #[must_use]
    pub fn new(delimiters: &'d [u8], style: TokenStyle) -> Self {
        Self {
            delimiters,
            style,
            cursor: Some(0),
        }
    }

    /// Returns the next token of `s`, which must be the same buffer on every call.
    pub fn next_token(&mut self, s: &mut [u8]) -> Option<(usize, usize)> {
        match self.style {
            TokenStyle::Separate => unit_sep(s, &mut self.cursor, self.delimiters),
            TokenStyle::SkipEmpty => unit_tok(s, self.delimiters, &mut self.cursor),
        }
    }

    /// True once every token has been returned.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cursor.is_none()
    }

    /// Collects the remaining tokens as owned byte strings.
    pub fn collect_tokens(&mut self, s: &mut [u8]) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        while let Some((start, len)) = self.next_token(s) {
            out.push(s[start..start + len].to_vec());
        }
        out
    }
}

static STRTOK_CURSOR: Mutex<Option<usize>> = const_mutex(None);

/// Legacy C `strtok` over one process-wide hidden cursor.
///
/// Pass `restart = true` on the first call for a string (C's non-NULL
/// argument) and `false` to continue with the same buffer.
///
/// **Not reentrant.** All callers in the process share the cursor, so
/// interleaving two tokenizations, from one thread or several, corrupts both.
/// Use [`strtok_r`] or [`Tokenizer`] instead.
pub fn strtok(s: &mut [u8], delimiters: &[u8], restart: bool) -> Option<(usize, usize)> {
    let mut cursor = STRTOK_CURSOR.lock();
    if restart {
        *cursor = Some(0);
    }
    unit_tok(s, delimiters, &mut *cursor)
}
