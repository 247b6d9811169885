//! Human-readable byte counts: `machinesize` parses, `humansize` renders.
//!
//! An input is one or more terms joined by `+` or whitespace. A term is a
//! decimal number, optionally followed by a unit: a prefix letter
//! (`K M G T P E Z Y`, plus lowercase `k`), an optional `i` or `I` that forces
//! base 1024, and an optional `B` or `b`. A bare `B` means bytes. The terms
//! are summed. Other lowercase prefixes are rejected so that `1m` is never
//! read as a megabyte.
//!
//! ```text
//! 1K          1000     (1024 in SizeMode::Binary)
//! 1Ki         1024
//! 1.5GiB      1610612736
//! 1M + 512K   1512000
//! 1_000_000   1000000
//! ```
//!
//! Terms must be separated: `1K2K` is rejected. A term without a unit is only
//! accepted when it is the whole input. Fractions are computed exactly and
//! truncated toward zero. A sum that does not fit in `u64` is out of range.

use crate::config;
use crate::ctype::{is_digit, is_space};
use crate::errno::Error;

/// How a unit prefix without an explicit `i` is read.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeMode {
    /// SI: `K` is 1000.
    #[default]
    Decimal,
    /// JEDEC: `K` is 1024.
    Binary,
}

/// Character sets for the number grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeSyntax<'a> {
    /// Bytes accepted as the decimal point.
    pub decimal_points: &'a [u8],
    /// Bytes accepted between integer digits and ignored.
    pub grouping: &'a [u8],
    /// Bytes that join terms, in addition to whitespace.
    pub separators: &'a [u8],
}

impl Default for SizeSyntax<'_> {
    fn default() -> Self {
        Self {
            decimal_points: b".",
            grouping: b"_,",
            separators: b"+",
        }
    }
}

const PREFIXES: &[u8] = b"KMGTPEZY";

/// Parses `s` with the default [`SizeSyntax`].
pub fn machinesize(s: &str, mode: SizeMode) -> Result<u64, Error> {
    machinesize_with(s, mode, &SizeSyntax::default())
}

/// Parses `s` with the process-wide unit mode (see [`config::size_units`]).
pub fn machinesize_default(s: &str) -> Result<u64, Error> {
    machinesize(s, config::size_units())
}

fn skip_space(b: &[u8], mut pos: usize) -> usize {
    while pos < b.len() && is_space(b[pos]) {
        pos += 1;
    }
    pos
}

/// Parses `s` with caller-chosen character sets.
pub fn machinesize_with(s: &str, mode: SizeMode, syntax: &SizeSyntax<'_>) -> Result<u64, Error> {
    let b = s.as_bytes();
    let mut pos = skip_space(b, 0);
    if pos == b.len() {
        return Err(Error::invalid("empty size", pos));
    }

    let mut total: u128 = 0;
    let mut terms = 0usize;
    let mut unitless = false;
    loop {
        let term = parse_term(b, pos, mode, syntax)?;
        total = total.checked_add(term.value).ok_or(Error::OutOfRange)?;
        terms += 1;
        unitless |= !term.has_unit;
        pos = term.end;

        let sep_start = pos;
        let mut joined = false;
        while let Some(&c) = b.get(pos) {
            if syntax.separators.contains(&c) {
                joined = true;
            } else if !is_space(c) {
                break;
            }
            pos += 1;
        }
        if pos == b.len() {
            if joined {
                return Err(Error::invalid("dangling term separator", sep_start));
            }
            break;
        }
        if pos == sep_start {
            return Err(Error::invalid("terms must be joined by '+' or whitespace", pos));
        }
    }

    if unitless && terms > 1 {
        return Err(Error::invalid("number without unit mixed with other terms", 0));
    }
    u64::try_from(total).map_err(|_| Error::OutOfRange)
}

struct Term {
    value: u128,
    end: usize,
    has_unit: bool,
}

fn parse_term(b: &[u8], start: usize, mode: SizeMode, syntax: &SizeSyntax<'_>) -> Result<Term, Error> {
    let mut pos = start;
    let mut whole: u128 = 0;
    let mut digits = 0usize;

    while let Some(&c) = b.get(pos) {
        if is_digit(c) {
            whole = whole
                .checked_mul(10)
                .and_then(|m| m.checked_add(u128::from(c - b'0')))
                .ok_or(Error::OutOfRange)?;
            digits += 1;
        } else if digits > 0
            && syntax.grouping.contains(&c)
            && !syntax.decimal_points.contains(&c)
            && b.get(pos + 1).is_some_and(|&d| is_digit(d))
        {
            // Grouping byte between two digits.
        } else {
            break;
        }
        pos += 1;
    }
    let mut fraction: &[u8] = &[];
    if b.get(pos).is_some_and(|c| syntax.decimal_points.contains(c)) {
        pos += 1;
        let frac_start = pos;
        while b.get(pos).is_some_and(|&c| is_digit(c)) {
            pos += 1;
        }
        fraction = &b[frac_start..pos];
        digits += fraction.len();
    }
    if digits == 0 {
        return Err(Error::invalid("expected a number", start));
    }

    match parse_unit(b, skip_space(b, pos), mode) {
        Some((multiplier, end)) => Ok(Term {
            value: whole
                .checked_mul(multiplier)
                .and_then(|v| v.checked_add(scale_fraction(fraction, multiplier)))
                .ok_or(Error::OutOfRange)?,
            end,
            has_unit: true,
        }),
        None => Ok(Term {
            value: whole,
            end: pos,
            has_unit: false,
        }),
    }
}

/// `floor(0.<fraction> * multiplier)`, exact for any number of digits.
///
/// Works from the last digit inward, keeping only the integer carry:
/// `floor((d * m + floor(x)) / 10) == floor((d * m + x) / 10)`. The carry
/// stays below `multiplier`, so nothing overflows for any unit prefix.
fn scale_fraction(fraction: &[u8], multiplier: u128) -> u128 {
    fraction
        .iter()
        .rev()
        .fold(0u128, |carry, &c| (u128::from(c - b'0') * multiplier + carry) / 10)
}

/// Reads a unit at `pos`, returning its multiplier and end offset.
fn parse_unit(b: &[u8], pos: usize, mode: SizeMode) -> Option<(u128, usize)> {
    let c = match *b.get(pos)? {
        b'B' | b'b' => return Some((1, pos + 1)),
        b'k' => b'K',
        c => c,
    };
    let power = PREFIXES.iter().position(|&p| p == c)? as u32 + 1;

    let mut end = pos + 1;
    let binary = matches!(b.get(end), Some(b'i' | b'I'));
    if binary {
        end += 1;
    }
    if matches!(b.get(end), Some(b'B' | b'b')) {
        end += 1;
    }
    let base: u128 = if binary || mode == SizeMode::Binary {
        1024
    } else {
        1000
    };
    Some((base.pow(power), end))
}

/// Renders `bytes` with the largest prefix that keeps the integer part
/// non-zero and at most one truncated fractional digit: `1.5KiB`, `999B`.
/// The result parses back with [`machinesize`] to within one tenth of a unit.
#[must_use]
pub fn humansize(bytes: u64, mode: SizeMode) -> String {
    let base: u128 = match mode {
        SizeMode::Decimal => 1000,
        SizeMode::Binary => 1024,
    };
    let value = u128::from(bytes);
    let mut power = 0u32;
    while power < 6 && value >= base.pow(power + 1) {
        power += 1;
    }
    if power == 0 {
        return format!("{bytes}B");
    }

    let tenths = value * 10 / base.pow(power);
    let prefix = char::from(PREFIXES[power as usize - 1]);
    let marker = if mode == SizeMode::Binary { "i" } else { "" };
    match tenths % 10 {
        0 => format!("{}{prefix}{marker}B", tenths / 10),
        frac => format!("{}.{frac}{prefix}{marker}B", tenths / 10),
    }
}
