//! Character classification for the text micro-grammars.
//!
//! C locale only. The mode, size, and escape parsers classify their input
//! bytes through these helpers so that every grammar agrees on what a digit,
//! a space, or a punctuation byte is.

/// Returns `true` if `c` is a decimal digit (`[0-9]`).
#[inline]
pub fn is_digit(c: u8) -> bool {
    c.is_ascii_digit()
}

/// Returns `true` if `c` is an octal digit (`[0-7]`).
#[inline]
pub fn is_odigit(c: u8) -> bool {
    matches!(c, b'0'..=b'7')
}

/// Value of a digit in `radix` (8, 10, or 16), or `None` if `c` is not one.
#[inline]
pub fn digit_value(c: u8, radix: u32) -> Option<u32> {
    char::from(c).to_digit(radix)
}

/// Returns `true` if `c` is whitespace: space, `\t`, `\n`, `\v`, `\f`, `\r`.
#[inline]
pub fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

#[inline]
pub fn is_upper(c: u8) -> bool {
    c.is_ascii_uppercase()
}

/// Returns `true` if `c` is printable, not alphanumeric, and not a space.
#[inline]
pub fn is_punct(c: u8) -> bool {
    c.is_ascii_punctuation()
}
