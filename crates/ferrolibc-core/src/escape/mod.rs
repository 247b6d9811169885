//! Backslash escapes: `escape` encodes a C string, `unescape` decodes one.
//!
//! Encoding uses a small fixed vocabulary that decoding understands exactly:
//!
//! | Byte                  | Encoded as                  |
//! |-----------------------|-----------------------------|
//! | BEL BS HT LF VT FF CR | `\a \b \t \n \v \f \r`      |
//! | ESC, backslash        | `\e \\`                     |
//! | DEL                   | `\177`                      |
//! | the quote byte        | `\` followed by the quote   |
//! | other bytes `< 0x20`  | three octal digits, `\001`  |
//! | modified NUL `C0 80`  | `\0` (`\000` before a digit)|
//! | anything else         | itself                      |
//!
//! Decoding additionally accepts octal (`\7`, `\177`), hex (`\x41`), Unicode
//! (`\u00e9`, `\U0001F600`, and `\u{1F600}` with up to six digits after any
//! leading zeros), control mnemonics (`\NUL` .. `\US`,
//! `\DEL`), caret notation (`\^@` .. `\^_`, `\^?`), and a backslash before
//! any ASCII punctuation (`\'`, `\"`, `\?`).
//!
//! A malformed sequence of a recognized kind (`\x` with no digits, `\400`,
//! `\uD800`) always fails. What happens to a sequence of no known kind is
//! chosen by [`UnescapeMode`].

use bitflags::bitflags;

use crate::config;
use crate::ctype::{digit_value, is_odigit, is_punct, is_upper};
use crate::errno::Error;
use crate::malloc;
use crate::string::str::strlen;

bitflags! {
    /// Decoding options. The empty set decodes to UTF-8 and rejects unknown
    /// escapes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct UnescapeMode: u32 {
        /// Copy an unknown `\c` through unchanged. Wins over `DROP_UNKNOWN`.
        const KEEP_UNKNOWN = 1 << 0;
        /// Drop the backslash of an unknown `\c` and keep `c`.
        const DROP_UNKNOWN = 1 << 1;
        /// Write decoded values as single bytes: NUL is `00` and code points
        /// above `0xFF` are an error. Without it code points are UTF-8 and NUL
        /// is the modified form `C0 80`.
        const RAW = 1 << 2;
    }
}

/// Bytes with a one-letter escape, in both directions.
const SIMPLE: [(u8, u8); 9] = [
    (0x07, b'a'),
    (0x08, b'b'),
    (b'\t', b't'),
    (b'\n', b'n'),
    (0x0B, b'v'),
    (0x0C, b'f'),
    (b'\r', b'r'),
    (0x1B, b'e'),
    (b'\\', b'\\'),
];

/// Control mnemonics, three-letter names first so `\SOH` beats `\SO`.
const MNEMONICS: [(&[u8], u8); 34] = [
    (b"NUL", 0x00),
    (b"SOH", 0x01),
    (b"STX", 0x02),
    (b"ETX", 0x03),
    (b"EOT", 0x04),
    (b"ENQ", 0x05),
    (b"ACK", 0x06),
    (b"BEL", 0x07),
    (b"DLE", 0x10),
    (b"DC1", 0x11),
    (b"DC2", 0x12),
    (b"DC3", 0x13),
    (b"DC4", 0x14),
    (b"NAK", 0x15),
    (b"SYN", 0x16),
    (b"ETB", 0x17),
    (b"CAN", 0x18),
    (b"SUB", 0x1A),
    (b"ESC", 0x1B),
    (b"DEL", 0x7F),
    (b"BS", 0x08),
    (b"HT", 0x09),
    (b"LF", 0x0A),
    (b"VT", 0x0B),
    (b"FF", 0x0C),
    (b"CR", 0x0D),
    (b"SO", 0x0E),
    (b"SI", 0x0F),
    (b"EM", 0x19),
    (b"FS", 0x1C),
    (b"GS", 0x1D),
    (b"RS", 0x1E),
    (b"US", 0x1F),
    (b"SP", b' '),
];

const MODIFIED_NUL: [u8; 2] = [0xC0, 0x80];

fn simple_letter(c: u8) -> Option<u8> {
    SIMPLE.iter().find(|&&(b, _)| b == c).map(|&(_, l)| l)
}

fn simple_byte(letter: u8) -> Option<u8> {
    SIMPLE.iter().find(|&&(_, l)| l == letter).map(|&(b, _)| b)
}

fn needs_escape(c: u8, quote: u8) -> bool {
    c < 0x20 || c == 0x7F || c == b'\\' || (quote != 0 && c == quote)
}

/// Encodes the C string `s` (up to its first NUL).
///
/// `quote` is a punctuation byte that must not appear unescaped in the
/// output, or 0 for none. A letter or digit would collide with the escape
/// vocabulary and is rejected.
pub fn escape(s: &[u8], quote: u8) -> Result<Vec<u8>, Error> {
    if quote != 0 && !is_punct(quote) {
        return Err(Error::invalid("quote must be ASCII punctuation", 0));
    }
    let s = &s[..strlen(s)];
    let plain = !s.iter().any(|&c| needs_escape(c, quote))
        && !s.windows(2).any(|pair| pair == MODIFIED_NUL);
    if plain {
        let mut out = malloc::allocate(s.len())?;
        out.extend_from_slice(s);
        return Ok(out);
    }

    let mut out = malloc::allocate(s.len() * 4)?;
    let mut i = 0;
    while i < s.len() {
        let c = s[i];
        if s[i..].starts_with(&MODIFIED_NUL) {
            i += 2;
            if s.get(i).is_some_and(|&d| is_odigit(d)) {
                out.extend_from_slice(b"\\000");
            } else {
                out.extend_from_slice(b"\\0");
            }
            continue;
        }
        if let Some(letter) = simple_letter(c) {
            out.extend_from_slice(&[b'\\', letter]);
        } else if c == 0x7F {
            out.extend_from_slice(b"\\177");
        } else if quote != 0 && c == quote {
            out.extend_from_slice(&[b'\\', c]);
        } else if c < 0x20 {
            out.extend_from_slice(&[b'\\', b'0' + (c >> 6), b'0' + ((c >> 3) & 7), b'0' + (c & 7)]);
        } else {
            out.push(c);
        }
        i += 1;
    }
    Ok(out)
}

/// A decoded escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decoded {
    /// An octal, hex, mnemonic, or literal byte.
    Byte(u8),
    /// A Unicode scalar value.
    Scalar(char),
    /// No known escape starts here.
    Unknown,
}

/// Reads up to `max` digits of `radix` at `pos`. Returns the value and the
/// number of digits read.
fn read_digits(b: &[u8], pos: usize, radix: u32, max: usize) -> (u32, usize) {
    let mut value = 0u32;
    let mut count = 0;
    while count < max {
        match b.get(pos + count).and_then(|&c| digit_value(c, radix)) {
            Some(d) => value = value * radix + d,
            None => break,
        }
        count += 1;
    }
    (value, count)
}

fn scalar(value: u32, at: usize) -> Result<Decoded, Error> {
    char::from_u32(value)
        .map(Decoded::Scalar)
        .ok_or(Error::invalid("not a Unicode scalar value", at))
}

/// Decodes the escape whose backslash is at `at`. Returns the decoded value
/// and the offset just past the sequence.
fn decode_escape(b: &[u8], at: usize) -> Result<(Decoded, usize), Error> {
    let pos = at + 1;
    let Some(&c) = b.get(pos) else {
        return Ok((Decoded::Unknown, pos));
    };
    if let Some(byte) = simple_byte(c) {
        return Ok((Decoded::Byte(byte), pos + 1));
    }
    match c {
        b'0'..=b'7' => {
            let (value, n) = read_digits(b, pos, 8, 3);
            let byte = u8::try_from(value).map_err(|_| Error::invalid("octal escape above \\377", at))?;
            Ok((Decoded::Byte(byte), pos + n))
        }
        b'x' => match read_digits(b, pos + 1, 16, 2) {
            (_, 0) => Err(Error::invalid("\\x without hex digits", at)),
            (value, n) => Ok((Decoded::Byte(value as u8), pos + 1 + n)),
        },
        b'u' if b.get(pos + 1) == Some(&b'{') => {
            // Leading zeros do not count toward the six significant digits.
            let zeros = b[pos + 2..].iter().take_while(|&&c| c == b'0').count();
            match read_digits(b, pos + 2 + zeros, 16, 6) {
                (value, n) if zeros + n > 0 && b.get(pos + 2 + zeros + n) == Some(&b'}') => {
                    Ok((scalar(value, at)?, pos + 3 + zeros + n))
                }
                _ => Err(Error::invalid("malformed \\u{...} escape", at)),
            }
        }
        b'u' => match read_digits(b, pos + 1, 16, 4) {
            (value, 4) => Ok((scalar(value, at)?, pos + 5)),
            _ => Err(Error::invalid("\\u needs four hex digits", at)),
        },
        b'U' if b.get(pos + 1).is_some_and(u8::is_ascii_hexdigit) => {
            match read_digits(b, pos + 1, 16, 8) {
                (value, 8) => Ok((scalar(value, at)?, pos + 9)),
                _ => Err(Error::invalid("\\U needs eight hex digits", at)),
            }
        }
        b'^' => match b.get(pos + 1) {
            Some(&ctl @ b'@'..=b'_') => Ok((Decoded::Byte(ctl - 0x40), pos + 2)),
            Some(b'?') => Ok((Decoded::Byte(0x7F), pos + 2)),
            _ => Err(Error::invalid("bad caret escape", at)),
        },
        _ if is_upper(c) => Ok(MNEMONICS
            .iter()
            .find(|(name, _)| b[pos..].starts_with(name))
            .map_or((Decoded::Unknown, pos), |&(name, byte)| {
                (Decoded::Byte(byte), pos + name.len())
            })),
        _ if is_punct(c) => Ok((Decoded::Byte(c), pos + 1)),
        _ => Ok((Decoded::Unknown, pos)),
    }
}

/// Decodes the C string in `buf` in place.
///
/// Every escape is at least as long as its decoding, so the write cursor
/// never passes the read cursor. On error the buffer contents are
/// unspecified.
pub fn unescape(buf: &mut Vec<u8>, mode: UnescapeMode) -> Result<(), Error> {
    let len = strlen(buf);
    buf.truncate(len);
    let raw = mode.contains(UnescapeMode::RAW);

    let (mut r, mut w) = (0, 0);
    while r < buf.len() {
        if buf[r] != b'\\' {
            buf[w] = buf[r];
            w += 1;
            r += 1;
            continue;
        }

        let (decoded, end) = decode_escape(buf, r)?;
        let mut utf8 = [0u8; 4];
        let bytes: &[u8] = match decoded {
            Decoded::Byte(0) if !raw => &MODIFIED_NUL,
            Decoded::Byte(byte) => {
                utf8[0] = byte;
                &utf8[..1]
            }
            Decoded::Scalar('\0') if !raw => &MODIFIED_NUL,
            Decoded::Scalar(ch) if raw => {
                utf8[0] = u8::try_from(u32::from(ch))
                    .map_err(|_| Error::invalid("code point above 0xFF in raw mode", r))?;
                &utf8[..1]
            }
            Decoded::Scalar(ch) => ch.encode_utf8(&mut utf8).as_bytes(),
            Decoded::Unknown if mode.contains(UnescapeMode::KEEP_UNKNOWN) => {
                let seq = (end + 1).min(buf.len());
                buf.copy_within(r..seq, w);
                w += seq - r;
                r = seq;
                continue;
            }
            Decoded::Unknown if mode.contains(UnescapeMode::DROP_UNKNOWN) => {
                if let Some(&next) = buf.get(end) {
                    buf[w] = next;
                    w += 1;
                }
                r = (end + 1).min(buf.len());
                continue;
            }
            Decoded::Unknown => return Err(Error::invalid("unknown escape", r)),
        };
        debug_assert!(w + bytes.len() <= end);
        buf[w..w + bytes.len()].copy_from_slice(bytes);
        w += bytes.len();
        r = end;
    }
    buf.truncate(w);
    Ok(())
}

/// Decodes into a fresh buffer, leaving `s` untouched.
pub fn unescape_bytes(s: &[u8], mode: UnescapeMode) -> Result<Vec<u8>, Error> {
    let s = &s[..strlen(s)];
    let mut out = malloc::allocate(s.len())?;
    out.extend_from_slice(s);
    unescape(&mut out, mode)?;
    Ok(out)
}

/// [`unescape`] with the process-wide unknown-escape policy and UTF-8 output.
pub fn unescape_default(buf: &mut Vec<u8>) -> Result<(), Error> {
    unescape(buf, config::escape_unknown().mode())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn un(s: &[u8]) -> Result<Vec<u8>, Error> {
        unescape_bytes(s, UnescapeMode::empty())
    }

    #[test]
    fn test_escape_table() {
        assert_eq!(escape(b"a\tb\n", 0).unwrap(), b"a\\tb\\n");
        assert_eq!(escape(b"\x07\x08\x0b\x0c\r\x1b\\", 0).unwrap(), b"\\a\\b\\v\\f\\r\\e\\\\");
        assert_eq!(escape(b"\x7f", 0).unwrap(), b"\\177");
        assert_eq!(escape(b"\x01\x1f", 0).unwrap(), b"\\001\\037");
    }

    #[test]
    fn test_escape_quote_and_high_bytes() {
        assert_eq!(escape(b"say \"hi\"", b'"').unwrap(), b"say \\\"hi\\\"");
        assert_eq!(escape(b"it's", b'\'').unwrap(), b"it\\'s");
        assert_eq!(escape("é".as_bytes(), 0).unwrap(), "é".as_bytes());
        assert!(escape(b"x", b'n').is_err());
    }

    #[test]
    fn test_escape_plain_input_is_a_copy() {
        assert_eq!(escape(b"plain text\0tail", 0).unwrap(), b"plain text");
        assert_eq!(escape(b"", 0).unwrap(), b"");
    }

    #[test]
    fn test_escape_modified_nul() {
        assert_eq!(escape(b"a\xc0\x80b", 0).unwrap(), b"a\\0b");
        assert_eq!(escape(b"a\xc0\x807", 0).unwrap(), b"a\\0007");
    }

    #[test]
    fn test_unescape_simple() {
        assert_eq!(un(b"a\\tb").unwrap(), b"a\tb");
        assert_eq!(un(b"\\\\\\'\\\"\\?").unwrap(), b"\\'\"?");
        assert_eq!(un(b"no escapes").unwrap(), b"no escapes");
    }

    #[test]
    fn test_unescape_numeric() {
        assert_eq!(un(b"\\101\\7x").unwrap(), b"A\x07x");
        assert_eq!(un(b"\\1011").unwrap(), b"A1");
        assert_eq!(un(b"\\x41\\x4g").unwrap(), b"A\x04g");
        assert_eq!(un(b"\\377").unwrap(), b"\xff");
        assert!(un(b"\\400").is_err());
        assert!(un(b"\\xg").is_err());
    }

    #[test]
    fn test_unescape_unicode() {
        assert_eq!(un(b"\\u00e9").unwrap(), "é".as_bytes());
        assert_eq!(un(b"\\u{1F600}").unwrap(), "😀".as_bytes());
        assert_eq!(un(b"\\U0001F600").unwrap(), "😀".as_bytes());
        assert!(un(b"\\uD800").is_err());
        assert!(un(b"\\u{110000}").is_err());
        assert!(un(b"\\u{}").is_err());
        assert!(un(b"\\u{41").is_err());
        assert_eq!(un(b"\\u{0000041}").unwrap(), b"A");
        assert_eq!(un(b"\\u{00000000001F600}").unwrap(), "😀".as_bytes());
        assert_eq!(un(b"\\u{000}").unwrap(), b"\xc0\x80");
        assert!(un(b"\\u{0001000000}").is_err());
        assert!(un(b"\\u12").is_err());
        assert!(un(b"\\U1234").is_err());
    }

    #[test]
    fn test_unescape_nul_targets() {
        assert_eq!(un(b"a\\0b").unwrap(), b"a\xc0\x80b");
        assert_eq!(un(b"\\NUL").unwrap(), b"\xc0\x80");
        assert_eq!(un(b"\\u{0}").unwrap(), b"\xc0\x80");
        assert_eq!(unescape_bytes(b"a\\0b", UnescapeMode::RAW).unwrap(), b"a\0b");
        assert_eq!(unescape_bytes(b"\\u00ff", UnescapeMode::RAW).unwrap(), b"\xff");
        assert!(unescape_bytes(b"\\u0100", UnescapeMode::RAW).is_err());
    }

    #[test]
    fn test_unescape_mnemonics_and_caret() {
        assert_eq!(un(b"\\SOH\\SO\\ESC\\DEL").unwrap(), b"\x01\x0e\x1b\x7f");
        assert_eq!(un(b"\\US\\SP").unwrap(), b"\x1f ");
        assert_eq!(un(b"\\^A\\^[\\^?").unwrap(), b"\x01\x1b\x7f");
        assert!(un(b"\\^a").is_err());
    }

    #[test]
    fn test_unknown_escape_policies() {
        assert_eq!(
            un(b"a\\qb").unwrap_err(),
            Error::InvalidFormat {
                what: "unknown escape",
                offset: 1
            }
        );
        assert_eq!(unescape_bytes(b"a\\qb", UnescapeMode::KEEP_UNKNOWN).unwrap(), b"a\\qb");
        assert_eq!(unescape_bytes(b"a\\qb", UnescapeMode::DROP_UNKNOWN).unwrap(), b"aqb");
        let both = UnescapeMode::KEEP_UNKNOWN | UnescapeMode::DROP_UNKNOWN;
        assert_eq!(unescape_bytes(b"a\\qb", both).unwrap(), b"a\\qb");
        assert_eq!(unescape_bytes(b"\\Q", UnescapeMode::DROP_UNKNOWN).unwrap(), b"Q");
    }

    #[test]
    fn test_trailing_backslash_is_unknown() {
        assert!(un(b"abc\\").is_err());
        assert_eq!(unescape_bytes(b"abc\\", UnescapeMode::KEEP_UNKNOWN).unwrap(), b"abc\\");
        assert_eq!(unescape_bytes(b"abc\\", UnescapeMode::DROP_UNKNOWN).unwrap(), b"abc");
    }

    #[test]
    fn test_unescape_in_place_shrinks() {
        let mut buf = b"x\\x41\\u{42}\0ignored".to_vec();
        unescape(&mut buf, UnescapeMode::empty()).unwrap();
        assert_eq!(buf, b"xAB");
    }

    #[test]
    fn test_unescape_default_decodes_known_escapes() {
        let mut buf = b"tab\\there".to_vec();
        unescape_default(&mut buf).unwrap();
        assert_eq!(buf, b"tab\there");
    }

    proptest! {
        #[test]
        fn prop_escape_round_trip(s in proptest::collection::vec(1u8..=255, 0..64)) {
            let encoded = escape(&s, 0).unwrap();
            prop_assert_eq!(un(&encoded).unwrap(), s);
        }

        #[test]
        fn prop_escape_round_trip_with_quote(s in "[ -~]{0,32}") {
            let encoded = escape(s.as_bytes(), b'"').unwrap();
            prop_assert_eq!(
                encoded.iter().filter(|&&c| c == b'"').count(),
                s.bytes().filter(|&c| c == b'"').count()
            );
            prop_assert_eq!(un(&encoded).unwrap(), s.as_bytes());
        }

        #[test]
        fn prop_escape_output_is_printable_or_high(s in proptest::collection::vec(1u8..=255, 0..64)) {
            let encoded = escape(&s, 0).unwrap();
            prop_assert!(encoded.iter().all(|&c| (0x20..0x7F).contains(&c) || c >= 0x80));
        }
    }
}
