//! File permission modes: `machinemode` parses, `humanmode` renders.
//!
//! Three notations are accepted:
//!
//! | Notation       | Example        | Update                          |
//! |----------------|----------------|---------------------------------|
//! | numeric        | `0755`         | every permission bit replaced   |
//! | exact symbolic | `rwxr-xr-x`    | every permission bit replaced   |
//! | partial        | `u+x,go-w`     | only the named bits change      |
//!
//! A parse yields a [`ModeUpdate`] that is applied to an existing mode.
//! Parsing is all or nothing: an invalid clause anywhere rejects the input.

use core::fmt;

use crate::ctype::is_odigit;
use crate::errno::Error;

pub const S_ISUID: u32 = 0o4000;
pub const S_ISGID: u32 = 0o2000;
pub const S_ISVTX: u32 = 0o1000;

pub const S_IRWXU: u32 = 0o700;
pub const S_IRUSR: u32 = 0o400;
pub const S_IWUSR: u32 = 0o200;
pub const S_IXUSR: u32 = 0o100;
pub const S_IRWXG: u32 = 0o070;
pub const S_IRGRP: u32 = 0o040;
pub const S_IWGRP: u32 = 0o020;
pub const S_IXGRP: u32 = 0o010;
pub const S_IRWXO: u32 = 0o007;
pub const S_IROTH: u32 = 0o004;
pub const S_IWOTH: u32 = 0o002;
pub const S_IXOTH: u32 = 0o001;

/// Every bit a mode update can touch.
pub const ALLPERMS: u32 = 0o7777;

pub const S_IFMT: u32 = 0o170000;
pub const S_IFSOCK: u32 = 0o140000;
pub const S_IFLNK: u32 = 0o120000;
pub const S_IFREG: u32 = 0o100000;
pub const S_IFBLK: u32 = 0o060000;
pub const S_IFDIR: u32 = 0o040000;
pub const S_IFCHR: u32 = 0o020000;
pub const S_IFIFO: u32 = 0o010000;

/// A parsed mode: the bits to set and the bits to change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ModeUpdate {
    pub bits: u32,
    pub mask: u32,
}

impl ModeUpdate {
    /// Replaces every permission bit with `bits`.
    #[must_use]
    pub const fn replace(bits: u32) -> Self {
        Self {
            bits: bits & ALLPERMS,
            mask: ALLPERMS,
        }
    }

    /// Applies the update: `base & !mask | bits`. File type bits pass through.
    #[must_use]
    pub const fn apply(self, base: u32) -> u32 {
        base & !self.mask | self.bits
    }
}

impl fmt::Display for ModeUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04o}/{:04o}", self.bits, self.mask)
    }
}

/// Which grammar an input string is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSyntax {
    Numeric,
    Exact,
    Partial,
}

/// Characters allowed before the nine permission positions.
const TYPE_CHARS: &[u8] = b"-bcdlps?";

/// Allowed characters per exact-symbolic position.
const EXACT_POSITIONS: [&[u8]; 9] = [
    b"r-", b"w-", b"xsS-", b"r-", b"w-", b"xsS-", b"r-", b"w-", b"xtT-",
];

fn exact_shaped(s: &[u8]) -> bool {
    let perms = match s.len() {
        9 => s,
        10 if TYPE_CHARS.contains(&s[0]) => &s[1..],
        _ => return false,
    };
    perms
        .iter()
        .zip(EXACT_POSITIONS)
        .all(|(c, allowed)| allowed.contains(c))
}

/// A repeated permission letter or a `-` marks a fixed-position string.
fn has_exact_markers(s: &[u8]) -> bool {
    s.contains(&b'-')
        || s.iter()
            .enumerate()
            .any(|(i, c)| c.is_ascii_alphabetic() && s[i + 1..].contains(c))
}

/// Chooses the grammar for `s`.
///
/// All octal digits is numeric. A nine-position `rwx` string (optionally with
/// a file type letter in front) that repeats a letter or contains `-` is exact;
/// this wins over partial for inputs like `-rwxr-xr-x`. Anything else starting
/// with a class letter or an operator is partial.
pub fn classify(s: &str) -> Result<ModeSyntax, Error> {
    let bytes = s.as_bytes();
    match bytes.first() {
        None => Err(Error::invalid("empty mode", 0)),
        Some(_) if bytes.iter().all(|&c| is_odigit(c)) => Ok(ModeSyntax::Numeric),
        Some(_) if exact_shaped(bytes) && has_exact_markers(bytes) => Ok(ModeSyntax::Exact),
        Some(b'a' | b'u' | b'g' | b'o' | b'+' | b'-' | b'=') => Ok(ModeSyntax::Partial),
        Some(_) => Err(Error::invalid("unrecognized mode syntax", 0)),
    }
}

/// Parses a mode in any of the three notations.
///
/// ```
/// use ferrolibc_core::mode::machinemode;
///
/// let update = machinemode("u+x").unwrap();
/// assert_eq!(update.apply(0o644), 0o744);
/// ```
pub fn machinemode(s: &str) -> Result<ModeUpdate, Error> {
    match classify(s)? {
        ModeSyntax::Numeric => parse_numeric(s),
        ModeSyntax::Exact => parse_exact(s.as_bytes()),
        ModeSyntax::Partial => parse_partial(s.as_bytes()),
    }
}

fn parse_numeric(s: &str) -> Result<ModeUpdate, Error> {
    match u32::from_str_radix(s, 8) {
        Ok(v) if v <= ALLPERMS => Ok(ModeUpdate::replace(v)),
        _ => Err(Error::invalid("octal mode above 07777", 0)),
    }
}

fn parse_exact(s: &[u8]) -> Result<ModeUpdate, Error> {
    let offset = s.len() - 9;
    let mut bits = 0;
    for (i, &c) in s[offset..].iter().enumerate() {
        let class = CLASSES[i / 3];
        bits |= match (i % 3, c) {
            (_, b'-') => 0,
            (0, b'r') => class.read,
            (1, b'w') => class.write,
            (2, b'x') => class.exec,
            (2, b's' | b't') => class.exec | class.special,
            (2, b'S' | b'T') => class.special,
            _ => return Err(Error::invalid("bad permission letter", offset + i)),
        };
    }
    Ok(ModeUpdate::replace(bits))
}

/// The bits belonging to one of owner, group, or other.
#[derive(Debug, Clone, Copy)]
struct Class {
    letter: u8,
    read: u32,
    write: u32,
    exec: u32,
    special: u32,
    special_letter: u8,
}

impl Class {
    const fn all(self) -> u32 {
        self.read | self.write | self.exec | self.special
    }
}

const CLASSES: [Class; 3] = [
    Class {
        letter: b'u',
        read: S_IRUSR,
        write: S_IWUSR,
        exec: S_IXUSR,
        special: S_ISUID,
        special_letter: b's',
    },
    Class {
        letter: b'g',
        read: S_IRGRP,
        write: S_IWGRP,
        exec: S_IXGRP,
        special: S_ISGID,
        special_letter: b's',
    },
    Class {
        letter: b'o',
        read: S_IROTH,
        write: S_IWOTH,
        exec: S_IXOTH,
        special: S_ISVTX,
        special_letter: b't',
    },
];

/// Class set as a bitmask over `CLASSES` indices.
const WHO_ALL: u8 = 0b111;

fn parse_partial(s: &[u8]) -> Result<ModeUpdate, Error> {
    let mut update = ModeUpdate::default();
    let mut touched = 0u8;
    let mut pos = 0;

    loop {
        let clause_start = pos;
        if s.get(pos) == Some(&b',') {
            return Err(Error::invalid("empty clause", pos));
        }
        let mut who = 0u8;
        while let Some(&c) = s.get(pos) {
            who |= match c {
                b'u' => 0b001,
                b'g' => 0b010,
                b'o' => 0b100,
                b'a' => WHO_ALL,
                _ => break,
            };
            pos += 1;
        }
        if who == 0 {
            who = WHO_ALL;
        }
        if who & touched != 0 {
            return Err(Error::invalid("class changed twice", clause_start));
        }
        touched |= who;

        let op = match s.get(pos) {
            Some(&op @ (b'+' | b'-' | b'=')) => op,
            _ => return Err(Error::invalid("expected +, - or =", pos)),
        };
        pos += 1;

        let mut perms = 0u32;
        let mut scope = 0u32;
        for (i, class) in CLASSES.iter().enumerate() {
            if who & (1 << i) != 0 {
                scope |= class.all();
            }
        }
        while let Some(&c) = s.get(pos) {
            if c == b',' {
                break;
            }
            for (i, class) in CLASSES.iter().enumerate() {
                if who & (1 << i) == 0 {
                    continue;
                }
                perms |= match c {
                    b'r' => class.read,
                    b'w' => class.write,
                    b'x' => class.exec,
                    b's' if class.letter != b'o' => class.special,
                    b't' if class.letter == b'o' => class.special,
                    b's' | b't' => 0,
                    _ => return Err(Error::invalid("bad permission letter", pos)),
                };
            }
            pos += 1;
        }

        match op {
            b'+' => update.bits |= perms,
            b'-' => update.mask |= perms,
            _ => {
                update.mask |= scope;
                update.bits |= perms;
            }
        }

        match s.get(pos) {
            None => break,
            Some(_) => {
                pos += 1;
                if pos == s.len() {
                    return Err(Error::invalid("empty clause", pos));
                }
            }
        }
    }
    Ok(update)
}

/// Output shapes for [`humanmode`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HumanModeStyle {
    /// Nine characters, `ls -l` style: `rwsr-xr-T`.
    #[default]
    Symbolic,
    /// Ten characters: a file type letter, then [`Symbolic`](Self::Symbolic).
    WithType,
    /// One `=` clause per class, accepted back by [`machinemode`]: `u=rws,g=rx,o=`.
    Clauses,
}

fn type_letter(mode: u32) -> char {
    match mode & S_IFMT {
        0 | S_IFREG => '-',
        S_IFDIR => 'd',
        S_IFLNK => 'l',
        S_IFCHR => 'c',
        S_IFBLK => 'b',
        S_IFIFO => 'p',
        S_IFSOCK => 's',
        _ => '?',
    }
}

/// Renders `mode` in the chosen style.
#[must_use]
pub fn humanmode(mode: u32, style: HumanModeStyle) -> String {
    let mut out = String::with_capacity(16);
    match style {
        HumanModeStyle::Symbolic | HumanModeStyle::WithType => {
            if style == HumanModeStyle::WithType {
                out.push(type_letter(mode));
            }
            for class in CLASSES {
                out.push(if mode & class.read != 0 { 'r' } else { '-' });
                out.push(if mode & class.write != 0 { 'w' } else { '-' });
                let special = char::from(class.special_letter);
                out.push(match (mode & class.exec != 0, mode & class.special != 0) {
                    (true, true) => special,
                    (false, true) => special.to_ascii_uppercase(),
                    (true, false) => 'x',
                    (false, false) => '-',
                });
            }
        }
        HumanModeStyle::Clauses => {
            for (i, class) in CLASSES.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push(char::from(class.letter));
                out.push('=');
                for (bit, letter) in [
                    (class.read, 'r'),
                    (class.write, 'w'),
                    (class.exec, 'x'),
                    (class.special, char::from(class.special_letter)),
                ] {
                    if mode & bit != 0 {
                        out.push(letter);
                    }
                }
            }
        }
    }
    out
}
