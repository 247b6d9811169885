//! Fixture execution: turns a function name plus JSON inputs into a call
//! against `ferrolibc-core` and renders the result as a comparable string.
//!
//! Input conventions:
//! - C strings are JSON strings (a NUL is appended) or arrays of byte values
//!   (taken verbatim, so the fixture controls termination).
//! - Raw `mem*` buffers are JSON strings or byte arrays without an added NUL.
//! - Wide strings are JSON strings, one unit per `char`, with a NUL appended.
//! - Mode values are octal strings (`"4755"`) or JSON numbers.
//!
//! Output conventions:
//! - Lengths and offsets are decimal; "not found" is `null`.
//! - Comparisons render only the sign: `-1`, `0`, `1`.
//! - Strings render up to their NUL; non-UTF-8 bytes render as `hex:...`.
//! - Whole buffers render as a byte list, `[97, 0, 0]`.
//! - A core error renders as its errno name and sets [`Execution::errno`].

use std::cmp::Ordering;
use std::fmt::Write;

use ferrolibc_core::errno::errno_name;
use ferrolibc_core::escape::{UnescapeMode, escape, unescape_bytes};
use ferrolibc_core::mode::{HumanModeStyle, ModeSyntax, classify, humanmode, machinemode};
use ferrolibc_core::path::{FixedDirectory, abspath, basename, cleanname, dirname, relpath};
use ferrolibc_core::size::{SizeMode, SizeSyntax, humansize, machinesize_with};
use ferrolibc_core::string::{self, TokenStyle, Tokenizer};
use ferrolibc_core::Error;
use serde_json::Value;

use crate::HarnessError;

/// The rendered outcome of one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    /// Rendered return value, or the errno name on failure.
    pub output: String,
    /// errno the call would leave behind; zero on success.
    pub errno: i32,
}

impl Execution {
    fn ok(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            errno: 0,
        }
    }

    fn failed(err: Error) -> Self {
        let errno = err.errno();
        Self {
            output: errno_name(errno).map_or_else(|| format!("errno {errno}"), String::from),
            errno,
        }
    }

    fn from_result(result: Result<String, Error>) -> Self {
        result.map_or_else(Self::failed, Self::ok)
    }
}

/// Typed access to a case's `inputs` object.
struct Args<'a> {
    function: &'a str,
    inputs: &'a Value,
}

impl Args<'_> {
    fn bad(&self, field: &'static str, reason: impl Into<String>) -> HarnessError {
        HarnessError::BadInput {
            function: self.function.to_string(),
            field,
            reason: reason.into(),
        }
    }

    fn get(&self, field: &'static str) -> Result<&Value, HarnessError> {
        self.inputs
            .get(field)
            .ok_or_else(|| self.bad(field, "missing"))
    }

    fn present(&self, field: &'static str) -> bool {
        self.inputs.get(field).is_some_and(|v| !v.is_null())
    }

    fn byte_array(&self, field: &'static str, items: &[Value]) -> Result<Vec<u8>, HarnessError> {
        items
            .iter()
            .map(|v| {
                v.as_u64()
                    .and_then(|n| u8::try_from(n).ok())
                    .ok_or_else(|| self.bad(field, "array items must be bytes"))
            })
            .collect()
    }

    /// Raw bytes, no terminator added.
    fn bytes(&self, field: &'static str) -> Result<Vec<u8>, HarnessError> {
        match self.get(field)? {
            Value::String(s) => Ok(s.as_bytes().to_vec()),
            Value::Array(items) => self.byte_array(field, items),
            _ => Err(self.bad(field, "expected string or byte array")),
        }
    }

    /// A C string: JSON strings gain a NUL, byte arrays are verbatim.
    fn cstr(&self, field: &'static str) -> Result<Vec<u8>, HarnessError> {
        let mut out = self.bytes(field)?;
        if self.get(field)?.is_string() {
            out.push(0);
        }
        Ok(out)
    }

    fn opt_cstr(&self, field: &'static str) -> Result<Option<Vec<u8>>, HarnessError> {
        if self.present(field) {
            self.cstr(field).map(Some)
        } else {
            Ok(None)
        }
    }

    fn wide(&self, field: &'static str) -> Result<Vec<u32>, HarnessError> {
        match self.get(field)? {
            Value::String(s) => Ok(s.chars().map(u32::from).chain([0]).collect()),
            Value::Array(items) => items
                .iter()
                .map(|v| {
                    v.as_u64()
                        .and_then(|n| u32::try_from(n).ok())
                        .ok_or_else(|| self.bad(field, "array items must be u32"))
                })
                .collect(),
            _ => Err(self.bad(field, "expected string or u32 array")),
        }
    }

    fn text(&self, field: &'static str) -> Result<&str, HarnessError> {
        self.get(field)?
            .as_str()
            .ok_or_else(|| self.bad(field, "expected string"))
    }

    fn opt_text(&self, field: &'static str) -> Result<Option<&str>, HarnessError> {
        if self.present(field) {
            self.text(field).map(Some)
        } else {
            Ok(None)
        }
    }

    fn number(&self, field: &'static str) -> Result<u64, HarnessError> {
        self.get(field)?
            .as_u64()
            .ok_or_else(|| self.bad(field, "expected unsigned integer"))
    }

    fn count(&self, field: &'static str) -> Result<usize, HarnessError> {
        let n = self.number(field)?;
        usize::try_from(n).map_err(|_| self.bad(field, "does not fit usize"))
    }

    fn count_or(&self, field: &'static str, default: usize) -> Result<usize, HarnessError> {
        if self.present(field) {
            self.count(field)
        } else {
            Ok(default)
        }
    }

    /// One byte: a number, or a string of exactly one byte.
    fn byte(&self, field: &'static str) -> Result<u8, HarnessError> {
        match self.get(field)? {
            Value::String(s) if s.len() == 1 => Ok(s.as_bytes()[0]),
            Value::Number(n) => n
                .as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .ok_or_else(|| self.bad(field, "expected a byte value")),
            _ => Err(self.bad(field, "expected a byte or one-byte string")),
        }
    }

    /// One wide unit: a number, or a string of exactly one `char`.
    fn unit(&self, field: &'static str) -> Result<u32, HarnessError> {
        match self.get(field)? {
            Value::String(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(u32::from(c)),
                    _ => Err(self.bad(field, "expected one character")),
                }
            }
            Value::Number(n) => n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| self.bad(field, "expected a u32 value")),
            _ => Err(self.bad(field, "expected a unit or one-character string")),
        }
    }

    fn octal(&self, field: &'static str) -> Result<u32, HarnessError> {
        match self.get(field)? {
            Value::String(s) => {
                let digits = s.strip_prefix("0o").unwrap_or(s);
                u32::from_str_radix(digits, 8).map_err(|e| self.bad(field, e.to_string()))
            }
            Value::Number(n) => n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| self.bad(field, "expected a mode value")),
            _ => Err(self.bad(field, "expected octal string or number")),
        }
    }

    fn size_mode(&self) -> Result<SizeMode, HarnessError> {
        Ok(self
            .opt_text("units")?
            .map_or(SizeMode::Decimal, SizeMode::from_str_loose))
    }

    fn unescape_mode(&self) -> Result<UnescapeMode, HarnessError> {
        if !self.present("flags") {
            return Ok(UnescapeMode::empty());
        }
        let Value::Array(items) = self.get("flags")? else {
            return Err(self.bad("flags", "expected array of flag names"));
        };
        items.iter().try_fold(UnescapeMode::empty(), |acc, item| {
            let flag = match item.as_str() {
                Some("keep") => UnescapeMode::KEEP_UNKNOWN,
                Some("drop") => UnescapeMode::DROP_UNKNOWN,
                Some("raw") => UnescapeMode::RAW,
                _ => return Err(self.bad("flags", format!("unknown flag {item}"))),
            };
            Ok(acc | flag)
        })
    }

    /// Destination buffer holding the C string in `field`, with `capacity`
    /// bytes in total. The capacity must cover the initial string.
    fn dest_with(&self, field: &'static str, capacity: usize) -> Result<Vec<u8>, HarnessError> {
        let init = self.cstr(field)?;
        let len = string::strlen(&init);
        if capacity <= len {
            return Err(self.bad("dst_len", "smaller than the initial destination string"));
        }
        let mut dest = vec![0u8; capacity];
        dest[..len].copy_from_slice(&init[..len]);
        Ok(dest)
    }

    fn require_room(&self, needed: usize, capacity: usize) -> Result<(), HarnessError> {
        if needed > capacity {
            return Err(self.bad("dst_len", format!("needs {needed} bytes, has {capacity}")));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let mut out = String::from("hex:");
            for b in bytes {
                let _ = write!(out, "{b:02x}");
            }
            out
        }
    }
}

fn render_cstr(s: &[u8]) -> String {
    render_bytes(&s[..string::strlen(s)])
}

fn render_wide(s: &[u32]) -> String {
    s[..string::wcslen(s)]
        .iter()
        .map(|&u| char::from_u32(u).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

fn render_index(at: Option<usize>) -> String {
    at.map_or_else(|| String::from("null"), |i| i.to_string())
}

fn render_sign(v: i32) -> String {
    v.signum().to_string()
}

fn render_ordering(ord: Ordering) -> String {
    (ord as i32).to_string()
}

fn render_tokens(tokens: &[String]) -> Result<String, HarnessError> {
    Ok(serde_json::to_string(tokens)?)
}

// ---------------------------------------------------------------------------
// Families
// ---------------------------------------------------------------------------

fn run_string(function: &str, a: &Args<'_>) -> Result<Option<Execution>, HarnessError> {
    let out = match function {
        "strlen" => string::strlen(&a.cstr("s")?).to_string(),
        "strnlen" => string::strnlen(&a.cstr("s")?, a.count("n")?).to_string(),
        "strcpy" | "stpcpy" => {
            let src = a.cstr("src")?;
            let needed = string::strlen(&src) + 1;
            let capacity = a.count_or("dst_len", needed)?;
            a.require_room(needed, capacity)?;
            let mut dest = vec![0u8; capacity];
            if function == "strcpy" {
                string::strcpy(&mut dest, &src);
                render_cstr(&dest)
            } else {
                string::stpcpy(&mut dest, &src).to_string()
            }
        }
        "strncpy" | "stpncpy" => {
            let src = a.cstr("src")?;
            let n = a.count("n")?;
            let mut dest = vec![0xFFu8; a.count_or("dst_len", n)?];
            if function == "strncpy" {
                string::strncpy(&mut dest, &src, n);
                format!("{dest:?}")
            } else {
                string::stpncpy(&mut dest, &src, n).to_string()
            }
        }
        "strcat" | "strncat" => {
            let src = a.cstr("src")?;
            let init = string::strlen(&a.cstr("dest")?);
            let add = match function {
                "strncat" => string::strnlen(&src, a.count("n")?),
                _ => string::strlen(&src),
            };
            let capacity = a.count_or("dst_len", init + add + 1)?;
            a.require_room(init + add + 1, capacity)?;
            let mut dest = a.dest_with("dest", capacity)?;
            if function == "strcat" {
                string::strcat(&mut dest, &src);
            } else {
                string::strncat(&mut dest, &src, a.count("n")?);
            }
            render_cstr(&dest)
        }
        "strlcpy" => {
            let src = a.cstr("src")?;
            let mut dest = vec![0u8; a.count("dst_len")?];
            let wanted = string::strlcpy(&mut dest, &src);
            format!("{wanted}:{}", render_cstr(&dest))
        }
        "strlcat" => {
            let src = a.cstr("src")?;
            let mut dest = a.dest_with("dest", a.count("dst_len")?)?;
            let wanted = string::strlcat(&mut dest, &src);
            format!("{wanted}:{}", render_cstr(&dest))
        }
        "strcmp" => render_sign(string::strcmp(&a.cstr("s1")?, &a.cstr("s2")?)),
        "strncmp" => render_sign(string::strncmp(&a.cstr("s1")?, &a.cstr("s2")?, a.count("n")?)),
        "strcasecmp" => render_sign(string::strcasecmp(&a.cstr("s1")?, &a.cstr("s2")?)),
        "strncasecmp" => render_sign(string::strncasecmp(
            &a.cstr("s1")?,
            &a.cstr("s2")?,
            a.count("n")?,
        )),
        "strchr" => render_index(string::strchr(&a.cstr("s")?, a.byte("c")?)),
        "strrchr" => render_index(string::strrchr(&a.cstr("s")?, a.byte("c")?)),
        "strchrnul" => string::strchrnul(&a.cstr("s")?, a.byte("c")?).to_string(),
        "strstr" => render_index(string::strstr(&a.cstr("haystack")?, &a.cstr("needle")?)),
        "strcasestr" => render_index(string::strcasestr(&a.cstr("haystack")?, &a.cstr("needle")?)),
        "strspn" => string::strspn(&a.cstr("s")?, &a.cstr("set")?).to_string(),
        "strcspn" => string::strcspn(&a.cstr("s")?, &a.cstr("set")?).to_string(),
        "strpbrk" => render_index(string::strpbrk(&a.cstr("s")?, &a.cstr("set")?)),
        "strdup" | "strndup" => {
            let s = a.opt_cstr("s")?;
            let dup = match function {
                "strdup" => string::strdup(s.as_deref()),
                _ => string::strndup(s.as_deref(), a.count("n")?),
            };
            return Ok(Some(Execution::from_result(dup.map(|d| {
                d.map_or_else(|| String::from("null"), |d| render_cstr(&d))
            }))));
        }
        "strsep" | "strtok_r" | "strtok" => {
            let mut s = a.cstr("s")?;
            let delims = a.cstr("delims")?;
            let style = if function == "strsep" {
                TokenStyle::Separate
            } else {
                TokenStyle::SkipEmpty
            };
            let tokens: Vec<String> = Tokenizer::new(&delims, style)
                .collect_tokens(&mut s)
                .iter()
                .map(|t| render_bytes(t))
                .collect();
            render_tokens(&tokens)?
        }
        _ => return Ok(None),
    };
    Ok(Some(Execution::ok(out)))
}

fn run_memory(function: &str, a: &Args<'_>) -> Result<Option<Execution>, HarnessError> {
    let out = match function {
        "memchr" => {
            let s = a.bytes("s")?;
            render_index(string::memchr(&s, a.byte("c")?, a.count_or("n", s.len())?))
        }
        "memrchr" => {
            let s = a.bytes("s")?;
            render_index(string::memrchr(&s, a.byte("c")?, a.count_or("n", s.len())?))
        }
        "memcmp" => {
            let (x, y) = (a.bytes("a")?, a.bytes("b")?);
            let n = a.count_or("n", x.len().min(y.len()))?;
            render_ordering(string::memcmp(&x, &y, n))
        }
        "memmem" => render_index(string::memmem(&a.bytes("haystack")?, &a.bytes("needle")?)),
        "memcpy" => {
            let src = a.bytes("src")?;
            let mut dest = vec![0u8; a.count("dst_len")?];
            string::memcpy(&mut dest, &src, a.count("n")?);
            format!("{dest:?}")
        }
        "memmove" => {
            let mut buf = a.bytes("buf")?;
            string::memmove(&mut buf, a.count("dest")?, a.count("src")?, a.count("n")?);
            format!("{buf:?}")
        }
        "memccpy" => {
            let src = a.bytes("src")?;
            let n = a.count("n")?;
            let mut dest = vec![0u8; a.count_or("dst_len", n)?];
            let end = string::memccpy(&mut dest, &src, a.byte("c")?, n);
            format!("{}:{dest:?}", render_index(end))
        }
        "memset" => {
            let mut dest = vec![0u8; a.count("dst_len")?];
            string::memset(&mut dest, a.byte("c")?, a.count("n")?);
            format!("{dest:?}")
        }
        _ => return Ok(None),
    };
    Ok(Some(Execution::ok(out)))
}

fn run_wide(function: &str, a: &Args<'_>) -> Result<Option<Execution>, HarnessError> {
    let out = match function {
        "wcslen" => string::wcslen(&a.wide("s")?).to_string(),
        "wcsnlen" => string::wcsnlen(&a.wide("s")?, a.count("n")?).to_string(),
        "wcscpy" => {
            let src = a.wide("src")?;
            let mut dest = vec![0u32; string::wcslen(&src) + 1];
            string::wcscpy(&mut dest, &src);
            render_wide(&dest)
        }
        "wcscat" => {
            let (init, src) = (a.wide("dest")?, a.wide("src")?);
            let mut dest = init.clone();
            dest.resize(string::wcslen(&init) + string::wcslen(&src) + 1, 0);
            string::wcscat(&mut dest, &src);
            render_wide(&dest)
        }
        "wcscmp" => render_sign(string::wcscmp(&a.wide("s1")?, &a.wide("s2")?)),
        "wcsncmp" => render_sign(string::wcsncmp(&a.wide("s1")?, &a.wide("s2")?, a.count("n")?)),
        "wcscasecmp" => render_sign(string::wcscasecmp(&a.wide("s1")?, &a.wide("s2")?)),
        "wcschr" => render_index(string::wcschr(&a.wide("s")?, a.unit("c")?)),
        "wcsrchr" => render_index(string::wcsrchr(&a.wide("s")?, a.unit("c")?)),
        "wcsstr" => render_index(string::wcsstr(&a.wide("haystack")?, &a.wide("needle")?)),
        "wcsspn" => string::wcsspn(&a.wide("s")?, &a.wide("set")?).to_string(),
        "wcscspn" => string::wcscspn(&a.wide("s")?, &a.wide("set")?).to_string(),
        "wcspbrk" => render_index(string::wcspbrk(&a.wide("s")?, &a.wide("set")?)),
        "wcstok" => {
            let mut s = a.wide("s")?;
            let delims = a.wide("delims")?;
            let mut save = Some(0);
            let mut tokens = Vec::new();
            while let Some((start, len)) = string::wcstok(&mut s, &delims, &mut save) {
                tokens.push(render_wide(&s[start..start + len]));
            }
            render_tokens(&tokens)?
        }
        "wmemcmp" => {
            let (x, y) = (a.wide("a")?, a.wide("b")?);
            let n = a.count_or("n", x.len().min(y.len()))?;
            render_sign(string::wmemcmp(&x, &y, n))
        }
        "wmemchr" => {
            let s = a.wide("s")?;
            render_index(string::wmemchr(&s, a.unit("c")?, a.count_or("n", s.len())?))
        }
        _ => return Ok(None),
    };
    Ok(Some(Execution::ok(out)))
}

fn run_path(function: &str, a: &Args<'_>) -> Result<Option<Execution>, HarnessError> {
    let cwd = || -> Result<FixedDirectory, HarnessError> {
        Ok(FixedDirectory::new(a.text("cwd")?.as_bytes()))
    };
    let reference = a.opt_text("reference")?.map(str::as_bytes);
    let result = match function {
        "cleanname" => {
            let mut path = a.bytes("path")?;
            cleanname(&mut path);
            Ok(render_bytes(&path))
        }
        "basename" => Ok(render_bytes(basename(&a.bytes("path")?))),
        "dirname" => Ok(render_bytes(dirname(&a.bytes("path")?))),
        "abspath" => abspath(&a.bytes("file")?, reference, &cwd()?).map(|p| render_bytes(&p)),
        "relpath" => relpath(&a.bytes("file")?, reference, &cwd()?).map(|p| render_bytes(&p)),
        _ => return Ok(None),
    };
    Ok(Some(Execution::from_result(result)))
}

fn run_codec(function: &str, a: &Args<'_>) -> Result<Option<Execution>, HarnessError> {
    let result = match function {
        "classifymode" => classify(a.text("s")?).map(|syntax| {
            String::from(match syntax {
                ModeSyntax::Numeric => "numeric",
                ModeSyntax::Exact => "exact",
                ModeSyntax::Partial => "partial",
            })
        }),
        "machinemode" => {
            let base = if a.present("base") {
                Some(a.octal("base")?)
            } else {
                None
            };
            machinemode(a.text("s")?).map(|update| match base {
                Some(base) => format!("{:04o}", update.apply(base)),
                None => update.to_string(),
            })
        }
        "humanmode" => {
            let style = match a.opt_text("style")? {
                None | Some("symbolic") => HumanModeStyle::Symbolic,
                Some("with_type") => HumanModeStyle::WithType,
                Some("clauses") => HumanModeStyle::Clauses,
                Some(other) => return Err(a.bad("style", format!("unknown style {other}"))),
            };
            Ok(humanmode(a.octal("mode")?, style))
        }
        "machinesize" => {
            let defaults = SizeSyntax::default();
            let decimal_points = a.opt_text("decimal_points")?.map(str::as_bytes);
            let grouping = a.opt_text("grouping")?.map(str::as_bytes);
            let separators = a.opt_text("separators")?.map(str::as_bytes);
            let syntax = SizeSyntax {
                decimal_points: decimal_points.unwrap_or(defaults.decimal_points),
                grouping: grouping.unwrap_or(defaults.grouping),
                separators: separators.unwrap_or(defaults.separators),
            };
            machinesize_with(a.text("s")?, a.size_mode()?, &syntax).map(|n| n.to_string())
        }
        "humansize" => Ok(humansize(a.number("bytes")?, a.size_mode()?)),
        "escape" => {
            let quote = if a.present("quote") { a.byte("quote")? } else { 0 };
            escape(&a.cstr("s")?, quote).map(|e| render_bytes(&e))
        }
        "unescape" => unescape_bytes(&a.cstr("s")?, a.unescape_mode()?).map(|d| render_bytes(&d)),
        _ => return Ok(None),
    };
    Ok(Some(Execution::from_result(result)))
}

/// Execute `function` with the given JSON `inputs`.
///
/// Errors from the core library are part of the result (see
/// [`Execution::errno`]); `Err` means the case itself is unusable: an unknown
/// function name or inputs of the wrong shape.
pub fn execute_case(function: &str, inputs: &Value) -> Result<Execution, HarnessError> {
    let args = Args { function, inputs };
    let families = [run_string, run_memory, run_wide, run_path, run_codec];
    for family in families {
        if let Some(execution) = family(function, &args)? {
            return Ok(execution);
        }
    }
    Err(HarnessError::UnknownFunction(function.to_string()))
}
