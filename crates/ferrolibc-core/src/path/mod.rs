//! Lexical path normalization: cleanname, abspath, relpath, basename, dirname.
//!
//! Nothing here touches the file system beyond asking a [`WorkingDirectory`]
//! for the current directory. Symbolic links are not resolved, so `a/..`
//! becomes `.` even when `a` is a link.
//!
//! Paths are byte strings. A NUL byte ends the path, as in C; everything
//! after it is ignored.

use crate::errno::{EACCES, EIO, ENOENT, Error};
use crate::malloc;
use crate::string::str::strlen;

const SEP: u8 = b'/';

/// The logical content of a C path: everything before the first NUL.
fn c_path(path: &[u8]) -> &[u8] {
    &path[..strlen(path)]
}

/// Returns the end of the component that starts at `start`.
fn component_end(path: &[u8], start: usize) -> usize {
    path[start..]
        .iter()
        .position(|&b| b == SEP)
        .map_or(path.len(), |i| start + i)
}

/// True if the path starts at the root.
#[must_use]
pub fn is_absolute(path: &[u8]) -> bool {
    path.first() == Some(&SEP)
}

/// Rewrites `path` in place into its shortest lexically equivalent form.
///
/// The result has no repeated separators, no `.` components, no trailing
/// separator (except the root itself), and no `..` that can be resolved
/// lexically. A leading `..` survives in relative paths; in absolute paths
/// `..` at the root is dropped. An empty result becomes `.`.
///
/// Both passes rewrite the buffer with a read cursor `r` and a write cursor
/// `w` and hold `w <= r` throughout, so the output never overwrites input that
/// has not been read yet.
pub fn cleanname(path: &mut Vec<u8>) {
    let len = strlen(path);
    path.truncate(len);
    let rooted = is_absolute(path);
    let base = usize::from(rooted);

    // Collapse: single separators, no `.` components.
    let (mut r, mut w) = (base, base);
    while r < path.len() {
        if path[r] == SEP {
            r += 1;
            continue;
        }
        let end = component_end(path, r);
        if &path[r..end] != b"." {
            if w > base {
                path[w] = SEP;
                w += 1;
            }
            debug_assert!(w <= r);
            path.copy_within(r..end, w);
            w += end - r;
        }
        r = end;
    }
    path.truncate(w);

    // Resolve: pop a component for every `..` that has one to pop.
    let (mut r, mut w) = (base, base);
    let mut depth = 0usize;
    while r < path.len() {
        let end = component_end(path, r);
        let dotdot = &path[r..end] == b"..";
        if dotdot && depth > 0 {
            w = path[base..w]
                .iter()
                .rposition(|&b| b == SEP)
                .map_or(base, |i| base + i);
            depth -= 1;
        } else if !(dotdot && rooted) {
            if w > base {
                path[w] = SEP;
                w += 1;
            }
            debug_assert!(w <= r);
            path.copy_within(r..end, w);
            w += end - r;
            if !dotdot {
                depth += 1;
            }
        }
        r = end + 1;
    }
    path.truncate(w);

    if path.is_empty() {
        path.push(b'.');
    }
}

/// [`cleanname`] for UTF-8 text.
#[must_use]
pub fn cleanname_str(path: &str) -> String {
    let mut buf = path.as_bytes().to_vec();
    cleanname(&mut buf);
    // Only whole ASCII-delimited components were removed.
    String::from_utf8_lossy(&buf).into_owned()
}

/// Source of the current directory for [`abspath`] and [`relpath`].
pub trait WorkingDirectory {
    /// The current directory as an absolute path.
    fn current_dir(&self) -> Result<Vec<u8>, Error>;
}

// A removed working directory reports ENOENT and an unreadable parent EACCES.
fn directory_errno(err: &std::io::Error) -> i32 {
    err.raw_os_error().unwrap_or_else(|| match err.kind() {
        std::io::ErrorKind::NotFound => ENOENT,
        std::io::ErrorKind::PermissionDenied => EACCES,
        _ => EIO,
    })
}

/// The calling process's working directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessDirectory;

impl WorkingDirectory for ProcessDirectory {
    fn current_dir(&self) -> Result<Vec<u8>, Error> {
        let dir = std::env::current_dir().map_err(|e| Error::CurrentDirectory {
            errno: directory_errno(&e),
        })?;
        #[cfg(unix)]
        {
            use std::os::unix::ffi::OsStringExt;
            Ok(dir.into_os_string().into_vec())
        }
        #[cfg(not(unix))]
        {
            Ok(dir.to_string_lossy().into_owned().into_bytes())
        }
    }
}

/// A fixed directory, for callers that must not depend on process state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedDirectory(Vec<u8>);

impl FixedDirectory {
    #[must_use]
    pub fn new(dir: impl Into<Vec<u8>>) -> Self {
        Self(dir.into())
    }
}

impl WorkingDirectory for FixedDirectory {
    fn current_dir(&self) -> Result<Vec<u8>, Error> {
        let dir = c_path(&self.0);
        let mut out = malloc::allocate(dir.len())?;
        out.extend_from_slice(dir);
        Ok(out)
    }
}

/// Joins `dir` and `file` with one separator into a fresh buffer.
fn join(dir: &[u8], file: &[u8]) -> Result<Vec<u8>, Error> {
    let mut out = malloc::allocate(dir.len() + 1 + file.len())?;
    out.extend_from_slice(dir);
    out.push(SEP);
    out.extend_from_slice(file);
    Ok(out)
}

/// Makes `file` absolute and clean.
///
/// A relative `file` is placed under `reference`, or under the working
/// directory when `reference` is `None`. A relative `reference` is itself
/// taken relative to the working directory.
pub fn abspath(
    file: &[u8],
    reference: Option<&[u8]>,
    cwd: &impl WorkingDirectory,
) -> Result<Vec<u8>, Error> {
    let file = c_path(file);
    let mut out = if is_absolute(file) {
        let mut out = malloc::allocate(file.len())?;
        out.extend_from_slice(file);
        out
    } else {
        match reference.map(c_path) {
            Some(dir) if is_absolute(dir) => join(dir, file)?,
            Some(dir) => join(&join(&cwd.current_dir()?, dir)?, file)?,
            None => join(&cwd.current_dir()?, file)?,
        }
    };
    cleanname(&mut out);
    Ok(out)
}

fn components(path: &[u8]) -> impl Iterator<Item = &[u8]> {
    path.split(|&b| b == SEP).filter(|c| !c.is_empty())
}

/// Expresses `file` relative to the directory `reference`.
///
/// Both are first made absolute with [`abspath`] (`reference` defaults to the
/// working directory). Common leading components are matched whole, so
/// `/abc` shares only `/` with `/abcd`. Identical paths give `.`.
pub fn relpath(
    file: &[u8],
    reference: Option<&[u8]>,
    cwd: &impl WorkingDirectory,
) -> Result<Vec<u8>, Error> {
    let file = abspath(file, None, cwd)?;
    let reference = match reference {
        Some(dir) => abspath(dir, None, cwd)?,
        None => abspath(b".", None, cwd)?,
    };

    let file_parts: Vec<&[u8]> = components(&file).collect();
    let ref_parts: Vec<&[u8]> = components(&reference).collect();
    let common = file_parts
        .iter()
        .zip(&ref_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let ups = ref_parts.len() - common;
    let rest = &file_parts[common..];
    let mut out = malloc::allocate(ups * 3 + file.len())?;
    for part in core::iter::repeat_n(&b".."[..], ups).chain(rest.iter().copied()) {
        if !out.is_empty() {
            out.push(SEP);
        }
        out.extend_from_slice(part);
    }
    if out.is_empty() {
        out.push(b'.');
    }
    Ok(out)
}

/// POSIX `basename`: the last component, ignoring trailing separators.
///
/// `""` gives `.` and a path made only of separators gives `/`.
#[must_use]
pub fn basename(path: &[u8]) -> &[u8] {
    let path = c_path(path);
    if path.is_empty() {
        return b".";
    }
    let Some(last) = path.iter().rposition(|&b| b != SEP) else {
        return b"/";
    };
    let trimmed = &path[..=last];
    let start = trimmed.iter().rposition(|&b| b == SEP).map_or(0, |i| i + 1);
    &trimmed[start..]
}

/// POSIX `dirname`: everything before the last component.
///
/// A path without a separator gives `.`; the parent of a top-level entry is `/`.
#[must_use]
pub fn dirname(path: &[u8]) -> &[u8] {
    let path = c_path(path);
    let Some(last) = path.iter().rposition(|&b| b != SEP) else {
        return if path.is_empty() { b"." } else { b"/" };
    };
    let Some(sep) = path[..=last].iter().rposition(|&b| b == SEP) else {
        return b".";
    };
    match path[..sep].iter().rposition(|&b| b != SEP) {
        Some(end) => &path[..=end],
        None => b"/",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn clean(p: &str) -> String {
        cleanname_str(p)
    }

    #[test]
    fn test_cleanname_examples() {
        assert_eq!(clean("/a/b/c/.."), "/a/b");
        assert_eq!(clean("a/./b//c/"), "a/b/c");
        assert_eq!(clean("../x"), "../x");
        assert_eq!(clean(""), ".");
    }

    #[test]
    fn test_cleanname_root_and_dots() {
        assert_eq!(clean("/"), "/");
        assert_eq!(clean("///"), "/");
        assert_eq!(clean("/.."), "/");
        assert_eq!(clean("/../a"), "/a");
        assert_eq!(clean("."), ".");
        assert_eq!(clean("./"), ".");
        assert_eq!(clean("a/.."), ".");
        assert_eq!(clean("a/../.."), "..");
    }

    #[test]
    fn test_cleanname_keeps_unresolvable_parents() {
        assert_eq!(clean("a/../../b"), "../b");
        assert_eq!(clean("../../a/b/../c"), "../../a/c");
        assert_eq!(clean("..a/b"), "..a/b");
        assert_eq!(clean("a/.b/..c"), "a/.b/..c");
    }

    #[test]
    fn test_cleanname_stops_at_nul() {
        let mut buf = b"a//b\0/c".to_vec();
        cleanname(&mut buf);
        assert_eq!(buf, b"a/b");
    }

    #[test]
    fn test_abspath_relative_to_cwd() {
        let cwd = FixedDirectory::new("/home/user");
        assert_eq!(abspath(b"docs/../src", None, &cwd).unwrap(), b"/home/user/src");
        assert_eq!(abspath(b"/etc//passwd", None, &cwd).unwrap(), b"/etc/passwd");
        assert_eq!(abspath(b"", None, &cwd).unwrap(), b"/home/user");
    }

    #[test]
    fn test_abspath_with_reference() {
        let cwd = FixedDirectory::new("/home/user");
        assert_eq!(abspath(b"x", Some(b"/srv"), &cwd).unwrap(), b"/srv/x");
        assert_eq!(abspath(b"x", Some(b"proj/"), &cwd).unwrap(), b"/home/user/proj/x");
        assert_eq!(abspath(b"../x", Some(b"/"), &cwd).unwrap(), b"/x");
    }

    #[test]
    fn test_relpath_siblings_and_children() {
        let cwd = FixedDirectory::new("/home/user");
        assert_eq!(relpath(b"/a/b/c", Some(b"/a/d"), &cwd).unwrap(), b"../b/c");
        assert_eq!(relpath(b"/a/b/c", Some(b"/a"), &cwd).unwrap(), b"b/c");
        assert_eq!(relpath(b"/a", Some(b"/a/b/c"), &cwd).unwrap(), b"../..");
        assert_eq!(relpath(b"/a/b", Some(b"/a/b/"), &cwd).unwrap(), b".");
    }

    #[test]
    fn test_relpath_matches_whole_components() {
        let cwd = FixedDirectory::new("/");
        assert_eq!(relpath(b"/abcd/x", Some(b"/abc"), &cwd).unwrap(), b"../abcd/x");
        assert_eq!(relpath(b"/abc", Some(b"/abcd"), &cwd).unwrap(), b"../abc");
    }

    #[test]
    fn test_relpath_defaults_to_cwd() {
        let cwd = FixedDirectory::new("/home/user");
        assert_eq!(relpath(b"/home/user/src/lib.rs", None, &cwd).unwrap(), b"src/lib.rs");
        assert_eq!(relpath(b"notes", None, &cwd).unwrap(), b"notes");
    }

    #[test]
    fn test_process_directory_is_absolute() {
        let dir = ProcessDirectory.current_dir().unwrap();
        assert!(is_absolute(&dir));
    }

    struct UnavailableDirectory(std::io::ErrorKind);

    impl WorkingDirectory for UnavailableDirectory {
        fn current_dir(&self) -> Result<Vec<u8>, Error> {
            Err(Error::CurrentDirectory {
                errno: directory_errno(&std::io::Error::from(self.0)),
            })
        }
    }

    #[test]
    fn test_directory_failures_carry_named_errno() {
        use crate::errno::errno_name;
        use std::io::ErrorKind;

        for (kind, name) in [
            (ErrorKind::NotFound, "ENOENT"),
            (ErrorKind::PermissionDenied, "EACCES"),
            (ErrorKind::Interrupted, "EIO"),
        ] {
            let err = abspath(b"x", None, &UnavailableDirectory(kind)).unwrap_err();
            assert_eq!(errno_name(err.errno()), Some(name), "{kind:?}");
            let err = relpath(b"/a", None, &UnavailableDirectory(kind)).unwrap_err();
            assert_eq!(errno_name(err.errno()), Some(name), "{kind:?}");
        }
        assert_eq!(
            abspath(b"/abs", None, &UnavailableDirectory(ErrorKind::NotFound)).unwrap(),
            b"/abs"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_os_errno_passes_through() {
        let err = std::io::Error::from_raw_os_error(ENOENT);
        assert_eq!(directory_errno(&err), ENOENT);
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename(b"/usr/lib"), b"lib");
        assert_eq!(basename(b"/usr/"), b"usr");
        assert_eq!(basename(b"usr"), b"usr");
        assert_eq!(basename(b"/"), b"/");
        assert_eq!(basename(b"//"), b"/");
        assert_eq!(basename(b""), b".");
    }

    #[test]
    fn test_dirname() {
        assert_eq!(dirname(b"/usr/lib"), b"/usr");
        assert_eq!(dirname(b"/usr/"), b"/");
        assert_eq!(dirname(b"usr"), b".");
        assert_eq!(dirname(b"/"), b"/");
        assert_eq!(dirname(b"a//b//"), b"a");
        assert_eq!(dirname(b""), b".");
    }

    proptest! {
        #[test]
        fn prop_cleanname_is_idempotent(path in "[/.ab]{0,24}") {
            let once = clean(&path);
            prop_assert_eq!(clean(&once), once.clone());
        }

        #[test]
        fn prop_cleanname_output_invariants(path in "(/|a|b|\\.|\\.\\.){0,12}") {
            let out = clean(&path);
            prop_assert!(!out.contains("//"));
            prop_assert!(out == "/" || !out.ends_with('/'));
            prop_assert!(out.split('/').all(|c| c != "." || out == "."));
            prop_assert_eq!(out.starts_with('/'), path.starts_with('/'));
        }

        #[test]
        fn prop_abspath_is_absolute(path in "[/.ab]{0,16}") {
            let cwd = FixedDirectory::new("/w");
            let out = abspath(path.as_bytes(), None, &cwd).unwrap();
            prop_assert!(is_absolute(&out));
        }
    }
}
