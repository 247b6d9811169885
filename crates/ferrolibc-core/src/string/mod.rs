//! String and memory operations.
//!
//! Implements `<string.h>` and `<wchar.h>` functions as safe Rust operating on
//! slices. The scanning and copying loops live in [`mem`] and are shared by the
//! byte and wide families.

pub mod mem;
pub mod str;
pub mod strtok;
pub mod wide;

// Re-export commonly used functions.
pub use mem::{
    CharUnit, CopyUntil, bzero, memccpy, memchr, memcmp, memcpy, memmem, memmove, mempcpy,
    memrchr, memset, rawmemchr,
};
pub use str::{
    stpcpy, stpncpy, strcasecmp, strcasestr, strcat, strchr, strchrnul, strcmp, strcpy, strcspn,
    strdup, strlcat, strlcpy, strlen, strncasecmp, strncat, strncmp, strncpy, strndup, strnlen,
    strpbrk, strrchr, strspn, strstr,
};
pub use strtok::{TokenStyle, Tokenizer, strsep, strtok, strtok_r};
pub use wide::{
    wcpcpy, wcscasecmp, wcscat, wcschr, wcscmp, wcscpy, wcscspn, wcsdup, wcslen, wcsncasecmp,
    wcsncat, wcsncmp, wcsncpy, wcsnlen, wcspbrk, wcsrchr, wcsspn, wcsstr, wcstok, wmemchr,
    wmemcmp, wmemcpy, wmemmove, wmempcpy, wmemrchr, wmemset,
};
