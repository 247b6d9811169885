//! # ferrolibc-core
//!
//! Safe Rust implementations of the algorithmic core of a C library: the
//! `mem*`/`str*`/`wcs*` scanning and copying family, lexical path
//! normalization, and the text codecs for file modes, byte sizes, and
//! backslash escapes.
//!
//! Every function is a pure computation over caller-owned buffers. Offsets
//! stand in for C pointers and `Option<usize>` for "not found". No `unsafe`
//! code is permitted at the crate level.

#![deny(unsafe_code)]

pub mod config;
pub mod ctype;
pub mod errno;
pub mod escape;
pub mod malloc;
pub mod mode;
pub mod path;
pub mod size;
pub mod string;

pub use errno::Error;
