//! Read-only file access for the text engine.
pub mod mmap;
