//! Streaming ZIP archive encoding.
//!
//! This module provides:
//! - CRC-32 checksumming with a lazily built lookup table
//! - A minimal STORE-mode (uncompressed) ZIP writer

pub mod crc32;
pub mod writer;

pub use crc32::crc32;
pub use writer::ZipWriter;
