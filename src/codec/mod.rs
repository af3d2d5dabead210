//! Byte-level encoders with no knowledge of résumés.
//!
//! Everything here works on plain strings and byte buffers so the offset
//! arithmetic of each container format can be tested in isolation:
//!
//! - [`crc32`]: IEEE CRC-32 used by ZIP entries
//! - [`zip`]: store-only ZIP writer (the OOXML container)
//! - [`pdf`]: minimal PDF object writer with a cross-reference table

pub mod crc32;
pub mod pdf;
pub mod zip;
