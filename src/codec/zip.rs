//! Store-only ZIP writer.
//!
//! OOXML packages are ordinary ZIP archives, and a word processor opens an
//! uncompressed ("stored", method 0) archive just as happily as a deflated
//! one. The writer therefore only has to get the bookkeeping right:
//!
//! ```text
//! [local header 30 B][name][data]   × N   ← entries, in insertion order
//! [central record 46 B][name]       × N   ← one per entry, same order
//! [end of central directory 22 B]
//! ```
//!
//! Every multi-byte field is little-endian. Sizes and offsets are 32-bit and
//! counts 16-bit; values that do not fit produce
//! [`AtsError::ArchiveOverflow`] because ZIP64 is not implemented.

use crate::codec::crc32::Crc32;
use crate::error::AtsError;
use tracing::debug;

pub const LOCAL_FILE_HEADER_SIGNATURE: u32 = 0x0403_4b50;
pub const CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0201_4b50;
pub const END_OF_CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0605_4b50;

pub const LOCAL_FILE_HEADER_LEN: usize = 30;
pub const CENTRAL_DIRECTORY_RECORD_LEN: usize = 46;
pub const END_OF_CENTRAL_DIRECTORY_LEN: usize = 22;

const VERSION: u16 = 20;
const METHOD_STORED: u16 = 0;

/// Bookkeeping kept per entry until the central directory is written.
#[derive(Debug, Clone)]
struct EntryRecord {
    name: Vec<u8>,
    crc: u32,
    size: u32,
    offset: u32,
}

/// Incremental archive builder.
///
/// ```
/// use resume_ats::codec::zip::ArchiveWriter;
///
/// let mut zip = ArchiveWriter::new();
/// zip.add_part("hello.txt", "Hello")?;
/// let bytes = zip.finish()?;
/// assert_eq!(&bytes[..4], b"PK\x03\x04");
/// # Ok::<(), resume_ats::AtsError>(())
/// ```
#[derive(Debug, Default)]
pub struct ArchiveWriter {
    buf: Vec<u8>,
    entries: Vec<EntryRecord>,
}

impl ArchiveWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one stored entry: local header, file name, then content.
    pub fn add_part(&mut self, path: &str, content: &str) -> Result<(), AtsError> {
        self.add_bytes(path, content.as_bytes())
    }

    /// Byte-level variant of [`add_part`](Self::add_part).
    pub fn add_bytes(&mut self, path: &str, data: &[u8]) -> Result<(), AtsError> {
        if self.entries.len() >= u16::MAX as usize {
            return Err(AtsError::ArchiveOverflow {
                field: "entry count",
                value: self.entries.len() as u64 + 1,
            });
        }
        let name = path.as_bytes().to_vec();
        let name_len = fit_u16("file name length", name.len())?;
        let size = fit_u32("entry size", data.len())?;
        let offset = fit_u32("local header offset", self.buf.len())?;
        let crc = Crc32::compute(data);

        put_u32(&mut self.buf, LOCAL_FILE_HEADER_SIGNATURE);
        put_u16(&mut self.buf, VERSION);
        put_u16(&mut self.buf, 0); // general purpose flags
        put_u16(&mut self.buf, METHOD_STORED);
        put_u16(&mut self.buf, 0); // mod time
        put_u16(&mut self.buf, 0); // mod date
        put_u32(&mut self.buf, crc);
        put_u32(&mut self.buf, size); // compressed
        put_u32(&mut self.buf, size); // uncompressed
        put_u16(&mut self.buf, name_len);
        put_u16(&mut self.buf, 0); // extra field length
        self.buf.extend_from_slice(&name);
        self.buf.extend_from_slice(data);

        debug!(
            "zip entry '{}' at offset {} ({} bytes, crc {:08x})",
            path, offset, size, crc
        );
        self.entries.push(EntryRecord {
            name,
            crc,
            size,
            offset,
        });
        Ok(())
    }

    /// Number of entries written so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the central directory and end record, returning the archive.
    pub fn finish(mut self) -> Result<Vec<u8>, AtsError> {
        let cd_offset = fit_u32("central directory offset", self.buf.len())?;

        for entry in &self.entries {
            put_u32(&mut self.buf, CENTRAL_DIRECTORY_SIGNATURE);
            put_u16(&mut self.buf, VERSION); // version made by
            put_u16(&mut self.buf, VERSION); // version needed
            put_u16(&mut self.buf, 0); // flags
            put_u16(&mut self.buf, METHOD_STORED);
            put_u16(&mut self.buf, 0); // mod time
            put_u16(&mut self.buf, 0); // mod date
            put_u32(&mut self.buf, entry.crc);
            put_u32(&mut self.buf, entry.size);
            put_u32(&mut self.buf, entry.size);
            // Checked in add_bytes.
            put_u16(&mut self.buf, entry.name.len() as u16);
            put_u16(&mut self.buf, 0); // extra field length
            put_u16(&mut self.buf, 0); // comment length
            put_u16(&mut self.buf, 0); // disk number start
            put_u16(&mut self.buf, 0); // internal attributes
            put_u32(&mut self.buf, 0); // external attributes
            put_u32(&mut self.buf, entry.offset);
            self.buf.extend_from_slice(&entry.name);
        }

        let cd_size = fit_u32("central directory size", self.buf.len() - cd_offset as usize)?;
        let count = self.entries.len() as u16;

        put_u32(&mut self.buf, END_OF_CENTRAL_DIRECTORY_SIGNATURE);
        put_u16(&mut self.buf, 0); // this disk
        put_u16(&mut self.buf, 0); // disk with central directory
        put_u16(&mut self.buf, count); // entries on this disk
        put_u16(&mut self.buf, count); // total entries
        put_u32(&mut self.buf, cd_size);
        put_u32(&mut self.buf, cd_offset);
        put_u16(&mut self.buf, 0); // comment length

        debug!(
            "zip finished: {} entries, central directory {} bytes at {}, total {} bytes",
            count,
            cd_size,
            cd_offset,
            self.buf.len()
        );
        Ok(self.buf)
    }
}

/// Build an archive from `(path, content)` parts in the given order.
pub fn pack<'a, I>(parts: I) -> Result<Vec<u8>, AtsError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut writer = ArchiveWriter::new();
    for (path, content) in parts {
        writer.add_part(path, content)?;
    }
    writer.finish()
}

// ── Little-endian helpers ────────────────────────────────────────────────

fn put_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn fit_u16(field: &'static str, v: usize) -> Result<u16, AtsError> {
    u16::try_from(v).map_err(|_| AtsError::ArchiveOverflow {
        field,
        value: v as u64,
    })
}

fn fit_u32(field: &'static str, v: usize) -> Result<u32, AtsError> {
    u32::try_from(v).map_err(|_| AtsError::ArchiveOverflow {
        field,
        value: v as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u16_at(b: &[u8], at: usize) -> u16 {
        u16::from_le_bytes([b[at], b[at + 1]])
    }

    fn u32_at(b: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
    }

    #[test]
    fn empty_archive_is_just_the_end_record() {
        let bytes = ArchiveWriter::new().finish().unwrap();
        assert_eq!(bytes.len(), END_OF_CENTRAL_DIRECTORY_LEN);
        assert_eq!(u32_at(&bytes, 0), END_OF_CENTRAL_DIRECTORY_SIGNATURE);
        assert_eq!(u16_at(&bytes, 10), 0);
        assert_eq!(u32_at(&bytes, 16), 0);
    }

    #[test]
    fn single_entry_layout() {
        let bytes = pack([("a.txt", "hello")]).unwrap();

        // Local header.
        assert_eq!(u32_at(&bytes, 0), LOCAL_FILE_HEADER_SIGNATURE);
        assert_eq!(u16_at(&bytes, 4), 20);
        assert_eq!(u16_at(&bytes, 8), 0, "stored");
        assert_eq!(u32_at(&bytes, 14), Crc32::compute(b"hello"));
        assert_eq!(u32_at(&bytes, 18), 5);
        assert_eq!(u32_at(&bytes, 22), 5);
        assert_eq!(u16_at(&bytes, 26), 5);
        assert_eq!(u16_at(&bytes, 28), 0);
        assert_eq!(&bytes[30..35], b"a.txt");
        assert_eq!(&bytes[35..40], b"hello");

        // Central directory follows immediately.
        let cd = 40;
        assert_eq!(u32_at(&bytes, cd), CENTRAL_DIRECTORY_SIGNATURE);
        assert_eq!(u32_at(&bytes, cd + 16), Crc32::compute(b"hello"));
        assert_eq!(u32_at(&bytes, cd + 42), 0, "local header offset");
        assert_eq!(&bytes[cd + 46..cd + 51], b"a.txt");

        // End record.
        let eocd = cd + CENTRAL_DIRECTORY_RECORD_LEN + 5;
        assert_eq!(bytes.len(), eocd + END_OF_CENTRAL_DIRECTORY_LEN);
        assert_eq!(u32_at(&bytes, eocd), END_OF_CENTRAL_DIRECTORY_SIGNATURE);
        assert_eq!(u16_at(&bytes, eocd + 8), 1);
        assert_eq!(u16_at(&bytes, eocd + 10), 1);
        assert_eq!(u32_at(&bytes, eocd + 12), 51, "central directory size");
        assert_eq!(u32_at(&bytes, eocd + 16), 40, "central directory offset");
        assert_eq!(u16_at(&bytes, eocd + 20), 0);
    }

    #[test]
    fn second_entry_offset_accounts_for_first() {
        let bytes = pack([("x", "12"), ("yy", "345")]).unwrap();
        let second_local = LOCAL_FILE_HEADER_LEN + 1 + 2;
        assert_eq!(u32_at(&bytes, second_local), LOCAL_FILE_HEADER_SIGNATURE);

        let cd = second_local + LOCAL_FILE_HEADER_LEN + 2 + 3;
        let second_cd = cd + CENTRAL_DIRECTORY_RECORD_LEN + 1;
        assert_eq!(u32_at(&bytes, second_cd), CENTRAL_DIRECTORY_SIGNATURE);
        assert_eq!(u32_at(&bytes, second_cd + 42), second_local as u32);
    }

    #[test]
    fn utf8_content_sizes_are_byte_lengths() {
        let bytes = pack([("r.xml", "Résumé")]).unwrap();
        assert_eq!(u32_at(&bytes, 18), "Résumé".len() as u32);
        assert_eq!(u32_at(&bytes, 18), 8);
    }

    #[test]
    fn file_name_too_long_overflows() {
        let long = "n".repeat(u16::MAX as usize + 1);
        let err = pack([(long.as_str(), "")]).unwrap_err();
        assert!(matches!(
            err,
            AtsError::ArchiveOverflow {
                field: "file name length",
                ..
            }
        ));
    }

    #[test]
    fn writer_counts_entries() {
        let mut zip = ArchiveWriter::new();
        assert!(zip.is_empty());
        zip.add_part("one", "1").unwrap();
        zip.add_bytes("two", &[0, 1, 2]).unwrap();
        assert_eq!(zip.len(), 2);
    }

    #[test]
    fn entry_count_fills_the_sixteen_bit_field() {
        let mut zip = ArchiveWriter::new();
        for i in 0..u16::MAX {
            zip.add_bytes(&i.to_string(), &[]).unwrap();
        }
        let err = zip.add_bytes("one-more", &[]).unwrap_err();
        assert!(matches!(
            err,
            AtsError::ArchiveOverflow { field: "entry count", value: 65536 }
        ));

        let bytes = zip.finish().unwrap();
        let eocd = bytes.len() - END_OF_CENTRAL_DIRECTORY_LEN;
        assert_eq!(u16_at(&bytes, eocd + 8), u16::MAX);
        assert_eq!(u16_at(&bytes, eocd + 10), u16::MAX);
    }
}
