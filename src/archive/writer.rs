//! Minimal STORE-mode ZIP writer.
//!
//! Encodes (filename, bytes) pairs into a flat ZIP byte stream without any
//! compression: a local file header plus raw data per entry, followed by the
//! central directory and the end-of-central-directory record. Media files
//! are already compressed, so stored entries lose nothing.
//!
//! Timestamps are written as zero so identical inputs produce identical
//! archives.

use crate::archive::crc32::crc32;
use crate::error::{Error, Result};

/// Local file header signature ("PK\x03\x04").
const LOCAL_FILE_HEADER_SIGNATURE: u32 = 0x0403_4B50;

/// Central directory header signature ("PK\x01\x02").
const CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0201_4B50;

/// End of central directory signature ("PK\x05\x06").
const END_OF_CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0605_4B50;

/// ZIP format version 2.0, the minimum for stored entries.
const ZIP_VERSION: u16 = 20;

/// General purpose bit 11: filename is UTF-8 encoded.
const FLAG_UTF8_FILENAME: u16 = 1 << 11;

/// Bookkeeping for one written entry, needed again when the central
/// directory is emitted.
#[derive(Debug, Clone)]
struct EntryRecord {
    filename: String,
    crc32: u32,
    size: u32,
    offset: u32,
}

/// Incremental STORE-mode ZIP encoder.
///
/// Entries are appended with [`ZipWriter::add_file`]; the archive is
/// finalized exactly once with [`ZipWriter::finish`], which consumes the
/// writer and returns the complete byte stream.
#[derive(Debug, Default)]
pub struct ZipWriter {
    buffer: Vec<u8>,
    entries: Vec<EntryRecord>,
}

impl ZipWriter {
    /// Create an empty archive writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries appended so far.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Check whether an entry with this exact filename has been written.
    pub fn contains(&self, filename: &str) -> bool {
        self.entries.iter().any(|e| e.filename == filename)
    }

    /// Append one file entry: local header immediately followed by the raw
    /// bytes. The entry's starting offset is recorded for the central
    /// directory.
    pub fn add_file(&mut self, filename: &str, data: &[u8]) -> Result<()> {
        if filename.is_empty() {
            return Err(Error::Archive("entry filename cannot be empty".into()));
        }
        if data.len() > u32::MAX as usize {
            return Err(Error::Archive(format!(
                "entry '{}' exceeds ZIP size limit",
                filename
            )));
        }

        let offset = self.buffer.len() as u32;
        let checksum = crc32(data);
        let name_bytes = filename.as_bytes();

        self.put_u32(LOCAL_FILE_HEADER_SIGNATURE);
        self.put_u16(ZIP_VERSION);
        self.put_u16(FLAG_UTF8_FILENAME);
        self.put_u16(0); // method: stored
        self.put_u16(0); // mod time (zeroed, reproducible output)
        self.put_u16(0); // mod date
        self.put_u32(checksum);
        self.put_u32(data.len() as u32); // compressed size == uncompressed
        self.put_u32(data.len() as u32);
        self.put_u16(name_bytes.len() as u16);
        self.put_u16(0); // extra field length
        self.buffer.extend_from_slice(name_bytes);
        self.buffer.extend_from_slice(data);

        self.entries.push(EntryRecord {
            filename: filename.to_string(),
            crc32: checksum,
            size: data.len() as u32,
            offset,
        });

        Ok(())
    }

    /// Finalize the archive: emit one central directory record per entry and
    /// the end-of-central-directory record, then return the complete byte
    /// stream.
    pub fn finish(mut self) -> Vec<u8> {
        let directory_offset = self.buffer.len() as u32;
        let entries = std::mem::take(&mut self.entries);

        for entry in &entries {
            let name_bytes = entry.filename.as_bytes().to_vec();

            self.put_u32(CENTRAL_DIRECTORY_SIGNATURE);
            self.put_u16(ZIP_VERSION); // version made by
            self.put_u16(ZIP_VERSION); // version needed to extract
            self.put_u16(FLAG_UTF8_FILENAME);
            self.put_u16(0); // method: stored
            self.put_u16(0); // mod time
            self.put_u16(0); // mod date
            self.put_u32(entry.crc32);
            self.put_u32(entry.size);
            self.put_u32(entry.size);
            self.put_u16(name_bytes.len() as u16);
            self.put_u16(0); // extra field length
            self.put_u16(0); // comment length
            self.put_u16(0); // disk number start
            self.put_u16(0); // internal attributes
            self.put_u32(0); // external attributes
            self.put_u32(entry.offset);
            self.buffer.extend_from_slice(&name_bytes);
        }

        let directory_size = self.buffer.len() as u32 - directory_offset;

        self.put_u32(END_OF_CENTRAL_DIRECTORY_SIGNATURE);
        self.put_u16(0); // this disk number
        self.put_u16(0); // disk where directory starts
        self.put_u16(entries.len() as u16); // entries on this disk
        self.put_u16(entries.len() as u16); // total entries
        self.put_u32(directory_size);
        self.put_u32(directory_offset);
        self.put_u16(0); // comment length

        self.buffer
    }

    fn put_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    fn put_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_u16(bytes: &[u8], at: usize) -> u16 {
        u16::from_le_bytes([bytes[at], bytes[at + 1]])
    }

    fn read_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    /// Parse a finished archive the way a conforming reader would: locate
    /// the end record, walk the central directory, then read each entry's
    /// data through its local header.
    fn parse_archive(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
        let end = bytes.len() - 22;
        assert_eq!(read_u32(bytes, end), END_OF_CENTRAL_DIRECTORY_SIGNATURE);

        let entry_count = read_u16(bytes, end + 10) as usize;
        assert_eq!(entry_count, read_u16(bytes, end + 8) as usize);
        let directory_size = read_u32(bytes, end + 12) as usize;
        let directory_offset = read_u32(bytes, end + 16) as usize;
        assert_eq!(directory_offset + directory_size, end);

        let mut out = Vec::new();
        let mut at = directory_offset;
        for _ in 0..entry_count {
            assert_eq!(read_u32(bytes, at), CENTRAL_DIRECTORY_SIGNATURE);
            let checksum = read_u32(bytes, at + 16);
            let size = read_u32(bytes, at + 20) as usize;
            let name_len = read_u16(bytes, at + 28) as usize;
            let local_offset = read_u32(bytes, at + 42) as usize;
            let name = String::from_utf8(bytes[at + 46..at + 46 + name_len].to_vec()).unwrap();

            // Cross-check against the local header.
            assert_eq!(read_u32(bytes, local_offset), LOCAL_FILE_HEADER_SIGNATURE);
            let local_name_len = read_u16(bytes, local_offset + 26) as usize;
            assert_eq!(local_name_len, name_len);
            assert_eq!(read_u32(bytes, local_offset + 14), checksum);
            let data_start = local_offset + 30 + name_len;
            let data = bytes[data_start..data_start + size].to_vec();
            assert_eq!(crc32(&data), checksum);

            out.push((name, data));
            at += 46 + name_len;
        }
        out
    }

    #[test]
    fn test_empty_archive() {
        let bytes = ZipWriter::new().finish();
        assert_eq!(bytes.len(), 22);
        assert_eq!(read_u32(&bytes, 0), END_OF_CENTRAL_DIRECTORY_SIGNATURE);
        assert_eq!(read_u16(&bytes, 10), 0);
    }

    #[test]
    fn test_round_trip() {
        let mut writer = ZipWriter::new();
        writer.add_file("photo_1.jpg", b"first image bytes").unwrap();
        writer.add_file("clip.mp4", b"\x00\x01\x02\x03binary").unwrap();
        writer.add_file("note.txt", b"").unwrap();

        let entries = parse_archive(&writer.finish());
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].0, "photo_1.jpg");
        assert_eq!(entries[0].1, b"first image bytes");
        assert_eq!(entries[1].0, "clip.mp4");
        assert_eq!(entries[1].1, b"\x00\x01\x02\x03binary");
        assert_eq!(entries[2].0, "note.txt");
        assert!(entries[2].1.is_empty());
    }

    #[test]
    fn test_second_entry_offset() {
        let mut writer = ZipWriter::new();
        writer.add_file("a.bin", b"12345").unwrap();
        writer.add_file("b.bin", b"678").unwrap();
        let bytes = writer.finish();

        // Second local header starts right after header + name + data of the
        // first entry.
        let expected = 30 + "a.bin".len() + 5;
        assert_eq!(read_u32(&bytes, expected), LOCAL_FILE_HEADER_SIGNATURE);
    }

    #[test]
    fn test_utf8_filename_flag() {
        let mut writer = ZipWriter::new();
        writer.add_file("écran.png", b"data").unwrap();
        let bytes = writer.finish();
        assert_eq!(read_u16(&bytes, 6) & FLAG_UTF8_FILENAME, FLAG_UTF8_FILENAME);

        let entries = parse_archive(&bytes);
        assert_eq!(entries[0].0, "écran.png");
    }

    #[test]
    fn test_reproducible_output() {
        let build = || {
            let mut writer = ZipWriter::new();
            writer.add_file("x.jpg", b"payload").unwrap();
            writer.finish()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_empty_filename_rejected() {
        let mut writer = ZipWriter::new();
        assert!(writer.add_file("", b"data").is_err());
    }

    #[test]
    fn test_contains() {
        let mut writer = ZipWriter::new();
        writer.add_file("a.jpg", b"1").unwrap();
        assert!(writer.contains("a.jpg"));
        assert!(!writer.contains("b.jpg"));
    }
}
