//! CRC-32 checksum implementation.
//!
//! Uses the standard ZIP/PNG reflected polynomial with a 256-entry lookup
//! table built once per process.

use std::sync::OnceLock;

/// Reflected CRC-32 polynomial used by ZIP and PNG.
const CRC32_POLYNOMIAL: u32 = 0xEDB8_8320;

static CRC32_TABLE: OnceLock<[u32; 256]> = OnceLock::new();

fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    for (n, slot) in table.iter_mut().enumerate() {
        let mut c = n as u32;
        for _ in 0..8 {
            c = if c & 1 != 0 {
                CRC32_POLYNOMIAL ^ (c >> 1)
            } else {
                c >> 1
            };
        }
        *slot = c;
    }
    table
}

/// Compute the CRC-32 checksum of a byte slice.
pub fn crc32(data: &[u8]) -> u32 {
    let table = CRC32_TABLE.get_or_init(build_table);

    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        crc = table[((crc ^ byte as u32) & 0xFF) as usize] ^ (crc >> 8);
    }
    crc ^ 0xFFFF_FFFF
}
