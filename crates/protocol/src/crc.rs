//! CRC-16/XMODEM as used by ZMODEM hex headers.
//!
//! Hex headers always carry a 16-bit CRC regardless of the CRC width the
//! peers later negotiate for binary frames. The polynomial is `0x1021` with a
//! zero initial value and no reflection, matching `updcrc` in `lrzsz`.

const POLY: u16 = 0x1021;

const fn build_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut index = 0;
    while index < 256 {
        let mut crc = (index as u16) << 8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ POLY
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[index] = crc;
        index += 1;
    }
    table
}

static TABLE: [u16; 256] = build_table();

/// Computes the CRC-16/XMODEM checksum of `bytes`.
///
/// # Examples
///
/// ```
/// assert_eq!(protocol::crc16(b"123456789"), 0x31c3);
/// ```
#[must_use]
pub fn crc16(bytes: &[u8]) -> u16 {
    bytes.iter().fold(0u16, |crc, &byte| {
        let index = ((crc >> 8) as u8 ^ byte) as usize;
        (crc << 8) ^ TABLE[index]
    })
}
