use thiserror::Error;

/// Failures encountered while decoding a ZMODEM hex header.
///
/// A malformed header usually means the bytes that looked like a header were
/// ordinary terminal traffic. Callers scanning a live stream treat every
/// variant as "not a header" and keep searching.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum HeaderError {
    /// The input does not start with `ZPAD ZPAD ZDLE 'B'`.
    #[error("hex header does not start with ZPAD ZPAD ZDLE 'B'")]
    MissingPrefix,
    /// A byte in the hex body is not a hexadecimal digit.
    #[error("invalid hex digit {byte:#04x} at offset {offset}")]
    InvalidHexDigit {
        /// The offending byte.
        byte: u8,
        /// Offset of the byte from the start of the header.
        offset: usize,
    },
    /// The frame type byte is not a known ZMODEM frame type.
    #[error("unknown ZMODEM frame type {0}")]
    UnknownFrameType(u8),
    /// The CRC-16 carried by the header does not match its contents.
    #[error("hex header checksum mismatch: expected {expected:#06x}, found {actual:#06x}")]
    ChecksumMismatch {
        /// CRC computed over the decoded type and data bytes.
        expected: u16,
        /// CRC carried by the header.
        actual: u16,
    },
    /// The hex body is not followed by `CR LF`.
    #[error("hex header is not terminated by CR LF")]
    MissingTerminator,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_invalid_digit() {
        let err = HeaderError::InvalidHexDigit {
            byte: b'z',
            offset: 6,
        };
        assert_eq!(err.to_string(), "invalid hex digit 0x7a at offset 6");
    }

    #[test]
    fn display_formats_checksum_mismatch() {
        let err = HeaderError::ChecksumMismatch {
            expected: 0x1234,
            actual: 0xabcd,
        };
        assert_eq!(
            err.to_string(),
            "hex header checksum mismatch: expected 0x1234, found 0xabcd"
        );
    }

    #[test]
    fn display_formats_unknown_frame_type() {
        assert_eq!(
            HeaderError::UnknownFrameType(99).to_string(),
            "unknown ZMODEM frame type 99"
        );
    }
}
