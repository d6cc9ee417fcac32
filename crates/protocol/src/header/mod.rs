//! ZMODEM hex headers.
//!
//! Every ZMODEM session opens with a hex header because hex frames survive
//! links that mangle control characters. The layout is:
//!
//! ```text
//! ZPAD ZPAD ZDLE 'B' | tt | p0 p1 p2 p3 | crc16 | CR LF | [XON]
//!    4 bytes         | 2  |   8 digits   |   4   |  2    |  1
//! ```
//!
//! [`Header::parse_hex`] decodes this form incrementally: when the input is a
//! valid prefix of a header it reports [`HexParse::NeedMoreData`] instead of
//! failing, so stream scanners can wait for the next fragment. The trailing
//! `XON` is never consumed by the parser because `ZACK` and `ZFIN` omit it.

mod capabilities;
mod error;
mod frame_type;
mod hex;

pub use capabilities::ReceiverCapabilities;
pub use error::HeaderError;
pub use frame_type::{FrameType, ParseFrameTypeError};

use crate::constants::{CR, HEX_DIGIT_COUNT, HEX_HEADER_PREFIX, LF, MIN_HEX_START_LEN, XON};
use crate::crc::crc16;

/// Offset of the first hex digit within an encoded header.
const BODY_OFFSET: usize = HEX_HEADER_PREFIX.len();

/// Outcome of an incremental hex header parse.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HexParse {
    /// The input is a valid, incomplete header; more bytes are required.
    NeedMoreData,
    /// A complete header was decoded from the first `consumed` bytes.
    Parsed {
        /// The decoded header.
        header: Header,
        /// Number of bytes consumed, excluding any trailing `XON`.
        consumed: usize,
    },
}

/// A decoded ZMODEM header: frame type plus four data bytes.
///
/// The data bytes are kept in wire order (`ZP0..ZP3`). Depending on the frame
/// type they are either a little-endian file position or the flag bytes
/// `ZF3..ZF0`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Header {
    frame_type: FrameType,
    data: [u8; 4],
}

impl Header {
    /// Creates a header from its frame type and raw data bytes.
    #[must_use]
    pub const fn new(frame_type: FrameType, data: [u8; 4]) -> Self {
        Self { frame_type, data }
    }

    /// Creates a header whose data bytes carry the little-endian `position`.
    #[must_use]
    pub const fn with_position(frame_type: FrameType, position: u32) -> Self {
        Self::new(frame_type, position.to_le_bytes())
    }

    /// Returns the frame type.
    #[must_use]
    #[inline]
    pub const fn frame_type(&self) -> FrameType {
        self.frame_type
    }

    /// Returns the raw data bytes in wire order.
    #[must_use]
    #[inline]
    pub const fn data(&self) -> [u8; 4] {
        self.data
    }

    /// Interprets the data bytes as a little-endian offset.
    #[must_use]
    pub const fn position(&self) -> u32 {
        u32::from_le_bytes(self.data)
    }

    /// Returns flag byte `ZF0`.
    #[must_use]
    pub const fn zf0(&self) -> u8 {
        self.data[3]
    }

    /// Returns flag byte `ZF1`.
    #[must_use]
    pub const fn zf1(&self) -> u8 {
        self.data[2]
    }

    /// Returns flag byte `ZF2`.
    #[must_use]
    pub const fn zf2(&self) -> u8 {
        self.data[1]
    }

    /// Returns flag byte `ZF3`.
    #[must_use]
    pub const fn zf3(&self) -> u8 {
        self.data[0]
    }

    /// Capabilities advertised by a `ZRINIT` header.
    ///
    /// Returns `None` for every other frame type.
    #[must_use]
    pub const fn receiver_capabilities(&self) -> Option<ReceiverCapabilities> {
        match self.frame_type {
            FrameType::ReceiverInit => Some(ReceiverCapabilities::from_bits(self.zf0())),
            _ => None,
        }
    }

    /// Receive buffer size advertised by a `ZRINIT` header.
    ///
    /// Zero means the receiver streams without a fixed buffer. Returns `None`
    /// for every other frame type.
    #[must_use]
    pub const fn receiver_buffer_size(&self) -> Option<u16> {
        match self.frame_type {
            FrameType::ReceiverInit => Some(u16::from_le_bytes([self.data[0], self.data[1]])),
            _ => None,
        }
    }

    /// Decodes a hex header from the start of `bytes`.
    ///
    /// Digits are validated as soon as they arrive, so garbage following the
    /// prefix is rejected without waiting for the full header length.
    ///
    /// # Errors
    ///
    /// Returns a [`HeaderError`] when the available bytes cannot be the start
    /// of a well-formed hex header.
    ///
    /// # Examples
    ///
    /// ```
    /// use protocol::{FrameType, Header, HexParse};
    ///
    /// let wire = b"**\x18B00000000000000\r\x8a\x11";
    /// let HexParse::Parsed { header, consumed } = Header::parse_hex(wire).unwrap() else {
    ///     panic!("complete header");
    /// };
    /// assert_eq!(header.frame_type(), FrameType::RequestInit);
    /// assert_eq!(consumed, 20);
    ///
    /// assert_eq!(Header::parse_hex(&wire[..9]), Ok(HexParse::NeedMoreData));
    /// ```
    pub fn parse_hex(bytes: &[u8]) -> Result<HexParse, HeaderError> {
        let prefix_seen = bytes.len().min(BODY_OFFSET);
        if bytes[..prefix_seen] != HEX_HEADER_PREFIX[..prefix_seen] {
            return Err(HeaderError::MissingPrefix);
        }

        let body = bytes.get(BODY_OFFSET..).unwrap_or_default();
        let available = body.len().min(HEX_DIGIT_COUNT);
        let mut decoded = [0u8; HEX_DIGIT_COUNT / 2];
        for (index, &byte) in body[..available].iter().enumerate() {
            let value = hex::digit_value(byte).ok_or(HeaderError::InvalidHexDigit {
                byte,
                offset: BODY_OFFSET + index,
            })?;
            decoded[index / 2] = (decoded[index / 2] << 4) | value;
        }

        if available >= 2 {
            FrameType::try_from(decoded[0])?;
        }

        if available < HEX_DIGIT_COUNT {
            return Ok(HexParse::NeedMoreData);
        }

        let expected = crc16(&decoded[..5]);
        let actual = u16::from_be_bytes([decoded[5], decoded[6]]);
        if expected != actual {
            return Err(HeaderError::ChecksumMismatch { expected, actual });
        }

        let terminator = &bytes[BODY_OFFSET + HEX_DIGIT_COUNT..];
        match terminator {
            [] => return Ok(HexParse::NeedMoreData),
            [cr, ..] if cr & 0x7f != CR => return Err(HeaderError::MissingTerminator),
            [_] => return Ok(HexParse::NeedMoreData),
            [_, lf, ..] if lf & 0x7f != LF => return Err(HeaderError::MissingTerminator),
            _ => {}
        }

        let frame_type = FrameType::try_from(decoded[0])?;
        let data = [decoded[1], decoded[2], decoded[3], decoded[4]];
        Ok(HexParse::Parsed {
            header: Self::new(frame_type, data),
            consumed: MIN_HEX_START_LEN,
        })
    }

    /// Encodes the header in hex form, including the `XON` suffix when the
    /// frame type calls for it.
    ///
    /// The line feed is sent with its high bit set, as `lrzsz` does.
    #[must_use]
    pub fn to_hex(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(MIN_HEX_START_LEN + 1);
        out.extend_from_slice(&HEX_HEADER_PREFIX);

        let mut raw = [0u8; 5];
        raw[0] = self.frame_type.as_u8();
        raw[1..].copy_from_slice(&self.data);
        for byte in raw {
            hex::push_byte(&mut out, byte);
        }
        for byte in crc16(&raw).to_be_bytes() {
            hex::push_byte(&mut out, byte);
        }

        out.push(CR);
        out.push(LF | 0x80);
        if self.frame_type.appends_xon() {
            out.push(XON);
        }
        out
    }
}
