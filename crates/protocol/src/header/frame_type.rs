use ::core::fmt;
use ::core::str::FromStr;

use thiserror::Error;

use super::error::HeaderError;

/// Frame types carried in the first byte of every ZMODEM header.
///
/// The numeric values are the `Z*` constants from the ZMODEM protocol
/// description, so traces captured from `lrzsz` can be compared byte for byte.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum FrameType {
    #[doc(alias = "ZRQINIT")]
    /// Sender asks the receiver to announce itself.
    RequestInit = 0,
    #[doc(alias = "ZRINIT")]
    /// Receiver announces its capabilities and is ready for files.
    ReceiverInit = 1,
    #[doc(alias = "ZSINIT")]
    /// Sender transmits its own flags and attention string.
    SenderInit = 2,
    #[doc(alias = "ZACK")]
    /// Generic acknowledgement.
    Ack = 3,
    #[doc(alias = "ZFILE")]
    /// File name and metadata follow.
    File = 4,
    #[doc(alias = "ZSKIP")]
    /// Receiver asks to skip the offered file.
    Skip = 5,
    #[doc(alias = "ZNAK")]
    /// The last header was garbled.
    Nak = 6,
    #[doc(alias = "ZABORT")]
    /// Abort the batch transfer.
    Abort = 7,
    #[doc(alias = "ZFIN")]
    /// Finish the session.
    Fin = 8,
    #[doc(alias = "ZRPOS")]
    /// Resume data transmission at the given offset.
    Rpos = 9,
    #[doc(alias = "ZDATA")]
    /// Data subpackets follow.
    Data = 10,
    #[doc(alias = "ZEOF")]
    /// End of file reached at the given offset.
    Eof = 11,
    #[doc(alias = "ZFERR")]
    /// Fatal read or write error.
    FileError = 12,
    #[doc(alias = "ZCRC")]
    /// Request for, or reply with, a file CRC.
    Crc = 13,
    #[doc(alias = "ZCHALLENGE")]
    /// Receiver security challenge.
    Challenge = 14,
    #[doc(alias = "ZCOMPL")]
    /// Request is complete.
    Complete = 15,
    #[doc(alias = "ZCAN")]
    /// Other end cancelled the session with `CAN*5`.
    Cancel = 16,
    #[doc(alias = "ZFREECNT")]
    /// Request for free bytes on the filesystem.
    FreeCount = 17,
    #[doc(alias = "ZCOMMAND")]
    /// Command from the sending program.
    Command = 18,
    #[doc(alias = "ZSTDERR")]
    /// Output to standard error, data follows.
    Stderr = 19,
}

/// Error returned when parsing a [`FrameType`] from its mnemonic name fails.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("unknown ZMODEM frame type name: \"{invalid_name}\"")]
pub struct ParseFrameTypeError {
    invalid_name: String,
}

impl ParseFrameTypeError {
    /// Returns the mnemonic name that failed to parse.
    #[must_use]
    pub fn invalid_name(&self) -> &str {
        &self.invalid_name
    }
}

impl FrameType {
    /// Every frame type, ordered by wire value.
    pub const ALL: [FrameType; 20] = [
        FrameType::RequestInit,
        FrameType::ReceiverInit,
        FrameType::SenderInit,
        FrameType::Ack,
        FrameType::File,
        FrameType::Skip,
        FrameType::Nak,
        FrameType::Abort,
        FrameType::Fin,
        FrameType::Rpos,
        FrameType::Data,
        FrameType::Eof,
        FrameType::FileError,
        FrameType::Crc,
        FrameType::Challenge,
        FrameType::Complete,
        FrameType::Cancel,
        FrameType::FreeCount,
        FrameType::Command,
        FrameType::Stderr,
    ];

    /// Returns the value written on the wire.
    #[must_use]
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Looks up a frame type by its wire value.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        if (value as usize) < Self::ALL.len() {
            Some(Self::ALL[value as usize])
        } else {
            None
        }
    }

    /// Returns the conventional `Z*` mnemonic.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            FrameType::RequestInit => "ZRQINIT",
            FrameType::ReceiverInit => "ZRINIT",
            FrameType::SenderInit => "ZSINIT",
            FrameType::Ack => "ZACK",
            FrameType::File => "ZFILE",
            FrameType::Skip => "ZSKIP",
            FrameType::Nak => "ZNAK",
            FrameType::Abort => "ZABORT",
            FrameType::Fin => "ZFIN",
            FrameType::Rpos => "ZRPOS",
            FrameType::Data => "ZDATA",
            FrameType::Eof => "ZEOF",
            FrameType::FileError => "ZFERR",
            FrameType::Crc => "ZCRC",
            FrameType::Challenge => "ZCHALLENGE",
            FrameType::Complete => "ZCOMPL",
            FrameType::Cancel => "ZCAN",
            FrameType::FreeCount => "ZFREECNT",
            FrameType::Command => "ZCOMMAND",
            FrameType::Stderr => "ZSTDERR",
        }
    }

    /// Reports whether a hex header of this type is followed by `XON`.
    ///
    /// Senders omit the flow-control byte after `ZACK` and `ZFIN`.
    #[must_use]
    pub const fn appends_xon(self) -> bool {
        !matches!(self, FrameType::Ack | FrameType::Fin)
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for FrameType {
    type Error = HeaderError;

    fn try_from(value: u8) -> Result<Self, HeaderError> {
        Self::from_u8(value).ok_or(HeaderError::UnknownFrameType(value))
    }
}

impl FromStr for FrameType {
    type Err = ParseFrameTypeError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|frame_type| frame_type.name() == name)
            .ok_or_else(|| ParseFrameTypeError {
                invalid_name: name.to_owned(),
            })
    }
}

impl From<FrameType> for u8 {
    fn from(value: FrameType) -> Self {
        value.as_u8()
    }
}
