use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Capability bits a receiver advertises in the `ZF0` byte of `ZRINIT`.
///
/// The bitfield is kept open: bits this crate does not name are preserved so
/// a send-direction engine can still inspect them.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct ReceiverCapabilities {
    bits: u8,
}

impl ReceiverCapabilities {
    const fn new(bits: u8) -> Self {
        Self { bits }
    }

    /// No capabilities.
    pub const EMPTY: Self = Self::new(0);
    /// Receiver can send and receive at the same time (`CANFDX`).
    pub const FULL_DUPLEX: Self = Self::new(0x01);
    /// Receiver can receive data during disk I/O (`CANOVIO`).
    pub const OVERLAP_IO: Self = Self::new(0x02);
    /// Receiver can send a break signal (`CANBRK`).
    pub const BREAK: Self = Self::new(0x04);
    /// Receiver can decrypt (`CANCRY`).
    pub const DECRYPT: Self = Self::new(0x08);
    /// Receiver can uncompress (`CANLZW`).
    pub const DECOMPRESS: Self = Self::new(0x10);
    /// Receiver can use 32-bit frame checks (`CANFC32`).
    pub const CRC32: Self = Self::new(0x20);
    /// Receiver expects control characters to be escaped (`ESCCTL`).
    pub const ESCAPE_CONTROL: Self = Self::new(0x40);
    /// Receiver expects 8th-bit characters to be escaped (`ESC8`).
    pub const ESCAPE_EIGHTH_BIT: Self = Self::new(0x80);

    const NAMED: [(Self, &'static str); 8] = [
        (Self::FULL_DUPLEX, "CANFDX"),
        (Self::OVERLAP_IO, "CANOVIO"),
        (Self::BREAK, "CANBRK"),
        (Self::DECRYPT, "CANCRY"),
        (Self::DECOMPRESS, "CANLZW"),
        (Self::CRC32, "CANFC32"),
        (Self::ESCAPE_CONTROL, "ESCCTL"),
        (Self::ESCAPE_EIGHTH_BIT, "ESC8"),
    ];

    /// Returns a bitfield constructed from the raw `ZF0` byte.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self { bits }
    }

    /// Returns the raw bit representation.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.bits
    }

    /// Returns `true` when no capability is advertised.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Checks whether all bits in `other` are set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.bits & other.bits) == other.bits
    }

    /// Returns the union of both operands.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self::new(self.bits | other.bits)
    }

    /// Returns the mnemonic names of the set bits in ascending order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMED
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }
}

impl fmt::Debug for ReceiverCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReceiverCapabilities")
            .field("bits", &format_args!("0x{:02x}", self.bits))
            .finish()
    }
}

impl fmt::Display for ReceiverCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }

        let mut first = true;
        for name in self.names() {
            if !first {
                f.write_str(" | ")?;
            }
            first = false;
            f.write_str(name)?;
        }
        Ok(())
    }
}

impl BitOr for ReceiverCapabilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl BitOrAssign for ReceiverCapabilities {
    fn bitor_assign(&mut self, rhs: Self) {
        self.bits |= rhs.bits;
    }
}

impl BitAnd for ReceiverCapabilities {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::new(self.bits & rhs.bits)
    }
}
