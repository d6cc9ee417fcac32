//! Control bytes and fixed sequences used by the ZMODEM hex handshake.
//!
//! The values follow the byte assignments used by `lrzsz` and every
//! compatible implementation. Higher layers reference these constants instead
//! of repeating literals so buffer sizing and diagnostics stay in sync with the
//! wire format.

/// Padding character that introduces every ZMODEM header (`*`).
pub const ZPAD: u8 = 0x2a;

/// ZMODEM data link escape. Shares its value with ASCII `CAN`.
pub const ZDLE: u8 = 0x18;

/// ASCII cancel. Five consecutive `CAN` bytes abort a ZMODEM session.
pub const CAN: u8 = ZDLE;

/// Format indicator for hex-encoded headers (`B`).
pub const ZHEX: u8 = b'B';

/// Software flow control resume byte, appended to most hex headers.
pub const XON: u8 = 0x11;

/// Software flow control pause byte.
pub const XOFF: u8 = 0x13;

/// Carriage return that begins the hex header terminator.
pub const CR: u8 = 0x0d;

/// Line feed that ends the hex header terminator.
pub const LF: u8 = 0x0a;

/// ASCII backspace.
pub const BS: u8 = 0x08;

/// Bytes every hex header starts with: `ZPAD ZPAD ZDLE ZHEX`.
pub const HEX_HEADER_PREFIX: [u8; 4] = [ZPAD, ZPAD, ZDLE, ZHEX];

/// Telltale opening of a session-start hex header.
///
/// Both `ZRQINIT` (`00`) and `ZRINIT` (`01`) encode their frame type with a
/// leading `'0'` digit, so the first five bytes are shared. The digit that
/// tells the two flavors apart is checked by the header parser.
pub const HEX_SESSION_MARKER: [u8; 5] = [ZPAD, ZPAD, ZDLE, ZHEX, b'0'];

/// Number of hex digits following [`HEX_HEADER_PREFIX`]: type, four data
/// bytes, and a CRC-16.
pub const HEX_DIGIT_COUNT: usize = 14;

/// Shortest session-start header: prefix, hex digits, `CR`, `LF`.
pub const MIN_HEX_START_LEN: usize = HEX_HEADER_PREFIX.len() + HEX_DIGIT_COUNT + 2;

/// Longest session-start header: [`MIN_HEX_START_LEN`] plus a trailing `XON`.
pub const MAX_HEX_START_LEN: usize = MIN_HEX_START_LEN + 1;

/// Cancel sequence sent to the peer to abort a transfer.
///
/// Five `CAN` bytes end the session on the remote side; the backspaces erase
/// the echoed cancels when the peer is a plain terminal.
pub const ABORT_SEQUENCE: [u8; 10] = [CAN, CAN, CAN, CAN, CAN, BS, BS, BS, BS, BS];

/// Byte sent by XMODEM/YMODEM receivers to request CRC mode.
///
/// Seeing it alone right after a ZMODEM detection means the peer fell back to
/// one of those older protocols, which this crate does not speak.
pub const LEGACY_DOWNGRADE_BYTE: u8 = b'C';
