#![deny(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_docs)]

//! ZMODEM wire vocabulary for the `zsentry` workspace.
//!
//! The crate holds the byte-level pieces needed to recognise the start of a
//! ZMODEM session inside a terminal stream: control-byte constants, the
//! cancel sequence, the CRC-16 used by hex headers, the frame-type table, and
//! an incremental hex header parser and encoder. It deliberately stops short
//! of a transfer engine; data subpackets and file I/O belong to whichever
//! engine the caller plugs into `zsentry`.
//!
//! # Examples
//!
//! Tell the two session-start flavors apart. `sz` opens with `ZRQINIT`, `rz`
//! with `ZRINIT`; both share the same five opening bytes.
//!
//! ```
//! use protocol::{FrameType, HEX_SESSION_MARKER, Header, HexParse};
//!
//! let zrinit = Header::new(FrameType::ReceiverInit, [0, 0, 0, 0x23]).to_hex();
//! assert!(zrinit.starts_with(&HEX_SESSION_MARKER));
//!
//! match Header::parse_hex(&zrinit) {
//!     Ok(HexParse::Parsed { header, .. }) => {
//!         assert_eq!(header.frame_type(), FrameType::ReceiverInit);
//!     }
//!     other => panic!("unexpected parse result: {other:?}"),
//! }
//! ```

mod constants;
mod crc;
mod header;
mod search;

pub use constants::{
    ABORT_SEQUENCE, BS, CAN, CR, HEX_DIGIT_COUNT, HEX_HEADER_PREFIX, HEX_SESSION_MARKER,
    LEGACY_DOWNGRADE_BYTE, LF, MAX_HEX_START_LEN, MIN_HEX_START_LEN, XOFF, XON, ZDLE, ZHEX, ZPAD,
};
pub use crc::crc16;
pub use header::{
    FrameType, Header, HeaderError, HexParse, ParseFrameTypeError, ReceiverCapabilities,
};
pub use search::find_subsequence;
