//! Rolling match buffer for the session marker.
//!
//! Terminal traffic arrives in arbitrary fragments, so a hex header may be
//! split across any number of [`FragmentBuffer::scan`] calls. The buffer keeps
//! just enough undigested bytes to complete a marker that straddles a
//! fragment boundary and drops the rest. Callers have already forwarded every
//! byte to the terminal, so dropping never loses output.

use protocol::{HEX_SESSION_MARKER, Header, HexParse, MAX_HEX_START_LEN, XON, find_subsequence};

use crate::session::SessionKind;
use crate::trace::{
    trace_buffer_trimmed, trace_header_rejected, trace_marker_found, trace_non_start_header,
    trace_start_rejected,
};

/// Bytes kept once a scan finds no usable marker.
///
/// One byte short of the longest session start, so a start can never sit
/// complete in the retained window without having been recognised.
pub(crate) const RETAINED_WINDOW: usize = MAX_HEX_START_LEN - 1;

/// A recognised session start.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct ParsedStart {
    pub(crate) kind: SessionKind,
    pub(crate) header: Header,
}

/// Undigested bytes carried between scans.
#[derive(Debug)]
pub(crate) struct FragmentBuffer {
    bytes: Vec<u8>,
}

impl FragmentBuffer {
    pub(crate) fn new() -> Self {
        Self {
            bytes: Vec::with_capacity(MAX_HEX_START_LEN),
        }
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Appends `input` and looks for a complete session start.
    ///
    /// A start is only accepted when nothing but an optional `XON` follows
    /// the header; a start with trailing bytes is ordinary output that
    /// happens to contain a header, and the leftover stays buffered.
    pub(crate) fn scan(&mut self, input: &[u8]) -> Option<ParsedStart> {
        self.bytes.extend_from_slice(input);

        while let Some(offset) = find_subsequence(&self.bytes, &HEX_SESSION_MARKER) {
            trace_marker_found(offset, self.bytes.len());
            self.bytes.drain(..offset);

            match Header::parse_hex(&self.bytes) {
                Ok(HexParse::NeedMoreData) => break,
                Ok(HexParse::Parsed { header, consumed }) => {
                    let Some(kind) = SessionKind::from_frame_type(header.frame_type()) else {
                        trace_non_start_header(header.frame_type());
                        self.bytes.drain(..1);
                        continue;
                    };

                    self.bytes.drain(..consumed);
                    if self.bytes.first() == Some(&XON) {
                        self.bytes.drain(..1);
                    }
                    if self.bytes.is_empty() {
                        return Some(ParsedStart { kind, header });
                    }
                    trace_start_rejected(header.frame_type(), self.bytes.len());
                    return None;
                }
                Err(error) => {
                    trace_header_rejected(&error);
                    self.bytes.drain(..1);
                }
            }
        }

        self.trim();
        None
    }

    fn trim(&mut self) {
        let excess = self.bytes.len().saturating_sub(RETAINED_WINDOW);
        if excess > 0 {
            self.bytes.drain(..excess);
            trace_buffer_trimmed(excess);
        }
    }
}
