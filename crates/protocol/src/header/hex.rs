//! Hex digit helpers for the ZMODEM hex header body.

const LOWER_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Decodes one hex digit. Both cases are accepted on input.
#[inline]
pub(super) const fn digit_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Appends the two lowercase hex digits of `byte` to `out`.
#[inline]
pub(super) fn push_byte(out: &mut Vec<u8>, byte: u8) {
    out.push(LOWER_DIGITS[usize::from(byte >> 4)]);
    out.push(LOWER_DIGITS[usize::from(byte & 0x0f)]);
}
