//! Subsequence search over raw byte buffers.

use memchr::memmem;

/// Returns the offset of the first occurrence of `needle` in `haystack`.
///
/// An empty needle matches at offset zero.
///
/// # Examples
///
/// ```
/// use protocol::{HEX_SESSION_MARKER, find_subsequence};
///
/// let stream = b"ls -l\r\n**\x18B00000000000000\r\x8a\x11";
/// assert_eq!(find_subsequence(stream, &HEX_SESSION_MARKER), Some(7));
/// assert_eq!(find_subsequence(b"plain text", &HEX_SESSION_MARKER), None);
/// ```
#[must_use]
#[inline]
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    memmem::find(haystack, needle)
}
