//! Structured diagnostics for marker scanning and session hand-off.
//!
//! Every event is emitted under the `zsentry::sentry` target. All functions
//! are compiled behind the `tracing` feature flag and collapse to no-op
//! inline functions when it is disabled, so the sentry can call them
//! unconditionally.

use protocol::{FrameType, HeaderError};

use crate::session::SessionKind;

/// Target name for tracing events.
#[cfg(feature = "tracing")]
pub(crate) const SENTRY_TARGET: &str = "zsentry::sentry";

/// Traces a marker match inside the fragment buffer.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn trace_marker_found(offset: usize, buffered: usize) {
    tracing::trace!(
        target: SENTRY_TARGET,
        offset = offset,
        buffered = buffered,
        "marker found"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn trace_marker_found(_offset: usize, _buffered: usize) {}

/// Traces a marker whose header failed to parse.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn trace_header_rejected(error: &HeaderError) {
    tracing::debug!(
        target: SENTRY_TARGET,
        reason = %error,
        "header rejected"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn trace_header_rejected(_error: &HeaderError) {}

/// Traces a well-formed header that does not open a session.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn trace_non_start_header(frame_type: FrameType) {
    tracing::debug!(
        target: SENTRY_TARGET,
        frame_type = %frame_type,
        "header does not open a session"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn trace_non_start_header(_frame_type: FrameType) {}

/// Traces a session start rejected because bytes followed it in the buffer.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn trace_start_rejected(frame_type: FrameType, leftover: usize) {
    tracing::debug!(
        target: SENTRY_TARGET,
        frame_type = %frame_type,
        leftover = leftover,
        "session start followed by trailing bytes"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn trace_start_rejected(_frame_type: FrameType, _leftover: usize) {}

/// Traces bytes dropped from the front of the fragment buffer.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn trace_buffer_trimmed(dropped: usize) {
    tracing::trace!(
        target: SENTRY_TARGET,
        dropped = dropped,
        "fragment buffer trimmed"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn trace_buffer_trimmed(_dropped: usize) {}

/// Traces a new pending detection.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn trace_detection(kind: SessionKind, ticket: u64) {
    tracing::debug!(
        target: SENTRY_TARGET,
        kind = %kind,
        ticket = ticket,
        "detection issued"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn trace_detection(_kind: SessionKind, _ticket: u64) {}

/// Traces the withdrawal of a pending detection.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn trace_retraction(kind: SessionKind, ticket: u64, superseded: bool) {
    tracing::debug!(
        target: SENTRY_TARGET,
        kind = %kind,
        ticket = ticket,
        superseded = superseded,
        "detection retracted"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn trace_retraction(_kind: SessionKind, _ticket: u64, _superseded: bool) {}

/// Traces the abort sent when the peer falls back to XMODEM/YMODEM.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn trace_legacy_downgrade(ticket: u64) {
    tracing::debug!(
        target: SENTRY_TARGET,
        ticket = ticket,
        "peer requested legacy transfer; aborting"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn trace_legacy_downgrade(_ticket: u64) {}

/// Traces a denied detection.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn trace_deny(kind: SessionKind, ticket: u64, stale: bool) {
    tracing::debug!(
        target: SENTRY_TARGET,
        kind = %kind,
        ticket = ticket,
        stale = stale,
        "detection denied"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn trace_deny(_kind: SessionKind, _ticket: u64, _stale: bool) {}

/// Traces a confirmed detection becoming the active session.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn trace_confirm(kind: SessionKind, ticket: u64) {
    tracing::debug!(
        target: SENTRY_TARGET,
        kind = %kind,
        ticket = ticket,
        "session installed"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn trace_confirm(_kind: SessionKind, _ticket: u64) {}

/// Traces a confirm attempt with a stale detection.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn trace_stale_confirm(kind: SessionKind, ticket: u64) {
    tracing::debug!(
        target: SENTRY_TARGET,
        kind = %kind,
        ticket = ticket,
        "stale detection confirmed"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn trace_stale_confirm(_kind: SessionKind, _ticket: u64) {}

/// Traces the end of the active session.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn trace_session_ended(kind: SessionKind, recovered: usize) {
    tracing::debug!(
        target: SENTRY_TARGET,
        kind = %kind,
        recovered = recovered,
        "session ended"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn trace_session_ended(_kind: SessionKind, _recovered: usize) {}
