//! The stream sentinel.
//!
//! [`Sentry`] sits between a remote peer and the local terminal. Every byte
//! from the peer goes through [`Sentry::consume`], which either forwards it to
//! the terminal, hands it to the active transfer session, or both while a
//! session start is being negotiated.
//!
//! # Negotiation
//!
//! A session start is only a guess: the five marker bytes can turn up in
//! ordinary output. The sentry therefore never takes over the stream on its
//! own. It reports a [`Detection`] and keeps the parsed session pending until
//! the caller confirms or denies it. Any further bytes that are not a new
//! session start prove the guess wrong and retract the detection.
//!
//! ```text
//!            marker + header           confirm
//! NoSession ----------------> pending -----------> SessionActive
//!     ^                          |                      |
//!     +------- other bytes ------+                      |
//!     +------------------ session ended ----------------+
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use protocol::{ABORT_SEQUENCE, LEGACY_DOWNGRADE_BYTE};

use crate::config::{DetectHandler, RetractHandler, SentryBuilder, TerminalSink};
use crate::detection::Detection;
use crate::error::StaleDetection;
use crate::scanner::FragmentBuffer;
use crate::session::{FactorySession, PeerSender, Session, SessionEvent, SessionFactory};
use crate::trace::{
    trace_confirm, trace_deny, trace_detection, trace_legacy_downgrade, trace_retraction,
    trace_session_ended, trace_stale_confirm,
};

/// Identity source for sentries, so a [`Detection`] never validates against
/// an instance other than the one that issued it.
static NEXT_SENTRY_ID: AtomicU64 = AtomicU64::new(1);

/// Whether a transfer session currently owns the stream.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SentryState {
    /// Bytes are scanned for session starts and forwarded to the terminal.
    NoSession,
    /// Bytes are routed to the confirmed transfer session.
    SessionActive,
}

/// A parsed session start awaiting confirmation.
struct Pending<F: SessionFactory> {
    ticket: u64,
    session: FactorySession<F>,
}

/// Watches a terminal byte stream for ZMODEM session starts.
///
/// Build one with [`Sentry::builder`]. A sentry is single-threaded and owns
/// at most one pending detection and one active session at a time.
///
/// # Examples
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use protocol::{FrameType, Header};
/// use zsentry::{Sentry, SessionKind};
/// # use zsentry::{PeerSender, ReceiveSession, SessionEvent, SessionFactory, TransferSession};
/// # #[derive(Debug)]
/// # struct Inert;
/// # impl TransferSession for Inert {
/// #     fn attach_sender(&mut self, _: PeerSender) {}
/// #     fn consume(&mut self, _: &[u8], _: &mut dyn FnMut(SessionEvent<'_>)) {}
/// #     fn has_ended(&self) -> bool { false }
/// # }
/// # impl ReceiveSession for Inert {
/// #     fn take_trailing_bytes(&mut self) -> Vec<u8> { Vec::new() }
/// # }
/// # struct Factory;
/// # impl SessionFactory for Factory {
/// #     type Receive = Inert;
/// #     type Send = Inert;
/// #     fn receive(&mut self, _: &Header) -> Inert { Inert }
/// #     fn send(&mut self, _: &Header) -> Inert { Inert }
/// # }
///
/// let detections = Rc::new(RefCell::new(Vec::new()));
/// let seen = Rc::clone(&detections);
///
/// let mut sentry = Sentry::builder(Factory)
///     .to_terminal(|bytes| print!("{}", String::from_utf8_lossy(bytes)))
///     .on_detect(move |detection| seen.borrow_mut().push(detection))
///     .on_retract(|| {})
///     .sender(|_bytes| {})
///     .build()?;
///
/// sentry.consume(&Header::new(FrameType::RequestInit, [0; 4]).to_hex());
///
/// let detection = detections.borrow_mut().pop().expect("detected");
/// assert_eq!(detection.kind(), SessionKind::Receive);
/// detection.confirm(&mut sentry)?;
/// assert!(sentry.is_session_active());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Sentry<F: SessionFactory> {
    id: u64,
    factory: F,
    buffer: FragmentBuffer,
    pending: Option<Pending<F>>,
    active: Option<FactorySession<F>>,
    next_ticket: u64,
    to_terminal: TerminalSink,
    on_detect: DetectHandler,
    on_retract: RetractHandler,
    sender: PeerSender,
}

impl<F: SessionFactory> Sentry<F> {
    /// Starts assembling a sentry that builds transfer engines with
    /// `factory`.
    pub fn builder(factory: F) -> SentryBuilder<F> {
        SentryBuilder::new(factory)
    }

    pub(crate) fn from_parts(
        factory: F,
        to_terminal: TerminalSink,
        on_detect: DetectHandler,
        on_retract: RetractHandler,
        sender: PeerSender,
    ) -> Self {
        Self {
            id: NEXT_SENTRY_ID.fetch_add(1, Ordering::Relaxed),
            factory,
            buffer: FragmentBuffer::new(),
            pending: None,
            active: None,
            next_ticket: 1,
            to_terminal,
            on_detect,
            on_retract,
            sender,
        }
    }

    /// Processes the next fragment of bytes received from the peer.
    ///
    /// Fragments may be of any size; a header split across calls is still
    /// recognised. Any fragment that does not start a session retracts the
    /// pending detection, an empty one included. Callbacks run before this
    /// returns.
    pub fn consume(&mut self, input: &[u8]) {
        if let Some(mut remainder) = self.retire_finished_session() {
            remainder.extend_from_slice(input);
            self.consume_unattended(&remainder);
            return;
        }

        if self.active.is_none() {
            self.consume_unattended(input);
            return;
        }

        if let Some(remainder) = self.feed_active_session(input) {
            self.consume_unattended(&remainder);
        }
    }

    /// Confirms `detection`, making its session the active one.
    ///
    /// The session receives the sentry's [`PeerSender`] and from now on every
    /// byte passed to [`consume`](Self::consume) until it ends.
    ///
    /// # Errors
    ///
    /// Returns [`StaleDetection`] when `detection` is not the pending
    /// detection of this sentry. Nothing is changed in that case.
    pub fn confirm(
        &mut self,
        detection: &Detection,
    ) -> Result<&mut FactorySession<F>, StaleDetection> {
        let stale = StaleDetection::new(detection.kind(), detection.ticket());
        if !self.is_detection_valid(detection) {
            trace_stale_confirm(detection.kind(), detection.ticket());
            return Err(stale);
        }
        let Pending { ticket, mut session } = self.pending.take().ok_or(stale)?;

        session.attach_sender(self.sender.clone());
        trace_confirm(session.kind(), ticket);
        Ok(self.active.insert(session))
    }

    /// Tells the peer to abandon the transfer by sending the cancel
    /// sequence.
    ///
    /// Always sends, even for a stale `detection`, and leaves the sentry's
    /// state alone: a pending detection stays pending until later bytes
    /// retract it.
    pub fn deny(&self, detection: &Detection) {
        trace_deny(
            detection.kind(),
            detection.ticket(),
            !self.is_detection_valid(detection),
        );
        self.sender.send(&ABORT_SEQUENCE);
    }

    /// Reports whether `detection` is this sentry's pending detection.
    #[must_use]
    pub fn is_detection_valid(&self, detection: &Detection) -> bool {
        detection.sentry_id() == self.id
            && self
                .pending
                .as_ref()
                .is_some_and(|pending| pending.ticket == detection.ticket())
    }

    /// Current routing state.
    #[must_use]
    pub fn state(&self) -> SentryState {
        if self.active.is_some() {
            SentryState::SessionActive
        } else {
            SentryState::NoSession
        }
    }

    /// Reports whether a confirmed session owns the stream.
    #[must_use]
    pub fn is_session_active(&self) -> bool {
        self.active.is_some()
    }

    /// Reports whether a detection is waiting for confirm or deny.
    #[must_use]
    pub fn has_pending_detection(&self) -> bool {
        self.pending.is_some()
    }

    /// The active session, if any.
    #[must_use]
    pub fn session(&self) -> Option<&FactorySession<F>> {
        self.active.as_ref()
    }

    /// The active session, mutably.
    #[must_use]
    pub fn session_mut(&mut self) -> Option<&mut FactorySession<F>> {
        self.active.as_mut()
    }

    /// Bytes held back while looking for a marker split across fragments.
    #[must_use]
    pub fn buffered(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// The outbound channel shared with confirmed sessions.
    #[must_use]
    pub fn sender(&self) -> &PeerSender {
        &self.sender
    }

    /// Drops an active session that ended between calls, for example because
    /// the caller drove it to completion directly. Returns its trailing bytes
    /// when it had any.
    fn retire_finished_session(&mut self) -> Option<Vec<u8>> {
        let mut session = self.active.take_if(|session| session.has_ended())?;
        let remainder = session.take_remainder();
        trace_session_ended(session.kind(), remainder.len());
        (!remainder.is_empty()).then_some(remainder)
    }

    /// Routes `input` to the active session. Returns the bytes to scan
    /// afterwards once the session has ended.
    fn feed_active_session(&mut self, input: &[u8]) -> Option<Vec<u8>> {
        let ended = {
            let session = self.active.as_mut()?;
            let to_terminal = &mut *self.to_terminal;
            let mut end_seen = false;
            session.consume(input, &mut |event: SessionEvent<'_>| match event {
                SessionEvent::Garbage(bytes) if !bytes.is_empty() => to_terminal(bytes),
                SessionEvent::Garbage(_) => {}
                SessionEvent::End => end_seen = true,
            });
            end_seen || session.has_ended()
        };
        if !ended {
            return None;
        }

        let mut session = self.active.take()?;
        let remainder = session.take_remainder();
        trace_session_ended(session.kind(), remainder.len());
        Some(remainder)
    }

    /// Scans `input` while no session owns the stream and settles the
    /// pending detection.
    fn consume_unattended(&mut self, input: &[u8]) {
        let found = if input.is_empty() {
            None
        } else {
            self.buffer.scan(input)
        };
        let previous = self.pending.take();
        let mut forward = !input.is_empty();

        match (found, previous) {
            (Some(start), previous) => {
                if let Some(previous) = previous {
                    let superseded = previous.session.kind();
                    trace_retraction(superseded, previous.ticket, true);
                    (self.on_retract)();
                    forward = superseded != start.kind;
                }

                let session = Session::build(&mut self.factory, start.kind, &start.header);
                let ticket = self.issue_ticket();
                self.pending = Some(Pending { ticket, session });
                trace_detection(start.kind, ticket);
                (self.on_detect)(Detection::new(self.id, ticket, start.kind));
            }
            (None, Some(previous)) => {
                if input == [LEGACY_DOWNGRADE_BYTE] {
                    trace_legacy_downgrade(previous.ticket);
                    self.sender.send(&ABORT_SEQUENCE);
                }
                trace_retraction(previous.session.kind(), previous.ticket, false);
                (self.on_retract)();
            }
            (None, None) => {}
        }

        if forward {
            (self.to_terminal)(input);
        }
    }

    fn issue_ticket(&mut self) -> u64 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        ticket
    }
}

impl<F: SessionFactory> fmt::Debug for Sentry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sentry")
            .field("id", &self.id)
            .field("state", &self.state())
            .field(
                "pending_ticket",
                &self.pending.as_ref().map(|pending| pending.ticket),
            )
            .field("buffered", &self.buffer.as_slice().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
