//! Transfer sessions handed off by the sentry.
//!
//! The sentry never speaks ZMODEM beyond the opening header. Once the caller
//! confirms a detection, every byte from the peer goes to a session engine
//! supplied through [`SessionFactory`]. Engines come in two directions and are
//! carried in the tagged [`Session`] enum so the sentry can treat them
//! differently when they finish: only receive-direction engines can hand back
//! bytes that arrived after the transfer ended.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use protocol::{FrameType, Header};

/// Direction of a detected transfer, seen from the local side.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionKind {
    /// The peer opened with `ZRQINIT` (it runs `sz`); we receive files.
    Receive,
    /// The peer opened with `ZRINIT` (it runs `rz`); we send files.
    Send,
}

impl SessionKind {
    /// Maps a session-opening frame type to the local transfer direction.
    ///
    /// Returns `None` for frame types that never start a session.
    #[must_use]
    pub const fn from_frame_type(frame_type: FrameType) -> Option<Self> {
        match frame_type {
            FrameType::RequestInit => Some(Self::Receive),
            FrameType::ReceiverInit => Some(Self::Send),
            _ => None,
        }
    }

    /// Returns the frame type the peer sends to open this kind of session.
    #[must_use]
    pub const fn opening_frame(self) -> FrameType {
        match self {
            Self::Receive => FrameType::RequestInit,
            Self::Send => FrameType::ReceiverInit,
        }
    }

    /// Returns a lowercase label used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Receive => "receive",
            Self::Send => "send",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification raised by a session engine while it consumes peer bytes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionEvent<'a> {
    /// Bytes that are not part of the protocol, such as shell output
    /// interleaved with the transfer. The sentry forwards them to the
    /// terminal.
    Garbage(&'a [u8]),
    /// The session reached its logical end.
    End,
}

/// Outbound channel to the remote peer.
///
/// The handle is shared between the sentry, which uses it for cancel
/// sequences, and the confirmed session engine. Cloning is cheap.
#[derive(Clone)]
pub struct PeerSender {
    inner: Rc<RefCell<dyn FnMut(&[u8])>>,
}

impl PeerSender {
    /// Wraps the closure that writes bytes to the peer.
    pub fn new(send: impl FnMut(&[u8]) + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(send)),
        }
    }

    /// Sends `bytes` to the peer.
    ///
    /// # Panics
    ///
    /// Panics if called from inside the wrapped closure itself.
    pub fn send(&self, bytes: &[u8]) {
        let mut send = self.inner.borrow_mut();
        (&mut *send)(bytes);
    }
}

impl fmt::Debug for PeerSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerSender")
            .field("handles", &Rc::strong_count(&self.inner))
            .finish()
    }
}

/// Behaviour shared by both directions of transfer engine.
pub trait TransferSession {
    /// Supplies the channel the engine uses to talk to the peer. Called once,
    /// when the detection is confirmed.
    fn attach_sender(&mut self, sender: PeerSender);

    /// Consumes bytes received from the peer, reporting garbage and the end of
    /// the session through `events`.
    fn consume(&mut self, input: &[u8], events: &mut dyn FnMut(SessionEvent<'_>));

    /// Reports whether the session has reached its logical end.
    fn has_ended(&self) -> bool;
}

/// A receive-direction engine, which can tell where the transfer ended.
pub trait ReceiveSession: TransferSession {
    /// Returns bytes that followed the end of the transfer and belong to
    /// ordinary terminal traffic. Called once, after the session ends.
    fn take_trailing_bytes(&mut self) -> Vec<u8>;
}

/// Builds engines for detected session starts.
pub trait SessionFactory {
    /// Engine used when the peer sends files to us.
    type Receive: ReceiveSession;
    /// Engine used when we send files to the peer.
    type Send: TransferSession;

    /// Creates an engine for a `ZRQINIT` opening.
    fn receive(&mut self, header: &Header) -> Self::Receive;

    /// Creates an engine for a `ZRINIT` opening. The header carries the
    /// receiver's capabilities and buffer size.
    fn send(&mut self, header: &Header) -> Self::Send;
}

/// The session type produced by factory `F`.
pub type FactorySession<F> =
    Session<<F as SessionFactory>::Receive, <F as SessionFactory>::Send>;

/// A transfer engine tagged with its direction.
#[derive(Debug)]
pub enum Session<R, S> {
    /// We receive files from the peer.
    Receive(R),
    /// We send files to the peer.
    Send(S),
}

impl<R, S> Session<R, S> {
    /// Returns the transfer direction.
    #[must_use]
    pub const fn kind(&self) -> SessionKind {
        match self {
            Self::Receive(_) => SessionKind::Receive,
            Self::Send(_) => SessionKind::Send,
        }
    }

    /// Returns the receive engine, if this is a receive session.
    #[must_use]
    pub const fn as_receive(&self) -> Option<&R> {
        match self {
            Self::Receive(engine) => Some(engine),
            Self::Send(_) => None,
        }
    }

    /// Returns the receive engine mutably, if this is a receive session.
    #[must_use]
    pub fn as_receive_mut(&mut self) -> Option<&mut R> {
        match self {
            Self::Receive(engine) => Some(engine),
            Self::Send(_) => None,
        }
    }

    /// Returns the send engine, if this is a send session.
    #[must_use]
    pub const fn as_send(&self) -> Option<&S> {
        match self {
            Self::Send(engine) => Some(engine),
            Self::Receive(_) => None,
        }
    }

    /// Returns the send engine mutably, if this is a send session.
    #[must_use]
    pub fn as_send_mut(&mut self) -> Option<&mut S> {
        match self {
            Self::Send(engine) => Some(engine),
            Self::Receive(_) => None,
        }
    }
}

impl<R: ReceiveSession, S: TransferSession> Session<R, S> {
    pub(crate) fn build<F>(factory: &mut F, kind: SessionKind, header: &Header) -> Self
    where
        F: SessionFactory<Receive = R, Send = S>,
    {
        match kind {
            SessionKind::Receive => Self::Receive(factory.receive(header)),
            SessionKind::Send => Self::Send(factory.send(header)),
        }
    }

    /// Supplies the outbound channel to the engine.
    pub fn attach_sender(&mut self, sender: PeerSender) {
        match self {
            Self::Receive(engine) => engine.attach_sender(sender),
            Self::Send(engine) => engine.attach_sender(sender),
        }
    }

    /// Feeds peer bytes to the engine.
    pub fn consume(&mut self, input: &[u8], events: &mut dyn FnMut(SessionEvent<'_>)) {
        match self {
            Self::Receive(engine) => engine.consume(input, events),
            Self::Send(engine) => engine.consume(input, events),
        }
    }

    /// Reports whether the engine has reached its logical end.
    #[must_use]
    pub fn has_ended(&self) -> bool {
        match self {
            Self::Receive(engine) => engine.has_ended(),
            Self::Send(engine) => engine.has_ended(),
        }
    }

    /// Bytes to hand back to the terminal once the session has ended.
    ///
    /// A send-direction engine cannot separate post-transfer traffic from its
    /// own byte stream, so whatever followed its end is lost.
    pub(crate) fn take_remainder(&mut self) -> Vec<u8> {
        match self {
            Self::Receive(engine) => engine.take_trailing_bytes(),
            Self::Send(_) => Vec::new(),
        }
    }
}
