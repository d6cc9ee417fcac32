//! Assembly of a [`Sentry`] from its collaborators.
//!
//! A sentry needs four callbacks and a [`SessionFactory`]. All four callbacks
//! are mandatory; [`SentryBuilder::build`] refuses to produce a half-wired
//! sentry and names the first one that is missing.

use std::fmt;

use crate::detection::Detection;
use crate::error::ConfigError;
use crate::sentry::Sentry;
use crate::session::{PeerSender, SessionFactory};

/// Sink for bytes that belong on the local terminal.
pub type TerminalSink = Box<dyn FnMut(&[u8])>;

/// Callback receiving each new [`Detection`].
pub type DetectHandler = Box<dyn FnMut(Detection)>;

/// Callback fired when a pending detection is withdrawn.
pub type RetractHandler = Box<dyn FnMut()>;

/// The collaborators a [`Sentry`] is built from, in the order they are
/// validated.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Collaborator {
    /// Terminal output sink.
    ToTerminal,
    /// Detection callback.
    OnDetect,
    /// Retraction callback.
    OnRetract,
    /// Outbound channel to the peer.
    Sender,
}

impl Collaborator {
    /// Every collaborator, in validation order.
    pub const ALL: [Collaborator; 4] = [
        Collaborator::ToTerminal,
        Collaborator::OnDetect,
        Collaborator::OnRetract,
        Collaborator::Sender,
    ];

    /// Returns the builder method name for this collaborator.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Collaborator::ToTerminal => "to_terminal",
            Collaborator::OnDetect => "on_detect",
            Collaborator::OnRetract => "on_retract",
            Collaborator::Sender => "sender",
        }
    }
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Builder used to assemble a [`Sentry`].
///
/// # Examples
///
/// A builder missing a collaborator reports which one:
///
/// ```
/// use zsentry::{Collaborator, ConfigError, Sentry};
/// # use zsentry::{PeerSender, ReceiveSession, SessionEvent, SessionFactory, TransferSession};
/// # use protocol::Header;
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
/// let err = Sentry::builder(Factory)
///     .to_terminal(|_| {})
///     .on_detect(|_| {})
///     .sender(|_| {})
///     .build()
///     .unwrap_err();
/// assert_eq!(err, ConfigError::MissingCollaborator(Collaborator::OnRetract));
/// ```
pub struct SentryBuilder<F> {
    factory: F,
    to_terminal: Option<TerminalSink>,
    on_detect: Option<DetectHandler>,
    on_retract: Option<RetractHandler>,
    sender: Option<PeerSender>,
}

impl<F: SessionFactory> SentryBuilder<F> {
    pub(crate) fn new(factory: F) -> Self {
        Self {
            factory,
            to_terminal: None,
            on_detect: None,
            on_retract: None,
            sender: None,
        }
    }

    /// Sets the sink for bytes that belong on the local terminal.
    #[must_use]
    pub fn to_terminal(mut self, sink: impl FnMut(&[u8]) + 'static) -> Self {
        self.to_terminal = Some(Box::new(sink));
        self
    }

    /// Sets the callback that receives each new [`Detection`].
    ///
    /// The callback runs inside [`Sentry::consume`]; confirm or deny the
    /// detection after `consume` returns.
    #[must_use]
    pub fn on_detect(mut self, handler: impl FnMut(Detection) + 'static) -> Self {
        self.on_detect = Some(Box::new(handler));
        self
    }

    /// Sets the callback fired when a pending detection is withdrawn.
    #[must_use]
    pub fn on_retract(mut self, handler: impl FnMut() + 'static) -> Self {
        self.on_retract = Some(Box::new(handler));
        self
    }

    /// Sets the closure that writes bytes to the remote peer.
    #[must_use]
    pub fn sender(self, send: impl FnMut(&[u8]) + 'static) -> Self {
        self.peer_sender(PeerSender::new(send))
    }

    /// Uses an existing [`PeerSender`] handle as the outbound channel.
    #[must_use]
    pub fn peer_sender(mut self, sender: PeerSender) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Validates the collaborators and builds the sentry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCollaborator`] naming the first absent
    /// collaborator in [`Collaborator::ALL`] order.
    pub fn build(self) -> Result<Sentry<F>, ConfigError> {
        let missing = ConfigError::MissingCollaborator;
        let to_terminal = self.to_terminal.ok_or(missing(Collaborator::ToTerminal))?;
        let on_detect = self.on_detect.ok_or(missing(Collaborator::OnDetect))?;
        let on_retract = self.on_retract.ok_or(missing(Collaborator::OnRetract))?;
        let sender = self.sender.ok_or(missing(Collaborator::Sender))?;

        Ok(Sentry::from_parts(
            self.factory,
            to_terminal,
            on_detect,
            on_retract,
            sender,
        ))
    }
}

impl<F> fmt::Debug for SentryBuilder<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentryBuilder")
            .field("to_terminal", &self.to_terminal.is_some())
            .field("on_detect", &self.on_detect.is_some())
            .field("on_retract", &self.on_retract.is_some())
            .field("sender", &self.sender.is_some())
            .finish_non_exhaustive()
    }
}
