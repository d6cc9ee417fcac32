use crate::error::StaleDetection;
use crate::sentry::Sentry;
use crate::session::{FactorySession, SessionFactory, SessionKind};

/// A session start found in the stream, awaiting the caller's decision.
///
/// The sentry hands one of these to its `on_detect` callback. The token is a
/// plain value: it stays usable after the callback returns and can be copied
/// freely, but only the sentry's current pending detection is
/// [valid](Self::is_valid). Once bytes retract it, a newer detection replaces
/// it, or it is confirmed, it is stale for good.
///
/// Confirming hands the stream over to a transfer engine. Denying tells the
/// peer to stand down by sending the ZMODEM cancel sequence.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Detection {
    sentry_id: u64,
    ticket: u64,
    kind: SessionKind,
}

impl Detection {
    pub(crate) const fn new(sentry_id: u64, ticket: u64, kind: SessionKind) -> Self {
        Self {
            sentry_id,
            ticket,
            kind,
        }
    }

    /// Direction of the detected transfer.
    #[must_use]
    pub const fn kind(&self) -> SessionKind {
        self.kind
    }

    /// Sequence number of this detection within its sentry.
    #[must_use]
    pub const fn ticket(&self) -> u64 {
        self.ticket
    }

    pub(crate) const fn sentry_id(&self) -> u64 {
        self.sentry_id
    }

    /// Reports whether this is still `sentry`'s pending detection.
    #[must_use]
    pub fn is_valid<F: SessionFactory>(&self, sentry: &Sentry<F>) -> bool {
        sentry.is_detection_valid(self)
    }

    /// Starts the detected session. Shorthand for [`Sentry::confirm`].
    ///
    /// # Errors
    ///
    /// Returns [`StaleDetection`] when this is no longer the pending
    /// detection; the sentry is left untouched.
    pub fn confirm<'s, F: SessionFactory>(
        &self,
        sentry: &'s mut Sentry<F>,
    ) -> Result<&'s mut FactorySession<F>, StaleDetection> {
        sentry.confirm(self)
    }

    /// Rejects the detected session. Shorthand for [`Sentry::deny`].
    pub fn deny<F: SessionFactory>(&self, sentry: &Sentry<F>) {
        sentry.deny(self);
    }
}
