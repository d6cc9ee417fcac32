use thiserror::Error;

use crate::config::Collaborator;
use crate::session::SessionKind;

/// Returned by [`Sentry::confirm`](crate::Sentry::confirm) when a
/// [`Detection`](crate::Detection) is no longer the sentry's pending one.
///
/// Confirming a stale detection changes nothing; denying one is always
/// allowed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("{kind} detection #{ticket} is no longer pending")]
pub struct StaleDetection {
    kind: SessionKind,
    ticket: u64,
}

impl StaleDetection {
    pub(crate) const fn new(kind: SessionKind, ticket: u64) -> Self {
        Self { kind, ticket }
    }

    /// Direction of the stale detection.
    #[must_use]
    pub const fn kind(self) -> SessionKind {
        self.kind
    }

    /// Ticket number of the stale detection.
    #[must_use]
    pub const fn ticket(self) -> u64 {
        self.ticket
    }
}

/// Failures raised while assembling a [`Sentry`](crate::Sentry).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum ConfigError {
    /// A mandatory collaborator was not supplied to the builder.
    #[error("sentry is missing its `{0}` collaborator")]
    MissingCollaborator(Collaborator),
}
