#![deny(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_docs)]

//! Detects ZMODEM session starts inside a terminal byte stream.
//!
//! A terminal that wants to offer `rz`/`sz` file transfers has to notice when
//! the remote side starts one. `zsentry` watches the bytes coming from the
//! peer, forwards them to the terminal as usual, and reports a [`Detection`]
//! when it sees a complete `ZRQINIT` (the peer runs `sz`) or `ZRINIT` (the
//! peer runs `rz`) hex header with nothing after it.
//!
//! The five opening bytes of those headers can also appear in ordinary
//! output, for example when a file containing them is printed, so the crate
//! never hijacks the stream itself. The caller confirms a detection to hand
//! the stream to a transfer engine, or denies it to send the peer the cancel
//! sequence. Bytes that arrive before either decision and do not start a new
//! session retract the detection.
//!
//! # Overview
//!
//! - [`Sentry`] owns the rolling match buffer and the pending and active
//!   session slots. Feed it with [`Sentry::consume`].
//! - [`SentryBuilder`] wires the four collaborators: the terminal sink, the
//!   detection and retraction callbacks, and the outbound channel to the peer.
//! - [`SessionFactory`], [`TransferSession`] and [`ReceiveSession`] are the
//!   seams for the transfer engine, which lives outside this crate.
//! - [`Detection`] is the token handed to the caller; [`StaleDetection`] is
//!   returned when it is used after it went stale.
//!
//! # Features
//!
//! - `tracing`: emit structured diagnostics under the `zsentry::sentry`
//!   target.
//! - `serde`: serialize [`SessionKind`] and the `protocol` frame types.
//!
//! # Examples
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use protocol::{ABORT_SEQUENCE, FrameType, Header};
//! use zsentry::Sentry;
//! # use zsentry::{PeerSender, ReceiveSession, SessionEvent, SessionFactory, TransferSession};
//! # struct Inert;
//! # impl TransferSession for Inert {
//! #     fn attach_sender(&mut self, _: PeerSender) {}
//! #     fn consume(&mut self, _: &[u8], _: &mut dyn FnMut(SessionEvent<'_>)) {}
//! #     fn has_ended(&self) -> bool { false }
//! # }
//! # impl ReceiveSession for Inert {
//! #     fn take_trailing_bytes(&mut self) -> Vec<u8> { Vec::new() }
//! # }
//! # struct Factory;
//! # impl SessionFactory for Factory {
//! #     type Receive = Inert;
//! #     type Send = Inert;
//! #     fn receive(&mut self, _: &Header) -> Inert { Inert }
//! #     fn send(&mut self, _: &Header) -> Inert { Inert }
//! # }
//!
//! let detected = Rc::new(RefCell::new(None));
//! let outbound = Rc::new(RefCell::new(Vec::new()));
//!
//! let mut sentry = Sentry::builder(Factory)
//!     .to_terminal(|_| {})
//!     .on_detect({
//!         let detected = Rc::clone(&detected);
//!         move |detection| *detected.borrow_mut() = Some(detection)
//!     })
//!     .on_retract(|| {})
//!     .sender({
//!         let outbound = Rc::clone(&outbound);
//!         move |bytes: &[u8]| outbound.borrow_mut().extend_from_slice(bytes)
//!     })
//!     .build()?;
//!
//! // The peer ran `rz`.
//! sentry.consume(&Header::new(FrameType::ReceiverInit, [0; 4]).to_hex());
//!
//! // Not now: tell it to give up.
//! let detection = detected.borrow_mut().take().expect("detected");
//! detection.deny(&sentry);
//! assert_eq!(*outbound.borrow(), ABORT_SEQUENCE);
//! # Ok::<(), zsentry::ConfigError>(())
//! ```

mod config;
mod detection;
mod error;
mod scanner;
mod sentry;
mod session;
mod trace;

pub use config::{Collaborator, DetectHandler, RetractHandler, SentryBuilder, TerminalSink};
pub use detection::Detection;
pub use error::{ConfigError, StaleDetection};
pub use sentry::{Sentry, SentryState};
pub use session::{
    FactorySession, PeerSender, ReceiveSession, Session, SessionEvent, SessionFactory,
    SessionKind, TransferSession,
};
