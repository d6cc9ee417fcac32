//! Shared test utilities for the zsentry workspace.
//!
//! [`Recorder`] supplies all four sentry collaborators and keeps a single
//! timeline of what they observed, so tests can assert on both content and
//! ordering. [`ScriptedFactory`] builds [`ScriptedEngine`] transfer sessions
//! whose behaviour is driven entirely by the bytes they are fed.

use std::cell::RefCell;
use std::rc::Rc;

use protocol::{FrameType, Header, ReceiverCapabilities, XON, find_subsequence};
use zsentry::{
    Detection, PeerSender, ReceiveSession, Sentry, SentryBuilder, SessionEvent, SessionFactory,
    TransferSession,
};

// ============================================================================
// Recording collaborators
// ============================================================================

/// One callback invocation seen by a [`Recorder`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Observed {
    /// Bytes passed to the terminal sink.
    Terminal(Vec<u8>),
    /// A detection handed to `on_detect`.
    Detect(Detection),
    /// An `on_retract` call.
    Retract,
    /// Bytes written to the peer.
    Sent(Vec<u8>),
}

/// Records every collaborator call in arrival order.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    timeline: Rc<RefCell<Vec<Observed>>>,
}

impl Recorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs recording collaborators on `builder`.
    #[must_use]
    pub fn attach<F: SessionFactory>(&self, builder: SentryBuilder<F>) -> SentryBuilder<F> {
        let terminal = Rc::clone(&self.timeline);
        let detect = Rc::clone(&self.timeline);
        let retract = Rc::clone(&self.timeline);
        let sent = Rc::clone(&self.timeline);

        builder
            .to_terminal(move |bytes: &[u8]| {
                terminal.borrow_mut().push(Observed::Terminal(bytes.to_vec()));
            })
            .on_detect(move |detection| detect.borrow_mut().push(Observed::Detect(detection)))
            .on_retract(move || retract.borrow_mut().push(Observed::Retract))
            .sender(move |bytes: &[u8]| sent.borrow_mut().push(Observed::Sent(bytes.to_vec())))
    }

    /// Builds a sentry whose collaborators all report to this recorder.
    ///
    /// # Panics
    ///
    /// Never in practice; every collaborator is supplied.
    #[must_use]
    pub fn sentry<F: SessionFactory>(&self, factory: F) -> Sentry<F> {
        self.attach(Sentry::builder(factory))
            .build()
            .expect("recorder supplies every collaborator")
    }

    /// Every observation so far.
    #[must_use]
    pub fn timeline(&self) -> Vec<Observed> {
        self.timeline.borrow().clone()
    }

    /// Forgets everything observed so far.
    pub fn clear(&self) {
        self.timeline.borrow_mut().clear();
    }

    /// All terminal output, concatenated.
    #[must_use]
    pub fn terminal_bytes(&self) -> Vec<u8> {
        self.terminal_calls().concat()
    }

    /// Terminal output, one entry per sink call.
    #[must_use]
    pub fn terminal_calls(&self) -> Vec<Vec<u8>> {
        self.timeline
            .borrow()
            .iter()
            .filter_map(|observed| match observed {
                Observed::Terminal(bytes) => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    /// Detections in the order they were issued.
    #[must_use]
    pub fn detections(&self) -> Vec<Detection> {
        self.timeline
            .borrow()
            .iter()
            .filter_map(|observed| match observed {
                Observed::Detect(detection) => Some(*detection),
                _ => None,
            })
            .collect()
    }

    /// The most recent detection.
    #[must_use]
    pub fn last_detection(&self) -> Option<Detection> {
        self.detections().last().copied()
    }

    /// Number of retractions.
    #[must_use]
    pub fn retract_count(&self) -> usize {
        self.timeline
            .borrow()
            .iter()
            .filter(|observed| matches!(observed, Observed::Retract))
            .count()
    }

    /// Everything written to the peer, concatenated.
    #[must_use]
    pub fn sent(&self) -> Vec<u8> {
        self.timeline
            .borrow()
            .iter()
            .filter_map(|observed| match observed {
                Observed::Sent(bytes) => Some(bytes.as_slice()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .concat()
    }

    /// Labels of the callback sequence, for ordering assertions.
    #[must_use]
    pub fn callback_order(&self) -> Vec<&'static str> {
        self.timeline
            .borrow()
            .iter()
            .map(|observed| match observed {
                Observed::Terminal(_) => "terminal",
                Observed::Detect(_) => "detect",
                Observed::Retract => "retract",
                Observed::Sent(_) => "sent",
            })
            .collect()
    }
}

// ============================================================================
// Scripted transfer engines
// ============================================================================

/// Bytes that end a scripted session, like the `OO` a ZMODEM sender writes
/// after the final `ZFIN`.
pub const END_MARKER: &[u8] = b"OO";

/// A fragment starting with this byte is reported as garbage.
pub const NOISE_BYTE: u8 = b'~';

/// A transfer engine driven by the bytes it is fed.
///
/// Fragments starting with [`NOISE_BYTE`] are reported as
/// [`SessionEvent::Garbage`]. Everything else is consumed until
/// [`END_MARKER`] arrives, which ends the session; bytes after the marker are
/// kept as trailing bytes.
#[derive(Debug)]
pub struct ScriptedEngine {
    header: Header,
    consumed: Vec<u8>,
    trailing: Vec<u8>,
    ended: bool,
    sender: Option<PeerSender>,
}

impl ScriptedEngine {
    fn new(header: Header) -> Self {
        Self {
            header,
            consumed: Vec::new(),
            trailing: Vec::new(),
            ended: false,
            sender: None,
        }
    }

    /// The header the engine was built from.
    #[must_use]
    pub fn header(&self) -> Header {
        self.header
    }

    /// Protocol bytes consumed so far.
    #[must_use]
    pub fn consumed(&self) -> &[u8] {
        &self.consumed
    }

    /// The channel attached on confirm.
    #[must_use]
    pub fn sender(&self) -> Option<&PeerSender> {
        self.sender.as_ref()
    }

    /// Ends the session without any input, as a caller-side cancel would.
    pub fn finish(&mut self) {
        self.ended = true;
    }

    /// Ends the transfer as if `trailing` had followed its end marker.
    pub fn finish_with_trailing(&mut self, trailing: &[u8]) {
        self.trailing.extend_from_slice(trailing);
        self.ended = true;
    }
}

impl TransferSession for ScriptedEngine {
    fn attach_sender(&mut self, sender: PeerSender) {
        self.sender = Some(sender);
    }

    fn consume(&mut self, input: &[u8], events: &mut dyn FnMut(SessionEvent<'_>)) {
        if self.ended {
            self.trailing.extend_from_slice(input);
            return;
        }
        if input.first() == Some(&NOISE_BYTE) {
            events(SessionEvent::Garbage(input));
            return;
        }
        match find_subsequence(input, END_MARKER) {
            Some(at) => {
                let end = at + END_MARKER.len();
                self.consumed.extend_from_slice(&input[..end]);
                self.trailing.extend_from_slice(&input[end..]);
                self.ended = true;
                events(SessionEvent::End);
            }
            None => self.consumed.extend_from_slice(input),
        }
    }

    fn has_ended(&self) -> bool {
        self.ended
    }
}

impl ReceiveSession for ScriptedEngine {
    fn take_trailing_bytes(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.trailing)
    }
}

/// Builds [`ScriptedEngine`]s for both directions and remembers the headers
/// it was asked to build from.
#[derive(Clone, Debug, Default)]
pub struct ScriptedFactory {
    built: Rc<RefCell<Vec<Header>>>,
}

impl ScriptedFactory {
    /// Creates a factory with an empty build log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Headers of every engine built so far.
    #[must_use]
    pub fn built(&self) -> Vec<Header> {
        self.built.borrow().clone()
    }
}

impl SessionFactory for ScriptedFactory {
    type Receive = ScriptedEngine;
    type Send = ScriptedEngine;

    fn receive(&mut self, header: &Header) -> ScriptedEngine {
        self.built.borrow_mut().push(*header);
        ScriptedEngine::new(*header)
    }

    fn send(&mut self, header: &Header) -> ScriptedEngine {
        self.built.borrow_mut().push(*header);
        ScriptedEngine::new(*header)
    }
}

// ============================================================================
// Wire fixtures
// ============================================================================

/// The `ZRQINIT` header `sz` opens with, including the trailing `XON`.
#[must_use]
pub fn zrqinit() -> Vec<u8> {
    Header::new(FrameType::RequestInit, [0; 4]).to_hex()
}

/// The `ZRINIT` header `rz` opens with, advertising full duplex, overlapped
/// I/O and 32-bit CRCs.
#[must_use]
pub fn zrinit() -> Vec<u8> {
    let flags = ReceiverCapabilities::FULL_DUPLEX
        | ReceiverCapabilities::OVERLAP_IO
        | ReceiverCapabilities::CRC32;
    Header::new(FrameType::ReceiverInit, [0, 0, 0, flags.bits()]).to_hex()
}

/// `header` without its trailing `XON`.
#[must_use]
pub fn without_xon(mut header: Vec<u8>) -> Vec<u8> {
    if header.last() == Some(&XON) {
        header.pop();
    }
    header
}
