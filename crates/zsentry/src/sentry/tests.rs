use std::cell::{Cell, RefCell};
use std::rc::Rc;

use protocol::{FrameType, Header};

use super::*;
use crate::session::{ReceiveSession, SessionKind, TransferSession};

// ============================================================================
// Minimal engines
// ============================================================================

#[derive(Debug, Default)]
struct Engine {
    ended: Rc<Cell<bool>>,
    sender: Option<PeerSender>,
    fed: Vec<u8>,
}

impl TransferSession for Engine {
    fn attach_sender(&mut self, sender: PeerSender) {
        self.sender = Some(sender);
    }

    fn consume(&mut self, input: &[u8], _events: &mut dyn FnMut(SessionEvent<'_>)) {
        self.fed.extend_from_slice(input);
    }

    fn has_ended(&self) -> bool {
        self.ended.get()
    }
}

impl ReceiveSession for Engine {
    fn take_trailing_bytes(&mut self) -> Vec<u8> {
        Vec::new()
    }
}

#[derive(Default)]
struct Factory {
    built: Vec<FrameType>,
    ended: Rc<Cell<bool>>,
}

impl SessionFactory for Factory {
    type Receive = Engine;
    type Send = Engine;

    fn receive(&mut self, header: &Header) -> Engine {
        self.built.push(header.frame_type());
        Engine {
            ended: Rc::clone(&self.ended),
            ..Engine::default()
        }
    }

    fn send(&mut self, header: &Header) -> Engine {
        self.built.push(header.frame_type());
        Engine {
            ended: Rc::clone(&self.ended),
            ..Engine::default()
        }
    }
}

struct Harness {
    sentry: Sentry<Factory>,
    terminal: Rc<RefCell<Vec<u8>>>,
    detections: Rc<RefCell<Vec<Detection>>>,
    retractions: Rc<Cell<usize>>,
    sent: Rc<RefCell<Vec<u8>>>,
    ended: Rc<Cell<bool>>,
}

fn harness() -> Harness {
    let terminal = Rc::new(RefCell::new(Vec::new()));
    let detections = Rc::new(RefCell::new(Vec::new()));
    let retractions = Rc::new(Cell::new(0));
    let sent = Rc::new(RefCell::new(Vec::new()));
    let factory = Factory::default();
    let ended = Rc::clone(&factory.ended);

    let sentry = Sentry::builder(factory)
        .to_terminal({
            let terminal = Rc::clone(&terminal);
            move |bytes: &[u8]| terminal.borrow_mut().extend_from_slice(bytes)
        })
        .on_detect({
            let detections = Rc::clone(&detections);
            move |detection| detections.borrow_mut().push(detection)
        })
        .on_retract({
            let retractions = Rc::clone(&retractions);
            move || retractions.set(retractions.get() + 1)
        })
        .sender({
            let sent = Rc::clone(&sent);
            move |bytes: &[u8]| sent.borrow_mut().extend_from_slice(bytes)
        })
        .build()
        .expect("all collaborators supplied");

    Harness {
        sentry,
        terminal,
        detections,
        retractions,
        sent,
        ended,
    }
}

fn zrqinit() -> Vec<u8> {
    Header::new(FrameType::RequestInit, [0; 4]).to_hex()
}

fn zrinit() -> Vec<u8> {
    Header::new(FrameType::ReceiverInit, [0, 0, 0, 0x21]).to_hex()
}

impl Harness {
    fn last_detection(&self) -> Detection {
        *self.detections.borrow().last().expect("a detection")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn starts_without_session() {
    let h = harness();
    assert_eq!(h.sentry.state(), SentryState::NoSession);
    assert!(!h.sentry.has_pending_detection());
    assert!(h.sentry.session().is_none());
    assert!(h.sentry.buffered().is_empty());
}

#[test]
fn detection_builds_engine_from_header() {
    let mut h = harness();
    h.sentry.consume(&zrinit());

    assert!(h.sentry.has_pending_detection());
    assert_eq!(h.sentry.factory.built, vec![FrameType::ReceiverInit]);
    assert_eq!(h.last_detection().kind(), SessionKind::Send);
    assert_eq!(h.last_detection().ticket(), 1);
}

#[test]
fn tickets_increase_per_detection() {
    let mut h = harness();
    h.sentry.consume(&zrqinit());
    h.sentry.consume(&zrinit());

    let tickets: Vec<_> = h.detections.borrow().iter().map(Detection::ticket).collect();
    assert_eq!(tickets, vec![1, 2]);
    assert_eq!(h.retractions.get(), 1);
}

#[test]
fn confirm_attaches_shared_sender() {
    let mut h = harness();
    h.sentry.consume(&zrqinit());
    let detection = h.last_detection();

    let session = h.sentry.confirm(&detection).expect("valid detection");
    let engine = session.as_receive().expect("receive engine");
    engine.sender.as_ref().expect("sender attached").send(b"ok");

    assert_eq!(*h.sent.borrow(), b"ok");
    assert_eq!(h.sentry.state(), SentryState::SessionActive);
    assert!(!h.sentry.has_pending_detection());
}

#[test]
fn active_session_receives_all_bytes() {
    let mut h = harness();
    h.sentry.consume(&zrqinit());
    let detection = h.last_detection();
    h.sentry.confirm(&detection).expect("valid detection");
    h.terminal.borrow_mut().clear();

    h.sentry.consume(b"payload");

    let engine = h
        .sentry
        .session()
        .and_then(Session::as_receive)
        .expect("receive engine");
    assert_eq!(engine.fed, b"payload");
    assert!(h.terminal.borrow().is_empty());
}

#[test]
fn session_ended_between_calls_is_retired() {
    let mut h = harness();
    h.sentry.consume(&zrqinit());
    let detection = h.last_detection();
    h.sentry.confirm(&detection).expect("valid detection");
    h.terminal.borrow_mut().clear();

    h.ended.set(true);
    h.sentry.consume(b"$ ");

    assert_eq!(h.sentry.state(), SentryState::NoSession);
    assert_eq!(*h.terminal.borrow(), b"$ ");
}

#[test]
fn detection_from_other_sentry_is_never_valid() {
    let mut first = harness();
    let mut second = harness();
    first.sentry.consume(&zrqinit());
    second.sentry.consume(&zrqinit());

    let foreign = first.last_detection();
    assert_eq!(foreign.ticket(), second.last_detection().ticket());
    assert!(!foreign.is_valid(&second.sentry));
    assert!(second.sentry.confirm(&foreign).is_err());
    assert!(second.sentry.has_pending_detection());
}

#[test]
fn empty_fragment_retracts_pending_detection() {
    let mut h = harness();
    h.sentry.consume(&zrqinit());
    let detection = h.last_detection();

    h.sentry.consume(&[]);

    assert!(!detection.is_valid(&h.sentry));
    assert!(!h.sentry.has_pending_detection());
    assert_eq!(h.retractions.get(), 1);
}

#[test]
fn deny_keeps_pending_detection() {
    let mut h = harness();
    h.sentry.consume(&zrqinit());
    let detection = h.last_detection();

    detection.deny(&h.sentry);

    assert_eq!(*h.sent.borrow(), ABORT_SEQUENCE);
    assert!(detection.is_valid(&h.sentry));
}

#[test]
fn debug_reports_state_without_callbacks() {
    let mut h = harness();
    h.sentry.consume(&zrqinit());
    let rendered = format!("{:?}", h.sentry);
    assert!(rendered.contains("NoSession"));
    assert!(rendered.contains("pending_ticket: Some(1)"));
}
