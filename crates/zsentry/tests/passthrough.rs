//! Terminal passthrough and fragment reassembly.
//!
//! Ordinary traffic must reach the terminal byte for byte, and a session
//! start must be recognised no matter how the transport splits it.

use proptest::prelude::*;
use protocol::MAX_HEX_START_LEN;
use test_support::{Recorder, ScriptedFactory, without_xon, zrinit, zrqinit};
use zsentry::{SentryState, SessionKind};

fn marker_free_chunks() -> impl Strategy<Value = Vec<Vec<u8>>> {
    let byte = any::<u8>().prop_filter("no ZPAD", |byte| *byte != b'*');
    prop::collection::vec(prop::collection::vec(byte, 0..64), 0..24)
}

// ============================================================================
// Marker-free traffic
// ============================================================================

#[test]
fn plain_output_is_forwarded_unchanged() {
    let recorder = Recorder::new();
    let mut sentry = recorder.sentry(ScriptedFactory::new());

    sentry.consume(b"total 0\r\n");
    sentry.consume(b"drwxr-xr-x  2 user user 40 .\r\n");

    assert_eq!(
        recorder.terminal_calls(),
        vec![b"total 0\r\n".to_vec(), b"drwxr-xr-x  2 user user 40 .\r\n".to_vec()]
    );
    assert!(recorder.detections().is_empty());
    assert_eq!(recorder.retract_count(), 0);
}

#[test]
fn empty_fragment_is_not_forwarded() {
    let recorder = Recorder::new();
    let mut sentry = recorder.sentry(ScriptedFactory::new());

    sentry.consume(&[]);

    assert!(recorder.timeline().is_empty());
}

#[test]
fn lookalike_padding_is_forwarded() {
    let recorder = Recorder::new();
    let mut sentry = recorder.sentry(ScriptedFactory::new());

    sentry.consume(b"/** doc **/ **\x18A ");

    assert_eq!(recorder.terminal_bytes(), b"/** doc **/ **\x18A ");
    assert!(recorder.detections().is_empty());
}

#[test]
fn single_bytes_never_grow_buffer_past_window() {
    let recorder = Recorder::new();
    let mut sentry = recorder.sentry(ScriptedFactory::new());

    for byte in (0..=u8::MAX).cycle().take(2_000) {
        sentry.consume(&[byte]);
        assert!(sentry.buffered().len() < MAX_HEX_START_LEN);
    }
}

proptest! {
    #[test]
    fn marker_free_input_passes_through(chunks in marker_free_chunks()) {
        let recorder = Recorder::new();
        let mut sentry = recorder.sentry(ScriptedFactory::new());

        for chunk in &chunks {
            sentry.consume(chunk);
            prop_assert!(sentry.buffered().len() < MAX_HEX_START_LEN);
        }

        let expected: Vec<Vec<u8>> = chunks.iter().filter(|c| !c.is_empty()).cloned().collect();
        prop_assert_eq!(recorder.terminal_calls(), expected);
        prop_assert!(recorder.detections().is_empty());
        prop_assert_eq!(recorder.retract_count(), 0);
        prop_assert_eq!(sentry.state(), SentryState::NoSession);
    }
}

// ============================================================================
// Fragmented session starts
// ============================================================================

#[test]
fn header_byte_by_byte_is_detected_once() {
    let recorder = Recorder::new();
    let mut sentry = recorder.sentry(ScriptedFactory::new());
    let wire = without_xon(zrinit());

    for byte in &wire {
        sentry.consume(std::slice::from_ref(byte));
    }

    assert_eq!(recorder.detections().len(), 1);
    assert_eq!(recorder.last_detection().map(|d| d.kind()), Some(SessionKind::Send));
    assert_eq!(recorder.retract_count(), 0);
    assert_eq!(recorder.terminal_bytes(), wire);
}

#[test]
fn xon_in_its_own_fragment_retracts() {
    let recorder = Recorder::new();
    let mut sentry = recorder.sentry(ScriptedFactory::new());
    let wire = zrqinit();
    let (header, xon) = wire.split_at(wire.len() - 1);

    sentry.consume(header);
    sentry.consume(xon);

    assert_eq!(recorder.callback_order(), ["detect", "terminal", "retract", "terminal"]);
}

proptest! {
    #[test]
    fn split_marker_is_detected(split in 0usize..=20) {
        let recorder = Recorder::new();
        let mut sentry = recorder.sentry(ScriptedFactory::new());
        let wire = without_xon(zrqinit());

        sentry.consume(&wire[..split]);
        sentry.consume(&wire[split..]);

        prop_assert_eq!(recorder.detections().len(), 1);
        prop_assert_eq!(recorder.retract_count(), 0);
        prop_assert_eq!(recorder.terminal_bytes(), wire);
    }

    #[test]
    fn start_after_noise_survives_any_chunking(
        noise in prop::collection::vec(any::<u8>().prop_filter("no ZPAD", |b| *b != b'*'), 0..80),
        cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..8),
    ) {
        let recorder = Recorder::new();
        let mut sentry = recorder.sentry(ScriptedFactory::new());
        let mut stream = noise.clone();
        stream.extend_from_slice(&zrqinit());

        let mut offsets: Vec<usize> = cuts.iter().map(|cut| cut.index(stream.len())).collect();
        offsets.push(stream.len());
        offsets.sort_unstable();
        let mut start = 0;
        for end in offsets {
            sentry.consume(&stream[start..end]);
            start = end;
        }

        // The XON can land in a fragment of its own, which retracts the
        // first detection; the header itself is always seen.
        let detections = recorder.detections();
        prop_assert!(!detections.is_empty());
        prop_assert!(detections.iter().all(|d| d.kind() == SessionKind::Receive));
        prop_assert_eq!(recorder.terminal_bytes(), stream);
    }
}
