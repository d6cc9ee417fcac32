//! Diagnostics emitted under the `tracing` feature.
#![cfg(feature = "tracing")]

use std::io;
use std::sync::{Arc, Mutex};

use test_support::{Recorder, ScriptedFactory, zrqinit};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn contents(&self) -> String {
        let bytes = self.0.lock().expect("capture lock").clone();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("capture lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Capture {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn negotiation_is_traced_under_sentry_target() {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_max_level(LevelFilter::TRACE)
        .with_ansi(false)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let recorder = Recorder::new();
        let mut sentry = recorder.sentry(ScriptedFactory::new());
        sentry.consume(&zrqinit());
        let detection = recorder.last_detection().expect("detected");
        detection.deny(&sentry);
        sentry.consume(b"C");
    });

    let output = capture.contents();
    assert!(output.contains("zsentry::sentry"));
    assert!(output.contains("marker found"));
    assert!(output.contains("detection issued"));
    assert!(output.contains("detection denied"));
    assert!(output.contains("peer requested legacy transfer; aborting"));
    assert!(output.contains("detection retracted"));
}
