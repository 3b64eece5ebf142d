use block_portrait_common::config::CaptureConfig;
use block_portrait_common::texture::Texture;
use std::time::Duration;
use tracing::debug;

use crate::display::{DisplayError, PreviewDisplay};
use crate::keys::{classify, Decision};
use crate::process;
use crate::source::FrameSource;

/// Where a capture session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureState {
    /// No frame has arrived yet.
    Warming,
    /// Frames are arriving and being previewed.
    Previewing,
    Accepted,
    Aborted,
    /// The camera never produced enough frames; nothing was captured.
    GaveUp,
}

impl CaptureState {
    fn label(self) -> &'static str {
        match self {
            CaptureState::Warming => "WARMING",
            CaptureState::Previewing => "PREVIEWING",
            CaptureState::Accepted => "ACCEPTED",
            CaptureState::Aborted => "ABORTED",
            CaptureState::GaveUp => "GAVE_UP",
        }
    }
}

/// Result of a session that was not aborted.
#[derive(Debug)]
pub enum CaptureOutcome {
    Accepted(Texture),
    /// Warm-up retries ran out. Callers must cope with having no texture.
    GaveUp,
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("capture aborted by user")]
    Aborted,
    #[error("preview failed: {0}")]
    Display(#[from] DisplayError),
}

#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub texture_size: u32,
    pub preview_size: u32,
    pub key_wait: Duration,
    pub warmup_attempts: u32,
    pub window_title: String,
}

impl From<&CaptureConfig> for CaptureSettings {
    fn from(config: &CaptureConfig) -> Self {
        Self {
            texture_size: config.texture_size,
            preview_size: config.preview_size,
            key_wait: Duration::from_millis(config.key_wait_ms),
            warmup_attempts: config.warmup_attempts,
            window_title: config.window_title.clone(),
        }
    }
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self::from(&CaptureConfig::default())
    }
}

/// Owns the camera and the preview display for one capture. Both are
/// released when the session is dropped, whichever way [`Self::run`] exits.
pub struct CaptureSession<S: FrameSource, D: PreviewDisplay> {
    source: S,
    display: D,
    settings: CaptureSettings,
    state: CaptureState,
    /// Failed grabs over the whole session. Never reset by a good frame.
    failed_grabs: u32,
}

impl<S: FrameSource, D: PreviewDisplay> CaptureSession<S, D> {
    pub fn new(source: S, display: D, settings: CaptureSettings) -> Self {
        Self {
            source,
            display,
            settings,
            state: CaptureState::Warming,
            failed_grabs: 0,
        }
    }

    /// Preview frames until the user accepts one, aborts, or the camera
    /// fails `warmup_attempts` times.
    ///
    /// Logs stay at debug while the preview owns the terminal; callers
    /// report the outcome once the session is dropped.
    pub fn run(mut self) -> Result<CaptureOutcome, CaptureError> {
        debug!(
            source = self.source.name(),
            texture_size = self.settings.texture_size,
            "starting capture, press Enter or Space to take the photo"
        );

        loop {
            let frame = match self.source.read() {
                Ok(frame) => frame,
                Err(e) => {
                    debug!(error = %e, "no frame from camera");
                    if self.record_failed_grab() {
                        return Ok(CaptureOutcome::GaveUp);
                    }
                    continue;
                }
            };

            let rgb = match frame.to_rgb() {
                Ok(rgb) => rgb,
                Err(e) => {
                    debug!(error = %e, "unusable frame from camera");
                    if self.record_failed_grab() {
                        return Ok(CaptureOutcome::GaveUp);
                    }
                    continue;
                }
            };

            if self.state == CaptureState::Warming {
                self.transition(CaptureState::Previewing, "first frame received");
            }

            let texture = process::candidate_texture(&rgb, self.settings.texture_size);
            let preview = process::preview(&texture, self.settings.preview_size);
            self.display.show(&self.settings.window_title, &preview)?;

            let key = self.display.wait_for_key(self.settings.key_wait)?;
            match classify(key) {
                Decision::Retry => {}
                Decision::Accept => {
                    self.transition(CaptureState::Accepted, "photo taken");
                    return Ok(CaptureOutcome::Accepted(Texture::new(texture)));
                }
                Decision::Abort => {
                    self.transition(CaptureState::Aborted, "user quit image prompt");
                    return Err(CaptureError::Aborted);
                }
            }
        }
    }

    /// Count a failed grab. Returns `true` once the session should give up.
    fn record_failed_grab(&mut self) -> bool {
        self.failed_grabs += 1;
        let attempt = self.failed_grabs;
        if attempt < self.settings.warmup_attempts {
            debug!(attempt, "camera not ready, attempt #{attempt}");
            return false;
        }
        debug!(attempts = attempt, "giving up letting camera warm up");
        self.transition(CaptureState::GaveUp, "camera never warmed up");
        true
    }

    fn transition(&mut self, next: CaptureState, reason: &str) {
        debug!(
            "{}→{}: {reason}",
            self.state.label(),
            next.label()
        );
        self.state = next;
    }
}

impl<S: FrameSource, D: PreviewDisplay> Drop for CaptureSession<S, D> {
    fn drop(&mut self) {
        self.source.release();
        self.display.close();
        debug!(state = self.state.label(), "camera and preview released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Key;
    use crate::source::GrabError;
    use block_portrait_common::frame::RawFrame;
    use image::RgbImage;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    /// Plays back a fixed list of grab results, then fails forever.
    struct ScriptedSource {
        script: VecDeque<Option<RawFrame>>,
        reads: Rc<Cell<u32>>,
        releases: Rc<Cell<u32>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Option<RawFrame>>) -> Self {
            Self {
                script: script.into(),
                reads: Rc::new(Cell::new(0)),
                releases: Rc::new(Cell::new(0)),
            }
        }
    }

    impl FrameSource for ScriptedSource {
        fn read(&mut self) -> Result<RawFrame, GrabError> {
            self.reads.set(self.reads.get() + 1);
            self.script
                .pop_front()
                .flatten()
                .ok_or(GrabError::EndOfStream)
        }

        fn release(&mut self) {
            self.releases.set(self.releases.get() + 1);
        }
    }

    struct ScriptedDisplay {
        keys: VecDeque<Option<Key>>,
        shown: Rc<RefCell<Vec<RgbImage>>>,
        closes: Rc<Cell<u32>>,
    }

    impl ScriptedDisplay {
        fn new(keys: Vec<Option<Key>>) -> Self {
            Self {
                keys: keys.into(),
                shown: Rc::new(RefCell::new(Vec::new())),
                closes: Rc::new(Cell::new(0)),
            }
        }
    }

    impl PreviewDisplay for ScriptedDisplay {
        fn show(&mut self, _title: &str, image: &RgbImage) -> Result<(), DisplayError> {
            self.shown.borrow_mut().push(image.clone());
            Ok(())
        }

        fn wait_for_key(&mut self, _timeout: Duration) -> Result<Option<Key>, DisplayError> {
            Ok(self.keys.pop_front().flatten())
        }

        fn close(&mut self) {
            self.closes.set(self.closes.get() + 1);
        }
    }

    /// Records the message of every event.
    #[derive(Clone, Default)]
    struct MessageCollector(Arc<Mutex<Vec<String>>>);

    struct MessageVisitor<'a>(&'a mut String);

    impl Visit for MessageVisitor<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                *self.0 = format!("{value:?}");
            }
        }
    }

    impl<S: tracing::Subscriber> Layer<S> for MessageCollector {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut message = String::new();
            event.record(&mut MessageVisitor(&mut message));
            self.0.lock().unwrap().push(message);
        }
    }

    impl MessageCollector {
        fn count(&self, prefix: &str) -> usize {
            self.0
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.starts_with(prefix))
                .count()
        }
    }

    fn run_logged(
        session: CaptureSession<ScriptedSource, ScriptedDisplay>,
    ) -> (Result<CaptureOutcome, CaptureError>, MessageCollector) {
        let collector = MessageCollector::default();
        let subscriber = tracing_subscriber::registry().with(collector.clone());
        let result = tracing::subscriber::with_default(subscriber, || session.run());
        (result, collector)
    }

    fn black_frame() -> Option<RawFrame> {
        Some(RawFrame::bgr8(640, 480, vec![0; 640 * 480 * 3]))
    }

    fn settings() -> CaptureSettings {
        CaptureSettings {
            key_wait: Duration::ZERO,
            ..CaptureSettings::default()
        }
    }

    #[test]
    fn black_frame_accepted_immediately() {
        let source = ScriptedSource::new(vec![black_frame()]);
        let display = ScriptedDisplay::new(vec![Some(Key::Enter)]);
        let (releases, closes) = (source.releases.clone(), display.closes.clone());
        let shown = display.shown.clone();

        let outcome = CaptureSession::new(source, display, settings()).run().unwrap();

        let CaptureOutcome::Accepted(texture) = outcome else {
            panic!("expected an accepted texture");
        };
        assert_eq!(texture.image().dimensions(), (256, 256));
        assert!(texture.image().pixels().all(|p| p.0 == [0, 0, 0]));
        assert_eq!(shown.borrow().len(), 1);
        assert_eq!(shown.borrow()[0].dimensions(), (700, 700));
        assert_eq!(releases.get(), 1);
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn space_also_accepts_after_retries() {
        let source = ScriptedSource::new(vec![black_frame(), black_frame(), black_frame()]);
        let display = ScriptedDisplay::new(vec![None, Some(Key::Char('x')), Some(Key::Space)]);
        let shown = display.shown.clone();

        let outcome = CaptureSession::new(source, display, settings()).run().unwrap();
        assert!(matches!(outcome, CaptureOutcome::Accepted(_)));
        assert_eq!(shown.borrow().len(), 3);
    }

    #[test]
    fn abort_releases_once_and_returns_no_texture() {
        for key in [Key::Escape, Key::Backspace, Key::Char('q'), Key::Char('Q')] {
            let source = ScriptedSource::new(vec![black_frame(), black_frame()]);
            let display = ScriptedDisplay::new(vec![None, Some(key)]);
            let (releases, closes) = (source.releases.clone(), display.closes.clone());

            let result = CaptureSession::new(source, display, settings()).run();
            assert!(matches!(result, Err(CaptureError::Aborted)), "{key:?}");
            assert_eq!(releases.get(), 1);
            assert_eq!(closes.get(), 1);
        }
    }

    #[test]
    fn nine_failures_then_success() {
        let mut script = vec![None; 9];
        script.push(black_frame());
        let source = ScriptedSource::new(script);
        let display = ScriptedDisplay::new(vec![Some(Key::Enter)]);
        let reads = source.reads.clone();

        let (result, logs) = run_logged(CaptureSession::new(source, display, settings()));

        assert!(matches!(result, Ok(CaptureOutcome::Accepted(_))));
        assert_eq!(logs.count("camera not ready"), 9);
        assert_eq!(logs.count("giving up"), 0);
        assert_eq!(reads.get(), 10);
    }

    #[test]
    fn ten_failures_give_up() {
        let source = ScriptedSource::new(vec![None; 10]);
        let display = ScriptedDisplay::new(vec![]);
        let (reads, releases, closes) = (
            source.reads.clone(),
            source.releases.clone(),
            display.closes.clone(),
        );
        let shown = display.shown.clone();

        let (result, logs) = run_logged(CaptureSession::new(source, display, settings()));

        assert!(matches!(result, Ok(CaptureOutcome::GaveUp)));
        assert_eq!(reads.get(), 10);
        assert_eq!(logs.count("camera not ready"), 9);
        assert_eq!(logs.count("giving up"), 1);
        assert!(shown.borrow().is_empty());
        assert_eq!(releases.get(), 1);
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn retries_continue_below_threshold() {
        for failures in 1..10usize {
            let mut script = vec![None; failures];
            script.push(black_frame());
            let source = ScriptedSource::new(script);
            let display = ScriptedDisplay::new(vec![Some(Key::Enter)]);
            let result = CaptureSession::new(source, display, settings()).run();
            assert!(
                matches!(result, Ok(CaptureOutcome::Accepted(_))),
                "{failures} failures"
            );
        }
    }

    #[test]
    fn warmup_counter_survives_good_frames() {
        // Failures interleaved with previewed frames still add up.
        let mut script = Vec::new();
        for _ in 0..10 {
            script.push(None);
            script.push(black_frame());
        }
        let source = ScriptedSource::new(script);
        let display = ScriptedDisplay::new(vec![]);

        let result = CaptureSession::new(source, display, settings()).run();
        assert!(matches!(result, Ok(CaptureOutcome::GaveUp)));
    }

    #[test]
    fn undecodable_frames_count_as_failed_grabs() {
        let mut script = vec![Some(RawFrame::jpeg(vec![0xFF, 0xD8, 0x00])); 3];
        script.push(black_frame());
        let source = ScriptedSource::new(script);
        let display = ScriptedDisplay::new(vec![Some(Key::Enter)]);

        let (result, logs) = run_logged(CaptureSession::new(source, display, settings()));
        assert!(matches!(result, Ok(CaptureOutcome::Accepted(_))));
        assert_eq!(logs.count("camera not ready"), 3);
    }

    #[test]
    fn state_transitions_are_logged() {
        let source = ScriptedSource::new(vec![black_frame()]);
        let display = ScriptedDisplay::new(vec![Some(Key::Space)]);
        let (_, logs) = run_logged(CaptureSession::new(source, display, settings()));
        assert_eq!(logs.count("WARMING→PREVIEWING"), 1);
        assert_eq!(logs.count("PREVIEWING→ACCEPTED"), 1);
    }

    #[test]
    fn panic_during_grab_still_releases_once() {
        struct PanickingSource(Rc<Cell<u32>>);

        impl FrameSource for PanickingSource {
            fn read(&mut self) -> Result<RawFrame, GrabError> {
                panic!("camera driver fault");
            }

            fn release(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let releases = Rc::new(Cell::new(0));
        let display = ScriptedDisplay::new(vec![]);
        let closes = display.closes.clone();
        let session = CaptureSession::new(PanickingSource(releases.clone()), display, settings());

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| session.run()));
        assert!(result.is_err());
        assert_eq!(releases.get(), 1);
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn settings_follow_config() {
        let config = CaptureConfig {
            texture_size: 128,
            key_wait_ms: 250,
            ..CaptureConfig::default()
        };
        let settings = CaptureSettings::from(&config);
        assert_eq!(settings.texture_size, 128);
        assert_eq!(settings.key_wait, Duration::from_millis(250));
        assert_eq!(settings.warmup_attempts, 10);
    }
}
