//! Capture session state machine.
//!
//! ```text
//! Idle ──start──▶ Requesting ──granted──▶ Streaming ──record──▶ Recording ──stop──▶ Stopped
//!                     │                      │  └──capture (photo)──────────────────▶ Stopped
//!                     └──denied──▶ Error ◀───┘
//! any state ──reset──▶ Idle
//! ```
//!
//! Device resources (stream, recorder, elapsed ticker) live inside the phase
//! that owns them, so leaving a phase is the only way to release them.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use linkcard_card_model::{ArtifactRef, ContainerKind, MediaOrigin};
use linkcard_common::clock::{ElapsedTicker, RecordingClock};
use linkcard_common::config::CaptureSettings;
use linkcard_common::error::{LinkcardError, LinkcardResult};

use crate::device::{
    DeviceStream, MediaDevices, MediaRecorder, RecorderEvent, StreamConstraints, ViewfinderSink,
};
use crate::frame::Rasterizer;

/// What the user asked to capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureMode {
    Photo,
    Audio,
    Video,
}

impl CaptureMode {
    /// Photo and video need a picture; audio and video need sound.
    pub fn constraints(self) -> StreamConstraints {
        StreamConstraints {
            video: matches!(self, Self::Photo | Self::Video),
            audio: matches!(self, Self::Audio | Self::Video),
        }
    }

    /// Container of the recorded artifact. Photos are not recorded.
    pub fn container(self) -> Option<ContainerKind> {
        match self {
            Self::Photo => None,
            Self::Audio => Some(ContainerKind::AudioWebm),
            Self::Video => Some(ContainerKind::VideoWebm),
        }
    }

    pub fn needs_viewfinder(self) -> bool {
        self.constraints().video
    }
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Photo => "photo",
            Self::Audio => "audio",
            Self::Video => "video",
        })
    }
}

impl FromStr for CaptureMode {
    type Err = LinkcardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "photo" => Ok(Self::Photo),
            "audio" => Ok(Self::Audio),
            "video" => Ok(Self::Video),
            other => Err(LinkcardError::unsupported(format!(
                "Unknown capture mode '{other}' (expected photo, audio, or video)"
            ))),
        }
    }
}

/// Observable state of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// Waiting for the platform to grant device access.
    Requesting,
    /// Stream granted, nothing recorded yet.
    Streaming,
    Recording,
    /// An artifact is available.
    Stopped,
    /// Device access failed; acknowledge to return to idle.
    Error,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The artifact a finished capture produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedMedia {
    /// Primary artifact.
    pub media: ArtifactRef,
    /// Still frame: the photo itself, or the last video frame.
    pub frame: Option<ArtifactRef>,
    pub elapsed_secs: u64,
    /// The recorder ended before a stop was requested.
    pub partial: bool,
    pub origin: MediaOrigin,
}

impl CapturedMedia {
    /// Wrap an existing artifact, e.g. the media of a card being edited.
    pub fn existing(media: ArtifactRef, frame: Option<ArtifactRef>) -> Self {
        Self {
            media,
            frame,
            elapsed_secs: 0,
            partial: false,
            origin: MediaOrigin::Upload,
        }
    }
}

struct ActiveRecording {
    mode: CaptureMode,
    container: ContainerKind,
    stream: Box<dyn DeviceStream>,
    recorder: Box<dyn MediaRecorder>,
    chunks: Vec<Vec<u8>>,
    ticker: ElapsedTicker,
    clock: RecordingClock,
}

enum Phase {
    Idle,
    Requesting {
        mode: CaptureMode,
    },
    Streaming {
        mode: CaptureMode,
        stream: Box<dyn DeviceStream>,
    },
    Recording(ActiveRecording),
    Stopped {
        mode: Option<CaptureMode>,
    },
    Error {
        mode: CaptureMode,
        message: String,
    },
}

/// Owns at most one live device stream and the artifact it produced.
pub struct CaptureSession {
    devices: Arc<dyn MediaDevices>,
    viewfinder: Option<Arc<dyn ViewfinderSink>>,
    rasterizer: Rasterizer,
    phase: Phase,
    last_capture: Option<CapturedMedia>,
}

impl CaptureSession {
    pub fn new(devices: Arc<dyn MediaDevices>, settings: &CaptureSettings) -> Self {
        Self {
            devices,
            viewfinder: None,
            rasterizer: Rasterizer::new(settings),
            phase: Phase::Idle,
            last_capture: None,
        }
    }

    /// Attach visual streams to this sink while they are live.
    pub fn with_viewfinder(mut self, sink: Arc<dyn ViewfinderSink>) -> Self {
        self.viewfinder = Some(sink);
        self
    }

    pub fn state(&self) -> SessionState {
        match self.phase {
            Phase::Idle => SessionState::Idle,
            Phase::Requesting { .. } => SessionState::Requesting,
            Phase::Streaming { .. } => SessionState::Streaming,
            Phase::Recording(_) => SessionState::Recording,
            Phase::Stopped { .. } => SessionState::Stopped,
            Phase::Error { .. } => SessionState::Error,
        }
    }

    pub fn mode(&self) -> Option<CaptureMode> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Requesting { mode }
            | Phase::Streaming { mode, .. }
            | Phase::Error { mode, .. } => Some(*mode),
            Phase::Recording(active) => Some(active.mode),
            Phase::Stopped { mode } => *mode,
        }
    }

    /// A device is being acquired, previewed, or recorded.
    pub fn is_busy(&self) -> bool {
        matches!(
            self.state(),
            SessionState::Requesting | SessionState::Streaming | SessionState::Recording
        )
    }

    /// User-facing message of the last device failure.
    pub fn last_error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Whole seconds recorded so far (or by the last capture).
    pub fn elapsed_secs(&self) -> u64 {
        match &self.phase {
            Phase::Recording(active) => active.ticker.seconds(),
            _ => self
                .last_capture
                .as_ref()
                .map(|c| c.elapsed_secs)
                .unwrap_or(0),
        }
    }

    /// The finished artifact, available only in the stopped state.
    pub fn captured(&self) -> Option<&CapturedMedia> {
        match self.phase {
            Phase::Stopped { .. } => self.last_capture.as_ref(),
            _ => None,
        }
    }

    /// Acquire a stream for `mode`, tearing down any live session and
    /// discarding the previous capture first.
    pub async fn start(&mut self, mode: CaptureMode) -> LinkcardResult<()> {
        let previous = std::mem::replace(&mut self.phase, Phase::Idle);
        if !matches!(previous, Phase::Idle) {
            tracing::info!(new_mode = %mode, "Replacing existing capture session");
        }
        self.teardown(previous);
        self.last_capture = None;

        let constraints = mode.constraints();
        tracing::info!(
            %mode,
            backend = self.devices.name(),
            video = constraints.video,
            audio = constraints.audio,
            "Requesting device stream"
        );
        self.phase = Phase::Requesting { mode };

        match self.devices.request_stream(constraints).await {
            Ok(stream) => {
                if mode.needs_viewfinder() {
                    if let Some(sink) = &self.viewfinder {
                        sink.attach(stream.id());
                    }
                }
                tracing::info!(%mode, stream = stream.id(), "Device stream granted");
                self.phase = Phase::Streaming { mode, stream };
                Ok(())
            }
            Err(e) => {
                let message = match e {
                    LinkcardError::PermissionDenied { message } => message,
                    other => other.to_string(),
                };
                tracing::warn!(%mode, error = %message, "Device access failed");
                self.phase = Phase::Error {
                    mode,
                    message: message.clone(),
                };
                Err(LinkcardError::permission_denied(message))
            }
        }
    }

    /// Leave the error state after the user has seen it.
    pub fn acknowledge_error(&mut self) {
        if matches!(self.phase, Phase::Error { .. }) {
            self.phase = Phase::Idle;
        }
    }

    /// Begin recording the granted stream (audio and video only).
    pub fn record(&mut self) -> LinkcardResult<()> {
        let (mode, container) = match &self.phase {
            Phase::Streaming { mode, .. } => match mode.container() {
                Some(container) => (*mode, container),
                None => {
                    return Err(LinkcardError::capture(format!(
                        "{mode} sessions cannot record"
                    )))
                }
            },
            _ => {
                return Err(LinkcardError::capture(format!(
                    "Cannot record from {} state",
                    self.state()
                )))
            }
        };

        let Phase::Streaming { mut stream, .. } = std::mem::replace(&mut self.phase, Phase::Idle)
        else {
            unreachable!("phase checked above");
        };

        let started = stream.create_recorder(container).and_then(|mut recorder| {
            recorder.start()?;
            Ok(recorder)
        });
        let (recorder, ticker) = match started.and_then(|r| Ok((r, ElapsedTicker::start()?))) {
            Ok(parts) => parts,
            Err(e) => {
                tracing::warn!(%mode, error = %e, "Recorder failed to start");
                self.release_stream(mode, stream.as_mut());
                self.phase = Phase::Error {
                    mode,
                    message: e.to_string(),
                };
                return Err(e);
            }
        };

        let clock = RecordingClock::start();
        tracing::info!(%mode, epoch_wall = %clock.epoch_wall(), "Recording started");
        self.phase = Phase::Recording(ActiveRecording {
            mode,
            container,
            stream,
            recorder,
            chunks: Vec::new(),
            ticker,
            clock,
        });
        Ok(())
    }

    /// Drain recorder events that are already available.
    ///
    /// Returns `true` when the recorder ended on its own; the chunks gathered
    /// so far are finalized into a partial capture.
    pub fn pump(&mut self) -> bool {
        let Phase::Recording(active) = &mut self.phase else {
            return false;
        };

        while let Some(event) = active.recorder.try_next_event() {
            match event {
                RecorderEvent::Chunk(chunk) => push_chunk(&mut active.chunks, chunk),
                RecorderEvent::Stopped | RecorderEvent::Failed(_) => {
                    if let RecorderEvent::Failed(reason) = &event {
                        tracing::warn!(%reason, "Recorder ended unexpectedly; keeping partial capture");
                    }
                    self.finish_recording(true);
                    return true;
                }
            }
        }
        false
    }

    /// Stop the current capture.
    ///
    /// While recording this finalizes the artifact; while only streaming it
    /// releases the device and returns to idle.
    pub async fn stop(&mut self) -> LinkcardResult<Option<&CapturedMedia>> {
        match &mut self.phase {
            Phase::Recording(active) => {
                let mut partial = false;
                if let Err(e) = active.recorder.request_stop() {
                    tracing::warn!(error = %e, "Recorder stop request failed");
                    partial = true;
                } else {
                    loop {
                        match active.recorder.next_event().await {
                            RecorderEvent::Chunk(chunk) => push_chunk(&mut active.chunks, chunk),
                            RecorderEvent::Stopped => break,
                            RecorderEvent::Failed(reason) => {
                                tracing::warn!(%reason, "Recorder failed while stopping");
                                partial = true;
                                break;
                            }
                        }
                    }
                }
                self.finish_recording(partial);
                Ok(self.last_capture.as_ref())
            }
            Phase::Streaming { .. } => {
                let phase = std::mem::replace(&mut self.phase, Phase::Idle);
                self.teardown(phase);
                Ok(None)
            }
            _ => Err(LinkcardError::capture(format!(
                "Nothing to stop in {} state",
                self.state()
            ))),
        }
    }

    /// Take a still from a photo stream.
    pub fn capture(&mut self) -> LinkcardResult<&CapturedMedia> {
        match &self.phase {
            Phase::Streaming {
                mode: CaptureMode::Photo,
                ..
            } => {}
            _ => {
                return Err(LinkcardError::capture(format!(
                    "Photo capture needs a streaming photo session, not {}",
                    self.state()
                )))
            }
        }

        let Phase::Streaming { mode, mut stream } = std::mem::replace(&mut self.phase, Phase::Idle)
        else {
            unreachable!("phase checked above");
        };

        let result = stream
            .grab_frame()
            .and_then(|frame| self.rasterizer.to_png(&frame));
        self.release_stream(mode, stream.as_mut());

        match result {
            Ok(image) => {
                tracing::info!(bytes = image.byte_len().unwrap_or(0), "Photo captured");
                self.phase = Phase::Stopped { mode: Some(mode) };
                Ok(self.last_capture.insert(CapturedMedia {
                    media: image.clone(),
                    frame: Some(image),
                    elapsed_secs: 0,
                    partial: false,
                    origin: MediaOrigin::Record,
                }))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Photo capture failed");
                self.phase = Phase::Error {
                    mode,
                    message: e.to_string(),
                };
                Err(e)
            }
        }
    }

    /// Put an existing artifact into the stopped state without touching any
    /// device.
    pub fn adopt(&mut self, captured: CapturedMedia) {
        let previous = std::mem::replace(&mut self.phase, Phase::Idle);
        self.teardown(previous);
        self.last_capture = Some(captured);
        self.phase = Phase::Stopped { mode: None };
    }

    /// Return to idle from any state, releasing everything and discarding
    /// the captured artifact. Safe to call repeatedly.
    pub fn reset(&mut self) {
        let previous = std::mem::replace(&mut self.phase, Phase::Idle);
        self.teardown(previous);
        self.last_capture = None;
    }

    fn finish_recording(&mut self, partial: bool) {
        let Phase::Recording(mut active) = std::mem::replace(&mut self.phase, Phase::Idle) else {
            return;
        };

        active.ticker.cancel();
        let elapsed_secs = active.ticker.seconds();

        let frame = if active.mode == CaptureMode::Video {
            match active
                .stream
                .grab_frame()
                .and_then(|frame| self.rasterizer.to_jpeg(&frame))
            {
                Ok(thumb) => Some(thumb),
                Err(e) => {
                    tracing::warn!(error = %e, "Could not rasterize video thumbnail");
                    None
                }
            }
        } else {
            None
        };

        self.release_stream(active.mode, active.stream.as_mut());

        let media = ArtifactRef::from_container(active.container, active.chunks.concat());
        tracing::info!(
            mode = %active.mode,
            chunks = active.chunks.len(),
            bytes = media.byte_len().unwrap_or(0),
            elapsed_secs,
            duration_secs = active.clock.elapsed_secs(),
            partial,
            "Recording finalized"
        );

        self.last_capture = Some(CapturedMedia {
            media,
            frame,
            elapsed_secs,
            partial,
            origin: MediaOrigin::Record,
        });
        self.phase = Phase::Stopped {
            mode: Some(active.mode),
        };
    }

    fn release_stream(&self, mode: CaptureMode, stream: &mut dyn DeviceStream) {
        if mode.needs_viewfinder() {
            if let Some(sink) = &self.viewfinder {
                sink.detach(stream.id());
            }
        }
        stream.release();
        tracing::debug!(stream = stream.id(), "Device stream released");
    }

    /// Release whatever `phase` owns. Recordings in flight are discarded.
    fn teardown(&self, phase: Phase) {
        match phase {
            Phase::Recording(mut active) => {
                if let Err(e) = active.recorder.request_stop() {
                    tracing::debug!(error = %e, "Recorder stop during teardown failed");
                }
                active.ticker.cancel();
                self.release_stream(active.mode, active.stream.as_mut());
                tracing::info!(mode = %active.mode, "Recording discarded");
            }
            Phase::Streaming { mode, mut stream } => {
                self.release_stream(mode, stream.as_mut());
            }
            Phase::Idle | Phase::Requesting { .. } | Phase::Stopped { .. } | Phase::Error { .. } => {}
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        let phase = std::mem::replace(&mut self.phase, Phase::Idle);
        self.teardown(phase);
    }
}

fn push_chunk(chunks: &mut Vec<Vec<u8>>, chunk: Vec<u8>) {
    if !chunk.is_empty() {
        chunks.push(chunk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::synthetic::{DeviceEvent, SyntheticDevices, SyntheticScript};
    use std::sync::Mutex;

    fn session(devices: &Arc<SyntheticDevices>) -> CaptureSession {
        CaptureSession::new(devices.clone(), &CaptureSettings::default())
    }

    #[derive(Default)]
    struct RecordingSink {
        calls: Mutex<Vec<String>>,
    }

    impl ViewfinderSink for RecordingSink {
        fn attach(&self, stream_id: &str) {
            self.calls.lock().unwrap().push(format!("attach {stream_id}"));
        }

        fn detach(&self, stream_id: &str) {
            self.calls.lock().unwrap().push(format!("detach {stream_id}"));
        }
    }

    #[test]
    fn mode_constraints() {
        assert_eq!(
            CaptureMode::Photo.constraints(),
            StreamConstraints {
                video: true,
                audio: false
            }
        );
        assert_eq!(
            CaptureMode::Audio.constraints(),
            StreamConstraints {
                video: false,
                audio: true
            }
        );
        assert_eq!(CaptureMode::Video.constraints().track_count(), 2);
        assert_eq!("VIDEO".parse::<CaptureMode>().unwrap(), CaptureMode::Video);
    }

    #[tokio::test]
    async fn recorded_modes_yield_matching_container_and_release_stream() {
        for (mode, mime) in [
            (CaptureMode::Audio, "audio/webm"),
            (CaptureMode::Video, "video/webm"),
        ] {
            let devices = Arc::new(SyntheticDevices::new());
            let mut session = session(&devices);

            session.start(mode).await.unwrap();
            assert_eq!(session.state(), SessionState::Streaming);
            session.record().unwrap();
            assert_eq!(session.state(), SessionState::Recording);

            let captured = session.stop().await.unwrap().cloned().unwrap();
            assert_eq!(captured.media.mime(), Some(mime));
            assert_eq!(captured.media.byte_len(), Some(b"chunk-0chunk-1".len()));
            assert!(!captured.partial);
            assert_eq!(session.state(), SessionState::Stopped);
            assert_eq!(devices.active_tracks(), 0);
        }
    }

    #[tokio::test]
    async fn video_stop_rasterizes_jpeg_frame() {
        let devices = Arc::new(SyntheticDevices::new());
        let mut session = session(&devices);
        session.start(CaptureMode::Video).await.unwrap();
        session.record().unwrap();

        let captured = session.stop().await.unwrap().unwrap();
        assert_eq!(
            captured.frame.as_ref().and_then(|f| f.mime()),
            Some("image/jpeg")
        );
    }

    #[tokio::test]
    async fn audio_stop_has_no_frame() {
        let devices = Arc::new(SyntheticDevices::new());
        let mut session = session(&devices);
        session.start(CaptureMode::Audio).await.unwrap();
        session.record().unwrap();

        let captured = session.stop().await.unwrap().unwrap();
        assert!(captured.frame.is_none());
        assert!(!devices
            .events()
            .iter()
            .any(|e| matches!(e, DeviceEvent::FrameGrabbed { .. })));
    }

    #[tokio::test]
    async fn photo_capture_is_media_and_frame() {
        let devices = Arc::new(SyntheticDevices::new());
        let sink = Arc::new(RecordingSink::default());
        let mut session = session(&devices).with_viewfinder(sink.clone());

        session.start(CaptureMode::Photo).await.unwrap();
        let captured = session.capture().unwrap().clone();

        assert_eq!(captured.media.mime(), Some("image/png"));
        assert_eq!(captured.frame.as_ref(), Some(&captured.media));
        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(devices.active_tracks(), 0);
        assert_eq!(
            *sink.calls.lock().unwrap(),
            vec!["attach synthetic-1", "detach synthetic-1"]
        );
    }

    #[tokio::test]
    async fn photo_sessions_cannot_record() {
        let devices = Arc::new(SyntheticDevices::new());
        let mut session = session(&devices);
        session.start(CaptureMode::Photo).await.unwrap();

        assert!(session.record().is_err());
        assert_eq!(session.state(), SessionState::Streaming);
    }

    #[tokio::test]
    async fn denied_access_enters_error_then_idle() {
        let devices = Arc::new(SyntheticDevices::with_script(SyntheticScript {
            deny: true,
            ..SyntheticScript::default()
        }));
        let mut session = session(&devices);

        let err = session.start(CaptureMode::Video).await.unwrap_err();
        assert!(err.is_permission_denied());
        assert_eq!(session.state(), SessionState::Error);
        assert!(session.last_error().is_some());

        session.acknowledge_error();
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn reset_is_idempotent_from_every_state() {
        let devices = Arc::new(SyntheticDevices::new());
        let mut session = session(&devices);

        session.reset();
        session.reset();
        assert_eq!(session.state(), SessionState::Idle);

        session.start(CaptureMode::Audio).await.unwrap();
        session.reset();
        assert_eq!(devices.active_tracks(), 0);

        session.start(CaptureMode::Video).await.unwrap();
        session.record().unwrap();
        session.reset();
        session.reset();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(devices.active_tracks(), 0);

        session.start(CaptureMode::Photo).await.unwrap();
        session.capture().unwrap();
        session.reset();
        assert!(session.captured().is_none());

        devices.set_script(SyntheticScript {
            deny: true,
            ..SyntheticScript::default()
        });
        let _ = session.start(CaptureMode::Audio).await;
        session.reset();
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn new_capture_releases_previous_recording_before_requesting() {
        let devices = Arc::new(SyntheticDevices::new());
        let mut session = session(&devices);

        session.start(CaptureMode::Audio).await.unwrap();
        session.record().unwrap();
        session.start(CaptureMode::Video).await.unwrap();

        let events = devices.events();
        let released = events
            .iter()
            .position(|e| matches!(e, DeviceEvent::Released { stream_id } if stream_id == "synthetic-1"))
            .expect("audio stream released");
        let second_request = events
            .iter()
            .position(|e| matches!(e, DeviceEvent::Requested { stream_id, .. } if stream_id == "synthetic-2"))
            .expect("video stream requested");
        assert!(released < second_request);
        assert_eq!(devices.active_tracks(), 2);
        assert_eq!(session.mode(), Some(CaptureMode::Video));
    }

    #[tokio::test]
    async fn mid_recording_failure_keeps_partial_capture() {
        let devices = Arc::new(SyntheticDevices::with_script(SyntheticScript {
            chunks: vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()],
            fail_after: Some(2),
            ..SyntheticScript::default()
        }));
        let mut session = session(&devices);
        session.start(CaptureMode::Audio).await.unwrap();
        session.record().unwrap();

        assert!(session.pump());
        assert_eq!(session.state(), SessionState::Stopped);
        let captured = session.captured().unwrap();
        assert!(captured.partial);
        assert_eq!(captured.media, ArtifactRef::inline("audio/webm", b"ab".to_vec()));
        assert_eq!(devices.active_tracks(), 0);
    }

    #[tokio::test]
    async fn new_start_discards_previous_capture() {
        let devices = Arc::new(SyntheticDevices::new());
        let mut session = session(&devices);
        session.start(CaptureMode::Photo).await.unwrap();
        session.capture().unwrap();

        session.start(CaptureMode::Audio).await.unwrap();
        assert!(session.captured().is_none());
        session.record().unwrap();
        assert!(session.captured().is_none());
        session.reset();

        session.start(CaptureMode::Photo).await.unwrap();
        session.capture().unwrap();
        devices.set_script(SyntheticScript {
            deny: true,
            ..SyntheticScript::default()
        });
        let _ = session.start(CaptureMode::Video).await;
        assert!(session.captured().is_none());
        session.acknowledge_error();
        assert!(session.captured().is_none());
        assert_eq!(session.elapsed_secs(), 0);
    }

    #[tokio::test]
    async fn stop_while_streaming_drops_earlier_photo() {
        let devices = Arc::new(SyntheticDevices::new());
        let mut session = session(&devices);
        session.start(CaptureMode::Photo).await.unwrap();
        session.capture().unwrap();

        session.start(CaptureMode::Audio).await.unwrap();
        session.stop().await.unwrap();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.captured().is_none());
    }

    #[tokio::test]
    async fn failure_while_stopping_keeps_partial_capture() {
        let devices = Arc::new(SyntheticDevices::with_script(SyntheticScript {
            chunks: vec![b"a".to_vec(), b"b".to_vec()],
            fail_on_stop: true,
            ..SyntheticScript::default()
        }));
        let mut session = session(&devices);
        session.start(CaptureMode::Video).await.unwrap();
        session.record().unwrap();

        let captured = session.stop().await.unwrap().unwrap();
        assert!(captured.partial);
        assert_eq!(captured.media, ArtifactRef::inline("video/webm", b"ab".to_vec()));
        assert!(captured.frame.is_some());
        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(devices.active_tracks(), 0);
    }

    #[tokio::test]
    async fn stop_while_streaming_returns_to_idle() {
        let devices = Arc::new(SyntheticDevices::new());
        let mut session = session(&devices);
        session.start(CaptureMode::Audio).await.unwrap();

        assert!(session.stop().await.unwrap().is_none());
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(devices.active_tracks(), 0);
        assert!(session.stop().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_counter_tracks_recording_time() {
        let devices = Arc::new(SyntheticDevices::new());
        let mut session = session(&devices);
        session.start(CaptureMode::Audio).await.unwrap();
        session.record().unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(2500)).await;
        assert_eq!(session.elapsed_secs(), 2);

        let captured = session.stop().await.unwrap().unwrap();
        assert_eq!(captured.elapsed_secs, 2);
    }

    #[tokio::test]
    async fn adopt_skips_the_device() {
        let devices = Arc::new(SyntheticDevices::new());
        let mut session = session(&devices);
        session.adopt(CapturedMedia::existing(
            ArtifactRef::url("https://cdn.example.com/clip.webm"),
            None,
        ));

        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(session.mode(), None);
        assert!(session.captured().is_some());
        assert!(devices.events().is_empty());
    }

    #[tokio::test]
    async fn dropping_session_releases_device() {
        let devices = Arc::new(SyntheticDevices::new());
        {
            let mut session = session(&devices);
            session.start(CaptureMode::Video).await.unwrap();
            session.record().unwrap();
        }
        assert_eq!(devices.active_tracks(), 0);
    }
}
