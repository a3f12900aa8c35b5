//! Device capability boundary.
//!
//! The session never talks to hardware directly. It asks a [`MediaDevices`]
//! implementation for a stream, asks the stream for a recorder or a frame,
//! and listens to recorder events. Every failure on this side of the
//! boundary comes back as a `LinkcardError`.

use linkcard_card_model::ContainerKind;
use linkcard_common::error::LinkcardResult;

use crate::frame::Frame;

/// Which tracks a stream request needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamConstraints {
    pub video: bool,
    pub audio: bool,
}

impl StreamConstraints {
    pub fn track_count(&self) -> usize {
        usize::from(self.video) + usize::from(self.audio)
    }

    pub fn track_kinds(&self) -> Vec<TrackKind> {
        let mut kinds = Vec::with_capacity(2);
        if self.video {
            kinds.push(TrackKind::Video);
        }
        if self.audio {
            kinds.push(TrackKind::Audio);
        }
        kinds
    }
}

/// A live track inside a device stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Video,
    Audio,
}

/// Events emitted by a running recorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    /// A non-empty encoded segment.
    Chunk(Vec<u8>),
    /// The recorder finalized after a stop request.
    Stopped,
    /// The recorder or its stream ended unexpectedly.
    Failed(String),
}

/// Entry point for acquiring device streams.
#[async_trait::async_trait]
pub trait MediaDevices: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Ask for a stream with the given tracks. May be rejected by the
    /// platform; rejection is reported as `PermissionDenied`.
    async fn request_stream(
        &self,
        constraints: StreamConstraints,
    ) -> LinkcardResult<Box<dyn DeviceStream>>;
}

/// A granted device stream, exclusively owned by one capture session.
pub trait DeviceStream: Send {
    fn id(&self) -> &str;

    /// Tracks still running. Empty once released.
    fn active_tracks(&self) -> Vec<TrackKind>;

    /// Build a recorder consuming this stream.
    fn create_recorder(
        &mut self,
        container: ContainerKind,
    ) -> LinkcardResult<Box<dyn MediaRecorder>>;

    /// Current visual frame of the stream.
    fn grab_frame(&mut self) -> LinkcardResult<Frame>;

    /// Stop every track. Must be idempotent.
    fn release(&mut self);
}

/// Encoder attached to a device stream.
#[async_trait::async_trait]
pub trait MediaRecorder: Send {
    fn start(&mut self) -> LinkcardResult<()>;

    /// Ask the recorder to flush. Remaining chunks and then
    /// [`RecorderEvent::Stopped`] follow through the event methods.
    fn request_stop(&mut self) -> LinkcardResult<()>;

    /// Next already-available event, without waiting.
    fn try_next_event(&mut self) -> Option<RecorderEvent>;

    /// Wait for the next event.
    async fn next_event(&mut self) -> RecorderEvent;
}

/// Live preview target for visual streams.
pub trait ViewfinderSink: Send + Sync {
    fn attach(&self, stream_id: &str);
    fn detach(&self, stream_id: &str);
}
