//! Scriptable in-process devices.
//!
//! Used by tests and by the CLI's `--synthetic` mode. Every device
//! interaction is appended to a shared log so callers can assert ordering
//! (for example that a stream was released before the next request).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use linkcard_card_model::ContainerKind;
use linkcard_common::error::{LinkcardError, LinkcardResult};

use crate::device::{
    DeviceStream, MediaDevices, MediaRecorder, RecorderEvent, StreamConstraints, TrackKind,
};
use crate::frame::Frame;

/// Behaviour of the synthetic devices.
#[derive(Debug, Clone)]
pub struct SyntheticScript {
    /// Reject every stream request.
    pub deny: bool,
    /// Chunks each recorder emits.
    pub chunks: Vec<Vec<u8>>,
    /// Fail after emitting this many chunks instead of waiting for stop.
    pub fail_after: Option<usize>,
    /// End with a failure instead of a clean stop once stop is requested.
    pub fail_on_stop: bool,
    pub frame_width: u32,
    pub frame_height: u32,
}

impl Default for SyntheticScript {
    fn default() -> Self {
        Self {
            deny: false,
            chunks: vec![b"chunk-0".to_vec(), b"chunk-1".to_vec()],
            fail_after: None,
            fail_on_stop: false,
            frame_width: 64,
            frame_height: 48,
        }
    }
}

/// One logged device interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    Requested {
        stream_id: String,
        constraints: StreamConstraints,
    },
    Denied {
        constraints: StreamConstraints,
    },
    RecorderStarted {
        stream_id: String,
        container: ContainerKind,
    },
    RecorderStopRequested {
        stream_id: String,
    },
    FrameGrabbed {
        stream_id: String,
    },
    Released {
        stream_id: String,
    },
}

type DeviceLog = Arc<Mutex<Vec<DeviceEvent>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Device provider backed by a [`SyntheticScript`].
#[derive(Debug, Default)]
pub struct SyntheticDevices {
    script: Mutex<SyntheticScript>,
    log: DeviceLog,
    live_tracks: Arc<AtomicUsize>,
    next_id: AtomicUsize,
}

impl SyntheticDevices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(script: SyntheticScript) -> Self {
        Self {
            script: Mutex::new(script),
            ..Self::default()
        }
    }

    /// Replace the script for subsequent requests.
    pub fn set_script(&self, script: SyntheticScript) {
        *lock(&self.script) = script;
    }

    /// Everything that happened so far, in order.
    pub fn events(&self) -> Vec<DeviceEvent> {
        lock(&self.log).clone()
    }

    /// Tracks acquired and not yet released, across all streams.
    pub fn active_tracks(&self) -> usize {
        self.live_tracks.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl MediaDevices for SyntheticDevices {
    fn name(&self) -> &str {
        "synthetic"
    }

    async fn request_stream(
        &self,
        constraints: StreamConstraints,
    ) -> LinkcardResult<Box<dyn DeviceStream>> {
        let script = lock(&self.script).clone();
        if script.deny {
            lock(&self.log).push(DeviceEvent::Denied { constraints });
            return Err(LinkcardError::permission_denied(
                "Camera or microphone access was denied",
            ));
        }

        let id = format!(
            "synthetic-{}",
            self.next_id.fetch_add(1, Ordering::SeqCst) + 1
        );
        self.live_tracks
            .fetch_add(constraints.track_count(), Ordering::SeqCst);
        lock(&self.log).push(DeviceEvent::Requested {
            stream_id: id.clone(),
            constraints,
        });

        Ok(Box::new(SyntheticStream {
            id,
            tracks: constraints.track_kinds(),
            released: false,
            script,
            log: self.log.clone(),
            live_tracks: self.live_tracks.clone(),
        }))
    }
}

struct SyntheticStream {
    id: String,
    tracks: Vec<TrackKind>,
    released: bool,
    script: SyntheticScript,
    log: DeviceLog,
    live_tracks: Arc<AtomicUsize>,
}

impl DeviceStream for SyntheticStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn active_tracks(&self) -> Vec<TrackKind> {
        if self.released {
            Vec::new()
        } else {
            self.tracks.clone()
        }
    }

    fn create_recorder(
        &mut self,
        container: ContainerKind,
    ) -> LinkcardResult<Box<dyn MediaRecorder>> {
        if self.released {
            return Err(LinkcardError::capture("Stream already released"));
        }
        Ok(Box::new(SyntheticRecorder {
            stream_id: self.id.clone(),
            container,
            script: self.script.clone(),
            pending: VecDeque::new(),
            stop_requested: false,
            finished: false,
            log: self.log.clone(),
        }))
    }

    fn grab_frame(&mut self) -> LinkcardResult<Frame> {
        if self.released || !self.tracks.contains(&TrackKind::Video) {
            return Err(LinkcardError::capture("No live video track to rasterize"));
        }
        lock(&self.log).push(DeviceEvent::FrameGrabbed {
            stream_id: self.id.clone(),
        });
        Ok(Frame::solid(
            self.script.frame_width,
            self.script.frame_height,
            [0x0f, 0x17, 0x2a, 0xff],
        ))
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.live_tracks
            .fetch_sub(self.tracks.len(), Ordering::SeqCst);
        lock(&self.log).push(DeviceEvent::Released {
            stream_id: self.id.clone(),
        });
    }
}

struct SyntheticRecorder {
    stream_id: String,
    container: ContainerKind,
    script: SyntheticScript,
    pending: VecDeque<RecorderEvent>,
    stop_requested: bool,
    finished: bool,
    log: DeviceLog,
}

#[async_trait::async_trait]
impl MediaRecorder for SyntheticRecorder {
    fn start(&mut self) -> LinkcardResult<()> {
        let emitted = self
            .script
            .fail_after
            .unwrap_or(self.script.chunks.len())
            .min(self.script.chunks.len());
        self.pending.extend(
            self.script.chunks[..emitted]
                .iter()
                .cloned()
                .map(RecorderEvent::Chunk),
        );
        if self.script.fail_after.is_some() {
            self.pending
                .push_back(RecorderEvent::Failed("Synthetic device disconnected".into()));
        }

        lock(&self.log).push(DeviceEvent::RecorderStarted {
            stream_id: self.stream_id.clone(),
            container: self.container,
        });
        Ok(())
    }

    fn request_stop(&mut self) -> LinkcardResult<()> {
        if !self.stop_requested {
            self.stop_requested = true;
            lock(&self.log).push(DeviceEvent::RecorderStopRequested {
                stream_id: self.stream_id.clone(),
            });
        }
        Ok(())
    }

    fn try_next_event(&mut self) -> Option<RecorderEvent> {
        if self.finished {
            return None;
        }
        let event = match self.pending.pop_front() {
            Some(event) => event,
            None if self.stop_requested && self.script.fail_on_stop => {
                RecorderEvent::Failed("Synthetic device failed while stopping".into())
            }
            None if self.stop_requested => RecorderEvent::Stopped,
            None => return None,
        };
        if matches!(event, RecorderEvent::Stopped | RecorderEvent::Failed(_)) {
            self.finished = true;
        }
        Some(event)
    }

    async fn next_event(&mut self) -> RecorderEvent {
        self.try_next_event().unwrap_or_else(|| {
            RecorderEvent::Failed("Synthetic recorder has nothing left to emit".into())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn release_is_idempotent() {
        let devices = SyntheticDevices::new();
        let mut stream = devices
            .request_stream(StreamConstraints {
                video: true,
                audio: true,
            })
            .await
            .unwrap();
        assert_eq!(devices.active_tracks(), 2);

        stream.release();
        stream.release();
        assert_eq!(devices.active_tracks(), 0);
        assert!(stream.active_tracks().is_empty());
        assert_eq!(
            devices
                .events()
                .iter()
                .filter(|e| matches!(e, DeviceEvent::Released { .. }))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn recorder_emits_chunks_then_stop() {
        let devices = SyntheticDevices::new();
        let mut stream = devices
            .request_stream(StreamConstraints {
                video: false,
                audio: true,
            })
            .await
            .unwrap();
        let mut recorder = stream.create_recorder(ContainerKind::AudioWebm).unwrap();
        recorder.start().unwrap();

        assert_eq!(
            recorder.try_next_event(),
            Some(RecorderEvent::Chunk(b"chunk-0".to_vec()))
        );
        assert_eq!(
            recorder.try_next_event(),
            Some(RecorderEvent::Chunk(b"chunk-1".to_vec()))
        );
        assert_eq!(recorder.try_next_event(), None);

        recorder.request_stop().unwrap();
        assert_eq!(recorder.next_event().await, RecorderEvent::Stopped);
        assert_eq!(recorder.try_next_event(), None);
    }

    #[tokio::test]
    async fn audio_stream_has_no_frames() {
        let devices = SyntheticDevices::new();
        let mut stream = devices
            .request_stream(StreamConstraints {
                video: false,
                audio: true,
            })
            .await
            .unwrap();
        assert!(stream.grab_frame().is_err());
    }
}
