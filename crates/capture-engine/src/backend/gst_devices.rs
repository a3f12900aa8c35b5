//! GStreamer-backed camera and microphone access.
//!
//! Device "permission" maps onto whether the auto sources can be opened.
//! Recorders write WebM into a temporary file and hand the whole file over
//! as a single chunk once the muxer has been drained.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use linkcard_card_model::ContainerKind;
use linkcard_common::config::CaptureSettings;
use linkcard_common::error::{LinkcardError, LinkcardResult};

use crate::device::{
    DeviceStream, MediaDevices, MediaRecorder, RecorderEvent, StreamConstraints, TrackKind,
};
use crate::frame::Frame;
use crate::pipeline::{frame_launch, probe_launch, recorder_launch, BusStatus, GstPipeline};

const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(50);

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::SeqCst)
}

fn scratch_path(stream_id: &str, extension: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "linkcard-{}-{stream_id}-{}.{extension}",
        std::process::id(),
        next_id()
    ))
}

/// Camera and microphone through `autovideosrc` / `autoaudiosrc`.
pub struct GstDevices {
    frame_width: u32,
    frame_height: u32,
}

impl GstDevices {
    pub fn new(settings: &CaptureSettings) -> Self {
        Self {
            frame_width: settings.fallback_frame_width.max(1),
            frame_height: settings.fallback_frame_height.max(1),
        }
    }
}

#[async_trait::async_trait]
impl MediaDevices for GstDevices {
    fn name(&self) -> &str {
        "gstreamer"
    }

    async fn request_stream(
        &self,
        constraints: StreamConstraints,
    ) -> LinkcardResult<Box<dyn DeviceStream>> {
        let probe = tokio::task::spawn_blocking(move || -> LinkcardResult<()> {
            for kind in constraints.track_kinds() {
                let video = kind == TrackKind::Video;
                let mut pipeline = GstPipeline::from_launch("probe", probe_launch(video))?;
                pipeline.start()?;
                pipeline.run_to_completion()?;
            }
            Ok(())
        })
        .await
        .map_err(|e| LinkcardError::capture(format!("Device probe task failed: {e}")))?;

        if let Err(e) = probe {
            return Err(LinkcardError::permission_denied(match e {
                LinkcardError::PermissionDenied { message } => message,
                other => other.to_string(),
            }));
        }

        let id = format!("gst-{}", next_id());
        tracing::debug!(stream = %id, ?constraints, "GStreamer devices opened");
        Ok(Box::new(GstStream {
            id,
            constraints,
            released: false,
            frame_width: self.frame_width,
            frame_height: self.frame_height,
        }))
    }
}

struct GstStream {
    id: String,
    constraints: StreamConstraints,
    released: bool,
    frame_width: u32,
    frame_height: u32,
}

impl DeviceStream for GstStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn active_tracks(&self) -> Vec<TrackKind> {
        if self.released {
            Vec::new()
        } else {
            self.constraints.track_kinds()
        }
    }

    fn create_recorder(
        &mut self,
        container: ContainerKind,
    ) -> LinkcardResult<Box<dyn MediaRecorder>> {
        if self.released {
            return Err(LinkcardError::capture("Stream already released"));
        }
        if !matches!(container, ContainerKind::VideoWebm | ContainerKind::AudioWebm) {
            return Err(LinkcardError::unsupported(format!(
                "{} is not a recording container",
                container.mime()
            )));
        }

        let output = scratch_path(&self.id, "webm");
        let launch = recorder_launch(
            self.constraints.video && container == ContainerKind::VideoWebm,
            self.constraints.audio,
            &output,
        );
        let pipeline = GstPipeline::from_launch(format!("{}-recorder", self.id), &launch)?;
        Ok(Box::new(GstRecorder {
            pipeline,
            output,
            pending: VecDeque::new(),
            finished: false,
        }))
    }

    fn grab_frame(&mut self) -> LinkcardResult<Frame> {
        if self.released || !self.constraints.video {
            return Err(LinkcardError::capture("No live video track to rasterize"));
        }

        let output = scratch_path(&self.id, "rgba");
        let result = (|| -> LinkcardResult<Frame> {
            let launch = frame_launch(self.frame_width, self.frame_height, &output);
            let mut pipeline = GstPipeline::from_launch(format!("{}-frame", self.id), &launch)?;
            pipeline.start()?;
            pipeline.run_to_completion()?;
            let rgba = std::fs::read(&output)?;
            Ok(Frame::new(self.frame_width, self.frame_height, rgba))
        })();
        let _ = std::fs::remove_file(&output);
        result
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            tracing::debug!(stream = %self.id, "GStreamer stream released");
        }
    }
}

struct GstRecorder {
    pipeline: GstPipeline,
    output: PathBuf,
    pending: VecDeque<RecorderEvent>,
    finished: bool,
}

impl GstRecorder {
    /// Queue whatever the muxer wrote, then the terminal event.
    fn collect(&mut self, terminal: RecorderEvent) {
        match std::fs::read(&self.output) {
            Ok(bytes) if !bytes.is_empty() => self.pending.push_back(RecorderEvent::Chunk(bytes)),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(path = %self.output.display(), error = %e, "Recorder output unreadable");
            }
        }
        let _ = std::fs::remove_file(&self.output);
        self.pending.push_back(terminal);
        self.finished = true;
    }
}

#[async_trait::async_trait]
impl MediaRecorder for GstRecorder {
    fn start(&mut self) -> LinkcardResult<()> {
        self.pipeline.start()
    }

    fn request_stop(&mut self) -> LinkcardResult<()> {
        if self.finished {
            return Ok(());
        }
        let terminal = match self.pipeline.finish() {
            Ok(()) => RecorderEvent::Stopped,
            Err(e) => RecorderEvent::Failed(e.to_string()),
        };
        self.collect(terminal);
        Ok(())
    }

    fn try_next_event(&mut self) -> Option<RecorderEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        if self.finished {
            return None;
        }
        match self.pipeline.poll_bus() {
            BusStatus::Running => None,
            BusStatus::Ended => {
                let _ = self.pipeline.shutdown();
                self.collect(RecorderEvent::Failed("Device stream ended".into()));
                self.pending.pop_front()
            }
            BusStatus::Failed(reason) => {
                let _ = self.pipeline.shutdown();
                self.collect(RecorderEvent::Failed(reason));
                self.pending.pop_front()
            }
        }
    }

    async fn next_event(&mut self) -> RecorderEvent {
        loop {
            if let Some(event) = self.try_next_event() {
                return event;
            }
            if self.finished {
                return RecorderEvent::Failed("Recorder has no further events".into());
            }
            tokio::time::sleep(EVENT_POLL_INTERVAL).await;
        }
    }
}

impl Drop for GstRecorder {
    fn drop(&mut self) {
        if self.pipeline.is_running() {
            let _ = self.pipeline.shutdown();
        }
        let _ = std::fs::remove_file(&self.output);
    }
}
