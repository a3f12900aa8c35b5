//! GStreamer pipeline wrapper used by the GStreamer device backend.

use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use gst::prelude::*;
use gstreamer as gst;
use linkcard_common::error::{LinkcardError, LinkcardResult};

/// How long to wait for state changes and EOS propagation.
const PIPELINE_TIMEOUT: Duration = Duration::from_secs(10);

/// A launched pipeline that writes into a file sink.
pub struct GstPipeline {
    name: String,
    pipeline: gst::Pipeline,
    running: bool,
}

/// Outcome of a non-blocking bus check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusStatus {
    Running,
    Ended,
    Failed(String),
}

impl GstPipeline {
    pub fn from_launch(name: impl Into<String>, launch: &str) -> LinkcardResult<Self> {
        init_gstreamer()?;

        let element = gst::parse::launch(launch)
            .map_err(|e| LinkcardError::capture(format!("Failed to build pipeline: {e}")))?;

        let pipeline = element
            .dynamic_cast::<gst::Pipeline>()
            .map_err(|_| LinkcardError::capture("Launch string did not produce a pipeline"))?;

        Ok(Self {
            name: name.into(),
            pipeline,
            running: false,
        })
    }

    /// Bring the pipeline to Playing. Sources that cannot open their device
    /// fail here, which is reported as a permission problem.
    pub fn start(&mut self) -> LinkcardResult<()> {
        self.pipeline.set_state(gst::State::Playing).map_err(|e| {
            LinkcardError::permission_denied(format!(
                "Failed to start {} pipeline: {e:?}",
                self.name
            ))
        })?;

        match self
            .pipeline
            .state(gst::ClockTime::from_seconds(PIPELINE_TIMEOUT.as_secs()))
        {
            (Ok(_), gst::State::Playing, _) => {}
            (Ok(_), state, _) => {
                tracing::warn!(
                    pipeline = %self.name,
                    ?state,
                    "Pipeline did not reach Playing state within timeout"
                );
            }
            (Err(e), _, _) => {
                self.pipeline.set_state(gst::State::Null).ok();
                return Err(LinkcardError::permission_denied(format!(
                    "{} pipeline failed to reach Playing state: {e:?}",
                    self.name
                )));
            }
        }

        self.running = true;
        Ok(())
    }

    /// Check the bus for errors or end-of-stream without blocking.
    pub fn poll_bus(&self) -> BusStatus {
        let Some(bus) = self.pipeline.bus() else {
            return BusStatus::Running;
        };
        match bus.timed_pop_filtered(
            gst::ClockTime::ZERO,
            &[gst::MessageType::Error, gst::MessageType::Eos],
        ) {
            Some(msg) => match msg.view() {
                gst::MessageView::Error(e) => BusStatus::Failed(e.error().to_string()),
                _ => BusStatus::Ended,
            },
            None => BusStatus::Running,
        }
    }

    /// Send EOS so muxers can finalize, wait for it to drain, then shut down.
    pub fn finish(&mut self) -> LinkcardResult<()> {
        if self.running && self.pipeline.send_event(gst::event::Eos::new()) {
            self.wait_for_eos();
        } else if self.running {
            tracing::warn!(pipeline = %self.name, "Failed to send EOS event; output may be truncated");
        }
        self.shutdown()
    }

    /// Wait for a source that ends by itself (e.g. `num-buffers`), then shut down.
    pub fn run_to_completion(&mut self) -> LinkcardResult<()> {
        self.wait_for_eos();
        self.shutdown()
    }

    pub fn shutdown(&mut self) -> LinkcardResult<()> {
        self.pipeline.set_state(gst::State::Null).map_err(|e| {
            LinkcardError::capture(format!("Failed to stop {} pipeline: {e:?}", self.name))
        })?;
        self.running = false;
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn wait_for_eos(&self) {
        let Some(bus) = self.pipeline.bus() else {
            return;
        };
        let start = std::time::Instant::now();
        loop {
            let elapsed = start.elapsed();
            if elapsed >= PIPELINE_TIMEOUT {
                tracing::warn!(pipeline = %self.name, "EOS drain timed out");
                break;
            }
            let remaining = PIPELINE_TIMEOUT - elapsed;
            match bus.timed_pop(gst::ClockTime::from_nseconds(remaining.as_nanos() as u64)) {
                Some(msg) => match msg.view() {
                    gst::MessageView::Eos(_) => {
                        tracing::debug!(pipeline = %self.name, "EOS received; pipeline drained");
                        break;
                    }
                    gst::MessageView::Error(e) => {
                        tracing::warn!(
                            pipeline = %self.name,
                            error = %e.error(),
                            "Pipeline error during EOS drain"
                        );
                        break;
                    }
                    _ => {}
                },
                None => {
                    tracing::warn!(pipeline = %self.name, "EOS drain timed out");
                    break;
                }
            }
        }
    }
}

impl Drop for GstPipeline {
    fn drop(&mut self) {
        if self.running {
            self.pipeline.set_state(gst::State::Null).ok();
        }
    }
}

/// Recorder launch line for a WebM container.
pub fn recorder_launch(video: bool, audio: bool, output_path: &Path) -> String {
    let path = escape_path(output_path);
    let video_branch = "autovideosrc ! videoconvert ! queue ! vp8enc deadline=1 ! queue ! mux.";
    let audio_branch =
        "autoaudiosrc ! audioconvert ! audioresample ! queue ! opusenc ! queue ! mux.";

    let mut launch = format!("webmmux name=mux ! filesink location=\"{path}\"");
    if video {
        launch.push(' ');
        launch.push_str(video_branch);
    }
    if audio {
        launch.push(' ');
        launch.push_str(audio_branch);
    }
    launch
}

/// Launch line grabbing a single scaled RGBA frame into a file.
pub fn frame_launch(width: u32, height: u32, output_path: &Path) -> String {
    let path = escape_path(output_path);
    format!(
        "autovideosrc num-buffers=1 ! videoconvert ! videoscale ! video/x-raw,format=RGBA,width={width},height={height} ! filesink location=\"{path}\""
    )
}

/// Launch line used to check that a device can be opened.
pub fn probe_launch(video: bool) -> &'static str {
    if video {
        "autovideosrc num-buffers=1 ! fakesink"
    } else {
        "autoaudiosrc num-buffers=1 ! fakesink"
    }
}

fn init_gstreamer() -> LinkcardResult<()> {
    static GST_INIT: OnceLock<Result<(), String>> = OnceLock::new();
    let init_res = GST_INIT.get_or_init(|| gst::init().map_err(|e| e.to_string()));
    match init_res {
        Ok(()) => Ok(()),
        Err(e) => Err(LinkcardError::capture(format!(
            "Failed to initialize GStreamer: {e}"
        ))),
    }
}

fn escape_path(path: &Path) -> String {
    path.to_string_lossy().replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_recorder_has_no_video_branch() {
        let launch = recorder_launch(false, true, Path::new("/tmp/a.webm"));
        assert!(launch.contains("opusenc"));
        assert!(!launch.contains("autovideosrc"));
        assert!(launch.starts_with("webmmux name=mux"));
    }

    #[test]
    fn paths_are_quoted() {
        let launch = frame_launch(640, 480, Path::new("/tmp/we\"ird.rgba"));
        assert!(launch.contains("location=\"/tmp/we\\\"ird.rgba\""));
        assert!(launch.contains("width=640,height=480"));
    }
}
