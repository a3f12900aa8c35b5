//! Device backends.

use std::sync::Arc;

use linkcard_common::config::CaptureSettings;

use crate::device::MediaDevices;

#[cfg(feature = "gstreamer")]
pub mod gst_devices;
pub mod synthetic;

#[cfg(feature = "gstreamer")]
pub use gst_devices::GstDevices;
pub use synthetic::{DeviceEvent, SyntheticDevices, SyntheticScript};

/// Pick the device backend for this build.
///
/// Without the `gstreamer` feature the synthetic backend is the only one
/// available, so asking for real devices falls back to it with a warning.
pub fn get_backend(settings: &CaptureSettings, synthetic: bool) -> Arc<dyn MediaDevices> {
    if synthetic {
        Arc::new(SyntheticDevices::new())
    } else {
        hardware_backend(settings)
    }
}

#[cfg(feature = "gstreamer")]
fn hardware_backend(settings: &CaptureSettings) -> Arc<dyn MediaDevices> {
    Arc::new(GstDevices::new(settings))
}

#[cfg(not(feature = "gstreamer"))]
fn hardware_backend(_settings: &CaptureSettings) -> Arc<dyn MediaDevices> {
    tracing::warn!("Built without GStreamer support; using synthetic devices");
    Arc::new(SyntheticDevices::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_flag_always_wins() {
        let backend = get_backend(&CaptureSettings::default(), true);
        assert_eq!(backend.name(), "synthetic");
    }

    #[cfg(not(feature = "gstreamer"))]
    #[test]
    fn falls_back_without_gstreamer() {
        let backend = get_backend(&CaptureSettings::default(), false);
        assert_eq!(backend.name(), "synthetic");
    }
}
