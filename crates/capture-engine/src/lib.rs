//! LinkCard Capture Engine
//!
//! Acquires camera and microphone streams, records them into WebM
//! containers, and rasterizes still frames for photos and video thumbnails.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                CaptureSession                │
//! │   Idle → Requesting → Streaming → Recording  │
//! │                 │          │          │      │
//! │                 ▼          ▼          ▼      │
//! │   ┌──────────────────────────────────────┐   │
//! │   │  MediaDevices (gstreamer/synthetic)  │   │
//! │   │  DeviceStream · MediaRecorder        │   │
//! │   └──────────────────────────────────────┘   │
//! │                 │                            │
//! │                 ▼                            │
//! │   Rasterizer → PNG photo / JPEG frame        │
//! └──────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod device;
pub mod frame;
#[cfg(feature = "gstreamer")]
pub mod pipeline;
pub mod session;

pub use backend::get_backend;
pub use device::*;
pub use frame::{Frame, Rasterizer};
pub use session::*;
