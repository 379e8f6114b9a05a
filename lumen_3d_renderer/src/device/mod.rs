//! Device module
//!
//! The graphics capability the renderer drives: named programs with
//! uniforms, mesh and full-screen draws, frame buffers and fixed-function
//! state. `RecordingDevice` is a headless implementation that records
//! every call.

mod device;
mod recording_device;
mod types;

pub use device::Device;
pub use recording_device::{DeviceCommand, DrawRecord, RecordingDevice};
pub use types::{
    BlendFactor, BlendFunc, ClearFlags, DepthFunc, FrameBufferDesc,
    FrameBufferHandle, Placeholder, Rect, TextureFormat, TextureHandle,
    UniformValue,
};
