//! Camera module — view cameras, light cameras and frustum culling.
//!
//! Cameras are owned by the caller (view camera) or by a light (shadow
//! camera). The renderer receives them explicitly on every call.

mod camera;
mod frustum;

pub use camera::{Camera, Projection};
pub use frustum::Frustum;
