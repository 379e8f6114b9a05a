/*!
# Lumen 3D Renderer

Per-frame scene renderer core: turns a scene of prefab node trees and
lights into ordered draw calls against an abstract graphics device.

## Architecture

- **Device**: the graphics capability the renderer drives (programs,
  uniforms, frame buffers, fixed-function state). `RecordingDevice` is a
  headless implementation.
- **Scene**: entities (prefab references and lights) in insertion order.
- **SceneRenderer**: traversal and culling, instruction ordering, shadow
  atlas, forward or deferred pipeline, multipass or singlepass lighting.

Everything is exposed through the `lumen3d` namespace module.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod camera;
pub mod device;
pub mod resource;
pub mod scene;
pub mod render;

// Main lumen3d namespace module
pub mod lumen3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Logger registry
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, format_entry};
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Device sub-module
    pub mod device {
        pub use crate::device::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }

    // Render sub-module
    pub mod render {
        pub use crate::render::*;
    }
}

// Re-export math library at crate root
pub use glam;
