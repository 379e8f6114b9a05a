/// Device trait - the graphics capability the renderer drives.
///
/// A device owns programs, textures and frame buffers and executes state
/// changes and draws immediately. The renderer never talks to a graphics
/// API directly; everything goes through this trait.
///
/// Programs are addressed by name. Uniforms are set by name on the
/// currently enabled program; a program silently ignores uniforms it does
/// not declare.

use glam::Vec4;
use crate::error::Result;
use crate::resource::Mesh;
use super::types::{
    BlendFunc, ClearFlags, DepthFunc, FrameBufferDesc, FrameBufferHandle,
    Placeholder, Rect, TextureHandle, UniformValue,
};

pub trait Device: Send + Sync {
    // ===== WINDOW & CLEARING =====

    /// Size of the default (window) frame buffer in pixels
    fn window_size(&self) -> (u32, u32);

    fn set_clear_color(&mut self, color: Vec4) -> Result<()>;

    /// Clear the bound frame buffer
    fn clear(&mut self, flags: ClearFlags) -> Result<()>;

    /// Clear a single color attachment of the bound frame buffer
    fn clear_color_attachment(&mut self, index: u32, color: Vec4) -> Result<()>;

    fn set_viewport(&mut self, rect: Rect) -> Result<()>;

    // ===== FRAME BUFFERS =====

    fn create_frame_buffer(&mut self, desc: &FrameBufferDesc) -> Result<FrameBufferHandle>;

    fn destroy_frame_buffer(&mut self, frame_buffer: FrameBufferHandle) -> Result<()>;

    fn bind_frame_buffer(&mut self, frame_buffer: FrameBufferHandle) -> Result<()>;

    /// Return to the window frame buffer
    fn unbind_frame_buffer(&mut self) -> Result<()>;

    /// Select which color attachments of the bound frame buffer are written
    fn set_draw_buffers(&mut self, attachments: &[u32]) -> Result<()>;

    fn color_texture(&self, frame_buffer: FrameBufferHandle, index: u32) -> Option<TextureHandle>;

    fn depth_texture(&self, frame_buffer: FrameBufferHandle) -> Option<TextureHandle>;

    fn placeholder_texture(&self, kind: Placeholder) -> TextureHandle;

    // ===== RENDER STATE =====

    fn set_blend_enabled(&mut self, enabled: bool) -> Result<()>;

    fn set_blend_func(&mut self, func: BlendFunc) -> Result<()>;

    fn set_depth_func(&mut self, func: DepthFunc) -> Result<()>;

    fn set_depth_test(&mut self, enabled: bool) -> Result<()>;

    /// Enable or disable backface culling
    fn set_cull_face(&mut self, enabled: bool) -> Result<()>;

    // ===== PROGRAMS & DRAWS =====

    /// Enable a program by name. `Ok(false)` if the program does not exist.
    fn enable_program(&mut self, name: &str) -> Result<bool>;

    fn disable_program(&mut self) -> Result<()>;

    fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<()>;

    /// Draw a mesh's triangles with the enabled program
    fn draw_mesh(&mut self, mesh: &Mesh) -> Result<()>;

    /// Draw a quad covering the current viewport
    fn draw_fullscreen_quad(&mut self) -> Result<()>;

    /// Invariant check used by `debug_assert!` before draws
    fn is_state_valid(&self) -> bool {
        true
    }
}
