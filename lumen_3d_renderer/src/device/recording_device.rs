/// Recording Device - headless Device implementation (no GPU required)
///
/// Executes nothing; instead it tracks the state a real device would hold
/// (bound program, per-program uniforms, blend/depth/cull state, viewport,
/// frame buffers) and records every call. Each draw captures a snapshot of
/// that state so tests and tools can inspect exactly what a frame did.

use glam::Vec4;
use rustc_hash::{FxHashMap, FxHashSet};
use crate::error::{Error, Result};
use crate::resource::Mesh;
use crate::engine_bail;
use super::device::Device;
use super::types::{
    BlendFunc, ClearFlags, DepthFunc, FrameBufferDesc, FrameBufferHandle,
    Placeholder, Rect, TextureHandle, UniformValue,
};

const WHITE_TEXTURE: TextureHandle = TextureHandle(0);
const BLACK_TEXTURE: TextureHandle = TextureHandle(1);

// ============================================================================
// Recorded data
// ============================================================================

/// One call made against the device
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    SetClearColor(Vec4),
    Clear(ClearFlags),
    ClearColorAttachment { index: u32, color: Vec4 },
    SetViewport(Rect),
    CreateFrameBuffer { handle: FrameBufferHandle, desc: FrameBufferDesc },
    DestroyFrameBuffer(FrameBufferHandle),
    BindFrameBuffer(FrameBufferHandle),
    UnbindFrameBuffer,
    SetDrawBuffers(Vec<u32>),
    SetBlendEnabled(bool),
    SetBlendFunc(BlendFunc),
    SetDepthFunc(DepthFunc),
    SetDepthTest(bool),
    SetCullFace(bool),
    EnableProgram(String),
    DisableProgram,
    SetUniform { name: String, value: UniformValue },
    DrawMesh(String),
    DrawFullscreenQuad,
}

/// Device state captured at a draw call
#[derive(Debug, Clone)]
pub struct DrawRecord {
    pub program: String,
    /// Mesh name, `None` for full-screen quads
    pub mesh: Option<String>,
    /// Every uniform the program holds at draw time
    pub uniforms: FxHashMap<String, UniformValue>,
    pub blend_enabled: bool,
    pub blend_func: BlendFunc,
    pub depth_func: DepthFunc,
    pub depth_test: bool,
    pub cull_face: bool,
    pub viewport: Rect,
    pub frame_buffer: Option<FrameBufferHandle>,
    pub draw_buffers: Vec<u32>,
}

impl DrawRecord {
    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }
}

struct FrameBufferRecord {
    desc: FrameBufferDesc,
    color_textures: Vec<TextureHandle>,
    depth_texture: Option<TextureHandle>,
}

// ============================================================================
// Recording Device
// ============================================================================

pub struct RecordingDevice {
    window_size: (u32, u32),
    commands: Vec<DeviceCommand>,
    draws: Vec<DrawRecord>,
    missing_programs: FxHashSet<String>,
    program_uniforms: FxHashMap<String, FxHashMap<String, UniformValue>>,
    current_program: Option<String>,
    frame_buffers: FxHashMap<FrameBufferHandle, FrameBufferRecord>,
    next_frame_buffer: u32,
    next_texture: u32,
    bound_frame_buffer: Option<FrameBufferHandle>,
    draw_buffers: Vec<u32>,
    clear_color: Vec4,
    viewport: Rect,
    blend_enabled: bool,
    blend_func: BlendFunc,
    depth_func: DepthFunc,
    depth_test: bool,
    cull_face: bool,
    poisoned: bool,
}

impl RecordingDevice {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            window_size: (width, height),
            commands: Vec::new(),
            draws: Vec::new(),
            missing_programs: FxHashSet::default(),
            program_uniforms: FxHashMap::default(),
            current_program: None,
            frame_buffers: FxHashMap::default(),
            next_frame_buffer: 1,
            // 0 and 1 are the placeholders
            next_texture: 2,
            bound_frame_buffer: None,
            draw_buffers: vec![0],
            clear_color: Vec4::ZERO,
            viewport: Rect::from_size(width, height),
            blend_enabled: false,
            blend_func: BlendFunc::ALPHA_OVER,
            depth_func: DepthFunc::Less,
            depth_test: true,
            cull_face: true,
            poisoned: false,
        }
    }

    // ===== TEST CONTROLS =====

    /// Simulate a window resize
    pub fn resize(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    /// Make `enable_program(name)` report the program as missing
    pub fn remove_program(&mut self, name: &str) {
        self.missing_programs.insert(name.to_string());
    }

    /// Force `is_state_valid` to fail
    pub fn poison(&mut self) {
        self.poisoned = true;
    }

    /// Forget recorded commands and draws; device state is kept
    pub fn clear_log(&mut self) {
        self.commands.clear();
        self.draws.clear();
    }

    // ===== INSPECTION =====

    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    pub fn draw_count(&self) -> usize {
        self.draws.len()
    }

    /// Draws made with a given program, in call order
    pub fn draws_with_program<'a>(&'a self, program: &'a str) -> impl Iterator<Item = &'a DrawRecord> + 'a {
        self.draws.iter().filter(move |d| d.program == program)
    }

    pub fn frame_buffer_count(&self) -> usize {
        self.frame_buffers.len()
    }

    pub fn frame_buffer_desc(&self, frame_buffer: FrameBufferHandle) -> Option<&FrameBufferDesc> {
        self.frame_buffers.get(&frame_buffer).map(|fb| &fb.desc)
    }

    pub fn bound_frame_buffer(&self) -> Option<FrameBufferHandle> {
        self.bound_frame_buffer
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn clear_color(&self) -> Vec4 {
        self.clear_color
    }

    pub fn blend_enabled(&self) -> bool {
        self.blend_enabled
    }

    pub fn blend_func(&self) -> BlendFunc {
        self.blend_func
    }

    pub fn cull_face(&self) -> bool {
        self.cull_face
    }

    pub fn depth_func(&self) -> DepthFunc {
        self.depth_func
    }

    pub fn current_program(&self) -> Option<&str> {
        self.current_program.as_deref()
    }

    /// Current value of a program's uniform
    pub fn uniform(&self, program: &str, name: &str) -> Option<&UniformValue> {
        self.program_uniforms.get(program)?.get(name)
    }

    fn record_draw(&mut self, mesh: Option<String>) -> Result<()> {
        let program = match &self.current_program {
            Some(program) => program.clone(),
            None => return Err(Error::InvalidState("draw without an enabled program".to_string())),
        };
        let uniforms = self.program_uniforms.get(&program).cloned().unwrap_or_default();
        self.draws.push(DrawRecord {
            program,
            mesh,
            uniforms,
            blend_enabled: self.blend_enabled,
            blend_func: self.blend_func,
            depth_func: self.depth_func,
            depth_test: self.depth_test,
            cull_face: self.cull_face,
            viewport: self.viewport,
            frame_buffer: self.bound_frame_buffer,
            draw_buffers: self.draw_buffers.clone(),
        });
        Ok(())
    }
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

impl Device for RecordingDevice {
    fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    fn set_clear_color(&mut self, color: Vec4) -> Result<()> {
        self.clear_color = color;
        self.commands.push(DeviceCommand::SetClearColor(color));
        Ok(())
    }

    fn clear(&mut self, flags: ClearFlags) -> Result<()> {
        self.commands.push(DeviceCommand::Clear(flags));
        Ok(())
    }

    fn clear_color_attachment(&mut self, index: u32, color: Vec4) -> Result<()> {
        let Some(fb) = self.bound_frame_buffer else {
            engine_bail!("lumen3d::RecordingDevice", "clear_color_attachment({}) with no frame buffer bound", index);
        };
        let attachments = self.frame_buffers.get(&fb).map(|r| r.desc.color_attachments).unwrap_or(0);
        if index >= attachments {
            engine_bail!("lumen3d::RecordingDevice", "Color attachment {} out of range ({} attachments)", index, attachments);
        }
        self.commands.push(DeviceCommand::ClearColorAttachment { index, color });
        Ok(())
    }

    fn set_viewport(&mut self, rect: Rect) -> Result<()> {
        self.viewport = rect;
        self.commands.push(DeviceCommand::SetViewport(rect));
        Ok(())
    }

    fn create_frame_buffer(&mut self, desc: &FrameBufferDesc) -> Result<FrameBufferHandle> {
        if desc.width == 0 || desc.height == 0 {
            engine_bail!("lumen3d::RecordingDevice", "Cannot create a {}x{} frame buffer", desc.width, desc.height);
        }
        let handle = FrameBufferHandle(self.next_frame_buffer);
        self.next_frame_buffer += 1;

        let mut color_textures = Vec::with_capacity(desc.color_attachments as usize);
        for _ in 0..desc.color_attachments {
            color_textures.push(TextureHandle(self.next_texture));
            self.next_texture += 1;
        }
        let depth_texture = if desc.depth {
            let texture = TextureHandle(self.next_texture);
            self.next_texture += 1;
            Some(texture)
        } else {
            None
        };

        self.frame_buffers.insert(handle, FrameBufferRecord { desc: *desc, color_textures, depth_texture });
        self.commands.push(DeviceCommand::CreateFrameBuffer { handle, desc: *desc });
        Ok(handle)
    }

    fn destroy_frame_buffer(&mut self, frame_buffer: FrameBufferHandle) -> Result<()> {
        if self.frame_buffers.remove(&frame_buffer).is_none() {
            engine_bail!("lumen3d::RecordingDevice", "Unknown frame buffer {:?}", frame_buffer);
        }
        if self.bound_frame_buffer == Some(frame_buffer) {
            self.bound_frame_buffer = None;
        }
        self.commands.push(DeviceCommand::DestroyFrameBuffer(frame_buffer));
        Ok(())
    }

    fn bind_frame_buffer(&mut self, frame_buffer: FrameBufferHandle) -> Result<()> {
        if !self.frame_buffers.contains_key(&frame_buffer) {
            engine_bail!("lumen3d::RecordingDevice", "Unknown frame buffer {:?}", frame_buffer);
        }
        self.bound_frame_buffer = Some(frame_buffer);
        self.draw_buffers = vec![0];
        self.commands.push(DeviceCommand::BindFrameBuffer(frame_buffer));
        Ok(())
    }

    fn unbind_frame_buffer(&mut self) -> Result<()> {
        self.bound_frame_buffer = None;
        self.draw_buffers = vec![0];
        self.commands.push(DeviceCommand::UnbindFrameBuffer);
        Ok(())
    }

    fn set_draw_buffers(&mut self, attachments: &[u32]) -> Result<()> {
        self.draw_buffers = attachments.to_vec();
        self.commands.push(DeviceCommand::SetDrawBuffers(attachments.to_vec()));
        Ok(())
    }

    fn color_texture(&self, frame_buffer: FrameBufferHandle, index: u32) -> Option<TextureHandle> {
        self.frame_buffers.get(&frame_buffer)?.color_textures.get(index as usize).copied()
    }

    fn depth_texture(&self, frame_buffer: FrameBufferHandle) -> Option<TextureHandle> {
        self.frame_buffers.get(&frame_buffer)?.depth_texture
    }

    fn placeholder_texture(&self, kind: Placeholder) -> TextureHandle {
        match kind {
            Placeholder::White => WHITE_TEXTURE,
            Placeholder::Black => BLACK_TEXTURE,
        }
    }

    fn set_blend_enabled(&mut self, enabled: bool) -> Result<()> {
        self.blend_enabled = enabled;
        self.commands.push(DeviceCommand::SetBlendEnabled(enabled));
        Ok(())
    }

    fn set_blend_func(&mut self, func: BlendFunc) -> Result<()> {
        self.blend_func = func;
        self.commands.push(DeviceCommand::SetBlendFunc(func));
        Ok(())
    }

    fn set_depth_func(&mut self, func: DepthFunc) -> Result<()> {
        self.depth_func = func;
        self.commands.push(DeviceCommand::SetDepthFunc(func));
        Ok(())
    }

    fn set_depth_test(&mut self, enabled: bool) -> Result<()> {
        self.depth_test = enabled;
        self.commands.push(DeviceCommand::SetDepthTest(enabled));
        Ok(())
    }

    fn set_cull_face(&mut self, enabled: bool) -> Result<()> {
        self.cull_face = enabled;
        self.commands.push(DeviceCommand::SetCullFace(enabled));
        Ok(())
    }

    fn enable_program(&mut self, name: &str) -> Result<bool> {
        if self.missing_programs.contains(name) {
            return Ok(false);
        }
        self.current_program = Some(name.to_string());
        self.program_uniforms.entry(name.to_string()).or_default();
        self.commands.push(DeviceCommand::EnableProgram(name.to_string()));
        Ok(true)
    }

    fn disable_program(&mut self) -> Result<()> {
        self.current_program = None;
        self.commands.push(DeviceCommand::DisableProgram);
        Ok(())
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<()> {
        let Some(program) = &self.current_program else {
            return Err(Error::InvalidState(format!("uniform '{}' set with no program enabled", name)));
        };
        self.program_uniforms
            .entry(program.clone())
            .or_default()
            .insert(name.to_string(), value.clone());
        self.commands.push(DeviceCommand::SetUniform { name: name.to_string(), value });
        Ok(())
    }

    fn draw_mesh(&mut self, mesh: &Mesh) -> Result<()> {
        self.record_draw(Some(mesh.name().to_string()))?;
        self.commands.push(DeviceCommand::DrawMesh(mesh.name().to_string()));
        Ok(())
    }

    fn draw_fullscreen_quad(&mut self) -> Result<()> {
        self.record_draw(None)?;
        self.commands.push(DeviceCommand::DrawFullscreenQuad);
        Ok(())
    }

    fn is_state_valid(&self) -> bool {
        !self.poisoned
    }
}

#[cfg(test)]
#[path = "recording_device_tests.rs"]
mod tests;
