/// Deferred pipeline: geometry buffers, then one full-screen lighting resolve.
///
/// Geometry pass writes albedo, normal and extra material data into a
/// three-attachment frame buffer (plus depth). The resolve pass reads those
/// textures back, reconstructs world positions from depth with the inverse
/// view-projection, and evaluates every packed light in a single
/// full-screen draw into the illumination buffer, which is then copied to
/// the window.
///
/// Both frame buffers are created lazily and recreated when the window
/// size changes.

use glam::{Vec2, Vec4};
use crate::camera::Camera;
use crate::device::{
    ClearFlags, Device, FrameBufferDesc, FrameBufferHandle, Placeholder, Rect, TextureFormat,
    TextureHandle, UniformValue,
};
use crate::error::Result;
use crate::{engine_info, engine_trace};
use super::config::RendererConfig;
use super::forward::RenderPipeline;
use super::instruction::RenderInstruction;
use super::lighting::{LightArrays, LightParams};
use super::mesh_renderer::{draw_with_material, slots, DrawContext};
use super::programs;
use super::stats::PassStats;

/// Albedo, normal, extra
pub const GBUFFER_COLOR_ATTACHMENTS: u32 = 3;

/// Geometry-buffer inputs of the resolve program
const RESOLVE_TEXTURES: [(&str, u32); 3] = [
    ("u_gb0_texture", 0),
    ("u_gb1_texture", 1),
    ("u_gb2_texture", 2),
];
const RESOLVE_DEPTH_SLOT: u32 = 3;

#[derive(Debug, Default)]
pub struct DeferredPipeline {
    gbuffers: Option<FrameBufferHandle>,
    illumination: Option<FrameBufferHandle>,
    size: (u32, u32),
}

impl DeferredPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gbuffers(&self) -> Option<FrameBufferHandle> {
        self.gbuffers
    }

    pub fn illumination(&self) -> Option<FrameBufferHandle> {
        self.illumination
    }

    /// Size the buffers were created at
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Create (or recreate at a new size) the geometry and illumination buffers.
    fn ensure_buffers(&mut self, device: &mut dyn Device) -> Result<(FrameBufferHandle, FrameBufferHandle)> {
        let size = device.window_size();
        if let (Some(gbuffers), Some(illumination)) = (self.gbuffers, self.illumination) {
            if self.size == size {
                return Ok((gbuffers, illumination));
            }
            engine_info!(
                "lumen3d::DeferredPipeline",
                "Resizing geometry buffers {}x{} -> {}x{}",
                self.size.0, self.size.1, size.0, size.1
            );
        }
        self.destroy(device)?;

        let (width, height) = size;
        let gbuffers = device.create_frame_buffer(&FrameBufferDesc {
            width,
            height,
            color_attachments: GBUFFER_COLOR_ATTACHMENTS,
            color_format: TextureFormat::Rgba32Float,
            depth: true,
        })?;
        self.gbuffers = Some(gbuffers);
        let illumination = device.create_frame_buffer(&FrameBufferDesc {
            width,
            height,
            color_attachments: 1,
            color_format: TextureFormat::Rgba16Float,
            depth: false,
        })?;
        self.illumination = Some(illumination);
        self.size = size;

        engine_info!("lumen3d::DeferredPipeline", "Created {}x{} geometry and illumination buffers", width, height);
        Ok((gbuffers, illumination))
    }

    fn geometry_pass(
        &mut self,
        device: &mut dyn Device,
        ctx: &DrawContext<'_>,
        gbuffers: FrameBufferHandle,
        instructions: &[RenderInstruction],
        config: &RendererConfig,
        stats: &mut PassStats,
    ) -> Result<()> {
        device.bind_frame_buffer(gbuffers)?;
        device.set_viewport(Rect::from_size(self.size.0, self.size.1))?;

        device.clear_color_attachment(0, config.gbuffer_clear_color)?;
        device.clear(ClearFlags::DEPTH)?;
        device.clear_color_attachment(1, Vec4::ZERO)?;
        device.clear_color_attachment(2, Vec4::ZERO)?;
        device.set_draw_buffers(&[0, 1, 2])?;

        for instruction in instructions {
            let dither = instruction.is_blended();
            let outcome = draw_with_material(device, ctx, instruction, programs::GBUFFERS, |device, mesh| {
                // translucency is approximated by dithering, never blended
                device.set_blend_enabled(false)?;
                device.set_uniform("u_dither", dither.into())?;
                device.draw_mesh(mesh)?;
                Ok(1)
            })?;
            stats.record(outcome);
        }

        device.unbind_frame_buffer()?;
        Ok(())
    }

    fn resolve_pass(
        &mut self,
        device: &mut dyn Device,
        ctx: &DrawContext<'_>,
        gbuffers: FrameBufferHandle,
        illumination: FrameBufferHandle,
        lights: &LightArrays,
        stats: &mut PassStats,
    ) -> Result<()> {
        let (width, height) = self.size;
        device.bind_frame_buffer(illumination)?;
        device.set_viewport(Rect::from_size(width, height))?;
        device.clear(ClearFlags::COLOR)?;

        if !device.enable_program(programs::DEFERRED_RESOLVE)? {
            engine_trace!("lumen3d::DeferredPipeline", "Program '{}' unavailable, resolve skipped", programs::DEFERRED_RESOLVE);
            stats.skipped_draws += 1;
            device.unbind_frame_buffer()?;
            return Ok(());
        }

        let white = device.placeholder_texture(Placeholder::White);
        for (name, index) in RESOLVE_TEXTURES {
            let texture = device.color_texture(gbuffers, index).unwrap_or(white);
            device.set_uniform(name, UniformValue::texture(texture, index))?;
        }
        let depth = device.depth_texture(gbuffers).unwrap_or(white);
        device.set_uniform("u_depth_texture", UniformValue::texture(depth, RESOLVE_DEPTH_SLOT))?;
        let atlas = ctx.shadow_atlas.unwrap_or(white);
        device.set_uniform("u_shadow_atlas", UniformValue::texture(atlas, slots::SHADOW_ATLAS))?;

        device.set_uniform("u_inverse_viewprojection", ctx.camera.inverse_view_projection_matrix().into())?;
        device.set_uniform("u_iRes", Vec2::new(1.0 / width as f32, 1.0 / height as f32).into())?;
        device.set_uniform("u_camera_position", ctx.camera.eye().into())?;
        device.set_uniform("u_ambient_light", ctx.ambient_light.into())?;
        lights.upload(device)?;

        device.set_depth_test(false)?;
        device.set_blend_enabled(false)?;
        device.draw_fullscreen_quad()?;
        stats.draw_calls += 1;
        device.set_depth_test(true)?;
        device.disable_program()?;

        device.unbind_frame_buffer()?;
        Ok(())
    }

    /// Copy the illumination buffer to the window.
    fn present(&self, device: &mut dyn Device, illumination: FrameBufferHandle, stats: &mut PassStats) -> Result<()> {
        let (width, height) = device.window_size();
        device.set_viewport(Rect::from_size(width, height))?;
        let Some(texture) = device.color_texture(illumination, 0) else {
            return Ok(());
        };
        if blit(device, programs::SCREEN, texture, &[])? {
            stats.draw_calls += 1;
        } else {
            stats.skipped_draws += 1;
        }
        Ok(())
    }

    /// Show the geometry buffers in four window quadrants: albedo, normal,
    /// extra, and linearized depth.
    pub fn show_gbuffers(&self, device: &mut dyn Device, camera: &Camera) -> Result<usize> {
        let Some(gbuffers) = self.gbuffers else {
            return Ok(0);
        };
        let (width, height) = device.window_size();
        let (half_w, half_h) = (width / 2, height / 2);
        let quadrants = [
            Rect::new(0, half_h as i32, half_w, half_h),
            Rect::new(half_w as i32, half_h as i32, half_w, half_h),
            Rect::new(0, 0, half_w, half_h),
            Rect::new(half_w as i32, 0, half_w, half_h),
        ];

        let mut draw_calls = 0;
        for (index, quadrant) in quadrants.iter().take(3).enumerate() {
            if let Some(texture) = device.color_texture(gbuffers, index as u32) {
                device.set_viewport(*quadrant)?;
                draw_calls += blit(device, programs::SCREEN, texture, &[])? as usize;
            }
        }
        if let Some(depth) = device.depth_texture(gbuffers) {
            device.set_viewport(quadrants[3])?;
            let near_far = UniformValue::Vec2(Vec2::new(camera.near(), camera.far()));
            draw_calls += blit(device, programs::DEPTH_LINEAR, depth, &[("u_camera_nearfar", near_far)])? as usize;
        }

        device.set_viewport(Rect::from_size(width, height))?;
        Ok(draw_calls)
    }

    /// Destroy both frame buffers; they are recreated on the next frame.
    pub fn destroy(&mut self, device: &mut dyn Device) -> Result<()> {
        if let Some(gbuffers) = self.gbuffers.take() {
            device.destroy_frame_buffer(gbuffers)?;
        }
        if let Some(illumination) = self.illumination.take() {
            device.destroy_frame_buffer(illumination)?;
        }
        self.size = (0, 0);
        Ok(())
    }
}

impl RenderPipeline for DeferredPipeline {
    fn render(
        &mut self,
        device: &mut dyn Device,
        ctx: &DrawContext<'_>,
        instructions: &[RenderInstruction],
        lights: &[LightParams],
        config: &RendererConfig,
    ) -> Result<PassStats> {
        let mut stats = PassStats::default();
        let (gbuffers, illumination) = self.ensure_buffers(device)?;

        self.geometry_pass(device, ctx, gbuffers, instructions, config, &mut stats)?;

        let (arrays, clamped) = LightArrays::pack(lights, config.max_lights);
        stats.clamped_lights = clamped;
        self.resolve_pass(device, ctx, gbuffers, illumination, &arrays, &mut stats)?;

        self.present(device, illumination, &mut stats)?;
        Ok(stats)
    }
}

/// Draw `texture` over the current viewport with a full-screen program.
///
/// Returns `false` if the program is unavailable.
pub(crate) fn blit(
    device: &mut dyn Device,
    program: &str,
    texture: TextureHandle,
    uniforms: &[(&str, UniformValue)],
) -> Result<bool> {
    if !device.enable_program(program)? {
        engine_trace!("lumen3d::DeferredPipeline", "Program '{}' unavailable, blit skipped", program);
        return Ok(false);
    }
    device.set_uniform("u_texture", UniformValue::texture(texture, 0))?;
    for (name, value) in uniforms {
        device.set_uniform(name, value.clone())?;
    }
    device.set_depth_test(false)?;
    device.draw_fullscreen_quad()?;
    device.set_depth_test(true)?;
    device.disable_program()?;
    Ok(true)
}

#[cfg(test)]
#[path = "deferred_tests.rs"]
mod tests;
