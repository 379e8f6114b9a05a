/// Shadow atlas: one shared depth texture partitioned between lights.
///
/// Every frame runs `allocate` then `generate`. Allocation walks the active
/// lights nearest-first (directional lights count as distance 0) and hands
/// each shadow caster the next entry of a fixed, priority-ordered region
/// table. Generation renders every opaque instruction into each assigned
/// region, one light after another, from that light's shadow camera.
///
/// Regions are not sticky: a light may get a different region (or none)
/// on the next frame.

use glam::{Mat4, Vec3, Vec4};
use crate::camera::Camera;
use crate::device::{
    ClearFlags, Device, FrameBufferDesc, FrameBufferHandle, Placeholder, Rect, TextureHandle, UniformValue,
};
use crate::error::Result;
use crate::resource::{AlphaMode, Material};
use crate::scene::{EntityKey, LightType, Scene};
use crate::{engine_info, engine_trace, engine_warn};
use super::instruction::RenderInstruction;
use super::mesh_renderer::slots;
use super::programs;

// ===== REGIONS =====

/// Normalized sub-rectangle of the atlas, origin bottom-left
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl AtlasRegion {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Region in atlas pixels
    pub fn to_pixels(&self, atlas_size: u32) -> Rect {
        let size = atlas_size as f32;
        Rect::new(
            (self.x * size).round() as i32,
            (self.y * size).round() as i32,
            (self.width * size).round() as u32,
            (self.height * size).round() as u32,
        )
    }

    pub fn as_vec4(&self) -> Vec4 {
        Vec4::new(self.x, self.y, self.width, self.height)
    }

    /// Maps [0, 1]² texture space into this region.
    pub fn uv_transform(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(self.x, self.y, 0.0))
            * Mat4::from_scale(Vec3::new(self.width, self.height, 1.0))
    }
}

/// Priority-ordered region table; entry 0 goes to the most important caster
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowAtlasLayout {
    regions: Vec<AtlasRegion>,
}

impl ShadowAtlasLayout {
    pub fn new(regions: Vec<AtlasRegion>) -> Self {
        Self { regions }
    }

    pub fn capacity(&self) -> usize {
        self.regions.len()
    }

    pub fn region(&self, index: usize) -> Option<AtlasRegion> {
        self.regions.get(index).copied()
    }

    pub fn regions(&self) -> &[AtlasRegion] {
        &self.regions
    }
}

impl Default for ShadowAtlasLayout {
    /// Three half-resolution quadrants, then three quarter-resolution
    /// slots carved from the fourth quadrant.
    fn default() -> Self {
        Self::new(vec![
            AtlasRegion::new(0.0, 0.0, 0.5, 0.5),
            AtlasRegion::new(0.5, 0.0, 0.5, 0.5),
            AtlasRegion::new(0.0, 0.5, 0.5, 0.5),
            AtlasRegion::new(0.5, 0.5, 0.25, 0.25),
            AtlasRegion::new(0.75, 0.5, 0.25, 0.25),
            AtlasRegion::new(0.5, 0.75, 0.25, 0.25),
        ])
    }
}

// ===== ATLAS =====

/// Outcome of one frame's shadow work
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShadowAtlasReport {
    /// Lights that received a region, in priority order
    pub assigned: Vec<EntityKey>,
    /// Shadow casters left without a region
    pub dropped: usize,
    pub draw_calls: usize,
    pub skipped_draws: usize,
}

pub struct ShadowAtlas {
    size: u32,
    layout: ShadowAtlasLayout,
    frame_buffer: Option<FrameBufferHandle>,
}

impl ShadowAtlas {
    pub fn new(size: u32, layout: ShadowAtlasLayout) -> Self {
        Self { size, layout, frame_buffer: None }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn layout(&self) -> &ShadowAtlasLayout {
        &self.layout
    }

    /// `None` until the first shadow pass
    pub fn frame_buffer(&self) -> Option<FrameBufferHandle> {
        self.frame_buffer
    }

    pub fn depth_texture(&self, device: &dyn Device) -> Option<TextureHandle> {
        device.depth_texture(self.frame_buffer?)
    }

    /// Clear the region of every light in the scene.
    pub fn release_regions(scene: &mut Scene) {
        let keys: Vec<EntityKey> = scene.entities().map(|(key, _)| key).collect();
        for key in keys {
            if let Some(light) = scene.entity_mut(key).and_then(|e| e.as_light_mut()) {
                light.set_atlas_region(None);
            }
        }
    }

    /// Assign regions to the shadow casters among `lights`.
    pub fn allocate(&self, scene: &mut Scene, lights: &[EntityKey], camera: &Camera) -> ShadowAtlasReport {
        Self::release_regions(scene);

        let mut by_priority: Vec<(EntityKey, f32)> = lights
            .iter()
            .filter_map(|&key| {
                let entity = scene.entity(key)?;
                let light = entity.as_light()?;
                let distance = match light.light_type {
                    LightType::Directional => 0.0,
                    _ => camera.distance_to(crate::scene::Light::position(&entity.model)),
                };
                Some((key, distance))
            })
            .collect();
        by_priority.sort_by(|a, b| a.1.total_cmp(&b.1));

        let mut report = ShadowAtlasReport::default();
        for (key, _) in by_priority {
            let Some(light) = scene.entity_mut(key).and_then(|e| e.as_light_mut()) else {
                continue;
            };
            if !light.cast_shadows {
                continue;
            }
            match self.layout.region(report.assigned.len()) {
                Some(region) => {
                    light.set_atlas_region(Some(region));
                    report.assigned.push(key);
                }
                None => report.dropped += 1,
            }
        }

        if report.dropped > 0 {
            engine_warn!(
                "lumen3d::ShadowAtlas",
                "{} shadow casters exceed the {} atlas regions; {} left without shadows",
                report.assigned.len() + report.dropped,
                self.layout.capacity(),
                report.dropped
            );
        }
        report
    }

    /// Render the depth of every opaque instruction into each assigned region.
    ///
    /// Leaves the window frame buffer bound with a full-window viewport.
    pub fn generate(
        &mut self,
        device: &mut dyn Device,
        scene: &mut Scene,
        report: &mut ShadowAtlasReport,
        instructions: &[RenderInstruction],
    ) -> Result<()> {
        if report.assigned.is_empty() {
            return Ok(());
        }

        let frame_buffer = self.ensure_frame_buffer(device)?;
        device.bind_frame_buffer(frame_buffer)?;
        device.set_viewport(Rect::from_size(self.size, self.size))?;
        device.clear(ClearFlags::DEPTH)?;

        if device.enable_program(programs::DEPTH)? {
            device.set_blend_enabled(false)?;
            device.set_depth_test(true)?;

            for &key in &report.assigned {
                let Some(entity) = scene.entity_mut(key) else {
                    continue;
                };
                let model = entity.model;
                let Some(light) = entity.as_light_mut() else {
                    continue;
                };
                let Some(region) = light.atlas_region() else {
                    continue;
                };

                device.set_viewport(region.to_pixels(self.size))?;
                let view_projection = light.configure_shadow_camera(&model).view_projection_matrix();
                device.set_uniform("u_viewprojection", view_projection.into())?;

                for instruction in instructions.iter().filter(|i| !i.is_blended()) {
                    if instruction.mesh.is_empty() {
                        report.skipped_draws += 1;
                        continue;
                    }
                    let material = &instruction.material;
                    device.set_uniform("u_model", instruction.model.into())?;
                    device.set_cull_face(!material.two_sided)?;
                    upload_alpha_test(device, material)?;
                    device.draw_mesh(&instruction.mesh)?;
                    report.draw_calls += 1;
                }
            }
            device.set_cull_face(true)?;
            device.disable_program()?;
        } else {
            engine_trace!("lumen3d::ShadowAtlas", "Program '{}' unavailable, shadow pass skipped", programs::DEPTH);
            report.skipped_draws += report.assigned.len();
            // undrawn regions must not be sampled
            for key in report.assigned.drain(..) {
                if let Some(light) = scene.entity_mut(key).and_then(|e| e.as_light_mut()) {
                    light.set_atlas_region(None);
                }
            }
        }

        let (width, height) = device.window_size();
        device.unbind_frame_buffer()?;
        device.set_viewport(Rect::from_size(width, height))?;
        Ok(())
    }

    fn ensure_frame_buffer(&mut self, device: &mut dyn Device) -> Result<FrameBufferHandle> {
        if let Some(frame_buffer) = self.frame_buffer {
            return Ok(frame_buffer);
        }
        let frame_buffer = device.create_frame_buffer(&FrameBufferDesc::depth_only(self.size))?;
        engine_info!("lumen3d::ShadowAtlas", "Created {}x{} shadow atlas", self.size, self.size);
        self.frame_buffer = Some(frame_buffer);
        Ok(frame_buffer)
    }

    /// Destroy the atlas frame buffer; it is recreated on the next shadow pass.
    pub fn destroy(&mut self, device: &mut dyn Device) -> Result<()> {
        if let Some(frame_buffer) = self.frame_buffer.take() {
            device.destroy_frame_buffer(frame_buffer)?;
        }
        Ok(())
    }
}

/// Alpha-test inputs of the depth program. Masked materials sample their
/// base color texture (white when absent); everything else writes depth
/// unconditionally with a zero cutoff.
fn upload_alpha_test(device: &mut dyn Device, material: &Material) -> Result<()> {
    if material.alpha_mode != AlphaMode::Mask {
        return device.set_uniform("u_alpha_cutoff", 0.0f32.into());
    }
    let texture = material
        .color_texture
        .unwrap_or_else(|| device.placeholder_texture(Placeholder::White));
    device.set_uniform("u_alpha_cutoff", material.alpha_cutoff.into())?;
    device.set_uniform("u_color", material.color.into())?;
    device.set_uniform("u_color_texture", UniformValue::texture(texture, slots::COLOR))
}

#[cfg(test)]
#[path = "shadow_atlas_tests.rs"]
mod tests;
