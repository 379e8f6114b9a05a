/// SceneRenderer — per-frame orchestration.
///
/// `render_scene` runs the whole frame synchronously:
///
/// 1. clear the window to the scene background
/// 2. traverse: active lights, then render instructions
/// 3. order instructions
/// 4. shadow atlas: allocate regions, render each caster's depth
/// 5. build one `LightParams` per active light
/// 6. run the forward or deferred pipeline
/// 7. optional debug overlays
///
/// Frame state is rebuilt every call. Only the frame buffers (shadow
/// atlas, geometry and illumination buffers) persist between frames.

use std::time::Instant;
use glam::Vec2;
use crate::camera::Camera;
use crate::device::{ClearFlags, Device, Rect, UniformValue};
use crate::error::Result;
use crate::scene::{Scene, SHADOW_CAMERA_NEAR};
use crate::engine_trace;
use super::config::{PipelineMode, RendererConfig};
use super::deferred::{blit, DeferredPipeline};
use super::forward::{ForwardPipeline, RenderPipeline};
use super::instruction::order_instructions;
use super::lighting::LightParams;
use super::mesh_renderer::DrawContext;
use super::programs;
use super::shadow_atlas::{ShadowAtlas, ShadowAtlasReport};
use super::stats::FrameStats;
use super::traversal::{collect_instructions, collect_lights, FrameState};

pub struct SceneRenderer {
    config: RendererConfig,
    frame: FrameState,
    shadow_atlas: ShadowAtlas,
    forward: ForwardPipeline,
    deferred: DeferredPipeline,
    start_time: Instant,
    last_stats: FrameStats,
}

impl SceneRenderer {
    pub fn new(config: RendererConfig) -> Self {
        let shadow_atlas = ShadowAtlas::new(config.shadow_atlas_size, config.shadow_atlas_layout.clone());
        Self {
            config,
            frame: FrameState::new(),
            shadow_atlas,
            forward: ForwardPipeline::new(),
            deferred: DeferredPipeline::new(),
            start_time: Instant::now(),
            last_stats: FrameStats::default(),
        }
    }

    // ===== ACCESSORS =====

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Pipeline, lighting and debug settings take effect on the next frame.
    /// Atlas size and layout are fixed at construction.
    pub fn config_mut(&mut self) -> &mut RendererConfig {
        &mut self.config
    }

    /// Working set of the last frame
    pub fn frame(&self) -> &FrameState {
        &self.frame
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    pub fn shadow_atlas(&self) -> &ShadowAtlas {
        &self.shadow_atlas
    }

    pub fn deferred(&self) -> &DeferredPipeline {
        &self.deferred
    }

    // ===== FRAME =====

    pub fn render_scene(&mut self, device: &mut dyn Device, scene: &mut Scene, camera: &Camera) -> Result<FrameStats> {
        self.frame.clear();
        let mut stats = FrameStats::default();

        let (width, height) = device.window_size();
        device.set_clear_color(scene.background_color.extend(1.0))?;
        device.set_viewport(Rect::from_size(width, height))?;
        device.clear(ClearFlags::COLOR | ClearFlags::DEPTH)?;

        collect_lights(scene, camera, &mut self.frame);
        collect_instructions(scene, camera, &mut self.frame);
        order_instructions(&mut self.frame.instructions, self.config.transparency_sort);

        let shadows = self.render_shadows(device, scene, camera)?;
        let shadow_atlas = if shadows.assigned.is_empty() {
            None
        } else {
            self.shadow_atlas.depth_texture(device)
        };

        let lights: Vec<LightParams> = self
            .frame
            .lights
            .iter()
            .filter_map(|&key| {
                let entity = scene.entity(key)?;
                Some(LightParams::from_light(&entity.model, entity.as_light()?))
            })
            .collect();

        let ctx = DrawContext {
            camera,
            ambient_light: scene.ambient_light,
            time: self.start_time.elapsed().as_secs_f32(),
            shadow_atlas,
        };
        let pipeline: &mut dyn RenderPipeline = match self.config.pipeline {
            PipelineMode::Forward => &mut self.forward,
            PipelineMode::Deferred => &mut self.deferred,
        };
        let pass = pipeline.render(device, &ctx, &self.frame.instructions, &lights, &self.config)?;
        stats.add_pass(&pass);

        if self.config.show_gbuffers && self.config.pipeline == PipelineMode::Deferred {
            stats.draw_calls += self.deferred.show_gbuffers(device, camera)?;
        }
        if self.config.show_shadow_atlas {
            stats.draw_calls += self.show_shadow_atlas(device, scene)?;
        }

        stats.instructions = self.frame.instructions.len();
        stats.active_lights = self.frame.light_count();
        stats.culled_nodes = self.frame.culled_nodes;
        stats.dropped_lights = self.frame.dropped_lights;
        stats.shadow_regions = shadows.assigned.len();
        stats.dropped_shadow_casters = shadows.dropped;
        stats.draw_calls += shadows.draw_calls;
        stats.skipped_draws += shadows.skipped_draws;

        engine_trace!(
            "lumen3d::SceneRenderer",
            "Frame: {} instructions, {} lights, {} draw calls",
            stats.instructions,
            stats.active_lights,
            stats.draw_calls
        );
        self.last_stats = stats;
        Ok(stats)
    }

    fn render_shadows(&mut self, device: &mut dyn Device, scene: &mut Scene, camera: &Camera) -> Result<ShadowAtlasReport> {
        if !self.config.shadows_enabled {
            ShadowAtlas::release_regions(scene);
            return Ok(ShadowAtlasReport::default());
        }
        let mut report = self.shadow_atlas.allocate(scene, &self.frame.lights, camera);
        self.shadow_atlas.generate(device, scene, &mut report, &self.frame.instructions)?;
        Ok(report)
    }

    /// Draw the shadow atlas depth over the whole window, linearized with
    /// the near/far planes of the first shadowed light.
    pub fn show_shadow_atlas(&self, device: &mut dyn Device, scene: &Scene) -> Result<usize> {
        let Some(texture) = self.shadow_atlas.depth_texture(device) else {
            return Ok(0);
        };
        let far = self
            .frame
            .lights
            .iter()
            .filter_map(|&key| scene.entity(key)?.as_light())
            .find(|light| light.atlas_region().is_some())
            .map(|light| light.max_dist)
            .unwrap_or(100.0);

        let (width, height) = device.window_size();
        device.set_viewport(Rect::from_size(width, height))?;
        let near_far = UniformValue::Vec2(Vec2::new(SHADOW_CAMERA_NEAR, far));
        let drawn = blit(device, programs::DEPTH_LINEAR, texture, &[("u_camera_nearfar", near_far)])?;
        Ok(drawn as usize)
    }

    /// Destroy every frame buffer the renderer owns.
    pub fn release(&mut self, device: &mut dyn Device) -> Result<()> {
        self.shadow_atlas.destroy(device)?;
        self.deferred.destroy(device)
    }
}

impl Default for SceneRenderer {
    fn default() -> Self {
        Self::new(RendererConfig::default())
    }
}

#[cfg(test)]
#[path = "scene_renderer_tests.rs"]
mod tests;
