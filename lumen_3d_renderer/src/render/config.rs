/// Renderer configuration.

use glam::Vec4;
use super::instruction::SortPolicy;
use super::shadow_atlas::ShadowAtlasLayout;

/// How lit geometry reaches the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineMode {
    /// Shade every instruction directly
    #[default]
    Forward,
    /// Fill geometry buffers, then resolve lighting in one full-screen pass
    Deferred,
}

/// How lights are fed to the forward shading program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightingMode {
    /// One additive draw call per light
    #[default]
    Multipass,
    /// One draw call with all lights packed into uniform arrays
    Singlepass,
}

#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub pipeline: PipelineMode,
    pub lighting: LightingMode,
    /// Capacity of the packed light arrays (singlepass and deferred resolve)
    pub max_lights: usize,
    /// Side of the square shadow atlas in pixels
    pub shadow_atlas_size: u32,
    pub shadow_atlas_layout: ShadowAtlasLayout,
    pub transparency_sort: SortPolicy,
    /// Clear color of the albedo geometry buffer
    pub gbuffer_clear_color: Vec4,
    pub shadows_enabled: bool,
    /// Show the four geometry buffers instead of the lit image (deferred only)
    pub show_gbuffers: bool,
    /// Show the shadow atlas depth instead of the lit image
    pub show_shadow_atlas: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineMode::Forward,
            lighting: LightingMode::Multipass,
            max_lights: 6,
            shadow_atlas_size: 4096,
            shadow_atlas_layout: ShadowAtlasLayout::default(),
            transparency_sort: SortPolicy::BackToFront,
            gbuffer_clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            shadows_enabled: true,
            show_gbuffers: false,
            show_shadow_atlas: false,
        }
    }
}
