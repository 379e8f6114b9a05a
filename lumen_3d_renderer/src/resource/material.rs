/// Resource-level material type.
///
/// A Material is a pure data description of a surface: its alpha mode
/// (which decides ordering and blend state), base factors, and up to five
/// texture slots. Any slot left empty is replaced at draw time by a
/// neutral placeholder texture.

use glam::{Vec3, Vec4};
use crate::device::TextureHandle;

/// How a material's alpha channel is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlphaMode {
    #[default]
    Opaque,
    /// Alpha-tested against `alpha_cutoff`
    Mask,
    /// Alpha-blended; drawn after every opaque instruction
    Blend,
}

impl AlphaMode {
    pub fn is_blended(self) -> bool {
        self == AlphaMode::Blend
    }
}

#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f32,
    /// Base color factor (rgba)
    pub color: Vec4,
    pub emissive_factor: Vec3,
    /// Disables backface culling
    pub two_sided: bool,
    pub color_texture: Option<TextureHandle>,
    pub emissive_texture: Option<TextureHandle>,
    pub metallic_roughness_texture: Option<TextureHandle>,
    pub normal_texture: Option<TextureHandle>,
    pub occlusion_texture: Option<TextureHandle>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            color: Vec4::ONE,
            emissive_factor: Vec3::ZERO,
            two_sided: false,
            color_texture: None,
            emissive_texture: None,
            metallic_roughness_texture: None,
            normal_texture: None,
            occlusion_texture: None,
        }
    }

    pub fn with_alpha_mode(mut self, alpha_mode: AlphaMode) -> Self {
        self.alpha_mode = alpha_mode;
        self
    }

    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    pub fn is_blended(&self) -> bool {
        self.alpha_mode.is_blended()
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new("default")
    }
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;
