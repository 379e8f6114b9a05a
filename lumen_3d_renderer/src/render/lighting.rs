/// Lighting contract shared by every lit pass.
///
/// `LightParams` is the single per-light record: it is built once per
/// frame for each active light and consumed unchanged by the multipass
/// strategy (one upload per draw), the singlepass strategy and the deferred
/// resolve (both packed into `LightArrays`). The two draw strategies only
/// differ in how they feed those records to the device.

use glam::{Mat4, Vec3, Vec4};
use crate::device::{BlendFunc, Device};
use crate::error::Result;
use crate::resource::Mesh;
use crate::scene::{Light, LightType};
use crate::engine_warn;
use super::programs;

// ===== PER-LIGHT RECORD =====

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightParams {
    pub light_type: LightType,
    /// Color premultiplied by intensity
    pub color: Vec3,
    pub position: Vec3,
    pub max_distance: f32,
    pub cone_angle_cos: f32,
    pub cone_exp: f32,
    /// Unit vector towards the light (model +Z)
    pub direction: Vec3,
    pub target: Vec3,
    /// True only when the light holds an atlas region this frame
    pub cast_shadows: bool,
    pub shadow_bias: f32,
    pub shadow_viewproj: Mat4,
    pub shadow_region: Vec4,
}

impl LightParams {
    pub fn from_light(model: &Mat4, light: &Light) -> Self {
        let shadow_matrix = light.shadow_matrix();
        Self {
            light_type: light.light_type,
            color: light.color * light.intensity,
            position: Light::position(model),
            max_distance: light.max_dist,
            cone_angle_cos: light.cone_angle.to_radians().cos(),
            cone_exp: light.cone_exp,
            direction: Light::direction(model),
            target: light.target,
            cast_shadows: shadow_matrix.is_some(),
            shadow_bias: light.shadow_bias,
            shadow_viewproj: shadow_matrix.unwrap_or(Mat4::IDENTITY),
            shadow_region: light.shadow_region_vec4(),
        }
    }

    /// Placeholder record for a pass with no light (`u_light_type = 0`).
    pub fn none() -> Self {
        Self {
            light_type: LightType::Unknown,
            color: Vec3::ZERO,
            position: Vec3::ZERO,
            max_distance: 0.0,
            cone_angle_cos: 1.0,
            cone_exp: 0.0,
            direction: Vec3::Z,
            target: Vec3::ZERO,
            cast_shadows: false,
            shadow_bias: 0.0,
            shadow_viewproj: Mat4::IDENTITY,
            shadow_region: Vec4::ZERO,
        }
    }

    /// Upload as the `u_light_*` uniforms of the enabled program.
    pub fn upload(&self, device: &mut dyn Device) -> Result<()> {
        device.set_uniform("u_light_type", self.light_type.as_uniform().into())?;
        device.set_uniform("u_light_color", self.color.into())?;
        device.set_uniform("u_light_position", self.position.into())?;
        device.set_uniform("u_max_distance", self.max_distance.into())?;
        device.set_uniform("u_cone_angle_cos", self.cone_angle_cos.into())?;
        device.set_uniform("u_cone_exp", self.cone_exp.into())?;
        device.set_uniform("u_light_direction", self.direction.into())?;
        device.set_uniform("u_light_target", self.target.into())?;
        device.set_uniform("u_cast_shadows", self.cast_shadows.into())?;
        device.set_uniform("u_shadow_bias", self.shadow_bias.into())?;
        device.set_uniform("u_shadow_viewproj", self.shadow_viewproj.into())?;
        device.set_uniform("u_shadow_region", self.shadow_region.into())?;
        Ok(())
    }
}

// ===== PACKED ARRAYS =====

/// Fixed-capacity structure-of-arrays form of a light list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightArrays {
    pub types: Vec<i32>,
    pub colors: Vec<Vec3>,
    pub positions: Vec<Vec3>,
    pub max_distances: Vec<f32>,
    pub cone_angle_cos: Vec<f32>,
    pub cone_exps: Vec<f32>,
    pub directions: Vec<Vec3>,
    pub targets: Vec<Vec3>,
    pub cast_shadows: Vec<i32>,
    pub shadow_biases: Vec<f32>,
    pub shadow_viewprojs: Vec<Mat4>,
    pub shadow_regions: Vec<Vec4>,
}

impl LightArrays {
    /// Pack the first `capacity` lights. Returns the arrays and the number
    /// of lights left out.
    pub fn pack(lights: &[LightParams], capacity: usize) -> (Self, usize) {
        let packed = &lights[..lights.len().min(capacity)];
        let clamped = lights.len() - packed.len();
        if clamped > 0 {
            engine_warn!(
                "lumen3d::Lighting",
                "{} active lights exceed the light array capacity of {}; {} ignored",
                lights.len(),
                capacity,
                clamped
            );
        }

        let arrays = Self {
            types: packed.iter().map(|l| l.light_type.as_uniform()).collect(),
            colors: packed.iter().map(|l| l.color).collect(),
            positions: packed.iter().map(|l| l.position).collect(),
            max_distances: packed.iter().map(|l| l.max_distance).collect(),
            cone_angle_cos: packed.iter().map(|l| l.cone_angle_cos).collect(),
            cone_exps: packed.iter().map(|l| l.cone_exp).collect(),
            directions: packed.iter().map(|l| l.direction).collect(),
            targets: packed.iter().map(|l| l.target).collect(),
            cast_shadows: packed.iter().map(|l| l.cast_shadows as i32).collect(),
            shadow_biases: packed.iter().map(|l| l.shadow_bias).collect(),
            shadow_viewprojs: packed.iter().map(|l| l.shadow_viewproj).collect(),
            shadow_regions: packed.iter().map(|l| l.shadow_region).collect(),
        };
        (arrays, clamped)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Upload as the `u_light_*` arrays plus `u_num_lights`.
    pub fn upload(&self, device: &mut dyn Device) -> Result<()> {
        device.set_uniform("u_num_lights", (self.len() as i32).into())?;
        device.set_uniform("u_light_types", self.types.clone().into())?;
        device.set_uniform("u_light_colors", self.colors.clone().into())?;
        device.set_uniform("u_light_positions", self.positions.clone().into())?;
        device.set_uniform("u_light_max_distances", self.max_distances.clone().into())?;
        device.set_uniform("u_light_cone_cos", self.cone_angle_cos.clone().into())?;
        device.set_uniform("u_light_cone_exps", self.cone_exps.clone().into())?;
        device.set_uniform("u_light_directions", self.directions.clone().into())?;
        device.set_uniform("u_light_targets", self.targets.clone().into())?;
        device.set_uniform("u_light_cast_shadows", self.cast_shadows.clone().into())?;
        device.set_uniform("u_light_shadow_biases", self.shadow_biases.clone().into())?;
        device.set_uniform("u_light_shadow_viewprojs", self.shadow_viewprojs.clone().into())?;
        device.set_uniform("u_light_shadow_regions", self.shadow_regions.clone().into())?;
        Ok(())
    }
}

// ===== STRATEGIES =====

/// Draws one mesh lit by the frame's lights.
///
/// Called with the strategy's program enabled and the common uniforms and
/// material state already uploaded.
pub trait LightingStrategy {
    fn program_name(&self) -> &'static str;

    /// Returns the number of draw calls issued.
    fn draw_lit(&self, device: &mut dyn Device, mesh: &Mesh) -> Result<usize>;
}

/// One draw call per light, accumulated with additive blending
pub struct MultipassLighting<'a> {
    lights: &'a [LightParams],
}

impl<'a> MultipassLighting<'a> {
    pub fn new(lights: &'a [LightParams]) -> Self {
        Self { lights }
    }
}

impl LightingStrategy for MultipassLighting<'_> {
    fn program_name(&self) -> &'static str {
        programs::MULTIPASS
    }

    fn draw_lit(&self, device: &mut dyn Device, mesh: &Mesh) -> Result<usize> {
        if self.lights.is_empty() {
            // ambient and emissive only
            LightParams::none().upload(device)?;
            device.draw_mesh(mesh)?;
            return Ok(1);
        }

        for (pass, light) in self.lights.iter().enumerate() {
            if pass > 0 {
                device.set_blend_enabled(true)?;
                device.set_blend_func(BlendFunc::ADDITIVE)?;
                device.set_uniform("u_ambient_light", Vec3::ZERO.into())?;
                device.set_uniform("u_use_alpha", false.into())?;
                device.set_uniform("u_use_emissive", false.into())?;
            }
            light.upload(device)?;
            device.draw_mesh(mesh)?;
        }
        Ok(self.lights.len())
    }
}

/// One draw call with every light packed into uniform arrays
pub struct SinglepassLighting {
    arrays: LightArrays,
    clamped: usize,
}

impl SinglepassLighting {
    pub fn new(lights: &[LightParams], max_lights: usize) -> Self {
        let (arrays, clamped) = LightArrays::pack(lights, max_lights);
        Self { arrays, clamped }
    }

    /// Lights that did not fit in the arrays
    pub fn clamped(&self) -> usize {
        self.clamped
    }

    pub fn arrays(&self) -> &LightArrays {
        &self.arrays
    }
}

impl LightingStrategy for SinglepassLighting {
    fn program_name(&self) -> &'static str {
        programs::SINGLEPASS
    }

    fn draw_lit(&self, device: &mut dyn Device, mesh: &Mesh) -> Result<usize> {
        self.arrays.upload(device)?;
        device.draw_mesh(mesh)?;
        Ok(1)
    }
}

#[cfg(test)]
#[path = "lighting_tests.rs"]
mod tests;
