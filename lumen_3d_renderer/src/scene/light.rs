/// Light payload of a scene entity.
///
/// A light's placement comes from its entity's world matrix: the
/// translation is the light position and the local -Z axis is the
/// direction the light (and its shadow camera) faces.
///
/// Two pieces of per-frame state are written by the renderer: the atlas
/// region assigned by the shadow atlas, and the shadow camera, which is
/// created on the first frame the light gets a region and reused after.

use glam::{Mat4, Vec3, Vec4};
use crate::camera::Camera;
use crate::render::AtlasRegion;

/// Near plane of every shadow camera
pub const SHADOW_CAMERA_NEAR: f32 = 0.1;

/// Light kind. Discriminants are the values uploaded as `u_light_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightType {
    /// Unrecognized light; never lit, never shadowed
    Unknown = 0,
    Point = 1,
    Spot = 2,
    Directional = 3,
}

impl LightType {
    pub fn as_uniform(self) -> i32 {
        self as i32
    }
}

#[derive(Debug, Clone)]
pub struct Light {
    pub light_type: LightType,
    pub color: Vec3,
    pub intensity: f32,
    /// Side of the square covered by a directional light's shadow camera
    pub area_size: f32,
    /// Range of point/spot lights; far plane of the shadow camera
    pub max_dist: f32,
    /// Spot half-angle in degrees
    pub cone_angle: f32,
    pub cone_exp: f32,
    pub target: Vec3,
    pub cast_shadows: bool,
    pub shadow_bias: f32,
    atlas_region: Option<AtlasRegion>,
    shadow_camera: Option<Camera>,
}

impl Light {
    pub fn new(light_type: LightType) -> Self {
        Self {
            light_type,
            color: Vec3::ONE,
            intensity: 1.0,
            area_size: 100.0,
            max_dist: 100.0,
            cone_angle: 30.0,
            cone_exp: 60.0,
            target: Vec3::ONE,
            cast_shadows: false,
            shadow_bias: 0.0,
            atlas_region: None,
            shadow_camera: None,
        }
    }

    pub fn point(color: Vec3, intensity: f32, max_dist: f32) -> Self {
        Self { color, intensity, max_dist, ..Self::new(LightType::Point) }
    }

    pub fn spot(color: Vec3, intensity: f32, max_dist: f32, cone_angle: f32, cone_exp: f32) -> Self {
        Self { color, intensity, max_dist, cone_angle, cone_exp, ..Self::new(LightType::Spot) }
    }

    pub fn directional(color: Vec3, intensity: f32, area_size: f32) -> Self {
        Self { color, intensity, area_size, ..Self::new(LightType::Directional) }
    }

    /// Builder-style toggle for shadow casting.
    pub fn with_shadows(mut self, shadow_bias: f32) -> Self {
        self.cast_shadows = true;
        self.shadow_bias = shadow_bias;
        self
    }

    // ===== PLACEMENT =====

    pub fn position(model: &Mat4) -> Vec3 {
        model.transform_point3(Vec3::ZERO)
    }

    /// Unit vector pointing from lit surfaces towards a directional light (local +Z).
    pub fn direction(model: &Mat4) -> Vec3 {
        model.transform_vector3(Vec3::Z).normalize_or_zero()
    }

    // ===== SHADOW STATE =====

    pub fn atlas_region(&self) -> Option<AtlasRegion> {
        self.atlas_region
    }

    pub(crate) fn set_atlas_region(&mut self, region: Option<AtlasRegion>) {
        self.atlas_region = region;
    }

    pub fn shadow_camera(&self) -> Option<&Camera> {
        self.shadow_camera.as_ref()
    }

    /// Point the shadow camera along the light, creating it on first use.
    ///
    /// Directional lights get an orthographic box `area_size` wide,
    /// spot and point lights a perspective frustum of `2 * cone_angle`.
    pub fn configure_shadow_camera(&mut self, model: &Mat4) -> &Camera {
        let eye = Self::position(model);
        let center = model.transform_point3(Vec3::NEG_Z);
        let up = model.transform_vector3(Vec3::Y);

        let light_type = self.light_type;
        let (half_area, fov, far) = (self.area_size * 0.5, self.cone_angle * 2.0, self.max_dist);

        let camera = self.shadow_camera.get_or_insert_with(Camera::default);
        camera.look_at(eye, center, up);
        if light_type == LightType::Directional {
            camera.set_orthographic(-half_area, half_area, -half_area, half_area, SHADOW_CAMERA_NEAR, far);
        } else {
            camera.set_perspective(fov, 1.0, SHADOW_CAMERA_NEAR, far);
        }
        camera
    }

    /// World space → atlas texture space (xy in the light's region, z depth in [0, 1]).
    ///
    /// `None` when the light has no region this frame.
    pub fn shadow_matrix(&self) -> Option<Mat4> {
        let region = self.atlas_region?;
        let camera = self.shadow_camera.as_ref()?;
        let bias = Mat4::from_translation(Vec3::splat(0.5)) * Mat4::from_scale(Vec3::splat(0.5));
        Some(region.uv_transform() * bias * camera.view_projection_matrix())
    }

    /// Region as (x, y, width, height), zero when unassigned.
    pub fn shadow_region_vec4(&self) -> Vec4 {
        self.atlas_region.map(|r| r.as_vec4()).unwrap_or(Vec4::ZERO)
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::new(LightType::Unknown)
    }
}

#[cfg(test)]
#[path = "light_tests.rs"]
mod tests;
