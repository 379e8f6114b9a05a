/// Tests for material draws: common uniforms, texture fallback, state reset

use super::*;
use crate::device::{RecordingDevice, TextureHandle};
use crate::render::programs;
use crate::scene::AABB;
use glam::{Mat4, Vec4};
use std::sync::Arc;

// ============================================================================
// Helper Functions
// ============================================================================

fn instruction_with(material: Material) -> RenderInstruction {
    RenderInstruction {
        model: Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)),
        mesh: Arc::new(Mesh::unit_cube("cube")),
        material: Arc::new(material),
        distance: 10.0,
        world_bounds: AABB::new(Vec3::splat(-0.5), Vec3::splat(0.5)),
    }
}

fn single_draw(device: &mut dyn Device, mesh: &Mesh) -> Result<usize> {
    device.draw_mesh(mesh)?;
    Ok(1)
}

fn draw(device: &mut RecordingDevice, material: Material) -> Option<usize> {
    let camera = Camera::default();
    let ctx = DrawContext { camera: &camera, ambient_light: Vec3::splat(0.1), time: 2.0, shadow_atlas: None };
    draw_with_material(device, &ctx, &instruction_with(material), programs::MULTIPASS, single_draw).unwrap()
}

// ============================================================================
// Common uploads
// ============================================================================

#[test]
fn test_common_uniforms() {
    let mut device = RecordingDevice::new(64, 64);
    let material = Material::new("m").with_color(Vec4::new(0.2, 0.4, 0.6, 1.0));
    assert_eq!(draw(&mut device, material), Some(1));

    let record = &device.draws()[0];
    let camera = Camera::default();
    assert_eq!(record.uniform("u_viewprojection"), Some(&UniformValue::Mat4(camera.view_projection_matrix())));
    assert_eq!(record.uniform("u_camera_position"), Some(&UniformValue::Vec3(camera.eye())));
    assert_eq!(record.uniform("u_model"), Some(&UniformValue::Mat4(Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)))));
    assert_eq!(record.uniform("u_time"), Some(&UniformValue::Float(2.0)));
    assert_eq!(record.uniform("u_color"), Some(&UniformValue::Vec4(Vec4::new(0.2, 0.4, 0.6, 1.0))));
    assert_eq!(record.uniform("u_ambient_light"), Some(&UniformValue::Vec3(Vec3::splat(0.1))));
    assert_eq!(record.uniform("u_use_alpha"), Some(&UniformValue::Bool(true)));
}

#[test]
fn test_alpha_cutoff_only_for_mask() {
    let mut device = RecordingDevice::new(64, 64);
    let mut masked = Material::new("leaves").with_alpha_mode(AlphaMode::Mask);
    masked.alpha_cutoff = 0.3;
    draw(&mut device, masked);
    let mut opaque = Material::new("wall");
    opaque.alpha_cutoff = 0.3;
    draw(&mut device, opaque);

    assert_eq!(device.draws()[0].uniform("u_alpha_cutoff"), Some(&UniformValue::Float(0.3)));
    assert_eq!(device.draws()[1].uniform("u_alpha_cutoff"), Some(&UniformValue::Float(0.0)));
}

// ============================================================================
// Texture fallback
// ============================================================================

#[test]
fn test_missing_textures_use_placeholders() {
    let mut device = RecordingDevice::new(64, 64);
    draw(&mut device, Material::new("plain"));

    let white = device.placeholder_texture(Placeholder::White);
    let black = device.placeholder_texture(Placeholder::Black);
    let record = &device.draws()[0];
    assert_eq!(record.uniform("u_color_texture"), Some(&UniformValue::texture(white, slots::COLOR)));
    assert_eq!(record.uniform("u_emissive_texture"), Some(&UniformValue::texture(black, slots::EMISSIVE)));
    assert_eq!(record.uniform("u_occlusion_texture"), Some(&UniformValue::texture(white, slots::OCCLUSION)));
    assert_eq!(record.uniform("u_has_normal_map"), Some(&UniformValue::Bool(false)));
    assert_eq!(record.uniform("u_shadow_atlas"), Some(&UniformValue::texture(white, slots::SHADOW_ATLAS)));
}

#[test]
fn test_material_textures_bound() {
    let mut device = RecordingDevice::new(64, 64);
    let mut material = Material::new("brick");
    material.color_texture = Some(TextureHandle(40));
    material.normal_texture = Some(TextureHandle(41));
    draw(&mut device, material);

    let record = &device.draws()[0];
    assert_eq!(record.uniform("u_color_texture"), Some(&UniformValue::texture(TextureHandle(40), slots::COLOR)));
    assert_eq!(record.uniform("u_normal_texture"), Some(&UniformValue::texture(TextureHandle(41), slots::NORMAL)));
    assert_eq!(record.uniform("u_has_normal_map"), Some(&UniformValue::Bool(true)));
}

// ============================================================================
// Render state
// ============================================================================

#[test]
fn test_blend_state_from_alpha_mode() {
    let mut device = RecordingDevice::new(64, 64);
    draw(&mut device, Material::new("wall"));
    draw(&mut device, Material::new("glass").with_alpha_mode(AlphaMode::Blend));

    assert!(!device.draws()[0].blend_enabled);
    assert!(device.draws()[1].blend_enabled);
    for record in device.draws() {
        assert_eq!(record.blend_func, BlendFunc::ALPHA_OVER);
        assert_eq!(record.depth_func, DepthFunc::LessEqual);
    }
}

#[test]
fn test_two_sided_disables_culling() {
    let mut device = RecordingDevice::new(64, 64);
    let mut material = Material::new("leaf");
    material.two_sided = true;
    draw(&mut device, material);
    draw(&mut device, Material::new("wall"));
    assert!(!device.draws()[0].cull_face);
    assert!(device.draws()[1].cull_face);
}

#[test]
fn test_state_restored_after_draw() {
    let mut device = RecordingDevice::new(64, 64);
    let camera = Camera::default();
    let ctx = DrawContext { camera: &camera, ambient_light: Vec3::ZERO, time: 0.0, shadow_atlas: None };
    let mut material = Material::new("glass").with_alpha_mode(AlphaMode::Blend);
    material.two_sided = true;
    let glass = instruction_with(material);

    draw_with_material(&mut device, &ctx, &glass, programs::MULTIPASS, |device, mesh| {
        device.set_blend_func(BlendFunc::ADDITIVE)?;
        device.draw_mesh(mesh)?;
        Ok(1)
    })
    .unwrap();

    assert!(!device.blend_enabled());
    assert_eq!(device.depth_func(), DepthFunc::Less);
    assert_eq!(device.blend_func(), BlendFunc::ALPHA_OVER);
    assert!(device.cull_face());
    assert!(device.current_program().is_none());
}

// ============================================================================
// Skips
// ============================================================================

#[test]
fn test_empty_mesh_skipped() {
    let mut device = RecordingDevice::new(64, 64);
    let camera = Camera::default();
    let ctx = DrawContext { camera: &camera, ambient_light: Vec3::ZERO, time: 0.0, shadow_atlas: None };
    let mut instruction = instruction_with(Material::default());
    instruction.mesh = Arc::new(Mesh::new("empty", 0, 0, AABB::new(Vec3::ZERO, Vec3::ZERO)));

    let result = draw_with_material(&mut device, &ctx, &instruction, programs::MULTIPASS, single_draw).unwrap();
    assert!(result.is_none());
    assert!(device.commands().is_empty());
}

#[test]
fn test_missing_program_skipped() {
    let mut device = RecordingDevice::new(64, 64);
    device.remove_program(programs::MULTIPASS);
    assert_eq!(draw(&mut device, Material::default()), None);
    assert_eq!(device.draw_count(), 0);
}

#[test]
#[should_panic(expected = "invalid state")]
#[cfg(debug_assertions)]
fn test_invalid_device_state_asserts_in_debug() {
    let mut device = RecordingDevice::new(64, 64);
    device.poison();
    draw(&mut device, Material::default());
}
