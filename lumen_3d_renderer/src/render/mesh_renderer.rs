/// Drawing one instruction with its material.
///
/// Every lit or geometry-pass draw goes through `draw_with_material`:
/// enable the program, upload the common uniforms, derive blend and cull
/// state from the material, let the caller issue the actual draw calls,
/// then reset the device to the known baseline state (blending off,
/// depth LESS, alpha-over blend function, backface culling on).

use glam::Vec3;
use crate::camera::Camera;
use crate::device::{BlendFunc, DepthFunc, Device, Placeholder, TextureHandle, UniformValue};
use crate::error::Result;
use crate::resource::{AlphaMode, Material, Mesh};
use crate::engine_trace;
use super::instruction::RenderInstruction;

/// Texture units used by material and shadow samplers
pub mod slots {
    pub const COLOR: u32 = 0;
    pub const EMISSIVE: u32 = 1;
    pub const METALLIC_ROUGHNESS: u32 = 2;
    pub const NORMAL: u32 = 3;
    pub const OCCLUSION: u32 = 4;
    pub const SHADOW_ATLAS: u32 = 5;
}

/// Frame-wide inputs of every material draw
#[derive(Debug, Clone, Copy)]
pub struct DrawContext<'a> {
    pub camera: &'a Camera,
    pub ambient_light: Vec3,
    /// Seconds since the renderer was created
    pub time: f32,
    /// Depth texture of the shadow atlas, when a shadow pass ran
    pub shadow_atlas: Option<TextureHandle>,
}

/// Draw `instruction` with `program`; `draw` issues the draw calls and
/// returns how many it made.
///
/// Returns `None` when the draw is skipped (empty mesh or missing program).
pub fn draw_with_material<F>(
    device: &mut dyn Device,
    ctx: &DrawContext<'_>,
    instruction: &RenderInstruction,
    program: &str,
    draw: F,
) -> Result<Option<usize>>
where
    F: FnOnce(&mut dyn Device, &Mesh) -> Result<usize>,
{
    let mesh = &instruction.mesh;
    let material = &instruction.material;

    if mesh.is_empty() {
        engine_trace!("lumen3d::MeshRenderer", "Skipping empty mesh '{}'", mesh.name());
        return Ok(None);
    }
    if !device.enable_program(program)? {
        engine_trace!("lumen3d::MeshRenderer", "Program '{}' unavailable, skipping '{}'", program, mesh.name());
        return Ok(None);
    }
    debug_assert!(device.is_state_valid(), "device in invalid state before drawing '{}'", mesh.name());

    upload_common(device, ctx, instruction)?;

    device.set_cull_face(!material.two_sided)?;
    device.set_blend_enabled(material.is_blended())?;
    device.set_blend_func(BlendFunc::ALPHA_OVER)?;
    device.set_depth_func(DepthFunc::LessEqual)?;

    let draw_calls = draw(&mut *device, mesh.as_ref())?;

    device.set_blend_enabled(false)?;
    device.set_depth_func(DepthFunc::Less)?;
    device.set_blend_func(BlendFunc::ALPHA_OVER)?;
    device.set_cull_face(true)?;
    device.disable_program()?;

    Ok(Some(draw_calls))
}

fn upload_common(device: &mut dyn Device, ctx: &DrawContext<'_>, instruction: &RenderInstruction) -> Result<()> {
    let material = &instruction.material;

    device.set_uniform("u_viewprojection", ctx.camera.view_projection_matrix().into())?;
    device.set_uniform("u_camera_position", ctx.camera.eye().into())?;
    device.set_uniform("u_model", instruction.model.into())?;
    device.set_uniform("u_time", ctx.time.into())?;

    device.set_uniform("u_color", material.color.into())?;
    device.set_uniform("u_emissive_factor", material.emissive_factor.into())?;
    upload_textures(device, material)?;

    let cutoff = match material.alpha_mode {
        AlphaMode::Mask => material.alpha_cutoff,
        _ => 0.0,
    };
    device.set_uniform("u_alpha_cutoff", cutoff.into())?;
    device.set_uniform("u_ambient_light", ctx.ambient_light.into())?;
    device.set_uniform("u_use_alpha", true.into())?;
    device.set_uniform("u_use_emissive", true.into())?;

    let atlas = ctx
        .shadow_atlas
        .unwrap_or_else(|| device.placeholder_texture(Placeholder::White));
    device.set_uniform("u_shadow_atlas", UniformValue::texture(atlas, slots::SHADOW_ATLAS))?;
    Ok(())
}

/// Bind the five material textures, falling back to neutral placeholders:
/// white where the texture multiplies, black where it adds.
fn upload_textures(device: &mut dyn Device, material: &Material) -> Result<()> {
    let white = device.placeholder_texture(Placeholder::White);
    let black = device.placeholder_texture(Placeholder::Black);

    let bindings = [
        ("u_color_texture", material.color_texture.unwrap_or(white), slots::COLOR),
        ("u_emissive_texture", material.emissive_texture.unwrap_or(black), slots::EMISSIVE),
        ("u_metallic_texture", material.metallic_roughness_texture.unwrap_or(white), slots::METALLIC_ROUGHNESS),
        ("u_normal_texture", material.normal_texture.unwrap_or(white), slots::NORMAL),
        ("u_occlusion_texture", material.occlusion_texture.unwrap_or(white), slots::OCCLUSION),
    ];
    for (name, texture, slot) in bindings {
        device.set_uniform(name, UniformValue::texture(texture, slot))?;
    }
    device.set_uniform("u_has_normal_map", material.normal_texture.is_some().into())?;
    Ok(())
}

#[cfg(test)]
#[path = "mesh_renderer_tests.rs"]
mod tests;
