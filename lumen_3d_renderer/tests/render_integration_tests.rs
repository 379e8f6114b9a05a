//! Integration tests for full frames against the recording device
//!
//! Each test builds a scene, renders one or more frames through
//! SceneRenderer and inspects what reached the device.
//!
//! Run with: cargo test --test render_integration_tests


use lumen_3d_renderer::glam::{Mat4, Vec3, Vec4};
use lumen_3d_renderer::lumen3d::camera::Camera;
use lumen_3d_renderer::lumen3d::device::{
    BlendFunc, DepthFunc, Device, Placeholder, RecordingDevice, TextureHandle, UniformValue,
};
use lumen_3d_renderer::lumen3d::render::{
    programs, LightingMode, PipelineMode, RendererConfig, SceneRenderer, ShadowAtlasLayout, SortPolicy,
};
use lumen_3d_renderer::lumen3d::resource::{AlphaMode, Material, Mesh, Node, Prefab};
use lumen_3d_renderer::lumen3d::scene::{Entity, Light, LightType, Scene};
use scene_test_utils::*;
use std::sync::Arc;

// ============================================================================
// Helper Functions
// ============================================================================

fn render(renderer: &mut SceneRenderer, scene: &mut Scene) -> RecordingDevice {
    let mut device = RecordingDevice::new(800, 600);
    renderer.render_scene(&mut device, scene, &Camera::default()).unwrap();
    device
}

fn instruction_names(renderer: &SceneRenderer) -> Vec<String> {
    renderer.frame().instructions.iter().map(|i| i.mesh.name().to_string()).collect()
}

// ============================================================================
// ORDERING
// ============================================================================

#[test]
fn test_integration_opaque_then_translucent_scenario() {
    let mut scene = Scene::new();
    add_light(&mut scene, "sun", Mat4::IDENTITY, Light::directional(Vec3::ONE, 1.0, 100.0));
    add_cube_at_distance(&mut scene, "opaque50", 50.0, AlphaMode::Opaque);
    add_cube_at_distance(&mut scene, "glass10", 10.0, AlphaMode::Blend);
    add_cube_at_distance(&mut scene, "opaque5", 5.0, AlphaMode::Opaque);

    let mut renderer = SceneRenderer::default();
    let device = render(&mut renderer, &mut scene);

    let names = instruction_names(&renderer);
    assert_eq!(names.len(), 3);
    assert_eq!(names[2], "glass10");
    assert!(names[..2].contains(&"opaque5".to_string()));
    assert!(names[..2].contains(&"opaque50".to_string()));
    assert_eq!(renderer.frame().light_count(), 1);

    // draw order on the device follows the instruction order
    let drawn: Vec<_> = device.draws().iter().filter_map(|d| d.mesh.clone()).collect();
    assert_eq!(drawn, names);
}

#[test]
fn test_integration_translucent_back_to_front() {
    let mut scene = Scene::new();
    add_cube_at_distance(&mut scene, "near", 4.0, AlphaMode::Blend);
    add_cube_at_distance(&mut scene, "far", 30.0, AlphaMode::Blend);
    add_cube_at_distance(&mut scene, "mid", 12.0, AlphaMode::Blend);

    let mut renderer = SceneRenderer::default();
    render(&mut renderer, &mut scene);
    assert_eq!(instruction_names(&renderer), vec!["far", "mid", "near"]);

    // nearer blended instructions get larger keys, so the key sort agrees
    renderer.config_mut().transparency_sort = SortPolicy::InverseDistanceKey;
    render(&mut renderer, &mut scene);
    assert_eq!(instruction_names(&renderer), vec!["far", "mid", "near"]);
}

// ============================================================================
// CULLING
// ============================================================================

#[test]
fn test_integration_point_light_culling() {
    let mut scene = Scene::new();
    let near = add_light(&mut scene, "near", translation(0.0, 0.0, 0.0), Light::point(Vec3::ONE, 1.0, 5.0));
    add_light(&mut scene, "far_side", translation(300.0, 0.0, 0.0), Light::point(Vec3::ONE, 1.0, 5.0));
    add_light(&mut scene, "behind", translation(0.0, 0.0, 60.0), Light::point(Vec3::ONE, 1.0, 20.0));
    add_light(&mut scene, "unknown", Mat4::IDENTITY, Light::new(LightType::Unknown));

    let mut renderer = SceneRenderer::default();
    render(&mut renderer, &mut scene);
    assert_eq!(renderer.frame().lights, vec![near]);
    assert_eq!(renderer.last_stats().dropped_lights, 3);
}

#[test]
fn test_integration_invisible_nodes_prune_subtrees() {
    let cube = Arc::new(Mesh::unit_cube("cube"));
    let material = Arc::new(Material::default());
    let mut hidden_branch = Node::new("branch").with_child(Node::with_mesh("leaf", cube.clone(), material.clone()));
    hidden_branch.visible = false;
    let root = Node::new("root")
        .with_child(hidden_branch)
        .with_child(Node::with_mesh("trunk", cube, material));

    let mut scene = Scene::new();
    scene.add_entity(Entity::prefab("tree", Mat4::IDENTITY, Arc::new(Prefab::new("tree", root))));

    let mut renderer = SceneRenderer::default();
    render(&mut renderer, &mut scene);
    assert_eq!(renderer.frame().instructions.len(), 1);
}

// ============================================================================
// SHADOW ATLAS
// ============================================================================

#[test]
fn test_integration_eight_spots_six_regions() {
    let mut scene = Scene::new();
    add_cube_at_distance(&mut scene, "floor", 10.0, AlphaMode::Opaque);
    let spots: Vec<_> = (0..8)
        .map(|i| add_light(&mut scene, "spot", translation(i as f32 * 2.0, 6.0, -(i as f32)), shadowed_spot()))
        .collect();

    let mut renderer = SceneRenderer::default();
    let device = render(&mut renderer, &mut scene);

    let layout = ShadowAtlasLayout::default();
    let regions: Vec<_> = spots
        .iter()
        .map(|&key| scene.entity(key).unwrap().as_light().unwrap().atlas_region())
        .collect();
    assert_eq!(regions.iter().filter(|r| r.is_some()).count(), 6);
    assert_eq!(regions.iter().filter(|r| r.is_none()).count(), 2);
    for region in regions.iter().flatten() {
        assert!(layout.regions().contains(region));
    }
    // no region handed out twice
    let mut assigned: Vec<_> = regions.iter().flatten().map(|r| r.as_vec4().to_array().map(f32::to_bits)).collect();
    assigned.sort();
    assigned.dedup();
    assert_eq!(assigned.len(), 6);

    let stats = renderer.last_stats();
    assert_eq!(stats.shadow_regions, 6);
    assert_eq!(stats.dropped_shadow_casters, 2);
    assert_eq!(device.draws_with_program(programs::DEPTH).count(), 6);
}

#[test]
fn test_integration_shadow_camera_created_once() {
    let mut scene = Scene::new();
    add_cube_at_distance(&mut scene, "floor", 10.0, AlphaMode::Opaque);
    let spot = add_light(&mut scene, "spot", translation(0.0, 6.0, 0.0), shadowed_spot());
    let mut renderer = SceneRenderer::default();
    let mut device = RecordingDevice::new(800, 600);

    renderer.render_scene(&mut device, &mut scene, &Camera::default()).unwrap();
    let first = scene.entity(spot).unwrap().as_light().unwrap().shadow_camera().unwrap().eye();

    scene.entity_mut(spot).unwrap().model = translation(3.0, 6.0, 0.0);
    renderer.render_scene(&mut device, &mut scene, &Camera::default()).unwrap();
    let second = scene.entity(spot).unwrap().as_light().unwrap().shadow_camera().unwrap().eye();

    assert_eq!(first, Vec3::new(0.0, 6.0, 0.0));
    assert_eq!(second, Vec3::new(3.0, 6.0, 0.0));
    assert_eq!(device.frame_buffer_count(), 1);
}

#[test]
fn test_integration_shadow_pass_skips_translucent() {
    let mut scene = Scene::new();
    add_cube_at_distance(&mut scene, "wall", 10.0, AlphaMode::Opaque);
    add_cube_at_distance(&mut scene, "glass", 8.0, AlphaMode::Blend);
    add_light(&mut scene, "spot", translation(0.0, 6.0, 0.0), shadowed_spot());

    let mut renderer = SceneRenderer::default();
    let device = render(&mut renderer, &mut scene);
    let shadow_meshes: Vec<_> = device
        .draws_with_program(programs::DEPTH)
        .filter_map(|d| d.mesh.clone())
        .collect();
    assert_eq!(shadow_meshes, vec!["wall"]);
}

#[test]
fn test_integration_shadow_state_identical_across_frames() {
    let mut scene = Scene::new();
    let mut leaf = Material::new("leaf");
    leaf.two_sided = true;
    add_cube(&mut scene, "leaf", Vec3::ZERO, leaf);
    add_light(&mut scene, "spot", translation(0.0, 6.0, 0.0), shadowed_spot());

    let mut device = RecordingDevice::new(800, 600);
    let mut renderer = SceneRenderer::default();
    let camera = Camera::default();
    let mut depth_culling = Vec::new();
    for _ in 0..2 {
        device.clear_log();
        renderer.render_scene(&mut device, &mut scene, &camera).unwrap();
        let culling: Vec<bool> = device.draws_with_program(programs::DEPTH).map(|d| d.cull_face).collect();
        depth_culling.push(culling);
    }

    assert_eq!(depth_culling[0], vec![false]);
    assert_eq!(depth_culling[0], depth_culling[1]);
    assert!(device.cull_face());
}

// ============================================================================
// LIGHTING
// ============================================================================

#[test]
fn test_integration_multipass_ambient_idempotence() {
    let mut scene = Scene::new();
    scene.ambient_light = Vec3::splat(0.3);
    add_cube_at_distance(&mut scene, "box", 10.0, AlphaMode::Opaque);
    for i in 0..4 {
        add_light(&mut scene, "lamp", translation(i as f32, 2.0, 0.0), Light::point(Vec3::ONE, 1.0, 30.0));
    }

    let mut renderer = SceneRenderer::default();
    let device = render(&mut renderer, &mut scene);
    let passes: Vec<_> = device.draws_with_program(programs::MULTIPASS).collect();
    assert_eq!(passes.len(), 4);

    assert_eq!(passes[0].uniform("u_ambient_light"), Some(&UniformValue::Vec3(Vec3::splat(0.3))));
    assert!(!passes[0].blend_enabled);
    for pass in &passes[1..] {
        assert_eq!(pass.uniform("u_ambient_light"), Some(&UniformValue::Vec3(Vec3::ZERO)));
        assert!(pass.blend_enabled);
        assert_eq!(pass.blend_func, BlendFunc::ADDITIVE);
        assert_eq!(pass.depth_func, DepthFunc::LessEqual);
    }
}

#[test]
fn test_integration_device_state_reset_after_frame() {
    let mut scene = Scene::new();
    add_cube_at_distance(&mut scene, "glass", 10.0, AlphaMode::Blend);
    add_light(&mut scene, "a", Mat4::IDENTITY, Light::directional(Vec3::ONE, 1.0, 50.0));
    add_light(&mut scene, "b", Mat4::IDENTITY, Light::directional(Vec3::ONE, 1.0, 50.0));

    let mut renderer = SceneRenderer::default();
    let device = render(&mut renderer, &mut scene);
    assert!(!device.blend_enabled());
    assert_eq!(device.depth_func(), DepthFunc::Less);
    assert_eq!(device.blend_func(), BlendFunc::ALPHA_OVER);
}

#[test]
fn test_integration_singlepass_matches_multipass_light_data() {
    let mut scene = Scene::new();
    add_cube_at_distance(&mut scene, "box", 10.0, AlphaMode::Opaque);
    add_light(&mut scene, "lamp", translation(1.0, 2.0, 0.0), Light::point(Vec3::new(1.0, 0.5, 0.0), 3.0, 30.0));
    add_light(&mut scene, "spot", translation(0.0, 6.0, 0.0), shadowed_spot());

    let mut multi = SceneRenderer::default();
    let multi_device = render(&mut multi, &mut scene);
    let config = RendererConfig { lighting: LightingMode::Singlepass, ..Default::default() };
    let mut single = SceneRenderer::new(config);
    let single_device = render(&mut single, &mut scene);

    let multi_colors: Vec<_> = multi_device
        .draws_with_program(programs::MULTIPASS)
        .filter_map(|d| match d.uniform("u_light_color") {
            Some(UniformValue::Vec3(c)) => Some(*c),
            _ => None,
        })
        .collect();
    let single_draw = single_device.draws_with_program(programs::SINGLEPASS).next().unwrap();
    assert_eq!(single_draw.uniform("u_light_colors"), Some(&UniformValue::Vec3Array(multi_colors)));

    let multi_shadow = multi_device.draws_with_program(programs::MULTIPASS).nth(1).unwrap().uniform("u_shadow_viewproj").cloned();
    let Some(UniformValue::Mat4Array(single_shadows)) = single_draw.uniform("u_light_shadow_viewprojs").cloned() else {
        panic!("missing shadow matrices");
    };
    assert_eq!(multi_shadow, Some(UniformValue::Mat4(single_shadows[1])));
}

#[test]
fn test_integration_unlit_scene_still_draws() {
    let mut scene = Scene::new();
    scene.ambient_light = Vec3::splat(0.2);
    add_cube_at_distance(&mut scene, "box", 10.0, AlphaMode::Opaque);

    let mut renderer = SceneRenderer::default();
    let device = render(&mut renderer, &mut scene);
    assert_eq!(device.draw_count(), 1);
    assert_eq!(device.draws()[0].uniform("u_light_type"), Some(&UniformValue::Int(0)));
}

// ============================================================================
// TEXTURE FALLBACK
// ============================================================================

#[test]
fn test_integration_texture_fallback() {
    let mut scene = Scene::new();
    add_cube(&mut scene, "plain", Vec3::ZERO, Material::new("plain").with_color(Vec4::new(0.8, 0.1, 0.1, 1.0)));
    let mut mapped = Material::new("mapped");
    mapped.normal_texture = Some(TextureHandle(100));
    add_cube(&mut scene, "mapped", Vec3::new(0.0, 0.0, -3.0), mapped);

    let mut renderer = SceneRenderer::default();
    let device = render(&mut renderer, &mut scene);
    let white = device.placeholder_texture(Placeholder::White);

    let plain = device.draws().iter().find(|d| d.mesh.as_deref() == Some("plain")).unwrap();
    assert_eq!(plain.uniform("u_has_normal_map"), Some(&UniformValue::Bool(false)));
    assert_eq!(plain.uniform("u_color_texture"), Some(&UniformValue::texture(white, 0)));
    assert_eq!(plain.uniform("u_color"), Some(&UniformValue::Vec4(Vec4::new(0.8, 0.1, 0.1, 1.0))));

    let mapped = device.draws().iter().find(|d| d.mesh.as_deref() == Some("mapped")).unwrap();
    assert_eq!(mapped.uniform("u_has_normal_map"), Some(&UniformValue::Bool(true)));
}

// ============================================================================
// DEFERRED
// ============================================================================

#[test]
fn test_integration_deferred_frame() {
    let mut scene = Scene::new();
    add_cube_at_distance(&mut scene, "box", 10.0, AlphaMode::Opaque);
    add_cube_at_distance(&mut scene, "glass", 6.0, AlphaMode::Blend);
    add_light(&mut scene, "lamp", translation(0.0, 3.0, 0.0), Light::point(Vec3::ONE, 1.0, 30.0));
    add_light(&mut scene, "sun", Mat4::IDENTITY, Light::directional(Vec3::ONE, 1.0, 50.0));

    let config = RendererConfig { pipeline: PipelineMode::Deferred, ..Default::default() };
    let mut renderer = SceneRenderer::new(config);
    let mut device = RecordingDevice::new(800, 600);
    let camera = Camera::default();

    renderer.render_scene(&mut device, &mut scene, &camera).unwrap();
    renderer.render_scene(&mut device, &mut scene, &camera).unwrap();

    // geometry and illumination buffers, created once
    assert_eq!(device.frame_buffer_count(), 2);
    let resolves: Vec<_> = device.draws_with_program(programs::DEFERRED_RESOLVE).collect();
    assert_eq!(resolves.len(), 2);
    assert_eq!(resolves[1].uniform("u_num_lights"), Some(&UniformValue::Int(2)));
    assert_eq!(device.draws_with_program(programs::GBUFFERS).count(), 4);
    assert_eq!(device.draws_with_program(programs::MULTIPASS).count(), 0);
}

#[test]
fn test_integration_missing_programs_produce_incomplete_frame() {
    let mut scene = Scene::new();
    add_cube_at_distance(&mut scene, "box", 10.0, AlphaMode::Opaque);
    add_light(&mut scene, "spot", translation(0.0, 6.0, 0.0), shadowed_spot());

    let mut device = RecordingDevice::new(800, 600);
    device.remove_program(programs::MULTIPASS);
    device.remove_program(programs::DEPTH);
    let mut renderer = SceneRenderer::default();
    let stats = renderer.render_scene(&mut device, &mut scene, &Camera::default()).unwrap();

    assert_eq!(device.draw_count(), 0);
    assert_eq!(stats.skipped_draws, 2);
    assert_eq!(stats.instructions, 1);
}
