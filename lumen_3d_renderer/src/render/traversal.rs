/// Scene traversal: builds the frame's light list and instruction list.
///
/// Two passes over the entity list, both in insertion order. Lights are
/// classified and culled first, then every visible prefab's node tree is
/// walked and each visible mesh node becomes one RenderInstruction.

use glam::Mat4;
use crate::camera::Camera;
use crate::resource::Node;
use crate::scene::{EntityKey, EntityKind, LightType, Scene};
use crate::engine_debug;
use super::instruction::RenderInstruction;

/// Per-frame working set, cleared at the start of every frame
#[derive(Debug, Default)]
pub struct FrameState {
    pub instructions: Vec<RenderInstruction>,
    /// Active lights, in entity order
    pub lights: Vec<EntityKey>,
    pub culled_nodes: usize,
    pub dropped_lights: usize,
}

impl FrameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.instructions.clear();
        self.lights.clear();
        self.culled_nodes = 0;
        self.dropped_lights = 0;
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }
}

/// Light pass.
///
/// Unknown lights are dropped. Point lights survive only if their range
/// sphere touches the camera frustum. Spot and directional lights are
/// always kept.
pub fn collect_lights(scene: &Scene, camera: &Camera, frame: &mut FrameState) {
    for (key, entity) in scene.entities() {
        if !entity.visible {
            continue;
        }
        let EntityKind::Light(light) = &entity.kind else {
            continue;
        };

        let keep = match light.light_type {
            LightType::Unknown => {
                engine_debug!("lumen3d::SceneTraversal", "Dropping light '{}' of unknown type", entity.name);
                false
            }
            LightType::Point => {
                let position = crate::scene::Light::position(&entity.model);
                camera.test_sphere_in_frustum(position, light.max_dist)
            }
            LightType::Spot | LightType::Directional => true,
        };

        if keep {
            frame.lights.push(key);
        } else {
            frame.dropped_lights += 1;
        }
    }
}

/// Geometry pass.
pub fn collect_instructions(scene: &Scene, camera: &Camera, frame: &mut FrameState) {
    for (_, entity) in scene.entities() {
        if !entity.visible {
            continue;
        }
        if let Some(prefab) = entity.as_prefab() {
            visit_node(&prefab.root, &entity.model, camera, frame);
        }
    }
}

/// An invisible node prunes its whole subtree.
fn visit_node(node: &Node, parent_model: &Mat4, camera: &Camera, frame: &mut FrameState) {
    if !node.visible {
        return;
    }

    let model = *parent_model * node.model;

    if let (Some(mesh), Some(material)) = (&node.mesh, &node.material) {
        let world_bounds = mesh.bounds().transformed(&model);
        if camera.test_box_in_frustum(&world_bounds) {
            frame.instructions.push(RenderInstruction {
                model,
                mesh: mesh.clone(),
                material: material.clone(),
                distance: camera.distance_to(world_bounds.center()),
                world_bounds,
            });
        } else {
            frame.culled_nodes += 1;
        }
    }

    for child in &node.children {
        visit_node(child, &model, camera, frame);
    }
}

#[cfg(test)]
#[path = "traversal_tests.rs"]
mod tests;
