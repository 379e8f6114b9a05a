/// Render instructions and their ordering.
///
/// An instruction is one frame's draw intent for one visible mesh node.
/// Instructions are rebuilt by traversal every frame and ordered before
/// any pass consumes them.

use std::cmp::Ordering;
use std::sync::Arc;
use glam::Mat4;
use crate::resource::{Material, Mesh};
use crate::scene::AABB;

/// Lower bound applied to eye distances before they are used as divisors
pub const MIN_SORT_DISTANCE: f32 = 1e-4;

#[derive(Debug, Clone)]
pub struct RenderInstruction {
    /// World transform
    pub model: Mat4,
    pub mesh: Arc<Mesh>,
    pub material: Arc<Material>,
    /// Camera eye to world bounding box center
    pub distance: f32,
    pub world_bounds: AABB,
}

impl RenderInstruction {
    pub fn is_blended(&self) -> bool {
        self.material.is_blended()
    }

    /// `±1 / distance`: negative for opaque and masked, positive for blended.
    pub fn priority_key(&self) -> f32 {
        let factor = if self.is_blended() { 1.0 } else { -1.0 };
        factor / self.distance.max(MIN_SORT_DISTANCE)
    }
}

/// Ordering applied to the frame's instruction list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortPolicy {
    /// Opaque and masked front-to-back, then blended back-to-front
    #[default]
    BackToFront,
    /// Ascending `priority_key`. For positive distances this yields the same
    /// groups and directions as `BackToFront`; ties and near-zero distances
    /// (clamped to `MIN_SORT_DISTANCE`) are where the two can differ.
    InverseDistanceKey,
}

/// Sort instructions in place. The sort is stable, so equal keys keep
/// traversal order.
pub fn order_instructions(instructions: &mut [RenderInstruction], policy: SortPolicy) {
    match policy {
        SortPolicy::BackToFront => instructions.sort_by(back_to_front),
        SortPolicy::InverseDistanceKey => {
            instructions.sort_by(|a, b| a.priority_key().total_cmp(&b.priority_key()))
        }
    }
}

fn back_to_front(a: &RenderInstruction, b: &RenderInstruction) -> Ordering {
    match (a.is_blended(), b.is_blended()) {
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (false, false) => a.distance.total_cmp(&b.distance),
        (true, true) => b.distance.total_cmp(&a.distance),
    }
}

#[cfg(test)]
#[path = "instruction_tests.rs"]
mod tests;
