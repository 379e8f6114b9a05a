/// Resource-level mesh type.
///
/// Vertex data lives on the device; the renderer only needs the mesh's
/// identity, whether it has anything to draw, and its local bounding box.

use glam::Vec3;
use crate::scene::AABB;

#[derive(Debug, Clone)]
pub struct Mesh {
    name: String,
    vertex_count: u32,
    index_count: u32,
    bounds: AABB,
}

impl Mesh {
    pub fn new(name: impl Into<String>, vertex_count: u32, index_count: u32, bounds: AABB) -> Self {
        Self {
            name: name.into(),
            vertex_count,
            index_count,
            bounds,
        }
    }

    /// Indexed unit cube centered on the origin (24 vertices, 36 indices).
    pub fn unit_cube(name: impl Into<String>) -> Self {
        Self::new(name, 24, 36, AABB::new(Vec3::splat(-0.5), Vec3::splat(0.5)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Bounding box in mesh-local space
    pub fn bounds(&self) -> &AABB {
        &self.bounds
    }

    /// A mesh with no vertices produces no draw call.
    pub fn is_empty(&self) -> bool {
        self.vertex_count == 0
    }
}
