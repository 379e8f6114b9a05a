/// Tests for Prefab, Node and Mesh

use super::*;
use crate::scene::AABB;
use glam::Vec3;

// ============================================================================
// Helper Functions
// ============================================================================

fn cube() -> Arc<Mesh> {
    Arc::new(Mesh::unit_cube("cube"))
}

fn material() -> Arc<Material> {
    Arc::new(Material::default())
}

// ============================================================================
// Mesh
// ============================================================================

#[test]
fn test_unit_cube_bounds() {
    let mesh = Mesh::unit_cube("cube");
    assert_eq!(mesh.name(), "cube");
    assert_eq!(mesh.vertex_count(), 24);
    assert_eq!(mesh.index_count(), 36);
    assert_eq!(mesh.bounds().half_size(), Vec3::splat(0.5));
    assert!(!mesh.is_empty());
}

#[test]
fn test_mesh_without_vertices_is_empty() {
    let mesh = Mesh::new("empty", 0, 0, AABB::new(Vec3::ZERO, Vec3::ZERO));
    assert!(mesh.is_empty());
}

// ============================================================================
// Node tree
// ============================================================================

#[test]
fn test_node_defaults() {
    let node = Node::new("root");
    assert!(node.visible);
    assert_eq!(node.model, Mat4::IDENTITY);
    assert!(node.mesh.is_none());
    assert!(node.material.is_none());
    assert!(node.children.is_empty());
}

#[test]
fn test_node_tree_building() {
    let root = Node::new("root")
        .with_child(Node::with_mesh("a", cube(), material()))
        .with_child(Node::new("b").with_child(Node::with_mesh("c", cube(), material())));

    assert_eq!(root.children.len(), 2);
    assert_eq!(root.node_count(), 4);
    assert_eq!(root.children[1].children[0].name, "c");
}

#[test]
fn test_single_prefab() {
    let prefab = Prefab::single("crate", cube(), material());
    assert_eq!(prefab.name, "crate");
    assert_eq!(prefab.root.name, "crate");
    assert!(prefab.root.mesh.is_some());
    assert!(prefab.root.material.is_some());
}
