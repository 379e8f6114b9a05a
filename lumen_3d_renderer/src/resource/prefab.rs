/// Prefabs: shared, read-only node trees loaded from assets.
///
/// A node's `model` is relative to its parent. The renderer walks the
/// tree every frame and never mutates it, so prefabs are shared through
/// `Arc` between every entity that instantiates them.

use std::sync::Arc;
use glam::Mat4;
use super::material::Material;
use super::mesh::Mesh;

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    /// An invisible node hides its whole subtree
    pub visible: bool,
    /// Transform relative to the parent node
    pub model: Mat4,
    pub mesh: Option<Arc<Mesh>>,
    pub material: Option<Arc<Material>>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            model: Mat4::IDENTITY,
            mesh: None,
            material: None,
            children: Vec::new(),
        }
    }

    /// Node carrying a drawable mesh+material pair.
    pub fn with_mesh(name: impl Into<String>, mesh: Arc<Mesh>, material: Arc<Material>) -> Self {
        Self {
            mesh: Some(mesh),
            material: Some(material),
            ..Self::new(name)
        }
    }

    pub fn with_model(mut self, model: Mat4) -> Self {
        self.model = model;
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Number of nodes in this subtree, this node included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Node::node_count).sum::<usize>()
    }
}

#[derive(Debug, Clone)]
pub struct Prefab {
    pub name: String,
    pub root: Node,
}

impl Prefab {
    pub fn new(name: impl Into<String>, root: Node) -> Self {
        Self { name: name.into(), root }
    }

    /// Single-node prefab drawing one mesh with one material.
    pub fn single(name: impl Into<String>, mesh: Arc<Mesh>, material: Arc<Material>) -> Self {
        let name = name.into();
        let root = Node::with_mesh(name.clone(), mesh, material);
        Self { name, root }
    }
}

#[cfg(test)]
#[path = "prefab_tests.rs"]
mod tests;
