//! Resource module
//!
//! Data-only descriptions of what gets drawn: meshes, materials and the
//! prefab node trees that pair them. Asset loading is not done here.

mod material;
mod mesh;
mod prefab;

pub use material::{AlphaMode, Material};
pub use mesh::Mesh;
pub use prefab::{Node, Prefab};
