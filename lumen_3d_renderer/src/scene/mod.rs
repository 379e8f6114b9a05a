//! Scene module
//!
//! Entities (prefab references and lights), the scene that owns them, and
//! the bounding boxes used for culling.

mod aabb;
mod entity;
mod light;
mod scene;

pub use aabb::AABB;
pub use entity::{Entity, EntityKey, EntityKind, PrefabEntity};
pub use light::{Light, LightType, SHADOW_CAMERA_NEAR};
pub use scene::Scene;
