/// Scene entities: a closed set of payloads matched by the renderer.

use std::sync::Arc;
use glam::Mat4;
use slotmap::new_key_type;
use crate::resource::Prefab;
use super::light::Light;

new_key_type! {
    /// Stable key for an Entity within a Scene.
    ///
    /// Keys stay valid when other entities are removed.
    pub struct EntityKey;
}

/// Prefab reference
#[derive(Debug, Clone, Default)]
pub struct PrefabEntity {
    /// Asset path the prefab was loaded from
    pub filename: String,
    /// Loaded prefab; `None` when loading failed (the entity draws nothing)
    pub prefab: Option<Arc<Prefab>>,
}

/// Entity payload
#[derive(Debug, Clone)]
pub enum EntityKind {
    Prefab(PrefabEntity),
    Light(Light),
}

/// One element of the scene
#[derive(Debug, Clone)]
pub struct Entity {
    pub name: String,
    /// World transform
    pub model: Mat4,
    pub visible: bool,
    pub kind: EntityKind,
}

impl Entity {
    pub fn prefab(name: impl Into<String>, model: Mat4, prefab: Arc<Prefab>) -> Self {
        Self {
            name: name.into(),
            model,
            visible: true,
            kind: EntityKind::Prefab(PrefabEntity {
                filename: prefab.name.clone(),
                prefab: Some(prefab),
            }),
        }
    }

    pub fn light(name: impl Into<String>, model: Mat4, light: Light) -> Self {
        Self {
            name: name.into(),
            model,
            visible: true,
            kind: EntityKind::Light(light),
        }
    }

    pub fn as_light(&self) -> Option<&Light> {
        match &self.kind {
            EntityKind::Light(light) => Some(light),
            EntityKind::Prefab(_) => None,
        }
    }

    pub fn as_light_mut(&mut self) -> Option<&mut Light> {
        match &mut self.kind {
            EntityKind::Light(light) => Some(light),
            EntityKind::Prefab(_) => None,
        }
    }

    pub fn as_prefab(&self) -> Option<&Arc<Prefab>> {
        match &self.kind {
            EntityKind::Prefab(entity) => entity.prefab.as_ref(),
            EntityKind::Light(_) => None,
        }
    }
}
