/// Scene — the entity list consumed by the renderer each frame.
///
/// Entities live in a SlotMap for stable keys; a separate key list keeps
/// insertion order, which is the order lights and prefabs are visited in.

use glam::Vec3;
use slotmap::SlotMap;
use super::entity::{Entity, EntityKey};

pub struct Scene {
    entities: SlotMap<EntityKey, Entity>,
    order: Vec<EntityKey>,
    /// Frame clear color
    pub background_color: Vec3,
    /// Uploaded as `u_ambient_light` on the first light pass
    pub ambient_light: Vec3,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            entities: SlotMap::with_key(),
            order: Vec::new(),
            background_color: Vec3::ZERO,
            ambient_light: Vec3::ZERO,
        }
    }

    /// Append an entity; it is visited after every entity already present.
    pub fn add_entity(&mut self, entity: Entity) -> EntityKey {
        let key = self.entities.insert(entity);
        self.order.push(key);
        key
    }

    /// Remove an entity. Returns it, or `None` if the key is stale.
    pub fn remove_entity(&mut self, key: EntityKey) -> Option<Entity> {
        let entity = self.entities.remove(key)?;
        self.order.retain(|&k| k != key);
        Some(entity)
    }

    pub fn entity(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    pub fn entity_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.entities.get_mut(key)
    }

    /// Iterate entities in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = (EntityKey, &Entity)> + '_ {
        self.order.iter().map(move |&key| (key, &self.entities[key]))
    }

    pub fn find_by_name(&self, name: &str) -> Option<EntityKey> {
        self.entities()
            .find(|(_, entity)| entity.name == name)
            .map(|(key, _)| key)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Destroy every entity (and with them, light shadow cameras).
    pub fn clear(&mut self) {
        self.entities.clear();
        self.order.clear();
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
