use crate::api::types::EntityId;
use crate::components::entity::Entity;

/// Flat entity storage. An orrery holds a handful of bodies, so a Vec
/// with linear lookup is all that is needed.
pub struct Scene {
    entities: Vec<Entity>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            entities: Vec::with_capacity(32),
        }
    }

    /// Add an entity to the scene.
    pub fn spawn(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    /// Remove an entity by ID. Returns the removed entity if found.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let idx = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.swap_remove(idx))
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Find the first entity with the given tag.
    pub fn find_by_tag(&self, tag: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.tag == tag)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn spawn_and_get() {
        let mut scene = Scene::new();
        let id = EntityId(1);
        scene.spawn(Entity::new(id).with_pos(Vec3::new(10.0, 0.0, 20.0)));
        let e = scene.get(id).unwrap();
        assert_eq!(e.pos, Vec3::new(10.0, 0.0, 20.0));
    }

    #[test]
    fn get_mut_moves_entity() {
        let mut scene = Scene::new();
        let id = EntityId(7);
        scene.spawn(Entity::new(id));
        scene.get_mut(id).unwrap().pos.x = 42.0;
        assert_eq!(scene.get(id).unwrap().pos.x, 42.0);
    }

    #[test]
    fn despawn_removes_entity() {
        let mut scene = Scene::new();
        let id = EntityId(1);
        scene.spawn(Entity::new(id));
        assert_eq!(scene.len(), 1);
        assert!(scene.despawn(id).is_some());
        assert!(scene.is_empty());
        assert!(scene.despawn(id).is_none());
    }

    #[test]
    fn find_by_tag() {
        let mut scene = Scene::new();
        scene.spawn(Entity::new(EntityId(1)).with_tag("sun"));
        scene.spawn(Entity::new(EntityId(2)).with_tag("earth"));
        let earth = scene.find_by_tag("earth").unwrap();
        assert_eq!(earth.id, EntityId(2));
    }
}
