use std::collections::{HashMap, HashSet, VecDeque};

use crate::entity::{Body, Entity, EntityId, Kind};
use crate::error::{AdvError, AdvResult};

/// Owns every entity and acts as the registry.
///
/// The registry is itself an entity (the root). Every spawned entity is linked
/// into the root's edge set by name; that edge set is the global namespace used
/// for lookups, while presence in rooms and inventories is tracked separately.
#[derive(Debug, Clone)]
pub struct World {
    root: EntityId,
    entities: HashMap<EntityId, Entity>,
}

impl Default for World {
    fn default() -> Self {
        Self::new("world", "The world as we know it")
    }
}

impl World {
    /// Create a world whose root registry has the given name and description.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let root = Entity::new(name, description, Body::World);
        let id = root.id;
        let mut entities = HashMap::new();
        entities.insert(id, root);
        Self { root: id, entities }
    }

    /// The registry root.
    pub fn root(&self) -> EntityId {
        self.root
    }

    // -----------------------------------------------------------------------
    // Entity CRUD
    // -----------------------------------------------------------------------

    /// Register an entity. Fails with `LinkConflict` if the name is taken.
    pub fn spawn(&mut self, entity: Entity) -> AdvResult<EntityId> {
        let id = entity.id;
        self.entity_mut(self.root)?
            .links
            .insert(&entity.name, id, false)?;
        tracing::debug!(name = %entity.name, %id, "spawned");
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Get an entity by ID.
    pub fn entity(&self, id: EntityId) -> AdvResult<&Entity> {
        self.entities.get(&id).ok_or(AdvError::EntityMissing(id))
    }

    /// Get a mutable entity by ID.
    pub fn entity_mut(&mut self, id: EntityId) -> AdvResult<&mut Entity> {
        self.entities.get_mut(&id).ok_or(AdvError::EntityMissing(id))
    }

    /// Whether an ID still resolves.
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// The name of an entity.
    pub fn name_of(&self, id: EntityId) -> AdvResult<&str> {
        self.entity(id).map(|e| e.name.as_str())
    }

    /// Names of several entities, skipping any that no longer exist.
    pub fn names_of(&self, ids: &[EntityId]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| self.entities.get(id))
            .map(|e| e.name.clone())
            .collect()
    }

    /// Exact registry lookup.
    pub fn lookup(&self, name: &str) -> AdvResult<EntityId> {
        self.entity(self.root)?
            .links
            .get(name)
            .ok_or_else(|| AdvError::NotFound(name.to_string()))
    }

    /// Case-insensitive registry lookup.
    pub fn find(&self, name: &str) -> Option<EntityId> {
        let root = self.entities.get(&self.root)?;
        root.links.get(name).or_else(|| {
            root.links
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, id)| id)
        })
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Entities linked directly into the registry that match `kind`.
    pub fn get_all(&self, kind: Kind) -> Vec<&Entity> {
        let Some(root) = self.entities.get(&self.root) else {
            return Vec::new();
        };
        root.links
            .iter()
            .filter_map(|(_, id)| self.entities.get(&id))
            .filter(|e| e.is(kind))
            .collect()
    }

    /// A registered entity of the given kind, or `NotFound`.
    pub fn get(&self, name: &str, kind: Kind) -> AdvResult<EntityId> {
        self.get_all(kind)
            .into_iter()
            .find(|e| e.name == name)
            .map(|e| e.id)
            .ok_or_else(|| AdvError::NotFound(name.to_string()))
    }

    /// Every registered entity in registry order.
    pub fn all_entities(&self) -> Vec<&Entity> {
        self.get_all(Kind::Any)
    }

    /// Number of registered entities (the root is not counted).
    pub fn entity_count(&self) -> usize {
        self.entities
            .get(&self.root)
            .map(|root| root.links.len())
            .unwrap_or(0)
    }

    // -----------------------------------------------------------------------
    // Edges
    // -----------------------------------------------------------------------

    /// Link `to` into `from`'s edge set under `to`'s name.
    pub fn link(&mut self, from: EntityId, to: EntityId, replace: bool) -> AdvResult<()> {
        let name = self.name_of(to)?.to_string();
        self.entity_mut(from)?.links.insert(&name, to, replace)
    }

    /// Remove the edge `name` from `from` and return its target.
    pub fn unlink(&mut self, from: EntityId, name: &str) -> AdvResult<EntityId> {
        self.entity_mut(from)?.links.remove(name)
    }

    /// Follow the edge `name` from `from`.
    pub fn linked(&self, from: EntityId, name: &str) -> AdvResult<EntityId> {
        self.entity(from)?
            .links
            .get(name)
            .ok_or_else(|| AdvError::NotFound(name.to_string()))
    }

    /// Entities reachable from `from`, breadth first, each visited once.
    ///
    /// `max_depth` of `Some(1)` returns direct links only; `None` is unlimited.
    /// The start entity is included only if some path leads back to it.
    pub fn traverse(&self, from: EntityId, max_depth: Option<usize>) -> Vec<EntityId> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();
        let mut expanded = HashSet::from([from]);
        let mut queue = VecDeque::from([(from, 0usize)]);

        while let Some((id, depth)) = queue.pop_front() {
            if max_depth.is_some_and(|max| depth >= max) {
                continue;
            }
            let Some(entity) = self.entities.get(&id) else {
                continue;
            };
            for (_, child) in entity.links.iter() {
                if !self.entities.contains_key(&child) {
                    continue;
                }
                if seen.insert(child) {
                    found.push(child);
                }
                if expanded.insert(child) {
                    queue.push_back((child, depth + 1));
                }
            }
        }
        found
    }

    /// Remove `name` from every entity reachable from the registry, from every
    /// character's inventory, and from the registry itself.
    ///
    /// The entity is destroyed. Returns whether anything was removed.
    pub fn purge(&mut self, name: &str) -> bool {
        let target = self.lookup(name).ok();
        let mut removed = 0usize;

        for id in self.traverse(self.root, None) {
            let Some(entity) = self.entities.get_mut(&id) else {
                continue;
            };
            if entity.links.remove(name).is_ok() {
                removed += 1;
            }
            if let Some(character) = entity.as_character_mut() {
                if character.forget(name) {
                    removed += 1;
                }
            }
        }

        if let Some(root) = self.entities.get_mut(&self.root) {
            if root.links.remove(name).is_ok() {
                removed += 1;
            }
        }

        if let Some(id) = target {
            self.entities.remove(&id);
        }

        tracing::info!(name, removed, "purged");
        removed > 0
    }
}
