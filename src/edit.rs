//! Relation bookkeeping for a house: linking, copy-in and pruning.

use crate::ir::{Entity, House, Relation};
use crate::placement::{LinkKind, place_relative};

impl House {
    /// Make `child` a child of `base`. Joins the relation that already
    /// claims the child, if any.
    pub fn link_child(&mut self, base: &str, child: &str) {
        if let Some(relation) = self
            .relations
            .iter_mut()
            .find(|r| r.children.iter().any(|c| c == child))
        {
            if !relation.parents.iter().any(|p| p == base) {
                relation.parents.push(base.to_string());
            }
            return;
        }
        let id = self.next_relation_id();
        self.relations.push(Relation::new(&id, &[base], &[child]));
    }

    /// Make `parent` a parent of `base`.
    pub fn link_parent(&mut self, base: &str, parent: &str) {
        if let Some(relation) = self
            .relations
            .iter_mut()
            .find(|r| r.children.iter().any(|c| c == base))
        {
            if !relation.parents.iter().any(|p| p == parent) {
                relation.parents.push(parent.to_string());
            }
            return;
        }
        let id = self.next_relation_id();
        self.relations.push(Relation::new(&id, &[parent], &[base]));
    }

    pub fn link_partner(&mut self, a: &str, b: &str) {
        let id = self.next_relation_id();
        self.relations.push(Relation::new(&id, &[a, b], &[]));
    }

    /// Copy an entity owned by another house into this one, placed next to
    /// `base`. Without a resolvable base the foreign generation is kept and
    /// x resets to 0. Returns false when the id is already local.
    pub fn adopt_entity(&mut self, foreign: &Entity, base: Option<&str>, kind: LinkKind) -> bool {
        if self.contains(&foreign.id) {
            return false;
        }
        let anchor = base.and_then(|id| self.entity(id));
        let (generation, x) = match (anchor, kind) {
            (Some(anchor), LinkKind::Root) => (foreign.generation, anchor.x),
            (Some(anchor), _) => place_relative(Some(anchor), kind),
            (None, _) => (foreign.generation, 0.0),
        };
        let mut local = foreign.clone();
        local.generation = generation;
        local.x = x;
        self.entities.push(local);
        true
    }

    /// Remove an entity and every reference to it, then prune relations that
    /// no longer link anybody.
    pub fn remove_entity(&mut self, id: &str) -> Option<Entity> {
        let index = self.entities.iter().position(|e| e.id == id)?;
        let removed = self.entities.remove(index);
        for relation in &mut self.relations {
            relation.parents.retain(|p| p != id);
            relation.children.retain(|c| c != id);
        }
        self.prune_relations();
        if self.root_id.as_deref() == Some(id) {
            self.root_id = None;
        }
        Some(removed)
    }

    /// Drop relations with no parents or with a lone childless parent.
    /// Returns how many were dropped.
    pub fn prune_relations(&mut self) -> usize {
        let before = self.relations.len();
        self.relations.retain(|r| !r.is_prunable());
        let dropped = before - self.relations.len();
        if dropped > 0 {
            tracing::debug!(house = %self.id, dropped, "pruned relations");
        }
        dropped
    }

    fn next_relation_id(&self) -> String {
        let mut n = 1;
        loop {
            let candidate = format!("conn_{n}");
            if !self.relations.iter().any(|r| r.id == candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}
