//! Parent/child adjacency extracted from a house's relations.

use std::collections::{HashMap, HashSet};

use crate::ir::{Entity, Relation};

/// Parent and child lookups for one graph.
///
/// Only ids present in the entity collection take part; references to
/// anything else are dropped while building.
#[derive(Debug, Clone, Default)]
pub struct Lineage {
    parents: HashMap<String, Vec<String>>,
    children: HashMap<String, Vec<String>>,
    edges: Vec<(String, String)>,
    dropped_refs: usize,
}

impl Lineage {
    pub fn from_relations(entities: &[Entity], relations: &[Relation]) -> Self {
        let known: HashSet<&str> = entities.iter().map(|e| e.id.as_str()).collect();
        let mut lineage = Lineage::default();
        let mut seen: HashSet<(&str, &str)> = HashSet::new();

        for relation in relations {
            for id in relation.parents.iter().chain(relation.children.iter()) {
                if !known.contains(id.as_str()) {
                    lineage.dropped_refs += 1;
                }
            }
            for parent in &relation.parents {
                if !known.contains(parent.as_str()) {
                    continue;
                }
                for child in &relation.children {
                    if !known.contains(child.as_str()) || parent == child {
                        continue;
                    }
                    if !seen.insert((parent.as_str(), child.as_str())) {
                        continue;
                    }
                    lineage
                        .children
                        .entry(parent.clone())
                        .or_default()
                        .push(child.clone());
                    lineage
                        .parents
                        .entry(child.clone())
                        .or_default()
                        .push(parent.clone());
                    lineage.edges.push((parent.clone(), child.clone()));
                }
            }
        }

        if lineage.dropped_refs > 0 {
            tracing::debug!(
                dropped = lineage.dropped_refs,
                "relations reference entities outside this graph"
            );
        }
        lineage
    }

    pub fn parents_of(&self, id: &str) -> &[String] {
        self.parents.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn children_of(&self, id: &str) -> &[String] {
        self.children.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Distinct parent -> child pairs in relation order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of relation endpoints that named an unknown entity.
    pub fn dropped_refs(&self) -> usize {
        self.dropped_refs
    }
}
