//! Automatic and manual placement of house entities.
//!
//! Two automatic engines share one entry point, [`compute_layout`]:
//!
//! - [`LayoutStrategy::Layered`] hands ranking and crossing reduction to dagre
//!   and recomputes both `generation` and `x`.
//! - [`LayoutStrategy::Heuristic`] keeps every `generation` and re-spaces each
//!   layer around its parents' mean position.
//!
//! Callers that need generations to stay put must pick the heuristic engine.

mod heuristic;
mod layered;
pub mod normalize;

use std::fmt;
use std::str::FromStr;

use crate::config::LayoutConfig;
use crate::ir::{Entity, Relation};
use crate::lineage::Lineage;

use heuristic::compute_heuristic_layout;
use layered::compute_layered_layout;

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("unknown layout strategy `{0}` (expected layered, heuristic or manual)")]
    UnknownStrategy(String),
    #[error("parent `{parent}` has a higher generation than its child `{child}`")]
    InvertedLineage { parent: String, child: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutStrategy {
    /// Positions stay wherever dragging or node creation put them.
    #[default]
    Manual,
    Layered,
    Heuristic,
}

impl LayoutStrategy {
    pub fn name(self) -> &'static str {
        match self {
            LayoutStrategy::Manual => "manual",
            LayoutStrategy::Layered => "layered",
            LayoutStrategy::Heuristic => "heuristic",
        }
    }

    /// Whether the engine may rewrite `generation`.
    pub fn recomputes_generations(self) -> bool {
        matches!(self, LayoutStrategy::Layered)
    }
}

impl fmt::Display for LayoutStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayoutStrategy {
    type Err = LayoutError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "manual" | "none" => Ok(LayoutStrategy::Manual),
            "layered" | "dagre" | "auto" => Ok(LayoutStrategy::Layered),
            "heuristic" | "average" => Ok(LayoutStrategy::Heuristic),
            _ => Err(LayoutError::UnknownStrategy(value.to_string())),
        }
    }
}

/// Lay out one graph. The input is left untouched; the result replaces it
/// wholesale, in the same order and with the same ids.
pub fn compute_layout(
    entities: &[Entity],
    relations: &[Relation],
    strategy: LayoutStrategy,
    config: &LayoutConfig,
) -> Result<Vec<Entity>, LayoutError> {
    if entities.is_empty() {
        return Ok(Vec::new());
    }
    match strategy {
        LayoutStrategy::Manual => Ok(entities.to_vec()),
        LayoutStrategy::Layered => {
            let lineage = Lineage::from_relations(entities, relations);
            Ok(compute_layered_layout(entities, &lineage, config))
        }
        LayoutStrategy::Heuristic => {
            let lineage = Lineage::from_relations(entities, relations);
            compute_heuristic_layout(entities, &lineage, config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Vec<Entity>, Vec<Relation>) {
        let entities = vec![
            Entity::new("a", 1.0, 0.0).with_attribute("name", "Aegon"),
            Entity::new("b", 1.0, 2.0),
            Entity::new("c", 2.0, 0.0),
            Entity::new("orphan", 3.0, 7.0),
        ];
        let relations = vec![
            Relation::new("r1", &["a", "b"], &["c"]),
            Relation::new("empty", &[], &[]),
        ];
        (entities, relations)
    }

    #[test]
    fn strategy_names_parse() {
        assert_eq!("layered".parse::<LayoutStrategy>().unwrap(), LayoutStrategy::Layered);
        assert_eq!(" Heuristic ".parse::<LayoutStrategy>().unwrap(), LayoutStrategy::Heuristic);
        assert_eq!("none".parse::<LayoutStrategy>().unwrap(), LayoutStrategy::Manual);
        assert!(matches!(
            "spiral".parse::<LayoutStrategy>(),
            Err(LayoutError::UnknownStrategy(_))
        ));
    }

    #[test]
    fn manual_strategy_is_identity() {
        let (entities, relations) = sample();
        let out = compute_layout(&entities, &relations, LayoutStrategy::Manual, &LayoutConfig::default())
            .unwrap();
        assert_eq!(out, entities);
    }

    #[test]
    fn every_strategy_keeps_ids_order_and_attributes() {
        let (entities, relations) = sample();
        for strategy in [LayoutStrategy::Manual, LayoutStrategy::Layered, LayoutStrategy::Heuristic] {
            let out = compute_layout(&entities, &relations, strategy, &LayoutConfig::default()).unwrap();
            let ids: Vec<&str> = out.iter().map(|e| e.id.as_str()).collect();
            assert_eq!(ids, ["a", "b", "c", "orphan"], "{strategy}");
            assert_eq!(out[0].name(), "Aegon", "{strategy}");
        }
    }

    #[test]
    fn heuristic_preserves_generations() {
        let (entities, relations) = sample();
        let out = compute_layout(&entities, &relations, LayoutStrategy::Heuristic, &LayoutConfig::default())
            .unwrap();
        for (before, after) in entities.iter().zip(out.iter()) {
            assert_eq!(before.generation, after.generation);
        }
        let orphan = out.iter().find(|e| e.id == "orphan").unwrap();
        assert_eq!(orphan.x, 7.0);
        assert!(!LayoutStrategy::Heuristic.recomputes_generations());
    }

    #[test]
    fn empty_input_is_not_an_error() {
        for strategy in [LayoutStrategy::Manual, LayoutStrategy::Layered, LayoutStrategy::Heuristic] {
            let out = compute_layout(&[], &[], strategy, &LayoutConfig::default()).unwrap();
            assert!(out.is_empty());
        }
    }
}
