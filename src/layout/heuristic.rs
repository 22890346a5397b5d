use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::ir::Entity;
use crate::lineage::Lineage;

use super::LayoutError;

/// Smallest slot width a layer is re-spaced with, in grid units.
const MIN_GAP: f32 = 0.01;

/// Re-space every generation layer around the mean position of its parents.
///
/// Generations are kept as given. Layers settle top to bottom, so a child
/// reads parent positions that were already updated earlier in the pass.
pub(super) fn compute_heuristic_layout(
    entities: &[Entity],
    lineage: &Lineage,
    config: &LayoutConfig,
) -> Result<Vec<Entity>, LayoutError> {
    check_lineage_direction(entities, lineage, config)?;

    let mut out = entities.to_vec();
    let mut settled: HashMap<&str, f32> = entities
        .iter()
        .map(|entity| (entity.id.as_str(), entity.x))
        .collect();

    let layers = generation_layers(entities);
    tracing::debug!(
        nodes = entities.len(),
        layers = layers.len(),
        "running heuristic layout"
    );

    for layer in &layers {
        let mut scored: Vec<(usize, f32)> = layer
            .iter()
            .map(|&idx| (idx, ideal_x(&entities[idx], lineage, &settled)))
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));

        let center = scored.iter().map(|(_, ideal)| ideal).sum::<f32>() / scored.len() as f32;
        let half_span = (scored.len() as f32 - 1.0) / 2.0;
        let gap = config.heuristic_gap.max(MIN_GAP);
        for (slot, (idx, _)) in scored.iter().enumerate() {
            let x = center + (slot as f32 - half_span) * gap;
            out[*idx].x = x;
            settled.insert(entities[*idx].id.as_str(), x);
        }
    }

    Ok(out)
}

/// Entity indices grouped by generation, ascending. Input order is kept
/// inside each layer so ties sort stably.
fn generation_layers(entities: &[Entity]) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = (0..entities.len()).collect();
    order.sort_by(|a, b| entities[*a].generation.total_cmp(&entities[*b].generation));

    let mut layers: Vec<Vec<usize>> = Vec::new();
    let mut current: Option<f32> = None;
    for idx in order {
        let generation = entities[idx].generation;
        if current != Some(generation) {
            layers.push(Vec::new());
            current = Some(generation);
        }
        if let Some(layer) = layers.last_mut() {
            layer.push(idx);
        }
    }
    layers
}

fn ideal_x(entity: &Entity, lineage: &Lineage, settled: &HashMap<&str, f32>) -> f32 {
    let positions: Vec<f32> = lineage
        .parents_of(&entity.id)
        .iter()
        .filter_map(|parent| settled.get(parent.as_str()).copied())
        .collect();
    if positions.is_empty() {
        return if entity.x.is_finite() { entity.x } else { 0.0 };
    }
    positions.iter().sum::<f32>() / positions.len() as f32
}

/// A parent drawn below its child is read stale by the top-down pass. Strict
/// configs reject it, everything else just logs it.
fn check_lineage_direction(
    entities: &[Entity],
    lineage: &Lineage,
    config: &LayoutConfig,
) -> Result<(), LayoutError> {
    let generations: HashMap<&str, f32> = entities
        .iter()
        .map(|entity| (entity.id.as_str(), entity.generation))
        .collect();
    for (parent, child) in lineage.edges() {
        let (Some(&pg), Some(&cg)) = (generations.get(parent), generations.get(child)) else {
            continue;
        };
        if pg <= cg {
            continue;
        }
        if config.reject_inverted_lineage {
            return Err(LayoutError::InvertedLineage {
                parent: parent.to_string(),
                child: child.to_string(),
            });
        }
        tracing::warn!(parent, child, "parent sits below its child; its position is read stale");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Relation;

    fn run(entities: &[Entity], relations: &[Relation]) -> Vec<Entity> {
        let lineage = Lineage::from_relations(entities, relations);
        compute_heuristic_layout(entities, &lineage, &LayoutConfig::default()).unwrap()
    }

    fn x_of(entities: &[Entity], id: &str) -> f32 {
        entities.iter().find(|e| e.id == id).unwrap().x
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn zero_gap_does_not_collapse_a_layer() {
        let entities = vec![
            Entity::new("a", 1.0, 0.0),
            Entity::new("b", 1.0, 4.0),
            Entity::new("c", 1.0, 8.0),
        ];
        let lineage = Lineage::from_relations(&entities, &[]);
        let config = LayoutConfig {
            heuristic_gap: 0.0,
            ..LayoutConfig::default()
        };
        let out = compute_heuristic_layout(&entities, &lineage, &config).unwrap();
        assert!(out[0].x < out[1].x && out[1].x < out[2].x);
    }

    #[test]
    fn couple_with_one_child_centers_child() {
        let entities = vec![
            Entity::new("a", 1.0, 0.0),
            Entity::new("b", 1.0, 2.0),
            Entity::new("c", 2.0, 0.0),
        ];
        let relations = vec![Relation::new("r", &["a", "b"], &["c"])];
        let out = run(&entities, &relations);
        assert!(approx(x_of(&out, "a"), 0.5));
        assert!(approx(x_of(&out, "b"), 1.5));
        assert!(approx(x_of(&out, "c"), 1.0));
        assert_eq!(out[2].generation, 2.0);
    }

    #[test]
    fn siblings_keep_input_order_and_spacing() {
        let entities = vec![
            Entity::new("a", 1.0, 0.0),
            Entity::new("b", 1.0, 2.0),
            Entity::new("c", 2.0, 0.0),
            Entity::new("d", 2.0, 0.0),
            Entity::new("e", 2.0, 0.0),
        ];
        let relations = vec![Relation::new("r", &["a", "b"], &["c", "d", "e"])];
        let out = run(&entities, &relations);
        let (c, d, e) = (x_of(&out, "c"), x_of(&out, "d"), x_of(&out, "e"));
        assert!(c < d && d < e);
        assert!(approx(d - c, 1.0) && approx(e - d, 1.0));
        let parents_mean = (x_of(&out, "a") + x_of(&out, "b")) / 2.0;
        assert!(approx((c + d + e) / 3.0, parents_mean));
    }

    #[test]
    fn only_child_sits_under_its_parent() {
        let entities = vec![Entity::new("p", 1.0, 3.0), Entity::new("k", 2.0, -4.0)];
        let relations = vec![Relation::new("r", &["p"], &["k"])];
        let out = run(&entities, &relations);
        assert_eq!(x_of(&out, "p"), 3.0);
        assert_eq!(x_of(&out, "k"), 3.0);
    }

    #[test]
    fn fractional_generations_form_distinct_layers() {
        let entities = vec![
            Entity::new("a", 1.0, 0.0),
            Entity::new("b", 1.5, 0.0),
            Entity::new("c", 1.5, 0.0),
        ];
        let layers = generation_layers(&entities);
        assert_eq!(layers, vec![vec![0], vec![1, 2]]);
    }

    #[test]
    fn layout_converges_on_second_run() {
        let entities = vec![
            Entity::new("a", 1.0, 4.0),
            Entity::new("b", 1.0, -1.0),
            Entity::new("c", 2.0, 0.0),
            Entity::new("d", 2.0, 9.0),
            Entity::new("e", 3.0, 0.0),
        ];
        let relations = vec![
            Relation::new("r1", &["a", "b"], &["c"]),
            Relation::new("r2", &["b"], &["d"]),
            Relation::new("r3", &["c", "d"], &["e"]),
        ];
        let first = run(&entities, &relations);
        let second = run(&first, &relations);
        for (lhs, rhs) in first.iter().zip(second.iter()) {
            assert!(approx(lhs.x, rhs.x), "{} moved from {} to {}", lhs.id, lhs.x, rhs.x);
            assert_eq!(lhs.generation, rhs.generation);
        }
    }

    #[test]
    fn inverted_lineage_is_tolerated_by_default() {
        let entities = vec![Entity::new("kid", 1.0, 0.0), Entity::new("elder", 2.0, 5.0)];
        let relations = vec![Relation::new("r", &["elder"], &["kid"])];
        let out = run(&entities, &relations);
        // The child layer settles first and reads the elder's stale input x.
        assert_eq!(x_of(&out, "kid"), 5.0);
    }

    #[test]
    fn inverted_lineage_rejected_when_strict() {
        let entities = vec![Entity::new("kid", 1.0, 0.0), Entity::new("elder", 2.0, 5.0)];
        let relations = vec![Relation::new("r", &["elder"], &["kid"])];
        let lineage = Lineage::from_relations(&entities, &relations);
        let config = LayoutConfig {
            reject_inverted_lineage: true,
            ..LayoutConfig::default()
        };
        let err = compute_heuristic_layout(&entities, &lineage, &config).unwrap_err();
        assert!(matches!(err, LayoutError::InvertedLineage { .. }));
    }
}
