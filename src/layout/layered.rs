use dagre_rust::{
    GraphConfig as DagreConfig, GraphEdge as DagreEdge, GraphNode as DagreNode,
    layout as dagre_layout,
};
use graphlib_rust::{Graph as DagreGraph, GraphOption};

use std::collections::{HashMap, HashSet};

use crate::config::LayoutConfig;
use crate::ir::Entity;
use crate::lineage::Lineage;

use super::normalize::grid_from_center;

/// Rank and order each family with dagre, then map the resulting centers
/// back to grid units. Rank becomes `generation`.
///
/// Weakly connected components are laid out one at a time and packed left to
/// right, `node_sep` apart. Unrelated families never share a dagre run.
pub(super) fn compute_layered_layout(
    entities: &[Entity],
    lineage: &Lineage,
    config: &LayoutConfig,
) -> Vec<Entity> {
    if entities.is_empty() {
        return Vec::new();
    }

    let components = connected_components(entities, lineage);
    tracing::debug!(
        nodes = entities.len(),
        edges = lineage.edge_count(),
        components = components.len(),
        "running layered layout"
    );

    let half_width = config.card_width / 2.0;
    let mut centers: HashMap<&str, (f32, f32)> = HashMap::with_capacity(entities.len());
    let mut cursor = config.margin_x;
    for component in &components {
        let placed = layout_component(component, lineage, config);
        let left = placed
            .iter()
            .map(|(_, (x, _))| x - half_width)
            .fold(f32::INFINITY, f32::min);
        let right = placed
            .iter()
            .map(|(_, (x, _))| x + half_width)
            .fold(f32::NEG_INFINITY, f32::max);
        if !left.is_finite() || !right.is_finite() {
            continue;
        }
        let shift = cursor - left;
        for (id, (x, y)) in placed {
            centers.insert(id, (x + shift, y));
        }
        cursor += (right - left) + config.node_sep;
    }

    entities
        .iter()
        .map(|entity| {
            let mut placed = entity.clone();
            if let Some(&(x, y)) = centers.get(entity.id.as_str()) {
                placed.x = grid_from_center(x, config.card_width, config.x_spacing);
                placed.generation = grid_from_center(y, config.card_height, config.y_spacing);
            }
            placed
        })
        .collect()
}

/// Entity ids grouped by weak connectivity over lineage edges, in order of
/// first appearance.
fn connected_components<'a>(entities: &'a [Entity], lineage: &Lineage) -> Vec<Vec<&'a str>> {
    let index: HashMap<&str, usize> = entities
        .iter()
        .enumerate()
        .map(|(idx, entity)| (entity.id.as_str(), idx))
        .collect();
    let mut roots: Vec<usize> = (0..entities.len()).collect();

    fn find(roots: &mut [usize], mut idx: usize) -> usize {
        while roots[idx] != idx {
            roots[idx] = roots[roots[idx]];
            idx = roots[idx];
        }
        idx
    }

    for (parent, child) in lineage.edges() {
        let (Some(&a), Some(&b)) = (index.get(parent), index.get(child)) else {
            continue;
        };
        let (ra, rb) = (find(&mut roots, a), find(&mut roots, b));
        if ra != rb {
            roots[ra.max(rb)] = ra.min(rb);
        }
    }

    let mut slots: HashMap<usize, usize> = HashMap::new();
    let mut groups: Vec<Vec<&str>> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for (idx, entity) in entities.iter().enumerate() {
        if !seen.insert(entity.id.as_str()) {
            continue;
        }
        let root = find(&mut roots, idx);
        let slot = *slots.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(entity.id.as_str());
    }
    groups
}

/// Pixel centers for one component. A lone entity sits where dagre would
/// put a single rank-0 node.
fn layout_component<'a>(
    members: &[&'a str],
    lineage: &Lineage,
    config: &LayoutConfig,
) -> Vec<(&'a str, (f32, f32))> {
    if let [only] = members {
        let center = (
            config.margin_x + config.card_width / 2.0,
            config.margin_y + config.card_height / 2.0,
        );
        return vec![(*only, center)];
    }

    let mut dagre_graph: DagreGraph<DagreConfig, DagreNode, DagreEdge> =
        DagreGraph::new(Some(GraphOption {
            directed: Some(true),
            multigraph: Some(false),
            compound: Some(false),
        }));

    let mut graph_config = DagreConfig::default();
    graph_config.rankdir = Some("tb".to_string());
    graph_config.nodesep = Some(config.node_sep);
    graph_config.ranksep = Some(config.rank_sep);
    graph_config.marginx = Some(config.margin_x);
    graph_config.marginy = Some(config.margin_y);
    dagre_graph.set_graph(graph_config);

    for id in members {
        let mut node = DagreNode::default();
        node.width = config.card_width;
        node.height = config.card_height;
        dagre_graph.set_node(id.to_string(), Some(node));
    }

    let member_set: HashSet<&str> = members.iter().copied().collect();
    for (parent, child) in lineage.edges() {
        if !member_set.contains(parent) {
            continue;
        }
        let from = parent.to_string();
        let to = child.to_string();
        let _ = dagre_graph.set_edge(&from, &to, Some(DagreEdge::default()), None);
    }

    dagre_layout::run_layout(&mut dagre_graph);

    members
        .iter()
        .filter_map(|id| {
            dagre_graph
                .node(&id.to_string())
                .map(|node| (*id, (node.x, node.y)))
        })
        .collect()
}
