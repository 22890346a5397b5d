//! Drawable paths for relations, in pixels.
//!
//! Everything here reads the grid coordinates produced by layout through the
//! same [`LayoutConfig`] constants, so cards and lines stay aligned.

use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::ir::{Entity, Relation};
use crate::layout::normalize::{card_bottom, card_center_x, card_center_y, card_top};

/// Generations closer than this count as the same row.
const SAME_ROW_EPS: f32 = 1e-3;
const POINT_EPS: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Parent set to one child.
    Descent,
    /// Partners side by side, joined at mid-height.
    PartnerLine,
    /// Partners far apart in one row, joined over the top of the row.
    PartnerArch,
    /// Partners in different generations.
    PartnerStep,
}

impl PathKind {
    pub fn is_partner(self) -> bool {
        !matches!(self, PathKind::Descent)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PathKind::Descent => "descent",
            PathKind::PartnerLine => "partner-line",
            PathKind::PartnerArch => "partner-arch",
            PathKind::PartnerStep => "partner-step",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emphasis {
    #[default]
    Normal,
    Highlighted,
    Dimmed,
}

impl Emphasis {
    pub fn as_str(self) -> &'static str {
        match self {
            Emphasis::Normal => "normal",
            Emphasis::Highlighted => "highlighted",
            Emphasis::Dimmed => "dimmed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionPath {
    pub kind: PathKind,
    pub points: Vec<(f32, f32)>,
    /// SVG path data with rounded corners applied.
    pub d: String,
    pub dashed: bool,
    pub child_id: Option<String>,
    pub marriage_node: Option<(f32, f32)>,
}

#[derive(Debug, Clone)]
pub struct ConnectionLayout {
    pub relation_id: String,
    pub paths: Vec<ConnectionPath>,
    /// Where descent lines leave the parent set.
    pub origin: (f32, f32),
    pub marriage_node: Option<(f32, f32)>,
    pub emphasis: Emphasis,
}

/// Paths for every drawable relation.
///
/// Prunable relations and relations whose parents are all unknown produce
/// nothing. With more than two parents, each consecutive pair in listed
/// order gets its own partner link.
pub fn compute_connections(
    entities: &[Entity],
    relations: &[Relation],
    config: &LayoutConfig,
    focus: Option<&str>,
) -> Vec<ConnectionLayout> {
    let by_id: HashMap<&str, &Entity> = entities.iter().map(|e| (e.id.as_str(), e)).collect();
    let mut out = Vec::new();

    for relation in relations {
        if relation.is_prunable() {
            continue;
        }
        let parents: Vec<&Entity> = relation
            .parents
            .iter()
            .filter_map(|id| by_id.get(id.as_str()).copied())
            .collect();
        let children: Vec<&Entity> = relation
            .children
            .iter()
            .filter_map(|id| by_id.get(id.as_str()).copied())
            .collect();
        if parents.is_empty() || (parents.len() == 1 && children.is_empty()) {
            continue;
        }

        let mut paths: Vec<ConnectionPath> = parents
            .windows(2)
            .map(|pair| partner_path(pair[0], pair[1], config))
            .collect();

        let marriage_node = if parents.len() == 2 {
            paths.first().and_then(|path| path.marriage_node)
        } else {
            None
        };
        let origin = match (parents.as_slice(), paths.first()) {
            ([single], _) => (card_center_x(single, config), card_bottom(single, config)),
            ([_, _], Some(path)) if path.kind == PathKind::PartnerStep => {
                path.marriage_node.unwrap_or_else(|| shared_origin(&parents, config))
            }
            _ => shared_origin(&parents, config),
        };

        for child in &children {
            paths.push(descent_path(origin, child, config));
        }

        let emphasis = match focus {
            None => Emphasis::Normal,
            Some(id) if relation.touches(id) => Emphasis::Highlighted,
            Some(_) => Emphasis::Dimmed,
        };

        out.push(ConnectionLayout {
            relation_id: relation.id.clone(),
            paths,
            origin,
            marriage_node,
            emphasis,
        });
    }

    out
}

/// Mean of the parents' bottom-centers, on the lowest parent's bottom edge.
fn shared_origin(parents: &[&Entity], config: &LayoutConfig) -> (f32, f32) {
    let count = parents.len().max(1) as f32;
    let x = parents.iter().map(|p| card_center_x(p, config)).sum::<f32>() / count;
    let y = parents
        .iter()
        .map(|p| card_bottom(p, config))
        .fold(f32::MIN, f32::max);
    (x, y)
}

pub fn partner_path(a: &Entity, b: &Entity, config: &LayoutConfig) -> ConnectionPath {
    if (a.generation - b.generation).abs() < SAME_ROW_EPS {
        let (ax, bx) = (card_center_x(a, config), card_center_x(b, config));
        if (a.x - b.x).abs() < config.partner_distance_threshold {
            let y = card_center_y(a, config);
            let points = vec![(ax, y), (bx, y)];
            return ConnectionPath {
                kind: PathKind::PartnerLine,
                d: rounded_path(&points, 0.0),
                points,
                dashed: true,
                child_id: None,
                marriage_node: Some(((ax + bx) / 2.0, y)),
            };
        }
        let top = card_top(a, config).min(card_top(b, config));
        let peak = top - config.arc_height;
        let points = vec![(ax, top), (ax, peak), (bx, peak), (bx, top)];
        return ConnectionPath {
            kind: PathKind::PartnerArch,
            d: rounded_path(&points, config.corner_radius),
            points,
            dashed: true,
            child_id: None,
            marriage_node: Some(((ax + bx) / 2.0, peak)),
        };
    }

    let (elder, younger) = if a.generation < b.generation { (a, b) } else { (b, a) };
    let start = (card_center_x(elder, config), card_bottom(elder, config));
    let end = (card_center_x(younger, config), card_top(younger, config));
    let mid_y = start.1 + (end.1 - start.1) / 2.0;
    let points = vec![start, (start.0, mid_y), (end.0, mid_y), end];
    ConnectionPath {
        kind: PathKind::PartnerStep,
        d: rounded_path(&points, config.corner_radius),
        points: simplify_polyline(&points),
        dashed: true,
        child_id: None,
        marriage_node: Some(((start.0 + end.0) / 2.0, mid_y)),
    }
}

/// Line from a parent set's origin down to a child's top-center. Turns at
/// the vertical midpoint unless the drop is too short or already straight.
pub fn descent_path(origin: (f32, f32), child: &Entity, config: &LayoutConfig) -> ConnectionPath {
    let end = (card_center_x(child, config), card_top(child, config));
    let dy = end.1 - origin.1;
    let points = if dy < config.corner_radius || (end.0 - origin.0).abs() < POINT_EPS {
        vec![origin, end]
    } else {
        let mid_y = origin.1 + dy / 2.0;
        vec![origin, (origin.0, mid_y), (end.0, mid_y), end]
    };
    ConnectionPath {
        kind: PathKind::Descent,
        d: rounded_path(&points, config.corner_radius),
        points,
        dashed: child.is_bastard(),
        child_id: Some(child.id.clone()),
        marriage_node: None,
    }
}

/// SVG path data for a polyline, each interior corner replaced by a
/// quadratic curve of at most `radius`.
pub fn rounded_path(points: &[(f32, f32)], radius: f32) -> String {
    let points = simplify_polyline(points);
    let Some(first) = points.first() else {
        return String::new();
    };
    let mut d = format!("M {:.2} {:.2}", first.0, first.1);
    if points.len() == 1 {
        return d;
    }
    for idx in 1..points.len() - 1 {
        let prev = points[idx - 1];
        let curr = points[idx];
        let next = points[idx + 1];
        let len_in = distance(prev, curr);
        let len_out = distance(curr, next);
        let r = radius.min(len_in / 2.0).min(len_out / 2.0);
        if r <= POINT_EPS {
            d.push_str(&format!(" L {:.2} {:.2}", curr.0, curr.1));
            continue;
        }
        let enter = (
            curr.0 - (curr.0 - prev.0) / len_in * r,
            curr.1 - (curr.1 - prev.1) / len_in * r,
        );
        let leave = (
            curr.0 + (next.0 - curr.0) / len_out * r,
            curr.1 + (next.1 - curr.1) / len_out * r,
        );
        d.push_str(&format!(
            " L {:.2} {:.2} Q {:.2} {:.2} {:.2} {:.2}",
            enter.0, enter.1, curr.0, curr.1, leave.0, leave.1
        ));
    }
    let last = points[points.len() - 1];
    d.push_str(&format!(" L {:.2} {:.2}", last.0, last.1));
    d
}

/// Drop repeated points and interior points on a straight run.
pub fn simplify_polyline(points: &[(f32, f32)]) -> Vec<(f32, f32)> {
    let mut deduped: Vec<(f32, f32)> = Vec::with_capacity(points.len());
    for &point in points {
        if let Some(&last) = deduped.last()
            && distance(last, point) <= POINT_EPS
        {
            continue;
        }
        deduped.push(point);
    }
    if deduped.len() <= 2 {
        return deduped;
    }
    let mut out = Vec::with_capacity(deduped.len());
    out.push(deduped[0]);
    for idx in 1..deduped.len() - 1 {
        let prev = out[out.len() - 1];
        let curr = deduped[idx];
        let next = deduped[idx + 1];
        let cross = (curr.0 - prev.0) * (next.1 - curr.1) - (curr.1 - prev.1) * (next.0 - curr.0);
        if cross.abs() > POINT_EPS {
            out.push(curr);
        }
    }
    out.push(deduped[deduped.len() - 1]);
    out
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt()
}
