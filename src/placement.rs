//! Manual placement: where new entities appear, how drags move them and
//! where the viewport jumps when recentred.

use std::collections::HashSet;
use std::str::FromStr;

use crate::config::LayoutConfig;
use crate::ir::{Entity, House};

/// Zoom applied when the view is recentred.
pub const CENTER_SCALE: f32 = 0.8;
/// Vertical pan offset after recentring, in screen pixels.
pub const CENTER_TOP: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Child,
    Parent,
    Partner,
    Root,
}

impl FromStr for LinkKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "add-child" | "child" => Ok(LinkKind::Child),
            "add-parent" | "parent" => Ok(LinkKind::Parent),
            "add-partner" | "partner" => Ok(LinkKind::Partner),
            "add-root" | "root" => Ok(LinkKind::Root),
            other => Err(format!("unknown link kind `{other}`")),
        }
    }
}

/// Starting `(generation, x)` for an entity linked to `base`.
pub fn place_relative(base: Option<&Entity>, kind: LinkKind) -> (f32, f32) {
    let Some(base) = base else {
        return (1.0, 0.0);
    };
    match kind {
        LinkKind::Child => (base.generation + 1.0, base.x + 0.5),
        LinkKind::Parent => (base.generation - 1.0, base.x + 0.5),
        LinkKind::Partner => (base.generation, base.x + 1.2),
        LinkKind::Root => (1.0, 0.0),
    }
}

/// Shift the dragged entities by a pixel delta, converted to grid units.
pub fn drag_entities(
    entities: &[Entity],
    ids: &[&str],
    delta_px: (f32, f32),
    config: &LayoutConfig,
) -> Vec<Entity> {
    let dragged: HashSet<&str> = ids.iter().copied().collect();
    let dx = delta_px.0 / config.x_spacing;
    let dy = delta_px.1 / config.y_spacing;
    entities
        .iter()
        .map(|entity| {
            let mut moved = entity.clone();
            if dragged.contains(entity.id.as_str()) {
                moved.x += dx;
                moved.generation += dy;
            }
            moved
        })
        .collect()
}

/// Pan and zoom of the canvas, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

/// Pan so that one entity's card sits horizontally centred in a viewport
/// `viewport_width` pixels wide.
///
/// A `target` id that is not in the house falls back to the first entity.
/// With no target the root entity is used when it exists.
pub fn center_view(
    house: &House,
    target: Option<&str>,
    viewport_width: f32,
    config: &LayoutConfig,
) -> ViewTransform {
    let fallback = house.entities.first();
    let focus = match target {
        Some(id) => house.entity(id).or(fallback),
        None => house
            .root_id
            .as_deref()
            .and_then(|id| house.entity(id))
            .or(fallback),
    };
    let screen_center = viewport_width / 2.0;
    let Some(entity) = focus else {
        return ViewTransform {
            x: screen_center,
            y: CENTER_TOP,
            scale: CENTER_SCALE,
        };
    };
    let card_center = entity.x * config.x_spacing + config.card_width / 2.0;
    ViewTransform {
        x: screen_center - card_center * CENTER_SCALE,
        y: CENTER_TOP,
        scale: CENTER_SCALE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_offsets() {
        let base = Entity::new("b", 2.0, 1.0);
        assert_eq!(place_relative(Some(&base), LinkKind::Child), (3.0, 1.5));
        assert_eq!(place_relative(Some(&base), LinkKind::Parent), (1.0, 1.5));
        assert_eq!(place_relative(Some(&base), LinkKind::Partner), (2.0, 2.2));
        assert_eq!(place_relative(None, LinkKind::Child), (1.0, 0.0));
        assert_eq!(place_relative(Some(&base), LinkKind::Root), (1.0, 0.0));
    }

    #[test]
    fn drag_moves_only_selected_entities() {
        let config = LayoutConfig::default();
        let entities = vec![Entity::new("a", 1.0, 0.0), Entity::new("b", 1.0, 0.0)];
        let out = drag_entities(&entities, &["a"], (130.0, -170.0), &config);
        assert_eq!(out[0].x, 0.5);
        assert_eq!(out[0].generation, 0.5);
        assert_eq!(out[1], entities[1]);
    }

    #[test]
    fn center_view_prefers_target_then_root_then_first() {
        let config = LayoutConfig::default();
        let mut house = House::new("stark");
        house.entities = vec![Entity::new("rickard", 1.0, 0.0), Entity::new("ned", 2.0, 2.0)];

        // (0 * 260 + 110) * 0.8 = 88
        let first = center_view(&house, None, 1000.0, &config);
        assert_eq!(first, ViewTransform { x: 412.0, y: 100.0, scale: 0.8 });

        house.root_id = Some("ned".to_string());
        // (2 * 260 + 110) * 0.8 = 504
        assert_eq!(center_view(&house, None, 1000.0, &config).x, -4.0);
        assert_eq!(center_view(&house, Some("rickard"), 1000.0, &config).x, 412.0);
        assert_eq!(center_view(&house, Some("benjen"), 1000.0, &config).x, 412.0);
    }

    #[test]
    fn center_view_on_empty_house_uses_screen_center() {
        let view = center_view(&House::new("empty"), Some("anyone"), 1280.0, &LayoutConfig::default());
        assert_eq!(view, ViewTransform { x: 640.0, y: 100.0, scale: 0.8 });
    }

    #[test]
    fn link_kinds_parse_from_modal_modes() {
        assert_eq!("add-partner".parse::<LinkKind>().unwrap(), LinkKind::Partner);
        assert!("add-sibling".parse::<LinkKind>().is_err());
    }
}
