//! Conversions between engine pixels and grid units.
//!
//! Grid coordinates address a card's top-left corner: `x` in columns of
//! `x_spacing` pixels, `generation` in rows of `y_spacing` pixels.

use crate::config::LayoutConfig;
use crate::ir::Entity;

/// Round to two decimals so repeated runs don't accumulate float drift.
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// Map a native center coordinate to a top-left grid coordinate.
pub fn grid_from_center(center_px: f32, size_px: f32, spacing_px: f32) -> f32 {
    let spacing = if spacing_px.abs() <= f32::EPSILON {
        1.0
    } else {
        spacing_px
    };
    round2((center_px - size_px / 2.0) / spacing)
}

pub fn card_left(entity: &Entity, config: &LayoutConfig) -> f32 {
    entity.x * config.x_spacing
}

pub fn card_top(entity: &Entity, config: &LayoutConfig) -> f32 {
    entity.generation * config.y_spacing
}

pub fn card_center_x(entity: &Entity, config: &LayoutConfig) -> f32 {
    card_left(entity, config) + config.card_width / 2.0
}

pub fn card_center_y(entity: &Entity, config: &LayoutConfig) -> f32 {
    card_top(entity, config) + config.card_height / 2.0
}

pub fn card_bottom(entity: &Entity, config: &LayoutConfig) -> f32 {
    card_top(entity, config) + config.card_height
}
