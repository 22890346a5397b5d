#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod edit;
pub mod filter;
pub mod geometry;
pub mod history;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod lineage;
pub mod placement;
pub mod render;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, load_config};
pub use filter::{EntityFilter, format_year, parse_year};
pub use geometry::{ConnectionLayout, compute_connections};
pub use history::History;
pub use ir::{Entity, House, Relation};
pub use layout::{LayoutError, LayoutStrategy, compute_layout};
pub use placement::{LinkKind, ViewTransform, center_view, place_relative};
pub use theme::Theme;

/// Run a layout strategy over one house. Entities are replaced wholesale;
/// relations and document fields are carried over unchanged.
pub fn layout_house(
    house: &House,
    strategy: LayoutStrategy,
    config: &LayoutConfig,
) -> Result<House, LayoutError> {
    let entities = compute_layout(&house.entities, &house.relations, strategy, config)?;
    Ok(House {
        entities,
        ..house.clone()
    })
}

/// Draw a house as it currently stands, optionally emphasizing one entity's
/// relations.
pub fn render_house(house: &House, config: &Config, focus: Option<&str>) -> String {
    let connections = compute_connections(&house.entities, &house.relations, &config.layout, focus);
    render::render_svg(&house.entities, &connections, &config.theme, &config.layout, &config.render)
}
