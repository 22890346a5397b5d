use lineage_layout::filter::search_houses;
use lineage_layout::{
    Config, House, LayoutStrategy, Theme, center_view, layout_house, parse_year, render_house,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HouseRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    focus: Option<String>,
    strategy: Option<String>,
    year: Option<String>,
    #[serde(default)]
    kings_only: bool,
    #[serde(default)]
    dragon_riders_only: bool,
}

fn build_config(options: &HouseRenderOptions) -> Config {
    let mut config = Config::default();
    if options.theme.as_deref() == Some("light") {
        config.theme = Theme::light();
        config.render.background = config.theme.background.clone();
    }
    if let Some(font_family) = &options.font_family {
        config.theme.font_family = font_family.clone();
    }
    if let Some(font_size) = options.font_size {
        config.theme.font_size = font_size;
    }
    config.render.filter.year = options.year.as_deref().and_then(parse_year);
    config.render.filter.kings_only = options.kings_only;
    config.render.filter.dragon_riders_only = options.dragon_riders_only;
    config
}

fn to_js(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Lay out a house document and return the updated document.
#[wasm_bindgen]
pub fn auto_layout(house_json: &str, strategy: &str) -> Result<String, JsValue> {
    let house = House::from_json(house_json).map_err(to_js)?;
    let strategy: LayoutStrategy = strategy.parse().map_err(to_js)?;
    let laid_out = layout_house(&house, strategy, &Config::default().layout).map_err(to_js)?;
    laid_out.to_json_pretty().map_err(to_js)
}

#[wasm_bindgen]
pub fn render_house_svg(house_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = match options_json {
        Some(raw) => serde_json::from_str::<HouseRenderOptions>(&raw).map_err(to_js)?,
        None => HouseRenderOptions::default(),
    };
    let config = build_config(&options);
    let mut house = House::from_json(house_json).map_err(to_js)?;
    if let Some(strategy) = &options.strategy {
        let strategy: LayoutStrategy = strategy.parse().map_err(to_js)?;
        house = layout_house(&house, strategy, &config.layout).map_err(to_js)?;
    }
    Ok(render_house(&house, &config, options.focus.as_deref()))
}

/// Entities of one house whose name or title matches, as JSON.
#[wasm_bindgen]
pub fn search_house(house_json: &str, query: &str) -> Result<String, JsValue> {
    let house = House::from_json(house_json).map_err(to_js)?;
    let hits = search_houses(std::slice::from_ref(&house), query);
    serde_json::to_string(&hits).map_err(to_js)
}

/// Pan and zoom that centre `target` (or the root) in the viewport, as
/// `[x, y, scale]`.
#[wasm_bindgen]
pub fn center_house_view(
    house_json: &str,
    target: Option<String>,
    viewport_width: f32,
) -> Result<Vec<f32>, JsValue> {
    let house = House::from_json(house_json).map_err(to_js)?;
    let view = center_view(&house, target.as_deref(), viewport_width, &Config::default().layout);
    Ok(vec![view.x, view.y, view.scale])
}
