use crate::filter::EntityFilter;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Geometry shared by the layout engines and the connection geometry.
///
/// Layout writes grid units, rendering reads them back through the same
/// spacing constants. Using two different configs for the two passes
/// misaligns every edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub card_width: f32,
    pub card_height: f32,
    pub gap_node_size: f32,
    /// Pixels per horizontal grid unit.
    pub x_spacing: f32,
    /// Pixels per generation.
    pub y_spacing: f32,
    pub node_sep: f32,
    pub rank_sep: f32,
    pub margin_x: f32,
    pub margin_y: f32,
    /// Distance between neighbours in a layer after heuristic re-spacing, in grid units.
    pub heuristic_gap: f32,
    /// Partners at least this far apart (grid units) are joined by an arch.
    pub partner_distance_threshold: f32,
    pub arc_height: f32,
    pub corner_radius: f32,
    pub reject_inverted_lineage: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            card_width: 220.0,
            card_height: 300.0,
            gap_node_size: 60.0,
            x_spacing: 260.0,
            y_spacing: 340.0,
            node_sep: 100.0,
            rank_sep: 200.0,
            margin_x: 50.0,
            margin_y: 50.0,
            heuristic_gap: 1.0,
            partner_distance_threshold: 1.5,
            arc_height: 48.0,
            corner_radius: 12.0,
            reject_inverted_lineage: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub padding: f32,
    pub background: String,
    /// Cards this filter rejects are drawn faded.
    #[serde(default)]
    pub filter: EntityFilter,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 1200.0,
            padding: 40.0,
            background: "#09090B".to_string(),
            filter: EntityFilter::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::dark();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    background: Option<String>,
    filter: Option<EntityFilter>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    card_fill: Option<String>,
    card_border: Option<String>,
    text_color: Option<String>,
    line_color: Option<String>,
    accent_color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    card_width: Option<f32>,
    card_height: Option<f32>,
    gap_node_size: Option<f32>,
    x_spacing: Option<f32>,
    y_spacing: Option<f32>,
    node_sep: Option<f32>,
    rank_sep: Option<f32>,
    margin_x: Option<f32>,
    margin_y: Option<f32>,
    heuristic_gap: Option<f32>,
    partner_distance_threshold: Option<f32>,
    arc_height: Option<f32>,
    corner_radius: Option<f32>,
    reject_inverted_lineage: Option<bool>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let contents = std::fs::read_to_string(path)?;
    let is_json5 = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json5"))
        .unwrap_or(false);
    let parsed: ConfigFile = if is_json5 {
        json5::from_str(&contents)?
    } else {
        serde_json::from_str(&contents)?
    };
    Ok(apply_config_file(Config::default(), parsed))
}

fn apply_config_file(mut config: Config, parsed: ConfigFile) -> Config {
    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "light" => config.theme = Theme::light(),
            "dark" | "default" => config.theme = Theme::dark(),
            other => tracing::warn!(theme = other, "unknown theme name, keeping default"),
        }
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.card_fill {
            config.theme.card_fill = v;
        }
        if let Some(v) = vars.card_border {
            config.theme.card_border = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.accent_color {
            config.theme.accent_color = v;
        }
    }

    if let Some(background) = parsed.background {
        config.theme.background = background.clone();
        config.render.background = background;
    }
    if let Some(filter) = parsed.filter {
        config.render.filter = filter;
    }

    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        if let Some(v) = layout.card_width {
            target.card_width = v;
        }
        if let Some(v) = layout.card_height {
            target.card_height = v;
        }
        if let Some(v) = layout.gap_node_size {
            target.gap_node_size = v;
        }
        if let Some(v) = layout.x_spacing {
            target.x_spacing = v.max(1.0);
        }
        if let Some(v) = layout.y_spacing {
            target.y_spacing = v.max(1.0);
        }
        if let Some(v) = layout.node_sep {
            target.node_sep = v;
        }
        if let Some(v) = layout.rank_sep {
            target.rank_sep = v;
        }
        if let Some(v) = layout.margin_x {
            target.margin_x = v;
        }
        if let Some(v) = layout.margin_y {
            target.margin_y = v;
        }
        if let Some(v) = layout.heuristic_gap {
            if v.is_finite() && v > 0.0 {
                target.heuristic_gap = v;
            } else {
                tracing::warn!(value = v, "ignoring non-positive heuristicGap");
            }
        }
        if let Some(v) = layout.partner_distance_threshold {
            target.partner_distance_threshold = v;
        }
        if let Some(v) = layout.arc_height {
            target.arc_height = v;
        }
        if let Some(v) = layout.corner_radius {
            target.corner_radius = v.max(0.0);
        }
        if let Some(v) = layout.reject_inverted_lineage {
            target.reject_inverted_lineage = v;
        }
    }

    config
}
