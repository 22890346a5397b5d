use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub card_fill: String,
    pub card_border: String,
    pub text_color: String,
    pub muted_text_color: String,
    pub line_color: String,
    pub accent_color: String,
    pub background: String,
}

impl Theme {
    /// The zinc-on-black look of the house viewer.
    pub fn dark() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 16.0,
            card_fill: "#18181B".to_string(),
            card_border: "#3F3F46".to_string(),
            text_color: "#F4F4F5".to_string(),
            muted_text_color: "#A1A1AA".to_string(),
            line_color: "#71717A".to_string(),
            accent_color: "#EAB308".to_string(),
            background: "#09090B".to_string(),
        }
    }

    pub fn light() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 16.0,
            card_fill: "#FAFAFA".to_string(),
            card_border: "#D4D4D8".to_string(),
            text_color: "#18181B".to_string(),
            muted_text_color: "#52525B".to_string(),
            line_color: "#71717A".to_string(),
            accent_color: "#B45309".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }
}
