use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

const FALLBACK_CHAR_RATIO: f32 = 0.56;
const ELLIPSIS: char = '…';

static MEASURER: Lazy<Mutex<Measurer>> = Lazy::new(|| Mutex::new(Measurer::default()));

/// Advance width of `text` in pixels using the first installed font matching
/// `font_family`. Falls back to a per-character estimate when no font is
/// available.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> f32 {
    if text.is_empty() || font_size <= 0.0 {
        return 0.0;
    }
    let measured = MEASURER
        .lock()
        .ok()
        .and_then(|mut measurer| measurer.measure(text, font_size, font_family));
    measured.unwrap_or_else(|| estimate_width(text, font_size))
}

/// Shorten `text` with a trailing ellipsis until it fits `max_width`.
pub fn fit_label(text: &str, max_width: f32, font_size: f32, font_family: &str) -> String {
    fit_with(text, max_width, |candidate| {
        measure_text_width(candidate, font_size, font_family)
    })
}

fn fit_with(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> String {
    let text = text.trim();
    if measure(text) <= max_width {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    let mut keep = chars.len();
    while keep > 0 {
        keep -= 1;
        let mut candidate: String = chars[..keep].iter().collect::<String>().trim_end().to_string();
        candidate.push(ELLIPSIS);
        if measure(&candidate) <= max_width {
            return candidate;
        }
    }
    ELLIPSIS.to_string()
}

fn estimate_width(text: &str, font_size: f32) -> f32 {
    text.chars().filter(|ch| *ch != '\n').count() as f32 * font_size * FALLBACK_CHAR_RATIO
}

#[derive(Default)]
struct Measurer {
    db: Option<Database>,
    faces: HashMap<String, Option<FontData>>,
}

struct FontData {
    bytes: Vec<u8>,
    index: u32,
}

impl Measurer {
    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        let key = font_family.trim().to_string();
        if !self.faces.contains_key(&key) {
            let loaded = self.load(font_family);
            if loaded.is_none() {
                tracing::debug!(family = %key, "no installed font, estimating text width");
            }
            self.faces.insert(key.clone(), loaded);
        }
        let data = self.faces.get(&key)?.as_ref()?;
        let face = Face::parse(&data.bytes, data.index).ok()?;
        let scale = font_size / f32::from(face.units_per_em().max(1));
        let fallback = font_size * FALLBACK_CHAR_RATIO;
        let width = text
            .chars()
            .filter(|ch| *ch != '\n')
            .map(|ch| {
                face.glyph_index(ch)
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
                    .map(|advance| f32::from(advance) * scale)
                    .unwrap_or(fallback)
            })
            .sum::<f32>();
        Some(width.max(0.0))
    }

    fn load(&mut self, font_family: &str) -> Option<FontData> {
        let names: Vec<&str> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\''))
            .filter(|part| !part.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "sans-serif" | "system-ui" | "ui-sans-serif" => Family::SansSerif,
                "monospace" | "ui-monospace" => Family::Monospace,
                "cursive" => Family::Cursive,
                "fantasy" => Family::Fantasy,
                _ => Family::Name(name),
            })
            .collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        let db = self.db.get_or_insert_with(|| {
            let mut db = Database::new();
            db.load_system_fonts();
            db
        });
        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = db.query(&query)?;
        db.with_face_data(id, |bytes, index| FontData {
            bytes: bytes.to_vec(),
            index,
        })
    }
}
