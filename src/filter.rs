//! Timeline and trait filters, plus name search.
//!
//! Filters never move anything. They only decide which cards are drawn
//! faded.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ir::{Entity, House};

static DATE_NOISE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)c\.|circa|born|died|after|before").unwrap());
static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());
static BEFORE_CONQUEST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)bc|b\.c\.|a\.c\.|\boc\b").unwrap());

/// Read a free-form year such as `"c. 27 BC"` or `"129 AC"`.
///
/// Years before the conquest come back negative. Returns `None` when the
/// text holds no digits.
pub fn parse_year(text: &str) -> Option<i32> {
    let cleaned = DATE_NOISE_RE.replace_all(text, "");
    let cleaned = cleaned.trim();
    let digits = DIGITS_RE.find(cleaned)?;
    let year: i32 = digits.as_str().parse().ok()?;
    if BEFORE_CONQUEST_RE.is_match(cleaned) {
        Some(-year)
    } else {
        Some(year)
    }
}

pub fn format_year(year: i32) -> String {
    if year < 0 {
        format!("{} BC", year.unsigned_abs())
    } else {
        format!("{year} AC")
    }
}

fn year_attribute(entity: &Entity, key: &str) -> Option<i32> {
    let value = entity.attributes.get(key)?;
    match value.as_str() {
        Some(text) => parse_year(text),
        None => value.as_i64().and_then(|year| i32::try_from(year).ok()),
    }
}

pub fn birth_year(entity: &Entity) -> Option<i32> {
    year_attribute(entity, "birthYear")
}

pub fn death_year(entity: &Entity) -> Option<i32> {
    year_attribute(entity, "deathYear")
}

/// Earliest and latest known year across a set of entities, for bounding a
/// timeline slider.
pub fn year_range(entities: &[Entity]) -> Option<(i32, i32)> {
    entities
        .iter()
        .flat_map(|entity| [birth_year(entity), death_year(entity)])
        .flatten()
        .fold(None, |range, year| match range {
            None => Some((year, year)),
            Some((lo, hi)) => Some((lo.min(year), hi.max(year))),
        })
}

/// Which cards stay at full strength.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityFilter {
    /// Only entities alive in this year. Unknown birth or death years never
    /// exclude anybody.
    pub year: Option<i32>,
    pub kings_only: bool,
    pub dragon_riders_only: bool,
}

impl EntityFilter {
    pub fn is_active(&self) -> bool {
        self.year.is_some() || self.kings_only || self.dragon_riders_only
    }

    pub fn is_dimmed(&self, entity: &Entity) -> bool {
        if self.kings_only && !entity.flag("isKing") {
            return true;
        }
        if self.dragon_riders_only && !entity.flag("isDragonRider") {
            return true;
        }
        let Some(year) = self.year else {
            return false;
        };
        let born_later = birth_year(entity).is_some_and(|birth| birth > year);
        let died_earlier = death_year(entity).is_some_and(|death| death < year);
        born_later || died_earlier
    }
}

/// One search result, tagged with the house it was found in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub house_id: String,
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl House {
    /// Entities whose name or title contains `query`, ignoring case. A blank
    /// query matches nothing.
    pub fn search(&self, query: &str) -> Vec<&Entity> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.entities
            .iter()
            .filter(|entity| {
                entity.name().to_lowercase().contains(&needle)
                    || entity
                        .title()
                        .is_some_and(|title| title.to_lowercase().contains(&needle))
            })
            .collect()
    }
}

/// Search every house, in order.
pub fn search_houses(houses: &[House], query: &str) -> Vec<SearchHit> {
    houses
        .iter()
        .flat_map(|house| {
            house.search(query).into_iter().map(|entity| SearchHit {
                house_id: house.id.clone(),
                id: entity.id.clone(),
                name: entity.name().to_string(),
                title: entity.title().map(str::to_string),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aegon() -> Entity {
        Entity::new("aegon1", 1.0, 0.5)
            .with_attribute("name", "Aegon I")
            .with_attribute("title", "The Conqueror")
            .with_attribute("isKing", true)
            .with_attribute("isDragonRider", true)
            .with_attribute("birthYear", "27 BC")
            .with_attribute("deathYear", "37 AC")
    }

    fn eddard() -> Entity {
        Entity::new("eddard", 1.0, 0.0)
            .with_attribute("name", "Eddard Stark")
            .with_attribute("title", "Hand of the King")
            .with_attribute("birthYear", "263 AC")
            .with_attribute("deathYear", "298 AC")
    }

    #[test]
    fn parses_conquest_years() {
        assert_eq!(parse_year("27 BC"), Some(-27));
        assert_eq!(parse_year("129 AC"), Some(129));
        assert_eq!(parse_year("c. 44 AC"), Some(44));
        assert_eq!(parse_year("born circa 12 BC"), Some(-12));
        assert_eq!(parse_year("died 3 oc"), Some(-3));
        assert_eq!(parse_year("07 AC"), Some(7));
        assert_eq!(parse_year("unknown"), None);
        assert_eq!(parse_year(""), None);
    }

    #[test]
    fn formats_years_either_side_of_the_conquest() {
        assert_eq!(format_year(-27), "27 BC");
        assert_eq!(format_year(0), "0 AC");
        assert_eq!(format_year(298), "298 AC");
    }

    #[test]
    fn year_range_spans_births_and_deaths() {
        let entities = vec![aegon(), eddard(), Entity::new("nobody", 2.0, 0.0)];
        assert_eq!(year_range(&entities), Some((-27, 298)));
        assert_eq!(year_range(&[Entity::new("nobody", 1.0, 0.0)]), None);
    }

    #[test]
    fn numeric_years_are_accepted() {
        let entity = Entity::new("x", 1.0, 0.0).with_attribute("birthYear", -5);
        assert_eq!(birth_year(&entity), Some(-5));
    }

    #[test]
    fn timeline_dims_the_unborn_and_the_dead() {
        let filter = EntityFilter {
            year: Some(10),
            ..EntityFilter::default()
        };
        assert!(filter.is_active());
        assert!(!filter.is_dimmed(&aegon()));
        assert!(filter.is_dimmed(&eddard()));
        assert!(!filter.is_dimmed(&Entity::new("undated", 1.0, 0.0)));

        let late = EntityFilter {
            year: Some(299),
            ..EntityFilter::default()
        };
        assert!(late.is_dimmed(&aegon()));
        assert!(late.is_dimmed(&eddard()));
    }

    #[test]
    fn trait_filters_keep_only_flagged_entities() {
        let kings = EntityFilter {
            kings_only: true,
            ..EntityFilter::default()
        };
        assert!(!kings.is_dimmed(&aegon()));
        assert!(kings.is_dimmed(&eddard()));

        let riders = EntityFilter {
            dragon_riders_only: true,
            ..EntityFilter::default()
        };
        assert!(!riders.is_dimmed(&aegon()));
        assert!(riders.is_dimmed(&eddard()));

        assert!(!EntityFilter::default().is_active());
        assert!(!EntityFilter::default().is_dimmed(&eddard()));
    }

    #[test]
    fn filter_reads_camel_case() {
        let filter: EntityFilter = serde_json::from_str(r#"{"year":-10,"kingsOnly":true}"#).unwrap();
        assert_eq!(filter.year, Some(-10));
        assert!(filter.kings_only);
        assert!(!filter.dragon_riders_only);
    }

    #[test]
    fn search_matches_name_or_title_ignoring_case() {
        let mut house = House::new("mixed");
        house.entities = vec![aegon(), eddard()];
        let ids = |query: &str| -> Vec<String> {
            house.search(query).iter().map(|e| e.id.clone()).collect()
        };
        assert_eq!(ids("aegon"), ["aegon1"]);
        assert_eq!(ids("HAND"), ["eddard"]);
        assert_eq!(ids("o"), ["aegon1", "eddard"]);
        assert!(ids("   ").is_empty());
        assert!(ids("tully").is_empty());
    }

    #[test]
    fn search_spans_houses() {
        let mut targaryen = House::new("targaryen");
        targaryen.entities.push(aegon());
        let mut stark = House::new("stark");
        stark.entities.push(eddard());
        let hits = search_houses(&[targaryen, stark], "king");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].house_id, "stark");
        assert_eq!(hits[0].title.as_deref(), Some("Hand of the King"));
    }
}
