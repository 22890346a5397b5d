use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A person in a house graph.
///
/// Only `generation` and `x` matter to layout. Everything else the stored
/// document carries (name, title, imagery, status flags...) lives in
/// `attributes` and is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(default)]
    pub generation: f32,
    #[serde(default)]
    pub x: f32,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

impl Entity {
    pub fn new(id: &str, generation: f32, x: f32) -> Self {
        Self {
            id: id.to_string(),
            generation,
            x,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn flag(&self, key: &str) -> bool {
        self.attributes
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(|v| v.as_str())
    }

    /// Out-of-wedlock children get dashed descent lines.
    pub fn is_bastard(&self) -> bool {
        self.flag("isBastard")
    }

    /// Placeholder for an unknown link in a lineage. Rendering only.
    pub fn is_gap(&self) -> bool {
        self.flag("isGap")
    }

    pub fn name(&self) -> &str {
        self.text("name").unwrap_or(&self.id)
    }

    pub fn title(&self) -> Option<&str> {
        self.text("title").filter(|t| !t.is_empty())
    }
}

/// A parent set jointly linked to a child set.
///
/// Two parents with no children is a partnership with no offspring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub id: String,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub children: Vec<String>,
}

impl Relation {
    pub fn new(id: &str, parents: &[&str], children: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            parents: parents.iter().map(|p| p.to_string()).collect(),
            children: children.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn is_partnership(&self) -> bool {
        self.parents.len() == 2 && self.children.is_empty()
    }

    /// Empty, or a lone parent with nobody attached.
    pub fn is_prunable(&self) -> bool {
        self.parents.is_empty() || (self.parents.len() == 1 && self.children.is_empty())
    }

    pub fn touches(&self, id: &str) -> bool {
        self.parents.iter().any(|p| p == id) || self.children.iter().any(|c| c == id)
    }
}

/// One house document: the unit a layout run operates on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct House {
    pub id: String,
    #[serde(rename = "characters", default)]
    pub entities: Vec<Entity>,
    #[serde(rename = "connections", default)]
    pub relations: Vec<Relation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_id: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl House {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            entities: Vec::new(),
            relations: Vec::new(),
            root_id: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.iter().any(|e| e.id == id)
    }

    pub fn from_json(input: &str) -> serde_json::Result<Self> {
        serde_json::from_str(input)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_round_trips_display_attributes() {
        let raw = r#"{"id":"jon","name":"Jon","generation":2,"x":3.5,"isBastard":true,"house":"stark"}"#;
        let entity: Entity = serde_json::from_str(raw).unwrap();
        assert_eq!(entity.generation, 2.0);
        assert!(entity.is_bastard());
        assert!(!entity.is_gap());
        assert_eq!(entity.name(), "Jon");
        let back = serde_json::to_value(&entity).unwrap();
        assert_eq!(back["house"], "stark");
        assert_eq!(back["isBastard"], true);
    }

    #[test]
    fn missing_coordinates_default_to_zero() {
        let entity: Entity = serde_json::from_str(r#"{"id":"c"}"#).unwrap();
        assert_eq!(entity.x, 0.0);
        assert_eq!(entity.generation, 0.0);
        assert_eq!(entity.name(), "c");
    }

    #[test]
    fn prunable_relations() {
        assert!(Relation::new("r", &[], &["a"]).is_prunable());
        assert!(Relation::new("r", &["a"], &[]).is_prunable());
        assert!(!Relation::new("r", &["a"], &["b"]).is_prunable());
        assert!(!Relation::new("r", &["a", "b"], &[]).is_prunable());
        assert!(Relation::new("r", &["a", "b"], &[]).is_partnership());
    }

    #[test]
    fn house_keeps_document_fields() {
        let raw = r#"{
            "id": "stark",
            "characters": [{"id": "ned", "generation": 1, "x": 0}],
            "connections": [],
            "rootId": "ned",
            "theme": {"name": "Casa Stark"}
        }"#;
        let house = House::from_json(raw).unwrap();
        assert_eq!(house.root_id.as_deref(), Some("ned"));
        assert!(house.contains("ned"));
        assert_eq!(house.extra["theme"]["name"], "Casa Stark");
    }
}
