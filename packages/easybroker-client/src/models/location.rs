//! Location tree model.

use serde::Deserialize;

use super::de_opt_id;

/// A location from the `/locations` endpoint.
///
/// Self-referential tree: each node exclusively owns its children via
/// `localities`. Upstream data is assumed acyclic; no depth bound is
/// assumed anywhere (traversal is iterative).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Location {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub localities: Vec<Location>,
}

impl Location {
    /// Display name, preferring `full_name` over `name`.
    pub fn display_name(&self) -> Option<&str> {
        self.full_name.as_deref().or(self.name.as_deref())
    }

    pub fn has_localities(&self) -> bool {
        !self.localities.is_empty()
    }

    pub fn localities_count(&self) -> usize {
        self.localities.len()
    }

    pub fn is_country(&self) -> bool {
        self.kind_matches(&["country"])
    }

    pub fn is_state(&self) -> bool {
        self.kind_matches(&["state", "province"])
    }

    pub fn is_city(&self) -> bool {
        self.kind_matches(&["city"])
    }

    pub fn is_neighborhood(&self) -> bool {
        self.kind_matches(&["neighborhood", "colonia"])
    }

    fn kind_matches(&self, candidates: &[&str]) -> bool {
        self.kind
            .as_deref()
            .is_some_and(|kind| candidates.contains(&kind.to_lowercase().as_str()))
    }

    /// Human-readable type label, capitalizing unrecognized types.
    pub fn kind_label(&self) -> String {
        let Some(kind) = self.kind.as_deref() else {
            return "Unknown".to_string();
        };
        match kind.to_lowercase().as_str() {
            "country" => "Country".to_string(),
            "state" | "province" => "State".to_string(),
            "city" => "City".to_string(),
            "neighborhood" | "colonia" => "Neighborhood".to_string(),
            other => capitalize(other),
        }
    }

    /// Depth-first flattened list of all descendants, excluding this node.
    pub fn all_localities(&self) -> Vec<&Location> {
        let mut flattened = Vec::new();
        let mut stack: Vec<&Location> = self.localities.iter().rev().collect();
        while let Some(node) = stack.pop() {
            flattened.push(node);
            stack.extend(node.localities.iter().rev());
        }
        flattened
    }
}

fn capitalize(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn location(value: serde_json::Value) -> Location {
        serde_json::from_value(value).unwrap()
    }

    fn sample_tree() -> Location {
        location(json!({
            "id": 1,
            "name": "Nuevo León",
            "full_name": "Nuevo León, México",
            "type": "state",
            "localities": [
                {
                    "id": "2",
                    "name": "Monterrey",
                    "type": "city",
                    "parent_id": 1,
                    "localities": [
                        { "id": "3", "name": "Del Valle", "type": "colonia" },
                        { "id": "4", "name": "Obispado", "type": "neighborhood" }
                    ]
                },
                { "id": "5", "name": "San Pedro", "type": "city" }
            ]
        }))
    }

    #[test]
    fn builds_the_tree_from_nested_localities() {
        let state = sample_tree();
        assert_eq!(state.id.as_deref(), Some("1"));
        assert!(state.has_localities());
        assert_eq!(state.localities_count(), 2);
        assert_eq!(state.localities[0].parent_id.as_deref(), Some("1"));
        assert_eq!(state.localities[0].localities_count(), 2);
    }

    #[test]
    fn display_name_prefers_full_name() {
        let state = sample_tree();
        assert_eq!(state.display_name(), Some("Nuevo León, México"));
        assert_eq!(state.localities[1].display_name(), Some("San Pedro"));
    }

    #[test]
    fn classifies_types_case_insensitively() {
        let state = location(json!({ "type": "PROVINCE" }));
        assert!(state.is_state());
        assert!(!state.is_city());

        let neighborhood = location(json!({ "type": "Colonia" }));
        assert!(neighborhood.is_neighborhood());
        assert_eq!(neighborhood.kind_label(), "Neighborhood");
    }

    #[test]
    fn kind_label_capitalizes_unrecognized_types() {
        let zone = location(json!({ "type": "zone" }));
        assert_eq!(zone.kind_label(), "Zone");

        let unknown = location(json!({}));
        assert_eq!(unknown.kind_label(), "Unknown");
    }

    #[test]
    fn all_localities_flattens_depth_first() {
        let state = sample_tree();
        let names: Vec<_> = state
            .all_localities()
            .iter()
            .filter_map(|l| l.name.as_deref())
            .collect();
        assert_eq!(
            names,
            vec!["Monterrey", "Del Valle", "Obispado", "San Pedro"]
        );
    }

    #[test]
    fn all_localities_is_restartable() {
        let state = sample_tree();
        assert_eq!(state.all_localities().len(), 4);
        assert_eq!(state.all_localities().len(), 4);
    }
}
