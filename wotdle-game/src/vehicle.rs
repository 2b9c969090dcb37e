//! Vehicle reference data
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// A guessable vehicle as delivered by the data source.
///
/// Only `tank_id` participates in equality; every other field is descriptive.
/// Fields the game does not model are kept in `extra` so a stored guess
/// survives a round trip untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vehicle {
    pub tank_id: i64,
    #[serde(default)]
    pub tier: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nation: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Vehicle {
    /// Bare vehicle carrying only an id and tier.
    #[must_use]
    pub fn new(tank_id: i64, tier: i32) -> Self {
        Self {
            tank_id,
            tier,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Display label, falling back to the id when the name is unknown.
    #[must_use]
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("#{}", self.tank_id))
    }
}

impl PartialEq for Vehicle {
    fn eq(&self, other: &Self) -> bool {
        self.tank_id == other.tank_id
    }
}

impl Eq for Vehicle {}

/// Vehicles from `list` whose id does not appear in `guesses`, in list order.
#[must_use]
pub fn without_guessed(list: &[Vehicle], guesses: &[Vehicle]) -> Vec<Vehicle> {
    let guessed: HashSet<i64> = guesses.iter().map(|v| v.tank_id).collect();
    list.iter()
        .filter(|v| !guessed.contains(&v.tank_id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_descriptive_fields() {
        let a = Vehicle::new(7, 8).with_name("Object 430U");
        let b = Vehicle::new(7, 10);
        assert_eq!(a, b);
        assert_ne!(a, Vehicle::new(8, 8));
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let json = r#"{"tank_id":5,"tier":9,"type":"heavyTank","short_name":"E 75","images":{"big":"x.png"}}"#;
        let vehicle: Vehicle = serde_json::from_str(json).unwrap();
        assert_eq!(vehicle.kind.as_deref(), Some("heavyTank"));
        assert_eq!(vehicle.extra["short_name"], "E 75");

        let value = serde_json::to_value(&vehicle).unwrap();
        assert_eq!(value["images"]["big"], "x.png");
        assert_eq!(value["type"], "heavyTank");
    }

    #[test]
    fn without_guessed_filters_by_id_and_keeps_order() {
        let list = vec![Vehicle::new(1, 8), Vehicle::new(2, 8), Vehicle::new(3, 9)];
        let guesses = vec![Vehicle::new(2, 0)];
        let remaining = without_guessed(&list, &guesses);
        let ids: Vec<i64> = remaining.iter().map(|v| v.tank_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn label_falls_back_to_id() {
        assert_eq!(Vehicle::new(42, 8).label(), "#42");
        assert_eq!(Vehicle::new(42, 8).with_name("IS-7").label(), "IS-7");
    }
}
