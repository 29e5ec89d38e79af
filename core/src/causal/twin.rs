//! Twin network: a factual world plus counterfactual worlds keyed by the
//! intervention that produces them
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt;

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

/// Ordered `NAME=VALUE` terms. Values are kept as text because worlds may
/// leave a variable undetermined (`?`) or tie it to another (`Y=W`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorldAssignment {
    terms: Vec<(String, String)>,
}

impl WorldAssignment {
    pub fn of(terms: &[(&str, &str)]) -> Self {
        Self {
            terms: terms
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }

    /// Append a term at the end of the assignment
    pub fn push(&mut self, name: &str, value: &str) {
        self.terms.push((name.to_string(), value.to_string()));
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.terms
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl fmt::Display for WorldAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}

impl Serialize for WorldAssignment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Intervention rendered in `do(...)` notation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intervention(WorldAssignment);

impl Intervention {
    pub fn of(terms: &[(&str, &str)]) -> Self {
        Self(WorldAssignment::of(terms))
    }

    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.0.names()
    }
}

impl fmt::Display for Intervention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "do({})", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwinNetwork {
    factual_world: WorldAssignment,
    counterfactual_worlds: Vec<(Intervention, WorldAssignment)>,
}

impl TwinNetwork {
    pub fn new(factual_world: WorldAssignment) -> Self {
        Self {
            factual_world,
            counterfactual_worlds: Vec::new(),
        }
    }

    pub fn counterfactual(mut self, intervention: Intervention, world: WorldAssignment) -> Self {
        self.counterfactual_worlds.push((intervention, world));
        self
    }

    pub fn factual_world(&self) -> &WorldAssignment {
        &self.factual_world
    }

    pub fn counterfactual_worlds(&self) -> &[(Intervention, WorldAssignment)] {
        &self.counterfactual_worlds
    }

    /// World reached under the intervention rendered as `key`
    pub fn world_under(&self, key: &str) -> Option<&WorldAssignment> {
        self.counterfactual_worlds
            .iter()
            .find(|(intervention, _)| intervention.to_string() == key)
            .map(|(_, world)| world)
    }

    /// Mark `name` present (`=1`) in the factual and every counterfactual world
    pub fn mark_present(&mut self, name: &str) {
        self.factual_world.push(name, "1");
        for (_, world) in &mut self.counterfactual_worlds {
            world.push(name, "1");
        }
    }
}

struct OrderedWorlds<'a>(&'a [(Intervention, WorldAssignment)]);

impl Serialize for OrderedWorlds<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (intervention, world) in self.0 {
            map.serialize_entry(&intervention.to_string(), world)?;
        }
        map.end()
    }
}

impl Serialize for TwinNetwork {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("TwinNetwork", 2)?;
        state.serialize_field("factual_world", &self.factual_world)?;
        state.serialize_field("counterfactual_world", &OrderedWorlds(&self.counterfactual_worlds))?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_rendering() {
        let world = WorldAssignment::of(&[("Z", "1"), ("W", "?"), ("Y", "W")]);
        assert_eq!(world.to_string(), "Z=1, W=?, Y=W");
        assert_eq!(world.value("Y"), Some("W"));
        assert_eq!(Intervention::of(&[("X1", "0"), ("X2", "1")]).to_string(), "do(X1=0, X2=1)");
    }

    #[test]
    fn test_twin_network_serialises_worlds_in_order() {
        let twin = TwinNetwork::new(WorldAssignment::of(&[("X1", "1"), ("Y", "1")]))
            .counterfactual(
                Intervention::of(&[("X2", "0")]),
                WorldAssignment::of(&[("X1", "1"), ("Y", "1")]),
            )
            .counterfactual(
                Intervention::of(&[("X1", "0")]),
                WorldAssignment::of(&[("Y", "0")]),
            );

        let json = serde_json::to_string(&twin).unwrap();
        assert_eq!(
            json,
            r#"{"factual_world":"X1=1, Y=1","counterfactual_world":{"do(X2=0)":"X1=1, Y=1","do(X1=0)":"Y=0"}}"#
        );
        assert_eq!(twin.world_under("do(X1=0)").map(ToString::to_string), Some("Y=0".to_string()));
    }

    #[test]
    fn test_mark_present_touches_every_world() {
        let mut twin = TwinNetwork::new(WorldAssignment::of(&[("Y", "1")]))
            .counterfactual(Intervention::of(&[("X", "0")]), WorldAssignment::of(&[("Y", "0")]));
        twin.mark_present("S");
        assert_eq!(twin.factual_world().to_string(), "Y=1, S=1");
        assert_eq!(twin.counterfactual_worlds()[0].1.to_string(), "Y=0, S=1");
    }
}
