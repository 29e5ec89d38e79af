//! Causal graph over named scenario variables
//!
//! Variables keep declaration order, which is also their serialised order.
//! Edges serialise as `"A -> B"` strings.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::HashSet;
use std::fmt;

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::error::{Result, SceneError};

/// Named variable with its natural-language description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub id: String,
    pub description: String,
}

/// Directed edge between two variable ids
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

impl Serialize for Edge {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CausalGraph {
    variables: Vec<Variable>,
    edges: Vec<Edge>,
}

impl CausalGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a variable; redeclaring an id replaces its description
    pub fn variable(mut self, id: &str, description: impl Into<String>) -> Self {
        let description = description.into();
        match self.variables.iter_mut().find(|v| v.id == id) {
            Some(existing) => existing.description = description,
            None => self.variables.push(Variable {
                id: id.to_string(),
                description,
            }),
        }
        self
    }

    pub fn edge(mut self, from: &str, to: &str) -> Self {
        self.edges.push(Edge {
            from: from.to_string(),
            to: to.to_string(),
        });
        self
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn contains(&self, id: &str) -> bool {
        self.variables.iter().any(|v| v.id == id)
    }

    pub fn description(&self, id: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|v| v.id == id)
            .map(|v| v.description.as_str())
    }

    /// Check that every edge endpoint names a declared variable
    pub fn validate(&self) -> Result<()> {
        let declared: HashSet<&str> = self.variables.iter().map(|v| v.id.as_str()).collect();
        for edge in &self.edges {
            for endpoint in [&edge.from, &edge.to] {
                if !declared.contains(endpoint.as_str()) {
                    return Err(SceneError::GraphViolation(format!(
                        "edge {} references undeclared variable {}",
                        edge, endpoint
                    )));
                }
            }
        }
        Ok(())
    }
}

struct OrderedVariables<'a>(&'a [Variable]);

impl Serialize for OrderedVariables<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for variable in self.0 {
            map.serialize_entry(&variable.id, &variable.description)?;
        }
        map.end()
    }
}

impl Serialize for CausalGraph {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("CausalGraph", 2)?;
        state.serialize_field("variables", &OrderedVariables(&self.variables))?;
        state.serialize_field("edges", &self.edges)?;
        state.end()
    }
}
