//! Causal models emitted per scene
//!
//! A causal model pairs a small structural graph with a twin network. Scenes
//! whose roles could not be bound produce an unresolved model, serialised
//! as `null` graph and network. Distractor objects enter the model only as
//! indicator variables held at `1` in every world; they never gain edges.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod graph;
pub mod twin;

pub use self::graph::*;
pub use self::twin::*;

use log::warn;
use serde::Serialize;

use crate::error::{Result, SceneError};
use crate::setting::{DistractorKind, Setting};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CausalModel {
    pub causal_graph: Option<CausalGraph>,
    pub twin_network: Option<TwinNetwork>,
}

impl CausalModel {
    pub fn new(causal_graph: CausalGraph, twin_network: TwinNetwork) -> Self {
        Self {
            causal_graph: Some(causal_graph),
            twin_network: Some(twin_network),
        }
    }

    /// Model for a scene whose roles are unresolved
    pub fn unresolved() -> Self {
        Self::default()
    }

    pub fn is_resolved(&self) -> bool {
        self.causal_graph.is_some() && self.twin_network.is_some()
    }

    /// Append one presence indicator per distractor description
    ///
    /// Nothing is added unless exactly as many descriptions as the setting
    /// calls for are supplied.
    pub fn with_distractors(mut self, setting: Setting, descriptions: &[String]) -> Self {
        let names = indicator_names(setting);
        if names.is_empty() || names.len() != descriptions.len() {
            return self;
        }

        if let Some(graph) = self.causal_graph.take() {
            let graph = names
                .iter()
                .zip(descriptions)
                .fold(graph, |graph, (name, desc)| {
                    graph.variable(name, format!("The {}'s presence", desc))
                });
            self.causal_graph = Some(graph);
        }
        if let Some(twin) = self.twin_network.as_mut() {
            for name in names {
                twin.mark_present(name);
            }
        }
        self
    }

    /// Check edges and world terms against the declared variables
    pub fn validate(&self) -> Result<()> {
        let (Some(graph), Some(twin)) = (&self.causal_graph, &self.twin_network) else {
            return Ok(());
        };
        graph.validate()?;

        let worlds = std::iter::once(twin.factual_world())
            .chain(twin.counterfactual_worlds().iter().map(|(_, world)| world));
        let intervened = twin
            .counterfactual_worlds()
            .iter()
            .flat_map(|(intervention, _)| intervention.targets());

        for name in worlds.flat_map(WorldAssignment::names).chain(intervened) {
            if !graph.contains(name) {
                warn!("World term {} is not a declared variable", name);
                return Err(SceneError::GraphViolation(format!(
                    "world references undeclared variable {}",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Indicator variable names for a setting's distractors
pub fn indicator_names(setting: Setting) -> &'static [&'static str] {
    match (setting.distractor_kind(), setting.distractor_count()) {
        (Some(DistractorKind::Static), 1) => &["S"],
        (Some(DistractorKind::Static), _) => &["S1", "S2"],
        (Some(DistractorKind::Moving), 1) => &["M"],
        (Some(DistractorKind::Moving), _) => &["M1", "M2"],
        (None, _) => &[],
    }
}
