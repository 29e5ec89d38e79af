//! Overdetermination
//!
//! Two movers M1 and M2 strike the stationary target S at (nearly) the same
//! time. Either strike alone would have set S in motion, so each is
//! sufficient and neither is necessary.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::BTreeSet;

use log::debug;
use rand::RngCore;
use serde::Serialize;

use super::{
    assignment_from, bind_in_order, describe, distractor_descriptions, AnalysisRecord, ScenarioFlags,
    ScenarioKind, ScenarioTriple,
};
use crate::causal::{CausalGraph, CausalModel, Intervention, TwinNetwork, WorldAssignment};
use crate::events::EventExtractor;
use crate::qa::{CausalSemantics, QaBattery, QaPair, QuestionType};
use crate::roles::{identify, Role};
use crate::scene::{Collision, ObjectId, SceneRecord, Trajectory};
use crate::setting::Setting;

/// Largest number of distinct strike frames still counted as simultaneous
const SIMULTANEITY_FRAMES: usize = 2;

pub const TRIPLE: ScenarioTriple = ScenarioTriple {
    analyze,
    synthesize,
    encode,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverdeterminationFlags {
    pub simultaneous_collision: bool,
}

pub fn analyze(trajectory: &Trajectory, collisions: &[Collision], setting: Setting) -> AnalysisRecord {
    let scenario = ScenarioKind::Overdetermination;
    let skeleton = identify(trajectory, setting, scenario);
    let mut roles = assignment_from(scenario, &skeleton);
    bind_in_order(&mut roles, &skeleton, &[Role::S], &[Role::M1, Role::M2]);

    let mut flags = OverdeterminationFlags::default();

    if let Some(s) = roles.get(Role::S) {
        let strikes: Vec<&Collision> = collisions.iter().filter(|c| c.involves(s)).collect();

        let mut strikers: Vec<ObjectId> = Vec::new();
        for id in strikes.iter().flat_map(|c| c.object_ids.iter().copied()) {
            if id != s && !strikers.contains(&id) {
                strikers.push(id);
            }
        }

        if let [m1, m2, ..] = strikers[..] {
            roles.bind(Role::M1, m1);
            roles.bind(Role::M2, m2);

            let frames: BTreeSet<usize> = strikes.iter().map(|c| c.frame_id).collect();
            flags.simultaneous_collision = frames.len() <= SIMULTANEITY_FRAMES;
            if !flags.simultaneous_collision {
                debug!("Strikes on object {} span {} frames", s, frames.len());
            }
        }
    }

    let events = EventExtractor::new(trajectory)
        .approach(roles.get(Role::M1), roles.get(Role::S))
        .approach(roles.get(Role::M2), roles.get(Role::S))
        .onset(roles.get(Role::S))
        .extract(collisions);

    AnalysisRecord {
        scenario,
        setting,
        roles,
        flags: ScenarioFlags::Overdetermination(flags),
        events,
    }
}

pub fn synthesize(
    scene: &SceneRecord,
    analysis: &AnalysisRecord,
    setting: Setting,
    rng: &mut dyn RngCore,
) -> Vec<QaPair> {
    let Some([m1, m2, s]) = describe(scene, analysis, [Role::M1, Role::M2, Role::S]) else {
        return Vec::new();
    };

    let mut battery = QaBattery::new(distractor_descriptions(scene, analysis, setting), rng);

    battery
        .yes_no(
            QuestionType::CausalityIdentification,
            format!("Does the {m1}'s motion toward the {s} affect the {s}'s motion?"),
            true,
        )
        .yes_no(
            QuestionType::CausalityIdentification,
            format!("Does the {m2}'s motion toward the {s} affect the {s}'s motion?"),
            true,
        )
        .attribution(
            format!("Why did the {s} move?"),
            vec![
                format!("Because the {m1} moved toward the {s}."),
                format!("Because the {m2} moved toward the {s}."),
                format!("Because the {m1} and the {m2} moved toward the {s}."),
                format!("Because the {s} moved spontaneously."),
            ],
            &[0, 1],
        )
        .yes_no(
            QuestionType::IndividualCausalEffect,
            format!("If we force the {m1} not to move toward the {s}, will the {m2} cause the {s} to move?"),
            true,
        )
        .yes_no(
            QuestionType::IndividualCausalEffect,
            format!("If we force the {m2} not to move toward the {s}, will the {m1} cause the {s} to move?"),
            true,
        )
        .yes_no(
            QuestionType::CounterfactualReasoning,
            format!("If the {m1} had not moved toward the {s}, would the {s} still have moved?"),
            true,
        )
        .yes_no(
            QuestionType::CounterfactualReasoning,
            format!("If the {m2} had not moved toward the {s}, would the {s} still have moved?"),
            true,
        )
        .yes_no(
            QuestionType::SufficientCause,
            format!("Was the fact that the {m1} moved toward the {s} sufficient for the {s} to move?"),
            true,
        )
        .yes_no(
            QuestionType::SufficientCause,
            format!("Was the fact that the {m2} moved toward the {s} sufficient for the {s} to move?"),
            true,
        )
        .yes_no(
            QuestionType::NecessaryCause,
            format!("Was the fact that the {m1} moved toward the {s} necessary for the {s} to move?"),
            false,
        )
        .yes_no(
            QuestionType::NecessaryCause,
            format!("Was the fact that the {m2} moved toward the {s} necessary for the {s} to move?"),
            false,
        )
        .actual_cause(
            format!("What is the actual cause of the {s} moving?"),
            vec![
                format!("The {m1} moves toward the {s}."),
                format!("The {m2} moves toward the {s}."),
                format!("The {m1} and the {m2} move toward the {s}."),
                "None.".to_string(),
            ],
            [
                (CausalSemantics::HP, &[0, 1, 2]),
                (CausalSemantics::BV, &[0, 1]),
                (CausalSemantics::DBV, &[0, 1]),
                (CausalSemantics::Boc, &[0, 1]),
            ],
        )
        .yes_no(
            QuestionType::Responsibility,
            format!("Was the fact that the {m1} moved toward the {s} responsible for the {s} moving?"),
            true,
        )
        .yes_no(
            QuestionType::Responsibility,
            format!("Was the fact that the {m2} moved toward the {s} responsible for the {s} moving?"),
            true,
        );

    battery.finish()
}

pub fn encode(scene: &SceneRecord, analysis: &AnalysisRecord, setting: Setting) -> CausalModel {
    let Some([m1, m2, s]) = describe(scene, analysis, [Role::M1, Role::M2, Role::S]) else {
        return CausalModel::unresolved();
    };

    let graph = CausalGraph::new()
        .variable("X1", format!("The {m1}'s motion toward the {s}"))
        .variable("X2", format!("The {m2}'s motion toward the {s}"))
        .variable("Y", format!("The {s}'s motion"))
        .edge("X1", "Y")
        .edge("X2", "Y");

    let twin = TwinNetwork::new(WorldAssignment::of(&[("X1", "1"), ("X2", "1"), ("Y", "1")]))
        .counterfactual(
            Intervention::of(&[("X1", "0")]),
            WorldAssignment::of(&[("X2", "1"), ("Y", "1")]),
        )
        .counterfactual(
            Intervention::of(&[("X2", "0")]),
            WorldAssignment::of(&[("X1", "1"), ("Y", "1")]),
        );

    CausalModel::new(graph, twin).with_distractors(setting, &distractor_descriptions(scene, analysis, setting))
}
