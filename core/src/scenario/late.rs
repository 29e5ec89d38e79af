//! Late preemption
//!
//! M1 strikes the stationary target S first; M2 was also on its way and
//! would have struck S had M1 not got there first.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use rand::RngCore;
use serde::Serialize;

use super::{
    assignment_from, bind_in_order, describe, distractor_descriptions, AnalysisRecord, ScenarioFlags,
    ScenarioKind, ScenarioTriple,
};
use crate::causal::{CausalGraph, CausalModel, Intervention, TwinNetwork, WorldAssignment};
use crate::events::EventExtractor;
use crate::kinematics::moving_towards;
use crate::qa::{CausalSemantics, QaBattery, QaPair, QuestionType};
use crate::roles::{identify, Role};
use crate::scene::{collision_sequence, Collision, ObjectId, SceneRecord, Trajectory};
use crate::setting::Setting;

/// Stand-in description when the preempted mover is unresolved
const UNRESOLVED_MOVER: &str = "another object";

pub const TRIPLE: ScenarioTriple = ScenarioTriple {
    analyze,
    synthesize,
    encode,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LateFlags {
    pub m1_reaches_target: bool,
    pub m2_reaches_target: bool,
}

/// True if `mover` heads for `target` in at least one frame
fn reaches(trajectory: &Trajectory, mover: Option<ObjectId>, target: Option<ObjectId>) -> bool {
    let (Some(mover), Some(target)) = (mover, target) else {
        return false;
    };
    trajectory.frames().iter().any(|frame| {
        match (frame.object(mover), frame.object(target)) {
            (Some(a), Some(b)) => moving_towards(&a.location, &a.velocity, &b.location, &b.velocity),
            _ => false,
        }
    })
}

pub fn analyze(trajectory: &Trajectory, collisions: &[Collision], setting: Setting) -> AnalysisRecord {
    let scenario = ScenarioKind::Late;
    let skeleton = identify(trajectory, setting, scenario);
    let mut roles = assignment_from(scenario, &skeleton);

    if setting.is_basic() {
        if let Some(&s) = skeleton.static_objects.first() {
            roles.bind(Role::S, s);

            let strikes: Vec<Collision> = collision_sequence(collisions)
                .into_iter()
                .filter(|c| c.involves(s))
                .collect();
            let m1 = strikes.first().and_then(|c| c.partner_of(s));
            roles.bind_opt(Role::M1, m1);

            // Prefer a mover that never reaches S itself
            let candidates: Vec<ObjectId> = skeleton
                .moving_objects
                .iter()
                .copied()
                .filter(|&id| Some(id) != m1 && id != s)
                .collect();
            let m2 = candidates
                .iter()
                .copied()
                .find(|&id| !strikes.iter().any(|c| c.involves(id)))
                .or_else(|| candidates.first().copied());
            roles.bind_opt(Role::M2, m2);
        }
    } else {
        bind_in_order(&mut roles, &skeleton, &[Role::S], &[Role::M1, Role::M2]);
    }

    let flags = LateFlags {
        m1_reaches_target: reaches(trajectory, roles.get(Role::M1), roles.get(Role::S)),
        m2_reaches_target: reaches(trajectory, roles.get(Role::M2), roles.get(Role::S)),
    };

    let events = EventExtractor::new(trajectory)
        .approach(roles.get(Role::M1), roles.get(Role::S))
        .approach(roles.get(Role::M2), roles.get(Role::S))
        .onset(roles.get(Role::S))
        .extract(collisions);

    AnalysisRecord {
        scenario,
        setting,
        roles,
        flags: ScenarioFlags::Late(flags),
        events,
    }
}

fn preempted_description(scene: &SceneRecord, analysis: &AnalysisRecord) -> String {
    analysis
        .role(Role::M2)
        .map(|id| scene.describe(id))
        .unwrap_or_else(|| UNRESOLVED_MOVER.to_string())
}

pub fn synthesize(
    scene: &SceneRecord,
    analysis: &AnalysisRecord,
    setting: Setting,
    rng: &mut dyn RngCore,
) -> Vec<QaPair> {
    let Some([m1, s]) = describe(scene, analysis, [Role::M1, Role::S]) else {
        return Vec::new();
    };
    let m2 = preempted_description(scene, analysis);

    let mut battery = QaBattery::new(distractor_descriptions(scene, analysis, setting), rng);

    battery
        .yes_no(
            QuestionType::CausalityIdentification,
            format!("Does the {m1}'s collision with the {s} affect the {s}'s motion?"),
            true,
        )
        .yes_no(
            QuestionType::CausalityIdentification,
            format!("Does the {m2}'s collision with the {s} affect the {s}'s motion?"),
            true,
        )
        .yes_no(
            QuestionType::CausalityIdentification,
            format!("Does the {m1}'s collision with the {s} affect the {m2}'s collision with the {s}?"),
            true,
        )
        .attribution(
            format!("Why did the {s} move?"),
            vec![
                format!("Because the {m1} moved toward the {s}."),
                format!("Because the {m2} moved toward the {s}."),
                format!("Because the {s} moved spontaneously."),
            ],
            &[0],
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
                format!("The {m1} collides with the {s}."),
                format!("The {m2} collides with the {s}."),
                "None.".to_string(),
            ],
            [
                (CausalSemantics::HP, &[0, 2]),
                (CausalSemantics::BV, &[0, 2]),
                (CausalSemantics::DBV, &[0, 2]),
                (CausalSemantics::Boc, &[0, 2]),
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
            false,
        );

    battery.finish()
}

pub fn encode(scene: &SceneRecord, analysis: &AnalysisRecord, setting: Setting) -> CausalModel {
    let Some([m1, s]) = describe(scene, analysis, [Role::M1, Role::S]) else {
        return CausalModel::unresolved();
    };
    let m2 = preempted_description(scene, analysis);

    let graph = CausalGraph::new()
        .variable("X1", format!("The {m1}'s motion toward the {s}"))
        .variable("X2", format!("The {m2}'s motion toward the {s}"))
        .variable("Z1", format!("The {m1}'s collision with the {s}"))
        .variable("Z2", format!("The {m2}'s collision with the {s}"))
        .variable("Y", format!("The {s}'s motion"))
        .edge("X1", "Z1")
        .edge("X2", "Z2")
        .edge("Z1", "Z2")
        .edge("Z1", "Y")
        .edge("Z2", "Y");

    let twin = TwinNetwork::new(WorldAssignment::of(&[
        ("X1", "1"),
        ("X2", "1"),
        ("Z1", "1"),
        ("Z2", "0"),
        ("Y", "1"),
    ]))
    .counterfactual(
        Intervention::of(&[("X1", "0")]),
        WorldAssignment::of(&[("X2", "1"), ("Z1", "0"), ("Z2", "1"), ("Y", "1")]),
    )
    .counterfactual(
        Intervention::of(&[("X2", "0")]),
        WorldAssignment::of(&[("X1", "1"), ("Z1", "1"), ("Z2", "0"), ("Y", "1")]),
    );

    CausalModel::new(graph, twin).with_distractors(setting, &distractor_descriptions(scene, analysis, setting))
}
