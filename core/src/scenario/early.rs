//! Early preemption
//!
//! M1 strikes S1 and sets it moving. M2 strikes S2, which lies between M2
//! and S1 and would have carried on into S1, but S1 is already gone.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::debug;
use rand::RngCore;
use serde::Serialize;

use super::{
    assignment_from, bind_in_order, describe, distractor_descriptions, AnalysisRecord, ScenarioFlags,
    ScenarioKind, ScenarioTriple,
};
use crate::causal::{CausalGraph, CausalModel, Intervention, TwinNetwork, WorldAssignment};
use crate::events::EventExtractor;
use crate::kinematics::{are_collinear, is_between, moving_towards, speed, STATIONARY_SPEED};
use crate::qa::{CausalSemantics, QaBattery, QaPair, QuestionType};
use crate::roles::{identify, Role};
use crate::scene::{collision_sequence, Collision, Frame, ObjectId, SceneRecord, Trajectory};
use crate::setting::Setting;

/// Tolerance of the collinearity and betweenness checks
const ALIGNMENT_EPS: f64 = 1e-2;

/// Trajectories shorter than this leave the final state unknown
const FINAL_STATE_MIN_FRAMES: usize = 10;

const FINAL_STATE_WINDOW: usize = 5;

const FINAL_STATE_QUORUM: usize = 3;

pub const TRIPLE: ScenarioTriple = ScenarioTriple {
    analyze,
    synthesize,
    encode,
};

/// Whether S1 is still moving at the end of the clip
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalState {
    Moving,
    Stationary,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EarlyFlags {
    pub collision_sequence: Vec<Collision>,
    pub s1_final_state: FinalState,
}

/// A moving-static contact split into (mover, target)
#[derive(Debug, Clone, Copy)]
struct Strike {
    mover: ObjectId,
    target: ObjectId,
}

fn strikes(sequence: &[Collision], statics: &[ObjectId], movers: &[ObjectId]) -> Vec<Strike> {
    sequence
        .iter()
        .filter_map(Collision::pair)
        .filter_map(|(a, b)| {
            if movers.contains(&a) && statics.contains(&b) {
                Some(Strike { mover: a, target: b })
            } else if movers.contains(&b) && statics.contains(&a) {
                Some(Strike { mover: b, target: a })
            } else {
                None
            }
        })
        .collect()
}

/// Frame-zero geometry of an early-preemption pair of strikes
fn is_preemption(first_frame: &Frame, first: Strike, second: Strike) -> bool {
    if first.mover == second.mover || first.target == second.target {
        return false;
    }
    let (Some(m1), Some(s1), Some(m2), Some(s2)) = (
        first_frame.object(first.mover),
        first_frame.object(first.target),
        first_frame.object(second.mover),
        first_frame.object(second.target),
    ) else {
        return false;
    };

    moving_towards(&m1.location, &m1.velocity, &s1.location, &s1.velocity)
        && moving_towards(&m2.location, &m2.velocity, &s2.location, &s2.velocity)
        && are_collinear(&m2.location, &s2.location, &s1.location, ALIGNMENT_EPS)
        && is_between(&m2.location, &s2.location, &s1.location, ALIGNMENT_EPS)
}

fn final_state(trajectory: &Trajectory, s1: Option<ObjectId>) -> FinalState {
    let Some(s1) = s1 else {
        return FinalState::Unknown;
    };
    if trajectory.len() <= FINAL_STATE_MIN_FRAMES {
        return FinalState::Unknown;
    }
    let moving = trajectory
        .tail(FINAL_STATE_WINDOW)
        .iter()
        .filter_map(|frame| frame.object(s1))
        .filter(|state| speed(&state.velocity) > STATIONARY_SPEED)
        .count();
    if moving >= FINAL_STATE_QUORUM {
        FinalState::Moving
    } else {
        FinalState::Stationary
    }
}

pub fn analyze(trajectory: &Trajectory, collisions: &[Collision], setting: Setting) -> AnalysisRecord {
    let scenario = ScenarioKind::Early;
    let skeleton = identify(trajectory, setting, scenario);
    let mut roles = assignment_from(scenario, &skeleton);
    let sequence = collision_sequence(collisions);

    if setting.is_basic() {
        let candidates = strikes(&sequence, &skeleton.static_objects, &skeleton.moving_objects);
        let enough = skeleton.static_objects.len() >= 2 && skeleton.moving_objects.len() >= 2;

        if let (true, Some(first_frame), [earliest, next, ..]) =
            (enough, trajectory.first(), candidates.as_slice())
        {
            let (first, second) = candidates
                .windows(2)
                .map(|pair| (pair[0], pair[1]))
                .find(|&(first, second)| is_preemption(first_frame, first, second))
                .unwrap_or_else(|| {
                    debug!("no strike pair matches the early geometry, using the earliest two");
                    (*earliest, *next)
                });

            roles.bind(Role::M1, first.mover);
            roles.bind(Role::S1, first.target);
            roles.bind(Role::M2, second.mover);
            roles.bind(Role::S2, second.target);
        }
    } else {
        bind_in_order(&mut roles, &skeleton, &[Role::S1, Role::S2], &[Role::M1, Role::M2]);
    }

    let events = EventExtractor::new(trajectory)
        .approach(roles.get(Role::M1), roles.get(Role::S1))
        .approach(roles.get(Role::M2), roles.get(Role::S2))
        .onset(roles.get(Role::S1))
        .onset(roles.get(Role::S2))
        .extract(collisions);

    let flags = EarlyFlags {
        collision_sequence: sequence,
        s1_final_state: final_state(trajectory, roles.get(Role::S1)),
    };

    AnalysisRecord {
        scenario,
        setting,
        roles,
        flags: ScenarioFlags::Early(flags),
        events,
    }
}

pub fn synthesize(
    scene: &SceneRecord,
    analysis: &AnalysisRecord,
    setting: Setting,
    rng: &mut dyn RngCore,
) -> Vec<QaPair> {
    let Some([m1, s1, s2]) = describe(scene, analysis, [Role::M1, Role::S1, Role::S2]) else {
        return Vec::new();
    };
    if !analysis.is_resolved() {
        return Vec::new();
    }

    let mut battery = QaBattery::new(distractor_descriptions(scene, analysis, setting), rng);

    battery
        .yes_no(
            QuestionType::CausalityIdentification,
            format!("Does the {m1}'s motion toward the {s1} affect the {s1}'s motion?"),
            true,
        )
        .yes_no(
            QuestionType::CausalityIdentification,
            format!("Does the {s2}'s motion toward the {s1} affect the {s1}'s motion?"),
            true,
        )
        .attribution(
            format!("Why did the {s1} move?"),
            vec![
                format!("Because the {m1} moved toward the {s1}."),
                format!("Because the {s2} moved toward the {s1}."),
                format!("Because the {s1} moved spontaneously."),
            ],
            &[0],
        )
        .yes_no(
            QuestionType::IndividualCausalEffect,
            format!("If we force the {m1} not to move toward the {s1}, will the {s2} cause the {s1} to move?"),
            true,
        )
        .yes_no(
            QuestionType::IndividualCausalEffect,
            format!("If we force the {s2} not to move toward the {s1}, will the {m1} cause the {s1} to move?"),
            true,
        );

    for mover in [&m1, &s2] {
        battery.yes_no(
            QuestionType::CounterfactualReasoning,
            format!("If the {mover} had not moved toward the {s1}, would the {s1} still have moved?"),
            true,
        );
    }
    for mover in [&m1, &s2] {
        battery.yes_no(
            QuestionType::SufficientCause,
            format!("Was the fact that the {mover} moved toward the {s1} sufficient for the {s1} to move?"),
            true,
        );
    }
    for mover in [&m1, &s2] {
        battery.yes_no(
            QuestionType::NecessaryCause,
            format!("Was the fact that the {mover} moved toward the {s1} necessary for the {s1} to move?"),
            false,
        );
    }

    battery.actual_cause(
        format!("What is the actual cause of the {s1} moving?"),
        vec![
            format!("The {m1} moves toward the {s1}."),
            format!("The {s2} moves toward the {s1}."),
            "None.".to_string(),
        ],
        [
            (CausalSemantics::HP, &[0]),
            (CausalSemantics::BV, &[2]),
            (CausalSemantics::DBV, &[0]),
            (CausalSemantics::Boc, &[0]),
        ],
    );

    for (mover, answer) in [(&m1, true), (&s2, false)] {
        battery.yes_no(
            QuestionType::Responsibility,
            format!("Was the fact that the {mover} moved toward the {s1} responsible for the {s1} moving?"),
            answer,
        );
    }

    battery.finish()
}

pub fn encode(scene: &SceneRecord, analysis: &AnalysisRecord, setting: Setting) -> CausalModel {
    let Some([m1, s1, s2]) = describe(scene, analysis, [Role::M1, Role::S1, Role::S2]) else {
        return CausalModel::unresolved();
    };
    if !analysis.is_resolved() {
        return CausalModel::unresolved();
    }

    let graph = CausalGraph::new()
        .variable("X1", format!("The {m1}'s motion toward the {s1}"))
        .variable("X2", format!("The {s2}'s motion toward the {s1}"))
        .variable("Y", format!("The {s1}'s motion"))
        .edge("X1", "X2")
        .edge("X1", "Y")
        .edge("X2", "Y");

    let twin = TwinNetwork::new(WorldAssignment::of(&[("X1", "1"), ("X2", "0"), ("Y", "1")])).counterfactual(
        Intervention::of(&[("X1", "0")]),
        WorldAssignment::of(&[("X2", "1"), ("Y", "1")]),
    );

    CausalModel::new(graph, twin).with_distractors(setting, &distractor_descriptions(scene, analysis, setting))
}
