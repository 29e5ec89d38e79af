//! Double prevention
//!
//! M2 is on course to intercept M1 before M1 reaches the stationary target
//! S. M3 knocks M2 aside, so M1 gets through and sets S moving.
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

/// Frames before the blocking collision searched for M2's approach
const APPROACH_LOOKBACK: usize = 5;

pub const TRIPLE: ScenarioTriple = ScenarioTriple {
    analyze,
    synthesize,
    encode,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DoubleFlags {
    pub collision_sequence: Vec<Collision>,
    pub trajectory_deviation: bool,
}

/// Did `subject` head for `target` in the frames just before `frame`?
fn approached_before(trajectory: &Trajectory, subject: ObjectId, target: ObjectId, frame: usize) -> bool {
    let start = frame - frame.min(APPROACH_LOOKBACK);
    (start..frame).any(|i| {
        match (trajectory.state(i, subject), trajectory.state(i, target)) {
            (Some(a), Some(b)) => moving_towards(&a.location, &a.velocity, &b.location, &b.velocity),
            _ => false,
        }
    })
}

/// Split the blocking collision into (M2, M3)
fn blocker_and_pusher(
    trajectory: &Trajectory,
    blocking: &Collision,
    m1: ObjectId,
    movers: &[ObjectId],
) -> Option<(ObjectId, ObjectId)> {
    let (a, b) = blocking.pair()?;
    let other = |id: ObjectId| if id == a { b } else { a };
    let in_play = |id: &ObjectId| *id != m1 && movers.contains(id);

    let approaching = [a, b]
        .into_iter()
        .filter(|id| in_play(id))
        .filter(|&id| approached_before(trajectory, id, m1, blocking.frame_id))
        .last();

    let m2 = match approaching {
        Some(id) => id,
        None if in_play(&a) => a,
        None => b,
    };
    Some((m2, other(m2)))
}

pub fn analyze(trajectory: &Trajectory, collisions: &[Collision], setting: Setting) -> AnalysisRecord {
    let scenario = ScenarioKind::Double;
    let skeleton = identify(trajectory, setting, scenario);
    let mut roles = assignment_from(scenario, &skeleton);
    let sequence = collision_sequence(collisions);

    if setting.is_basic() {
        if let (Some(&s), true) = (skeleton.static_objects.first(), skeleton.moving_objects.len() >= 3) {
            roles.bind(Role::S, s);

            // First collision: M3 knocks M2 aside. Second: M1 hits S.
            if let [blocking, strike, ..] = sequence.as_slice() {
                if let Some(m1) = strike.partner_of(s) {
                    roles.bind(Role::M1, m1);
                    if let Some((m2, m3)) = blocker_and_pusher(trajectory, blocking, m1, &skeleton.moving_objects) {
                        roles.bind(Role::M2, m2);
                        roles.bind(Role::M3, m3);
                    }
                }
            }
        }
    } else {
        bind_in_order(&mut roles, &skeleton, &[Role::S], &[Role::M1, Role::M2, Role::M3]);
    }

    let events = EventExtractor::new(trajectory)
        .approach(roles.get(Role::M1), roles.get(Role::S))
        .approach_until_deviation(roles.get(Role::M2), roles.get(Role::M1))
        .approach(roles.get(Role::M3), roles.get(Role::M2))
        .deviation(roles.get(Role::M2))
        .onset(roles.get(Role::S))
        .extract(collisions);

    let flags = DoubleFlags {
        collision_sequence: sequence,
        trajectory_deviation: events.first_of("trajectory_deviation").is_some(),
    };

    AnalysisRecord {
        scenario,
        setting,
        roles,
        flags: ScenarioFlags::Double(flags),
        events,
    }
}

pub fn synthesize(
    scene: &SceneRecord,
    analysis: &AnalysisRecord,
    setting: Setting,
    rng: &mut dyn RngCore,
) -> Vec<QaPair> {
    let Some([m1, m2, m3, s]) = describe(scene, analysis, [Role::M1, Role::M2, Role::M3, Role::S]) else {
        return Vec::new();
    };

    let strike = format!("the {m1} collided with the {s}");
    let missed = format!("the {m2} did not collide with the {m1}");
    let push = format!("the {m3} collided with the {m2}");

    let mut battery = QaBattery::new(distractor_descriptions(scene, analysis, setting), rng);

    battery
        .yes_no(
            QuestionType::CausalityIdentification,
            format!("Does the {m1}'s collision with the {s} affect the {s}'s motion?"),
            true,
        )
        .yes_no(
            QuestionType::CausalityIdentification,
            format!("Does the {m2}'s collision with the {m1} affect the {s}'s motion?"),
            true,
        )
        .yes_no(
            QuestionType::CausalityIdentification,
            format!("Does the {m3}'s collision with the {m2} affect the {s}'s motion?"),
            true,
        )
        .attribution(
            format!("Why did the {s} move?"),
            vec![
                format!("Because {strike}."),
                format!("Because {missed}."),
                format!("Because {push}."),
                format!("Because the {s} moved spontaneously."),
            ],
            &[0],
        )
        .yes_no(
            QuestionType::IndividualCausalEffect,
            format!("If we force the {m2} to collide with the {m1}, will the {m1} cause the {s} to move?"),
            false,
        )
        .yes_no(
            QuestionType::IndividualCausalEffect,
            format!("If we force the {m3} not to collide with the {m2}, will the {m1} cause the {s} to move?"),
            false,
        )
        .yes_no(
            QuestionType::IndividualCausalEffect,
            format!(
                "If we force the {m3} not to collide with the {m2}, will the {m2} cause the {s} to stay stationary?"
            ),
            true,
        )
        .yes_no(
            QuestionType::CounterfactualReasoning,
            format!("If the {m1} had not collided with the {s}, would the {s} still have moved?"),
            false,
        )
        .yes_no(
            QuestionType::CounterfactualReasoning,
            format!("If the {m2} had collided with the {m1}, would the {s} still have moved?"),
            false,
        )
        .yes_no(
            QuestionType::CounterfactualReasoning,
            format!("If the {m3} had not collided with the {m2}, would the {s} still have moved?"),
            false,
        );

    for (fact, answer) in [(&strike, true), (&missed, false), (&push, false)] {
        battery.yes_no(
            QuestionType::SufficientCause,
            format!("Was the fact that {fact} sufficient for the {s} to move?"),
            answer,
        );
    }
    for fact in [&strike, &missed, &push] {
        battery.yes_no(
            QuestionType::NecessaryCause,
            format!("Was the fact that {fact} necessary for the {s} to move?"),
            true,
        );
    }

    battery.actual_cause(
        format!("What is the actual cause of the {s} moving?"),
        vec![
            format!("The {m1} moves toward the {s}."),
            format!("The {m1} collides with the {s}."),
            format!("The {m2} moves toward the {m1}."),
            format!("The {m2} does not collide with the {m1}."),
            format!("The {m3} moves toward the {m2}."),
            format!("The {m3} collides with the {m2}."),
            "None.".to_string(),
        ],
        [
            (CausalSemantics::HP, &[0, 1, 3, 4, 5]),
            (CausalSemantics::BV, &[0, 1, 3, 4, 5]),
            (CausalSemantics::DBV, &[0, 1]),
            (CausalSemantics::Boc, &[0, 1, 3, 4, 5]),
        ],
    );

    for (fact, answer) in [(&strike, true), (&missed, false), (&push, false)] {
        battery.yes_no(
            QuestionType::Responsibility,
            format!("Was the fact that {fact} responsible for the {s} moving?"),
            answer,
        );
    }

    battery.finish()
}

pub fn encode(scene: &SceneRecord, analysis: &AnalysisRecord, setting: Setting) -> CausalModel {
    let Some([m1, m2, m3, s]) = describe(scene, analysis, [Role::M1, Role::M2, Role::M3, Role::S]) else {
        return CausalModel::unresolved();
    };

    let graph = CausalGraph::new()
        .variable("X1", format!("The {m1}'s collision with the {s}"))
        .variable("X2", format!("The {m2}'s collision with the {m1}"))
        .variable("X3", format!("The {m3}'s collision with the {m2}"))
        .variable("Z1", format!("The {m1}'s motion toward the {s}"))
        .variable("Z2", format!("The {m2}'s motion toward the {m1}"))
        .variable("Z3", format!("The {m3}'s motion toward the {m2}"))
        .variable("Y", format!("The {s}'s motion"))
        .edge("Z1", "X1")
        .edge("Z2", "X2")
        .edge("Z2", "X3")
        .edge("Z3", "X3")
        .edge("X1", "Y")
        .edge("X2", "X1")
        .edge("X3", "X2");

    // "?" marks a term the intervention leaves undetermined
    let twin = TwinNetwork::new(WorldAssignment::of(&[
        ("Z1", "1"),
        ("Z2", "1"),
        ("Z3", "1"),
        ("X1", "1"),
        ("X2", "0"),
        ("X3", "1"),
        ("Y", "1"),
    ]))
    .counterfactual(
        Intervention::of(&[("X1", "0")]),
        WorldAssignment::of(&[("Z1", "1"), ("Z2", "?"), ("Z3", "?"), ("X2", "?"), ("X3", "?"), ("Y", "0")]),
    )
    .counterfactual(
        Intervention::of(&[("X2", "1")]),
        WorldAssignment::of(&[("Z1", "1"), ("Z2", "1"), ("Z3", "?"), ("X1", "0"), ("X3", "?"), ("Y", "0")]),
    )
    .counterfactual(
        Intervention::of(&[("X3", "0")]),
        WorldAssignment::of(&[("Z1", "1"), ("Z2", "1"), ("Z3", "1"), ("X1", "0"), ("X2", "1"), ("Y", "0")]),
    );

    CausalModel::new(graph, twin).with_distractors(setting, &distractor_descriptions(scene, analysis, setting))
}
