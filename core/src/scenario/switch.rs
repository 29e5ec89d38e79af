//! Switch
//!
//! M1 heads for the stationary target S; M2 collides with M1 on the way,
//! which changes the route by which M1 reaches S without changing the
//! outcome.
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
use crate::qa::{CausalSemantics, QaBattery, QaPair, QuestionType};
use crate::roles::{identify, Role};
use crate::scene::{collision_sequence, Collision, SceneRecord, Trajectory};
use crate::setting::Setting;

pub const TRIPLE: ScenarioTriple = ScenarioTriple {
    analyze,
    synthesize,
    encode,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SwitchFlags {
    pub collision_sequence: Vec<Collision>,
}

pub fn analyze(trajectory: &Trajectory, collisions: &[Collision], setting: Setting) -> AnalysisRecord {
    let scenario = ScenarioKind::Switch;
    let skeleton = identify(trajectory, setting, scenario);
    let mut roles = assignment_from(scenario, &skeleton);
    let sequence = collision_sequence(collisions);

    if setting.is_basic() {
        if let Some(&s) = skeleton.static_objects.first() {
            roles.bind(Role::S, s);

            // First collision: M2 hits M1. Second collision: M1 hits S.
            if let [first, second, ..] = sequence.as_slice() {
                let m1 = second.partner_of(s);
                roles.bind_opt(Role::M1, m1);
                roles.bind_opt(
                    Role::M2,
                    first.object_ids.iter().copied().find(|&id| Some(id) != m1),
                );
            }
        }
    } else {
        bind_in_order(&mut roles, &skeleton, &[Role::S], &[Role::M1, Role::M2]);
    }

    let events = EventExtractor::new(trajectory)
        .approach(roles.get(Role::M1), roles.get(Role::S))
        .approach(roles.get(Role::M2), roles.get(Role::M1))
        .acceleration(roles.get(Role::M1))
        .onset(roles.get(Role::S))
        .extract(collisions);

    AnalysisRecord {
        scenario,
        setting,
        roles,
        flags: ScenarioFlags::Switch(SwitchFlags {
            collision_sequence: sequence,
        }),
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

    let before = format!("the {m1} moved toward the {s} before its collision with the {m2}");
    let collided = format!("the {m2} collided with the {m1}");
    let after = format!("the {m1} moved toward the {s} after its collision with the {m2}");

    let mut battery = QaBattery::new(distractor_descriptions(scene, analysis, setting), rng);

    battery
        .yes_no(
            QuestionType::CausalityIdentification,
            format!("Does the {m1}'s motion toward the {s} before its collision with the {m2} affect the {s}'s motion?"),
            true,
        )
        .yes_no(
            QuestionType::CausalityIdentification,
            format!("Does the {m2}'s collision with the {m1} affect the {s}'s motion?"),
            false,
        )
        .yes_no(
            QuestionType::CausalityIdentification,
            format!("Does the {m1}'s motion toward the {s} after its collision with the {m2} affect the {s}'s motion?"),
            true,
        )
        .attribution(
            format!("Why did the {s} move?"),
            vec![
                format!("Because {before}."),
                format!("Because {collided}."),
                format!("Because {after}."),
                format!("Because the {s} moved spontaneously."),
            ],
            &[2],
        )
        .yes_no(
            QuestionType::IndividualCausalEffect,
            format!(
                "If we force the {m1} not to move toward the {s} after its collision with the {m2}, will the {m1} cause the {s} to move?"
            ),
            false,
        )
        .yes_no(
            QuestionType::IndividualCausalEffect,
            format!("If we force the {m2} not to collide with the {m1}, will the {m1} cause the {s} to move?"),
            true,
        )
        .yes_no(
            QuestionType::CounterfactualReasoning,
            format!(
                "If the {m1} had not moved toward the {s} after its collision with the {m2}, would the {s} still have moved?"
            ),
            false,
        )
        .yes_no(
            QuestionType::CounterfactualReasoning,
            format!("If the {m2} had not collided with the {m1}, would the {s} still have moved?"),
            true,
        );

    for (fact, answer) in [(&before, true), (&collided, false), (&after, true)] {
        battery.yes_no(
            QuestionType::SufficientCause,
            format!("Was the fact that {fact} sufficient for the {s} to move?"),
            answer,
        );
    }
    for (fact, answer) in [(&before, false), (&collided, false), (&after, true)] {
        battery.yes_no(
            QuestionType::NecessaryCause,
            format!("Was the fact that {fact} necessary for the {s} to move?"),
            answer,
        );
    }

    battery.actual_cause(
        format!("What is the actual cause of the {s} moving?"),
        vec![
            format!("The {m1} moves toward the {s} before its collision with the {m2}."),
            format!("The {m2} collides with the {m1}."),
            format!("The {m1} moves toward the {s} after its collision with the {m2}."),
            "None.".to_string(),
        ],
        [
            (CausalSemantics::HP, &[1, 2]),
            (CausalSemantics::BV, &[2]),
            (CausalSemantics::DBV, &[2]),
            (CausalSemantics::Boc, &[1, 2]),
        ],
    );

    for (fact, answer) in [(&before, false), (&collided, false), (&after, true)] {
        battery.yes_no(
            QuestionType::Responsibility,
            format!("Was the fact that {fact} responsible for the {s} moving?"),
            answer,
        );
    }

    battery.finish()
}

pub fn encode(scene: &SceneRecord, analysis: &AnalysisRecord, setting: Setting) -> CausalModel {
    let Some([m1, m2, s]) = describe(scene, analysis, [Role::M1, Role::M2, Role::S]) else {
        return CausalModel::unresolved();
    };

    let graph = CausalGraph::new()
        .variable("Z", format!("The {m2}'s collision with the {m1}"))
        .variable("X1", format!("The {m1}'s motion toward the {s} with colliding with the {m2}"))
        .variable("X2", format!("The {m1}'s motion toward the {s} without colliding with the {m2}"))
        .variable("Y", format!("The {s}'s motion"))
        .edge("Z", "X1")
        .edge("Z", "X2")
        .edge("X1", "Y")
        .edge("X2", "Y");

    let twin = TwinNetwork::new(WorldAssignment::of(&[("Z", "1"), ("X1", "1"), ("X2", "0"), ("Y", "1")]))
        .counterfactual(
            Intervention::of(&[("Z", "0")]),
            WorldAssignment::of(&[("X1", "0"), ("X2", "1"), ("Y", "1")]),
        );

    CausalModel::new(graph, twin).with_distractors(setting, &distractor_descriptions(scene, analysis, setting))
}
