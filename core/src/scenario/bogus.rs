//! Bogus prevention
//!
//! M1 knocks S2 aside. M2 was rolling toward S2 on a line through S1 but
//! runs out of momentum, so the prevention was never needed and S1 stays
//! where it is.
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
use crate::kinematics::{distance, planar_cross, speed, sub, APPROACH_SPEED};
use crate::qa::{CausalSemantics, QaBattery, QaPair, QuestionType};
use crate::roles::{identify, Role};
use crate::scene::{collision_sequence, Collision, ObjectId, SceneRecord, Trajectory};
use crate::setting::Setting;

/// Planar cross product below which M2, S2 and S1 count as collinear
const COLLINEAR_CROSS: f64 = 0.5;

/// Closest approach to S2 beyond which M2 is judged to have fallen short
const SHORTFALL_DISTANCE: f64 = 0.5;

pub const TRIPLE: ScenarioTriple = ScenarioTriple {
    analyze,
    synthesize,
    encode,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BogusFlags {
    /// `[M2, S2, S1]` when the three start on a common line, else empty
    pub collinear_objects: Vec<ObjectId>,
    pub m2_insufficient_momentum: bool,
}

fn planar_norm(v: &[f64; 3]) -> f64 {
    v[0].hypot(v[1])
}

fn collinear_objects(trajectory: &Trajectory, m2: ObjectId, s1: ObjectId, s2: ObjectId) -> Vec<ObjectId> {
    let (Some(m2_state), Some(s1_state), Some(s2_state)) = (
        trajectory.state(0, m2),
        trajectory.state(0, s1),
        trajectory.state(0, s2),
    ) else {
        return Vec::new();
    };

    let approach = sub(&s2_state.location, &m2_state.location);
    let onward = sub(&s1_state.location, &s2_state.location);
    if planar_norm(&approach) > 0.0
        && planar_norm(&onward) > 0.0
        && planar_cross(&approach, &onward) < COLLINEAR_CROSS
    {
        vec![m2, s2, s1]
    } else {
        Vec::new()
    }
}

/// M2 never gets close to S2 and has all but stopped by its last frame
fn insufficient_momentum(trajectory: &Trajectory, m2: ObjectId, s2: ObjectId) -> bool {
    let mut closest = f64::INFINITY;
    let mut final_speed = None;
    for frame in trajectory.frames() {
        if let (Some(mover), Some(target)) = (frame.object(m2), frame.object(s2)) {
            closest = closest.min(distance(&mover.location, &target.location));
            final_speed = Some(speed(&mover.velocity));
        }
    }
    final_speed.is_some_and(|v| closest > SHORTFALL_DISTANCE && v < APPROACH_SPEED)
}

pub fn analyze(trajectory: &Trajectory, collisions: &[Collision], setting: Setting) -> AnalysisRecord {
    let scenario = ScenarioKind::Bogus;
    let skeleton = identify(trajectory, setting, scenario);
    let mut roles = assignment_from(scenario, &skeleton);

    if setting.is_basic() {
        let statics = &skeleton.static_objects;
        let movers = &skeleton.moving_objects;
        if statics.len() >= 2 && movers.len() >= 2 {
            // The earliest contact is M1 knocking S2 aside
            let sequence = collision_sequence(collisions);
            let knock = sequence.first();
            let s2 = knock.and_then(|c| c.object_ids.iter().copied().find(|id| statics.contains(id)));
            let m1 = knock.and_then(|c| c.object_ids.iter().copied().find(|id| movers.contains(id)));

            roles.bind_opt(Role::S2, s2);
            roles.bind_opt(Role::M1, m1);
            roles.bind_opt(Role::S1, statics.iter().copied().find(|&id| Some(id) != s2));
            roles.bind_opt(Role::M2, movers.iter().copied().find(|&id| Some(id) != m1));
        }
    } else {
        bind_in_order(&mut roles, &skeleton, &[Role::S1, Role::S2], &[Role::M1, Role::M2]);
    }

    let mut flags = BogusFlags::default();
    if let (Some(m2), Some(s1), Some(s2)) = (roles.get(Role::M2), roles.get(Role::S1), roles.get(Role::S2)) {
        flags.collinear_objects = collinear_objects(trajectory, m2, s1, s2);
        flags.m2_insufficient_momentum = insufficient_momentum(trajectory, m2, s2);
    }

    let events = EventExtractor::new(trajectory)
        .approach(roles.get(Role::M1), roles.get(Role::S2))
        .approach(roles.get(Role::M2), roles.get(Role::S2))
        .stall(roles.get(Role::M2), roles.get(Role::S2))
        .onset(roles.get(Role::S2))
        .extract(collisions);

    AnalysisRecord {
        scenario,
        setting,
        roles,
        flags: ScenarioFlags::Bogus(flags),
        events,
    }
}

pub fn synthesize(
    scene: &SceneRecord,
    analysis: &AnalysisRecord,
    setting: Setting,
    rng: &mut dyn RngCore,
) -> Vec<QaPair> {
    let Some([m1, m2, s1, s2]) = describe(scene, analysis, [Role::M1, Role::M2, Role::S1, Role::S2]) else {
        return Vec::new();
    };

    let knocked = format!("the {m1} collided with the {s2}");
    let missed = format!("the {m2} did not collide with the {s2}");
    let held = format!("the {s2} did not move toward the {s1}");
    let both_forced = format!("If we force the {m1} not to collide with the {s2} and force the {m2} to collide with the {s2}");

    let mut battery = QaBattery::new(distractor_descriptions(scene, analysis, setting), rng);

    battery
        .yes_no(
            QuestionType::CausalityIdentification,
            format!("Does the {m1}'s collision with the {s2} affect the {s1}'s motion?"),
            true,
        )
        .yes_no(
            QuestionType::CausalityIdentification,
            format!("Does the {m2}'s collision with the {s2} affect the {s1}'s motion?"),
            true,
        )
        .yes_no(
            QuestionType::CausalityIdentification,
            format!("Does the {s2}'s motion toward the {s1} affect the {s1}'s motion?"),
            true,
        )
        .attribution(
            format!("Why did the {s1} stay stationary?"),
            vec![
                format!("Because {knocked}."),
                format!("Because {missed}."),
                format!("Because {held}."),
                format!("Because the {s1} moved spontaneously."),
            ],
            &[1],
        )
        .yes_no(
            QuestionType::IndividualCausalEffect,
            format!("{both_forced}, will the {s2} cause the {s1} to move?"),
            true,
        )
        .yes_no(
            QuestionType::IndividualCausalEffect,
            format!("{both_forced}, will the {m1} cause the {s1} to move?"),
            false,
        )
        .yes_no(
            QuestionType::IndividualCausalEffect,
            format!("If we force the {m2} to collide with the {s2}, will the {s2} cause the {s1} to move?"),
            false,
        )
        .yes_no(
            QuestionType::CounterfactualReasoning,
            format!(
                "If the {m1} had not collided with the {s2} and the {m2} had collided with the {s2}, would the {s1} still have stayed stationary?"
            ),
            false,
        )
        .yes_no(
            QuestionType::CounterfactualReasoning,
            format!("If the {m2} had collided with the {s2}, would the {s1} still have stayed stationary?"),
            true,
        );

    for fact in [&knocked, &missed, &held] {
        battery.yes_no(
            QuestionType::SufficientCause,
            format!("Was the fact that {fact} sufficient for the {s1} to stay stationary?"),
            true,
        );
    }
    for fact in [&knocked, &missed, &held] {
        battery.yes_no(
            QuestionType::NecessaryCause,
            format!("Was the fact that {fact} necessary for the {s1} to stay stationary?"),
            false,
        );
    }

    battery.actual_cause(
        format!("What is the actual cause of the {s1} staying stationary?"),
        vec![
            format!("The {m1} collides with the {s2}."),
            format!("The {m2} does not collide with the {s2}."),
            format!("The {m1} collides with the {s2} and the {m2} does not collide with the {s2}."),
            format!("The {s2} does not move toward the {s1}."),
            "None.".to_string(),
        ],
        [
            (CausalSemantics::HP, &[2, 3]),
            (CausalSemantics::BV, &[1, 3]),
            (CausalSemantics::DBV, &[1, 3]),
            (CausalSemantics::Boc, &[0, 1, 3]),
        ],
    );

    for (fact, answer) in [(&knocked, false), (&missed, true), (&held, false)] {
        battery.yes_no(
            QuestionType::Responsibility,
            format!("Was the fact that {fact} responsible for the {s1} staying stationary?"),
            answer,
        );
    }

    battery.finish()
}

pub fn encode(scene: &SceneRecord, analysis: &AnalysisRecord, setting: Setting) -> CausalModel {
    let Some([m1, m2, s1, s2]) = describe(scene, analysis, [Role::M1, Role::M2, Role::S1, Role::S2]) else {
        return CausalModel::unresolved();
    };

    let graph = CausalGraph::new()
        .variable("X1", format!("The {m1}'s collision with the {s2}"))
        .variable("X2", format!("The {m2}'s collision with the {s2}"))
        .variable("Z", format!("The {s2}'s motion toward the {s1}"))
        .variable("W", format!("The {s2} reaches the {s1}"))
        .variable("Y", format!("The {s1}'s motion"))
        .edge("X1", "Z")
        .edge("X2", "Z")
        .edge("Z", "Y")
        .edge("W", "Y");

    // Y=W: the outcome follows whether S2 actually reaches S1
    let twin = TwinNetwork::new(WorldAssignment::of(&[
        ("X1", "1"),
        ("X2", "0"),
        ("Z", "0"),
        ("W", "0"),
        ("Y", "0"),
    ]))
    .counterfactual(
        Intervention::of(&[("X1", "0"), ("X2", "1")]),
        WorldAssignment::of(&[("Z", "1"), ("W", "?"), ("Y", "W")]),
    )
    .counterfactual(
        Intervention::of(&[("X1", "1"), ("X2", "1")]),
        WorldAssignment::of(&[("Z", "0"), ("W", "0"), ("Y", "0")]),
    );

    CausalModel::new(graph, twin).with_distractors(setting, &distractor_descriptions(scene, analysis, setting))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::SceneBuilder;
    use crate::qa::Answer;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    /// M1 (2) knocks S2 (1) sideways at frame 8; M2 (3) rolls along the
    /// line through S2 and S1 (0) but stops at frame 6
    fn bogus_scene() -> SceneBuilder {
        SceneBuilder::new(16)
            .stationary(0, [4.0, 0.0, 0.0])
            .object(1, |t| {
                if t < 8 {
                    ([2.0, 0.0, 0.0], [0.0; 3])
                } else {
                    ([2.0, 0.5 * (t - 8) as f64, 0.0], [0.0, 0.5, 0.0])
                }
            })
            .object(2, |t| {
                let t = t.min(8) as f64;
                let v = if t < 8.0 { 0.5 } else { 0.0 };
                ([2.0, -4.0 + 0.5 * t, 0.0], [0.0, v, 0.0])
            })
            .object(3, |t| {
                let t = t.min(6) as f64;
                let v = if t < 6.0 { 0.4 } else { 0.0 };
                ([-3.0 + 0.4 * t, 0.0, 0.0], [v, 0.0, 0.0])
            })
            .collision(8, 2, 1)
    }

    #[test]
    fn test_roles_and_flags() {
        let scene = bogus_scene().build();
        let analysis = analyze(&scene.motion_trajectory, &scene.collision, Setting::Basic);

        assert_eq!(analysis.role(Role::S1), Some(0));
        assert_eq!(analysis.role(Role::S2), Some(1));
        assert_eq!(analysis.role(Role::M1), Some(2));
        assert_eq!(analysis.role(Role::M2), Some(3));
        assert_eq!(
            analysis.flags,
            ScenarioFlags::Bogus(BogusFlags {
                collinear_objects: vec![3, 1, 0],
                m2_insufficient_momentum: true,
            })
        );

        let stall = analysis.events.first_of("insufficient_momentum").unwrap();
        assert_eq!(stall.frame, 6);
        assert_eq!(analysis.events.count_of("insufficient_momentum"), 1);
        assert_eq!(analysis.events.first_of("start_moving").map(|e| e.frame), Some(8));
    }

    #[test]
    fn test_offset_mover_is_not_collinear() {
        let scene = SceneBuilder::new(16)
            .stationary(0, [4.0, 0.0, 0.0])
            .stationary(1, [2.0, 0.0, 0.0])
            .moving(2, [2.0, -4.0, 0.0], [0.0, 0.5, 0.0])
            .moving(3, [-3.0, 3.0, 0.0], [0.3, 0.0, 0.0])
            .collision(8, 2, 1)
            .build();
        let analysis = analyze(&scene.motion_trajectory, &scene.collision, Setting::Basic);
        let ScenarioFlags::Bogus(flags) = &analysis.flags else {
            panic!("bogus analysis carries bogus flags");
        };
        assert!(flags.collinear_objects.is_empty());
        assert!(!flags.m2_insufficient_momentum);
    }

    #[test]
    fn test_battery() {
        let scene = bogus_scene().build();
        let analysis = analyze(&scene.motion_trajectory, &scene.collision, Setting::Basic);
        let mut rng = ChaCha20Rng::seed_from_u64(17);
        let pairs = synthesize(&scene, &analysis, Setting::Basic, &mut rng);

        assert_eq!(pairs.len(), 19);
        let Answer::Indices(indices) = &pairs[3].answer else {
            panic!("attribution answer must be an index list");
        };
        assert_eq!(
            pairs[3].selected(indices),
            vec!["Because the yellow rubber cube did not collide with the blue rubber sphere."]
        );

        let actual = &pairs[15];
        assert_eq!(actual.question_type, QuestionType::ActualCause);
        let Answer::BySemantics(key) = &actual.answer else {
            panic!("actual-cause answer must be keyed by semantics");
        };
        assert_eq!(key[&CausalSemantics::Boc].len(), 3);
        assert!(actual
            .selected(&key[&CausalSemantics::HP])
            .contains(&"The blue rubber sphere does not move toward the red metal cube."));
    }

    #[test]
    fn test_causal_model_with_two_static_distractors() {
        let scene = bogus_scene()
            .stationary(4, [8.0, 8.0, 0.0])
            .stationary(5, [-8.0, 8.0, 0.0])
            .build();
        let analysis = analyze(&scene.motion_trajectory, &scene.collision, Setting::AddTwoStatic);
        assert_eq!(analysis.roles.added_static, vec![4, 5]);

        let model = encode(&scene, &analysis, Setting::AddTwoStatic);
        assert!(model.validate().is_ok());
        let twin = model.twin_network.as_ref().unwrap();
        assert_eq!(twin.factual_world().to_string(), "X1=1, X2=0, Z=0, W=0, Y=0, S1=1, S2=1");
        assert_eq!(
            twin.world_under("do(X1=0, X2=1)").unwrap().to_string(),
            "Z=1, W=?, Y=W, S1=1, S2=1"
        );
    }
}
