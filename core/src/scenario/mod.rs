//! Scenario topologies and their dispatch table
//!
//! Each of the six causal topologies is a closed variant of `ScenarioKind`
//! carrying an analyzer, a QA synthesizer and a causal-model encoder. The
//! setting is threaded explicitly through all three calls.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod bogus;
pub mod double;
pub mod early;
pub mod late;
pub mod overdetermination;
pub mod switch;

use std::fmt;
use std::str::FromStr;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::causal::CausalModel;
use crate::error::SceneError;
use crate::events::EventLog;
use crate::qa::QaPair;
use crate::roles::{Role, RoleAssignment, RoleSkeleton};
use crate::scene::{Collision, ObjectId, SceneRecord, Trajectory};
use crate::setting::Setting;

pub use self::bogus::BogusFlags;
pub use self::double::DoubleFlags;
pub use self::early::{EarlyFlags, FinalState};
pub use self::late::LateFlags;
pub use self::overdetermination::OverdeterminationFlags;
pub use self::switch::SwitchFlags;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// Two independent movers both strike the target
    #[default]
    Overdetermination,
    /// A collision redirects the mover that ends up striking the target
    Switch,
    /// The first striker preempts a second, slower one
    Late,
    /// A mover knocks a second target into the first, preempting a direct hit
    Early,
    /// A blocker is knocked aside, which lets the striker through
    Double,
    /// A collision that looks causal but the effect never occurs
    Bogus,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 6] = [
        ScenarioKind::Overdetermination,
        ScenarioKind::Switch,
        ScenarioKind::Late,
        ScenarioKind::Early,
        ScenarioKind::Double,
        ScenarioKind::Bogus,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ScenarioKind::Overdetermination => "overdetermination",
            ScenarioKind::Switch => "switch",
            ScenarioKind::Late => "late",
            ScenarioKind::Early => "early",
            ScenarioKind::Double => "double",
            ScenarioKind::Bogus => "bogus",
        }
    }

    /// Stationary objects that take primary roles
    pub fn primary_static(self) -> usize {
        match self {
            ScenarioKind::Early | ScenarioKind::Bogus => 2,
            _ => 1,
        }
    }

    /// Moving objects that take primary roles
    pub fn primary_moving(self) -> usize {
        match self {
            ScenarioKind::Double => 3,
            _ => 2,
        }
    }

    /// Every role the scenario declares
    pub fn roles(self) -> &'static [Role] {
        match self {
            ScenarioKind::Overdetermination | ScenarioKind::Switch | ScenarioKind::Late => {
                &[Role::M1, Role::M2, Role::S]
            }
            ScenarioKind::Early | ScenarioKind::Bogus => &[Role::M1, Role::M2, Role::S1, Role::S2],
            ScenarioKind::Double => &[Role::M1, Role::M2, Role::M3, Role::S],
        }
    }

    /// Roles that must be bound before any QA or causal model is produced
    pub fn required_roles(self) -> &'static [Role] {
        match self {
            ScenarioKind::Late => &[Role::M1, Role::S],
            other => other.roles(),
        }
    }

    pub fn triple(self) -> ScenarioTriple {
        match self {
            ScenarioKind::Overdetermination => overdetermination::TRIPLE,
            ScenarioKind::Switch => switch::TRIPLE,
            ScenarioKind::Late => late::TRIPLE,
            ScenarioKind::Early => early::TRIPLE,
            ScenarioKind::Double => double::TRIPLE,
            ScenarioKind::Bogus => bogus::TRIPLE,
        }
    }

    pub fn analyze(self, trajectory: &Trajectory, collisions: &[Collision], setting: Setting) -> AnalysisRecord {
        (self.triple().analyze)(trajectory, collisions, setting)
    }

    pub fn synthesize(
        self,
        scene: &SceneRecord,
        analysis: &AnalysisRecord,
        setting: Setting,
        rng: &mut dyn RngCore,
    ) -> Vec<QaPair> {
        (self.triple().synthesize)(scene, analysis, setting, rng)
    }

    pub fn encode(self, scene: &SceneRecord, analysis: &AnalysisRecord, setting: Setting) -> CausalModel {
        (self.triple().encode)(scene, analysis, setting)
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioKind {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScenarioKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| SceneError::UnknownScenario(s.to_string()))
    }
}

pub type Analyzer = fn(&Trajectory, &[Collision], Setting) -> AnalysisRecord;
pub type Synthesizer = fn(&SceneRecord, &AnalysisRecord, Setting, &mut dyn RngCore) -> Vec<QaPair>;
pub type Encoder = fn(&SceneRecord, &AnalysisRecord, Setting) -> CausalModel;

/// Analyzer, synthesizer and encoder of one topology
#[derive(Clone, Copy)]
pub struct ScenarioTriple {
    pub analyze: Analyzer,
    pub synthesize: Synthesizer,
    pub encode: Encoder,
}

/// Topology-specific diagnostic flags
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScenarioFlags {
    Overdetermination(OverdeterminationFlags),
    Switch(SwitchFlags),
    Late(LateFlags),
    Early(EarlyFlags),
    Double(DoubleFlags),
    Bogus(BogusFlags),
}

/// Outcome of analysing one scene under one setting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRecord {
    pub scenario: ScenarioKind,
    pub setting: Setting,
    #[serde(flatten)]
    pub roles: RoleAssignment,
    #[serde(flatten)]
    pub flags: ScenarioFlags,
    pub events: EventLog,
}

impl AnalysisRecord {
    /// Ids of the required roles, or `None` while any is unresolved
    pub fn required_ids(&self) -> Option<Vec<ObjectId>> {
        self.roles.require(self.scenario.required_roles())
    }

    pub fn is_resolved(&self) -> bool {
        self.required_ids().is_some()
    }

    pub fn role(&self, role: Role) -> Option<ObjectId> {
        self.roles.get(role)
    }
}

/// Assignment with distractors taken over from the identifier
pub(crate) fn assignment_from(scenario: ScenarioKind, skeleton: &RoleSkeleton) -> RoleAssignment {
    let mut roles = RoleAssignment::declare(scenario.roles());
    roles.added_static = skeleton.added_static.clone();
    roles.added_moving = skeleton.added_moving.clone();
    roles
}

/// Bind statics then movers from the identifier lists, in order
pub(crate) fn bind_in_order(
    roles: &mut RoleAssignment,
    skeleton: &RoleSkeleton,
    statics: &[Role],
    movers: &[Role],
) {
    if skeleton.static_objects.len() >= statics.len() {
        for (&role, &id) in statics.iter().zip(&skeleton.static_objects) {
            roles.bind(role, id);
        }
    }
    if skeleton.moving_objects.len() >= movers.len() {
        for (&role, &id) in movers.iter().zip(&skeleton.moving_objects) {
            roles.bind(role, id);
        }
    }
}

/// Text descriptions of `roles`, or `None` if any role is unresolved
pub(crate) fn describe<const N: usize>(
    scene: &SceneRecord,
    analysis: &AnalysisRecord,
    roles: [Role; N],
) -> Option<[String; N]> {
    let mut descriptions: [String; N] = std::array::from_fn(|_| String::new());
    for (slot, role) in descriptions.iter_mut().zip(roles) {
        *slot = scene.describe(analysis.role(role)?);
    }
    Some(descriptions)
}

/// Descriptions of the setting's distractors, empty unless all were found
pub(crate) fn distractor_descriptions(
    scene: &SceneRecord,
    analysis: &AnalysisRecord,
    setting: Setting,
) -> Vec<String> {
    let ids = analysis.roles.distractors(setting);
    if ids.len() != setting.distractor_count() {
        return Vec::new();
    }
    ids.iter().map(|&id| scene.describe(id)).collect()
}
