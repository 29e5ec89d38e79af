//! Role identification
//!
//! Binds scenario-specific causal roles (movers `M*`, stationary targets
//! `S*`) to anonymous simulator ids. The identifier only partitions frame
//! zero into stationary and moving objects and slices off distractors for
//! the requested setting; each scenario analyzer specialises the skeleton
//! into named roles.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::BTreeMap;
use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::kinematics::is_stationary;
use crate::scenario::ScenarioKind;
use crate::scene::{ObjectId, Trajectory};
use crate::setting::{DistractorKind, Setting};

/// Scenario-specific causal role label
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    M1,
    M2,
    M3,
    S,
    S1,
    S2,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::M1 => "M1",
            Role::M2 => "M2",
            Role::M3 => "M3",
            Role::S => "S",
            Role::S1 => "S1",
            Role::S2 => "S2",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Frame-zero partition of a scene, optionally sliced for a setting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSkeleton {
    /// Stationary objects eligible for primary roles
    pub static_objects: Vec<ObjectId>,

    /// Moving objects eligible for primary roles
    pub moving_objects: Vec<ObjectId>,

    /// Stationary distractors
    pub added_static: Vec<ObjectId>,

    /// Moving distractors
    pub added_moving: Vec<ObjectId>,
}

/// Named roles plus distractor lists for one (scene, setting) pair
///
/// A role declared by the scenario but never bound stays `None` and
/// serialises as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    #[serde(flatten)]
    roles: BTreeMap<Role, Option<ObjectId>>,
    pub added_static: Vec<ObjectId>,
    pub added_moving: Vec<ObjectId>,
}

impl RoleAssignment {
    /// Assignment with every role in `declared` unresolved
    pub fn declare(declared: &[Role]) -> Self {
        Self {
            roles: declared.iter().map(|&role| (role, None)).collect(),
            added_static: Vec::new(),
            added_moving: Vec::new(),
        }
    }

    pub fn bind(&mut self, role: Role, id: ObjectId) {
        self.roles.insert(role, Some(id));
    }

    /// Bind `role` when `id` is known, leaving it unresolved otherwise
    pub fn bind_opt(&mut self, role: Role, id: Option<ObjectId>) {
        self.roles.insert(role, id);
    }

    pub fn get(&self, role: Role) -> Option<ObjectId> {
        self.roles.get(&role).copied().flatten()
    }

    pub fn is_bound(&self, role: Role) -> bool {
        self.get(role).is_some()
    }

    /// Ids for `roles` in order, or `None` if any is unresolved
    pub fn require(&self, roles: &[Role]) -> Option<Vec<ObjectId>> {
        roles.iter().map(|&role| self.get(role)).collect()
    }

    /// Distractor ids contributed by the given setting
    pub fn distractors(&self, setting: Setting) -> &[ObjectId] {
        match setting.distractor_kind() {
            None => &[],
            Some(DistractorKind::Static) => &self.added_static,
            Some(DistractorKind::Moving) => &self.added_moving,
        }
    }

    /// Bound primary role ids
    pub fn bound_ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.roles.values().filter_map(|id| *id)
    }
}

/// Split frame zero into stationary and moving ids, preserving frame order
pub fn partition_first_frame(trajectory: &Trajectory) -> (Vec<ObjectId>, Vec<ObjectId>) {
    let mut static_objects = Vec::new();
    let mut moving_objects = Vec::new();

    if let Some(frame) = trajectory.first() {
        for state in &frame.objects {
            if is_stationary(&state.velocity) {
                static_objects.push(state.object_id);
            } else {
                moving_objects.push(state.object_id);
            }
        }
    }

    (static_objects, moving_objects)
}

/// Object counts a setting needs before distractors can be sliced off
fn required_counts(setting: Setting, primary_static: usize, primary_moving: usize) -> (usize, usize) {
    match setting {
        Setting::Basic => (0, 0),
        Setting::AddOneStatic => (primary_static + 1, 2),
        Setting::AddTwoStatic => (primary_static + 2, 2),
        Setting::AddOneMoving => (1, primary_moving + 1),
        Setting::AddTwoMoving => (1, primary_moving + 2),
    }
}

/// Partition frame zero and slice distractors for `setting`
///
/// With too few objects for the setting the lists are returned unsliced and
/// no distractors are identified; callers treat that as a basic scene.
pub fn identify(trajectory: &Trajectory, setting: Setting, scenario: ScenarioKind) -> RoleSkeleton {
    let (static_objects, moving_objects) = partition_first_frame(trajectory);
    let mut skeleton = RoleSkeleton {
        static_objects,
        moving_objects,
        ..RoleSkeleton::default()
    };

    let Some(kind) = setting.distractor_kind() else {
        return skeleton;
    };

    let primary_static = scenario.primary_static();
    let primary_moving = scenario.primary_moving();
    let (need_static, need_moving) = required_counts(setting, primary_static, primary_moving);

    if skeleton.static_objects.len() < need_static || skeleton.moving_objects.len() < need_moving {
        debug!(
            "{} scene has {} static / {} moving objects, too few for {}",
            scenario,
            skeleton.static_objects.len(),
            skeleton.moving_objects.len(),
            setting
        );
        return skeleton;
    }

    let count = setting.distractor_count();
    match kind {
        DistractorKind::Static => {
            skeleton.added_static =
                skeleton.static_objects[primary_static..primary_static + count].to_vec();
            skeleton.static_objects.truncate(primary_static);
        }
        DistractorKind::Moving => {
            skeleton.added_moving =
                skeleton.moving_objects[primary_moving..primary_moving + count].to_vec();
            skeleton.moving_objects.truncate(primary_moving);
        }
    }

    skeleton
}
