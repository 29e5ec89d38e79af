//! Kinematic event extraction
//!
//! Scans a trajectory frame by frame and records the causally relevant
//! events of a scenario: approaches between declared subject/target pairs,
//! motion onsets, sudden accelerations, trajectory deviations and stalls.
//! Simulator collisions are merged in afterwards and the log is kept in
//! non-decreasing frame order.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use serde::{Deserialize, Serialize};

use crate::kinematics::{
    angle_from_cosine, direction_cosine, distance, moving_towards, speed, APPROACH_SPEED,
    DEVIATION_COSINE, SPEED_JUMP_RATIO, STATIONARY_SPEED,
};
use crate::scene::{Collision, ObjectId, Trajectory, Vec3};

/// Speed below which a mover is considered to have stalled
pub const STALL_SPEED: f64 = 0.05;

/// Remaining gap beyond which a stalled mover has not reached its target
pub const STALL_DISTANCE: f64 = 0.3;

/// Event payload, tagged by `type` in serialised form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    MovingTowards {
        subject: ObjectId,
        target: ObjectId,
    },
    InsufficientMomentum {
        subject: ObjectId,
        target: ObjectId,
        distance_remaining: f64,
    },
    StartMoving {
        subject: ObjectId,
    },
    TrajectoryDeviation {
        subject: ObjectId,
        direction_change: f64,
    },
    SpeedIncrease {
        subject: ObjectId,
        speed_change: f64,
    },
    Collision {
        subjects: Vec<ObjectId>,
        location: Vec3,
    },
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::MovingTowards { .. } => "moving_towards",
            EventKind::InsufficientMomentum { .. } => "insufficient_momentum",
            EventKind::StartMoving { .. } => "start_moving",
            EventKind::TrajectoryDeviation { .. } => "trajectory_deviation",
            EventKind::SpeedIncrease { .. } => "speed_increase",
            EventKind::Collision { .. } => "collision",
        }
    }

    /// Primary subject; collisions report their first participant
    pub fn subject(&self) -> Option<ObjectId> {
        match self {
            EventKind::MovingTowards { subject, .. }
            | EventKind::InsufficientMomentum { subject, .. }
            | EventKind::StartMoving { subject }
            | EventKind::TrajectoryDeviation { subject, .. }
            | EventKind::SpeedIncrease { subject, .. } => Some(*subject),
            EventKind::Collision { subjects, .. } => subjects.first().copied(),
        }
    }
}

/// One detected event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub frame: usize,
    #[serde(flatten)]
    pub kind: EventKind,
    pub description: String,
}

impl Event {
    fn approach(frame: usize, subject: ObjectId, target: ObjectId) -> Self {
        Self {
            frame,
            kind: EventKind::MovingTowards { subject, target },
            description: format!("Object {} is moving towards object {}", subject, target),
        }
    }

    fn onset(frame: usize, subject: ObjectId) -> Self {
        Self {
            frame,
            kind: EventKind::StartMoving { subject },
            description: format!("Object {} starts moving", subject),
        }
    }

    fn collision(collision: &Collision) -> Self {
        Self {
            frame: collision.frame_id,
            kind: EventKind::Collision {
                subjects: collision.object_ids.clone(),
                location: collision.location,
            },
            description: format!("Collision between objects {:?}", collision.object_ids),
        }
    }
}

/// Ordered, append-only event sequence for one analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// First event with the given type name
    pub fn first_of(&self, name: &str) -> Option<&Event> {
        self.events.iter().find(|event| event.kind.name() == name)
    }

    pub fn count_of(&self, name: &str) -> usize {
        self.events.iter().filter(|event| event.kind.name() == name).count()
    }

    /// True if frames never decrease along the log
    pub fn is_frame_ordered(&self) -> bool {
        self.events.windows(2).all(|pair| pair[0].frame <= pair[1].frame)
    }
}

#[derive(Debug, Clone, Copy)]
struct Approach {
    subject: ObjectId,
    target: ObjectId,
    until_deviation: bool,
}

/// Per-scenario event extraction plan
///
/// Roles are passed as `Option` so analyzers can hand over partially
/// resolved assignments; any check whose roles are missing is skipped.
#[derive(Debug)]
pub struct EventExtractor<'a> {
    trajectory: &'a Trajectory,
    approaches: Vec<Approach>,
    acceleration: Option<ObjectId>,
    deviation: Option<ObjectId>,
    stall: Option<(ObjectId, ObjectId)>,
    onsets: Vec<ObjectId>,
}

impl<'a> EventExtractor<'a> {
    pub fn new(trajectory: &'a Trajectory) -> Self {
        Self {
            trajectory,
            approaches: Vec::new(),
            acceleration: None,
            deviation: None,
            stall: None,
            onsets: Vec::new(),
        }
    }

    /// Report frames where `subject` moves towards `target`
    pub fn approach(mut self, subject: Option<ObjectId>, target: Option<ObjectId>) -> Self {
        if let (Some(subject), Some(target)) = (subject, target) {
            self.approaches.push(Approach {
                subject,
                target,
                until_deviation: false,
            });
        }
        self
    }

    /// Like `approach`, but stop reporting once the deviation latch fires
    pub fn approach_until_deviation(
        mut self,
        subject: Option<ObjectId>,
        target: Option<ObjectId>,
    ) -> Self {
        if let (Some(subject), Some(target)) = (subject, target) {
            self.approaches.push(Approach {
                subject,
                target,
                until_deviation: true,
            });
        }
        self
    }

    /// Latch the first sudden speed-up of `subject`
    pub fn acceleration(mut self, subject: Option<ObjectId>) -> Self {
        self.acceleration = subject;
        self
    }

    /// Latch the first sharp change of heading of `subject`
    pub fn deviation(mut self, subject: Option<ObjectId>) -> Self {
        self.deviation = subject;
        self
    }

    /// Latch the first frame where `subject` stalls short of `target`
    pub fn stall(mut self, subject: Option<ObjectId>, target: Option<ObjectId>) -> Self {
        self.stall = subject.zip(target);
        self
    }

    /// Report every transition of `subject` from rest to motion
    pub fn onset(mut self, subject: Option<ObjectId>) -> Self {
        if let Some(subject) = subject {
            self.onsets.push(subject);
        }
        self
    }

    /// Run the scan and merge `collisions` into the log
    pub fn extract(self, collisions: &[Collision]) -> EventLog {
        let mut events = Vec::new();
        let mut accelerated = false;
        let mut deviated = false;
        let mut stalled = false;

        for (i, frame) in self.trajectory.frames().iter().enumerate() {
            let previous = i.checked_sub(1).and_then(|p| self.trajectory.get(p));

            for approach in &self.approaches {
                if approach.until_deviation && deviated {
                    continue;
                }
                if let (Some(a), Some(b)) = (frame.object(approach.subject), frame.object(approach.target)) {
                    if moving_towards(&a.location, &a.velocity, &b.location, &b.velocity) {
                        events.push(Event::approach(i, approach.subject, approach.target));
                    }
                }
            }

            if let (Some(subject), Some(previous)) = (self.acceleration, previous) {
                if let (Some(now), Some(before)) = (frame.object(subject), previous.object(subject)) {
                    let current_speed = speed(&now.velocity);
                    let previous_speed = speed(&before.velocity);
                    if !accelerated && current_speed > previous_speed * SPEED_JUMP_RATIO {
                        accelerated = true;
                        events.push(Event {
                            frame: i,
                            kind: EventKind::SpeedIncrease {
                                subject,
                                speed_change: current_speed - previous_speed,
                            },
                            description: format!("Object {} speeds up after being hit", subject),
                        });
                    }
                }
            }

            if let (Some(subject), Some(previous)) = (self.deviation, previous) {
                if let (Some(now), Some(before)) = (frame.object(subject), previous.object(subject)) {
                    if let Some(cosine) = direction_cosine(&now.velocity, &before.velocity) {
                        if !deviated && cosine < DEVIATION_COSINE {
                            deviated = true;
                            events.push(Event {
                                frame: i,
                                kind: EventKind::TrajectoryDeviation {
                                    subject,
                                    direction_change: angle_from_cosine(cosine),
                                },
                                description: format!(
                                    "Object {} deviates from its original trajectory",
                                    subject
                                ),
                            });
                        }
                    }
                }
            }

            if let Some((subject, target)) = self.stall {
                if !stalled {
                    if let (Some(mover), Some(goal)) = (frame.object(subject), frame.object(target)) {
                        let gap = distance(&mover.location, &goal.location);
                        if speed(&mover.velocity) < STALL_SPEED && gap > STALL_DISTANCE {
                            stalled = true;
                            events.push(Event {
                                frame: i,
                                kind: EventKind::InsufficientMomentum {
                                    subject,
                                    target,
                                    distance_remaining: gap,
                                },
                                description: format!(
                                    "Object {} stops before reaching object {} due to insufficient momentum",
                                    subject, target
                                ),
                            });
                        }
                    }
                }
            }

            if let Some(previous) = previous {
                for &subject in &self.onsets {
                    if let (Some(now), Some(before)) = (frame.object(subject), previous.object(subject)) {
                        if speed(&now.velocity) > APPROACH_SPEED
                            && speed(&before.velocity) < STATIONARY_SPEED
                        {
                            events.push(Event::onset(i, subject));
                        }
                    }
                }
            }
        }

        events.extend(collisions.iter().map(Event::collision));
        events.sort_by_key(|event| event.frame);

        EventLog { events }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::SceneBuilder;

    #[test]
    fn test_approach_and_onset_events() {
        // Mover 1 reaches object 0 at frame 4 and transfers its motion
        let scene = SceneBuilder::new(8)
            .object(0, |t| {
                if t < 4 {
                    ([4.0, 0.0, 0.0], [0.0; 3])
                } else {
                    ([4.0 + (t - 4) as f64, 0.0, 0.0], [1.0, 0.0, 0.0])
                }
            })
            .object(1, |t| {
                if t < 4 {
                    ([t as f64, 0.0, 0.0], [1.0, 0.0, 0.0])
                } else {
                    ([4.0, 0.0, 0.0], [0.0; 3])
                }
            })
            .collision(4, 1, 0)
            .build();

        let log = EventExtractor::new(&scene.motion_trajectory)
            .approach(Some(1), Some(0))
            .onset(Some(0))
            .extract(&scene.collision);

        assert_eq!(log.count_of("moving_towards"), 4);
        let onset = log.first_of("start_moving").unwrap();
        assert_eq!(onset.frame, 4);
        assert_eq!(onset.description, "Object 0 starts moving");
        assert!(log.is_frame_ordered());

        // Collisions follow the kinematic events of their frame
        let frame_four: Vec<_> = log.iter().filter(|e| e.frame == 4).map(|e| e.kind.name()).collect();
        assert_eq!(frame_four, vec!["start_moving", "collision"]);
    }

    #[test]
    fn test_acceleration_latches_once() {
        let scene = SceneBuilder::new(6)
            .object(1, |t| {
                let v = match t {
                    0 | 1 => 0.2,
                    2 => 0.8,
                    _ => 2.0,
                };
                ([t as f64, 0.0, 0.0], [v, 0.0, 0.0])
            })
            .build();

        let log = EventExtractor::new(&scene.motion_trajectory)
            .acceleration(Some(1))
            .extract(&[]);

        assert_eq!(log.count_of("speed_increase"), 1);
        let event = log.first_of("speed_increase").unwrap();
        assert_eq!(event.frame, 2);
        match event.kind {
            EventKind::SpeedIncrease { speed_change, .. } => assert!((speed_change - 0.6).abs() < 1e-9),
            _ => panic!("unexpected event kind"),
        }
    }

    #[test]
    fn test_deviation_gates_approach() {
        // Object 2 heads for object 1 until it is knocked sideways at frame 3
        let scene = SceneBuilder::new(6)
            .stationary(1, [0.0, 5.0, 0.0])
            .object(2, |t| {
                if t < 3 {
                    ([0.0, t as f64 * 0.5, 0.0], [0.0, 0.5, 0.0])
                } else {
                    ([(t - 3) as f64 * 0.5, 1.5, 0.0], [0.5, 0.0, 0.0])
                }
            })
            .build();

        let log = EventExtractor::new(&scene.motion_trajectory)
            .approach_until_deviation(Some(2), Some(1))
            .deviation(Some(2))
            .extract(&[]);

        let deviation = log.first_of("trajectory_deviation").unwrap();
        assert_eq!(deviation.frame, 3);
        assert_eq!(log.count_of("moving_towards"), 3);
        assert!(log
            .iter()
            .filter(|e| e.kind.name() == "moving_towards")
            .all(|e| e.frame < 3));
    }

    #[test]
    fn test_stall_reports_remaining_distance() {
        let scene = SceneBuilder::new(8)
            .stationary(1, [2.0, 0.0, 0.0])
            .object(3, |t| {
                if t < 4 {
                    ([-3.0 + 0.4 * t as f64, 0.0, 0.0], [0.4, 0.0, 0.0])
                } else {
                    ([-1.4, 0.0, 0.0], [0.0; 3])
                }
            })
            .build();

        let log = EventExtractor::new(&scene.motion_trajectory)
            .stall(Some(3), Some(1))
            .extract(&[]);

        assert_eq!(log.count_of("insufficient_momentum"), 1);
        let event = log.first_of("insufficient_momentum").unwrap();
        assert_eq!(event.frame, 4);
        match event.kind {
            EventKind::InsufficientMomentum { distance_remaining, .. } => {
                assert!((distance_remaining - 3.4).abs() < 1e-9)
            }
            _ => panic!("unexpected event kind"),
        }
    }

    #[test]
    fn test_missing_roles_skip_checks() {
        let scene = SceneBuilder::new(4).stationary(0, [0.0; 3]).build();
        let log = EventExtractor::new(&scene.motion_trajectory)
            .approach(None, Some(0))
            .onset(None)
            .stall(Some(9), None)
            .extract(&[]);
        assert!(log.is_empty());
    }

    #[test]
    fn test_event_serialises_with_type_tag() {
        let event = Event::approach(3, 1, 0);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "moving_towards");
        assert_eq!(json["frame"], 3);
        assert_eq!(json["subject"], 1);
        assert_eq!(json["target"], 0);
    }
}
