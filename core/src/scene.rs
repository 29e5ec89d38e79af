//! Scene records produced by the physics simulation
//!
//! A scene is the unit of work for the pipeline: the static object property
//! table, the frame-indexed motion trajectory and the collision list. These
//! records are immutable once loaded; every analysis stage borrows them.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};

/// Simulator-assigned object identifier
pub type ObjectId = u32;

/// Cartesian triple (location, velocity, angular velocity)
pub type Vec3 = [f64; 3];

/// Static visual properties, referenced only when rendering text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectProperty {
    pub object_id: ObjectId,
    pub color: String,
    pub material: String,
    pub shape: String,
}

impl ObjectProperty {
    /// Human-readable "color material shape" phrase
    pub fn description(&self) -> String {
        format!("{} {} {}", self.color, self.material, self.shape)
    }
}

/// Kinematic state of one object in one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectState {
    pub object_id: ObjectId,
    pub location: Vec3,
    #[serde(default)]
    pub orientation: [f64; 4],
    pub velocity: Vec3,
    #[serde(default)]
    pub angular_velocity: Vec3,
}

/// All object states at one simulation step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub frame_id: usize,
    pub objects: Vec<ObjectState>,
}

impl Frame {
    /// State of `id` in this frame, if the object is present
    pub fn object(&self, id: ObjectId) -> Option<&ObjectState> {
        self.objects.iter().find(|state| state.object_id == id)
    }
}

/// Ordered frame sequence, indexed from zero
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trajectory {
    frames: Vec<Frame>,
}

impl Trajectory {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn first(&self) -> Option<&Frame> {
        self.frames.first()
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// State of `id` at frame `index`
    pub fn state(&self, index: usize, id: ObjectId) -> Option<&ObjectState> {
        self.frames.get(index).and_then(|frame| frame.object(id))
    }

    /// The last `count` frames (fewer if the trajectory is shorter)
    pub fn tail(&self, count: usize) -> &[Frame] {
        let start = self.frames.len().saturating_sub(count);
        &self.frames[start..]
    }
}

/// Contact between two objects reported by the simulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collision {
    pub object_ids: Vec<ObjectId>,
    pub frame_id: usize,
    #[serde(default)]
    pub location: Vec3,
}

impl Collision {
    pub fn new(frame_id: usize, a: ObjectId, b: ObjectId) -> Self {
        Self {
            object_ids: vec![a, b],
            frame_id,
            location: [0.0; 3],
        }
    }

    /// Participants as an ordered pair; `None` for malformed contacts
    pub fn pair(&self) -> Option<(ObjectId, ObjectId)> {
        match self.object_ids.as_slice() {
            [a, b] => Some((*a, *b)),
            _ => None,
        }
    }

    pub fn involves(&self, id: ObjectId) -> bool {
        self.object_ids.contains(&id)
    }

    /// First participant that is not `id`
    pub fn partner_of(&self, id: ObjectId) -> Option<ObjectId> {
        self.object_ids.iter().copied().find(|&other| other != id)
    }
}

/// Collisions sorted by frame; ties keep input order
pub fn collision_sequence(collisions: &[Collision]) -> Vec<Collision> {
    let mut sequence = collisions.to_vec();
    sequence.sort_by_key(|collision| collision.frame_id);
    sequence
}

/// One simulated scene as written by the simulation collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRecord {
    #[serde(default)]
    pub scene_index: usize,
    #[serde(default)]
    pub video_filename: String,
    pub object_property: Vec<ObjectProperty>,
    pub motion_trajectory: Trajectory,
    #[serde(default)]
    pub collision: Vec<Collision>,
}

impl SceneRecord {
    /// Load and parse a scene record from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| SceneError::io(path, source))?;
        serde_json::from_str(&raw).map_err(|source| SceneError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Text description of an object, falling back to its id
    pub fn describe(&self, id: ObjectId) -> String {
        self.object_property
            .iter()
            .find(|property| property.object_id == id)
            .map(ObjectProperty::description)
            .unwrap_or_else(|| format!("object {}", id))
    }

    pub fn total_frames(&self) -> usize {
        self.motion_trajectory.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_record_deserialization() {
        let raw = r#"{
            "scene_index": 3,
            "video_filename": "video_00003.mp4",
            "object_property": [
                {"object_id": 0, "color": "red", "material": "metal", "shape": "cube"}
            ],
            "motion_trajectory": [
                {"frame_id": 0, "objects": [
                    {"object_id": 0, "location": [1.0, 2.0, 0.2],
                     "orientation": [0.0, 0.0, 0.0, 1.0],
                     "velocity": [0.0, 0.0, 0.0],
                     "angular_velocity": [0.0, 0.0, 0.0]}
                ]}
            ],
            "collision": [
                {"object_ids": [0, 1], "frame_id": 12, "location": [1.0, 1.0, 0.0]}
            ]
        }"#;

        let scene: SceneRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(scene.scene_index, 3);
        assert_eq!(scene.total_frames(), 1);
        assert_eq!(scene.describe(0), "red metal cube");
        assert_eq!(scene.describe(7), "object 7");
        assert_eq!(scene.collision[0].pair(), Some((0, 1)));
        assert_eq!(scene.motion_trajectory.state(0, 0).map(|s| s.location), Some([1.0, 2.0, 0.2]));
    }

    #[test]
    fn test_collision_sequence_is_stable() {
        let collisions = vec![
            Collision::new(9, 1, 2),
            Collision::new(4, 3, 4),
            Collision::new(9, 5, 6),
        ];
        let sequence = collision_sequence(&collisions);
        let frames: Vec<_> = sequence.iter().map(|c| (c.frame_id, c.object_ids[0])).collect();
        assert_eq!(frames, vec![(4, 3), (9, 1), (9, 5)]);
    }

    #[test]
    fn test_collision_partner_lookup() {
        let collision = Collision::new(2, 5, 8);
        assert!(collision.involves(8));
        assert_eq!(collision.partner_of(8), Some(5));
        assert_eq!(collision.partner_of(5), Some(8));

        let malformed = Collision {
            object_ids: vec![1, 2, 3],
            frame_id: 0,
            location: [0.0; 3],
        };
        assert_eq!(malformed.pair(), None);
    }

    #[test]
    fn test_trajectory_tail() {
        let frames = (0..4)
            .map(|frame_id| Frame { frame_id, objects: Vec::new() })
            .collect();
        let trajectory = Trajectory::new(frames);
        assert_eq!(trajectory.tail(2).len(), 2);
        assert_eq!(trajectory.tail(2)[0].frame_id, 2);
        assert_eq!(trajectory.tail(10).len(), 4);
    }
}
