//! Shared scene fixtures for the integration tests
//!
//! Scenes are built the way the simulator reports them: each object has a
//! start location and a velocity schedule, and locations integrate the
//! velocity of the preceding frames.

#![allow(dead_code)]

use causal_scene_core::scene::{
    Collision, Frame, ObjectId, ObjectProperty, ObjectState, SceneRecord, Trajectory, Vec3,
};
use causal_scene_core::{ScenarioKind, Setting};

pub const ORIGIN: Vec3 = [0.0; 3];

struct Track {
    property: ObjectProperty,
    start: Vec3,
    /// (frame, velocity from that frame on), ascending by frame
    schedule: Vec<(usize, Vec3)>,
}

impl Track {
    fn velocity(&self, frame: usize) -> Vec3 {
        self.schedule
            .iter()
            .rev()
            .find(|(from, _)| *from <= frame)
            .map(|(_, v)| *v)
            .unwrap_or(ORIGIN)
    }
}

pub struct SceneFixture {
    frames: usize,
    tracks: Vec<Track>,
    collisions: Vec<Collision>,
    scene_index: usize,
}

impl SceneFixture {
    pub fn new(frames: usize) -> Self {
        Self {
            frames,
            tracks: Vec::new(),
            collisions: Vec::new(),
            scene_index: 0,
        }
    }

    pub fn index(mut self, scene_index: usize) -> Self {
        self.scene_index = scene_index;
        self
    }

    pub fn object(
        mut self,
        id: ObjectId,
        (color, material, shape): (&str, &str, &str),
        start: Vec3,
        schedule: &[(usize, Vec3)],
    ) -> Self {
        self.tracks.push(Track {
            property: ObjectProperty {
                object_id: id,
                color: color.to_string(),
                material: material.to_string(),
                shape: shape.to_string(),
            },
            start,
            schedule: schedule.to_vec(),
        });
        self
    }

    pub fn collision(mut self, frame: usize, a: ObjectId, b: ObjectId) -> Self {
        self.collisions.push(Collision::new(frame, a, b));
        self
    }

    pub fn build(self) -> SceneRecord {
        let mut locations: Vec<Vec3> = self.tracks.iter().map(|track| track.start).collect();
        let mut frames = Vec::with_capacity(self.frames);

        for frame_id in 0..self.frames {
            let objects = self
                .tracks
                .iter()
                .zip(&locations)
                .map(|(track, location)| ObjectState {
                    object_id: track.property.object_id,
                    location: *location,
                    orientation: [0.0, 0.0, 0.0, 1.0],
                    velocity: track.velocity(frame_id),
                    angular_velocity: ORIGIN,
                })
                .collect();
            frames.push(Frame { frame_id, objects });

            for (track, location) in self.tracks.iter().zip(locations.iter_mut()) {
                let v = track.velocity(frame_id);
                for axis in 0..3 {
                    location[axis] += v[axis];
                }
            }
        }

        SceneRecord {
            scene_index: self.scene_index,
            video_filename: format!("output_{:02}.mp4", self.scene_index % 100),
            object_property: self.tracks.into_iter().map(|track| track.property).collect(),
            motion_trajectory: Trajectory::new(frames),
            collision: self.collisions,
        }
    }
}

const STILL: Vec3 = ORIGIN;

/// Add the distractors a setting calls for, placed well away from the action
fn with_distractors(fixture: SceneFixture, setting: Setting, first_id: ObjectId) -> SceneFixture {
    let statics = [
        (("gray", "rubber", "cylinder"), [-9.0, 9.0, 0.0]),
        (("cyan", "metal", "sphere"), [9.0, 9.0, 0.0]),
    ];
    let movers = [
        (("purple", "rubber", "sphere"), [-12.0, -12.0, 0.0], [-0.2, 0.0, 0.0]),
        (("brown", "metal", "cube"), [12.0, -12.0, 0.0], [0.2, 0.0, 0.0]),
    ];

    let count = setting.distractor_count();
    let mut fixture = fixture;
    match setting {
        Setting::Basic => {}
        Setting::AddOneStatic | Setting::AddTwoStatic => {
            for (i, (look, at)) in statics.into_iter().take(count).enumerate() {
                fixture = fixture.object(first_id + i as ObjectId, look, at, &[]);
            }
        }
        Setting::AddOneMoving | Setting::AddTwoMoving => {
            for (i, (look, at, v)) in movers.into_iter().take(count).enumerate() {
                fixture = fixture.object(first_id + i as ObjectId, look, at, &[(0, v)]);
            }
        }
    }
    fixture
}

/// Two movers strike a stationary cube on consecutive frames
pub fn overdetermination() -> SceneFixture {
    SceneFixture::new(16)
        .object(0, ("red", "metal", "cube"), ORIGIN, &[(10, [0.3, 0.0, 0.0])])
        .object(1, ("blue", "rubber", "sphere"), [-5.0, 0.0, 0.0], &[(0, [0.5, 0.0, 0.0]), (10, STILL)])
        .object(2, ("green", "metal", "cylinder"), [0.0, 5.5, 0.0], &[(0, [0.0, -0.5, 0.0]), (11, STILL)])
        .collision(10, 1, 0)
        .collision(11, 2, 0)
}

/// M2 rear-ends M1 at frame 5, M1 then reaches S at frame 11
pub fn switch() -> SceneFixture {
    SceneFixture::new(16)
        .object(0, ("red", "metal", "cube"), [6.0, 0.0, 0.0], &[(11, [0.6, 0.0, 0.0])])
        .object(
            1,
            ("blue", "rubber", "sphere"),
            ORIGIN,
            &[(0, [0.2, 0.0, 0.0]), (5, [0.8, 0.0, 0.0]), (11, STILL)],
        )
        .object(2, ("green", "metal", "cylinder"), [-4.0, 0.0, 0.0], &[(0, [1.0, 0.0, 0.0]), (5, STILL)])
        .collision(5, 2, 1)
        .collision(11, 1, 0)
}

/// M1 reaches S at frame 10 while M2 is still on its way
pub fn late() -> SceneFixture {
    SceneFixture::new(16)
        .object(0, ("red", "metal", "cube"), [6.0, 0.0, 0.0], &[(10, [0.4, 0.0, 0.0])])
        .object(1, ("blue", "rubber", "sphere"), ORIGIN, &[(0, [0.6, 0.0, 0.0]), (10, STILL)])
        .object(2, ("green", "metal", "cylinder"), [6.0, -8.0, 0.0], &[(0, [0.0, 0.3, 0.0])])
        .collision(10, 1, 0)
}

/// M1 sets S1 moving first; M2 strikes S2, which lies between M2 and S1
pub fn early() -> SceneFixture {
    SceneFixture::new(16)
        .object(0, ("red", "metal", "cube"), [2.0, 0.0, 0.0], &[(8, [0.0, 0.5, 0.0])])
        .object(1, ("blue", "rubber", "sphere"), ORIGIN, &[(8, [0.5, 0.0, 0.0])])
        .object(2, ("green", "metal", "cylinder"), [2.0, -4.0, 0.0], &[(0, [0.0, 0.5, 0.0]), (8, STILL)])
        .object(3, ("yellow", "rubber", "cube"), [-4.0, 0.0, 0.0], &[(0, [0.5, 0.0, 0.0]), (8, STILL)])
        .collision(7, 2, 0)
        .collision(8, 3, 1)
}

/// M3 knocks M2 off its intercept course at frame 4; M1 reaches S at 12
pub fn double() -> SceneFixture {
    SceneFixture::new(18)
        .object(0, ("red", "metal", "cube"), [6.0, 0.0, 0.0], &[(12, [0.5, 0.0, 0.0])])
        .object(1, ("blue", "rubber", "sphere"), ORIGIN, &[(0, [0.5, 0.0, 0.0]), (12, STILL)])
        .object(
            2,
            ("green", "metal", "cylinder"),
            [3.0, -4.0, 0.0],
            &[(0, [0.0, 0.5, 0.0]), (4, [0.5, 0.1, 0.0])],
        )
        .object(3, ("yellow", "rubber", "cube"), [0.0, -2.0, 0.0], &[(0, [0.75, 0.0, 0.0]), (4, STILL)])
        .collision(4, 3, 2)
        .collision(12, 1, 0)
}

/// M1 knocks S2 aside; M2 stalls short of S2 on the line through S1
pub fn bogus() -> SceneFixture {
    SceneFixture::new(16)
        .object(0, ("red", "metal", "cube"), [4.0, 0.0, 0.0], &[])
        .object(1, ("blue", "rubber", "sphere"), [2.0, 0.0, 0.0], &[(8, [0.0, 0.5, 0.0])])
        .object(2, ("green", "metal", "cylinder"), [2.0, -4.0, 0.0], &[(0, [0.0, 0.5, 0.0]), (8, STILL)])
        .object(3, ("yellow", "rubber", "cube"), [-3.0, 0.0, 0.0], &[(0, [0.4, 0.0, 0.0]), (6, STILL)])
        .collision(8, 2, 1)
}

/// Canonical scene of `scenario` with the distractors of `setting`
pub fn scene_for(scenario: ScenarioKind, setting: Setting) -> SceneRecord {
    let (fixture, next_id) = match scenario {
        ScenarioKind::Overdetermination => (overdetermination(), 3),
        ScenarioKind::Switch => (switch(), 3),
        ScenarioKind::Late => (late(), 3),
        ScenarioKind::Early => (early(), 4),
        ScenarioKind::Double => (double(), 4),
        ScenarioKind::Bogus => (bogus(), 4),
    };
    with_distractors(fixture, setting, next_id).build()
}

/// Questions each topology's battery holds
pub fn battery_size(scenario: ScenarioKind) -> usize {
    match scenario {
        ScenarioKind::Overdetermination => 14,
        ScenarioKind::Switch => 18,
        ScenarioKind::Late => 15,
        ScenarioKind::Early => 14,
        ScenarioKind::Double => 20,
        ScenarioKind::Bogus => 19,
    }
}
