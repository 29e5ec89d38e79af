//! Causal scene analysis and question synthesis
//!
//! Turns a simulated multi-object trajectory into a causal analysis: role
//! binding for one of six causal topologies, a kinematic event log, a
//! structural causal model with its twin network, and a battery of causal
//! reasoning questions with verifiable answers.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod causal;
pub mod config;
pub mod error;
pub mod events;
pub mod kinematics;
pub mod pipeline;
pub mod qa;
pub mod roles;
pub mod scenario;
pub mod scene;
pub mod setting;

pub use causal::CausalModel;
pub use config::GeneratorConfig;
pub use error::{Result, SceneError};
pub use pipeline::{process_scene, QaGenerator, RunSummary, SceneOutcome, SceneOutput};
pub use qa::QaPair;
pub use scenario::{AnalysisRecord, ScenarioKind};
pub use scene::SceneRecord;
pub use setting::Setting;
