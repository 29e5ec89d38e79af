//! Batch orchestration
//!
//! Loads simulated scenes for one scenario/setting pair, runs the
//! analyze → synthesize → encode chain on each and writes one question
//! file per scene that produced questions.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use serde::Serialize;

use crate::causal::CausalModel;
use crate::config::GeneratorConfig;
use crate::error::{Result, SceneError};
use crate::qa::{AnswerType, QaPair, QuestionType};
use crate::scenario::ScenarioKind;
use crate::scene::SceneRecord;
use crate::setting::Setting;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoInfo {
    pub scene_index: usize,
    pub video_filename: String,
    pub scenario: ScenarioKind,
    pub setting: Setting,
    pub total_frames: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationMetadata {
    pub scenario: ScenarioKind,
    pub setting: Setting,
    pub total_questions: usize,
    /// Distinct question types in order of first appearance
    pub question_types: Vec<QuestionType>,
    pub answer_types: Vec<AnswerType>,
}

/// Everything written for one scene
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneOutput {
    pub video_info: VideoInfo,
    pub qa_pairs: Vec<QaPair>,
    #[serde(flatten)]
    pub model: CausalModel,
    pub generation_metadata: GenerationMetadata,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneOutcome {
    Produced(Box<SceneOutput>),
    /// No questions could be synthesized; nothing is written
    Skipped { scene_index: usize },
}

impl SceneOutcome {
    pub fn output(&self) -> Option<&SceneOutput> {
        match self {
            SceneOutcome::Produced(output) => Some(&**output),
            SceneOutcome::Skipped { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub scenes_loaded: usize,
    pub scenes_written: usize,
    pub scenes_skipped: usize,
    pub total_questions: usize,
}

/// Render `..NN.mp4` as `video_000NN.mp4`; other names pass through
pub fn normalize_video_filename(name: &str) -> String {
    let Some(stem) = name.strip_suffix(".mp4") else {
        return name.to_string();
    };
    let bytes = stem.as_bytes();
    if bytes.len() < 2 || !bytes[bytes.len() - 2..].iter().all(u8::is_ascii_digit) {
        return name.to_string();
    }
    match stem[stem.len() - 2..].parse::<usize>() {
        Ok(index) => format!("video_{:05}.mp4", index),
        Err(_) => name.to_string(),
    }
}

/// Per-scene generator: one ChaCha stream per scene index under `seed`
pub fn scene_rng(seed: u64, scene_index: usize) -> ChaCha20Rng {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    rng.set_stream(scene_index as u64);
    rng
}

fn distinct<T: PartialEq + Copy>(values: impl Iterator<Item = T>) -> Vec<T> {
    let mut seen = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

/// Analyze one scene, synthesize its questions and encode its causal model
pub fn process_scene(
    scene: &SceneRecord,
    scenario: ScenarioKind,
    setting: Setting,
    rng: &mut dyn RngCore,
) -> SceneOutcome {
    let analysis = scenario.analyze(&scene.motion_trajectory, &scene.collision, setting);
    if !analysis.is_resolved() {
        warn!(
            "Scene {} has unresolved {} roles under {}",
            scene.scene_index, scenario, setting
        );
    }

    let qa_pairs = scenario.synthesize(scene, &analysis, setting, rng);
    if qa_pairs.is_empty() {
        return SceneOutcome::Skipped {
            scene_index: scene.scene_index,
        };
    }

    let model = scenario.encode(scene, &analysis, setting);
    if let Err(err) = model.validate() {
        warn!("Scene {}: {}", scene.scene_index, err);
    }

    let generation_metadata = GenerationMetadata {
        scenario,
        setting,
        total_questions: qa_pairs.len(),
        question_types: distinct(qa_pairs.iter().map(|qa| qa.question_type)),
        answer_types: distinct(qa_pairs.iter().map(|qa| qa.answer_type)),
    };
    let video_info = VideoInfo {
        scene_index: scene.scene_index,
        video_filename: normalize_video_filename(&scene.video_filename),
        scenario,
        setting,
        total_frames: scene.total_frames(),
    };

    SceneOutcome::Produced(Box::new(SceneOutput {
        video_info,
        qa_pairs,
        model,
        generation_metadata,
    }))
}

/// Batch generator for one scenario/setting pair
pub struct QaGenerator {
    config: GeneratorConfig,
}

impl QaGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Scene files of the simulation directory, sorted by file name
    fn scene_paths(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(|source| SceneError::io(dir, source))? {
            let path = entry.map_err(|source| SceneError::io(dir, source))?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Load every parsable scene; malformed files are logged and skipped
    pub fn load_scenes(&self) -> Result<Vec<SceneRecord>> {
        let dir = self.config.simulation_dir();
        if !dir.is_dir() {
            warn!("Simulation directory {} does not exist", dir.display());
            return Ok(Vec::new());
        }

        let scenes = self
            .scene_paths(&dir)?
            .iter()
            .filter_map(|path| match SceneRecord::load(path) {
                Ok(scene) => Some(scene),
                Err(err) => {
                    warn!("Skipping scene: {}", err);
                    None
                }
            })
            .collect();
        Ok(scenes)
    }

    /// Process `scenes` in input order; parallel when configured
    pub fn generate(&self, scenes: &[SceneRecord]) -> Vec<SceneOutcome> {
        let (scenario, setting, seed) = (self.config.scenario, self.config.setting, self.config.seed);
        let process = |scene: &SceneRecord| {
            let mut rng = scene_rng(seed, scene.scene_index);
            process_scene(scene, scenario, setting, &mut rng)
        };

        if self.config.parallel {
            scenes.par_iter().map(process).collect()
        } else {
            scenes.iter().map(process).collect()
        }
    }

    pub fn write(&self, output: &SceneOutput) -> Result<PathBuf> {
        let dir = self.config.questions_dir();
        fs::create_dir_all(&dir).map_err(|source| SceneError::io(&dir, source))?;

        let path = self.config.questions_path(output.video_info.scene_index);
        let json = serde_json::to_string_pretty(output)?;
        fs::write(&path, json).map_err(|source| SceneError::io(&path, source))?;
        debug!("Saved {} questions to {}", output.qa_pairs.len(), path.display());
        Ok(path)
    }

    /// Load, process and save the whole batch
    pub fn run(&self) -> Result<RunSummary> {
        let scenes = self.load_scenes()?;
        let mut summary = RunSummary {
            scenes_loaded: scenes.len(),
            ..RunSummary::default()
        };

        for outcome in self.generate(&scenes) {
            match outcome {
                SceneOutcome::Produced(output) => {
                    self.write(&output)?;
                    summary.scenes_written += 1;
                    summary.total_questions += output.qa_pairs.len();
                }
                SceneOutcome::Skipped { scene_index } => {
                    debug!("Scene {} produced no questions", scene_index);
                    summary.scenes_skipped += 1;
                }
            }
        }

        info!(
            "{}/{}: {} scenes loaded, {} written, {} skipped, {} questions",
            self.config.scenario,
            self.config.setting,
            summary.scenes_loaded,
            summary.scenes_written,
            summary.scenes_skipped,
            summary.total_questions
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::SceneBuilder;
    use tempfile::TempDir;

    /// Two movers strike a stationary cube at frames 10 and 11
    fn overdetermination_scene(scene_index: usize) -> SceneRecord {
        let mut scene = SceneBuilder::new(16)
            .object(0, |t| {
                if t < 10 {
                    ([0.0; 3], [0.0; 3])
                } else {
                    ([0.3 * (t - 10) as f64, 0.0, 0.0], [0.3, 0.0, 0.0])
                }
            })
            .moving(1, [-5.0, 0.0, 0.0], [0.5, 0.0, 0.0])
            .moving(2, [0.0, 5.5, 0.0], [0.0, -0.5, 0.0])
            .collision(10, 1, 0)
            .collision(11, 2, 0)
            .build();
        scene.scene_index = scene_index;
        scene.video_filename = format!("sim_{:02}.mp4", scene_index);
        scene
    }

    fn write_scene(dir: &Path, name: &str, scene: &SceneRecord) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), serde_json::to_string(scene).unwrap()).unwrap();
    }

    #[test]
    fn test_video_filename_normalisation() {
        assert_eq!(normalize_video_filename("output_video_07.mp4"), "video_00007.mp4");
        assert_eq!(normalize_video_filename("123.mp4"), "video_00023.mp4");
        assert_eq!(normalize_video_filename("clip_a.mp4"), "clip_a.mp4");
        assert_eq!(normalize_video_filename("video_12.avi"), "video_12.avi");
    }

    #[test]
    fn test_scene_rng_is_per_index() {
        let mut a = scene_rng(42, 3);
        let mut b = scene_rng(42, 3);
        let mut c = scene_rng(42, 4);
        let first = a.next_u64();
        assert_eq!(first, b.next_u64());
        assert_ne!(first, c.next_u64());
    }

    #[test]
    fn test_process_scene_metadata() {
        let scene = overdetermination_scene(5);
        let mut rng = scene_rng(1, 5);
        let outcome = process_scene(&scene, ScenarioKind::Overdetermination, Setting::Basic, &mut rng);
        let output = outcome.output().unwrap();

        assert_eq!(output.video_info.video_filename, "video_00005.mp4");
        assert_eq!(output.video_info.total_frames, 16);
        assert_eq!(output.generation_metadata.total_questions, output.qa_pairs.len());
        assert_eq!(
            output.generation_metadata.question_types.first(),
            Some(&QuestionType::CausalityIdentification)
        );
        assert_eq!(
            output.generation_metadata.answer_types,
            vec![AnswerType::YesNo, AnswerType::MultiChoice]
        );

        let json = serde_json::to_value(output).unwrap();
        assert_eq!(json["video_info"]["setting"], "basic");
        assert_eq!(json["causal_graph"]["edges"][0], "X1 -> Y");
        assert!(json["twin_network"]["counterfactual_world"].is_object());
    }

    #[test]
    fn test_unresolvable_scene_is_skipped() {
        let scene = SceneBuilder::new(4).moving(1, [0.0; 3], [1.0, 0.0, 0.0]).build();
        let mut rng = scene_rng(1, 0);
        let outcome = process_scene(&scene, ScenarioKind::Switch, Setting::Basic, &mut rng);
        assert_eq!(outcome, SceneOutcome::Skipped { scene_index: 0 });
    }

    #[test]
    fn test_run_writes_question_files() {
        let root = TempDir::new().unwrap();
        let config = GeneratorConfig::new(root.path(), ScenarioKind::Overdetermination, Setting::Basic);
        let sims = config.simulation_dir();
        write_scene(&sims, "scene_00000.json", &overdetermination_scene(0));
        write_scene(&sims, "scene_00001.json", &overdetermination_scene(1));
        fs::write(sims.join("broken.json"), "{ not json").unwrap();
        fs::write(sims.join("notes.txt"), "ignored").unwrap();

        let generator = QaGenerator::new(config.clone()).unwrap();
        let summary = generator.run().unwrap();

        assert_eq!(summary.scenes_loaded, 2);
        assert_eq!(summary.scenes_written, 2);
        assert_eq!(summary.scenes_skipped, 0);
        assert_eq!(summary.total_questions, 28);
        assert!(config.questions_path(0).is_file());
        assert!(config.questions_path(1).is_file());
    }

    #[test]
    fn test_parallel_and_sequential_runs_agree() {
        let scenes: Vec<SceneRecord> = (0..6).map(overdetermination_scene).collect();
        let config = GeneratorConfig::new("unused", ScenarioKind::Overdetermination, Setting::Basic);

        let parallel = QaGenerator::new(config.clone()).unwrap().generate(&scenes);
        let sequential = QaGenerator::new(config.with_parallel(false)).unwrap().generate(&scenes);
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_missing_directory_yields_empty_summary() {
        let root = TempDir::new().unwrap();
        let config = GeneratorConfig::new(root.path(), ScenarioKind::Late, Setting::AddOneMoving);
        let summary = QaGenerator::new(config).unwrap().run().unwrap();
        assert_eq!(summary, RunSummary::default());
    }
}
