//! Generator configuration
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};
use crate::scenario::ScenarioKind;
use crate::setting::Setting;

/// Where a batch reads scenes from, which topology and setting it applies,
/// and how it seeds option shuffling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub data_root: PathBuf,
    pub scenario: ScenarioKind,
    pub setting: Setting,
    pub seed: u64,
    pub parallel: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("data"),
            scenario: ScenarioKind::default(),
            setting: Setting::default(),
            seed: 42,
            parallel: true,
        }
    }
}

impl GeneratorConfig {
    pub fn new(data_root: impl Into<PathBuf>, scenario: ScenarioKind, setting: Setting) -> Self {
        Self {
            data_root: data_root.into(),
            scenario,
            setting,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| SceneError::io(path, source))?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| SceneError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.data_root.as_os_str().is_empty() {
            return Err(SceneError::InvalidConfig("data_root must not be empty".to_string()));
        }
        Ok(())
    }

    /// `<data_root>/synthetic/<scenario>/<setting>`
    pub fn scenario_dir(&self) -> PathBuf {
        self.data_root
            .join("synthetic")
            .join(self.scenario.as_str())
            .join(self.setting.as_str())
    }

    pub fn simulation_dir(&self) -> PathBuf {
        self.scenario_dir().join("simulations")
    }

    pub fn questions_dir(&self) -> PathBuf {
        self.scenario_dir().join("questions")
    }

    pub fn questions_path(&self, scene_index: usize) -> PathBuf {
        self.questions_dir().join(format!("questions_{:05}.json", scene_index))
    }
}
