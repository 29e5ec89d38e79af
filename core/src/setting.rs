//! Distractor settings
//!
//! A setting selects how many causally inert objects are folded into a
//! scene. The set is closed; unknown strings are rejected when parsed so
//! template logic only ever sees a valid variant.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SceneError;

/// Whether distractors are stationary or moving at frame zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistractorKind {
    Static,
    Moving,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Setting {
    /// No distractors
    #[default]
    Basic,
    AddOneStatic,
    AddTwoStatic,
    AddOneMoving,
    AddTwoMoving,
}

impl Setting {
    pub const ALL: [Setting; 5] = [
        Setting::Basic,
        Setting::AddOneStatic,
        Setting::AddTwoStatic,
        Setting::AddOneMoving,
        Setting::AddTwoMoving,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Setting::Basic => "basic",
            Setting::AddOneStatic => "add_one_static",
            Setting::AddTwoStatic => "add_two_static",
            Setting::AddOneMoving => "add_one_moving",
            Setting::AddTwoMoving => "add_two_moving",
        }
    }

    pub fn is_basic(self) -> bool {
        self == Setting::Basic
    }

    /// Kind of distractor this setting adds, `None` for the basic setting
    pub fn distractor_kind(self) -> Option<DistractorKind> {
        match self {
            Setting::Basic => None,
            Setting::AddOneStatic | Setting::AddTwoStatic => Some(DistractorKind::Static),
            Setting::AddOneMoving | Setting::AddTwoMoving => Some(DistractorKind::Moving),
        }
    }

    /// Number of distractor objects the setting adds
    pub fn distractor_count(self) -> usize {
        match self {
            Setting::Basic => 0,
            Setting::AddOneStatic | Setting::AddOneMoving => 1,
            Setting::AddTwoStatic | Setting::AddTwoMoving => 2,
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Setting {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "none" | "basic" => Ok(Setting::Basic),
            "add_one_static" => Ok(Setting::AddOneStatic),
            "add_two_static" => Ok(Setting::AddTwoStatic),
            "add_one_moving" => Ok(Setting::AddOneMoving),
            "add_two_moving" => Ok(Setting::AddTwoMoving),
            other => Err(SceneError::UnknownSetting(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setting_round_trips_through_strings() {
        for setting in Setting::ALL {
            assert_eq!(setting.as_str().parse::<Setting>().unwrap(), setting);
        }
        assert_eq!("none".parse::<Setting>().unwrap(), Setting::Basic);
    }

    #[test]
    fn test_unknown_setting_rejected() {
        let err = "add_three_static".parse::<Setting>().unwrap_err();
        assert!(matches!(err, SceneError::UnknownSetting(ref s) if s == "add_three_static"));
    }

    #[test]
    fn test_distractor_shape() {
        assert_eq!(Setting::Basic.distractor_count(), 0);
        assert_eq!(Setting::Basic.distractor_kind(), None);
        assert_eq!(Setting::AddTwoStatic.distractor_count(), 2);
        assert_eq!(Setting::AddTwoStatic.distractor_kind(), Some(DistractorKind::Static));
        assert_eq!(Setting::AddOneMoving.distractor_kind(), Some(DistractorKind::Moving));
    }
}
