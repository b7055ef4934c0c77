//! Pipeline configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::camera::CameraMotionConfig;
use crate::error::Result;
use crate::possession::PossessionConfig;
use crate::team::TeamConfig;

/// Every tunable of the enrichment pipeline. Missing fields take their
/// defaults, so a partial JSON document is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub camera: CameraMotionConfig,
    pub possession: PossessionConfig,
    pub team: TeamConfig,
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
