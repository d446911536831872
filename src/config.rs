//! Player configuration
//!
//! Optional JSON configuration for the player binary. Everything has a
//! default so the CLI works with no config file at all.

use crate::looping::LoopMode;
use crate::{AdxError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Player settings, loadable from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlayerConfig {
    /// How many times to take the loop seam; `None` means repeat until
    /// stopped
    pub loop_count: Option<u32>,
    /// Sample rate assumed for Sega-CD PCM rips (the format has no rate
    /// field)
    pub pcm_sample_rate: u32,
    /// Path to the song identification CSV, if any
    pub song_db: Option<PathBuf>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            loop_count: Some(1),
            pcm_sample_rate: 32000,
            song_db: None,
        }
    }
}

impl PlayerConfig {
    /// Load configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<PlayerConfig> {
        let text = std::fs::read_to_string(path.as_ref())?;
        serde_json::from_str(&text)
            .map_err(|e| AdxError::Config(format!("bad config file: {e}")))
    }

    /// Loop mode implied by `loop_count`.
    pub fn loop_mode(&self) -> LoopMode {
        match self.loop_count {
            None => LoopMode::Infinite,
            Some(n) => LoopMode::Count(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlayerConfig::default();
        assert_eq!(config.loop_count, Some(1));
        assert_eq!(config.pcm_sample_rate, 32000);
        assert_eq!(config.loop_mode(), LoopMode::Count(1));
    }

    #[test]
    fn test_load_partial_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"loop_count": null}"#).unwrap();

        let config = PlayerConfig::load(&path).unwrap();
        assert_eq!(config.loop_mode(), LoopMode::Infinite);
        assert_eq!(config.pcm_sample_rate, 32000);
    }

    #[test]
    fn test_bad_json_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            PlayerConfig::load(&path),
            Err(AdxError::Config(_))
        ));
    }
}
