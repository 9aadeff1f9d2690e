// The sample kit and startup layout. Read once at startup from
// <project_dir>/looptty.json; a missing file just means the built-in kit.
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;
use crate::shared::DEFAULT_TRACKS;

const KIT_FILE: &str = "looptty.json";
const RECORDING_FILE: &str = "recorded-audio.wav";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct KitConfig {
    pub initial_tracks: usize,
    pub recording_file: String, // relative to the project dir
    pub samples: Vec<KitSample>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct KitSample {
    pub path: String, // relative to the project dir
    pub name: String,
    pub category: String,
}

impl KitSample {
    fn new(path: &str, name: &str, category: &str) -> Self {
        Self { path: path.to_string(), name: name.to_string(), category: category.to_string() }
    }
}

impl Default for KitConfig {
    fn default() -> Self {
        Self {
            initial_tracks: DEFAULT_TRACKS,
            recording_file: RECORDING_FILE.to_string(),
            samples: vec![
                KitSample::new("bass.mp3", "Bass", "Basses"),
                KitSample::new("drum.mp3", "Drum", "Drums"),
                KitSample::new("piano.mp3", "Piano", "Strings"),
                KitSample::new("silence.mp3", "Silence", "Special"),
                KitSample::new("strange-beat.mp3", "StrangeBeat", "Special"),
                KitSample::new("violin.mp3", "Violin", "Strings"),
            ],
        }
    }
}

impl KitConfig {
    pub fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn recording_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.recording_file)
    }
}

fn kit_file_path(project_dir: &Path) -> PathBuf {
    project_dir.join(KIT_FILE)
}

pub fn load_kit(project_dir: &Path) -> KitConfig {
    let path = kit_file_path(project_dir);
    let data = match std::fs::read_to_string(&path) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("no {} in project dir, using the built-in kit", KIT_FILE);
            return KitConfig::default();
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), "could not read kit file: {e}");
            return KitConfig::default();
        }
    };
    match KitConfig::parse(&data) {
        Ok(kit) => kit,
        Err(e) => {
            tracing::error!(path = %path.display(), "malformed kit file, using the built-in kit: {e}");
            KitConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_kit_matches_builtin_samples() {
        let kit = KitConfig::default();
        assert_eq!(kit.initial_tracks, 4);
        assert_eq!(kit.samples.len(), 6);
        let beat = &kit.samples[4];
        assert_eq!((beat.name.as_str(), beat.category.as_str()), ("StrangeBeat", "Special"));
    }

    #[test]
    fn partial_file_falls_back_per_field() {
        let kit = KitConfig::parse(r#"{ "initial_tracks": 2 }"#).unwrap();
        assert_eq!(kit.initial_tracks, 2);
        assert_eq!(kit.recording_file, "recorded-audio.wav");
        assert_eq!(kit.samples.len(), 6);
    }

    #[test]
    fn custom_samples() {
        let kit = KitConfig::parse(
            r#"{ "samples": [{ "path": "kick.wav", "name": "Kick", "category": "Drums" }] }"#,
        )
        .unwrap();
        assert_eq!(kit.samples, vec![KitSample::new("kick.wav", "Kick", "Drums")]);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(KitConfig::parse("{ initial_tracks: ").is_err());
    }

    #[test]
    fn missing_kit_file_gives_default() {
        let dir = std::env::temp_dir().join(format!("looptty-kit-{}", std::process::id()));
        assert_eq!(load_kit(&dir), KitConfig::default());
        assert_eq!(
            KitConfig::default().recording_path(&dir),
            dir.join("recorded-audio.wav")
        );
    }
}
