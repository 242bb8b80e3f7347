use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub trait HighScoreStore: Send {
    fn get(&self) -> u32;
    fn set(&mut self, value: u32);
}

impl fmt::Debug for dyn HighScoreStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HighScoreStore")
            .field("value", &self.get())
            .finish()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryHighScore {
    value: u32,
}

impl MemoryHighScore {
    pub fn new(value: u32) -> Self {
        Self { value }
    }
}

impl HighScoreStore for MemoryHighScore {
    fn get(&self) -> u32 {
        self.value
    }

    fn set(&mut self, value: u32) {
        self.value = value;
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct HighScoreFile {
    version: u8,
    #[serde(rename = "highScore", alias = "high_score")]
    high_score: u32,
    #[serde(rename = "updatedAt", alias = "updated_at", default)]
    updated_at: Option<String>,
}

pub struct FileHighScoreStore {
    file_path: PathBuf,
    value: u32,
}

impl FileHighScoreStore {
    pub fn new(file_path: PathBuf) -> Self {
        let value = load_high_score(&file_path);
        Self { file_path, value }
    }

    fn save(&self) {
        if let Some(parent) = self.file_path.parent() {
            if let Err(error) = fs::create_dir_all(parent) {
                warn!(
                    path = %parent.display(),
                    %error,
                    "failed to create high score directory"
                );
                return;
            }
        }

        let payload = HighScoreFile {
            version: 1,
            high_score: self.value,
            updated_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        };
        match serde_json::to_string_pretty(&payload) {
            Ok(text) => {
                if let Err(error) = fs::write(&self.file_path, text) {
                    warn!(path = %self.file_path.display(), %error, "failed to write high score");
                }
            }
            Err(error) => {
                warn!(path = %self.file_path.display(), %error, "failed to serialize high score");
            }
        }
    }
}

impl HighScoreStore for FileHighScoreStore {
    fn get(&self) -> u32 {
        self.value
    }

    fn set(&mut self, value: u32) {
        self.value = value;
        self.save();
    }
}

fn load_high_score(path: &Path) -> u32 {
    let text = match fs::read_to_string(path) {
        Ok(value) => value,
        Err(error) => {
            if error.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), %error, "failed to read high score");
            }
            return 0;
        }
    };
    match serde_json::from_str::<HighScoreFile>(&text) {
        Ok(file) if file.version == 1 => file.high_score,
        Ok(file) => {
            warn!(
                path = %path.display(),
                version = file.version,
                "unsupported high score file version"
            );
            0
        }
        Err(error) => {
            warn!(path = %path.display(), %error, "failed to parse high score");
            0
        }
    }
}
