use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Root directory to scan recursively for video clips.
    pub clip_library_path: PathBuf,
    /// Number of cells in the grid.
    pub grid_size: usize,
    /// Period between automatic reshuffles of unpinned cells.
    #[serde(with = "humantime_serde")]
    pub auto_shuffle_interval: Duration,
    /// Optional deterministic seed for pool shuffling.
    pub shuffle_seed: Option<u64>,
    /// File extensions treated as video clips (lowercase, no leading dot).
    pub video_extensions: Vec<String>,
    /// Extra clip URLs appended to the pool after the library scan.
    pub clip_urls: Vec<String>,
    /// Optional path for the best-effort cache of last-scanned clip names.
    pub recent_names_cache: Option<PathBuf>,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(self.grid_size >= 1, "grid-size must be at least 1");
        ensure!(
            self.auto_shuffle_interval > Duration::ZERO,
            "auto-shuffle-interval must be positive"
        );
        ensure!(
            !self.video_extensions.is_empty(),
            "video-extensions must list at least one extension"
        );
        Ok(self)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            clip_library_path: PathBuf::new(),
            grid_size: 4,
            auto_shuffle_interval: Duration::from_secs(3),
            shuffle_seed: None,
            video_extensions: ["mp4", "m4v", "mov", "webm", "mkv"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            clip_urls: Vec::new(),
            recent_names_cache: None,
        }
    }
}
