//! Composer configuration, loaded once at startup.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{ComposeError, ComposeResult};

pub const DEFAULT_FFMPEG_BIN: &str = "ffmpeg";
pub const DEFAULT_FONT_PATH: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComposerConfig {
    /// Executable to run; a bare name is resolved through `PATH`.
    #[serde(alias = "ffmpeg")]
    pub ffmpeg_bin: PathBuf,

    /// Font handed to `drawtext` for the title.
    pub font_path: PathBuf,

    /// Kill the external tool after this many milliseconds. `None` waits forever.
    pub timeout_ms: Option<u64>,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            ffmpeg_bin: PathBuf::from(DEFAULT_FFMPEG_BIN),
            font_path: PathBuf::from(DEFAULT_FONT_PATH),
            timeout_ms: None,
        }
    }
}

impl ComposerConfig {
    /// Read a JSON config file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> ComposeResult<Self> {
        let f = File::open(path)
            .with_context(|| format!("open config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse config '{}'", path.display()))?;
        Ok(cfg)
    }

    pub fn with_font_path(mut self, font_path: impl Into<PathBuf>) -> Self {
        self.font_path = font_path.into();
        self
    }

    pub fn with_ffmpeg_bin(mut self, ffmpeg_bin: impl Into<PathBuf>) -> Self {
        self.ffmpeg_bin = ffmpeg_bin.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        // Round up so a sub-millisecond timeout does not become zero.
        self.timeout_ms =
            timeout.map(|t| u64::try_from(t.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX));
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> ComposeResult<()> {
        if self.ffmpeg_bin.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("ffmpeg executable must not be empty").into());
        }
        if self.timeout_ms == Some(0) {
            return Err(anyhow::anyhow!("timeout must be non-zero when set").into());
        }
        if !self.font_path.exists() {
            return Err(ComposeError::font_not_found(&self.font_path));
        }
        Ok(())
    }
}
