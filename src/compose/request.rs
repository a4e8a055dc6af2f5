use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::foundation::{
    error::{ComposeError, ComposeResult, ImageSlot},
    resolution::Resolution,
};

pub const DEFAULT_TITLE: &str = "Agent Content Creation";

/// One composition job: two stills in, one short video out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionRequest {
    /// Background image, scaled to `resolution`.
    pub image1_path: PathBuf,
    /// Overlay image, scaled to `resolution` and placed at (0,0).
    pub image2_path: PathBuf,
    /// Output video; the container is picked by ffmpeg from the extension.
    pub output_path: PathBuf,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub resolution: Resolution,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

impl CompositionRequest {
    pub fn new(
        image1_path: impl Into<PathBuf>,
        image2_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            image1_path: image1_path.into(),
            image2_path: image2_path.into(),
            output_path: output_path.into(),
            title: default_title(),
            resolution: Resolution::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Checks image 1 then image 2, stopping at the first missing one.
    pub fn validate_inputs(&self) -> ComposeResult<()> {
        require_exists(&self.image1_path, ImageSlot::First)?;
        require_exists(&self.image2_path, ImageSlot::Second)?;
        Ok(())
    }
}

fn require_exists(path: &Path, which: ImageSlot) -> ComposeResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ComposeError::input_not_found(which, path))
    }
}
