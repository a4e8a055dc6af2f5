use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    compose::request::CompositionRequest,
    config::ComposerConfig,
    encode::{invocation::ExternalToolInvocation, process},
    foundation::{
        error::{ComposeError, ComposeResult},
        resolution::Resolution,
    },
};

/// What a successful composition produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComposeOutcome {
    pub output_path: PathBuf,
    /// Whatever ffmpeg wrote to stderr; empty at `-loglevel error` unless it warned.
    pub stderr: String,
}

/// Validates requests, runs ffmpeg and interprets its exit status.
///
/// Holds only immutable configuration, so one composer can serve concurrent callers;
/// each call spawns its own child process. Writes to the same output path race.
#[derive(Clone, Debug)]
pub struct VideoComposer {
    config: ComposerConfig,
}

impl VideoComposer {
    /// Validate `config` once, up front. Fails with `FontNotFound` if the font is absent.
    pub fn new(config: ComposerConfig) -> ComposeResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// The ffmpeg command line `compose` would run for `request`, without checking inputs.
    pub fn plan(&self, request: &CompositionRequest) -> ExternalToolInvocation {
        ExternalToolInvocation::build(&self.config.ffmpeg_bin, &self.config.font_path, request)
    }

    /// Run one composition. Each stage gates the next: inputs, font, build, invoke, interpret.
    #[tracing::instrument(skip(self), fields(output = %request.output_path.display()))]
    pub fn compose(&self, request: &CompositionRequest) -> ComposeResult<ComposeOutcome> {
        request.validate_inputs()?;
        if !self.config.font_path.exists() {
            return Err(ComposeError::font_not_found(&self.config.font_path));
        }

        let invocation = self.plan(request);
        ensure_parent_dir(&request.output_path)?;

        tracing::info!(
            program = %invocation.program().to_string_lossy(),
            filter = %invocation.filter_graph(),
            "running ffmpeg"
        );
        let result = process::run(&invocation, self.config.timeout())?;

        if !result.success() {
            return Err(ComposeError::ExternalTool {
                code: result.code,
                stdout: result.stdout_lossy(),
                stderr: result.stderr_lossy(),
            });
        }

        tracing::info!("ffmpeg completed successfully");
        Ok(ComposeOutcome {
            output_path: request.output_path.clone(),
            stderr: result.stderr_lossy(),
        })
    }

    /// Boolean form of [`compose`](Self::compose): every failure is logged and becomes `false`.
    pub fn compose_ok(&self, request: &CompositionRequest) -> bool {
        match self.compose(request) {
            Ok(outcome) => {
                tracing::info!(
                    output = %outcome.output_path.display(),
                    "video created successfully"
                );
                true
            }
            Err(err) => {
                log_failure(&err);
                false
            }
        }
    }
}

fn log_failure(err: &ComposeError) {
    match err {
        ComposeError::ExternalTool {
            code,
            stdout,
            stderr,
        } => {
            tracing::error!(code = ?code, "ffmpeg failed");
            tracing::error!("standard output:\n{stdout}");
            tracing::error!("standard error:\n{stderr}");
        }
        ComposeError::Other(e) => {
            tracing::error!("an unexpected error occurred: {e:#}");
        }
        other => {
            tracing::error!(kind = ?other.kind(), "{other}");
        }
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ComposeResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// One-shot entry point with the default configuration.
///
/// `resolution` is parsed after the inputs and the font are checked, so a malformed
/// value such as `"1280"` yields `false` like any other failure.
pub fn compose(
    image1_path: impl Into<PathBuf>,
    image2_path: impl Into<PathBuf>,
    output_path: impl Into<PathBuf>,
    title: &str,
    resolution: &str,
) -> bool {
    let request = CompositionRequest::new(image1_path, image2_path, output_path).with_title(title);
    let run = || -> ComposeResult<bool> {
        request.validate_inputs()?;
        let composer = VideoComposer::new(ComposerConfig::default())?;
        let request = request.clone().with_resolution(resolution.parse::<Resolution>()?);
        Ok(composer.compose_ok(&request))
    };
    run().unwrap_or_else(|err| {
        log_failure(&err);
        false
    })
}

/// Boolean composition of `request`, exactly as given, with an explicit configuration.
pub fn compose_with(config: ComposerConfig, request: &CompositionRequest) -> bool {
    // Inputs are checked before the font, as the composer would.
    let run = || -> ComposeResult<bool> {
        request.validate_inputs()?;
        let composer = VideoComposer::new(config)?;
        Ok(composer.compose_ok(request))
    };
    run().unwrap_or_else(|err| {
        log_failure(&err);
        false
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::error::ErrorKind;

    fn fixture_dir(name: &str) -> PathBuf {
        let dir = PathBuf::from("target").join("composer_tests").join(name);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn touch(path: &Path) {
        std::fs::write(path, b"x").unwrap();
    }

    fn config_with_font(dir: &Path) -> ComposerConfig {
        let font = dir.join("font.ttf");
        touch(&font);
        ComposerConfig::default()
            .with_font_path(font)
            .with_ffmpeg_bin("stillframe-no-such-binary-on-path")
    }

    #[test]
    fn new_rejects_missing_font() {
        let cfg = ComposerConfig::default().with_font_path("target/composer_tests/none.ttf");
        let err = VideoComposer::new(cfg).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FontNotFound);
    }

    #[test]
    fn missing_images_fail_before_tool_runs() {
        let dir = fixture_dir("missing_images");
        let composer = VideoComposer::new(config_with_font(&dir)).unwrap();

        let req = CompositionRequest::new(
            dir.join("nope1.png"),
            dir.join("nope2.png"),
            dir.join("o.mp4"),
        );
        let err = composer.compose(&req).unwrap_err();
        // The configured binary does not exist; reaching it would be ToolUnavailable.
        assert_eq!(err.kind(), ErrorKind::InputNotFound);
        assert!(!composer.compose_ok(&req));
    }

    #[test]
    fn font_removed_after_startup_is_reported() {
        let dir = fixture_dir("font_removed");
        let cfg = config_with_font(&dir);
        let composer = VideoComposer::new(cfg.clone()).unwrap();
        std::fs::remove_file(&cfg.font_path).unwrap();

        let img = dir.join("img.png");
        touch(&img);
        let req = CompositionRequest::new(&img, &img, dir.join("o.mp4"));
        assert_eq!(
            composer.compose(&req).unwrap_err().kind(),
            ErrorKind::FontNotFound
        );
    }

    #[test]
    fn unavailable_tool_is_distinct_from_bad_input() {
        let dir = fixture_dir("no_tool");
        let composer = VideoComposer::new(config_with_font(&dir)).unwrap();
        let img = dir.join("img.png");
        touch(&img);

        let err = composer
            .compose(&CompositionRequest::new(&img, &img, dir.join("o.mp4")))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ToolUnavailable);
        assert!(err.is_retryable());
    }

    #[test]
    fn plan_uses_configured_font_and_program() {
        let dir = fixture_dir("plan");
        let cfg = config_with_font(&dir);
        let composer = VideoComposer::new(cfg.clone()).unwrap();
        let inv = composer.plan(&CompositionRequest::new("a.png", "b.png", "o.mp4"));
        assert_eq!(inv.program(), cfg.ffmpeg_bin.as_os_str());
        assert_eq!(inv.font_path(), cfg.font_path.as_path());
    }

    #[test]
    fn compose_rejects_resolution_without_separator() {
        let dir = fixture_dir("bad_resolution");
        let img = dir.join("img.png");
        touch(&img);
        assert!(!compose(&img, &img, dir.join("o.mp4"), "t", "1280"));
    }

    #[test]
    fn ensure_parent_dir_accepts_bare_file_names() {
        ensure_parent_dir(Path::new("out.mp4")).unwrap();
        let nested = fixture_dir("parent").join("a").join("b").join("out.mp4");
        ensure_parent_dir(&nested).unwrap();
        assert!(nested.parent().unwrap().is_dir());
    }
}
