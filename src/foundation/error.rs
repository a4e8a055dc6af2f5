use std::{path::PathBuf, time::Duration};

/// Result alias used across the crate.
pub type ComposeResult<T> = Result<T, ComposeError>;

/// Which of the two input images a failure refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageSlot {
    /// The background image (`-i` #0).
    First,
    /// The overlay image (`-i` #1).
    Second,
}

impl std::fmt::Display for ImageSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::First => f.write_str("image 1"),
            Self::Second => f.write_str("image 2"),
        }
    }
}

/// Discriminant of [`ComposeError`], for callers that branch on the failure class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InputNotFound,
    FontNotFound,
    InvalidResolution,
    ToolUnavailable,
    ExternalTool,
    Timeout,
    Unexpected,
}

#[derive(thiserror::Error, Debug)]
pub enum ComposeError {
    #[error("{which} not found: {}", path.display())]
    InputNotFound { which: ImageSlot, path: PathBuf },

    #[error("font file not found: {}", path.display())]
    FontNotFound { path: PathBuf },

    #[error("invalid resolution: {0}")]
    InvalidResolution(String),

    #[error("external tool unavailable: {0}")]
    ToolUnavailable(String),

    #[error("external tool failed with {}", describe_exit(*code))]
    ExternalTool {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("external tool timed out after {}ms", after.as_millis())]
    Timeout { after: Duration },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {c}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl ComposeError {
    pub fn input_not_found(which: ImageSlot, path: impl Into<PathBuf>) -> Self {
        Self::InputNotFound {
            which,
            path: path.into(),
        }
    }

    pub fn font_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FontNotFound { path: path.into() }
    }

    pub fn invalid_resolution(msg: impl Into<String>) -> Self {
        Self::InvalidResolution(msg.into())
    }

    pub fn tool_unavailable(msg: impl Into<String>) -> Self {
        Self::ToolUnavailable(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InputNotFound { .. } => ErrorKind::InputNotFound,
            Self::FontNotFound { .. } => ErrorKind::FontNotFound,
            Self::InvalidResolution(_) => ErrorKind::InvalidResolution,
            Self::ToolUnavailable(_) => ErrorKind::ToolUnavailable,
            Self::ExternalTool { .. } => ErrorKind::ExternalTool,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Other(_) => ErrorKind::Unexpected,
        }
    }

    /// Transient failures a caller may reasonably retry: a missing or unspawnable tool
    /// and a run that exceeded its deadline. Bad input never is.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::ToolUnavailable | ErrorKind::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert_eq!(
            ComposeError::input_not_found(ImageSlot::First, "a.png").to_string(),
            "image 1 not found: a.png"
        );
        assert_eq!(
            ComposeError::input_not_found(ImageSlot::Second, "b.jpg").to_string(),
            "image 2 not found: b.jpg"
        );
        assert!(
            ComposeError::font_not_found("/nope.ttf")
                .to_string()
                .contains("font file not found:")
        );
        assert!(
            ComposeError::invalid_resolution("x")
                .to_string()
                .contains("invalid resolution:")
        );
    }

    #[test]
    fn external_tool_message_names_exit_code() {
        let err = ComposeError::ExternalTool {
            code: Some(1),
            stdout: String::new(),
            stderr: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "external tool failed with exit code 1");

        let err = ComposeError::ExternalTool {
            code: None,
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(err.to_string().contains("signal"));
    }

    #[test]
    fn only_transient_kinds_are_retryable() {
        assert!(ComposeError::tool_unavailable("ffmpeg").is_retryable());
        assert!(
            ComposeError::Timeout {
                after: Duration::from_millis(5)
            }
            .is_retryable()
        );
        assert!(!ComposeError::font_not_found("f.ttf").is_retryable());
        assert!(!ComposeError::invalid_resolution("1280").is_retryable());
        assert!(
            !ComposeError::ExternalTool {
                code: Some(1),
                stdout: String::new(),
                stderr: String::new(),
            }
            .is_retryable()
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = ComposeError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
        assert_eq!(err.kind(), ErrorKind::Unexpected);
    }
}
