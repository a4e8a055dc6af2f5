//! Composite two still images and a title into a one-second video with `ffmpeg`.
//!
//! Decoding, scaling, overlay, text rendering and encoding all happen inside the
//! external tool. This crate validates the request, builds the command line, runs
//! it, and classifies the outcome.
//!
//! ```no_run
//! use stillframe::{ComposerConfig, CompositionRequest, VideoComposer};
//!
//! let composer = VideoComposer::new(ComposerConfig::default())?;
//! let request = CompositionRequest::new("image1.png", "image2.jpg", "output.mp4")
//!     .with_title("Release Notes")
//!     .with_resolution("1920x1080".parse()?);
//! composer.compose(&request)?;
//! # Ok::<(), stillframe::ComposeError>(())
//! ```
#![deny(unsafe_code)]

pub mod compose;
pub mod config;
pub mod encode;
mod foundation;
pub mod placeholder;

pub use compose::composer::{ComposeOutcome, VideoComposer, compose, compose_with};
pub use compose::request::{CompositionRequest, DEFAULT_TITLE};
pub use config::ComposerConfig;
pub use encode::{
    filter::FilterGraph,
    invocation::ExternalToolInvocation,
    is_tool_available,
    process::InvocationResult,
};
pub use foundation::error::{ComposeError, ComposeResult, ErrorKind, ImageSlot};
pub use foundation::resolution::Resolution;
