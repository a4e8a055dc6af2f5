use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use crate::{
    compose::request::CompositionRequest,
    encode::filter::{FilterGraph, OUTPUT_LABEL},
};

/// Seconds of output; both inputs loop, so this is what bounds the encode.
pub const OUTPUT_DURATION_SECS: u32 = 1;

/// A fully built ffmpeg command line for one [`CompositionRequest`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalToolInvocation {
    program: OsString,
    font_path: PathBuf,
    graph: FilterGraph,
    args: Vec<OsString>,
}

impl ExternalToolInvocation {
    pub fn build(
        program: impl AsRef<OsStr>,
        font_path: &Path,
        request: &CompositionRequest,
    ) -> Self {
        let graph = FilterGraph::build(request.resolution, &request.title, font_path);

        let flags = |items: &[&str]| items.iter().map(OsString::from).collect::<Vec<_>>();

        let mut args = flags(&["-y", "-hide_banner", "-loglevel", "error"]);
        args.extend(flags(&["-loop", "1", "-i"]));
        args.push(request.image1_path.clone().into_os_string());
        args.extend(flags(&["-loop", "1", "-i"]));
        args.push(request.image2_path.clone().into_os_string());
        args.push("-filter_complex".into());
        args.push(graph.to_string().into());
        args.extend(flags(&["-map", OUTPUT_LABEL, "-t"]));
        args.push(OUTPUT_DURATION_SECS.to_string().into());
        args.push(request.output_path.clone().into_os_string());

        Self {
            program: program.as_ref().to_os_string(),
            font_path: font_path.to_path_buf(),
            graph,
            args,
        }
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    pub fn font_path(&self) -> &Path {
        &self.font_path
    }

    pub fn filter_graph(&self) -> &FilterGraph {
        &self.graph
    }

    /// Command with stdin closed and both output streams piped for capture.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}
