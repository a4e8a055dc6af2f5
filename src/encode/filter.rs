//! `-filter_complex` graph for the two-image title card.

use std::{fmt, path::Path};

use crate::foundation::resolution::Resolution;

/// Label of the final stage; passed to `-map`.
pub const OUTPUT_LABEL: &str = "[titled]";

pub const TITLE_FONT_SIZE: u32 = 30;
pub const TITLE_FONT_COLOR: &str = "white";
pub const TITLE_TOP_MARGIN_PX: u32 = 10;

/// The four chained stages: scale both inputs, overlay the second onto the first,
/// draw the title centered near the top.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterGraph {
    stages: [String; 4],
}

impl FilterGraph {
    pub fn build(resolution: Resolution, title: &str, font_path: &Path) -> Self {
        let font = font_path.to_string_lossy();
        Self {
            stages: [
                format!("[0:v]scale={resolution}[scaled1]"),
                format!("[1:v]scale={resolution}[scaled2]"),
                "[scaled1][scaled2]overlay=0:0[merged]".to_string(),
                // `expansion=none` keeps `%` and `\` in the title literal.
                format!(
                    "[merged]drawtext=text={}:fontfile={}:expansion=none:fontsize={TITLE_FONT_SIZE}:\
                     fontcolor={TITLE_FONT_COLOR}:x=(w-text_w)/2:y={TITLE_TOP_MARGIN_PX}{OUTPUT_LABEL}",
                    escape_drawtext(title),
                    escape_drawtext(&font),
                ),
            ],
        }
    }

    pub fn stages(&self) -> &[String] {
        &self.stages
    }
}

impl fmt::Display for FilterGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stages.join(";"))
    }
}

/// Escape a drawtext option value so it survives both parsing passes.
///
/// The filter's option parser splits on `:` and unescapes `\x`, so `\`, `'` and `:`
/// are backslash-escaped first. The graph parser then unquotes the whole filter
/// argument string, so the result is wrapped in single quotes, with any `'` written
/// as `'\''`.
pub fn escape_drawtext(value: &str) -> String {
    quote_for_graph(&escape_for_options(value))
}

/// Whitespace the tokenizer strips from both ends of an unescaped value.
const TOKEN_WHITESPACE: [char; 4] = [' ', '\n', '\t', '\r'];

fn escape_for_options(value: &str) -> String {
    let core_start = value.len() - value.trim_start_matches(TOKEN_WHITESPACE).len();
    let core_end = value.trim_end_matches(TOKEN_WHITESPACE).len();

    let mut out = String::with_capacity(value.len());
    for (i, ch) in value.char_indices() {
        let edge_space = (i < core_start || i >= core_end) && TOKEN_WHITESPACE.contains(&ch);
        if edge_space || matches!(ch, '\\' | '\'' | ':') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn quote_for_graph(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}
