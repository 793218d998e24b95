//! Include list parsing and bounded file reads for snapshots.
//!
//! Each non-comment line of the include list is `<path> [full|head-N]`. The mode
//! defaults to `head-200`, matching how most runbook docs are only skimmed.
//! Reads normalize CRLF line endings.
use crate::util::read_text_if_exists;
use anyhow::{anyhow, Context, Result};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

/// Lines kept for entries without an explicit mode.
pub const DEFAULT_HEAD_LINES: usize = 200;

const DEFAULT_INCLUDES: [(&str, IncludeMode); 6] = [
    ("STRUCTURE.md", IncludeMode::Head(DEFAULT_HEAD_LINES)),
    ("PROJECT_STATE.md", IncludeMode::Head(DEFAULT_HEAD_LINES)),
    ("RUNBOOK.md", IncludeMode::Head(DEFAULT_HEAD_LINES)),
    ("APPENDIX_MAP.md", IncludeMode::Full),
    ("FERM_RUNBOOK.sh", IncludeMode::Head(DEFAULT_HEAD_LINES)),
    ("CHECKSUMS.sha256", IncludeMode::Head(DEFAULT_HEAD_LINES)),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeMode {
    Full,
    Head(usize),
}

impl IncludeMode {
    pub fn parse(token: &str) -> Result<Self> {
        if token == "full" {
            return Ok(IncludeMode::Full);
        }
        let count = token
            .strip_prefix("head-")
            .ok_or_else(|| anyhow!("unknown include mode `{token}` (expected full or head-N)"))?;
        let lines: usize = count
            .parse()
            .map_err(|_| anyhow!("invalid line count in include mode `{token}`"))?;
        if lines == 0 {
            return Err(anyhow!("include mode `{token}` must keep at least one line"));
        }
        Ok(IncludeMode::Head(lines))
    }
}

impl fmt::Display for IncludeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncludeMode::Full => write!(f, "full"),
            IncludeMode::Head(lines) => write!(f, "head-{lines}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeEntry {
    pub path: PathBuf,
    pub mode: IncludeMode,
}

impl IncludeEntry {
    /// Parse one include-list line; `None` for blanks and comments.
    ///
    /// A trailing `full` or `head-N` token sets the mode. Anything else is
    /// part of the path, so names containing spaces keep working.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let default_mode = IncludeMode::Head(DEFAULT_HEAD_LINES);
        let (path, mode) = match line.rsplit_once(char::is_whitespace) {
            Some((path, token)) => match IncludeMode::parse(token) {
                Ok(mode) => (path.trim_end(), mode),
                Err(err) => {
                    if token.starts_with("head-") {
                        tracing::warn!(line, error = %err, "ignoring include mode");
                        (path.trim_end(), default_mode)
                    } else {
                        (line, default_mode)
                    }
                }
            },
            None => (line, default_mode),
        };
        Some(IncludeEntry {
            path: PathBuf::from(path),
            mode,
        })
    }
}

pub fn default_includes() -> Vec<IncludeEntry> {
    DEFAULT_INCLUDES
        .iter()
        .map(|(path, mode)| IncludeEntry {
            path: PathBuf::from(path),
            mode: *mode,
        })
        .collect()
}

/// Parse an include list, keeping order and duplicates.
pub fn parse_include_list(text: &str) -> Vec<IncludeEntry> {
    text.lines().filter_map(IncludeEntry::parse_line).collect()
}

/// Load the include list at `path`, falling back to the built-in defaults
/// when the file does not exist.
pub fn load_includes(path: &Path) -> Result<Vec<IncludeEntry>> {
    let Some(text) = read_text_if_exists(path)? else {
        tracing::info!(path = %path.display(), "include list missing; using defaults");
        return Ok(default_includes());
    };
    Ok(parse_include_list(&text))
}

/// First `lines` lines of `path`, trailing newlines trimmed; `""` if missing.
///
/// Stops reading after `lines` lines, so large logs stay cheap.
pub fn head_text(path: &Path, lines: usize) -> Result<String> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(String::new()),
        Err(err) => return Err(err).with_context(|| format!("read {}", path.display())),
    };
    let mut reader = BufReader::new(file);
    let mut head = String::new();
    let mut buf = Vec::new();
    for _ in 0..lines {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if read == 0 {
            break;
        }
        head.push_str(&String::from_utf8_lossy(&buf));
    }
    Ok(normalize_newlines(&head).trim_end_matches('\n').to_string())
}

/// Whole content of `path`, trailing newlines trimmed; `""` if missing.
pub fn full_text(path: &Path) -> Result<String> {
    let text = read_text_if_exists(path)?.unwrap_or_default();
    Ok(normalize_newlines(&text).trim_end_matches('\n').to_string())
}

/// Turn `\r\n` and lone `\r` line endings into `\n`.
fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Read `path` according to `mode`.
pub fn render_include(path: &Path, mode: IncludeMode) -> Result<String> {
    match mode {
        IncludeMode::Full => full_text(path),
        IncludeMode::Head(lines) => head_text(path, lines),
    }
}

#[cfg(test)]
#[path = "includes_tests.rs"]
mod tests;
