//! Session snapshot assembly.
//!
//! A snapshot is a plain-text digest: a timestamped header, the configured
//! include files, optional git state, and the runtime-script policy audit.
//! Missing includes render as empty sections so a half-built tree still
//! produces a full report.
use crate::cli::SnapshotMode;
use crate::exec::run_command;
use crate::paths::ProjectPaths;
use anyhow::Result;
use chrono::{DateTime, FixedOffset, SecondsFormat};

pub mod audit;
pub mod includes;
pub mod secrets;

pub use audit::audit_runtime_scripts;
pub use includes::{load_includes, IncludeEntry};
pub use secrets::is_secret_like;

/// Placeholder emitted instead of the content of secret-like includes.
pub const REDACTED_PLACEHOLDER: &str = "[redacted: secret-like file]";

/// Heading of the git section; command output lists stdout before stderr.
pub const GIT_SECTION_HEADER: &str = "--- GIT (stdout, then stderr) ---";

const GIT_COMMANDS: [&[&str]; 2] = [
    &["git", "status", "--short"],
    &["git", "log", "-1", "--oneline"],
];

pub struct SnapshotRequest<'a> {
    pub paths: &'a ProjectPaths,
    pub includes: &'a [IncludeEntry],
    pub mode: SnapshotMode,
    pub now: DateTime<FixedOffset>,
    pub git: bool,
}

/// Build the snapshot text. Output depends only on the tree and `now`.
pub fn build_snapshot(request: &SnapshotRequest<'_>) -> Result<String> {
    let paths = request.paths;
    let mut out = String::new();
    push_line(
        &mut out,
        &format!(
            "=== SESSION SNAPSHOT ({}) {} ===",
            request.mode.as_str(),
            request.now.to_rfc3339_opts(SecondsFormat::Secs, false)
        ),
    );
    push_line(&mut out, &format!("ROOT: {}", paths.root().display()));

    for entry in request.includes {
        out.push('\n');
        push_line(
            &mut out,
            &format!("--- FILE: {} [{}] ---", entry.path.display(), entry.mode),
        );
        let body = if is_secret_like(&entry.path) {
            tracing::warn!(path = %entry.path.display(), "redacting secret-like include");
            REDACTED_PLACEHOLDER.to_string()
        } else {
            includes::render_include(&paths.join(&entry.path), entry.mode)?
        };
        if !body.is_empty() {
            push_line(&mut out, &body);
        }
    }

    if request.git {
        out.push('\n');
        push_line(&mut out, GIT_SECTION_HEADER);
        for argv in GIT_COMMANDS {
            let (code, output) = run_command(paths.root(), argv);
            push_line(&mut out, &format!("$ {}", argv.join(" ")));
            let output = output.trim_end_matches('\n');
            if !output.is_empty() {
                push_line(&mut out, output);
            }
            push_line(&mut out, &format!("(exit {code})"));
        }
    }

    let report = audit_runtime_scripts(paths)?;
    out.push('\n');
    push_line(&mut out, "--- POLICY AUDIT ---");
    push_line(&mut out, &report.render());
    Ok(out)
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}
