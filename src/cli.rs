//! CLI argument parsing for the runbook maintenance tools.
//!
//! The CLI stays thin: it resolves the project root and hands typed options to
//! the command modules, so every operation can be driven from tests directly.
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "runbook",
    version,
    about = "Maintenance tools for FERM runbook trees",
    after_help = "Commands:\n  inject-log   Re-inject the latest run-log tail block into 90_startup.sh\n  snapshot     Print a session snapshot (includes + policy audit)\n  audit        Check runtime scripts against the policy rules\n\nExamples:\n  runbook --root ~/ferm inject-log\n  runbook snapshot --mode exit --out /tmp/snapshot.txt\n  runbook audit --json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Project root containing FERM_RUNBOOK.sh and FERM_RUNBOOK_SH/
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Log progress to stderr (RUST_LOG overrides)
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    InjectLog(InjectLogArgs),
    Snapshot(SnapshotArgs),
    Audit(AuditArgs),
}

/// Inputs for rewriting the startup script's run-log block.
#[derive(Parser, Debug)]
#[command(about = "Replace the latest RUN_AND_CLIP log block in 90_startup.sh")]
pub struct InjectLogArgs {
    /// Print the rewritten script instead of writing it
    #[arg(long)]
    pub dry_run: bool,

    /// Copy the target to <target>.bak before overwriting
    #[arg(long, conflicts_with = "dry_run")]
    pub backup: bool,
}

/// Inputs for assembling a session snapshot.
#[derive(Parser, Debug)]
#[command(about = "Assemble a session snapshot of project files and audit results")]
pub struct SnapshotArgs {
    /// Session phase recorded in the snapshot header
    #[arg(long, value_enum, default_value_t = SnapshotMode::Startup)]
    pub mode: SnapshotMode,

    /// Include list to use instead of FERM_RUNBOOK_SH/startup_includes.txt
    #[arg(long, value_name = "PATH")]
    pub includes: Option<PathBuf>,

    /// Write the snapshot to a file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Skip the git status section
    #[arg(long)]
    pub no_git: bool,
}

/// Inputs for the standalone policy audit.
#[derive(Parser, Debug)]
#[command(about = "Audit runtime scripts for forbidden constructs")]
pub struct AuditArgs {
    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

/// Session phase a snapshot is taken for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SnapshotMode {
    Startup,
    Exit,
}

impl SnapshotMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SnapshotMode::Startup => "startup",
            SnapshotMode::Exit => "exit",
        }
    }
}
