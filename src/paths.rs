//! Typed paths into a runbook project tree.
//!
//! Every operation receives a `ProjectPaths` instead of reading a global root,
//! so tests can point the tools at a throwaway tree.
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Startup script that receives the run-log block.
pub const STARTUP_SCRIPT_REL: &str = "FERM_RUNBOOK_SH/90_startup.sh";
/// Exit script run at session end.
pub const EXIT_SCRIPT_REL: &str = "FERM_RUNBOOK_SH/91_exit.sh";
/// Top-level runbook entrypoint.
pub const RUNBOOK_SCRIPT_REL: &str = "FERM_RUNBOOK.sh";
/// Directory where `run.<timestamp>.log` files are written.
pub const RUNLOG_DIR_REL: &str = "_drive_stage/runlogs";
/// Snapshot include list.
pub const INCLUDES_LIST_REL: &str = "FERM_RUNBOOK_SH/startup_includes.txt";

#[derive(Debug, Clone)]
pub struct ProjectPaths {
    root: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Canonicalize `root` once so relative display paths are stable.
    pub fn resolve(root: &Path) -> Result<Self> {
        let root = root
            .canonicalize()
            .with_context(|| format!("resolve project root {}", root.display()))?;
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn startup_script(&self) -> PathBuf {
        self.root.join(STARTUP_SCRIPT_REL)
    }

    pub fn exit_script(&self) -> PathBuf {
        self.root.join(EXIT_SCRIPT_REL)
    }

    pub fn runbook_script(&self) -> PathBuf {
        self.root.join(RUNBOOK_SCRIPT_REL)
    }

    pub fn runlog_dir(&self) -> PathBuf {
        self.root.join(RUNLOG_DIR_REL)
    }

    pub fn includes_list(&self) -> PathBuf {
        self.root.join(INCLUDES_LIST_REL)
    }

    /// Runtime scripts subject to the policy audit, in audit order.
    pub fn runtime_scripts(&self) -> Vec<PathBuf> {
        vec![self.startup_script(), self.exit_script(), self.runbook_script()]
    }

    /// Join a project-relative path (absolute paths are kept as-is).
    pub fn join(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.root.join(rel)
    }

    /// Render `path` relative to the root when it lives under it.
    pub fn relative(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(relative) => relative.display().to_string(),
            Err(_) => path.display().to_string(),
        }
    }
}
