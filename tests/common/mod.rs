//! Shared test infrastructure for integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub const STARTUP_REL: &str = "FERM_RUNBOOK_SH/90_startup.sh";
pub const EXIT_REL: &str = "FERM_RUNBOOK_SH/91_exit.sh";
pub const RUNBOOK_REL: &str = "FERM_RUNBOOK.sh";
pub const RUNLOG_DIR_REL: &str = "_drive_stage/runlogs";

/// Throwaway runbook tree rooted in a temp directory.
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    /// Tree with policy-clean runtime scripts and no run logs.
    pub fn clean() -> Self {
        let fixture = Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        };
        fixture.write(STARTUP_REL, "#!/bin/sh\necho \"startup\"\n");
        fixture.write(EXIT_REL, "#!/bin/sh\necho \"exit\"\n");
        fixture.write(RUNBOOK_REL, "#!/bin/sh\nxclip -selection clipboard -o\n");
        fixture
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    pub fn write(&self, rel: &str, contents: &str) {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent directory");
        }
        std::fs::write(&path, contents.as_bytes()).expect("write file");
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path(rel)).expect("read file")
    }

    /// Write a run log with `lines` numbered lines and return its relative path.
    pub fn write_run_log(&self, stamp: &str, lines: usize) -> String {
        let rel = format!("{RUNLOG_DIR_REL}/run.{stamp}.log");
        self.write(&rel, &numbered_lines(lines));
        rel
    }

    /// Run the `runbook` binary against this tree.
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_runbook"))
            .arg("--root")
            .arg(self.root())
            .args(args)
            .env_remove("RUST_LOG")
            .output()
            .expect("run runbook")
    }
}

pub fn numbered_lines(count: usize) -> String {
    (1..=count).map(|n| format!("log line {n}\n")).collect()
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
