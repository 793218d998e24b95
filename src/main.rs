use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::process::ExitCode;

mod cli;
mod exec;
mod inject;
mod paths;
mod runlog;
mod snapshot;
mod util;

use cli::{AuditArgs, Command, InjectLogArgs, RootArgs, SnapshotArgs};
use inject::{inject_latest_log, InjectOptions};
use paths::ProjectPaths;
use snapshot::audit::Violation;
use snapshot::{audit_runtime_scripts, build_snapshot, load_includes, SnapshotRequest};

#[derive(Serialize)]
struct AuditJson<'a> {
    passed: bool,
    violations: &'a [Violation],
}

fn main() -> Result<ExitCode> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    let paths = ProjectPaths::resolve(&args.root)?;
    tracing::debug!(root = %paths.root().display(), "resolved project root");

    match args.command {
        Command::InjectLog(cmd) => cmd_inject_log(&paths, cmd),
        Command::Snapshot(cmd) => cmd_snapshot(&paths, cmd),
        Command::Audit(cmd) => cmd_audit(&paths, cmd),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_inject_log(paths: &ProjectPaths, args: InjectLogArgs) -> Result<ExitCode> {
    let outcome = inject_latest_log(
        paths,
        InjectOptions {
            dry_run: args.dry_run,
            backup: args.backup,
        },
    )?;

    if args.dry_run {
        print!("{}", outcome.content);
        return Ok(ExitCode::SUCCESS);
    }

    let target = paths.relative(&outcome.target);
    match &outcome.latest {
        Some(log) => println!("Latest run log: {}", paths.relative(&log.path)),
        None => println!("No run log found under {}", paths::RUNLOG_DIR_REL),
    }
    if let Some(backup) = &outcome.backup {
        println!("Backed up {target} to {}", paths.relative(backup));
    }
    if outcome.changed {
        println!("Updated {target}");
    } else {
        println!("{target} already up to date");
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_snapshot(paths: &ProjectPaths, args: SnapshotArgs) -> Result<ExitCode> {
    let includes_path = match &args.includes {
        Some(path) => path.clone(),
        None => paths.includes_list(),
    };
    let includes = load_includes(&includes_path)?;
    let text = build_snapshot(&SnapshotRequest {
        paths,
        includes: &includes,
        mode: args.mode,
        now: chrono::Local::now().fixed_offset(),
        git: !args.no_git,
    })?;

    match &args.out {
        Some(out) => {
            util::write_text(out, &text)?;
            eprintln!("Wrote snapshot to {}", out.display());
        }
        None => print!("{text}"),
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_audit(paths: &ProjectPaths, args: AuditArgs) -> Result<ExitCode> {
    let report = audit_runtime_scripts(paths)?;
    if args.json {
        let out = AuditJson {
            passed: report.passed(),
            violations: &report.violations,
        };
        let json = serde_json::to_string_pretty(&out).context("serialize audit report")?;
        println!("{json}");
    } else {
        println!("{}", report.render());
    }
    Ok(if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
