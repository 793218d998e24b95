//! Synchronous helper for auxiliary commands shown in snapshots.
use std::path::Path;
use std::process::Command;
use std::time::Instant;

/// Run `argv` in `cwd` to completion and return `(exit_code, output)`.
///
/// Output is stdout followed by stderr. Failures to spawn are reported as text
/// with exit code 1 rather than as errors; a signal-terminated child reports
/// `-1`.
pub fn run_command(cwd: &Path, argv: &[&str]) -> (i32, String) {
    let Some((program, args)) = argv.split_first() else {
        return (1, "ERROR running []: empty command\n".to_string());
    };
    let start = Instant::now();
    let output = match Command::new(program).args(args).current_dir(cwd).output() {
        Ok(output) => output,
        Err(err) => {
            tracing::warn!(command = ?argv, error = %err, "command failed to start");
            return (1, format!("ERROR running {argv:?}: {err}\n"));
        }
    };
    tracing::debug!(
        command = ?argv,
        elapsed_ms = start.elapsed().as_millis(),
        status = %output.status,
        "command complete"
    );

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    (output.status.code().unwrap_or(-1), text)
}
