mod common;

use common::{numbered_lines, stderr, stdout, ProjectFixture, RUNBOOK_REL, STARTUP_REL};

const HEREDOC_MESSAGE: &str = "heredoc is forbidden in runtime scripts";

#[test]
fn snapshot_header_has_mode_and_offset_timestamp() {
    let fixture = ProjectFixture::clean();
    let output = fixture.run(&["snapshot", "--no-git", "--mode", "exit"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let text = stdout(&output);
    let header = text.lines().next().expect("header line");
    assert!(header.starts_with("=== SESSION SNAPSHOT (exit) "), "{header}");
    let stamp = header
        .trim_start_matches("=== SESSION SNAPSHOT (exit) ")
        .trim_end_matches(" ===");
    let parsed = chrono::DateTime::parse_from_rfc3339(stamp).expect("rfc3339 timestamp");
    assert_eq!(parsed.timestamp_subsec_nanos(), 0);
    assert!(!stamp.contains('.'));
}

#[test]
fn head_mode_renders_exactly_n_lines() {
    let fixture = ProjectFixture::clean();
    fixture.write("notes/big.md", &numbered_lines(500));
    fixture.write("FERM_RUNBOOK_SH/startup_includes.txt", "# includes\nnotes/big.md head-50\n");

    let output = fixture.run(&["snapshot", "--no-git"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);

    let (_, section) = text
        .split_once("--- FILE: notes/big.md [head-50] ---\n")
        .expect("include section");
    let (body, _) = section.split_once("\n\n--- POLICY AUDIT ---").expect("audit section");
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 50);
    assert_eq!(lines[49], "log line 50");
}

#[test]
fn default_includes_render_when_list_is_missing() {
    let fixture = ProjectFixture::clean();
    fixture.write("APPENDIX_MAP.md", "appendix\n");

    let output = fixture.run(&["snapshot", "--no-git"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);

    assert!(text.contains("--- FILE: STRUCTURE.md [head-200] ---\n"));
    assert!(text.contains("--- FILE: APPENDIX_MAP.md [full] ---\nappendix\n"));
    assert!(text.contains("--- FILE: CHECKSUMS.sha256 [head-200] ---\n"));
}

#[test]
fn snapshot_reports_policy_failures_without_failing() {
    let fixture = ProjectFixture::clean();
    fixture.write(STARTUP_REL, "#!/bin/sh\ncat <<EOF\nhello\nEOF\n");

    let output = fixture.run(&["snapshot", "--no-git"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains(&format!(
        "--- POLICY AUDIT ---\nFAIL\n- {STARTUP_REL}: {HEREDOC_MESSAGE}\n"
    )));
}

#[test]
fn snapshot_writes_out_file() {
    let fixture = ProjectFixture::clean();
    let out = fixture.path("reports/snapshot.txt");

    let output = fixture.run(&["snapshot", "--no-git", "--out", out.to_str().expect("utf-8 path")]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).is_empty());
    let text = std::fs::read_to_string(&out).expect("read snapshot");
    assert!(text.ends_with("--- POLICY AUDIT ---\nOK\n"));
}

#[test]
fn include_paths_with_spaces_render() {
    let fixture = ProjectFixture::clean();
    fixture.write("My Notes.md", "remember the milk\n");
    fixture.write("RUNBOOK.md", "runbook\n");
    fixture.write("FERM_RUNBOOK_SH/startup_includes.txt", "My Notes.md\nRUNBOOK.md\n");

    let output = fixture.run(&["snapshot", "--no-git"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("--- FILE: My Notes.md [head-200] ---\nremember the milk\n"));
    assert!(text.contains("--- FILE: RUNBOOK.md [head-200] ---\nrunbook\n"));
}

#[test]
fn audit_command_fails_on_violations() {
    let fixture = ProjectFixture::clean();
    fixture.write(RUNBOOK_REL, "#!/bin/sh\nprintf x | wl-copy\n./FERM_RUNBOOK.sh clip out.txt\n");

    let first = fixture.run(&["audit"]);
    let second = fixture.run(&["audit"]);
    assert!(!first.status.success());
    assert_eq!(stdout(&first), stdout(&second));
    assert_eq!(
        stdout(&first),
        format!(
            "FAIL\n- {RUNBOOK_REL}: wl-copy forbidden\n- {RUNBOOK_REL}: runbook clip wrapper forbidden in runtime scripts (use xclip directly)\n"
        )
    );
}

#[test]
fn audit_json_lists_missing_scripts() {
    let fixture = ProjectFixture::clean();
    std::fs::remove_file(fixture.path("FERM_RUNBOOK_SH/91_exit.sh")).expect("remove exit script");

    let output = fixture.run(&["audit", "--json"]);
    assert!(!output.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("audit JSON");
    assert_eq!(value["passed"], serde_json::Value::Bool(false));
    assert_eq!(value["violations"][0]["script"], "FERM_RUNBOOK_SH/91_exit.sh");
    assert_eq!(value["violations"][0]["message"], "missing");
}

#[test]
fn clean_tree_passes_audit() {
    let fixture = ProjectFixture::clean();
    let output = fixture.run(&["audit"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "OK\n");
}
