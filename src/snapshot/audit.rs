//! Static policy audit over the runtime scripts.
//!
//! Rules are plain `(pattern, message)` data checked against each script's
//! whole content. A violation is reported once per script and rule.
use crate::paths::ProjectPaths;
use crate::util::read_text_if_exists;
use anyhow::Result;
use regex::Regex;
use serde::Serialize;

/// Ordered banned patterns for runtime scripts.
pub const POLICY_RULES: [(&str, &str); 4] = [
    (r#"<<\s*['"]?\w+"#, "heredoc is forbidden in runtime scripts"),
    (r"\bwl-copy\b", "wl-copy forbidden"),
    (r"\bwl-paste\b", "wl-paste forbidden"),
    (
        r"\./FERM_RUNBOOK\.sh\s+clip\b",
        "runbook clip wrapper forbidden in runtime scripts (use xclip directly)",
    ),
];

/// Message recorded when a runtime script does not exist.
pub const MISSING_SCRIPT_MESSAGE: &str = "missing";

#[derive(Debug, Clone)]
pub struct PolicyRule {
    pub pattern: Regex,
    pub message: &'static str,
}

pub fn policy_rules() -> Vec<PolicyRule> {
    POLICY_RULES
        .iter()
        .map(|(pattern, message)| PolicyRule {
            pattern: Regex::new(pattern).expect("regex for policy rule"),
            message: *message,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Script path relative to the project root.
    pub script: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub violations: Vec<Violation>,
}

impl AuditReport {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// `OK`, or `FAIL` followed by one `- <script>: <message>` line per violation.
    pub fn render(&self) -> String {
        if self.passed() {
            return "OK".to_string();
        }
        let mut out = String::from("FAIL");
        for violation in &self.violations {
            out.push_str(&format!("\n- {}: {}", violation.script, violation.message));
        }
        out
    }
}

/// Check a single script's content against `rules`.
pub fn audit_text(script: &str, text: &str, rules: &[PolicyRule]) -> Vec<Violation> {
    rules
        .iter()
        .filter(|rule| rule.pattern.is_match(text))
        .map(|rule| Violation {
            script: script.to_string(),
            message: rule.message.to_string(),
        })
        .collect()
}

/// Audit every runtime script in order; missing scripts are violations.
pub fn audit_runtime_scripts(paths: &ProjectPaths) -> Result<AuditReport> {
    let rules = policy_rules();
    let mut report = AuditReport::default();
    for script in paths.runtime_scripts() {
        let rel = paths.relative(&script);
        let Some(text) = read_text_if_exists(&script)? else {
            report.violations.push(Violation {
                script: rel,
                message: MISSING_SCRIPT_MESSAGE.to_string(),
            });
            continue;
        };
        report.violations.extend(audit_text(&rel, &text, &rules));
    }
    tracing::info!(
        violations = report.violations.len(),
        passed = report.passed(),
        "policy audit complete"
    );
    Ok(report)
}
