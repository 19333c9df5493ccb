//! Plain-text rendering of a machine's transition tables.

use std::fmt::{Debug, Write};

use ssys_machine::{Handler, Machine, Record, TableIssue};

fn handlers<F: Debug, C: Debug>(handlers: &[Handler<F, C>]) -> String {
    handlers
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Render the open table, the derived close table and the audit findings.
pub fn render<R: Record>(machine: &Machine<R>) -> (String, Vec<TableIssue>) {
    let mut out = String::new();
    let open = machine.open_table();
    let close = machine.close_table();

    // Writing to a String never fails.
    let _ = writeln!(out, "open table ({} entries)", open.len());
    for state in open.states() {
        let _ = writeln!(out, "  {state}");
        for (trigger, rule) in open.triggers(state) {
            let _ = write!(out, "    <{trigger}> -> {}", rule.enter.next);
            if !rule.enter.handlers.is_empty() {
                let _ = write!(out, "  [{}]", handlers(&rule.enter.handlers));
            }
            if !rule.leave.is_empty() {
                let _ = write!(out, "  on leave [{}]", handlers(&rule.leave));
            }
            out.push('\n');
        }
    }

    let _ = writeln!(out, "close table ({} entries)", close.len());
    for state in close.states() {
        let _ = writeln!(out, "  {state}");
        for (trigger, transition) in close.triggers(state) {
            let _ = write!(out, "    </{trigger}> -> {}", transition.next);
            if !transition.handlers.is_empty() {
                let _ = write!(out, "  [{}]", handlers(&transition.handlers));
            }
            out.push('\n');
        }
    }

    let issues = open.audit();
    if issues.is_empty() {
        out.push_str("audit: clean\n");
    }
    for issue in &issues {
        let _ = writeln!(out, "audit: {issue}");
    }
    (out, issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn test_ssys_tables() {
        let (out, issues) = render(ssys_data::ssys_machine().unwrap());
        assert!(issues.is_empty());
        assert!(out.starts_with("open table ("), "{out}");
        assert!(out.contains("\n  start\n    <ssys> -> ssys"), "{out}");
        assert!(out.contains("</ssys> -> start"), "{out}");
        assert!(out.ends_with("audit: clean\n"), "{out}");
    }

    #[test]
    fn test_asset_tables() {
        let (out, issues) = render(ssys_data::asset_machine().unwrap());
        assert!(issues.is_empty());
        assert!(out.contains("<GFX> -> gfx"), "{out}");
        assert!(out.contains("</bar> -> services"), "{out}");
        assert!(out.contains("</bar> -> general"), "{out}");
    }
}
