#![forbid(unsafe_code)]

use ns_core::codec::EXIT_CRITERIA_HEADING;
use ns_core::model::{DocType, RiskLevel};
use ns_core::phases;
use std::fmt::Write as _;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Section skeleton for a new document of the given type.
fn section_headings(doc_type: DocType) -> &'static [&'static str] {
    match doc_type {
        DocType::Vision => &["Purpose", "Current State", "Future State"],
        DocType::Strategy => &["Problem Statement", "Approach", "Risks"],
        DocType::Initiative => &["Context", "Plan"],
        DocType::Task => &["Objective", "Notes"],
        DocType::Decision => &["Context", "Decision", "Consequences"],
    }
}

pub(crate) fn render(doc_type: DocType, title: &str, risk_level: Option<RiskLevel>) -> String {
    let created = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string());

    let mut out = String::new();
    out.push_str("---\n");
    let _ = writeln!(out, "type: {}", doc_type.as_str());
    let _ = writeln!(out, "phase: {}", phases::initial_phase(doc_type).as_str());
    let _ = writeln!(out, "title: {}", title.trim());
    if let Some(risk) = risk_level {
        let _ = writeln!(out, "risk: {}", risk.as_str());
    }
    let _ = writeln!(out, "created: {created}");
    out.push_str("---\n");

    let _ = write!(out, "\n# {}\n", title.trim());
    for heading in section_headings(doc_type) {
        let _ = write!(out, "\n## {heading}\n");
    }
    let _ = write!(out, "\n## {EXIT_CRITERIA_HEADING}\n");
    out
}
