#![forbid(unsafe_code)]

use super::*;

fn id(value: &str) -> DocumentId {
    DocumentId::try_new(value).expect("id")
}

const RAW: &str = "---\ntype: strategy\nphase: draft\ntitle: Payments Strategy\nrisk: medium\ncreated: 2026-08-29T12:00:00Z\nblocked_by:\n  - \"[[Gateway Selection]]\"\n  - \"[[Data Residency]]\"\n---\n\nShort summary before the first heading.\n\n## Problem Statement\n\nCheckout drops at the payment step.\n\n## Approach\n\nOne gateway, one retry queue.\n\n## Exit Criteria\n\n- [ ] Define scope\n- [x] Align stakeholders\n";

#[test]
fn parses_all_fields() {
    let doc = parse(id("payments-strategy"), RAW).expect("parse");
    assert_eq!(doc.doc_type(), DocType::Strategy);
    assert_eq!(doc.phase(), Phase::Draft);
    assert_eq!(doc.title(), "Payments Strategy");
    assert_eq!(doc.risk_level(), Some(RiskLevel::Medium));
    assert_eq!(doc.blocked_by().len(), 2);
    assert_eq!(doc.blocked_by()[0].as_str(), "Gateway Selection");
    assert_eq!(doc.sections().len(), 3);
    assert_eq!(
        doc.section("Problem Statement").map(|s| s.body.trim()),
        Some("Checkout drops at the payment step.")
    );
    assert_eq!(doc.exit_criteria().len(), 2);
    assert!(!doc.exit_criteria()[0].completed);
    assert!(doc.exit_criteria()[1].completed);
    assert!(doc.preamble().contains("Short summary"));
}

#[test]
fn round_trip_is_byte_identical() {
    let doc = parse(id("payments-strategy"), RAW).expect("parse");
    assert_eq!(serialize(&doc), RAW);

    let reparsed = parse(doc.id().clone(), serialize(&doc)).expect("reparse");
    assert_eq!(reparsed, doc);
}

#[test]
fn round_trip_preserves_odd_formatting() {
    // Unknown keys, extra spacing, uppercase checkbox, no trailing newline.
    let raw = "---\ntype: task\nphase: draft\ntitle:   Spaced Title\nowner: someone\n---\nleading tail text\n## Exit Criteria\n- [X] Weird case\n\ntrailing tail inside section";
    let doc = parse(id("spaced"), raw).expect("parse");
    assert_eq!(serialize(&doc), raw);
    assert_eq!(doc.title(), "Spaced Title");
    assert_eq!(doc.exit_criteria()[0].text, "Weird case");
    assert!(doc.exit_criteria()[0].completed);
}

#[test]
fn missing_metadata_block() {
    assert_eq!(
        parse(id("x"), "# Just a heading\n").unwrap_err(),
        CodecError::MissingMetadata
    );
    assert_eq!(
        parse(id("x"), "---\ntype: task\nphase: draft\n").unwrap_err(),
        CodecError::UnterminatedMetadata
    );
}

#[test]
fn missing_and_unknown_type() {
    assert_eq!(
        parse(id("x"), "---\nphase: draft\n---\n").unwrap_err(),
        CodecError::MissingType
    );
    assert_eq!(
        parse(id("x"), "---\ntype: epic\nphase: draft\n---\n").unwrap_err(),
        CodecError::UnknownType {
            value: "epic".to_string()
        }
    );
}

#[test]
fn phase_must_be_valid_for_type() {
    assert_eq!(
        parse(id("x"), "---\ntype: vision\n---\n").unwrap_err(),
        CodecError::MissingPhase
    );
    // "active" is a real phase token, but not one a vision may hold.
    assert_eq!(
        parse(id("x"), "---\ntype: vision\nphase: active\n---\n").unwrap_err(),
        CodecError::UnknownPhase {
            doc_type: DocType::Vision,
            value: "active".to_string()
        }
    );
    assert_eq!(
        parse(id("x"), "---\ntype: vision\nphase: cooking\n---\n").unwrap_err(),
        CodecError::UnknownPhase {
            doc_type: DocType::Vision,
            value: "cooking".to_string()
        }
    );
}

#[test]
fn malformed_criterion_reports_line() {
    let raw = "---\ntype: task\nphase: draft\n---\n\n## Exit Criteria\n\n- [?] broken\n";
    assert_eq!(
        parse(id("x"), raw).unwrap_err(),
        CodecError::MalformedCriterion { line: 8 }
    );

    let raw = "---\ntype: task\nphase: draft\n---\n\n## Exit Criteria\n\n- [ ]\n";
    assert!(matches!(
        parse(id("x"), raw).unwrap_err(),
        CodecError::MalformedCriterion { .. }
    ));
}

#[test]
fn crlf_input_is_rejected() {
    // Accepting CRLF would mean the first spliced edit rewrites every line
    // ending in the file; the grammar is LF-only instead.
    let raw = "---\r\ntype: task\r\nphase: draft\r\n---\r\n";
    assert_eq!(
        parse(id("x"), raw).unwrap_err(),
        CodecError::CarriageReturn { line: 1 }
    );

    let raw = "---\ntype: task\nphase: draft\n---\n\n## Notes\n\nbody\r\n";
    assert_eq!(
        parse(id("x"), raw).unwrap_err(),
        CodecError::CarriageReturn { line: 8 }
    );
}

#[test]
fn empty_blocked_by_is_fine() {
    let raw = "---\ntype: task\nphase: draft\nblocked_by:\n---\n";
    let doc = parse(id("x"), raw).expect("parse");
    assert!(doc.blocked_by().is_empty());
}

#[test]
fn duplicate_blockers_collapse() {
    let raw = "---\ntype: task\nphase: draft\nblocked_by:\n  - \"[[Same]]\"\n  - \"[[Same]]\"\n---\n";
    let doc = parse(id("x"), raw).expect("parse");
    assert_eq!(doc.blocked_by().len(), 1);
    assert_eq!(serialize(&doc), raw);
}

#[test]
fn unquoted_and_bare_blockers_are_tolerated() {
    let raw = "---\ntype: task\nphase: draft\nblocked_by:\n  - [[Linked Doc]]\n  - Bare Title\n---\n";
    let doc = parse(id("x"), raw).expect("parse");
    let refs = doc
        .blocked_by()
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>();
    assert_eq!(refs, vec!["Linked Doc", "Bare Title"]);
}

#[test]
fn checklist_outside_exit_criteria_is_plain_body() {
    let raw = "---\ntype: task\nphase: draft\n---\n\n## Plan\n\n- [?] not a criterion, just text\n";
    let doc = parse(id("x"), raw).expect("parse");
    assert!(doc.exit_criteria().is_empty());
    assert!(doc.section("Plan").is_some());
}

#[test]
fn deeper_headings_stay_in_section_bodies() {
    let raw = "---\ntype: vision\nphase: draft\n---\n\n## Purpose\n\n### Details\n\nnested\n";
    let doc = parse(id("x"), raw).expect("parse");
    assert_eq!(doc.sections().len(), 1);
    assert!(doc.section("Purpose").expect("section").body.contains("### Details"));
}

#[test]
fn duplicate_criterion_text_keeps_first() {
    let raw = "---\ntype: task\nphase: draft\n---\n\n## Exit Criteria\n\n- [ ] Same\n- [x] Same\n";
    let doc = parse(id("x"), raw).expect("parse");
    assert_eq!(doc.exit_criteria().len(), 1);
    assert!(!doc.exit_criteria()[0].completed);
    assert_eq!(serialize(&doc), raw);
}
