#![forbid(unsafe_code)]

mod support;

use serde_json::json;
use support::{Server, assert_error_code, assert_success};

#[test]
fn create_then_gated_transition() {
    let mut server = Server::start_initialized("lifecycle_gates");

    let created = server.call_tool(
        "doc_create",
        json!({
            "project": "acme",
            "doc_type": "strategy",
            "title": "Payments Strategy",
            "risk_level": "high"
        }),
    );
    assert_success(&created);
    assert_eq!(
        created["result"]["document"]["id"],
        json!("payments-strategy")
    );
    assert_eq!(created["result"]["document"]["phase"], json!("draft"));

    // Add an open criterion; the draft->review edge must now fail its gate.
    let set = server.call_tool(
        "criterion_set",
        json!({
            "project": "acme",
            "document": "payments-strategy",
            "criterion": "Scope agreed",
            "completed": false
        }),
    );
    assert_success(&set);

    let check = server.call_tool(
        "transition_check",
        json!({
            "project": "acme",
            "document": "payments-strategy",
            "target_phase": "review"
        }),
    );
    assert_success(&check);
    assert_eq!(check["result"]["allowed"], json!(false));
    assert_eq!(check["result"]["reason"], json!("gates_failed"));
    assert_eq!(check["result"]["unmet_criteria"], json!(["Scope agreed"]));

    let denied = server.call_tool(
        "transition",
        json!({
            "project": "acme",
            "document": "payments-strategy",
            "target_phase": "review"
        }),
    );
    assert_error_code(&denied, "GATE_FAILED");
    assert_eq!(
        denied["error"]["detail"]["unmet_criteria"],
        json!(["Scope agreed"])
    );

    // Completing the criterion opens the gate.
    let set = server.call_tool(
        "criterion_set",
        json!({
            "project": "acme",
            "document": "payments-strategy",
            "criterion": "Scope agreed",
            "completed": true
        }),
    );
    assert_success(&set);

    let moved = server.call_tool(
        "transition",
        json!({
            "project": "acme",
            "document": "payments-strategy",
            "target_phase": "review"
        }),
    );
    assert_success(&moved);
    assert_eq!(moved["result"]["from"], json!("draft"));
    assert_eq!(moved["result"]["to"], json!("review"));
}

#[test]
fn force_bypasses_gates_but_not_the_graph() {
    let mut server = Server::start_initialized("lifecycle_force");

    let created = server.call_tool(
        "doc_create",
        json!({ "project": "acme", "doc_type": "decision", "title": "Pick A Queue" }),
    );
    assert_success(&created);
    let set = server.call_tool(
        "criterion_set",
        json!({
            "project": "acme",
            "document": "pick-a-queue",
            "criterion": "Benchmarks done",
            "completed": false
        }),
    );
    assert_success(&set);

    // Skipping review is structural and force does not help.
    let skipped = server.call_tool(
        "transition",
        json!({
            "project": "acme",
            "document": "pick-a-queue",
            "target_phase": "published",
            "force": true
        }),
    );
    assert_error_code(&skipped, "ILLEGAL_PHASE");

    let forced = server.call_tool(
        "transition",
        json!({
            "project": "acme",
            "document": "pick-a-queue",
            "target_phase": "review",
            "force": true
        }),
    );
    assert_success(&forced);
    assert_eq!(forced["result"]["forced"], json!(true));
    assert_eq!(forced["result"]["to"], json!("review"));
}

#[test]
fn blockers_gate_until_resolved() {
    let mut server = Server::start_initialized("lifecycle_blockers");

    let created = server.call_tool(
        "doc_create",
        json!({ "project": "acme", "doc_type": "task", "title": "Ship Gateway" }),
    );
    assert_success(&created);
    let created = server.call_tool(
        "doc_create",
        json!({ "project": "acme", "doc_type": "task", "title": "Pick Gateway" }),
    );
    assert_success(&created);

    let set = server.call_tool(
        "blocked_by_set",
        json!({
            "project": "acme",
            "document": "ship-gateway",
            "blocked_by": ["[[Pick Gateway]]"]
        }),
    );
    assert_success(&set);
    assert_eq!(set["result"]["blocked_by"], json!(["[[Pick Gateway]]"]));

    let denied = server.call_tool(
        "transition",
        json!({ "project": "acme", "document": "ship-gateway", "target_phase": "active" }),
    );
    assert_error_code(&denied, "GATE_FAILED");
    assert_eq!(
        denied["error"]["detail"]["unresolved_blockers"],
        json!(["[[Pick Gateway]]"])
    );

    // Resolve the blocker by driving it to its terminal phase.
    for target in ["active", "completed"] {
        let moved = server.call_tool(
            "transition",
            json!({ "project": "acme", "document": "pick-gateway", "target_phase": target }),
        );
        assert_success(&moved);
    }

    let moved = server.call_tool(
        "transition",
        json!({ "project": "acme", "document": "ship-gateway", "target_phase": "active" }),
    );
    assert_success(&moved);
}

#[test]
fn blocked_parking_ignores_gates() {
    let mut server = Server::start_initialized("lifecycle_parking");

    let created = server.call_tool(
        "doc_create",
        json!({ "project": "acme", "doc_type": "initiative", "title": "Migration" }),
    );
    assert_success(&created);
    let set = server.call_tool(
        "criterion_set",
        json!({
            "project": "acme",
            "document": "migration",
            "criterion": "Data copied",
            "completed": false
        }),
    );
    assert_success(&set);

    let moved = server.call_tool(
        "transition",
        json!({ "project": "acme", "document": "migration", "target_phase": "active" }),
    );
    // Draft -> active is gated; the open criterion blocks it.
    assert_error_code(&moved, "GATE_FAILED");

    let forced = server.call_tool(
        "transition",
        json!({
            "project": "acme",
            "document": "migration",
            "target_phase": "active",
            "force": true
        }),
    );
    assert_success(&forced);

    // Entering blocked never checks gates.
    let parked = server.call_tool(
        "transition",
        json!({ "project": "acme", "document": "migration", "target_phase": "blocked" }),
    );
    assert_success(&parked);
    assert_eq!(parked["result"]["to"], json!("blocked"));

    let resumed = server.call_tool(
        "transition_check",
        json!({ "project": "acme", "document": "migration", "target_phase": "active" }),
    );
    assert_success(&resumed);
    assert_eq!(resumed["result"]["reason"], json!("gates_failed"));
}

#[test]
fn criteria_check_reports_progress() {
    let mut server = Server::start_initialized("lifecycle_criteria");

    let created = server.call_tool(
        "doc_create",
        json!({ "project": "acme", "doc_type": "task", "title": "Cleanup" }),
    );
    assert_success(&created);
    for (text, completed) in [("Remove flag", true), ("Delete table", false)] {
        let set = server.call_tool(
            "criterion_set",
            json!({
                "project": "acme",
                "document": "cleanup",
                "criterion": text,
                "completed": completed
            }),
        );
        assert_success(&set);
    }

    let check = server.call_tool(
        "criteria_check",
        json!({ "project": "acme", "document": "cleanup" }),
    );
    assert_success(&check);
    assert_eq!(check["result"]["total"], json!(2));
    assert_eq!(check["result"]["completed"], json!(1));
    assert_eq!(check["result"]["unmet"], json!(["Delete table"]));
}

#[test]
fn create_refuses_metadata_injection_via_title() {
    let mut server = Server::start_initialized("lifecycle_title_injection");

    let denied = server.call_tool(
        "doc_create",
        json!({
            "project": "acme",
            "doc_type": "strategy",
            "title": "Evil Doc\nphase: published"
        }),
    );
    assert_error_code(&denied, "INVALID_INPUT");

    let listing = server.call_tool("docs_list", json!({ "project": "acme" }));
    assert_success(&listing);
    assert_eq!(listing["result"]["documents"], json!([]));
}

#[test]
fn projects_are_isolated() {
    let mut server = Server::start_initialized("lifecycle_projects");

    let created = server.call_tool(
        "doc_create",
        json!({ "project": "alpha", "doc_type": "task", "title": "Shared Name" }),
    );
    assert_success(&created);

    let missing = server.call_tool(
        "criteria_check",
        json!({ "project": "beta", "document": "shared-name" }),
    );
    assert_error_code(&missing, "NOT_FOUND");

    let escape = server.call_tool(
        "docs_list",
        json!({ "project": "../alpha" }),
    );
    assert_error_code(&escape, "INVALID_INPUT");
}
