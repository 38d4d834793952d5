#![forbid(unsafe_code)]

use ns_core::edit::EditError;
use ns_core::phases::TransitionError;
use ns_storage::StoreError;
use serde_json::{Value, json};

pub(crate) fn ai_ok(intent: &str, result: Value) -> Value {
    json!({
        "success": true,
        "intent": intent,
        "result": result,
        "warnings": [],
        "error": null
    })
}

pub(crate) fn ai_error(code: &str, message: &str) -> Value {
    ai_error_with(code, message, None, Value::Null)
}

pub(crate) fn ai_error_with(
    code: &str,
    message: &str,
    recovery: Option<&str>,
    detail: Value,
) -> Value {
    let mut error_obj = serde_json::Map::new();
    error_obj.insert("code".to_string(), Value::String(code.to_string()));
    error_obj.insert(
        "message".to_string(),
        Value::String(message.trim().to_string()),
    );
    if let Some(recovery) = recovery {
        error_obj.insert(
            "recovery".to_string(),
            Value::String(recovery.trim().to_string()),
        );
    }
    if !detail.is_null() {
        error_obj.insert("detail".to_string(), detail);
    }

    json!({
        "success": false,
        "intent": "error",
        "result": {},
        "warnings": [],
        "error": Value::Object(error_obj)
    })
}

pub(crate) fn store_error_response(err: StoreError) -> Value {
    match err {
        StoreError::NotFound { id } => ai_error("NOT_FOUND", &format!("document not found: {id}")),
        StoreError::AlreadyExists { id } => ai_error_with(
            "ALREADY_EXISTS",
            &format!("document already exists: {id}"),
            Some("Pick a different title or edit the existing document."),
            Value::Null,
        ),
        StoreError::Codec { id, error } => ai_error(
            "PARSE_ERROR",
            &format!("document {id} failed to parse: {error}"),
        ),
        StoreError::InvalidId(err) => ai_error("INVALID_INPUT", &err.to_string()),
        StoreError::InvalidTitle => ai_error("INVALID_INPUT", "title must be a single line"),
        StoreError::Io(err) => ai_error("STORE_ERROR", &format!("io: {err}")),
    }
}

pub(crate) fn edit_error_response(err: EditError) -> Value {
    match err {
        EditError::HeadingNotFound { heading } => ai_error_with(
            "HEADING_NOT_FOUND",
            &format!("no section with heading {heading:?}"),
            Some("Pass the heading text exactly as it appears after '## ' (case-sensitive)."),
            Value::Null,
        ),
        EditError::InvalidCriterion { text } => {
            ai_error("INVALID_INPUT", &format!("invalid criterion text: {text:?}"))
        }
        EditError::InvalidReference { reference } => ai_error(
            "INVALID_INPUT",
            &format!("invalid blocked_by reference: {reference:?}"),
        ),
        EditError::Codec(err) => ai_error(
            "PARSE_ERROR",
            &format!("edit result failed to parse: {err}"),
        ),
    }
}

pub(crate) fn transition_error_response(err: TransitionError) -> Value {
    match err {
        TransitionError::IllegalPhase { from, target } => ai_error(
            "ILLEGAL_PHASE",
            &format!("no transition from {from} to {target}"),
        ),
        TransitionError::GateFailed {
            unmet_criteria,
            unresolved_blockers,
        } => ai_error_with(
            "GATE_FAILED",
            "transition gates failed",
            Some("Complete the listed criteria and resolve blockers, or pass force=true."),
            json!({
                "unmet_criteria": unmet_criteria,
                "unresolved_blockers": unresolved_blockers
            }),
        ),
    }
}
