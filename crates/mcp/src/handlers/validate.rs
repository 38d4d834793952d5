#![forbid(unsafe_code)]

use crate::McpServer;
use crate::support::ai::{ai_ok, store_error_response};
use crate::support::args::args_object;
use ns_core::codec;
use serde_json::{Value, json};

/// Validation reports parse failures as a result, not as a tool error;
/// only a missing file or an io failure is an error here.
pub(crate) fn doc_validate(server: &McpServer, args: &Value) -> Value {
    let args = match args_object(args) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let store = match super::project_store(server, args) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let id = match super::document_id_arg(args) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let raw = match store.read_raw(&id) {
        Ok(v) => v,
        Err(err) => return store_error_response(err),
    };

    match codec::parse(id, &raw) {
        Ok(doc) => ai_ok(
            "doc_validate",
            json!({
                "valid": true,
                "errors": [],
                "document": super::document_json(&doc)
            }),
        ),
        Err(err) => ai_ok(
            "doc_validate",
            json!({
                "valid": false,
                "errors": [err.to_string()],
                "document": null
            }),
        ),
    }
}

pub(crate) fn criteria_check(server: &McpServer, args: &Value) -> Value {
    let args = match args_object(args) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let store = match super::project_store(server, args) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let doc = match super::load_document(&store, args) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let total = doc.exit_criteria().len();
    let unmet = doc.unmet_criteria();
    ai_ok(
        "criteria_check",
        json!({
            "document": doc.id().as_str(),
            "total": total,
            "completed": total - unmet.len(),
            "unmet": unmet,
            "criteria": doc
                .exit_criteria()
                .iter()
                .map(|c| json!({ "text": c.text, "completed": c.completed }))
                .collect::<Vec<_>>()
        }),
    )
}
