#![forbid(unsafe_code)]

use crate::McpServer;
use crate::support::ai::{ai_error, ai_ok, store_error_response};
use crate::support::args::{args_object, optional_string, require_nonempty_string};
use ns_core::model::{DocType, RiskLevel};
use serde_json::{Value, json};

pub(crate) fn doc_create(server: &McpServer, args: &Value) -> Value {
    let args = match args_object(args) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let store = match super::project_store(server, args) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let doc_type = match require_nonempty_string(args, "doc_type") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(doc_type) = DocType::parse(&doc_type) else {
        return ai_error(
            "INVALID_INPUT",
            "doc_type must be one of: vision|strategy|initiative|task|decision",
        );
    };

    let title = match require_nonempty_string(args, "title") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let risk_level = match optional_string(args, "risk_level") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let risk_level = match risk_level {
        None => None,
        Some(raw) => match RiskLevel::parse(&raw) {
            Some(v) => Some(v),
            None => {
                return ai_error("INVALID_INPUT", "risk_level must be one of: low|medium|high");
            }
        },
    };

    match store.create(doc_type, &title, risk_level) {
        Ok(doc) => ai_ok(
            "doc_create",
            json!({
                "document": super::document_json(&doc),
                "file": format!("{}.md", doc.id())
            }),
        ),
        Err(err) => store_error_response(err),
    }
}
