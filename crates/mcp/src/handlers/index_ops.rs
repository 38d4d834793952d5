#![forbid(unsafe_code)]

use crate::McpServer;
use crate::support::ai::{ai_ok, store_error_response};
use crate::support::args::{args_object, optional_usize, require_string};
use serde_json::{Value, json};

pub(crate) fn docs_list(server: &McpServer, args: &Value) -> Value {
    let args = match args_object(args) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let store = match super::project_store(server, args) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let listing = match store.list() {
        Ok(v) => v,
        Err(err) => return store_error_response(err),
    };

    ai_ok(
        "docs_list",
        json!({
            "documents": listing
                .documents
                .iter()
                .map(|d| json!({
                    "id": d.id.as_str(),
                    "type": d.doc_type.as_str(),
                    "phase": d.phase.as_str(),
                    "title": d.title
                }))
                .collect::<Vec<_>>(),
            "unparseable": listing
                .unparseable
                .iter()
                .map(|u| json!({ "file": u.file_name, "reason": u.reason }))
                .collect::<Vec<_>>()
        }),
    )
}

pub(crate) fn docs_search(server: &McpServer, args: &Value) -> Value {
    let args = match args_object(args) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let store = match super::project_store(server, args) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    // An empty or all-separator query legitimately matches nothing.
    let query = match require_string(args, "query") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let limit = match optional_usize(args, "limit") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let results = match store.search(&query, limit) {
        Ok(v) => v,
        Err(err) => return store_error_response(err),
    };

    ai_ok(
        "docs_search",
        json!({
            "query": query,
            "results": results
                .iter()
                .map(|r| json!({
                    "id": r.id.as_str(),
                    "type": r.doc_type.as_str(),
                    "phase": r.phase.as_str(),
                    "title": r.title,
                    "score": r.score
                }))
                .collect::<Vec<_>>()
        }),
    )
}
