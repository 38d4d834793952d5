#![forbid(unsafe_code)]

use crate::McpServer;
use crate::support::ai::{ai_ok, edit_error_response, store_error_response};
use crate::support::args::{args_object, require_bool, require_nonempty_string, require_string, require_string_list};
use ns_core::edit;
use ns_core::model::BlockRef;
use serde_json::{Value, json};

pub(crate) fn section_replace(server: &McpServer, args: &Value) -> Value {
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
    let heading = match require_nonempty_string(args, "heading") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    // Empty content is a legal way to clear a section.
    let content = match require_string(args, "content") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let edited = match edit::replace_section(&doc, &heading, &content) {
        Ok(v) => v,
        Err(err) => return edit_error_response(err),
    };
    if let Err(err) = store.save(&edited) {
        return store_error_response(err);
    }

    ai_ok(
        "section_replace",
        json!({
            "document": super::document_json(&edited),
            "heading": heading
        }),
    )
}

pub(crate) fn criterion_set(server: &McpServer, args: &Value) -> Value {
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
    let criterion = match require_nonempty_string(args, "criterion") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let completed = match require_bool(args, "completed") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let edited = match edit::set_criterion(&doc, &criterion, completed) {
        Ok(v) => v,
        Err(err) => return edit_error_response(err),
    };
    if let Err(err) = store.save(&edited) {
        return store_error_response(err);
    }

    let unmet = edited.unmet_criteria();
    ai_ok(
        "criterion_set",
        json!({
            "document": edited.id().as_str(),
            "criterion": criterion.trim(),
            "completed": completed,
            "unmet": unmet
        }),
    )
}

pub(crate) fn blocked_by_set(server: &McpServer, args: &Value) -> Value {
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
    let refs = match require_string_list(args, "blocked_by") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let refs = refs.iter().map(|r| BlockRef::parse(r)).collect::<Vec<_>>();

    let edited = match edit::set_blocked_by(&doc, &refs) {
        Ok(v) => v,
        Err(err) => return edit_error_response(err),
    };
    if let Err(err) = store.save(&edited) {
        return store_error_response(err);
    }

    ai_ok(
        "blocked_by_set",
        json!({
            "document": edited.id().as_str(),
            "blocked_by": edited
                .blocked_by()
                .iter()
                .map(|r| r.as_link())
                .collect::<Vec<_>>()
        }),
    )
}
