#![forbid(unsafe_code)]

use crate::McpServer;
use crate::support::ai::{ai_ok, store_error_response, transition_error_response};
use crate::support::args::{args_object, optional_bool};
use ns_core::phases;
use serde_json::{Value, json};

pub(crate) fn transition_check(server: &McpServer, args: &Value) -> Value {
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
    let target = match super::phase_arg(args, "target_phase") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let resolver = match store.resolver() {
        Ok(v) => v,
        Err(err) => return store_error_response(err),
    };

    let report = phases::check_transition(&doc, target, |r| resolver.resolve(r));
    ai_ok(
        "transition_check",
        json!({
            "document": doc.id().as_str(),
            "from": doc.phase().as_str(),
            "target": target.as_str(),
            "allowed": report.allowed,
            "reason": report.reason.as_str(),
            "unmet_criteria": report.unmet_criteria,
            "unresolved_blockers": report.unresolved_blockers
        }),
    )
}

pub(crate) fn transition(server: &McpServer, args: &Value) -> Value {
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
    let target = match super::phase_arg(args, "target_phase") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let force = match optional_bool(args, "force") {
        Ok(v) => v.unwrap_or(false),
        Err(resp) => return resp,
    };
    let resolver = match store.resolver() {
        Ok(v) => v,
        Err(err) => return store_error_response(err),
    };

    let from = doc.phase();
    let moved = match phases::transition(&doc, target, force, |r| resolver.resolve(r)) {
        Ok(v) => v,
        Err(err) => return transition_error_response(err),
    };
    if let Err(err) = store.save(&moved) {
        return store_error_response(err);
    }

    ai_ok(
        "transition",
        json!({
            "document": super::document_json(&moved),
            "from": from.as_str(),
            "to": moved.phase().as_str(),
            "forced": force
        }),
    )
}
