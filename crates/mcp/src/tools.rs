#![forbid(unsafe_code)]

use crate::McpServer;
use crate::handlers::{create, edit_ops, index_ops, transition, validate};
use serde_json::{Value, json};

fn document_schema(extra: &[(&str, Value)], required: &[&str]) -> Value {
    let mut properties = serde_json::Map::new();
    properties.insert("project".to_string(), json!({ "type": "string" }));
    properties.insert("document".to_string(), json!({ "type": "string" }));
    for (key, schema) in extra {
        properties.insert((*key).to_string(), schema.clone());
    }

    let mut all_required = vec!["project", "document"];
    all_required.extend_from_slice(required);
    json!({
        "type": "object",
        "properties": Value::Object(properties),
        "required": all_required
    })
}

pub(crate) fn tool_definitions() -> Vec<Value> {
    vec![
        json!({
            "name": "doc_create",
            "description": "Create a planning document from its type template.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "project": { "type": "string" },
                    "doc_type": { "type": "string", "enum": ["vision", "strategy", "initiative", "task", "decision"] },
                    "title": { "type": "string" },
                    "risk_level": { "type": "string", "enum": ["low", "medium", "high"] }
                },
                "required": ["project", "doc_type", "title"]
            },
        }),
        json!({
            "name": "doc_validate",
            "description": "Parse a stored document and report grammar errors as results.",
            "inputSchema": document_schema(&[], &[]),
        }),
        json!({
            "name": "criteria_check",
            "description": "Exit criteria completion status for one document.",
            "inputSchema": document_schema(&[], &[]),
        }),
        json!({
            "name": "transition_check",
            "description": "Dry-run a phase transition: adjacency plus criteria and blocker gates.",
            "inputSchema": document_schema(
                &[("target_phase", json!({ "type": "string" }))],
                &["target_phase"],
            ),
        }),
        json!({
            "name": "transition",
            "description": "Move a document to an adjacent phase; force bypasses gates, never the graph.",
            "inputSchema": document_schema(
                &[
                    ("target_phase", json!({ "type": "string" })),
                    ("force", json!({ "type": "boolean" })),
                ],
                &["target_phase"],
            ),
        }),
        json!({
            "name": "section_replace",
            "description": "Replace the body of one `## ` section, leaving the rest byte-identical.",
            "inputSchema": document_schema(
                &[
                    ("heading", json!({ "type": "string" })),
                    ("content", json!({ "type": "string" })),
                ],
                &["heading", "content"],
            ),
        }),
        json!({
            "name": "criterion_set",
            "description": "Add or toggle one exit criterion checkbox.",
            "inputSchema": document_schema(
                &[
                    ("criterion", json!({ "type": "string" })),
                    ("completed", json!({ "type": "boolean" })),
                ],
                &["criterion", "completed"],
            ),
        }),
        json!({
            "name": "blocked_by_set",
            "description": "Replace the document's blocker references.",
            "inputSchema": document_schema(
                &[(
                    "blocked_by",
                    json!({ "type": "array", "items": { "type": "string" } }),
                )],
                &["blocked_by"],
            ),
        }),
        json!({
            "name": "docs_list",
            "description": "List every document in a project, with unparseable files partitioned out.",
            "inputSchema": {
                "type": "object",
                "properties": { "project": { "type": "string" } },
                "required": ["project"]
            },
        }),
        json!({
            "name": "docs_search",
            "description": "Keyword search over titles and section bodies; deterministic ordering.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "project": { "type": "string" },
                    "query": { "type": "string" },
                    "limit": { "type": "integer", "minimum": 0 }
                },
                "required": ["project", "query"]
            },
        }),
    ]
}

pub(crate) fn dispatch_tool(server: &McpServer, name: &str, args: &Value) -> Option<Value> {
    let resp = match name {
        "doc_create" => create::doc_create(server, args),
        "doc_validate" => validate::doc_validate(server, args),
        "criteria_check" => validate::criteria_check(server, args),
        "transition_check" => transition::transition_check(server, args),
        "transition" => transition::transition(server, args),
        "section_replace" => edit_ops::section_replace(server, args),
        "criterion_set" => edit_ops::criterion_set(server, args),
        "blocked_by_set" => edit_ops::blocked_by_set(server, args),
        "docs_list" => index_ops::docs_list(server, args),
        "docs_search" => index_ops::docs_search(server, args),
        _ => return None,
    };
    Some(resp)
}

pub(crate) fn dispatch_tool_names() -> &'static [&'static str] {
    &[
        "doc_create",
        "doc_validate",
        "criteria_check",
        "transition_check",
        "transition",
        "section_replace",
        "criterion_set",
        "blocked_by_set",
        "docs_list",
        "docs_search",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn definitions_and_dispatch_are_in_sync() {
        let mut defined = BTreeSet::<String>::new();
        for tool in tool_definitions() {
            let Some(name) = tool.get("name").and_then(|v| v.as_str()) else {
                continue;
            };
            defined.insert(name.to_string());
        }

        let dispatched = dispatch_tool_names()
            .iter()
            .map(|name| (*name).to_string())
            .collect::<BTreeSet<_>>();

        let missing_in_definitions = dispatched.difference(&defined).cloned().collect::<Vec<_>>();
        let missing_in_dispatch = defined.difference(&dispatched).cloned().collect::<Vec<_>>();
        assert!(
            missing_in_definitions.is_empty() && missing_in_dispatch.is_empty(),
            "tool dispatch/definitions mismatch\n  dispatch-only: {missing_in_definitions:?}\n  definitions-only: {missing_in_dispatch:?}"
        );
    }

    #[test]
    fn every_schema_requires_project() {
        for tool in tool_definitions() {
            let required = tool["inputSchema"]["required"]
                .as_array()
                .expect("required list")
                .iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>();
            assert!(
                required.contains(&"project"),
                "{} does not require project",
                tool["name"]
            );
        }
    }
}
