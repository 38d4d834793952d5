#![forbid(unsafe_code)]

pub(crate) mod create;
pub(crate) mod edit_ops;
pub(crate) mod index_ops;
pub(crate) mod transition;
pub(crate) mod validate;

use crate::McpServer;
use crate::support::ai::{ai_error, store_error_response};
use crate::support::args::{ArgsMap, require_nonempty_string};
use ns_core::ids::{DocumentId, ProjectId};
use ns_core::model::{Document, Phase};
use ns_storage::ProjectStore;
use serde_json::{Value, json};

/// Open the per-project store for the request. The project id is validated
/// before it touches the filesystem, so a request can never escape the
/// server root.
pub(crate) fn project_store(server: &McpServer, args: &ArgsMap) -> Result<ProjectStore, Value> {
    let raw = require_nonempty_string(args, "project")?;
    let project = ProjectId::try_new(raw)
        .map_err(|err| ai_error("INVALID_INPUT", &format!("invalid project: {err}")))?;
    ProjectStore::open(server.root_dir.join(project.as_str())).map_err(store_error_response)
}

pub(crate) fn document_id_arg(args: &ArgsMap) -> Result<DocumentId, Value> {
    let raw = require_nonempty_string(args, "document")?;
    DocumentId::try_new(raw)
        .map_err(|err| ai_error("INVALID_INPUT", &format!("invalid document: {err}")))
}

pub(crate) fn load_document(store: &ProjectStore, args: &ArgsMap) -> Result<Document, Value> {
    let id = document_id_arg(args)?;
    store.load(&id).map_err(store_error_response)
}

pub(crate) fn phase_arg(args: &ArgsMap, key: &str) -> Result<Phase, Value> {
    let raw = require_nonempty_string(args, key)?;
    Phase::parse(&raw).ok_or_else(|| {
        ai_error(
            "INVALID_INPUT",
            &format!("{key} must be one of: draft|review|published|active|completed|blocked"),
        )
    })
}

pub(crate) fn document_json(doc: &Document) -> Value {
    json!({
        "id": doc.id().as_str(),
        "type": doc.doc_type().as_str(),
        "phase": doc.phase().as_str(),
        "title": doc.title(),
        "risk_level": doc.risk_level().map(|r| r.as_str()),
        "blocked_by": doc.blocked_by().iter().map(|r| r.as_link()).collect::<Vec<_>>(),
        "exit_criteria": doc
            .exit_criteria()
            .iter()
            .map(|c| json!({ "text": c.text, "completed": c.completed }))
            .collect::<Vec<_>>(),
        "sections": doc.sections().iter().map(|s| s.heading.as_str()).collect::<Vec<_>>()
    })
}
