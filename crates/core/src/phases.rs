#![forbid(unsafe_code)]

//! Per-type phase graphs and gated transitions.
//!
//! The graphs are static successor tables over tagged variants; there is no
//! string matching anywhere in the transition path. Gates (exit criteria and
//! blocker resolution) are soft and can be bypassed with `force`; adjacency
//! is structural and can not.

use crate::edit;
use crate::model::{BlockRef, DocType, Document, Phase};

/// Phase a freshly created document starts in.
pub fn initial_phase(_doc_type: DocType) -> Phase {
    Phase::Draft
}

/// Every phase a document of this type may legally be in.
pub fn valid_phases(doc_type: DocType) -> &'static [Phase] {
    match doc_type {
        DocType::Vision | DocType::Strategy | DocType::Decision => {
            &[Phase::Draft, Phase::Review, Phase::Published]
        }
        DocType::Initiative | DocType::Task => {
            &[Phase::Draft, Phase::Active, Phase::Completed, Phase::Blocked]
        }
    }
}

/// Direct successors in the type's graph.
pub fn successors(doc_type: DocType, phase: Phase) -> &'static [Phase] {
    match doc_type {
        DocType::Vision | DocType::Strategy | DocType::Decision => match phase {
            Phase::Draft => &[Phase::Review],
            Phase::Review => &[Phase::Published],
            _ => &[],
        },
        DocType::Initiative | DocType::Task => match phase {
            Phase::Draft => &[Phase::Active],
            Phase::Active => &[Phase::Completed, Phase::Blocked],
            Phase::Blocked => &[Phase::Active],
            _ => &[],
        },
    }
}

/// Phases that count as "resolved" when this document is referenced as a
/// blocker by another document.
pub fn resolved_phases(doc_type: DocType) -> &'static [Phase] {
    match doc_type {
        DocType::Vision | DocType::Strategy | DocType::Decision => &[Phase::Published],
        DocType::Initiative | DocType::Task => &[Phase::Completed],
    }
}

pub fn is_resolved(doc_type: DocType, phase: Phase) -> bool {
    resolved_phases(doc_type).contains(&phase)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionReason {
    Ok,
    NotAdjacent,
    GatesFailed,
}

impl TransitionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            TransitionReason::Ok => "ok",
            TransitionReason::NotAdjacent => "not_adjacent",
            TransitionReason::GatesFailed => "gates_failed",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionReport {
    pub allowed: bool,
    pub unmet_criteria: Vec<String>,
    pub unresolved_blockers: Vec<String>,
    pub reason: TransitionReason,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransitionError {
    IllegalPhase { from: Phase, target: Phase },
    GateFailed {
        unmet_criteria: Vec<String>,
        unresolved_blockers: Vec<String>,
    },
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IllegalPhase { from, target } => {
                write!(f, "no transition from {from} to {target}")
            }
            Self::GateFailed {
                unmet_criteria,
                unresolved_blockers,
            } => write!(
                f,
                "gates failed ({} unmet criteria, {} unresolved blockers)",
                unmet_criteria.len(),
                unresolved_blockers.len()
            ),
        }
    }
}

impl std::error::Error for TransitionError {}

/// Read-only transition check. `resolve` maps a blocker reference onto the
/// referenced document's type and phase (from a corpus snapshot); a
/// reference that resolves to nothing counts as unresolved, not as an error.
pub fn check_transition<F>(doc: &Document, target: Phase, resolve: F) -> TransitionReport
where
    F: Fn(&BlockRef) -> Option<(DocType, Phase)>,
{
    if !successors(doc.doc_type(), doc.phase()).contains(&target) {
        return TransitionReport {
            allowed: false,
            unmet_criteria: Vec::new(),
            unresolved_blockers: Vec::new(),
            reason: TransitionReason::NotAdjacent,
        };
    }

    // Blocked is the parking state for gate failure; gating its entry edge
    // would make it unreachable.
    if target == Phase::Blocked {
        return TransitionReport {
            allowed: true,
            unmet_criteria: Vec::new(),
            unresolved_blockers: Vec::new(),
            reason: TransitionReason::Ok,
        };
    }

    let unmet_criteria = doc.unmet_criteria();
    let unresolved_blockers = unresolved_blockers(doc, &resolve);

    if unmet_criteria.is_empty() && unresolved_blockers.is_empty() {
        TransitionReport {
            allowed: true,
            unmet_criteria,
            unresolved_blockers,
            reason: TransitionReason::Ok,
        }
    } else {
        TransitionReport {
            allowed: false,
            unmet_criteria,
            unresolved_blockers,
            reason: TransitionReason::GatesFailed,
        }
    }
}

/// Perform a transition, returning the updated document. `force` bypasses
/// the soft gates but never the graph: a non-adjacent target fails with
/// `IllegalPhase` even when forced. Only the phase line of the document
/// changes; persistence is the caller's job.
pub fn transition<F>(
    doc: &Document,
    target: Phase,
    force: bool,
    resolve: F,
) -> Result<Document, TransitionError>
where
    F: Fn(&BlockRef) -> Option<(DocType, Phase)>,
{
    let report = check_transition(doc, target, resolve);
    match report.reason {
        TransitionReason::NotAdjacent => Err(TransitionError::IllegalPhase {
            from: doc.phase(),
            target,
        }),
        TransitionReason::GatesFailed if !force => Err(TransitionError::GateFailed {
            unmet_criteria: report.unmet_criteria,
            unresolved_blockers: report.unresolved_blockers,
        }),
        _ => Ok(edit::set_phase(doc, target)),
    }
}

fn unresolved_blockers<F>(doc: &Document, resolve: &F) -> Vec<String>
where
    F: Fn(&BlockRef) -> Option<(DocType, Phase)>,
{
    doc.blocked_by()
        .iter()
        .filter(|reference| {
            !resolve(reference).is_some_and(|(doc_type, phase)| is_resolved(doc_type, phase))
        })
        .map(|reference| reference.as_link())
        .collect()
}
