#![forbid(unsafe_code)]

use crate::ids::DocumentId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DocType {
    Vision,
    Strategy,
    Initiative,
    Task,
    Decision,
}

impl DocType {
    pub fn as_str(self) -> &'static str {
        match self {
            DocType::Vision => "vision",
            DocType::Strategy => "strategy",
            DocType::Initiative => "initiative",
            DocType::Task => "task",
            DocType::Decision => "decision",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "vision" => Some(DocType::Vision),
            "strategy" => Some(DocType::Strategy),
            "initiative" => Some(DocType::Initiative),
            "task" => Some(DocType::Task),
            "decision" => Some(DocType::Decision),
            _ => None,
        }
    }

    pub fn all() -> &'static [DocType] {
        &[
            DocType::Vision,
            DocType::Strategy,
            DocType::Initiative,
            DocType::Task,
            DocType::Decision,
        ]
    }
}

impl std::fmt::Display for DocType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state. Which variants are legal for a document is decided by
/// the per-type graph in [`crate::phases`], not by this enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Draft,
    Review,
    Published,
    Active,
    Completed,
    Blocked,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Draft => "draft",
            Phase::Review => "review",
            Phase::Published => "published",
            Phase::Active => "active",
            Phase::Completed => "completed",
            Phase::Blocked => "blocked",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Phase::Draft),
            "review" => Some(Phase::Review),
            "published" => Some(Phase::Published),
            "active" => Some(Phase::Active),
            "completed" => Some(Phase::Completed),
            "blocked" => Some(Phase::Blocked),
            _ => None,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(RiskLevel::Low),
            "medium" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExitCriterion {
    pub text: String,
    pub completed: bool,
}

/// A blocking reference to another document, stored as a `[[Title]]`
/// wiki-link. The inner text is kept verbatim for display; the referenced
/// document is located by slugifying it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlockRef(String);

impl BlockRef {
    pub fn new(inner: impl Into<String>) -> Self {
        Self(inner.into())
    }

    /// Accepts `[[Title]]` or a bare title.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        let inner = trimmed
            .strip_prefix("[[")
            .and_then(|rest| rest.strip_suffix("]]"))
            .unwrap_or(trimmed);
        Self(inner.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_link(&self) -> String {
        format!("[[{}]]", self.0)
    }

    /// Document id this reference points at, if the inner text slugifies.
    pub fn slug(&self) -> Option<DocumentId> {
        DocumentId::from_title(&self.0).ok()
    }
}

impl std::fmt::Display for BlockRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[[{}]]", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

/// In-memory view of one parsed document.
///
/// Constructed only by [`crate::codec::parse`]; the raw source text is kept
/// alongside the parsed fields so serialization is byte-identical and edits
/// can splice single lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub(crate) id: DocumentId,
    pub(crate) doc_type: DocType,
    pub(crate) phase: Phase,
    pub(crate) title: String,
    pub(crate) risk_level: Option<RiskLevel>,
    pub(crate) exit_criteria: Vec<ExitCriterion>,
    pub(crate) blocked_by: Vec<BlockRef>,
    pub(crate) sections: Vec<Section>,
    pub(crate) preamble: String,
    pub(crate) raw: String,
}

impl Document {
    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn doc_type(&self) -> DocType {
        self.doc_type
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn risk_level(&self) -> Option<RiskLevel> {
        self.risk_level
    }

    pub fn exit_criteria(&self) -> &[ExitCriterion] {
        &self.exit_criteria
    }

    pub fn blocked_by(&self) -> &[BlockRef] {
        &self.blocked_by
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, heading: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.heading == heading)
    }

    /// Body content before the first heading, preserved verbatim.
    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    pub fn unmet_criteria(&self) -> Vec<String> {
        self.exit_criteria
            .iter()
            .filter(|c| !c.completed)
            .map(|c| c.text.clone())
            .collect()
    }
}
