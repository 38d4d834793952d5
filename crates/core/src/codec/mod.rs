#![forbid(unsafe_code)]

//! Strict-grammar parser and serializer for planning documents.
//!
//! The codec never re-renders a document from its model. [`parse`] keeps the
//! raw source text inside the returned [`Document`], and [`serialize`] hands
//! it back byte-for-byte. Mutations (see [`crate::edit`]) splice single lines
//! into the raw text and re-parse, so everything not targeted by an edit
//! round-trips untouched, including unknown metadata keys and odd spacing.

#[cfg(test)]
mod tests;

use crate::ids::DocumentId;
use crate::model::{BlockRef, DocType, Document, ExitCriterion, Phase, RiskLevel, Section};
use crate::phases;

/// Heading of the section whose checkbox lines are the exit criteria.
pub const EXIT_CRITERIA_HEADING: &str = "Exit Criteria";

const META_MARKER: &str = "---";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CodecError {
    /// Document does not start with a `---` metadata block.
    MissingMetadata,
    /// Metadata block is never closed by a second `---` line.
    UnterminatedMetadata,
    MissingType,
    UnknownType { value: String },
    MissingPhase,
    UnknownPhase { doc_type: DocType, value: String },
    /// A checkbox line in the exit-criteria section that cannot be split
    /// into marker + text. `line` is 1-based.
    MalformedCriterion { line: usize },
    /// Documents are LF-only. Accepting CRLF would break the splice
    /// contract: `lines()` drops the `\r`, so one edit would rewrite every
    /// line ending in the file.
    CarriageReturn { line: usize },
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingMetadata => write!(f, "document must start with a --- metadata block"),
            Self::UnterminatedMetadata => write!(f, "metadata block is missing its closing ---"),
            Self::MissingType => write!(f, "metadata has no type key"),
            Self::UnknownType { value } => write!(f, "unknown document type: {value}"),
            Self::MissingPhase => write!(f, "metadata has no phase key"),
            Self::UnknownPhase { doc_type, value } => {
                write!(f, "phase {value:?} is not valid for a {doc_type} document")
            }
            Self::MalformedCriterion { line } => {
                write!(f, "malformed exit criterion at line {line}")
            }
            Self::CarriageReturn { line } => {
                write!(f, "carriage return at line {line}; documents are LF-only")
            }
        }
    }
}

impl std::error::Error for CodecError {}

/// Parse raw document text. `id` comes from the storage path; the codec
/// itself has no opinion on where the bytes live.
pub fn parse(id: DocumentId, raw: &str) -> Result<Document, CodecError> {
    if let Some(pos) = raw.find('\r') {
        let line = raw[..pos].matches('\n').count() + 1;
        return Err(CodecError::CarriageReturn { line });
    }

    let lines = raw.lines().collect::<Vec<_>>();

    let meta_end = metadata_end(&lines)?;
    let meta = parse_metadata(&lines[1..meta_end])?;

    let doc_type = match meta.doc_type {
        Some(value) => DocType::parse(&value).ok_or(CodecError::UnknownType { value })?,
        None => return Err(CodecError::MissingType),
    };
    let phase = match meta.phase {
        Some(value) => {
            let parsed = Phase::parse(&value);
            match parsed.filter(|p| phases::valid_phases(doc_type).contains(p)) {
                Some(p) => p,
                None => return Err(CodecError::UnknownPhase { doc_type, value }),
            }
        }
        None => return Err(CodecError::MissingPhase),
    };

    let body = parse_body(&lines, meta_end + 1)?;

    Ok(Document {
        id,
        doc_type,
        phase,
        title: meta.title.unwrap_or_default(),
        risk_level: meta.risk_level,
        exit_criteria: body.exit_criteria,
        blocked_by: meta.blocked_by,
        sections: body.sections,
        preamble: body.preamble,
        raw: raw.to_string(),
    })
}

/// The raw text this document was parsed from, with any mutations already
/// spliced in. Byte-identical to the source when nothing was mutated.
pub fn serialize(doc: &Document) -> &str {
    &doc.raw
}

/// Index of the closing `---` line of the metadata block.
pub(crate) fn metadata_end(lines: &[&str]) -> Result<usize, CodecError> {
    if lines.first().copied() != Some(META_MARKER) {
        return Err(CodecError::MissingMetadata);
    }
    lines
        .iter()
        .skip(1)
        .position(|line| *line == META_MARKER)
        .map(|pos| pos + 1)
        .ok_or(CodecError::UnterminatedMetadata)
}

/// Heading text of a `## ` section line, trailing whitespace trimmed.
/// Deeper headings (`###`...) are body content, not section boundaries.
pub(crate) fn heading_of(line: &str) -> Option<&str> {
    line.strip_prefix("## ")
        .filter(|rest| !rest.starts_with('#'))
        .map(str::trim_end)
}

/// `(completed, text)` for a well-formed checkbox line, `None` otherwise.
pub(crate) fn checkbox_of(line: &str) -> Option<(bool, &str)> {
    let trimmed = line.trim_start();
    let (completed, rest) = if let Some(rest) = trimmed.strip_prefix("- [ ]") {
        (false, rest)
    } else if let Some(rest) = trimmed.strip_prefix("- [x]") {
        (true, rest)
    } else if let Some(rest) = trimmed.strip_prefix("- [X]") {
        (true, rest)
    } else {
        return None;
    };
    let text = rest.trim();
    if text.is_empty() { None } else { Some((completed, text)) }
}

fn looks_like_checkbox(line: &str) -> bool {
    line.trim_start().starts_with("- [")
}

#[derive(Default)]
struct Metadata {
    doc_type: Option<String>,
    phase: Option<String>,
    title: Option<String>,
    risk_level: Option<RiskLevel>,
    blocked_by: Vec<BlockRef>,
}

fn parse_metadata(lines: &[&str]) -> Result<Metadata, CodecError> {
    let mut meta = Metadata::default();
    let mut in_blocked_by = false;
    let mut seen_refs = std::collections::HashSet::new();

    for line in lines {
        let trimmed = line.trim_start();

        if in_blocked_by && trimmed.starts_with("- ") {
            let item = trimmed[2..].trim().trim_matches('"');
            let reference = BlockRef::parse(item);
            if !reference.as_str().is_empty() && seen_refs.insert(reference.as_str().to_string()) {
                meta.blocked_by.push(reference);
            }
            continue;
        }
        in_blocked_by = false;

        if trimmed.starts_with('-') || trimmed.starts_with('#') || trimmed.is_empty() {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        match key {
            "type" => meta.doc_type = Some(value.to_string()),
            "phase" => meta.phase = Some(value.to_string()),
            "title" => meta.title = Some(value.to_string()),
            "risk" => meta.risk_level = RiskLevel::parse(value),
            "blocked_by" => in_blocked_by = true,
            // Unknown keys (created, owner, ...) round-trip via the raw text.
            _ => {}
        }
    }

    Ok(meta)
}

struct Body {
    preamble: String,
    sections: Vec<Section>,
    exit_criteria: Vec<ExitCriterion>,
}

fn parse_body(lines: &[&str], body_start: usize) -> Result<Body, CodecError> {
    let mut preamble_lines = Vec::new();
    let mut sections: Vec<Section> = Vec::new();
    let mut exit_criteria: Vec<ExitCriterion> = Vec::new();
    let mut seen_criteria = std::collections::HashSet::new();

    let mut current: Option<(String, Vec<&str>)> = None;
    let mut in_exit_criteria = false;

    for (offset, line) in lines.iter().enumerate().skip(body_start) {
        if let Some(heading) = heading_of(line) {
            if let Some((done_heading, body)) = current.take() {
                sections.push(Section {
                    heading: done_heading,
                    body: body.join("\n"),
                });
            }
            in_exit_criteria = heading == EXIT_CRITERIA_HEADING;
            current = Some((heading.to_string(), Vec::new()));
            continue;
        }

        match current.as_mut() {
            Some((_, body)) => {
                if in_exit_criteria && looks_like_checkbox(line) {
                    let Some((completed, text)) = checkbox_of(line) else {
                        return Err(CodecError::MalformedCriterion { line: offset + 1 });
                    };
                    if seen_criteria.insert(text.to_string()) {
                        exit_criteria.push(ExitCriterion {
                            text: text.to_string(),
                            completed,
                        });
                    }
                }
                body.push(line);
            }
            None => preamble_lines.push(*line),
        }
    }

    if let Some((heading, body)) = current.take() {
        sections.push(Section {
            heading,
            body: body.join("\n"),
        });
    }

    Ok(Body {
        preamble: preamble_lines.join("\n"),
        sections,
        exit_criteria,
    })
}
