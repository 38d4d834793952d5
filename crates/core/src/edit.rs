#![forbid(unsafe_code)]

//! Surgical edit operations over immutable [`Document`] values.
//!
//! Every operation splices the minimal set of lines into the document's raw
//! text, re-parses, and returns a fresh `Document`. Nothing outside the
//! targeted lines changes, and nothing is persisted here; storage decides
//! when the new value hits disk.

use crate::codec::{self, CodecError, EXIT_CRITERIA_HEADING};
use crate::model::{BlockRef, Document, Phase};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditError {
    HeadingNotFound { heading: String },
    InvalidCriterion { text: String },
    InvalidReference { reference: String },
    /// The spliced document no longer parses (e.g. a section replacement
    /// introduced a malformed criterion line).
    Codec(CodecError),
}

impl std::fmt::Display for EditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HeadingNotFound { heading } => write!(f, "no section with heading {heading:?}"),
            Self::InvalidCriterion { text } => write!(f, "invalid criterion text: {text:?}"),
            Self::InvalidReference { reference } => {
                write!(f, "invalid blocked_by reference: {reference:?}")
            }
            Self::Codec(err) => write!(f, "edit result failed to parse: {err}"),
        }
    }
}

impl std::error::Error for EditError {}

impl From<CodecError> for EditError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

/// Replace the body of the section with the given heading (exact,
/// case-sensitive match). Heading line and all other sections keep their
/// bytes.
pub fn replace_section(
    doc: &Document,
    heading: &str,
    new_body: &str,
) -> Result<Document, EditError> {
    let lines = split_lines(doc);
    let Some(start) = lines
        .iter()
        .position(|line| codec::heading_of(line) == Some(heading))
    else {
        return Err(EditError::HeadingNotFound {
            heading: heading.to_string(),
        });
    };
    let end = next_heading(&lines, start + 1);

    let mut out = Vec::with_capacity(lines.len());
    out.extend(lines[..=start].iter().map(|l| l.to_string()));
    if !new_body.trim().is_empty() {
        out.push(String::new());
        out.extend(new_body.lines().map(str::to_string));
    }
    if end < lines.len() {
        out.push(String::new());
        out.extend(lines[end..].iter().map(|l| l.to_string()));
    }

    reparse(doc, out)
}

/// Upsert one exit criterion by exact text. An existing criterion has its
/// checkbox marker toggled in place; an absent one is appended (creating the
/// exit-criteria section at the end of the document when missing).
/// Idempotent: re-applying the same state leaves the bytes untouched.
pub fn set_criterion(doc: &Document, text: &str, completed: bool) -> Result<Document, EditError> {
    let text = text.trim();
    if text.is_empty() || text.contains('\n') {
        return Err(EditError::InvalidCriterion {
            text: text.to_string(),
        });
    }

    if let Some(existing) = doc.exit_criteria.iter().find(|c| c.text == text)
        && existing.completed == completed
    {
        return Ok(doc.clone());
    }

    let lines = split_lines(doc);
    let marker = if completed { 'x' } else { ' ' };

    let section = lines
        .iter()
        .position(|line| codec::heading_of(line) == Some(EXIT_CRITERIA_HEADING));

    let Some(start) = section else {
        // No exit-criteria section yet: append one.
        let mut out = lines.iter().map(|l| l.to_string()).collect::<Vec<_>>();
        if out.last().is_some_and(|l| !l.trim().is_empty()) {
            out.push(String::new());
        }
        out.push(format!("## {EXIT_CRITERIA_HEADING}"));
        out.push(String::new());
        out.push(format!("- [{marker}] {text}"));
        return reparse(doc, out);
    };

    let end = next_heading(&lines, start + 1);
    let mut matched: Option<usize> = None;
    let mut last_checkbox: Option<usize> = None;
    for (idx, line) in lines.iter().enumerate().take(end).skip(start + 1) {
        if let Some((_, line_text)) = codec::checkbox_of(line) {
            last_checkbox = Some(idx);
            if line_text == text && matched.is_none() {
                matched = Some(idx);
            }
        }
    }

    let mut out = lines.iter().map(|l| l.to_string()).collect::<Vec<_>>();
    match matched {
        Some(idx) => {
            out[idx] = toggle_checkbox(&lines[idx], marker);
        }
        None => {
            let insert_at = match last_checkbox {
                Some(idx) => idx + 1,
                None => {
                    let mut pos = start + 1;
                    if pos < end && lines[pos].trim().is_empty() {
                        pos += 1;
                    }
                    pos
                }
            };
            out.insert(insert_at, format!("- [{marker}] {text}"));
        }
    }

    reparse(doc, out)
}

/// Replace the whole blocked-by set. Duplicates collapse, self-references
/// are dropped; an empty result removes the metadata block entirely.
pub fn set_blocked_by(doc: &Document, refs: &[BlockRef]) -> Result<Document, EditError> {
    let mut seen = std::collections::HashSet::new();
    let mut kept = Vec::new();
    for reference in refs {
        let inner = reference.as_str();
        if inner.trim().is_empty()
            || inner.contains('\n')
            || inner.contains("[[")
            || inner.contains("]]")
        {
            return Err(EditError::InvalidReference {
                reference: inner.to_string(),
            });
        }
        if reference.slug().as_ref() == Some(&doc.id) {
            continue;
        }
        if seen.insert(inner.to_string()) {
            kept.push(reference.clone());
        }
    }

    let lines = split_lines(doc);
    let meta_end = codec::metadata_end(&lines)?;

    let key_line = lines[1..meta_end]
        .iter()
        .position(|line| {
            let trimmed = line.trim_start();
            !trimmed.starts_with('-')
                && line
                    .split_once(':')
                    .is_some_and(|(key, _)| key.trim() == "blocked_by")
        })
        .map(|pos| pos + 1);

    let mut block = Vec::new();
    if !kept.is_empty() {
        block.push("blocked_by:".to_string());
        for reference in &kept {
            block.push(format!("  - \"{}\"", reference.as_link()));
        }
    }

    let mut out = Vec::with_capacity(lines.len() + block.len());
    match key_line {
        Some(key_idx) => {
            let mut item_end = key_idx + 1;
            while item_end < meta_end && lines[item_end].trim_start().starts_with("- ") {
                item_end += 1;
            }
            out.extend(lines[..key_idx].iter().map(|l| l.to_string()));
            out.extend(block);
            out.extend(lines[item_end..].iter().map(|l| l.to_string()));
        }
        None => {
            out.extend(lines[..meta_end].iter().map(|l| l.to_string()));
            out.extend(block);
            out.extend(lines[meta_end..].iter().map(|l| l.to_string()));
        }
    }

    reparse(doc, out)
}

/// Rewrite only the `phase:` metadata line. Total: the line is guaranteed
/// present on any parsed document.
pub fn set_phase(doc: &Document, phase: Phase) -> Document {
    let lines = split_lines(doc);
    let Ok(meta_end) = codec::metadata_end(&lines) else {
        return doc.clone();
    };

    let mut out = lines.iter().map(|l| l.to_string()).collect::<Vec<_>>();
    let mut replaced = false;
    for line in out.iter_mut().take(meta_end).skip(1) {
        let is_key = !line.trim_start().starts_with('-')
            && line
                .split_once(':')
                .is_some_and(|(key, _)| key.trim() == "phase");
        if is_key {
            *line = format!("phase: {}", phase.as_str());
            replaced = true;
            break;
        }
    }
    if !replaced {
        return doc.clone();
    }

    let mut updated = doc.clone();
    updated.phase = phase;
    updated.raw = join_lines(&out, doc.raw.ends_with('\n'));
    updated
}

fn split_lines(doc: &Document) -> Vec<&str> {
    doc.raw.lines().collect()
}

fn next_heading(lines: &[&str], from: usize) -> usize {
    lines[from..]
        .iter()
        .position(|line| codec::heading_of(line).is_some())
        .map(|pos| from + pos)
        .unwrap_or(lines.len())
}

fn toggle_checkbox(line: &str, marker: char) -> String {
    let indent = line.len() - line.trim_start().len();
    // "- [" is 3 bytes; the state char sits right after it.
    let state_at = indent + 3;
    let mut out = String::with_capacity(line.len());
    out.push_str(&line[..state_at]);
    out.push(marker);
    out.push_str(&line[state_at + 1..]);
    out
}

fn join_lines(lines: &[String], trailing_newline: bool) -> String {
    let mut out = lines.join("\n");
    if trailing_newline {
        out.push('\n');
    }
    out
}

fn reparse(doc: &Document, lines: Vec<String>) -> Result<Document, EditError> {
    let raw = join_lines(&lines, doc.raw.ends_with('\n'));
    Ok(codec::parse(doc.id.clone(), &raw)?)
}
