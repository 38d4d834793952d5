#![forbid(unsafe_code)]

/// Identifier of one document, derived from the storage file stem.
///
/// Ids are lowercase slugs so that the same value works as a file name,
/// a wiki-link target and a JSON field without escaping.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, DocumentIdError> {
        let value = value.into();
        validate_document_id(&value)?;
        Ok(Self(value))
    }

    /// Slugify a display title into a document id.
    ///
    /// Non-alphanumeric runs collapse into single dashes; the result is
    /// capped so derived file names stay manageable.
    pub fn from_title(title: &str) -> Result<Self, DocumentIdError> {
        let slug = title
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect::<String>()
            .split('-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");

        let capped = if slug.chars().count() > MAX_DOCUMENT_ID_LEN {
            let truncated = slug.chars().take(MAX_DOCUMENT_ID_LEN).collect::<String>();
            truncated.trim_end_matches('-').to_string()
        } else {
            slug
        };

        Self::try_new(capped)
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

const MAX_DOCUMENT_ID_LEN: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocumentIdError {
    Empty,
    TooLong,
    InvalidFirstChar,
    InvalidLastChar,
    InvalidChar { ch: char, index: usize },
}

impl std::fmt::Display for DocumentIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "document id must not be empty"),
            Self::TooLong => write!(f, "document id exceeds {MAX_DOCUMENT_ID_LEN} chars"),
            Self::InvalidFirstChar => write!(f, "document id must start with a-z or 0-9"),
            Self::InvalidLastChar => write!(f, "document id must end with a-z or 0-9"),
            Self::InvalidChar { ch, index } => {
                write!(f, "document id has invalid char {ch:?} at index {index}")
            }
        }
    }
}

impl std::error::Error for DocumentIdError {}

fn validate_document_id(value: &str) -> Result<(), DocumentIdError> {
    if value.is_empty() {
        return Err(DocumentIdError::Empty);
    }
    if value.chars().count() > MAX_DOCUMENT_ID_LEN {
        return Err(DocumentIdError::TooLong);
    }
    let is_slug_char = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    let first = value.chars().next().ok_or(DocumentIdError::Empty)?;
    if !is_slug_char(first) {
        return Err(DocumentIdError::InvalidFirstChar);
    }
    let last = value.chars().next_back().ok_or(DocumentIdError::Empty)?;
    if !is_slug_char(last) {
        return Err(DocumentIdError::InvalidLastChar);
    }
    for (index, ch) in value.chars().enumerate() {
        if is_slug_char(ch) || ch == '-' {
            continue;
        }
        return Err(DocumentIdError::InvalidChar { ch, index });
    }
    Ok(())
}

/// Name of a project directory under the server root.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, ProjectIdError> {
        let value = value.into();
        validate_project_id(&value)?;
        Ok(Self(value))
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProjectIdError {
    Empty,
    TooLong,
    InvalidFirstChar,
    InvalidChar { ch: char, index: usize },
}

impl std::fmt::Display for ProjectIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "project must not be empty"),
            Self::TooLong => write!(f, "project exceeds 128 chars"),
            Self::InvalidFirstChar => write!(f, "project must start with an alphanumeric char"),
            Self::InvalidChar { ch, index } => {
                write!(f, "project has invalid char {ch:?} at index {index}")
            }
        }
    }
}

impl std::error::Error for ProjectIdError {}

fn validate_project_id(value: &str) -> Result<(), ProjectIdError> {
    if value.is_empty() {
        return Err(ProjectIdError::Empty);
    }
    if value.len() > 128 {
        return Err(ProjectIdError::TooLong);
    }
    let first = value.chars().next().ok_or(ProjectIdError::Empty)?;
    if !first.is_ascii_alphanumeric() {
        return Err(ProjectIdError::InvalidFirstChar);
    }
    for (index, ch) in value.chars().enumerate() {
        if index == 0 {
            continue;
        }
        if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
            continue;
        }
        return Err(ProjectIdError::InvalidChar { ch, index });
    }
    Ok(())
}
