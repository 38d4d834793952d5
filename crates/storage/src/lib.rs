#![forbid(unsafe_code)]

mod index;
mod template;

pub use index::{
    BlockerResolver, DEFAULT_SEARCH_LIMIT, DocumentSummary, Listing, MAX_SEARCH_LIMIT,
    SearchResult, UnparseableDocument,
};

use ns_core::codec::{self, CodecError};
use ns_core::ids::{DocumentId, DocumentIdError};
use ns_core::model::{DocType, Document, RiskLevel};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Codec { id: DocumentId, error: CodecError },
    NotFound { id: DocumentId },
    AlreadyExists { id: DocumentId },
    InvalidId(DocumentIdError),
    InvalidTitle,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Codec { id, error } => write!(f, "document {id} failed to parse: {error}"),
            Self::NotFound { id } => write!(f, "document not found: {id}"),
            Self::AlreadyExists { id } => write!(f, "document already exists: {id}"),
            Self::InvalidId(err) => write!(f, "invalid document id: {err}"),
            Self::InvalidTitle => write!(f, "title must be a single line"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<DocumentIdError> for StoreError {
    fn from(value: DocumentIdError) -> Self {
        Self::InvalidId(value)
    }
}

/// One project's document directory: `<root>/<id>.md`, one file per
/// document. The store holds no in-memory state; every operation loads and
/// saves its own file, so operations on different documents never contend.
#[derive(Debug)]
pub struct ProjectStore {
    root: PathBuf,
}

impl ProjectStore {
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn document_path(&self, id: &DocumentId) -> PathBuf {
        self.root.join(format!("{id}.md"))
    }

    pub fn exists(&self, id: &DocumentId) -> bool {
        self.document_path(id).is_file()
    }

    /// Raw bytes of a document, unparsed. Used by validation, which wants
    /// to report codec errors as results rather than fail the load.
    pub fn read_raw(&self, id: &DocumentId) -> Result<String, StoreError> {
        let path = self.document_path(id);
        match std::fs::read_to_string(&path) {
            Ok(raw) => Ok(raw),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound { id: id.clone() })
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn load(&self, id: &DocumentId) -> Result<Document, StoreError> {
        let raw = self.read_raw(id)?;
        codec::parse(id.clone(), &raw).map_err(|error| StoreError::Codec {
            id: id.clone(),
            error,
        })
    }

    /// Persist via write-to-temp-then-rename so a concurrent reader never
    /// observes a partially written document.
    pub fn save(&self, doc: &Document) -> Result<(), StoreError> {
        let path = self.document_path(doc.id());
        let tmp = self.root.join(format!("{}.md.tmp", doc.id()));
        std::fs::write(&tmp, codec::serialize(doc))?;
        match std::fs::rename(&tmp, &path) {
            Ok(()) => Ok(()),
            Err(err) => {
                let _ = std::fs::remove_file(&tmp);
                Err(err.into())
            }
        }
    }

    /// Create a new document from the per-type template. The id is the
    /// slug of the title; creation never overwrites an existing file.
    ///
    /// The title lands on a metadata line, so it must be a single line;
    /// anything with an embedded line break could splice extra metadata
    /// keys into the block.
    pub fn create(
        &self,
        doc_type: DocType,
        title: &str,
        risk_level: Option<RiskLevel>,
    ) -> Result<Document, StoreError> {
        if title.contains('\n') || title.contains('\r') {
            return Err(StoreError::InvalidTitle);
        }
        let id = DocumentId::from_title(title)?;
        if self.exists(&id) {
            return Err(StoreError::AlreadyExists { id });
        }

        let raw = template::render(doc_type, title, risk_level);
        let doc = codec::parse(id.clone(), &raw).map_err(|error| StoreError::Codec {
            id: id.clone(),
            error,
        })?;
        self.save(&doc)?;
        Ok(doc)
    }
}
