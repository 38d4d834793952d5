#![forbid(unsafe_code)]

//! Derived corpus index: listing, keyword search and blocker resolution.
//!
//! The index is rebuilt from disk on every request. Atomic document
//! replacement means each rebuild sees a consistent snapshot, so there is
//! no cache and no staleness to reason about.

use crate::{ProjectStore, StoreError};
use ns_core::ids::DocumentId;
use ns_core::model::{BlockRef, DocType, Phase};
use std::collections::HashMap;

pub const DEFAULT_SEARCH_LIMIT: usize = 20;
pub const MAX_SEARCH_LIMIT: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub doc_type: DocType,
    pub phase: Phase,
    pub title: String,
}

/// A file the codec refused; reported alongside the successes instead of
/// aborting the whole listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnparseableDocument {
    pub file_name: String,
    pub reason: String,
}

#[derive(Clone, Debug, Default)]
pub struct Listing {
    pub documents: Vec<DocumentSummary>,
    pub unparseable: Vec<UnparseableDocument>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    pub id: DocumentId,
    pub doc_type: DocType,
    pub phase: Phase,
    pub title: String,
    pub score: u64,
}

/// Snapshot used to gate transitions: blocker references resolve against
/// the corpus as it looked when the snapshot was taken.
#[derive(Debug, Default)]
pub struct BlockerResolver {
    by_id: HashMap<DocumentId, (DocType, Phase)>,
    by_title: HashMap<String, (DocType, Phase)>,
}

impl BlockerResolver {
    pub fn resolve(&self, reference: &BlockRef) -> Option<(DocType, Phase)> {
        if let Some(found) = self.by_title.get(reference.as_str()) {
            return Some(*found);
        }
        reference
            .slug()
            .and_then(|id| self.by_id.get(&id))
            .copied()
    }
}

impl ProjectStore {
    /// Enumerate every `*.md` document under the project root, in id order.
    pub fn list(&self) -> Result<Listing, StoreError> {
        let mut listing = Listing::default();

        for entry in sorted_markdown_files(self)? {
            let (file_name, stem) = entry;
            let id = match DocumentId::try_new(stem) {
                Ok(id) => id,
                Err(err) => {
                    listing.unparseable.push(UnparseableDocument {
                        file_name,
                        reason: format!("invalid document id: {err}"),
                    });
                    continue;
                }
            };
            match self.load(&id) {
                Ok(doc) => listing.documents.push(DocumentSummary {
                    id: doc.id().clone(),
                    doc_type: doc.doc_type(),
                    phase: doc.phase(),
                    title: doc.title().to_string(),
                }),
                Err(StoreError::Codec { error, .. }) => {
                    listing.unparseable.push(UnparseableDocument {
                        file_name,
                        reason: error.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        Ok(listing)
    }

    /// Keyword search over titles and section bodies. Deterministic:
    /// descending score, then ascending id.
    pub fn search(&self, query: &str, limit: Option<usize>) -> Result<Vec<SearchResult>, StoreError> {
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT).min(MAX_SEARCH_LIMIT);
        let query_tokens = tokenize(query);
        if query_tokens.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let mut results = Vec::new();
        for (_, stem) in sorted_markdown_files(self)? {
            let Ok(id) = DocumentId::try_new(stem) else {
                continue;
            };
            let Ok(doc) = self.load(&id) else {
                // Unparseable documents are reported by list(); search
                // silently skips them.
                continue;
            };

            let title_tokens = count_tokens(&tokenize(doc.title()));
            let mut body_tokens = HashMap::new();
            for section in doc.sections() {
                for token in tokenize(&section.body) {
                    *body_tokens.entry(token).or_insert(0u64) += 1;
                }
            }

            let mut score = 0u64;
            for token in &query_tokens {
                score += 3 * title_tokens.get(token).copied().unwrap_or(0);
                score += body_tokens.get(token).copied().unwrap_or(0);
            }
            if score > 0 {
                results.push(SearchResult {
                    id: doc.id().clone(),
                    doc_type: doc.doc_type(),
                    phase: doc.phase(),
                    title: doc.title().to_string(),
                    score,
                });
            }
        }

        results.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        results.truncate(limit);
        Ok(results)
    }

    /// Corpus snapshot for blocker gating. References match by exact title
    /// first, then by title slug against document ids.
    pub fn resolver(&self) -> Result<BlockerResolver, StoreError> {
        let mut resolver = BlockerResolver::default();
        for summary in self.list()?.documents {
            resolver
                .by_title
                .insert(summary.title.clone(), (summary.doc_type, summary.phase));
            resolver
                .by_id
                .insert(summary.id, (summary.doc_type, summary.phase));
        }
        Ok(resolver)
    }
}

fn sorted_markdown_files(store: &ProjectStore) -> Result<Vec<(String, String)>, StoreError> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(store.root())? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != "md") {
            continue;
        }
        let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().to_string()) else {
            continue;
        };
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
            continue;
        };
        out.push((file_name, stem));
    }
    out.sort();
    Ok(out)
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
        .collect()
}

fn count_tokens(tokens: &[String]) -> HashMap<String, u64> {
    let mut out = HashMap::new();
    for token in tokens {
        *out.entry(token.clone()).or_insert(0u64) += 1;
    }
    out
}
