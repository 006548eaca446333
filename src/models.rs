//! Core data types flowing through the upload and disk paths.

use std::path::PathBuf;

/// A logical text document produced by normalization, with provenance.
/// One upload yields one or more of these (one per sheet for tabular
/// formats, one per file otherwise).
#[derive(Debug, Clone)]
pub struct NormalizedDocument {
    pub text: String,
    /// Original upload filename.
    pub source: String,
}

/// Bounded span of a document's text, the unit of retrieval.
///
/// A chunk belongs to exactly one document and never spans document
/// boundaries. `start_offset` is a character offset into the source
/// document's text.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub text: String,
    pub start_offset: usize,
    /// Inherited from the source document.
    pub source: String,
}

/// A chunk returned from a similarity query, with its cosine score.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// A file discovered by disk scouting, restricted to allow-listed subtrees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoutMatch {
    pub name: String,
    pub path: PathBuf,
}

/// Answer grounded in uploaded documents. The chunks used as grounding are
/// always reported back for citation display, never omitted.
#[derive(Debug, Clone)]
pub struct UploadAnswer {
    pub answer: String,
    /// Ordered by rank, exactly as used for context assembly.
    pub sources: Vec<RetrievedChunk>,
}

/// Answer grounded in scouted local files. The accessed files are always
/// disclosed back to the caller.
#[derive(Debug, Clone)]
pub struct DiskAnswer {
    pub answer: String,
    /// The keyword the scout searched for (echoed for transparency).
    pub keyword: String,
    pub accessed: Vec<ScoutMatch>,
}
