//! Session state and the two question-answering paths.
//!
//! All mutable state — the upload index and the disk allow-list — lives in
//! an explicit [`Session`] passed into every operation; there are no
//! process-wide singletons. A session is created at interaction start,
//! mutated by ingestion and grants, reset by [`Session::forget`], and
//! destroyed at session end. Nothing survives a restart.

use std::path::PathBuf;

use crate::assemble;
use crate::chat::{ChatClient, OllamaChat};
use crate::chunk::chunk_documents;
use crate::config::Config;
use crate::embedding::{EmbeddingClient, OllamaEmbedder};
use crate::error::Result;
use crate::index::VectorIndex;
use crate::keyword;
use crate::models::{DiskAnswer, NormalizedDocument, UploadAnswer};
use crate::normalize::normalize_upload;
use crate::retrieve;
use crate::scout::DiskScout;

pub struct Session {
    config: Config,
    index: Option<VectorIndex>,
    scout: DiskScout,
    embedder: Box<dyn EmbeddingClient>,
    chat: Box<dyn ChatClient>,
}

impl Session {
    /// Session backed by a local Ollama instance.
    pub fn new(config: Config) -> Self {
        let embedder = Box::new(OllamaEmbedder::new(&config.ollama));
        let chat = Box::new(OllamaChat::new(&config.ollama));
        Self::with_clients(config, embedder, chat)
    }

    /// Seam for alternate backends and model-free tests.
    pub fn with_clients(
        config: Config,
        embedder: Box<dyn EmbeddingClient>,
        chat: Box<dyn ChatClient>,
    ) -> Self {
        let scout = DiskScout::new(&config.scout);
        Self {
            config,
            index: None,
            scout,
            embedder,
            chat,
        }
    }

    /// Ingest one upload: normalize, chunk, embed, index. The previous
    /// index is discarded wholesale, never merged. Returns the number of
    /// chunks indexed.
    pub async fn ingest(&mut self, bytes: &[u8], filename: &str) -> Result<usize> {
        let docs = normalize_upload(bytes, filename, self.config.tabular.sample_rows)?;
        self.rebuild_index(docs).await
    }

    /// Ingest several uploads as one batch, building a single fresh index
    /// over all of them.
    pub async fn ingest_batch(&mut self, uploads: &[(Vec<u8>, String)]) -> Result<usize> {
        let mut docs = Vec::new();
        for (bytes, filename) in uploads {
            docs.extend(normalize_upload(
                bytes,
                filename,
                self.config.tabular.sample_rows,
            )?);
        }
        self.rebuild_index(docs).await
    }

    async fn rebuild_index(&mut self, docs: Vec<NormalizedDocument>) -> Result<usize> {
        let chunks = chunk_documents(
            &docs,
            self.config.chunking.chunk_chars,
            self.config.chunking.overlap_chars,
        );
        let index = VectorIndex::build(chunks, self.embedder.as_ref()).await?;
        let count = index.len();
        self.index = Some(index);
        Ok(count)
    }

    /// Answer from the uploaded-document index.
    pub async fn ask_uploads(&self, query: &str) -> Result<UploadAnswer> {
        retrieve::answer_question(
            query,
            self.index.as_ref(),
            self.embedder.as_ref(),
            self.chat.as_ref(),
            &self.config,
        )
        .await
    }

    /// Answer from allow-listed local files: extract a keyword, scout,
    /// read each match lazily, assemble, ask.
    pub async fn ask_disk(&self, query: &str) -> Result<DiskAnswer> {
        let keyword = keyword::extract(query, self.chat.as_ref(), &self.config).await;
        let matches = self.scout.scout_files(&keyword);
        assemble::answer_from_files(
            query,
            &keyword,
            &matches,
            &self.scout,
            self.chat.as_ref(),
            &self.config,
        )
        .await
    }

    /// Grant scouting permission for a directory.
    pub fn grant(&mut self, path: &str) -> (bool, String) {
        self.scout.add_path(path)
    }

    pub fn allowed_paths(&self) -> &[PathBuf] {
        self.scout.allowed_paths()
    }

    /// Number of chunks in the current index, if any.
    pub fn indexed_chunks(&self) -> Option<usize> {
        self.index.as_ref().map(VectorIndex::len)
    }

    /// Forget everything: drop the index and clear every granted path.
    pub fn forget(&mut self) {
        self.index = None;
        self.scout.forget();
    }
}
