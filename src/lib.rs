//! # DocSense
//!
//! A local-first grounded document QA pipeline. Questions are answered by a
//! local language model strictly from retrieved text — either documents the
//! user uploads, or files on a permission-gated local filesystem subtree.
//!
//! ## Architecture
//!
//! ```text
//! Upload path:
//!   bytes ──▶ normalize ──▶ chunk ──▶ VectorIndex::build
//!                                          │
//!   query ──▶ embed ──▶ top-k cosine ──▶ grounded QA ──▶ answer + cited chunks
//!
//! Disk path:
//!   query ──▶ keyword extract ──▶ scout allow-listed dirs
//!                                          │
//!             lazy read + truncate ──▶ grounded QA ──▶ answer + accessed files
//! ```
//!
//! Both the index and the disk allow-list are session-scoped and purely
//! in-memory: replaced wholesale by re-ingestion or an explicit forget,
//! gone at process exit. Model calls are single blocking round trips to a
//! local Ollama instance with no retry and no timeout — a deliberate,
//! documented gap.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration (models, chunking, retrieval, scout) |
//! | [`models`] | Core data types |
//! | [`normalize`] | Multi-format upload normalization |
//! | [`chunk`] | Overlapping, offset-tagged chunking |
//! | [`embedding`] | Embedding seam + Ollama client + cosine similarity |
//! | [`chat`] | Chat seam + Ollama client |
//! | [`index`] | Ephemeral in-memory vector index |
//! | [`retrieve`] | Top-k grounded QA over the upload index |
//! | [`keyword`] | File-search keyword extraction with local fallback |
//! | [`scout`] | Allow-listed disk scouting and lazy reads |
//! | [`assemble`] | Bounded-context prompt assembly for the disk path |
//! | [`session`] | Explicit session object tying it all together |

pub mod assemble;
pub mod chat;
pub mod chunk;
pub mod config;
pub mod embedding;
pub mod error;
pub mod index;
pub mod keyword;
pub mod models;
pub mod normalize;
pub mod retrieve;
pub mod scout;
pub mod session;
