use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub scout: ScoutConfig,
    #[serde(default)]
    pub tabular: TabularConfig,
}

/// Local inference endpoint and model selection. Two logical roles: a
/// general reasoning model for grounded QA and a lighter model for keyword
/// extraction. Model choice is configuration, never hardwired logic.
#[derive(Debug, Deserialize, Clone)]
pub struct OllamaConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_qa_model")]
    pub qa_model: String,
    #[serde(default = "default_keyword_model")]
    pub keyword_model: String,
    #[serde(default = "default_embed_model")]
    pub embed_model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            qa_model: default_qa_model(),
            keyword_model: default_keyword_model(),
            embed_model: default_embed_model(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_qa_model() -> String {
    "phi3".to_string()
}
fn default_keyword_model() -> String {
    "llama3".to_string()
}
fn default_embed_model() -> String {
    "nomic-embed-text".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_chars")]
    pub chunk_chars: usize,
    #[serde(default = "default_overlap_chars")]
    pub overlap_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_chars: default_chunk_chars(),
            overlap_chars: default_overlap_chars(),
        }
    }
}

fn default_chunk_chars() -> usize {
    1500
}
fn default_overlap_chars() -> usize {
    150
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Chunks requested per query; capped at the index size at query time.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScoutConfig {
    /// Per-file content cap applied when assembling the disk prompt.
    #[serde(default = "default_max_file_chars")]
    pub max_file_chars: usize,
    /// Bytes of a file the scout may read when content-matching a keyword.
    #[serde(default = "default_content_probe_bytes")]
    pub content_probe_bytes: u64,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            max_file_chars: default_max_file_chars(),
            content_probe_bytes: default_content_probe_bytes(),
        }
    }
}

fn default_max_file_chars() -> usize {
    4000
}
fn default_content_probe_bytes() -> u64 {
    64 * 1024
}

#[derive(Debug, Deserialize, Clone)]
pub struct TabularConfig {
    /// Rows rendered in the sample section of a data card (the full table
    /// is always rendered as well).
    #[serde(default = "default_sample_rows")]
    pub sample_rows: usize,
}

impl Default for TabularConfig {
    fn default() -> Self {
        Self {
            sample_rows: default_sample_rows(),
        }
    }
}

fn default_sample_rows() -> usize {
    20
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.chunking.chunk_chars == 0 {
        anyhow::bail!("chunking.chunk_chars must be > 0");
    }
    if config.chunking.overlap_chars >= config.chunking.chunk_chars {
        anyhow::bail!("chunking.overlap_chars must be < chunking.chunk_chars");
    }
    if config.retrieval.top_k < 1 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }
    if config.scout.max_file_chars == 0 {
        anyhow::bail!("scout.max_file_chars must be > 0");
    }
    if config.ollama.base_url.trim().is_empty() {
        anyhow::bail!("ollama.base_url must not be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_policy() {
        let config = Config::default();
        assert_eq!(config.chunking.chunk_chars, 1500);
        assert_eq!(config.chunking.overlap_chars, 150);
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.scout.max_file_chars, 4000);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[ollama]\nqa_model = \"llama3.1\"").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.ollama.qa_model, "llama3.1");
        assert_eq!(config.ollama.keyword_model, "llama3");
        assert_eq!(config.retrieval.top_k, 3);
    }

    #[test]
    fn rejects_overlap_at_least_chunk_size() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[chunking]\nchunk_chars = 100\noverlap_chars = 100").unwrap();
        assert!(load_config(file.path()).is_err());
    }
}
