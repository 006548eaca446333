//! Permission-gated disk scouting.
//!
//! A session-scoped allow-list of directories gates every filesystem
//! operation. Scouting enumerates files under allow-listed subtrees whose
//! name or probed content matches a keyword; full contents are read lazily,
//! one file at a time, never during enumeration.
//!
//! Match rule (documented decision): a file matches when the lowercased
//! keyword is a substring of its lowercased file name, or of the lossy
//! UTF-8 decode of its first `content_probe_bytes` bytes. The probe bound
//! keeps scouting from reading whole files.

use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::ScoutConfig;
use crate::error::Result;
use crate::models::ScoutMatch;

pub struct DiskScout {
    allowed: Vec<PathBuf>,
    probe_bytes: u64,
}

impl DiskScout {
    pub fn new(config: &ScoutConfig) -> Self {
        Self {
            allowed: Vec::new(),
            probe_bytes: config.content_probe_bytes,
        }
    }

    pub fn allowed_paths(&self) -> &[PathBuf] {
        &self.allowed
    }

    /// Validate a path and add it to the allow-list. Rejections surface
    /// through the returned message, never as an error value; the
    /// allow-list is unchanged on rejection.
    pub fn add_path(&mut self, path: &str) -> (bool, String) {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return (false, "path is empty".to_string());
        }

        let canonical = match std::fs::canonicalize(trimmed) {
            Ok(canonical) => canonical,
            Err(e) => return (false, format!("cannot access {}: {}", trimmed, e)),
        };
        if !canonical.is_dir() {
            return (false, format!("{} is not a directory", canonical.display()));
        }

        if self.allowed.contains(&canonical) {
            return (true, format!("{} is already allowed", canonical.display()));
        }
        let message = format!("access granted to {}", canonical.display());
        self.allowed.push(canonical);
        (true, message)
    }

    /// Enumerate matching files under the allow-listed subtrees, in
    /// deterministic path order. Unreadable entries are skipped, not fatal.
    pub fn scout_files(&self, keyword: &str) -> Vec<ScoutMatch> {
        let needle = keyword.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut matches = Vec::new();
        for root in &self.allowed {
            for entry in WalkDir::new(root).sort_by_file_name() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(_) => continue,
                };
                if !entry.file_type().is_file() {
                    continue;
                }

                let name = entry.file_name().to_string_lossy().into_owned();
                let hit = name.to_lowercase().contains(&needle)
                    || self.probe_content(entry.path(), &needle);
                if hit && seen.insert(entry.path().to_path_buf()) {
                    matches.push(ScoutMatch {
                        name,
                        path: entry.into_path(),
                    });
                }
            }
        }
        matches
    }

    /// Read the full content of a scouted file on demand (lossy UTF-8).
    /// Truncation for prompt assembly happens at the point of use, not here.
    pub fn read_file_lazy(&self, scout_match: &ScoutMatch) -> Result<String> {
        let bytes = std::fs::read(&scout_match.path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Clear every granted path (session "forget").
    pub fn forget(&mut self) {
        self.allowed.clear();
    }

    fn probe_content(&self, path: &Path, needle: &str) -> bool {
        let file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(_) => return false,
        };
        let mut buf = Vec::new();
        if file.take(self.probe_bytes).read_to_end(&mut buf).is_err() {
            return false;
        }
        String::from_utf8_lossy(&buf).to_lowercase().contains(needle)
    }
}
