//! Knowledge-base document loading.
//!
//! Scans the configured directory for matching files and decodes each one
//! with a fixed encoding ladder: UTF-8 first, then Latin-1. Latin-1 assigns
//! every byte a code point, so non-UTF-8 input always decodes — files only
//! drop out of the knowledge base when they cannot be read at all, and that
//! is logged and skipped rather than raised. Loading a directory that yields
//! zero documents is valid.

use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use docent_core::models::SourceDocument;

use crate::config::Config;

pub fn load_documents(config: &Config) -> Result<Vec<SourceDocument>> {
    let root = &config.kb.dir;
    if !root.exists() {
        bail!("Knowledge base directory does not exist: {}", root.display());
    }

    let include_set = build_globset(&config.kb.include_globs)?;

    let mut documents = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if !include_set.is_match(relative) {
            continue;
        }

        // Document identity is the file name, which the reranking tiers
        // key on.
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Skipping unreadable file {}: {}", path.display(), e);
                continue;
            }
        };
        documents.push(SourceDocument {
            name,
            text: decode_text(&bytes),
        });
    }

    // Sort for deterministic ordering
    documents.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(documents)
}

/// Decode file contents: UTF-8 when valid, Latin-1 otherwise.
fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        // Latin-1 maps each byte directly to the same code point.
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
