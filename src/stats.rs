//! `docent chunks` — chunk the knowledge base without embedding anything.
//!
//! Build-path visibility that needs no embedding provider: shows what the
//! chunker extracts from each document before an index is ever built.

use std::collections::BTreeMap;

use anyhow::Result;

use docent_core::chunk::chunk_documents;

use crate::config::Config;
use crate::kb;

pub fn run_chunks(config: &Config) -> Result<()> {
    let documents = kb::load_documents(config)?;
    let chunks = chunk_documents(&documents);

    let mut per_document: BTreeMap<&str, usize> = BTreeMap::new();
    for doc in &documents {
        per_document.insert(&doc.name, 0);
    }
    for chunk in &chunks {
        *per_document.entry(&chunk.source).or_insert(0) += 1;
    }

    println!("knowledge base {}", config.kb.dir.display());
    for (name, count) in &per_document {
        println!("  {}: {} chunks", name, count);
    }
    println!(
        "  total: {} chunks from {} documents",
        chunks.len(),
        documents.len()
    );
    println!("ok");

    Ok(())
}
