//! `docent eval` — run a file of queries and summarize the decisions.
//!
//! The query file holds one question per line; blank lines and `#` comments
//! are skipped. Useful for regression-checking gate and threshold behavior
//! against a knowledge base after editing documents or vocabulary.

use std::path::Path;

use anyhow::{Context, Result};

use docent_core::models::Decision;

use crate::bootstrap;
use crate::config::Config;

pub async fn run_eval(config: &Config, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read query file: {}", file.display()))?;

    let engine = bootstrap::build_engine(config).await?;

    let mut answered = 0usize;
    let mut refused = 0usize;

    for line in content.lines() {
        let question = line.trim();
        if question.is_empty() || question.starts_with('#') {
            continue;
        }
        match engine.ask(question).await? {
            Decision::Answer(answer) => {
                answered += 1;
                println!(
                    "answer   {:.2}  {}  [{}]",
                    answer.confidence, question, answer.source
                );
            }
            Decision::Refusal(refusal) => {
                refused += 1;
                println!("refuse   {}  {}", refusal.reason, question);
            }
        }
    }

    println!();
    println!("answered: {}", answered);
    println!("refused: {}", refused);
    println!("ok");

    Ok(())
}
