//! `docent ask` — answer a single question from the command line.

use anyhow::Result;

use docent_core::models::{Decision, RefusalReason};

use crate::bootstrap;
use crate::config::Config;

pub async fn run_ask(config: &Config, question: &str) -> Result<()> {
    let engine = bootstrap::build_engine(config).await?;
    let decision = engine.ask(question).await?;
    print_decision(&decision);
    Ok(())
}

pub fn print_decision(decision: &Decision) {
    match decision {
        Decision::Answer(answer) => {
            println!("{}", answer.answer);
            println!();
            println!(
                "source: {}  confidence: {:.0}%",
                answer.source,
                answer.confidence * 100.0
            );
        }
        Decision::Refusal(refusal) => match refusal.reason {
            RefusalReason::OutOfDomain => {
                println!("refused ({}): the question falls outside the supported technical domain.", refusal.reason);
            }
            RefusalReason::NoConfidentMatch => {
                println!("refused ({}): no passage in the knowledge base answers this confidently.", refusal.reason);
            }
        },
    }
}
