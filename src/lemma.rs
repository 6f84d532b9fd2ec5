//! Dictionary-backed lemmatizer.
//!
//! Implements the core's [`Lemmatizer`](docent_core::provider::Lemmatizer)
//! capability with a plain TSV dictionary, so lemma-aware gating works
//! without any model runtime. Each line maps a surface form to its lemma,
//! optionally flagged as a stopword:
//!
//! ```text
//! # form<TAB>lemma[<TAB>stop]
//! duplicados	duplicado
//! que	que	stop
//! ```
//!
//! Forms absent from the dictionary lemmatize to themselves. When no
//! dictionary is configured the engine runs without a lemmatizer and the
//! gate falls back to raw tokens.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use docent_core::provider::{LemmaToken, Lemmatizer};

use crate::config::LemmatizerConfig;

/// Punctuation trimmed around surface forms before lookup.
fn trim_token(raw: &str) -> &str {
    raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '-' && c != '_')
}

pub struct DictionaryLemmatizer {
    lemmas: HashMap<String, String>,
    stopwords: HashSet<String>,
}

impl DictionaryLemmatizer {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read lemma dictionary: {}", path.display()))?;
        Self::parse(&content)
    }

    fn parse(content: &str) -> Result<Self> {
        let mut lemmas = HashMap::new();
        let mut stopwords = HashSet::new();

        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split('\t');
            let (Some(form), Some(lemma)) = (fields.next(), fields.next()) else {
                bail!("lemma dictionary line {} is not form<TAB>lemma", number + 1);
            };
            let form = form.trim().to_lowercase();
            let lemma = lemma.trim().to_lowercase();
            if form.is_empty() || lemma.is_empty() {
                bail!("lemma dictionary line {} has an empty field", number + 1);
            }
            if fields.next().map(str::trim) == Some("stop") {
                stopwords.insert(form.clone());
            }
            lemmas.insert(form, lemma);
        }

        Ok(Self { lemmas, stopwords })
    }
}

impl Lemmatizer for DictionaryLemmatizer {
    fn lemmatize(&self, text: &str) -> Vec<LemmaToken> {
        text.to_lowercase()
            .split_whitespace()
            .map(|raw| {
                let clean = trim_token(raw);
                let is_punctuation = clean.is_empty();
                let lemma = self
                    .lemmas
                    .get(clean)
                    .cloned()
                    .unwrap_or_else(|| clean.to_string());
                LemmaToken {
                    text: clean.to_string(),
                    lemma,
                    is_stopword: self.stopwords.contains(clean),
                    is_punctuation,
                }
            })
            .collect()
    }
}

/// Build the configured lemmatizer, if any.
pub fn create_lemmatizer(config: &LemmatizerConfig) -> Result<Option<Arc<dyn Lemmatizer>>> {
    match &config.dictionary {
        Some(path) => Ok(Some(Arc::new(DictionaryLemmatizer::from_file(path)?))),
        None => Ok(None),
    }
}
