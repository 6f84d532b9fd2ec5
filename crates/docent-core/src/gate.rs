//! Lexical domain gate.
//!
//! Decides whether a question belongs to the supported technical domain by
//! intersecting its lemmas and raw tokens with a closed vocabulary, and
//! whether it trips a known noise trigger. Classification is case- and
//! accent-insensitive.
//!
//! The gate itself only classifies; the rejection policy (noise trigger with
//! no technical overlap) is applied by the engine through
//! [`GateDecision::rejects`], so ambiguous questions that hit both sets
//! still flow through to retrieval.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::provider::Lemmatizer;
use crate::vocab::Vocabulary;

/// Punctuation trimmed from token ends before matching.
const TOKEN_TRIM: &[char] = &['?', ',', '.', '¿', '(', ')', '¡', '!'];

/// Gate verdict for one question.
#[derive(Debug, Clone)]
pub struct GateDecision {
    /// The question shares at least one lemma or token with the technical
    /// vocabulary.
    pub is_technical: bool,
    /// The vocabulary terms that decided `is_technical`; empty when the
    /// question is not technical.
    pub overlap_terms: BTreeSet<String>,
    /// The question contains a known out-of-domain trigger word.
    pub noise_hit: bool,
}

impl GateDecision {
    /// The rejection policy: a noise trigger with no technical overlap.
    pub fn rejects(&self) -> bool {
        self.noise_hit && !self.is_technical
    }
}

pub struct LexicalGate {
    vocab: Arc<Vocabulary>,
    lemmatizer: Option<Arc<dyn Lemmatizer>>,
}

impl LexicalGate {
    pub fn new(vocab: Arc<Vocabulary>, lemmatizer: Option<Arc<dyn Lemmatizer>>) -> Self {
        Self { vocab, lemmatizer }
    }

    /// Classify a question.
    ///
    /// Lemma overlap with the technical vocabulary wins; the raw token set
    /// is only consulted when the lemma intersection comes up empty (it
    /// catches acronyms the lemmatizer mangles or passes through attached
    /// punctuation).
    pub fn classify(&self, question: &str) -> GateDecision {
        let lowered = question.to_lowercase();
        let words = token_set(&lowered);
        let lemmas = lemma_set(self.lemmatizer.as_deref(), &lowered);

        let mut overlap: BTreeSet<String> = lemmas
            .intersection(self.vocab.technical_terms())
            .cloned()
            .collect();
        if overlap.is_empty() {
            overlap = words
                .intersection(self.vocab.technical_terms())
                .cloned()
                .collect();
        }
        let noise_hit = !words.is_disjoint(self.vocab.noise_triggers());

        GateDecision {
            is_technical: !overlap.is_empty(),
            overlap_terms: overlap,
            noise_hit,
        }
    }
}

/// Lowercased, punctuation-trimmed, accent-folded tokens of length > 1.
pub(crate) fn token_set(lowered: &str) -> BTreeSet<String> {
    lowered
        .split_whitespace()
        .map(|w| w.trim_matches(TOKEN_TRIM))
        .filter(|w| w.chars().count() > 1)
        .map(fold_accents)
        .collect()
}

/// Lemma set for arbitrary text, accent-folded.
///
/// With a lemmatizer: its tokens, filtered by the stopword/punctuation flags
/// and a surface length > 1. Without one: the raw whitespace-split tokens of
/// the lowercased text.
pub(crate) fn lemma_set(lemmatizer: Option<&dyn Lemmatizer>, lowered: &str) -> BTreeSet<String> {
    match lemmatizer {
        Some(lemmatizer) => lemmatizer
            .lemmatize(lowered)
            .into_iter()
            .filter(|t| !t.is_stopword && !t.is_punctuation && t.text.chars().count() > 1)
            .map(|t| fold_accents(&t.lemma.to_lowercase()))
            .collect(),
        None => lowered.split_whitespace().map(fold_accents).collect(),
    }
}

/// Strip accents over the Latin range: `"Bogotá"` folds to `"bogota"`.
///
/// Equivalent to NFD decomposition with combining marks removed, hand-rolled
/// for the characters that occur in the supported vocabularies; anything
/// unrecognized passes through unchanged.
pub(crate) fn fold_accents(token: impl AsRef<str>) -> String {
    token
        .as_ref()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            'Á' | 'À' | 'Ä' | 'Â' | 'Ã' => 'A',
            'É' | 'È' | 'Ë' | 'Ê' => 'E',
            'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
            'Ó' | 'Ò' | 'Ö' | 'Ô' | 'Õ' => 'O',
            'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
            'Ñ' => 'N',
            'Ç' => 'C',
            _ => c,
        })
        .collect()
}
