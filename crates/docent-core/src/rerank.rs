//! Two-stage reranker: semantic distance adjusted by lexical source bonuses.
//!
//! Candidates arrive from the index ordered by raw distance. Each one gets an
//! adjusted score: candidates that lexically contain one of the question's
//! technical overlap terms earn a bonus scaled by their source document's
//! tier. The adjusted scores decide the order and the acceptance check, while
//! the reported confidence is always derived from the original, pre-bonus
//! distance.
//!
//! The acceptance threshold differs by evidence type: candidates with
//! technical-term evidence may sit further out than candidates without it.
//! The bonus can pull an authoritative source ahead of a semantically closer
//! one, but it never bypasses the threshold check itself.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::gate::{fold_accents, lemma_set};
use crate::index::Hit;
use crate::models::{Answer, Decision, RefusalReason};
use crate::provider::Lemmatizer;
use crate::vocab::{SourceTier, Vocabulary};

/// Floor applied to the winning distance before deriving confidence.
const CONFIDENCE_DISTANCE_FLOOR: f32 = 0.01;

/// Reranking thresholds and bonuses.
///
/// The defaults are calibrated against squared-L2 distances over normalized
/// multilingual sentence embeddings; they are tuning constants, not
/// probabilities.
#[derive(Debug, Clone)]
pub struct RerankParams {
    /// Acceptance ceiling for candidates with technical-term evidence.
    pub tech_threshold: f32,
    /// Acceptance ceiling for candidates without it.
    pub plain_threshold: f32,
    /// Distance bonus for definitional-tier sources.
    pub definitional_bonus: f32,
    /// Distance bonus for procedural-tier sources.
    pub procedural_bonus: f32,
}

impl Default for RerankParams {
    fn default() -> Self {
        Self {
            tech_threshold: 1.7,
            plain_threshold: 1.15,
            definitional_bonus: 0.6,
            procedural_bonus: 0.3,
        }
    }
}

pub struct Reranker {
    vocab: Arc<Vocabulary>,
    lemmatizer: Option<Arc<dyn Lemmatizer>>,
    params: RerankParams,
}

impl Reranker {
    pub fn new(
        vocab: Arc<Vocabulary>,
        lemmatizer: Option<Arc<dyn Lemmatizer>>,
        params: RerankParams,
    ) -> Self {
        Self {
            vocab,
            lemmatizer,
            params,
        }
    }

    /// Pick the best candidate or refuse.
    ///
    /// Candidates must arrive ascending by distance (the index's output
    /// order). The adjusted-score sort is stable, so candidates tying on the
    /// adjusted score resolve to the lower original distance.
    pub fn rerank(&self, candidates: &[Hit<'_>], overlap_terms: &BTreeSet<String>) -> Decision {
        struct Scored<'a, 'b> {
            hit: &'a Hit<'b>,
            adjusted: f32,
            has_tech: bool,
        }

        let mut scored: Vec<Scored<'_, '_>> = candidates
            .iter()
            .map(|hit| {
                let has_tech = self.chunk_has_tech(&hit.chunk.text, overlap_terms);
                let mut adjusted = hit.distance;
                if has_tech {
                    adjusted -= match self.vocab.tier(&hit.chunk.source) {
                        SourceTier::Definitional => self.params.definitional_bonus,
                        SourceTier::Procedural => self.params.procedural_bonus,
                        SourceTier::None => 0.0,
                    };
                }
                Scored {
                    hit,
                    adjusted: adjusted.max(0.0),
                    has_tech,
                }
            })
            .collect();

        scored.sort_by(|a, b| a.adjusted.total_cmp(&b.adjusted));

        for candidate in &scored {
            let threshold = if candidate.has_tech {
                self.params.tech_threshold
            } else {
                self.params.plain_threshold
            };
            if candidate.adjusted <= threshold {
                let floored = candidate.hit.distance.max(CONFIDENCE_DISTANCE_FLOOR);
                return Decision::Answer(Answer {
                    answer: candidate.hit.chunk.text.clone(),
                    source: candidate.hit.chunk.source.clone(),
                    confidence: 1.0 / (1.0 + f64::from(floored)),
                });
            }
        }
        Decision::refusal(RefusalReason::NoConfidentMatch)
    }

    /// True when any gate overlap term appears in the chunk, as a lemma or
    /// as an accent-folded substring.
    fn chunk_has_tech(&self, text: &str, overlap_terms: &BTreeSet<String>) -> bool {
        if overlap_terms.is_empty() {
            return false;
        }
        let lowered = text.to_lowercase();
        let folded = fold_accents(&lowered);
        let lemmas = lemma_set(self.lemmatizer.as_deref(), &lowered);
        overlap_terms
            .iter()
            .any(|term| lemmas.contains(term) || folded.contains(term.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Chunk;

    fn chunk(text: &str, source: &str) -> Chunk {
        Chunk {
            text: text.to_string(),
            source: source.to_string(),
            header: None,
        }
    }

    fn reranker() -> Reranker {
        Reranker::new(Arc::new(Vocabulary::builtin()), None, RerankParams::default())
    }

    fn overlap(terms: &[&str]) -> BTreeSet<String> {
        terms.iter().map(|t| t.to_string()).collect()
    }

    fn hits<'a>(pairs: &'a [(Chunk, f32)]) -> Vec<Hit<'a>> {
        pairs
            .iter()
            .map(|(chunk, distance)| Hit {
                chunk,
                distance: *distance,
            })
            .collect()
    }

    #[test]
    fn test_empty_candidates_refuse() {
        let decision = reranker().rerank(&[], &overlap(&["cups"]));
        match decision {
            Decision::Refusal(r) => assert_eq!(r.reason, RefusalReason::NoConfidentMatch),
            Decision::Answer(_) => panic!("expected refusal"),
        }
    }

    #[test]
    fn test_tech_candidate_clears_wider_threshold() {
        // 1.5 is above the plain ceiling but below the tech one.
        let pairs = [(chunk("CUPS: classification of procedures", "notas.md"), 1.5)];
        let decision = reranker().rerank(&hits(&pairs), &overlap(&["cups"]));
        assert!(matches!(decision, Decision::Answer(_)));
    }

    #[test]
    fn test_plain_candidate_needs_tighter_threshold() {
        let pairs = [(chunk("a passage without the term at all", "notas.md"), 1.5)];
        let decision = reranker().rerank(&hits(&pairs), &overlap(&["cups"]));
        assert!(decision.is_refusal());

        let pairs = [(chunk("a passage without the term at all", "notas.md"), 1.1)];
        let decision = reranker().rerank(&hits(&pairs), &overlap(&["cups"]));
        assert!(matches!(decision, Decision::Answer(_)));
    }

    #[test]
    fn test_definitional_bonus_reorders() {
        // The glossary chunk starts further away but the bonus pulls it
        // ahead: 1.3 - 0.6 = 0.7 < 0.9.
        let pairs = [
            (chunk("cups appears in this ordinary note", "notas.md"), 0.9),
            (chunk("cups appears in the glossary entry", "definiciones.md"), 1.3),
        ];
        let decision = reranker().rerank(&hits(&pairs), &overlap(&["cups"]));
        match decision {
            Decision::Answer(a) => assert_eq!(a.source, "definiciones.md"),
            Decision::Refusal(_) => panic!("expected answer"),
        }
    }

    #[test]
    fn test_procedural_bonus_is_moderate() {
        // 1.1 - 0.3 = 0.8 beats 0.9; a 0.6 bonus would not have been needed.
        let pairs = [
            (chunk("cups appears in this ordinary note", "notas.md"), 0.9),
            (chunk("cups appears in the operations faq", "faq_operativa.md"), 1.1),
        ];
        let decision = reranker().rerank(&hits(&pairs), &overlap(&["cups"]));
        match decision {
            Decision::Answer(a) => assert_eq!(a.source, "faq_operativa.md"),
            Decision::Refusal(_) => panic!("expected answer"),
        }
    }

    #[test]
    fn test_no_bonus_without_lexical_match() {
        // A glossary chunk that does not contain the overlap term gets no
        // bonus and loses to the closer candidate.
        let pairs = [
            (chunk("cups appears in this ordinary note", "notas.md"), 0.9),
            (chunk("an unrelated glossary entry", "definiciones.md"), 1.3),
        ];
        let decision = reranker().rerank(&hits(&pairs), &overlap(&["cups"]));
        match decision {
            Decision::Answer(a) => assert_eq!(a.source, "notas.md"),
            Decision::Refusal(_) => panic!("expected answer"),
        }
    }

    #[test]
    fn test_adjusted_score_clamped_at_zero() {
        // 0.2 - 0.6 clamps to 0.0 rather than going negative; the candidate
        // still wins and reports confidence from the original distance.
        let pairs = [(chunk("cups in the glossary", "definiciones.md"), 0.2)];
        let decision = reranker().rerank(&hits(&pairs), &overlap(&["cups"]));
        match decision {
            Decision::Answer(a) => {
                assert!((a.confidence - 1.0 / 1.2).abs() < 1e-6);
            }
            Decision::Refusal(_) => panic!("expected answer"),
        }
    }

    #[test]
    fn test_tie_resolves_to_lower_original_distance() {
        // Both adjust to 0.7: the first entered the index closer and must
        // win the stable sort.
        let pairs = [
            (chunk("cups note number one", "notas.md"), 0.7),
            (chunk("cups in the glossary", "definiciones.md"), 1.3),
        ];
        let decision = reranker().rerank(&hits(&pairs), &overlap(&["cups"]));
        match decision {
            Decision::Answer(a) => assert_eq!(a.source, "notas.md"),
            Decision::Refusal(_) => panic!("expected answer"),
        }
    }

    #[test]
    fn test_confidence_uses_original_distance_not_adjusted() {
        let pairs = [(chunk("cups in the glossary", "definiciones.md"), 1.0)];
        let decision = reranker().rerank(&hits(&pairs), &overlap(&["cups"]));
        match decision {
            // 1 / (1 + 1.0), not 1 / (1 + 0.4).
            Decision::Answer(a) => assert!((a.confidence - 0.5).abs() < 1e-6),
            Decision::Refusal(_) => panic!("expected answer"),
        }
    }

    #[test]
    fn test_confidence_monotonically_decreasing() {
        let near = [(chunk("cups note sitting near the query", "notas.md"), 0.3)];
        let far = [(chunk("cups note sitting further away", "notas.md"), 0.8)];
        let reranker = reranker();
        let terms = overlap(&["cups"]);
        let (Decision::Answer(a), Decision::Answer(b)) =
            (reranker.rerank(&hits(&near), &terms), reranker.rerank(&hits(&far), &terms))
        else {
            panic!("expected answers");
        };
        assert!(a.confidence > b.confidence);
    }

    #[test]
    fn test_confidence_floor() {
        let pairs = [(chunk("cups at zero distance from query", "notas.md"), 0.0)];
        let decision = reranker().rerank(&hits(&pairs), &overlap(&["cups"]));
        match decision {
            Decision::Answer(a) => assert!((a.confidence - 1.0 / 1.01).abs() < 1e-6),
            Decision::Refusal(_) => panic!("expected answer"),
        }
    }

    #[test]
    fn test_accent_folded_substring_match() {
        // Overlap term "clasificacion" must match the accented chunk text.
        let pairs = [(
            chunk("CUPS: Clasificación Única de Procedimientos en Salud", "definiciones.md"),
            1.6,
        )];
        let decision = reranker().rerank(&hits(&pairs), &overlap(&["clasificacion"]));
        assert!(matches!(decision, Decision::Answer(_)));
    }

    #[test]
    fn test_nothing_clears_thresholds() {
        let pairs = [
            (chunk("cups mentioned but very far away", "notas.md"), 2.5),
            (chunk("nothing relevant in this chunk", "notas.md"), 2.0),
        ];
        let decision = reranker().rerank(&hits(&pairs), &overlap(&["cups"]));
        assert!(decision.is_refusal());
    }
}
