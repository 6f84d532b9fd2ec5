//! Process-wide vocabulary: technical terms, noise triggers, and source
//! tiers.
//!
//! Loaded once at construction and never mutated afterward, so the gate and
//! reranker can share a [`Vocabulary`] across concurrent queries without
//! locking. The built-in sets cover the Spanish-language analytics knowledge
//! base the system ships with; deployments with a different corpus swap them
//! out through configuration.

use std::collections::{BTreeMap, BTreeSet};

/// Reranking tier assigned to a source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTier {
    /// Glossary-style sources; strongest bonus.
    Definitional,
    /// FAQ, policy, and instruction sources; moderate bonus.
    Procedural,
    /// Everything else; no bonus.
    None,
}

#[derive(Debug, Clone)]
pub struct Vocabulary {
    technical_terms: BTreeSet<String>,
    noise_triggers: BTreeSet<String>,
    tiers: BTreeMap<String, SourceTier>,
}

impl Vocabulary {
    pub fn new<T, N, D, P>(technical_terms: T, noise_triggers: N, definitional: D, procedural: P) -> Self
    where
        T: IntoIterator<Item = String>,
        N: IntoIterator<Item = String>,
        D: IntoIterator<Item = String>,
        P: IntoIterator<Item = String>,
    {
        let mut tiers = BTreeMap::new();
        for name in definitional {
            tiers.insert(name, SourceTier::Definitional);
        }
        for name in procedural {
            tiers.insert(name, SourceTier::Procedural);
        }
        Self {
            technical_terms: technical_terms.into_iter().collect(),
            noise_triggers: noise_triggers.into_iter().collect(),
            tiers,
        }
    }

    /// The built-in analytics-domain vocabulary.
    pub fn builtin() -> Self {
        Self::new(
            builtin_technical_terms().iter().map(|s| s.to_string()),
            builtin_noise_triggers().iter().map(|s| s.to_string()),
            builtin_definitional_sources().iter().map(|s| s.to_string()),
            builtin_procedural_sources().iter().map(|s| s.to_string()),
        )
    }

    pub fn technical_terms(&self) -> &BTreeSet<String> {
        &self.technical_terms
    }

    pub fn noise_triggers(&self) -> &BTreeSet<String> {
        &self.noise_triggers
    }

    /// Tier for a document identifier; unknown documents get no bonus.
    pub fn tier(&self, source: &str) -> SourceTier {
        self.tiers.get(source).copied().unwrap_or(SourceTier::None)
    }
}

/// Closed set of lemmas and tokens recognized as in-domain.
pub fn builtin_technical_terms() -> &'static [&'static str] {
    &[
        "cups", "dx", "kpi", "json", "parquet", "bigquery", "airflow", "cala", "web", "app",
        "call", "medico", "diagnostico", "atencion", "facturado", "calidad", "error", "tasa",
        "arquitectura", "propuesta", "pipeline", "transaccional", "procesamiento", "duplicado",
        "limpieza", "ciudad", "clasificacion", "salud", "procedimiento", "cie-10", "identificar",
        "intervencion", "login", "click", "compra", "autenticacion", "interaccion", "digital",
        "politica", "total", "promedio", "evento", "instruccion", "prueba", "cliente", "csv",
        "json_detalle", "orquestacion", "gcp", "nube", "fallo", "sistema", "valido", "procesada",
        "descartado", "facturacion", "distribucion", "canal", "alfanumerico", "estandarizada",
        "reporte", "resultado", "financiero", "documento", "limpiar", "objetivo", "insumo",
        "particion", "consulta", "optimizado", "idempotente", "despliegue", "composer", "faiss",
        "endpoint", "health", "ask", "tecnico", "tecnica",
    ]
}

/// Lemmas that mark a question as out-of-domain chit-chat when no technical
/// term is present.
pub fn builtin_noise_triggers() -> &'static [&'static str] {
    &[
        "sol", "pizza", "color", "clima", "mundial", "dolar", "helado", "avion", "gato",
        "presidente", "musica", "hambre", "francia", "pasta", "precio", "capital", "vendes",
        "volar", "receta", "cuanto", "mas",
    ]
}

/// Source documents carrying the strongest reranking bonus.
pub fn builtin_definitional_sources() -> &'static [&'static str] {
    &["definiciones.md", "glosario_eventos.md"]
}

/// Source documents carrying the moderate reranking bonus.
pub fn builtin_procedural_sources() -> &'static [&'static str] {
    &["faq_operativa.md", "politicas.md", "instrucciones.md"]
}
