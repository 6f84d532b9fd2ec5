//! Heading- and list-aware document chunker.
//!
//! Splits raw documents into passages along lightweight markdown structure.
//! Each line steers a small accumulator: headings close the open passage and
//! become the header context for the passages that follow, blank lines close
//! the open passage, and list or question starters close it and seed a new
//! one. Everything else accumulates.
//!
//! # Algorithm
//!
//! 1. Drop `\r` and trim each line.
//! 2. Classify the line: blank, heading (`#` prefix), list start (`* `,
//!    `- `, `¿`, `•`, or `N.`), or plain text.
//! 3. Blank and heading lines flush the accumulator; heading lines then
//!    replace the active header context (markup stripped). A blank line does
//!    *not* reset the header context.
//! 4. List starts flush, then seed the next passage with the marker line.
//! 5. At end of document, flush whatever remains.
//!
//! The flush joins accumulated lines with single spaces, prefixes
//! `"{header}: "` when a header is active and the text does not already start
//! with it, collapses whitespace runs, and emits the passage only when the
//! final text is longer than [`MIN_CHUNK_CHARS`] characters. Shorter spans
//! are discarded silently.

use crate::models::{Chunk, SourceDocument};

/// Minimum passage length, in characters. Anything at or below this after
/// prefixing and normalization is discarded rather than indexed.
pub const MIN_CHUNK_CHARS: usize = 15;

/// How a single trimmed line steers the accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Blank,
    Heading,
    ListStart,
    Text,
}

fn classify(line: &str) -> LineKind {
    if line.is_empty() {
        return LineKind::Blank;
    }
    if line.starts_with('#') {
        return LineKind::Heading;
    }
    if line.starts_with("* ")
        || line.starts_with("- ")
        || line.starts_with('¿')
        || line.starts_with('•')
    {
        return LineKind::ListStart;
    }
    // Numbered enumeration: a digit followed by '.', with content after.
    let mut chars = line.chars();
    if let (Some(first), Some(second), Some(_)) = (chars.next(), chars.next(), chars.next()) {
        if first.is_ascii_digit() && second == '.' {
            return LineKind::ListStart;
        }
    }
    LineKind::Text
}

/// Open-passage accumulator with a pure flush transition.
///
/// An empty accumulator is the idle state; pushing a line opens a passage.
struct Accumulator<'a> {
    lines: Vec<&'a str>,
}

impl<'a> Accumulator<'a> {
    fn new() -> Self {
        Self { lines: Vec::new() }
    }

    fn push(&mut self, line: &'a str) {
        self.lines.push(line);
    }

    /// Close the open passage and return it as a chunk when long enough.
    /// Clears the accumulator either way.
    fn flush(&mut self, header: Option<&str>, source: &str) -> Option<Chunk> {
        if self.lines.is_empty() {
            return None;
        }
        let joined = self.lines.join(" ");
        self.lines.clear();

        let prefixed = match header {
            Some(h) if !h.is_empty() && !joined.starts_with(h) => format!("{}: {}", h, joined),
            _ => joined,
        };
        let text = collapse_whitespace(&prefixed);
        if text.chars().count() <= MIN_CHUNK_CHARS {
            return None;
        }
        Some(Chunk {
            text,
            source: source.to_string(),
            header: header.filter(|h| !h.is_empty()).map(str::to_string),
        })
    }
}

/// Collapse internal whitespace runs to single spaces and trim the ends.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Chunk a sequence of documents in order.
///
/// Documents that produce zero chunks are a valid, empty contribution.
pub fn chunk_documents(documents: &[SourceDocument]) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for doc in documents {
        chunk_document(doc, &mut chunks);
    }
    chunks
}

/// Chunk a single document, appending to `out`.
pub fn chunk_document(doc: &SourceDocument, out: &mut Vec<Chunk>) {
    let text = doc.text.replace('\r', "");
    let mut header: Option<String> = None;
    let mut open = Accumulator::new();

    for raw in text.split('\n') {
        let line = raw.trim();
        match classify(line) {
            LineKind::Blank => {
                out.extend(open.flush(header.as_deref(), &doc.name));
            }
            LineKind::Heading => {
                out.extend(open.flush(header.as_deref(), &doc.name));
                header = Some(line.trim_matches(|c| c == '#' || c == ' ').to_string());
            }
            LineKind::ListStart => {
                out.extend(open.flush(header.as_deref(), &doc.name));
                open.push(line);
            }
            LineKind::Text => open.push(line),
        }
    }
    out.extend(open.flush(header.as_deref(), &doc.name));
}
