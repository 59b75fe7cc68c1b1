//! idetect Extractor - Displacement fact extraction
//!
//! Walks dependency parses of news articles and extracts structured
//! displacement reports: who or what was affected (reporting unit), by what
//! event (reporting term), how many (quantity) and where (locations), along
//! with character offsets for highlighting the evidence in the article.
//!
//! The parser itself is an external collaborator behind [`ParseAdapter`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use idetect_core::{FactType, Figure, HighlightSpan, ReportingTerm, ReportingUnit, Result};

use crate::parse::{ParsedDocument, TokenRange};

pub mod adapter;
pub mod arguments;
pub mod date;
pub mod interpreter;
pub mod location;
pub mod normalize;
pub mod parse;
pub mod quantity;
pub mod record;
pub mod relevance;
pub mod report;
pub mod vocabulary;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use adapter::PreparsedAdapter;
pub use interpreter::Interpreter;
pub use normalize::cleanup;
pub use vocabulary::{VocabularyAxis, VocabularyIndex};

/// Trait for dependency parsers
///
/// Implementations must be safe to share read-only across threads.
pub trait ParseAdapter: Send + Sync {
    /// Tokenize, tag, parse and segment a text
    fn parse(&self, text: &str) -> Result<ParsedDocument>;

    /// Lemmas of the tokens of a text
    fn lemmatize(&self, text: &str) -> Result<Vec<String>> {
        Ok(self
            .parse(text)?
            .tokens()
            .iter()
            .map(|t| t.lemma.clone())
            .collect())
    }
}

// ============================================================================
// Facts
// ============================================================================

/// A token or span tagged with its role in a report.
///
/// Offsets are document-level character offsets. A fact that was not found
/// is represented by `Option::None` at the use site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fact {
    pub kind: FactType,
    /// Anchor token (the first token for spans, the verb for term phrases)
    pub token: usize,
    pub span: TokenRange,
    pub text: String,
    pub lemma: String,
    pub start: usize,
    pub end: usize,
}

impl Fact {
    /// Fact covering a single token
    pub fn from_token(doc: &ParsedDocument, index: usize, kind: FactType) -> Self {
        let token = doc.token(index);
        Self {
            kind,
            token: index,
            span: TokenRange::single(index),
            text: token.text.clone(),
            lemma: token.lemma.clone(),
            start: token.idx,
            end: token.end_idx(),
        }
    }

    /// Fact covering a token span, anchored at `anchor`
    pub fn from_span(
        doc: &ParsedDocument,
        anchor: usize,
        span: TokenRange,
        lemma: impl Into<String>,
        kind: FactType,
    ) -> Self {
        let text = doc.span_text(span).to_string();
        let start = doc.span_offsets(span).0;
        Self {
            kind,
            token: anchor,
            span,
            end: start + text.len(),
            text,
            lemma: lemma.into(),
            start,
        }
    }

    pub fn highlight(&self) -> HighlightSpan {
        HighlightSpan {
            kind: self.kind,
            start: self.start,
            end: self.end,
        }
    }
}

// ============================================================================
// Reports
// ============================================================================

/// A candidate displacement report for one verb occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub reporting_unit: ReportingUnit,
    pub reporting_term: ReportingTerm,
    /// Location names, possibly inherited from an earlier sentence
    pub locations: Vec<String>,
    pub sentence_start: usize,
    pub sentence_end: usize,
    /// Highlight spans for the term, quantity and own locations
    pub tag_spans: Vec<HighlightSpan>,
    pub quantity: Option<Figure>,
    /// Index of the sentence that produced the report
    pub sentence_idx: Option<usize>,
}

impl Report {
    /// Quantity as the `(specific, vague)` pair of the fact table
    pub fn figures(&self) -> (Option<u64>, Option<String>) {
        match &self.quantity {
            Some(Figure::Specific(value)) => (Some(*value), None),
            Some(Figure::Vague(text)) => (None, Some(text.clone())),
            None => (None, None),
        }
    }

    /// Earliest start offset among the non-location highlight spans
    pub fn first_tag_start(&self) -> Option<usize> {
        self.tag_spans
            .iter()
            .filter(|s| s.kind != FactType::Loc)
            .map(|s| s.start)
            .min()
    }
}

/// Reports and event dates extracted from one article
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleAnalysis {
    pub reports: Vec<Report>,
    pub dates: Vec<NaiveDate>,
}

// ============================================================================
// Tests
// ============================================================================
