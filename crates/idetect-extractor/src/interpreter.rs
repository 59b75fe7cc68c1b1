//! Article interpretation
//!
//! Processes an article one sentence at a time. Each relevant main verb may
//! produce a report; one report per sentence is kept. Locations seen in a
//! sentence are remembered and lent to later sentences that mention none.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use idetect_core::{AppConfig, ExtractionConfig, ReportingUnit, Result};

use crate::arguments::main_verbs;
use crate::date::DateResolver;
use crate::location::extract_locations;
use crate::normalize::cleanup;
use crate::parse::{EntityLabel, ParsedDocument, Sentence};
use crate::relevance::verb_relevance;
use crate::report::ReportBuilder;
use crate::vocabulary::VocabularyIndex;
use crate::{ArticleAnalysis, Fact, ParseAdapter, Report};

/// Rule-based displacement interpreter
///
/// Holds only read-only state, so one instance can serve many articles
/// concurrently.
pub struct Interpreter {
    parser: Arc<dyn ParseAdapter>,
    vocabulary: Arc<VocabularyIndex>,
    dates: DateResolver,
}

impl Interpreter {
    pub fn new(parser: Arc<dyn ParseAdapter>, vocabulary: Arc<VocabularyIndex>) -> Self {
        Self {
            parser,
            vocabulary,
            dates: DateResolver::default(),
        }
    }

    /// Create with extraction settings
    pub fn with_config(
        parser: Arc<dyn ParseAdapter>,
        vocabulary: Arc<VocabularyIndex>,
        config: &ExtractionConfig,
    ) -> Self {
        Self {
            parser,
            vocabulary,
            dates: DateResolver::new(config.max_date_age_days),
        }
    }

    /// Build the vocabulary through the parser, then create the interpreter
    pub fn from_config(parser: Arc<dyn ParseAdapter>, config: &AppConfig) -> Result<Self> {
        let vocabulary = VocabularyIndex::build(parser.as_ref(), &config.vocabulary)?;
        Ok(Self::with_config(
            parser,
            Arc::new(vocabulary),
            &config.extraction,
        ))
    }

    pub fn vocabulary(&self) -> &VocabularyIndex {
        &self.vocabulary
    }

    /// Clean, parse and interpret an article.
    ///
    /// Event dates need the publication date; use [`Interpreter::analyze`]
    /// to get both from one parse.
    pub fn process_article(&self, text: &str) -> Result<Vec<Report>> {
        let doc = self.parser.parse(&cleanup(text))?;
        Ok(self.process_document(&doc))
    }

    /// Interpret an already parsed article
    pub fn process_document(&self, doc: &ParsedDocument) -> Vec<Report> {
        let mut memory: Vec<Fact> = Vec::new();
        let mut processed = Vec::new();

        for sentence in doc.sentences() {
            let mut reports = self.process_sentence(&sentence, &memory);

            let current = extract_locations(&sentence, None);
            if !current.is_empty() {
                memory = current;
                debug!(
                    sentence = sentence.index(),
                    locations = ?memory.iter().map(|l| l.text.as_str()).collect::<Vec<_>>(),
                    "Location memory updated"
                );
            }

            for report in &mut reports {
                report.sentence_idx = Some(sentence.index());
            }
            debug!(
                sentence = sentence.index(),
                candidates = reports.len(),
                "Processed sentence"
            );
            if let Some(report) = choose_report(reports) {
                processed.push(report);
            }
        }

        info!(
            sentences = doc.sentences().count(),
            reports = processed.len(),
            "Processed article"
        );
        processed
    }

    /// Reports for every relevant main verb of a sentence
    pub fn process_sentence(&self, sentence: &Sentence<'_>, memory: &[Fact]) -> Vec<Report> {
        let doc = sentence.doc();
        let builder = ReportBuilder::new(&self.vocabulary);

        main_verbs(sentence)
            .into_iter()
            .filter_map(|verb| verb_relevance(&self.vocabulary, doc, verb))
            .flat_map(|relevance| {
                debug!(
                    term = %relevance.term.text,
                    axis = %relevance.axis,
                    "Relevant verb"
                );
                builder.branch_search(&relevance, memory, sentence)
            })
            .collect()
    }

    /// Event dates mentioned in an article
    pub fn extract_all_dates(
        &self,
        text: &str,
        publication: Option<NaiveDate>,
    ) -> Result<Vec<NaiveDate>> {
        let doc = self.parser.parse(&cleanup(text))?;
        Ok(self.dates_in_document(&doc, publication))
    }

    /// Resolve the date entities of a parsed article
    pub fn dates_in_document(
        &self,
        doc: &ParsedDocument,
        publication: Option<NaiveDate>,
    ) -> Vec<NaiveDate> {
        let phrases = doc
            .entities()
            .iter()
            .filter(|e| e.label == EntityLabel::Date)
            .map(|e| doc.span_text(e.range()));
        self.dates.resolve_all(phrases, publication)
    }

    /// Reports and event dates of an article, from a single parse
    pub fn analyze(&self, text: &str, publication: Option<NaiveDate>) -> Result<ArticleAnalysis> {
        let doc = self.parser.parse(&cleanup(text))?;
        Ok(ArticleAnalysis {
            reports: self.process_document(&doc),
            dates: self.dates_in_document(&doc, publication),
        })
    }
}

/// Pick one report for a sentence.
///
/// People reports outrank household reports, and household reports of
/// partial damage or uninhabitable housing rank last. Within the winning
/// group the report whose evidence starts earliest in the text is chosen.
pub fn choose_report(reports: Vec<Report>) -> Option<Report> {
    let (people, households): (Vec<Report>, Vec<Report>) = reports
        .into_iter()
        .partition(|r| r.reporting_unit == ReportingUnit::People);
    let (partial, general): (Vec<Report>, Vec<Report>) = households
        .into_iter()
        .partition(|r| r.reporting_term.is_partial_housing());

    [people, general, partial]
        .into_iter()
        .find(|bucket| !bucket.is_empty())
        .and_then(first_in_text)
}

fn first_in_text(reports: Vec<Report>) -> Option<Report> {
    reports
        .into_iter()
        .min_by_key(|r| r.first_tag_start().unwrap_or(usize::MAX))
}

// ============================================================================
// Tests
// ============================================================================
