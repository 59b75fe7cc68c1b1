//! Report assembly for a relevant verb
//!
//! Combines the locations under the verb, its candidate arguments and the
//! quantity attached to the first argument that names a reporting unit.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use idetect_core::{FactType, Figure, HighlightSpan, ReportingTerm, ReportingUnit};

use crate::arguments::subjects_and_objects;
use crate::location::extract_locations;
use crate::parse::{pos_pattern, DepRel, ParsedDocument, Sentence, TokenRange};
use crate::quantity::{basic_number, get_quantity};
use crate::relevance::Relevance;
use crate::vocabulary::{VocabularyAxis, VocabularyIndex};
use crate::{Fact, Report};

static NOUN_CONJ_NOUN: Lazy<Regex> =
    Lazy::new(|| pos_pattern("<NOUN><CONJ><NOUN>").expect("valid POS pattern"));

/// Builds reports for relevant verbs of a sentence
pub struct ReportBuilder<'a> {
    vocab: &'a VocabularyIndex,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(vocab: &'a VocabularyIndex) -> Self {
        Self { vocab }
    }

    /// Search the verb's arguments for a reporting unit or a bare number.
    ///
    /// Candidates are tried shallowest first and the search stops at the
    /// first one that yields a report. Locations come from the verb's
    /// clause, or from `memory` (location facts of an earlier sentence)
    /// when the clause has none.
    pub fn branch_search(
        &self,
        relevance: &Relevance,
        memory: &[Fact],
        sentence: &Sentence<'_>,
    ) -> Vec<Report> {
        let doc = sentence.doc();
        let term = &relevance.term;

        let own_locations = extract_locations(sentence, Some(term.token));
        let location_facts = if own_locations.is_empty() {
            memory
        } else {
            own_locations.as_slice()
        };
        let locations: Vec<String> = location_facts.iter().map(|l| l.text.clone()).collect();
        let location_spans: Vec<HighlightSpan> =
            location_facts.iter().map(Fact::highlight).collect();

        let candidates = subjects_and_objects(sentence, term.token);
        trace!(verb = %term.text, ?candidates, "Searching verb arguments");

        let mut reports = Vec::new();
        for candidate in candidates {
            if basic_number(doc, candidate) {
                if attached_to_term(doc, candidate, term) {
                    let unit = if relevance.axis == VocabularyAxis::Structure {
                        ReportingUnit::Households
                    } else {
                        ReportingUnit::People
                    };
                    let quantity = Fact::from_token(doc, candidate, FactType::Quantity);
                    reports.push(self.report(
                        sentence,
                        relevance,
                        unit,
                        Some(quantity),
                        locations,
                        location_spans,
                    ));
                    break;
                }
            } else if self
                .vocab
                .contains_unit(relevance.axis, &doc.token(candidate).lemma)
            {
                let anchor = noun_conjunction(sentence, candidate)
                    .map(|conj| doc.span_root(conj))
                    .unwrap_or(candidate);
                let quantity = get_quantity(sentence, anchor);
                let unit = self.convert_unit(&doc.token(candidate).lemma);
                reports.push(self.report(
                    sentence,
                    relevance,
                    unit,
                    quantity,
                    locations,
                    location_spans,
                ));
                break;
            }
        }
        reports
    }

    /// Structure and household units count households
    pub fn convert_unit(&self, lemma: &str) -> ReportingUnit {
        if self.vocab.is_structure_unit(lemma) || self.vocab.is_household_unit(lemma) {
            ReportingUnit::Households
        } else {
            ReportingUnit::People
        }
    }

    fn report(
        &self,
        sentence: &Sentence<'_>,
        relevance: &Relevance,
        unit: ReportingUnit,
        quantity: Option<Fact>,
        locations: Vec<String>,
        location_spans: Vec<HighlightSpan>,
    ) -> Report {
        let mut tag_spans = vec![relevance.term.highlight()];
        tag_spans.extend(quantity.as_ref().map(Fact::highlight));
        tag_spans.extend(location_spans);

        Report {
            reporting_unit: unit,
            reporting_term: convert_term(sentence.doc(), relevance),
            locations,
            sentence_start: sentence.start_char(),
            sentence_end: sentence.end_char(),
            tag_spans,
            quantity: quantity.map(|q| Figure::from_text(&q.text)),
            sentence_idx: None,
        }
    }
}

/// Label for the term phrase, from the lemmas of its tokens
pub fn convert_term(doc: &ParsedDocument, relevance: &Relevance) -> ReportingTerm {
    let lemmas = relevance
        .term
        .span
        .indices()
        .map(|t| doc.token(t).lemma.as_str());
    ReportingTerm::from_lemmas(lemmas).unwrap_or(match relevance.axis {
        VocabularyAxis::Structure => ReportingTerm::DestroyedHousing,
        VocabularyAxis::Person | VocabularyAxis::Joint => ReportingTerm::Displaced,
    })
}

/// A number counts for the verb when it sits right before the verb (or its
/// passive auxiliary, or the last word of the term phrase), or anywhere
/// before the term.
fn attached_to_term(doc: &ParsedDocument, number: usize, term: &Fact) -> bool {
    let Some(next) = doc.next_token(number) else {
        return false;
    };
    let next_token = doc.token(next);

    next == term.token
        || term
            .lemma
            .rsplit(' ')
            .next()
            .is_some_and(|last| next_token.text == last)
        || (next_token.dep == DepRel::Auxpass && doc.next_token(next) == Some(term.token))
        || doc.token(number).idx < term.start
}

/// `<NOUN><CONJ><NOUN>` run containing the token
fn noun_conjunction(sentence: &Sentence<'_>, token: usize) -> Option<TokenRange> {
    sentence
        .doc()
        .pos_regex_matches(sentence.range(), &NOUN_CONJ_NOUN)
        .into_iter()
        .find(|m| m.contains(token))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Pos;
    use crate::relevance::verb_relevance;
    use crate::testing::{default_vocabulary, DocBuilder};

    fn search(doc: &ParsedDocument, verb: usize, memory: &[Fact]) -> Vec<Report> {
        let vocab = default_vocabulary();
        let relevance = verb_relevance(&vocab, doc, verb).expect("relevant verb");
        let sentence = doc.sentence_of(verb).unwrap();
        ReportBuilder::new(&vocab).branch_search(&relevance, memory, &sentence)
    }

    /// Location fact of an earlier sentence
    fn remembered(name: &str, start: usize) -> Fact {
        Fact {
            kind: FactType::Loc,
            token: 0,
            span: TokenRange::single(0),
            text: name.to_string(),
            lemma: name.to_string(),
            start,
            end: start + name.len(),
        }
    }

    #[test]
    fn test_numeric_subject_before_passive() {
        // "About 300 were evacuated."
        let doc = DocBuilder::new()
            .word("About", "about", Pos::Adv, "RB", DepRel::Advmod, 1)
            .word("300", "300", Pos::Num, "CD", DepRel::Nsubjpass, 3)
            .word("were", "be", Pos::Aux, "VBD", DepRel::Auxpass, 3)
            .word("evacuated", "evacuate", Pos::Verb, "VBN", DepRel::Root, 3)
            .punct(".", 3)
            .build();

        let reports = search(&doc, 3, &[]);
        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.reporting_unit, ReportingUnit::People);
        assert_eq!(report.reporting_term, ReportingTerm::Evacuated);
        assert_eq!(report.figures(), (Some(300), None));
        assert_eq!(report.sentence_start, 0);
        assert_eq!(report.sentence_end, doc.text().len());
        assert_eq!(
            report.tag_spans,
            vec![
                HighlightSpan {
                    kind: FactType::Term,
                    start: 15,
                    end: 24
                },
                HighlightSpan {
                    kind: FactType::Quantity,
                    start: 6,
                    end: 9
                },
            ]
        );
    }

    #[test]
    fn test_unit_in_conjoined_nouns() {
        // "Floods destroyed 500 houses and huts in Assam."
        let doc = DocBuilder::new()
            .word("Floods", "flood", Pos::Noun, "NNS", DepRel::Nsubj, 1)
            .word("destroyed", "destroy", Pos::Verb, "VBD", DepRel::Root, 1)
            .word("500", "500", Pos::Num, "CD", DepRel::Nummod, 3)
            .word("houses", "house", Pos::Noun, "NNS", DepRel::Dobj, 1)
            .word("and", "and", Pos::Conj, "CC", DepRel::Cc, 3)
            .word("huts", "hut", Pos::Noun, "NNS", DepRel::Conj, 3)
            .word("in", "in", Pos::Adp, "IN", DepRel::Prep, 1)
            .word("Assam", "Assam", Pos::Propn, "NNP", DepRel::Pobj, 6)
            .punct(".", 1)
            .gpe(7, 8)
            .chunk(0, 1)
            .chunk(2, 4)
            .chunk(5, 6)
            .chunk(7, 8)
            .build();

        let reports = search(&doc, 1, &[remembered("Sindh", 0)]);
        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.reporting_unit, ReportingUnit::Households);
        assert_eq!(report.reporting_term, ReportingTerm::DestroyedHousing);
        assert_eq!(report.figures(), (Some(500), None));
        assert_eq!(report.locations, vec!["Assam".to_string()]);
        assert_eq!(
            report.tag_spans.last().map(|s| s.kind),
            Some(FactType::Loc)
        );
    }

    #[test]
    fn test_remembered_locations_keep_their_spans() {
        // "The storm destroyed 200 homes."
        let doc = DocBuilder::new()
            .word("The", "the", Pos::Det, "DT", DepRel::Det, 1)
            .word("storm", "storm", Pos::Noun, "NN", DepRel::Nsubj, 2)
            .word("destroyed", "destroy", Pos::Verb, "VBD", DepRel::Root, 2)
            .word("200", "200", Pos::Num, "CD", DepRel::Nummod, 4)
            .word("homes", "home", Pos::Noun, "NNS", DepRel::Dobj, 2)
            .punct(".", 2)
            .chunk(0, 2)
            .chunk(3, 5)
            .build();

        let reports = search(&doc, 2, &[remembered("Pakistan", 100)]);
        assert_eq!(reports[0].locations, vec!["Pakistan".to_string()]);
        let location_spans: Vec<&HighlightSpan> = reports[0]
            .tag_spans
            .iter()
            .filter(|s| s.kind == FactType::Loc)
            .collect();
        assert_eq!(
            location_spans,
            vec![&HighlightSpan {
                kind: FactType::Loc,
                start: 100,
                end: 108
            }]
        );
        assert_eq!(reports[0].figures(), (Some(200), None));
    }

    #[test]
    fn test_no_unit_no_report() {
        // "Floods destroyed crops."
        let doc = DocBuilder::new()
            .word("Floods", "flood", Pos::Noun, "NNS", DepRel::Nsubj, 1)
            .word("destroyed", "destroy", Pos::Verb, "VBD", DepRel::Root, 1)
            .word("crops", "crop", Pos::Noun, "NNS", DepRel::Dobj, 1)
            .punct(".", 1)
            .build();
        assert!(search(&doc, 1, &[]).is_empty());
    }

    #[test]
    fn test_unit_without_quantity() {
        // "Residents were evacuated."
        let doc = DocBuilder::new()
            .word("Residents", "resident", Pos::Noun, "NNS", DepRel::Nsubjpass, 2)
            .word("were", "be", Pos::Aux, "VBD", DepRel::Auxpass, 2)
            .word("evacuated", "evacuate", Pos::Verb, "VBN", DepRel::Root, 2)
            .punct(".", 2)
            .chunk(0, 1)
            .build();
        let reports = search(&doc, 2, &[]);
        assert_eq!(reports[0].reporting_unit, ReportingUnit::People);
        assert_eq!(reports[0].quantity, None);
        assert_eq!(reports[0].figures(), (None, None));
    }

    #[test]
    fn test_household_units() {
        let vocab = default_vocabulary();
        let builder = ReportBuilder::new(&vocab);
        assert_eq!(builder.convert_unit("family"), ReportingUnit::Households);
        assert_eq!(builder.convert_unit("hut"), ReportingUnit::Households);
        assert_eq!(builder.convert_unit("villager"), ReportingUnit::People);
    }

    #[test]
    fn test_bare_number_on_structure_axis_counts_households() {
        // "300 collapsed."
        let doc = DocBuilder::new()
            .word("300", "300", Pos::Num, "CD", DepRel::Nsubj, 1)
            .word("collapsed", "collapse", Pos::Verb, "VBD", DepRel::Root, 1)
            .punct(".", 1)
            .build();

        let reports = search(&doc, 1, &[]);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].reporting_unit, ReportingUnit::Households);
        assert_eq!(reports[0].reporting_term, ReportingTerm::DestroyedHousing);
        assert_eq!(reports[0].figures(), (Some(300), None));
    }

    #[test]
    fn test_number_before_last_word_of_term_phrase() {
        // "Floods left 300 homeless."
        let doc = DocBuilder::new()
            .word("Floods", "flood", Pos::Noun, "NNS", DepRel::Nsubj, 1)
            .word("left", "leave", Pos::Verb, "VBD", DepRel::Root, 1)
            .word("300", "300", Pos::Num, "CD", DepRel::Dobj, 1)
            .word("homeless", "homeless", Pos::Adj, "JJ", DepRel::Oprd, 1)
            .punct(".", 1)
            .build();

        let reports = search(&doc, 1, &[]);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].reporting_unit, ReportingUnit::People);
        assert_eq!(reports[0].reporting_term, ReportingTerm::Homeless);
        assert_eq!(reports[0].figures(), (Some(300), None));
    }

    #[test]
    fn test_number_after_term_is_not_attached() {
        // "Floods destroyed 300."
        let doc = DocBuilder::new()
            .word("Floods", "flood", Pos::Noun, "NNS", DepRel::Nsubj, 1)
            .word("destroyed", "destroy", Pos::Verb, "VBD", DepRel::Root, 1)
            .word("300", "300", Pos::Num, "CD", DepRel::Dobj, 1)
            .punct(".", 1)
            .build();
        assert!(search(&doc, 1, &[]).is_empty());
    }
}
