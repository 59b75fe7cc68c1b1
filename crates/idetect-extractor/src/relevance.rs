//! Verb relevance
//!
//! Decides whether a verb reports displacement of people, destruction of
//! structures, either, or nothing. Rules are checked in a fixed order and
//! the first that applies decides.

use idetect_core::FactType;

use crate::arguments::objects_of_verb;
use crate::parse::{DepRel, ParsedDocument, TokenRange};
use crate::vocabulary::{VocabularyAxis, VocabularyIndex};
use crate::Fact;

/// A relevant verb: which unit vocabulary applies and the term fact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relevance {
    pub axis: VocabularyAxis,
    pub term: Fact,
}

impl Relevance {
    fn new(axis: VocabularyAxis, term: Fact) -> Self {
        Self { axis, term }
    }
}

/// Classify a verb. `None` means the verb is not relevant.
pub fn verb_relevance(
    vocab: &VocabularyIndex,
    doc: &ParsedDocument,
    verb: usize,
) -> Option<Relevance> {
    let lemma = doc.token(verb).lemma.as_str();
    let verb_fact = || Fact::from_token(doc, verb, FactType::Term);

    if vocab.is_joint_term(lemma) {
        return Some(Relevance::new(VocabularyAxis::Joint, verb_fact()));
    }
    if vocab.is_structure_term(lemma) {
        return Some(Relevance::new(VocabularyAxis::Structure, verb_fact()));
    }
    if vocab.is_person_term(lemma) {
        return Some(Relevance::new(VocabularyAxis::Person, verb_fact()));
    }

    match lemma {
        "leave" | "render" | "become" => {
            // "left 300 people homeless": the last predicate dependent decides
            let predicate = doc.children(verb).iter().copied().rev().find(|&c| {
                matches!(doc.token(c).dep, DepRel::Oprd | DepRel::Dobj | DepRel::Acomp)
            })?;
            let predicate_lemma = doc.token(predicate).lemma.as_str();
            let axis = if vocab.is_structure_term(predicate_lemma) {
                VocabularyAxis::Structure
            } else if vocab.is_person_term(predicate_lemma) {
                VocabularyAxis::Person
            } else {
                return None;
            };
            Some(Relevance::new(
                axis,
                phrase(doc, verb, predicate, format!("leave {}", predicate_lemma)),
            ))
        }
        "affect" if vocab.is_relevant_article(doc) => {
            Some(Relevance::new(VocabularyAxis::Joint, verb_fact()))
        }
        "fear" | "assume" => {
            let object = *objects_of_verb(doc, verb).first()?;
            let object_lemma = doc.token(object).lemma.as_str();
            let axis = if vocab.is_person_term(object_lemma) {
                VocabularyAxis::Person
            } else if vocab.is_structure_term(object_lemma) {
                VocabularyAxis::Structure
            } else {
                return None;
            };
            let text = format!("{} {}", lemma, doc.token(object).text);
            Some(Relevance::new(axis, phrase(doc, verb, object, text)))
        }
        "claim" => objects_of_verb(doc, verb)
            .into_iter()
            .find(|&o| doc.token(o).text == "lives")
            .map(|lives| {
                Relevance::new(
                    VocabularyAxis::Person,
                    phrase(doc, verb, lives, "claim lives".to_string()),
                )
            }),
        _ => None,
    }
}

/// Term fact spanning from the verb through a dependent
fn phrase(doc: &ParsedDocument, verb: usize, last: usize, lemma: String) -> Fact {
    let span = TokenRange::new(verb, last.max(verb) + 1);
    Fact::from_span(doc, verb, span, lemma, FactType::Term)
}

// ============================================================================
// Tests
// ============================================================================
