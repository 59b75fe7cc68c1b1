//! Verbs and their arguments
//!
//! Finds the main verbs of a sentence and the tokens that may be their
//! semantic subjects or objects. Beyond the standard dependency roles a few
//! parser quirks are covered: arguments adjacent to the verb, subjects
//! shared across coordinated verbs, clause complements borrowing their
//! governor's arguments, and nouns heading relative clauses.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::parse::{pos_pattern, DepRel, ParsedDocument, Pos, Sentence};

static NOUN_VERB: Lazy<Regex> =
    Lazy::new(|| pos_pattern("<NOUN>+<VERB>").expect("valid POS pattern"));

/// Verbs of a sentence that are not auxiliaries or negations
pub fn main_verbs(sentence: &Sentence<'_>) -> Vec<usize> {
    let doc = sentence.doc();
    sentence
        .tokens()
        .filter(|&i| {
            let token = doc.token(i);
            token.pos == Pos::Verb && !token.dep.is_auxiliary()
        })
        .collect()
}

/// Right-hand `conj` dependents of a token
fn conjuncts(doc: &ParsedDocument, index: usize) -> impl Iterator<Item = usize> + '_ {
    doc.rights(index)
        .filter(move |&r| doc.token(r).dep == DepRel::Conj)
}

/// Subjects to the left of the verb, plus their conjuncts
pub fn subjects_of_verb(doc: &ParsedDocument, verb: usize) -> Vec<usize> {
    let mut subjects: Vec<usize> = doc
        .lefts(verb)
        .filter(|&t| doc.token(t).dep.is_subject())
        .collect();
    let conj: Vec<usize> = subjects.iter().flat_map(|&s| conjuncts(doc, s)).collect();
    subjects.extend(conj);
    subjects
}

/// Objects and open complements to the right of the verb, plus their conjuncts
pub fn objects_of_verb(doc: &ParsedDocument, verb: usize) -> Vec<usize> {
    let mut objects: Vec<usize> = doc
        .rights(verb)
        .filter(|&t| doc.token(t).dep.is_object())
        .collect();
    objects.extend(doc.rights(verb).filter(|&t| doc.token(t).dep == DepRel::Xcomp));
    let conj: Vec<usize> = objects.iter().flat_map(|&o| conjuncts(doc, o)).collect();
    objects.extend(conj);
    objects
}

/// Standard objects followed by standard subjects
pub fn simple_subjects_and_objects(doc: &ParsedDocument, verb: usize) -> Vec<usize> {
    let mut arguments = objects_of_verb(doc, verb);
    arguments.extend(subjects_of_verb(doc, verb));
    arguments
}

/// Plural noun of a `<NOUN>+<VERB>` run that contains the verb
fn relative_clause_noun(sentence: &Sentence<'_>, verb: usize) -> Option<usize> {
    let doc = sentence.doc();
    doc.pos_regex_matches(sentence.range(), &NOUN_VERB)
        .into_iter()
        .filter(|m| m.contains(verb))
        .find_map(|m| m.indices().find(|&t| doc.token(t).tag == "NNS"))
}

/// Candidate arguments of a verb, without duplicates.
///
/// Candidates are ordered by ascending subtree size, then position, so the
/// shallowest (least likely to contain a verb of its own) comes first.
pub fn subjects_and_objects(sentence: &Sentence<'_>, verb: usize) -> Vec<usize> {
    let doc = sentence.doc();
    let token = doc.token(verb);
    let mut candidates = simple_subjects_and_objects(doc, verb);

    if verb > 0 {
        let preceding = verb - 1;
        if matches!(
            doc.token(preceding).dep,
            DepRel::Pobj | DepRel::Dobj | DepRel::Nsubj | DepRel::Conj
        ) {
            candidates.push(preceding);
        }
    }

    if let Some(following) = doc.next_token(verb) {
        if matches!(
            doc.token(following).dep,
            DepRel::Pobj | DepRel::Dobj | DepRel::Root
        ) {
            candidates.push(following);
        }
    }

    match token.dep {
        DepRel::Conj => {
            if doc.lefts(verb).next().is_some() {
                candidates.extend(doc.lefts(verb).filter(|&t| {
                    matches!(doc.token(t).dep, DepRel::Nsubj | DepRel::Nsubjpass)
                }));
            } else {
                for ancestor in doc.ancestors(verb) {
                    candidates.extend(simple_subjects_and_objects(doc, ancestor));
                }
            }
        }
        DepRel::Xcomp | DepRel::Acomp | DepRel::Ccomp => {
            for ancestor in doc.ancestors(verb) {
                candidates.extend(simple_subjects_and_objects(doc, ancestor));
            }
        }
        DepRel::Root => {
            candidates.extend(sentence.tokens().filter(|&t| doc.token(t).dep == DepRel::Pobj));
        }
        DepRel::Relcl => {
            candidates.extend(relative_clause_noun(sentence, verb));
        }
        _ => {}
    }

    let mut seen = std::collections::HashSet::new();
    candidates.retain(|t| seen.insert(*t));
    candidates.sort_by_key(|&t| (doc.subtree_len(t), t));
    candidates
}

// ============================================================================
// Tests
// ============================================================================
