//! Location mentions
//!
//! Locations are geo-political entity spans. When a sentence mentions
//! several, the ones syntactically attached to the clause under `root` are
//! preferred; if that cannot be decided every candidate is returned and the
//! ambiguity is left to report merging downstream.

use std::collections::BTreeSet;

use idetect_core::FactType;

use crate::parse::{EntityLabel, EntitySpan, ParsedDocument, Sentence};
use crate::Fact;

/// Extract location facts from a sentence, optionally below a root token.
///
/// With no root the sentence root is used.
pub fn extract_locations(sentence: &Sentence<'_>, root: Option<usize>) -> Vec<Fact> {
    let doc = sentence.doc();
    let root = root.unwrap_or_else(|| sentence.root());

    let entities: Vec<&EntitySpan> = sentence
        .entities()
        .filter(|e| e.label == EntityLabel::Gpe)
        .collect();

    match entities.len() {
        0 => Vec::new(),
        1 => to_facts(doc, &entities),
        _ => {
            let descendants = doc.descendants(root);
            let location_tokens: Vec<usize> = entities
                .iter()
                .filter(|e| e.range().indices().any(|t| descendants.contains(&t)))
                .flat_map(|e| e.range().indices())
                .collect();

            let block = contiguous_block(doc, &location_tokens);
            let matched: Vec<&EntitySpan> = entities
                .iter()
                .copied()
                .filter(|e| e.range().indices().all(|t| block.contains(&t)))
                .collect();

            if matched.is_empty() {
                to_facts(doc, &entities)
            } else {
                to_facts(doc, &matched)
            }
        }
    }
}

/// Heads shared by every token in the list
pub fn common_ancestors(doc: &ParsedDocument, tokens: &[usize]) -> BTreeSet<usize> {
    let mut iter = tokens.iter();
    let Some(&first) = iter.next() else {
        return BTreeSet::new();
    };
    let mut common: BTreeSet<usize> = doc.ancestors(first).collect();
    for &token in iter {
        let ancestors: BTreeSet<usize> = doc.ancestors(token).collect();
        common.retain(|a| ancestors.contains(a));
    }
    common
}

/// The highest connected block of tokens from the list.
///
/// Seeds are tokens attached directly to a common ancestor; the block then
/// grows by tokens whose head is already in it, until nothing is added.
pub fn contiguous_block(doc: &ParsedDocument, tokens: &[usize]) -> BTreeSet<usize> {
    let common = common_ancestors(doc, tokens);
    let mut block: BTreeSet<usize> = tokens
        .iter()
        .copied()
        .filter(|&t| common.contains(&doc.token(t).head))
        .collect();

    loop {
        let added: Vec<usize> = tokens
            .iter()
            .copied()
            .filter(|t| !block.contains(t) && block.contains(&doc.token(*t).head))
            .collect();
        if added.is_empty() {
            break;
        }
        block.extend(added);
    }
    block
}

fn to_facts(doc: &ParsedDocument, entities: &[&EntitySpan]) -> Vec<Fact> {
    entities
        .iter()
        .map(|e| {
            let range = e.range();
            let lemma = range
                .indices()
                .map(|t| doc.token(t).lemma.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            Fact::from_span(doc, range.start, range, lemma, FactType::Loc)
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{DepRel, Pos};
    use crate::testing::DocBuilder;

    /// "Storms hit Pakistan as floods displaced 200 people in Kerala."
    fn two_clauses() -> ParsedDocument {
        DocBuilder::new()
            .word("Storms", "storm", Pos::Noun, "NNS", DepRel::Nsubj, 1)
            .word("hit", "hit", Pos::Verb, "VBD", DepRel::Root, 1)
            .word("Pakistan", "Pakistan", Pos::Propn, "NNP", DepRel::Dobj, 1)
            .word("as", "as", Pos::Sconj, "IN", DepRel::Mark, 5)
            .word("floods", "flood", Pos::Noun, "NNS", DepRel::Nsubj, 5)
            .word("displaced", "displace", Pos::Verb, "VBD", DepRel::Advcl, 1)
            .word("200", "200", Pos::Num, "CD", DepRel::Nummod, 7)
            .word("people", "people", Pos::Noun, "NNS", DepRel::Dobj, 5)
            .word("in", "in", Pos::Adp, "IN", DepRel::Prep, 5)
            .word("Kerala", "Kerala", Pos::Propn, "NNP", DepRel::Pobj, 8)
            .punct(".", 1)
            .gpe(2, 3)
            .gpe(9, 10)
            .build()
    }

    /// "Floods hit parts of Pakistan and India."
    fn coordinated() -> ParsedDocument {
        DocBuilder::new()
            .word("Floods", "flood", Pos::Noun, "NNS", DepRel::Nsubj, 1)
            .word("hit", "hit", Pos::Verb, "VBD", DepRel::Root, 1)
            .word("parts", "part", Pos::Noun, "NNS", DepRel::Dobj, 1)
            .word("of", "of", Pos::Adp, "IN", DepRel::Prep, 2)
            .word("Pakistan", "Pakistan", Pos::Propn, "NNP", DepRel::Pobj, 3)
            .word("and", "and", Pos::Conj, "CC", DepRel::Cc, 4)
            .word("India", "India", Pos::Propn, "NNP", DepRel::Conj, 4)
            .punct(".", 1)
            .gpe(4, 5)
            .gpe(6, 7)
            .build()
    }

    fn names(facts: &[Fact]) -> Vec<&str> {
        facts.iter().map(|f| f.text.as_str()).collect()
    }

    #[test]
    fn test_single_entity_regardless_of_root() {
        let doc = DocBuilder::new()
            .word("Rain", "rain", Pos::Noun, "NN", DepRel::Nsubj, 1)
            .word("hit", "hit", Pos::Verb, "VBD", DepRel::Root, 1)
            .word("Assam", "Assam", Pos::Propn, "NNP", DepRel::Dobj, 1)
            .gpe(2, 3)
            .build();
        let sentence = doc.sentence(0).unwrap();

        for root in [None, Some(0), Some(1), Some(2)] {
            let facts = extract_locations(&sentence, root);
            assert_eq!(names(&facts), vec!["Assam"]);
            assert_eq!(facts[0].kind, FactType::Loc);
            assert_eq!((facts[0].start, facts[0].end), (9, 14));
        }
    }

    #[test]
    fn test_no_entities() {
        let doc = DocBuilder::new()
            .word("Rain", "rain", Pos::Noun, "NN", DepRel::Root, 0)
            .build();
        assert!(extract_locations(&doc.sentence(0).unwrap(), None).is_empty());
    }

    #[test]
    fn test_narrows_to_clause_under_root() {
        let doc = two_clauses();
        let sentence = doc.sentence(0).unwrap();
        assert_eq!(names(&extract_locations(&sentence, Some(5))), vec!["Kerala"]);
        assert_eq!(names(&extract_locations(&sentence, None)), vec!["Pakistan"]);
    }

    #[test]
    fn test_coordinated_entities_form_one_block() {
        let doc = coordinated();
        let sentence = doc.sentence(0).unwrap();
        assert_eq!(
            names(&extract_locations(&sentence, None)),
            vec!["Pakistan", "India"]
        );
    }

    #[test]
    fn test_unrelated_root_returns_all_candidates() {
        // Neither entity lies under "Floods", so nothing can be decided
        let doc = coordinated();
        let sentence = doc.sentence(0).unwrap();
        assert_eq!(
            names(&extract_locations(&sentence, Some(0))),
            vec!["Pakistan", "India"]
        );
    }

    #[test]
    fn test_common_ancestors() {
        let doc = coordinated();
        let common = common_ancestors(&doc, &[4, 6]);
        assert_eq!(common.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(common_ancestors(&doc, &[]).is_empty());
        assert_eq!(
            contiguous_block(&doc, &[4, 6]).into_iter().collect::<Vec<_>>(),
            vec![4, 6]
        );
    }
}
