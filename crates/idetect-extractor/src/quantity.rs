//! Quantities attached to reporting units

use idetect_core::FactType;

use crate::parse::{DepRel, ParsedDocument, Sentence, TokenRange};
use crate::Fact;

/// Vague magnitude words counted as quantities
const MAGNITUDE_WORDS: &[&str] = &["dozens", "hundreds", "thousands", "fifty"];

/// Number-like token: digits, number words or a vague magnitude
pub fn basic_number(doc: &ParsedDocument, index: usize) -> bool {
    let token = doc.token(index);
    MAGNITUDE_WORDS.contains(&token.text.as_str()) || token.looks_like_number()
}

fn first_number(doc: &ParsedDocument, range: TokenRange) -> Option<Fact> {
    range
        .indices()
        .find(|&t| basic_number(doc, t))
        .map(|t| Fact::from_token(doc, t, FactType::Quantity))
}

/// Find the quantity for a reporting-unit token.
///
/// The noun chunk holding the unit is scanned left to right. A conjoined
/// unit ("houses and huts") takes its number from the preceding chunk. A
/// unit outside every chunk falls back to its direct dependents.
pub fn get_quantity(sentence: &Sentence<'_>, unit: usize) -> Option<Fact> {
    let doc = sentence.doc();
    let chunks = sentence.noun_chunks();

    if let Some(position) = chunks.iter().position(|c| c.contains(unit)) {
        let chunk = if doc.token(unit).dep == DepRel::Conj && position > 0 {
            chunks[position - 1]
        } else {
            chunks[position]
        };
        return first_number(doc, chunk);
    }

    doc.children(unit)
        .iter()
        .copied()
        .find(|&c| basic_number(doc, c))
        .map(|c| Fact::from_token(doc, c, FactType::Quantity))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Pos;
    use crate::testing::DocBuilder;

    /// "Floods destroyed 500 houses and huts."
    fn conjoined() -> ParsedDocument {
        DocBuilder::new()
            .word("Floods", "flood", Pos::Noun, "NNS", DepRel::Nsubj, 1)
            .word("destroyed", "destroy", Pos::Verb, "VBD", DepRel::Root, 1)
            .word("500", "500", Pos::Num, "CD", DepRel::Nummod, 3)
            .word("houses", "house", Pos::Noun, "NNS", DepRel::Dobj, 1)
            .word("and", "and", Pos::Conj, "CC", DepRel::Cc, 3)
            .word("huts", "hut", Pos::Noun, "NNS", DepRel::Conj, 3)
            .punct(".", 1)
            .chunk(0, 1)
            .chunk(2, 4)
            .chunk(5, 6)
            .build()
    }

    #[test]
    fn test_number_in_chunk() {
        let doc = conjoined();
        let sentence = doc.sentence(0).unwrap();
        let quantity = get_quantity(&sentence, 3).unwrap();
        assert_eq!(quantity.text, "500");
        assert_eq!(quantity.kind, FactType::Quantity);
        assert_eq!(idetect_core::Figure::from_text(&quantity.text).specific(), Some(500));
        assert_eq!((quantity.start, quantity.end), (17, 20));
    }

    #[test]
    fn test_conjunct_uses_preceding_chunk() {
        let doc = conjoined();
        let sentence = doc.sentence(0).unwrap();
        assert_eq!(get_quantity(&sentence, 5).unwrap().text, "500");
    }

    #[test]
    fn test_no_number_is_none() {
        let doc = conjoined();
        let sentence = doc.sentence(0).unwrap();
        assert!(get_quantity(&sentence, 0).is_none());
    }

    #[test]
    fn test_vague_magnitude_from_children() {
        // "thousands families fled" parsed without noun chunks
        let doc = DocBuilder::new()
            .word("thousands", "thousand", Pos::Noun, "NNS", DepRel::Nummod, 1)
            .word("families", "family", Pos::Noun, "NNS", DepRel::Nsubj, 2)
            .word("fled", "flee", Pos::Verb, "VBD", DepRel::Root, 2)
            .build();
        let sentence = doc.sentence(0).unwrap();
        let quantity = get_quantity(&sentence, 1).unwrap();
        assert_eq!(quantity.text, "thousands");
        assert_eq!(
            idetect_core::Figure::from_text(&quantity.text).vague(),
            Some("thousands")
        );
        assert!(!basic_number(&doc, 2));
    }
}
