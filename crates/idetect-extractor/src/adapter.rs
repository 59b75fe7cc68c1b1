//! Pre-parsed document bundles
//!
//! The parser runs out of process and writes its output as a JSON bundle:
//!
//! ```json
//! { "lemmas": { "displaced": "displace" }, "documents": [ ... ] }
//! ```
//!
//! [`PreparsedAdapter`] serves those parses through the [`ParseAdapter`] seam.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use idetect_core::{IdetectError, Result};

use crate::parse::ParsedDocument;
use crate::ParseAdapter;

/// Parser adapter backed by a bundle of parsed documents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreparsedAdapter {
    /// Word form -> lemma, used to lemmatize vocabulary lists
    #[serde(default)]
    lemmas: HashMap<String, String>,

    #[serde(default)]
    documents: Vec<ParsedDocument>,
}

impl PreparsedAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a bundle from its JSON representation
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_lemmas(mut self, lemmas: HashMap<String, String>) -> Self {
        self.lemmas.extend(lemmas);
        self
    }

    pub fn with_document(mut self, document: ParsedDocument) -> Self {
        self.documents.push(document);
        self
    }

    pub fn documents(&self) -> &[ParsedDocument] {
        &self.documents
    }

    fn lemma_of(&self, word: &str) -> String {
        if let Some(lemma) = self.lemmas.get(word) {
            return lemma.clone();
        }
        let lower = word.to_lowercase();
        self.lemmas.get(&lower).cloned().unwrap_or(lower)
    }
}

impl ParseAdapter for PreparsedAdapter {
    fn parse(&self, text: &str) -> Result<ParsedDocument> {
        self.documents
            .iter()
            .find(|doc| doc.text() == text)
            .cloned()
            .ok_or_else(|| {
                let preview: String = text.chars().take(40).collect();
                IdetectError::Parse(format!("no parse in bundle for text {:?}", preview))
            })
    }

    fn lemmatize(&self, text: &str) -> Result<Vec<String>> {
        Ok(text
            .split_whitespace()
            .map(|word| self.lemma_of(word))
            .collect())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{DepRel, Pos};
    use crate::testing::DocBuilder;

    fn doc() -> ParsedDocument {
        DocBuilder::new()
            .word("Rain", "rain", Pos::Noun, "NN", DepRel::Root, 0)
            .punct(".", 0)
            .build()
    }

    #[test]
    fn test_parse_finds_document_by_text() {
        let adapter = PreparsedAdapter::new().with_document(doc());
        let parsed = adapter.parse("Rain.").unwrap();
        assert_eq!(parsed.len(), 2);

        let err = adapter.parse("Snow.").unwrap_err();
        assert!(matches!(err, IdetectError::Parse(_)));
    }

    #[test]
    fn test_lemmatize_uses_table_then_lowercase() {
        let mut lemmas = HashMap::new();
        lemmas.insert("displaced".to_string(), "displace".to_string());
        let adapter = PreparsedAdapter::new().with_lemmas(lemmas);

        let out = adapter.lemmatize("Displaced relief  camp").unwrap();
        assert_eq!(out, vec!["displace", "relief", "camp"]);
    }

    #[test]
    fn test_bundle_json() {
        let adapter = PreparsedAdapter::new().with_document(doc());
        let json = serde_json::to_string(&adapter).unwrap();
        let loaded = PreparsedAdapter::from_json(&json).unwrap();
        assert_eq!(loaded.documents().len(), 1);
        assert_eq!(loaded.documents()[0].text(), "Rain.");

        let bad = r#"{"documents":[{"text":"a","tokens":[{"text":"a","lemma":"a","pos":"NOUN","dep":"ROOT","head":3,"idx":0}]}]}"#;
        assert!(PreparsedAdapter::from_json(bad).is_err());
    }
}
