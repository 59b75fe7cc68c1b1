//! Lemmatized reporting vocabulary
//!
//! The seed term lists are lemmatized once through the parser and frozen.
//! The index is read-only after construction and shared across threads.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use idetect_core::{IdetectError, KeywordType, Result, VocabularyConfig};

use crate::parse::ParsedDocument;
use crate::ParseAdapter;

/// Which unit vocabulary applies to a relevant verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VocabularyAxis {
    /// People were displaced
    Person,
    /// Structures were destroyed or damaged
    Structure,
    /// Either; person and structure units both apply
    Joint,
}

impl VocabularyAxis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Structure => "structure",
            Self::Joint => "joint",
        }
    }
}

impl std::fmt::Display for VocabularyAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lemma sets for reporting terms, units and article keywords
#[derive(Debug, Clone, Default)]
pub struct VocabularyIndex {
    person_terms: HashSet<String>,
    structure_terms: HashSet<String>,
    joint_terms: HashSet<String>,
    person_units: HashSet<String>,
    structure_units: HashSet<String>,
    household_units: HashSet<String>,
    article_keywords: HashSet<String>,
}

impl VocabularyIndex {
    /// Lemmatize the configured term lists through the parser
    pub fn build(parser: &dyn ParseAdapter, config: &VocabularyConfig) -> Result<Self> {
        config.validate()?;

        let lemmas = |terms: &[String]| -> Result<HashSet<String>> {
            if terms.is_empty() {
                return Ok(HashSet::new());
            }
            Ok(parser.lemmatize(&terms.join(" "))?.into_iter().collect())
        };

        let index = Self::from_lemma_sets(
            lemmas(config.terms(KeywordType::PersonTerm))?,
            lemmas(config.terms(KeywordType::StructureTerm))?,
            lemmas(config.terms(KeywordType::PersonUnit))?,
            lemmas(config.terms(KeywordType::StructureUnit))?,
            lemmas(&config.household_units)?,
            lemmas(config.terms(KeywordType::ArticleKeyword))?,
        );

        for (keyword_type, set) in [
            (KeywordType::PersonTerm, &index.person_terms),
            (KeywordType::StructureTerm, &index.structure_terms),
            (KeywordType::PersonUnit, &index.person_units),
            (KeywordType::StructureUnit, &index.structure_units),
        ] {
            if set.is_empty() {
                return Err(IdetectError::Vocabulary(format!(
                    "{} list lemmatized to nothing",
                    keyword_type.as_str()
                )));
            }
        }

        debug!(
            person_terms = index.person_terms.len(),
            structure_terms = index.structure_terms.len(),
            joint_terms = index.joint_terms.len(),
            "Built vocabulary index"
        );
        Ok(index)
    }

    /// Build from already-lemmatized sets
    pub fn from_lemma_sets(
        person_terms: HashSet<String>,
        structure_terms: HashSet<String>,
        person_units: HashSet<String>,
        structure_units: HashSet<String>,
        household_units: HashSet<String>,
        article_keywords: HashSet<String>,
    ) -> Self {
        let joint_terms = person_terms
            .intersection(&structure_terms)
            .cloned()
            .collect();
        Self {
            person_terms,
            structure_terms,
            joint_terms,
            person_units,
            structure_units,
            household_units,
            article_keywords,
        }
    }

    pub fn is_person_term(&self, lemma: &str) -> bool {
        self.person_terms.contains(lemma)
    }

    pub fn is_structure_term(&self, lemma: &str) -> bool {
        self.structure_terms.contains(lemma)
    }

    /// Terms that belong to both the person and structure lists
    pub fn is_joint_term(&self, lemma: &str) -> bool {
        self.joint_terms.contains(lemma)
    }

    pub fn is_structure_unit(&self, lemma: &str) -> bool {
        self.structure_units.contains(lemma)
    }

    pub fn is_household_unit(&self, lemma: &str) -> bool {
        self.household_units.contains(lemma)
    }

    /// Whether a lemma is a unit of the given axis
    pub fn contains_unit(&self, axis: VocabularyAxis, lemma: &str) -> bool {
        match axis {
            VocabularyAxis::Person => self.person_units.contains(lemma),
            VocabularyAxis::Structure => self.structure_units.contains(lemma),
            VocabularyAxis::Joint => {
                self.person_units.contains(lemma) || self.structure_units.contains(lemma)
            }
        }
    }

    /// An article is relevant when any token lemma is an article keyword
    pub fn is_relevant_article(&self, doc: &ParsedDocument) -> bool {
        doc.tokens()
            .iter()
            .any(|t| self.article_keywords.contains(&t.lemma))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::PreparsedAdapter;
    use crate::parse::{DepRel, Pos};
    use crate::testing::{default_lemmas, default_vocabulary, DocBuilder};

    #[test]
    fn test_default_vocabulary_sets() {
        let vocab = default_vocabulary();
        assert!(vocab.is_person_term("displace"));
        assert!(vocab.is_person_term("camp"));
        assert!(vocab.is_structure_term("wash"));
        assert!(vocab.is_joint_term("evacuate"));
        assert!(!vocab.is_joint_term("destroy"));
        assert!(vocab.is_structure_unit("house"));
        assert!(vocab.is_household_unit("family"));
        assert!(vocab.contains_unit(VocabularyAxis::Person, "people"));
        assert!(!vocab.contains_unit(VocabularyAxis::Person, "house"));
        assert!(vocab.contains_unit(VocabularyAxis::Joint, "house"));
        assert!(vocab.contains_unit(VocabularyAxis::Joint, "family"));
    }

    #[test]
    fn test_article_relevance() {
        let vocab = default_vocabulary();
        let stormy = DocBuilder::new()
            .word("Storm", "storm", Pos::Noun, "NN", DepRel::Root, 0)
            .build();
        let calm = DocBuilder::new()
            .word("Election", "election", Pos::Noun, "NN", DepRel::Root, 0)
            .build();
        assert!(vocab.is_relevant_article(&stormy));
        assert!(!vocab.is_relevant_article(&calm));
    }

    #[test]
    fn test_empty_axis_is_rejected() {
        let adapter = PreparsedAdapter::new().with_lemmas(default_lemmas());
        let config = VocabularyConfig {
            structure_reporting_units: vec![],
            ..VocabularyConfig::default()
        };
        let err = VocabularyIndex::build(&adapter, &config).unwrap_err();
        assert!(matches!(err, IdetectError::Config(_)));
    }
}
