//! idetect Core - Domain models, errors and shared types
//!
//! This crate defines the vocabulary shared by the extraction engine and
//! the tools built on top of it:
//! - Common error types
//! - Reporting units and reporting terms (the labels a report carries)
//! - Displacement figures and highlight spans
//! - The persisted fact record handed to storage collaborators
//! - Configuration management

pub mod config;

pub use config::{AppConfig, ConfigError, ExtractionConfig, LoggingConfig, VocabularyConfig};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for idetect operations
#[derive(Error, Debug)]
pub enum IdetectError {
    #[error("Parser error: {0}")]
    Parse(String),

    #[error("Invalid parsed document: {0}")]
    InvalidDocument(String),

    #[error("Vocabulary error: {0}")]
    Vocabulary(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, IdetectError>;

// ============================================================================
// Reporting Units
// ============================================================================

/// What a report counts: people, or households/structures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportingUnit {
    People,
    Households,
}

impl ReportingUnit {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::People => "People",
            Self::Households => "Households",
        }
    }

    /// Value stored in the fact table
    pub fn stored_value(&self) -> &'static str {
        match self {
            Self::People => "people",
            Self::Households => "households",
        }
    }
}

impl std::fmt::Display for ReportingUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Reporting Terms
// ============================================================================

/// The event a report describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportingTerm {
    Displaced,
    Evacuated,
    #[serde(rename = "Forced to Flee")]
    ForcedToFlee,
    Homeless,
    #[serde(rename = "In Relief Camp")]
    InReliefCamp,
    Sheltered,
    Relocated,
    #[serde(rename = "Destroyed Housing")]
    DestroyedHousing,
    #[serde(rename = "Partially Destroyed Housing")]
    PartiallyDestroyedHousing,
    #[serde(rename = "Uninhabitable Housing")]
    UninhabitableHousing,
}

impl ReportingTerm {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Displaced => "Displaced",
            Self::Evacuated => "Evacuated",
            Self::ForcedToFlee => "Forced to Flee",
            Self::Homeless => "Homeless",
            Self::InReliefCamp => "In Relief Camp",
            Self::Sheltered => "Sheltered",
            Self::Relocated => "Relocated",
            Self::DestroyedHousing => "Destroyed Housing",
            Self::PartiallyDestroyedHousing => "Partially Destroyed Housing",
            Self::UninhabitableHousing => "Uninhabitable Housing",
        }
    }

    /// Value stored in the fact table
    pub fn stored_value(&self) -> &'static str {
        match self {
            Self::Displaced => "displaced",
            Self::Evacuated => "evacuated",
            Self::ForcedToFlee => "forced to flee",
            Self::Homeless => "homeless",
            Self::InReliefCamp => "in relief camp",
            Self::Sheltered => "sheltered",
            Self::Relocated => "relocated",
            Self::DestroyedHousing => "destroyed housing",
            Self::PartiallyDestroyedHousing => "partially destroyed housing",
            Self::UninhabitableHousing => "uninhabitable housing",
        }
    }

    /// Map the lemmas of a reporting-term phrase to a label.
    ///
    /// Checks are ordered; the first lemma family present wins. Returns
    /// `None` when no lemma is in the table so the caller can pick a default.
    pub fn from_lemmas<'a, I>(lemmas: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let lemmas: Vec<&str> = lemmas.into_iter().collect();
        let has = |lemma: &str| lemmas.contains(&lemma);

        if has("displace") {
            Some(Self::Displaced)
        } else if has("evacuate") {
            Some(Self::Evacuated)
        } else if has("flee") {
            Some(Self::ForcedToFlee)
        } else if has("homeless") {
            Some(Self::Homeless)
        } else if has("camp") {
            Some(Self::InReliefCamp)
        } else if has("shelter") || has("accommodate") {
            Some(Self::Sheltered)
        } else if has("relocate") {
            Some(Self::Relocated)
        } else if has("destroy") {
            Some(Self::DestroyedHousing)
        } else if has("damage") {
            Some(Self::PartiallyDestroyedHousing)
        } else if has("uninhabitable") {
            Some(Self::UninhabitableHousing)
        } else {
            None
        }
    }

    /// Housing terms that rank below generic housing destruction
    pub fn is_partial_housing(&self) -> bool {
        matches!(
            self,
            Self::PartiallyDestroyedHousing | Self::UninhabitableHousing
        )
    }
}

impl std::fmt::Display for ReportingTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Figures and Highlights
// ============================================================================

/// A displacement figure: an exact count, or the text of a vague one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Figure {
    Specific(u64),
    Vague(String),
}

impl Figure {
    /// Convert the text of a quantity token ("1,200", "dozens")
    pub fn from_text(text: &str) -> Self {
        let cleaned = text.replace(',', "");
        match cleaned.trim().parse::<u64>() {
            Ok(value) => Self::Specific(value),
            Err(_) => Self::Vague(cleaned),
        }
    }

    pub fn specific(&self) -> Option<u64> {
        match self {
            Self::Specific(value) => Some(*value),
            Self::Vague(_) => None,
        }
    }

    pub fn vague(&self) -> Option<&str> {
        match self {
            Self::Specific(_) => None,
            Self::Vague(text) => Some(text),
        }
    }
}

/// Semantic role of an extracted fact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactType {
    Term,
    Unit,
    Quantity,
    Loc,
}

impl FactType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Term => "term",
            Self::Unit => "unit",
            Self::Quantity => "quantity",
            Self::Loc => "loc",
        }
    }
}

impl std::fmt::Display for FactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Character range of a fact in the cleaned article text, used for
/// inline highlighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightSpan {
    #[serde(rename = "type")]
    pub kind: FactType,
    pub start: usize,
    pub end: usize,
}

// ============================================================================
// Keyword Categories
// ============================================================================

/// Category of a seed keyword in the vocabulary configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordType {
    PersonTerm,
    PersonUnit,
    StructureTerm,
    StructureUnit,
    ArticleKeyword,
}

impl KeywordType {
    pub const ALL: [KeywordType; 5] = [
        Self::PersonTerm,
        Self::PersonUnit,
        Self::StructureTerm,
        Self::StructureUnit,
        Self::ArticleKeyword,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PersonTerm => "person_term",
            Self::PersonUnit => "person_unit",
            Self::StructureTerm => "structure_term",
            Self::StructureUnit => "structure_unit",
            Self::ArticleKeyword => "article_keyword",
        }
    }
}

// ============================================================================
// Persisted Facts
// ============================================================================

/// A report in the shape of the fact table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactRecord {
    /// Unique identifier
    pub id: Uuid,

    /// Analysis (document processing run) this fact belongs to
    pub analysis_id: Uuid,

    /// Sentence excerpt offsets in the cleaned article text
    pub sentence_start: usize,
    pub sentence_end: usize,

    /// Stored unit value ("people" | "households")
    pub reporting_unit: String,

    /// Stored term value ("displaced", "destroyed housing", ...)
    pub reporting_term: String,

    pub specific_displacement_figure: Option<u64>,
    pub vague_displacement_figure: Option<String>,

    /// JSON-encoded highlight spans
    pub tag_locations: String,

    /// Location names, resolved later by the geotagger
    pub location_names: Vec<String>,

    /// Name of the analyzer that produced the fact
    pub analyzer: String,

    pub analysis_date: DateTime<Utc>,
}

impl FactRecord {
    /// Decode the stored highlight spans
    pub fn highlight_spans(&self) -> Result<Vec<HighlightSpan>> {
        Ok(serde_json::from_str(&self.tag_locations)?)
    }
}

// ============================================================================
// Tests
// ============================================================================
