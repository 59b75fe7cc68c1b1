//! idetect Configuration Management
//!
//! Handles configuration from environment variables and TOML files,
//! with defaults that reproduce the seed vocabulary of the extractor.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::KeywordType;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Seed term lists for the vocabulary index
    pub vocabulary: VocabularyConfig,

    /// Extraction tuning
    pub extraction: ExtractionConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Extraction
        if let Ok(days) = std::env::var("IDETECT_MAX_DATE_AGE_DAYS") {
            config.extraction.max_date_age_days =
                days.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "IDETECT_MAX_DATE_AGE_DAYS".to_string(),
                    value: days,
                })?;
        }
        if let Ok(analyzer) = std::env::var("IDETECT_ANALYZER") {
            config.extraction.analyzer = analyzer;
        }

        // Logging
        if let Ok(level) = std::env::var("IDETECT_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(json) = std::env::var("IDETECT_LOG_JSON") {
            config.logging.json_format = parse_flag("IDETECT_LOG_JSON", &json)?;
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })?;
        config.vocabulary.validate()?;
        Ok(config)
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;

        // Only override if env values differ from defaults
        if env_config.extraction.max_date_age_days != ExtractionConfig::default().max_date_age_days
        {
            self.extraction.max_date_age_days = env_config.extraction.max_date_age_days;
        }
        if env_config.extraction.analyzer != ExtractionConfig::default().analyzer {
            self.extraction.analyzer = env_config.extraction.analyzer;
        }
        if env_config.logging.level != LoggingConfig::default().level {
            self.logging.level = env_config.logging.level;
        }
        if env_config.logging.json_format {
            self.logging.json_format = true;
        }

        Ok(self)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Seed term lists, lemmatized at startup into the vocabulary index
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    /// Verbs describing people being displaced
    pub person_reporting_terms: Vec<String>,

    /// Verbs describing structures being destroyed or damaged
    pub structure_reporting_terms: Vec<String>,

    /// Nouns denoting affected people
    pub person_reporting_units: Vec<String>,

    /// Nouns denoting affected structures
    pub structure_reporting_units: Vec<String>,

    /// Person units that are counted as households
    pub household_units: Vec<String>,

    /// Keywords that make an article relevant (hazard names)
    pub relevant_article_terms: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            person_reporting_terms: strings(&[
                "displaced",
                "evacuated",
                "forced",
                "flee",
                "homeless",
                "relief camp",
                "sheltered",
                "relocated",
                "stranded",
                "stuck",
                "accommodated",
            ]),
            structure_reporting_terms: strings(&[
                "destroyed",
                "damaged",
                "swept",
                "collapsed",
                "flooded",
                "washed",
                "inundated",
                "evacuate",
            ]),
            person_reporting_units: strings(&[
                "families",
                "person",
                "people",
                "individuals",
                "locals",
                "villagers",
                "residents",
                "occupants",
                "citizens",
                "households",
            ]),
            structure_reporting_units: strings(&["home", "house", "hut", "dwelling", "building"]),
            household_units: strings(&["families", "households"]),
            relevant_article_terms: strings(&[
                "Rainstorm",
                "hurricane",
                "tornado",
                "rain",
                "storm",
                "earthquake",
            ]),
        }
    }
}

impl VocabularyConfig {
    /// Term list for a keyword category
    pub fn terms(&self, keyword_type: KeywordType) -> &[String] {
        match keyword_type {
            KeywordType::PersonTerm => &self.person_reporting_terms,
            KeywordType::PersonUnit => &self.person_reporting_units,
            KeywordType::StructureTerm => &self.structure_reporting_terms,
            KeywordType::StructureUnit => &self.structure_reporting_units,
            KeywordType::ArticleKeyword => &self.relevant_article_terms,
        }
    }

    /// Every reporting axis needs at least one term and one unit
    pub fn validate(&self) -> Result<(), ConfigError> {
        for keyword_type in [
            KeywordType::PersonTerm,
            KeywordType::PersonUnit,
            KeywordType::StructureTerm,
            KeywordType::StructureUnit,
        ] {
            if self.terms(keyword_type).iter().all(|t| t.trim().is_empty()) {
                return Err(ConfigError::MissingRequired(format!(
                    "vocabulary.{}",
                    keyword_type.as_str()
                )));
            }
        }
        Ok(())
    }
}

/// Extraction tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Dates older than this (relative to publication) are discarded
    pub max_date_age_days: i64,

    /// Analyzer name written to persisted facts
    pub analyzer: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_date_age_days: 366,
            analyzer: "rules".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
