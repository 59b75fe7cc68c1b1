//! Hand-built parse trees for tests

use std::collections::HashMap;

use idetect_core::VocabularyConfig;

use crate::adapter::PreparsedAdapter;
use crate::parse::{like_num, DepRel, EntityLabel, EntitySpan, ParsedDocument, Pos, Token, TokenRange};
use crate::vocabulary::VocabularyIndex;

/// Builds a [`ParsedDocument`] token by token.
///
/// Tokens are joined with single spaces, except that punctuation attaches
/// to the preceding token. Heads are document token indices.
#[derive(Debug, Default)]
pub struct DocBuilder {
    text: String,
    tokens: Vec<Token>,
    sentences: Vec<TokenRange>,
    entities: Vec<EntitySpan>,
    noun_chunks: Vec<TokenRange>,
}

impl DocBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn word(
        mut self,
        text: &str,
        lemma: &str,
        pos: Pos,
        tag: &str,
        dep: DepRel,
        head: usize,
    ) -> Self {
        self.push(text, lemma, pos, tag, dep, head, false);
        self
    }

    pub fn punct(mut self, text: &str, head: usize) -> Self {
        self.push(text, text, Pos::Punct, text, DepRel::Punct, head, true);
        self
    }

    pub fn sentence(mut self, start: usize, end: usize) -> Self {
        self.sentences.push(TokenRange::new(start, end));
        self
    }

    pub fn entity(mut self, label: EntityLabel, start: usize, end: usize) -> Self {
        self.entities.push(EntitySpan { label, start, end });
        self
    }

    pub fn gpe(self, start: usize, end: usize) -> Self {
        self.entity(EntityLabel::Gpe, start, end)
    }

    pub fn chunk(mut self, start: usize, end: usize) -> Self {
        self.noun_chunks.push(TokenRange::new(start, end));
        self
    }

    pub fn build(self) -> ParsedDocument {
        ParsedDocument::new(
            self.text,
            self.tokens,
            self.sentences,
            self.entities,
            self.noun_chunks,
        )
        .expect("hand-built document is valid")
    }

    #[allow(clippy::too_many_arguments)]
    fn push(
        &mut self,
        text: &str,
        lemma: &str,
        pos: Pos,
        tag: &str,
        dep: DepRel,
        head: usize,
        is_punct: bool,
    ) {
        if !self.text.is_empty() && !is_punct {
            self.text.push(' ');
        }
        let idx = self.text.len();
        self.text.push_str(text);
        self.tokens.push(Token {
            text: text.to_string(),
            lemma: lemma.to_string(),
            pos,
            tag: tag.to_string(),
            dep,
            head,
            idx,
            like_num: Some(like_num(text)),
            is_punct,
        });
    }
}

/// Lemma table covering the default seed vocabulary
pub fn default_lemmas() -> HashMap<String, String> {
    [
        ("displaced", "displace"),
        ("evacuated", "evacuate"),
        ("forced", "force"),
        ("sheltered", "shelter"),
        ("relocated", "relocate"),
        ("stranded", "strand"),
        ("stuck", "stick"),
        ("accommodated", "accommodate"),
        ("destroyed", "destroy"),
        ("damaged", "damage"),
        ("swept", "sweep"),
        ("collapsed", "collapse"),
        ("flooded", "flood"),
        ("washed", "wash"),
        ("inundated", "inundate"),
        ("families", "family"),
        ("individuals", "individual"),
        ("locals", "local"),
        ("villagers", "villager"),
        ("residents", "resident"),
        ("occupants", "occupant"),
        ("citizens", "citizen"),
        ("households", "household"),
    ]
    .into_iter()
    .map(|(word, lemma)| (word.to_string(), lemma.to_string()))
    .collect()
}

/// Vocabulary index over the default seed lists
pub fn default_vocabulary() -> VocabularyIndex {
    let adapter = PreparsedAdapter::new().with_lemmas(default_lemmas());
    VocabularyIndex::build(&adapter, &VocabularyConfig::default())
        .expect("default vocabulary builds")
}
