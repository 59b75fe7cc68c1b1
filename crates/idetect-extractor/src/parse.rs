//! Parse tree model
//!
//! Dependency parses arrive from an external parser as flat token arrays
//! where every token names its head by index. The tree is never stored as
//! linked nodes: ancestor, descendant and subtree queries are walks over
//! the index arrays. A token is its own head only at a sentence root.
//!
//! Character offsets (`idx`) are byte offsets into the document text. The
//! extractor works on normalized text, which is printable ASCII, so byte and
//! character offsets coincide.

use std::ops::Range;

use regex::Regex;
use serde::{Deserialize, Serialize};

use idetect_core::{IdetectError, Result};

// ============================================================================
// Tag Sets
// ============================================================================

/// Universal part-of-speech tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Pos {
    Adj,
    Adp,
    Adv,
    Aux,
    /// Coordinating conjunction (`CCONJ`, older models emit `CONJ`)
    #[serde(rename = "CCONJ", alias = "CONJ")]
    Conj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    X,
    Space,
    #[serde(other)]
    Other,
}

impl Pos {
    /// Tag name used in POS patterns such as `<NOUN><CONJ><NOUN>`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Adj => "ADJ",
            Self::Adp => "ADP",
            Self::Adv => "ADV",
            Self::Aux => "AUX",
            Self::Conj => "CONJ",
            Self::Det => "DET",
            Self::Intj => "INTJ",
            Self::Noun => "NOUN",
            Self::Num => "NUM",
            Self::Part => "PART",
            Self::Pron => "PRON",
            Self::Propn => "PROPN",
            Self::Punct => "PUNCT",
            Self::Sconj => "SCONJ",
            Self::Sym => "SYM",
            Self::Verb => "VERB",
            Self::X => "X",
            Self::Space => "SPACE",
            Self::Other => "OTHER",
        }
    }
}

/// Dependency relation labels (ClearNLP style, as emitted by English models)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepRel {
    Acl,
    Acomp,
    Advcl,
    Advmod,
    Agent,
    Amod,
    Appos,
    Attr,
    Aux,
    Auxpass,
    Case,
    Cc,
    Ccomp,
    Compound,
    Conj,
    Csubj,
    Csubjpass,
    Dative,
    Dep,
    Det,
    Dobj,
    Expl,
    Intj,
    Mark,
    Meta,
    Neg,
    Nmod,
    Npadvmod,
    Nsubj,
    Nsubjpass,
    Nummod,
    Oprd,
    Parataxis,
    Pcomp,
    Pobj,
    Poss,
    Preconj,
    Predet,
    Prep,
    Prt,
    Punct,
    Quantmod,
    Relcl,
    #[serde(rename = "ROOT", alias = "root")]
    Root,
    Xcomp,
    #[serde(other)]
    Other,
}

impl DepRel {
    /// Roles that mark a syntactic subject
    pub fn is_subject(&self) -> bool {
        matches!(
            self,
            Self::Agent | Self::Csubj | Self::Csubjpass | Self::Expl | Self::Nsubj | Self::Nsubjpass
        )
    }

    /// Roles that mark a syntactic object
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Attr | Self::Dobj | Self::Dative | Self::Oprd)
    }

    /// Auxiliary and negation roles (never a main verb)
    pub fn is_auxiliary(&self) -> bool {
        matches!(self, Self::Aux | Self::Auxpass | Self::Neg)
    }
}

/// Named-entity labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityLabel {
    Person,
    Norp,
    Fac,
    Org,
    /// Geo-political entity: countries, cities, states
    Gpe,
    Loc,
    Product,
    Event,
    WorkOfArt,
    Law,
    Language,
    Date,
    Time,
    Percent,
    Money,
    Quantity,
    Ordinal,
    Cardinal,
    #[serde(other)]
    Other,
}

// ============================================================================
// Tokens and Spans
// ============================================================================

/// Half-open range of token indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenRange {
    pub start: usize,
    pub end: usize,
}

impl TokenRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Range covering a single token
    pub fn single(index: usize) -> Self {
        Self::new(index, index + 1)
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }

    pub fn indices(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A parsed token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub lemma: String,
    pub pos: Pos,
    /// Fine-grained (Penn) tag, e.g. `NNS`
    #[serde(default)]
    pub tag: String,
    pub dep: DepRel,
    /// Index of the head token in the document
    pub head: usize,
    /// Offset of the token in the document text
    pub idx: usize,
    /// Number-likeness as reported by the parser, if it reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like_num: Option<bool>,
    #[serde(default)]
    pub is_punct: bool,
}

impl Token {
    /// Offset one past the end of the token
    pub fn end_idx(&self) -> usize {
        self.idx + self.text.len()
    }

    /// Digit-bearing or spelled-out number
    pub fn looks_like_number(&self) -> bool {
        self.like_num.unwrap_or_else(|| like_num(&self.text))
    }
}

const NUMBER_WORDS: &[&str] = &[
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
    "hundred", "thousand", "million", "billion", "trillion",
];

const ORDINAL_WORDS: &[&str] = &[
    "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth", "ninth", "tenth",
    "eleventh", "twelfth", "thirteenth", "fourteenth", "fifteenth", "sixteenth", "seventeenth",
    "eighteenth", "nineteenth", "twentieth", "thirtieth", "fortieth", "fiftieth", "sixtieth",
    "seventieth", "eightieth", "ninetieth", "hundredth", "thousandth", "millionth", "billionth",
    "trillionth",
];

/// English number-likeness test: "500", "1,200", "3.5", "1/2", "twenty",
/// "third", "21st"
pub fn like_num(text: &str) -> bool {
    let text = text.trim_start_matches(['+', '-', '±', '~']);
    let digits: String = text.chars().filter(|c| *c != ',' && *c != '.').collect();
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    if let Some((num, denom)) = digits.split_once('/') {
        let is_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
        if is_digits(num) && is_digits(denom) {
            return true;
        }
    }
    let lower = text.to_lowercase();
    if NUMBER_WORDS.contains(&lower.as_str()) || ORDINAL_WORDS.contains(&lower.as_str()) {
        return true;
    }
    // "1st", "22nd", "103rd", "4th"
    ["st", "nd", "rd", "th"].iter().any(|suffix| {
        lower
            .strip_suffix(suffix)
            .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
    })
}

/// A labelled named-entity span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub label: EntityLabel,
    pub start: usize,
    pub end: usize,
}

impl EntitySpan {
    pub fn range(&self) -> TokenRange {
        TokenRange::new(self.start, self.end)
    }
}

// ============================================================================
// Parsed Document
// ============================================================================

/// Wire shape of a parsed document
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocumentParts {
    text: String,
    tokens: Vec<Token>,
    #[serde(default)]
    sentences: Vec<TokenRange>,
    #[serde(default)]
    entities: Vec<EntitySpan>,
    #[serde(default)]
    noun_chunks: Vec<TokenRange>,
}

/// A validated, immutable parse of one document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "DocumentParts", into = "DocumentParts")]
pub struct ParsedDocument {
    text: String,
    tokens: Vec<Token>,
    sentences: Vec<TokenRange>,
    entities: Vec<EntitySpan>,
    noun_chunks: Vec<TokenRange>,
    /// children[i] lists the dependents of token i in ascending order
    children: Vec<Vec<usize>>,
}

impl ParsedDocument {
    /// Build and validate a document.
    ///
    /// With no sentence boundaries the whole token array is one sentence.
    pub fn new(
        text: impl Into<String>,
        tokens: Vec<Token>,
        sentences: Vec<TokenRange>,
        entities: Vec<EntitySpan>,
        noun_chunks: Vec<TokenRange>,
    ) -> Result<Self> {
        let text = text.into();
        let sentences = if sentences.is_empty() && !tokens.is_empty() {
            vec![TokenRange::new(0, tokens.len())]
        } else {
            sentences
        };

        validate(&text, &tokens, &sentences, &entities, &noun_chunks)?;

        let mut children = vec![Vec::new(); tokens.len()];
        for (i, token) in tokens.iter().enumerate() {
            if token.head != i {
                children[token.head].push(i);
            }
        }

        Ok(Self {
            text,
            tokens,
            sentences,
            entities,
            noun_chunks,
            children,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token(&self, index: usize) -> &Token {
        &self.tokens[index]
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn entities(&self) -> &[EntitySpan] {
        &self.entities
    }

    pub fn noun_chunks(&self) -> &[TokenRange] {
        &self.noun_chunks
    }

    /// Sentences in document order
    pub fn sentences(&self) -> impl Iterator<Item = Sentence<'_>> {
        self.sentences
            .iter()
            .enumerate()
            .map(move |(index, range)| Sentence {
                doc: self,
                index,
                range: *range,
            })
    }

    pub fn sentence(&self, index: usize) -> Option<Sentence<'_>> {
        self.sentences.get(index).map(|range| Sentence {
            doc: self,
            index,
            range: *range,
        })
    }

    /// Sentence containing a token
    pub fn sentence_of(&self, token: usize) -> Option<Sentence<'_>> {
        self.sentences().find(|s| s.range.contains(token))
    }

    /// Token following `index`, if any
    pub fn next_token(&self, index: usize) -> Option<usize> {
        (index + 1 < self.tokens.len()).then_some(index + 1)
    }

    pub fn children(&self, index: usize) -> &[usize] {
        &self.children[index]
    }

    /// Dependents to the left of the token
    pub fn lefts(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.children[index].iter().copied().filter(move |&c| c < index)
    }

    /// Dependents to the right of the token
    pub fn rights(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.children[index].iter().copied().filter(move |&c| c > index)
    }

    /// Heads from the token up to its sentence root, nearest first
    pub fn ancestors(&self, index: usize) -> Ancestors<'_> {
        Ancestors {
            tokens: &self.tokens,
            current: index,
        }
    }

    pub fn is_ancestor_of(&self, ancestor: usize, index: usize) -> bool {
        self.ancestors(index).any(|a| a == ancestor)
    }

    /// The token and all its descendants, in document order
    pub fn subtree(&self, index: usize) -> Vec<usize> {
        let mut subtree = Vec::new();
        let mut stack = vec![index];
        while let Some(node) = stack.pop() {
            subtree.push(node);
            stack.extend(self.children[node].iter().copied());
        }
        subtree.sort_unstable();
        subtree
    }

    pub fn subtree_len(&self, index: usize) -> usize {
        let mut count = 0;
        let mut stack = vec![index];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(self.children[node].iter().copied());
        }
        count
    }

    /// Descendants of the token, excluding the token itself
    pub fn descendants(&self, index: usize) -> Vec<usize> {
        self.subtree(index)
            .into_iter()
            .filter(|&t| t != index)
            .collect()
    }

    /// Character offsets covered by a token range
    pub fn span_offsets(&self, range: TokenRange) -> (usize, usize) {
        if range.is_empty() {
            return (0, 0);
        }
        (
            self.tokens[range.start].idx,
            self.tokens[range.end - 1].end_idx(),
        )
    }

    /// Text covered by a token range
    pub fn span_text(&self, range: TokenRange) -> &str {
        let (start, end) = self.span_offsets(range);
        self.text.get(start..end).unwrap_or_default()
    }

    /// The token of a span closest to the tree root
    pub fn span_root(&self, range: TokenRange) -> usize {
        range
            .indices()
            .filter(|&i| {
                let head = self.tokens[i].head;
                head == i || !range.contains(head)
            })
            .min_by_key(|&i| self.ancestors(i).count())
            .unwrap_or(range.start)
    }

    /// Find POS-pattern matches inside a token range.
    ///
    /// The pattern is matched against the space-joined POS tags of the
    /// range (see [`pos_pattern`]); matches are returned as token ranges.
    pub fn pos_regex_matches(&self, range: TokenRange, pattern: &Regex) -> Vec<TokenRange> {
        let mut tags = String::new();
        for i in range.indices() {
            tags.push(' ');
            tags.push_str(self.tokens[i].pos.as_str());
        }

        pattern
            .find_iter(&tags)
            .map(|m| {
                let start = tags[..m.start()].matches(' ').count();
                let end = tags[..m.end()].matches(' ').count();
                TokenRange::new(range.start + start, range.start + end)
            })
            .filter(|r| !r.is_empty())
            .collect()
    }
}

/// Compile a POS pattern like `<NOUN>+<VERB>` into a tag-string regex
pub fn pos_pattern(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    let compact: String = pattern.chars().filter(|c| !c.is_whitespace()).collect();
    let alternation = Regex::new(r"<([A-Z]+)\|([A-Z]+)>")?;
    let compact = alternation.replace_all(&compact, "( ($1|$2))");
    let single = Regex::new(r"<([A-Z]+)>")?;
    let translated = single.replace_all(&compact, "( $1)");
    Regex::new(&translated)
}

impl TryFrom<DocumentParts> for ParsedDocument {
    type Error = IdetectError;

    fn try_from(parts: DocumentParts) -> Result<Self> {
        Self::new(
            parts.text,
            parts.tokens,
            parts.sentences,
            parts.entities,
            parts.noun_chunks,
        )
    }
}

impl From<ParsedDocument> for DocumentParts {
    fn from(doc: ParsedDocument) -> Self {
        Self {
            text: doc.text,
            tokens: doc.tokens,
            sentences: doc.sentences,
            entities: doc.entities,
            noun_chunks: doc.noun_chunks,
        }
    }
}

fn validate(
    text: &str,
    tokens: &[Token],
    sentences: &[TokenRange],
    entities: &[EntitySpan],
    noun_chunks: &[TokenRange],
) -> Result<()> {
    let n = tokens.len();
    let invalid = |msg: String| Err(IdetectError::InvalidDocument(msg));

    for (i, token) in tokens.iter().enumerate() {
        if token.head >= n {
            return invalid(format!("token {} has head {} out of range", i, token.head));
        }
        let Some(end) = token.idx.checked_add(token.text.len()) else {
            return invalid(format!("token {} offset {} outside text", i, token.idx));
        };
        if end > text.len() || !text.is_char_boundary(token.idx) || !text.is_char_boundary(end) {
            return invalid(format!("token {} offset {} outside text", i, token.idx));
        }
    }

    // Every head chain must reach a self-headed root within n steps
    for i in 0..n {
        let mut current = i;
        let mut steps = 0;
        while tokens[current].head != current {
            current = tokens[current].head;
            steps += 1;
            if steps > n {
                return invalid(format!("head cycle through token {}", i));
            }
        }
    }

    let mut previous_end = 0;
    for sentence in sentences {
        if sentence.is_empty() || sentence.end > n || sentence.start < previous_end {
            return invalid(format!(
                "sentence {}..{} is empty, overlapping or out of range",
                sentence.start, sentence.end
            ));
        }
        previous_end = sentence.end;
    }

    for range in entities
        .iter()
        .map(EntitySpan::range)
        .chain(noun_chunks.iter().copied())
    {
        if range.is_empty() || range.end > n {
            return invalid(format!("span {}..{} out of range", range.start, range.end));
        }
    }

    Ok(())
}

/// Iterator over a token's heads
pub struct Ancestors<'a> {
    tokens: &'a [Token],
    current: usize,
}

impl Iterator for Ancestors<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let head = self.tokens[self.current].head;
        if head == self.current {
            None
        } else {
            self.current = head;
            Some(head)
        }
    }
}

// ============================================================================
// Sentences
// ============================================================================

/// A sentence view over a parsed document
#[derive(Debug, Clone, Copy)]
pub struct Sentence<'a> {
    doc: &'a ParsedDocument,
    index: usize,
    range: TokenRange,
}

impl<'a> Sentence<'a> {
    pub fn doc(&self) -> &'a ParsedDocument {
        self.doc
    }

    /// Position of the sentence in the document
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn range(&self) -> TokenRange {
        self.range
    }

    pub fn tokens(&self) -> Range<usize> {
        self.range.indices()
    }

    pub fn contains(&self, token: usize) -> bool {
        self.range.contains(token)
    }

    /// The token heading the sentence
    pub fn root(&self) -> usize {
        self.doc.span_root(self.range)
    }

    pub fn start_char(&self) -> usize {
        self.doc.span_offsets(self.range).0
    }

    pub fn end_char(&self) -> usize {
        self.doc.span_offsets(self.range).1
    }

    pub fn text(&self) -> &'a str {
        self.doc.span_text(self.range)
    }

    /// Entity spans lying inside the sentence
    pub fn entities(&self) -> impl Iterator<Item = &'a EntitySpan> + 'a {
        let range = self.range;
        self.doc
            .entities
            .iter()
            .filter(move |e| range.start <= e.start && e.end <= range.end)
    }

    /// Noun chunks lying inside the sentence
    pub fn noun_chunks(&self) -> Vec<TokenRange> {
        self.doc
            .noun_chunks
            .iter()
            .copied()
            .filter(|c| self.range.start <= c.start && c.end <= self.range.end)
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
