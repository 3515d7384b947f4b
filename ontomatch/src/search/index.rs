//! In-memory inverted index and query evaluation.
//!
//! An [`InvertedIndex`] is immutable once built. Candidate documents are collected
//! from the term dictionary (exact postings, or a dictionary scan for fuzzy clauses)
//! and then scored one by one against the full query tree.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::{Duration, Instant};

use super::SearchError;
use super::analyzer::Analyzer;
use super::query::Query;

/// How a field's values are indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Analyzed into tokens
    Text,
    /// Kept whole (trimmed, lower-cased)
    Keyword,
}

/// A document handed to the index: an id plus named, possibly multi-valued fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    fields: Vec<(String, FieldKind, String)>,
}

impl Document {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Vec::new(),
        }
    }

    pub fn text(mut self, field: &str, value: impl Into<String>) -> Self {
        self.fields
            .push((field.to_string(), FieldKind::Text, value.into()));
        self
    }

    pub fn keyword(mut self, field: &str, value: impl Into<String>) -> Self {
        self.fields
            .push((field.to_string(), FieldKind::Keyword, value.into()));
        self
    }

    /// Values of `field`, in insertion order.
    pub fn values(&self, field: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(name, _, _)| name == field)
            .map(|(_, _, value)| value.as_str())
            .collect()
    }
}

/// Term dictionary of one field, bucketed by token length in characters.
///
/// Postings lists hold document ordinals in ascending order.
#[derive(Debug, Default)]
struct Postings {
    by_length: BTreeMap<usize, BTreeMap<String, Vec<u32>>>,
}

impl Postings {
    fn add(&mut self, term: &str, ordinal: u32) {
        let docs = self
            .by_length
            .entry(term.chars().count())
            .or_default()
            .entry(term.to_string())
            .or_default();
        if docs.last() != Some(&ordinal) {
            docs.push(ordinal);
        }
    }

    fn get(&self, term: &str) -> Option<&[u32]> {
        self.by_length
            .get(&term.chars().count())?
            .get(term)
            .map(Vec::as_slice)
    }

    /// Entries whose length differs from `len` by at most `max_edits`; no other
    /// entry can be within `max_edits` edits of a term of that length.
    fn near_length(&self, len: usize, max_edits: u8) -> impl Iterator<Item = (&String, &Vec<u32>)> {
        let edits = max_edits as usize;
        self.by_length
            .range(len.saturating_sub(edits)..=len + edits)
            .flat_map(|(_, terms)| terms.iter())
    }
}

#[derive(Debug)]
struct StoredDocument {
    id: String,
    /// Token lists of every value, per field
    fields: HashMap<String, Vec<Vec<String>>>,
}

/// A query resolved against the term dictionary.
///
/// Dictionary lookups and fuzzy expansions run once per search, so scoring a
/// candidate document is mostly a matter of set lookups.
enum Prepared<'a> {
    Term {
        field: &'a str,
        docs: &'a [u32],
    },
    Fuzzy {
        field: &'a str,
        /// Best similarity of any matching token, per document
        similarity: HashMap<u32, f32>,
    },
    Phrase {
        field: &'a str,
        terms: &'a [String],
        slop: u32,
        text_len: usize,
        /// Documents containing every term
        docs: Vec<u32>,
    },
    Boost {
        inner: Box<Prepared<'a>>,
        boost: f32,
    },
    Bool {
        must: Vec<Prepared<'a>>,
        should: Vec<Prepared<'a>>,
        filter: Vec<Prepared<'a>>,
    },
    DisMax {
        disjuncts: Vec<Prepared<'a>>,
        tie_breaker: f32,
    },
}

/// A scored document, by position in the index.
#[derive(Debug, Clone, PartialEq)]
pub struct RawHit {
    pub ordinal: usize,
    pub id: String,
    pub score: f32,
    /// `score` divided by the query's maximum attainable score
    pub relevance: f32,
    pub matched_field: Option<String>,
}

#[derive(Debug, Clone, Copy)]
struct Scored<'a> {
    score: f32,
    field: Option<&'a str>,
}

impl<'a> Scored<'a> {
    fn new(score: f32, field: &'a str) -> Self {
        Self {
            score,
            field: Some(field),
        }
    }

    /// Keep the field of whichever side contributed more.
    fn best_field(best: Option<Scored<'a>>, candidate: Scored<'a>) -> Option<Scored<'a>> {
        match best {
            Some(current) if current.score >= candidate.score => Some(current),
            _ => Some(candidate),
        }
    }
}

/// Wall-clock budget for one query.
#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
        }
    }

    fn check(&self) -> Result<(), SearchError> {
        if Instant::now() >= self.at {
            Err(SearchError::Timeout {
                budget_ms: self.budget.as_millis() as u64,
            })
        } else {
            Ok(())
        }
    }
}

/// How many documents or dictionary entries are processed between deadline checks.
const DEADLINE_CHECK_INTERVAL: usize = 64;

#[derive(Debug)]
pub struct InvertedIndex {
    analyzer: Analyzer,
    documents: Vec<StoredDocument>,
    postings: HashMap<String, Postings>,
}

impl InvertedIndex {
    pub fn build(documents: Vec<Document>, analyzer: Analyzer) -> Self {
        let mut stored = Vec::with_capacity(documents.len());
        let mut postings: HashMap<String, Postings> = HashMap::new();

        for (ordinal, document) in documents.into_iter().enumerate() {
            let ordinal = ordinal as u32;
            let mut fields: HashMap<String, Vec<Vec<String>>> = HashMap::new();

            for (name, kind, raw) in document.fields {
                let tokens = match kind {
                    FieldKind::Text => analyzer.analyze(&raw),
                    FieldKind::Keyword => {
                        let keyword = analyzer.keyword(&raw);
                        if keyword.is_empty() {
                            Vec::new()
                        } else {
                            vec![keyword]
                        }
                    }
                };

                let field_postings = postings.entry(name.clone()).or_default();
                for token in &tokens {
                    field_postings.add(token, ordinal);
                }
                fields.entry(name).or_default().push(tokens);
            }

            stored.push(StoredDocument {
                id: document.id,
                fields,
            });
        }

        Self {
            analyzer,
            documents: stored,
            postings,
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Execute `query` and return at most `top_k` hits, best first.
    ///
    /// Ties are broken by index order, so results are deterministic.
    pub fn search(
        &self,
        query: &Query,
        top_k: usize,
        budget: Duration,
    ) -> Result<Vec<RawHit>, SearchError> {
        query.validate()?;
        let max_score = query.max_score();
        if max_score <= 0.0 {
            return Err(SearchError::MalformedQuery(
                "query cannot produce a positive score".to_string(),
            ));
        }

        let deadline = Deadline::after(budget);
        deadline.check()?;
        let prepared = self.prepare(query, &deadline)?;

        let mut hits = Vec::new();
        for (i, ordinal) in candidates(&prepared).into_iter().enumerate() {
            if i % DEADLINE_CHECK_INTERVAL == 0 {
                deadline.check()?;
            }
            let document = &self.documents[ordinal as usize];
            if let Some(scored) = score(&prepared, ordinal, document)
                && scored.score > 0.0
            {
                hits.push(RawHit {
                    ordinal: ordinal as usize,
                    id: document.id.clone(),
                    score: scored.score,
                    relevance: (scored.score / max_score).clamp(0.0, 1.0),
                    matched_field: scored.field.map(str::to_string),
                });
            }
        }

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.ordinal.cmp(&b.ordinal))
        });
        hits.truncate(top_k);
        Ok(hits)
    }

    fn prepare<'a>(
        &'a self,
        query: &'a Query,
        deadline: &Deadline,
    ) -> Result<Prepared<'a>, SearchError> {
        let prepared = match query {
            Query::Term { field, value } => Prepared::Term {
                field: field.as_str(),
                docs: self.posting(field, &self.analyzer.keyword(value)),
            },
            Query::Fuzzy {
                field,
                term,
                max_edits,
            } => Prepared::Fuzzy {
                field: field.as_str(),
                similarity: self.expand(field, term, *max_edits, deadline)?,
            },
            Query::Phrase {
                field,
                terms,
                slop,
                text_len,
            } => {
                let mut lists: Vec<&[u32]> =
                    terms.iter().map(|term| self.posting(field, term)).collect();
                lists.sort_by_key(|docs| docs.len());
                let docs = match lists.split_first() {
                    Some((first, rest)) => rest
                        .iter()
                        .fold(first.to_vec(), |acc, docs| intersect_sorted(&acc, docs)),
                    None => Vec::new(),
                };
                Prepared::Phrase {
                    field: field.as_str(),
                    terms: terms.as_slice(),
                    slop: *slop,
                    text_len: *text_len,
                    docs,
                }
            }
            Query::Boost { query, boost } => Prepared::Boost {
                inner: Box::new(self.prepare(query, deadline)?),
                boost: *boost,
            },
            Query::Bool {
                must,
                should,
                filter,
            } => Prepared::Bool {
                must: self.prepare_all(must, deadline)?,
                should: self.prepare_all(should, deadline)?,
                filter: self.prepare_all(filter, deadline)?,
            },
            Query::DisMax {
                disjuncts,
                tie_breaker,
            } => Prepared::DisMax {
                disjuncts: self.prepare_all(disjuncts, deadline)?,
                tie_breaker: *tie_breaker,
            },
        };
        Ok(prepared)
    }

    fn prepare_all<'a>(
        &'a self,
        queries: &'a [Query],
        deadline: &Deadline,
    ) -> Result<Vec<Prepared<'a>>, SearchError> {
        queries
            .iter()
            .map(|query| self.prepare(query, deadline))
            .collect()
    }

    /// Best similarity per document among dictionary tokens within `max_edits`
    /// edits of `term`.
    fn expand(
        &self,
        field: &str,
        term: &str,
        max_edits: u8,
        deadline: &Deadline,
    ) -> Result<HashMap<u32, f32>, SearchError> {
        let mut similarity: HashMap<u32, f32> = HashMap::new();
        let Some(postings) = self.postings.get(field) else {
            return Ok(similarity);
        };

        let term_len = term.chars().count();
        for (i, (token, docs)) in postings.near_length(term_len, max_edits).enumerate() {
            if i % DEADLINE_CHECK_INTERVAL == 0 {
                deadline.check()?;
            }
            let Some(score) = fuzzy_similarity(term, token, max_edits) else {
                continue;
            };
            for doc in docs {
                let best = similarity.entry(*doc).or_insert(score);
                *best = best.max(score);
            }
        }
        Ok(similarity)
    }

    fn posting(&self, field: &str, term: &str) -> &[u32] {
        self.postings
            .get(field)
            .and_then(|postings| postings.get(term))
            .unwrap_or_default()
    }
}

/// Documents that may match (a superset of the real matches).
///
/// Scoring enforces every clause, so a boolean query only draws candidates from
/// the clauses that decide whether it can match at all.
fn candidates(prepared: &Prepared<'_>) -> BTreeSet<u32> {
    match prepared {
        Prepared::Term { docs, .. } => docs.iter().copied().collect(),
        Prepared::Phrase { docs, .. } => docs.iter().copied().collect(),
        Prepared::Fuzzy { similarity, .. } => similarity.keys().copied().collect(),
        Prepared::Boost { inner, .. } => candidates(inner),
        Prepared::Bool {
            must,
            should,
            filter,
        } => match must.first() {
            Some(first) => candidates(first),
            None if !should.is_empty() => should.iter().flat_map(candidates).collect(),
            None => filter.first().map(candidates).unwrap_or_default(),
        },
        Prepared::DisMax { disjuncts, .. } => disjuncts.iter().flat_map(candidates).collect(),
    }
}

/// Score one document, or `None` if it does not match.
fn score<'a>(
    prepared: &Prepared<'a>,
    ordinal: u32,
    document: &StoredDocument,
) -> Option<Scored<'a>> {
    match prepared {
        Prepared::Term { field, docs } => docs
            .binary_search(&ordinal)
            .is_ok()
            .then(|| Scored::new(1.0, *field)),
        Prepared::Fuzzy { field, similarity } => similarity
            .get(&ordinal)
            .map(|similarity| Scored::new(*similarity, *field)),
        Prepared::Phrase {
            field,
            terms,
            slop,
            text_len,
            docs,
        } => {
            docs.binary_search(&ordinal).ok()?;
            document
                .fields
                .get(*field)?
                .iter()
                .filter_map(|tokens| phrase_score(tokens, terms, *slop, *text_len))
                .reduce(f32::max)
                .map(|score| Scored::new(score, *field))
        }
        Prepared::Boost { inner, boost } => score(inner, ordinal, document).map(|inner| Scored {
            score: inner.score * boost,
            field: inner.field,
        }),
        Prepared::Bool {
            must,
            should,
            filter,
        } => {
            for clause in filter {
                score(clause, ordinal, document)?;
            }

            let mut total = 0.0;
            let mut best: Option<Scored<'a>> = None;
            for clause in must {
                let scored = score(clause, ordinal, document)?;
                total += scored.score;
                best = Scored::best_field(best, scored);
            }

            let mut matched_should = 0;
            for clause in should {
                if let Some(scored) = score(clause, ordinal, document) {
                    matched_should += 1;
                    total += scored.score;
                    best = Scored::best_field(best, scored);
                }
            }
            if must.is_empty() && !should.is_empty() && matched_should == 0 {
                return None;
            }

            Some(Scored {
                score: total,
                field: best.and_then(|b| b.field),
            })
        }
        Prepared::DisMax {
            disjuncts,
            tie_breaker,
        } => {
            let matches: Vec<Scored<'a>> = disjuncts
                .iter()
                .filter_map(|clause| score(clause, ordinal, document))
                .collect();
            let best = matches
                .iter()
                .copied()
                .reduce(|a, b| if b.score > a.score { b } else { a })?;
            let sum: f32 = matches.iter().map(|m| m.score).sum();
            Some(Scored {
                score: best.score + tie_breaker * (sum - best.score),
                field: best.field,
            })
        }
    }
}

/// Intersection of two ascending ordinal lists.
fn intersect_sorted(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// Similarity in `(0, 1]` of `token` to `term`, if within `max_edits` edits.
///
/// As with edit-distance term matching in full-text engines, a term can never be
/// matched with as many edits as it has characters.
pub fn fuzzy_similarity(term: &str, token: &str, max_edits: u8) -> Option<f32> {
    let distance = strsim::levenshtein(term, token);
    if distance == 0 {
        return Some(1.0);
    }

    let term_len = term.chars().count();
    if distance > max_edits as usize || distance >= term_len {
        return None;
    }

    let longest = term_len.max(token.chars().count());
    Some(1.0 - distance as f32 / longest as f32)
}

/// Score of `terms` as a phrase within `tokens`.
///
/// Terms must appear in order with at most `slop` tokens interleaved in total. The
/// score is `1 / (1 + gaps)` scaled by how closely the value's length matches the
/// text of `text_len` tokens the terms were taken from, so only a phrase spanning
/// the whole value scores 1. A phrase cut from a longer text still scores 1 on a
/// value of exactly that text's length.
pub fn phrase_score(
    tokens: &[String],
    terms: &[String],
    slop: u32,
    text_len: usize,
) -> Option<f32> {
    let first = terms.first()?;
    let mut best_gap: Option<u32> = None;

    for (start, token) in tokens.iter().enumerate() {
        if token != first {
            continue;
        }

        let mut position = start;
        let mut gap = 0_u32;
        let mut complete = true;
        for term in &terms[1..] {
            let budget = (slop - gap) as usize;
            let next = tokens
                .iter()
                .enumerate()
                .skip(position + 1)
                .take(budget + 1)
                .find(|(_, candidate)| *candidate == term)
                .map(|(idx, _)| idx);
            match next {
                Some(idx) => {
                    gap += (idx - position - 1) as u32;
                    position = idx;
                }
                None => {
                    complete = false;
                    break;
                }
            }
        }

        if complete {
            best_gap = Some(best_gap.map_or(gap, |best| best.min(gap)));
            if gap == 0 {
                break;
            }
        }
    }

    let gap = best_gap?;
    let text_len = text_len.max(terms.len());
    let coverage = text_len.min(tokens.len()) as f32 / text_len.max(tokens.len()) as f32;
    Some(coverage / (1.0 + gap as f32))
}
