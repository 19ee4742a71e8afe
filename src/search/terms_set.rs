//! Query term cursors split into required and non-required groups
//!
//! Terms are sorted by increasing score upper bound. The terms whose summed
//! upper bounds stay below the score threshold cannot, on their own, make a
//! document reach it: they are non-required and only looked up for the
//! candidates produced by the required terms.

use log::debug;

use crate::base::{DocId, Posting, Score};
use crate::postings::PostingCursor;

/// A query term with its posting list cursor
pub struct TermCursor<'a> {
    pub term: String,
    cursor: Box<dyn PostingCursor + 'a>,
    posting: Option<Posting>,

    /// Inverse document frequency
    pub idf: f64,
    /// Maximum contribution of the term to a document score
    pub upper_bound: Score,
}

impl<'a> TermCursor<'a> {
    /// Wraps a fresh cursor and moves it to its first posting
    pub fn new(
        term: String,
        mut cursor: Box<dyn PostingCursor + 'a>,
        idf: f64,
        upper_bound: Score,
    ) -> Self {
        let posting = cursor.next();
        Self {
            term,
            cursor,
            posting,
            idf,
            upper_bound,
        }
    }

    fn docid(&self) -> Option<DocId> {
        self.posting.map(|p| p.docid)
    }

    /// Moves past `docid`
    fn skip_to_greater(&mut self, docid: DocId) {
        while matches!(self.posting, Some(p) if p.docid <= docid) {
            self.posting = self.cursor.next();
        }
    }

    /// Moves to the first posting with a document ID `>= docid`
    fn seek_gek(&mut self, docid: DocId) {
        if matches!(self.posting, Some(p) if p.docid < docid) {
            self.posting = self.cursor.seek(docid);
        }
    }
}

pub struct TermsSet<'a> {
    required: Vec<TermCursor<'a>>,
    non_required: Vec<TermCursor<'a>>,
    last: Option<DocId>,
}

impl<'a> TermsSet<'a> {
    /// Splits the terms given the score threshold
    ///
    /// Returns `None` when even the sum of all the upper bounds is below
    /// `min_score`
    pub fn new(mut terms: Vec<TermCursor<'a>>, min_score: Score) -> Option<Self> {
        terms.sort_by(|a, b| a.upper_bound.total_cmp(&b.upper_bound));

        let mut sum = 0.;
        let split = terms.iter().position(|t| {
            sum += t.upper_bound;
            sum >= min_score
        })?;

        let required = terms.split_off(split);
        debug!(
            "{} required and {} non-required terms (threshold {})",
            required.len(),
            terms.len(),
            min_score
        );

        Some(Self {
            required,
            non_required: terms,
            last: None,
        })
    }

    pub fn required(&self) -> &[TermCursor<'a>] {
        &self.required
    }

    pub fn non_required(&self) -> &[TermCursor<'a>] {
        &self.non_required
    }

    /// True when the required terms are all exhausted
    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }

    /// Returns the next candidate document
    ///
    /// This is the smallest document ID greater than the previous candidate
    /// among the required terms.
    pub fn next_doc(&mut self) -> Option<DocId> {
        if let Some(last) = self.last {
            for term in self.required.iter_mut() {
                term.skip_to_greater(last);
            }
        }
        self.required.retain(|t| t.posting.is_some());
        self.required.sort_by_key(|t| t.docid().unwrap_or(DocId::MAX));

        let candidate = self.required.first().and_then(|t| t.docid());
        if candidate.is_some() {
            self.last = candidate;
        }
        candidate
    }

    /// Moves the non-required terms to the candidate (or after it)
    pub fn skip_less_than(&mut self, candidate: DocId) {
        for term in self.non_required.iter_mut() {
            term.seek_gek(candidate);
        }
        self.non_required.retain(|t| t.posting.is_some());
    }

    /// Sums the contributions of the terms positioned on the candidate
    pub fn calculate_score<F>(&self, candidate: DocId, score: F) -> Score
    where
        F: Fn(&TermCursor<'a>, &Posting) -> Score,
    {
        self.required
            .iter()
            .chain(self.non_required.iter())
            .filter_map(|t| match t.posting {
                Some(posting) if posting.docid == candidate => Some(score(t, &posting)),
                _ => None,
            })
            .sum()
    }
}
