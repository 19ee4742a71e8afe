//! BM25 ranking with MaxScore-style term partitioning

use derivative::Derivative;
use log::debug;

use crate::{
    base::{DocId, DocLength, Len, Score, TermCount},
    error::Result,
    postings::PostingList,
    search::{
        terms_set::{TermCursor, TermsSet},
        RankingAlgorithm, ScoredDocument, SearchParams, TopScoredDocuments,
    },
};

#[derive(Derivative, Clone)]
#[derivative(Default, Debug)]
pub struct Bm25Options {
    /// Term frequency saturation
    #[derivative(Default(value = "2."))]
    pub k: f64,

    /// Document length normalization
    #[derivative(Default(value = "0.75"))]
    pub b: f64,

    /// Documents scoring below are not returned
    #[derivative(Default(value = "0."))]
    pub min_score: Score,
}

pub struct Bm25 {
    options: Bm25Options,
}

impl Bm25 {
    pub fn new(options: Bm25Options) -> Self {
        Self { options }
    }

    /// Inverse document frequency
    ///
    /// Negative when the term appears in more than half of the documents
    pub fn idf(docs_with_term: usize, docs_count: DocId) -> f64 {
        let n = docs_count as f64;
        let df = docs_with_term as f64;
        ((n - df + 0.5) / (df + 0.5)).ln()
    }

    /// Contribution of a term to a document score
    pub fn score(
        &self,
        term_frequency: TermCount,
        doc_length: DocLength,
        average_doc_length: f64,
        docs_with_term: usize,
        docs_count: DocId,
    ) -> Score {
        let idf = Self::idf(docs_with_term, docs_count);
        self.term_score(term_frequency, doc_length, average_doc_length, idf)
    }

    fn term_score(
        &self,
        term_frequency: TermCount,
        doc_length: DocLength,
        average_doc_length: f64,
        idf: f64,
    ) -> Score {
        let Bm25Options { k, b, .. } = self.options;
        let tf = term_frequency as f64;
        let norm = 1. - b + b * doc_length as f64 / average_doc_length;
        tf * (k + 1.) * idf / (tf + k * norm)
    }

    /// Limit of the term score when the term frequency grows
    pub fn upper_bound(&self, idf: f64) -> Score {
        (self.options.k + 1.) * idf
    }
}

impl RankingAlgorithm for Bm25 {
    fn search(&self, params: &SearchParams) -> Result<Vec<ScoredDocument>> {
        let index = params.index;
        let docs_count = index.doc_count();
        let average_doc_length = index.average_doc_length();

        // --- Initialize the term cursors
        // (repeated query terms get one cursor each)
        let mut terms = Vec::new();
        for token in index.tokenize(params.query) {
            let Some(postings) = index.postings(&token) else {
                debug!("Discarding unknown term {}", token);
                continue;
            };

            let idf = Self::idf(postings.len(), docs_count);
            let upper_bound = self.upper_bound(idf);
            debug!("Term {}: idf {}, upper bound {}", token, idf, upper_bound);
            terms.push(TermCursor::new(token, postings.cursor(), idf, upper_bound));
        }

        let min_score = self.options.min_score;
        let Some(mut terms_set) = TermsSet::new(terms, min_score) else {
            debug!("No document can reach the score {}", min_score);
            return Ok(Vec::new());
        };

        // --- Scan the candidates
        let mut results = TopScoredDocuments::new(params.max_docs);
        while let Some(candidate) = terms_set.next_doc() {
            terms_set.skip_less_than(candidate);
            let score = terms_set.calculate_score(candidate, |term, posting| {
                self.term_score(
                    posting.payload.term_count,
                    posting.payload.doc_length,
                    average_doc_length,
                    term.idf,
                )
            });

            if score >= min_score {
                results.add(candidate, score);
            }
        }

        Ok(results.into_sorted_vec())
    }
}
