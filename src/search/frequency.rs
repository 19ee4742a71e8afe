//! Ranking by raw term counts

use std::collections::BTreeMap;

use log::debug;

use crate::{
    base::{DocId, Score},
    error::Result,
    postings::PostingList,
    search::{RankingAlgorithm, ScoredDocument, SearchParams, TopScoredDocuments},
    tokenizer::unique,
};

/// Scores a document with the number of occurrences of the query terms
///
/// Each distinct query term counts once, whatever its number of occurrences
/// in the query.
pub struct FrequencyRanking;

impl RankingAlgorithm for FrequencyRanking {
    fn search(&self, params: &SearchParams) -> Result<Vec<ScoredDocument>> {
        let index = params.index;
        let mut scores = BTreeMap::<DocId, Score>::new();

        for token in unique(index.tokenize(params.query)) {
            let Some(postings) = index.postings(&token) else {
                debug!("Discarding unknown term {}", token);
                continue;
            };
            for posting in postings.iter() {
                *scores.entry(posting.docid).or_default() += posting.payload.term_count as Score;
            }
        }

        let mut results = TopScoredDocuments::new(params.max_docs);
        for (docid, score) in scores {
            results.add(docid, score);
        }
        Ok(results.into_sorted_vec())
    }
}
