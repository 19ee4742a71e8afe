use ntest::assert_about_eq;
use std::collections::HashMap;

use log::debug;
use rand::{rngs::StdRng, SeedableRng};

use crate::documents::{create_document, vocabulary};
use inverted_search::{
    base::{DocId, Len, Score, TermCount},
    index::{IndexOptions, InvertedIndex},
    search::{Bm25, Bm25Options, ScoredDocument},
    ListKind,
};

pub struct TestIndex {
    pub vocabulary: Vec<String>,
    pub documents: Vec<String>,
    pub index: InvertedIndex,
}

impl TestIndex {
    pub fn new(
        kind: ListKind,
        vocabulary_size: usize,
        document_count: usize,
        lambda_words: f64,
        max_words: usize,
        seed: Option<u64>,
    ) -> Self {
        Self::with_options(
            kind,
            vocabulary_size,
            document_count,
            lambda_words,
            max_words,
            seed,
            IndexOptions::default(),
        )
    }

    pub fn with_options(
        kind: ListKind,
        vocabulary_size: usize,
        document_count: usize,
        lambda_words: f64,
        max_words: usize,
        seed: Option<u64>,
        options: IndexOptions,
    ) -> Self {
        let mut rng = if let Some(seed) = seed {
            StdRng::seed_from_u64(seed)
        } else {
            StdRng::from_entropy()
        };

        let vocabulary = vocabulary(vocabulary_size);
        let mut index = InvertedIndex::with_options(kind, options);
        let mut documents = Vec::with_capacity(document_count);

        for _ in 0..document_count {
            let document = create_document(lambda_words, max_words, &vocabulary, &mut rng);
            index.index_text(&document);
            documents.push(document);
        }
        debug!("Built a {} index with {} documents", kind, documents.len());

        Self {
            vocabulary,
            documents,
            index,
        }
    }

    /// Term counts of each document
    fn term_counts(&self) -> Vec<HashMap<String, TermCount>> {
        self.documents
            .iter()
            .map(|document| {
                let mut counts = HashMap::new();
                for token in self.index.tokenize(document) {
                    *counts.entry(token).or_insert(0) += 1;
                }
                counts
            })
            .collect()
    }

    /// Frequency scores computed document by document
    pub fn frequency_scores(&self, query: &str) -> HashMap<DocId, Score> {
        let mut tokens = self.index.tokenize(query);
        tokens.sort();
        tokens.dedup();

        let mut scores = HashMap::new();
        for (docid, counts) in self.term_counts().iter().enumerate() {
            let matched: Vec<TermCount> =
                tokens.iter().filter_map(|t| counts.get(t)).copied().collect();
            if !matched.is_empty() {
                let score = matched.iter().map(|&c| c as Score).sum();
                scores.insert(docid as DocId, score);
            }
        }
        scores
    }

    /// BM25 scores computed document by document
    pub fn bm25_scores(&self, query: &str, options: &Bm25Options) -> HashMap<DocId, Score> {
        let bm25 = Bm25::new(options.clone());
        let tokens = self.index.tokenize(query);

        let mut scores = HashMap::new();
        let documents = self.documents.iter().zip(self.term_counts());
        for (docid, (document, counts)) in documents.enumerate() {
            let doc_length = document.chars().count() as u64;
            let mut matched = false;
            let mut score = 0.;
            for token in tokens.iter() {
                let (Some(&tf), Some(postings)) = (counts.get(token), self.index.postings(token))
                else {
                    continue;
                };
                matched = true;
                score += bm25.score(
                    tf,
                    doc_length,
                    self.index.average_doc_length(),
                    postings.len(),
                    self.index.doc_count(),
                );
            }
            if matched && score >= options.min_score {
                scores.insert(docid as DocId, score);
            }
        }
        scores
    }
}

/// Best `top_k` scores, by decreasing order
pub fn top_scores(scores: &HashMap<DocId, Score>, top_k: usize) -> Vec<Score> {
    let mut values: Vec<Score> = scores.values().copied().collect();
    values.sort_by(|a, b| b.total_cmp(a));
    values.truncate(top_k);
    values
}

/// Checks that observed results are the best expected ones
///
/// Scores are compared with a tolerance since summation orders differ; ties
/// make the document IDs at the cut-off ambiguous, so each returned document
/// is checked against its expected score instead.
pub fn check_results(
    observed: &[ScoredDocument],
    expected: &HashMap<DocId, Score>,
    top_k: usize,
) {
    let expected_top = top_scores(expected, top_k);
    assert_eq!(
        observed.len(),
        expected_top.len(),
        "Size differ {} vs {}",
        observed.len(),
        expected_top.len()
    );

    for (document, &score) in observed.iter().zip(expected_top.iter()) {
        assert_about_eq!(document.score, score, 1e-6);
        let own = expected
            .get(&document.docid)
            .unwrap_or_else(|| panic!("Document {} should not be returned", document.docid));
        assert_about_eq!(document.score, *own, 1e-6);
    }
}
