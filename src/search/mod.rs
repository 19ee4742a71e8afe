//! Ranking algorithms and top-k selection

pub mod bm25;
pub mod distance;
pub mod frequency;
pub mod terms_set;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::base::{DocId, Score};
use crate::error::{EngineError, Result};
use crate::index::InvertedIndex;

pub use bm25::{Bm25, Bm25Options};
pub use distance::DistanceRanking;
pub use frequency::FrequencyRanking;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ScoredDocument {
    #[serde(rename = "docId")]
    pub docid: DocId,
    pub score: Score,
}

impl fmt::Display for ScoredDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.docid, self.score)
    }
}

/// Bounded list of the best scored documents, by decreasing score
///
/// Documents with equal scores keep their insertion order.
pub struct TopScoredDocuments {
    documents: Vec<ScoredDocument>,
    top_k: usize,
}

impl TopScoredDocuments {
    pub fn new(top_k: usize) -> Self {
        Self {
            documents: Vec::with_capacity(top_k.saturating_add(1).min(1024)),
            top_k,
        }
    }

    /// Add a new candidate, and returns the new lower bound on scores
    pub fn add(&mut self, candidate: DocId, score: Score) -> Score {
        let position = self.documents.partition_point(|d| d.score >= score);
        let document = ScoredDocument {
            docid: candidate,
            score,
        };

        if position < self.documents.len() {
            self.documents.insert(position, document);
            if self.documents.len() > self.top_k {
                self.documents.pop();
            }
        } else if self.documents.len() < self.top_k {
            self.documents.push(document);
        }

        // Returns the minimum score
        match self.documents.last() {
            Some(last) if self.documents.len() >= self.top_k => last.score,
            // If the list is not full, returns -infinity
            _ => Score::NEG_INFINITY,
        }
    }

    /// Current ordered buffer
    pub fn top_list(&self) -> &[ScoredDocument] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn into_sorted_vec(self) -> Vec<ScoredDocument> {
        self.documents
    }
}

/// Inputs of a query
pub struct SearchParams<'a> {
    pub index: &'a InvertedIndex,
    pub query: &'a str,
    /// Maximum number of returned documents
    pub max_docs: usize,
}

pub trait RankingAlgorithm: Send + Sync {
    /// Returns the best documents by decreasing score
    fn search(&self, params: &SearchParams) -> Result<Vec<ScoredDocument>>;
}

/// Ranking algorithm selector
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlgorithmKind {
    #[serde(rename = "BM25")]
    Bm25,
    Frequency,
    Distance,
}

impl AlgorithmKind {
    /// Builds the ranking algorithm
    pub fn build(self, bm25: &Bm25Options) -> Box<dyn RankingAlgorithm> {
        match self {
            AlgorithmKind::Bm25 => Box::new(Bm25::new(bm25.clone())),
            AlgorithmKind::Frequency => Box::new(FrequencyRanking),
            AlgorithmKind::Distance => Box::new(DistanceRanking),
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AlgorithmKind::Bm25 => write!(f, "BM25"),
            AlgorithmKind::Frequency => write!(f, "FREQUENCY"),
            AlgorithmKind::Distance => write!(f, "DISTANCE"),
        }
    }
}

impl FromStr for AlgorithmKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "BM25" | "BM25_SCORE" => Ok(AlgorithmKind::Bm25),
            "FREQUENCY" | "FREQUENCY_SCORE" => Ok(AlgorithmKind::Frequency),
            "DISTANCE" | "DISTANCE_SCORE" => Ok(AlgorithmKind::Distance),
            _ => Err(EngineError::UnknownKind {
                what: "ranking algorithm",
                value: s.to_string(),
            }),
        }
    }
}
