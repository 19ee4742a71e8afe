//! In-memory full-text search engine
//!
//! Documents are tokenized, stemmed and indexed into per-term posting lists
//! (either B-trees or sorted linked lists). Queries are ranked by term
//! frequency or with BM25.

pub mod base;
pub mod engine;
pub mod error;
pub mod index;
pub mod postings;
pub mod search;
pub mod tokenizer;

pub use engine::{EngineOptions, IndexInfo, SearchEngine};
pub use error::{EngineError, Result};
pub use index::{IndexOptions, InvertedIndex, TermInfo};
pub use postings::{ListKind, PostingCursor, PostingList, Postings};
pub use search::{AlgorithmKind, Bm25Options, ScoredDocument};
