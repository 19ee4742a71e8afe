use std::fmt;

use serde::{Deserialize, Serialize};

pub type DocId = u64;
pub type TermCount = u32;
pub type DocLength = u64;
pub type Score = f64;

/// Turns a text into an ordered sequence of normalized terms
pub type TokenizeFn = fn(&str) -> Vec<String>;

/// Marks object that have a length
pub trait Len {
    fn len(&self) -> usize;
}

/// Per-document statistics stored with a posting
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    /// Occurrences of the term in the document
    pub term_count: TermCount,

    /// Length of the whole document (in characters)
    pub doc_length: DocLength,
}

impl Payload {
    /// Payload of a single occurrence
    pub fn new(doc_length: DocLength) -> Self {
        Self {
            term_count: 1,
            doc_length,
        }
    }
}

/// Posting = document ID + term statistics
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Posting {
    pub docid: DocId,
    pub payload: Payload,
}

impl fmt::Display for Posting {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "({},{},{})",
            self.docid, self.payload.term_count, self.payload.doc_length
        )
    }
}
