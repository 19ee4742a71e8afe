//! Inverted index: term dictionary and corpus statistics

use std::collections::HashMap;

use derivative::Derivative;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::base::{DocId, DocLength, Len, Payload, TokenizeFn};
use crate::postings::{btree::DEFAULT_ORDER, ListKind, ListStructure, PostingList, Postings};
use crate::tokenizer::tokenize;

#[derive(Derivative, Clone)]
#[derivative(Default, Debug)]
pub struct IndexOptions {
    /// Minimum degree of the B-tree posting lists (values below 2 are raised
    /// to 2)
    #[derivative(Default(value = "DEFAULT_ORDER"))]
    pub btree_order: usize,

    /// Score threshold stored with the index
    ///
    /// Ranking algorithms take their threshold from their own options, this
    /// value is only reported.
    #[derivative(Default(value = "10."))]
    pub min_score: f64,

    /// Tokenizer applied to documents and queries
    #[derivative(Default(value = "tokenize"), Debug = "ignore")]
    pub tokenizer: TokenizeFn,
}

/// Term and the number of documents containing it
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TermInfo {
    pub term: String,
    pub docs_count: usize,
}

pub struct InvertedIndex {
    kind: ListKind,
    terms: HashMap<String, Postings>,
    doc_count: DocId,
    total_doc_length: DocLength,
    options: IndexOptions,
}

impl InvertedIndex {
    pub fn new(kind: ListKind) -> Self {
        Self::with_options(kind, IndexOptions::default())
    }

    pub fn with_options(kind: ListKind, options: IndexOptions) -> Self {
        Self {
            kind,
            terms: HashMap::new(),
            doc_count: 0,
            total_doc_length: 0,
            options,
        }
    }

    pub fn kind(&self) -> ListKind {
        self.kind
    }

    /// Number of indexed documents (also the next document ID)
    pub fn doc_count(&self) -> DocId {
        self.doc_count
    }

    /// Sum of the lengths of all indexed documents
    pub fn total_doc_length(&self) -> DocLength {
        self.total_doc_length
    }

    pub fn average_doc_length(&self) -> f64 {
        if self.doc_count == 0 {
            0.
        } else {
            self.total_doc_length as f64 / self.doc_count as f64
        }
    }

    pub fn min_score(&self) -> f64 {
        self.options.min_score
    }

    /// Tokenizes a text with the index tokenizer
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        (self.options.tokenizer)(text)
    }

    /// Returns the posting list of a term
    pub fn postings(&self, term: &str) -> Option<&Postings> {
        self.terms.get(term)
    }

    /// Indexes a document and returns its ID
    ///
    /// Every occurrence of a term increments the term count of the document
    /// in the term posting list. The document length is its number of Unicode
    /// scalar values (`char`s), so a character outside the BMP counts once.
    pub fn index_text(&mut self, content: &str) -> DocId {
        let doc_length = content.chars().count() as DocLength;
        let docid = self.doc_count;
        self.doc_count += 1;
        self.total_doc_length += doc_length;

        let tokens = self.tokenize(content);
        debug!(
            "Indexing document {} ({} characters, {} tokens)",
            docid,
            doc_length,
            tokens.len()
        );

        for term in tokens {
            self.index_term(term, docid, doc_length);
        }

        docid
    }

    fn index_term(&mut self, term: String, docid: DocId, doc_length: DocLength) {
        let (kind, order) = (self.kind, self.options.btree_order);
        self.terms
            .entry(term)
            .or_insert_with(|| Postings::new(kind, order))
            .insert_or_increment(docid, Payload::new(doc_length));
    }

    /// Dictionary snapshot (unordered)
    pub fn terms(&self) -> Vec<TermInfo> {
        self.terms
            .iter()
            .map(|(term, postings)| TermInfo {
                term: term.clone(),
                docs_count: postings.len(),
            })
            .collect()
    }

    /// Structure of the posting list of a term
    pub fn list_structure(&self, term: &str) -> Option<ListStructure> {
        self.terms.get(term).map(|postings| postings.list_structure())
    }
}

impl Len for InvertedIndex {
    /// Number of distinct terms
    fn len(&self) -> usize {
        self.terms.len()
    }
}
