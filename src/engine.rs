//! Registry of named indexes
//!
//! The engine owns every index; all the operations are synchronous and the
//! engine needs `&mut` for mutations, so concurrent use must go through an
//! external lock.

use std::collections::{BTreeMap, HashMap};

use derivative::Derivative;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    base::DocId,
    error::{EngineError, Result},
    index::{IndexOptions, InvertedIndex, TermInfo},
    postings::{ListKind, ListStructure},
    search::{AlgorithmKind, Bm25Options, ScoredDocument, SearchParams},
};

#[derive(Derivative, Clone)]
#[derivative(Default, Debug)]
pub struct EngineOptions {
    /// Maximum number of documents returned by a search
    #[derivative(Default(value = "10"))]
    pub max_docs: usize,

    /// Options of newly created indexes
    pub index: IndexOptions,

    pub bm25: Bm25Options,
}

/// Summary of an index
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndexInfo {
    pub docs_count: DocId,
    pub terms: Vec<TermInfo>,
    #[serde(rename = "type")]
    pub kind: ListKind,
}

#[derive(Default)]
pub struct SearchEngine {
    indexes: HashMap<String, InvertedIndex>,
    options: EngineOptions,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EngineOptions) -> Self {
        Self {
            indexes: HashMap::new(),
            options,
        }
    }

    /// Creates an index, returns false if the name is already taken
    ///
    /// An existing index is never replaced.
    pub fn create_index(&mut self, name: &str, kind: ListKind) -> bool {
        self.try_create_index(name, kind).is_ok()
    }

    /// Creates an index, failing if the name is already taken
    pub fn try_create_index(&mut self, name: &str, kind: ListKind) -> Result<()> {
        if self.indexes.contains_key(name) {
            debug!("Index {} already exists", name);
            return Err(EngineError::DuplicateIndex(name.to_string()));
        }

        info!("Creating index {} ({})", name, kind);
        self.indexes.insert(
            name.to_string(),
            InvertedIndex::with_options(kind, self.options.index.clone()),
        );
        Ok(())
    }

    pub fn index(&self, name: &str) -> Option<&InvertedIndex> {
        self.indexes.get(name)
    }

    fn get(&self, name: &str) -> Result<&InvertedIndex> {
        self.indexes
            .get(name)
            .ok_or_else(|| EngineError::IndexNotFound(name.to_string()))
    }

    /// Summaries of all the indexes, by name
    pub fn indexes(&self) -> BTreeMap<String, IndexInfo> {
        self.indexes
            .iter()
            .map(|(name, index)| {
                let mut terms = index.terms();
                terms.sort_by(|a, b| a.term.cmp(&b.term));
                let info = IndexInfo {
                    docs_count: index.doc_count(),
                    terms,
                    kind: index.kind(),
                };
                (name.clone(), info)
            })
            .collect()
    }

    /// Adds a document and returns its ID
    pub fn add_document(&mut self, name: &str, content: &str) -> Result<DocId> {
        let index = self
            .indexes
            .get_mut(name)
            .ok_or_else(|| EngineError::IndexNotFound(name.to_string()))?;
        Ok(index.index_text(content))
    }

    /// Structure of the posting list of a term
    pub fn posting_structure(&self, name: &str, term: &str) -> Result<ListStructure> {
        self.get(name)?
            .list_structure(term)
            .ok_or_else(|| EngineError::TermNotFound {
                index: name.to_string(),
                term: term.to_string(),
            })
    }

    /// Searches an index
    pub fn search(
        &self,
        name: &str,
        algorithm: AlgorithmKind,
        query: &str,
    ) -> Result<Vec<ScoredDocument>> {
        let index = self.get(name)?;
        debug!("Searching {} with {}: {}", name, algorithm, query);

        let results = algorithm.build(&self.options.bm25).search(&SearchParams {
            index,
            query,
            max_docs: self.options.max_docs,
        })?;

        debug!("{} results", results.len());
        Ok(results)
    }
}
