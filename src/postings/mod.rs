//! Posting lists: ordered maps from document IDs to term statistics

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::base::{DocId, Len, Payload, Posting, TermCount};
use crate::error::EngineError;

pub mod btree;
pub mod linked;

pub use btree::BTreePostingList;
pub use linked::LinkedPostingList;

/// Resumable cursor over a posting list (increasing document IDs)
///
/// `next` comes from [Iterator]; once the cursor returned `None`, it stays
/// exhausted. Postings are returned by value, the cursor only borrows the
/// list.
pub trait PostingCursor: Iterator<Item = Posting> {
    /// Returns the last posting produced by `next` (without moving)
    fn current(&self) -> Option<Posting>;

    /// Moves to the first posting whose document ID is at least `min_docid`
    ///
    /// A cursor already positioned there is left as is; a fresh cursor is
    /// started first.
    fn seek(&mut self, min_docid: DocId) -> Option<Posting> {
        let mut current = match self.current() {
            Some(posting) => Some(posting),
            None => self.next(),
        };
        while let Some(posting) = current {
            if posting.docid >= min_docid {
                break;
            }
            current = self.next();
        }
        current
    }
}

/// Common operations of the posting list implementations
pub trait PostingList: Len + Send + Sync {
    /// Inserts the posting, or adds `payload.term_count` to the existing one
    fn insert_or_increment(&mut self, docid: DocId, payload: Payload);

    /// Point lookup
    fn get(&self, docid: DocId) -> Option<Posting>;

    /// Overwrites the term count of an existing posting
    ///
    /// Returns false if the document is not in the list
    fn update_term_count(&mut self, docid: DocId, term_count: TermCount) -> bool;

    /// Removes a posting and returns it
    fn remove(&mut self, docid: DocId) -> Option<Posting>;

    /// Returns a new cursor positioned before the first posting
    fn cursor<'a>(&'a self) -> Box<dyn PostingCursor + 'a>;

    /// Graph of the underlying structure (for display)
    fn structure(&self) -> GraphStructure;

    fn kind(&self) -> ListKind;

    /// Iterates over all the postings
    fn iter<'a>(&'a self) -> Box<dyn PostingCursor + 'a> {
        self.cursor()
    }
}

/// Posting list implementation selector
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListKind {
    Tree,
    Linked,
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ListKind::Tree => write!(f, "TREE"),
            ListKind::Linked => write!(f, "LINKED"),
        }
    }
}

impl FromStr for ListKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TREE" | "BTREE_INDEX" => Ok(ListKind::Tree),
            "LINKED" | "LINKED_LIST_INDEX" => Ok(ListKind::Linked),
            _ => Err(EngineError::UnknownKind {
                what: "index type",
                value: s.to_string(),
            }),
        }
    }
}

/// A node of the exported structure
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub doc_ids: Vec<DocId>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphStructure {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Structure of a posting list, tagged with its kind
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ListStructure {
    #[serde(rename = "type")]
    pub kind: ListKind,
    pub structure: GraphStructure,
}

/// Display identifiers for exported nodes (no meaning for the engine)
pub(crate) fn node_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A posting list of either kind
pub enum Postings {
    Tree(BTreePostingList),
    Linked(LinkedPostingList),
}

impl Postings {
    /// Creates an empty posting list
    ///
    /// `btree_order` is only used for trees
    pub fn new(kind: ListKind, btree_order: usize) -> Self {
        match kind {
            ListKind::Tree => Postings::Tree(BTreePostingList::with_order(btree_order)),
            ListKind::Linked => Postings::Linked(LinkedPostingList::new()),
        }
    }

    fn inner(&self) -> &dyn PostingList {
        match self {
            Postings::Tree(list) => list,
            Postings::Linked(list) => list,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn PostingList {
        match self {
            Postings::Tree(list) => list,
            Postings::Linked(list) => list,
        }
    }

    /// Exports the structure together with the list kind
    pub fn list_structure(&self) -> ListStructure {
        ListStructure {
            kind: self.kind(),
            structure: self.structure(),
        }
    }
}

impl Len for Postings {
    fn len(&self) -> usize {
        self.inner().len()
    }
}

impl PostingList for Postings {
    fn insert_or_increment(&mut self, docid: DocId, payload: Payload) {
        self.inner_mut().insert_or_increment(docid, payload)
    }

    fn get(&self, docid: DocId) -> Option<Posting> {
        self.inner().get(docid)
    }

    fn update_term_count(&mut self, docid: DocId, term_count: TermCount) -> bool {
        self.inner_mut().update_term_count(docid, term_count)
    }

    fn remove(&mut self, docid: DocId) -> Option<Posting> {
        self.inner_mut().remove(docid)
    }

    fn cursor<'a>(&'a self) -> Box<dyn PostingCursor + 'a> {
        self.inner().cursor()
    }

    fn structure(&self) -> GraphStructure {
        self.inner().structure()
    }

    fn kind(&self) -> ListKind {
        self.inner().kind()
    }
}
