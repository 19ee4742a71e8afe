//! Sorted singly linked posting list
//!
//! Linear time insertion and lookup; this is the baseline implementation.

use super::{node_id, GraphEdge, GraphNode, GraphStructure, ListKind, PostingCursor, PostingList};
use crate::base::{DocId, Len, Payload, Posting, TermCount};

type Link = Option<Box<LinkedNode>>;

struct LinkedNode {
    posting: Posting,
    next: Link,
}

#[derive(Default)]
pub struct LinkedPostingList {
    head: Link,
    length: usize,
}

impl LinkedPostingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the link where `docid` is, or should be inserted
    fn link_mut(&mut self, docid: DocId) -> &mut Link {
        let mut link = &mut self.head;
        while matches!(link, Some(node) if node.posting.docid < docid) {
            if let Some(node) = link {
                link = &mut node.next;
            }
        }
        link
    }

    fn node(&self, docid: DocId) -> Option<&LinkedNode> {
        let mut current = self.head.as_deref();
        while let Some(node) = current {
            if node.posting.docid >= docid {
                return (node.posting.docid == docid).then_some(node);
            }
            current = node.next.as_deref();
        }
        None
    }

    fn node_mut(&mut self, docid: DocId) -> Option<&mut LinkedNode> {
        match self.link_mut(docid) {
            Some(node) if node.posting.docid == docid => Some(&mut **node),
            _ => None,
        }
    }
}

impl Drop for LinkedPostingList {
    // Unlinks the nodes one by one (no recursive drop)
    fn drop(&mut self) {
        let mut link = self.head.take();
        while let Some(mut node) = link {
            link = node.next.take();
        }
    }
}

impl Len for LinkedPostingList {
    fn len(&self) -> usize {
        self.length
    }
}

impl PostingList for LinkedPostingList {
    fn insert_or_increment(&mut self, docid: DocId, payload: Payload) {
        let link = self.link_mut(docid);
        if let Some(node) = link {
            if node.posting.docid == docid {
                node.posting.payload.term_count += payload.term_count;
                return;
            }
        }

        let next = link.take();
        *link = Some(Box::new(LinkedNode {
            posting: Posting { docid, payload },
            next,
        }));
        self.length += 1;
    }

    fn get(&self, docid: DocId) -> Option<Posting> {
        self.node(docid).map(|node| node.posting)
    }

    fn update_term_count(&mut self, docid: DocId, term_count: TermCount) -> bool {
        match self.node_mut(docid) {
            Some(node) => {
                node.posting.payload.term_count = term_count;
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, docid: DocId) -> Option<Posting> {
        let link = self.link_mut(docid);
        match link.take() {
            Some(node) if node.posting.docid == docid => {
                let LinkedNode { posting, next } = *node;
                *link = next;
                self.length -= 1;
                Some(posting)
            }
            other => {
                *link = other;
                None
            }
        }
    }

    fn cursor<'a>(&'a self) -> Box<dyn PostingCursor + 'a> {
        Box::new(LinkedCursor {
            list: self,
            current: None,
            started: false,
        })
    }

    fn structure(&self) -> GraphStructure {
        let mut structure = GraphStructure::default();
        let mut previous: Option<String> = None;

        let mut current = self.head.as_deref();
        while let Some(node) = current {
            let id = node_id();
            if let Some(source) = previous {
                structure.edges.push(GraphEdge {
                    source,
                    target: id.clone(),
                });
            }
            structure.nodes.push(GraphNode {
                id: id.clone(),
                doc_ids: vec![node.posting.docid],
            });
            previous = Some(id);
            current = node.next.as_deref();
        }

        structure
    }

    fn kind(&self) -> ListKind {
        ListKind::Linked
    }
}

pub struct LinkedCursor<'a> {
    list: &'a LinkedPostingList,
    current: Option<&'a LinkedNode>,
    started: bool,
}

impl Iterator for LinkedCursor<'_> {
    type Item = Posting;

    fn next(&mut self) -> Option<Posting> {
        self.current = if self.started {
            self.current.and_then(|node| node.next.as_deref())
        } else {
            self.started = true;
            self.list.head.as_deref()
        };
        self.current.map(|node| node.posting)
    }
}

impl PostingCursor for LinkedCursor<'_> {
    fn current(&self) -> Option<Posting> {
        self.current.map(|node| node.posting)
    }
}
