//! B-tree posting list
//!
//! Nodes live in an arena and are addressed by their index; a node is a leaf
//! when it has no children. With minimum degree `t` (the order), every node
//! holds at most `2t - 1` postings and every non-root node at least `t - 1`.
//! Operations that need the parent of a node (split, borrow, merge) receive
//! the parent and the child position explicitly.

use log::debug;

use super::{node_id, GraphEdge, GraphNode, GraphStructure, ListKind, PostingCursor, PostingList};
use crate::base::{DocId, Len, Payload, Posting, TermCount};

pub const DEFAULT_ORDER: usize = 2;

type NodeId = usize;

#[derive(Default)]
struct BTreeNode {
    postings: Vec<Posting>,
    children: Vec<NodeId>,
}

impl BTreeNode {
    fn leaf(postings: Vec<Posting>) -> Self {
        Self {
            postings,
            children: Vec::new(),
        }
    }

    #[inline]
    fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    fn len(&self) -> usize {
        self.postings.len()
    }

    /// Position of the first posting whose document ID is not lower than `docid`
    #[inline]
    fn position(&self, docid: DocId) -> usize {
        self.postings.partition_point(|p| p.docid < docid)
    }

    /// Returns the position of `docid` if it is stored in this node
    #[inline]
    fn find(&self, docid: DocId) -> Result<usize, usize> {
        let pos = self.position(docid);
        if pos < self.len() && self.postings[pos].docid == docid {
            Ok(pos)
        } else {
            Err(pos)
        }
    }
}

pub struct BTreePostingList {
    nodes: Vec<BTreeNode>,
    /// Arena slots released by merges
    free: Vec<NodeId>,
    root: Option<NodeId>,
    order: usize,
    length: usize,
}

impl Default for BTreePostingList {
    fn default() -> Self {
        Self::new()
    }
}

impl BTreePostingList {
    pub fn new() -> Self {
        Self::with_order(DEFAULT_ORDER)
    }

    /// Creates a tree with a given minimum degree (at least 2)
    ///
    /// Lower orders are raised to 2.
    pub fn with_order(order: usize) -> Self {
        if order < 2 {
            debug!("B-tree order {} is too small, using 2", order);
        }
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            order: order.max(2),
            length: 0,
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of levels (0 for an empty tree)
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut node = self.root;
        while let Some(id) = node {
            height += 1;
            node = self.nodes[id].children.first().copied();
        }
        height
    }

    #[inline]
    fn max_keys(&self) -> usize {
        2 * self.order - 1
    }

    #[inline]
    fn min_keys(&self) -> usize {
        self.order - 1
    }

    #[inline]
    fn is_full(&self, node: NodeId) -> bool {
        self.nodes[node].len() == self.max_keys()
    }

    #[inline]
    fn can_spare(&self, node: NodeId) -> bool {
        self.nodes[node].len() > self.min_keys()
    }

    fn alloc(&mut self, node: BTreeNode) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id] = node;
            id
        } else {
            self.nodes.push(node);
            self.nodes.len() - 1
        }
    }

    fn release(&mut self, id: NodeId) {
        self.nodes[id] = BTreeNode::default();
        self.free.push(id);
    }

    /// Returns the node and position holding `docid`
    fn locate(&self, docid: DocId) -> Option<(NodeId, usize)> {
        let mut node = self.root?;
        loop {
            match self.nodes[node].find(docid) {
                Ok(pos) => return Some((node, pos)),
                Err(pos) => {
                    if self.nodes[node].is_leaf() {
                        return None;
                    }
                    node = self.nodes[node].children[pos];
                }
            }
        }
    }

    /// Inserts a posting whose document ID is not in the tree
    fn insert(&mut self, posting: Posting) {
        self.length += 1;

        let root = match self.root {
            None => {
                let id = self.alloc(BTreeNode::leaf(vec![posting]));
                self.root = Some(id);
                return;
            }
            Some(root) => root,
        };

        if !self.is_full(root) {
            self.insert_non_full(root, posting);
            return;
        }

        // The tree grows from the top: the old root becomes the only child
        // of a new root, and is split right away
        debug!("Splitting the root (height {})", self.height());
        let new_root = self.alloc(BTreeNode {
            postings: Vec::new(),
            children: vec![root],
        });
        self.root = Some(new_root);
        self.split_child(new_root, 0);
        self.insert_non_full(new_root, posting);
    }

    /// Splits the full child at position `index` of `parent`
    ///
    /// The child keeps its lowest `t - 1` postings, its median moves up into
    /// the parent and a new right sibling takes the highest `t - 1` postings
    /// (and `t` children for an internal node).
    fn split_child(&mut self, parent: NodeId, index: usize) {
        let t = self.order;
        let child = self.nodes[parent].children[index];

        let sibling_postings = self.nodes[child].postings.split_off(t);
        let sibling_children = if self.nodes[child].is_leaf() {
            Vec::new()
        } else {
            self.nodes[child].children.split_off(t)
        };
        let median = self.nodes[child].postings.pop();

        let sibling = self.alloc(BTreeNode {
            postings: sibling_postings,
            children: sibling_children,
        });

        let parent_node = &mut self.nodes[parent];
        if let Some(median) = median {
            parent_node.postings.insert(index, median);
        }
        parent_node.children.insert(index + 1, sibling);
    }

    /// Inserts into a subtree whose root is not full
    fn insert_non_full(&mut self, mut node: NodeId, posting: Posting) {
        loop {
            let mut pos = self.nodes[node].position(posting.docid);
            if self.nodes[node].is_leaf() {
                self.nodes[node].postings.insert(pos, posting);
                return;
            }

            let child = self.nodes[node].children[pos];
            if self.is_full(child) {
                self.split_child(node, pos);
                if posting.docid > self.nodes[node].postings[pos].docid {
                    pos += 1;
                }
            }
            node = self.nodes[node].children[pos];
        }
    }

    /// Removes `docid` from the tree and returns its posting
    fn delete(&mut self, docid: DocId) -> Option<Posting> {
        let root = self.root?;

        // Shrink the tree when the root would be emptied by merging its two
        // minimal children
        let root_node = &self.nodes[root];
        if root_node.len() == 1
            && !root_node.is_leaf()
            && self.nodes[root_node.children[0]].len() == self.min_keys()
            && self.nodes[root_node.children[1]].len() == self.min_keys()
        {
            debug!("Shrinking the tree (height {})", self.height());
            self.merge_children(root, 0);
            self.collapse_root();
        }

        let removed = self.delete_from(self.root?, docid);
        if removed.is_some() {
            self.length -= 1;
        }
        self.collapse_root();
        removed
    }

    /// Drops an empty root: the tree becomes empty, or its single child
    /// becomes the new root
    fn collapse_root(&mut self) {
        if let Some(root) = self.root {
            if self.nodes[root].len() > 0 {
                return;
            }
            self.root = self.nodes[root].children.first().copied();
            self.release(root);
        }
    }

    /// Deletes `docid` from the subtree rooted at `node`
    ///
    /// Every node we descend into has at least `t` postings (or is the root),
    /// so a posting can always be removed from the leaf we end up in.
    fn delete_from(&mut self, mut node: NodeId, mut docid: DocId) -> Option<Posting> {
        // Posting that was replaced by its predecessor or successor
        let mut replaced: Option<Posting> = None;

        loop {
            match self.nodes[node].find(docid) {
                Ok(pos) if self.nodes[node].is_leaf() => {
                    let removed = self.nodes[node].postings.remove(pos);
                    return replaced.or(Some(removed));
                }
                Ok(pos) => {
                    let left = self.nodes[node].children[pos];
                    let right = self.nodes[node].children[pos + 1];

                    if self.can_spare(left) || self.can_spare(right) {
                        // Replace by the predecessor (or successor) and
                        // delete it from the donor subtree
                        let (donor, substitute) = if self.can_spare(left) {
                            (left, self.extreme(left, true))
                        } else {
                            (right, self.extreme(right, false))
                        };
                        let previous =
                            std::mem::replace(&mut self.nodes[node].postings[pos], substitute);
                        replaced = replaced.or(Some(previous));
                        docid = substitute.docid;
                        node = donor;
                    } else {
                        // Both children are minimal: merge them around the
                        // posting, which then lives in the merged node
                        self.merge_children(node, pos);
                        node = left;
                    }
                }
                Err(_) if self.nodes[node].is_leaf() => return None,
                Err(pos) => {
                    node = self.prepare_child(node, pos);
                }
            }
        }
    }

    /// Makes sure the child at `index` can lose a posting before descending
    /// into it, and returns the (possibly merged) child
    fn prepare_child(&mut self, parent: NodeId, index: usize) -> NodeId {
        let children = &self.nodes[parent].children;
        let child = children[index];
        let left = index.checked_sub(1).map(|ix| children[ix]);
        let right = children.get(index + 1).copied();

        if self.can_spare(child) {
            return child;
        }

        if left.map_or(false, |left| self.can_spare(left)) {
            self.borrow_from_left(parent, index);
            child
        } else if right.map_or(false, |right| self.can_spare(right)) {
            self.borrow_from_right(parent, index);
            child
        } else if let Some(left) = left {
            // Merge with the left sibling, which absorbs the child
            self.merge_children(parent, index - 1);
            left
        } else {
            self.merge_children(parent, index);
            child
        }
    }

    /// Rotates one posting from the left sibling through the parent into the
    /// child at `index`
    fn borrow_from_left(&mut self, parent: NodeId, index: usize) {
        let target = self.nodes[parent].children[index];
        let donor = self.nodes[parent].children[index - 1];

        let (posting, subtree) = {
            let donor_node = &mut self.nodes[donor];
            (donor_node.postings.pop(), donor_node.children.pop())
        };
        let Some(posting) = posting else { return };
        let separator = std::mem::replace(&mut self.nodes[parent].postings[index - 1], posting);

        let target_node = &mut self.nodes[target];
        target_node.postings.insert(0, separator);
        if let Some(subtree) = subtree {
            target_node.children.insert(0, subtree);
        }
    }

    /// Rotates one posting from the right sibling through the parent into the
    /// child at `index`
    fn borrow_from_right(&mut self, parent: NodeId, index: usize) {
        let target = self.nodes[parent].children[index];
        let donor = self.nodes[parent].children[index + 1];

        let (posting, subtree) = {
            let donor_node = &mut self.nodes[donor];
            let subtree = if donor_node.is_leaf() {
                None
            } else {
                Some(donor_node.children.remove(0))
            };
            (donor_node.postings.remove(0), subtree)
        };
        let separator = std::mem::replace(&mut self.nodes[parent].postings[index], posting);

        let target_node = &mut self.nodes[target];
        target_node.postings.push(separator);
        if let Some(subtree) = subtree {
            target_node.children.push(subtree);
        }
    }

    /// Merges the children at `index` and `index + 1` of `parent` into the
    /// left one, together with the separating posting
    fn merge_children(&mut self, parent: NodeId, index: usize) {
        let parent_node = &mut self.nodes[parent];
        let separator = parent_node.postings.remove(index);
        let right = parent_node.children.remove(index + 1);
        let left = parent_node.children[index];

        let right_node = std::mem::take(&mut self.nodes[right]);
        let left_node = &mut self.nodes[left];
        left_node.postings.push(separator);
        left_node.postings.extend(right_node.postings);
        left_node.children.extend(right_node.children);

        self.release(right);
    }

    /// Highest (`max = true`) or lowest posting of a subtree
    fn extreme(&self, mut node: NodeId, max: bool) -> Posting {
        loop {
            let current = &self.nodes[node];
            if current.is_leaf() {
                let pos = if max { current.len() - 1 } else { 0 };
                return current.postings[pos];
            }
            node = if max {
                current.children[current.children.len() - 1]
            } else {
                current.children[0]
            };
        }
    }

    fn structure_step(&self, node: NodeId, id: String, structure: &mut GraphStructure) {
        let current = &self.nodes[node];
        structure.nodes.push(GraphNode {
            id: id.clone(),
            doc_ids: current.postings.iter().map(|p| p.docid).collect(),
        });

        for &child in current.children.iter() {
            let child_id = node_id();
            structure.edges.push(GraphEdge {
                source: id.clone(),
                target: child_id.clone(),
            });
            self.structure_step(child, child_id, structure);
        }
    }
}

impl Len for BTreePostingList {
    fn len(&self) -> usize {
        self.length
    }
}

impl PostingList for BTreePostingList {
    fn insert_or_increment(&mut self, docid: DocId, payload: Payload) {
        if let Some((node, pos)) = self.locate(docid) {
            self.nodes[node].postings[pos].payload.term_count += payload.term_count;
            return;
        }
        self.insert(Posting { docid, payload });
    }

    fn get(&self, docid: DocId) -> Option<Posting> {
        self.locate(docid)
            .map(|(node, pos)| self.nodes[node].postings[pos])
    }

    fn update_term_count(&mut self, docid: DocId, term_count: TermCount) -> bool {
        match self.locate(docid) {
            Some((node, pos)) => {
                self.nodes[node].postings[pos].payload.term_count = term_count;
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, docid: DocId) -> Option<Posting> {
        self.delete(docid)
    }

    fn cursor<'a>(&'a self) -> Box<dyn PostingCursor + 'a> {
        Box::new(BTreeCursor::new(self))
    }

    fn structure(&self) -> GraphStructure {
        let mut structure = GraphStructure::default();
        if let Some(root) = self.root {
            self.structure_step(root, node_id(), &mut structure);
        }
        structure
    }

    fn kind(&self) -> ListKind {
        ListKind::Tree
    }
}

/// In-order traversal frame: a node and the position of its next posting
struct Frame {
    node: NodeId,
    index: usize,
}

/// In-order cursor over a B-tree, using an explicit stack of frames
pub struct BTreeCursor<'a> {
    tree: &'a BTreePostingList,
    stack: Vec<Frame>,
    current: Option<Posting>,
}

impl<'a> BTreeCursor<'a> {
    fn new(tree: &'a BTreePostingList) -> Self {
        let mut cursor = Self {
            tree,
            stack: Vec::new(),
            current: None,
        };
        if let Some(root) = tree.root {
            cursor.descend(root);
        }
        cursor
    }

    /// Pushes `node` and its leftmost path down to a leaf
    fn descend(&mut self, mut node: NodeId) {
        loop {
            self.stack.push(Frame { node, index: 0 });
            match self.tree.nodes[node].children.first() {
                Some(&child) => node = child,
                None => return,
            }
        }
    }

    fn step(&mut self) -> Option<Posting> {
        let tree = self.tree;
        loop {
            let frame = self.stack.last_mut()?;
            let node = &tree.nodes[frame.node];

            if frame.index >= node.len() {
                // Node exhausted, go back to the parent
                self.stack.pop();
                continue;
            }

            let posting = node.postings[frame.index];
            frame.index += 1;
            if !node.is_leaf() {
                // The following subtree comes right after this posting
                let child = node.children[frame.index];
                self.descend(child);
            }
            return Some(posting);
        }
    }
}

impl Iterator for BTreeCursor<'_> {
    type Item = Posting;

    fn next(&mut self) -> Option<Posting> {
        self.current = self.step();
        self.current
    }
}

impl PostingCursor for BTreeCursor<'_> {
    fn current(&self) -> Option<Posting> {
        self.current
    }
}
