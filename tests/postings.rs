use inverted_search::{
    base::{DocId, Len, Payload, Posting},
    postings::{BTreePostingList, ListKind, PostingList, Postings},
};
use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rstest::rstest;

/// Initialize the logger
fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn postings(list: &dyn PostingList) -> Vec<Posting> {
    list.iter().collect()
}

/// Random (docid, doc length) insertion sequence with repetitions
fn random_sequence(seed: u64, length: usize, max_docid: DocId) -> Vec<(DocId, u64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..length)
        .map(|_| {
            let docid = rng.gen_range(0..max_docid);
            (docid, docid % 17 + 1)
        })
        .collect()
}

#[rstest]
#[case(ListKind::Tree)]
#[case(ListKind::Linked)]
fn test_repeated_inserts(#[case] kind: ListKind) {
    let mut list = Postings::new(kind, 2);
    for _ in 0..7 {
        list.insert_or_increment(42, Payload::new(12));
    }

    assert_eq!(list.len(), 1);
    assert_eq!(
        postings(&list),
        vec![Posting {
            docid: 42,
            payload: Payload {
                term_count: 7,
                doc_length: 12
            }
        }]
    );
}

#[rstest]
#[case(2, 1, 100)]
#[case(2, 2, 2000)]
#[case(3, 3, 500)]
#[case(5, 4, 2000)]
fn test_tree_and_linked_agree(
    #[case] order: usize,
    #[case] seed: u64,
    #[case] length: usize,
) {
    init_logger();
    let mut tree = Postings::new(ListKind::Tree, order);
    let mut linked = Postings::new(ListKind::Linked, order);

    for (docid, doc_length) in random_sequence(seed, length, 300) {
        tree.insert_or_increment(docid, Payload::new(doc_length));
        linked.insert_or_increment(docid, Payload::new(doc_length));
    }
    info!("{} distinct postings", tree.len());

    let expected = postings(&linked);
    assert_eq!(postings(&tree), expected);
    assert_eq!(tree.len(), linked.len());
    assert!(expected.windows(2).all(|w| w[0].docid < w[1].docid));

    // Point lookups agree too
    for docid in 0..310 {
        assert_eq!(tree.get(docid), linked.get(docid));
    }
}

#[rstest]
#[case(ListKind::Tree, 2)]
#[case(ListKind::Tree, 4)]
#[case(ListKind::Linked, 2)]
fn test_insert_delete_inverse(#[case] kind: ListKind, #[case] order: usize) {
    let mut list = Postings::new(kind, order);
    for (docid, doc_length) in random_sequence(7, 400, 1000) {
        list.insert_or_increment(docid, Payload::new(doc_length));
    }
    let before = postings(&list);

    for docid in (1000..1100).chain([5000, 0]) {
        if list.get(docid).is_some() {
            continue;
        }
        list.insert_or_increment(docid, Payload::new(3));
        assert_eq!(list.remove(docid).map(|p| p.docid), Some(docid));
        assert_eq!(postings(&list), before);
    }
}

#[rstest]
#[case(ListKind::Tree)]
#[case(ListKind::Linked)]
fn test_remove_everything(#[case] kind: ListKind) {
    let mut list = Postings::new(kind, 3);
    let sequence = random_sequence(11, 1000, 500);
    for &(docid, doc_length) in sequence.iter() {
        list.insert_or_increment(docid, Payload::new(doc_length));
    }

    let mut docids: Vec<DocId> = list.iter().map(|p| p.docid).collect();
    // Interleave removals from both ends
    let mut from_end = false;
    while !docids.is_empty() {
        let docid = if from_end {
            docids.pop()
        } else {
            Some(docids.remove(0))
        };
        let docid = docid.expect("not empty");
        assert!(list.remove(docid).is_some());
        assert!(list.remove(docid).is_none());
        assert_eq!(list.len(), docids.len());
        assert_eq!(list.iter().map(|p| p.docid).collect::<Vec<_>>(), docids);
        from_end = !from_end;
    }
    assert!(list.structure().nodes.is_empty());
}

#[rstest]
#[case(ListKind::Tree)]
#[case(ListKind::Linked)]
fn test_cursor_seek(#[case] kind: ListKind) {
    let mut list = Postings::new(kind, 2);
    for docid in (0..100).map(|x| x * 3) {
        list.insert_or_increment(docid, Payload::new(1));
    }

    let mut cursor = list.cursor();
    assert_eq!(cursor.seek(10).map(|p| p.docid), Some(12));
    // Already positioned
    assert_eq!(cursor.seek(11).map(|p| p.docid), Some(12));
    assert_eq!(cursor.seek(12).map(|p| p.docid), Some(12));
    assert_eq!(cursor.next().map(|p| p.docid), Some(15));
    assert_eq!(cursor.seek(297).map(|p| p.docid), Some(297));
    assert!(cursor.seek(298).is_none());
    assert!(cursor.next().is_none());
}

#[test]
fn test_update_term_count() {
    for kind in [ListKind::Tree, ListKind::Linked] {
        let mut list = Postings::new(kind, 2);
        for docid in 0..20 {
            list.insert_or_increment(docid, Payload::new(5));
        }
        assert!(list.update_term_count(13, 9));
        assert!(!list.update_term_count(20, 9));
        assert_eq!(list.get(13).map(|p| p.payload.term_count), Some(9));
    }
}

#[test]
fn test_tree_height() {
    let mut tree = BTreePostingList::with_order(2);
    for docid in 0..1000 {
        tree.insert_or_increment(docid, Payload::new(1));
    }
    // A tree with minimal degree 2 holds at least 2^h - 1 postings
    let height = tree.height();
    assert!(height >= 5, "height {}", height);
    assert!(height <= 10, "height {}", height);
}

#[test]
fn test_structure_export() {
    let mut tree = Postings::new(ListKind::Tree, 2);
    for docid in 0..10 {
        tree.insert_or_increment(docid, Payload::new(1));
    }
    let structure = tree.list_structure();
    assert_eq!(structure.kind, ListKind::Tree);

    let mut all: Vec<DocId> = structure
        .structure
        .nodes
        .iter()
        .flat_map(|n| n.doc_ids.iter().copied())
        .collect();
    all.sort();
    assert_eq!(all, (0..10).collect::<Vec<_>>());
    // A tree: one edge less than nodes
    assert_eq!(
        structure.structure.edges.len() + 1,
        structure.structure.nodes.len()
    );
}
