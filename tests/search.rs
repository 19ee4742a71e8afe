use helpers::{
    documents::create_query,
    index::{check_results, TestIndex},
};
use inverted_search::{
    base::{DocId, Score},
    index::{IndexOptions, InvertedIndex},
    search::{
        AlgorithmKind, Bm25, Bm25Options, FrequencyRanking, RankingAlgorithm, ScoredDocument,
        SearchParams, TopScoredDocuments,
    },
    EngineError, ListKind,
};
use log::{debug, info};
use ntest::assert_about_eq;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rstest::rstest;

/// Initialize the logger
fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn search(
    algorithm: &dyn RankingAlgorithm,
    index: &InvertedIndex,
    query: &str,
    max_docs: usize,
) -> Vec<ScoredDocument> {
    algorithm
        .search(&SearchParams {
            index,
            query,
            max_docs,
        })
        .expect("search should succeed")
}

fn docids(results: &[ScoredDocument]) -> Vec<DocId> {
    results.iter().map(|d| d.docid).collect()
}

fn russian_index(kind: ListKind) -> InvertedIndex {
    let mut index = InvertedIndex::new(kind);
    for text in ["кот сидит на окне", "кот спит", "собака бежит"] {
        index.index_text(text);
    }
    index
}

#[rstest]
#[case(ListKind::Tree)]
#[case(ListKind::Linked)]
fn test_frequency_scenario(#[case] kind: ListKind) {
    init_logger();
    let index = russian_index(kind);
    let results = search(&FrequencyRanking, &index, "кот", 10);

    assert_eq!(docids(&results), vec![0, 1]);
    assert!(results.iter().all(|d| d.score == 1.));
}

#[rstest]
#[case(ListKind::Tree)]
#[case(ListKind::Linked)]
fn test_bm25_scenario(#[case] kind: ListKind) {
    init_logger();
    let mut index = russian_index(kind);
    for text in ["птица летит", "рыба плывет", "собака лает"] {
        index.index_text(text);
    }
    let bm25 = Bm25::new(Bm25Options::default());
    let results = search(&bm25, &index, "кот", 10);

    // Same term count, the shorter document ranks first
    assert_eq!(docids(&results), vec![1, 0]);
    assert!(results[0].score > results[1].score);

    let average = index.average_doc_length();
    assert_about_eq!(results[0].score, bm25.score(1, 8, average, 2, 6));
    assert_about_eq!(results[1].score, bm25.score(1, 17, average, 2, 6));
}

#[test]
fn test_bm25_frequent_term() {
    // "кот" is in 2 documents out of 3: its IDF is negative and no document
    // can reach a zero score
    let index = russian_index(ListKind::Tree);
    let results = search(&Bm25::new(Bm25Options::default()), &index, "кот", 10);
    assert!(results.is_empty());

    // Frequency ranking is not affected
    assert_eq!(search(&FrequencyRanking, &index, "кот", 10).len(), 2);
}

#[test]
fn test_bm25_min_score() {
    let mut index = InvertedIndex::new(ListKind::Tree);
    for text in ["кот", "кот кот кот", "собака", "птица", "рыба", "мышь"] {
        index.index_text(text);
    }
    let all = search(&Bm25::new(Bm25Options::default()), &index, "кот", 10);
    assert_eq!(docids(&all), vec![1, 0]);

    // Threshold between the two scores
    let min_score = (all[0].score + all[1].score) / 2.;
    let bm25 = Bm25::new(Bm25Options {
        min_score,
        ..Default::default()
    });
    assert_eq!(docids(&search(&bm25, &index, "кот", 10)), vec![1]);
}

#[test]
fn test_frequency_counts_occurrences() {
    let mut index = InvertedIndex::new(ListKind::Tree);
    index.index_text("кот кот кот");
    index.index_text("кот собака");
    index.index_text("собака");

    // Repeated query words count once
    let results = search(&FrequencyRanking, &index, "кот кот собака", 10);
    assert_eq!(docids(&results), vec![0, 1, 2]);
    let scores: Vec<Score> = results.iter().map(|d| d.score).collect();
    assert_eq!(scores, vec![3., 2., 1.]);
}

#[test]
fn test_unknown_terms() {
    let index = russian_index(ListKind::Tree);
    for algorithm in [AlgorithmKind::Bm25, AlgorithmKind::Frequency] {
        let algorithm = algorithm.build(&Bm25Options::default());
        assert!(search(algorithm.as_ref(), &index, "жираф", 10).is_empty());
        assert!(search(algorithm.as_ref(), &index, "", 10).is_empty());
        assert!(search(algorithm.as_ref(), &index, "на и в", 10).is_empty());
    }
}

#[test]
fn test_distance_fails() {
    let index = russian_index(ListKind::Tree);
    let result = AlgorithmKind::Distance
        .build(&Bm25Options::default())
        .search(&SearchParams {
            index: &index,
            query: "кот",
            max_docs: 10,
        });
    assert_eq!(
        result.err(),
        Some(EngineError::UnimplementedAlgorithm(AlgorithmKind::Distance))
    );
}

#[test]
fn test_top_k_bound_and_order() {
    init_logger();
    let mut rng = StdRng::seed_from_u64(3);

    for top_k in [1, 5, 20] {
        let mut top = TopScoredDocuments::new(top_k);
        let mut offered = Vec::new();
        for docid in 0..500 {
            // Few distinct values, to get ties
            let score = rng.gen_range(0..30) as Score;
            top.add(docid, score);
            offered.push(ScoredDocument { docid, score });
            assert!(top.len() <= top_k);
        }

        // Stable sort: equal scores keep their offer order
        offered.sort_by(|a, b| b.score.total_cmp(&a.score));
        offered.truncate(top_k);
        assert_eq!(top.into_sorted_vec(), offered);
    }
}

#[test]
fn test_top_k_floor() {
    let mut top = TopScoredDocuments::new(2);
    assert_eq!(top.add(0, 5.), Score::NEG_INFINITY);
    assert_eq!(top.add(1, 3.), 3.);
    assert_eq!(top.add(2, 4.), 4.);
    assert_eq!(top.add(3, 1.), 4.);
}

#[rstest]
#[case(1., 0.5)]
#[case(0.3, 2.)]
#[case(2., 1.)]
fn test_bm25_monotonicity(#[case] idf: f64, #[case] length_ratio: f64) {
    for options in [
        Bm25Options::default(),
        Bm25Options {
            k: 1.2,
            b: 0.3,
            ..Default::default()
        },
    ] {
        let bm25 = Bm25::new(options);
        // Increasing in the term frequency
        let mut previous = 0.;
        for tf in 1..50 {
            let score = bm25.score(tf, (100. * length_ratio) as u64, 100., 1, 100);
            assert!(score > previous);
            previous = score;
        }

        // Increasing in the IDF (through the document frequency)
        let mut previous = Score::INFINITY;
        for docs_with_term in 1..40 {
            let score = bm25.score(3, (100. * length_ratio) as u64, 100., docs_with_term, 100);
            assert!(score < previous);
            previous = score;
        }
        assert!(bm25.upper_bound(idf) > bm25.upper_bound(idf / 2.));
    }
}

#[rstest]
#[case(ListKind::Tree, 1, 0.)]
#[case(ListKind::Linked, 2, 0.)]
#[case(ListKind::Tree, 3, 4.)]
#[case(ListKind::Tree, 4, 8.)]
fn test_bm25_brute_force(#[case] kind: ListKind, #[case] seed: u64, #[case] min_score: Score) {
    init_logger();
    let data = TestIndex::new(kind, 100, 1000, 5., 12, Some(seed));
    let options = Bm25Options {
        min_score,
        ..Default::default()
    };
    let bm25 = Bm25::new(options.clone());

    let mut rng = StdRng::seed_from_u64(seed);
    for num_terms in [1, 2, 4, 8] {
        let query = create_query(num_terms, &data.vocabulary, &mut rng);
        debug!("Query: {}", query);

        let observed = search(&bm25, &data.index, &query, 10);
        let expected = data.bm25_scores(&query, &options);
        info!(
            "{} results for {} ({} matching documents)",
            observed.len(),
            query,
            expected.len()
        );
        check_results(&observed, &expected, 10);
    }
}

#[rstest]
#[case(ListKind::Tree, 5)]
#[case(ListKind::Linked, 6)]
fn test_frequency_brute_force(#[case] kind: ListKind, #[case] seed: u64) {
    init_logger();
    let data = TestIndex::new(kind, 50, 500, 6., 15, Some(seed));

    let mut rng = StdRng::seed_from_u64(seed);
    for num_terms in [1, 3, 6] {
        let query = create_query(num_terms, &data.vocabulary, &mut rng);
        let observed = search(&FrequencyRanking, &data.index, &query, 20);
        check_results(&observed, &data.frequency_scores(&query), 20);
    }
}

#[rstest]
#[case(AlgorithmKind::Bm25)]
#[case(AlgorithmKind::Frequency)]
fn test_tree_and_linked_rank_alike(#[case] algorithm: AlgorithmKind) {
    init_logger();
    let options = IndexOptions {
        btree_order: 3,
        ..Default::default()
    };
    let tree = TestIndex::with_options(ListKind::Tree, 80, 800, 5., 10, Some(9), options.clone());
    let linked = TestIndex::with_options(ListKind::Linked, 80, 800, 5., 10, Some(9), options);
    assert_eq!(tree.documents, linked.documents);

    let ranking = algorithm.build(&Bm25Options::default());
    let mut rng = StdRng::seed_from_u64(10);
    for num_terms in [1, 2, 5] {
        let query = create_query(num_terms, &tree.vocabulary, &mut rng);
        assert_eq!(
            search(ranking.as_ref(), &tree.index, &query, 10),
            search(ranking.as_ref(), &linked.index, &query, 10)
        );
    }
}
