use rand::{seq::SliceRandom, RngCore};
use rand_distr::{Distribution, Poisson};
use std::cmp::min;

/// Synthetic vocabulary (latin words are left untouched by the tokenizer)
pub fn vocabulary(size: usize) -> Vec<String> {
    (0..size).map(|ix| format!("w{}", ix)).collect()
}

/// Random text whose words are drawn (with repetitions) from the vocabulary
///
/// The number of words follows a Poisson law, so document lengths and term
/// counts vary.
pub fn create_document(
    lambda_words: f64,
    max_words: usize,
    vocabulary: &[String],
    rng: &mut dyn RngCore,
) -> String {
    let poi = Poisson::new(lambda_words).unwrap();
    let num_words = min(1 + poi.sample(rng) as usize, max_words);

    let mut words = Vec::with_capacity(num_words);
    for _ in 0..num_words {
        words.push(vocabulary.choose(rng).unwrap().as_str());
    }
    words.join(" ")
}

/// Random query with `num_terms` words
pub fn create_query(num_terms: usize, vocabulary: &[String], rng: &mut dyn RngCore) -> String {
    vocabulary
        .choose_multiple(rng, num_terms)
        .map(|w| w.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
