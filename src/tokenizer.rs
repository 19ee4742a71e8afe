//! Text tokenizer used for both documents and queries
//!
//! Pipeline: Unicode word boundaries, lowercase, stop words removal and
//! Snowball (Russian) stemming. Latin words go through the same chain and are
//! mostly left untouched by the stemmer.

use std::collections::HashSet;

use rust_stemmers::{Algorithm, Stemmer};
use unicode_segmentation::UnicodeSegmentation;

/// Common Russian function words, they carry no ranking signal
const STOPWORDS: &[&str] = &[
    "а", "без", "более", "больше", "будет", "будто", "бы", "был", "была", "были", "было", "быть",
    "в", "вам", "вас", "ведь", "во", "вот", "впрочем", "все", "всегда", "всего", "всех", "всю",
    "вы", "где", "да", "даже", "два", "для", "до", "другой", "его", "ее", "ей", "ему", "если",
    "есть", "еще", "ж", "же", "за", "зачем", "здесь", "и", "из", "или", "им", "иногда", "их", "к",
    "как", "какая", "какой", "когда", "конечно", "кто", "куда", "ли", "лучше", "между", "меня",
    "мне", "много", "может", "можно", "мой", "моя", "мы", "на", "над", "надо", "наконец", "нас",
    "не", "него", "нее", "ней", "нельзя", "нет", "ни", "нибудь", "никогда", "ним", "них", "ничего",
    "но", "ну", "о", "об", "один", "он", "она", "они", "опять", "от", "перед", "по", "под",
    "после", "потом", "потому", "почти", "при", "про", "раз", "разве", "с", "сам", "свою", "себе",
    "себя", "со", "совсем", "так", "такой", "также", "там", "тебя", "тем", "теперь", "то",
    "тогда", "того", "тоже", "только", "том", "тот", "три", "тут", "ты", "у", "уж", "уже",
    "хорошо", "хоть", "чего", "чем", "через", "что", "чтоб", "чтобы", "чуть", "эти", "этого",
    "этой", "этом", "этот", "эту", "я",
];

#[inline]
fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

/// Tokenize a text into stemmed terms
///
/// Repeated words produce repeated terms, in the order they appear.
pub fn tokenize(text: &str) -> Vec<String> {
    let stemmer = Stemmer::create(Algorithm::Russian);

    text.unicode_words()
        .map(|w| w.to_lowercase().replace('ё', "е"))
        .filter(|w| !is_stopword(w))
        .map(|w| stemmer.stem(&w).into_owned())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Keeps the first occurrence of each term
pub fn unique(tokens: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tokens
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}
