use crate::corpus::Article;
use crate::tfidf::TermVector;
use ahash::AHashSet;
use serde::Serialize;

/// Which signal decided a pair's score.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Tags,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Similarity {
    pub score: f64,
    pub signal: Signal,
}

/// Jaccard index of two tag sets; 0 when both are empty.
pub fn tag_similarity(a: &[String], b: &[String]) -> f64 {
    let a: AHashSet<&str> = a.iter().map(String::as_str).collect();
    let b: AHashSet<&str> = b.iter().map(String::as_str).collect();

    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(&b).count();
    intersection as f64 / union as f64
}

/// Cosine similarity of two sparse vectors; 0 when either norm is 0.
///
/// Accumulates over `a`'s terms in order, then `b`'s remaining terms, so the
/// result does not depend on hashing.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    for (term, &wa) in a {
        let wb = b.get(term).copied().unwrap_or(0.0);
        dot += wa * wb;
        norm_a += wa * wa;
        norm_b += wb * wb;
    }
    for (term, &wb) in b {
        if !a.contains_key(term) {
            norm_b += wb * wb;
        }
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b).sqrt()).clamp(0.0, 1.0)
}

/// Score a pair: any tag overlap wins outright, otherwise fall back to text.
pub fn similarity(a: &Article, b: &Article, vec_a: &TermVector, vec_b: &TermVector) -> Similarity {
    let tags = tag_similarity(a.tags(), b.tags());
    if tags > 0.0 {
        return Similarity {
            score: tags,
            signal: Signal::Tags,
        };
    }
    Similarity {
        score: cosine_similarity(vec_a, vec_b),
        signal: Signal::Text,
    }
}
