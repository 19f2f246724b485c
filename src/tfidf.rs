use crate::corpus::Article;
use crate::tokenize::tokenize;
use ahash::AHashSet;
use indexmap::IndexMap;
use tracing::debug;

/// Sparse TF-IDF weights for one document, in first-occurrence term order.
pub type TermVector = IndexMap<String, f64>;

/// Per-run corpus statistics: the document frequency table plus one weight
/// vector per article, aligned with corpus position.
///
/// Built once and read-only afterwards. Any corpus change requires a full
/// rebuild since document frequencies and norms are corpus-wide.
#[derive(Debug, Clone)]
pub struct CorpusStats {
    doc_count: usize,
    doc_freq: IndexMap<String, usize>,
    doc_lengths: Vec<usize>,
    vectors: Vec<TermVector>,
}

impl CorpusStats {
    pub fn build(articles: &[Article]) -> Self {
        Self::from_snippets(articles.iter().map(|a| a.snippet.as_deref()))
    }

    pub fn from_snippets<'a, I>(snippets: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let documents: Vec<Vec<String>> = snippets.into_iter().map(tokenize).collect();

        // Document frequencies: one count per document, however often it repeats
        let mut doc_freq: IndexMap<String, usize> = IndexMap::new();
        for doc in &documents {
            let mut seen: AHashSet<&str> = AHashSet::new();
            for token in doc {
                if seen.insert(token.as_str()) {
                    *doc_freq.entry(token.clone()).or_insert(0) += 1;
                }
            }
        }

        let doc_count = documents.len();
        let mut stats = CorpusStats {
            doc_count,
            doc_freq,
            doc_lengths: documents.iter().map(Vec::len).collect(),
            vectors: Vec::with_capacity(doc_count),
        };

        let vectors: Vec<TermVector> = documents.iter().map(|doc| stats.weigh(doc)).collect();
        stats.vectors = vectors;

        debug!(
            documents = stats.doc_count,
            vocabulary = stats.doc_freq.len(),
            "built tf-idf vectors"
        );

        stats
    }

    fn weigh(&self, doc: &[String]) -> TermVector {
        let length = doc.len();
        if length == 0 {
            return TermVector::new();
        }

        let mut counts: IndexMap<&str, usize> = IndexMap::new();
        for token in doc {
            *counts.entry(token.as_str()).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .map(|(term, count)| {
                let tf = count as f64 / length as f64;
                (term.to_string(), tf * self.idf(term))
            })
            .collect()
    }

    /// Smoothed inverse document frequency: `ln((N + 1) / (df + 1)) + 1`.
    pub fn idf(&self, term: &str) -> f64 {
        let df = self.doc_frequency(term) as f64;
        let n = self.doc_count as f64;
        ((n + 1.0) / (df + 1.0)).ln() + 1.0
    }

    pub fn doc_frequency(&self, term: &str) -> usize {
        self.doc_freq.get(term).copied().unwrap_or(0)
    }

    pub fn doc_count(&self) -> usize {
        self.doc_count
    }

    pub fn vocabulary_size(&self) -> usize {
        self.doc_freq.len()
    }

    pub fn doc_length(&self, position: usize) -> usize {
        self.doc_lengths.get(position).copied().unwrap_or(0)
    }

    pub fn vector(&self, position: usize) -> &TermVector {
        &self.vectors[position]
    }

    pub fn vectors(&self) -> &[TermVector] {
        &self.vectors
    }

    /// Terms with the highest document frequency; ties keep first appearance.
    pub fn top_terms(&self, limit: usize) -> Vec<(&str, usize)> {
        let mut terms: Vec<(&str, usize)> = self
            .doc_freq
            .iter()
            .map(|(term, df)| (term.as_str(), *df))
            .collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1));
        terms.truncate(limit);
        terms
    }
}
