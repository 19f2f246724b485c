use crate::corpus::Article;
use crate::similarity::{similarity, Similarity};
use crate::tfidf::CorpusStats;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

pub const DEFAULT_TOP_N: usize = 5;

/// A `{title, url}` reference stored in an article's `relatedArticles`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RelatedArticle {
    pub title: String,
    pub url: String,
}

impl From<&Article> for RelatedArticle {
    fn from(article: &Article) -> Self {
        RelatedArticle {
            title: article.title.clone(),
            url: article.url.clone(),
        }
    }
}

/// One scored peer of a target article.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub position: usize,
    pub similarity: Similarity,
}

/// Score `target` against every other article, best first.
///
/// Equal scores keep corpus order: the sort key is `(-score, position)`.
pub fn rank_candidates(articles: &[Article], stats: &CorpusStats, target: usize) -> Vec<Candidate> {
    let article = &articles[target];
    let vector = stats.vector(target);

    let mut candidates: Vec<Candidate> = articles
        .iter()
        .enumerate()
        .filter(|(position, _)| *position != target)
        .map(|(position, other)| Candidate {
            position,
            similarity: similarity(article, other, vector, stats.vector(position)),
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.similarity
            .score
            .partial_cmp(&a.similarity.score)
            .unwrap_or(Ordering::Equal)
            .then(a.position.cmp(&b.position))
    });
    candidates
}

/// Related articles for every article, in corpus order.
///
/// Each list holds at most `min(top_n, len - 1)` entries and never the
/// article itself.
pub fn related_articles(articles: &[Article], stats: &CorpusStats, top_n: usize) -> Vec<Vec<RelatedArticle>> {
    debug_assert_eq!(stats.vectors().len(), articles.len());
    let max_related = top_n.min(articles.len().saturating_sub(1));
    if max_related == 0 {
        return vec![Vec::new(); articles.len()];
    }

    let related: Vec<Vec<RelatedArticle>> = (0..articles.len())
        .map(|target| {
            let mut candidates = rank_candidates(articles, stats, target);
            candidates.truncate(max_related);
            candidates
                .into_iter()
                .map(|c| RelatedArticle::from(&articles[c.position]))
                .collect()
        })
        .collect();

    debug!(articles = articles.len(), max_related, "ranked related articles");
    related
}
