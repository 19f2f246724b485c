use crate::error::{Error, Result};
use crate::related::RelatedArticle;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const RELATED_FIELD: &str = "relatedArticles";

/// Read-only view of the fields the ranker needs from one corpus entry.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Article {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

impl Article {
    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or(&[])
    }
}

/// The article collection as loaded from disk.
///
/// Raw records keep every field and its key order so they can be written back
/// untouched apart from `relatedArticles`.
#[derive(Debug, Clone)]
pub struct Corpus {
    path: PathBuf,
    records: Vec<Map<String, Value>>,
    articles: Vec<Article>,
}

impl Corpus {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let corpus = Self::parse(path, &content)?;
        info!(path = %path.display(), articles = corpus.len(), "loaded corpus");
        Ok(corpus)
    }

    /// Parse and validate every entry before anything is computed.
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;

        let Value::Array(items) = value else {
            return Err(Error::NotAnArray {
                path: path.to_path_buf(),
            });
        };

        let mut records = Vec::with_capacity(items.len());
        let mut articles = Vec::with_capacity(items.len());

        for (index, item) in items.into_iter().enumerate() {
            let Value::Object(record) = item else {
                return Err(Error::InvalidArticle {
                    index,
                    reason: "expected a JSON object".to_string(),
                });
            };
            let article: Article = Article::deserialize(&Value::Object(record.clone()))
                .map_err(|e| Error::InvalidArticle {
                    index,
                    reason: e.to_string(),
                })?;
            records.push(record);
            articles.push(article);
        }

        Ok(Corpus {
            path: path.to_path_buf(),
            records,
            articles,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Position of the article whose url, or failing that title, matches.
    pub fn position_of(&self, key: &str) -> Option<usize> {
        self.articles
            .iter()
            .position(|a| a.url == key)
            .or_else(|| self.articles.iter().position(|a| a.title == key))
    }

    /// Replace each record's `relatedArticles`, in corpus order.
    pub fn attach_related(&mut self, related: Vec<Vec<RelatedArticle>>) -> Result<()> {
        debug_assert_eq!(related.len(), self.records.len());
        for (record, links) in self.records.iter_mut().zip(related) {
            record.insert(RELATED_FIELD.to_string(), serde_json::to_value(links)?);
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }

    /// Write the corpus atomically so a failure never leaves a partial file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        write_atomic(path, json.as_bytes()).map_err(|source| Error::Persist {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), bytes = json.len(), "wrote corpus");
        Ok(())
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    // Same-directory temp file so the rename stays on one filesystem
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;

    if let Ok(meta) = fs::metadata(path) {
        fs::set_permissions(tmp.path(), meta.permissions())?;
    }

    tmp.persist(path).map_err(|e| e.error)?;
    debug!(path = %path.display(), "persisted temp file");
    Ok(())
}

#[cfg(test)]
impl Article {
    pub fn new(title: &str, url: &str, snippet: Option<&str>, tags: &[&str]) -> Self {
        Article {
            title: title.to_string(),
            url: url.to_string(),
            snippet: snippet.map(str::to_string),
            tags: Some(tags.iter().map(|t| t.to_string()).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn parse(content: &str) -> Result<Corpus> {
        Corpus::parse(Path::new("articles.json"), content)
    }

    #[test]
    fn test_parse_optional_fields() {
        let corpus = parse(
            r#"[
                {"title": "A", "url": "/a", "snippet": "hello", "tags": ["x"]},
                {"title": "B", "url": "/b", "snippet": null, "tags": null},
                {"title": "C", "url": "/c"}
            ]"#,
        )
        .unwrap();

        let articles = corpus.articles();
        assert_eq!(articles.len(), 3);
        assert_eq!(articles[0].tags(), &["x".to_string()]);
        assert_eq!(articles[0].snippet.as_deref(), Some("hello"));
        assert!(articles[1].snippet.is_none());
        assert!(articles[1].tags().is_empty());
        assert!(articles[2].snippet.is_none());
        assert!(articles[2].tags().is_empty());
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(parse("not json"), Err(Error::Json { .. })));
        assert!(matches!(parse(r#"{"title": "A"}"#), Err(Error::NotAnArray { .. })));
        assert!(matches!(
            parse(r#"[{"title": "A", "url": "/a"}, 3]"#),
            Err(Error::InvalidArticle { index: 1, .. })
        ));
        assert!(matches!(
            parse(r#"[{"title": "A"}]"#),
            Err(Error::InvalidArticle { index: 0, .. })
        ));
        assert!(matches!(
            parse(r#"[{"title": "A", "url": "/a", "tags": [1, 2]}]"#),
            Err(Error::InvalidArticle { index: 0, .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = Corpus::load(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn test_attach_preserves_other_fields_and_order() {
        let mut corpus = parse(
            r#"[
                {"url": "/a", "date": "2024-01-01", "title": "A", "relatedArticles": [], "extra": {"k": 1}},
                {"title": "B", "url": "/b"}
            ]"#,
        )
        .unwrap();

        corpus
            .attach_related(vec![
                vec![RelatedArticle {
                    title: "B".to_string(),
                    url: "/b".to_string(),
                }],
                vec![],
            ])
            .unwrap();

        let first: Vec<&str> = corpus.records[0].keys().map(String::as_str).collect();
        assert_eq!(first, vec!["url", "date", "title", "relatedArticles", "extra"]);
        assert_eq!(corpus.records[0]["extra"]["k"], 1);
        assert_eq!(corpus.records[0][RELATED_FIELD][0]["url"], "/b");

        // New field goes last
        let second: Vec<&str> = corpus.records[1].keys().map(String::as_str).collect();
        assert_eq!(second, vec!["title", "url", "relatedArticles"]);
        assert_eq!(corpus.records[1][RELATED_FIELD], serde_json::json!([]));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("articles.json");
        fs::write(&path, r#"[{"title": "A", "url": "/a"}, {"title": "B", "url": "/b"}]"#).unwrap();

        let mut corpus = Corpus::load(&path).unwrap();
        corpus
            .attach_related(vec![
                vec![RelatedArticle {
                    title: "B".to_string(),
                    url: "/b".to_string(),
                }],
                vec![RelatedArticle {
                    title: "A".to_string(),
                    url: "/a".to_string(),
                }],
            ])
            .unwrap();
        corpus.save(&path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("[\n  {\n    \"title\": \"A\""));

        let reloaded: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(reloaded[0][RELATED_FIELD][0]["title"], "B");
        assert_eq!(reloaded[1][RELATED_FIELD][0]["url"], "/a");

        // No stray temp files left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_position_of_matches_url_then_title() {
        let corpus = parse(
            r#"[
                {"title": "/b", "url": "/a"},
                {"title": "B", "url": "/b"}
            ]"#,
        )
        .unwrap();
        assert_eq!(corpus.position_of("/b"), Some(1));
        assert_eq!(corpus.position_of("B"), Some(1));
        assert_eq!(corpus.position_of("/a"), Some(0));
        assert_eq!(corpus.position_of("nope"), None);
    }
}
