mod config;
mod corpus;
mod error;
mod related;
mod similarity;
mod tfidf;
mod tokenize;

use clap::{Parser, Subcommand};
use colored::Colorize;
use config::{Config, DEFAULT_CONFIG};
use corpus::Corpus;
use error::{Error, Result};
use related::{rank_candidates, related_articles};
use serde::Serialize;
use similarity::Signal;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tfidf::CorpusStats;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// relatr - Fast related-article linker for static article corpora
#[derive(Parser)]
#[command(name = "relatr")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode - debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Recompute relatedArticles for every article and write the corpus back
    Update {
        /// Corpus JSON file (defaults to the configured corpus)
        corpus: Option<PathBuf>,

        /// Related articles to keep per article (zero or negative keeps none)
        #[arg(short = 'n', long, allow_negative_numbers = true)]
        top_n: Option<i64>,

        /// Write to this file instead of rewriting the corpus in place
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Compute everything but write nothing
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the ranked peers of one article
    Similar {
        /// Article url or title
        article: String,

        /// Corpus JSON file (defaults to the configured corpus)
        corpus: Option<PathBuf>,

        /// Maximum results to show (zero or negative shows none)
        #[arg(short = 'n', long, allow_negative_numbers = true)]
        limit: Option<i64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show corpus statistics
    Stats {
        /// Corpus JSON file (defaults to the configured corpus)
        corpus: Option<PathBuf>,

        /// Show top N terms by document frequency
        #[arg(long, default_value = "20")]
        top_terms: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let result = Config::load(&cli.config).and_then(|config| match cli.command {
        Commands::Update { corpus, top_n, output, dry_run } => cmd_update(
            &config.corpus_path(corpus.as_deref()),
            config.top_n(top_n),
            output.as_deref(),
            dry_run,
            cli.quiet,
        ),
        Commands::Similar { article, corpus, limit, json } => cmd_similar(
            &article,
            &config.corpus_path(corpus.as_deref()),
            config.top_n(limit),
            json,
        ),
        Commands::Stats { corpus, top_terms, json } => {
            cmd_stats(&config.corpus_path(corpus.as_deref()), top_terms, json)
        }
    });

    if let Err(e) = result {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(quiet: bool, verbose: bool) {
    let default = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_update(
    corpus_path: &Path,
    top_n: usize,
    output: Option<&Path>,
    dry_run: bool,
    quiet: bool,
) -> Result<()> {
    let start = Instant::now();

    // Nothing is computed until the whole corpus has loaded and validated
    let mut corpus = Corpus::load(corpus_path)?;
    if corpus.is_empty() {
        warn!(path = %corpus_path.display(), "corpus has no articles");
    }

    let stats = CorpusStats::build(corpus.articles());
    let related = related_articles(corpus.articles(), &stats, top_n);
    let links: usize = related.iter().map(Vec::len).sum();
    corpus.attach_related(related)?;

    let target = output.unwrap_or(corpus.path());
    if dry_run {
        info!(path = %target.display(), "dry run, corpus not written");
    } else {
        corpus.save(target)?;
    }

    let elapsed = start.elapsed();

    if !quiet {
        println!();
        println!("{}", "Related Articles".green().bold());
        println!("  Articles:         {}", corpus.len().to_string().cyan());
        println!("  Vocabulary:       {}", stats.vocabulary_size().to_string().cyan());
        println!("  Links per entry:  {}", top_n.min(corpus.len().saturating_sub(1)).to_string().cyan());
        println!("  Links written:    {}", links.to_string().cyan());
        println!("  Time elapsed:     {:.2?}", elapsed);
        println!();
        if dry_run {
            println!("{}", "Dry run - nothing written".yellow());
        } else {
            println!("{} {}", "Corpus written to".green(), target.display().to_string().cyan());
        }
    }

    Ok(())
}

#[derive(Serialize, Debug)]
struct SimilarEntry<'a> {
    title: &'a str,
    url: &'a str,
    score: f64,
    signal: Signal,
}

fn cmd_similar(article: &str, corpus_path: &Path, limit: usize, json: bool) -> Result<()> {
    let corpus = Corpus::load(corpus_path)?;
    let target = corpus
        .position_of(article)
        .ok_or_else(|| Error::ArticleNotFound(article.to_string()))?;

    let articles = corpus.articles();
    let stats = CorpusStats::build(articles);

    let mut candidates = rank_candidates(articles, &stats, target);
    candidates.truncate(limit);

    let entries: Vec<SimilarEntry> = candidates
        .iter()
        .map(|c| SimilarEntry {
            title: &articles[c.position].title,
            url: &articles[c.position].url,
            score: c.similarity.score,
            signal: c.similarity.signal,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", "No other articles in corpus.".yellow());
        return Ok(());
    }

    println!("Articles related to: {}\n", articles[target].title.cyan());
    println!("{:>6} {:>5}  {}", "Score", "Via", "Article");
    println!("{}", "-".repeat(60));

    for entry in entries {
        let via = match entry.signal {
            Signal::Tags => "tags".green(),
            Signal::Text => "text".yellow(),
        };
        println!("{:>5}% {:>5}  {} {}",
            ((entry.score * 100.0) as u32).to_string().green(),
            via,
            entry.title,
            entry.url.dimmed()
        );
    }

    Ok(())
}

#[derive(Serialize, Debug)]
struct CorpusSummary<'a> {
    articles: usize,
    empty_snippets: usize,
    tagged: usize,
    vocabulary: usize,
    top_terms: Vec<(&'a str, usize)>,
}

fn cmd_stats(corpus_path: &Path, top_terms: usize, json: bool) -> Result<()> {
    let corpus = Corpus::load(corpus_path)?;
    let articles = corpus.articles();
    let stats = CorpusStats::build(articles);

    let summary = CorpusSummary {
        articles: stats.doc_count(),
        empty_snippets: (0..articles.len()).filter(|&i| stats.doc_length(i) == 0).count(),
        tagged: articles.iter().filter(|a| !a.tags().is_empty()).count(),
        vocabulary: stats.vocabulary_size(),
        top_terms: stats.top_terms(top_terms),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", "Corpus Statistics".green().bold());
    println!("  Articles:           {}", summary.articles.to_string().cyan());
    println!("  Without text:       {}", summary.empty_snippets.to_string().cyan());
    println!("  With tags:          {}", summary.tagged.to_string().cyan());
    println!("  Unique terms:       {}", summary.vocabulary.to_string().cyan());

    if !summary.top_terms.is_empty() {
        println!();
        println!("{}", "Top terms by document frequency".green().bold());
        for (term, df) in &summary.top_terms {
            println!("  {:>5}  {}", df.to_string().cyan(), term);
        }
    }

    Ok(())
}
