//! Command-line interface definitions for Book News.
//!
//! All arguments can be provided via command-line flags or environment
//! variables. Flags that tune the crawl override the YAML config file.

use clap::Parser;

/// Command-line arguments for the Book News crawler.
///
/// # Examples
///
/// ```sh
/// # Write to the default public/data.json
/// book_news
///
/// # Custom output and config file
/// book_news -o ./site/data.json -c ./book_news.yaml
///
/// # Quick run without politeness delays
/// book_news --article-delay-ms 0 --source-delay-ms 0
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path of the JSON file to write (overwritten on every run)
    #[arg(short, long, env = "BOOK_NEWS_OUTPUT", default_value = "public/data.json")]
    pub output: String,

    /// Optional path to a YAML config file
    #[arg(short, long, env = "BOOK_NEWS_CONFIG")]
    pub config: Option<String>,

    /// Maximum number of articles kept per source
    #[arg(long)]
    pub max_per_source: Option<usize>,

    /// How many days back an entry may be dated and still be considered
    #[arg(long)]
    pub recency_days: Option<i64>,

    /// Pause after each accepted article, in milliseconds
    #[arg(long)]
    pub article_delay_ms: Option<u64>,

    /// Pause after each source, in milliseconds
    #[arg(long)]
    pub source_delay_ms: Option<u64>,
}
