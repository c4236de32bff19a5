use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

use crate::crawler::{
    CrawlerConfig, CrawlerConfigRef, HtmlParser, NoMatchPolicy, PageParser, RegexParser,
};

/// Log levels as defined in log2 crate
#[derive(Debug, Serialize, Deserialize, Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Which page parser extracts links and titles
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ParserKind {
    /// Pattern scan over the raw text
    Regex,
    /// Full HTML parse
    Html,
}

impl ParserKind {
    pub fn build(self) -> Arc<dyn PageParser> {
        match self {
            ParserKind::Regex => Arc::new(RegexParser),
            ParserKind::Html => Arc::new(HtmlParser),
        }
    }
}

/// When search mode reports that nothing matched
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NoMatchArg {
    /// Each branch that hits the depth limit with no match so far
    PerBranch,
    /// Once, after the whole search
    OnceAtEnd,
}

impl From<NoMatchArg> for NoMatchPolicy {
    fn from(arg: NoMatchArg) -> Self {
        match arg {
            NoMatchArg::PerBranch => NoMatchPolicy::PerBranch,
            NoMatchArg::OnceAtEnd => NoMatchPolicy::OnceAtEnd,
        }
    }
}

/// This struct is supposed to receive all program arguments while CrawlerConfig
/// describes only the crawler
#[derive(Parser, Debug, Serialize, Deserialize)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Seed URL
    #[arg(short, long)]
    pub start_url: String,
    /// Maximum depth to crawl, the seed is depth 1
    #[arg(long, default_value = "5")]
    pub max_depth: usize,
    /// Keyword regex to search for, can be repeated. Without one the crawler just builds the tree
    #[arg(short, long = "keyword")]
    pub keywords: Vec<String>,
    /// Extra request header as `Name: Value`, can be repeated
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,
    /// User-Agent sent with every request
    #[arg(long, default_value = "Mozilla/5.0")]
    pub user_agent: String,
    /// Per-request timeout in seconds
    #[arg(long, default_value = "10")]
    pub request_timeout: u64,
    /// Delay between requests in milliseconds
    #[arg(short, long, default_value = "0")]
    pub request_delay: u64,
    /// Page parser
    #[arg(long, default_value = "regex", value_enum)]
    pub parser: ParserKind,
    /// When to report that a search found nothing
    #[arg(long, default_value = "per-branch", value_enum)]
    pub no_match: NoMatchArg,
    /// Also list the files linked from every page
    #[arg(long)]
    pub show_files: bool,
    /// Output file for the JSON tree
    #[arg(short, long)]
    pub output_file: Option<PathBuf>,
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", value_enum)]
    pub log_level: LogLevel,
}

impl Config {
    pub fn new() -> Self {
        Self::parse()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_depth == 0 {
            anyhow::bail!("max_depth must be greater than 0");
        }
        if self.request_timeout == 0 {
            anyhow::bail!("request_timeout must be greater than 0");
        }
        let start = Url::parse(&self.start_url)?;
        if !matches!(start.scheme(), "http" | "https") {
            anyhow::bail!("start_url must be an http(s) URL, got {}", self.start_url);
        }
        for header in &self.headers {
            parse_header(header)?;
        }
        Ok(())
    }

    pub fn search_mode(&self) -> bool {
        !self.keywords.is_empty()
    }

    pub fn crawler_config(&self) -> anyhow::Result<CrawlerConfigRef> {
        let mut config = CrawlerConfig::new()
            .with_max_depth(self.max_depth)
            .with_request_timeout(self.request_timeout)
            .with_request_delay(self.request_delay)
            .with_no_match_policy(self.no_match.into())
            .with_header("User-Agent", self.user_agent.as_str());

        for header in &self.headers {
            let (name, value) = parse_header(header)?;
            config = config.with_header(name, value);
        }
        Ok(Arc::new(config))
    }
}

/// Splits `Name: Value` into its trimmed parts
pub fn parse_header(raw: &str) -> anyhow::Result<(String, String)> {
    let Some((name, value)) = raw.split_once(':') else {
        anyhow::bail!("header {:?} must look like `Name: Value`", raw);
    };
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        anyhow::bail!("header {:?} has an invalid name", raw);
    }
    Ok((name.to_string(), value.trim().to_string()))
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        write!(f, "{}", s)
    }
}
