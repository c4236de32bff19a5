pub mod config;
pub mod error;
pub mod fetch;
pub mod page;
pub mod parser;
pub mod runner;
pub mod sink;
pub mod state;
pub mod tree;


pub use config::{CrawlerConfig, CrawlerConfigRef, NoMatchPolicy, LINK_REQUEST_TIMEOUT_SEC};
pub use error::{CrawlError, FetchError};
pub use fetch::{Fetcher, HttpFetcher};
pub use page::{canonical, is_file, resolve, Page, UNKNOWN_TITLE};
pub use parser::{HtmlParser, PageParser, RegexParser};
pub use runner::{CrawlEngine, SearchResult};
pub use sink::{CrawlSink, LogSink, NullSink, NO_MATCHES_MESSAGE};
pub use state::{Fingerprint, RunState, VisitedRegistry};
pub use tree::{CrawlNode, CrawlTree, NodeId, TreeReport};
