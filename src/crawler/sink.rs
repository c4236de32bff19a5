use log2::{debug, info, warn};

use super::page::Page;
use super::tree::CrawlNode;

pub const NO_MATCHES_MESSAGE: &str = "No matches for the keywords entered found";

/// Receives crawl events as they happen.
///
/// All methods default to doing nothing.
pub trait CrawlSink: Send + Sync {
    /// A page linked straight from the seed was fetched
    fn on_valid_page(&self, _node: &CrawlNode) {}

    /// A linked page could not be fetched
    fn on_invalid_page(&self, _page: &Page) {}

    fn on_search_match(&self, _node: &CrawlNode) {}

    fn on_no_matches(&self, _message: &str) {}

    /// `node` sits at the depth limit with links that will not be followed
    fn on_depth_exhausted(&self, _node: &CrawlNode) {}
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl CrawlSink for NullSink {}

/// Writes every event to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl CrawlSink for LogSink {
    fn on_valid_page(&self, node: &CrawlNode) {
        info!("Found {} ({})", node.url(), node.page().title());
    }

    fn on_invalid_page(&self, page: &Page) {
        match page.error() {
            Some(e) => warn!("Unreachable {}: {}", page.url(), e),
            None => warn!("Unreachable {}", page.url()),
        }
    }

    fn on_search_match(&self, node: &CrawlNode) {
        info!("Match at depth {}: {} ({})", node.depth(), node.url(), node.page().title());
    }

    fn on_no_matches(&self, message: &str) {
        warn!("{}", message);
    }

    fn on_depth_exhausted(&self, node: &CrawlNode) {
        debug!("Max depth reached at {}", node.url());
    }
}
