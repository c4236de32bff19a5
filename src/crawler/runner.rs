use std::collections::BTreeSet;
use std::sync::Arc;

use log2::*;
use regex::Regex;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;

use super::config::{CrawlerConfigRef, NoMatchPolicy};
use super::error::{CrawlError, FetchError};
use super::fetch::{Fetcher, HttpFetcher};
use super::page::{canonical, Page};
use super::parser::{PageParser, RegexParser};
use super::sink::{CrawlSink, LogSink, NO_MATCHES_MESSAGE};
use super::state::RunState;
use super::tree::{CrawlNode, CrawlTree, NodeId};

enum Mode {
    Traverse,
    Search(Vec<Regex>),
}

/// A node whose links are still being walked
struct Frame {
    node: NodeId,
    links: std::vec::IntoIter<String>,
}

/// Outcome of [`CrawlEngine::start_search`]
#[derive(Debug, Clone)]
pub struct SearchResult {
    tree: CrawlTree,
    matches: BTreeSet<NodeId>,
}

impl SearchResult {
    /// Every page the search walked through
    pub fn tree(&self) -> &CrawlTree {
        &self.tree
    }

    /// Matching nodes in discovery order
    pub fn matches(&self) -> impl Iterator<Item = &CrawlNode> {
        self.matches.iter().filter_map(|id| self.tree.get(*id))
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn into_tree(self) -> CrawlTree {
        self.tree
    }
}

/// Depth-first crawler over a single seed.
///
/// Each `start_*` call is one run with fresh visited/match state. Runs take
/// `&mut self`, so an engine never serves two runs at once.
pub struct CrawlEngine {
    config: CrawlerConfigRef,
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<dyn PageParser>,
    sink: Arc<dyn CrawlSink>,
    cancel: CancellationToken,
    state: RunState,
}

impl CrawlEngine {
    /// HTTP fetching, regex parsing and log output by default
    pub fn new(config: CrawlerConfigRef) -> Self {
        let timeout = Duration::from_secs(config.request_timeout_sec);
        Self {
            config,
            fetcher: Arc::new(HttpFetcher::new(timeout)),
            parser: Arc::new(RegexParser),
            sink: Arc::new(LogSink),
            cancel: CancellationToken::new(),
            state: RunState::new(),
        }
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_parser(mut self, parser: Arc<dyn PageParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn CrawlSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Cancelling the token stops the run after the in-flight fetch is dropped
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// State of the last run
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Builds the tree of pages reachable from `seed_url`
    pub async fn start_traversal(&mut self, seed_url: &str) -> Result<CrawlTree, CrawlError> {
        self.state.reset();
        let tree = self.load_seed(seed_url).await?;
        let tree = self.explore(tree, &Mode::Traverse).await;

        info!("Traversal of {} done: {} pages, {} fetches", seed_url, tree.len(), self.state.fetch_count);
        Ok(tree)
    }

    /// Walks the same tree as [`start_traversal`](Self::start_traversal) and
    /// collects every page whose content matches one of the `keywords` regexes
    pub async fn start_search<S: AsRef<str>>(
        &mut self,
        seed_url: &str,
        keywords: &[S],
    ) -> Result<SearchResult, CrawlError> {
        self.state.reset();
        let patterns = keywords
            .iter()
            .map(|keyword| Regex::new(keyword.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let tree = self.load_seed(seed_url).await?;
        let tree = self.explore(tree, &Mode::Search(patterns)).await;

        if self.config.no_match_policy == NoMatchPolicy::OnceAtEnd
            && self.state.matches.is_empty()
            && !tree.is_interrupted()
        {
            self.sink.on_no_matches(NO_MATCHES_MESSAGE);
        }

        info!("Search from {} done: {} matches in {} pages", seed_url, self.state.matches.len(), tree.len());
        Ok(SearchResult {
            tree,
            matches: self.state.matches.clone(),
        })
    }

    async fn load_seed(&mut self, seed_url: &str) -> Result<CrawlTree, CrawlError> {
        let url = canonical(seed_url);
        self.state.visited.try_mark(&url);
        let page = self.fetch(&url).await;

        if let Some(e) = page.error() {
            error!("Seed {} failed: {}", url, e);
            return Err(CrawlError::RootUnreachable {
                url,
                source: e.clone(),
            });
        }
        if page.links().is_empty() {
            return Err(CrawlError::NoSubresourcesFound { url });
        }

        Ok(CrawlTree::new(page))
    }

    async fn fetch(&mut self, url: &str) -> Page {
        let parser = Arc::clone(&self.parser);

        if self.state.fetch_count > 0 && self.config.request_delay_ms > 0 {
            tokio::select! {
                _ = self.cancel.cancelled() => {}
                _ = sleep(Duration::from_millis(self.config.request_delay_ms)) => {}
            }
        }
        self.state.fetch_count += 1;

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Page::failed(url, FetchError::Cancelled, parser),
            page = Page::fetch(self.fetcher.as_ref(), Arc::clone(&parser), url, &self.config.headers) => page,
        }
    }

    async fn explore(&mut self, mut tree: CrawlTree, mode: &Mode) -> CrawlTree {
        let mut stack: Vec<Frame> = Vec::new();
        if let Some(frame) = self.enter(&tree, NodeId::ROOT, mode) {
            stack.push(frame);
        }

        loop {
            if self.cancel.is_cancelled() {
                warn!("Crawl cancelled with {} pages loaded", tree.len());
                tree.mark_interrupted();
                break;
            }

            let Some(frame) = stack.last_mut() else {
                break;
            };
            let parent = frame.node;
            let Some(link) = frame.links.next() else {
                stack.pop();
                continue;
            };

            if !self.state.visited.try_mark(&link) {
                debug!("Already visited {}", link);
                continue;
            }

            let page = self.fetch(&link).await;
            if page.error() == Some(&FetchError::Cancelled) {
                continue;
            }
            if !page.is_valid() {
                self.sink.on_invalid_page(&page);
                continue;
            }

            let child = tree.add_child(parent, page);
            info!("Depth {}: {}", tree[child].depth(), link);

            if matches!(mode, Mode::Traverse) && tree[parent].depth() == 1 {
                self.sink.on_valid_page(&tree[child]);
            }
            if let Some(frame) = self.enter(&tree, child, mode) {
                stack.push(frame);
            }
        }

        tree
    }

    /// Runs the per-node checks and returns a frame if the node gets expanded
    fn enter(&mut self, tree: &CrawlTree, id: NodeId, mode: &Mode) -> Option<Frame> {
        let node = &tree[id];

        if let Mode::Search(patterns) = mode {
            if patterns.iter().any(|pattern| pattern.is_match(node.page().content())) {
                self.state.matches.insert(id);
                self.sink.on_search_match(node);
            }
        }

        if node.depth() >= self.config.max_depth {
            // only branches that actually lose an unvisited link are reported
            let truncated = node
                .page()
                .links()
                .iter()
                .any(|link| !self.state.visited.contains(link));
            if truncated {
                self.sink.on_depth_exhausted(node);
                if matches!(mode, Mode::Search(_))
                    && self.config.no_match_policy == NoMatchPolicy::PerBranch
                    && self.state.matches.is_empty()
                {
                    self.sink.on_no_matches(NO_MATCHES_MESSAGE);
                }
            }
            return None;
        }

        Some(Frame {
            node: id,
            links: node.page().links().into_iter(),
        })
    }
}
