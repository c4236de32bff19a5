use std::collections::HashMap;
use std::sync::Arc;

/// Default timeout for link requests in seconds
pub const LINK_REQUEST_TIMEOUT_SEC: u64 = 10;

/// Default recursion limit, the seed page sits at depth 1
pub const DEFAULT_MAX_DEPTH: usize = 10;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// When a search run tells the sink that nothing matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoMatchPolicy {
    /// Every branch that stops on the depth limit checks the match set
    /// and notifies if it is still empty. Can fire several times, and before
    /// a later branch finds a match.
    #[default]
    PerBranch,
    /// A single notice after the whole run, only if nothing matched
    OnceAtEnd,
}

/// Configuration for the crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub max_depth: usize,
    /// Request headers sent with every fetch
    pub headers: HashMap<String, String>,
    pub request_timeout_sec: u64,
    pub request_delay_ms: u64,
    pub no_match_policy: NoMatchPolicy,
}

impl CrawlerConfig {
    pub fn new() -> Self {
        let mut headers = HashMap::new();
        headers.insert("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string());

        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            headers,
            request_timeout_sec: LINK_REQUEST_TIMEOUT_SEC,
            request_delay_ms: 0,
            no_match_policy: NoMatchPolicy::default(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Adds or replaces a request header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        // header names are case-insensitive, don't keep two User-Agents around
        self.headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout_sec: u64) -> Self {
        self.request_timeout_sec = timeout_sec;
        self
    }

    pub fn with_request_delay(mut self, delay_ms: u64) -> Self {
        self.request_delay_ms = delay_ms;
        self
    }

    pub fn with_no_match_policy(mut self, policy: NoMatchPolicy) -> Self {
        self.no_match_policy = policy;
        self
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub type CrawlerConfigRef = Arc<CrawlerConfig>;
