use std::collections::HashMap;
use std::sync::Arc;

use log2::debug;
use url::Url;

use super::error::FetchError;
use super::fetch::Fetcher;
use super::parser::PageParser;

/// Shown when a page has no usable title
pub const UNKNOWN_TITLE: &str = "Unknown";

/// Extensions that still count as pages when they end a path
const HTML_EXTENSIONS: [&str; 4] = ["html", "htm", "xhtml", "shtml"];

/// One fetch attempt, successful or not.
///
/// Links, files and title are derived from the content on every call.
/// A failed page has empty content, so all three views come back empty
/// (or as [`UNKNOWN_TITLE`]).
#[derive(Debug, Clone)]
pub struct Page {
    url: String,
    origin: String,
    content: String,
    error: Option<FetchError>,
    parser: Arc<dyn PageParser>,
}

impl Page {
    /// Fetches `url` through `fetcher`. Never fails: errors end up on the page.
    pub async fn fetch(
        fetcher: &dyn Fetcher,
        parser: Arc<dyn PageParser>,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Page {
        let (parsed, origin) = match parse_origin(url) {
            Ok(parsed) => parsed,
            Err(e) => return Page::failed(url, e, parser),
        };

        debug!("Fetching {}", url);
        let body = fetcher
            .fetch(&parsed, headers)
            .await
            .and_then(|bytes| String::from_utf8(bytes).map_err(|_| FetchError::Decode));

        match body {
            Ok(content) => Page {
                url: url.to_string(),
                origin,
                content,
                error: None,
                parser,
            },
            Err(e) => {
                debug!("Failed to fetch {}: {}", url, e);
                Page {
                    url: url.to_string(),
                    origin,
                    content: String::new(),
                    error: Some(e),
                    parser,
                }
            }
        }
    }

    /// Builds a valid page from content that was obtained elsewhere
    #[cfg(test)]
    pub(crate) fn from_content(
        url: &str,
        content: impl Into<String>,
        parser: Arc<dyn PageParser>,
    ) -> Result<Page, FetchError> {
        let (_, origin) = parse_origin(url)?;
        Ok(Page {
            url: url.to_string(),
            origin,
            content: content.into(),
            error: None,
            parser,
        })
    }

    pub fn failed(url: &str, error: FetchError, parser: Arc<dyn PageParser>) -> Page {
        let origin = parse_origin(url).map(|(_, origin)| origin).unwrap_or_default();
        Page {
            url: url.to_string(),
            origin,
            content: String::new(),
            error: Some(error),
            parser,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Scheme and host (with a non-default port), no trailing slash
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    pub fn title(&self) -> String {
        self.parser
            .title(&self.content)
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string())
    }

    /// Absolute URLs of the pages this one points to, in content order
    pub fn links(&self) -> Vec<String> {
        self.resolved(|candidate| !is_file(candidate))
    }

    /// Absolute URLs of the non-HTML files this page points to
    pub fn files(&self) -> Vec<String> {
        self.resolved(is_file)
    }

    fn resolved(&self, keep: impl Fn(&str) -> bool) -> Vec<String> {
        if !self.is_valid() {
            return Vec::new();
        }
        self.parser
            .candidates(&self.content)
            .iter()
            .filter(|candidate| keep(candidate.as_str()))
            .filter_map(|candidate| resolve(&self.origin, candidate))
            .collect()
    }
}

/// Parses `url` and returns it with its origin, e.g. `http://host:8080`
fn parse_origin(url: &str) -> Result<(Url, String), FetchError> {
    let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") || parsed.host().is_none() {
        return Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme {}", parsed.scheme()),
        });
    }

    let origin = parsed.origin().ascii_serialization();
    Ok((parsed, origin))
}

/// Makes `candidate` absolute against `origin`.
///
/// Candidates already under the origin are kept as they are. Anything else
/// with a scheme (another host, `mailto:`, `//cdn...`) is dropped. The rest
/// loses one leading `/` and is joined to the origin with a single `/`.
/// The result is in [`canonical`] form.
pub fn resolve(origin: &str, candidate: &str) -> Option<String> {
    let candidate = strip_fragment(candidate);

    if let Some(rest) = candidate.strip_prefix(origin) {
        if rest.is_empty() || rest.starts_with('/') || rest.starts_with('?') {
            return Some(canonical(candidate));
        }
    }

    if candidate.starts_with("//") || has_scheme(candidate) {
        return None;
    }

    let path = candidate.strip_prefix('/').unwrap_or(candidate);
    Some(canonical(&format!("{}/{}", origin, path)))
}

/// The one spelling of `url` that gets fingerprinted and stored.
///
/// No fragment, and an empty path becomes `/`, so `http://h`, `http://h/`
/// and `http://h/#top` are all `http://h/`. Unparsable input only loses its
/// fragment.
pub fn canonical(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => strip_fragment(url).to_string(),
    }
}

fn strip_fragment(url: &str) -> &str {
    url.split('#').next().unwrap_or_default()
}

fn has_scheme(candidate: &str) -> bool {
    let Some((scheme, _)) = candidate.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// True when the path ends in `/name.ext` and `ext` isn't an HTML flavour.
/// Query strings and fragments are ignored, so are extensionless paths.
pub fn is_file(candidate: &str) -> bool {
    let path = path_of(candidate);
    let Some((_, last)) = path.rsplit_once('/') else {
        return false;
    };
    let Some((stem, extension)) = last.rsplit_once('.') else {
        return false;
    };
    if stem.is_empty() || extension.is_empty() {
        return false;
    }

    !HTML_EXTENSIONS
        .iter()
        .any(|html| extension.eq_ignore_ascii_case(html))
}

/// Path portion of a candidate, without scheme, host, query or fragment
fn path_of(candidate: &str) -> &str {
    let end = candidate.find(['?', '#']).unwrap_or(candidate.len());
    let candidate = &candidate[..end];

    let after_host = match candidate.find("://") {
        Some(idx) => &candidate[idx + 3..],
        None => match candidate.strip_prefix("//") {
            Some(rest) => rest,
            None => return candidate,
        },
    };
    after_host.find('/').map_or("", |idx| &after_host[idx..])
}
