use std::fmt;

use log2::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

/// Turns raw page text into URL candidates and a title.
///
/// Candidates are returned in content order, untouched: resolving them
/// against the page origin and sorting files from pages is done by
/// [`Page`](super::Page).
pub trait PageParser: Send + Sync + fmt::Debug {
    fn candidates(&self, content: &str) -> Vec<String>;

    fn title(&self, content: &str) -> Option<String>;
}

/// Anchor-ish attributes: `href` on a/area/link and `src` on img
static LINK_ATTR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<(?:(?:a|area|link)\b[^>]*?\shref|img\b[^>]*?\ssrc)\s*=\s*["']([^"']*)["']"#)
        .expect("link attribute pattern must compile")
});

static TITLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("title pattern must compile")
});

static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a[href], area[href], link[href], img[src]")
        .expect("link selector must parse")
});

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("title selector must parse"));

/// Drops values that can never name another resource
fn keep_candidate(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.starts_with('#') {
        return None;
    }
    Some(value.to_string())
}

/// Pattern scanner over the raw text. Works on broken markup too.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexParser;

impl PageParser for RegexParser {
    fn candidates(&self, content: &str) -> Vec<String> {
        let found: Vec<String> = LINK_ATTR_REGEX
            .captures_iter(content)
            .filter_map(|caps| caps.get(1))
            .filter_map(|m| keep_candidate(m.as_str()))
            .collect();

        debug!("Regex parser found {} candidates", found.len());
        found
    }

    fn title(&self, content: &str) -> Option<String> {
        TITLE_REGEX
            .captures(content)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|title| !title.is_empty())
    }
}

/// Full DOM parse via `scraper`
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlParser;

impl PageParser for HtmlParser {
    fn candidates(&self, content: &str) -> Vec<String> {
        let document = Html::parse_document(content);
        let found: Vec<String> = document
            .select(&LINK_SELECTOR)
            .filter_map(|element| {
                let attrs = element.value();
                attrs.attr("href").or_else(|| attrs.attr("src"))
            })
            .filter_map(keep_candidate)
            .collect();

        debug!("HTML parser found {} candidates", found.len());
        found
    }

    fn title(&self, content: &str) -> Option<String> {
        let document = Html::parse_document(content);
        document
            .select(&TITLE_SELECTOR)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|title| !title.is_empty())
    }
}
