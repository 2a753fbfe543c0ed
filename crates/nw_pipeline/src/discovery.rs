use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::{debug, error};
use url::Url;

use crate::fetch::Fetch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkScope {
    Internal,
    External,
}

#[derive(Debug, Clone)]
pub struct Link {
    pub url: String,
    pub scope: LinkScope,
}

/// Fetches the seed page and returns its outbound links in document
/// order, tagged internal/external by host. A fetch failure yields an
/// empty list; there is no retry.
pub async fn discover_links(fetcher: &dyn Fetch, seed_url: &str) -> Vec<Link> {
    debug!("Discovering links from {}", seed_url);
    let html = match fetcher.fetch(seed_url).await {
        Ok(html) => html,
        Err(e) => {
            error!("Failed to fetch seed page {}: {}", seed_url, e);
            return Vec::new();
        }
    };

    let links = collect_links(&html, seed_url);
    debug!("Found {} links on {}", links.len(), seed_url);
    links
}

fn collect_links(html: &str, seed_url: &str) -> Vec<Link> {
    let base = match Url::parse(seed_url) {
        Ok(base) => base,
        Err(e) => {
            error!("Invalid seed URL {}: {}", seed_url, e);
            return Vec::new();
        }
    };

    let document = Html::parse_document(html);
    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for element in document.select(&selector) {
        let href = match element.value().attr("href") {
            Some(href) => href,
            None => continue,
        };
        let resolved = match base.join(href) {
            Ok(resolved) => resolved,
            Err(_) => continue,
        };
        if resolved.scheme() != "http" && resolved.scheme() != "https" {
            continue;
        }
        let url = resolved.to_string();
        if !seen.insert(url.clone()) {
            continue;
        }
        let scope = if resolved.host_str() == base.host_str() {
            LinkScope::Internal
        } else {
            LinkScope::External
        };
        links.push(Link { url, scope });
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = "http://news.example.com/";

    #[test]
    fn test_collect_links_tags_scope() {
        let html = r#"
            <a href="/local/story-one">one</a>
            <a href="http://other.example.org/story">two</a>
            <a href="http://news.example.com/local/story-two">three</a>
        "#;
        let links = collect_links(html, SEED);
        assert_eq!(links.len(), 3);
        assert_eq!(links[0].scope, LinkScope::Internal);
        assert_eq!(links[0].url, "http://news.example.com/local/story-one");
        assert_eq!(links[1].scope, LinkScope::External);
        assert_eq!(links[2].scope, LinkScope::Internal);
    }

    #[test]
    fn test_collect_links_dedupes_preserving_order() {
        let html = r#"
            <a href="/story-a">a</a>
            <a href="/story-b">b</a>
            <a href="/story-a">a again</a>
        "#;
        let links = collect_links(html, SEED);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].url, "http://news.example.com/story-a");
        assert_eq!(links[1].url, "http://news.example.com/story-b");
    }

    #[test]
    fn test_collect_links_skips_non_http() {
        let html = r#"
            <a href="mailto:desk@example.com">mail</a>
            <a href="javascript:void(0)">js</a>
            <a href="/story">story</a>
        "#;
        let links = collect_links(html, SEED);
        assert_eq!(links.len(), 1);
    }
}
