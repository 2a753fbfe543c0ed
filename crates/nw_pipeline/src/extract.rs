use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::fetch::Fetch;
use crate::outcome::SkipReason;

/// Batch crawl acceptance thresholds.
pub const MIN_LINK_LEN: usize = 50;
pub const MIN_TITLE_WORDS: usize = 5;
pub const MIN_CONTENT_LEN: usize = 1000;

/// Single-URL fast path threshold.
pub const FAST_PATH_MIN_CONTENT_LEN: usize = 300;

pub const FALLBACK_TITLE: &str = "No Title Extracted";

/// Clean text pulled out of one page: the first heading and the
/// narrative blocks in document order.
#[derive(Debug, Clone)]
pub struct Extracted {
    pub url: String,
    pub title: String,
    pub content: String,
}

/// Fetches and segments one page. `None` means extraction failed; the
/// error never propagates past this boundary.
pub async fn extract_article(fetcher: &dyn Fetch, url: &str) -> Option<Extracted> {
    debug!("Extracting content from {}", url);
    let html = match fetcher.fetch(url).await {
        Ok(html) => html,
        Err(e) => {
            warn!("Failed to fetch {}: {}", url, e);
            return None;
        }
    };

    let (title, content) = parse_content(&html);
    Some(Extracted {
        url: url.to_string(),
        title,
        content,
    })
}

/// Title is the first heading-like element (falling back to the document
/// title); content is every paragraph in document order, boilerplate-free
/// paragraphs dropped by emptiness.
fn parse_content(html: &str) -> (String, String) {
    let document = Html::parse_document(html);

    let title = ["h1", "h2", "title"]
        .iter()
        .filter_map(|tag| Selector::parse(tag).ok())
        .find_map(|selector| {
            document
                .select(&selector)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .filter(|t| !t.is_empty())
        })
        .unwrap_or_default();

    let content = match Selector::parse("p") {
        Ok(selector) => document
            .select(&selector)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|block| !block.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        Err(_) => String::new(),
    };

    (title, content.trim().to_string())
}

/// Batch/profile crawl filter: ≥5 title words and ≥1000 content chars.
pub fn batch_filter(extracted: &Extracted) -> Result<(), SkipReason> {
    if extracted.title.is_empty() {
        return Err(SkipReason::MissingTitle);
    }
    if extracted.content.is_empty() {
        return Err(SkipReason::MissingContent);
    }
    if extracted.title.split_whitespace().count() < MIN_TITLE_WORDS {
        return Err(SkipReason::TitleTooShort);
    }
    if extracted.content.len() < MIN_CONTENT_LEN {
        return Err(SkipReason::ContentTooShort);
    }
    Ok(())
}

/// Fast path filter: both fields non-empty and ≥300 content chars. An
/// empty title is replaced by a placeholder rather than rejected.
pub fn fast_path_filter(extracted: &mut Extracted) -> Result<(), SkipReason> {
    if extracted.content.is_empty() {
        return Err(SkipReason::MissingContent);
    }
    if extracted.title.is_empty() {
        extracted.title = FALLBACK_TITLE.to_string();
    }
    if extracted.content.len() < FAST_PATH_MIN_CONTENT_LEN {
        return Err(SkipReason::ContentTooShort);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extracted(title: &str, content: &str) -> Extracted {
        Extracted {
            url: "http://news.example.com/story".to_string(),
            title: title.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_parse_content_takes_first_heading() {
        let html = r#"
            <html><head><title>Site name</title></head><body>
            <h1>The real headline of the story</h1>
            <h1>A second heading</h1>
            <p>First paragraph.</p>
            <p>   </p>
            <p>Second paragraph.</p>
            </body></html>
        "#;
        let (title, content) = parse_content(html);
        assert_eq!(title, "The real headline of the story");
        assert_eq!(content, "First paragraph.\nSecond paragraph.");
    }

    #[test]
    fn test_parse_content_falls_back_to_document_title() {
        let html = "<html><head><title>Only title</title></head><body><p>Text.</p></body></html>";
        let (title, content) = parse_content(html);
        assert_eq!(title, "Only title");
        assert_eq!(content, "Text.");
    }

    #[test]
    fn test_batch_filter_boundaries() {
        let title = "Five words are needed here";
        assert_eq!(
            batch_filter(&extracted(title, &"x".repeat(999))),
            Err(SkipReason::ContentTooShort)
        );
        assert_eq!(batch_filter(&extracted(title, &"x".repeat(1000))), Ok(()));
    }

    #[test]
    fn test_batch_filter_title_words() {
        let content = "x".repeat(1000);
        assert_eq!(
            batch_filter(&extracted("Only four words here", &content)),
            Err(SkipReason::TitleTooShort)
        );
        assert_eq!(
            batch_filter(&extracted("", &content)),
            Err(SkipReason::MissingTitle)
        );
        assert_eq!(
            batch_filter(&extracted("Exactly five words right here", &content)),
            Ok(())
        );
    }

    #[test]
    fn test_fast_path_filter() {
        let mut ok = extracted("t", &"x".repeat(300));
        assert_eq!(fast_path_filter(&mut ok), Ok(()));

        let mut short = extracted("t", &"x".repeat(299));
        assert_eq!(fast_path_filter(&mut short), Err(SkipReason::ContentTooShort));

        let mut untitled = extracted("", &"x".repeat(300));
        assert_eq!(fast_path_filter(&mut untitled), Ok(()));
        assert_eq!(untitled.title, FALLBACK_TITLE);

        let mut empty = extracted("t", "");
        assert_eq!(fast_path_filter(&mut empty), Err(SkipReason::MissingContent));
    }
}
