// 📰 Bechdel Test RSS - Newest additions to the site
// Each <item> becomes { "title", "link", "summary" }

use super::{get_checked, RawItem, SourceFetcher, SourceKind};
use crate::error::FetchError;
use regex_lite::Regex;
use serde_json::json;

pub struct BechdelFeedSource {
    client: reqwest::blocking::Client,
    url: String,
    limit: usize,
}

impl BechdelFeedSource {
    pub fn new(client: reqwest::blocking::Client, url: impl Into<String>, limit: usize) -> Self {
        BechdelFeedSource {
            client,
            url: url.into(),
            limit,
        }
    }
}

impl SourceFetcher for BechdelFeedSource {
    fn kind(&self) -> SourceKind {
        SourceKind::BechdelFeed
    }

    fn fetch(&self) -> Result<Vec<RawItem>, FetchError> {
        let body = get_checked(&self.client, &self.url)?.text()?;
        parse_feed(&body, self.limit)
    }
}

/// Extract up to `limit` items from an RSS 2.0 document
pub fn parse_feed(xml: &str, limit: usize) -> Result<Vec<RawItem>, FetchError> {
    let item_re = Regex::new(r"(?is)<item\b[^>]*>(.*?)</item>")
        .map_err(|e| FetchError::Parse(e.to_string()))?;

    let mut items = Vec::new();
    for (idx, caps) in item_re.captures_iter(xml).take(limit).enumerate() {
        let block = caps.get(1).map(|m| m.as_str()).unwrap_or("");

        let title = element_text(block, "title")?.unwrap_or_default();
        let link = element_text(block, "link")?.unwrap_or_default();
        let summary = match element_text(block, "description")? {
            Some(text) => text,
            None => element_text(block, "summary")?.unwrap_or_default(),
        };

        items.push(RawItem::new(
            SourceKind::BechdelFeed,
            json!({ "title": title, "link": link, "summary": summary }),
            idx,
        ));
    }

    tracing::debug!(count = items.len(), "Parsed feed entries");
    Ok(items)
}

/// Text content of the first `<tag>` in a block, CDATA unwrapped and entities decoded
fn element_text(block: &str, tag: &str) -> Result<Option<String>, FetchError> {
    let pattern = format!(r"(?is)<{tag}\b[^>]*>(.*?)</{tag}>", tag = tag);
    let re = Regex::new(&pattern).map_err(|e| FetchError::Parse(e.to_string()))?;

    Ok(re.captures(block).and_then(|caps| caps.get(1)).map(|m| {
        let raw = m.as_str().trim();
        let raw = raw
            .strip_prefix("<![CDATA[")
            .and_then(|s| s.strip_suffix("]]>"))
            .unwrap_or(raw);
        decode_entities(raw.trim())
    }))
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
  <title>Bechdel Test Movie List</title>
  <item>
    <title>Past Lives (2023)</title>
    <link>https://bechdeltest.com/view/11234/past_lives/</link>
    <description><![CDATA[<a href="https://www.imdb.com/title/tt13238346/">IMDb</a> passes &amp; more]]></description>
  </item>
  <item>
    <title>Barbie (2023)</title>
    <link>https://www.imdb.com/title/tt1517268/</link>
    <description>Two women talk</description>
  </item>
  <item>
    <title>Third (2020)</title>
    <link>https://bechdeltest.com/view/3/</link>
  </item>
</channel></rss>"#;

    #[test]
    fn test_parse_items() {
        let items = parse_feed(FEED, 100).unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].str_field("title"), Some("Past Lives (2023)"));
        assert_eq!(
            items[1].str_field("link"),
            Some("https://www.imdb.com/title/tt1517268/")
        );
        assert!(items[0].str_field("summary").unwrap().contains("tt13238346"));
        assert!(items[0].str_field("summary").unwrap().ends_with("passes & more"));
        assert_eq!(items[2].str_field("summary"), None);
    }

    #[test]
    fn test_limit_applies() {
        let items = parse_feed(FEED, 1).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_channel_title_is_not_an_item() {
        let items = parse_feed("<rss><channel><title>Only</title></channel></rss>", 100).unwrap();
        assert!(items.is_empty());
    }
}
