//! HTML parsing for forum listing and topic pages
//!
//! The forum runs Invision Community; these functions only rely on the few
//! attributes that stay stable across its themes.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;

/// A `.torrent` file attached to a post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}

/// What a topic page says about one release
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicPage {
    pub title: String,
    pub poster: Option<String>,
    pub attachments: Vec<Attachment>,
    pub magnets: Vec<String>,
}

// Selectors are string constants; parsing them cannot fail at runtime.
fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

// Topic URL up to its slug, dropping pages, anchors and query actions
static RE_TOPIC_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?/forums/topic/[^/?&#]+)").expect("static regex must compile")
});

/// Canonical topic URLs linked from a listing or home page, in document order
pub fn parse_topic_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let links = selector("a[href]");

    let mut seen = HashSet::new();
    let mut topics = Vec::new();

    for link in document.select(&links) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Some(captures) = RE_TOPIC_URL.captures(href) else {
            continue;
        };
        let url = format!("{}/", &captures[1]);
        if seen.insert(url.clone()) {
            topics.push(url);
        }
    }

    topics
}

/// Parse the first post of a topic
pub fn parse_topic(html: &str) -> TopicPage {
    let document = Html::parse_document(html);

    let title = document
        .select(&selector("h1.ipsType_pageTitle"))
        .next()
        .or_else(|| document.select(&selector("title")).next())
        .map(element_text)
        .unwrap_or_default();

    let post = document
        .select(&selector("div[data-role='commentContent']"))
        .next()
        .unwrap_or_else(|| document.root_element());

    TopicPage {
        title,
        poster: find_poster(post),
        attachments: find_attachments(post),
        magnets: find_magnets(post),
    }
}

fn find_poster(post: ElementRef<'_>) -> Option<String> {
    post.select(&selector("img"))
        .filter_map(|img| {
            let attrs = img.value();
            attrs.attr("data-src").or_else(|| attrs.attr("src"))
        })
        .map(str::trim)
        .find(|src| !src.is_empty() && !src.starts_with("data:") && !src.contains("emoticons"))
        .map(str::to_string)
}

fn find_attachments(post: ElementRef<'_>) -> Vec<Attachment> {
    let mut seen = HashSet::new();
    let mut attachments = Vec::new();

    for link in post.select(&selector("a[href]")) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let name = element_text(link);
        let is_torrent = link.value().attr("data-fileext") == Some("torrent")
            || name.to_lowercase().ends_with(".torrent");

        if is_torrent && !href.starts_with("magnet:") && seen.insert(href.to_string()) {
            attachments.push(Attachment {
                name,
                url: href.to_string(),
            });
        }
    }

    attachments
}

fn find_magnets(post: ElementRef<'_>) -> Vec<String> {
    let magnet_links = selector("a[href^='magnet:']");
    let mut seen = HashSet::new();
    let mut magnets = Vec::new();

    for href in post.select(&magnet_links).filter_map(|link| link.value().attr("href")) {
        if seen.insert(href) {
            magnets.push(href.to_string());
        }
    }

    magnets
}

/// Text content with runs of whitespace collapsed
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
          <ol class="ipsDataList">
            <li class="ipsDataItem">
              <h4 class="ipsDataItem_title">
                <a href="https://forum.example/index.php?/forums/topic/101-leo-2023-tamil/">Leo (2023) Tamil</a>
              </h4>
              <a href="https://forum.example/index.php?/forums/topic/101-leo-2023-tamil/page/2/#comments">2</a>
            </li>
            <li class="ipsDataItem">
              <h4 class="ipsDataItem_title">
                <a href="https://forum.example/index.php?/forums/topic/102-jailer-2023/&amp;do=getNewComment">Jailer</a>
              </h4>
            </li>
          </ol>
          <a href="https://forum.example/index.php?/forums/forum/7-tamil/page/2/">Next</a>
          <a href="https://forum.example/index.php?/profile/5-admin/">admin</a>
        </body></html>
    "#;

    const TOPIC: &str = r#"
        <html><head><title>Leo (2023) - TamilBlasters</title></head><body>
          <h1 class="ipsType_pageTitle">
            <span>Leo (2023) Tamil HQ HDRip - 1080p - 720p
            - x264 - (DD+5.1 - 192Kbps &amp; AAC) - 5.8GB - 1.4GB - ESub</span>
          </h1>
          <article>
            <div data-role="commentContent">
              <p><img src="https://forum.example/uploads/emoticons/smile.png"></p>
              <p><img src="data:image/gif;base64,R0lGOD" data-src="https://img.example/leo.jpg"></p>
              <a class="ipsAttachLink" data-fileext="torrent"
                 href="https://forum.example/applications/core/interface/file/attachment.php?id=1">
                 www.1TamilBlasters.example - Leo (2023) Tamil HQ HDRip - 1080p - x264 - 5.8GB - ESub.torrent
              </a>
              <a href="https://forum.example/applications/core/interface/file/attachment.php?id=2">
                 www.1TamilBlasters.example - Leo (2023) Tamil HQ HDRip - 720p - x264 - 1.4GB - ESub.torrent
              </a>
              <a href="magnet:?xt=urn:btih:0123456789abcdef0123456789abcdef01234567&amp;dn=Leo+1080p">Magnet</a>
              <a href="magnet:?xt=urn:btih:0123456789abcdef0123456789abcdef01234567&amp;dn=Leo+1080p">Magnet</a>
            </div>
          </article>
          <div data-role="commentContent">
            <a href="magnet:?xt=urn:btih:ffffffffffffffffffffffffffffffffffffffff">Reply magnet</a>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_topic_links() {
        let links = parse_topic_links(LISTING);
        assert_eq!(
            links,
            vec![
                "https://forum.example/index.php?/forums/topic/101-leo-2023-tamil/".to_string(),
                "https://forum.example/index.php?/forums/topic/102-jailer-2023/".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_topic() {
        let topic = parse_topic(TOPIC);

        assert_eq!(
            topic.title,
            "Leo (2023) Tamil HQ HDRip - 1080p - 720p - x264 - (DD+5.1 - 192Kbps & AAC) - 5.8GB - 1.4GB - ESub"
        );
        assert_eq!(topic.poster.as_deref(), Some("https://img.example/leo.jpg"));

        assert_eq!(topic.attachments.len(), 2);
        assert_eq!(
            topic.attachments[0].name,
            "www.1TamilBlasters.example - Leo (2023) Tamil HQ HDRip - 1080p - x264 - 5.8GB - ESub.torrent"
        );
        assert!(topic.attachments[1].url.ends_with("attachment.php?id=2"));

        // Only the first post counts, duplicates collapse
        assert_eq!(
            topic.magnets,
            vec!["magnet:?xt=urn:btih:0123456789abcdef0123456789abcdef01234567&dn=Leo+1080p".to_string()]
        );
    }

    #[test]
    fn test_parse_topic_without_post_markup() {
        let topic = parse_topic("<html><head><title>Plain page</title></head><body></body></html>");
        assert_eq!(topic.title, "Plain page");
        assert!(topic.poster.is_none());
        assert!(topic.attachments.is_empty());
        assert!(topic.magnets.is_empty());
    }
}
