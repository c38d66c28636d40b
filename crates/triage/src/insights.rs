//! Sources of free-text insight snippets for a symptom list.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures_core::Stream;
use futures_util::stream;
use reqwest::Client;

use crate::error::{Result, TriageError};

/// A lazy, finite stream of text snippets.
pub type InsightStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Looks up text related to a list of symptoms.
#[async_trait]
pub trait InsightLookup: Send + Sync {
    async fn lookup(&self, symptoms: &[String]) -> Result<InsightStream>;
}

/// Class that marks a result container on the search page.
pub const RESULT_CLASS: &str = "BNeawe";

/// Search text for a symptom list, unencoded: the symptoms followed by
/// `disease symptoms`.
pub fn search_query(symptoms: &[String]) -> String {
    let mut query = symptoms.join(" ");
    query.push_str(" disease symptoms");
    query
}

/// Fetches a search results page and streams the text of its result
/// containers.
#[derive(Debug, Clone)]
pub struct HttpInsightLookup {
    client: Client,
    base_url: String,
    result_class: String,
}

impl HttpInsightLookup {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            result_class: RESULT_CLASS.to_string(),
        })
    }

    /// Overrides the class that marks result containers.
    pub fn with_result_class(mut self, class: impl Into<String>) -> Self {
        self.result_class = class.into();
        self
    }
}

#[async_trait]
impl InsightLookup for HttpInsightLookup {
    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn lookup(&self, symptoms: &[String]) -> Result<InsightStream> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", search_query(symptoms))])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TriageError::Lookup(format!("HTTP {status}")));
        }

        let html = response.text().await?;
        tracing::debug!(bytes = html.len(), "Fetched insight page");
        let blocks = ResultBlocks::new(html, self.result_class.clone());
        Ok(Box::pin(stream::iter(blocks.map(Ok))))
    }
}

/// Iterator over the text of every element whose `class` attribute contains
/// a given class name, in document order.
///
/// Nested matches are yielded separately, after their enclosing element.
/// Each item is the element's visible text runs joined by a space; elements
/// without text are skipped.
pub struct ResultBlocks {
    html: String,
    class: String,
    pos: usize,
}

impl ResultBlocks {
    pub fn new(html: String, class: impl Into<String>) -> Self {
        Self {
            html,
            class: class.into(),
            pos: 0,
        }
    }

    /// Byte offset of the tag that closes the `name` element opened just
    /// before `from`, counting nested elements of the same name.
    fn closing_tag(&self, name: &str, from: usize) -> Option<usize> {
        let mut depth = 1usize;
        let mut pos = from;
        while let Some(offset) = self.html[pos..].find('<') {
            let start = pos + offset;
            let end = self.html[start..].find('>').map(|i| start + i + 1)?;
            let tag = &self.html[start..end];
            if let Some(closing) = tag.strip_prefix("</") {
                if tag_name(closing) == name {
                    depth -= 1;
                    if depth == 0 {
                        return Some(start);
                    }
                }
            } else if tag_name(tag) == name && !tag.ends_with("/>") {
                depth += 1;
            }
            pos = end;
        }
        None
    }
}

impl Iterator for ResultBlocks {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while let Some(offset) = self.html[self.pos..].find('<') {
            let start = self.pos + offset;
            let end = match self.html[start..].find('>') {
                Some(i) => start + i + 1,
                None => {
                    self.pos = self.html.len();
                    return None;
                }
            };
            self.pos = end;

            let tag = &self.html[start..end];
            let name = tag_name(tag);
            if name == "script" || name == "style" {
                let closing = format!("</{name}");
                self.pos = self.html[end..]
                    .to_ascii_lowercase()
                    .find(&closing)
                    .map_or(self.html.len(), |i| end + i);
                continue;
            }
            if tag.starts_with("</") || tag.ends_with("/>") || !has_class(tag, &self.class) {
                continue;
            }

            let close = self.closing_tag(&name, end).unwrap_or(self.html.len());
            let text = TextSegments::new(self.html[end..close].to_string())
                .collect::<Vec<_>>()
                .join(" ");
            if !text.is_empty() {
                return Some(text);
            }
        }
        self.pos = self.html.len();
        None
    }
}

fn has_class(tag: &str, class: &str) -> bool {
    class_attr(tag).is_some_and(|value| value.split_whitespace().any(|c| c == class))
}

fn class_attr(tag: &str) -> Option<&str> {
    let lower = tag.to_ascii_lowercase();
    let mut search = 0;
    while let Some(offset) = lower[search..].find("class") {
        let at = search + offset;
        search = at + "class".len();
        if !lower[..at].ends_with(|c: char| c.is_ascii_whitespace()) {
            continue;
        }
        let rest = lower[search..].trim_start();
        let Some(rest) = rest.strip_prefix('=') else {
            continue;
        };
        let rest = rest.trim_start();
        let value_start = lower.len() - rest.len();
        return match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let inner = value_start + 1;
                let len = lower[inner..].find(quote)?;
                Some(&tag[inner..inner + len])
            }
            Some(_) => {
                let len = rest
                    .find(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
                    .unwrap_or(rest.len());
                Some(&tag[value_start..value_start + len])
            }
            None => None,
        };
    }
    None
}

/// Iterator over the visible text runs of an HTML document.
///
/// Tags are dropped, `script` and `style` bodies are skipped, whitespace is
/// collapsed and the common character entities are decoded. Empty runs are
/// not yielded.
pub struct TextSegments {
    html: String,
    pos: usize,
}

impl TextSegments {
    pub fn new(html: String) -> Self {
        Self { html, pos: 0 }
    }

    fn skip_raw_text(&mut self, tag: &str) {
        let closing = format!("</{tag}");
        let rest = &self.html[self.pos..];
        self.pos = match rest.to_ascii_lowercase().find(&closing) {
            Some(offset) => self.pos + offset,
            None => self.html.len(),
        };
    }
}

impl Iterator for TextSegments {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while self.pos < self.html.len() {
            let rest = &self.html[self.pos..];

            if rest.starts_with('<') {
                let end = rest.find('>').map_or(self.html.len(), |i| self.pos + i + 1);
                let tag = tag_name(&self.html[self.pos..end]);
                self.pos = end;
                if tag == "script" || tag == "style" {
                    self.skip_raw_text(&tag);
                }
                continue;
            }

            let end = rest.find('<').map_or(self.html.len(), |i| self.pos + i);
            let text = normalize(&decode_entities(&self.html[self.pos..end]));
            self.pos = end;
            if !text.is_empty() {
                return Some(text);
            }
        }
        None
    }
}

fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('<')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Serves fixed snippets, or always fails. Counts lookups.
#[derive(Debug, Clone, Default)]
pub struct StaticInsightLookup {
    snippets: Vec<String>,
    failure: Option<String>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl StaticInsightLookup {
    pub fn new<I, S>(snippets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            snippets: snippets.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// A lookup that returns no snippets.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A lookup whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Default::default()
        }
    }

    /// Delays every lookup, for exercising timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of lookups performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InsightLookup for StaticInsightLookup {
    async fn lookup(&self, _symptoms: &[String]) -> Result<InsightStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.failure {
            return Err(TriageError::Lookup(message.clone()));
        }
        Ok(Box::pin(stream::iter(
            self.snippets.clone().into_iter().map(Ok),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[test]
    fn query_joins_symptoms_with_spaces() {
        let symptoms = vec!["headache".to_string(), "fever".to_string()];
        assert_eq!(search_query(&symptoms), "headache fever disease symptoms");
    }

    #[test]
    fn result_blocks_keep_only_marked_elements() {
        let html = r#"<html><head><script>var c = "<div class='BNeawe'>x</div>";</script></head>
            <body><nav>Navigation links and account settings for the results page</nav>
            <div class="kCrYT"><div class="BNeawe s3v9rd">First <b>bold</b> result</div></div>
            <span class='BNeawe'>Second &amp; last</span>
            <div class="BNeaweX">near miss</div>
            <footer>Privacy, terms and other footer text</footer></body></html>"#;

        let blocks: Vec<_> = ResultBlocks::new(html.to_string(), RESULT_CLASS).collect();
        assert_eq!(blocks, vec!["First bold result", "Second & last"]);
    }

    #[test]
    fn result_blocks_match_nested_same_name_elements() {
        let html = r#"<div class="r">outer <div>inner</div> tail</div><div class="r"></div><p class=r>bare</p>"#;

        let blocks: Vec<_> = ResultBlocks::new(html.to_string(), "r").collect();
        assert_eq!(blocks, vec!["outer inner tail", "bare"]);
    }

    #[test]
    fn class_attr_ignores_similar_attribute_names() {
        assert_eq!(class_attr(r#"<div data-class="x" class="y z">"#), Some("y z"));
        assert_eq!(class_attr(r#"<div subclass="x">"#), None);
        assert_eq!(class_attr("<div CLASS = 'Mixed'>"), Some("Mixed"));
    }

    #[test]
    fn text_segments_skip_markup_and_scripts() {
        let html = r#"<html><head><style>.a { color: red }</style>
            <script>var x = "<b>no</b>";</script></head>
            <body><div class="r">First   result
            text</div><span>Tom &amp; Jerry&#39;s</span><br/></body></html>"#;

        let segments: Vec<_> = TextSegments::new(html.to_string()).collect();
        assert_eq!(segments, vec!["First result text", "Tom & Jerry's"]);
    }

    #[test]
    fn unterminated_tag_ends_iteration() {
        let segments: Vec<_> = TextSegments::new("before <div".to_string()).collect();
        assert_eq!(segments, vec!["before"]);
    }

    #[tokio::test]
    async fn static_lookup_streams_snippets() {
        let lookup = StaticInsightLookup::new(["one", "two"]);
        let stream = lookup.lookup(&["cough".to_string()]).await.unwrap();

        let snippets: Vec<String> = stream.map(|s| s.unwrap()).collect().await;
        assert_eq!(snippets, vec!["one", "two"]);
        assert_eq!(lookup.calls(), 1);
    }

    #[tokio::test]
    async fn failing_lookup_errors() {
        let lookup = StaticInsightLookup::failing("offline");
        let result = lookup.lookup(&["cough".to_string()]).await;
        assert!(matches!(result, Err(TriageError::Lookup(m)) if m == "offline"));
    }
}
