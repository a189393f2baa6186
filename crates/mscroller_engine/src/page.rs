use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::decode::{decode_html, DecodeError};

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("invalid page url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// A parsed page as the agent sees it: its address plus its markup.
#[derive(Debug)]
pub struct PageDocument {
    url: Url,
    html: Html,
    content_type: Option<String>,
}

impl PageDocument {
    pub fn parse(url: &str, html: &str) -> Result<Self, PageError> {
        let url = Url::parse(url).map_err(|source| PageError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        Ok(Self {
            url,
            html: Html::parse_document(html),
            content_type: None,
        })
    }

    /// Decodes raw bytes (from disk or the network) and parses them.
    pub fn from_bytes(url: &str, bytes: &[u8], content_type: Option<&str>) -> Result<Self, PageError> {
        let decoded = decode_html(bytes, content_type)?;
        let page = Self::parse(url, &decoded.html)?;
        Ok(page.with_content_type(content_type.map(str::to_string)))
    }

    pub fn with_content_type(mut self, content_type: Option<String>) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn href(&self) -> &str {
        self.url.as_str()
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    /// XML documents (including XHTML served as XML) get no panel.
    pub fn is_xml(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("xml"))
    }

    /// Text of `<title>`, trimmed; empty when absent.
    pub fn document_title(&self) -> String {
        Selector::parse("title")
            .ok()
            .and_then(|sel| self.html.select(&sel).next().map(element_text))
            .unwrap_or_default()
    }

    pub fn select_all<'a>(&'a self, selector: &'a Selector) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.html.select(selector)
    }

    /// Resolves an `href` against the page address. Returns `None` for
    /// empty, same-page fragment, script and non-http targets.
    pub fn resolve_link(&self, href: &str) -> Option<Url> {
        let trimmed = href.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }
        let resolved = self.url.join(trimmed).ok()?;
        if !matches!(resolved.scheme(), "http" | "https") {
            return None;
        }
        Some(resolved)
    }

    /// Whether following `target` would actually leave this page.
    pub fn leads_elsewhere(&self, target: &Url) -> bool {
        if target == &self.url {
            return false;
        }
        if target.fragment().is_some() && without_fragment(target) == without_fragment(&self.url) {
            return false;
        }
        true
    }
}

/// Concatenated text content of an element, trimmed.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn without_fragment(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> PageDocument {
        PageDocument::parse("https://reader.example/solo/chapter-12/", "<title> Solo </title>").unwrap()
    }

    #[test]
    fn links_resolve_relative_to_page() {
        let page = page();
        let url = page.resolve_link("../chapter-13/").unwrap();
        assert_eq!(url.as_str(), "https://reader.example/solo/chapter-13/");
        assert!(page.resolve_link("#comments").is_none());
        assert!(page.resolve_link("javascript:void(0)").is_none());
        assert!(page.resolve_link("mailto:someone@example.com").is_none());
        assert!(page.resolve_link("   ").is_none());
    }

    #[test]
    fn same_page_targets_do_not_lead_elsewhere() {
        let page = page();
        let same = Url::parse("https://reader.example/solo/chapter-12/").unwrap();
        let anchor = Url::parse("https://reader.example/solo/chapter-12/#top").unwrap();
        let other = Url::parse("https://reader.example/solo/chapter-13/#top").unwrap();
        assert!(!page.leads_elsewhere(&same));
        assert!(!page.leads_elsewhere(&anchor));
        assert!(page.leads_elsewhere(&other));
    }

    #[test]
    fn title_and_content_type() {
        let page = page().with_content_type(Some("application/xhtml+xml".into()));
        assert_eq!(page.document_title(), "Solo");
        assert!(page.is_xml());
    }

    #[test]
    fn bad_url_is_an_error() {
        assert!(matches!(
            PageDocument::parse("not a url", ""),
            Err(PageError::InvalidUrl { .. })
        ));
    }
}
