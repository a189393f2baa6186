use lazy_static::lazy_static;
use regex::Regex;
use scraper::Selector;

use crate::page::{element_text, PageDocument};

lazy_static! {
    /// Series-specific classes first, then generic headings and breadcrumbs.
    static ref TITLE_SELECTORS: Vec<Selector> = [
        ".manga-title",
        ".series-title",
        ".comic-title",
        "h1",
        ".entry-title",
        ".chapter-title",
        ".breadcrumb a",
        r#"a[href*="manga"]"#,
        r#"a[href*="series"]"#,
    ]
    .iter()
    .filter_map(|sel| Selector::parse(sel).ok())
    .collect();

    static ref CHAPTER_SUFFIXES: Vec<Regex> = [r"(?i)chapter.*", r"(?i)episode.*"]
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect();
    static ref TITLE_DELIMITERS: Option<Regex> = Regex::new(r"[-|]").ok();
}

const FALLBACK_TITLE: &str = "Unknown";

/// Best-effort series title for the page. Never empty.
pub fn title(page: &PageDocument) -> String {
    for selector in TITLE_SELECTORS.iter() {
        // Only the first element per selector is considered.
        let Some(element) = page.select_all(selector).next() else {
            continue;
        };
        let text = strip_chapter_suffix(&element_text(element));
        let len = text.chars().count();
        if len > 2 && len < 150 {
            return text;
        }
    }

    let from_document = first_segment(&page.document_title());
    if !from_document.is_empty() {
        return from_document;
    }
    page.url()
        .host_str()
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_TITLE.to_string())
}

fn strip_chapter_suffix(text: &str) -> String {
    CHAPTER_SUFFIXES
        .iter()
        .fold(text.to_string(), |acc, suffix| suffix.replace(&acc, "").into_owned())
        .trim()
        .to_string()
}

fn first_segment(document_title: &str) -> String {
    let first = match TITLE_DELIMITERS.as_ref() {
        Some(delimiters) => delimiters.split(document_title).next().unwrap_or_default(),
        None => document_title,
    };
    first.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(html: &str) -> PageDocument {
        PageDocument::parse("https://reader.example/solo/chapter-12", html).unwrap()
    }

    #[test]
    fn series_class_wins_and_loses_chapter_suffix() {
        let page = page(
            r#"<h1>Site Banner</h1><div class="manga-title"> Solo Leveling Chapter 12 </div>"#,
        );
        assert_eq!(title(&page), "Solo Leveling");
    }

    #[test]
    fn too_short_candidates_fall_through() {
        let page = page(r#"<h1>Ch</h1><h2 class="entry-title">Tower of God - Episode 3</h2>"#);
        assert_eq!(title(&page), "Tower of God -");
    }

    #[test]
    fn document_title_is_split_on_delimiters() {
        let page = page("<title>Omniscient Reader | Chapter 5 | ReaderSite</title>");
        assert_eq!(title(&page), "Omniscient Reader");
    }

    #[test]
    fn empty_page_falls_back_to_host() {
        let page = page("<p>nothing here</p>");
        assert_eq!(title(&page), "reader.example");
    }

    #[test]
    fn overlong_heading_is_skipped() {
        let long = "x".repeat(200);
        let html = format!("<h1>{long}</h1><title>Real Name - Ch 1</title>");
        assert_eq!(title(&page(&html)), "Real Name");
    }
}
