use lazy_static::lazy_static;
use scraper::Selector;
use url::Url;

use super::chapter::{chapter_id, explicit_chapter_number};
use crate::page::{element_text, PageDocument};

lazy_static! {
    static ref NEXT_SELECTORS: Vec<Selector> = parse_all(&[
        r#"a[rel="next"]"#,
        r#"a[class*="next"]:not([class*="prev"])"#,
        ".next a",
        ".next-chap",
        ".btn-next",
        r#"a[href*="next"]"#,
    ]);
    static ref PREV_SELECTORS: Vec<Selector> = parse_all(&[
        r#"a[rel="prev"]"#,
        r#"a[class*="prev"]"#,
        ".prev a",
        ".prev-chap",
        ".btn-prev",
    ]);
    static ref ANCHORS: Vec<Selector> = parse_all(&["a[href]"]);
}

/// Numeric matches within this distance of `current + 1` count as the next chapter.
const CHAPTER_STEP_TOLERANCE: f64 = 0.1;

fn parse_all(selectors: &[&str]) -> Vec<Selector> {
    selectors
        .iter()
        .filter_map(|sel| Selector::parse(sel).ok())
        .collect()
}

/// Link to the next chapter, tried in three tiers: markup hints, link
/// text, then a link whose chapter number is one past the current one.
pub fn find_next_link(page: &PageDocument) -> Option<String> {
    by_selectors(page, &NEXT_SELECTORS)
        .or_else(|| by_link_text(page))
        .or_else(|| by_chapter_increment(page))
        .map(String::from)
}

/// Link to the previous chapter. Markup hints only.
pub fn find_prev_link(page: &PageDocument) -> Option<String> {
    by_selectors(page, &PREV_SELECTORS).map(String::from)
}

fn candidate(page: &PageDocument, href: Option<&str>) -> Option<Url> {
    let url = page.resolve_link(href?)?;
    page.leads_elsewhere(&url).then_some(url)
}

fn by_selectors(page: &PageDocument, selectors: &[Selector]) -> Option<Url> {
    selectors.iter().find_map(|selector| {
        page.select_all(selector)
            .find_map(|element| candidate(page, element.value().attr("href")))
    })
}

fn is_next_text(text: &str) -> bool {
    let text = text.to_lowercase();
    text == "next" || text.contains("next chapter") || text == ">" || text == ">>"
}

fn by_link_text(page: &PageDocument) -> Option<Url> {
    ANCHORS.iter().find_map(|anchors| {
        page.select_all(anchors)
            .filter(|element| is_next_text(&element_text(*element)))
            .find_map(|element| candidate(page, element.value().attr("href")))
    })
}

fn by_chapter_increment(page: &PageDocument) -> Option<Url> {
    let current: f64 = chapter_id(page.href())?.parse().ok()?;
    let wanted = current + 1.0;
    ANCHORS.iter().find_map(|anchors| {
        page.select_all(anchors)
            .filter_map(|element| candidate(page, element.value().attr("href")))
            .find(|url| {
                explicit_chapter_number(url.as_str())
                    .is_some_and(|number| (number - wanted).abs() < CHAPTER_STEP_TOLERANCE)
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_matching_is_case_insensitive() {
        assert!(is_next_text("Next"));
        assert!(is_next_text("Read next chapter!"));
        assert!(is_next_text(">>"));
        assert!(!is_next_text("next page of comments?"));
        assert!(!is_next_text(">>>"));
    }
}
