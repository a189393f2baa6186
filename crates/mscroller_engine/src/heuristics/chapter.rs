use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Most specific first; the bare trailing number comes last because it
    /// also matches page numbers, ids and years.
    static ref CHAPTER_ID_PATTERNS: Vec<Regex> = [
        r"(?i)chapter[_-]?(\d+(?:\.\d+)?)",
        r"(?i)ch[_-]?(\d+(?:\.\d+)?)",
        r"(?i)episode[_-]?(\d+)",
        r"(?i)ep[_-]?(\d+)",
        r"[/-](\d+)(?:/|$|\?)",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect();
}

/// Chapter id embedded in a URL, e.g. `"12"` or `"3.5"`.
pub fn chapter_id(url: &str) -> Option<String> {
    CHAPTER_ID_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(url))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

/// Chapter number from the two "chapter"/"ch" patterns only, as used when
/// scanning candidate links for the numerically next chapter.
pub(crate) fn explicit_chapter_number(url: &str) -> Option<f64> {
    CHAPTER_ID_PATTERNS.iter().take(2).find_map(|pattern| {
        pattern
            .captures(url)
            .and_then(|captures| captures.get(1))
            .and_then(|m| m.as_str().parse().ok())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_chapter_beats_generic_number() {
        assert_eq!(
            chapter_id("https://reader.example/series/42/chapter-12/").as_deref(),
            Some("12")
        );
    }

    #[test]
    fn short_and_fractional_forms() {
        assert_eq!(chapter_id("https://reader.example/solo/ch-3.5/").as_deref(), Some("3.5"));
        assert_eq!(chapter_id("https://reader.example/solo/Chapter_7").as_deref(), Some("7"));
        assert_eq!(chapter_id("https://toon.example/show/episode-20").as_deref(), Some("20"));
        assert_eq!(chapter_id("https://toon.example/show/ep9?x=1").as_deref(), Some("9"));
    }

    #[test]
    fn trailing_number_is_the_fallback() {
        assert_eq!(chapter_id("https://reader.example/read/88/").as_deref(), Some("88"));
        assert_eq!(chapter_id("https://reader.example/read/solo-88?page=2").as_deref(), Some("88"));
    }

    #[test]
    fn no_number_means_none() {
        assert_eq!(chapter_id("https://reader.example/manga/solo-leveling"), None);
    }

    #[test]
    fn explicit_number_ignores_generic_patterns() {
        assert_eq!(explicit_chapter_number("https://r.example/read/88/"), None);
        assert_eq!(explicit_chapter_number("https://r.example/chapter-10.5"), Some(10.5));
    }
}
