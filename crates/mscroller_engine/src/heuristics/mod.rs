//! Best-effort chapter detection against arbitrary reader-site markup.
//!
//! Every lookup is a list of strategies tried from most to least specific;
//! the first one that produces something wins. A miss is `None` (or a
//! fallback string for titles), never an error.
mod chapter;
mod links;
mod title;

pub use chapter::chapter_id;
pub use links::{find_next_link, find_prev_link};
pub use title::title;

use mscroller_core::VisitedChapter;
use serde::Serialize;

use crate::page::PageDocument;

/// Everything the agent derives from the live page. Recomputed on every
/// request because the page can change underneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterInfo {
    pub chapter_id: Option<String>,
    pub title: String,
    pub next_url: Option<String>,
    pub prev_url: Option<String>,
}

impl ChapterInfo {
    pub fn derive(page: &PageDocument) -> Self {
        Self {
            chapter_id: chapter_id(page.href()),
            title: title(page),
            next_url: find_next_link(page),
            prev_url: find_prev_link(page),
        }
    }
}

/// The chapter being read, in the shape history records want.
pub fn visited_chapter(page: &PageDocument) -> VisitedChapter {
    VisitedChapter {
        title: title(page),
        chapter: chapter_id(page.href()),
        url: page.href().to_string(),
    }
}
