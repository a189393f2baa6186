pub mod inspect;
pub mod simulate;
pub mod stats;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use mscroller_engine::{PageDocument, PageFetcher};

/// Reads `file` when given, otherwise fetches `url`.
fn load_page(url: &str, file: Option<&Path>, content_type: Option<&str>) -> Result<PageDocument> {
    match file {
        Some(path) => {
            let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            Ok(PageDocument::from_bytes(url, &bytes, content_type)?)
        }
        None => {
            let runtime = tokio::runtime::Runtime::new()?;
            Ok(runtime.block_on(PageFetcher::default().fetch(url))?)
        }
    }
}
