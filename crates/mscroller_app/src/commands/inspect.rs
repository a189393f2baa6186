use std::path::Path;

use anyhow::Result;
use mscroller_engine::ChapterInfo;

pub fn execute(url: &str, file: Option<&Path>, content_type: Option<&str>) -> Result<()> {
    let page = super::load_page(url, file, content_type)?;
    let info = ChapterInfo::derive(&page);
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
