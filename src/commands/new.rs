//! Create a new post, draft or page

use anyhow::Result;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

use crate::Site;

/// Optional metadata for a new document
#[derive(Debug, Clone, Default)]
pub struct NewOptions {
    pub tags: Vec<String>,
    pub author: Option<String>,
    /// File stem to use instead of the slugified title
    pub path: Option<String>,
    /// Publication date; today when unset
    pub date: Option<NaiveDate>,
}

/// Create a new post/page/draft and return its path
pub fn create_document(
    site: &Site,
    title: &str,
    layout: &str,
    options: &NewOptions,
) -> Result<PathBuf> {
    let date = options
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let stem = match &options.path {
        Some(p) => p.trim_end_matches(".md").to_string(),
        None => slug::slugify(title),
    };
    if stem.is_empty() {
        anyhow::bail!("Cannot derive a file name from title {:?}; pass --path", title);
    }

    // Determine the target file and the front-matter layout based on the kind
    let (file_path, fm_layout, dated) = match layout {
        "draft" => (
            site.drafts_dir.join(format!("{}.md", stem)),
            site.config.default_layout.as_str(),
            false,
        ),
        "page" => (site.source_dir.join(format!("{}.md", stem)), "page", false),
        other => (
            site.posts_dir
                .join(format!("{}-{}.md", date.format("%Y-%m-%d"), stem)),
            other,
            true,
        ),
    };

    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let content = front_matter(
        fm_layout,
        title,
        dated.then_some(date),
        &options.tags,
        options.author.as_deref(),
    )?;

    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;

    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}

/// Build a front-matter block for a new document
fn front_matter(
    layout: &str,
    title: &str,
    date: Option<NaiveDate>,
    tags: &[String],
    author: Option<&str>,
) -> Result<String> {
    let mut out = String::from("---\n");
    out.push_str(&format!("layout: {}\n", scalar(layout)?));
    out.push_str(&format!("title: {}\n", scalar(title)?));
    if let Some(date) = date {
        out.push_str(&format!("date: {}\n", date.format("%Y-%m-%d")));

        // Tags are written space-separated, one line
        let tags: Vec<&str> = tags.iter().flat_map(|t| t.split_whitespace()).collect();
        if tags.is_empty() {
            out.push_str("tags:\n");
        } else {
            out.push_str(&format!("tags: {}\n", scalar(&tags.join(" "))?));
        }
    }
    if let Some(author) = author {
        out.push_str(&format!("author: {}\n", scalar(author)?));
    }
    out.push_str("---\n");
    Ok(out)
}

/// A string as a YAML scalar, quoted whenever a plain one would read back differently
fn scalar(s: &str) -> Result<String> {
    Ok(serde_yaml::to_string(s)?.trim_end().to_string())
}
