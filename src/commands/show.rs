//! Show a single document

use anyhow::Result;
use std::fmt::Write;

use crate::config::SiteConfig;
use crate::content::{word_count, ContentStore, DocumentFormat, MarkdownRenderer};
use crate::helpers::format_date;
use crate::Site;

/// Print a document's metadata followed by its body
pub fn run(site: &Site, key: &str, html: bool) -> Result<()> {
    let store = site.load()?;
    print!("{}", render(&store, &site.config, key, html)?);
    Ok(())
}

/// Render a document's metadata and body (or a rendered HTML preview)
pub fn render(
    store: &ContentStore,
    config: &SiteConfig,
    key: &str,
    html: bool,
) -> Result<String> {
    let Some(doc) = store.get(key) else {
        anyhow::bail!("No document with id or path {:?}", key);
    };

    let none = || "-".to_string();
    let mut out = String::new();

    writeln!(out, "id:        {}", doc.id)?;
    writeln!(out, "kind:      {}", doc.kind)?;
    writeln!(out, "source:    {}", doc.source)?;
    writeln!(out, "layout:    {}", doc.layout.clone().unwrap_or_else(none))?;
    writeln!(out, "title:     {}", doc.title.clone().unwrap_or_else(none))?;
    let date = match (doc.date, &doc.date_raw) {
        (Some(d), _) => format_date(&d, &config.date_format),
        (None, Some(raw)) => format!("{} (invalid)", raw),
        (None, None) => none(),
    };
    writeln!(out, "date:      {}", date)?;
    let tags = if doc.tags.is_empty() {
        none()
    } else {
        doc.tags.join(", ")
    };
    writeln!(out, "tags:      {}", tags)?;
    writeln!(out, "author:    {}", doc.author.clone().unwrap_or_else(none))?;
    if !doc.published {
        writeln!(out, "published: false")?;
    }
    for (key, value) in &doc.extra {
        let value = serde_yaml::to_string(value)?;
        writeln!(out, "{}: {}", key, value.trim_end())?;
    }

    let (excerpt, _) = MarkdownRenderer::split_excerpt(&doc.body, &config.excerpt_separator);
    if let Some(excerpt) = excerpt {
        writeln!(out, "excerpt:   {} words", word_count(&excerpt))?;
    }
    writeln!(out, "words:     {}", word_count(&doc.body))?;
    writeln!(out, "---")?;

    if html && doc.format == DocumentFormat::Markdown {
        let renderer = MarkdownRenderer::with_options(&config.highlight);
        let (_, full) = MarkdownRenderer::split_excerpt(&doc.body, &config.excerpt_separator);
        out.push_str(&renderer.render(&full)?);
    } else {
        out.push_str(&doc.body);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> (TempDir, Site) {
        let dir = TempDir::new().unwrap();
        let posts = dir.path().join("_posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(
            posts.join("2024-11-11-net8.md"),
            "---\nlayout: post\ntitle: \"X\"\ndate: 2024-11-11\ntags: C# .Net8\nseries: dotnet\n---\nShort intro.\n<!-- more -->\n## Details\n\nMore text here.\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("about.md"),
            "---\nlayout: page\ntitle: About\ndate: soon\n---\nMe\n",
        )
        .unwrap();
        let site = Site::new(dir.path()).unwrap();
        (dir, site)
    }

    #[test]
    fn test_show_metadata_and_body() {
        let (_dir, site) = site();
        let store = site.load().unwrap();
        let out = render(&store, &site.config, "_posts/2024-11-11-net8", false).unwrap();

        assert!(out.contains("kind:      post\n"));
        assert!(out.contains("date:      2024-11-11\n"));
        assert!(out.contains("tags:      C#, .Net8\n"));
        assert!(out.contains("author:    -\n"));
        assert!(out.contains("series: dotnet\n"));
        assert!(out.contains("excerpt:   2 words\n"));
        assert!(out.contains("words:     6\n"));
        assert!(out.ends_with("---\nShort intro.\n<!-- more -->\n## Details\n\nMore text here.\n"));
    }

    #[test]
    fn test_show_html_preview() {
        let (_dir, site) = site();
        let store = site.load().unwrap();
        let out = render(&store, &site.config, "_posts/2024-11-11-net8.md", true).unwrap();
        assert!(out.contains("<h2>Details</h2>"));
        assert!(!out.contains("<!-- more -->"));
    }

    #[test]
    fn test_show_invalid_date_and_missing() {
        let (_dir, site) = site();
        let store = site.load().unwrap();
        let out = render(&store, &site.config, "about", false).unwrap();
        assert!(out.contains("date:      soon (invalid)\n"));

        let err = render(&store, &site.config, "nope", false).unwrap_err();
        assert!(err.to_string().contains("No document"));
    }
}
