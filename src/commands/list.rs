//! List site content

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

use crate::config::SiteConfig;
use crate::content::{ContentStore, Document, DocumentKind};
use crate::helpers::format_date;
use crate::Site;

/// Metadata row for `--json` output
#[derive(Debug, Serialize)]
struct Summary<'a> {
    id: &'a str,
    kind: DocumentKind,
    source: &'a str,
    layout: Option<&'a str>,
    title: Option<&'a str>,
    date: Option<NaiveDate>,
    tags: &'a [String],
    author: Option<&'a str>,
    published: bool,
}

impl<'a> From<&'a Document> for Summary<'a> {
    fn from(doc: &'a Document) -> Self {
        Self {
            id: &doc.id,
            kind: doc.kind,
            source: &doc.source,
            layout: doc.layout.as_deref(),
            title: doc.title.as_deref(),
            date: doc.date,
            tags: &doc.tags,
            author: doc.author.as_deref(),
            published: doc.published,
        }
    }
}

#[derive(Debug, Serialize)]
struct Count<'a> {
    name: &'a str,
    count: usize,
}

/// List site content by type
pub fn run(site: &Site, content_type: &str, json: bool) -> Result<()> {
    let store = site.load()?;
    print!("{}", render(&store, &site.config, content_type, json)?);
    Ok(())
}

/// Render a listing of one content type
pub fn render(
    store: &ContentStore,
    config: &SiteConfig,
    content_type: &str,
    json: bool,
) -> Result<String> {
    let mut out = String::new();

    match content_type {
        "post" | "posts" => {
            let posts: Vec<_> = store.posts().collect();
            if json {
                return to_json(&posts);
            }
            writeln!(out, "Posts ({}):", posts.len())?;
            for post in posts {
                let date = post
                    .effective_date()
                    .map(|d| format_date(&d, &config.date_format))
                    .unwrap_or_else(|| "(undated)".to_string());
                writeln!(
                    out,
                    "  {} - {} [{}]",
                    date,
                    post.display_title(),
                    post.source
                )?;
            }
        }
        "page" | "pages" => {
            let pages: Vec<_> = store.pages().collect();
            if json {
                return to_json(&pages);
            }
            writeln!(out, "Pages ({}):", pages.len())?;
            for page in pages {
                writeln!(out, "  {} [{}]", page.display_title(), page.source)?;
            }
        }
        "draft" | "drafts" => {
            let drafts: Vec<_> = store.drafts().collect();
            if json {
                return to_json(&drafts);
            }
            writeln!(out, "Drafts ({}):", drafts.len())?;
            for draft in drafts {
                writeln!(out, "  {} [{}]", draft.display_title(), draft.source)?;
            }
        }
        "tag" | "tags" => {
            render_counts(&mut out, "Tags", &store.tags(), json)?;
        }
        "author" | "authors" => {
            render_counts(&mut out, "Authors", &store.authors(), json)?;
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: posts, pages, drafts, tags, authors",
                content_type
            );
        }
    }

    Ok(out)
}

fn to_json(docs: &[&Document]) -> Result<String> {
    let rows: Vec<Summary> = docs.iter().map(|d| Summary::from(*d)).collect();
    Ok(serde_json::to_string_pretty(&rows)? + "\n")
}

/// Most used first, then by name
fn render_counts(
    out: &mut String,
    heading: &str,
    counts: &BTreeMap<String, usize>,
    json: bool,
) -> Result<()> {
    let mut rows: Vec<Count> = counts
        .iter()
        .map(|(name, count)| Count {
            name,
            count: *count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(b.name)));

    if json {
        out.push_str(&serde_json::to_string_pretty(&rows)?);
        out.push('\n');
        return Ok(());
    }

    writeln!(out, "{} ({}):", heading, rows.len())?;
    for row in rows {
        writeln!(out, "  {} ({})", row.name, row.count)?;
    }
    Ok(())
}
