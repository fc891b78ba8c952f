//! Document model

use chrono::NaiveDate;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::FrontMatter;
use crate::helpers::parse_date;

lazy_static! {
    /// `YYYY-MM-DD-slug`, the stem of a post file
    static ref POST_IDENTIFIER: Regex =
        Regex::new(r"^(\d{4}-\d{2}-\d{2})-(.+)$").expect("post identifier pattern is valid");
}

/// Where a document lives in the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Post,
    Draft,
    Page,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Post => "post",
            DocumentKind::Draft => "draft",
            DocumentKind::Page => "page",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Markup the body is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Markdown,
    Html,
}

/// A content document: front-matter metadata plus a body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Source path relative to the site root, without extension
    pub id: String,

    pub kind: DocumentKind,

    pub format: DocumentFormat,

    /// Source file path (relative, `/`-separated)
    pub source: String,

    /// Full source file path
    #[serde(skip)]
    pub full_source: PathBuf,

    /// Rendering template name
    pub layout: Option<String>,

    pub title: Option<String>,

    /// Calendar date from front matter
    pub date: Option<NaiveDate>,

    /// The date exactly as written, kept when it does not parse
    pub date_raw: Option<String>,

    /// Tags in source order, duplicates included
    pub tags: Vec<String>,

    pub categories: Vec<String>,

    pub author: Option<String>,

    pub published: bool,

    /// Slug from the post identifier, or the file stem
    pub slug: String,

    /// Date encoded in a post identifier
    pub filename_date: Option<NaiveDate>,

    /// Raw body text after the front matter
    pub body: String,

    /// Custom front-matter fields
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl Document {
    /// Build a document from parsed front matter and its body
    pub fn from_parts(
        kind: DocumentKind,
        source: &str,
        full_source: &Path,
        fm: FrontMatter,
        body: &str,
    ) -> Self {
        let source = source.replace('\\', "/");
        let stem = full_source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();

        let (filename_date, slug) = match kind {
            DocumentKind::Post => parse_post_identifier(stem)
                .map(|(d, s)| (Some(d), s.to_string()))
                .unwrap_or_else(|| (None, stem.to_string())),
            _ => (None, stem.to_string()),
        };

        let format = match full_source.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm") => {
                DocumentFormat::Html
            }
            _ => DocumentFormat::Markdown,
        };

        let date_raw = fm.date.filter(|d| !d.trim().is_empty());
        let date = date_raw.as_deref().and_then(parse_date);

        Self {
            id: document_id(&source),
            kind,
            format,
            source,
            full_source: full_source.to_path_buf(),
            layout: fm.layout,
            title: fm.title,
            date,
            date_raw,
            tags: fm.tags,
            categories: fm.categories,
            author: fm.author,
            published: fm.published,
            slug,
            filename_date,
            body: body.to_string(),
            extra: fm.extra,
        }
    }

    /// Front-matter date, falling back to the post identifier's date
    pub fn effective_date(&self) -> Option<NaiveDate> {
        self.date.or(self.filename_date)
    }

    /// Tags as a set (case-sensitive)
    pub fn tag_set(&self) -> BTreeSet<&str> {
        self.tags.iter().map(String::as_str).collect()
    }

    /// Tags that appear more than once, each reported once, in source order
    pub fn duplicate_tags(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        let mut dups: Vec<&str> = Vec::new();
        for tag in &self.tags {
            if !seen.insert(tag.as_str()) && !dups.contains(&tag.as_str()) {
                dups.push(tag.as_str());
            }
        }
        dups
    }

    /// Title for display, falling back to the slug
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.slug)
    }

    pub fn is_post(&self) -> bool {
        self.kind == DocumentKind::Post
    }

    pub fn has_body(&self) -> bool {
        !self.body.trim().is_empty()
    }
}

/// Split a post file stem into its date and slug
pub fn parse_post_identifier(stem: &str) -> Option<(NaiveDate, &str)> {
    let caps = POST_IDENTIFIER.captures(stem)?;
    let date = NaiveDate::parse_from_str(caps.get(1)?.as_str(), "%Y-%m-%d").ok()?;
    Some((date, caps.get(2)?.as_str()))
}

/// Document id: relative source path without its extension
fn document_id(source: &str) -> String {
    match source.rfind('.') {
        Some(dot) if !source[dot..].contains('/') && dot > 0 => source[..dot].to_string(),
        _ => source.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(source: &str, content: &str) -> Document {
        let (fm, body) = FrontMatter::parse(content).unwrap();
        Document::from_parts(
            DocumentKind::Post,
            source,
            &PathBuf::from("/site").join(source),
            fm,
            body,
        )
    }

    #[test]
    fn test_post_from_frontmatter() {
        let doc = post(
            "_posts/2024-11-11-net8.md",
            "---\nlayout: post\ntitle: \"X\"\ndate: 2024-11-11\ntags: C# .Net8\n---\nHello .NET\n",
        );
        assert_eq!(doc.id, "_posts/2024-11-11-net8");
        assert_eq!(doc.slug, "net8");
        assert_eq!(doc.layout.as_deref(), Some("post"));
        assert_eq!(doc.date, NaiveDate::from_ymd_opt(2024, 11, 11));
        assert_eq!(doc.filename_date, doc.date);
        assert_eq!(doc.tag_set(), BTreeSet::from(["C#", ".Net8"]));
        assert_eq!(doc.tag_set().len(), 2);
        assert!(doc.has_body());
        assert_eq!(doc.format, DocumentFormat::Markdown);
    }

    #[test]
    fn test_invalid_date_kept_raw() {
        let doc = post("_posts/2024-01-01-a.md", "---\ndate: someday\n---\nx");
        assert_eq!(doc.date, None);
        assert_eq!(doc.date_raw.as_deref(), Some("someday"));
        assert_eq!(doc.effective_date(), NaiveDate::from_ymd_opt(2024, 1, 1));
    }

    #[test]
    fn test_duplicate_tags() {
        let doc = post("_posts/x.md", "---\ntags: a B a b a\n---\nx");
        assert_eq!(doc.duplicate_tags(), vec!["a"]);
        assert_eq!(doc.tag_set().len(), 3);
    }

    #[test]
    fn test_page_identity() {
        let (fm, body) = FrontMatter::parse("---\nlayout: home\n---\n<h1>Hi</h1>").unwrap();
        let doc = Document::from_parts(
            DocumentKind::Page,
            "index.html",
            Path::new("/site/index.html"),
            fm,
            body,
        );
        assert_eq!(doc.id, "index");
        assert_eq!(doc.slug, "index");
        assert_eq!(doc.format, DocumentFormat::Html);
        assert_eq!(doc.filename_date, None);
        assert_eq!(doc.display_title(), "index");
    }

    #[test]
    fn test_parse_post_identifier() {
        let (date, slug) = parse_post_identifier("2024-11-11-hello-world").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 11, 11).unwrap());
        assert_eq!(slug, "hello-world");
        assert!(parse_post_identifier("hello-world").is_none());
        assert!(parse_post_identifier("2024-13-40-bad").is_none());
    }

    #[test]
    fn test_document_id() {
        assert_eq!(document_id("about.md"), "about");
        assert_eq!(document_id("blog/v1.2/readme"), "blog/v1.2/readme");
        assert_eq!(document_id(".hidden"), ".hidden");
    }
}
