//! Content store - loads posts, drafts and pages from the site directory

use glob::Pattern;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use super::{Document, DocumentKind, FrontMatter, FrontMatterError};
use crate::config::ValidationConfig;
use crate::validate::{self, ValidationReport};
use crate::Site;

/// Errors that stop the whole store from loading
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("site directory not found: {0:?}")]
    SourceMissing(PathBuf),

    #[error("invalid exclude pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("{}", invalid_message(.0))]
    Invalid(ValidationReport),
}

fn invalid_message(report: &ValidationReport) -> String {
    // Issues are sorted by source, so dedup leaves one entry per file
    let mut sources: Vec<&str> = report.errors().map(|i| i.source.as_str()).collect();
    sources.dedup();
    format!(
        "{} document(s) failed validation: {}",
        sources.len(),
        sources.join(", ")
    )
}

/// A file that looked like a document but could not be read or parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    /// Source path relative to the site root
    pub source: String,
    pub error: String,
}

/// All documents of a site, loaded once
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    posts: Vec<Document>,
    drafts: Vec<Document>,
    pages: Vec<Document>,
    failures: Vec<LoadFailure>,
    show_unpublished: bool,
    default_author: String,
}

impl ContentStore {
    /// Load every document under the site directory
    pub fn load(site: &Site) -> Result<Self, StoreError> {
        ContentLoader::new(site)?.load()
    }

    /// Load and reject the site if any document fails validation
    pub fn load_validated(site: &Site) -> Result<Self, StoreError> {
        let store = Self::load(site)?;
        let report = store.validate(&site.config.validation);
        for warning in report.warnings() {
            tracing::warn!("{}", warning);
        }
        if report.has_errors() {
            return Err(StoreError::Invalid(report));
        }
        Ok(store)
    }

    /// Visible documents: posts (newest first), then drafts, then pages
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.posts().chain(self.drafts()).chain(self.pages())
    }

    pub fn posts(&self) -> impl Iterator<Item = &Document> {
        self.visible(&self.posts)
    }

    pub fn drafts(&self) -> impl Iterator<Item = &Document> {
        self.visible(&self.drafts)
    }

    pub fn pages(&self) -> impl Iterator<Item = &Document> {
        self.visible(&self.pages)
    }

    fn visible<'a>(&'a self, docs: &'a [Document]) -> impl Iterator<Item = &'a Document> {
        let show = self.show_unpublished;
        docs.iter().filter(move |d| show || d.published)
    }

    /// Every loaded document, published or not
    fn all(&self) -> impl Iterator<Item = &Document> {
        self.posts
            .iter()
            .chain(self.drafts.iter())
            .chain(self.pages.iter())
    }

    /// Find a document by id (`_posts/2024-11-11-hello`) or source path
    pub fn get(&self, key: &str) -> Option<&Document> {
        let key = key.trim_start_matches("./").replace('\\', "/");
        self.all().find(|d| d.id == key || d.source == key)
    }

    pub fn failures(&self) -> &[LoadFailure] {
        &self.failures
    }

    /// Number of visible documents
    pub fn len(&self) -> usize {
        self.documents().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tag name to the number of posts carrying it
    pub fn tags(&self) -> BTreeMap<String, usize> {
        let mut tags = BTreeMap::new();
        for post in self.posts() {
            for tag in post.tag_set() {
                *tags.entry(tag.to_string()).or_insert(0) += 1;
            }
        }
        tags
    }

    /// Author name to the number of documents written by them
    ///
    /// Documents without an author count for the site's default author,
    /// or are left out when the site has none.
    pub fn authors(&self) -> BTreeMap<String, usize> {
        let mut authors = BTreeMap::new();
        for doc in self.documents() {
            let author = doc
                .author
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .unwrap_or(self.default_author.trim());
            if author.is_empty() {
                continue;
            }
            *authors.entry(author.to_string()).or_insert(0) += 1;
        }
        authors
    }

    /// Check every loaded document and every load failure
    pub fn validate(&self, rules: &ValidationConfig) -> ValidationReport {
        validate::validate(self.all(), &self.failures, rules)
    }
}

/// Walks the site directory and builds a [`ContentStore`]
struct ContentLoader<'a> {
    site: &'a Site,
    exclude: Vec<Pattern>,
    /// Directory part of `dir/**` excludes, so whole trees can be skipped
    exclude_dirs: Vec<Pattern>,
    markdown_ext: Vec<String>,
}

impl<'a> ContentLoader<'a> {
    fn new(site: &'a Site) -> Result<Self, StoreError> {
        let exclude = site
            .config
            .exclude
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| StoreError::InvalidPattern {
                    pattern: p.clone(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let exclude_dirs = site
            .config
            .exclude
            .iter()
            .filter_map(|p| p.strip_suffix("/**"))
            .filter_map(|p| Pattern::new(p).ok())
            .collect();

        Ok(Self {
            site,
            exclude,
            exclude_dirs,
            markdown_ext: site.config.markdown_extensions(),
        })
    }

    fn load(&self) -> Result<ContentStore, StoreError> {
        if !self.site.source_dir.is_dir() {
            return Err(StoreError::SourceMissing(self.site.source_dir.clone()));
        }

        let mut store = ContentStore {
            show_unpublished: self.site.config.show_drafts,
            default_author: self.site.config.author.clone(),
            ..Default::default()
        };

        let site = self.site;
        store.posts =
            self.load_collection(&site.posts_dir, DocumentKind::Post, &mut store.failures);
        if site.config.show_drafts {
            store.drafts =
                self.load_collection(&site.drafts_dir, DocumentKind::Draft, &mut store.failures);
        }
        store.pages = self.load_pages(&mut store.failures);

        // Newest first; undated posts last
        store.posts.sort_by(|a, b| {
            b.effective_date()
                .cmp(&a.effective_date())
                .then_with(|| a.source.cmp(&b.source))
        });
        store.drafts.sort_by(|a, b| a.source.cmp(&b.source));
        store.pages.sort_by(|a, b| a.source.cmp(&b.source));
        store.failures.sort_by(|a, b| a.source.cmp(&b.source));

        tracing::info!(
            "Loaded {} posts, {} drafts and {} pages ({} failed)",
            store.posts.len(),
            store.drafts.len(),
            store.pages.len(),
            store.failures.len()
        );

        Ok(store)
    }

    /// Load every document file in a collection directory (`_posts`, `_drafts`)
    fn load_collection(
        &self,
        dir: &Path,
        kind: DocumentKind,
        failures: &mut Vec<LoadFailure>,
    ) -> Vec<Document> {
        if !dir.is_dir() {
            tracing::debug!("No {} directory at {:?}", kind, dir);
            return Vec::new();
        }

        let mut docs = Vec::new();
        for path in walk_files(dir, is_hidden) {
            if is_hidden(&path) || !self.is_document_file(&path) {
                continue;
            }
            match self.load_document(&path, kind) {
                Ok(doc) => docs.push(doc),
                Err(error) => {
                    tracing::warn!("Failed to load {} {:?}: {}", kind, path, error);
                    failures.push(LoadFailure {
                        source: self.relative(&path),
                        error: error.to_string(),
                    });
                }
            }
        }
        docs
    }

    /// Load standalone pages: document files outside collections and `_`/`.` directories
    fn load_pages(&self, failures: &mut Vec<LoadFailure>) -> Vec<Document> {
        let mut pages = Vec::new();

        for path in walk_files(&self.site.source_dir, |dir| self.is_skipped_dir(dir)) {
            let relative = self.relative(&path);

            if self.in_collection(&path)
                || is_special(&relative)
                || !self.is_document_file(&path)
                || self.is_excluded(&relative)
            {
                continue;
            }

            let content = match fs::read_to_string(&path) {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!("Failed to read page {:?}: {}", path, e);
                    failures.push(LoadFailure {
                        source: relative,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            // Without front matter a file is a static asset, not a page
            if !FrontMatter::is_present(&content) {
                tracing::debug!("Skipping static file {}", relative);
                continue;
            }

            match FrontMatter::parse(&content) {
                Ok((fm, body)) => pages.push(Document::from_parts(
                    DocumentKind::Page,
                    &relative,
                    &path,
                    fm,
                    body,
                )),
                Err(e) => {
                    tracing::warn!("Failed to load page {:?}: {}", path, e);
                    failures.push(LoadFailure {
                        source: relative,
                        error: e.to_string(),
                    });
                }
            }
        }

        pages
    }

    /// Load a single document from a file
    fn load_document(&self, path: &Path, kind: DocumentKind) -> anyhow::Result<Document> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content).map_err(|e| match e {
            FrontMatterError::Missing => anyhow::anyhow!("{} has no front matter", kind),
            other => other.into(),
        })?;
        Ok(Document::from_parts(
            kind,
            &self.relative(path),
            path,
            fm,
            body,
        ))
    }

    fn is_document_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let e = e.to_ascii_lowercase();
                e == "html" || e == "htm" || self.markdown_ext.contains(&e)
            })
            .unwrap_or(false)
    }

    fn is_excluded(&self, relative: &str) -> bool {
        self.exclude.iter().any(|p| p.matches(relative))
    }

    /// Whether a path lies in the posts or drafts directory
    fn in_collection(&self, path: &Path) -> bool {
        path.starts_with(&self.site.posts_dir) || path.starts_with(&self.site.drafts_dir)
    }

    /// Directories the page walk never descends into
    fn is_skipped_dir(&self, dir: &Path) -> bool {
        let relative = self.relative(dir);
        self.in_collection(dir)
            || is_special(&relative)
            || self.is_excluded(&relative)
            || self.exclude_dirs.iter().any(|p| p.matches(&relative))
    }

    /// Path relative to the site root, `/`-separated
    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.site.source_dir)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Regular files under a directory, in a stable order
///
/// Subdirectories for which `skip_dir` holds are not descended into.
fn walk_files<F>(dir: &Path, mut skip_dir: F) -> impl Iterator<Item = PathBuf>
where
    F: FnMut(&Path) -> bool,
{
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |e| {
            e.depth() == 0 || !(e.file_type().is_dir() && skip_dir(e.path()))
        })
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        // Linked files are read, linked directories are not walked
        .filter(|e| e.file_type().is_file() || (e.path_is_symlink() && e.path().is_file()))
        .map(|e| e.into_path())
}

/// Whether any component of a relative path starts with `_` or `.`
fn is_special(relative: &str) -> bool {
    relative
        .split('/')
        .any(|c| c.starts_with('_') || c.starts_with('.'))
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}
