//! folio: a content store and front-matter validator for personal sites
//!
//! A site is a directory of documents (posts, drafts, pages), each a
//! markdown or HTML body preceded by a YAML front-matter block. This crate
//! loads those documents, exposes their metadata and bodies, and checks them
//! against the front-matter conventions the site's renderer relies on.

pub mod commands;
pub mod config;
pub mod content;
pub mod helpers;
pub mod validate;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// The main site handle
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory (holds `_config.yml`)
    pub base_dir: PathBuf,
    /// Root of the site's documents
    pub source_dir: PathBuf,
    /// Post collection directory
    pub posts_dir: PathBuf,
    /// Draft collection directory
    pub drafts_dir: PathBuf,
}

impl Site {
    /// Create a new site handle from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };

        // Collecting components drops interior `.` segments
        let source_dir: PathBuf = base_dir.join(&config.source).components().collect();
        let posts_dir = source_dir.join(&config.posts_dir);
        let drafts_dir = source_dir.join(&config.drafts_dir);

        Ok(Self {
            config,
            base_dir,
            source_dir,
            posts_dir,
            drafts_dir,
        })
    }

    /// Load every document of the site
    pub fn load(&self) -> Result<content::ContentStore> {
        Ok(content::ContentStore::load(self)?)
    }

    /// Load the site, failing if any document breaks the conventions
    pub fn load_validated(&self) -> Result<content::ContentStore> {
        Ok(content::ContentStore::load_validated(self)?)
    }

    /// Validate the site
    pub fn check(&self, strict: bool) -> Result<validate::ValidationReport> {
        commands::check::run(self, strict)
    }

    /// Create a new document
    pub fn new_document(&self, title: &str, layout: Option<&str>) -> Result<PathBuf> {
        let layout = layout.unwrap_or(&self.config.default_layout);
        let options = commands::new::NewOptions::default();
        commands::new::create_document(self, title, layout, &options)
    }
}
