//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub url: String,

    // Directory
    pub source: String,
    pub posts_dir: String,
    pub drafts_dir: String,
    pub show_drafts: bool,
    pub markdown_ext: String,
    #[serde(default)]
    pub exclude: Vec<String>,

    // Writing
    pub excerpt_separator: String,
    pub default_layout: String,
    pub date_format: String,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Checks
    #[serde(default)]
    pub validation: ValidationConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Site".to_string(),
            description: String::new(),
            author: String::new(),
            url: "http://example.com".to_string(),

            source: ".".to_string(),
            posts_dir: "_posts".to_string(),
            drafts_dir: "_drafts".to_string(),
            show_drafts: false,
            markdown_ext: "markdown,mkdown,mkdn,mkd,md".to_string(),
            exclude: default_exclude(),

            excerpt_separator: "<!-- more -->".to_string(),
            default_layout: "post".to_string(),
            date_format: "YYYY-MM-DD".to_string(),
            highlight: HighlightConfig::default(),

            validation: ValidationConfig::default(),
            extra: HashMap::new(),
        }
    }
}

fn default_exclude() -> Vec<String> {
    [
        "README.md",
        "CHANGELOG.md",
        "LICENSE.md",
        "Gemfile",
        "Gemfile.lock",
        "vendor/**",
        "node_modules/**",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;

        // An empty or comment-only _config.yml has no mapping to deserialize
        let has_entries = content.lines().any(|line| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#') && line != "---"
        });
        if !has_entries {
            return Ok(Self::default());
        }

        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(config)
    }

    /// Markdown file extensions, lowercased and without leading dots
    pub fn markdown_extensions(&self) -> Vec<String> {
        self.markdown_ext
            .split(',')
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect()
    }
}

/// Code highlighting for body previews
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

/// How a post's identifier date is checked against its front matter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FilenameDateRule {
    /// Report problems as warnings
    #[default]
    Warn,
    /// Report problems as errors
    Error,
    /// Skip the check
    Off,
}

/// Validation rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ValidationConfig {
    /// Every document must name an author
    pub require_author: bool,
    pub filename_date: FilenameDateRule,
}
