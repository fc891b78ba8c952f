//! Initialize a new site

use anyhow::Result;
use chrono::NaiveDate;
use std::fs;
use std::path::Path;

const CONFIG: &str = r#"# Site
title: My Site
description: ''
author: ''
url: http://example.com

# Directories
source: .
posts_dir: _posts
drafts_dir: _drafts
show_drafts: false
markdown_ext: markdown,mkdown,mkdn,mkd,md
exclude:
  - README.md
  - Gemfile
  - Gemfile.lock
  - vendor/**
  - node_modules/**

# Writing
excerpt_separator: "<!-- more -->"
default_layout: post
date_format: YYYY-MM-DD
highlight:
  theme: base16-ocean.dark
  line_number: false

# Checks
validation:
  require_author: false
  filename_date: warn
"#;

const HOME: &str = r#"---
layout: home
title: "Home"
---
Welcome to my site. The latest posts are listed below.
"#;

const ABOUT: &str = r#"---
layout: page
title: "About"
---
A few words about who writes here and why.
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    init_site_on(target_dir, chrono::Local::now().date_naive())
}

/// Initialize a site whose sample post is dated `today`
pub fn init_site_on(target_dir: &Path, today: NaiveDate) -> Result<()> {
    if target_dir.join("_config.yml").exists() {
        anyhow::bail!("A site already exists in {:?}", target_dir);
    }

    // Create directory structure
    fs::create_dir_all(target_dir.join("_posts"))?;
    fs::create_dir_all(target_dir.join("_drafts"))?;

    let sample_post = format!(
        r#"---
layout: post
title: "Welcome"
date: {date}
tags: meta
---
This is the first post. Posts live in `_posts/` and are named
`YYYY-MM-DD-slug.md`; the date in the name should match the `date` above.

<!-- more -->

Run `folio check` to validate every document's front matter.
"#,
        date = today.format("%Y-%m-%d")
    );

    let files = [
        ("_config.yml".to_string(), CONFIG.to_string()),
        ("index.md".to_string(), HOME.to_string()),
        ("about.md".to_string(), ABOUT.to_string()),
        (
            format!("_posts/{}-welcome.md", today.format("%Y-%m-%d")),
            sample_post,
        ),
    ];

    for (relative, content) in files {
        let path = target_dir.join(&relative);
        if path.exists() {
            tracing::warn!("Keeping existing {:?}", path);
            continue;
        }
        fs::write(&path, content)?;
        tracing::debug!("Wrote {:?}", path);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationConfig;
    use crate::Site;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_a_valid_site() {
        let dir = TempDir::new().unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 11, 11).unwrap();
        init_site_on(dir.path(), today).unwrap();

        assert!(dir.path().join("_drafts").is_dir());
        let site = Site::new(dir.path()).unwrap();
        assert_eq!(site.config.validation, ValidationConfig::default());

        let store = site.load_validated().unwrap();
        assert_eq!(store.posts().count(), 1);
        assert_eq!(store.pages().count(), 2);
        let post = store.get("_posts/2024-11-11-welcome").unwrap();
        assert_eq!(post.tags, vec!["meta"]);
    }

    #[test]
    fn test_init_refuses_existing_site() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("_config.yml"), "title: Mine\n").unwrap();
        assert!(init_site(dir.path()).is_err());
        assert_eq!(
            fs::read_to_string(dir.path().join("_config.yml")).unwrap(),
            "title: Mine\n"
        );
    }

    #[test]
    fn test_init_keeps_existing_pages() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("about.md"), "mine").unwrap();
        init_site(dir.path()).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("about.md")).unwrap(),
            "mine"
        );
    }
}
