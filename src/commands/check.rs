//! Validate the site's documents

use anyhow::Result;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::validate::ValidationReport;
use crate::Site;

/// Load the site and validate every document
pub fn run(site: &Site, strict: bool) -> Result<ValidationReport> {
    let store = site.load()?;
    let report = store.validate(&site.config.validation);
    Ok(if strict {
        report.promote_warnings()
    } else {
        report
    })
}

/// Print the report, failing when it contains errors
pub fn report(site: &Site, strict: bool) -> Result<()> {
    let report = run(site, strict)?;
    println!("{}", report);
    if report.has_errors() {
        anyhow::bail!("{}", report.summary());
    }
    Ok(())
}

/// Re-check the site whenever a file under it changes
pub async fn watch(base_dir: PathBuf, strict: bool) -> Result<()> {
    tokio::task::spawn_blocking(move || watch_blocking(&base_dir, strict)).await?
}

fn watch_blocking(base_dir: &Path, strict: bool) -> Result<()> {
    let site = Site::new(base_dir)?;
    let config_path = base_dir.join("_config.yml");

    let (tx, rx) = std::sync::mpsc::channel();

    // Editors write in bursts; one check per burst
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    debouncer
        .watcher()
        .watch(&site.source_dir, RecursiveMode::Recursive)?;
    tracing::debug!("Watching: {:?}", site.source_dir);

    if config_path.exists() && !config_path.starts_with(&site.source_dir) {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", config_path);
    }

    println!("Watching for changes. Press Ctrl+C to stop.");

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed: Vec<_> = events
                    .iter()
                    .filter(|e| is_relevant(&e.path))
                    .collect();

                if changed.is_empty() {
                    continue;
                }

                println!();
                for event in &changed {
                    println!("File changed: {}", event.path.display());
                }

                // The config may have changed too, so start from scratch
                match Site::new(base_dir).and_then(|site| report(&site, strict)) {
                    Ok(()) => println!("All documents valid."),
                    Err(e) => tracing::error!("{}", e),
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Ignore VCS internals, build output and editor droppings
fn is_relevant(path: &Path) -> bool {
    let in_ignored_dir = path.components().any(|c| {
        let c = c.as_os_str();
        c == ".git" || c == "_site" || c == ".jekyll-cache" || c == "node_modules"
    });
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    !in_ignored_dir
        && name != ".DS_Store"
        && !name.ends_with('~')
        && !name.ends_with(".swp")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{IssueKind, Severity};
    use std::fs;
    use tempfile::TempDir;

    fn site_with(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (path, content) in files {
            let path = dir.path().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        dir
    }

    #[test]
    fn test_clean_site() {
        let dir = site_with(&[(
            "_posts/2024-11-11-a.md",
            "---\nlayout: post\ntitle: A\ndate: 2024-11-11\n---\nBody\n",
        )]);
        let site = Site::new(dir.path()).unwrap();
        let report = run(&site, true).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.checked, 1);
        assert!(super::report(&site, true).is_ok());
    }

    #[test]
    fn test_strict_mode_promotes_warnings() {
        let dir = site_with(&[(
            "_posts/2024-11-10-a.md",
            "---\nlayout: post\ntitle: A\ndate: 2024-11-11\n---\nBody\n",
        )]);
        let site = Site::new(dir.path()).unwrap();

        let lenient = run(&site, false).unwrap();
        assert_eq!(lenient.warnings().count(), 1);
        assert!(super::report(&site, false).is_ok());

        let strict = run(&site, true).unwrap();
        assert_eq!(strict.issues()[0].severity, Severity::Error);
        assert!(matches!(
            strict.issues()[0].kind,
            IssueKind::DateMismatch { .. }
        ));
        assert!(super::report(&site, true).is_err());
    }

    #[test]
    fn test_errors_fail_the_check() {
        let dir = site_with(&[("about.md", "---\ntitle: About\n---\n")]);
        let site = Site::new(dir.path()).unwrap();
        let report = run(&site, false).unwrap();
        let kinds: Vec<_> = report.issues().iter().map(|i| &i.kind).collect();
        assert_eq!(
            kinds,
            vec![&IssueKind::missing("layout"), &IssueKind::EmptyBody]
        );
        let err = super::report(&site, false).unwrap_err();
        assert_eq!(err.to_string(), "1 document checked: 2 errors, 0 warnings");
    }

    #[test]
    fn test_is_relevant() {
        assert!(is_relevant(Path::new("/site/_posts/2024-01-01-a.md")));
        assert!(is_relevant(Path::new("/site/_config.yml")));
        assert!(!is_relevant(Path::new("/site/.git/index")));
        assert!(!is_relevant(Path::new("/site/_site/index.html")));
        assert!(!is_relevant(Path::new("/site/about.md~")));
        assert!(!is_relevant(Path::new("/site/.about.md.swp")));
    }
}
