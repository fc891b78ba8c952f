//! Front-matter validation
//!
//! Every document is checked against the site's conventions: required
//! metadata, parseable dates, a non-empty body, unique tags and, for posts,
//! agreement between the identifier date and the front-matter date. Files
//! that could not be loaded at all are reported alongside.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::config::{FilenameDateRule, ValidationConfig};
use crate::content::Document;
use crate::content::LoadFailure;

/// How serious an issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// What is wrong with a document
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("`date` is not a valid calendar date: {raw:?}")]
    InvalidDate { raw: String },

    #[error("body is empty")]
    EmptyBody,

    #[error("tag `{tag}` is listed more than once")]
    DuplicateTag { tag: String },

    #[error("file name date {filename} disagrees with front-matter date {front_matter}")]
    DateMismatch {
        filename: NaiveDate,
        front_matter: NaiveDate,
    },

    #[error("post file name does not start with a YYYY-MM-DD- date")]
    MissingIdentifierDate,

    #[error("could not be loaded: {message}")]
    LoadFailed { message: String },
}

impl IssueKind {
    pub fn missing(field: &'static str) -> Self {
        IssueKind::MissingField { field }
    }
}

/// A single finding against one source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub source: String,
    pub severity: Severity,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.source, self.kind)
    }
}

/// All issues found in a site
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    issues: Vec<Issue>,
    /// Number of documents checked
    pub checked: usize,
}

impl ValidationReport {
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues reported against one source file
    pub fn for_source<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a Issue> {
        self.issues.iter().filter(move |i| i.source == source)
    }

    /// Treat every warning as an error (strict mode)
    pub fn promote_warnings(mut self) -> Self {
        for issue in &mut self.issues {
            issue.severity = Severity::Error;
        }
        self
    }

    /// One-line summary, e.g. "12 documents checked: 1 error, 2 warnings"
    pub fn summary(&self) -> String {
        let errors = self.errors().count();
        let warnings = self.warnings().count();
        format!(
            "{} document{} checked: {} error{}, {} warning{}",
            self.checked,
            plural(self.checked),
            errors,
            plural(errors),
            warnings,
            plural(warnings)
        )
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for issue in &self.issues {
            writeln!(f, "{}", issue)?;
        }
        write!(f, "{}", self.summary())
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Check a single document
pub fn validate_document(doc: &Document, rules: &ValidationConfig) -> Vec<Issue> {
    let mut kinds: Vec<(Severity, IssueKind)> = Vec::new();

    if is_blank(doc.layout.as_deref()) {
        kinds.push((Severity::Error, IssueKind::missing("layout")));
    }
    if is_blank(doc.title.as_deref()) {
        kinds.push((Severity::Error, IssueKind::missing("title")));
    }

    match (&doc.date_raw, doc.date) {
        (Some(raw), None) => kinds.push((
            Severity::Error,
            IssueKind::InvalidDate { raw: raw.clone() },
        )),
        (None, _) if doc.is_post() => {
            kinds.push((Severity::Error, IssueKind::missing("date")));
        }
        _ => {}
    }

    if rules.require_author && is_blank(doc.author.as_deref()) {
        kinds.push((Severity::Error, IssueKind::missing("author")));
    }

    if !doc.has_body() {
        kinds.push((Severity::Error, IssueKind::EmptyBody));
    }

    for tag in doc.duplicate_tags() {
        kinds.push((
            Severity::Error,
            IssueKind::DuplicateTag {
                tag: tag.to_string(),
            },
        ));
    }

    if doc.is_post() {
        let severity = match rules.filename_date {
            FilenameDateRule::Warn => Some(Severity::Warning),
            FilenameDateRule::Error => Some(Severity::Error),
            FilenameDateRule::Off => None,
        };
        if let Some(severity) = severity {
            match (doc.filename_date, doc.date) {
                (None, _) => kinds.push((severity, IssueKind::MissingIdentifierDate)),
                (Some(filename), Some(front_matter)) if filename != front_matter => {
                    kinds.push((
                        severity,
                        IssueKind::DateMismatch {
                            filename,
                            front_matter,
                        },
                    ));
                }
                _ => {}
            }
        }
    }

    kinds
        .into_iter()
        .map(|(severity, kind)| Issue {
            source: doc.source.clone(),
            severity,
            kind,
        })
        .collect()
}

/// Check a set of documents and the files that failed to load
pub fn validate<'a, I>(
    documents: I,
    failures: &[LoadFailure],
    rules: &ValidationConfig,
) -> ValidationReport
where
    I: IntoIterator<Item = &'a Document>,
{
    let mut report = ValidationReport::default();

    for doc in documents {
        report.checked += 1;
        report.issues.extend(validate_document(doc, rules));
    }

    for failure in failures {
        report.checked += 1;
        report.issues.push(Issue {
            source: failure.source.clone(),
            severity: Severity::Error,
            kind: IssueKind::LoadFailed {
                message: failure.error.clone(),
            },
        });
    }

    // Stable: rule order is kept within a file
    report.issues.sort_by(|a, b| a.source.cmp(&b.source));

    tracing::debug!("{}", report.summary());
    report
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{DocumentKind, FrontMatter};
    use std::path::Path;

    fn doc(kind: DocumentKind, source: &str, content: &str) -> Document {
        let (fm, body) = FrontMatter::parse(content).unwrap();
        Document::from_parts(kind, source, &Path::new("/site").join(source), fm, body)
    }

    fn kinds(issues: &[Issue]) -> Vec<&IssueKind> {
        issues.iter().map(|i| &i.kind).collect()
    }

    #[test]
    fn test_valid_post() {
        let post = doc(
            DocumentKind::Post,
            "_posts/2024-11-11-net8.md",
            "---\nlayout: post\ntitle: \"X\"\ndate: 2024-11-11\ntags: C# .Net8\n---\nBody\n",
        );
        assert!(validate_document(&post, &ValidationConfig::default()).is_empty());
    }

    #[test]
    fn test_missing_title_is_an_error() {
        let page = doc(DocumentKind::Page, "about.md", "---\nlayout: page\n---\nAbout me\n");
        let issues = validate_document(&page, &ValidationConfig::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
        assert_eq!(issues[0].kind, IssueKind::missing("title"));
        assert_eq!(issues[0].source, "about.md");
    }

    #[test]
    fn test_blank_fields_count_as_missing() {
        let page = doc(DocumentKind::Page, "a.md", "---\nlayout: \" \"\ntitle: \"\"\n---\nx\n");
        let issues = validate_document(&page, &ValidationConfig::default());
        assert_eq!(
            kinds(&issues),
            vec![&IssueKind::missing("layout"), &IssueKind::missing("title")]
        );
    }

    #[test]
    fn test_post_requires_date_but_page_does_not() {
        let content = "---\nlayout: x\ntitle: T\n---\nx\n";
        let post = doc(DocumentKind::Post, "_posts/2024-01-01-a.md", content);
        let page = doc(DocumentKind::Page, "a.md", content);
        let draft = doc(DocumentKind::Draft, "_drafts/a.md", content);
        let rules = ValidationConfig::default();

        assert_eq!(
            kinds(&validate_document(&post, &rules)),
            vec![&IssueKind::missing("date")]
        );
        assert!(validate_document(&page, &rules).is_empty());
        assert!(validate_document(&draft, &rules).is_empty());
    }

    #[test]
    fn test_invalid_date() {
        let page = doc(
            DocumentKind::Page,
            "a.md",
            "---\nlayout: x\ntitle: T\ndate: 2024-02-30\n---\nx\n",
        );
        let issues = validate_document(&page, &ValidationConfig::default());
        assert_eq!(
            kinds(&issues),
            vec![&IssueKind::InvalidDate {
                raw: "2024-02-30".to_string()
            }]
        );
    }

    #[test]
    fn test_empty_body_and_duplicate_tags() {
        let page = doc(
            DocumentKind::Page,
            "a.md",
            "---\nlayout: x\ntitle: T\ntags: rust Rust rust\n---\n  \n\n",
        );
        let issues = validate_document(&page, &ValidationConfig::default());
        assert_eq!(
            kinds(&issues),
            vec![
                &IssueKind::EmptyBody,
                &IssueKind::DuplicateTag {
                    tag: "rust".to_string()
                }
            ]
        );
    }

    #[test]
    fn test_require_author() {
        let page = doc(DocumentKind::Page, "a.md", "---\nlayout: x\ntitle: T\n---\nx\n");
        let rules = ValidationConfig {
            require_author: true,
            ..Default::default()
        };
        assert_eq!(
            kinds(&validate_document(&page, &rules)),
            vec![&IssueKind::missing("author")]
        );
    }

    #[test]
    fn test_filename_date_rules() {
        let post = doc(
            DocumentKind::Post,
            "_posts/2024-11-10-a.md",
            "---\nlayout: x\ntitle: T\ndate: 2024-11-11\n---\nx\n",
        );
        let mismatch = IssueKind::DateMismatch {
            filename: NaiveDate::from_ymd_opt(2024, 11, 10).unwrap(),
            front_matter: NaiveDate::from_ymd_opt(2024, 11, 11).unwrap(),
        };

        let warn = validate_document(&post, &ValidationConfig::default());
        assert_eq!(warn.len(), 1);
        assert_eq!(warn[0].severity, Severity::Warning);
        assert_eq!(warn[0].kind, mismatch);

        let error = validate_document(
            &post,
            &ValidationConfig {
                filename_date: FilenameDateRule::Error,
                ..Default::default()
            },
        );
        assert_eq!(error[0].severity, Severity::Error);

        let off = validate_document(
            &post,
            &ValidationConfig {
                filename_date: FilenameDateRule::Off,
                ..Default::default()
            },
        );
        assert!(off.is_empty());
    }

    #[test]
    fn test_post_without_identifier_date() {
        let post = doc(
            DocumentKind::Post,
            "_posts/hello.md",
            "---\nlayout: x\ntitle: T\ndate: 2024-11-11\n---\nx\n",
        );
        let issues = validate_document(&post, &ValidationConfig::default());
        assert_eq!(kinds(&issues), vec![&IssueKind::MissingIdentifierDate]);
        assert_eq!(issues[0].severity, Severity::Warning);
    }

    #[test]
    fn test_report() {
        let good = doc(DocumentKind::Page, "b.md", "---\nlayout: x\ntitle: T\n---\nx\n");
        let bad = doc(DocumentKind::Page, "a.md", "---\nlayout: x\n---\nx\n");
        let failures = vec![LoadFailure {
            source: "_posts/broken.md".to_string(),
            error: "front matter is not closed by a `---` line".to_string(),
        }];

        let report = validate([&good, &bad], &failures, &ValidationConfig::default());
        assert_eq!(report.checked, 3);
        assert!(report.has_errors());
        assert_eq!(report.errors().count(), 2);
        let sources: Vec<_> = report.issues().iter().map(|i| i.source.as_str()).collect();
        assert_eq!(sources, vec!["_posts/broken.md", "a.md"]);
        assert_eq!(report.for_source("b.md").count(), 0);
        assert_eq!(report.summary(), "3 documents checked: 2 errors, 0 warnings");
    }

    #[test]
    fn test_promote_warnings() {
        let post = doc(
            DocumentKind::Post,
            "_posts/hello.md",
            "---\nlayout: x\ntitle: T\ndate: 2024-11-11\n---\nx\n",
        );
        let report = validate([&post], &[], &ValidationConfig::default());
        assert!(!report.has_errors());
        assert!(!report.is_clean());

        let strict = report.promote_warnings();
        assert!(strict.has_errors());
        assert_eq!(strict.warnings().count(), 0);
        assert_eq!(
            strict.issues()[0].to_string(),
            "error: _posts/hello.md: post file name does not start with a YYYY-MM-DD- date"
        );
    }
}
