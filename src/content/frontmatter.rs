//! Front-matter parsing

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};
use thiserror::Error;

lazy_static! {
    static ref YAML_LOCATION: Regex = Regex::new(r" at (line \d+ column \d+|position \d+)")
        .expect("location pattern is valid");
}

/// Errors raised while splitting or deserializing a front-matter block
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrontMatterError {
    #[error("no front matter: the first line is not `---`")]
    Missing,

    #[error("front matter is not closed by a `---` line")]
    Unterminated,

    #[error("front matter must be a mapping of keys to values")]
    NotAMapping,

    #[error("invalid front matter{}: {message}", at_line(.line))]
    Yaml {
        /// File line of the offending entry, when it can be pinned down
        line: Option<usize>,
        message: String,
    },
}

fn at_line(line: &Option<usize>) -> String {
    line.map(|l| format!(" at line {}", l)).unwrap_or_default()
}

/// Render a YAML scalar the way an author would have written it
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Deserialize any YAML scalar into a string; null becomes `None`
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(None),
        other => scalar_to_string(&other)
            .map(Some)
            .ok_or_else(|| de::Error::custom("expected a single value, not a list or mapping")),
    }
}

/// Deserialize a whitespace-separated string or a list of scalars
///
/// Both forms render numbers and booleans the same way, so `tags: 2.0`
/// and `tags: [2.0]` agree.
fn words_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => Ok(s.split_whitespace().map(str::to_string).collect()),
        Value::Sequence(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(|item| {
                scalar_to_string(item)
                    .ok_or_else(|| de::Error::custom("list entries must be single values"))
            })
            .collect(),
        other => scalar_to_string(&other)
            .map(|s| vec![s])
            .ok_or_else(|| de::Error::custom("expected a space-separated string or a list")),
    }
}

/// Front-matter data from a post or page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(deserialize_with = "scalar_string")]
    pub layout: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub date: Option<String>,
    #[serde(deserialize_with = "words_or_list", alias = "tag")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "words_or_list", alias = "category")]
    pub categories: Vec<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub author: Option<String>,
    /// Documents are published unless they opt out
    pub published: bool,

    /// Any other keys, in the order they were written
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            layout: None,
            title: None,
            date: None,
            tags: Vec::new(),
            categories: Vec::new(),
            author: None,
            published: true,
            extra: IndexMap::new(),
        }
    }
}

impl FrontMatter {
    /// Parse front matter from file content
    /// Returns (front_matter, body)
    pub fn parse(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let (yaml, body) = split(content)?;

        if yaml.lines().all(|l| {
            let l = l.trim();
            l.is_empty() || l.starts_with('#')
        }) {
            return Ok((FrontMatter::default(), body));
        }

        // Parse untyped first so a scalar or list block is told apart from a bad key
        let value: Value = serde_yaml::from_str(yaml).map_err(|e| syntax_error(&e))?;
        let Value::Mapping(mapping) = value else {
            return Err(FrontMatterError::NotAMapping);
        };

        match serde_yaml::from_value::<FrontMatter>(Value::Mapping(mapping.clone())) {
            Ok(fm) => Ok((fm, body)),
            Err(e) => Err(field_error(yaml, &mapping, &e)),
        }
    }

    /// Check whether content starts with a front-matter delimiter
    pub fn is_present(content: &str) -> bool {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        content
            .lines()
            .next()
            .map(|l| l.trim_end() == "---")
            .unwrap_or(false)
    }
}

/// Split content into the raw front-matter block and the body
fn split(content: &str) -> Result<(&str, &str), FrontMatterError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let Some((first, rest)) = split_line(content) else {
        return Err(FrontMatterError::Missing);
    };
    if first.trim_end() != "---" {
        return Err(FrontMatterError::Missing);
    }

    let mut offset = 0;
    let mut remaining = rest;
    while let Some((line, after)) = split_line(remaining) {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            return Ok((&rest[..offset], after));
        }
        offset += remaining.len() - after.len();
        remaining = after;
    }

    Err(FrontMatterError::Unterminated)
}

/// Split off the first line; the returned line excludes its terminator
fn split_line(s: &str) -> Option<(&str, &str)> {
    if s.is_empty() {
        return None;
    }
    match s.find('\n') {
        Some(pos) => Some((s[..pos].trim_end_matches('\r'), &s[pos + 1..])),
        None => Some((s, "")),
    }
}

/// A YAML syntax error, located in the file rather than the block
fn syntax_error(e: &serde_yaml::Error) -> FrontMatterError {
    // Block line 1 is file line 2, after the opening delimiter
    FrontMatterError::Yaml {
        line: e.location().map(|l| l.line() + 1),
        message: strip_location(&e.to_string()),
    }
}

/// Pin a typed error on the first key whose value fails on its own
fn field_error(yaml: &str, mapping: &Mapping, error: &serde_yaml::Error) -> FrontMatterError {
    for (key, value) in mapping {
        let mut single = Mapping::new();
        single.insert(key.clone(), value.clone());
        if let Err(e) = serde_yaml::from_value::<FrontMatter>(Value::Mapping(single)) {
            let key = scalar_to_string(key).unwrap_or_default();
            return FrontMatterError::Yaml {
                line: key_line(yaml, &key),
                message: format!("{}: {}", key, strip_location(&e.to_string())),
            };
        }
    }

    FrontMatterError::Yaml {
        line: None,
        message: strip_location(&error.to_string()),
    }
}

/// File line of a top-level key, counting the opening delimiter
fn key_line(yaml: &str, key: &str) -> Option<usize> {
    yaml.lines()
        .position(|l| {
            l.strip_prefix(key)
                .map(|rest| rest.trim_start().starts_with(':'))
                .unwrap_or(false)
        })
        .map(|i| i + 2)
}

/// Drop serde_yaml's block-relative positions from a message
fn strip_location(message: &str) -> String {
    YAML_LOCATION.replace_all(message, "").into_owned()
}
