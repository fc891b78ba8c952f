//! Content module - documents, front matter and the content store

mod document;
mod frontmatter;
pub mod loader;
mod markdown;

pub use document::{parse_post_identifier, Document, DocumentFormat, DocumentKind};
pub use frontmatter::{FrontMatter, FrontMatterError};
pub use loader::{ContentStore, LoadFailure, StoreError};
pub use markdown::{word_count, MarkdownRenderer};
