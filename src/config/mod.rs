//! Configuration module

mod site;

pub use site::FilenameDateRule;
pub use site::HighlightConfig;
pub use site::SiteConfig;
pub use site::ValidationConfig;
