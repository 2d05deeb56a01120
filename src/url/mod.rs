//! URL helpers for Xena-Harvest
//!
//! Link resolution for scraped hrefs and local file naming for downloads.

mod file_name;
mod resolve;

pub use file_name::{derive_file_name, partial_path, PARTIAL_SUFFIX};
pub use resolve::resolve_link;
