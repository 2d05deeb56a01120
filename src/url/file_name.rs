use std::path::{Path, PathBuf};
use url::Url;

/// Suffix of the file a download is streamed into before it completes
pub const PARTIAL_SUFFIX: &str = ".part";

/// Derives the local file name of a download from its URL
///
/// The name is the last non-empty path segment exactly as it appears in
/// the URL. Percent-escapes are kept, so `sampleMap%2FHiSeqV2_PANCAN.gz`
/// stays one flat name inside the destination directory. Query string and
/// fragment play no part, so the same URL always maps to the same file.
///
/// # Returns
///
/// * `Some(String)` - The file name
/// * `None` - The URL has no usable final segment (e.g. `https://host/`)
///
/// # Example
///
/// ```
/// use url::Url;
/// use xena_harvest::url::derive_file_name;
///
/// let url = Url::parse("https://host/path/to/file_A.gz").unwrap();
/// assert_eq!(derive_file_name(&url), Some("file_A.gz".to_string()));
/// ```
pub fn derive_file_name(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).last()?;

    if segment == "." || segment == ".." {
        return None;
    }

    Some(segment.to_string())
}

/// Returns the in-progress path for a destination file (`name.gz.part`)
pub fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(PARTIAL_SUFFIX);
    destination.with_file_name(name)
}
