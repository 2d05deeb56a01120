use url::Url;

/// Resolves a link href to an absolute http(s) URL
///
/// Returns None if the link cannot lead to a page or file:
/// - empty hrefs and fragment-only anchors
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - hrefs that do not parse against the base URL
/// - non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://xenabrowser.net/datapages/?hub=https://tcga.xenahubs.net:443").unwrap()
    }

    #[test]
    fn test_absolute_link() {
        let url = resolve_link("https://other.org/file.gz", &base_url()).unwrap();
        assert_eq!(url.as_str(), "https://other.org/file.gz");
    }

    #[test]
    fn test_query_only_link_keeps_path() {
        let url = resolve_link("?cohort=TCGA%20Breast%20Cancer", &base_url()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://xenabrowser.net/datapages/?cohort=TCGA%20Breast%20Cancer"
        );
    }

    #[test]
    fn test_root_relative_link() {
        let url = resolve_link("/download/file.gz", &base_url()).unwrap();
        assert_eq!(url.as_str(), "https://xenabrowser.net/download/file.gz");
    }

    #[test]
    fn test_skipped_schemes() {
        for href in [
            "javascript:void(0)",
            "JavaScript:alert(1)",
            "mailto:someone@example.org",
            "tel:+1234567890",
            "data:text/html,<h1>x</h1>",
        ] {
            assert!(resolve_link(href, &base_url()).is_none(), "{}", href);
        }
    }

    #[test]
    fn test_skip_fragment_and_empty() {
        assert!(resolve_link("#section", &base_url()).is_none());
        assert!(resolve_link("   ", &base_url()).is_none());
    }

    #[test]
    fn test_skip_non_http_scheme() {
        assert!(resolve_link("ftp://files.example.org/a.gz", &base_url()).is_none());
    }
}
