//! ABOUTME: URL normalization for the crawler frontier's dedup set (spec §4.F)

use url::Url;

/// Normalize a URL for deduplication: lowercase scheme, strip the default
/// port, remove the fragment, canonicalize a trailing slash on the path.
#[must_use]
pub fn normalize(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw).ok()?;
    url.set_fragment(None);

    let default_port = match url.scheme() {
        "http" => Some(80),
        "https" => Some(443),
        _ => None,
    };
    if url.port() == default_port {
        let _ = url.set_port(None);
    }

    if url.path().len() > 1 && url.path().ends_with('/') {
        let trimmed = url.path().trim_end_matches('/').to_string();
        url.set_path(&trimmed);
    }

    Some(url.to_string())
}

/// The registrable domain (eTLD+1-ish: last two labels) used by
/// `follow_external=false` to restrict the crawl to the seed's site.
#[must_use]
pub fn registrable_domain(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let host = url.host_str()?;
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= 2 {
        Some(host.to_string())
    } else {
        Some(labels[labels.len() - 2..].join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_default_port_and_fragment() {
        assert_eq!(
            normalize("https://Example.com:443/docs#section").unwrap(),
            "https://example.com/docs"
        );
    }

    #[test]
    fn keeps_non_default_port() {
        assert_eq!(normalize("http://example.com:8080/x").unwrap(), "http://example.com:8080/x");
    }

    #[test]
    fn canonicalizes_trailing_slash() {
        assert_eq!(normalize("https://example.com/docs/").unwrap(), "https://example.com/docs");
    }

    #[test]
    fn root_path_trailing_slash_kept() {
        assert_eq!(normalize("https://example.com/").unwrap(), "https://example.com/");
    }

    #[test]
    fn registrable_domain_strips_subdomain() {
        assert_eq!(registrable_domain("https://docs.example.com/x").unwrap(), "example.com");
    }
}
