//! ABOUTME: HTML extraction — title, body text, outlinks (spec §4.F)

use scraper::{Html, Selector};
use url::Url;

#[derive(Debug, Clone)]
pub struct ExtractedPage {
    pub title: String,
    pub body: String,
    pub outlinks: Vec<Url>,
}

const STRIP_TAGS: &[&str] = &["script", "style", "nav", "footer"];

/// Parses `body` (already-fetched HTML) relative to `page_url`: title from
/// the first non-empty `<title>` or `<h1>`, body text with `script`/`style`/
/// `nav`/`footer` subtrees stripped, and absolute outlinks resolved from
/// every `<a href>`.
#[must_use]
pub fn extract(body: &str, page_url: &Url) -> ExtractedPage {
    let document = Html::parse_document(body);

    let title = extract_title(&document).unwrap_or_default();
    let text = extract_body_text(&document);
    let outlinks = extract_outlinks(&document, page_url);

    ExtractedPage { title, body: text, outlinks }
}

fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").expect("static selector");
    if let Some(found) = document
        .select(&title_selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .find(|t| !t.is_empty())
    {
        return Some(found);
    }

    let h1_selector = Selector::parse("h1").expect("static selector");
    document
        .select(&h1_selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .find(|t| !t.is_empty())
}

fn extract_body_text(document: &Html) -> String {
    let strip_selectors: Vec<Selector> =
        STRIP_TAGS.iter().map(|tag| Selector::parse(tag).expect("static selector")).collect();
    let stripped: std::collections::HashSet<_> = strip_selectors
        .iter()
        .flat_map(|sel| document.select(sel))
        .map(|el| el.id())
        .collect();

    let body_selector = Selector::parse("body").expect("static selector");
    let root = document.select(&body_selector).next().map_or(document.root_element(), |el| el);

    let mut out = String::new();
    for node in root.descendants() {
        if node.value().as_element().is_some() {
            continue;
        }
        if let Some(text) = node.value().as_text() {
            let ancestor_stripped = node.ancestors().any(|a| stripped.contains(&a.id()));
            if !ancestor_stripped {
                out.push_str(text);
                out.push(' ');
            }
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn extract_outlinks(document: &Html, page_url: &Url) -> Vec<Url> {
    let link_selector = Selector::parse("a[href]").expect("static selector");
    document
        .select(&link_selector)
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| page_url.join(href).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://docs.example.com/guide/intro").unwrap()
    }

    #[test]
    fn extracts_title_from_title_tag() {
        let html = "<html><head><title>Intro Guide</title></head><body><p>hello</p></body></html>";
        let page = extract(html, &page_url());
        assert_eq!(page.title, "Intro Guide");
    }

    #[test]
    fn falls_back_to_h1_when_title_tag_is_empty() {
        let html = "<html><head><title></title></head><body><h1>Fallback Title</h1></body></html>";
        let page = extract(html, &page_url());
        assert_eq!(page.title, "Fallback Title");
    }

    #[test]
    fn strips_script_style_nav_and_footer_text() {
        let html = "<html><body><nav>Home</nav><script>alert(1)</script><p>Real content</p><footer>copy</footer></body></html>";
        let page = extract(html, &page_url());
        assert_eq!(page.body, "Real content");
    }

    #[test]
    fn resolves_relative_outlinks_to_absolute_urls() {
        let html = r#"<html><body><a href="/guide/next">Next</a><a href="https://other.example/page">External</a></body></html>"#;
        let page = extract(html, &page_url());
        assert_eq!(page.outlinks.len(), 2);
        assert_eq!(page.outlinks[0].as_str(), "https://docs.example.com/guide/next");
        assert_eq!(page.outlinks[1].as_str(), "https://other.example/page");
    }

    #[test]
    fn ignores_non_http_outlinks() {
        let html = r#"<html><body><a href="mailto:a@b.com">Mail</a><a href="/ok">Ok</a></body></html>"#;
        let page = extract(html, &page_url());
        assert_eq!(page.outlinks.len(), 1);
    }
}
