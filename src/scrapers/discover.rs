//! Brand link discovery on the index page.

use std::collections::HashMap;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::models::BrandLink;

static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid anchor selector"));

/// Host of `base_url` without a leading `www.`, used to recognise on-site links.
pub fn site_domain(base_url: &str) -> Option<String> {
    let url = Url::parse(base_url).ok()?;
    let host = url.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_lowercase())
}

/// Resolve a link target against the site base.
///
/// Absolute URLs are returned unchanged; relative paths are joined to `base_url`.
pub fn resolve_url(base_url: &str, target: &str) -> Result<String, url::ParseError> {
    if let Ok(absolute) = Url::parse(target) {
        return Ok(absolute.to_string());
    }
    Ok(Url::parse(base_url)?.join(target)?.to_string())
}

/// Every on-site hyperlink with visible text, in document order.
///
/// A link is on-site when it is a site-relative path (`/...`) or its URL
/// mentions `domain`.
pub fn discover_links(html: &str, domain: &str) -> Vec<BrandLink> {
    let document = Html::parse_document(html);
    let domain = domain.to_lowercase();

    document
        .select(&ANCHOR)
        .filter_map(|a| {
            let href = a.value().attr("href")?.trim();
            let text: String = a.text().map(str::trim).collect();
            if text.is_empty() {
                return None;
            }
            let on_site = href.starts_with('/') || href.to_lowercase().contains(&domain);
            on_site.then(|| BrandLink::new(text, href))
        })
        .collect()
}

/// Keep the links whose text contains one of `targets` (case-insensitive).
///
/// Each display name is kept once, at the position it was first seen; when
/// a name links to several pages, the last link's target is used.
pub fn match_targets(links: Vec<BrandLink>, targets: &[String]) -> Vec<BrandLink> {
    let needles: Vec<String> = targets
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    let mut matched: Vec<BrandLink> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();

    for link in links {
        let haystack = link.display_name.to_lowercase();
        let Some(needle) = needles.iter().find(|n| haystack.contains(n.as_str())) else {
            continue;
        };
        debug!("'{}' matches target '{}'", link.display_name, needle);

        match position.get(&link.display_name) {
            Some(&i) => {
                debug!(
                    "'{}' listed again, now pointing at {}",
                    link.display_name, link.target_url
                );
                matched[i].target_url = link.target_url;
            }
            None => {
                position.insert(link.display_name.clone(), matched.len());
                matched.push(link);
            }
        }
    }

    matched
}

/// Discover on-site links and filter them to the requested brands.
pub fn discover(html: &str, domain: &str, targets: &[String]) -> Vec<BrandLink> {
    match_targets(discover_links(html, domain), targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"
        <html><body>
          <nav><a href="/">  </a><a href="/cart"><img src="cart.png"></a></nav>
          <ul>
            <li><a href="/drew-estate">Drew Estate Cigars</a></li>
            <li><a href="/nowhere">Nowhere Corp</a></li>
            <li><a href="https://www.cigarpage.com/arturo-fuente.html">Arturo <b>Fuente</b></a></li>
            <li><a href="https://partner.example.com/drew">Drew Estate Elsewhere</a></li>
            <li><a href="javascript:void(0)">Drew Estate JS</a></li>
            <li><a href="/drew-estate-dupe">Drew Estate Cigars</a></li>
          </ul>
        </body></html>"#;

    fn targets(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_discover_links_filters_off_site_and_empty() {
        let links = discover_links(INDEX, "cigarpage.com");
        let names: Vec<&str> = links.iter().map(|l| l.display_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Drew Estate Cigars",
                "Nowhere Corp",
                "ArturoFuente",
                "Drew Estate Cigars"
            ]
        );
    }

    #[test]
    fn test_single_target_dispatches_one_link() {
        let matched = discover(INDEX, "cigarpage.com", &targets(&["Drew Estate"]));
        assert_eq!(
            matched,
            vec![BrandLink::new("Drew Estate Cigars", "/drew-estate-dupe")]
        );
    }

    #[test]
    fn test_repeated_name_keeps_first_position_and_last_target() {
        let links = vec![
            BrandLink::new("Drew Estate", "/old-drew"),
            BrandLink::new("Padron", "/padron"),
            BrandLink::new("Drew Estate", "/new-drew"),
        ];
        let matched = match_targets(links, &targets(&["drew", "padron"]));
        assert_eq!(
            matched,
            vec![
                BrandLink::new("Drew Estate", "/new-drew"),
                BrandLink::new("Padron", "/padron"),
            ]
        );
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let links = vec![
            BrandLink::new("ROCKY PATEL Vintage", "/rp"),
            BrandLink::new("Padron", "/padron"),
        ];
        let matched = match_targets(links, &targets(&["rocky patel"]));
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].target_url, "/rp");
    }

    #[test]
    fn test_no_targets_matches_nothing() {
        let links = discover_links(INDEX, "cigarpage.com");
        assert!(match_targets(links.clone(), &[]).is_empty());
        assert!(match_targets(links, &targets(&["  "])).is_empty());
    }

    #[test]
    fn test_site_domain() {
        assert_eq!(
            site_domain("https://www.cigarpage.com"),
            Some("cigarpage.com".to_string())
        );
        assert_eq!(
            site_domain("http://shop.example.org/x"),
            Some("shop.example.org".to_string())
        );
        assert_eq!(site_domain("not a url"), None);
    }

    #[test]
    fn test_resolve_url() {
        assert_eq!(
            resolve_url("https://www.cigarpage.com", "/drew-estate").unwrap(),
            "https://www.cigarpage.com/drew-estate"
        );
        assert_eq!(
            resolve_url("https://www.cigarpage.com", "https://www.cigarpage.com/a.html").unwrap(),
            "https://www.cigarpage.com/a.html"
        );
    }
}
