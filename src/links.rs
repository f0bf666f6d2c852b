//! Deterministic search link variants
//!
//! Each query expands into a fixed set of search URLs built from one link
//! template: a general variant plus refined `detailed` and `tutorial`
//! variants, always in that order.

const SEARCH_TEMPLATE: &str = "https://www.google.com/search?q=";

/// A labeled search link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchLink {
    pub label: &'static str,
    pub url: String,
}

/// Build the link variants for a query: General, Detailed, Tutorial.
pub fn search_links(query: &str) -> Vec<SearchLink> {
    let encoded = urlencoding::encode(query);
    vec![
        SearchLink {
            label: "General",
            url: format!("{SEARCH_TEMPLATE}{encoded}"),
        },
        SearchLink {
            label: "Detailed",
            url: format!("{SEARCH_TEMPLATE}{encoded}+detailed"),
        },
        SearchLink {
            label: "Tutorial",
            url: format!("{SEARCH_TEMPLATE}{encoded}+tutorial"),
        },
    ]
}

/// Render a search reply: summary first, then the numbered links.
pub fn render_search_reply(query: &str, summary: &str, links: &[SearchLink]) -> String {
    let mut out = format!("Search results for {query}:\n\n{summary}\n\nRelevant links:");
    for (i, link) in links.iter().enumerate() {
        out.push_str(&format!("\n{}. {} Search: {}", i + 1, link.label, link.url));
    }
    out
}
