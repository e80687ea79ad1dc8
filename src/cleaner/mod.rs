//! Strips page chrome and noisy markup before generation and extraction.

use ammonia::{Builder, UrlRelative};
use scraper::{Html, Selector};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use url::Url;

/// Invisible subtrees, tracking hooks and consent or ad widgets.
static HIDDEN_OR_TRACKING: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#"[hidden], [aria-hidden="true"],
        [style*="display: none"], [style*="display:none"],
        [style*="visibility: hidden"], [style*="visibility:hidden"],
        [data-analytics], [data-tracking], [data-gtm], [data-ga],
        [role="banner"], [role="complementary"],
        .cookie-banner, .ad, .advertisement, .social-share,
        #cookie-notice, #newsletter-signup, #popup"#,
    )
    .unwrap()
});

/// Tags dropped together with everything inside them.
const DROPPED_WITH_CONTENT: &[&str] = &[
    "script", "style", "noscript", "iframe", "svg", "title", "header", "footer", "aside",
];

/// Attributes kept on any element. Everything else is removed.
const KEPT_ATTRIBUTES: &[&str] = &[
    "href",
    "src",
    "alt",
    "title",
    "data-test",
    "data-testid",
    "aria-current",
    "role",
    "class",
];

/// Structural tags kept in addition to ammonia's defaults.
const EXTRA_TAGS: &[&str] = &["main", "section", "button", "time", "label"];

pub trait DocumentCleaner: Send + Sync {
    fn clean(&self, html: &str, base_url: Option<&Url>) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AmmoniaCleaner;

impl AmmoniaCleaner {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentCleaner for AmmoniaCleaner {
    fn clean(&self, html: &str, base_url: Option<&Url>) -> String {
        let html = remove_hidden(html);

        let mut builder = Builder::default();
        builder
            .rm_tags(DROPPED_WITH_CONTENT.iter().copied())
            .add_tags(EXTRA_TAGS.iter().copied())
            .add_clean_content_tags(DROPPED_WITH_CONTENT.iter().copied())
            .generic_attributes(KEPT_ATTRIBUTES.iter().copied().collect::<HashSet<_>>())
            .tag_attributes(HashMap::new())
            .link_rel(None);

        if let Some(base) = base_url {
            builder.url_relative(UrlRelative::RewriteWithBase(base.clone()));
        }

        builder.clean(&html).to_string()
    }
}

/// Detach every subtree matching [`HIDDEN_OR_TRACKING`].
fn remove_hidden(html: &str) -> String {
    let mut document = Html::parse_document(html);
    let ids: Vec<_> = document.select(&HIDDEN_OR_TRACKING).map(|element| element.id()).collect();
    if ids.is_empty() {
        return html.to_string();
    }

    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
    document.html()
}
