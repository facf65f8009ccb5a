use crate::vrstats::classify::{LinkCandidate, href_basename, is_archive_document};
use crate::vrstats::dates::{Month, extract_year, infer_month};
use crate::vrstats::naming::{canonical_name, to_two_digit_month};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// One archived statistics document, discovered online or found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveItem {
    pub url: Option<String>,
    pub year: u16,
    pub month: Month,
}

pub type ManifestKey = (Option<&'static str>, u16);

impl ArchiveItem {
    pub fn canonical_name(&self) -> String {
        canonical_name(self.month.as_str(), self.year)
    }

    pub fn key(&self) -> ManifestKey {
        (to_two_digit_month(self.month.as_str()), self.year)
    }
}

/// Items keyed by (month, year). The first item seen for a key is kept and
/// later ones are dropped without comparison.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    items: Vec<ArchiveItem>,
    seen: HashSet<ManifestKey>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the key was already present.
    pub fn insert(&mut self, item: ArchiveItem) -> bool {
        if !self.seen.insert(item.key()) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn into_items(self) -> Vec<ArchiveItem> {
        self.items
    }
}

#[derive(Debug, Clone)]
pub struct HarvestSettings {
    pub base_origin: Url,
    pub container_id_suffix: String,
}

fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    if href.starts_with("http") {
        Url::parse(href).ok()
    } else {
        base.join(href).ok()
    }
}

fn listing_scope<'a>(document: &'a Html, container_id_suffix: &str) -> ElementRef<'a> {
    let container = Selector::parse(&format!(
        r#"[id*="accordion-"][id$="{container_id_suffix}"]"#
    ))
    .ok()
    .and_then(|selector| document.select(&selector).next());

    match container {
        Some(element) => element,
        None => {
            debug!(
                suffix = container_id_suffix,
                "accordion container not found; scanning whole document"
            );
            document.root_element()
        }
    }
}

fn item_from_anchor(anchor: ElementRef<'_>, base: &Url) -> Option<ArchiveItem> {
    let href = anchor.value().attr("href")?;
    let raw_text = anchor.text().collect::<String>();
    let candidate = LinkCandidate::new(href, &raw_text);
    if !is_archive_document(&candidate) {
        return None;
    }

    let url = resolve_href(base, href)?;
    let basename = href_basename(url.as_str());
    let year = extract_year(&candidate.text).or_else(|| extract_year(&basename))?;
    let month = infer_month(&candidate.text, &basename, Some(year))?;

    Some(ArchiveItem {
        url: Some(url.to_string()),
        year,
        month,
    })
}

pub fn build_manifest(document: &Html, settings: &HarvestSettings) -> Manifest {
    let mut manifest = Manifest::new();
    let scope = listing_scope(document, &settings.container_id_suffix);
    let Ok(anchors) = Selector::parse("a[href]") else {
        return manifest;
    };

    for anchor in scope.select(&anchors) {
        let Some(item) = item_from_anchor(anchor, &settings.base_origin) else {
            continue;
        };
        let name = item.canonical_name();
        if !manifest.insert(item) {
            debug!(name = %name, "dropping duplicate archive link");
        }
    }

    manifest
}

/// Archive documents referenced by the listing, deduplicated by
/// (month, year), in first-seen document order.
pub fn harvest(document: &Html, settings: &HarvestSettings) -> Vec<ArchiveItem> {
    build_manifest(document, settings).into_items()
}

pub fn harvest_html(raw_html: &str, settings: &HarvestSettings) -> Vec<ArchiveItem> {
    harvest(&Html::parse_document(raw_html), settings)
}
