//! Article metadata from `<meta>` tags and JSON-LD blocks.

use chrono::{DateTime, FixedOffset};
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::Value;

static JSON_LD: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script[type='application/ld+json']").unwrap());
static META_AUTHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("meta[name='author']").unwrap());
static META_PUBLISHED: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[property='article:published_time']").unwrap());
static OG_IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("meta[property='og:image']").unwrap());
static OG_TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("meta[property='og:title']").unwrap());
static OG_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[property='og:description']").unwrap());
static META_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[name='description']").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());

fn meta_content(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .filter_map(|e| e.value().attr("content"))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Every JSON object found in JSON-LD blocks, flattening top-level arrays
/// and `@graph` lists.
fn json_ld_objects(document: &Html) -> Vec<Value> {
    let mut objects = Vec::new();
    for script in document.select(&JSON_LD) {
        let raw = script.text().collect::<String>();
        let Ok(json) = serde_json::from_str::<Value>(raw.trim()) else {
            continue;
        };
        let top = match json {
            Value::Array(items) => items,
            other => vec![other],
        };
        for item in top {
            if let Some(Value::Array(graph)) = item.get("@graph") {
                objects.extend(graph.iter().cloned());
            }
            objects.push(item);
        }
    }
    objects
}

fn author_names(author: &Value) -> Vec<String> {
    match author {
        Value::Array(items) => items.iter().flat_map(author_names).collect(),
        Value::Object(obj) => obj
            .get("name")
            .and_then(Value::as_str)
            .map(|n| vec![n.trim().to_string()])
            .unwrap_or_default(),
        Value::String(s) => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

/// Authors from JSON-LD, falling back to `<meta name="author">`.
pub fn extract_authors(document: &Html) -> Vec<String> {
    let mut authors: Vec<String> = json_ld_objects(document)
        .iter()
        .filter_map(|obj| obj.get("author"))
        .flat_map(author_names)
        .collect();

    if authors.is_empty() {
        if let Some(meta) = meta_content(document, &META_AUTHOR) {
            authors.extend(meta.split(',').map(|s| s.trim().to_string()));
        }
    }

    authors
        .into_iter()
        .filter(|a| !a.is_empty())
        .unique()
        .collect()
}

pub fn extract_publish_date(document: &Html) -> Option<DateTime<FixedOffset>> {
    let from_meta = meta_content(document, &META_PUBLISHED);
    let from_json_ld = || {
        json_ld_objects(document)
            .iter()
            .filter_map(|obj| obj.get("datePublished").and_then(Value::as_str))
            .map(str::to_string)
            .next()
    };

    from_meta
        .into_iter()
        .chain(from_json_ld())
        .find_map(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
}

pub fn extract_lead_image(document: &Html) -> Option<String> {
    meta_content(document, &OG_IMAGE)
}

pub fn extract_description(document: &Html) -> String {
    meta_content(document, &OG_DESCRIPTION)
        .or_else(|| meta_content(document, &META_DESCRIPTION))
        .unwrap_or_default()
}

/// Page title from OpenGraph, then `<title>`.
pub fn extract_title(document: &Html) -> Option<String> {
    meta_content(document, &OG_TITLE).or_else(|| {
        document
            .select(&TITLE)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    })
}
