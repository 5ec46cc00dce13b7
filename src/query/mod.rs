//! Aggregation layer: pipeline builders for every denormalized read view.
//!
//! Builders are pure functions returning the pipeline stages; handlers run
//! them through `Collection::aggregate`. Paginated views end with a `$facet`
//! stage and are unpacked by [`parse_facet`].

pub mod comment;
pub mod playlist;
pub mod subscription;
pub mod user;
pub mod video;

use mongodb::bson::{doc, Document};
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// 1-based pagination window. Requests below 1 are clamped up.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub page: u64,
    pub limit: u64,
}

impl Page {
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Page {
            page: page.unwrap_or(DEFAULT_PAGE).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).max(1),
        }
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1) * self.limit
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        (total + self.limit - 1) / self.limit
    }
}

/// Counts the full result set and slices out the requested page in one
/// round trip.
pub fn facet_stage(page: Page) -> Document {
    doc! {
        "$facet": {
            "total": [ { "$count": "count" } ],
            "docs": [
                { "$skip": page.skip() as i64 },
                { "$limit": page.limit as i64 },
            ],
        }
    }
}

#[derive(Deserialize)]
struct Facet<T> {
    total: Vec<FacetCount>,
    docs: Vec<T>,
}

#[derive(Deserialize)]
struct FacetCount {
    count: i64,
}

/// Unpacks the single document produced by [`facet_stage`] into
/// `(total, page items)`.
pub fn parse_facet<T: DeserializeOwned>(
    document: Document,
) -> Result<(u64, Vec<T>), mongodb::bson::de::Error> {
    let facet: Facet<T> = mongodb::bson::from_document(document)?;
    let total = facet.total.first().map(|c| c.count as u64).unwrap_or(0);
    Ok((total, facet.docs))
}

/// Owner-summary sub-pipeline shared by every `$lookup` that attaches a
/// user summary: `{_id, full_name, avatar, username}`.
pub(crate) fn owner_summary_projection() -> Document {
    doc! {
        "$project": {
            "_id": 1,
            "full_name": 1,
            "avatar": 1,
            "username": 1,
        }
    }
}

/// Escapes regex metacharacters so a search string is matched as a literal
/// substring.
pub(crate) fn escape_regex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if ".^$*+?()[]{}|\\".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_and_clamps() {
        let page = Page::new(None, None);
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 10);
        assert_eq!(page.skip(), 0);

        let page = Page::new(Some(0), Some(0));
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 1);

        let page = Page::new(Some(3), Some(10));
        assert_eq!(page.skip(), 20);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = Page::new(Some(1), Some(10));
        assert_eq!(page.total_pages(25), 3);
        assert_eq!(page.total_pages(30), 3);
        assert_eq!(page.total_pages(0), 0);
    }

    #[test]
    fn facet_stage_skips_and_limits() {
        let stage = facet_stage(Page::new(Some(3), Some(10)));
        let facet = stage.get_document("$facet").unwrap();
        let docs = facet.get_array("docs").unwrap();
        assert_eq!(
            docs[0].as_document().unwrap().get_i64("$skip").unwrap(),
            20
        );
        assert_eq!(
            docs[1].as_document().unwrap().get_i64("$limit").unwrap(),
            10
        );
    }

    #[test]
    fn parse_facet_reads_count_and_docs() {
        let document = doc! {
            "total": [ { "count": 25 } ],
            "docs": [ { "value": 1 }, { "value": 2 } ],
        };
        let (total, docs): (u64, Vec<Document>) = parse_facet(document).unwrap();
        assert_eq!(total, 25);
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn parse_facet_of_empty_result_is_zero() {
        let document = doc! { "total": [], "docs": [] };
        let (total, docs): (u64, Vec<Document>) = parse_facet(document).unwrap();
        assert_eq!(total, 0);
        assert!(docs.is_empty());
    }

    #[test]
    fn regex_escaping_neutralizes_metacharacters() {
        assert_eq!(escape_regex("a.b*c"), "a\\.b\\*c");
        assert_eq!(escape_regex("plain words"), "plain words");
    }
}
