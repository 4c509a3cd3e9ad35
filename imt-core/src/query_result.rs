//! Paged result envelope returned for any lookup.

use crate::lookup::Page;
use serde::{Deserialize, Serialize};

/// One page of items plus, when requested, the total match count.
///
/// `count` is present only when the lookup asked for `countAll`. Its absence
/// is not an error; it just means the total is unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_override: Option<u64>,
}

impl<T> QueryResult<T> {
    pub fn new(items: Vec<T>, count: Option<u64>) -> Self {
        Self {
            items,
            count,
            count_override: None,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), None)
    }

    /// Page a collection already held in memory, the way the server would.
    pub fn paged(all: Vec<T>, page: &Page, count_all: bool) -> Self {
        let total = all.len() as u64;
        let start = page.offset.min(total) as usize;
        let take = page.size.min(total.saturating_sub(page.offset)) as usize;
        let items = all.into_iter().skip(start).take(take).collect();
        Self::new(items, count_all.then_some(total))
    }

    /// Total match count, preferring the server's override when it sent one.
    pub fn total(&self) -> Option<u64> {
        self.count_override.or(self.count)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether rows exist past `page`. Unknown without a count.
    pub fn has_more(&self, page: &Page) -> Option<bool> {
        self.total().map(|total| page.end() < total)
    }

    /// Number of pages of `page_size` needed to cover the total.
    pub fn page_count(&self, page_size: u64) -> Option<u64> {
        if page_size == 0 {
            return None;
        }
        self.total().map(|total| total.div_ceil(page_size))
    }

    /// Expected number of items for `page` given `matches` total matches.
    pub fn expected_page_len(page: &Page, matches: u64) -> u64 {
        if page.offset < matches {
            page.size.min(matches - page.offset)
        } else {
            0
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> QueryResult<U> {
        QueryResult {
            items: self.items.into_iter().map(f).collect(),
            count: self.count,
            count_override: self.count_override,
        }
    }
}

impl<T> Default for QueryResult<T> {
    fn default() -> Self {
        Self::empty()
    }
}
