//! Sampled documents of a domain model.
//!
//! Documents have no listing endpoint; they arrive in bulk with a sampling
//! result and are paged locally with [`Lookup`](crate::Lookup) semantics.

use crate::filter::BaseFilter;
use crate::lookup::Lookup;
use crate::query_result::QueryResult;
use crate::ResourceId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentFilter {
    #[serde(flatten)]
    pub base: BaseFilter,
}

crate::impl_resource_filter!(DocumentFilter, base);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub id: ResourceId,
    pub index: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<f64>,
}

/// Apply the inclusion, exclusion, and `like` predicates of `lookup` to a
/// locally held sample, then page it.
///
/// `like` matches against the title. Documents carry no lifecycle state, so
/// `isActive` is ignored.
pub fn page_documents(
    documents: &[Document],
    lookup: &Lookup<DocumentFilter>,
) -> QueryResult<Document> {
    let base = &lookup.filter.base;
    let needle = base.like.as_ref().map(|l| l.to_lowercase());
    let matched: Vec<Document> = documents
        .iter()
        .filter(|d| base.ids.is_empty() || base.ids.contains(&d.id))
        .filter(|d| !base.excluded_ids.contains(&d.id))
        .filter(|d| match (&needle, &d.title) {
            (None, _) => true,
            (Some(n), Some(title)) => title.to_lowercase().contains(n.as_str()),
            (Some(_), None) => false,
        })
        .cloned()
        .collect();
    QueryResult::paged(matched, &lookup.page, lookup.count_all())
}
