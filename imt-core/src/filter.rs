//! Base filter fragments shared by every resource filter.
//!
//! Resource filters embed [`BaseFilter`] (and, where ownership applies,
//! [`Ownership`]) by value with `#[serde(flatten)]`, so the wire object stays
//! flat while the Rust types stay composed.

use crate::enums::{IsActive, Visibility};
use crate::ResourceId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identity and activity predicates present on every lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseFilter {
    /// Identifiers to include. Empty means no restriction.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub ids: BTreeSet<ResourceId>,
    /// Identifiers to exclude. Wins over `ids`.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub excluded_ids: BTreeSet<ResourceId>,
    /// Case-insensitive substring on the display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like: Option<String>,
    /// Lifecycle states to match. Empty means `Active` only.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub is_active: BTreeSet<IsActive>,
}

impl BaseFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// States the server will match for this filter.
    pub fn effective_is_active(&self) -> BTreeSet<IsActive> {
        if self.is_active.is_empty() {
            BTreeSet::from([IsActive::Active])
        } else {
            self.is_active.clone()
        }
    }

    /// True when no predicate narrows the result set beyond the default.
    pub fn is_unrestricted(&self) -> bool {
        self.ids.is_empty()
            && self.excluded_ids.is_empty()
            && self.like.is_none()
            && self.is_active.is_empty()
    }
}

/// Ownership predicates shared by word lists, corpora, and models.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ownership {
    /// Exact match on the owning principal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    /// Restrict to the calling principal's own resources.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub mine: bool,
}

/// A filter that can be carried by a [`crate::Lookup`].
///
/// Every implementor embeds a [`BaseFilter`]; the provided `with_*` methods
/// narrow it and hand back a new value.
pub trait ResourceFilter:
    Serialize + DeserializeOwned + Clone + Default + fmt::Debug + Send + Sync + 'static
{
    fn base(&self) -> &BaseFilter;

    fn base_mut(&mut self) -> &mut BaseFilter;

    fn with_ids<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = ResourceId>,
        Self: Sized,
    {
        self.base_mut().ids = ids.into_iter().collect();
        self
    }

    fn with_excluded_ids<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = ResourceId>,
        Self: Sized,
    {
        self.base_mut().excluded_ids = ids.into_iter().collect();
        self
    }

    /// Set the text fragment. Blank input clears it.
    fn with_like(mut self, like: impl Into<String>) -> Self
    where
        Self: Sized,
    {
        let like = like.into();
        let trimmed = like.trim();
        self.base_mut().like = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    fn with_is_active<I>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = IsActive>,
        Self: Sized,
    {
        self.base_mut().is_active = states.into_iter().collect();
        self
    }
}

/// Filters that carry [`Ownership`] and a visibility set.
pub trait OwnedFilter: ResourceFilter {
    fn ownership(&self) -> &Ownership;

    fn ownership_mut(&mut self) -> &mut Ownership;

    fn visibilities_mut(&mut self) -> &mut BTreeSet<Visibility>;

    fn with_creator(mut self, creator: impl Into<String>) -> Self
    where
        Self: Sized,
    {
        self.ownership_mut().creator = Some(creator.into());
        self
    }

    fn with_mine(mut self, mine: bool) -> Self
    where
        Self: Sized,
    {
        self.ownership_mut().mine = mine;
        self
    }

    fn with_visibilities<I>(mut self, visibilities: I) -> Self
    where
        I: IntoIterator<Item = Visibility>,
        Self: Sized,
    {
        *self.visibilities_mut() = visibilities.into_iter().collect();
        self
    }
}

impl ResourceFilter for BaseFilter {
    fn base(&self) -> &BaseFilter {
        self
    }

    fn base_mut(&mut self) -> &mut BaseFilter {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn empty_filter_serializes_to_empty_object() {
        let json = serde_json::to_value(BaseFilter::new()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn effective_is_active_defaults_to_active() {
        let filter = BaseFilter::new();
        assert_eq!(
            filter.effective_is_active(),
            BTreeSet::from([IsActive::Active])
        );

        let both = BaseFilter::new().with_is_active([IsActive::Active, IsActive::Inactive]);
        assert_eq!(both.effective_is_active().len(), 2);
    }

    #[test]
    fn duplicate_ids_collapse() {
        let id = Uuid::now_v7();
        let filter = BaseFilter::new().with_ids([id, id, id]);
        assert_eq!(filter.ids.len(), 1);
    }

    #[test]
    fn blank_like_clears_fragment() {
        let filter = BaseFilter::new().with_like("report").with_like("   ");
        assert!(filter.like.is_none());
        assert!(filter.is_unrestricted());
    }

    #[test]
    fn like_is_trimmed() {
        let filter = BaseFilter::new().with_like("  report ");
        assert_eq!(filter.like.as_deref(), Some("report"));
    }

    #[test]
    fn camel_case_wire_names() {
        let id = Uuid::nil();
        let filter = BaseFilter::new()
            .with_excluded_ids([id])
            .with_is_active([IsActive::Inactive]);
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json["excludedIds"][0], serde_json::json!(id.to_string()));
        assert_eq!(json["isActive"], serde_json::json!([0]));
    }

    #[test]
    fn ownership_omits_false_mine() {
        let json = serde_json::to_value(Ownership::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
        let json = serde_json::to_value(Ownership {
            creator: None,
            mine: true,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "mine": true }));
    }
}
