//! Topic models and domain models.

use crate::enums::{TreeStatus, Visibility};
use crate::filter::{BaseFilter, Ownership};
use crate::resources::corpus::RawCorpus;
use crate::{ResourceId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};

// ============================================================================
// TOPIC MODEL
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicModelFilter {
    #[serde(flatten)]
    pub base: BaseFilter,
    #[serde(flatten)]
    pub ownership: Ownership,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub visibilities: BTreeSet<Visibility>,
    /// Exact match on the model's depth in a hierarchy (0 = root).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchy_level: Option<u32>,
}

impl TopicModelFilter {
    pub fn with_hierarchy_level(mut self, level: u32) -> Self {
        self.hierarchy_level = Some(level);
        self
    }
}

crate::impl_owned_filter!(TopicModelFilter);

/// A trained (or training) topic model.
///
/// Training hyperparameters vary by model type and are kept verbatim in
/// `params`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicModel {
    pub id: ResourceId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Training dataset. For a submodel this is the parent model's name.
    #[serde(rename = "TrDtSet", skip_serializing_if = "Option::is_none")]
    pub training_dataset: Option<String>,
    #[serde(rename = "parentName", skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    #[serde(rename = "hierarchyLevel")]
    pub hierarchy_level: u32,
    #[serde(rename = "topicId", skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<u64>,
    #[serde(flatten)]
    pub params: Map<String, Value>,
    /// Listing state, computed client side.
    #[serde(skip)]
    pub tree_status: TreeStatus,
}

/// Mark every model in the page that has level-1 children in the same page.
///
/// Only `tree_status` changes; the items keep their order and count.
pub fn annotate_tree_status(models: &mut [TopicModel]) {
    let parents: HashSet<String> = models
        .iter()
        .filter(|m| m.hierarchy_level == 1)
        .filter_map(|m| m.training_dataset.clone())
        .collect();
    for model in models.iter_mut() {
        model.tree_status = if parents.contains(&model.name) {
            TreeStatus::Collapsed
        } else {
            TreeStatus::Disabled
        };
    }
}

/// Training request for a topic or domain model.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus_id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<u64>,
    #[serde(default)]
    pub hierarchical: bool,
    #[serde(default)]
    pub parameters: std::collections::BTreeMap<String, String>,
}

/// Partial update for a model, sent to `{name}/patch`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

/// Handle returned when a training or reset task is queued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHandle {
    pub id: ResourceId,
}

// ============================================================================
// DOMAIN MODEL
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DomainModelFilter {
    #[serde(flatten)]
    pub base: BaseFilter,
    #[serde(flatten)]
    pub ownership: Ownership,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub visibilities: BTreeSet<Visibility>,
}

crate::impl_owned_filter!(DomainModelFilter);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainModel {
    pub id: ResourceId,
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(rename = "numberOfHeads", skip_serializing_if = "Option::is_none")]
    pub number_of_heads: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus: Option<RawCorpus>,
}
