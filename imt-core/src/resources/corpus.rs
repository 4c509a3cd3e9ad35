//! Raw and logical corpora.
//!
//! Both kinds share one backend collection and are told apart by the
//! `corpusType` discriminator, which each filter pins to its own value.

use crate::enums::{CorpusType, Visibility};
use crate::filter::{BaseFilter, Ownership};
use crate::{ResourceId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

fn raw_corpus_type() -> CorpusType {
    CorpusType::Raw
}

fn logical_corpus_type() -> CorpusType {
    CorpusType::Logical
}

// ============================================================================
// FILTERS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCorpusFilter {
    #[serde(flatten)]
    pub base: BaseFilter,
    #[serde(flatten)]
    pub ownership: Ownership,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub visibilities: BTreeSet<Visibility>,
    // Pinned: any incoming value is ignored.
    #[serde(skip_deserializing, default = "raw_corpus_type")]
    corpus_type: CorpusType,
}

impl RawCorpusFilter {
    pub fn corpus_type(&self) -> CorpusType {
        self.corpus_type
    }
}

impl Default for RawCorpusFilter {
    fn default() -> Self {
        Self {
            base: BaseFilter::default(),
            ownership: Ownership::default(),
            visibilities: BTreeSet::new(),
            corpus_type: CorpusType::Raw,
        }
    }
}

crate::impl_owned_filter!(RawCorpusFilter);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicalCorpusFilter {
    #[serde(flatten)]
    pub base: BaseFilter,
    #[serde(flatten)]
    pub ownership: Ownership,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub visibilities: BTreeSet<Visibility>,
    /// Exact match on the corpus validity tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corpus_valid_for: Option<String>,
    #[serde(skip_deserializing, default = "logical_corpus_type")]
    corpus_type: CorpusType,
}

impl LogicalCorpusFilter {
    pub fn corpus_type(&self) -> CorpusType {
        self.corpus_type
    }

    pub fn with_valid_for(mut self, valid_for: impl Into<String>) -> Self {
        self.corpus_valid_for = Some(valid_for.into());
        self
    }
}

impl Default for LogicalCorpusFilter {
    fn default() -> Self {
        Self {
            base: BaseFilter::default(),
            ownership: Ownership::default(),
            visibilities: BTreeSet::new(),
            corpus_valid_for: None,
            corpus_type: CorpusType::Logical,
        }
    }
}

crate::impl_owned_filter!(LogicalCorpusFilter);

// ============================================================================
// RECORDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCorpus {
    pub id: ResourceId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_date: Option<Timestamp>,
    pub records: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub schema: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogicalCorpus {
    pub id: ResourceId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<Timestamp>,
    #[serde(rename = "Dtsets")]
    pub dtsets: Vec<LocalDataset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_for: Option<String>,
}

/// Source-dataset mapping inside a logical corpus.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalDataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idfld: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titlefld: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub textfld: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lemmasfld: Vec<String>,
    // Wire name is misspelled by the backend.
    #[serde(rename = "emmbedingsfld", skip_serializing_if = "Option::is_none")]
    pub embeddings_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// Create payload for a logical corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalCorpusPersist {
    pub name: String,
    pub description: String,
    pub visibility: Visibility,
    pub valid_for: String,
    pub fields: Vec<LogicalCorpusField>,
    #[serde(rename = "Dtsets")]
    pub dtsets: Vec<LocalDataset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicalCorpusField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub original_fields: Vec<MergedCorpusField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedCorpusField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub corpus_name: String,
}

/// Partial update for either corpus kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusPatch {
    pub id: ResourceId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{OwnedFilter, ResourceFilter};
    use serde_json::json;

    #[test]
    fn raw_filter_always_carries_discriminator() {
        let json = serde_json::to_value(RawCorpusFilter::default()).unwrap();
        assert_eq!(json, json!({ "corpusType": "RAW" }));
    }

    #[test]
    fn logical_filter_carries_validity_tag() {
        let filter = LogicalCorpusFilter::default()
            .with_valid_for("TM")
            .with_creator("alice");
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(
            json,
            json!({ "corpusType": "LOGICAL", "corpusValidFor": "TM", "creator": "alice" })
        );
    }

    #[test]
    fn missing_discriminator_defaults_per_kind() {
        let raw: RawCorpusFilter = serde_json::from_value(json!({ "like": "a" })).unwrap();
        assert_eq!(raw.corpus_type(), CorpusType::Raw);
        assert_eq!(raw.base().like.as_deref(), Some("a"));

        let logical: LogicalCorpusFilter = serde_json::from_value(json!({})).unwrap();
        assert_eq!(logical.corpus_type(), CorpusType::Logical);
    }

    #[test]
    fn incoming_discriminator_is_ignored() {
        let raw: RawCorpusFilter =
            serde_json::from_value(json!({ "corpusType": "LOGICAL", "like": "cordis" })).unwrap();
        assert_eq!(raw.corpus_type(), CorpusType::Raw);
        assert_eq!(serde_json::to_value(&raw).unwrap()["corpusType"], json!("RAW"));

        let lookup: crate::Lookup<LogicalCorpusFilter> =
            serde_json::from_str(r#"{"corpusType":"RAW"}"#).unwrap();
        assert_eq!(lookup.filter.corpus_type(), CorpusType::Logical);
    }

    #[test]
    fn logical_corpus_keeps_dataset_wire_names() {
        let corpus: LogicalCorpus = serde_json::from_value(json!({
            "id": ResourceId::nil(),
            "name": "merged",
            "Dtsets": [{ "source": "cordis", "emmbedingsfld": "embeddings" }]
        }))
        .unwrap();
        assert_eq!(
            corpus.dtsets[0].embeddings_field.as_deref(),
            Some("embeddings")
        );
        assert!(corpus.valid_for.is_none());
    }
}
