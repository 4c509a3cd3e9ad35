//! Topics of a single topic model, and the payloads that curate them.

use crate::filter::BaseFilter;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicFilter {
    #[serde(flatten)]
    pub base: BaseFilter,
    /// Case-insensitive substring on the topic's word description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_description: Option<String>,
}

impl TopicFilter {
    pub fn with_word_description(mut self, fragment: impl Into<String>) -> Self {
        let fragment = fragment.into();
        let trimmed = fragment.trim();
        self.word_description = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }
}

crate::impl_resource_filter!(TopicFilter, base);

/// One topic. Topics are numbered within their model rather than carrying a
/// global identifier; the numeric strings are reported as the server sends them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Topic {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_active: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_entropy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_coherence: Option<String>,
}

/// Pairwise topic similarity by co-occurrence and by word description.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicSimilarity {
    #[serde(rename = "Coocurring")]
    pub cooccurring: Vec<Vec<Value>>,
    #[serde(rename = "Worddesc")]
    pub word_description: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicLabels {
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSimilarityRequest {
    pub pairs: u32,
}

/// Topic numbers to fuse into one, or to delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSelection {
    pub topics: Vec<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ResourceFilter;
    use serde_json::json;

    #[test]
    fn word_description_filter() {
        let filter = TopicFilter::default()
            .with_like("health")
            .with_word_description(" vaccine ");
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({ "like": "health", "wordDescription": "vaccine" })
        );
        assert!(TopicFilter::default()
            .with_word_description("  ")
            .word_description
            .is_none());
    }

    #[test]
    fn topic_tolerates_projection() {
        let topic: Topic =
            serde_json::from_value(json!({ "id": 3, "label": "Vaccines" })).unwrap();
        assert_eq!(topic.id, 3);
        assert_eq!(topic.label.as_deref(), Some("Vaccines"));
        assert!(topic.word_description.is_none());
    }

    #[test]
    fn similarity_wire_names() {
        let sim: TopicSimilarity = serde_json::from_value(json!({
            "Coocurring": [[0, 1, 0.8]],
            "Worddesc": []
        }))
        .unwrap();
        assert_eq!(sim.cooccurring.len(), 1);
    }
}
