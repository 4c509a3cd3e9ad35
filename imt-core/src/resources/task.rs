//! Background task records: domain-model task requests and the running-task
//! queue entries reported by the tasks API.

use crate::enums::{TaskKind, Visibility};
use crate::{ResourceId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Body of the domain-model retrain, evaluate, and sample calls.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainTaskRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

impl DomainTaskRequest {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Document labels given as feedback to a domain model.
///
/// Keys on the wire are `index{n}` where `n` is the document's index in the
/// sample.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeedbackLabels {
    pub labels: BTreeMap<String, i32>,
}

impl FeedbackLabels {
    pub fn from_indices<I: IntoIterator<Item = (u64, i32)>>(labels: I) -> Self {
        Self {
            labels: labels
                .into_iter()
                .map(|(index, label)| (format!("index{}", index), label))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// One entry of a running-task queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningTask {
    pub task: ResourceId,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    #[serde(default)]
    pub sub_type: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub started_at: Option<Timestamp>,
    #[serde(default)]
    pub finished_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub response: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn feedback_labels_are_keyed_by_index() {
        let labels = FeedbackLabels::from_indices([(3, 1), (10, 0)]);
        assert_eq!(
            serde_json::to_value(&labels).unwrap(),
            json!({ "labels": { "index10": 0, "index3": 1 } })
        );
    }

    #[test]
    fn domain_task_request_omits_unset_fields() {
        let mut request = DomainTaskRequest::named("classifier");
        request.corpus = Some("cordis".to_string());
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "name": "classifier", "corpus": "cordis" })
        );
    }

    #[test]
    fn running_task_reads_queue_entry() {
        let task: RunningTask = serde_json::from_value(json!({
            "task": uuid::Uuid::nil(),
            "type": "training",
            "subType": "SAMPLE_DOMAIN_MODEL",
            "label": "classifier",
            "finished": true,
            "startedAt": "2024-03-01T10:00:00Z",
            "finishedAt": null
        }))
        .unwrap();
        assert_eq!(task.kind, TaskKind::Training);
        assert!(task.finished);
        assert_eq!(task.sub_type.as_deref(), Some("SAMPLE_DOMAIN_MODEL"));
        assert!(task.finished_at.is_none());
    }
}
