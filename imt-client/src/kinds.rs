//! The resource kinds served by the backend, and their kind-specific calls.

use crate::error::ApiClientError;
use crate::resource::{
    decode, encode_name, rename_body, Creatable, NamedResource, PathStyle, Patchable, Resource,
    ResourceClient,
};
use crate::transport::Method;
use imt_core::{
    annotate_tree_status, CorpusPatch, DomainModel, DomainModelFilter, DomainTaskRequest,
    Equivalence, EquivalenceFilter, FeedbackLabels, Keyword, KeywordFilter, LogicalCorpus, LogicalCorpusFilter,
    LogicalCorpusPersist, Lookup, ModelPatch, QueryResult, RawCorpus, RawCorpusFilter,
    ResourceId, Stopword, StopwordFilter, TaskHandle, Topic, TopicFilter, TopicLabels,
    TopicModel, TopicModelFilter, TopicSelection, TopicSimilarity, TopicSimilarityRequest,
    TrainingRequest,
};
use serde_json::Value;
use std::num::NonZeroU32;

macro_rules! resource_kind {
    ($(#[$doc:meta])* $name:ident, $kind:literal, $path:literal, $style:ident, $filter:ty, $item:ty) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl Resource for $name {
            const KIND: &'static str = $kind;
            const BASE_PATH: &'static str = $path;
            const PATH_STYLE: PathStyle = PathStyle::$style;

            type Filter = $filter;
            type Item = $item;
        }
    };
}

resource_kind!(
    /// Keyword lists.
    Keywords, "keyword", "api/keywords", WordList, KeywordFilter, Keyword
);
resource_kind!(
    /// Stopword lists.
    Stopwords, "stopword", "api/stopwords", WordList, StopwordFilter, Stopword
);
resource_kind!(
    /// Equivalence lists.
    Equivalences, "equivalence", "api/equivalencies", WordList, EquivalenceFilter, Equivalence
);
resource_kind!(
    /// Raw (downloaded) corpora.
    RawCorpora, "raw_corpus", "api/raw-corpus", WordList, RawCorpusFilter, RawCorpus
);
resource_kind!(
    /// Logical corpora assembled from raw ones.
    LogicalCorpora, "logical_corpus", "api/logical-corpus", WordList, LogicalCorpusFilter, LogicalCorpus
);
resource_kind!(
    /// Topic models.
    TopicModels, "topic_model", "api/topic-model", Model, TopicModelFilter, TopicModel
);
resource_kind!(
    /// Domain classification models.
    DomainModels, "domain_model", "api/domain-model", Model, DomainModelFilter, DomainModel
);
resource_kind!(
    /// Topics of one topic model. Clients come from
    /// `ResourceClient<TopicModels>::topics`, rooted under the model's path.
    Topics, "topic", "api/topic-model", Model, TopicFilter, Topic
);

impl NamedResource for Keywords {}
impl NamedResource for Stopwords {}
impl NamedResource for Equivalences {}
impl NamedResource for LogicalCorpora {}
impl NamedResource for TopicModels {}
impl NamedResource for DomainModels {}

impl Creatable for Keywords {
    type Persist = Keyword;
}

impl Creatable for Stopwords {
    type Persist = Stopword;
}

impl Creatable for Equivalences {
    type Persist = Equivalence;
}

impl Creatable for LogicalCorpora {
    type Persist = LogicalCorpusPersist;
}

impl Patchable for RawCorpora {
    type Patch = CorpusPatch;
}

impl Patchable for LogicalCorpora {
    type Patch = CorpusPatch;
}

impl Patchable for DomainModels {
    type Patch = ModelPatch;
}

// ============================================================================
// RAW CORPUS
// ============================================================================

impl ResourceClient<RawCorpora> {
    /// Rename a raw corpus within its download source.
    pub async fn rename_in_source(
        &self,
        source: &str,
        old_name: &str,
        new_name: &str,
    ) -> Result<(), ApiClientError> {
        let body = rename_body(old_name, new_name)?;
        let suffix = format!("rename/{}", encode_name(source)?);
        self.send(Method::Put, &suffix, Some(serde_json::to_value(&body)?))
            .await?;
        Ok(())
    }
}

// ============================================================================
// TOPIC MODEL
// ============================================================================

impl ResourceClient<TopicModels> {
    /// Same request as [`query`](Self::query), with each model's tree status
    /// computed from the returned page.
    pub async fn query_tree(
        &self,
        lookup: &Lookup<TopicModelFilter>,
    ) -> Result<QueryResult<TopicModel>, ApiClientError> {
        let mut result = self.query(lookup).await?;
        annotate_tree_status(&mut result.items);
        Ok(result)
    }

    pub async fn get(&self, name: &str) -> Result<QueryResult<TopicModel>, ApiClientError> {
        let value = self.send(Method::Get, &encode_name(name)?, None).await?;
        decode(value, "topic model")
    }

    pub async fn reset(&self, name: &str) -> Result<TaskHandle, ApiClientError> {
        let suffix = format!("{}/reset", encode_name(name)?);
        let value = self.send(Method::Get, &suffix, None).await?;
        decode(value, "reset")
    }

    pub async fn train(&self, request: &TrainingRequest) -> Result<TaskHandle, ApiClientError> {
        let value = self
            .send(Method::Post, "train", Some(serde_json::to_value(request)?))
            .await?;
        decode(value, "train")
    }

    pub async fn train_logs(&self, name: &str) -> Result<Vec<String>, ApiClientError> {
        let suffix = format!("train/logs/{}", encode_name(name)?);
        let value = self.send(Method::Get, &suffix, None).await?;
        decode(value, "training logs")
    }

    pub async fn hierarchical_train_logs(
        &self,
        parent: &str,
        name: &str,
    ) -> Result<Vec<String>, ApiClientError> {
        let suffix = format!(
            "train/logs/{}/{}",
            encode_name(parent)?,
            encode_name(name)?
        );
        let value = self.send(Method::Get, &suffix, None).await?;
        decode(value, "training logs")
    }

    pub async fn task_status(&self, task: ResourceId) -> Result<String, ApiClientError> {
        let suffix = format!("tasks/{}/status", task);
        match self.send(Method::Get, &suffix, None).await? {
            Value::String(status) => Ok(status),
            other => Err(ApiClientError::InvalidResponse(format!(
                "task status is not a string: {}",
                other
            ))),
        }
    }

    /// Query client for the topics of model `name`.
    pub fn topics(&self, name: &str) -> Result<ResourceClient<Topics>, ApiClientError> {
        let base = format!("{}/{}/topics", self.base_path(), encode_name(name)?);
        Ok(ResourceClient::from_parts(
            self.transport().clone(),
            base,
            self.defaults().clone(),
            self.default_order().to_vec(),
        ))
    }

    pub async fn set_topic_labels(
        &self,
        name: &str,
        labels: &TopicLabels,
    ) -> Result<(), ApiClientError> {
        let suffix = format!("{}/topics/labels", encode_name(name)?);
        self.send(Method::Post, &suffix, Some(serde_json::to_value(labels)?))
            .await?;
        Ok(())
    }

    pub async fn similar_topics(
        &self,
        name: &str,
        pairs: NonZeroU32,
    ) -> Result<QueryResult<TopicSimilarity>, ApiClientError> {
        let suffix = format!("{}/topics/similar", encode_name(name)?);
        let body = serde_json::to_value(TopicSimilarityRequest { pairs: pairs.get() })?;
        let value = self.send(Method::Post, &suffix, Some(body)).await?;
        decode(value, "topic similarity")
    }

    pub async fn fuse_topics(&self, name: &str, topics: &[u64]) -> Result<(), ApiClientError> {
        self.topic_selection(name, "fuse", topics).await
    }

    pub async fn sort_topics(&self, name: &str) -> Result<(), ApiClientError> {
        let suffix = format!("{}/topics/sort", encode_name(name)?);
        self.send(Method::Get, &suffix, None).await?;
        Ok(())
    }

    pub async fn delete_topics(&self, name: &str, topics: &[u64]) -> Result<(), ApiClientError> {
        self.topic_selection(name, "delete", topics).await
    }

    async fn topic_selection(
        &self,
        name: &str,
        action: &str,
        topics: &[u64],
    ) -> Result<(), ApiClientError> {
        if topics.is_empty() {
            return Err(ApiClientError::InvalidRequest(format!(
                "topic {} needs at least one topic",
                action
            )));
        }
        let suffix = format!("{}/topics/{}", encode_name(name)?, action);
        let body = serde_json::to_value(TopicSelection {
            topics: topics.to_vec(),
        })?;
        self.send(Method::Post, &suffix, Some(body)).await?;
        Ok(())
    }

    /// Visualization page of model `name`, relative to the API root.
    pub fn pyldavis_url(&self, name: &str) -> Result<String, ApiClientError> {
        Ok(self.path(&format!("{}/pyLDAvis.html", encode_name(name)?)))
    }

    pub fn pyldavis_hierarchical_url(
        &self,
        parent: &str,
        name: &str,
    ) -> Result<String, ApiClientError> {
        Ok(self.path(&format!(
            "{}/{}/pyLDAvis.html",
            encode_name(parent)?,
            encode_name(name)?
        )))
    }
}

// ============================================================================
// DOMAIN MODEL
// ============================================================================

impl ResourceClient<DomainModels> {
    pub async fn train(&self, request: &TrainingRequest) -> Result<TaskHandle, ApiClientError> {
        let value = self
            .send(Method::Post, "train", Some(serde_json::to_value(request)?))
            .await?;
        decode(value, "train")
    }

    pub async fn train_logs(&self, name: &str) -> Result<Vec<String>, ApiClientError> {
        let suffix = format!("train/logs/{}", encode_name(name)?);
        let value = self.send(Method::Get, &suffix, None).await?;
        decode(value, "training logs")
    }

    pub async fn retrain(&self, request: &DomainTaskRequest) -> Result<TaskHandle, ApiClientError> {
        self.domain_task("retrain", request).await
    }

    pub async fn classify(&self, name: &str) -> Result<TaskHandle, ApiClientError> {
        let suffix = format!("{}/classify", encode_name(name)?);
        let value = self.send(Method::Get, &suffix, None).await?;
        decode(value, "classify")
    }

    pub async fn evaluate(&self, request: &DomainTaskRequest) -> Result<TaskHandle, ApiClientError> {
        self.domain_task("evaluate", request).await
    }

    /// Queue a sampling task. The sampled documents are read back with
    /// [`TaskClient::documents`](crate::tasks::TaskClient::documents).
    pub async fn sample(&self, request: &DomainTaskRequest) -> Result<TaskHandle, ApiClientError> {
        self.domain_task("sample", request).await
    }

    pub async fn give_feedback(
        &self,
        name: &str,
        labels: &FeedbackLabels,
    ) -> Result<TaskHandle, ApiClientError> {
        if labels.is_empty() {
            return Err(ApiClientError::InvalidRequest(
                "feedback needs at least one label".to_string(),
            ));
        }
        let suffix = format!("{}/give-feedback", encode_name(name)?);
        let value = self
            .send(Method::Post, &suffix, Some(serde_json::to_value(labels)?))
            .await?;
        decode(value, "feedback")
    }

    async fn domain_task(
        &self,
        action: &str,
        request: &DomainTaskRequest,
    ) -> Result<TaskHandle, ApiClientError> {
        encode_name(&request.name)?;
        let value = self
            .send(Method::Post, action, Some(serde_json::to_value(request)?))
            .await?;
        decode(value, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueryDefaults;
    use crate::transport::{Transport, TransportRequest};
    use async_trait::async_trait;
    use imt_core::{ResourceFilter, TreeStatus};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    struct Scripted {
        responses: Mutex<Vec<Value>>,
        seen: Mutex<Vec<TransportRequest>>,
    }

    impl Scripted {
        fn new(responses: Vec<Value>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn paths(&self) -> Vec<String> {
            self.seen.lock().unwrap().iter().map(|r| r.path.clone()).collect()
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn send(&self, request: TransportRequest) -> Result<Value, ApiClientError> {
            self.seen.lock().unwrap().push(request);
            let mut responses = self.responses.lock().unwrap();
            Ok(if responses.is_empty() {
                Value::Null
            } else {
                responses.remove(0)
            })
        }
    }

    #[tokio::test]
    async fn topics_client_is_rooted_under_model() {
        let transport = Scripted::new(vec![json!({ "items": [{ "id": 0, "label": "Health" }] })]);
        let models = ResourceClient::<TopicModels>::new(transport.clone(), QueryDefaults::default()).unwrap();
        let topics = models.topics("lda 50").unwrap();
        assert_eq!(topics.base_path(), "api/topic-model/lda%2050/topics");

        let lookup = topics.lookup_with(TopicFilter::default().with_like("health"));
        let result = topics.query(&lookup).await.unwrap();
        assert_eq!(result.items[0].label.as_deref(), Some("Health"));
        assert_eq!(transport.paths(), vec!["api/topic-model/lda%2050/topics/all"]);
    }

    #[tokio::test]
    async fn query_tree_annotates_without_reordering() {
        let transport = Scripted::new(vec![json!({
            "items": [
                { "id": uuid::Uuid::nil(), "name": "child", "TrDtSet": "root", "hierarchyLevel": 1 },
                { "id": uuid::Uuid::nil(), "name": "root", "TrDtSet": "cordis", "hierarchyLevel": 0 }
            ],
            "count": 2
        })]);
        let models = ResourceClient::<TopicModels>::new(transport, QueryDefaults::default()).unwrap();
        let result = models.query_tree(&models.lookup()).await.unwrap();

        assert_eq!(result.count, Some(2));
        assert_eq!(result.items[0].name, "child");
        assert_eq!(result.items[0].tree_status, TreeStatus::Disabled);
        assert_eq!(result.items[1].tree_status, TreeStatus::Collapsed);
    }

    #[tokio::test]
    async fn task_status_accepts_bare_string() {
        let transport = Scripted::new(vec![json!("FINISHED")]);
        let models = ResourceClient::<TopicModels>::new(transport.clone(), QueryDefaults::default()).unwrap();
        let task = uuid::Uuid::nil();
        assert_eq!(models.task_status(task).await.unwrap(), "FINISHED");
        assert_eq!(
            transport.paths(),
            vec![format!("api/topic-model/tasks/{}/status", task)]
        );
    }

    #[tokio::test]
    async fn topic_curation_paths() {
        let transport = Scripted::new(Vec::new());
        let models = ResourceClient::<TopicModels>::new(transport.clone(), QueryDefaults::default()).unwrap();
        models.fuse_topics("lda", &[1, 2]).await.unwrap();
        models.delete_topics("lda", &[3]).await.unwrap();
        models.sort_topics("lda").await.unwrap();
        assert!(models.fuse_topics("lda", &[]).await.is_err());

        assert_eq!(
            transport.paths(),
            vec![
                "api/topic-model/lda/topics/fuse",
                "api/topic-model/lda/topics/delete",
                "api/topic-model/lda/topics/sort",
            ]
        );
    }

    #[test]
    fn pyldavis_urls() {
        let transport = Scripted::new(Vec::new());
        let models = ResourceClient::<TopicModels>::new(transport, QueryDefaults::default()).unwrap();
        assert_eq!(
            models.pyldavis_url("lda").unwrap(),
            "api/topic-model/lda/pyLDAvis.html"
        );
        assert_eq!(
            models.pyldavis_hierarchical_url("lda", "lda_sub").unwrap(),
            "api/topic-model/lda/lda_sub/pyLDAvis.html"
        );
    }

    #[tokio::test]
    async fn raw_corpus_rename_carries_source() {
        let transport = Scripted::new(Vec::new());
        let corpora = ResourceClient::<RawCorpora>::new(transport.clone(), QueryDefaults::default()).unwrap();
        corpora
            .rename_in_source("cordis", "old", "new")
            .await
            .unwrap();
        assert_eq!(transport.paths(), vec!["api/raw-corpus/rename/cordis"]);
    }

    #[tokio::test]
    async fn raw_corpus_lookup_pins_discriminator() {
        let transport = Scripted::new(vec![json!({ "items": [] })]);
        let corpora = ResourceClient::<RawCorpora>::new(transport.clone(), QueryDefaults::default()).unwrap();
        corpora.query(&corpora.lookup()).await.unwrap();
        let body = transport.seen.lock().unwrap()[0].body.clone().unwrap();
        assert_eq!(body["corpusType"], json!("RAW"));
    }

    #[tokio::test]
    async fn domain_model_task_paths() {
        let handle = json!({ "id": uuid::Uuid::nil(), "status": "NEW" });
        let transport = Scripted::new(vec![handle.clone(); 5]);
        let models = ResourceClient::<DomainModels>::new(transport.clone(), QueryDefaults::default()).unwrap();
        let request = DomainTaskRequest::named("classifier");

        models.retrain(&request).await.unwrap();
        let task = models.classify("classifier").await.unwrap();
        assert_eq!(task.id, uuid::Uuid::nil());
        models.evaluate(&request).await.unwrap();
        models.sample(&request).await.unwrap();
        models
            .give_feedback("classifier", &FeedbackLabels::from_indices([(4, 1)]))
            .await
            .unwrap();

        assert_eq!(
            transport.paths(),
            vec![
                "api/domain-model/retrain",
                "api/domain-model/classifier/classify",
                "api/domain-model/evaluate",
                "api/domain-model/sample",
                "api/domain-model/classifier/give-feedback",
            ]
        );
        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[1].method, Method::Get);
        assert_eq!(seen[3].body, Some(json!({ "name": "classifier" })));
        assert_eq!(seen[4].body, Some(json!({ "labels": { "index4": 1 } })));
    }

    #[tokio::test]
    async fn domain_model_tasks_reject_blank_input_locally() {
        let transport = Scripted::new(Vec::new());
        let models = ResourceClient::<DomainModels>::new(transport.clone(), QueryDefaults::default()).unwrap();
        assert!(matches!(
            models.sample(&DomainTaskRequest::named(" ")).await,
            Err(ApiClientError::InvalidName(_))
        ));
        assert!(matches!(
            models.give_feedback("classifier", &FeedbackLabels::default()).await,
            Err(ApiClientError::InvalidRequest(_))
        ));
        assert!(transport.paths().is_empty());
    }
}
