//! Running-task queue: status, logs, sampled documents, and housekeeping of
//! background training and curation tasks.

use crate::error::ApiClientError;
use crate::resource::decode;
use crate::transport::{Method, SharedTransport, TransportRequest};
use imt_core::{
    page_documents, Document, DocumentFilter, Lookup, QueryResult, ResourceId, RunningTask,
    TaskKind, TaskStatus,
};
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

pub const TASKS_PATH: &str = "api/tasks";

/// Client for `api/tasks`.
#[derive(Clone)]
pub struct TaskClient {
    transport: SharedTransport,
}

impl fmt::Debug for TaskClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskClient").field("base", &TASKS_PATH).finish()
    }
}

impl TaskClient {
    pub fn new(transport: SharedTransport) -> Self {
        Self { transport }
    }

    pub async fn status(&self, task: ResourceId) -> Result<TaskStatus, ApiClientError> {
        let value = self.get(&format!("{}/status", task)).await?;
        decode(value, "task status")
    }

    /// Remove a finished task from its queue.
    pub async fn clear(&self, task: ResourceId) -> Result<(), ApiClientError> {
        self.get(&format!("{}/clear", task)).await?;
        Ok(())
    }

    pub async fn cancel(&self, task: ResourceId) -> Result<(), ApiClientError> {
        self.get(&format!("{}/cancel", task)).await?;
        Ok(())
    }

    /// Log lines of a task. Unknown tasks have no lines.
    pub async fn logs(&self, task: ResourceId) -> Result<Vec<String>, ApiClientError> {
        let value = self.get(&format!("{}/logs", task)).await?;
        Ok(decode::<QueryResult<String>>(value, "task logs")?.items)
    }

    /// Documents sampled by a domain-model sampling task.
    pub async fn documents(&self, task: ResourceId) -> Result<Vec<Document>, ApiClientError> {
        let value = self.get(&format!("{}/documents", task)).await?;
        Ok(decode::<QueryResult<Document>>(value, "sampled documents")?.items)
    }

    /// Fetch the sample of `task` and page it locally with `lookup`.
    pub async fn query_documents(
        &self,
        task: ResourceId,
        lookup: &Lookup<DocumentFilter>,
    ) -> Result<QueryResult<Document>, ApiClientError> {
        lookup.validate(None)?;
        let documents = self.documents(task).await?;
        Ok(page_documents(&documents, lookup))
    }

    pub async fn running(&self, kind: TaskKind) -> Result<Vec<RunningTask>, ApiClientError> {
        let value = self.get(&format!("{}/running", kind)).await?;
        Ok(decode::<QueryResult<RunningTask>>(value, "running tasks")?.items)
    }

    /// Remove every finished task of `kind`.
    pub async fn clear_all(&self, kind: TaskKind) -> Result<(), ApiClientError> {
        self.get(&format!("{}/clear-all", kind)).await?;
        Ok(())
    }

    async fn get(&self, suffix: &str) -> Result<Value, ApiClientError> {
        let request = TransportRequest::new(Method::Get, format!("{}/{}", TASKS_PATH, suffix));
        debug!(path = %request.path, "Sending task request");
        self.transport
            .send(request)
            .await
            .inspect_err(|e| warn!(error = %e, "Task request failed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Transport;
    use async_trait::async_trait;
    use imt_core::ResourceFilter;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    struct Replies {
        replies: Mutex<Vec<Value>>,
        paths: Mutex<Vec<String>>,
    }

    impl Replies {
        fn new(replies: Vec<Value>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies),
                paths: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transport for Replies {
        async fn send(&self, request: TransportRequest) -> Result<Value, ApiClientError> {
            assert_eq!(request.method, Method::Get);
            self.paths.lock().unwrap().push(request.path);
            let mut replies = self.replies.lock().unwrap();
            Ok(if replies.is_empty() {
                Value::Null
            } else {
                replies.remove(0)
            })
        }
    }

    fn sampled(n: u64) -> Value {
        let items: Vec<Value> = (0..n)
            .map(|i| {
                json!({
                    "id": Uuid::from_u128(i as u128 + 1),
                    "index": i,
                    "title": format!("{} document {}", if i % 2 == 0 { "health" } else { "energy" }, i),
                })
            })
            .collect();
        json!({ "items": items, "count": n })
    }

    #[tokio::test]
    async fn housekeeping_paths() {
        let transport = Replies::new(vec![json!("PENDING")]);
        let tasks = TaskClient::new(transport.clone());
        let task = Uuid::nil();

        assert_eq!(tasks.status(task).await.unwrap(), TaskStatus::Pending);
        tasks.clear(task).await.unwrap();
        tasks.cancel(task).await.unwrap();
        tasks.clear_all(TaskKind::Curating).await.unwrap();

        assert_eq!(
            *transport.paths.lock().unwrap(),
            vec![
                format!("api/tasks/{}/status", task),
                format!("api/tasks/{}/clear", task),
                format!("api/tasks/{}/cancel", task),
                "api/tasks/curating/clear-all".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn logs_and_running_unwrap_envelope() {
        let transport = Replies::new(vec![
            json!({ "items": ["INFO: started", "INFO: done"] }),
            json!({ "items": [{ "task": Uuid::nil(), "type": "training", "finished": false }] }),
        ]);
        let tasks = TaskClient::new(transport.clone());

        let lines = tasks.logs(Uuid::nil()).await.unwrap();
        assert_eq!(lines, vec!["INFO: started", "INFO: done"]);
        let running = tasks.running(TaskKind::Training).await.unwrap();
        assert_eq!(running.len(), 1);
        assert!(!running[0].finished);
        assert_eq!(transport.paths.lock().unwrap()[1], "api/tasks/training/running");
    }

    #[tokio::test]
    async fn sampled_documents_are_paged_locally() {
        let transport = Replies::new(vec![sampled(9)]);
        let tasks = TaskClient::new(transport.clone());
        let lookup = Lookup::new(DocumentFilter::default().with_like("health"))
            .with_page(2, 2)
            .with_count_all(true);

        let page = tasks.query_documents(Uuid::nil(), &lookup).await.unwrap();
        assert_eq!(page.total(), Some(5));
        let indices: Vec<u64> = page.items.iter().map(|d| d.index).collect();
        assert_eq!(indices, vec![4, 6]);
        assert_eq!(transport.paths.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_status_is_invalid_response() {
        let tasks = TaskClient::new(Replies::new(Vec::new()));
        assert!(matches!(
            tasks.status(Uuid::nil()).await,
            Err(ApiClientError::InvalidResponse(_))
        ));
    }
}
