//! Per-resource filters and item records.

pub mod corpus;
pub mod document;
pub mod model;
pub mod task;
pub mod topic;
pub mod wordlist;

pub use corpus::{
    CorpusPatch, LocalDataset, LogicalCorpus, LogicalCorpusField, LogicalCorpusFilter,
    LogicalCorpusPersist, MergedCorpusField, RawCorpus, RawCorpusFilter,
};
pub use document::{page_documents, Document, DocumentFilter};
pub use model::{
    annotate_tree_status, DomainModel, DomainModelFilter, ModelPatch, TaskHandle, TopicModel,
    TopicModelFilter, TrainingRequest,
};
pub use task::{DomainTaskRequest, FeedbackLabels, RunningTask};
pub use topic::{
    Topic, TopicFilter, TopicLabels, TopicSelection, TopicSimilarity, TopicSimilarityRequest,
};
pub use wordlist::{
    Equivalence, EquivalenceFilter, EquivalenceItem, Keyword, KeywordFilter, Stopword,
    StopwordFilter, WordList, WordListFilter,
};
