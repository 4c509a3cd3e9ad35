//! IMT Test Utilities
//!
//! Shared test infrastructure for the IMT workspace:
//! - An in-memory backend that evaluates lookups like the server does
//! - Proptest generators for filters, pages, orders, and records
//! - Fixtures for common listing scenarios

mod backend;

pub use backend::InMemoryBackend;

pub use imt_core::{
    BaseFilter, CorpusType, IsActive, Keyword, KeywordFilter, LogicalCorpus, Lookup, Order,
    OrderItem, OwnedFilter, Page, QueryResult, RawCorpus, ResourceFilter, ResourceId, Timestamp,
    Topic, TopicModel, Visibility, WordListFilter,
};

use chrono::{DateTime, Utc};
use imt_client::{ApiClient, ApiClientError, QueryDefaults, SharedTransport};
use std::sync::Arc;
use uuid::Uuid;

/// Base paths the backend serves, by resource kind.
pub mod paths {
    pub const KEYWORDS: &str = "api/keywords";
    pub const STOPWORDS: &str = "api/stopwords";
    pub const EQUIVALENCES: &str = "api/equivalencies";
    pub const RAW_CORPUS: &str = "api/raw-corpus";
    pub const LOGICAL_CORPUS: &str = "api/logical-corpus";
    pub const TOPIC_MODELS: &str = "api/topic-model";
    pub const DOMAIN_MODELS: &str = "api/domain-model";

    /// Base path of the topics of `model`.
    pub fn topics(model: &str) -> String {
        format!("{}/{}/topics", TOPIC_MODELS, model)
    }
}

/// Client wired to `backend` with a generous page ceiling and no default order.
pub fn client_for(backend: &InMemoryBackend) -> Result<ApiClient, ApiClientError> {
    let transport: SharedTransport = Arc::new(backend.clone());
    ApiClient::with_transport(
        transport,
        QueryDefaults {
            default_page_size: 10,
            max_page_size: 1000,
            default_order: Vec::new(),
        },
    )
}

fn timestamp(secs: i64) -> Timestamp {
    DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built records for common listing scenarios.

    use super::*;

    /// 2024-01-01T00:00:00Z.
    pub const EPOCH: i64 = 1_704_067_200;

    pub const ALICE: &str = "alice";
    pub const BOB: &str = "bob";

    /// A public keyword list owned by `creator`, created `day` days after [`EPOCH`].
    pub fn keyword(name: &str, creator: &str, day: i64) -> Keyword {
        let mut keyword = Keyword::new(name, vec![name.to_string()]);
        keyword.id = Uuid::now_v7();
        keyword.creator = Some(creator.to_string());
        keyword.visibility = Some(Visibility::Public);
        keyword.creation_date = Some(timestamp(EPOCH + day * 86_400));
        keyword
    }

    /// Keyword lists for the "report" listing scenario.
    pub struct ReportScenario {
        /// Twelve active lists; five of them have "report" in their name.
        pub active: Vec<Keyword>,
        /// Three deleted lists, one of them a "report" list.
        pub inactive: Vec<Keyword>,
    }

    impl ReportScenario {
        pub fn new() -> Self {
            let reports = [
                "annual-report",
                "Report-2023",
                "quarterly-report",
                "report-drafts",
                "incident-REPORT",
            ];
            let others = [
                "health", "energy", "climate", "transport", "finance", "education", "water",
            ];

            let mut active = Vec::new();
            for (day, name) in reports.iter().enumerate() {
                let creator = if day % 2 == 0 { ALICE } else { BOB };
                active.push(keyword(name, creator, day as i64 + 1));
            }
            for (day, name) in others.iter().enumerate() {
                active.push(keyword(name, ALICE, day as i64 + 10));
            }

            let inactive = vec![
                keyword("old-report", ALICE, 30),
                keyword("legacy", BOB, 31),
                keyword("archived", ALICE, 32),
            ];

            Self { active, inactive }
        }

        /// Active lists whose name contains "report", newest first.
        pub fn active_reports_newest_first(&self) -> Vec<&Keyword> {
            let mut reports: Vec<&Keyword> = self
                .active
                .iter()
                .filter(|k| k.name.to_lowercase().contains("report"))
                .collect();
            reports.sort_by(|a, b| b.creation_date.cmp(&a.creation_date));
            reports
        }

        /// A backend holding every list of the scenario.
        pub fn backend(&self) -> InMemoryBackend {
            let backend = InMemoryBackend::new().with_principal(ALICE);
            backend.seed(paths::KEYWORDS, &self.active);
            for keyword in &self.inactive {
                backend.insert(paths::KEYWORDS, keyword, IsActive::Inactive);
            }
            backend
        }
    }

    impl Default for ReportScenario {
        fn default() -> Self {
            Self::new()
        }
    }

    /// A topic model at `level` of a hierarchy.
    pub fn topic_model(name: &str, level: u32, parent: Option<&str>) -> TopicModel {
        TopicModel {
            id: Uuid::now_v7(),
            name: name.to_string(),
            model_type: Some("mallet".to_string()),
            visibility: Some(Visibility::Public),
            creator: Some(ALICE.to_string()),
            creation_date: Some(timestamp(EPOCH)),
            parent_name: parent.map(str::to_string),
            training_dataset: parent.map(str::to_string),
            hierarchy_level: level,
            ..TopicModel::default()
        }
    }

    /// Two root models, the first with two submodels.
    pub fn topic_model_tree() -> Vec<TopicModel> {
        vec![
            topic_model("root-a", 0, None),
            topic_model("root-a-sub-1", 1, Some("root-a")),
            topic_model("root-a-sub-2", 1, Some("root-a")),
            topic_model("root-b", 0, None),
        ]
    }

    /// `count` topics numbered from zero, with labels `topic-{n}`.
    pub fn topics(count: u64) -> Vec<Topic> {
        (0..count)
            .map(|id| Topic {
                id,
                size: Some(format!("{:.2}", 1.0 / (id + 1) as f64)),
                label: Some(format!("topic-{}", id)),
                word_description: Some(format!("word{}, term{}, common", id, id)),
                ..Topic::default()
            })
            .collect()
    }

    pub fn raw_corpus(name: &str, records: u64) -> RawCorpus {
        RawCorpus {
            id: Uuid::now_v7(),
            name: name.to_string(),
            visibility: Some(Visibility::Public),
            records,
            source: Some("cordis".to_string()),
            ..RawCorpus::default()
        }
    }

    pub fn logical_corpus(name: &str, creator: &str, valid_for: &str) -> LogicalCorpus {
        LogicalCorpus {
            id: Uuid::now_v7(),
            name: name.to_string(),
            visibility: Some(Visibility::Private),
            creator: Some(creator.to_string()),
            creation_date: Some(timestamp(EPOCH)),
            valid_for: Some(valid_for.to_string()),
            ..LogicalCorpus::default()
        }
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for the lookup protocol.

    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    /// Creators drawn from a small pool so ownership filters hit.
    pub const CREATORS: &[&str] = &["alice", "bob", "carol"];

    /// Fragments drawn from a small pool so `like` filters hit.
    pub const FRAGMENTS: &[&str] = &["report", "health", "a", "x-"];

    /// Keyword fields a lookup may order by.
    pub const ORDER_FIELDS: &[&str] = &["name", "creator", "creation_date", "description"];

    pub fn arb_uuid() -> impl Strategy<Value = Uuid> {
        any::<[u8; 16]>().prop_map(Uuid::from_bytes)
    }

    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1577836800i64..1893456000i64).prop_map(timestamp)
    }

    pub fn arb_is_active() -> impl Strategy<Value = IsActive> {
        prop_oneof![Just(IsActive::Active), Just(IsActive::Inactive)]
    }

    /// Possibly empty set of lifecycle states.
    pub fn arb_is_active_set() -> impl Strategy<Value = BTreeSet<IsActive>> {
        prop::collection::btree_set(arb_is_active(), 0..=2)
    }

    pub fn arb_visibility() -> impl Strategy<Value = Visibility> {
        prop_oneof![Just(Visibility::Public), Just(Visibility::Private)]
    }

    pub fn arb_creator() -> impl Strategy<Value = String> {
        prop::sample::select(CREATORS).prop_map(str::to_string)
    }

    /// A page with a non-zero size.
    pub fn arb_page() -> impl Strategy<Value = Page> {
        (0u64..40, 1u64..=20).prop_map(|(offset, size)| Page::new(offset, size))
    }

    pub fn arb_order_item() -> impl Strategy<Value = OrderItem> {
        (prop::sample::select(ORDER_FIELDS), any::<bool>()).prop_map(|(field, desc)| {
            if desc {
                OrderItem::desc(field)
            } else {
                OrderItem::asc(field)
            }
        })
    }

    /// An order naming each field at most once.
    pub fn arb_order() -> impl Strategy<Value = Vec<OrderItem>> {
        prop::collection::vec(arb_order_item(), 0..=3).prop_map(|items| {
            let mut seen = BTreeSet::new();
            items
                .into_iter()
                .filter(|item| seen.insert(item.field.clone()))
                .collect()
        })
    }

    pub fn arb_keyword() -> impl Strategy<Value = Keyword> {
        (
            arb_uuid(),
            "[a-z]{1,6}(-report|-health|-x)?",
            prop::option::of("[a-z ]{0,12}"),
            arb_creator(),
            arb_visibility(),
            arb_timestamp(),
        )
            .prop_map(|(id, name, description, creator, visibility, created)| {
                let mut keyword = Keyword::new(name.clone(), vec![name]);
                keyword.id = id;
                keyword.description = description;
                keyword.creator = Some(creator);
                keyword.visibility = Some(visibility);
                keyword.creation_date = Some(created);
                keyword
            })
    }

    /// Keyword lists paired with their lifecycle state.
    pub fn arb_keyword_dataset(
        max: usize,
    ) -> impl Strategy<Value = Vec<(Keyword, IsActive)>> {
        prop::collection::vec((arb_keyword(), arb_is_active()), 0..=max)
    }

    /// Filter over word lists, drawn from the same pools as [`arb_keyword`].
    pub fn arb_word_list_filter() -> impl Strategy<Value = WordListFilter> {
        (
            prop::option::of(prop::sample::select(FRAGMENTS)),
            arb_is_active_set(),
            prop::option::of(arb_creator()),
            any::<bool>(),
            prop::collection::btree_set(arb_visibility(), 0..=2),
        )
            .prop_map(|(like, is_active, creator, mine, visibilities)| {
                let mut filter = WordListFilter::default()
                    .with_is_active(is_active)
                    .with_visibilities(visibilities);
                if let Some(like) = like {
                    filter = filter.with_like(like);
                }
                if let Some(creator) = creator {
                    filter = filter.with_creator(creator);
                }
                filter.with_mine(mine)
            })
    }

    pub fn arb_keyword_lookup() -> impl Strategy<Value = Lookup<WordListFilter>> {
        (arb_word_list_filter(), arb_page(), arb_order(), any::<bool>()).prop_map(
            |(filter, page, order, count_all)| {
                Lookup::new(filter)
                    .with_page(page.offset, page.size)
                    .with_order(order)
                    .with_count_all(count_all)
            },
        )
    }
}
