//! Property-Based Tests for Lookup Construction and Local Paging
//!
//! - Builder methods change exactly one dimension of a lookup.
//! - The wire form parses back into the same lookup.
//! - Local paging returns `min(size, max(0, matches - offset))` items.
//! - Projection always retains the identifier.

use imt_core::{
    page_documents, BaseFilter, Document, DocumentFilter, FieldSet, IsActive, Lookup,
    OrderItem, Page, QueryResult, ResourceFilter, ID_FIELD,
};
use proptest::prelude::*;
use uuid::Uuid;

// ============================================================================
// PROPERTY TEST STRATEGIES
// ============================================================================

fn like_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![Just(None), "[a-z]{1,12}".prop_map(Some)]
}

fn is_active_strategy() -> impl Strategy<Value = Vec<IsActive>> {
    prop::collection::vec(
        prop_oneof![Just(IsActive::Active), Just(IsActive::Inactive)],
        0..3,
    )
}

fn order_strategy() -> impl Strategy<Value = Vec<OrderItem>> {
    prop::collection::btree_set("[a-z_]{1,10}", 0..4).prop_flat_map(|fields| {
        let fields: Vec<String> = fields.into_iter().collect();
        let n = fields.len();
        prop::collection::vec(any::<bool>(), n).prop_map(move |desc| {
            fields
                .iter()
                .zip(desc)
                .map(|(f, d)| if d { OrderItem::desc(f) } else { OrderItem::asc(f) })
                .collect()
        })
    })
}

fn lookup_strategy() -> impl Strategy<Value = Lookup<BaseFilter>> {
    (
        prop::collection::vec(any::<u128>(), 0..4),
        like_strategy(),
        is_active_strategy(),
        0u64..1000,
        0u64..100,
        order_strategy(),
        prop::collection::vec("[a-z]{1,8}", 0..4),
        any::<bool>(),
    )
        .prop_map(
            |(ids, like, active, offset, size, order, project, count_all)| {
                let mut filter = BaseFilter::new()
                    .with_ids(ids.into_iter().map(Uuid::from_u128))
                    .with_is_active(active);
                if let Some(like) = like {
                    filter = filter.with_like(like);
                }
                Lookup::new(filter)
                    .with_page(offset, size)
                    .with_order(order)
                    .with_project(project)
                    .with_count_all(count_all)
            },
        )
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Replacing the page leaves filter, order, projection, and metadata alone.
    #[test]
    fn prop_with_page_changes_only_page(
        lookup in lookup_strategy(),
        offset in 0u64..10_000,
        size in 0u64..500,
    ) {
        let paged = lookup.clone().with_page(offset, size);
        prop_assert_eq!(paged.page, Page::new(offset, size));
        prop_assert_eq!(&paged.filter, &lookup.filter);
        prop_assert_eq!(&paged.order, &lookup.order);
        prop_assert_eq!(&paged.project, &lookup.project);
        prop_assert_eq!(paged.metadata, lookup.metadata);
    }

    /// Serializing and parsing a lookup yields the same lookup.
    #[test]
    fn prop_wire_form_parses_back(lookup in lookup_strategy()) {
        let json = serde_json::to_value(&lookup)
            .map_err(|e| TestCaseError::fail(format!("serialize: {}", e)))?;
        let parsed: Lookup<BaseFilter> = serde_json::from_value(json)
            .map_err(|e| TestCaseError::fail(format!("deserialize: {}", e)))?;
        prop_assert_eq!(parsed, lookup);
    }

    /// A non-empty projection always carries the identifier.
    #[test]
    fn prop_projection_keeps_identifier(fields in prop::collection::vec("[a-z]{1,8}", 1..6)) {
        let set = FieldSet::new(fields.clone());
        prop_assert!(set.fields.contains(ID_FIELD));
        for field in &fields {
            prop_assert!(set.includes(field));
        }
    }

    /// Local paging returns exactly the expected number of items.
    #[test]
    fn prop_paged_length(total in 0u64..200, offset in 0u64..300, size in 0u64..50) {
        let all: Vec<u64> = (0..total).collect();
        let page = Page::new(offset, size);
        let result = QueryResult::paged(all, &page, true);
        prop_assert_eq!(
            result.len() as u64,
            QueryResult::<u64>::expected_page_len(&page, total)
        );
        prop_assert_eq!(result.count, Some(total));
    }

    /// Paging documents never changes the reported total.
    #[test]
    fn prop_document_count_ignores_page(n in 0u64..60, offset in 0u64..80, size in 0u64..20) {
        let docs: Vec<Document> = (0..n)
            .map(|i| Document { id: Uuid::from_u128(i as u128 + 1), index: i, ..Document::default() })
            .collect();
        let lookup = Lookup::new(DocumentFilter::default())
            .with_page(offset, size)
            .with_count_all(true);
        let result = page_documents(&docs, &lookup);
        prop_assert_eq!(result.count, Some(n));
        prop_assert!(result.len() as u64 <= size);
    }

    /// Walking pages with `next` visits every item exactly once.
    #[test]
    fn prop_next_page_walk_covers_all(total in 0usize..120, size in 1u64..25) {
        let items: Vec<usize> = (0..total).collect();
        let mut seen = Vec::new();
        let mut page = Page::first(size);
        while (page.offset as usize) < total {
            seen.extend_from_slice(page.slice(&items));
            page = page.next();
        }
        prop_assert_eq!(seen, items);
    }
}
