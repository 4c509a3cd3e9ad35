//! The lookup: filter, page, order, projection, and metadata for one listing query.
//!
//! A [`Lookup`] pairs a resource filter with paging, ordering, projection, and
//! result metadata. Its `with_*` methods consume the lookup and return the
//! updated value, so a lookup handed to a client is never mutated behind the
//! caller's back.

use crate::error::{LookupError, LookupResult};
use crate::filter::ResourceFilter;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

/// Page size used when a lookup is built without explicit paging.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Identifier field, always part of a non-empty projection.
pub const ID_FIELD: &str = "id";

// ============================================================================
// PAGING
// ============================================================================

/// Window into the filtered, ordered result set.
///
/// `size == 0` asks for no rows at all; combined with `countAll` it is the
/// supported way to obtain a total without fetching items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Page {
    pub offset: u64,
    pub size: u64,
}

impl Page {
    pub fn new(offset: u64, size: u64) -> Self {
        Self { offset, size }
    }

    pub fn first(size: u64) -> Self {
        Self { offset: 0, size }
    }

    pub fn count_only() -> Self {
        Self { offset: 0, size: 0 }
    }

    pub fn is_count_only(&self) -> bool {
        self.size == 0
    }

    /// The page immediately after this one, same size.
    pub fn next(&self) -> Self {
        Self {
            offset: self.offset.saturating_add(self.size),
            size: self.size,
        }
    }

    /// Exclusive end position of this window.
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.size)
    }

    /// Window over a collection already held in memory.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let len = items.len() as u64;
        let start = self.offset.min(len) as usize;
        let end = self.end().min(len) as usize;
        &items[start..end]
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

// ============================================================================
// ORDERING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// One sort key. On the wire: `"field"` ascending, `"-field"` descending.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderItem {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderItem {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    pub fn is_descending(&self) -> bool {
        self.direction == SortDirection::Descending
    }
}

impl fmt::Display for OrderItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            SortDirection::Ascending => write!(f, "{}", self.field),
            SortDirection::Descending => write!(f, "-{}", self.field),
        }
    }
}

impl FromStr for OrderItem {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (direction, field) = match trimmed.strip_prefix('-') {
            Some(rest) => (SortDirection::Descending, rest),
            None => (
                SortDirection::Ascending,
                trimmed.strip_prefix('+').unwrap_or(trimmed),
            ),
        };
        if field.is_empty() {
            return Err(LookupError::InvalidOrderItem {
                raw: s.to_string(),
                reason: "missing field name".to_string(),
            });
        }
        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }
}

impl Serialize for OrderItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OrderItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Ordered sort keys, applied as a stable multi-key sort.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn new(items: impl IntoIterator<Item = OrderItem>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }

    /// Parse wire-form keys such as `["-creation_date", "name"]`.
    pub fn parse<I, S>(raw: I) -> LookupResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let items = raw
            .into_iter()
            .map(|s| s.as_ref().parse())
            .collect::<LookupResult<Vec<_>>>()?;
        Ok(Self { items })
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ============================================================================
// PROJECTION
// ============================================================================

/// Fields to return for each item. Empty means the full shape.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldSet {
    #[serde(default)]
    pub fields: BTreeSet<String>,
}

impl FieldSet {
    /// Build a projection. A non-empty set always includes the identifier.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields: BTreeSet<String> = fields.into_iter().map(Into::into).collect();
        if !fields.is_empty() {
            fields.insert(ID_FIELD.to_string());
        }
        Self { fields }
    }

    pub fn is_full(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether items returned under this projection carry `field`.
    pub fn includes(&self, field: &str) -> bool {
        self.is_full() || field == ID_FIELD || self.fields.contains(field)
    }
}

// ============================================================================
// METADATA
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Ask the server for the total match count, ignoring the page.
    #[serde(default)]
    pub count_all: bool,
}

// ============================================================================
// LOOKUP
// ============================================================================

/// Everything needed to run one listing query.
///
/// The filter is flattened into the top-level wire object, next to `page`,
/// `order`, `project`, and `metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lookup<F> {
    #[serde(flatten)]
    pub filter: F,
    #[serde(default)]
    pub page: Page,
    #[serde(default)]
    pub order: Order,
    #[serde(default)]
    pub project: FieldSet,
    #[serde(default)]
    pub metadata: Metadata,
}

impl<F: ResourceFilter> Lookup<F> {
    pub fn new(filter: F) -> Self {
        Self {
            filter,
            page: Page::default(),
            order: Order::default(),
            project: FieldSet::default(),
            metadata: Metadata::default(),
        }
    }

    pub fn with_filter(self, filter: F) -> Self {
        Self { filter, ..self }
    }

    /// Replace the filter with a narrowed copy of the current one.
    pub fn map_filter(self, f: impl FnOnce(F) -> F) -> Self {
        let Self {
            filter,
            page,
            order,
            project,
            metadata,
        } = self;
        Self {
            filter: f(filter),
            page,
            order,
            project,
            metadata,
        }
    }

    pub fn with_page(self, offset: u64, size: u64) -> Self {
        Self {
            page: Page::new(offset, size),
            ..self
        }
    }

    pub fn with_order(self, items: impl IntoIterator<Item = OrderItem>) -> Self {
        Self {
            order: Order::new(items),
            ..self
        }
    }

    pub fn with_project<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            project: FieldSet::new(fields),
            ..self
        }
    }

    pub fn with_count_all(self, count_all: bool) -> Self {
        Self {
            metadata: Metadata { count_all },
            ..self
        }
    }

    /// The same filter asking for the total and no rows.
    pub fn total_only(&self) -> Self {
        Self {
            filter: self.filter.clone(),
            page: Page::count_only(),
            order: Order::default(),
            project: FieldSet::default(),
            metadata: Metadata { count_all: true },
        }
    }

    pub fn count_all(&self) -> bool {
        self.metadata.count_all
    }

    /// Check the lookup before it is sent.
    ///
    /// `max_page_size` is the caller's configured ceiling; `None` disables
    /// the size check.
    pub fn validate(&self, max_page_size: Option<u64>) -> LookupResult<()> {
        if let Some(max) = max_page_size {
            if self.page.size > max {
                return Err(LookupError::PageSizeExceeded {
                    size: self.page.size,
                    max,
                });
            }
        }

        let mut seen = HashSet::new();
        for (position, item) in self.order.items.iter().enumerate() {
            if item.field.trim().is_empty() {
                return Err(LookupError::EmptyOrderField { position });
            }
            if !seen.insert(item.field.as_str()) {
                return Err(LookupError::DuplicateOrderField {
                    field: item.field.clone(),
                });
            }
        }

        if self.project.fields.iter().any(|f| f.trim().is_empty()) {
            return Err(LookupError::EmptyProjectionField);
        }

        Ok(())
    }
}

impl<F: ResourceFilter> Default for Lookup<F> {
    fn default() -> Self {
        Self::new(F::default())
    }
}
