//! IMT Core - Query Protocol Types
//!
//! Pure data structures for the Interactive Model Trainer lookup protocol:
//! filters, paging, ordering, projection, the paged result envelope, and the
//! item records of every listable resource. No I/O lives here.

mod macros;

pub mod enums;
pub mod error;
pub mod filter;
pub mod lookup;
pub mod query_result;
pub mod resources;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Identifier of a listable resource.
pub type ResourceId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

pub use enums::{CorpusType, IsActive, TaskKind, TaskStatus, TreeStatus, Visibility};
pub use error::{LookupError, LookupResult};
pub use filter::{BaseFilter, OwnedFilter, Ownership, ResourceFilter};
pub use lookup::{
    FieldSet, Lookup, Metadata, Order, OrderItem, Page, SortDirection, DEFAULT_PAGE_SIZE,
    ID_FIELD,
};
pub use query_result::QueryResult;
pub use resources::*;
