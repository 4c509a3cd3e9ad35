//! Word lists: keywords, stopwords, and equivalences.

use crate::enums::Visibility;
use crate::filter::{BaseFilter, Ownership};
use crate::{ResourceId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Filter shared by the three word-list kinds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WordListFilter {
    #[serde(flatten)]
    pub base: BaseFilter,
    #[serde(flatten)]
    pub ownership: Ownership,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub visibilities: BTreeSet<Visibility>,
}

crate::impl_owned_filter!(WordListFilter);

pub type KeywordFilter = WordListFilter;
pub type StopwordFilter = WordListFilter;
pub type EquivalenceFilter = WordListFilter;

/// A named list of words owned by a user.
///
/// Every field except `id` may be missing when the lookup projected it away.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WordList<W> {
    pub id: ResourceId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_for: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    pub wordlist: Vec<W>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<Timestamp>,
}

impl<W> WordList<W> {
    pub fn new(name: impl Into<String>, wordlist: Vec<W>) -> Self {
        Self {
            id: ResourceId::nil(),
            name: name.into(),
            description: None,
            valid_for: None,
            visibility: None,
            wordlist,
            creator: None,
            location: None,
            creation_date: None,
        }
    }
}

/// A term and the term it is replaced with.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EquivalenceItem {
    pub term: String,
    pub equivalence: String,
}

pub type Keyword = WordList<String>;
pub type Stopword = WordList<String>;
pub type Equivalence = WordList<EquivalenceItem>;
