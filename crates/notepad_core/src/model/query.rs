//! Typed read vocabulary: projections, filters and sort orders.
//!
//! Filters are a closed set of simple predicates over the note columns.
//! Conjunction is the only combinator.

use crate::contract::{COLUMN_BODY, COLUMN_ID, COLUMN_TITLE};
use crate::model::note::NoteId;
use serde::{Deserialize, Serialize};

/// Column of the `notes` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Id,
    Title,
    Body,
}

impl Column {
    pub const ALL: [Column; 3] = [Column::Id, Column::Title, Column::Body];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => COLUMN_ID,
            Self::Title => COLUMN_TITLE,
            Self::Body => COLUMN_BODY,
        }
    }
}

/// Ordered set of columns requested by a query. Empty means every column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    columns: Vec<Column>,
}

impl Projection {
    pub fn all() -> Self {
        Self::default()
    }

    /// Builds a projection, dropping duplicate columns but keeping order.
    pub fn of(columns: &[Column]) -> Self {
        let mut unique = Vec::with_capacity(columns.len());
        for column in columns {
            if !unique.contains(column) {
                unique.push(*column);
            }
        }
        Self { columns: unique }
    }

    /// Effective column list.
    pub fn columns(&self) -> &[Column] {
        if self.columns.is_empty() {
            &Column::ALL
        } else {
            &self.columns
        }
    }

    pub fn includes(&self, column: Column) -> bool {
        self.columns().contains(&column)
    }
}

/// Row predicate for query/update/delete requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteFilter {
    IdEquals(NoteId),
    TitleEquals(String),
    /// Case-sensitive substring match.
    TitleContains(String),
    /// Case-sensitive substring match.
    BodyContains(String),
    /// Every nested filter must match. An empty list matches every row.
    All(Vec<NoteFilter>),
}

/// Result ordering for collection queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending `_id`, i.e. the order notes were created in.
    #[default]
    Insertion,
    NewestFirst,
    /// Case-insensitive title order, ties broken by `_id`.
    TitleAscending,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Insertion => "_id ASC",
            Self::NewestFirst => "_id DESC",
            Self::TitleAscending => "title COLLATE NOCASE ASC, _id ASC",
        }
    }
}
