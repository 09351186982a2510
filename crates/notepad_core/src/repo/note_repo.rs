//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/update/delete/select over the single `notes` table.
//! - Build `WHERE` clauses from typed `NoteFilter` values.
//!
//! # Invariants
//! - Selects always order by a total order (`_id` breaks ties).
//! - Pages continue after the sort key of the last returned row, so a write
//!   landing between pages never shifts rows that are still to come.
//! - Empty change sets never reach SQL.

use crate::contract::{COLUMN_BODY, COLUMN_ID, COLUMN_TITLE, TABLE_NAME};
use crate::model::note::{Note, NoteChanges, NoteId};
use crate::model::query::{Column, NoteFilter, Projection, SortOrder};
use crate::repo::RepoResult;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde::{Deserialize, Serialize};

/// One selected row. Columns outside the projection are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRow {
    pub id: Option<NoteId>,
    pub title: Option<String>,
    pub body: Option<String>,
}

impl NoteRow {
    /// Full note when the row was selected with every column.
    pub fn into_note(self) -> Option<Note> {
        Some(Note {
            id: self.id?,
            title: self.title?,
            body: self.body?,
        })
    }
}

/// Sort key of one selected row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageKey {
    pub id: NoteId,
    pub title: String,
}

/// Page request for select operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    /// Key of the last row of the previous page; `None` starts from the top.
    pub after: Option<PageKey>,
}

/// One page of selected rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePage {
    pub rows: Vec<NoteRow>,
    /// Key of the last row in `rows`, to resume from.
    pub last_key: Option<PageKey>,
}

/// Repository interface for note rows.
pub trait NoteRepository {
    /// Inserts one row and returns the id SQLite assigned to it.
    fn insert_note(&self, title: &str, body: &str) -> RepoResult<NoteId>;
    /// Applies `changes` to every row matching `filter`; returns rows affected.
    fn update_notes(&self, changes: NoteChanges<'_>, filter: Option<&NoteFilter>)
        -> RepoResult<usize>;
    /// Deletes every row matching `filter`; returns rows affected.
    fn delete_notes(&self, filter: Option<&NoteFilter>) -> RepoResult<usize>;
    /// Selects one page of rows.
    fn select_notes(
        &self,
        projection: &Projection,
        filter: Option<&NoteFilter>,
        sort: SortOrder,
        page: &PageRequest,
    ) -> RepoResult<NotePage>;
}

/// SQLite-backed note repository borrowing a ready connection.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn insert_note(&self, title: &str, body: &str) -> RepoResult<NoteId> {
        self.conn.execute(
            &format!("INSERT INTO {TABLE_NAME} ({COLUMN_TITLE}, {COLUMN_BODY}) VALUES (?1, ?2);"),
            params![title, body],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_notes(
        &self,
        changes: NoteChanges<'_>,
        filter: Option<&NoteFilter>,
    ) -> RepoResult<usize> {
        if changes.is_empty() {
            return Ok(0);
        }

        let mut assignments = Vec::with_capacity(2);
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(title) = changes.title {
            assignments.push(format!("{COLUMN_TITLE} = ?"));
            bind_values.push(Value::Text(title.to_string()));
        }
        if let Some(body) = changes.body {
            assignments.push(format!("{COLUMN_BODY} = ?"));
            bind_values.push(Value::Text(body.to_string()));
        }

        let mut sql = format!("UPDATE {TABLE_NAME} SET {}", assignments.join(", "));
        push_where_clause(&mut sql, &mut bind_values, filter);
        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        Ok(changed)
    }

    fn delete_notes(&self, filter: Option<&NoteFilter>) -> RepoResult<usize> {
        let mut sql = format!("DELETE FROM {TABLE_NAME}");
        let mut bind_values: Vec<Value> = Vec::new();
        push_where_clause(&mut sql, &mut bind_values, filter);
        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        Ok(changed)
    }

    fn select_notes(
        &self,
        projection: &Projection,
        filter: Option<&NoteFilter>,
        sort: SortOrder,
        page: &PageRequest,
    ) -> RepoResult<NotePage> {
        let column_list = projection
            .columns()
            .iter()
            .map(|column| column.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        // Sort key columns are selected under aliases so paging works for
        // projections that leave them out.
        let mut sql = format!(
            "SELECT {COLUMN_ID} AS {KEY_ID}, {COLUMN_TITLE} AS {KEY_TITLE}, {column_list} \
             FROM {TABLE_NAME}"
        );
        let mut bind_values: Vec<Value> = Vec::new();
        let mut clauses = Vec::with_capacity(2);
        if let Some(filter) = filter {
            clauses.push(format!("({})", filter_sql(filter, &mut bind_values)));
        }
        if let Some(after) = &page.after {
            clauses.push(keyset_sql(sort, after, &mut bind_values));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(sort.as_sql());
        sql.push_str(" LIMIT ?");
        bind_values.push(Value::Integer(i64::from(page.limit)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut notes = NotePage::default();
        while let Some(row) = rows.next()? {
            notes.rows.push(parse_note_row(row, projection)?);
            notes.last_key = Some(PageKey {
                id: row.get(KEY_ID)?,
                title: row.get(KEY_TITLE)?,
            });
        }
        Ok(notes)
    }
}

const KEY_ID: &str = "page_key_id";
const KEY_TITLE: &str = "page_key_title";

/// Condition selecting the rows that sort strictly after `after`.
fn keyset_sql(sort: SortOrder, after: &PageKey, bind_values: &mut Vec<Value>) -> String {
    match sort {
        SortOrder::Insertion => {
            bind_values.push(Value::Integer(after.id));
            format!("{COLUMN_ID} > ?")
        }
        SortOrder::NewestFirst => {
            bind_values.push(Value::Integer(after.id));
            format!("{COLUMN_ID} < ?")
        }
        SortOrder::TitleAscending => {
            bind_values.push(Value::Text(after.title.clone()));
            bind_values.push(Value::Text(after.title.clone()));
            bind_values.push(Value::Integer(after.id));
            format!(
                "({COLUMN_TITLE} COLLATE NOCASE > ? \
                 OR ({COLUMN_TITLE} COLLATE NOCASE = ? AND {COLUMN_ID} > ?))"
            )
        }
    }
}

fn push_where_clause(sql: &mut String, bind_values: &mut Vec<Value>, filter: Option<&NoteFilter>) {
    if let Some(filter) = filter {
        sql.push_str(" WHERE ");
        sql.push_str(&filter_sql(filter, bind_values));
    }
}

fn filter_sql(filter: &NoteFilter, bind_values: &mut Vec<Value>) -> String {
    match filter {
        NoteFilter::IdEquals(id) => {
            bind_values.push(Value::Integer(*id));
            format!("{COLUMN_ID} = ?")
        }
        NoteFilter::TitleEquals(title) => {
            bind_values.push(Value::Text(title.clone()));
            format!("{COLUMN_TITLE} = ?")
        }
        NoteFilter::TitleContains(needle) => {
            bind_values.push(Value::Text(needle.clone()));
            format!("instr({COLUMN_TITLE}, ?) > 0")
        }
        NoteFilter::BodyContains(needle) => {
            bind_values.push(Value::Text(needle.clone()));
            format!("instr({COLUMN_BODY}, ?) > 0")
        }
        NoteFilter::All(filters) if filters.is_empty() => "1 = 1".to_string(),
        NoteFilter::All(filters) => {
            let parts = filters
                .iter()
                .map(|nested| format!("({})", filter_sql(nested, bind_values)))
                .collect::<Vec<_>>();
            parts.join(" AND ")
        }
    }
}

fn parse_note_row(row: &Row<'_>, projection: &Projection) -> RepoResult<NoteRow> {
    let mut note = NoteRow::default();
    for column in projection.columns() {
        match column {
            Column::Id => note.id = Some(row.get(COLUMN_ID)?),
            Column::Title => note.title = Some(row.get(COLUMN_TITLE)?),
            Column::Body => note.body = Some(row.get(COLUMN_BODY)?),
        }
    }
    Ok(note)
}

#[cfg(test)]
mod tests {
    use super::{filter_sql, keyset_sql, NoteFilter, PageKey, SortOrder};
    use rusqlite::types::Value;

    #[test]
    fn conjunction_binds_values_in_clause_order() {
        let mut bind_values = Vec::new();
        let sql = filter_sql(
            &NoteFilter::All(vec![
                NoteFilter::TitleContains("grocer".to_string()),
                NoteFilter::IdEquals(4),
            ]),
            &mut bind_values,
        );
        assert_eq!(sql, "(instr(title, ?) > 0) AND (_id = ?)");
        assert_eq!(
            bind_values,
            vec![Value::Text("grocer".to_string()), Value::Integer(4)]
        );
    }

    #[test]
    fn empty_conjunction_matches_everything() {
        let mut bind_values = Vec::new();
        assert_eq!(filter_sql(&NoteFilter::All(Vec::new()), &mut bind_values), "1 = 1");
        assert!(bind_values.is_empty());
    }

    #[test]
    fn title_keyset_breaks_ties_by_id() {
        let mut bind_values = Vec::new();
        let after = PageKey {
            id: 9,
            title: "Milk".to_string(),
        };
        let sql = keyset_sql(SortOrder::TitleAscending, &after, &mut bind_values);
        assert_eq!(
            sql,
            "(title COLLATE NOCASE > ? OR (title COLLATE NOCASE = ? AND _id > ?))"
        );
        assert_eq!(
            bind_values,
            vec![
                Value::Text("Milk".to_string()),
                Value::Text("Milk".to_string()),
                Value::Integer(9)
            ]
        );
        assert_eq!(
            keyset_sql(SortOrder::NewestFirst, &after, &mut Vec::new()),
            "_id < ?"
        );
    }
}
