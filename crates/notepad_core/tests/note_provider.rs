use crossbeam::channel::{unbounded, Receiver};
use notepad_core::db::{open_db, OpenMode};
use notepad_core::{
    ChangeEvent, ChangeKind, Column, NoteFilter, NoteProvider, NoteResource, NoteStore,
    NoteValidationError, NoteValues, ProviderError, Projection, SortOrder,
};
use std::sync::Arc;

const AUTHORITY: &str = "com.example.android.notepad";
const NOTES_URI: &str = "content://com.example.android.notepad/notes";

fn provider_with_events() -> (NoteProvider, Receiver<ChangeEvent>) {
    let (sender, receiver) = unbounded();
    let provider = NoteProvider::new(AUTHORITY, Arc::new(NoteStore::in_memory()), Arc::new(sender));
    (provider, receiver)
}

fn insert(provider: &NoteProvider, title: &str, body: &str) -> String {
    provider
        .insert(NOTES_URI, &NoteValues::with_note(title, body))
        .unwrap()
        .expect("insert should persist")
}

fn fetch(provider: &NoteProvider, uri: &str) -> Option<(String, String)> {
    let mut cursor = provider
        .query(uri, &Projection::all(), None, SortOrder::Insertion)
        .unwrap();
    cursor.next().map(|row| {
        let row = row.unwrap();
        (row.title.unwrap(), row.body.unwrap())
    })
}

fn count(provider: &NoteProvider) -> usize {
    provider
        .query(NOTES_URI, &Projection::of(&[Column::Id]), None, SortOrder::Insertion)
        .unwrap()
        .count()
}

#[test]
fn insert_returns_item_uri_and_round_trips_fields() {
    let (provider, events) = provider_with_events();

    let uri = insert(&provider, "Groceries", "Milk, eggs");
    assert_eq!(uri, "content://com.example.android.notepad/notes/1");
    assert_eq!(
        fetch(&provider, &uri),
        Some(("Groceries".to_string(), "Milk, eggs".to_string()))
    );

    let event = events.try_recv().expect("insert notifies");
    assert_eq!(event.uri, NOTES_URI);
    assert_eq!(event.resource, NoteResource::Collection);
    assert_eq!(event.kind, ChangeKind::Inserted);
}

#[test]
fn insert_accepts_empty_strings_and_bare_paths() {
    let (provider, _events) = provider_with_events();

    let uri = provider
        .insert("notes", &NoteValues::with_note("", ""))
        .unwrap()
        .unwrap();
    assert_eq!(fetch(&provider, &uri), Some((String::new(), String::new())));
}

#[test]
fn insert_with_null_or_missing_field_is_rejected_without_side_effects() {
    let (provider, events) = provider_with_events();

    let mut null_title = NoteValues::new();
    null_title.put_null("title").put("body", "text");
    let err = provider.insert(NOTES_URI, &null_title).unwrap_err();
    assert!(matches!(
        err,
        ProviderError::Validation(NoteValidationError::NullTitle)
    ));

    let mut missing_body = NoteValues::new();
    missing_body.put("title", "only title");
    let err = provider.insert(NOTES_URI, &missing_body).unwrap_err();
    assert!(err.is_validation());

    assert_eq!(count(&provider), 0);
    assert!(events.try_recv().is_err());
}

#[test]
fn insert_into_item_uri_is_invalid_resource() {
    let (provider, _events) = provider_with_events();

    let err = provider
        .insert(&format!("{NOTES_URI}/1"), &NoteValues::with_note("a", "b"))
        .unwrap_err();
    assert!(matches!(
        err,
        ProviderError::InvalidResource { operation: "insert", .. }
    ));
}

#[test]
fn unknown_resource_shapes_fail_for_every_operation() {
    let (provider, _events) = provider_with_events();
    let bad = "content://com.example.android.notepad/tags";

    assert!(provider
        .query(bad, &Projection::all(), None, SortOrder::Insertion)
        .unwrap_err()
        .is_invalid_resource());
    assert!(provider
        .insert(bad, &NoteValues::with_note("a", "b"))
        .unwrap_err()
        .is_invalid_resource());
    assert!(provider
        .update(bad, &NoteValues::with_note("a", "b"), None)
        .unwrap_err()
        .is_invalid_resource());
    assert!(provider.delete(bad, None).unwrap_err().is_invalid_resource());
    assert!(provider.get_type(bad).unwrap_err().is_invalid_resource());
}

#[test]
fn insert_store_rejection_returns_sentinel() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Notes.db");
    drop(open_db(&path, OpenMode::ReadWrite).unwrap());

    let (sender, events) = unbounded::<ChangeEvent>();
    let provider = NoteProvider::new(
        AUTHORITY,
        Arc::new(NoteStore::file_read_only(&path)),
        Arc::new(sender),
    );

    let result = provider
        .insert(NOTES_URI, &NoteValues::with_note("title", "body"))
        .expect("store rejection is not an error");
    assert_eq!(result, None);
    assert!(events.try_recv().is_err());
}

#[test]
fn open_failure_is_a_hard_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("Notes.db");
    let provider = NoteProvider::new(
        AUTHORITY,
        Arc::new(NoteStore::file(path)),
        Arc::new(notepad_core::NoopListener),
    );

    let err = provider
        .insert(NOTES_URI, &NoteValues::with_note("title", "body"))
        .unwrap_err();
    assert!(err.is_storage());
    assert!(provider
        .query(NOTES_URI, &Projection::all(), None, SortOrder::Insertion)
        .unwrap_err()
        .is_storage());
}

#[test]
fn partial_update_changes_only_supplied_field() {
    let (provider, events) = provider_with_events();
    let uri = insert(&provider, "Title", "Body");
    events.try_recv().unwrap();

    let mut title_only = NoteValues::new();
    title_only.put("title", "New title");
    assert_eq!(provider.update(&uri, &title_only, None).unwrap(), 1);
    assert_eq!(
        fetch(&provider, &uri),
        Some(("New title".to_string(), "Body".to_string()))
    );

    let mut body_only = NoteValues::new();
    body_only.put("body", "New body");
    assert_eq!(provider.update(&uri, &body_only, None).unwrap(), 1);
    assert_eq!(
        fetch(&provider, &uri),
        Some(("New title".to_string(), "New body".to_string()))
    );

    let event = events.try_recv().expect("update notifies");
    assert_eq!(event.uri, uri);
    assert_eq!(event.kind, ChangeKind::Updated);
}

#[test]
fn update_with_empty_values_affects_nothing_and_does_not_notify() {
    let (provider, events) = provider_with_events();
    let uri = insert(&provider, "Title", "Body");
    events.try_recv().unwrap();

    assert_eq!(provider.update(&uri, &NoteValues::new(), None).unwrap(), 0);

    let mut unknown_only = NoteValues::new();
    unknown_only.put("color", "blue");
    assert_eq!(provider.update(&uri, &unknown_only, None).unwrap(), 0);

    assert_eq!(
        fetch(&provider, &uri),
        Some(("Title".to_string(), "Body".to_string()))
    );
    assert!(events.try_recv().is_err());
}

#[test]
fn update_with_null_field_is_rejected() {
    let (provider, _events) = provider_with_events();
    let uri = insert(&provider, "Title", "Body");

    let mut null_body = NoteValues::new();
    null_body.put_null("body");
    let err = provider.update(&uri, &null_body, None).unwrap_err();
    assert!(matches!(
        err,
        ProviderError::Validation(NoteValidationError::NullBody)
    ));
}

#[test]
fn item_update_ignores_caller_filter() {
    let (provider, _events) = provider_with_events();
    let first = insert(&provider, "first", "a");
    let second = insert(&provider, "second", "b");

    let mut values = NoteValues::new();
    values.put("body", "changed");
    let filter = NoteFilter::TitleEquals("second".to_string());
    assert_eq!(provider.update(&first, &values, Some(&filter)).unwrap(), 1);

    assert_eq!(fetch(&provider, &first).unwrap().1, "changed");
    assert_eq!(fetch(&provider, &second).unwrap().1, "b");
}

#[test]
fn collection_update_applies_filter() {
    let (provider, events) = provider_with_events();
    insert(&provider, "work: plan", "a");
    insert(&provider, "home", "b");
    insert(&provider, "work: review", "c");
    while events.try_recv().is_ok() {}

    let mut values = NoteValues::new();
    values.put("body", "done");
    let filter = NoteFilter::TitleContains("work".to_string());
    assert_eq!(provider.update(NOTES_URI, &values, Some(&filter)).unwrap(), 2);

    let event = events.try_recv().unwrap();
    assert_eq!(event.resource, NoteResource::Collection);
    assert_eq!(event.rows, 2);
}

#[test]
fn update_missing_item_returns_zero_without_notification() {
    let (provider, events) = provider_with_events();

    let rows = provider
        .update(&format!("{NOTES_URI}/42"), &NoteValues::with_note("a", "b"), None)
        .unwrap();
    assert_eq!(rows, 0);
    assert!(events.try_recv().is_err());
}

#[test]
fn delete_one_removes_exactly_that_row() {
    let (provider, events) = provider_with_events();
    insert(&provider, "keep", "1");
    let doomed = insert(&provider, "drop", "2");
    insert(&provider, "keep", "3");
    while events.try_recv().is_ok() {}

    assert_eq!(provider.delete(&doomed, None).unwrap(), 1);
    assert_eq!(count(&provider), 2);
    assert_eq!(fetch(&provider, &doomed), None);

    let event = events.try_recv().expect("delete notifies");
    assert_eq!(event.kind, ChangeKind::Deleted);
    assert_eq!(event.uri, doomed);
}

#[test]
fn delete_missing_item_returns_zero_and_keeps_table() {
    let (provider, events) = provider_with_events();
    insert(&provider, "only", "note");
    events.try_recv().unwrap();

    assert_eq!(provider.delete(&format!("{NOTES_URI}/99"), None).unwrap(), 0);
    assert_eq!(count(&provider), 1);
    assert!(events.try_recv().is_err());
}

#[test]
fn collection_delete_without_filter_clears_table() {
    let (provider, _events) = provider_with_events();
    for idx in 0..3 {
        insert(&provider, &format!("note {idx}"), "body");
    }

    assert_eq!(provider.delete(NOTES_URI, None).unwrap(), 3);
    assert_eq!(count(&provider), 0);
}

#[test]
fn get_type_distinguishes_list_and_item() {
    let (provider, _events) = provider_with_events();

    assert_eq!(
        provider.get_type(NOTES_URI).unwrap(),
        "vnd.android.cursor.dir/com.example.android.notepad/notes"
    );
    assert_eq!(
        provider.get_type("notes/5").unwrap(),
        "vnd.android.cursor.item/com.example.android.notepad/notes"
    );
}

#[test]
fn cursor_pages_lazily_through_all_rows_with_unique_ids() {
    let (sender, _events) = unbounded::<ChangeEvent>();
    let provider = NoteProvider::new(AUTHORITY, Arc::new(NoteStore::in_memory()), Arc::new(sender))
        .with_page_size(3);
    for idx in 0..10 {
        insert(&provider, &format!("note {idx}"), "body");
    }

    let cursor = provider
        .query(NOTES_URI, &Projection::all(), None, SortOrder::Insertion)
        .unwrap();
    assert_eq!(cursor.notification_uri(), NOTES_URI);
    let notes = cursor.into_notes().unwrap();

    assert_eq!(notes.len(), 10);
    let ids: Vec<i64> = notes.iter().map(|note| note.id).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(ids, sorted, "insertion order with unique ids");
    assert_eq!(notes[9].title, "note 9");
}

#[test]
fn query_honors_projection_filter_and_sort() {
    let (provider, _events) = provider_with_events();
    insert(&provider, "beta", "shared");
    insert(&provider, "Alpha", "shared");
    insert(&provider, "gamma", "other");

    let rows = provider
        .query(
            NOTES_URI,
            &Projection::of(&[Column::Title]),
            Some(&NoteFilter::BodyContains("shared".to_string())),
            SortOrder::TitleAscending,
        )
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    let titles: Vec<_> = rows.iter().map(|row| row.title.clone().unwrap()).collect();
    assert_eq!(titles, vec!["Alpha".to_string(), "beta".to_string()]);
    assert!(rows.iter().all(|row| row.id.is_none() && row.body.is_none()));

    let newest_first = provider
        .query(NOTES_URI, &Projection::all(), None, SortOrder::NewestFirst)
        .unwrap()
        .into_notes()
        .unwrap();
    let titles: Vec<_> = newest_first.iter().map(|note| note.title.as_str()).collect();
    assert_eq!(titles, vec!["gamma", "Alpha", "beta"]);
}

#[test]
fn cursor_keeps_pending_rows_when_returned_row_is_deleted() {
    let (sender, _events) = unbounded::<ChangeEvent>();
    let provider = NoteProvider::new(AUTHORITY, Arc::new(NoteStore::in_memory()), Arc::new(sender))
        .with_page_size(2);
    for idx in 1..=5 {
        insert(&provider, &format!("note {idx}"), "body");
    }

    let mut cursor = provider
        .query(NOTES_URI, &Projection::all(), None, SortOrder::Insertion)
        .unwrap();
    let mut seen = Vec::new();
    for _ in 0..2 {
        seen.push(cursor.next().unwrap().unwrap().id.unwrap());
    }
    assert_eq!(provider.delete(&format!("{NOTES_URI}/1"), None).unwrap(), 1);
    for row in cursor {
        seen.push(row.unwrap().id.unwrap());
    }

    assert_eq!(seen, vec![1, 2, 3, 4, 5]);
}

#[test]
fn newest_first_cursor_skips_rows_inserted_mid_read() {
    let (sender, _events) = unbounded::<ChangeEvent>();
    let provider = NoteProvider::new(AUTHORITY, Arc::new(NoteStore::in_memory()), Arc::new(sender))
        .with_page_size(2);
    for idx in 1..=4 {
        insert(&provider, &format!("note {idx}"), "body");
    }

    let mut cursor = provider
        .query(NOTES_URI, &Projection::all(), None, SortOrder::NewestFirst)
        .unwrap();
    let first = cursor.next().unwrap().unwrap().id.unwrap();
    insert(&provider, "late", "body");
    let mut seen = vec![first];
    for row in cursor {
        seen.push(row.unwrap().id.unwrap());
    }

    assert_eq!(seen, vec![4, 3, 2, 1]);
}

#[test]
fn title_sorted_pages_resume_after_ties_without_id_column() {
    let (sender, _events) = unbounded::<ChangeEvent>();
    let provider = NoteProvider::new(AUTHORITY, Arc::new(NoteStore::in_memory()), Arc::new(sender))
        .with_page_size(2);
    insert(&provider, "same", "b1");
    insert(&provider, "Same", "b2");
    insert(&provider, "apple", "b3");
    insert(&provider, "same", "b4");
    insert(&provider, "zebra", "b5");

    let bodies = provider
        .query(
            NOTES_URI,
            &Projection::of(&[Column::Body]),
            None,
            SortOrder::TitleAscending,
        )
        .unwrap()
        .map(|row| row.unwrap().body.unwrap())
        .collect::<Vec<_>>();

    assert_eq!(bodies, vec!["b3", "b1", "b2", "b4", "b5"]);
}

#[test]
fn item_query_rewrites_filter_to_id() {
    let (provider, _events) = provider_with_events();
    insert(&provider, "first", "a");
    let second = insert(&provider, "second", "b");

    let rows = provider
        .query(
            &second,
            &Projection::all(),
            Some(&NoteFilter::TitleEquals("first".to_string())),
            SortOrder::Insertion,
        )
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title.as_deref(), Some("second"));
}

#[test]
fn into_notes_requires_full_projection() {
    let (provider, _events) = provider_with_events();
    insert(&provider, "title", "body");

    let err = provider
        .query(NOTES_URI, &Projection::of(&[Column::Title]), None, SortOrder::Insertion)
        .unwrap()
        .into_notes()
        .unwrap_err();
    assert!(err.is_storage());
}
