use ideabox_core::db::open_db_in_memory;
use ideabox_core::{
    ArchiveService, ArchiveView, Idea, IdeaKind, IdeaStore, MemoryIdeaStore, Note, Project,
    SqliteIdeaStore, StoreError, EMPTY_ARCHIVE_PLACEHOLDER,
};
use uuid::Uuid;

#[test]
fn archive_contains_exactly_archived_untrashed_ideas() {
    let archived_note = Note::new("kept", "body").archived();
    let notes = vec![
        archived_note.clone(),
        Note::new("gone", "body").archived().trashed(),
    ];
    let projects = vec![Project::new("active", "desc")];

    let view = ArchiveView::from_collections(&notes, &projects);
    assert_eq!(view.ideas(), &[Idea::Note(archived_note)]);
    assert_eq!(view.placeholder(), None);
}

#[test]
fn archive_service_reads_memory_store() {
    let mut store = MemoryIdeaStore::default();
    let service_empty = ArchiveService::new(store.clone());
    assert_eq!(
        service_empty.view().expect("view").placeholder(),
        Some(EMPTY_ARCHIVE_PLACEHOLDER)
    );

    let project = Project::new("roadmap", "q3").archived();
    store.push_project(project.clone());
    store.push_note(Note::new("draft", "").trashed());
    let view = ArchiveService::new(store).view().expect("view");
    assert_eq!(view.ideas(), &[Idea::Project(project)]);
}

#[test]
fn sqlite_store_keeps_insertion_order_and_flags() {
    let conn = open_db_in_memory().expect("open db");
    let store = SqliteIdeaStore::new(&conn);

    let first = Note::new("first", "a").archived();
    let second = Note::new("second", "b");
    let project = Project::new("plan", "c");
    store.insert_note(&first).expect("insert first");
    store.insert_note(&second).expect("insert second");
    store.insert_project(&project).expect("insert project");

    assert_eq!(
        store.list_notes().expect("list notes"),
        vec![first.clone(), second.clone()]
    );
    assert_eq!(store.list_projects().expect("list projects"), vec![project.clone()]);

    store
        .set_archived(IdeaKind::Project, project.id, true)
        .expect("archive project");
    store
        .set_archived(IdeaKind::Note, second.id, true)
        .expect("archive note");
    store
        .set_trashed(IdeaKind::Note, first.id, true)
        .expect("trash note");

    let view = ArchiveService::new(store).view().expect("view");
    let ids = view.ideas().iter().map(Idea::id).collect::<Vec<_>>();
    assert_eq!(ids, vec![second.id, project.id]);
}

#[test]
fn flag_update_on_unknown_id_is_not_found() {
    let conn = open_db_in_memory().expect("open db");
    let store = SqliteIdeaStore::new(&conn);
    let missing = Uuid::new_v4();

    let err = store
        .set_trashed(IdeaKind::Note, missing, true)
        .expect_err("unknown id");
    assert!(matches!(err, StoreError::NotFound(id) if id == missing));
}

#[test]
fn corrupted_id_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().expect("open db");
    conn.execute(
        "INSERT INTO notes (id, position, title, content) VALUES ('not-a-uuid', 0, 't', 'c');",
        [],
    )
    .expect("raw insert");

    let err = SqliteIdeaStore::new(&conn)
        .list_notes()
        .expect_err("invalid id must not be masked");
    assert!(matches!(err, StoreError::InvalidData(_)));
}

#[test]
fn ideas_serialize_with_kind_tag() {
    let note = Note::new("tagged", "body");
    let value = serde_json::to_value(Idea::Note(note.clone())).expect("serialize idea");
    assert_eq!(value["kind"], "note");
    assert_eq!(value["title"], "tagged");
    assert_eq!(value["is_archived"], false);
}
