use mdvault_core::{
    FsNoteRepository, Note, NoteRepository, RepoError,
};
use tempfile::TempDir;
use uuid::Uuid;

fn open_repo(dir: &TempDir) -> FsNoteRepository {
    FsNoteRepository::open(dir.path().join("notes")).unwrap()
}

#[test]
fn create_then_read_returns_the_full_formatted_text() {
    let dir = TempDir::new().unwrap();
    let repo = open_repo(&dir);

    let note = Note::new("store body", vec!["t".to_string()], Some("ada".to_string()));
    repo.create_note(&note).unwrap();

    let text = repo.read_note(note.uuid).unwrap();
    assert!(text.starts_with("---\n"));
    assert!(text.ends_with("store body"));
}

#[test]
fn creating_the_same_identifier_twice_is_a_collision() {
    let dir = TempDir::new().unwrap();
    let repo = open_repo(&dir);

    let note = Note::new("body", Vec::new(), None);
    repo.create_note(&note).unwrap();

    let err = repo.create_note(&note).unwrap_err();
    assert!(matches!(err, RepoError::AlreadyExists(id) if id == note.uuid));
}

#[test]
fn replace_and_delete_of_missing_notes_are_not_found() {
    let dir = TempDir::new().unwrap();
    let repo = open_repo(&dir);

    let ghost = Note::new("ghost", Vec::new(), None);
    assert!(matches!(
        repo.replace_note(&ghost).unwrap_err(),
        RepoError::NotFound(id) if id == ghost.uuid
    ));
    assert!(matches!(
        repo.delete_note(ghost.uuid).unwrap_err(),
        RepoError::NotFound(id) if id == ghost.uuid
    ));
}

#[test]
fn enumeration_skips_files_that_are_not_notes() {
    let dir = TempDir::new().unwrap();
    let repo = open_repo(&dir);
    let notes_dir = dir.path().join("notes");

    let note = Note::new("real note", Vec::new(), None);
    repo.create_note(&note).unwrap();

    std::fs::write(notes_dir.join("not-a-uuid.md"), "stray markdown").unwrap();
    std::fs::write(notes_dir.join("history.db"), "not a note").unwrap();
    std::fs::write(notes_dir.join(format!("{}.txt", Uuid::new_v4())), "wrong ext").unwrap();

    let ids: Vec<_> = repo.enumerate_ids().unwrap().collect();
    assert_eq!(ids, vec![note.uuid]);
}

#[test]
fn replace_leaves_no_staging_files_behind() {
    let dir = TempDir::new().unwrap();
    let repo = open_repo(&dir);
    let notes_dir = dir.path().join("notes");

    let mut note = Note::new("first", Vec::new(), None);
    repo.create_note(&note).unwrap();
    note.content = "second".to_string();
    note.touch();
    repo.replace_note(&note).unwrap();

    let leftovers: Vec<_> = std::fs::read_dir(&notes_dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn summaries_serialize_to_the_wire_shape() {
    let dir = TempDir::new().unwrap();
    let repo = open_repo(&dir);

    let note = Note::new("body", vec!["a".to_string()], Some("ada".to_string()));
    repo.create_note(&note).unwrap();

    let summaries = repo.list_notes().unwrap();
    let value = serde_json::to_value(&summaries).unwrap();
    let first = &value[0];
    assert_eq!(first["note_uuid"], note.uuid.to_string());
    assert_eq!(first["tags"], "a");
    assert_eq!(first["author"], "ada");
    assert!(first["last_updated"].is_string());
}
