use chrono::NaiveDate;
use habitnote_core::{
    filter_by_text, DocumentCommands, DocumentFlag, FolderCommands, FolderDraft, Habit,
    HabitCommands, HabitDraft, ListScope, Note, NoteDraft, Organizer, OrganizerConfig, Priority,
    RecurrenceRule, SqliteStore, TagCommands, TagDraft,
};
use uuid::Uuid;

type NoteCmds = dyn DocumentCommands<Note>;
type HabitCmds = dyn DocumentCommands<Habit>;

fn store() -> SqliteStore {
    SqliteStore::open_in_memory().unwrap()
}

fn create_note(store: &SqliteStore, draft: NoteDraft) -> Uuid {
    <SqliteStore as DocumentCommands<Note>>::create_document(store, &draft).unwrap()
}

fn notes(store: &SqliteStore, scope: &ListScope) -> Vec<Note> {
    <SqliteStore as DocumentCommands<Note>>::list_documents(store, scope).unwrap()
}

fn note_titles(notes: &[Note]) -> Vec<&str> {
    notes.iter().map(|note| note.title.as_str()).collect()
}

fn tagged(title: &str, folder_id: Option<Uuid>, tags: &[&str]) -> NoteDraft {
    NoteDraft {
        folder_id,
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        ..NoteDraft::new(title, format!("content of {title}"))
    }
}

#[test]
fn notes_are_scoped_by_folder_and_normalized_on_write() {
    let store = store();
    let parent = store.create_folder(&FolderDraft::new("Parent", None)).unwrap();
    let child = store
        .create_folder(&FolderDraft::new("Child", Some(parent)))
        .unwrap();

    let in_parent = create_note(&store, tagged("In parent", Some(parent), &[" work ", "home", "work"]));
    create_note(&store, tagged("In child", Some(child), &[]));
    create_note(&store, tagged("   ", None, &[]));

    let all = notes(&store, &ListScope::All);
    assert_eq!(all.len(), 3);
    assert!(all.iter().any(|note| note.title == "Untitled note"));

    let parent_only = notes(&store, &ListScope::Folders(vec![parent]));
    assert_eq!(note_titles(&parent_only), vec!["In parent"]);
    assert_eq!(parent_only[0].id, in_parent);
    assert_eq!(parent_only[0].tags, vec!["work".to_string(), "home".to_string()]);

    let subtree = notes(&store, &ListScope::Folders(vec![parent, child]));
    assert_eq!(subtree.len(), 2);
    assert!(notes(&store, &ListScope::Folders(Vec::new())).is_empty());
}

#[test]
fn search_matches_title_or_content_case_insensitively() {
    let store = store();
    create_note(&store, NoteDraft::new("Groceries", "milk and eggs"));
    create_note(&store, NoteDraft::new("Ideas", "a 100% better plan"));

    let by_title = <SqliteStore as DocumentCommands<Note>>::search_documents(&store, "GROC").unwrap();
    assert_eq!(note_titles(&by_title), vec!["Groceries"]);

    let by_content = <SqliteStore as DocumentCommands<Note>>::search_documents(&store, "100%").unwrap();
    assert_eq!(note_titles(&by_content), vec!["Ideas"]);

    let literal_wildcard = <SqliteStore as DocumentCommands<Note>>::search_documents(&store, "_").unwrap();
    assert!(literal_wildcard.is_empty());
}

#[test]
fn tag_rename_cascades_into_documents_and_rejects_duplicates() {
    let store = store();
    let note_id = create_note(&store, tagged("Plan", None, &["work"]));
    let work = store
        .list_tags()
        .unwrap()
        .into_iter()
        .find(|tag| tag.name == "work")
        .expect("tag created through the note");
    assert_eq!(work.color, None);

    store
        .update_tag(work.id, &TagDraft::new("job", Some("#00ff00".to_string())))
        .unwrap();
    let reloaded = notes(&store, &ListScope::All);
    assert_eq!(reloaded[0].id, note_id);
    assert_eq!(reloaded[0].tags, vec!["job".to_string()]);

    let home = store.create_tag(&TagDraft::new("home", None)).unwrap();
    let err = store
        .update_tag(home, &TagDraft::new("job", None))
        .unwrap_err();
    assert_eq!(err.code(), Some("conflict"));
    assert_eq!(err.command, "update_tag");

    let again = store.create_tag(&TagDraft::new(" home ", None)).unwrap();
    assert_eq!(again, home);
}

#[test]
fn tag_in_use_cannot_be_deleted_until_unlinked() {
    let store = store();
    let note_id = create_note(&store, tagged("Plan", None, &["work"]));
    let work = store.list_tags().unwrap()[0].id;

    let err = store.delete_tag(work).unwrap_err();
    assert_eq!(err.code(), Some("conflict"));

    <SqliteStore as DocumentCommands<Note>>::update_document(&store, note_id, &NoteDraft::new("Plan", ""))
        .unwrap();
    store.delete_tag(work).unwrap();
    assert!(store.list_tags().unwrap().is_empty());

    let err = store.delete_tag(work).unwrap_err();
    assert_eq!(err.code(), Some("not_found"));
}

#[test]
fn non_empty_folders_cannot_be_deleted() {
    let store = store();
    let root = store.create_folder(&FolderDraft::new("Root", None)).unwrap();
    let child = store.create_folder(&FolderDraft::new("Child", Some(root))).unwrap();
    let note_id = create_note(&store, tagged("Filed", Some(child), &[]));

    assert_eq!(store.delete_folder(root).unwrap_err().code(), Some("conflict"));
    assert_eq!(store.delete_folder(child).unwrap_err().code(), Some("conflict"));

    <SqliteStore as DocumentCommands<Note>>::delete_document(&store, note_id).unwrap();
    store.delete_folder(child).unwrap();
    store.delete_folder(root).unwrap();
    assert!(store.list_folders().unwrap().is_empty());
}

#[test]
fn folder_reparenting_rejects_cycles_and_unknown_parents() {
    let store = store();
    let a = store.create_folder(&FolderDraft::new("A", None)).unwrap();
    let b = store.create_folder(&FolderDraft::new("B", Some(a))).unwrap();

    let err = store.update_folder(a, &FolderDraft::new("A", Some(b))).unwrap_err();
    assert_eq!(err.code(), Some("validation"));

    let err = store
        .update_folder(b, &FolderDraft::new("B", Some(Uuid::new_v4())))
        .unwrap_err();
    assert_eq!(err.code(), Some("not_found"));

    store.update_folder(b, &FolderDraft::new("B renamed", None)).unwrap();
    let folders = store.list_folders().unwrap();
    assert_eq!(folders[1].name, "B renamed");
    assert_eq!(folders[1].parent_id, None);
}

#[test]
fn flag_toggles_bump_updated_at_and_reject_foreign_flags() {
    let store = store();
    let id = create_note(&store, NoteDraft::new("Pin me", ""));
    let before = notes(&store, &ListScope::All)[0].updated_at;

    <SqliteStore as DocumentCommands<Note>>::toggle_flag(&store, id, DocumentFlag::Pinned, true).unwrap();
    let after = &notes(&store, &ListScope::All)[0];
    assert!(after.is_pinned);
    assert!(after.updated_at > before);

    let commands: &NoteCmds = &store;
    let err = commands.toggle_flag(id, DocumentFlag::Active, false).unwrap_err();
    assert_eq!(err.code(), Some("invalid_data"));

    let err = commands
        .toggle_flag(Uuid::new_v4(), DocumentFlag::Archived, true)
        .unwrap_err();
    assert_eq!(err.code(), Some("not_found"));
}

#[test]
fn habits_keep_schedule_tags_and_flags() {
    let store = store();
    let commands: &HabitCmds = &store;
    let start = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

    let mut draft = HabitDraft::new("  Run ", start);
    draft.description = Some("Morning loop".to_string());
    draft.frequency = RecurrenceRule::weekly([1, 3, 5]);
    draft.priority = Priority::High;
    draft.tags = vec!["health".to_string()];
    draft.end_date = NaiveDate::from_ymd_opt(2026, 12, 31);
    let id = commands.create_document(&draft).unwrap();

    let habits = commands.list_documents(&ListScope::All).unwrap();
    assert_eq!(habits.len(), 1);
    let habit = &habits[0];
    assert_eq!(habit.id, id);
    assert_eq!(habit.name, "Run");
    assert_eq!(habit.frequency, RecurrenceRule::weekly([1, 3, 5]));
    assert_eq!(habit.priority, Priority::High);
    assert_eq!(habit.tags, vec!["health".to_string()]);
    assert_eq!(habit.end_date, NaiveDate::from_ymd_opt(2026, 12, 31));
    assert_eq!(habit.current_streak, 0);
    assert!(habit.is_active);

    commands.toggle_flag(id, DocumentFlag::Active, false).unwrap();
    assert!(!commands.list_documents(&ListScope::All).unwrap()[0].is_active);

    assert_eq!(commands.search_documents("morning").unwrap().len(), 1);
    assert!(commands.search_documents("evening").unwrap().is_empty());

    let mut monthly = HabitDraft::new("Budget", start);
    monthly.frequency = RecurrenceRule::monthly(Vec::new());
    let err = commands.create_document(&monthly).unwrap_err();
    assert_eq!(err.code(), Some("validation"));
}

#[test]
fn updating_or_deleting_missing_documents_reports_not_found() {
    let store = store();
    let missing = Uuid::new_v4();
    let err = <SqliteStore as DocumentCommands<Note>>::update_document(
        &store,
        missing,
        &NoteDraft::new("x", ""),
    )
    .unwrap_err();
    assert_eq!(err.code(), Some("not_found"));

    let err = <SqliteStore as DocumentCommands<Habit>>::delete_document(&store, missing).unwrap_err();
    assert_eq!(err.code(), Some("not_found"));
    assert!(err.to_string().starts_with("delete_document failed [not_found]"));
}

#[test]
fn search_folds_non_ascii_case_like_the_local_filter() {
    let store = store();
    create_note(&store, NoteDraft::new("Été en famille", "vacances"));
    create_note(&store, NoteDraft::new("Winter", "ÜBER kalt"));

    for query in ["ÉTÉ", "été", "über"] {
        let remote = <SqliteStore as DocumentCommands<Note>>::search_documents(&store, query).unwrap();
        let local = filter_by_text(&notes(&store, &ListScope::All), query);
        assert_eq!(remote.len(), 1, "query {query}");
        assert_eq!(note_titles(&remote), note_titles(&local), "query {query}");
    }
}

#[test]
fn completing_a_habit_through_the_organizer_updates_streak_and_due_list() {
    let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    let yesterday = today.pred_opt().unwrap();
    let mut organizer = Organizer::new(store(), OrganizerConfig::default());
    organizer.load();
    let id = organizer
        .create::<Habit>(&HabitDraft::new("Stretch", yesterday))
        .unwrap()
        .expect("created");
    assert_eq!(organizer.habits_due_on(today).len(), 1);

    assert!(organizer.complete_habit(id, yesterday));
    assert!(organizer.complete_habit(id, today));
    assert!(organizer.complete_habit(id, today));

    let habit = &organizer.habits().all()[0];
    assert_eq!(habit.current_streak, 2);
    assert_eq!(habit.longest_streak, 2);
    assert_eq!(habit.last_completed, Some(today));
    assert!(organizer.habits_due_on(today).is_empty());

    let err = organizer.commands().complete_habit(Uuid::new_v4(), today).unwrap_err();
    assert_eq!(err.code(), Some("not_found"));
}
