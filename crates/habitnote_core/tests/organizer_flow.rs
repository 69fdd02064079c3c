use chrono::NaiveDate;
use habitnote_core::{
    filter_by_text, CommandError, CommandResult, DocumentCommands, DocumentFlag, DocumentId,
    Folder, FolderCommands, FolderDraft, FolderId, Habit, HabitCommands, HabitDraft, HabitId,
    ListScope, Note, NoteDraft, Organizer, OrganizerConfig, RecurrenceRule, StatusLevel, Tag,
    TagCommands, TagDraft, TagId, TextColor, ValidationError,
};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

#[derive(Default)]
struct Records {
    notes: Vec<Note>,
    habits: Vec<Habit>,
    tags: Vec<Tag>,
    folders: Vec<Folder>,
    completions: HashMap<HabitId, BTreeSet<NaiveDate>>,
}

impl Records {
    /// Documents create the tags they name, as the real store does.
    fn register_tags(&mut self, names: &[String]) {
        for name in names {
            if !self.tags.iter().any(|tag| &tag.name == name) {
                self.tags.push(Tag {
                    id: Uuid::new_v4(),
                    name: name.clone(),
                    color: None,
                });
            }
        }
    }
}

/// In-memory collaborator that counts calls and fails on demand.
#[derive(Default)]
struct FakeCollaborator {
    records: RefCell<Records>,
    calls: RefCell<HashMap<&'static str, usize>>,
    fail_next: RefCell<Option<&'static str>>,
    clock: Cell<i64>,
}

impl FakeCollaborator {
    fn call(&self, label: &'static str, command: &'static str) -> CommandResult<()> {
        *self.calls.borrow_mut().entry(label).or_insert(0) += 1;
        if *self.fail_next.borrow() == Some(label) {
            self.fail_next.replace(None);
            return Err(CommandError::structured(command, "unavailable", "backend offline"));
        }
        Ok(())
    }

    fn count(&self, label: &str) -> usize {
        self.calls.borrow().get(label).copied().unwrap_or(0)
    }

    fn fail_next(&self, label: &'static str) {
        self.fail_next.replace(Some(label));
    }

    fn tick(&self) -> i64 {
        let next = self.clock.get() + 1;
        self.clock.set(next);
        next
    }

    fn seed_note(&self, title: &str, folder_id: Option<FolderId>, tags: &[&str]) -> DocumentId {
        let now = self.tick();
        let note = note_from_draft(
            Uuid::new_v4(),
            &NoteDraft {
                folder_id,
                tags: tags.iter().map(|tag| tag.to_string()).collect(),
                ..NoteDraft::new(title, format!("about {title}"))
            },
            now,
        );
        let id = note.id;
        self.records.borrow_mut().notes.push(note);
        id
    }

    fn seed_folder(&self, name: &str, parent_id: Option<FolderId>) -> FolderId {
        let id = Uuid::new_v4();
        self.records.borrow_mut().folders.push(Folder {
            id,
            name: name.to_string(),
            parent_id,
            color: None,
        });
        id
    }

    fn seed_tag(&self, name: &str, color: &str) -> TagId {
        let id = Uuid::new_v4();
        self.records.borrow_mut().tags.push(Tag {
            id,
            name: name.to_string(),
            color: Some(color.to_string()),
        });
        id
    }
}

fn note_from_draft(id: DocumentId, draft: &NoteDraft, now: i64) -> Note {
    Note {
        id,
        title: draft.title.clone(),
        content: draft.content.clone(),
        folder_id: draft.folder_id,
        tags: draft.tags.clone(),
        is_pinned: draft.is_pinned,
        is_archived: draft.is_archived,
        color: draft.color.clone(),
        created_at: now,
        updated_at: now,
    }
}

fn habit_from_draft(id: DocumentId, draft: &HabitDraft, now: i64) -> Habit {
    Habit {
        id,
        name: draft.name.clone(),
        description: draft.description.clone(),
        category: draft.category.clone(),
        tags: draft.tags.clone(),
        frequency: draft.frequency.clone(),
        target_value: draft.target_value,
        target_unit: draft.target_unit.clone(),
        color: draft.color.clone(),
        icon: draft.icon.clone(),
        priority: draft.priority,
        is_active: draft.is_active,
        start_date: draft.start_date,
        end_date: draft.end_date,
        reminder_time: draft.reminder_time.clone(),
        current_streak: 0,
        longest_streak: 0,
        last_completed: None,
        created_at: now,
        updated_at: now,
    }
}

fn missing(command: &'static str) -> CommandError {
    CommandError::structured(command, "not_found", "no such record")
}

impl DocumentCommands<Note> for FakeCollaborator {
    fn list_documents(&self, scope: &ListScope) -> CommandResult<Vec<Note>> {
        self.call("notes.list", "list_documents")?;
        let records = self.records.borrow();
        let scoped = records
            .notes
            .iter()
            .filter(|note| match scope {
                ListScope::All => true,
                ListScope::Folders(ids) => note
                    .folder_id
                    .map_or(false, |folder_id| ids.contains(&folder_id)),
            })
            .cloned()
            .collect();
        Ok(scoped)
    }

    fn search_documents(&self, query: &str) -> CommandResult<Vec<Note>> {
        self.call("notes.search", "search_documents")?;
        Ok(filter_by_text(&self.records.borrow().notes, query))
    }

    fn create_document(&self, fields: &NoteDraft) -> CommandResult<DocumentId> {
        self.call("notes.create", "create_document")?;
        let id = Uuid::new_v4();
        let note = note_from_draft(id, fields, self.tick());
        let mut records = self.records.borrow_mut();
        records.register_tags(&fields.tags);
        records.notes.push(note);
        Ok(id)
    }

    fn update_document(&self, id: DocumentId, fields: &NoteDraft) -> CommandResult<()> {
        self.call("notes.update", "update_document")?;
        let now = self.tick();
        let mut records = self.records.borrow_mut();
        let note = records
            .notes
            .iter_mut()
            .find(|note| note.id == id)
            .ok_or_else(|| missing("update_document"))?;
        let created_at = note.created_at;
        *note = Note {
            created_at,
            ..note_from_draft(id, fields, now)
        };
        records.register_tags(&fields.tags);
        Ok(())
    }

    fn delete_document(&self, id: DocumentId) -> CommandResult<()> {
        self.call("notes.delete", "delete_document")?;
        let mut records = self.records.borrow_mut();
        let before = records.notes.len();
        records.notes.retain(|note| note.id != id);
        if records.notes.len() == before {
            return Err(missing("delete_document"));
        }
        Ok(())
    }

    fn toggle_flag(&self, id: DocumentId, flag: DocumentFlag, value: bool) -> CommandResult<()> {
        self.call("notes.flag", "toggle_flag")?;
        let now = self.tick();
        let mut records = self.records.borrow_mut();
        let note = records
            .notes
            .iter_mut()
            .find(|note| note.id == id)
            .ok_or_else(|| missing("toggle_flag"))?;
        match flag {
            DocumentFlag::Pinned => note.is_pinned = value,
            DocumentFlag::Archived => note.is_archived = value,
            DocumentFlag::Active => {
                return Err(CommandError::text("toggle_flag", "notes have no active flag"))
            }
        }
        note.updated_at = now;
        Ok(())
    }
}

impl DocumentCommands<Habit> for FakeCollaborator {
    fn list_documents(&self, _scope: &ListScope) -> CommandResult<Vec<Habit>> {
        self.call("habits.list", "list_documents")?;
        Ok(self.records.borrow().habits.clone())
    }

    fn search_documents(&self, query: &str) -> CommandResult<Vec<Habit>> {
        self.call("habits.search", "search_documents")?;
        Ok(filter_by_text(&self.records.borrow().habits, query))
    }

    fn create_document(&self, fields: &HabitDraft) -> CommandResult<DocumentId> {
        self.call("habits.create", "create_document")?;
        let id = Uuid::new_v4();
        let habit = habit_from_draft(id, fields, self.tick());
        let mut records = self.records.borrow_mut();
        records.register_tags(&fields.tags);
        records.habits.push(habit);
        Ok(id)
    }

    fn update_document(&self, id: DocumentId, fields: &HabitDraft) -> CommandResult<()> {
        self.call("habits.update", "update_document")?;
        let now = self.tick();
        let mut records = self.records.borrow_mut();
        let habit = records
            .habits
            .iter_mut()
            .find(|habit| habit.id == id)
            .ok_or_else(|| missing("update_document"))?;
        *habit = Habit {
            current_streak: habit.current_streak,
            longest_streak: habit.longest_streak,
            last_completed: habit.last_completed,
            created_at: habit.created_at,
            ..habit_from_draft(id, fields, now)
        };
        records.register_tags(&fields.tags);
        Ok(())
    }

    fn delete_document(&self, id: DocumentId) -> CommandResult<()> {
        self.call("habits.delete", "delete_document")?;
        self.records.borrow_mut().habits.retain(|habit| habit.id != id);
        Ok(())
    }

    fn toggle_flag(&self, id: DocumentId, flag: DocumentFlag, value: bool) -> CommandResult<()> {
        self.call("habits.flag", "toggle_flag")?;
        if flag != DocumentFlag::Active {
            return Err(CommandError::text("toggle_flag", "habits only have an active flag"));
        }
        let now = self.tick();
        let mut records = self.records.borrow_mut();
        let habit = records
            .habits
            .iter_mut()
            .find(|habit| habit.id == id)
            .ok_or_else(|| missing("toggle_flag"))?;
        habit.is_active = value;
        habit.updated_at = now;
        Ok(())
    }
}

impl HabitCommands for FakeCollaborator {
    fn complete_habit(&self, id: HabitId, date: NaiveDate) -> CommandResult<()> {
        self.call("habits.complete", "complete_habit")?;
        let now = self.tick();
        let mut records = self.records.borrow_mut();
        let Records {
            habits,
            completions,
            ..
        } = &mut *records;
        let habit = habits
            .iter_mut()
            .find(|habit| habit.id == id)
            .ok_or_else(|| missing("complete_habit"))?;
        let days = completions.entry(id).or_default();
        days.insert(date);
        let streaks = habit.frequency.streaks(days.iter());
        habit.current_streak = streaks.current;
        habit.longest_streak = streaks.longest;
        habit.last_completed = streaks.last_completed;
        habit.updated_at = now;
        Ok(())
    }
}

impl TagCommands for FakeCollaborator {
    fn list_tags(&self) -> CommandResult<Vec<Tag>> {
        self.call("tags.list", "list_tags")?;
        Ok(self.records.borrow().tags.clone())
    }

    fn create_tag(&self, fields: &TagDraft) -> CommandResult<TagId> {
        self.call("tags.create", "create_tag")?;
        let id = Uuid::new_v4();
        self.records.borrow_mut().tags.push(Tag {
            id,
            name: fields.name.clone(),
            color: fields.color.clone(),
        });
        Ok(id)
    }

    fn update_tag(&self, id: TagId, fields: &TagDraft) -> CommandResult<()> {
        self.call("tags.update", "update_tag")?;
        let mut records = self.records.borrow_mut();
        let tag = records
            .tags
            .iter_mut()
            .find(|tag| tag.id == id)
            .ok_or_else(|| missing("update_tag"))?;
        let old_name = std::mem::replace(&mut tag.name, fields.name.clone());
        tag.color = fields.color.clone();
        for note in records.notes.iter_mut() {
            for name in note.tags.iter_mut() {
                if *name == old_name {
                    *name = fields.name.clone();
                }
            }
        }
        Ok(())
    }

    fn delete_tag(&self, id: TagId) -> CommandResult<()> {
        self.call("tags.delete", "delete_tag")?;
        self.records.borrow_mut().tags.retain(|tag| tag.id != id);
        Ok(())
    }
}

impl FolderCommands for FakeCollaborator {
    fn list_folders(&self) -> CommandResult<Vec<Folder>> {
        self.call("folders.list", "list_folders")?;
        Ok(self.records.borrow().folders.clone())
    }

    fn create_folder(&self, fields: &FolderDraft) -> CommandResult<FolderId> {
        self.call("folders.create", "create_folder")?;
        Ok(self.seed_folder(&fields.name, fields.parent_id))
    }

    fn update_folder(&self, id: FolderId, fields: &FolderDraft) -> CommandResult<()> {
        self.call("folders.update", "update_folder")?;
        let mut records = self.records.borrow_mut();
        let folder = records
            .folders
            .iter_mut()
            .find(|folder| folder.id == id)
            .ok_or_else(|| missing("update_folder"))?;
        folder.name = fields.name.clone();
        folder.parent_id = fields.parent_id;
        folder.color = fields.color.clone();
        Ok(())
    }

    fn delete_folder(&self, id: FolderId) -> CommandResult<()> {
        self.call("folders.delete", "delete_folder")?;
        self.records.borrow_mut().folders.retain(|folder| folder.id != id);
        Ok(())
    }
}

fn organizer(fake: FakeCollaborator) -> Organizer<FakeCollaborator> {
    let mut organizer = Organizer::new(fake, OrganizerConfig::default());
    organizer.load();
    organizer
}

fn visible_titles(organizer: &Organizer<FakeCollaborator>) -> Vec<String> {
    organizer
        .notes()
        .visible()
        .iter()
        .map(|item| item.document.title.clone())
        .collect()
}

#[test]
fn created_note_is_reloaded_and_selected() {
    let mut organizer = organizer(FakeCollaborator::default());

    let id = organizer
        .create::<Note>(&NoteDraft::new("First", "body"))
        .unwrap()
        .expect("create succeeds");

    assert_eq!(organizer.notes().selected_id(), Some(id));
    assert_eq!(visible_titles(&organizer), vec!["First"]);
    assert_eq!(organizer.commands().count("notes.list"), 2);
}

#[test]
fn sidebar_toggle_is_local_state() {
    let mut organizer = organizer(FakeCollaborator::default());
    assert!(organizer.sidebar_visible());

    organizer.toggle_sidebar();

    assert!(!organizer.sidebar_visible());
    assert_eq!(organizer.commands().count("notes.list"), 1);
}

#[test]
fn deleting_the_selected_note_clears_the_selection() {
    let fake = FakeCollaborator::default();
    let first = fake.seed_note("First", None, &[]);
    fake.seed_note("Second", None, &[]);
    let mut organizer = organizer(fake);

    assert!(organizer.select::<Note>(first));
    assert!(organizer.delete::<Note>(first));

    assert_eq!(organizer.notes().selected_id(), None);
    assert_eq!(visible_titles(&organizer), vec!["Second"]);
}

#[test]
fn pinning_moves_a_note_ahead_of_newer_ones() {
    let fake = FakeCollaborator::default();
    let oldest = fake.seed_note("t1", None, &[]);
    fake.seed_note("t2", None, &[]);
    fake.seed_note("t3", None, &[]);
    let mut organizer = organizer(fake);
    assert_eq!(visible_titles(&organizer), vec!["t3", "t2", "t1"]);

    assert!(organizer.toggle_pin(oldest));
    assert_eq!(visible_titles(&organizer), vec!["t1", "t3", "t2"]);

    assert!(organizer.toggle_pin(oldest));
    assert_eq!(visible_titles(&organizer), vec!["t1", "t3", "t2"]);
    assert!(!organizer.notes().all()[0].is_pinned);
}

#[test]
fn rapid_typing_issues_a_single_query() {
    let fake = FakeCollaborator::default();
    fake.seed_note("abc notes", None, &[]);
    fake.seed_note("other", None, &[]);
    let mut organizer = organizer(fake);

    organizer.search_input::<Note>("a", 0);
    organizer.search_input::<Note>("ab", 100);
    organizer.search_input::<Note>("abc", 200);
    organizer.tick(400);
    assert_eq!(organizer.commands().count("notes.search"), 0);

    organizer.tick(500);
    organizer.tick(900);
    assert_eq!(organizer.commands().count("notes.search"), 1);
    assert_eq!(organizer.notes().search().applied_query(), Some("abc"));
    assert_eq!(visible_titles(&organizer), vec!["abc notes"]);
    assert_eq!(organizer.commands().count("habits.search"), 0);
}

#[test]
fn failed_search_falls_back_to_local_filter() {
    let fake = FakeCollaborator::default();
    fake.seed_note("Groceries", None, &[]);
    fake.seed_note("Ideas", None, &[]);
    fake.fail_next("notes.search");
    let mut organizer = organizer(fake);

    organizer.search_input::<Note>("GROC", 0);
    organizer.tick(300);

    assert_eq!(visible_titles(&organizer), vec!["Groceries"]);
    assert!(!organizer.notes().search().is_searching());
}

#[test]
fn applied_search_is_rerun_after_a_mutation() {
    let fake = FakeCollaborator::default();
    fake.seed_note("Groceries", None, &[]);
    fake.seed_note("Ideas", None, &[]);
    let mut organizer = organizer(fake);

    organizer.search_input::<Note>("groc", 0);
    organizer.tick(300);
    assert_eq!(visible_titles(&organizer), vec!["Groceries"]);

    organizer
        .create::<Note>(&NoteDraft::new("Grocery run", ""))
        .unwrap();
    assert_eq!(organizer.commands().count("notes.search"), 2);
    assert_eq!(visible_titles(&organizer).len(), 2);

    organizer.clear_search::<Note>();
    assert_eq!(visible_titles(&organizer).len(), 3);
    assert_eq!(organizer.notes().search().applied_query(), None);
}

#[test]
fn folder_cycle_is_rejected_without_calling_the_collaborator() {
    let fake = FakeCollaborator::default();
    let parent = fake.seed_folder("Parent", None);
    let child = fake.seed_folder("Child", Some(parent));
    let mut organizer = organizer(fake);

    let err = organizer
        .update_folder(parent, &FolderDraft::new("Parent", Some(child)))
        .unwrap_err();

    assert!(matches!(err, ValidationError::FolderCycle { .. }));
    assert_eq!(organizer.commands().count("folders.update"), 0);
    let status = organizer.status().expect("status is set");
    assert_eq!(status.level, StatusLevel::Error);
}

#[test]
fn invalid_note_color_is_rejected_before_any_command() {
    let mut organizer = organizer(FakeCollaborator::default());
    let draft = NoteDraft {
        color: Some("blue".to_string()),
        ..NoteDraft::new("Colored", "")
    };

    let err = organizer.create::<Note>(&draft).unwrap_err();

    assert_eq!(err, ValidationError::InvalidColor("blue".to_string()));
    assert_eq!(organizer.commands().count("notes.create"), 0);
}

#[test]
fn folder_scope_follows_selection_and_subfolder_toggle() {
    let fake = FakeCollaborator::default();
    let parent = fake.seed_folder("Parent", None);
    let child = fake.seed_folder("Child", Some(parent));
    fake.seed_note("in parent", Some(parent), &[]);
    fake.seed_note("in child", Some(child), &[]);
    fake.seed_note("loose", None, &[]);
    let mut organizer = organizer(fake);
    assert_eq!(visible_titles(&organizer).len(), 3);
    assert_eq!(organizer.folder_rows().len(), 3);

    organizer.select_folder(Some(parent));
    assert_eq!(visible_titles(&organizer), vec!["in parent"]);

    organizer.set_include_subfolders(true);
    assert_eq!(visible_titles(&organizer), vec!["in child", "in parent"]);

    organizer.select_folder(None);
    assert_eq!(visible_titles(&organizer).len(), 3);
}

#[test]
fn archived_notes_are_hidden_until_requested() {
    let fake = FakeCollaborator::default();
    let archived = fake.seed_note("old", None, &[]);
    fake.seed_note("current", None, &[]);
    let mut organizer = organizer(fake);

    assert!(organizer.toggle_archive(archived));
    assert_eq!(visible_titles(&organizer), vec!["current"]);

    organizer.set_show_archived(true);
    assert_eq!(visible_titles(&organizer), vec!["old", "current"]);
}

#[test]
fn command_failure_sets_status_and_keeps_state() {
    let fake = FakeCollaborator::default();
    let id = fake.seed_note("Keep me", None, &[]);
    let mut organizer = organizer(fake);
    organizer.select::<Note>(id);

    organizer.commands().fail_next("notes.delete");
    assert!(!organizer.delete::<Note>(id));

    let status = organizer.status().expect("status is set");
    assert_eq!(status.level, StatusLevel::Error);
    assert!(status.text.starts_with("delete_document failed [unavailable]"));
    assert_eq!(organizer.notes().all().len(), 1);
    assert_eq!(organizer.notes().selected_id(), Some(id));

    organizer.dismiss_status();
    assert!(organizer.status().is_none());
}

#[test]
fn failed_reload_keeps_the_previous_list() {
    let fake = FakeCollaborator::default();
    fake.seed_note("Visible", None, &[]);
    let mut organizer = organizer(fake);

    organizer.commands().fail_next("notes.list");
    organizer.set_show_archived(true);

    assert_eq!(visible_titles(&organizer), vec!["Visible"]);
    assert!(!organizer.notes().is_loading());
    assert!(organizer.status().is_some());
}

#[test]
fn tag_recolor_repaints_chips() {
    let fake = FakeCollaborator::default();
    let work = fake.seed_tag("work", "#000000");
    fake.seed_note("Plan", None, &["work", "misc"]);
    let mut organizer = organizer(fake);

    let chips = &organizer.notes().visible()[0].tag_chips;
    assert_eq!(chips[0].color.as_deref(), Some("#000000"));
    assert_eq!(chips[0].text_color, TextColor::White);
    assert_eq!(chips[1].color, None);
    assert_eq!(chips[1].text_color, TextColor::Inherit);

    assert!(organizer
        .update_tag(work, &TagDraft::new("job", Some("#ffffff".to_string())))
        .unwrap());

    let chips = &organizer.notes().visible()[0].tag_chips;
    assert_eq!(chips[0].name, "job");
    assert_eq!(chips[0].color.as_deref(), Some("#ffffff"));
    assert_eq!(chips[0].text_color, TextColor::Black);
}

#[test]
fn moving_a_note_reloads_the_scoped_list() {
    let fake = FakeCollaborator::default();
    let folder = fake.seed_folder("Inbox", None);
    let id = fake.seed_note("Loose", None, &[]);
    let mut organizer = organizer(fake);
    organizer.select_folder(Some(folder));
    assert!(visible_titles(&organizer).is_empty());

    organizer.select_folder(None);
    assert!(organizer.move_note(id, Some(folder)));
    organizer.select_folder(Some(folder));
    assert_eq!(visible_titles(&organizer), vec!["Loose"]);
}

#[test]
fn deleting_the_selected_folder_falls_back_to_all_notes() {
    let fake = FakeCollaborator::default();
    let folder = fake.seed_folder("Temp", None);
    fake.seed_note("loose", None, &[]);
    let mut organizer = organizer(fake);
    organizer.select_folder(Some(folder));
    assert!(visible_titles(&organizer).is_empty());

    assert!(organizer.delete_folder(folder));

    assert_eq!(organizer.navigation().selected_folder, None);
    assert_eq!(visible_titles(&organizer), vec!["loose"]);
}

#[test]
fn habits_due_on_respects_schedule_and_active_flag() {
    let monday = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    let tuesday = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
    let mut organizer = organizer(FakeCollaborator::default());

    let mut gym = HabitDraft::new("Gym", monday);
    gym.frequency = RecurrenceRule::weekly([1]);
    let gym = organizer.create::<Habit>(&gym).unwrap().expect("created");
    organizer
        .create::<Habit>(&HabitDraft::new("Water", monday))
        .unwrap();

    let due = |organizer: &Organizer<FakeCollaborator>, date| {
        organizer
            .habits_due_on(date)
            .into_iter()
            .map(|habit| habit.name.clone())
            .collect::<Vec<_>>()
    };
    let mut on_monday = due(&organizer, monday);
    on_monday.sort();
    assert_eq!(on_monday, vec!["Gym", "Water"]);
    assert_eq!(due(&organizer, tuesday), vec!["Water"]);

    assert!(organizer.toggle_active(gym));
    assert_eq!(due(&organizer, monday), vec!["Water"]);
}

#[test]
fn completing_a_habit_clears_it_from_the_due_list_and_extends_the_streak() {
    let monday = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    let tuesday = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
    let mut organizer = organizer(FakeCollaborator::default());
    let water = organizer
        .create::<Habit>(&HabitDraft::new("Water", monday))
        .unwrap()
        .expect("created");
    assert_eq!(organizer.habits_due_on(monday).len(), 1);

    assert!(organizer.complete_habit(water, monday));
    assert!(organizer.habits_due_on(monday).is_empty());
    assert_eq!(organizer.habits_due_on(tuesday).len(), 1);
    assert_eq!(organizer.habits().all()[0].current_streak, 1);

    assert!(organizer.complete_habit(water, tuesday));
    let habit = &organizer.habits().all()[0];
    assert_eq!((habit.current_streak, habit.longest_streak), (2, 2));
    assert_eq!(habit.last_completed, Some(tuesday));
    assert!(organizer.habits_due_on(tuesday).is_empty());

    assert!(!organizer.complete_habit(Uuid::new_v4(), tuesday));
    let status = organizer.status().expect("status is set");
    assert!(status.text.starts_with("complete_habit failed [not_found]"));
}

#[test]
fn search_hides_archived_notes_like_the_scope_view() {
    let fake = FakeCollaborator::default();
    let secret = fake.seed_note("secret plan", None, &[]);
    fake.seed_note("open plan", None, &[]);
    let mut organizer = organizer(fake);
    assert!(organizer.toggle_archive(secret));
    assert_eq!(visible_titles(&organizer), vec!["open plan"]);

    organizer.search_input::<Note>("plan", 0);
    organizer.tick(300);
    assert_eq!(organizer.commands().count("notes.search"), 1);
    assert_eq!(visible_titles(&organizer), vec!["open plan"]);

    organizer.commands().fail_next("notes.search");
    organizer.search_input::<Note>("plan", 400);
    organizer.tick(700);
    assert!(organizer.status().is_none());
    assert_eq!(visible_titles(&organizer), vec!["open plan"]);

    organizer.set_show_archived(true);
    let mut titles = visible_titles(&organizer);
    titles.sort();
    assert_eq!(titles, vec!["open plan", "secret plan"]);
}

#[test]
fn tags_named_by_a_new_document_join_the_tag_snapshot() {
    let mut organizer = organizer(FakeCollaborator::default());
    assert!(organizer.tags().is_empty());

    organizer
        .create::<Note>(&NoteDraft {
            tags: vec!["fresh".to_string()],
            ..NoteDraft::new("Tagged", "")
        })
        .unwrap()
        .expect("created");
    let names = organizer
        .tags()
        .iter()
        .map(|tag| tag.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["fresh"]);
    assert_eq!(organizer.commands().count("tags.list"), 2);

    organizer
        .create::<Note>(&NoteDraft {
            tags: vec!["fresh".to_string()],
            ..NoteDraft::new("Tagged again", "")
        })
        .unwrap();
    assert_eq!(organizer.commands().count("tags.list"), 2);
}
