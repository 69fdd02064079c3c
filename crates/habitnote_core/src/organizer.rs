//! Application state and actions of the organizer.
//!
//! # Responsibility
//! - Own every piece of displayed state: tag and folder snapshots, the
//!   folder tree, navigation, both document lists, sidebar and status line.
//! - Validate input, call the collaborator, then reload what changed.
//!
//! # Invariants
//! - State lives only here; there are no process-wide stores.
//! - Validation failures are returned and shown in the status line without
//!   calling the collaborator.
//! - Collaborator failures never propagate: they are logged and shown in the
//!   status line, and prior state is kept.
//! - Every successful mutation is followed by a reload of the affected data.

use crate::command::{Collaborator, CommandError, CommandResult, DocumentCommands, ListScope};
use crate::config::OrganizerConfig;
use crate::folders::{build_folder_rows, descendant_ids, FolderRow};
use crate::model::document::{Document, DocumentFlag, DocumentId};
use crate::model::folder::{Folder, FolderDraft, FolderId};
use crate::model::habit::{Habit, HabitDraft, HabitId};
use crate::model::note::{Note, NoteDraft};
use crate::model::tag::{Tag, TagDraft, TagId};
use crate::sync::{after_mutation, apply_search_action, reload_list, DocumentList, Mutation};
use crate::tags::TagPalette;
use crate::validation::{check_color, check_folder_parent, require_name, ValidationError};
use chrono::NaiveDate;
use log::{info, warn};

/// Severity of the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Error,
}

/// Non-blocking message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

/// Folder navigation choices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    /// `None` selects "All Notes".
    pub selected_folder: Option<FolderId>,
    pub include_subfolders: bool,
    pub show_archived: bool,
}

/// Both document lists, addressed generically through [`OrganizedDocument`].
#[derive(Debug, Clone)]
pub struct DocumentLists {
    notes: DocumentList<Note>,
    habits: DocumentList<Habit>,
}

/// Per-kind hooks the organizer needs on top of [`Document`].
pub trait OrganizedDocument: Document {
    fn list(lists: &DocumentLists) -> &DocumentList<Self>;
    fn list_mut(lists: &mut DocumentLists) -> &mut DocumentList<Self>;
    fn scope(navigation: &NavigationState, folders: &[Folder]) -> ListScope;
    fn show_archived(navigation: &NavigationState) -> bool;
    /// Validates and normalizes a draft before it is sent.
    fn prepare(draft: &Self::Draft) -> Result<Self::Draft, ValidationError>;
    fn draft_tags(draft: &Self::Draft) -> &[String];
}

impl OrganizedDocument for Note {
    fn list(lists: &DocumentLists) -> &DocumentList<Self> {
        &lists.notes
    }

    fn list_mut(lists: &mut DocumentLists) -> &mut DocumentList<Self> {
        &mut lists.notes
    }

    fn scope(navigation: &NavigationState, folders: &[Folder]) -> ListScope {
        let Some(folder_id) = navigation.selected_folder else {
            return ListScope::All;
        };
        let mut ids = vec![folder_id];
        if navigation.include_subfolders {
            ids.extend(descendant_ids(folders, folder_id));
        }
        ListScope::Folders(ids)
    }

    fn show_archived(navigation: &NavigationState) -> bool {
        navigation.show_archived
    }

    fn prepare(draft: &NoteDraft) -> Result<NoteDraft, ValidationError> {
        draft.normalized()
    }

    fn draft_tags(draft: &NoteDraft) -> &[String] {
        &draft.tags
    }
}

impl OrganizedDocument for Habit {
    fn list(lists: &DocumentLists) -> &DocumentList<Self> {
        &lists.habits
    }

    fn list_mut(lists: &mut DocumentLists) -> &mut DocumentList<Self> {
        &mut lists.habits
    }

    fn scope(_navigation: &NavigationState, _folders: &[Folder]) -> ListScope {
        ListScope::All
    }

    fn show_archived(_navigation: &NavigationState) -> bool {
        true
    }

    fn prepare(draft: &HabitDraft) -> Result<HabitDraft, ValidationError> {
        draft.normalized()
    }

    fn draft_tags(draft: &HabitDraft) -> &[String] {
        &draft.tags
    }
}

/// Organizer state bound to one collaborator.
pub struct Organizer<C> {
    commands: C,
    config: OrganizerConfig,
    tags: Vec<Tag>,
    palette: TagPalette,
    folders: Vec<Folder>,
    folder_rows: Vec<FolderRow>,
    navigation: NavigationState,
    lists: DocumentLists,
    sidebar_visible: bool,
    status: Option<StatusMessage>,
}

impl<C: Collaborator> Organizer<C> {
    pub fn new(commands: C, config: OrganizerConfig) -> Self {
        let config = config.normalized();
        let navigation = NavigationState {
            selected_folder: None,
            include_subfolders: config.include_subfolders,
            show_archived: config.show_archived,
        };
        Self {
            commands,
            lists: DocumentLists {
                notes: DocumentList::new(config.search_debounce_ms),
                habits: DocumentList::new(config.search_debounce_ms),
            },
            config,
            tags: Vec::new(),
            palette: TagPalette::default(),
            folders: Vec::new(),
            folder_rows: build_folder_rows(&[]),
            navigation,
            sidebar_visible: true,
            status: None,
        }
    }

    /// Loads tags, folders and both document lists.
    pub fn load(&mut self) {
        self.refresh_tags();
        self.refresh_folders();
        self.refresh::<Note>();
        self.refresh::<Habit>();
        info!(
            "event=organizer_load module=organizer status=ok tags={} folders={} notes={} habits={}",
            self.tags.len(),
            self.folders.len(),
            self.lists.notes.all().len(),
            self.lists.habits.all().len()
        );
    }

    pub fn commands(&self) -> &C {
        &self.commands
    }

    pub fn config(&self) -> &OrganizerConfig {
        &self.config
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn folder_rows(&self) -> &[FolderRow] {
        &self.folder_rows
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn notes(&self) -> &DocumentList<Note> {
        &self.lists.notes
    }

    pub fn habits(&self) -> &DocumentList<Habit> {
        &self.lists.habits
    }

    pub fn list<D: OrganizedDocument>(&self) -> &DocumentList<D> {
        D::list(&self.lists)
    }

    pub fn sidebar_visible(&self) -> bool {
        self.sidebar_visible
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_visible = !self.sidebar_visible;
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn dismiss_status(&mut self) {
        self.status = None;
    }

    /// Creates a document; on success it is reloaded and selected.
    pub fn create<D>(&mut self, draft: &D::Draft) -> Result<Option<DocumentId>, ValidationError>
    where
        D: OrganizedDocument,
        C: DocumentCommands<D>,
    {
        let draft = self.validated::<D>(draft)?;
        match <C as DocumentCommands<D>>::create_document(&self.commands, &draft) {
            Ok(id) => {
                self.refresh_tags_for::<D>(&draft);
                self.sync_after::<D>(Mutation::Created(id));
                Ok(Some(id))
            }
            Err(err) => {
                self.report(err);
                Ok(None)
            }
        }
    }

    /// Replaces a document's fields; returns whether the write succeeded.
    pub fn update<D>(&mut self, id: DocumentId, draft: &D::Draft) -> Result<bool, ValidationError>
    where
        D: OrganizedDocument,
        C: DocumentCommands<D>,
    {
        let draft = self.validated::<D>(draft)?;
        let result = <C as DocumentCommands<D>>::update_document(&self.commands, id, &draft);
        if result.is_ok() {
            self.refresh_tags_for::<D>(&draft);
        }
        Ok(self.finish::<D>(result, Mutation::Updated(id)))
    }

    pub fn delete<D>(&mut self, id: DocumentId) -> bool
    where
        D: OrganizedDocument,
        C: DocumentCommands<D>,
    {
        let result = <C as DocumentCommands<D>>::delete_document(&self.commands, id);
        self.finish::<D>(result, Mutation::Deleted(id))
    }

    pub fn set_flag<D>(&mut self, id: DocumentId, flag: DocumentFlag, value: bool) -> bool
    where
        D: OrganizedDocument,
        C: DocumentCommands<D>,
    {
        let result = <C as DocumentCommands<D>>::toggle_flag(&self.commands, id, flag, value);
        self.finish::<D>(result, Mutation::FlagToggled(id))
    }

    /// Flips a loaded note's pin state.
    pub fn toggle_pin(&mut self, note_id: DocumentId) -> bool {
        match self.lists.notes.find(note_id).map(|note| note.is_pinned) {
            Some(pinned) => self.set_flag::<Note>(note_id, DocumentFlag::Pinned, !pinned),
            None => self.not_loaded(note_id),
        }
    }

    /// Flips a loaded note's archive state.
    pub fn toggle_archive(&mut self, note_id: DocumentId) -> bool {
        match self.lists.notes.find(note_id).map(|note| note.is_archived) {
            Some(archived) => self.set_flag::<Note>(note_id, DocumentFlag::Archived, !archived),
            None => self.not_loaded(note_id),
        }
    }

    /// Flips a loaded habit's active state.
    pub fn toggle_active(&mut self, habit_id: DocumentId) -> bool {
        match self.lists.habits.find(habit_id).map(|habit| habit.is_active) {
            Some(active) => self.set_flag::<Habit>(habit_id, DocumentFlag::Active, !active),
            None => self.not_loaded(habit_id),
        }
    }

    /// Files a loaded note under `folder_id`, or at root level for `None`.
    pub fn move_note(&mut self, note_id: DocumentId, folder_id: Option<FolderId>) -> bool {
        let Some(note) = self.lists.notes.find(note_id) else {
            return self.not_loaded(note_id);
        };
        let draft = NoteDraft {
            folder_id,
            ..NoteDraft::from_note(note)
        };
        let result = <C as DocumentCommands<Note>>::update_document(&self.commands, note_id, &draft);
        self.finish::<Note>(result, Mutation::Moved(note_id))
    }

    pub fn select<D: OrganizedDocument>(&mut self, id: DocumentId) -> bool {
        D::list_mut(&mut self.lists).select(id)
    }

    pub fn clear_selection<D: OrganizedDocument>(&mut self) {
        D::list_mut(&mut self.lists).clear_selection();
    }

    /// Records search input; the query runs once the debounce elapses.
    pub fn search_input<D: OrganizedDocument>(&mut self, text: &str, now_ms: u64) {
        D::list_mut(&mut self.lists)
            .search_mut()
            .input(text, now_ms);
    }

    /// Clears search immediately and shows the folder-scoped list again.
    pub fn clear_search<D>(&mut self)
    where
        D: OrganizedDocument,
        C: DocumentCommands<D>,
    {
        let list = D::list_mut(&mut self.lists);
        let action = list.search_mut().clear();
        apply_search_action(&self.commands, list, action, &self.palette);
    }

    /// Advances both search debounces to `now_ms`, running due queries.
    pub fn tick(&mut self, now_ms: u64) {
        self.tick_list::<Note>(now_ms);
        self.tick_list::<Habit>(now_ms);
    }

    /// Habits that still need doing on `date`: active, inside their date
    /// range, scheduled by their recurrence rule and not yet completed.
    pub fn habits_due_on(&self, date: NaiveDate) -> Vec<&Habit> {
        self.lists
            .habits
            .all()
            .iter()
            .filter(|habit| habit.is_due_on(date))
            .collect()
    }

    /// Records a completion; the habit list reloads with fresh streaks.
    pub fn complete_habit(&mut self, habit_id: HabitId, date: NaiveDate) -> bool {
        let result = self.commands.complete_habit(habit_id, date);
        self.finish::<Habit>(result, Mutation::Completed(habit_id))
    }

    pub fn create_tag(&mut self, draft: &TagDraft) -> Result<Option<TagId>, ValidationError> {
        let draft = self.validated_tag(draft)?;
        match self.commands.create_tag(&draft) {
            Ok(id) => {
                self.after_tag_change();
                Ok(Some(id))
            }
            Err(err) => {
                self.report(err);
                Ok(None)
            }
        }
    }

    /// Renames or recolors a tag; documents pick up the change on reload.
    pub fn update_tag(&mut self, id: TagId, draft: &TagDraft) -> Result<bool, ValidationError> {
        let draft = self.validated_tag(draft)?;
        let result = self.commands.update_tag(id, &draft);
        Ok(self.finish_tag_change(result))
    }

    pub fn delete_tag(&mut self, id: TagId) -> bool {
        let result = self.commands.delete_tag(id);
        self.finish_tag_change(result)
    }

    pub fn create_folder(
        &mut self,
        draft: &FolderDraft,
    ) -> Result<Option<FolderId>, ValidationError> {
        let draft = self.validated_folder(None, draft)?;
        match self.commands.create_folder(&draft) {
            Ok(id) => {
                self.after_folder_change();
                Ok(Some(id))
            }
            Err(err) => {
                self.report(err);
                Ok(None)
            }
        }
    }

    /// Renames, recolors or re-parents a folder.
    pub fn update_folder(
        &mut self,
        id: FolderId,
        draft: &FolderDraft,
    ) -> Result<bool, ValidationError> {
        let draft = self.validated_folder(Some(id), draft)?;
        match self.commands.update_folder(id, &draft) {
            Ok(()) => {
                self.after_folder_change();
                Ok(true)
            }
            Err(err) => {
                self.report(err);
                Ok(false)
            }
        }
    }

    pub fn delete_folder(&mut self, id: FolderId) -> bool {
        match self.commands.delete_folder(id) {
            Ok(()) => {
                self.after_folder_change();
                true
            }
            Err(err) => {
                self.report(err);
                false
            }
        }
    }

    /// Scopes the note list to `folder_id`; `None` shows every note.
    pub fn select_folder(&mut self, folder_id: Option<FolderId>) {
        if self.navigation.selected_folder == folder_id {
            return;
        }
        self.navigation.selected_folder = folder_id;
        self.refresh::<Note>();
    }

    pub fn set_include_subfolders(&mut self, include: bool) {
        if self.navigation.include_subfolders == include {
            return;
        }
        self.navigation.include_subfolders = include;
        if self.navigation.selected_folder.is_some() {
            self.refresh::<Note>();
        }
    }

    pub fn set_show_archived(&mut self, show: bool) {
        if self.navigation.show_archived == show {
            return;
        }
        self.navigation.show_archived = show;
        self.refresh::<Note>();
    }

    fn validated<D: OrganizedDocument>(
        &mut self,
        draft: &D::Draft,
    ) -> Result<D::Draft, ValidationError> {
        D::prepare(draft).map_err(|err| self.reject(err))
    }

    fn validated_tag(&mut self, draft: &TagDraft) -> Result<TagDraft, ValidationError> {
        let checked = require_name(&draft.name, "tag name").and_then(|name| {
            check_color(draft.color.as_deref())?;
            Ok(TagDraft {
                name,
                color: draft.color.clone(),
            })
        });
        checked.map_err(|err| self.reject(err))
    }

    fn validated_folder(
        &mut self,
        id: Option<FolderId>,
        draft: &FolderDraft,
    ) -> Result<FolderDraft, ValidationError> {
        let checked = require_name(&draft.name, "folder name").and_then(|name| {
            check_color(draft.color.as_deref())?;
            if let Some(id) = id {
                check_folder_parent(&self.folders, id, draft.parent_id)?;
            }
            Ok(FolderDraft {
                name,
                parent_id: draft.parent_id,
                color: draft.color.clone(),
            })
        });
        checked.map_err(|err| self.reject(err))
    }

    fn finish<D>(&mut self, result: CommandResult<()>, mutation: Mutation) -> bool
    where
        D: OrganizedDocument,
        C: DocumentCommands<D>,
    {
        match result {
            Ok(()) => {
                self.sync_after::<D>(mutation);
                true
            }
            Err(err) => {
                self.report(err);
                false
            }
        }
    }

    fn sync_after<D>(&mut self, mutation: Mutation)
    where
        D: OrganizedDocument,
        C: DocumentCommands<D>,
    {
        let scope = D::scope(&self.navigation, &self.folders);
        let show_archived = D::show_archived(&self.navigation);
        let list = D::list_mut(&mut self.lists);
        if let Err(err) = after_mutation(
            &self.commands,
            list,
            mutation,
            &scope,
            &self.palette,
            show_archived,
        ) {
            self.report(err);
        }
    }

    fn refresh<D>(&mut self)
    where
        D: OrganizedDocument,
        C: DocumentCommands<D>,
    {
        let scope = D::scope(&self.navigation, &self.folders);
        let show_archived = D::show_archived(&self.navigation);
        let list = D::list_mut(&mut self.lists);
        if let Err(err) = reload_list(&self.commands, list, &scope, &self.palette, show_archived) {
            self.report(err);
        }
    }

    fn tick_list<D>(&mut self, now_ms: u64)
    where
        D: OrganizedDocument,
        C: DocumentCommands<D>,
    {
        let list = D::list_mut(&mut self.lists);
        if let Some(action) = list.search_mut().poll(now_ms) {
            apply_search_action(&self.commands, list, action, &self.palette);
        }
    }

    fn refresh_tags(&mut self) {
        match self.commands.list_tags() {
            Ok(tags) => {
                self.palette = TagPalette::from_tags(&tags);
                self.tags = tags;
                self.lists.notes.repaint(&self.palette);
                self.lists.habits.repaint(&self.palette);
            }
            Err(err) => self.report(err),
        }
    }

    /// Documents may create tags implicitly; pick up any the snapshot lacks.
    fn refresh_tags_for<D: OrganizedDocument>(&mut self, draft: &D::Draft) {
        let unknown = D::draft_tags(draft)
            .iter()
            .any(|name| !self.tags.iter().any(|tag| &tag.name == name));
        if unknown {
            self.refresh_tags();
        }
    }

    fn refresh_folders(&mut self) {
        match self.commands.list_folders() {
            Ok(folders) => {
                self.folder_rows = build_folder_rows(&folders);
                self.folders = folders;
            }
            Err(err) => self.report(err),
        }
    }

    fn finish_tag_change(&mut self, result: CommandResult<()>) -> bool {
        match result {
            Ok(()) => {
                self.after_tag_change();
                true
            }
            Err(err) => {
                self.report(err);
                false
            }
        }
    }

    fn after_tag_change(&mut self) {
        self.refresh_tags();
        // Renames and deletes cascade into document tag lists.
        self.refresh::<Note>();
        self.refresh::<Habit>();
    }

    fn after_folder_change(&mut self) {
        self.refresh_folders();
        if let Some(selected) = self.navigation.selected_folder {
            if !self.folders.iter().any(|folder| folder.id == selected) {
                self.navigation.selected_folder = None;
            }
        }
        self.refresh::<Note>();
    }

    fn not_loaded(&mut self, id: DocumentId) -> bool {
        self.set_status(StatusLevel::Error, format!("document {id} is not loaded"));
        false
    }

    fn reject(&mut self, err: ValidationError) -> ValidationError {
        self.set_status(StatusLevel::Error, err.to_string());
        err
    }

    fn report(&mut self, err: CommandError) {
        warn!(
            "event=command_failed module=organizer status=error command={} code={} error={}",
            err.command,
            err.code().unwrap_or("none"),
            err.message()
        );
        self.set_status(StatusLevel::Error, err.to_string());
    }

    fn set_status(&mut self, level: StatusLevel, text: String) {
        self.status = Some(StatusMessage { level, text });
    }
}
