//! Core of the HabitNote organizer: notes, habits, tags and folders.
//!
//! Pure projections (recurrence codec, tag colors, folder tree, ordering)
//! sit next to the stateful pieces (search debounce, list sync, organizer)
//! and a SQLite store that serves the collaborator commands.

pub mod command;
pub mod config;
pub mod folders;
pub mod logging;
pub mod model;
pub mod ordering;
pub mod organizer;
pub mod search;
pub mod store;
pub mod sync;
pub mod tags;
pub mod validation;

pub use command::{
    Collaborator, CommandError, CommandResult, DocumentCommands, ErrorPayload, FolderCommands,
    HabitCommands, ListScope, TagCommands,
};
pub use config::OrganizerConfig;
pub use folders::{build_folder_rows, FolderRow, ALL_NOTES_LABEL};
pub use logging::{
    default_log_level, init_logging, init_logging_with_config, logging_status, LoggingError,
};
pub use model::document::{Document, DocumentFlag, DocumentId, DocumentKind};
pub use model::folder::{Folder, FolderDraft, FolderId};
pub use model::habit::{Habit, HabitDraft, HabitId, Priority};
pub use model::note::{Note, NoteDraft, NoteId};
pub use model::recurrence::{RecurrenceError, RecurrenceRule, ScheduleForm, Streaks};
pub use model::tag::{Tag, TagDraft, TagId};
pub use ordering::{filter_by_text, order_documents};
pub use organizer::{NavigationState, Organizer, StatusLevel, StatusMessage};
pub use search::{QueryTicket, SearchAction, SearchCoordinator, SearchPhase, SearchResolution};
pub use store::{SqliteStore, StoreError, StoreResult};
pub use sync::{DisplayItem, DocumentList, Mutation};
pub use tags::{contrast_text_color, TagChip, TagPalette, TextColor};
pub use validation::ValidationError;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
