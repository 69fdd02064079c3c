//! Domain model for habits, notes, tags and folders.
//!
//! # Responsibility
//! - Define the records exchanged with the external collaborator.
//! - Define draft shapes used by create/update commands.
//!
//! # Invariants
//! - Documents reference tags by name, never by id.
//! - Every record is identified by a stable `Uuid` assigned by the store.
//! - Timestamps are Unix epoch milliseconds.

pub mod document;
pub mod folder;
pub mod habit;
pub mod note;
pub mod recurrence;
pub mod tag;
