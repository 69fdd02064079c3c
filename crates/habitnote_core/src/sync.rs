//! Keeps a displayed document list consistent with the collaborator.
//!
//! # Responsibility
//! - Reload the authoritative collection after every mutation.
//! - Reapply ordering, tag colors and selection on each reload.
//! - Route search actions into the visible list.
//!
//! # Invariants
//! - After a successful reload the full collection is exactly what the
//!   collaborator returned (minus hidden archived notes), in canonical order.
//! - Search results hide archived notes exactly like the scope view, so a
//!   query shows the same documents whether it ran remotely or locally.
//! - A selection survives a reload only if its id is still present, and it
//!   is replaced by the freshly loaded instance.
//! - A failed reload leaves the previous collection and selection untouched.

use crate::command::{CommandResult, DocumentCommands, ListScope};
use crate::model::document::{Document, DocumentId};
use crate::ordering::{filter_archived, order_documents};
use crate::search::{QueryTicket, SearchAction, SearchCoordinator, SearchResolution};
use crate::tags::{TagChip, TagPalette};
use log::{debug, info, warn};

/// One rendered list row.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayItem<D> {
    pub document: D,
    pub tag_chips: Vec<TagChip>,
    /// Note excerpt or habit schedule.
    pub subtitle: Option<String>,
}

impl<D: Document> DisplayItem<D> {
    fn render(document: D, palette: &TagPalette) -> Self {
        let tag_chips = palette.chips(document.tags());
        let subtitle = document.subtitle();
        Self {
            document,
            tag_chips,
            subtitle,
        }
    }
}

/// Mutation that triggers a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Created(DocumentId),
    Updated(DocumentId),
    Deleted(DocumentId),
    FlagToggled(DocumentId),
    Moved(DocumentId),
    Completed(DocumentId),
}

impl Mutation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Updated(_) => "updated",
            Self::Deleted(_) => "deleted",
            Self::FlagToggled(_) => "flag_toggled",
            Self::Moved(_) => "moved",
            Self::Completed(_) => "completed",
        }
    }

    pub fn id(self) -> DocumentId {
        match self {
            Self::Created(id)
            | Self::Updated(id)
            | Self::Deleted(id)
            | Self::FlagToggled(id)
            | Self::Moved(id)
            | Self::Completed(id) => id,
        }
    }
}

/// Displayed state of one document kind.
#[derive(Debug, Clone)]
pub struct DocumentList<D> {
    all: Vec<D>,
    visible: Vec<DisplayItem<D>>,
    selected: Option<D>,
    loading: bool,
    show_archived: bool,
    search: SearchCoordinator,
}

impl<D: Document> DocumentList<D> {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            all: Vec::new(),
            visible: Vec::new(),
            selected: None,
            loading: false,
            show_archived: false,
            search: SearchCoordinator::new(debounce_ms),
        }
    }

    /// Last loaded, ordered collection for the current scope.
    pub fn all(&self) -> &[D] {
        &self.all
    }

    /// Rows currently shown: the scope view or search results.
    pub fn visible(&self) -> &[DisplayItem<D>] {
        &self.visible
    }

    pub fn selected(&self) -> Option<&D> {
        self.selected.as_ref()
    }

    pub fn selected_id(&self) -> Option<DocumentId> {
        self.selected.as_ref().map(Document::id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn search(&self) -> &SearchCoordinator {
        &self.search
    }

    pub fn search_mut(&mut self) -> &mut SearchCoordinator {
        &mut self.search
    }

    /// Finds a document by id in the collection or the visible rows.
    pub fn find(&self, id: DocumentId) -> Option<&D> {
        self.all
            .iter()
            .find(|document| document.id() == id)
            .or_else(|| {
                self.visible
                    .iter()
                    .map(|item| &item.document)
                    .find(|document| document.id() == id)
            })
    }

    /// Selects `id` if it is loaded; returns whether it was.
    pub fn select(&mut self, id: DocumentId) -> bool {
        let found = self.find(id).cloned();
        let selected = found.is_some();
        if selected {
            self.selected = found;
        }
        selected
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Re-resolves tag chips on the visible rows against a new palette.
    pub fn repaint(&mut self, palette: &TagPalette) {
        let documents = self
            .visible
            .drain(..)
            .map(|item| item.document)
            .collect::<Vec<_>>();
        self.show(documents, palette);
    }

    fn show(&mut self, documents: Vec<D>, palette: &TagPalette) {
        self.visible = documents
            .into_iter()
            .map(|document| DisplayItem::render(document, palette))
            .collect();
    }

    fn show_scope(&mut self, palette: &TagPalette) {
        self.show(self.all.clone(), palette);
    }

    fn reconcile_selection(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        match self.find(id).cloned() {
            Some(fresh) => self.selected = Some(fresh),
            None => {
                debug!(
                    "event=selection_cleared module=sync status=ok kind={} id={}",
                    D::KIND.as_str(),
                    id
                );
                self.selected = None;
            }
        }
    }
}

/// Reloads the full collection for `scope` and re-derives the visible rows.
///
/// An applied search is re-run against the collaborator so the rows keep
/// showing results for that query.
pub fn reload_list<D, C>(
    commands: &C,
    list: &mut DocumentList<D>,
    scope: &ListScope,
    palette: &TagPalette,
    show_archived: bool,
) -> CommandResult<()>
where
    D: Document,
    C: DocumentCommands<D> + ?Sized,
{
    list.loading = true;
    let loaded = match commands.list_documents(scope) {
        Ok(loaded) => loaded,
        Err(err) => {
            list.loading = false;
            warn!(
                "event=list_reload module=sync status=error kind={} error={}",
                D::KIND.as_str(),
                err
            );
            return Err(err);
        }
    };

    list.show_archived = show_archived;
    list.all = order_documents(filter_archived(loaded, show_archived));
    match list.search.reissue() {
        Some(ticket) => run_query(commands, list, &ticket, palette),
        None => list.show_scope(palette),
    }
    list.reconcile_selection();
    list.loading = false;

    info!(
        "event=list_reload module=sync status=ok kind={} count={} visible={}",
        D::KIND.as_str(),
        list.all.len(),
        list.visible.len()
    );
    Ok(())
}

/// Reloads after a write; a created document becomes the selection.
pub fn after_mutation<D, C>(
    commands: &C,
    list: &mut DocumentList<D>,
    mutation: Mutation,
    scope: &ListScope,
    palette: &TagPalette,
    show_archived: bool,
) -> CommandResult<()>
where
    D: Document,
    C: DocumentCommands<D> + ?Sized,
{
    debug!(
        "event=after_mutation module=sync status=start kind={} mutation={} id={}",
        D::KIND.as_str(),
        mutation.as_str(),
        mutation.id()
    );
    reload_list(commands, list, scope, palette, show_archived)?;
    if let Mutation::Created(id) = mutation {
        list.select(id);
    }
    Ok(())
}

/// Applies a debounce or clear outcome to the list, running the query if any.
pub fn apply_search_action<D, C>(
    commands: &C,
    list: &mut DocumentList<D>,
    action: SearchAction,
    palette: &TagPalette,
) where
    D: Document,
    C: DocumentCommands<D> + ?Sized,
{
    match action {
        SearchAction::ShowScope => list.show_scope(palette),
        SearchAction::Query(ticket) => run_query(commands, list, &ticket, palette),
    }
}

/// Feeds a query response into the list; returns whether it was applied.
pub fn complete_search<D: Document>(
    list: &mut DocumentList<D>,
    ticket: &QueryTicket,
    result: CommandResult<Vec<D>>,
    palette: &TagPalette,
) -> bool {
    match list.search.resolve(ticket, result, &list.all) {
        SearchResolution::Results(items) => {
            let items = filter_archived(items, list.show_archived);
            list.show(items, palette);
            true
        }
        SearchResolution::Degraded { items, .. } => {
            list.show(items, palette);
            true
        }
        SearchResolution::Stale => false,
    }
}

fn run_query<D, C>(commands: &C, list: &mut DocumentList<D>, ticket: &QueryTicket, palette: &TagPalette)
where
    D: Document,
    C: DocumentCommands<D> + ?Sized,
{
    let result = commands.search_documents(ticket.text());
    complete_search(list, ticket, result, palette);
}
