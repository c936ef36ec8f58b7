//! The normalized in-memory store of inventory components.
//!
//! Every view of the inventory (the listing for a lab, the results of a text
//! search, a single looked-up component) reads from one [`ComponentStore`]
//! keyed by [`ComponentId`]. Server payloads are folded into the store with
//! [`merge`], which keeps a locally known reservation request flag in
//! preference to the server's copy.

use std::collections::{HashMap, HashSet};

use tracing::instrument;

use crate::domain::{Component, ComponentId};

/// Combines a freshly fetched component with the locally known copy, if any.
///
/// Everything except the request flag comes from the server, which is
/// authoritative for the borrow state. The request flag is kept from the
/// local copy because the user may have requested or cancelled since the
/// server produced its payload. Optional names the new payload omits are
/// kept from the local copy.
#[must_use]
pub fn merge(previous: Option<&Component>, fetched: Component) -> Component {
    let Some(previous) = previous else {
        return fetched;
    };
    Component {
        request_pending: previous.request_pending,
        faculty_name: fetched
            .faculty_name
            .or_else(|| previous.faculty_name.clone()),
        department_name: fetched
            .department_name
            .or_else(|| previous.department_name.clone()),
        image: fetched.image.or_else(|| previous.image.clone()),
        ..fetched
    }
}

/// An in-memory store of components shared by all views.
#[derive(Debug, Default, Clone)]
pub struct ComponentStore {
    /// Component records, keyed by identifier.
    components: HashMap<ComponentId, Component>,

    /// Identifiers of the current lab listing, in server order.
    lab_view: Vec<ComponentId>,

    /// Identifiers of the current search results, in server order.
    /// `None` when no search is active.
    search_view: Option<Vec<ComponentId>>,
}

impl ComponentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds fetched components into the store.
    ///
    /// Returns their identifiers in the order given, without duplicates.
    #[instrument(level = "debug", skip_all, fields(fetched = fetched.len()))]
    pub fn reconcile(&mut self, fetched: Vec<Component>) -> Vec<ComponentId> {
        let mut seen = HashSet::with_capacity(fetched.len());
        let mut ids = Vec::with_capacity(fetched.len());

        for component in fetched {
            let id = component.id.clone();
            let merged = merge(self.components.get(&id), component);
            self.components.insert(id.clone(), merged);
            if seen.insert(id.clone()) {
                ids.push(id);
            }
        }

        ids
    }

    /// Replaces the lab listing with a fresh fetch and ends any search.
    pub fn replace_lab_view(&mut self, fetched: Vec<Component>) {
        self.lab_view = self.reconcile(fetched);
        self.search_view = None;
    }

    /// Replaces the search results with a fresh fetch.
    pub fn replace_search_view(&mut self, fetched: Vec<Component>) {
        self.search_view = Some(self.reconcile(fetched));
    }

    /// Ends the current search so the lab listing is visible again.
    pub fn clear_search(&mut self) {
        self.search_view = None;
    }

    /// Folds a single looked-up component into the store and returns the
    /// merged record.
    pub fn upsert(&mut self, fetched: Component) -> &Component {
        let id = fetched.id.clone();
        let merged = merge(self.components.get(&id), fetched);
        self.components.entry(id).insert_entry(merged).into_mut()
    }

    /// Records the outcome of a reserve (`true`) or cancel (`false`) request.
    ///
    /// Returns `false` if the component is not in the store.
    pub fn set_request_pending(&mut self, id: &ComponentId, pending: bool) -> bool {
        self.components
            .get_mut(id)
            .map(|component| component.request_pending = pending)
            .is_some()
    }

    /// Looks up a component.
    #[must_use]
    pub fn get(&self, id: &ComponentId) -> Option<&Component> {
        self.components.get(id)
    }

    /// The components of the current lab listing.
    pub fn lab_listing(&self) -> impl Iterator<Item = &Component> {
        self.resolve(&self.lab_view)
    }

    /// The current search results, if a search is active.
    #[must_use]
    pub fn search_results(&self) -> Option<impl Iterator<Item = &Component>> {
        self.search_view.as_deref().map(|ids| self.resolve(ids))
    }

    /// Whether a search is active.
    #[must_use]
    pub const fn is_searching(&self) -> bool {
        self.search_view.is_some()
    }

    /// The components currently on screen.
    ///
    /// These are the search results while a search is active, otherwise the
    /// lab listing.
    pub fn visible(&self) -> impl Iterator<Item = &Component> {
        self.resolve(self.search_view.as_deref().unwrap_or(&self.lab_view))
    }

    /// Number of known components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the store holds no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Forgets everything.
    pub fn clear(&mut self) {
        self.components.clear();
        self.lab_view.clear();
        self.search_view = None;
    }

    fn resolve<'a>(&'a self, ids: &'a [ComponentId]) -> impl Iterator<Item = &'a Component> {
        ids.iter().filter_map(|id| self.components.get(id))
    }
}
