//! The controller tying the session, the component store and the inventory
//! service together.
//!
//! Every user action goes through [`App`]. It issues at most one request at
//! a time, folds the results into the shared [`ComponentStore`] and reports
//! failures as [`AppError`]s, each of which maps to a user-facing [`Alert`].
//! A failed request never modifies local state.

mod alert;
mod busy;

pub use alert::{Alert, AlertLevel};
use busy::BusyFlag;
use tracing::instrument;

use crate::{
    client::{self, InventoryService},
    domain::{
        Component, ComponentId, Credentials, Department, DepartmentId, Faculty, FacultyId,
        Hierarchy, InvalidCodeError, Lab, LabId, ProfileUpdate, Registration, ReservationRequest,
        ReservationStatus, Selection, SelectionError, User, extract_component_id,
    },
    storage::{ComponentStore, Session, SessionError},
};

/// The user action a service failure interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Fetching the faculty → department → lab hierarchy.
    LoadHierarchy,
    /// Fetching the list of faculties.
    LoadFaculties,
    /// Fetching the components of a lab.
    FetchComponents,
    /// Searching components by name.
    Search,
    /// Requesting a reservation.
    Reserve,
    /// Cancelling a reservation request.
    Cancel,
    /// Looking up a single component.
    FetchComponent,
    /// Fetching reservation requests.
    FetchReservations,
    /// Logging in or signing up.
    Authenticate,
    /// Editing the profile.
    UpdateProfile,
}

impl Action {
    /// The message shown when the action fails without a server explanation.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::LoadHierarchy => "Failed to load hierarchy.",
            Self::LoadFaculties => "Failed to load faculties.",
            Self::FetchComponents => "Failed to fetch components.",
            Self::Search => "Failed to search components.",
            Self::Reserve => "Failed to submit request.",
            Self::Cancel => "Failed to cancel request.",
            Self::FetchComponent => "Failed to fetch component details.",
            Self::FetchReservations => "Failed to fetch reservations.",
            Self::Authenticate => "An error occurred.",
            Self::UpdateProfile => "Failed to update profile.",
        }
    }

    const fn failed(self, source: client::Error) -> AppError {
        AppError::Service {
            action: self,
            source,
        }
    }
}

/// Errors surfaced by the controller.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Another request is still outstanding.
    #[error("another request is in progress")]
    Busy,

    /// The action needs a signed-in user.
    #[error("no user is signed in")]
    SignedOut,

    /// Components were requested without choosing a lab.
    #[error("no lab is selected")]
    NoLabSelected,

    /// Only available components can be requested.
    #[error("component {id} is {status}, not available")]
    NotAvailable {
        /// The component.
        id: ComponentId,
        /// Its status in the store.
        status: ReservationStatus,
    },

    /// Only requested components can have their request cancelled.
    #[error("component {id} is {status}, not requested")]
    NotRequested {
        /// The component.
        id: ComponentId,
        /// Its status in the store.
        status: ReservationStatus,
    },

    /// The hierarchy selection was rejected.
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// The scanned code does not carry a component identifier.
    #[error(transparent)]
    InvalidCode(#[from] InvalidCodeError),

    /// The inventory service failed or refused the request.
    #[error("{}: {source}", .action.failure_message())]
    Service {
        /// What the user was doing.
        action: Action,
        /// The underlying error.
        source: client::Error,
    },

    /// The session record could not be written.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl AppError {
    /// The alert to show the user for this error.
    #[must_use]
    pub fn alert(&self) -> Alert {
        match self {
            Self::Busy => Alert::info("Please wait", "A request is already in progress."),
            Self::SignedOut => Alert::error("Error", "User information is missing."),
            Self::NoLabSelected => {
                Alert::error("Error", "Please select a lab to view components.")
            }
            Self::NotAvailable { status, .. } => Alert::error(
                "Not Available",
                match status {
                    ReservationStatus::Requested => "You have already requested this component.",
                    _ => "This component is currently borrowed.",
                },
            ),
            Self::NotRequested { .. } => Alert::error(
                "Error",
                "There is no pending request to cancel for this component.",
            ),
            Self::Selection(e) => Alert::error("Error", e.to_string()),
            Self::InvalidCode(_) => Alert::error(
                "Invalid QR Code",
                "The scanned QR code does not contain a valid component ID.",
            ),
            Self::Service { action, source } => match source.server_message() {
                Some(message) => Alert::error("Error", message),
                None if *action == Action::Authenticate && source.is_transport() => {
                    Alert::error("Error", "Network error. Please try again.")
                }
                None => Alert::error("Error", action.failure_message()),
            },
            Self::Session(e) => Alert::error("Error", e.to_string()),
        }
    }
}

/// The result of looking up a single component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The component as merged into the store.
    Found(Component),
    /// The service does not know the identifier.
    NotFound(ComponentId),
}

impl LookupOutcome {
    /// The alert shown when nothing was found.
    #[must_use]
    pub fn not_found_alert() -> Alert {
        Alert::info("Not Found", "No component found with this ID.")
    }
}

/// The application controller.
#[derive(Debug)]
pub struct App<S> {
    service: S,
    session: Session,
    components: ComponentStore,
    hierarchy: Option<Hierarchy>,
    selection: Selection,
    busy: BusyFlag,
}

impl<S: InventoryService> App<S> {
    /// Creates a controller with an empty component store.
    #[must_use]
    pub fn new(service: S, session: Session) -> Self {
        Self {
            service,
            session,
            components: ComponentStore::new(),
            hierarchy: None,
            selection: Selection::default(),
            busy: BusyFlag::default(),
        }
    }

    /// The signed-in user.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.session.user()
    }

    /// The shared component store.
    #[must_use]
    pub const fn components(&self) -> &ComponentStore {
        &self.components
    }

    /// The hierarchy, if it has been loaded.
    #[must_use]
    pub const fn hierarchy(&self) -> Option<&Hierarchy> {
        self.hierarchy.as_ref()
    }

    /// The current hierarchy selection.
    #[must_use]
    pub const fn selection(&self) -> Selection {
        self.selection
    }

    /// Whether a request is outstanding.
    ///
    /// Requests complete before the operation that issued them returns, so
    /// this is `false` whenever a caller can ask.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Logs in and persists the returned user.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are refused, the request fails,
    /// or the user record cannot be persisted.
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub fn login(&mut self, credentials: &Credentials) -> Result<&User, AppError> {
        let _guard = self.busy.try_begin().ok_or(AppError::Busy)?;
        let user = self
            .service
            .login(credentials)
            .map_err(|source| Action::Authenticate.failed(source))?;
        tracing::info!(id = %user.id, "logged in");
        Ok(self.session.sign_in(user)?)
    }

    /// Creates an account and persists the returned user.
    ///
    /// # Errors
    ///
    /// Returns an error if the registration is refused, the request fails,
    /// or the user record cannot be persisted.
    #[instrument(skip_all, fields(email = %registration.email))]
    pub fn signup(&mut self, registration: &Registration) -> Result<&User, AppError> {
        let _guard = self.busy.try_begin().ok_or(AppError::Busy)?;
        let user = self
            .service
            .signup(registration)
            .map_err(|source| Action::Authenticate.failed(source))?;
        tracing::info!(id = %user.id, "signed up");
        Ok(self.session.sign_in(user)?)
    }

    /// Signs out and forgets all component state.
    ///
    /// # Errors
    ///
    /// Returns an error if the session record cannot be removed. Local state
    /// is cleared regardless.
    #[instrument(skip(self))]
    pub fn logout(&mut self) -> Result<(), AppError> {
        self.components.clear();
        self.selection = Selection::default();
        self.session.sign_out()?;
        Ok(())
    }

    /// Edits the signed-in user's profile and updates the session record.
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in, the request fails or is
    /// refused, or the record cannot be persisted.
    #[instrument(skip_all)]
    pub fn edit_profile(&mut self, update: &ProfileUpdate) -> Result<&User, AppError> {
        let _guard = self.busy.try_begin().ok_or(AppError::Busy)?;
        let user = self.session.user().ok_or(AppError::SignedOut)?;
        self.service
            .edit_profile(&user.id, update)
            .map_err(|source| Action::UpdateProfile.failed(source))?;
        self.session
            .update_profile(update)?
            .ok_or(AppError::SignedOut)
    }

    /// Lists the faculties users can register under.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is refused.
    pub fn faculties(&self) -> Result<Vec<Faculty>, AppError> {
        let _guard = self.busy.try_begin().ok_or(AppError::Busy)?;
        self.service
            .faculties()
            .map_err(|source| Action::LoadFaculties.failed(source))
    }

    /// Fetches the hierarchy afresh and resets the selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails. The previous hierarchy and
    /// selection are kept in that case.
    #[instrument(skip(self))]
    pub fn load_hierarchy(&mut self) -> Result<&Hierarchy, AppError> {
        let fetched = self.fetch_hierarchy()?;
        self.selection = Selection::default();
        Ok(self.hierarchy.insert(fetched))
    }

    fn fetch_hierarchy(&self) -> Result<Hierarchy, AppError> {
        let _guard = self.busy.try_begin().ok_or(AppError::Busy)?;
        self.service
            .hierarchy()
            .map_err(|source| Action::LoadHierarchy.failed(source))
    }

    /// The cached hierarchy together with the selection, fetching the
    /// hierarchy on first use.
    fn navigation(&mut self) -> Result<(&Hierarchy, &mut Selection), AppError> {
        let hierarchy = match self.hierarchy.take() {
            Some(hierarchy) => hierarchy,
            None => self.fetch_hierarchy()?,
        };
        Ok((&*self.hierarchy.insert(hierarchy), &mut self.selection))
    }

    /// Selects a faculty.
    ///
    /// # Errors
    ///
    /// Returns an error if the hierarchy cannot be loaded or does not
    /// contain the faculty.
    pub fn select_faculty(&mut self, id: FacultyId) -> Result<&Faculty, AppError> {
        let (hierarchy, selection) = self.navigation()?;
        Ok(selection.select_faculty(hierarchy, id)?)
    }

    /// Selects a department of the selected faculty.
    ///
    /// # Errors
    ///
    /// Returns an error if the hierarchy cannot be loaded or the department
    /// is not part of the selected faculty.
    pub fn select_department(&mut self, id: DepartmentId) -> Result<&Department, AppError> {
        let (hierarchy, selection) = self.navigation()?;
        Ok(selection.select_department(hierarchy, id)?)
    }

    /// Selects a lab of the selected department.
    ///
    /// # Errors
    ///
    /// Returns an error if the hierarchy cannot be loaded or the lab is not
    /// part of the selected department.
    pub fn select_lab(&mut self, id: LabId) -> Result<&Lab, AppError> {
        let (hierarchy, selection) = self.navigation()?;
        Ok(selection.select_lab(hierarchy, id)?)
    }

    /// Replaces the lab listing with the components of the selected lab.
    ///
    /// Returns the number of components listed.
    ///
    /// # Errors
    ///
    /// Returns an error if no lab is selected or the request fails.
    pub fn browse_selected(&mut self) -> Result<usize, AppError> {
        let lab = self.selection.lab().ok_or(AppError::NoLabSelected)?;
        self.browse_lab(lab)
    }

    /// Replaces the lab listing with the components of `lab`.
    ///
    /// Returns the number of components listed.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails. The store is left untouched
    /// in that case.
    #[instrument(skip(self), fields(lab = %lab))]
    pub fn browse_lab(&mut self, lab: LabId) -> Result<usize, AppError> {
        let _guard = self.busy.try_begin().ok_or(AppError::Busy)?;
        let fetched = self
            .service
            .components_in_lab(lab)
            .map_err(|source| Action::FetchComponents.failed(source))?;
        self.components.replace_lab_view(fetched);
        let count = self.components.lab_listing().count();
        tracing::debug!(count, "lab listing replaced");
        Ok(count)
    }

    /// Searches components by name.
    ///
    /// A blank query ends the current search without contacting the service
    /// and returns `None`. Otherwise returns the number of results.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails. The store is left untouched
    /// in that case.
    #[instrument(skip(self))]
    pub fn search(&mut self, query: &str) -> Result<Option<usize>, AppError> {
        let query = query.trim();
        if query.is_empty() {
            self.components.clear_search();
            return Ok(None);
        }

        let _guard = self.busy.try_begin().ok_or(AppError::Busy)?;
        let fetched = self
            .service
            .search_components(query)
            .map_err(|source| Action::Search.failed(source))?;
        self.components.replace_search_view(fetched);
        Ok(self.components.search_results().map(Iterator::count))
    }

    /// The status of `id` in the store, unless it is `expected`.
    ///
    /// Components the store does not know are not checked.
    fn unexpected_status(
        &self,
        id: &ComponentId,
        expected: ReservationStatus,
    ) -> Option<ReservationStatus> {
        self.components
            .get(id)
            .map(Component::status)
            .filter(|status| *status != expected)
    }

    /// Requests a reservation of a component for the signed-in user.
    ///
    /// On success the component's request flag is raised in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in, the store shows the
    /// component as requested or borrowed, or the request fails or is
    /// refused. The store is left untouched in that case.
    #[instrument(skip(self), fields(id = %id))]
    pub fn reserve(&mut self, id: &ComponentId) -> Result<(), AppError> {
        let _guard = self.busy.try_begin().ok_or(AppError::Busy)?;
        let user = self.session.user().ok_or(AppError::SignedOut)?;
        if let Some(status) = self.unexpected_status(id, ReservationStatus::Available) {
            return Err(AppError::NotAvailable {
                id: id.clone(),
                status,
            });
        }
        self.service
            .request_reserve(id, user)
            .map_err(|source| Action::Reserve.failed(source))?;
        if !self.components.set_request_pending(id, true) {
            tracing::debug!("reserved component is not in the store");
        }
        tracing::info!("reservation requested");
        Ok(())
    }

    /// Withdraws the signed-in user's request for a component.
    ///
    /// On success the component's request flag is lowered in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in, the store does not show the
    /// component as requested, or the request fails or is refused. The
    /// store is left untouched in that case.
    #[instrument(skip(self), fields(id = %id))]
    pub fn cancel(&mut self, id: &ComponentId) -> Result<(), AppError> {
        let _guard = self.busy.try_begin().ok_or(AppError::Busy)?;
        let user = self.session.user().ok_or(AppError::SignedOut)?;
        if let Some(status) = self.unexpected_status(id, ReservationStatus::Requested) {
            return Err(AppError::NotRequested {
                id: id.clone(),
                status,
            });
        }
        self.service
            .cancel_reserve(id, user)
            .map_err(|source| Action::Cancel.failed(source))?;
        if !self.components.set_request_pending(id, false) {
            tracing::debug!("cancelled component is not in the store");
        }
        tracing::info!("reservation request cancelled");
        Ok(())
    }

    /// Looks up a single component and merges it into the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails. An unknown identifier is not
    /// an error.
    #[instrument(skip(self), fields(id = %id))]
    pub fn lookup(&mut self, id: &ComponentId) -> Result<LookupOutcome, AppError> {
        let _guard = self.busy.try_begin().ok_or(AppError::Busy)?;
        let fetched = self
            .service
            .component(id)
            .map_err(|source| Action::FetchComponent.failed(source))?;
        Ok(fetched.map_or_else(
            || LookupOutcome::NotFound(id.clone()),
            |component| LookupOutcome::Found(self.components.upsert(component).clone()),
        ))
    }

    /// Extracts a component identifier from scanned text and looks it up.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidCode`] without contacting the service if
    /// the text carries no identifier, or an error if the lookup fails.
    #[instrument(skip(self))]
    pub fn scan(&mut self, scanned: &str) -> Result<LookupOutcome, AppError> {
        let id = extract_component_id(scanned)?;
        tracing::debug!(id = %id, "extracted component id");
        self.lookup(&id)
    }

    /// Fetches all outstanding reservation requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub fn reservations(&self) -> Result<Vec<ReservationRequest>, AppError> {
        let _guard = self.busy.try_begin().ok_or(AppError::Busy)?;
        self.service
            .reservations()
            .map_err(|source| Action::FetchReservations.failed(source))
    }
}
