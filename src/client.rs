//! The remote inventory service.
//!
//! [`InventoryService`] is the seam between the controller and the network.
//! [`HttpClient`] implements it against the PHP backend.

mod http;
mod wire;

pub use http::HttpClient;

use crate::domain::{
    Component, ComponentId, Credentials, Faculty, Hierarchy, LabId, ProfileUpdate,
    Registration, ReservationRequest, User, UserId,
};

/// Errors returned by the inventory service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request could not be sent or the response could not be read.
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        /// The endpoint that was called.
        endpoint: &'static str,
        /// The underlying error.
        source: reqwest::Error,
    },
    /// The server answered with a non-success HTTP status.
    #[error("{endpoint} responded with HTTP {status}")]
    Status {
        /// The endpoint that was called.
        endpoint: &'static str,
        /// The HTTP status code.
        status: u16,
    },
    /// The response body was not the expected JSON.
    #[error("{endpoint} returned an unreadable response: {source}")]
    Decode {
        /// The endpoint that was called.
        endpoint: &'static str,
        /// The underlying error.
        source: serde_json::Error,
    },
    /// The server processed the request and reported failure.
    #[error("{endpoint} rejected the request{}", detail(.message.as_deref()))]
    Rejected {
        /// The endpoint that was called.
        endpoint: &'static str,
        /// The server's explanation, if it gave one.
        message: Option<String>,
    },
}

fn detail(message: Option<&str>) -> String {
    message
        .map(|message| format!(": {message}"))
        .unwrap_or_default()
}

impl Error {
    /// Whether the request failed in transit rather than being refused by
    /// the application.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }

    /// The server-provided failure message, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// The operations offered by the inventory service.
///
/// List operations return an empty list when the server reports nothing
/// found, and [`InventoryService::component`] returns `None` for an unknown
/// identifier; neither is an error.
pub trait InventoryService {
    /// Fetches the faculty → department → lab hierarchy.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn hierarchy(&self) -> Result<Hierarchy, Error>;

    /// Lists the faculties users can register under.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    fn faculties(&self) -> Result<Vec<Faculty>, Error>;

    /// Lists the components of a lab.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn components_in_lab(&self, lab: LabId) -> Result<Vec<Component>, Error>;

    /// Searches components by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn search_components(&self, name: &str) -> Result<Vec<Component>, Error>;

    /// Looks up a single component.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn component(&self, id: &ComponentId) -> Result<Option<Component>, Error>;

    /// Asks to reserve a component on behalf of `user`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    fn request_reserve(&self, id: &ComponentId, user: &User) -> Result<(), Error>;

    /// Withdraws `user`'s request to reserve a component.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    fn cancel_reserve(&self, id: &ComponentId, user: &User) -> Result<(), Error>;

    /// Lists all outstanding reservation requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn reservations(&self) -> Result<Vec<ReservationRequest>, Error>;

    /// Authenticates and returns the account's user record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the credentials are refused.
    fn login(&self, credentials: &Credentials) -> Result<User, Error>;

    /// Creates an account and returns its user record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server refuses the
    /// registration.
    fn signup(&self, registration: &Registration) -> Result<User, Error>;

    /// Updates the editable profile fields of an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    fn edit_profile(&self, id: &UserId, update: &ProfileUpdate) -> Result<(), Error>;
}
