//! Request and response bodies of the inventory backend.

use serde::{Deserialize, Serialize};

use crate::domain::{Component, Faculty, ReservationRequest, User};

/// The `{ "success": ..., "message": ... }` frame around every payload
/// except the hierarchy.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default, deserialize_with = "crate::lenient::flag")]
    pub success: bool,
    #[serde(default, deserialize_with = "crate::lenient::optional_text")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub payload: T,
}

/// Rows that fail to decode are skipped, so one malformed record does not
/// hide the rest of a listing.
#[derive(Debug, Default, Deserialize)]
pub struct ComponentList {
    #[serde(default, deserialize_with = "crate::lenient::rows")]
    pub components: Vec<Component>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SingleComponent {
    #[serde(default)]
    pub component: Option<Component>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReservationList {
    #[serde(default, deserialize_with = "crate::lenient::rows")]
    pub reservations: Vec<ReservationRequest>,
}

#[derive(Debug, Deserialize)]
pub struct FacultyList {
    #[serde(default)]
    pub faculties: Vec<Faculty>,
}

#[derive(Debug, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub user: Option<User>,
}

/// Mutation responses carry nothing besides the frame.
#[derive(Debug, Deserialize)]
pub struct Ack {}

#[derive(Debug, Serialize)]
pub struct ReserveRequest<'a> {
    pub reg_no: &'a str,
    pub user_id: &'a str,
    pub user_name: String,
    pub email: &'a str,
    pub phone_number: &'a str,
    pub faculty: &'a str,
    pub profile_picture: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CancelRequest<'a> {
    pub reg_no: &'a str,
    pub user_id: &'a str,
}

#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub struct SignupRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone: &'a str,
    pub faculty: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct EditUserRequest<'a> {
    pub id: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone: &'a str,
    pub faculty: Option<&'a str>,
}
