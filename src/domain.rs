//! Domain models for the lab inventory.
//!
//! This module contains the core domain types: components and their
//! reservation status, the faculty → department → lab hierarchy, users,
//! reservation requests, scanned-code parsing and client configuration.

/// Inventory components and their reservation status.
pub mod component;
pub use component::{Component, ComponentId, InvalidComponentIdError, ReservationStatus};

/// The faculty → department → lab hierarchy.
pub mod hierarchy;
pub use hierarchy::{
    Department, DepartmentId, Faculty, FacultyId, Hierarchy, Lab, LabId, Selection,
    SelectionError,
};

/// Users, credentials and profile edits.
pub mod user;
pub use user::{Credentials, ProfileUpdate, Registration, User, UserId};

/// Read-only reservation request projections.
pub mod reservation;
pub use reservation::ReservationRequest;

/// Extraction of component identifiers from scanned codes.
pub mod barcode;
pub use barcode::{InvalidCodeError, extract_component_id};

mod config;
pub use config::Config;
