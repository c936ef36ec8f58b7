//! Lab Inventory Client
//!
//! A client for a university lab-equipment inventory service. Components are
//! organised in a faculty → department → lab hierarchy and can be searched,
//! looked up by scanning a QR code, and reserved.
//!
//! Every view of the inventory reads from one [`ComponentStore`]. Fresh
//! server payloads are reconciled into it so that a reservation request made
//! from one view is visible in every other, even when the server has not yet
//! caught up.

pub mod domain;
pub use domain::{
    Component, ComponentId, Config, Hierarchy, ReservationRequest, ReservationStatus, User,
};

/// Local state: the shared component store and the persisted session record.
pub mod storage;
pub use storage::{ComponentStore, Session, SessionStore};

/// Access to the remote inventory service.
pub mod client;
pub use client::{HttpClient, InventoryService};

pub mod app;
pub use app::{Alert, App, AppError, LookupOutcome};

mod lenient;
