mod component_store;
mod session;

pub use component_store::{ComponentStore, merge};
pub use session::{SESSION_KEY, Session, SessionError, SessionStore};
