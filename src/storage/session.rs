//! The locally persisted record of the signed-in user.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::instrument;

use crate::domain::{ProfileUpdate, User};

/// The storage key the user record is kept under.
pub const SESSION_KEY: &str = "user";

/// Errors that can occur when reading or writing the session record.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The record could not be read, written or removed.
    #[error("failed to access session record {path}: {source}")]
    Io {
        /// Location of the record.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// The record exists but is not a valid user.
    #[error("session record {path} is corrupt: {source}")]
    Corrupt {
        /// Location of the record.
        path: PathBuf,
        /// The underlying error.
        source: serde_json::Error,
    },
}

/// A file-backed store holding a single serialized user record.
#[derive(Debug, Clone)]
pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    /// Opens the store in the given directory.
    ///
    /// The directory is created on first write.
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The directory holding the record.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the record.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.root.join(format!("{SESSION_KEY}.json"))
    }

    /// Reads the stored user, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the record exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Option<User>, SessionError> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(SessionError::Io { path, source }),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| SessionError::Corrupt { path, source })
    }

    /// Writes the user record, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, user: &User) -> Result<(), SessionError> {
        let path = self.path();
        fs::create_dir_all(&self.root).map_err(|source| SessionError::Io {
            path: self.root.clone(),
            source,
        })?;
        let content = serde_json::to_string_pretty(user).map_err(|source| {
            SessionError::Corrupt {
                path: path.clone(),
                source,
            }
        })?;
        fs::write(&path, content).map_err(|source| SessionError::Io { path, source })
    }

    /// Removes the user record. Removing a missing record is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), SessionError> {
        let path = self.path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionError::Io { path, source }),
        }
    }
}

/// The session context: the signed-in user, if any, kept in step with its
/// persisted record.
#[derive(Debug)]
pub struct Session {
    store: SessionStore,
    user: Option<User>,
}

impl Session {
    /// Opens the session persisted in `store`.
    ///
    /// A record that cannot be read is logged and treated as signed out.
    #[must_use]
    #[instrument(level = "debug", skip_all, fields(path = %store.path().display()))]
    pub fn open(store: SessionStore) -> Self {
        let user = store.load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load user data: {e}");
            None
        });
        Self { store, user }
    }

    /// A session with nobody signed in and nothing persisted yet.
    #[must_use]
    pub const fn signed_out(store: SessionStore) -> Self {
        Self { store, user: None }
    }

    /// The signed-in user.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Records a successful login or signup.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be persisted. The in-memory
    /// session is updated regardless.
    pub fn sign_in(&mut self, user: User) -> Result<&User, SessionError> {
        let persisted = self.store.save(&user);
        let user = &*self.user.insert(user);
        persisted?;
        Ok(user)
    }

    /// Applies an accepted profile edit to the signed-in user.
    ///
    /// Returns `Ok(None)` when nobody is signed in.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated record cannot be persisted. The
    /// in-memory session keeps the previous profile in that case.
    pub fn update_profile(
        &mut self,
        update: &ProfileUpdate,
    ) -> Result<Option<&User>, SessionError> {
        let Some(current) = self.user.as_ref() else {
            return Ok(None);
        };
        let mut edited = current.clone();
        edited.apply(update);
        self.store.save(&edited)?;
        Ok(Some(&*self.user.insert(edited)))
    }

    /// Signs out, removing the persisted record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be removed. The in-memory
    /// session is cleared regardless.
    pub fn sign_out(&mut self) -> Result<(), SessionError> {
        self.user = None;
        self.store.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;

    fn user() -> User {
        User {
            id: UserId::new("17"),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.edu".to_string(),
            phone: "0771234567".to_string(),
            faculty: Some("Engineering".to_string()),
            profile_picture: None,
        }
    }

    #[test]
    fn missing_record_is_signed_out() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::new(tmp.path().join("state"));

        assert_eq!(store.load().unwrap(), None);
        assert!(Session::open(store).user().is_none());
    }

    #[test]
    fn sign_in_persists_under_fixed_key() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::new(tmp.path().join("state"));
        let mut session = Session::open(store.clone());

        session.sign_in(user()).unwrap();

        assert_eq!(store.path().file_name().unwrap(), "user.json");
        assert_eq!(store.load().unwrap(), Some(user()));
        assert_eq!(Session::open(store).user(), Some(&user()));
    }

    #[test]
    fn profile_update_is_persisted() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::new(tmp.path().to_path_buf());
        let mut session = Session::open(store.clone());
        session.sign_in(user()).unwrap();

        let update = ProfileUpdate {
            first_name: "Augusta".to_string(),
            last_name: "King".to_string(),
            phone: "0710000000".to_string(),
            faculty: Some("Science".to_string()),
        };
        session.update_profile(&update).unwrap();

        let stored = store.load().unwrap().unwrap();
        assert_eq!(stored.first_name, "Augusta");
        assert_eq!(stored.email, "ada@example.edu");
        assert_eq!(stored.id, UserId::new("17"));
    }

    #[test]
    fn failed_profile_save_keeps_previous_profile() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::new(tmp.path().to_path_buf());
        let mut session = Session::open(store.clone());
        session.sign_in(user()).unwrap();
        std::fs::remove_file(store.path()).unwrap();
        std::fs::create_dir(store.path()).unwrap();

        let update = ProfileUpdate {
            first_name: "Augusta".to_string(),
            ..ProfileUpdate::from(&user())
        };

        assert!(matches!(
            session.update_profile(&update),
            Err(SessionError::Io { .. })
        ));
        assert_eq!(session.user(), Some(&user()));
    }

    #[test]
    fn profile_update_without_user_does_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::new(tmp.path().to_path_buf());
        let mut session = Session::signed_out(store.clone());

        let update = ProfileUpdate::from(&user());
        assert!(session.update_profile(&update).unwrap().is_none());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn sign_out_removes_record() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::new(tmp.path().to_path_buf());
        let mut session = Session::open(store.clone());
        session.sign_in(user()).unwrap();

        session.sign_out().unwrap();

        assert!(session.user().is_none());
        assert!(!store.path().exists());
        // Signing out twice is fine.
        session.sign_out().unwrap();
    }

    #[test]
    fn corrupt_record_is_reported_and_treated_as_signed_out() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::new(tmp.path().to_path_buf());
        std::fs::write(store.path(), "{not json").unwrap();

        assert!(matches!(store.load(), Err(SessionError::Corrupt { .. })));
        assert!(Session::open(store).user().is_none());
    }
}
