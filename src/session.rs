//! Transient per-session state: the current patient record, image asset,
//! loaded model handle and last analysis results. Sessions live in memory
//! only; lifetime equals the user interaction session, torn down on
//! explicit delete or process exit.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::analysis::{Explanation, VqaResults};
use crate::models::imaging::ImageAsset;
use crate::models::patient::PatientRecord;
use crate::pipeline::vqa::VqaModel;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(Uuid),

    #[error("Session store lock poisoned")]
    LockPoisoned,
}

/// State for one user interaction session. Each field is replaced
/// wholesale by its owning action; nothing is merged.
#[derive(Default)]
pub struct Session {
    pub created_at: Option<DateTime<Utc>>,
    /// Replaced on every explicit save.
    pub patient: Option<PatientRecord>,
    /// Replaced on every upload.
    pub image: Option<ImageAsset>,
    /// Loaded lazily on first upload, reused for the session. No eviction.
    pub model: Option<Arc<dyn VqaModel>>,
    /// Overwritten by each completed analysis run.
    pub results: Option<VqaResults>,
    pub explanation: Option<Explanation>,
}

/// In-memory session store shared across transports. Sessions are
/// isolated from each other; the store only mediates lookup.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh, empty session and return its id.
    pub fn create(&self) -> Result<Uuid, SessionError> {
        let id = Uuid::new_v4();
        let session = Session {
            created_at: Some(Utc::now()),
            ..Default::default()
        };
        self.sessions
            .write()
            .map_err(|_| SessionError::LockPoisoned)?
            .insert(id, session);
        tracing::info!(session_id = %id, "session created");
        Ok(id)
    }

    /// Tear down a session. Drops image bytes and the model handle.
    pub fn remove(&self, id: Uuid) -> Result<(), SessionError> {
        let removed = self
            .sessions
            .write()
            .map_err(|_| SessionError::LockPoisoned)?
            .remove(&id);
        match removed {
            Some(_) => {
                tracing::info!(session_id = %id, "session removed");
                Ok(())
            }
            None => Err(SessionError::NotFound(id)),
        }
    }

    pub fn exists(&self, id: Uuid) -> bool {
        self.sessions
            .read()
            .map(|s| s.contains_key(&id))
            .unwrap_or(false)
    }

    /// Run a closure against a session immutably.
    pub fn with_session<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&Session) -> R,
    ) -> Result<R, SessionError> {
        let guard = self.sessions.read().map_err(|_| SessionError::LockPoisoned)?;
        let session = guard.get(&id).ok_or(SessionError::NotFound(id))?;
        Ok(f(session))
    }

    /// Run a closure against a session mutably.
    pub fn with_session_mut<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Result<R, SessionError> {
        let mut guard = self.sessions.write().map_err(|_| SessionError::LockPoisoned)?;
        let session = guard.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        Ok(f(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::Gender;

    #[test]
    fn create_then_remove_round_trip() {
        let store = SessionStore::new();
        let id = store.create().unwrap();
        assert!(store.exists(id));
        store.remove(id).unwrap();
        assert!(!store.exists(id));
    }

    #[test]
    fn removing_unknown_session_fails() {
        let store = SessionStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(
            store.remove(id),
            Err(SessionError::NotFound(missing)) if missing == id
        ));
    }

    #[test]
    fn patient_save_replaces_wholesale() {
        let store = SessionStore::new();
        let id = store.create().unwrap();

        store
            .with_session_mut(id, |s| {
                s.patient = Some(PatientRecord {
                    name: Some("First".into()),
                    age: Some(40),
                    gender: Some(Gender::Male),
                    ..Default::default()
                });
            })
            .unwrap();

        // Second save omits age and gender; the old values must not leak.
        store
            .with_session_mut(id, |s| {
                s.patient = Some(PatientRecord {
                    name: Some("Second".into()),
                    ..Default::default()
                });
            })
            .unwrap();

        let patient = store
            .with_session(id, |s| s.patient.clone().unwrap())
            .unwrap();
        assert_eq!(patient.name.as_deref(), Some("Second"));
        assert!(patient.age.is_none());
        assert!(patient.gender.is_none());
    }

    #[test]
    fn sessions_are_isolated() {
        let store = SessionStore::new();
        let a = store.create().unwrap();
        let b = store.create().unwrap();

        store
            .with_session_mut(a, |s| {
                s.patient = Some(PatientRecord {
                    name: Some("Only in A".into()),
                    ..Default::default()
                });
            })
            .unwrap();

        let b_patient = store.with_session(b, |s| s.patient.clone()).unwrap();
        assert!(b_patient.is_none());
    }
}
