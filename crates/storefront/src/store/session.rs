//! The visitor's authentication state.

use std::sync::Arc;

use tokio::sync::watch;
use tower_sessions::Session;
use tracing::instrument;

use super::SessionError;
use crate::models::{SessionToken, session_keys};

/// Owner of the visitor's token.
///
/// The durable copy lives in the session record under
/// [`session_keys::USER_TOKEN`]; the in-memory copy is a `watch` channel so
/// dependents can observe sign-in and sign-out. `is_authenticated()` is
/// derived from the token on every call and is never stored.
#[derive(Clone)]
pub struct SessionStore {
    session: Session,
    token: Arc<watch::Sender<Option<SessionToken>>>,
}

impl SessionStore {
    /// Load the token from the session record, if one was persisted.
    ///
    /// A missing or blank value means signed out and is not an error.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the session record cannot be read.
    pub async fn initialize(session: Session) -> Result<Self, SessionError> {
        let token = session
            .get::<String>(session_keys::USER_TOKEN)
            .await?
            .and_then(SessionToken::new);

        Ok(Self {
            session,
            token: Arc::new(watch::Sender::new(token)),
        })
    }

    /// Snapshot of the current token.
    #[must_use]
    pub fn token(&self) -> Option<SessionToken> {
        self.token.borrow().clone()
    }

    /// Whether a token is currently held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.borrow().is_some()
    }

    /// Observe token changes.
    ///
    /// Every sign-in and sign-out made through this store is published here.
    /// Handlers that only need the current value read [`Self::token`], since
    /// each request builds its own store.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionToken>> {
        self.token.subscribe()
    }

    /// Persist `token` and make it current.
    ///
    /// The session ID is rotated first, then the token is written durably. If
    /// either step fails, neither the durable nor the in-memory token changes.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the session record cannot be written.
    #[instrument(skip_all)]
    pub async fn sign_in(&self, token: SessionToken) -> Result<(), SessionError> {
        self.session.cycle_id().await?;
        self.session
            .insert(session_keys::USER_TOKEN, token.expose())
            .await?;

        self.token.send_replace(Some(token));
        tracing::info!("Visitor signed in");
        Ok(())
    }

    /// Forget the token, durably and in memory.
    ///
    /// Idempotent. Returns the token that was held, if any.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the session record cannot be written.
    #[instrument(skip_all)]
    pub async fn sign_out(&self) -> Result<Option<SessionToken>, SessionError> {
        self.session
            .remove::<String>(session_keys::USER_TOKEN)
            .await?;

        let previous = self.token.send_replace(None);
        if previous.is_some() {
            tracing::info!("Visitor signed out");
        }
        Ok(previous)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::{MemoryStore, Session};

    use super::*;

    fn token(value: &str) -> SessionToken {
        SessionToken::new(value).unwrap()
    }

    fn fresh_session(store: &Arc<MemoryStore>) -> Session {
        Session::new(None, store.clone(), None)
    }

    #[tokio::test]
    async fn test_initialize_without_token_is_signed_out() {
        let backend = Arc::new(MemoryStore::default());
        let store = SessionStore::initialize(fresh_session(&backend))
            .await
            .unwrap();

        assert!(!store.is_authenticated());
        assert!(store.token().is_none());
    }

    #[tokio::test]
    async fn test_blank_persisted_token_is_signed_out() {
        let backend = Arc::new(MemoryStore::default());
        let session = fresh_session(&backend);
        session
            .insert(session_keys::USER_TOKEN, "   ")
            .await
            .unwrap();

        let store = SessionStore::initialize(session).await.unwrap();
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_sign_in_then_sign_out_clears_durable_storage() {
        let backend = Arc::new(MemoryStore::default());
        let session = fresh_session(&backend);
        let store = SessionStore::initialize(session.clone()).await.unwrap();

        session.save().await.unwrap();
        let anonymous_id = session.id();

        store.sign_in(token("T1")).await.unwrap();
        assert!(store.is_authenticated());
        assert_eq!(store.token(), Some(token("T1")));
        assert_eq!(
            session.get::<String>(session_keys::USER_TOKEN).await.unwrap().as_deref(),
            Some("T1")
        );

        // A later request loading the rotated record sees the token.
        session.save().await.unwrap();
        let id = session.id();
        assert_ne!(id, anonymous_id);
        let reloaded = SessionStore::initialize(Session::new(id, backend.clone(), None))
            .await
            .unwrap();
        assert_eq!(reloaded.token(), Some(token("T1")));

        let previous = store.sign_out().await.unwrap();
        assert_eq!(previous, Some(token("T1")));
        assert!(!store.is_authenticated());
        assert!(store.token().is_none());

        session.save().await.unwrap();
        let reloaded = SessionStore::initialize(Session::new(session.id(), backend, None))
            .await
            .unwrap();
        assert!(reloaded.token().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_is_idempotent() {
        let backend = Arc::new(MemoryStore::default());
        let store = SessionStore::initialize(fresh_session(&backend))
            .await
            .unwrap();

        assert_eq!(store.sign_out().await.unwrap(), None);
        assert_eq!(store.sign_out().await.unwrap(), None);
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_authenticated_tracks_token_through_any_sequence() {
        let backend = Arc::new(MemoryStore::default());
        let store = SessionStore::initialize(fresh_session(&backend))
            .await
            .unwrap();

        let steps: [Option<&str>; 6] = [Some("A"), Some("B"), None, None, Some("C"), None];
        for step in steps {
            match step {
                Some(value) => store.sign_in(token(value)).await.unwrap(),
                None => {
                    store.sign_out().await.unwrap();
                }
            }
            assert_eq!(store.is_authenticated(), store.token().is_some());
            assert_eq!(store.token().map(|t| t.expose().to_string()), step.map(String::from));
        }
    }

    #[tokio::test]
    async fn test_subscribers_observe_changes() {
        let backend = Arc::new(MemoryStore::default());
        let store = SessionStore::initialize(fresh_session(&backend))
            .await
            .unwrap();
        let mut rx = store.subscribe();

        store.sign_in(token("T1")).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Some(token("T1")));

        store.sign_out().await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_none());
    }
}
