//! Explicit session container: the API client, the persisted token and the
//! user it belongs to.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::api::EchoApi;
use crate::error::ClientError;
use crate::types::User;

/// Where the session token survives between runs.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, ClientError>;
    fn save(&self, token: &str) -> Result<(), ClientError>;
    fn clear(&self) -> Result<(), ClientError>;
}

/// Process-local token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, ClientError> {
        Ok(self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, token: &str) -> Result<(), ClientError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Token kept in a plain-text file. A missing or blank file means no token.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, ClientError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, token: &str) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// The signed-in (or anonymous) state of one client.
#[derive(Debug)]
pub struct Session<S: TokenStore = MemoryTokenStore> {
    api: EchoApi,
    store: S,
    user: Option<User>,
}

impl<S: TokenStore> Session<S> {
    pub fn new(api: EchoApi, store: S) -> Self {
        Self {
            api,
            store,
            user: None,
        }
    }

    /// Restore a stored token and fetch its user.
    ///
    /// Any failure to fetch the user clears the stored token and leaves the
    /// session anonymous; only token store errors are returned.
    pub async fn init(&mut self) -> Result<Option<&User>, ClientError> {
        let Some(token) = self.store.load()? else {
            self.reset();
            return Ok(None);
        };

        self.api.set_token(token);
        match self.api.current_user().await {
            Ok(user) => {
                tracing::debug!(user_id = user.id, "Session restored");
                self.user = Some(user);
            }
            Err(e) => {
                if e.is_unauthorized() {
                    tracing::info!("Stored token expired or revoked, signing out");
                } else {
                    tracing::warn!(error = %e, "Could not restore session, signing out");
                }
                self.store.clear()?;
                self.reset();
            }
        }
        Ok(self.user.as_ref())
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<&User, ClientError> {
        let auth = self.api.login(email, password).await?;
        self.store.save(&auth.token)?;
        self.api.set_token(auth.token);
        tracing::info!(user_id = auth.user.id, "Logged in");
        Ok(self.user.insert(auth.user))
    }

    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<&User, ClientError> {
        let auth = self.api.register(name, email, password).await?;
        self.store.save(&auth.token)?;
        self.api.set_token(auth.token);
        tracing::info!(user_id = auth.user.id, "Registered");
        Ok(self.user.insert(auth.user))
    }

    pub fn logout(&mut self) -> Result<(), ClientError> {
        self.store.clear()?;
        self.reset();
        Ok(())
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// The API client, carrying the session token when signed in.
    pub fn api(&self) -> &EchoApi {
        &self.api
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn reset(&mut self) {
        self.api.clear_token();
        self.user = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Nothing listens on the discard port, so every call fails fast.
    const UNREACHABLE: &str = "http://127.0.0.1:9";

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("echo-client-{}-{name}", std::process::id()))
    }

    #[tokio::test]
    async fn init_without_token_is_anonymous() {
        let mut session = Session::new(EchoApi::new(UNREACHABLE), MemoryTokenStore::default());

        assert!(session.init().await.unwrap().is_none());
        assert!(!session.is_authenticated());
        assert_eq!(session.api().token(), None);
    }

    #[tokio::test]
    async fn init_clears_token_when_user_fetch_fails() {
        let store = MemoryTokenStore::with_token("stale");
        let mut session = Session::new(EchoApi::new(UNREACHABLE), store);

        assert!(session.init().await.unwrap().is_none());
        assert_eq!(session.store().load().unwrap(), None);
        assert_eq!(session.api().token(), None);
    }

    #[tokio::test]
    async fn failed_login_keeps_session_anonymous() {
        let mut session = Session::new(EchoApi::new(UNREACHABLE), MemoryTokenStore::default());

        assert!(session.login("a@x.com", "pw").await.is_err());
        assert!(session.user().is_none());
        assert_eq!(session.store().load().unwrap(), None);
    }

    #[test]
    fn logout_clears_store() {
        let mut session = Session::new(
            EchoApi::new(UNREACHABLE),
            MemoryTokenStore::with_token("tok"),
        );

        session.logout().unwrap();

        assert_eq!(session.store().load().unwrap(), None);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn file_store_saves_loads_and_clears() {
        let path = scratch_path("token");
        let store = FileTokenStore::new(&path);
        store.clear().unwrap();

        assert_eq!(store.load().unwrap(), None);

        store.save("abc.def.ghi").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("abc.def.ghi"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn blank_token_file_means_no_token() {
        let path = scratch_path("blank");
        std::fs::write(&path, "  \n").unwrap();

        assert_eq!(FileTokenStore::new(&path).load().unwrap(), None);
        std::fs::remove_file(path).unwrap();
    }
}
