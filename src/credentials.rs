//! Explicit credential context passed into every API call.

use std::sync::{Arc, Mutex};

use crate::options::SecretString;

type LogoutHook = Arc<dyn Fn() + Send + Sync>;

/// Auth token plus the action to run when the server rejects it.
///
/// Cloning shares the underlying token, so a logout seen by one clone is
/// seen by all of them.
///
/// # Example
/// ```rust
/// use lessonstream::credentials::Credentials;
///
/// let credentials = Credentials::new("jwt-token").on_logout(|| println!("signed out"));
/// assert!(credentials.is_logged_in());
/// credentials.logout();
/// assert!(!credentials.is_logged_in());
/// ```
#[derive(Clone, Default)]
pub struct Credentials {
    token: Arc<Mutex<Option<SecretString>>>,
    on_logout: Option<LogoutHook>,
}

impl Credentials {
    /// Credentials holding `token`.
    pub fn new(token: impl Into<SecretString>) -> Self {
        Self {
            token: Arc::new(Mutex::new(Some(token.into()))),
            on_logout: None,
        }
    }

    /// Credentials for a visitor without a token.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Set the callback invoked after [`logout`](Self::logout) clears the token.
    pub fn on_logout<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_logout = Some(Arc::new(hook));
        self
    }

    pub fn is_logged_in(&self) -> bool {
        self.lock().is_some()
    }

    /// `Authorization` header value, when logged in.
    pub fn bearer(&self) -> Option<String> {
        self.lock()
            .as_ref()
            .map(|token| format!("Bearer {}", token.expose_secret()))
    }

    /// Clear the token and notify the logout callback.
    pub fn logout(&self) {
        self.lock().take();
        if let Some(hook) = &self.on_logout {
            hook();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<SecretString>> {
        self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("logged_in", &self.is_logged_in())
            .finish()
    }
}
