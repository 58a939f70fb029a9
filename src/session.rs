use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

/// Invoked when the backend rejects the session with a 401.
pub trait AuthRedirect: Send + Sync {
    fn redirect_to_login(&self);
}

/// Redirect hook that only logs. Used when the caller does not supply one.
#[derive(Debug, Default)]
pub struct LogRedirect;

impl AuthRedirect for LogRedirect {
    fn redirect_to_login(&self) {
        info!("session expired, authentication required");
    }
}

/// Token snapshot taken when a request is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTicket {
    pub(crate) generation: u64,
    pub(crate) token: Option<String>,
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    generation: u64,
    expired: bool,
}

/// Shared bearer-token store. The auth flow writes it, every request reads it.
///
/// Each call to [`Session::set_token`] starts a new generation. A 401 expires
/// the generation its request was sent under, so a burst of concurrent 401s
/// clears the token and redirects exactly once.
pub struct Session {
    state: Mutex<SessionState>,
    redirect: Arc<dyn AuthRedirect>,
}

impl Session {
    pub fn new(redirect: Arc<dyn AuthRedirect>) -> Self {
        Self {
            state: Mutex::new(SessionState::default()),
            redirect,
        }
    }

    pub fn with_token(token: impl Into<String>, redirect: Arc<dyn AuthRedirect>) -> Self {
        let session = Self::new(redirect);
        session.set_token(token);
        session
    }

    pub fn set_token(&self, token: impl Into<String>) {
        let mut state = self.state.lock();
        state.token = Some(token.into());
        state.generation += 1;
        state.expired = false;
        debug!(generation = state.generation, "session token stored");
    }

    /// Clear the token as a deliberate sign-out. Does not redirect.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.token = None;
        state.generation += 1;
        state.expired = false;
    }

    pub fn token(&self) -> Option<String> {
        self.state.lock().token.clone()
    }

    pub(crate) fn ticket(&self) -> SessionTicket {
        let state = self.state.lock();
        SessionTicket {
            generation: state.generation,
            token: state.token.clone(),
        }
    }

    /// Handle a 401 for a request sent with `ticket`. Returns true if this
    /// call performed the clear and redirect.
    pub(crate) fn expire(&self, ticket: &SessionTicket) -> bool {
        {
            let mut state = self.state.lock();
            if state.generation != ticket.generation || state.expired {
                return false;
            }
            state.expired = true;
            state.token = None;
        }
        self.redirect.redirect_to_login();
        true
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Arc::new(LogRedirect))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Session")
            .field("has_token", &state.token.is_some())
            .field("generation", &state.generation)
            .field("expired", &state.expired)
            .finish()
    }
}
