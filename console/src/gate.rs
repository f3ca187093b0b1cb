use std::sync::Arc;

use client::ApiClient;
use client::error::ApiError;
use client::session::SessionStore;
use log::info;

/// Where the shell should send the operator next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    Login,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Initial state, session lookup not performed yet. No protected
    /// content is rendered and no authenticated-only call may be issued.
    Resolving,
    Authenticated,
    Unauthenticated,
}

/// Route-level guard over the session store.
///
/// Resolves once from the store, then only ever moves to `Unauthenticated`
/// through an explicit logout or an authorization failure reported by the
/// API client. Both clear the stored credential before redirecting, so the
/// session invariant (`authenticated` iff a token is stored) holds at every
/// transition.
pub struct AuthGate {
    session: Arc<dyn SessionStore>,
    state: GateState,
}

impl AuthGate {
    pub fn new(session: Arc<dyn SessionStore>) -> Self {
        Self {
            session,
            state: GateState::Resolving,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn allows_protected_content(&self) -> bool {
        self.state == GateState::Authenticated
    }

    /// Synchronous session lookup, performed once on startup.
    pub fn resolve(&mut self) -> GateState {
        if self.state == GateState::Resolving {
            self.state = if self.session.is_authenticated() {
                GateState::Authenticated
            } else {
                GateState::Unauthenticated
            };
        }
        self.state
    }

    /// Exchanges the admin password for a session token. Returns whether the
    /// login succeeded; a wrong password (rejected request or a
    /// `success: false` body) leaves the session unauthenticated without
    /// being treated as a hard error. Transport failures still propagate.
    pub async fn login(&mut self, api: &ApiClient, password: &str) -> Result<bool, ApiError> {
        match api.auth().login(password).await {
            Ok(response) if response.success && !response.token.is_empty() => {
                self.session.set_token(&response.token);
                self.state = GateState::Authenticated;
                info!("operator logged in");
                Ok(true)
            }
            Ok(_) => {
                self.state = GateState::Unauthenticated;
                Ok(false)
            }
            Err(e) if e.is_auth_failure() => {
                self.state = GateState::Unauthenticated;
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Clears the stored credential and redirects to the login entry point.
    pub fn logout(&mut self) -> Redirect {
        self.session.clear();
        self.state = GateState::Unauthenticated;
        info!("operator logged out");
        Redirect::Login
    }

    /// Reported authorization failures end the session; they are never
    /// silently ignored. Non-auth errors are left to the caller.
    pub fn on_auth_failure(&mut self, error: &ApiError) -> Option<Redirect> {
        if !error.is_auth_failure() {
            return None;
        }
        self.session.clear();
        self.state = GateState::Unauthenticated;
        info!("session rejected by server, redirecting to login");
        Some(Redirect::Login)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client::session::MemorySessionStore;

    #[test]
    fn resolves_authenticated_when_token_is_stored() {
        let session = Arc::new(MemorySessionStore::new());
        session.set_token("tok");

        let mut gate = AuthGate::new(session);
        assert_eq!(gate.state(), GateState::Resolving);
        assert!(!gate.allows_protected_content());

        assert_eq!(gate.resolve(), GateState::Authenticated);
        assert!(gate.allows_protected_content());
    }

    #[test]
    fn resolves_unauthenticated_without_token() {
        let mut gate = AuthGate::new(Arc::new(MemorySessionStore::new()));
        assert_eq!(gate.resolve(), GateState::Unauthenticated);
        assert!(!gate.allows_protected_content());
    }

    #[test]
    fn logout_clears_store_and_redirects() {
        let session = Arc::new(MemorySessionStore::new());
        session.set_token("tok");

        let mut gate = AuthGate::new(session.clone());
        gate.resolve();

        assert_eq!(gate.logout(), Redirect::Login);
        assert_eq!(gate.state(), GateState::Unauthenticated);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn auth_failure_ends_the_session() {
        let session = Arc::new(MemorySessionStore::new());
        session.set_token("stale-tok");

        let mut gate = AuthGate::new(session.clone());
        gate.resolve();

        let err = ApiError::Unauthorized {
            status: 401,
            message: None,
        };
        assert_eq!(gate.on_auth_failure(&err), Some(Redirect::Login));
        assert_eq!(gate.state(), GateState::Unauthenticated);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn non_auth_errors_do_not_end_the_session() {
        let session = Arc::new(MemorySessionStore::new());
        session.set_token("tok");

        let mut gate = AuthGate::new(session.clone());
        gate.resolve();

        let err = ApiError::Network("timeout".into());
        assert_eq!(gate.on_auth_failure(&err), None);
        assert_eq!(gate.state(), GateState::Authenticated);
        assert!(session.is_authenticated());
    }
}
