use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{AccountService, ApiError, AuthService};
use crate::models::{OAuthApp, Scope, Token, User};

use super::{CredentialStore, Credentials, SessionError, SessionResult};

/// Where the session currently stands. Derived from the last operation and
/// never persisted; only the token itself is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    /// Exchanging Basic credentials for a token
    Authenticating,
    /// Fetching the account with a token to prove it works
    VerifyingIdentity,
    Authenticated(User),
}

impl SessionState {
    /// True while a login or restore owns the session
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            SessionState::Authenticating | SessionState::VerifyingIdentity
        )
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Clear a stored token when verifying it at startup fails at the
    /// transport level. A fresh token from `login` is always cleared.
    pub clear_on_connection_error: bool,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            clear_on_connection_error: true,
        }
    }
}

/// Where the token being verified came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenOrigin {
    /// Just issued by `login`
    Fresh,
    /// Found in the store by `restore`
    Stored,
}

/// Drives the authentication state machine.
///
/// The controller is the only writer of both the session state and the
/// credential store. One operation runs at a time: `login`, `restore` and
/// `logout` fail with `SessionError::Busy` while another login or restore is
/// in flight.
pub struct SessionController {
    auth: Arc<dyn AuthService>,
    account: Arc<dyn AccountService>,
    store: Arc<dyn CredentialStore>,
    app: OAuthApp,
    policy: SessionPolicy,
    state: watch::Sender<SessionState>,
}

impl SessionController {
    pub fn new(
        auth: Arc<dyn AuthService>,
        account: Arc<dyn AccountService>,
        store: Arc<dyn CredentialStore>,
        app: OAuthApp,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Unauthenticated);
        Self {
            auth,
            account,
            store,
            app,
            policy: SessionPolicy::default(),
            state,
        }
    }

    pub fn with_policy(mut self, policy: SessionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Watch state transitions, e.g. to switch between a form and a progress indicator
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.state.borrow(), SessionState::Authenticated(_))
    }

    /// Token to attach to further API calls, if signed in
    pub fn bearer(&self) -> SessionResult<Option<Token>> {
        if !self.is_authenticated() {
            return Ok(None);
        }
        Ok(self.store.get()?)
    }

    /// Sign in with a username and password.
    ///
    /// Exchanges the credentials once for a token scoped by
    /// `wants_private_access`, persists it, then verifies it by fetching the
    /// account. Any failure leaves the controller `Unauthenticated` with no
    /// token stored.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        wants_private_access: bool,
    ) -> SessionResult<User> {
        let credentials = Credentials::new(username, password)?;
        let mut guard = self.begin(SessionState::Authenticating)?;

        let scope = Scope::for_access(wants_private_access);
        let request = self.app.request(scope);
        info!(username = credentials.username(), %scope, "Signing in");

        let basic_auth = credentials.into_basic_auth();
        let exchanged = self.auth.exchange(&request, &basic_auth).await;
        drop(basic_auth);

        let token = match exchanged {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "Token exchange failed");
                return Err(self.fail(guard, SessionError::from_exchange(err), true));
            }
        };

        if let Err(err) = self.store.set(&token) {
            warn!(error = %err, "Failed to persist token");
            return Err(self.fail(guard, err.into(), true));
        }
        debug!("Token persisted");

        guard.hold_fresh_token();
        guard.advance(SessionState::VerifyingIdentity);
        self.verify(guard, &token, TokenOrigin::Fresh).await
    }

    /// Resume a session from a previously stored token.
    ///
    /// Returns `Ok(None)` when nothing is stored.
    pub async fn restore(&self) -> SessionResult<Option<User>> {
        let guard = self.begin(SessionState::VerifyingIdentity)?;

        let token = match self.store.get() {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("No stored token");
                guard.settle(SessionState::Unauthenticated);
                return Ok(None);
            }
            Err(err) => {
                warn!(error = %err, "Failed to read stored token");
                return Err(self.fail(guard, err.into(), false));
            }
        };

        info!("Restoring session from stored token");
        self.verify(guard, &token, TokenOrigin::Stored)
            .await
            .map(Some)
    }

    /// Forget the stored token. No network call is made.
    pub fn logout(&self) -> SessionResult<()> {
        let mut outcome = Ok(());
        self.state.send_if_modified(|state| {
            if state.is_in_flight() {
                outcome = Err(SessionError::Busy);
                return false;
            }
            outcome = self.store.clear().map_err(SessionError::from);
            *state = SessionState::Unauthenticated;
            true
        });
        if outcome.is_ok() {
            info!("Signed out");
        }
        outcome
    }

    /// Report the error of an authenticated API call made outside the
    /// controller. A 401/403 means the token no longer works: it is cleared
    /// and the session drops to `Unauthenticated`. Returns whether that happened;
    /// a token that could not be cleared is reported as `SessionError::Storage`.
    pub fn observe_rejection(&self, err: &ApiError) -> SessionResult<bool> {
        if !err.is_rejection() {
            return Ok(false);
        }

        let mut outcome = Ok(false);
        self.state.send_if_modified(|state| {
            // An in-flight operation settles the session itself
            if state.is_in_flight() {
                return false;
            }
            outcome = self.store.clear().map(|()| true).map_err(SessionError::from);
            *state = SessionState::Unauthenticated;
            true
        });

        match &outcome {
            Ok(true) => {
                warn!(status = ?err.status(), "Token rejected by API, session invalidated")
            }
            Err(e) => warn!(error = %e, "Failed to clear rejected token"),
            Ok(false) => {}
        }
        outcome
    }

    async fn verify(
        &self,
        guard: InFlight<'_>,
        token: &Token,
        origin: TokenOrigin,
    ) -> SessionResult<User> {
        let err = match self.account.fetch_current_user(token).await {
            Ok(user) => {
                info!(login = %user.login, "Session established");
                guard.settle(SessionState::Authenticated(user.clone()));
                return Ok(user);
            }
            Err(err) => err,
        };

        let (outcome, discard) = if err.is_rejection() {
            let status = err.status().unwrap_or_default();
            warn!(status, ?origin, "Token rejected during verification");
            (SessionError::SessionRevoked { status }, true)
        } else if err.is_transport() {
            warn!(error = %err, ?origin, "Could not reach API to verify token");
            let discard = origin == TokenOrigin::Fresh || self.policy.clear_on_connection_error;
            (SessionError::Connection(err.to_string()), discard)
        } else {
            warn!(error = %err, ?origin, "Unexpected response while verifying token");
            let status = err.status().unwrap_or_default();
            (
                SessionError::UnknownResponse { status },
                origin == TokenOrigin::Fresh,
            )
        };

        Err(self.fail(guard, outcome, discard))
    }

    /// Settle a failed operation in `Unauthenticated`, clearing the stored
    /// token first when `discard` is set. A failed clear is reported instead
    /// of `err`, since the stale token is still there.
    fn fail(&self, guard: InFlight<'_>, err: SessionError, discard: bool) -> SessionError {
        let cleared = if discard {
            self.store.clear()
        } else {
            Ok(())
        };
        guard.settle(SessionState::Unauthenticated);

        match cleared {
            Ok(()) => err,
            Err(store_err) => {
                warn!(error = %store_err, "Failed to clear token");
                store_err.into()
            }
        }
    }

    /// Atomically claim the session for an operation, or report `Busy`
    fn begin(&self, next: SessionState) -> SessionResult<InFlight<'_>> {
        let mut busy = false;
        self.state.send_if_modified(|state| {
            if state.is_in_flight() {
                busy = true;
                return false;
            }
            *state = next;
            true
        });

        if busy {
            debug!("Rejecting operation, another is in flight");
            return Err(SessionError::Busy);
        }
        Ok(InFlight {
            state: &self.state,
            store: self.store.as_ref(),
            fresh_token: false,
            settled: false,
        })
    }
}

/// Claim on the session held by a running operation.
///
/// If the operation's future is dropped before it settles, the session is
/// released back to `Unauthenticated` rather than staying busy forever, and
/// a token issued by that operation but not yet verified is cleared.
struct InFlight<'a> {
    state: &'a watch::Sender<SessionState>,
    store: &'a dyn CredentialStore,
    fresh_token: bool,
    settled: bool,
}

impl InFlight<'_> {
    /// The store now holds a token this operation issued
    fn hold_fresh_token(&mut self) {
        self.fresh_token = true;
    }

    fn advance(&self, next: SessionState) {
        self.state.send_replace(next);
    }

    fn settle(mut self, next: SessionState) {
        self.state.send_replace(next);
        self.settled = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("Session operation abandoned before completion");
            if self.fresh_token {
                if let Err(e) = self.store.clear() {
                    warn!(error = %e, "Failed to clear unverified token");
                }
            }
            self.state.send_replace(SessionState::Unauthenticated);
        }
    }
}
