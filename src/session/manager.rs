//! Session state machine and route gating
//!
//! Owns `{ user, booting }` for the process, resolves the closed role
//! set, and answers every view-access question. Constructed explicitly
//! at startup and injected where needed.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::client::dto::LoginResponse;
use crate::domain::{Role, User};
use crate::session::store::SessionStore;
use crate::shared::errors::{ApiResult, SessionError, SessionResult};

/// Backend operations the session machine depends on.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse>;
    /// The authoritative "who am I" profile fetch.
    async fn fetch_profile(&self) -> ApiResult<User>;
}

#[derive(Debug, Validate)]
struct LoginCredentials {
    #[validate(email(message = "email non valida"))]
    email: String,
    #[validate(length(min = 1, message = "password obbligatoria"))]
    password: String,
}

/// Navigable views, as the routing layer sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    OperatorDashboard,
    AssignedWorks,
    AdminDashboard,
    ApprovalQueue,
    ImportTool,
    ApprovedReport,
}

/// Outcome of a gate check for one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Render,
    /// Session still resolving; show a neutral loading state, never a
    /// redirect.
    Loading,
    RedirectTo(View),
}

/// Landing view for a role.
pub fn home_view(role: Role) -> View {
    match role {
        Role::Impresa => View::ApprovedReport,
        Role::Admin => View::AdminDashboard,
        Role::Operator => View::OperatorDashboard,
    }
}

pub struct SessionManager<A: AuthGateway> {
    store: Arc<dyn SessionStore>,
    auth: A,
    user: Option<User>,
    booting: bool,
}

impl<A: AuthGateway> SessionManager<A> {
    pub fn new(store: Arc<dyn SessionStore>, auth: A) -> Self {
        Self {
            store,
            auth,
            user: None,
            booting: true,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn booting(&self) -> bool {
        self.booting
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(User::role_kind)
    }

    /// One-shot boot: seed from cache, then re-validate against the
    /// backend. Ends with `booting == false` on every path; cache
    /// read/write problems degrade to a cold session instead of
    /// failing the boot.
    pub async fn boot(&mut self) {
        let cached = self.store.user().await.unwrap_or_default();
        self.user = cached;

        let token = self.store.token().await.unwrap_or_default();
        if token.is_none() {
            self.user = None;
            self.booting = false;
            debug!("boot: no cached token");
            return;
        }

        match self.auth.fetch_profile().await {
            Ok(profile) => {
                if let Err(e) = self.store.set_user(&profile).await {
                    warn!("boot: cannot cache profile: {e}");
                }
                debug!(user_id = profile.id, "boot: profile refreshed");
                self.user = Some(profile);
            }
            Err(e) if e.is_auth_error() => {
                warn!("boot: session invalid, clearing cache: {e}");
                let _ = self.store.clear_token().await;
                let _ = self.store.clear_user().await;
                self.user = None;
            }
            Err(e) => {
                // Ambiguous failure: keep the cached identity, do not
                // force a logout.
                warn!("boot: profile fetch failed, keeping cached session: {e}");
            }
        }
        self.booting = false;
    }

    /// Authenticate and resolve the authoritative profile.
    ///
    /// The token is persisted before the profile fetch; an embedded
    /// user in the login response is only an optimistic seed that the
    /// `auth/me` result always overwrites.
    pub async fn login(&mut self, email: &str, password: &str) -> SessionResult<User> {
        let credentials = LoginCredentials {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        credentials
            .validate()
            .map_err(|e| SessionError::Validation(e.to_string()))?;

        let response = self.auth.login(&credentials.email, password).await?;
        let token = response
            .extract_token()
            .ok_or(SessionError::MissingLoginToken)?;
        self.store.set_token(&token).await?;

        match response.embedded_user() {
            Some(seed) => {
                if let Err(e) = self.store.set_user(&seed).await {
                    warn!("login: cannot cache profile seed: {e}");
                }
                self.user = Some(seed);
            }
            None => {
                let _ = self.store.clear_user().await;
                self.user = None;
            }
        }

        let profile = self.auth.fetch_profile().await?;
        if let Err(e) = self.store.set_user(&profile).await {
            warn!("login: cannot cache profile: {e}");
        }
        info!(user_id = profile.id, role = %profile.role_kind(), "login ok");
        self.user = Some(profile.clone());
        Ok(profile)
    }

    /// Local-only session teardown; no backend call.
    pub async fn logout(&mut self) {
        let _ = self.store.clear_token().await;
        let _ = self.store.clear_user().await;
        self.user = None;
        info!("logout: session cleared");
    }

    /// Gate check for a view.
    ///
    /// Order matters: booting wins over everything, a missing user
    /// sends to login, and the impresa restriction is applied before
    /// any admin/operator rule.
    pub fn route(&self, view: View) -> RouteDecision {
        if self.booting {
            return RouteDecision::Loading;
        }
        let Some(user) = &self.user else {
            return match view {
                View::Login => RouteDecision::Render,
                _ => RouteDecision::RedirectTo(View::Login),
            };
        };
        let role = user.role_kind();
        match view {
            View::Login => RouteDecision::RedirectTo(home_view(role)),
            View::ApprovedReport => {
                if role == Role::Impresa {
                    RouteDecision::Render
                } else {
                    RouteDecision::RedirectTo(home_view(role))
                }
            }
            View::OperatorDashboard | View::AssignedWorks => {
                if role == Role::Impresa {
                    RouteDecision::RedirectTo(View::ApprovedReport)
                } else {
                    RouteDecision::Render
                }
            }
            View::AdminDashboard | View::ApprovalQueue | View::ImportTool => match role {
                Role::Impresa => RouteDecision::RedirectTo(View::ApprovedReport),
                Role::Admin => RouteDecision::Render,
                Role::Operator => RouteDecision::RedirectTo(View::OperatorDashboard),
            },
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::store::MemorySessionStore;
    use crate::shared::errors::ApiError;
    use serde_json::json;

    enum ProfileStub {
        Ok(User),
        AuthErr,
        NetErr,
    }

    struct StubAuth {
        /// Shared with the manager so `fetch_profile` can insist the
        /// token was persisted first.
        store: Arc<MemorySessionStore>,
        login_json: serde_json::Value,
        profile: ProfileStub,
    }

    #[async_trait]
    impl AuthGateway for StubAuth {
        async fn login(&self, _email: &str, _password: &str) -> ApiResult<LoginResponse> {
            serde_json::from_value(self.login_json.clone())
                .map_err(|e| ApiError::Decode(e.to_string()))
        }

        async fn fetch_profile(&self) -> ApiResult<User> {
            if self.store.token().await.unwrap().is_none() {
                return Err(ApiError::Status {
                    status: 401,
                    message: "unauthorized".into(),
                });
            }
            match &self.profile {
                ProfileStub::Ok(u) => Ok(u.clone()),
                ProfileStub::AuthErr => Err(ApiError::Status {
                    status: 401,
                    message: "Invalid token".into(),
                }),
                ProfileStub::NetErr => Err(ApiError::Transport("connection reset".into())),
            }
        }
    }

    fn user(role: &str) -> User {
        User {
            id: 7,
            email: Some("u@example.it".into()),
            role: Some(role.into()),
            ..Default::default()
        }
    }

    fn manager(
        store: Arc<MemorySessionStore>,
        login_json: serde_json::Value,
        profile: ProfileStub,
    ) -> SessionManager<StubAuth> {
        let auth = StubAuth {
            store: store.clone(),
            login_json,
            profile,
        };
        SessionManager::new(store, auth)
    }

    #[tokio::test]
    async fn boot_without_token_resolves_cold() {
        let store = Arc::new(MemorySessionStore::new());
        store.set_user(&user("admin")).await.unwrap();

        let mut s = manager(store, json!({}), ProfileStub::Ok(user("admin")));
        assert!(s.booting());
        s.boot().await;
        assert!(!s.booting());
        assert!(s.user().is_none());
    }

    #[tokio::test]
    async fn boot_with_token_refreshes_profile() {
        let store = Arc::new(MemorySessionStore::with_token("tok"));
        let mut s = manager(store.clone(), json!({}), ProfileStub::Ok(user("impresa")));
        s.boot().await;
        assert_eq!(s.role(), Some(Role::Impresa));
        assert_eq!(store.user().await.unwrap().unwrap().id, 7);
    }

    #[tokio::test]
    async fn boot_auth_failure_clears_session() {
        let store = Arc::new(MemorySessionStore::with_token("stale"));
        store.set_user(&user("admin")).await.unwrap();

        let mut s = manager(store.clone(), json!({}), ProfileStub::AuthErr);
        s.boot().await;
        assert!(s.user().is_none());
        assert!(store.token().await.unwrap().is_none());
        assert!(store.user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn boot_ambiguous_failure_keeps_cached_session() {
        let store = Arc::new(MemorySessionStore::with_token("tok"));
        store.set_user(&user("operatore")).await.unwrap();

        let mut s = manager(store.clone(), json!({}), ProfileStub::NetErr);
        s.boot().await;
        assert!(!s.booting());
        assert_eq!(s.user().map(|u| u.id), Some(7));
        assert!(store.token().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn login_persists_token_before_profile_fetch() {
        let store = Arc::new(MemorySessionStore::new());
        let mut s = manager(
            store.clone(),
            json!({"authToken": "fresh-token"}),
            ProfileStub::Ok(user("admin")),
        );
        s.boot().await;

        // fetch_profile in the stub errors if no token is cached, so a
        // successful login proves the persist-then-fetch ordering.
        let me = s.login("a@b.it", "pw").await.unwrap();
        assert_eq!(me.role_kind(), Role::Admin);
        assert_eq!(store.token().await.unwrap().as_deref(), Some("fresh-token"));
        assert_eq!(store.user().await.unwrap().unwrap().id, 7);
    }

    #[tokio::test]
    async fn login_accepts_nested_token_shape() {
        let store = Arc::new(MemorySessionStore::new());
        let mut s = manager(
            store.clone(),
            json!({"token": {"token": "abc"}}),
            ProfileStub::Ok(user("operatore")),
        );
        s.boot().await;
        s.login("a@b.it", "pw").await.unwrap();
        assert_eq!(store.token().await.unwrap().as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn login_without_usable_token_fails() {
        let store = Arc::new(MemorySessionStore::new());
        let mut s = manager(store.clone(), json!({"ok": true}), ProfileStub::Ok(user("x")));
        s.boot().await;
        let err = s.login("a@b.it", "pw").await.unwrap_err();
        assert!(matches!(err, SessionError::MissingLoginToken));
        assert!(store.token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn login_rejects_malformed_email_before_network() {
        let store = Arc::new(MemorySessionStore::new());
        let mut s = manager(store.clone(), json!({}), ProfileStub::Ok(user("x")));
        s.boot().await;
        let err = s.login("not-an-email", "pw").await.unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));
    }

    #[tokio::test]
    async fn login_profile_failure_propagates_but_keeps_token() {
        let store = Arc::new(MemorySessionStore::new());
        let mut s = manager(
            store.clone(),
            json!({"authToken": "t", "user": {"id": 3, "role": "admin"}}),
            ProfileStub::NetErr,
        );
        s.boot().await;
        // stub: token exists, so the NetErr branch is reached
        let err = s.login("a@b.it", "pw").await.unwrap_err();
        assert!(matches!(err, SessionError::Api(_)));
        assert_eq!(store.token().await.unwrap().as_deref(), Some("t"));
        // optimistic seed stayed in place
        assert_eq!(s.user().map(|u| u.id), Some(3));
    }

    #[tokio::test]
    async fn logout_clears_everything_locally() {
        let store = Arc::new(MemorySessionStore::with_token("tok"));
        let mut s = manager(store.clone(), json!({}), ProfileStub::Ok(user("admin")));
        s.boot().await;
        assert!(s.user().is_some());

        s.logout().await;
        assert!(s.user().is_none());
        assert!(store.token().await.unwrap().is_none());
        assert!(store.user().await.unwrap().is_none());
    }

    // ── Route gating ───────────────────────────────────────────

    fn gated(role: Option<&str>, booting: bool) -> SessionManager<StubAuth> {
        let store = Arc::new(MemorySessionStore::new());
        let mut s = manager(store, json!({}), ProfileStub::NetErr);
        s.booting = booting;
        s.user = role.map(user);
        s
    }

    #[test]
    fn gates_render_loading_while_booting() {
        let s = gated(Some("admin"), true);
        assert_eq!(s.route(View::AdminDashboard), RouteDecision::Loading);
        assert_eq!(s.route(View::Login), RouteDecision::Loading);
    }

    #[test]
    fn anonymous_users_land_on_login() {
        let s = gated(None, false);
        assert_eq!(
            s.route(View::OperatorDashboard),
            RouteDecision::RedirectTo(View::Login)
        );
        assert_eq!(
            s.route(View::AdminDashboard),
            RouteDecision::RedirectTo(View::Login)
        );
        assert_eq!(s.route(View::Login), RouteDecision::Render);
    }

    #[test]
    fn operator_reaches_worker_views_only() {
        let s = gated(Some("tecnico"), false);
        assert_eq!(s.route(View::OperatorDashboard), RouteDecision::Render);
        assert_eq!(s.route(View::AssignedWorks), RouteDecision::Render);
        assert_eq!(
            s.route(View::ApprovalQueue),
            RouteDecision::RedirectTo(View::OperatorDashboard)
        );
        assert_eq!(
            s.route(View::ApprovedReport),
            RouteDecision::RedirectTo(View::OperatorDashboard)
        );
    }

    #[test]
    fn admin_passes_operator_gates_too() {
        let s = gated(Some("Admin"), false);
        assert_eq!(s.route(View::AdminDashboard), RouteDecision::Render);
        assert_eq!(s.route(View::ImportTool), RouteDecision::Render);
        assert_eq!(s.route(View::OperatorDashboard), RouteDecision::Render);
        assert_eq!(
            s.route(View::ApprovedReport),
            RouteDecision::RedirectTo(View::AdminDashboard)
        );
    }

    #[test]
    fn impresa_restriction_is_absolute() {
        let s = gated(Some("impresa"), false);
        assert_eq!(s.route(View::ApprovedReport), RouteDecision::Render);
        for view in [
            View::OperatorDashboard,
            View::AssignedWorks,
            View::AdminDashboard,
            View::ApprovalQueue,
            View::ImportTool,
        ] {
            assert_eq!(
                s.route(view),
                RouteDecision::RedirectTo(View::ApprovedReport),
                "view {view:?} must bounce impresa to the report"
            );
        }
    }

    #[test]
    fn logged_in_login_view_goes_home() {
        assert_eq!(
            gated(Some("impresa"), false).route(View::Login),
            RouteDecision::RedirectTo(View::ApprovedReport)
        );
        assert_eq!(
            gated(Some("admin"), false).route(View::Login),
            RouteDecision::RedirectTo(View::AdminDashboard)
        );
        assert_eq!(
            gated(Some(""), false).route(View::Login),
            RouteDecision::RedirectTo(View::OperatorDashboard)
        );
    }
}
