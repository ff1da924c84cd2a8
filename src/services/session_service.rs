use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::backend::{AuthSession, Backend, BackendErrorKind, SignUpMetadata, SignUpRequest};
use crate::dto::session_dto::{
    AuthResponse, RedirectResponse, SessionView, SignInPayload, SignUpPayload,
};
use crate::error::{Error, Result};
use crate::middleware::auth::{Identity, Viewer};
use crate::models::profile::{AccountProfile, NewProfile, ProfileChanges};
use crate::routes::navigation::{NavigationVariant, Route};

/// Lifecycle notifications for subscribers such as per-user caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn { user_id: Uuid },
    SignedOut { user_id: Uuid },
    ProfileRefreshed { user_id: Uuid },
}

/// Cached profiles older than this are reloaded from the backend.
pub const PROFILE_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct CachedProfile {
    profile: Option<AccountProfile>,
    loaded_at: Instant,
}

/// Shared session context: resolves a signed-in identity to its profile once and
/// keeps it until sign-out or an explicit refresh.
#[derive(Clone)]
pub struct SessionProvider {
    backend: Arc<dyn Backend>,
    profiles: Arc<RwLock<HashMap<Uuid, CachedProfile>>>,
    events: broadcast::Sender<SessionEvent>,
    site_url: Option<String>,
    ttl: Duration,
}

impl SessionProvider {
    pub fn new(backend: Arc<dyn Backend>, site_url: Option<String>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            backend,
            profiles: Arc::new(RwLock::new(HashMap::new())),
            events,
            site_url,
            ttl: PROFILE_CACHE_TTL,
        }
    }

    pub fn with_profile_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// The viewer's profile, loaded on first use. A missing row resolves to `None`.
    pub async fn profile(&self, identity: &Identity) -> Result<Option<AccountProfile>> {
        if let Some(cached) = self
            .profiles
            .read()
            .await
            .get(&identity.user_id)
            .filter(|c| c.loaded_at.elapsed() < self.ttl)
        {
            return Ok(cached.profile.clone());
        }
        self.load(identity).await
    }

    pub async fn refresh(&self, identity: &Identity) -> Result<Option<AccountProfile>> {
        let profile = self.load(identity).await?;
        self.emit(SessionEvent::ProfileRefreshed {
            user_id: identity.user_id,
        });
        Ok(profile)
    }

    async fn load(&self, identity: &Identity) -> Result<Option<AccountProfile>> {
        let row = self
            .backend
            .get_profile(&identity.caller(), identity.user_id)
            .await?;
        if row.is_none() {
            tracing::info!(user_id = %identity.user_id, "No profile row for signed-in user");
        }
        let profile = row.map(AccountProfile::from);
        self.store(identity.user_id, profile.clone()).await;
        Ok(profile)
    }

    /// Evicts expired entries, then caches `profile`.
    async fn store(&self, user_id: Uuid, profile: Option<AccountProfile>) {
        let ttl = self.ttl;
        let mut profiles = self.profiles.write().await;
        profiles.retain(|_, c| c.loaded_at.elapsed() < ttl);
        profiles.insert(
            user_id,
            CachedProfile {
                profile,
                loaded_at: Instant::now(),
            },
        );
    }

    /// Stores a freshly written profile without another round trip.
    pub async fn remember(&self, user_id: Uuid, profile: AccountProfile) {
        self.store(user_id, Some(profile)).await;
    }

    pub async fn view(&self, viewer: &Viewer) -> Result<SessionView> {
        match viewer.identity() {
            None => Ok(session_view(None, None)),
            Some(identity) => {
                let profile = self.profile(identity).await?;
                Ok(session_view(Some(identity), profile))
            }
        }
    }

    pub async fn sign_in(&self, payload: &SignInPayload) -> Result<AuthResponse> {
        let session = self
            .backend
            .sign_in(payload.email.trim(), &payload.password)
            .await
            .map_err(|e| match e.kind {
                BackendErrorKind::Unauthorized => Error::Unauthorized(e.message),
                _ => Error::Backend(e),
            })?;

        let identity = identity_of(&session);
        let profile = self.load(&identity).await?;
        tracing::info!(user_id = %identity.user_id, "User signed in");
        self.emit(SessionEvent::SignedIn {
            user_id: identity.user_id,
        });

        Ok(AuthResponse {
            access_token: Some(session.access_token),
            refresh_token: Some(session.refresh_token),
            expires_in: Some(session.expires_in),
            requires_confirmation: false,
            session: session_view(Some(&identity), profile),
            redirect: Route::Dashboard.path(),
        })
    }

    /// Registers the account and, when a session comes back immediately, its profile row.
    pub async fn sign_up(&self, payload: &SignUpPayload) -> Result<AuthResponse> {
        let request = SignUpRequest {
            email: payload.email.trim().to_string(),
            password: payload.password.clone(),
            data: SignUpMetadata {
                account_type: payload.account_type.as_str().to_string(),
                first_name: payload.first_name.clone(),
                last_name: payload.last_name.clone(),
            },
        };
        let outcome = self.backend.sign_up(&request).await.map_err(|e| {
            if e.is_unique_violation() {
                Error::Conflict("An account with this email already exists".to_string())
            } else {
                Error::Backend(e)
            }
        })?;

        let Some(session) = outcome.session else {
            tracing::info!(user_id = %outcome.user.id, "Sign-up awaiting email confirmation");
            return Ok(AuthResponse {
                access_token: None,
                refresh_token: None,
                expires_in: None,
                requires_confirmation: true,
                session: session_view(None, None),
                redirect: Route::Login.path(),
            });
        };

        let identity = identity_of(&session);
        let new_profile = NewProfile {
            user_id: identity.user_id,
            account_type: payload.account_type.as_str().to_string(),
            first_name: payload.first_name.clone(),
            last_name: payload.last_name.clone(),
        };
        let profile = match self
            .backend
            .insert_profile(&identity.caller(), &new_profile)
            .await
        {
            Ok(row) => {
                let profile = AccountProfile::from(row);
                self.remember(identity.user_id, profile.clone()).await;
                Some(profile)
            }
            // A database trigger may already have created the row.
            Err(e) if e.is_unique_violation() => self.load(&identity).await?,
            Err(e) => return Err(e.into()),
        };

        tracing::info!(user_id = %identity.user_id, account_type = %payload.account_type.as_str(), "User signed up");
        self.emit(SessionEvent::SignedIn {
            user_id: identity.user_id,
        });

        Ok(AuthResponse {
            access_token: Some(session.access_token),
            refresh_token: Some(session.refresh_token),
            expires_in: Some(session.expires_in),
            requires_confirmation: false,
            session: session_view(Some(&identity), profile),
            redirect: Route::Dashboard.path(),
        })
    }

    /// Ends the session locally even when the backend call fails.
    pub async fn sign_out(&self, identity: &Identity) -> Result<RedirectResponse> {
        if let Err(e) = self.backend.sign_out(&identity.caller()).await {
            tracing::warn!(user_id = %identity.user_id, error = %e, "Backend sign-out failed");
        }
        self.profiles.write().await.remove(&identity.user_id);
        self.emit(SessionEvent::SignedOut {
            user_id: identity.user_id,
        });
        Ok(RedirectResponse {
            message: "Signed out".to_string(),
            redirect: Route::Home.path(),
        })
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<RedirectResponse> {
        let redirect_to = self
            .site_url
            .as_deref()
            .map(|site| format!("{}{}", site.trim_end_matches('/'), Route::ResetPassword.path()));
        self.backend
            .request_password_reset(email.trim(), redirect_to)
            .await?;
        Ok(RedirectResponse {
            message: "Check your email for a password reset link".to_string(),
            redirect: Route::Login.path(),
        })
    }

    pub async fn reset_password(
        &self,
        identity: &Identity,
        password: &str,
    ) -> Result<RedirectResponse> {
        self.backend
            .update_password(&identity.caller(), password)
            .await?;
        tracing::info!(user_id = %identity.user_id, "Password updated");
        Ok(RedirectResponse {
            message: "Password updated".to_string(),
            redirect: Route::Dashboard.path(),
        })
    }

    pub async fn update_profile(
        &self,
        identity: &Identity,
        changes: &ProfileChanges,
    ) -> Result<AccountProfile> {
        let row = self
            .backend
            .update_profile(&identity.caller(), identity.user_id, changes)
            .await?;
        let profile = AccountProfile::from(row);
        self.remember(identity.user_id, profile.clone()).await;
        Ok(profile)
    }
}

fn identity_of(session: &AuthSession) -> Identity {
    Identity {
        user_id: session.user.id,
        email: session.user.email.clone(),
        access_token: session.access_token.clone(),
    }
}

fn session_view(identity: Option<&Identity>, profile: Option<AccountProfile>) -> SessionView {
    let navigation = NavigationVariant::for_profile(identity.is_some(), profile.as_ref());
    SessionView {
        signed_in: identity.is_some(),
        user_id: identity.map(|i| i.user_id),
        email: identity.and_then(|i| i.email.clone()),
        display_name: profile.as_ref().and_then(AccountProfile::display_name),
        profile,
        navigation,
        links: navigation.links(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{AuthUser, BackendError, MockBackend, SignUpOutcome};
    use crate::models::profile::sample_row;
    use mockall::predicate::*;

    fn identity(user_id: Uuid) -> Identity {
        Identity {
            user_id,
            email: Some("user@example.com".into()),
            access_token: "token".into(),
        }
    }

    #[tokio::test]
    async fn profile_is_loaded_once_and_cached() {
        let user_id = Uuid::new_v4();
        let mut backend = MockBackend::new();
        backend
            .expect_get_profile()
            .with(always(), eq(user_id))
            .times(1)
            .returning(move |_, id| Ok(Some(sample_row(id, Some("employer")))));

        let provider = SessionProvider::new(Arc::new(backend), None);
        let first = provider.profile(&identity(user_id)).await.unwrap();
        let second = provider.profile(&identity(user_id)).await.unwrap();
        assert!(matches!(first, Some(AccountProfile::Employer(_))));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn expired_profile_is_reloaded_and_evicted() {
        let user_id = Uuid::new_v4();
        let mut backend = MockBackend::new();
        backend
            .expect_get_profile()
            .times(3)
            .returning(|_, id| Ok(Some(sample_row(id, Some("job_seeker")))));

        let provider =
            SessionProvider::new(Arc::new(backend), None).with_profile_ttl(Duration::ZERO);
        provider.profile(&identity(user_id)).await.unwrap();
        provider.profile(&identity(user_id)).await.unwrap();
        provider.profile(&identity(Uuid::new_v4())).await.unwrap();
        assert_eq!(provider.profiles.read().await.len(), 1);
    }

    #[tokio::test]
    async fn missing_profile_resolves_to_none() {
        let mut backend = MockBackend::new();
        backend.expect_get_profile().returning(|_, _| Ok(None));

        let provider = SessionProvider::new(Arc::new(backend), None);
        let view = provider
            .view(&Viewer::SignedIn(identity(Uuid::new_v4())))
            .await
            .unwrap();
        assert!(view.signed_in);
        assert!(view.profile.is_none());
        assert_eq!(view.navigation, NavigationVariant::JobSeeker);
    }

    #[tokio::test]
    async fn sign_out_evicts_and_notifies() {
        let user_id = Uuid::new_v4();
        let mut backend = MockBackend::new();
        backend
            .expect_get_profile()
            .times(2)
            .returning(move |_, id| Ok(Some(sample_row(id, None))));
        backend
            .expect_sign_out()
            .times(1)
            .returning(|_| Err(BackendError::new(BackendErrorKind::Transport, "offline")));

        let provider = SessionProvider::new(Arc::new(backend), None);
        let mut events = provider.subscribe();
        provider.profile(&identity(user_id)).await.unwrap();

        let response = provider.sign_out(&identity(user_id)).await.unwrap();
        assert_eq!(response.redirect, "/");
        assert_eq!(events.recv().await.unwrap(), SessionEvent::SignedOut { user_id });

        // Evicted, so the next lookup goes back to the backend.
        provider.profile(&identity(user_id)).await.unwrap();
    }

    #[tokio::test]
    async fn sign_up_with_session_creates_profile() {
        let user_id = Uuid::new_v4();
        let mut backend = MockBackend::new();
        backend.expect_sign_up().returning(move |req| {
            assert_eq!(req.data.account_type, "employer");
            let user = AuthUser {
                id: user_id,
                email: Some(req.email.clone()),
            };
            Ok(SignUpOutcome {
                user: user.clone(),
                session: Some(AuthSession {
                    access_token: "access".into(),
                    refresh_token: "refresh".into(),
                    expires_in: 3600,
                    user,
                }),
            })
        });
        backend
            .expect_insert_profile()
            .times(1)
            .returning(|_, p| Ok(sample_row(p.user_id, Some(p.account_type.as_str()))));

        let provider = SessionProvider::new(Arc::new(backend), None);
        let response = provider
            .sign_up(&SignUpPayload {
                email: "boss@example.com".into(),
                password: "secret123".into(),
                account_type: crate::models::profile::AccountType::Employer,
                first_name: Some("Grace".into()),
                last_name: None,
            })
            .await
            .unwrap();

        assert!(!response.requires_confirmation);
        assert_eq!(response.session.navigation, NavigationVariant::Employer);
        assert_eq!(response.redirect, "/dashboard");
    }

    #[tokio::test]
    async fn password_reset_redirects_to_reset_view() {
        let mut backend = MockBackend::new();
        backend
            .expect_request_password_reset()
            .with(
                function(|email: &str| email == "a@b.co"),
                eq(Some("https://jobs.example.com/reset-password".to_string())),
            )
            .times(1)
            .returning(|_, _| Ok(()));

        let provider =
            SessionProvider::new(Arc::new(backend), Some("https://jobs.example.com/".into()));
        provider.request_password_reset(" a@b.co ").await.unwrap();
    }
}
