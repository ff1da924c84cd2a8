use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::backend::Caller;
use crate::error::{Error, Result};
use crate::routes::navigation::Route;
use crate::AppState;

/// Claims of a hosted-auth access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: Option<String>,
    pub aud: String,
    pub exp: usize,
    pub role: Option<String>,
}

/// A signed-in user, with the token that is forwarded to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub access_token: String,
}

impl Identity {
    pub fn caller(&self) -> Caller {
        Caller::User {
            user_id: self.user_id,
            access_token: self.access_token.clone(),
        }
    }
}

/// Who is looking at the page. Inserted into every request by [`resolve_viewer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    SignedIn(Identity),
}

impl Viewer {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Viewer::Anonymous => None,
            Viewer::SignedIn(identity) => Some(identity),
        }
    }

    /// The signed-in identity, or `Unauthorized` so the client is sent to the login view.
    pub fn require(&self) -> Result<&Identity> {
        self.identity()
            .ok_or_else(|| Error::Unauthorized("Please sign in to continue".to_string()))
    }

    pub fn caller(&self) -> Caller {
        self.identity()
            .map(Identity::caller)
            .unwrap_or(Caller::Anonymous)
    }
}

#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str, audience: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_audience(&[audience]);
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> jsonwebtoken::errors::Result<Identity> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(Identity {
            user_id: data.claims.sub,
            email: data.claims.email,
            access_token: token.to_string(),
        })
    }
}

/// Mints an HS256 access token in the hosted-auth claim layout.
pub fn issue_access_token(
    secret: &str,
    audience: &str,
    user_id: Uuid,
    email: Option<&str>,
    ttl_secs: i64,
) -> jsonwebtoken::errors::Result<String> {
    let claims = Claims {
        sub: user_id,
        email: email.map(str::to_string),
        aud: audience.to_string(),
        exp: (Utc::now().timestamp() + ttl_secs).max(0) as usize,
        role: Some("authenticated".to_string()),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

fn reject(error: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": error, "redirect": Route::Login.path() })),
    )
        .into_response()
}

/// Resolves the optional bearer token into a [`Viewer`].
///
/// A missing header yields an anonymous viewer; a malformed or invalid token is refused.
pub async fn resolve_viewer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let viewer = match req.headers().get(axum::http::header::AUTHORIZATION) {
        None => Viewer::Anonymous,
        Some(auth_header) => {
            let Ok(auth_str) = auth_header.to_str() else {
                return reject("bad_authorization");
            };
            let Some(token) = auth_str.strip_prefix("Bearer ") else {
                return reject("unsupported_scheme");
            };
            match state.token_verifier.verify(token.trim()) {
                Ok(identity) => Viewer::SignedIn(identity),
                Err(e) => {
                    tracing::debug!("Rejected access token: {}", e);
                    return reject("invalid_token");
                }
            }
        }
    };

    req.extensions_mut().insert(viewer);
    next.run(req).await
}
