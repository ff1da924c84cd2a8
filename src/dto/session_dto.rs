use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::profile::{AccountProfile, AccountType};
use crate::routes::navigation::{NavLink, NavigationVariant};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignInPayload {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignUpPayload {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    pub account_type: AccountType,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForgotPasswordPayload {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetPasswordPayload {
    #[validate(length(min = 6))]
    pub password: String,
}

/// What the header and route guards need to know about the viewer.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub signed_in: bool,
    pub user_id: Option<Uuid>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub profile: Option<AccountProfile>,
    pub navigation: NavigationVariant,
    pub links: Vec<NavLink>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    /// Set when the project requires the email address to be confirmed first.
    pub requires_confirmation: bool,
    pub session: SessionView,
    pub redirect: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectResponse {
    pub message: String,
    pub redirect: String,
}
