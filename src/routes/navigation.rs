use axum::{extract::Query, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::models::profile::AccountProfile;

/// Navigable views of the web client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "view", content = "id", rename_all = "snake_case")]
pub enum Route {
    Home,
    Login,
    Signup,
    ForgotPassword,
    ResetPassword,
    Jobs,
    JobDetails(Uuid),
    JobApply(Uuid),
    About,
    Companies,
    CompanyDetails(Uuid),
    Dashboard,
    PostJob,
    NotFound,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Signup => "/signup".to_string(),
            Route::ForgotPassword => "/forgot-password".to_string(),
            Route::ResetPassword => "/reset-password".to_string(),
            Route::Jobs => "/jobs".to_string(),
            Route::JobDetails(id) => format!("/jobs/{}", id),
            Route::JobApply(id) => format!("/jobs/{}/apply", id),
            Route::About => "/about".to_string(),
            Route::Companies => "/companies".to_string(),
            Route::CompanyDetails(id) => format!("/companies/{}", id),
            Route::Dashboard => "/dashboard".to_string(),
            Route::PostJob => "/post-job".to_string(),
            Route::NotFound => "/404".to_string(),
        }
    }

    /// Classifies a client path; anything unrecognised is `NotFound`.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            ["signup"] => Route::Signup,
            ["forgot-password"] => Route::ForgotPassword,
            ["reset-password"] => Route::ResetPassword,
            ["jobs"] => Route::Jobs,
            ["jobs", id] => id.parse().map(Route::JobDetails).unwrap_or(Route::NotFound),
            ["jobs", id, "apply"] => id.parse().map(Route::JobApply).unwrap_or(Route::NotFound),
            ["about"] => Route::About,
            ["companies"] => Route::Companies,
            ["companies", id] => id
                .parse()
                .map(Route::CompanyDetails)
                .unwrap_or(Route::NotFound),
            ["dashboard"] => Route::Dashboard,
            ["post-job"] => Route::PostJob,
            _ => Route::NotFound,
        }
    }

    pub fn requires_sign_in(&self) -> bool {
        matches!(
            self,
            Route::JobApply(_) | Route::Dashboard | Route::PostJob | Route::ResetPassword
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NavLink {
    pub label: &'static str,
    pub href: String,
}

fn link(label: &'static str, route: Route) -> NavLink {
    NavLink {
        label,
        href: route.path(),
    }
}

/// Header navigation for the viewer's account type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationVariant {
    Anonymous,
    JobSeeker,
    Employer,
}

impl NavigationVariant {
    pub fn for_profile(signed_in: bool, profile: Option<&AccountProfile>) -> Self {
        match (signed_in, profile) {
            (false, _) => NavigationVariant::Anonymous,
            (true, Some(AccountProfile::Employer(_))) => NavigationVariant::Employer,
            (true, _) => NavigationVariant::JobSeeker,
        }
    }

    pub fn links(&self) -> Vec<NavLink> {
        let mut links = vec![
            link("Find Jobs", Route::Jobs),
            link("Companies", Route::Companies),
            link("About", Route::About),
        ];
        match self {
            NavigationVariant::Anonymous => {
                links.push(link("Sign In", Route::Login));
                links.push(link("Get Started", Route::Signup));
            }
            NavigationVariant::JobSeeker => {
                links.push(link("Dashboard", Route::Dashboard));
            }
            NavigationVariant::Employer => {
                links.push(link("Post a Job", Route::PostJob));
                links.push(link("Dashboard", Route::Dashboard));
            }
        }
        links
    }
}

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct ResolvedRoute {
    pub route: Route,
    pub path: String,
    pub requires_sign_in: bool,
}

#[utoipa::path(
    get,
    path = "/api/routes/resolve",
    params(("path" = String, Query, description = "Client path to classify")),
    responses((status = 200, description = "Route classification"))
)]
#[axum::debug_handler]
pub async fn resolve_route(Query(query): Query<ResolveQuery>) -> Result<impl IntoResponse> {
    let route = Route::parse(&query.path);
    Ok(Json(ResolvedRoute {
        path: route.path(),
        requires_sign_in: route.requires_sign_in(),
        route,
    }))
}
