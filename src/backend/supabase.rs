use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;
use uuid::Uuid;

use super::query::{total_from_content_range, TableQuery};
use super::{
    ApplicationFilter, AuthSession, AuthUser, Backend, BackendError, BackendErrorKind,
    BackendResult, Caller, JobFilter, PageRange, SignUpOutcome, SignUpRequest,
};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{
    application::{
        Application, ApplicationRow, ApplicationStatus, ApplicationTable, JobApplicationRow,
        NewApplication,
    },
    company::Company,
    job::{Job, JobStatus, NewJob},
    profile::{NewProfile, ProfileChanges, ProfileRow},
    saved_job::{NewSavedJob, SavedJob},
};

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const RETURN_REPRESENTATION: &str = "return=representation";

/// Client for a hosted Supabase project: PostgREST under `/rest/v1` and
/// GoTrue under `/auth/v1`.
#[derive(Clone)]
pub struct SupabaseBackend {
    client: Client,
    rest_url: Url,
    auth_url: Url,
    anon_key: String,
}

impl SupabaseBackend {
    pub fn new(base_url: &str, anon_key: String, client: Client) -> Result<Self> {
        let base = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base = Url::parse(&base)
            .map_err(|e| Error::Config(format!("Invalid BAAS_URL '{}': {}", base_url, e)))?;
        let rest_url = base
            .join("rest/v1/")
            .map_err(|e| Error::Config(format!("Invalid BAAS_URL: {}", e)))?;
        let auth_url = base
            .join("auth/v1/")
            .map_err(|e| Error::Config(format!("Invalid BAAS_URL: {}", e)))?;

        Ok(Self {
            client,
            rest_url,
            auth_url,
            anon_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.baas_timeout_secs))
            .build()?;
        Self::new(&config.baas_url, config.baas_anon_key.clone(), client)
    }

    fn authorize(&self, builder: RequestBuilder, caller: &Caller) -> RequestBuilder {
        let bearer = caller.access_token().unwrap_or(&self.anon_key);
        builder.header("apikey", &self.anon_key).bearer_auth(bearer)
    }

    fn table_request(
        &self,
        method: Method,
        caller: &Caller,
        query: &TableQuery,
    ) -> BackendResult<RequestBuilder> {
        let url = self.rest_url.join(query.table_name()).map_err(|e| {
            BackendError::new(BackendErrorKind::Transport, format!("invalid table url: {}", e))
        })?;
        let builder = self.client.request(method, url).query(&query.to_pairs());
        Ok(self.authorize(builder, caller))
    }

    fn auth_request(&self, method: Method, path: &str) -> BackendResult<RequestBuilder> {
        let url = self.auth_url.join(path).map_err(|e| {
            BackendError::new(BackendErrorKind::Transport, format!("invalid auth url: {}", e))
        })?;
        Ok(self
            .client
            .request(method, url)
            .header("apikey", &self.anon_key))
    }

    async fn select<T: DeserializeOwned>(
        &self,
        caller: &Caller,
        query: &TableQuery,
    ) -> BackendResult<Vec<T>> {
        let response = send(self.table_request(Method::GET, caller, query)?).await?;
        decode(response).await
    }

    /// A single row, or `None` when PostgREST reports zero matches.
    async fn select_single<T: DeserializeOwned>(
        &self,
        caller: &Caller,
        query: &TableQuery,
    ) -> BackendResult<Option<T>> {
        let request = self
            .table_request(Method::GET, caller, query)?
            .header(header::ACCEPT, SINGLE_OBJECT);
        match send(request).await {
            Ok(response) => decode(response).await.map(Some),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn insert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        caller: &Caller,
        table: &'static str,
        body: &B,
    ) -> BackendResult<T> {
        let request = self
            .table_request(Method::POST, caller, &TableQuery::table(table))?
            .header("Prefer", RETURN_REPRESENTATION)
            .header(header::ACCEPT, SINGLE_OBJECT)
            .json(body);
        decode(send(request).await?).await
    }

    /// Patches exactly one row; zero matches surface as `NotFound`.
    async fn update_one<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        caller: &Caller,
        query: &TableQuery,
        body: &B,
    ) -> BackendResult<T> {
        let request = self
            .table_request(Method::PATCH, caller, query)?
            .header("Prefer", RETURN_REPRESENTATION)
            .header(header::ACCEPT, SINGLE_OBJECT)
            .json(body);
        decode(send(request).await?).await
    }

    async fn delete<T: DeserializeOwned>(
        &self,
        caller: &Caller,
        query: &TableQuery,
    ) -> BackendResult<Vec<T>> {
        let request = self
            .table_request(Method::DELETE, caller, query)?
            .header("Prefer", RETURN_REPRESENTATION);
        decode(send(request).await?).await
    }

    async fn count(&self, caller: &Caller, query: &TableQuery) -> BackendResult<i64> {
        let request = self
            .table_request(Method::HEAD, caller, query)?
            .header("Prefer", "count=exact");
        let response = send(request).await?;
        response
            .headers()
            .get(header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(total_from_content_range)
            .ok_or_else(|| {
                BackendError::new(BackendErrorKind::Decode, "missing Content-Range total")
            })
    }
}

async fn send(builder: RequestBuilder) -> BackendResult<Response> {
    let response = builder
        .send()
        .await
        .map_err(|e| BackendError::new(BackendErrorKind::Transport, e.to_string()))?;
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let error = classify_failure(status, &body);
    tracing::warn!(
        status = %status,
        code = ?error.code,
        "Backend request failed: {}",
        error.message
    );
    Err(error)
}

async fn decode<T: DeserializeOwned>(response: Response) -> BackendResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| BackendError::new(BackendErrorKind::Decode, e.to_string()))
}

/// Maps a failed PostgREST or GoTrue response onto a [`BackendError`].
///
/// PostgREST answers `{code, message, details, hint}`; GoTrue answers either
/// `{error, error_description}` or `{code, error_code, msg}`. The code can be a
/// string or a number.
pub(crate) fn classify_failure(status: StatusCode, body: &str) -> BackendError {
    let parsed: Value = serde_json::from_str(body).unwrap_or(Value::Null);

    let code = ["error_code", "code", "error"]
        .iter()
        .filter_map(|key| parsed.get(*key))
        .find_map(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
    let message = ["message", "msg", "error_description"]
        .iter()
        .filter_map(|key| parsed.get(*key).and_then(Value::as_str))
        .next()
        .map(str::to_string)
        .unwrap_or_else(|| match status.canonical_reason() {
            Some(reason) => format!("{} {}", status.as_u16(), reason),
            None => status.as_u16().to_string(),
        });
    let details = parsed
        .get("details")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let kind = match code.as_deref() {
        Some("23505") | Some("user_already_exists") | Some("email_exists") => {
            BackendErrorKind::UniqueViolation
        }
        Some("PGRST116") if details.contains("0 rows") => BackendErrorKind::NotFound,
        Some("42501")
        | Some("invalid_grant")
        | Some("invalid_credentials")
        | Some("bad_jwt")
        | Some("session_not_found") => BackendErrorKind::Unauthorized,
        _ if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN => {
            BackendErrorKind::Unauthorized
        }
        _ if status == StatusCode::CONFLICT => BackendErrorKind::UniqueViolation,
        _ => BackendErrorKind::Rejected,
    };

    let error = BackendError::new(kind, message);
    match code {
        Some(code) => error.with_code(code),
        None => error,
    }
}

fn decode_application(table: ApplicationTable, row: Value) -> BackendResult<Application> {
    let decoded = match table {
        ApplicationTable::Applications => {
            serde_json::from_value::<ApplicationRow>(row).map(Application::from)
        }
        ApplicationTable::JobApplications => {
            serde_json::from_value::<JobApplicationRow>(row).map(Application::from)
        }
    };
    decoded.map_err(|e| BackendError::new(BackendErrorKind::Decode, e.to_string()))
}

fn job_query(filter: &JobFilter) -> TableQuery {
    let mut query = TableQuery::table("jobs")
        .eq_opt("company", filter.company.as_deref())
        .eq_opt("posted_by", filter.posted_by)
        .eq_opt("status", filter.status.map(|s| s.as_str()))
        .eq_opt("type", filter.job_type.as_deref())
        .eq_opt("is_remote", filter.is_remote);
    if let Some(ids) = &filter.ids {
        query = query.in_list("id", ids);
    }
    query
}

fn application_query(table: ApplicationTable, filter: &ApplicationFilter) -> TableQuery {
    let mut query = TableQuery::table(table.table_name()).eq_opt(table.user_column(), filter.user_id);
    if let Some(job_ids) = &filter.job_ids {
        query = query.in_list("job_id", job_ids);
    }
    query.order_desc("applied_at")
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(AuthSession),
    User(AuthUser),
}

#[async_trait]
impl Backend for SupabaseBackend {
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthSession> {
        let request = self
            .auth_request(Method::POST, "token")?
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        decode(send(request).await?).await
    }

    async fn sign_up(&self, request: &SignUpRequest) -> BackendResult<SignUpOutcome> {
        let builder = self.auth_request(Method::POST, "signup")?.json(request);
        let outcome = match decode::<SignUpResponse>(send(builder).await?).await? {
            SignUpResponse::Session(session) => SignUpOutcome {
                user: session.user.clone(),
                session: Some(session),
            },
            SignUpResponse::User(user) => SignUpOutcome {
                user,
                session: None,
            },
        };
        Ok(outcome)
    }

    async fn sign_out(&self, caller: &Caller) -> BackendResult<()> {
        let Some(token) = caller.access_token() else {
            return Ok(());
        };
        let request = self
            .auth_request(Method::POST, "logout")?
            .bearer_auth(token);
        send(request).await?;
        Ok(())
    }

    async fn request_password_reset(
        &self,
        email: &str,
        redirect_to: Option<String>,
    ) -> BackendResult<()> {
        let mut request = self
            .auth_request(Method::POST, "recover")?
            .json(&json!({ "email": email }));
        if let Some(redirect_to) = redirect_to {
            request = request.query(&[("redirect_to", redirect_to)]);
        }
        send(request).await?;
        Ok(())
    }

    async fn update_password(&self, caller: &Caller, new_password: &str) -> BackendResult<()> {
        let token = caller.access_token().ok_or_else(|| {
            BackendError::new(BackendErrorKind::Unauthorized, "a session is required")
        })?;
        let request = self
            .auth_request(Method::PUT, "user")?
            .bearer_auth(token)
            .json(&json!({ "password": new_password }));
        send(request).await?;
        Ok(())
    }

    async fn list_jobs(
        &self,
        caller: &Caller,
        filter: &JobFilter,
        range: Option<PageRange>,
    ) -> BackendResult<Vec<Job>> {
        let query = job_query(filter).order_desc("created_at").range(range);
        self.select(caller, &query).await
    }

    async fn count_jobs(&self, caller: &Caller, filter: &JobFilter) -> BackendResult<i64> {
        self.count(caller, &job_query(filter).select("id")).await
    }

    async fn get_job(&self, caller: &Caller, id: Uuid) -> BackendResult<Option<Job>> {
        let query = TableQuery::table("jobs").eq("id", id);
        self.select_single(caller, &query).await
    }

    async fn insert_job(&self, caller: &Caller, job: &NewJob) -> BackendResult<Job> {
        self.insert(caller, "jobs", job).await
    }

    async fn update_job_status(
        &self,
        caller: &Caller,
        id: Uuid,
        status: JobStatus,
    ) -> BackendResult<Job> {
        let query = TableQuery::table("jobs").eq("id", id);
        self.update_one(caller, &query, &json!({ "status": status }))
            .await
    }

    async fn list_companies(&self, caller: &Caller) -> BackendResult<Vec<Company>> {
        let query = TableQuery::table("companies").order_asc("name");
        self.select(caller, &query).await
    }

    async fn get_company(&self, caller: &Caller, id: Uuid) -> BackendResult<Option<Company>> {
        let query = TableQuery::table("companies").eq("id", id);
        self.select_single(caller, &query).await
    }

    async fn find_company_by_name(
        &self,
        caller: &Caller,
        name: &str,
    ) -> BackendResult<Option<Company>> {
        // `limit=1` keeps duplicate names from turning into a PGRST116 multi-row error.
        let query = TableQuery::table("companies")
            .eq("name", name)
            .range(Some(PageRange { offset: 0, limit: 1 }));
        let mut rows: Vec<Company> = self.select(caller, &query).await?;
        Ok(if rows.is_empty() { None } else { Some(rows.remove(0)) })
    }

    async fn get_profile(
        &self,
        caller: &Caller,
        user_id: Uuid,
    ) -> BackendResult<Option<ProfileRow>> {
        let query = TableQuery::table("profiles").eq("user_id", user_id);
        self.select_single(caller, &query).await
    }

    async fn insert_profile(
        &self,
        caller: &Caller,
        profile: &NewProfile,
    ) -> BackendResult<ProfileRow> {
        self.insert(caller, "profiles", profile).await
    }

    async fn update_profile(
        &self,
        caller: &Caller,
        user_id: Uuid,
        changes: &ProfileChanges,
    ) -> BackendResult<ProfileRow> {
        let query = TableQuery::table("profiles").eq("user_id", user_id);
        self.update_one(caller, &query, changes).await
    }

    async fn list_applications(
        &self,
        caller: &Caller,
        table: ApplicationTable,
        filter: &ApplicationFilter,
    ) -> BackendResult<Vec<Application>> {
        let rows: Vec<Value> = self
            .select(caller, &application_query(table, filter))
            .await?;
        rows.into_iter()
            .map(|row| decode_application(table, row))
            .collect()
    }

    async fn insert_application(
        &self,
        caller: &Caller,
        application: &NewApplication,
    ) -> BackendResult<Application> {
        let row: Value = self
            .insert(caller, application.table.table_name(), &application.to_row())
            .await?;
        decode_application(application.table, row)
    }

    async fn update_application_status(
        &self,
        caller: &Caller,
        table: ApplicationTable,
        id: Uuid,
        status: ApplicationStatus,
    ) -> BackendResult<Application> {
        let query = TableQuery::table(table.table_name()).eq("id", id);
        let row: Value = self
            .update_one(caller, &query, &json!({ "status": status }))
            .await?;
        decode_application(table, row)
    }

    async fn delete_application(
        &self,
        caller: &Caller,
        table: ApplicationTable,
        id: Uuid,
    ) -> BackendResult<Application> {
        let query = TableQuery::table(table.table_name()).eq("id", id);
        let mut rows: Vec<Value> = self.delete(caller, &query).await?;
        if rows.is_empty() {
            return Err(BackendError::new(
                BackendErrorKind::NotFound,
                format!("no {} row with id {}", table.table_name(), id),
            ));
        }
        decode_application(table, rows.remove(0))
    }

    async fn is_job_saved(
        &self,
        caller: &Caller,
        user_id: Uuid,
        job_id: Uuid,
    ) -> BackendResult<bool> {
        let query = TableQuery::table("saved_jobs")
            .select("id")
            .eq("user_id", user_id)
            .eq("job_id", job_id);
        let row: Option<Value> = self.select_single(caller, &query).await?;
        Ok(row.is_some())
    }

    async fn list_saved_jobs(&self, caller: &Caller, user_id: Uuid) -> BackendResult<Vec<SavedJob>> {
        let query = TableQuery::table("saved_jobs")
            .eq("user_id", user_id)
            .order_desc("saved_at");
        self.select(caller, &query).await
    }

    async fn insert_saved_job(
        &self,
        caller: &Caller,
        saved: &NewSavedJob,
    ) -> BackendResult<SavedJob> {
        self.insert(caller, "saved_jobs", saved).await
    }

    async fn delete_saved_job(
        &self,
        caller: &Caller,
        user_id: Uuid,
        job_id: Uuid,
    ) -> BackendResult<()> {
        let query = TableQuery::table("saved_jobs")
            .eq("user_id", user_id)
            .eq("job_id", job_id);
        let _: Vec<Value> = self.delete(caller, &query).await?;
        Ok(())
    }
}
