//! API client for the MRF DigiTrack REST service.
//!
//! This module provides the `ApiClient` struct for authenticating and for
//! reading/writing intake, sorting, sales, user, and report data.
//!
//! Authentication state lives in the shared `SessionStore`: the client
//! reads the bearer token from it on every request instead of capturing
//! it, so a logout or re-login inside one process is reflected on the
//! very next call.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::auth::{SessionData, SessionStore};
use crate::models::{
    DailyReport, MonthlyReport, NewSortedWaste, NewWasteIntake, NewWasteSale, PanchayatReport,
    SalesSummary, SortedWaste, User, UserCreate, WasteCategory, WasteIntake, WasteSale,
};

use super::ApiError;

/// All endpoints hang off this prefix.
const API_PREFIX: &str = "/api/v1";

/// HTTP request timeout in seconds.
/// 30s allows for slow responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// An inclusive date-time window used by the list and report endpoints.
pub type DateRange = (DateTime<Utc>, DateTime<Utc>);

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
    user: User,
}

/// API client for the DigiTrack service.
/// Clone is cheap - reqwest::Client and the session store are shared.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    /// Create a new API client against the given base URL.
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Exchange credentials for a session.
    ///
    /// Exactly one request per call, no retry. On success the token/user
    /// pair is handed to the session store before the session is returned;
    /// on any failure the store is left untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionData, ApiError> {
        let url = self.url("/auth/login");

        // The API takes an OAuth2 password form; the username field
        // carries the email.
        let response = self
            .http
            .post(&url)
            .form(&[("username", email), ("password", password)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_login_status(status, &body));
        }

        let auth: LoginResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Malformed login response: {e}")))?;

        self.session
            .set_session(auth.access_token.clone(), auth.user.clone())
            .map_err(ApiError::Storage)?;

        debug!(user = %auth.user.email, "Login succeeded");
        Ok(SessionData {
            token: auth.access_token,
            user: auth.user,
        })
    }

    /// Create a new account. Does not log in; the caller goes through
    /// `login` afterwards.
    pub async fn register(&self, new_user: &UserCreate) -> Result<User, ApiError> {
        self.post("/auth/register", new_user).await
    }

    // =========================================================================
    // Waste intake and sorting
    // =========================================================================

    pub async fn fetch_intakes(
        &self,
        mrf_id: &str,
        range: Option<DateRange>,
    ) -> Result<Vec<WasteIntake>, ApiError> {
        let mut query = vec![("mrf_id".to_string(), mrf_id.to_string())];
        push_range(&mut query, range);
        self.get("/waste/intake", &query).await
    }

    pub async fn create_intake(&self, intake: &NewWasteIntake) -> Result<WasteIntake, ApiError> {
        self.post("/waste/intake", intake).await
    }

    /// Sorted-waste records belonging to one intake.
    pub async fn fetch_sorted(&self, intake_id: &str) -> Result<Vec<SortedWaste>, ApiError> {
        let query = vec![("intake_id".to_string(), intake_id.to_string())];
        self.get("/waste/sort", &query).await
    }

    pub async fn create_sorted(&self, sorted: &NewSortedWaste) -> Result<SortedWaste, ApiError> {
        self.post("/waste/sort", sorted).await
    }

    pub async fn fetch_categories(&self) -> Result<Vec<WasteCategory>, ApiError> {
        self.get("/waste/categories", &[]).await
    }

    /// Manager-only on the server; anyone else gets `AccessDenied` back.
    pub async fn create_category(&self, category: &WasteCategory) -> Result<WasteCategory, ApiError> {
        self.post("/waste/categories", category).await
    }

    // =========================================================================
    // Sales
    // =========================================================================

    pub async fn fetch_sales(
        &self,
        mrf_id: &str,
        range: Option<DateRange>,
        category: Option<&str>,
    ) -> Result<Vec<WasteSale>, ApiError> {
        let mut query = vec![("mrf_id".to_string(), mrf_id.to_string())];
        push_range(&mut query, range);
        if let Some(category) = category {
            query.push(("category".to_string(), category.to_string()));
        }
        self.get("/sales", &query).await
    }

    pub async fn create_sale(&self, sale: &NewWasteSale) -> Result<WasteSale, ApiError> {
        self.post("/sales", sale).await
    }

    pub async fn sales_summary(
        &self,
        mrf_id: &str,
        range: Option<DateRange>,
    ) -> Result<SalesSummary, ApiError> {
        let mut query = vec![("mrf_id".to_string(), mrf_id.to_string())];
        push_range(&mut query, range);
        self.get("/sales/summary", &query).await
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// The account behind the current session.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get("/users/me", &[]).await
    }

    /// Manager-only on the server.
    pub async fn fetch_users(&self, mrf_id: Option<&str>) -> Result<Vec<User>, ApiError> {
        let mut query = Vec::new();
        if let Some(mrf_id) = mrf_id {
            query.push(("mrf_id".to_string(), mrf_id.to_string()));
        }
        self.get("/users", &query).await
    }

    /// Manager-only on the server.
    pub async fn create_user(&self, new_user: &UserCreate) -> Result<User, ApiError> {
        self.post("/users", new_user).await
    }

    // =========================================================================
    // Reports
    // =========================================================================

    pub async fn daily_report(&self, mrf_id: &str, date: NaiveDate) -> Result<DailyReport, ApiError> {
        let query = vec![
            ("mrf_id".to_string(), mrf_id.to_string()),
            ("date".to_string(), date.format("%Y-%m-%d").to_string()),
        ];
        self.get("/reports/daily", &query).await
    }

    pub async fn monthly_report(
        &self,
        mrf_id: &str,
        year: i32,
        month: u32,
    ) -> Result<MonthlyReport, ApiError> {
        let query = vec![
            ("mrf_id".to_string(), mrf_id.to_string()),
            ("year".to_string(), year.to_string()),
            ("month".to_string(), month.to_string()),
        ];
        self.get("/reports/monthly", &query).await
    }

    /// Panchayat-role only on the server.
    pub async fn panchayat_report(&self, range: DateRange) -> Result<PanchayatReport, ApiError> {
        let query = vec![
            ("start_date".to_string(), range.0.to_rfc3339()),
            ("end_date".to_string(), range.1.to_rfc3339()),
        ];
        self.get("/reports/panchayat", &query).await
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    /// Attach the bearer token, read fresh from the session store. With no
    /// session the request goes out unauthenticated and the server's
    /// rejection is surfaced as a typed error.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(url = %url, "GET");

        let response = self
            .authorize(self.http.get(&url))
            .query(query)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response from {url}: {e}")))
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(url = %url, "POST");

        let response = self
            .authorize(self.http.post(&url))
            .json(body)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response from {url}: {e}")))
    }
}

fn push_range(query: &mut Vec<(String, String)>, range: Option<DateRange>) {
    if let Some((start, end)) = range {
        query.push(("start_date".to_string(), start.to_rfc3339()));
        query.push(("end_date".to_string(), end.to_rfc3339()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let session = Arc::new(SessionStore::new(std::env::temp_dir().join("digitrack-noop")));
        let client = ApiClient::new("http://localhost:8000/", session).unwrap();
        assert_eq!(client.url("/auth/login"), "http://localhost:8000/api/v1/auth/login");
    }
}
