//! REST client for the reservation service

use crate::api::types::{
    Credentials, RegisterRequest, ReservationRequest, Station, StationRequest, User, Vehicle,
    VehicleRequest,
};
use crate::config::ApiConfig;
use crate::error::{ArgusError, Result};
use crate::history::{HistoryPage, HistoryQuery, SessionHistory};
use crate::logging::get_logger;
use async_trait::async_trait;
use reqwest::StatusCode;

/// Client for the reservation REST API.
///
/// Holds one connection pool and the session cookie jar; clone-free
/// sharing goes through an `Arc`.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    logger: crate::logging::StructuredLogger,
}

impl ApiClient {
    /// Create a new client from configuration
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .cookie_store(true)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            logger: get_logger("api"),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a non-success response to an error, logging the status
    async fn check(&self, resp: reqwest::Response, what: &str) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        self.logger
            .error(&format!("{} failed: {} {}", what, status, body));

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ArgusError::auth(format!(
                "{} rejected with {}",
                what, status
            ))),
            _ => Err(ArgusError::api(format!("{} failed with {}", what, status))),
        }
    }

    // --- auth ---

    /// Log in; the session cookie is captured by the jar
    pub async fn login(&self, credentials: &Credentials) -> Result<User> {
        let resp = self
            .http
            .post(self.url("/auth/login"))
            .json(credentials)
            .send()
            .await?;
        let resp = self.check(resp, "login").await?;
        Ok(resp.json().await?)
    }

    /// Register a new account
    pub async fn register(&self, request: &RegisterRequest) -> Result<()> {
        let resp = self
            .http
            .post(self.url("/auth/register"))
            .json(request)
            .send()
            .await?;
        self.check(resp, "register").await?;
        Ok(())
    }

    /// Invalidate the current session
    pub async fn logout(&self) -> Result<()> {
        let resp = self.http.post(self.url("/auth/logout")).send().await?;
        self.check(resp, "logout").await?;
        Ok(())
    }

    /// Fetch the authenticated user
    pub async fn me(&self) -> Result<User> {
        let resp = self.http.get(self.url("/users/me")).send().await?;
        let resp = self.check(resp, "fetch current user").await?;
        Ok(resp.json().await?)
    }

    // --- vehicles ---

    /// List vehicles, optionally restricted to one owner
    pub async fn vehicles(&self, owner_id: Option<i64>) -> Result<Vec<Vehicle>> {
        let mut req = self.http.get(self.url("/vehicles"));
        if let Some(id) = owner_id {
            req = req.query(&[("ownerId", id)]);
        }
        let resp = self.check(req.send().await?, "list vehicles").await?;
        Ok(resp.json().await?)
    }

    /// Fetch one vehicle
    pub async fn vehicle(&self, id: i64) -> Result<Vehicle> {
        let resp = self
            .http
            .get(self.url(&format!("/vehicles/{}", id)))
            .send()
            .await?;
        let resp = self.check(resp, "fetch vehicle").await?;
        Ok(resp.json().await?)
    }

    /// Create a vehicle for the authenticated user
    pub async fn create_vehicle(&self, request: &VehicleRequest) -> Result<Vehicle> {
        let resp = self
            .http
            .post(self.url("/vehicles"))
            .json(request)
            .send()
            .await?;
        let resp = self.check(resp, "create vehicle").await?;
        Ok(resp.json().await?)
    }

    /// Update a vehicle
    pub async fn update_vehicle(&self, id: i64, request: &VehicleRequest) -> Result<Vehicle> {
        let resp = self
            .http
            .put(self.url(&format!("/vehicles/{}", id)))
            .json(request)
            .send()
            .await?;
        let resp = self.check(resp, "update vehicle").await?;
        Ok(resp.json().await?)
    }

    /// Delete a vehicle
    pub async fn delete_vehicle(&self, id: i64) -> Result<()> {
        let resp = self
            .http
            .delete(self.url(&format!("/vehicles/{}", id)))
            .send()
            .await?;
        self.check(resp, "delete vehicle").await?;
        Ok(())
    }

    // --- stations ---

    /// List all charging stations
    pub async fn stations(&self) -> Result<Vec<Station>> {
        let resp = self.http.get(self.url("/stations")).send().await?;
        let resp = self.check(resp, "list stations").await?;
        Ok(resp.json().await?)
    }

    /// Fetch one station
    pub async fn station(&self, id: i64) -> Result<Station> {
        let resp = self
            .http
            .get(self.url(&format!("/stations/{}", id)))
            .send()
            .await?;
        let resp = self.check(resp, "fetch station").await?;
        Ok(resp.json().await?)
    }

    /// Create a station (admin)
    pub async fn create_station(&self, request: &StationRequest) -> Result<Station> {
        let resp = self
            .http
            .post(self.url("/stations"))
            .json(request)
            .send()
            .await?;
        let resp = self.check(resp, "create station").await?;
        Ok(resp.json().await?)
    }

    /// Update a station (admin)
    pub async fn update_station(&self, id: i64, request: &StationRequest) -> Result<Station> {
        let resp = self
            .http
            .put(self.url(&format!("/stations/{}", id)))
            .json(request)
            .send()
            .await?;
        let resp = self.check(resp, "update station").await?;
        Ok(resp.json().await?)
    }

    /// Delete a station (admin)
    pub async fn delete_station(&self, id: i64) -> Result<()> {
        let resp = self
            .http
            .delete(self.url(&format!("/stations/{}", id)))
            .send()
            .await?;
        self.check(resp, "delete station").await?;
        Ok(())
    }

    // --- charging sessions ---

    /// Fetch one page of charging session history
    pub async fn charging_sessions(&self, query: &HistoryQuery) -> Result<HistoryPage> {
        query.validate()?;

        let mut params: Vec<(&str, String)> = vec![
            ("page", query.page.to_string()),
            ("size", query.size.to_string()),
        ];
        if let Some(user_id) = query.user_id {
            params.push(("userId", user_id.to_string()));
        }
        if let Some(is_completed) = query.is_completed {
            params.push(("isCompleted", is_completed.to_string()));
        }

        self.logger
            .debug(&format!("fetching history page {}", query.page));

        let resp = self
            .http
            .get(self.url("/charging-sessions"))
            .query(&params)
            .send()
            .await?;
        let resp = self.check(resp, "fetch charging sessions").await?;
        Ok(resp.json().await?)
    }

    /// Reserve a charging slot
    pub async fn create_reservation(&self, request: &ReservationRequest) -> Result<()> {
        let resp = self
            .http
            .post(self.url("/charging-sessions"))
            .json(request)
            .send()
            .await?;
        self.check(resp, "create reservation").await?;
        Ok(())
    }
}

#[async_trait]
impl SessionHistory for ApiClient {
    async fn fetch_page(&self, query: &HistoryQuery) -> Result<HistoryPage> {
        self.charging_sessions(query).await
    }
}
