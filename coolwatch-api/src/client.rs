use serde::Deserialize;
use serde_json::json;

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::model::{
    Alert, AlertCount, HeatExchanger, HeatExchangerUpsert, MonitoringSettings, Program, Severity,
    Stats, Telemetry, User, UserUpsert,
};

/// Status dimension of an alert query, mapped onto the backend's
/// `acknowledged`/`resolved` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertStatusFilter {
    All,
    #[default]
    Active,
    Acknowledged,
    Resolved,
}

impl AlertStatusFilter {
    /// All filter values, for pick-lists.
    pub const ALL: &'static [AlertStatusFilter] = &[
        AlertStatusFilter::Active,
        AlertStatusFilter::Acknowledged,
        AlertStatusFilter::Resolved,
        AlertStatusFilter::All,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AlertStatusFilter::All => "All",
            AlertStatusFilter::Active => "Active",
            AlertStatusFilter::Acknowledged => "Acknowledged",
            AlertStatusFilter::Resolved => "Resolved",
        }
    }
}

impl std::fmt::Display for AlertStatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Query against `/api/alerts` and `/api/alerts/count`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertQuery {
    pub status: AlertStatusFilter,
    pub severity: Option<Severity>,
    pub heat_exchanger_id: Option<i64>,
}

impl AlertQuery {
    /// The query for the active-alert badge count.
    pub fn active() -> Self {
        Self {
            status: AlertStatusFilter::Active,
            ..Self::default()
        }
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();

        match self.status {
            AlertStatusFilter::All => {}
            AlertStatusFilter::Active => {
                params.push(("acknowledged", "false".to_string()));
                params.push(("resolved", "false".to_string()));
            }
            AlertStatusFilter::Acknowledged => {
                params.push(("acknowledged", "true".to_string()));
                params.push(("resolved", "false".to_string()));
            }
            AlertStatusFilter::Resolved => {
                params.push(("resolved", "true".to_string()));
            }
        }

        if let Some(severity) = self.severity {
            params.push(("severity", severity.as_str().to_string()));
        }

        if let Some(id) = self.heat_exchanger_id {
            params.push(("heat_exchanger_id", id.to_string()));
        }

        params
    }
}

/// Error body the backend attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
}

/// Typed client for the monitoring backend's REST API.
///
/// Holds a cookie store so the session cookie set by `login` rides along
/// on subsequent requests. Cloning is cheap and shares the store.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    /// Build a client for the given server.
    pub fn new(server: &ServerConfig) -> Result<Self> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            http,
            base: server.api_base(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Map a non-2xx response to a typed error carrying the backend's
    /// `detail` message when present.
    async fn expect_ok(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.detail)
            .unwrap_or_else(|| status.to_string());

        Err(Error::Api {
            status: status.as_u16(),
            detail,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.http.get(self.url(path)).send().await?;
        Ok(Self::expect_ok(response).await?.json().await?)
    }

    // --- Heat exchangers ---

    pub async fn list_heat_exchangers(&self) -> Result<Vec<HeatExchanger>> {
        self.get_json("/heat-exchangers/").await
    }

    pub async fn create_heat_exchanger(
        &self,
        payload: &HeatExchangerUpsert,
    ) -> Result<HeatExchanger> {
        let response = self
            .http
            .post(self.url("/heat-exchangers/"))
            .json(payload)
            .send()
            .await?;
        Ok(Self::expect_ok(response).await?.json().await?)
    }

    pub async fn update_heat_exchanger(
        &self,
        id: i64,
        payload: &HeatExchangerUpsert,
    ) -> Result<HeatExchanger> {
        let response = self
            .http
            .put(self.url(&format!("/heat-exchangers/{}", id)))
            .json(payload)
            .send()
            .await?;
        Ok(Self::expect_ok(response).await?.json().await?)
    }

    pub async fn delete_heat_exchanger(&self, id: i64) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/heat-exchangers/{}", id)))
            .send()
            .await?;
        Self::expect_ok(response).await?;
        Ok(())
    }

    // --- Monitoring data ---

    /// Latest telemetry record per heat exchanger.
    pub async fn latest_telemetry(&self) -> Result<Vec<Telemetry>> {
        self.get_json("/monitoring/latest").await
    }

    /// Recent telemetry history for one heat exchanger, newest first.
    pub async fn telemetry_history(&self, id: i64, limit: u32) -> Result<Vec<Telemetry>> {
        self.get_json(&format!("/monitoring/{}?limit={}", id, limit))
            .await
    }

    /// Aggregated statistics over the trailing `hours`.
    pub async fn statistics(&self, id: i64, hours: u32) -> Result<Stats> {
        self.get_json(&format!("/monitoring/{}/statistics?hours={}", id, hours))
            .await
    }

    // --- Alerts ---

    pub async fn alert_count(&self, query: AlertQuery) -> Result<AlertCount> {
        let response = self
            .http
            .get(self.url("/alerts/count"))
            .query(&query.params())
            .send()
            .await?;
        Ok(Self::expect_ok(response).await?.json().await?)
    }

    pub async fn list_alerts(&self, query: AlertQuery) -> Result<Vec<Alert>> {
        let response = self
            .http
            .get(self.url("/alerts"))
            .query(&query.params())
            .send()
            .await?;
        Ok(Self::expect_ok(response).await?.json().await?)
    }

    pub async fn acknowledge_alert(&self, id: i64) -> Result<()> {
        let response = self
            .http
            .put(self.url(&format!("/alerts/{}/acknowledge", id)))
            .json(&json!({}))
            .send()
            .await?;
        Self::expect_ok(response).await?;
        Ok(())
    }

    pub async fn resolve_alert(&self, id: i64) -> Result<()> {
        let response = self
            .http
            .put(self.url(&format!("/alerts/{}/resolve", id)))
            .json(&json!({}))
            .send()
            .await?;
        Self::expect_ok(response).await?;
        Ok(())
    }

    pub async fn comment_alert(&self, id: i64, comment: &str) -> Result<()> {
        let response = self
            .http
            .post(self.url(&format!("/alerts/{}/comment", id)))
            .json(&json!({ "comments": comment }))
            .send()
            .await?;
        Self::expect_ok(response).await?;
        Ok(())
    }

    // --- Authentication ---

    /// Log in; the session cookie lands in the client's cookie store.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;
        Self::expect_ok(response).await?;
        Ok(())
    }

    pub async fn logout(&self) -> Result<()> {
        let response = self.http.post(self.url("/auth/logout")).send().await?;
        Self::expect_ok(response).await?;
        Ok(())
    }

    /// The currently authenticated user, or an unauthorized error.
    pub async fn me(&self) -> Result<User> {
        self.get_json("/auth/me").await
    }

    // --- User administration ---

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.get_json("/users/").await
    }

    pub async fn create_user(&self, payload: &UserUpsert) -> Result<User> {
        let response = self
            .http
            .post(self.url("/users/"))
            .json(payload)
            .send()
            .await?;
        Ok(Self::expect_ok(response).await?.json().await?)
    }

    pub async fn update_user(&self, id: i64, payload: &UserUpsert) -> Result<User> {
        let response = self
            .http
            .put(self.url(&format!("/users/{}", id)))
            .json(payload)
            .send()
            .await?;
        Ok(Self::expect_ok(response).await?.json().await?)
    }

    pub async fn delete_user(&self, id: i64) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/users/{}", id)))
            .send()
            .await?;
        Self::expect_ok(response).await?;
        Ok(())
    }

    /// Approve a pending registration.
    pub async fn approve_user(&self, id: i64) -> Result<()> {
        let response = self
            .http
            .post(self.url(&format!("/users/{}/approve", id)))
            .send()
            .await?;
        Self::expect_ok(response).await?;
        Ok(())
    }

    /// Deny and delete a pending registration.
    pub async fn deny_user(&self, id: i64) -> Result<()> {
        let response = self
            .http
            .post(self.url(&format!("/users/{}/deny", id)))
            .send()
            .await?;
        Self::expect_ok(response).await?;
        Ok(())
    }

    // --- Settings ---

    pub async fn monitoring_settings(&self) -> Result<MonitoringSettings> {
        self.get_json("/settings/monitoring").await
    }

    pub async fn set_monitoring_settings(&self, settings: MonitoringSettings) -> Result<()> {
        let response = self
            .http
            .put(self.url("/settings/monitoring"))
            .json(&settings)
            .send()
            .await?;
        Self::expect_ok(response).await?;
        Ok(())
    }

    // --- Programs ---

    pub async fn list_programs(&self) -> Result<Vec<Program>> {
        self.get_json("/programs/").await
    }

    pub async fn create_program(&self, name: &str, description: Option<&str>) -> Result<Program> {
        let response = self
            .http
            .post(self.url("/programs/"))
            .json(&json!({ "name": name, "description": description }))
            .send()
            .await?;
        Ok(Self::expect_ok(response).await?.json().await?)
    }

    pub async fn delete_program(&self, id: i64) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/programs/{}", id)))
            .send()
            .await?;
        Self::expect_ok(response).await?;
        Ok(())
    }
}
