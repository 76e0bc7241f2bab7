//! HTTP gateway speaking the backend's REST dialect.
//!
//! Procedures are `POST /rest/v1/rpc/<name>` with a JSON argument object,
//! tables are `GET /rest/v1/<table>` with filter query parameters, and the
//! session user comes from `GET /auth/v1/user`.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use parkwatch_core::{
    AuthUser, CoreError, CoreResult, CouponCode, ExtensionMinutes, RecordStore, RemoteProcedures,
};
use parkwatch_shared::{
    BookingWithSpot, CouponRedemption, ExtensionOutcome, NewSecurityAlert, OverstaySweep, Profile,
    SecurityAlert, SensorReading, SpotRefresh, Transaction, UpcomingPreflight,
};

use crate::app_config::BackendConfig;

const BOOKING_SELECT: &str =
    "*,parking_spots(id,spot_number,location,camera_feed_url,sensor_id)";

#[derive(Clone)]
pub struct RestGateway {
    http: Client,
    base_url: Url,
    anon_key: String,
    access_token: Option<String>,
}

impl std::fmt::Debug for RestGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestGateway")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.access_token.is_some())
            .finish()
    }
}

impl RestGateway {
    pub fn new(config: &BackendConfig) -> CoreResult<Self> {
        let mut base_url = Url::parse(&config.url)
            .map_err(|e| CoreError::ValidationError(format!("Invalid backend url: {}", e)))?;
        // `Url::join` replaces the last segment unless the path ends in a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| CoreError::RemoteError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            anon_key: config.anon_key.clone(),
            access_token: config.access_token.clone(),
        })
    }

    /// Act on behalf of a signed-in user
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    fn endpoint(&self, path: &str) -> CoreResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| CoreError::RemoteError(format!("Invalid endpoint {}: {}", path, e)))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        request.header("apikey", &self.anon_key).bearer_auth(bearer)
    }

    async fn call_procedure<T: DeserializeOwned>(&self, name: &str, args: Value) -> CoreResult<T> {
        let url = self.endpoint(&format!("rest/v1/rpc/{}", name))?;
        debug!("Calling procedure {}", name);

        let response = self
            .authorize(self.http.post(url))
            .json(&args)
            .send()
            .await
            .map_err(|e| transport_error(name, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            warn!("Procedure {} is not deployed", name);
            return Err(CoreError::Unsupported(format!("procedure {}", name)));
        }

        decode(response, name).await
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> CoreResult<Vec<T>> {
        let url = self.endpoint(&format!("rest/v1/{}", table))?;
        debug!("Reading {} with {} filter(s)", table, filters.len());

        let response = self
            .authorize(self.http.get(url))
            .query(filters)
            .send()
            .await
            .map_err(|e| transport_error(table, e))?;

        decode(response, table).await
    }
}

fn transport_error(what: &str, err: reqwest::Error) -> CoreError {
    CoreError::RemoteError(format!("{}: {}", what, err))
}

async fn decode<T: DeserializeOwned>(response: Response, what: &str) -> CoreResult<T> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(CoreError::AuthenticationError(format!("{} returned HTTP {}", what, status)));
    }
    if status == StatusCode::NOT_FOUND {
        return Err(CoreError::NotFound(what.to_string()));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CoreError::RemoteError(format!(
            "{} returned HTTP {}: {}",
            what, status, body
        )));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| CoreError::RemoteError(format!("Malformed {} response: {}", what, e)))
}

/// `in.(...)` filter value with each member quoted
fn in_list(values: &[String]) -> String {
    let quoted: Vec<String> = values
        .iter()
        .map(|v| format!("\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{}", value)
}

#[async_trait]
impl RemoteProcedures for RestGateway {
    async fn redeem_coupon(&self, user_id: Uuid, code: &CouponCode) -> CoreResult<CouponRedemption> {
        self.call_procedure(
            "redeem_coupon",
            json!({ "p_user_id": user_id, "p_coupon_code": code.as_str() }),
        )
        .await
    }

    async fn extend_booking(
        &self,
        booking_id: Uuid,
        minutes: ExtensionMinutes,
    ) -> CoreResult<ExtensionOutcome> {
        self.call_procedure(
            "extend_booking",
            json!({ "p_booking_id": booking_id, "p_extension_minutes": minutes.get() }),
        )
        .await
    }

    async fn check_upcoming_bookings_before_start(&self) -> CoreResult<UpcomingPreflight> {
        self.call_procedure("check_upcoming_bookings_before_start", json!({}))
            .await
    }

    async fn update_spot_availability_from_sensor(&self) -> CoreResult<SpotRefresh> {
        self.call_procedure("update_spot_availability_from_sensor", json!({}))
            .await
    }

    async fn check_and_handle_overstay(&self) -> CoreResult<OverstaySweep> {
        self.call_procedure("check_and_handle_overstay", json!({}))
            .await
    }
}

#[derive(Debug, Deserialize)]
struct SpotRef {
    spot_id: Uuid,
}

#[async_trait]
impl RecordStore for RestGateway {
    async fn current_user(&self) -> CoreResult<Option<AuthUser>> {
        let Some(token) = self.access_token.as_deref() else {
            return Ok(None);
        };

        let url = self.endpoint("auth/v1/user")?;
        let response = self
            .http
            .get(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| transport_error("auth/v1/user", e))?;

        match decode::<AuthUser>(response, "auth/v1/user").await {
            Ok(user) => Ok(Some(user)),
            Err(CoreError::AuthenticationError(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn fetch_profile(&self, user_id: Uuid) -> CoreResult<Profile> {
        let rows: Vec<Profile> = self
            .select("profiles", &[("select", "*".to_string()), ("id", eq(user_id))])
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| CoreError::NotFound(format!("profile {}", user_id)))
    }

    async fn fetch_active_bookings(&self, user_id: Uuid) -> CoreResult<Vec<BookingWithSpot>> {
        self.select(
            "bookings",
            &[
                ("select", BOOKING_SELECT.to_string()),
                ("user_id", eq(user_id)),
                ("is_completed", eq(false)),
                ("order", "start_time.asc".to_string()),
            ],
        )
        .await
    }

    async fn fetch_transactions(&self, user_id: Uuid) -> CoreResult<Vec<Transaction>> {
        self.select(
            "transaction_history",
            &[
                ("select", "*".to_string()),
                ("user_id", eq(user_id)),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    async fn fetch_security_alerts(&self, user_id: Uuid) -> CoreResult<Vec<SecurityAlert>> {
        self.select(
            "security_alerts",
            &[
                ("select", "*".to_string()),
                ("user_id", eq(user_id)),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    async fn fetch_sensor_readings(&self, sensor_ids: &[String]) -> CoreResult<Vec<SensorReading>> {
        if sensor_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.select(
            "sensor_data",
            &[("select", "*".to_string()), ("sensor_id", in_list(sensor_ids))],
        )
        .await
    }

    async fn fetch_booking_spot(&self, booking_id: Uuid) -> CoreResult<Uuid> {
        let rows: Vec<SpotRef> = self
            .select(
                "bookings",
                &[("select", "spot_id".to_string()), ("id", eq(booking_id))],
            )
            .await?;
        rows.into_iter()
            .next()
            .map(|row| row.spot_id)
            .ok_or_else(|| CoreError::NotFound(format!("booking {}", booking_id)))
    }

    async fn create_security_alert(&self, alert: &NewSecurityAlert) -> CoreResult<SecurityAlert> {
        let url = self.endpoint("rest/v1/security_alerts")?;
        let response = self
            .authorize(self.http.post(url))
            .header("Prefer", "return=representation")
            .json(&[alert])
            .send()
            .await
            .map_err(|e| transport_error("security_alerts", e))?;

        let created: Vec<SecurityAlert> = decode(response, "security_alerts").await?;
        created
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::RemoteError("security_alerts insert returned no row".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_list_quotes_members() {
        let ids = vec!["S-1".to_string(), "we\"ird".to_string()];
        assert_eq!(in_list(&ids), r#"in.("S-1","we\"ird")"#);
    }

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let config = BackendConfig {
            url: "http://localhost:8000/proxy".to_string(),
            anon_key: "anon".to_string(),
            access_token: None,
            timeout_seconds: 5,
        };
        let gateway = RestGateway::new(&config).unwrap();
        assert_eq!(
            gateway.endpoint("rest/v1/rpc/extend_booking").unwrap().as_str(),
            "http://localhost:8000/proxy/rest/v1/rpc/extend_booking"
        );
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let config = BackendConfig {
            url: "not a url".to_string(),
            anon_key: "anon".to_string(),
            access_token: None,
            timeout_seconds: 5,
        };
        assert!(RestGateway::new(&config).is_err());
    }
}
