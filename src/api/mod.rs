pub mod dto;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::auth::AuthSession;
use crate::config::AppConfig;
use crate::error::{ApiError, ConfigError};
use crate::models::{AttendanceRecord, Child, StaffMember};

use dto::{
    CreatePresenceRequest, ErrorBody, ItemEnvelope, ListEnvelope, LoginRequest, LoginResponse,
    PresenceDto, PresenceQuery, UpdatePresenceRequest,
};

/// The backend calls the dashboard core depends on.
#[async_trait]
pub trait CrecheApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError>;
    async fn fetch_children(&self) -> Result<Vec<Child>, ApiError>;
    async fn fetch_staff(&self) -> Result<Vec<StaffMember>, ApiError>;
    async fn fetch_attendance(
        &self,
        query: &PresenceQuery,
    ) -> Result<Vec<AttendanceRecord>, ApiError>;
    async fn create_attendance(
        &self,
        request: &CreatePresenceRequest,
    ) -> Result<AttendanceRecord, ApiError>;
    async fn update_attendance(
        &self,
        id: &str,
        request: &UpdatePresenceRequest,
    ) -> Result<AttendanceRecord, ApiError>;
}

pub struct HttpCrecheApi {
    client: Client,
    base_url: String,
    staff_limit: u32,
    session: Arc<AuthSession>,
}

impl HttpCrecheApi {
    pub fn new(config: &AppConfig, session: Arc<AuthSession>) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            staff_limit: config.staff_limit,
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn url_with_query(&self, path: &str, pairs: &[(&str, String)]) -> Result<Url, ApiError> {
        Url::parse_with_params(&self.url(path), pairs)
            .map_err(|e| ApiError::Network(format!("invalid url for {}: {}", path, e)))
    }

    /// Sends with the session's bearer token and decodes a 2xx JSON body.
    /// A 401 expires the session before the error is returned.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let request = match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            warn!("request failed: {}", e);
            ApiError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message);
            let err = ApiError::from_status(status.as_u16(), message);
            debug!("api error {}: {}", status, body);
            if err.is_unauthorized() {
                warn!("api answered 401, expiring session");
                self.session.expire().await;
            }
            return Err(err);
        }

        let body = response.text().await?;
        serde_json::from_str::<T>(&body).map_err(|e| {
            tracing::error!("Failed to parse api response: {}", e);
            ApiError::Decode(e.to_string())
        })
    }
}

fn into_records(presences: Vec<PresenceDto>) -> Vec<AttendanceRecord> {
    let mut records = Vec::with_capacity(presences.len());
    for dto in presences {
        match AttendanceRecord::try_from(dto) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping presence: {}", e),
        }
    }
    records
}

#[async_trait]
impl CrecheApi for HttpCrecheApi {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let response: ItemEnvelope<LoginResponse> = self
            .send(self.client.post(self.url("/auth/login")).json(request))
            .await?;
        Ok(response.into_inner())
    }

    async fn fetch_children(&self) -> Result<Vec<Child>, ApiError> {
        let response: ListEnvelope<Child> =
            self.send(self.client.get(self.url("/enfants"))).await?;
        Ok(response.into_vec())
    }

    async fn fetch_staff(&self) -> Result<Vec<StaffMember>, ApiError> {
        let url = self.url_with_query("/personnel", &[("limit", self.staff_limit.to_string())])?;
        let response: ListEnvelope<StaffMember> = self.send(self.client.get(url)).await?;
        Ok(response.into_vec())
    }

    async fn fetch_attendance(
        &self,
        query: &PresenceQuery,
    ) -> Result<Vec<AttendanceRecord>, ApiError> {
        let url = self.url_with_query("/presences", &query.to_pairs())?;
        let response: ListEnvelope<PresenceDto> = self.send(self.client.get(url)).await?;
        Ok(into_records(response.into_vec()))
    }

    async fn create_attendance(
        &self,
        request: &CreatePresenceRequest,
    ) -> Result<AttendanceRecord, ApiError> {
        let response: ItemEnvelope<PresenceDto> = self
            .send(self.client.post(self.url("/presences")).json(request))
            .await?;
        AttendanceRecord::try_from(response.into_inner()).map_err(ApiError::Decode)
    }

    async fn update_attendance(
        &self,
        id: &str,
        request: &UpdatePresenceRequest,
    ) -> Result<AttendanceRecord, ApiError> {
        let path = format!("/presences/{}", id);
        let response: ItemEnvelope<PresenceDto> = self
            .send(self.client.put(self.url(&path)).json(request))
            .await?;
        AttendanceRecord::try_from(response.into_inner()).map_err(ApiError::Decode)
    }
}
