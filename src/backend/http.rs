//! REST client for the remote fixture service. Every request carries the shared
//! static API key; timeouts are the client default unless configured.

use crate::backend::FixtureBackend;
use crate::models::{
    CreatedGroups, FinalsStarted, FixtureId, FixturePatch, FixtureSnapshot, Group, LeagueId,
    Match, NumberedMatches, QuarterFinalsStarted, RemoteError, SemiFinalsStarted,
};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

/// Header carrying the static API key.
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, api_key: &str, timeout_secs: Option<u64>) -> Result<Self, RemoteError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key).map_err(|_| RemoteError::InvalidApiKey)?;
        headers.insert(API_KEY_HEADER, key);

        let mut builder = Client::builder().default_headers(headers);
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Send and decode a JSON reply.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RemoteError> {
        let body = self.send_ack(request).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Send and only check the status. Returns the raw body.
    async fn send_ack(&self, request: RequestBuilder) -> Result<String, RemoteError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            log::warn!("Backend returned {}: {}", status, body);
            return Err(RemoteError::Rejected {
                status: status.as_u16(),
                message: rejection_message(&body),
            });
        }
        Ok(body)
    }
}

/// Human-readable message from an error body: `message` or `error` field, or the
/// raw text.
fn rejection_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let field = parsed.as_ref().and_then(|v| {
        v.get("message")
            .or_else(|| v.get("error"))
            .and_then(|m| m.as_str())
            .map(str::to_string)
    });
    match field {
        Some(message) => message,
        None if body.trim().is_empty() => "no details".to_string(),
        None => body.trim().to_string(),
    }
}

impl FixtureBackend for HttpBackend {
    async fn fetch_fixture(&self, league: LeagueId) -> Result<FixtureSnapshot, RemoteError> {
        let request = self.client.get(self.url(&format!("fixtures/{league}")));
        match self.send(request).await {
            Err(RemoteError::Rejected { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Err(RemoteError::LeagueNotFound(league))
            }
            other => other,
        }
    }

    async fn patch_fixture(
        &self,
        league: LeagueId,
        patch: &FixturePatch,
    ) -> Result<FixtureSnapshot, RemoteError> {
        let request = self
            .client
            .patch(self.url(&format!("fixtures/{league}")))
            .json(patch);
        self.send(request).await
    }

    async fn create_groups(
        &self,
        fixture: FixtureId,
        group_names: &[String],
    ) -> Result<CreatedGroups, RemoteError> {
        let request = self
            .client
            .post(self.url(&format!("fixtures/{fixture}/groups")))
            .json(&json!({ "groupNames": group_names }));
        self.send(request).await
    }

    async fn add_teams_to_groups(&self, groups: &[Group]) -> Result<(), RemoteError> {
        let request = self
            .client
            .put(self.url("groups/teams"))
            .json(&json!({ "groups": groups }));
        self.send_ack(request).await.map(|_| ())
    }

    async fn save_regular_round_matches(
        &self,
        league: LeagueId,
        fixture: FixtureId,
        matches: &[Match],
    ) -> Result<(), RemoteError> {
        let request = self
            .client
            .post(self.url(&format!("fixtures/{league}/{fixture}/matches")))
            .json(&json!({ "matches": matches }));
        self.send_ack(request).await.map(|_| ())
    }

    async fn start_quarter_finals(&self, league: LeagueId) -> Result<(), RemoteError> {
        let request = self
            .client
            .post(self.url(&format!("fixtures/{league}/quarter-finals/start")));
        self.send_ack(request).await.map(|_| ())
    }

    async fn start_quarter_final_matches(
        &self,
        league: LeagueId,
        matches: &[Match],
    ) -> Result<QuarterFinalsStarted, RemoteError> {
        let request = self
            .client
            .post(self.url(&format!("fixtures/{league}/quarter-finals/matches")))
            .json(&NumberedMatches(matches));
        self.send(request).await
    }

    async fn start_semi_final_matches(
        &self,
        league: LeagueId,
        matches: &[Match],
    ) -> Result<SemiFinalsStarted, RemoteError> {
        let request = self
            .client
            .post(self.url(&format!("fixtures/{league}/semi-finals/matches")))
            .json(&NumberedMatches(matches));
        self.send(request).await
    }

    async fn start_finals(
        &self,
        league: LeagueId,
        final_match: &Match,
    ) -> Result<FinalsStarted, RemoteError> {
        let request = self
            .client
            .post(self.url(&format!("fixtures/{league}/finals")))
            .json(final_match);
        self.send(request).await
    }
}
