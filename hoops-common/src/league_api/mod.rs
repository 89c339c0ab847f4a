use crate::match_record::{MatchIdentity, MatchSaveRecord};
use core::{future::Future, time::Duration};
use log::{debug, info, warn};
use reqwest::{Client, ClientBuilder, Method, RequestBuilder};
use thiserror::Error;

mod envelope;
pub use envelope::Ack;

/// Bearer token for the league backend.
///
/// Passed explicitly to every authenticated call rather than read from
/// ambient storage.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: &str) -> Self {
        Self(token.to_string())
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Could not reach the league server: {0}")]
    Transport(String),
    #[error("The league server rejected the request: {0}")]
    RemoteRejected(String),
}

/// Errors from posting a match result
pub type SaveError = ApiError;

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// Somewhere a finalized match record can be submitted.
pub trait MatchResultsSink {
    fn post_match_result(
        &self,
        record: &MatchSaveRecord,
        credential: &Credential,
    ) -> impl Future<Output = Result<Ack, SaveError>>;
}

pub struct LeagueApiClient {
    base_url: String,
    client: Client,
}

impl LeagueApiClient {
    pub fn new(base_url: &str, require_https: bool, timeout: Duration) -> reqwest::Result<Self> {
        let client = ClientBuilder::new()
            .https_only(require_https)
            .timeout(timeout)
            .build()?;

        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn get_fixture(
        &self,
        fixture_id: u32,
        credential: &Credential,
    ) -> impl Future<Output = Result<MatchIdentity, ApiError>> + use<> {
        let url = format!("{}/api/fixtures/{fixture_id}", self.base_url);

        let request = authenticated_request(&self.client, Method::GET, &url, credential).send();

        async move {
            let response = request.await.inspect_err(|e| {
                warn!("Fetching fixture {fixture_id} failed: {e}");
            })?;
            let status = response.status();
            let body = response.text().await?;

            let envelope = envelope::interpret(status, &body).inspect_err(|e| {
                warn!("Fetching fixture {fixture_id} was refused: {e}");
            })?;
            let data = envelope.data.ok_or_else(|| {
                ApiError::RemoteRejected(format!("Fixture {fixture_id} response had no data"))
            })?;
            let identity: MatchIdentity = serde_json::from_value(data).map_err(|e| {
                ApiError::RemoteRejected(format!("Fixture {fixture_id} was malformed: {e}"))
            })?;
            info!("Loaded fixture {fixture_id}");
            Ok(identity)
        }
    }
}

impl MatchResultsSink for LeagueApiClient {
    fn post_match_result(
        &self,
        record: &MatchSaveRecord,
        credential: &Credential,
    ) -> impl Future<Output = Result<Ack, SaveError>> {
        let url = format!("{}/api/match-results", self.base_url);
        let match_id = record.match_id;

        let request = authenticated_request(&self.client, Method::POST, &url, credential)
            .json(record)
            .build();
        let client_ = self.client.clone();

        async move {
            let request = request?;
            debug!("Posting match result to league server: {request:?}");
            if let Some(body) = request.body().and_then(|b| b.as_bytes()) {
                debug!("Post body: {:?}", std::str::from_utf8(body));
            }

            let response = client_.execute(request).await.inspect_err(|e| {
                warn!("Posting result for match {match_id} failed: {e}");
            })?;
            let status = response.status();
            let body = response.text().await?;

            match envelope::interpret(status, &body) {
                Ok(envelope) => {
                    info!("Result for match {match_id} accepted");
                    Ok(envelope.into())
                }
                Err(e) => {
                    warn!("Result for match {match_id} rejected ({status}): {e}");
                    Err(e)
                }
            }
        }
    }
}

fn authenticated_request(
    client: &Client,
    method: Method,
    url: &str,
    credential: &Credential,
) -> RequestBuilder {
    client.request(method, url).bearer_auth(credential.token())
}
