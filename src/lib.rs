use chrono::{DateTime, Utc};
use log::{debug, warn};
use oauth2::reqwest::http_client;
use oauth2::AccessToken;
use oauth2::{basic::BasicClient, AuthUrl, ClientId, ClientSecret, TokenResponse, TokenUrl};

pub mod api;
pub mod config;
pub mod credentials;
pub mod error;
pub mod pipeline;
pub mod sink;

use credentials::Credentials;
pub use error::{ApiException, HeatmapsError};

pub const PRODUCTION_BASE_URL: &str = "https://api.swisscom.com/layer/heatmaps/demo";
pub const PRODUCTION_TOKEN_URL: &str = "https://consent.swisscom.com/o/oauth2/token";

/// Header selecting the API version, sent with every request.
pub const API_VERSION_HEADER: &str = "scs-version";
pub const DEFAULT_API_VERSION: &str = "2";

pub trait ApiClient {
    /// GETs `path` (relative to the base URL) and returns the body of a
    /// successful reply. `query_string` may repeat keys; order is kept.
    fn http_get(
        &self,
        path: &str,
        query_string: &[(String, String)],
    ) -> Result<String, anyhow::Error>;
}

/// Bearer token obtained once per run. There is no refresh.
#[derive(Debug, Clone)]
pub struct Token {
    pub access_token: AccessToken,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Token {
    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|t| t <= Utc::now()).unwrap_or(false)
    }
}

#[derive(Debug)]
pub struct HeatmapsApi {
    client_id: ClientId,
    client_secret: ClientSecret,
    base_url: String,
    token_url: String,
    api_version: String,

    http: reqwest::blocking::Client,
    token: Option<Token>,
}

impl HeatmapsApi {
    pub fn new(credentials: Credentials) -> Self {
        HeatmapsApi {
            client_id: ClientId::new(credentials.client_id),
            client_secret: ClientSecret::new(credentials.client_secret),
            base_url: PRODUCTION_BASE_URL.to_string(),
            token_url: PRODUCTION_TOKEN_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            http: reqwest::blocking::Client::new(),
            token: None,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_token_url(mut self, token_url: String) -> Self {
        self.token_url = token_url;
        self
    }

    pub fn with_api_version(mut self, api_version: String) -> Self {
        self.api_version = api_version;
        self
    }

    /// OAuth2 client-credentials exchange against the token endpoint.
    pub fn authenticate(&mut self) -> anyhow::Result<()> {
        // The authorize endpoint is never visited in this grant.
        let client = BasicClient::new(
            self.client_id.clone(),
            Some(self.client_secret.clone()),
            AuthUrl::new(self.token_url.clone())?,
            Some(TokenUrl::new(self.token_url.clone())?),
        );

        debug!("requesting token from {}", self.token_url);
        let token_result = client
            .exchange_client_credentials()
            .request(http_client)
            .map_err(|e| {
                let detail = match &e {
                    oauth2::RequestTokenError::ServerResponse(resp) => resp.to_string(),
                    other => other.to_string(),
                };
                HeatmapsError::Auth(detail)
            })?;

        let expires_at = token_result
            .expires_in()
            .and_then(|d| chrono::Duration::from_std(d).ok())
            .map(|d| Utc::now() + d);
        debug!("token acquired, expires at {:?}", expires_at);

        self.token = Some(Token {
            access_token: token_result.access_token().clone(),
            expires_at,
        });

        Ok(())
    }

    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    pub fn get_token(&self) -> Result<&String, HeatmapsError> {
        self.token
            .as_ref()
            .map(|t| t.access_token.secret())
            .ok_or(HeatmapsError::NotAuthenticated)
    }
}

impl ApiClient for HeatmapsApi {
    fn http_get(
        &self,
        path: &str,
        query_string: &[(String, String)],
    ) -> Result<String, anyhow::Error> {
        let url = format!("{}{}", self.base_url, path);

        let token = self.token.as_ref().ok_or(HeatmapsError::NotAuthenticated)?;
        if token.is_expired() {
            warn!(
                "access token expired at {:?}, request will likely be rejected",
                token.expires_at
            );
        }

        debug!("GET {} ({} query params)", url, query_string.len());
        let response = self
            .http
            .get(&url)
            .query(query_string)
            .bearer_auth(token.access_token.secret())
            .header(API_VERSION_HEADER, &self.api_version)
            .send()?;

        let status_code = response.status();

        let body = response.text()?;
        debug!("{} -> {} ({} bytes)", url, status_code, body.len());
        if !status_code.is_success() {
            let kind = ApiException::from_status(status_code.as_u16());
            return Err(anyhow::Error::new(HeatmapsError::Http {
                status: status_code.as_u16(),
                kind,
                body,
            })
            .context(format!("GET {}", url)));
        }

        Ok(body)
    }
}
