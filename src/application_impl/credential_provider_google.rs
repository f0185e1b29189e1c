use crate::application_port::*;
use crate::domain_model::*;
use chrono::{Duration as ChronoDuration, Utc};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

#[derive(Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub timeout: Duration,
}

impl fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleConfig")
            .field("client_id", &self.client_id)
            .field("token_url", &self.token_url)
            .field("userinfo_url", &self.userinfo_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    email: String,
    name: Option<String>,
}

/// Google OAuth2 provider for non-browser clients: credentials come from a
/// refresh-token grant, identity from the OpenID userinfo endpoint.
pub struct GoogleCredentialProvider {
    cfg: GoogleConfig,
    http: reqwest::Client,
}

impl GoogleCredentialProvider {
    pub fn try_new(cfg: GoogleConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("cartola-session/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { cfg, http })
    }

    fn map_reqwest(e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Network(e.to_string())
        }
    }

    async fn fetch_userinfo(&self, credential: &Credential) -> Result<UserInfo, ProviderError> {
        let response = self
            .http
            .get(&self.cfg.userinfo_url)
            .bearer_auth(credential.token.as_str())
            .send()
            .await
            .map_err(Self::map_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Other(format!(
                "userinfo returned {}: {}",
                status.as_u16(),
                text
            )));
        }
        response
            .json::<UserInfo>()
            .await
            .map_err(|e| ProviderError::Other(format!("invalid userinfo: {e}")))
    }
}

fn parse_token_error(status: u16, body: &str) -> ProviderError {
    match serde_json::from_str::<TokenErrorResponse>(body) {
        Ok(err) if err.error == "invalid_grant" => ProviderError::InvalidGrant,
        Ok(err) => ProviderError::Other(format!(
            "{} ({})",
            err.error,
            err.error_description.unwrap_or_default()
        )),
        Err(_) => ProviderError::Other(format!("token endpoint returned {status}")),
    }
}

#[async_trait::async_trait]
impl CredentialProvider for GoogleCredentialProvider {
    async fn sign_in(&self) -> Result<SignInResult, ProviderError> {
        let credential = self.refresh_token().await?;
        let info = self.fetch_userinfo(&credential).await?;
        Ok(SignInResult {
            credential,
            email: info.email,
            display_name: info.name,
        })
    }

    async fn refresh_token(&self) -> Result<Credential, ProviderError> {
        if self.cfg.refresh_token.is_empty() {
            return Err(ProviderError::Other("no refresh token configured".to_string()));
        }

        tracing::debug!("requesting access token from {}", self.cfg.token_url);
        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", self.cfg.client_id.as_str()),
            ("client_secret", self.cfg.client_secret.as_str()),
            ("refresh_token", self.cfg.refresh_token.as_str()),
        ];
        let response = self
            .http
            .post(&self.cfg.token_url)
            .form(&params)
            .send()
            .await
            .map_err(Self::map_reqwest)?;

        let status = response.status();
        let text = response.text().await.map_err(Self::map_reqwest)?;
        if !status.is_success() {
            return Err(parse_token_error(status.as_u16(), &text));
        }

        let token: TokenResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::Other(format!("invalid token response: {e}")))?;
        let mut credential = Credential::new(token.access_token);
        if let Some(secs) = token.expires_in {
            credential = credential.with_expiry(Utc::now() + ChronoDuration::seconds(secs));
        }
        Ok(credential)
    }
}
