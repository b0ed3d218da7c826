use std::fmt;

use anyhow::{Context, Result};
use async_trait::async_trait;
use oauth2::{
  basic::{BasicClient, BasicErrorResponse},
  AuthType, ClientId, ClientSecret, RefreshToken, RequestTokenError, TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};

use crate::email::types::{GmailConfig, GmailCredentials};
use crate::utils::redact_secrets;

pub const SEND_FAILED: &str = "send_failed";
pub const OAUTH_REFRESH_FAILED: &str = "oauth_refresh_failed";

/// Failure reported by a mail provider.
///
/// `hint` is safe to show to the submitter; `detail` is for operators only.
#[derive(Debug, Clone)]
pub struct MailSendError {
  pub hint: String,
  pub detail: String,
}

impl MailSendError {
  pub fn new(hint: impl Into<String>, detail: impl Into<String>) -> Self {
    Self {
      hint: hint.into(),
      detail: detail.into(),
    }
  }
}

impl std::error::Error for MailSendError {}

impl fmt::Display for MailSendError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({})", self.hint, self.detail)
  }
}

#[async_trait]
pub trait MailTransport: Send + Sync {
  fn is_configured(&self) -> bool;
  /// Sends an RFC-2822 message already encoded as unpadded base64url.
  async fn send_raw(&self, raw: &str) -> Result<(), MailSendError>;
}

#[derive(Serialize)]
struct GmailSendRequest<'a> {
  raw: &'a str,
}

#[derive(Debug, Deserialize)]
struct GmailErrorEnvelope {
  error: GmailErrorBody,
}

#[derive(Debug, Deserialize)]
struct GmailErrorBody {
  message: Option<String>,
  status: Option<String>,
}

/// Pulls a short description out of a Gmail API error payload.
fn provider_hint(body: &str) -> Option<String> {
  let envelope: GmailErrorEnvelope = serde_json::from_str(body).ok()?;
  envelope
    .error
    .message
    .or(envelope.error.status)
    .map(|hint| hint.trim().to_string())
    .filter(|hint| !hint.is_empty())
}

pub struct GmailTransport {
  config: GmailConfig,
  http: reqwest::Client,
}

impl GmailTransport {
  pub fn new(config: GmailConfig) -> Result<Self> {
    let http = reqwest::ClientBuilder::new()
      .redirect(reqwest::redirect::Policy::none())
      .timeout(config.timeout)
      .build()
      .context("Failed to build Gmail HTTP client")?;

    let missing = config.missing_credentials();
    if !missing.is_empty() {
      tracing::warn!("Gmail credentials incomplete, contact mail is disabled: missing {}", missing.join(", "));
    }

    Ok(GmailTransport { config, http })
  }

  fn secrets<'a>(&'a self, access_token: Option<&'a str>) -> Vec<&'a str> {
    let mut secrets: Vec<&str> = [
      self.config.client_id.as_deref(),
      self.config.client_secret.as_deref(),
      self.config.refresh_token.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect();
    secrets.extend(access_token);
    secrets
  }

  fn failure(&self, hint: &str, detail: &str, access_token: Option<&str>) -> MailSendError {
    let secrets = self.secrets(access_token);
    MailSendError::new(
      redact_secrets(hint, secrets.iter().copied()),
      redact_secrets(detail, secrets.iter().copied()),
    )
  }

  async fn fetch_access_token(&self, creds: GmailCredentials<'_>) -> Result<String, MailSendError> {
    let token_url = TokenUrl::new(self.config.token_url.clone())
      .map_err(|e| self.failure(OAUTH_REFRESH_FAILED, &format!("Invalid token URL: {}", e), None))?;

    let client = BasicClient::new(ClientId::new(creds.client_id.to_string()))
      .set_client_secret(ClientSecret::new(creds.client_secret.to_string()))
      .set_auth_type(AuthType::RequestBody)
      .set_token_uri(token_url);

    let token = client
      .exchange_refresh_token(&RefreshToken::new(creds.refresh_token.to_string()))
      .request_async(&self.http)
      .await
      .map_err(|e| self.refresh_failure(e))?;

    Ok(token.access_token().secret().to_string())
  }

  fn refresh_failure<RE>(&self, err: RequestTokenError<RE, BasicErrorResponse>) -> MailSendError
  where
    RE: std::error::Error + 'static,
  {
    let hint = match &err {
      RequestTokenError::ServerResponse(response) => response.error().to_string(),
      _ => OAUTH_REFRESH_FAILED.to_string(),
    };
    self.failure(&hint, &format!("Token refresh failed: {:?}", err), None)
  }
}

#[async_trait]
impl MailTransport for GmailTransport {
  fn is_configured(&self) -> bool {
    self.config.credentials().is_some()
  }

  async fn send_raw(&self, raw: &str) -> Result<(), MailSendError> {
    let creds = self
      .config
      .credentials()
      .ok_or_else(|| MailSendError::new(SEND_FAILED, "Gmail credentials are not configured"))?;

    let access_token = self.fetch_access_token(creds).await?;

    let response = self
      .http
      .post(&self.config.send_url)
      .bearer_auth(&access_token)
      .json(&GmailSendRequest { raw })
      .send()
      .await
      .map_err(|e| self.failure(SEND_FAILED, &format!("Gmail request failed: {}", e), Some(access_token.as_str())))?;

    let status = response.status();
    if status.is_success() {
      return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    let hint = provider_hint(&body).unwrap_or_else(|| SEND_FAILED.to_string());
    Err(self.failure(
      &hint,
      &format!("Gmail send returned {}: {}", status, body),
      Some(access_token.as_str()),
    ))
  }
}
