use std::error::Error;
use std::net::IpAddr;

use async_trait::async_trait;

use super::model::{ContactOutcome, ContactRequest, ContactSubmission, INVALID_EMAIL};
use crate::{
  captcha::{CaptchaVerifier, CAPTCHA_FAILED},
  config::RelaySettings,
  email::{build_mime_message, encode_base64url, MailTransport, MimeError},
};

pub const CAPTCHA_MISSING: &str = "captcha_missing";
pub const CAPTCHA_UNAVAILABLE: &str = "captcha_unavailable";
pub const MESSAGE_BUILD_FAILED: &str = "message_build_failed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactServiceError {
  ValidationError(String),
  AbuseCheckError(String),
  ConfigurationError(String),
  SendError(String),
}

impl Error for ContactServiceError {}

impl std::fmt::Display for ContactServiceError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ContactServiceError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
      ContactServiceError::AbuseCheckError(reason) => write!(f, "Abuse Check Failed: {}", reason),
      ContactServiceError::ConfigurationError(msg) => write!(f, "Configuration Error: {}", msg),
      ContactServiceError::SendError(hint) => write!(f, "Send Error: {}", hint),
    }
  }
}

impl From<MimeError> for ContactServiceError {
  fn from(err: MimeError) -> Self {
    match err {
      MimeError::InvalidAddress { header: "Reply-To", .. } => ContactServiceError::ValidationError(INVALID_EMAIL.to_string()),
      MimeError::InvalidAddress { .. } => ContactServiceError::ConfigurationError(err.to_string()),
      MimeError::Build(msg) => {
        tracing::error!("Failed to build contact email: {}", msg);
        ContactServiceError::SendError(MESSAGE_BUILD_FAILED.to_string())
      }
    }
  }
}

impl From<askama::Error> for ContactServiceError {
  fn from(err: askama::Error) -> Self {
    tracing::error!("Failed to render contact email: {}", err);
    ContactServiceError::SendError(MESSAGE_BUILD_FAILED.to_string())
  }
}

#[async_trait]
pub trait ContactService: Send + Sync {
  async fn handle(
    &self,
    submission: ContactSubmission,
    client_address: Option<IpAddr>,
  ) -> Result<ContactOutcome, ContactServiceError>;
}

pub struct ContactServiceImpl<V, M> {
  verifier: V,
  transport: M,
  settings: RelaySettings,
}

impl<V, M> ContactServiceImpl<V, M>
where
  V: CaptchaVerifier,
  M: MailTransport,
{
  pub fn new(verifier: V, transport: M, settings: RelaySettings) -> Self {
    Self {
      verifier,
      transport,
      settings,
    }
  }

  fn captcha_enabled(&self) -> bool {
    self.settings.captcha_required || self.verifier.is_configured()
  }

  /// Runs before any network call so a broken deployment never half-processes a request.
  fn check_configuration(&self) -> Result<(), ContactServiceError> {
    if !self.transport.is_configured() {
      return Err(ContactServiceError::ConfigurationError(
        "Gmail OAuth credentials are not configured".to_string(),
      ));
    }

    self
      .settings
      .check_addresses()
      .map_err(|e| ContactServiceError::ConfigurationError(e.to_string()))?;

    if self.settings.captcha_required && !self.verifier.is_configured() {
      return Err(ContactServiceError::ConfigurationError(
        "CAPTCHA is required but TURNSTILE_SECRET_KEY is not configured".to_string(),
      ));
    }

    Ok(())
  }

  async fn verify_captcha(&self, token: Option<&str>, client_address: Option<IpAddr>) -> Result<(), ContactServiceError> {
    let token = token.ok_or_else(|| {
      tracing::warn!(client = ?client_address, "Contact submission without CAPTCHA token");
      ContactServiceError::AbuseCheckError(CAPTCHA_MISSING.to_string())
    })?;

    let result = self.verifier.verify(token, client_address).await.map_err(|e| {
      tracing::error!("CAPTCHA verification unavailable: {:?}", e);
      ContactServiceError::AbuseCheckError(CAPTCHA_UNAVAILABLE.to_string())
    })?;

    if !result.ok {
      let reason = result.reason.unwrap_or_else(|| CAPTCHA_FAILED.to_string());
      tracing::warn!(client = ?client_address, reason = %reason, "CAPTCHA rejected");
      return Err(ContactServiceError::AbuseCheckError(reason));
    }

    Ok(())
  }

  async fn dispatch(&self, request: &ContactRequest) -> Result<(), ContactServiceError> {
    let outbound = request.to_outbound(&self.settings)?;
    let raw = encode_base64url(&build_mime_message(&outbound)?);

    self.transport.send_raw(&raw).await.map_err(|e| {
      tracing::error!(hint = %e.hint, "Gmail send failed: {}", e.detail);
      ContactServiceError::SendError(e.hint)
    })
  }
}

#[async_trait]
impl<V, M> ContactService for ContactServiceImpl<V, M>
where
  V: CaptchaVerifier,
  M: MailTransport,
{
  async fn handle(
    &self,
    submission: ContactSubmission,
    client_address: Option<IpAddr>,
  ) -> Result<ContactOutcome, ContactServiceError> {
    if submission.is_honeypot_tripped() {
      tracing::info!(client = ?client_address, "Honeypot tripped, absorbing submission");
      return Ok(ContactOutcome::Absorbed);
    }

    let request = submission
      .validate_request()
      .map_err(|msg| ContactServiceError::ValidationError(msg.to_string()))?;

    self.check_configuration()?;

    if self.captcha_enabled() {
      self.verify_captcha(submission.captcha_token(), client_address).await?;
    }

    self.dispatch(&request).await?;

    tracing::info!(company = %request.company, "Contact submission relayed");
    Ok(ContactOutcome::Sent)
  }
}
