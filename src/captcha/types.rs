use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const TURNSTILE_VERIFY_URL: &str = "https://challenges.cloudflare.com/turnstile/v0/siteverify";
pub const CAPTCHA_FAILED: &str = "captcha_failed";

#[derive(Debug, Clone)]
pub struct TurnstileConfig {
  pub secret_key: Option<String>,
  pub verify_url: String,
  pub timeout: Duration,
}

impl Default for TurnstileConfig {
  fn default() -> Self {
    TurnstileConfig {
      secret_key: None,
      verify_url: TURNSTILE_VERIFY_URL.to_string(),
      timeout: Duration::from_secs(10),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
  pub ok: bool,
  pub reason: Option<String>,
}

impl VerificationResult {
  pub fn passed() -> Self {
    VerificationResult { ok: true, reason: None }
  }

  pub fn rejected(reason: impl Into<String>) -> Self {
    VerificationResult {
      ok: false,
      reason: Some(reason.into()),
    }
  }
}

/// Body returned by the `siteverify` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TurnstileResponse {
  pub success: bool,
  #[serde(rename = "error-codes", default)]
  pub error_codes: Vec<String>,
}

impl From<TurnstileResponse> for VerificationResult {
  fn from(response: TurnstileResponse) -> Self {
    if response.success {
      return VerificationResult::passed();
    }
    let reason = response
      .error_codes
      .into_iter()
      .find(|code| !code.is_empty())
      .unwrap_or_else(|| CAPTCHA_FAILED.to_string());
    VerificationResult::rejected(reason)
  }
}
