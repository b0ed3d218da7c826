use std::net::IpAddr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;

use crate::captcha::types::{TurnstileConfig, TurnstileResponse, VerificationResult};

#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
  fn is_configured(&self) -> bool;
  async fn verify(&self, token: &str, remote_ip: Option<IpAddr>) -> Result<VerificationResult>;
}

#[derive(Serialize)]
struct SiteverifyForm<'a> {
  secret: &'a str,
  response: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  remoteip: Option<String>,
}

pub struct TurnstileVerifier {
  config: TurnstileConfig,
  http: reqwest::Client,
}

impl TurnstileVerifier {
  pub fn new(config: TurnstileConfig) -> Result<Self> {
    let http = reqwest::ClientBuilder::new()
      .timeout(config.timeout)
      .build()
      .context("Failed to build Turnstile HTTP client")?;

    Ok(TurnstileVerifier { config, http })
  }
}

#[async_trait]
impl CaptchaVerifier for TurnstileVerifier {
  fn is_configured(&self) -> bool {
    self.config.secret_key.is_some()
  }

  async fn verify(&self, token: &str, remote_ip: Option<IpAddr>) -> Result<VerificationResult> {
    let secret = self
      .config
      .secret_key
      .as_deref()
      .context("TURNSTILE_SECRET_KEY is not configured")?;

    let form = SiteverifyForm {
      secret,
      response: token,
      remoteip: remote_ip.map(|ip| ip.to_string()),
    };

    let response: TurnstileResponse = self
      .http
      .post(&self.config.verify_url)
      .form(&form)
      .send()
      .await
      .context("Turnstile request failed")?
      .error_for_status()
      .context("Turnstile returned an error status")?
      .json()
      .await
      .context("Failed to parse Turnstile response")?;

    Ok(response.into())
  }
}
