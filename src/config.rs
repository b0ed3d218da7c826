use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::captcha::TurnstileConfig;
use crate::email::{parse_mailbox, GmailConfig, MimeError};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_FROM_EMAIL: &str = "noreply@example.com";
pub const DEFAULT_TO_EMAIL: &str = "contact@example.com";

/// Addresses and policy the relay applies to every submission.
#[derive(Debug, Clone)]
pub struct RelaySettings {
  pub from_email: String,
  pub to_email: String,
  pub captcha_required: bool,
}

impl Default for RelaySettings {
  fn default() -> Self {
    RelaySettings {
      from_email: DEFAULT_FROM_EMAIL.to_string(),
      to_email: DEFAULT_TO_EMAIL.to_string(),
      captcha_required: true,
    }
  }
}

impl RelaySettings {
  /// Both configured addresses must parse as mailboxes before anything is sent.
  pub fn check_addresses(&self) -> Result<(), MimeError> {
    parse_mailbox("From", &self.from_email)?;
    parse_mailbox("To", &self.to_email)?;
    Ok(())
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub bind_addr: String,
  pub allowed_origins: Vec<String>,
  pub relay: RelaySettings,
  pub gmail: GmailConfig,
  pub turnstile: TurnstileConfig,
}

impl AppConfig {
  /// Reads the whole configuration surface from the process environment.
  ///
  /// Credentials are optional here: a deployment without them still starts and
  /// reports the misconfiguration per request.
  pub fn from_env() -> Result<Self> {
    let gmail_defaults = GmailConfig::default();
    let turnstile_defaults = TurnstileConfig::default();

    let timeout_secs = match non_empty_var("GMAIL_HTTP_TIMEOUT_SECS") {
      Some(raw) => raw
        .parse::<u64>()
        .with_context(|| format!("GMAIL_HTTP_TIMEOUT_SECS must be a number of seconds, got {raw:?}"))?,
      None => gmail_defaults.timeout.as_secs(),
    };

    let captcha_required = match non_empty_var("CAPTCHA_REQUIRED") {
      Some(raw) => parse_flag(&raw).with_context(|| format!("CAPTCHA_REQUIRED must be a boolean, got {raw:?}"))?,
      None => true,
    };

    let relay = RelaySettings {
      from_email: non_empty_var("CONTACT_FROM_EMAIL").unwrap_or_else(|| DEFAULT_FROM_EMAIL.to_string()),
      to_email: non_empty_var("CONTACT_TO_EMAIL").unwrap_or_else(|| DEFAULT_TO_EMAIL.to_string()),
      captcha_required,
    };
    relay
      .check_addresses()
      .context("CONTACT_FROM_EMAIL and CONTACT_TO_EMAIL must be valid addresses")?;

    Ok(AppConfig {
      bind_addr: non_empty_var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
      allowed_origins: non_empty_var("ALLOWED_ORIGINS")
        .map(|raw| split_list(&raw))
        .unwrap_or_default(),
      relay,
      gmail: GmailConfig {
        client_id: non_empty_var("GMAIL_CLIENT_ID"),
        client_secret: non_empty_var("GMAIL_CLIENT_SECRET"),
        refresh_token: non_empty_var("GMAIL_REFRESH_TOKEN"),
        token_url: non_empty_var("GMAIL_TOKEN_URL").unwrap_or(gmail_defaults.token_url),
        send_url: non_empty_var("GMAIL_SEND_URL").unwrap_or(gmail_defaults.send_url),
        timeout: Duration::from_secs(timeout_secs),
      },
      turnstile: TurnstileConfig {
        secret_key: non_empty_var("TURNSTILE_SECRET_KEY"),
        verify_url: non_empty_var("TURNSTILE_VERIFY_URL").unwrap_or(turnstile_defaults.verify_url),
        timeout: turnstile_defaults.timeout,
      },
    })
  }
}

fn non_empty_var(key: &str) -> Option<String> {
  env::var(key)
    .ok()
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
}

fn parse_flag(raw: &str) -> Option<bool> {
  match raw.to_ascii_lowercase().as_str() {
    "1" | "true" | "yes" | "on" => Some(true),
    "0" | "false" | "no" | "off" => Some(false),
    _ => None,
  }
}

fn split_list(raw: &str) -> Vec<String> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|item| !item.is_empty())
    .map(str::to_string)
    .collect()
}
