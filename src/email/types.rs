use std::time::Duration;

use serde::Serialize;

pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GMAIL_SEND_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me/messages/send";

#[derive(Debug, Clone)]
pub struct GmailConfig {
  pub client_id: Option<String>,
  pub client_secret: Option<String>,
  pub refresh_token: Option<String>,
  pub token_url: String,
  pub send_url: String,
  pub timeout: Duration,
}

impl Default for GmailConfig {
  fn default() -> Self {
    GmailConfig {
      client_id: None,
      client_secret: None,
      refresh_token: None,
      token_url: GOOGLE_TOKEN_URL.to_string(),
      send_url: GMAIL_SEND_URL.to_string(),
      timeout: Duration::from_secs(30),
    }
  }
}

impl GmailConfig {
  /// All three OAuth2 values, or `None` when any of them is missing.
  pub fn credentials(&self) -> Option<GmailCredentials<'_>> {
    Some(GmailCredentials {
      client_id: self.client_id.as_deref()?,
      client_secret: self.client_secret.as_deref()?,
      refresh_token: self.refresh_token.as_deref()?,
    })
  }

  pub fn missing_credentials(&self) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if self.client_id.is_none() {
      missing.push("GMAIL_CLIENT_ID");
    }
    if self.client_secret.is_none() {
      missing.push("GMAIL_CLIENT_SECRET");
    }
    if self.refresh_token.is_none() {
      missing.push("GMAIL_REFRESH_TOKEN");
    }
    missing
  }
}

#[derive(Debug, Clone, Copy)]
pub struct GmailCredentials<'a> {
  pub client_id: &'a str,
  pub client_secret: &'a str,
  pub refresh_token: &'a str,
}

/// Notification email derived from one contact submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
  pub to: String,
  pub from: String,
  pub reply_to: String,
  pub subject: String,
  pub body_html: String,
}

impl OutboundMessage {
  pub fn new(to: String, from: String, reply_to: String, subject: String, body_html: String) -> Self {
    OutboundMessage {
      to,
      from,
      reply_to,
      subject,
      body_html,
    }
  }
}
