use askama::Template;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::config::RelaySettings;
use crate::email::OutboundMessage;

pub const MISSING_FIELDS: &str = "Missing fields";
pub const INVALID_EMAIL: &str = "Invalid email";

/// Contact form payload as posted by the landing page.
///
/// Every field is optional at this layer so that a missing value surfaces as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
  pub name: Option<String>,
  pub company: Option<String>,
  pub title: Option<String>,
  pub email: Option<String>,
  pub phone: Option<String>,
  pub message: Option<String>,
  /// Honeypot. Hidden from humans, so any value means a bot filled the form.
  pub website: Option<String>,
  #[serde(alias = "turnstileToken")]
  pub captcha_token: Option<String>,
}

fn trimmed(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ContactSubmission {
  pub fn is_honeypot_tripped(&self) -> bool {
    trimmed(&self.website).is_some()
  }

  pub fn captcha_token(&self) -> Option<&str> {
    trimmed(&self.captcha_token)
  }

  /// Produces the typed request, or the client-facing validation message.
  pub fn validate_request(&self) -> Result<ContactRequest, &'static str> {
    let request = ContactRequest::from(self);
    request.validate().map_err(|errors| validation_message(&errors))?;
    Ok(request)
  }
}

fn validation_message(errors: &ValidationErrors) -> &'static str {
  let missing = errors
    .field_errors()
    .values()
    .any(|errs| errs.iter().any(|e| e.code == "length"));
  if missing {
    MISSING_FIELDS
  } else {
    INVALID_EMAIL
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct ContactRequest {
  #[validate(length(min = 1))]
  pub name: String,
  #[validate(length(min = 1))]
  pub company: String,
  #[validate(length(min = 1))]
  pub title: String,
  #[validate(length(min = 1), email)]
  pub email: String,
  #[validate(length(min = 1))]
  pub phone: String,
  #[validate(length(min = 1))]
  pub message: String,
}

impl From<&ContactSubmission> for ContactRequest {
  fn from(submission: &ContactSubmission) -> Self {
    let field = |value: &Option<String>| trimmed(value).unwrap_or_default().to_string();
    ContactRequest {
      name: field(&submission.name),
      company: field(&submission.company),
      title: field(&submission.title),
      email: field(&submission.email),
      phone: field(&submission.phone),
      message: field(&submission.message),
    }
  }
}

/// HTML notification sent to the agency inbox. Askama escapes every field.
#[derive(Template)]
#[template(path = "emails/contact.html")]
struct ContactEmailTemplate<'a> {
  name: &'a str,
  company: &'a str,
  title: &'a str,
  email: &'a str,
  phone: &'a str,
  message: &'a str,
}

impl ContactRequest {
  pub fn subject(&self) -> String {
    format!("New Contact: {} @ {}", self.name, self.company)
  }

  pub fn html_body(&self) -> Result<String, askama::Error> {
    ContactEmailTemplate {
      name: &self.name,
      company: &self.company,
      title: &self.title,
      email: &self.email,
      phone: &self.phone,
      message: &self.message,
    }
    .render()
  }

  pub fn to_outbound(&self, settings: &RelaySettings) -> Result<OutboundMessage, askama::Error> {
    Ok(OutboundMessage::new(
      settings.to_email.clone(),
      settings.from_email.clone(),
      self.email.clone(),
      self.subject(),
      self.html_body()?,
    ))
  }
}

/// What happened to a submission that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
  Sent,
  /// Honeypot tripped; reported to the caller exactly like `Sent`.
  Absorbed,
}
