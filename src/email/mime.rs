use std::fmt;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use lettre::{
  message::{header::ContentType, Mailbox},
  Message,
};

use crate::email::types::OutboundMessage;

#[derive(Debug)]
pub enum MimeError {
  InvalidAddress { header: &'static str, value: String },
  Build(String),
}

impl std::error::Error for MimeError {}

impl fmt::Display for MimeError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      MimeError::InvalidAddress { header, value } => write!(f, "Invalid {} address: {}", header, value),
      MimeError::Build(msg) => write!(f, "Failed to build message: {}", msg),
    }
  }
}

pub fn parse_mailbox(header: &'static str, value: &str) -> Result<Mailbox, MimeError> {
  value.parse().map_err(|_| MimeError::InvalidAddress {
    header,
    value: value.to_string(),
  })
}

/// Renders the message as RFC-2822 bytes with an HTML body.
pub fn build_mime_message(message: &OutboundMessage) -> Result<Vec<u8>, MimeError> {
  let email = Message::builder()
    .from(parse_mailbox("From", &message.from)?)
    .to(parse_mailbox("To", &message.to)?)
    .reply_to(parse_mailbox("Reply-To", &message.reply_to)?)
    .message_id(None)
    .subject(message.subject.as_str())
    .header(ContentType::TEXT_HTML)
    .body(message.body_html.clone())
    .map_err(|e| MimeError::Build(e.to_string()))?;

  Ok(email.formatted())
}

/// Gmail's `raw` encoding: URL-safe alphabet, no padding.
pub fn encode_base64url(raw: &[u8]) -> String {
  URL_SAFE_NO_PAD.encode(raw)
}
