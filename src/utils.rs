pub mod error;

pub const REDACTED: &str = "[redacted]";

/// Replaces every occurrence of the given secret values in `text`.
pub fn redact_secrets<'a>(text: &str, secrets: impl IntoIterator<Item = &'a str>) -> String {
  let mut redacted = text.to_string();
  for secret in secrets {
    if !secret.is_empty() {
      redacted = redacted.replace(secret, REDACTED);
    }
  }
  redacted
}

pub fn init_tracing() {
  use tracing_subscriber::EnvFilter;

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::fmt().with_env_filter(filter).init();
}
