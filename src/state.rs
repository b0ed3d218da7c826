use std::net::IpAddr;
use std::sync::Arc;

use crate::{
  captcha::TurnstileVerifier,
  config::AppConfig,
  domains::contact::{
    model::{ContactOutcome, ContactSubmission},
    service::{ContactService, ContactServiceError, ContactServiceImpl},
  },
  email::GmailTransport,
};

pub trait AppState: Clone + Send + Sync + 'static {
  fn submit_contact(
    &self,
    submission: ContactSubmission,
    client_address: Option<IpAddr>,
  ) -> impl std::future::Future<Output = Result<ContactOutcome, ContactServiceError>> + Send;
}

#[derive(Clone)]
pub struct SharedAppState {
  pub contact_service: Arc<dyn ContactService>,
}

impl SharedAppState {
  pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
    let verifier = TurnstileVerifier::new(config.turnstile.clone())?;
    let transport = GmailTransport::new(config.gmail.clone())?;
    let contact_service = Arc::new(ContactServiceImpl::new(verifier, transport, config.relay.clone()));

    Ok(Self { contact_service })
  }

  pub fn with_service(contact_service: Arc<dyn ContactService>) -> Self {
    Self { contact_service }
  }
}

impl AppState for SharedAppState {
  async fn submit_contact(
    &self,
    submission: ContactSubmission,
    client_address: Option<IpAddr>,
  ) -> Result<ContactOutcome, ContactServiceError> {
    self.contact_service.handle(submission, client_address).await
  }
}
