use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
  body::{Body, Bytes},
  http::{Request, StatusCode},
  Router,
};
use serde::Serialize;
use tower::ServiceExt;

use crate::{
  app::create_app,
  captcha::{CaptchaVerifier, VerificationResult},
  config::RelaySettings,
  domains::contact::{
    model::ContactSubmission,
    service::{ContactService, ContactServiceImpl},
  },
  email::{MailSendError, MailTransport},
  state::SharedAppState,
};

mockall::mock! {
  pub Verifier {}

  #[async_trait]
  impl CaptchaVerifier for Verifier {
    fn is_configured(&self) -> bool;
    async fn verify(&self, token: &str, remote_ip: Option<IpAddr>) -> anyhow::Result<VerificationResult>;
  }
}

mockall::mock! {
  pub Transport {}

  #[async_trait]
  impl MailTransport for Transport {
    fn is_configured(&self) -> bool;
    async fn send_raw(&self, raw: &str) -> Result<(), MailSendError>;
  }
}

pub fn relay_settings() -> RelaySettings {
  RelaySettings {
    from_email: "noreply@agency.example".to_string(),
    to_email: "contact@agency.example".to_string(),
    captcha_required: true,
  }
}

pub fn jane_submission() -> ContactSubmission {
  ContactSubmission {
    name: Some("Jane Doe".to_string()),
    company: Some("Acme".to_string()),
    title: Some("CEO".to_string()),
    email: Some("jane@acme.com".to_string()),
    phone: Some("555-1234".to_string()),
    message: Some("Hello".to_string()),
    website: None,
    captcha_token: Some("turnstile-token".to_string()),
  }
}

/// Verifier whose secret is configured and which accepts every token.
pub fn passing_verifier() -> MockVerifier {
  let mut verifier = MockVerifier::new();
  verifier.expect_is_configured().return_const(true);
  verifier
    .expect_verify()
    .returning(|_, _| Ok(VerificationResult::passed()));
  verifier
}

/// Transport with credentials present; sending is left to the caller to expect.
pub fn configured_transport() -> MockTransport {
  let mut transport = MockTransport::new();
  transport.expect_is_configured().return_const(true);
  transport
}

pub fn app_with_mocks(verifier: MockVerifier, transport: MockTransport, settings: RelaySettings) -> Router {
  let service: Arc<dyn ContactService> = Arc::new(ContactServiceImpl::new(verifier, transport, settings));
  create_app(SharedAppState::with_service(service), &[])
}

pub async fn post_json<T: Serialize>(app: Router, uri: &str, body: &T) -> (StatusCode, Bytes) {
  let request = Request::builder()
    .method("POST")
    .uri(uri)
    .header("content-type", "application/json")
    .body(Body::from(serde_json::to_vec(body).expect("serialize request body")))
    .expect("build request");

  send(app, request).await
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Bytes) {
  let response = app.oneshot(request).await.expect("handle request");
  let status = response.status();
  let body = axum::body::to_bytes(response.into_body(), usize::MAX)
    .await
    .expect("read response body");
  (status, body)
}

/// Serves `router` on an ephemeral localhost port and returns its base URL.
pub async fn spawn_stub_server(router: Router) -> String {
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
    .await
    .expect("bind stub listener");
  let addr = listener.local_addr().expect("stub address");
  tokio::spawn(async move {
    axum::serve(listener, router).await.expect("serve stub");
  });
  format!("http://{}", addr)
}
