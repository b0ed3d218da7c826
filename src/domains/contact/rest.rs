use std::net::SocketAddr;

use axum::{
  body::to_bytes,
  extract::{ConnectInfo, Request, State},
  response::Json,
  routing::{post, Router},
};
use serde_json::{json, Value};

use super::model::{ContactOutcome, ContactSubmission};
use crate::{
  middleware::client_ip::client_address,
  state::{AppState, SharedAppState},
  utils::error::AppError,
};

const MAX_BODY_BYTES: usize = 64 * 1024;

pub fn contact_routes() -> Router<SharedAppState> {
  Router::new().route("/contact", post(contact_handler))
}

pub async fn contact_handler(State(state): State<SharedAppState>, request: Request) -> Result<Json<Value>, AppError> {
  let (parts, body) = request.into_parts();
  let peer = parts
    .extensions
    .get::<ConnectInfo<SocketAddr>>()
    .map(|ConnectInfo(addr)| addr.ip());
  let client = client_address(&parts.headers, peer);

  let bytes = to_bytes(body, MAX_BODY_BYTES)
    .await
    .map_err(|_| AppError::bad_request("Invalid request body"))?;
  let submission: ContactSubmission = serde_json::from_slice(&bytes)?;

  match state.submit_contact(submission, client).await? {
    ContactOutcome::Sent | ContactOutcome::Absorbed => Ok(Json(json!({ "ok": true }))),
  }
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use mockall::predicate;
  use serde_json::{json, Value};

  use crate::{
    captcha::VerificationResult,
    test_support::{
      app_with_mocks, configured_transport, jane_submission, passing_verifier, post_json, relay_settings, send,
      MockTransport, MockVerifier,
    },
    utils::error::GENERIC_CONFIGURATION_ERROR,
  };

  fn json_body(body: &[u8]) -> Value {
    serde_json::from_slice(body).expect("deserialize response")
  }

  #[tokio::test]
  async fn contact_endpoint_relays_submission() {
    let mut transport = configured_transport();
    transport.expect_send_raw().times(1).returning(|_| Ok(()));
    let app = app_with_mocks(passing_verifier(), transport, relay_settings());

    let (status, body) = post_json(app, "/api/contact", &jane_submission()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!({ "ok": true }));
  }

  #[tokio::test]
  async fn contact_endpoint_absorbs_honeypot() {
    let app = app_with_mocks(MockVerifier::new(), MockTransport::new(), relay_settings());
    let mut submission = jane_submission();
    submission.website = Some("bot.example".to_string());

    let (status, body) = post_json(app, "/api/contact", &submission).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!({ "ok": true }));
  }

  #[tokio::test]
  async fn contact_endpoint_missing_fields() {
    let app = app_with_mocks(MockVerifier::new(), MockTransport::new(), relay_settings());

    let (status, body) = post_json(app, "/api/contact", &json!({ "name": "Jane Doe" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body), json!({ "ok": false, "error": "Missing fields" }));
  }

  #[tokio::test]
  async fn contact_endpoint_rejected_captcha() {
    let mut verifier = MockVerifier::new();
    verifier.expect_is_configured().return_const(true);
    verifier
      .expect_verify()
      .returning(|_, _| Ok(VerificationResult::rejected("invalid-input-response")));
    let mut transport = configured_transport();
    transport.expect_send_raw().never();
    let app = app_with_mocks(verifier, transport, relay_settings());

    let (status, body) = post_json(app, "/api/contact", &jane_submission()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body), json!({ "ok": false, "error": "invalid-input-response" }));
  }

  #[tokio::test]
  async fn contact_endpoint_accepts_turnstile_token_and_forwarded_ip() {
    let mut verifier = MockVerifier::new();
    verifier.expect_is_configured().return_const(true);
    verifier
      .expect_verify()
      .with(predicate::eq("cf-token"), predicate::eq(Some("198.51.100.23".parse::<std::net::IpAddr>().unwrap())))
      .times(1)
      .returning(|_, _| Ok(VerificationResult::passed()));
    let mut transport = configured_transport();
    transport.expect_send_raw().times(1).returning(|_| Ok(()));
    let app = app_with_mocks(verifier, transport, relay_settings());

    let payload = json!({
      "name": "Jane Doe",
      "company": "Acme",
      "title": "CEO",
      "email": "jane@acme.com",
      "phone": "555-1234",
      "message": "Hello",
      "website": "",
      "turnstileToken": "cf-token",
    });
    let request = Request::builder()
      .method("POST")
      .uri("/api/contact")
      .header("content-type", "application/json")
      .header("x-forwarded-for", "198.51.100.23, 10.0.0.1")
      .body(Body::from(payload.to_string()))
      .unwrap();

    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
  }

  #[tokio::test]
  async fn contact_endpoint_unconfigured_is_server_error() {
    let mut transport = MockTransport::new();
    transport.expect_is_configured().return_const(false);
    transport.expect_send_raw().never();
    let mut verifier = MockVerifier::new();
    verifier.expect_is_configured().return_const(true);
    verifier.expect_verify().never();
    let app = app_with_mocks(verifier, transport, relay_settings());

    let (status, body) = post_json(app, "/api/contact", &jane_submission()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(&body), json!({ "ok": false, "error": GENERIC_CONFIGURATION_ERROR }));
  }

  #[tokio::test]
  async fn contact_endpoint_provider_failure_returns_hint() {
    let mut transport = configured_transport();
    transport
      .expect_send_raw()
      .returning(|_| Err(crate::email::MailSendError::new("invalid_grant", "Token refresh failed")));
    let app = app_with_mocks(passing_verifier(), transport, relay_settings());

    let (status, body) = post_json(app, "/api/contact", &jane_submission()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(&body), json!({ "ok": false, "error": "invalid_grant" }));
  }

  #[tokio::test]
  async fn contact_endpoint_malformed_json() {
    let app = app_with_mocks(MockVerifier::new(), MockTransport::new(), relay_settings());
    let request = Request::builder()
      .method("POST")
      .uri("/api/contact")
      .header("content-type", "application/json")
      .body(Body::from("{\"name\": "))
      .unwrap();

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body)["ok"], false);
  }

  #[tokio::test]
  async fn contact_endpoint_rejects_get() {
    let app = app_with_mocks(MockVerifier::new(), MockTransport::new(), relay_settings());
    let request = Request::builder()
      .method("GET")
      .uri("/api/contact")
      .body(Body::empty())
      .unwrap();

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert!(body.is_empty());
  }
}
