use axum::{
  http::{header, HeaderValue, Method},
  response::Json,
  routing::get,
  Router,
};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::{domains::contact::rest::contact_routes, state::SharedAppState};

pub fn create_app(state: SharedAppState, allowed_origins: &[String]) -> Router {
  let router = Router::new()
    .route("/health", get(health_handler))
    .nest("/api", contact_routes())
    .with_state(state);

  match cors_layer(allowed_origins) {
    Some(cors) => router.layer(cors),
    None => router,
  }
}

fn cors_layer(allowed_origins: &[String]) -> Option<CorsLayer> {
  let origins: Vec<HeaderValue> = allowed_origins
    .iter()
    .filter_map(|origin| match origin.parse() {
      Ok(value) => Some(value),
      Err(_) => {
        tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
        None
      }
    })
    .collect();

  if origins.is_empty() {
    return None;
  }

  Some(
    CorsLayer::new()
      .allow_origin(AllowOrigin::list(origins))
      .allow_methods([Method::POST, Method::OPTIONS])
      .allow_headers([header::CONTENT_TYPE]),
  )
}

pub async fn health_handler() -> Json<Value> {
  Json(json!({ "ok": true }))
}
