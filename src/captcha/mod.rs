//! Server-side CAPTCHA verification against Cloudflare Turnstile.

mod service;
mod types;

pub use service::{CaptchaVerifier, TurnstileVerifier};
pub use types::{TurnstileConfig, TurnstileResponse, VerificationResult, CAPTCHA_FAILED};
