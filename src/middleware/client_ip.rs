use std::net::IpAddr;

use axum::http::HeaderMap;

const CF_CONNECTING_IP: &str = "cf-connecting-ip";
const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

fn header_ip(headers: &HeaderMap, name: &str) -> Option<IpAddr> {
  let value = headers.get(name)?.to_str().ok()?;
  // X-Forwarded-For lists the original client first.
  value.split(',').next()?.trim().parse().ok()
}

/// Best guess at the submitter's address: proxy headers first, then the socket peer.
pub fn client_address(headers: &HeaderMap, peer: Option<IpAddr>) -> Option<IpAddr> {
  header_ip(headers, CF_CONNECTING_IP)
    .or_else(|| header_ip(headers, X_FORWARDED_FOR))
    .or_else(|| header_ip(headers, X_REAL_IP))
    .or(peer)
}
