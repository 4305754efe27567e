use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{HeaderMap, request::Parts},
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Address of the client that made the request, preferring the first hop
/// recorded in `X-Forwarded-For` over the socket peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts.extensions.get::<ConnectInfo<SocketAddr>>().map(|info| info.0);
        client_ip(&parts.headers, peer)
            .map(ClientIp)
            .ok_or_else(|| AppError::BadRequest("Unable to determine the client address.".into()))
    }
}

fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match forwarded {
        Some(ip) => Some(ip.to_string()),
        None => peer.map(|addr| addr.ip().to_string()),
    }
}

const JSON: &str = "json";

/// `?format=` query parameter.
#[derive(Debug, Default, Deserialize)]
pub struct FormatParam {
    pub format: Option<String>,
}

impl FormatParam {
    /// JSON is the only renderer; asking for anything else is a 404.
    pub fn ensure_supported(&self) -> AppResult<()> {
        match self.format.as_deref() {
            None | Some(JSON) => Ok(()),
            Some(_) => Err(AppError::NotFound),
        }
    }
}

/// Parses an `{id}` path segment that may carry a format suffix, such as
/// `12` or `12.json`.
pub fn suffixed_id(segment: &str) -> AppResult<i32> {
    let id = match segment.split_once('.') {
        None => segment,
        Some((id, JSON)) => id,
        Some(_) => return Err(AppError::NotFound),
    };
    id.parse().map_err(|_| AppError::NotFound)
}
