//! `EG1-HMAC-SHA256` request signing.
//!
//! The authorization header binds the client and access tokens, a UTC
//! timestamp, and a random nonce to one request. The signature is an
//! HMAC-SHA256 over the request line, keyed by an HMAC of the timestamp
//! under the client secret.

use alb_config::Credentials;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use url::Url;
use uuid::Uuid;

use crate::error::ApiError;

type HmacSha256 = Hmac<Sha256>;

/// Name of the signing algorithm carried in the header.
pub const ALGORITHM: &str = "EG1-HMAC-SHA256";

const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H:%M:%S+0000";

/// The parts of a request that are covered by the signature.
#[derive(Debug, Clone, Copy)]
pub struct SignedRequest<'a> {
    /// Upper-case HTTP method.
    pub method: &'a str,
    /// Absolute request URL.
    pub url: &'a Url,
    /// Request body; empty for reads.
    pub body: &'a [u8],
}

/// Produces authorization headers for one set of credentials.
#[derive(Clone)]
pub struct EdgeGridSigner {
    client_token: String,
    client_secret: String,
    access_token: String,
    max_body: usize,
}

impl std::fmt::Debug for EdgeGridSigner {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("EdgeGridSigner")
            .field("client_token", &self.client_token)
            .field("max_body", &self.max_body)
            .finish_non_exhaustive()
    }
}

impl EdgeGridSigner {
    /// Creates a signer from parsed credentials.
    #[must_use]
    pub fn new(credentials: &Credentials) -> Self {
        Self {
            client_token: credentials.client_token.clone(),
            client_secret: credentials.client_secret.clone(),
            access_token: credentials.access_token.clone(),
            max_body: credentials.max_body,
        }
    }

    /// Signs `request` with the current time and a fresh nonce.
    ///
    /// # Errors
    /// Returns [`ApiError::Signing`] if the request URL has no host.
    pub fn authorization(&self, request: &SignedRequest<'_>) -> Result<String, ApiError> {
        let nonce = Uuid::new_v4().to_string();
        self.authorization_at(request, &timestamp(Utc::now()), &nonce)
    }

    /// Signs `request` with an explicit timestamp and nonce.
    ///
    /// # Errors
    /// Returns [`ApiError::Signing`] if the request URL has no host.
    pub fn authorization_at(
        &self,
        request: &SignedRequest<'_>,
        timestamp: &str,
        nonce: &str,
    ) -> Result<String, ApiError> {
        let prefix = format!(
            "{ALGORITHM} client_token={};access_token={};timestamp={timestamp};nonce={nonce};",
            self.client_token, self.access_token,
        );
        let data = signing_data(request, &prefix, self.max_body)?;
        let signing_key = hmac_base64(self.client_secret.as_bytes(), timestamp.as_bytes())?;
        let signature = hmac_base64(signing_key.as_bytes(), data.as_bytes())?;
        Ok(format!("{prefix}signature={signature}"))
    }
}

/// Formats `now` the way the authorization header expects.
#[must_use]
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// Base64 SHA-256 of a POST body, truncated to `max_body` bytes.
///
/// Other methods and empty bodies hash to the empty string.
#[must_use]
pub fn content_hash(method: &str, body: &[u8], max_body: usize) -> String {
    if !method.eq_ignore_ascii_case("POST") || body.is_empty() {
        return String::new();
    }
    let signed = body.get(..max_body).unwrap_or(body);
    STANDARD.encode(Sha256::digest(signed))
}

fn signing_data(
    request: &SignedRequest<'_>,
    prefix: &str,
    max_body: usize,
) -> Result<String, ApiError> {
    let url = request.url;
    let host = url.host_str().ok_or_else(|| ApiError::Signing {
        message: format!("{url} has no host"),
    })?;
    let authority = url
        .port()
        .map_or_else(|| host.to_owned(), |port| format!("{host}:{port}"));
    let target = url
        .query()
        .map_or_else(|| url.path().to_owned(), |query| format!("{}?{query}", url.path()));
    let fields = [
        request.method.to_ascii_uppercase(),
        url.scheme().to_owned(),
        authority,
        target,
        String::new(),
        content_hash(request.method, request.body, max_body),
        prefix.to_owned(),
    ];
    Ok(fields.join("\t"))
}

fn hmac_base64(key: &[u8], data: &[u8]) -> Result<String, ApiError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|error| ApiError::Signing {
        message: error.to_string(),
    })?;
    mac.update(data);
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
