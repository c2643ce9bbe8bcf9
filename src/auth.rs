//! Credential resolution and encoding
//!
//! The publish path carries credentials natively (basic auth or an
//! `Authorization` header); the stream transport cannot carry custom headers,
//! so the subscribe path embeds them in an `auth` query parameter instead.

use base64::prelude::{Engine as _, BASE64_STANDARD};

/// A username/password pair for basic authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Create a new credential pair
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// A resolved credential: either a basic pair or a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    Basic(Credentials),
    Bearer(String),
}

impl Auth {
    /// Resolve the effective credential for one call.
    ///
    /// Precedence: per-call credentials > per-call token > instance-level
    /// credentials > instance-level token > none.
    pub fn resolve(
        call_credentials: Option<&Credentials>,
        call_token: Option<&str>,
        default_credentials: Option<&Credentials>,
        default_token: Option<&str>,
    ) -> Option<Self> {
        call_credentials
            .map(|c| Auth::Basic(c.clone()))
            .or_else(|| call_token.map(|t| Auth::Bearer(t.to_string())))
            .or_else(|| default_credentials.map(|c| Auth::Basic(c.clone())))
            .or_else(|| default_token.map(|t| Auth::Bearer(t.to_string())))
    }

    /// Opaque token for the stream URL's `auth` query parameter.
    ///
    /// Basic pairs are double-encoded: base64 over `Basic <base64(user:pass)>`
    /// with trailing `=` padding stripped. Bearer tokens are encoded once as
    /// `Bearer <token>`, padding kept. This matches the service's query-auth
    /// convention and must not change.
    pub fn query_token(&self) -> String {
        match self {
            Auth::Basic(credentials) => {
                let pair = BASE64_STANDARD
                    .encode(format!("{}:{}", credentials.username, credentials.password));
                let encoded = BASE64_STANDARD.encode(format!("Basic {pair}"));
                encoded.trim_end_matches('=').to_string()
            }
            Auth::Bearer(token) => BASE64_STANDARD.encode(format!("Bearer {token}")),
        }
    }
}
