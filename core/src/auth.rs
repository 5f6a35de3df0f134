//! Token authentication.
//!
//! # Design
//! YApi authenticates with a per-project token rather than a header: GET
//! calls put it in the query string and POST calls in the JSON body. The
//! services read it from here when they build each request, and nothing else
//! in the crate stores a copy. `Debug` never prints it.

use std::fmt;

/// Holds the project token sent with every request.
///
/// The token is fixed when the client is built. It is never validated
/// locally; the remote service rejects bad tokens through the envelope's
/// `errcode`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Authentication {
    token: String,
}

impl Authentication {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }
}

impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.has_token() { "<redacted>" } else { "<empty>" };
        f.debug_struct("Authentication").field("token", &token).finish()
    }
}
