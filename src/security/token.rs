//! Opaque security tokens.

use std::fmt;

use axum::http::Method;

/// An authentication credential asserting caller identity.
///
/// Implementations must keep `serialize` a pure projection of the payload and
/// must never mutate themselves while signing.
pub trait SecurityToken: Send + Sync + fmt::Debug {
    /// String form of the token, suitable for handing back to clients.
    fn serialize(&self) -> String;

    /// Sign an outbound URI for the given HTTP method.
    fn sign_url(&self, uri: &str, method: &Method) -> String;
}

/// Token whose payload is the plain string the client presented.
///
/// Used in trusted deployments where no signature is required, so signing is
/// the identity.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicToken {
    token: String,
}

impl BasicToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl SecurityToken for BasicToken {
    fn serialize(&self) -> String {
        self.token.clone()
    }

    fn sign_url(&self, uri: &str, _method: &Method) -> String {
        uri.to_string()
    }
}

impl fmt::Debug for BasicToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicToken")
            .field("token", &"<redacted>")
            .finish()
    }
}
