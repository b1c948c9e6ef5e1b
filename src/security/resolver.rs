//! Security token resolution at the transport boundary.

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;

use crate::config::AuthConfig;
use crate::rest::RequestContext;
use crate::security::token::{BasicToken, SecurityToken};

/// Finds the caller's credential in an inbound request.
pub trait TokenResolver: Send + Sync {
    /// Returns `None` when the request carries no usable token.
    fn resolve(&self, ctx: &RequestContext) -> Option<Arc<dyn SecurityToken>>;
}

/// Accepts the token string exactly as the client sent it.
///
/// Lookup order: form body parameter, query parameter, then an
/// `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct PlaintextTokenResolver {
    param: String,
    enabled: bool,
}

impl PlaintextTokenResolver {
    pub fn new(param: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            enabled: true,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            param: config.token_param.clone(),
            enabled: config.allow_plaintext_token,
        }
    }

    fn bearer(ctx: &RequestContext) -> Option<&str> {
        ctx.headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
    }
}

impl TokenResolver for PlaintextTokenResolver {
    fn resolve(&self, ctx: &RequestContext) -> Option<Arc<dyn SecurityToken>> {
        if !self.enabled {
            return None;
        }

        let raw = ctx
            .form_param(&self.param)
            .filter(|v| !v.is_empty())
            .or_else(|| ctx.query_param(&self.param).filter(|v| !v.is_empty()))
            .or_else(|| Self::bearer(ctx).filter(|v| !v.is_empty()))?;

        Some(Arc::new(BasicToken::new(raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::http::{HeaderMap, HeaderValue, Method, Uri};

    fn ctx(uri: &str, headers: HeaderMap, body: &'static str) -> RequestContext {
        RequestContext::new(
            Method::POST,
            uri.parse::<Uri>().unwrap(),
            headers,
            Bytes::from_static(body.as_bytes()),
        )
    }

    #[test]
    fn test_query_param_token() {
        let resolver = PlaintextTokenResolver::new("st");
        let token = resolver
            .resolve(&ctx("/social/rest/people?st=abc", HeaderMap::new(), ""))
            .unwrap();
        assert_eq!(token.serialize(), "abc");
    }

    #[test]
    fn test_form_param_wins_over_query() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "content-type",
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        let resolver = PlaintextTokenResolver::new("st");
        let token = resolver
            .resolve(&ctx("/social/rest/people?st=query", headers, "st=form"))
            .unwrap();
        assert_eq!(token.serialize(), "form");
    }

    #[test]
    fn test_bearer_header_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        let resolver = PlaintextTokenResolver::new("st");
        let token = resolver
            .resolve(&ctx("/social/rest/people", headers, ""))
            .unwrap();
        assert_eq!(token.serialize(), "xyz");
    }

    #[test]
    fn test_missing_or_empty_token() {
        let resolver = PlaintextTokenResolver::new("st");
        assert!(resolver
            .resolve(&ctx("/social/rest/people", HeaderMap::new(), ""))
            .is_none());
        assert!(resolver
            .resolve(&ctx("/social/rest/people?st=", HeaderMap::new(), ""))
            .is_none());
    }

    #[test]
    fn test_disabled_resolver_never_resolves() {
        let resolver = PlaintextTokenResolver::from_config(&AuthConfig {
            allow_plaintext_token: false,
            token_param: "st".into(),
        });
        assert!(resolver
            .resolve(&ctx("/social/rest/people?st=abc", HeaderMap::new(), ""))
            .is_none());
    }
}
