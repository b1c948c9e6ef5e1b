//! Normalized, route-relative view of a request handed to data handlers.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::Method;
use serde_json::Value;

use crate::rest::context::RequestContext;
use crate::rest::converter::{ConverterError, InputConverter, OutputConverter};
use crate::security::SecurityToken;

/// One request as seen by a data handler.
///
/// `path` is relative to the API prefix and keeps the query string.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    query: HashMap<String, String>,
    body: Option<Bytes>,
    token: Arc<dyn SecurityToken>,
    input: Arc<dyn InputConverter>,
    output: Arc<dyn OutputConverter>,
}

impl RequestDescriptor {
    /// Build the descriptor for `ctx`.
    ///
    /// With `unescape_body` set, backslash escaping is stripped from the body.
    pub fn build(
        ctx: &RequestContext,
        api_prefix: &str,
        unescape_body: bool,
        token: Arc<dyn SecurityToken>,
        input: Arc<dyn InputConverter>,
        output: Arc<dyn OutputConverter>,
    ) -> Self {
        let full = ctx
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| ctx.uri().path());
        let path = relative_path(full, api_prefix).to_string();

        let body = if ctx.body().is_empty() {
            None
        } else if unescape_body {
            Some(Bytes::from(strip_slashes(ctx.body())))
        } else {
            Some(ctx.body().clone())
        };

        Self {
            method: ctx.method().clone(),
            path,
            query: ctx.query_params().clone(),
            body,
            token,
            input,
            output,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Route-relative path including any query string, e.g. `/people/@me/@self?format=xml`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Resource collection this request targets (`people`, `activities`, ...).
    pub fn route(&self) -> &str {
        route_segment(&self.path)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Body decoded by the negotiated input converter.
    pub fn parsed_body(&self) -> Result<Option<Value>, ConverterError> {
        self.body
            .as_ref()
            .map(|body| self.input.parse(body))
            .transpose()
    }

    pub fn token(&self) -> &Arc<dyn SecurityToken> {
        &self.token
    }

    pub fn input_converter(&self) -> &Arc<dyn InputConverter> {
        &self.input
    }

    pub fn output_converter(&self) -> &Arc<dyn OutputConverter> {
        &self.output
    }
}

/// Strip `prefix` from a path. Paths outside the prefix come back unchanged.
pub fn relative_path<'a>(path: &'a str, prefix: &str) -> &'a str {
    match path.strip_prefix(prefix) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('?') => rest,
        _ => path,
    }
}

/// First segment of a relative path, without query string.
pub fn route_segment(path: &str) -> &str {
    let path = path.split('?').next().unwrap_or(path);
    let path = path.strip_prefix('/').unwrap_or(path);
    path.split('/').next().unwrap_or(path)
}

/// Undo backslash escaping: `\x` becomes `x`, `\0` becomes NUL and a
/// trailing lone backslash is dropped.
pub fn strip_slashes(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut bytes = input.iter().copied();

    while let Some(b) = bytes.next() {
        if b != b'\\' {
            out.push(b);
            continue;
        }
        match bytes.next() {
            Some(b'0') => out.push(0),
            Some(escaped) => out.push(escaped),
            None => {}
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::converter::{JsonConverter, OutputConverter};
    use crate::security::BasicToken;
    use axum::http::HeaderMap;
    use serde_json::json;

    const PREFIX: &str = "/shindig/social/rest";

    fn build(uri: &str, body: &'static [u8], unescape: bool) -> RequestDescriptor {
        let ctx = RequestContext::new(
            Method::PUT,
            uri.parse().unwrap(),
            HeaderMap::new(),
            Bytes::from_static(body),
        );
        RequestDescriptor::build(
            &ctx,
            PREFIX,
            unescape,
            Arc::new(BasicToken::new("t")),
            Arc::new(JsonConverter),
            Arc::new(JsonConverter),
        )
    }

    #[test]
    fn test_prefix_is_stripped() {
        let descriptor = build("/shindig/social/rest/people/@me/@self?format=xml", b"", false);
        assert_eq!(descriptor.path(), "/people/@me/@self?format=xml");
        assert_eq!(descriptor.route(), "people");
        assert_eq!(descriptor.query_param("format"), Some("xml"));
        assert_eq!(*descriptor.method(), Method::PUT);
    }

    #[test]
    fn test_relative_path_never_contains_prefix() {
        for suffix in ["", "/", "/people", "/social/rest/people", "?x=1", "/appdata/@me/@self/app"] {
            let uri = format!("{PREFIX}{suffix}");
            let rel = relative_path(&uri, PREFIX);
            assert_eq!(rel, suffix);
            assert!(!rel.starts_with(PREFIX));
        }
        assert_eq!(relative_path("/shindig/social/restful", PREFIX), "/shindig/social/restful");
        assert_eq!(relative_path("/other/path", PREFIX), "/other/path");
    }

    #[test]
    fn test_route_segment() {
        assert_eq!(route_segment("/activities/@me/@friends"), "activities");
        assert_eq!(route_segment("/appdata?fields=a"), "appdata");
        assert_eq!(route_segment("/messages"), "messages");
        assert_eq!(route_segment(""), "");
        assert_eq!(route_segment("/"), "");
    }

    #[test]
    fn test_body_presence() {
        assert!(build("/shindig/social/rest/people", b"", false).body().is_none());

        let descriptor = build("/shindig/social/rest/people", br#"{"id":"1"}"#, false);
        assert_eq!(descriptor.body().unwrap().as_ref(), br#"{"id":"1"}"#);
        assert_eq!(descriptor.parsed_body().unwrap(), Some(json!({"id": "1"})));
    }

    #[test]
    fn test_body_unescaped_only_when_enabled() {
        let raw: &[u8] = br#"{\"id\":\"1\"}"#;
        let kept = build("/shindig/social/rest/people", raw, false);
        assert_eq!(kept.body().unwrap().as_ref(), raw);
        assert!(kept.parsed_body().is_err());

        let fixed = build("/shindig/social/rest/people", raw, true);
        assert_eq!(fixed.parsed_body().unwrap(), Some(json!({"id": "1"})));
    }

    #[test]
    fn test_strip_slashes() {
        assert_eq!(strip_slashes(br"O\'Reilly"), b"O'Reilly");
        assert_eq!(strip_slashes(br"a\\b"), br"a\b");
        assert_eq!(strip_slashes(br"nul\0byte"), b"nul\0byte");
        assert_eq!(strip_slashes(br"trailing\"), b"trailing");
        assert_eq!(strip_slashes(b"plain"), b"plain");
    }

    #[test]
    fn test_json_output_uses_descriptor_fields() {
        let descriptor = build("/shindig/social/rest/people/@me/@self?fields=name", b"", false);
        let body = JsonConverter
            .render(&json!({"id": "1", "name": "Jane", "age": 3}), &descriptor)
            .unwrap();
        let rendered: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(rendered, json!({"entry": {"id": "1", "name": "Jane"}}));
    }
}
