//! Immutable snapshot of one inbound request.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Method, Uri};

use crate::security::SecurityToken;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Everything the dispatcher may read about a request.
///
/// Built once at the transport boundary; nothing downstream mutates it.
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    query: HashMap<String, String>,
    form: HashMap<String, String>,
    body: Bytes,
    token: Option<Arc<dyn SecurityToken>>,
}

impl RequestContext {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        let query = uri.query().map(decode_params).unwrap_or_default();

        // Form fields are only decoded for urlencoded bodies.
        let form = match headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
            Some(ct) if media_type(ct) == FORM_URLENCODED => {
                decode_params(&String::from_utf8_lossy(&body))
            }
            _ => HashMap::new(),
        };

        Self {
            method,
            uri,
            headers,
            query,
            form,
            body,
            token: None,
        }
    }

    /// Attach the credential resolved for this request.
    pub fn with_token(mut self, token: Option<Arc<dyn SecurityToken>>) -> Self {
        self.token = token;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw `Content-Type` header, if present and readable.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query
    }

    /// Field from a urlencoded request body.
    pub fn form_param(&self, name: &str) -> Option<&str> {
        self.form.get(name).map(String::as_str)
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn token(&self) -> Option<&Arc<dyn SecurityToken>> {
        self.token.as_ref()
    }
}

/// Lower-cased media type with any parameters (`; charset=...`) removed.
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase()
}

/// Decode `a=1&b=2`. Repeated keys keep the last value.
pub(crate) fn decode_params(raw: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(raw.as_bytes())
        .into_owned()
        .collect()
}
