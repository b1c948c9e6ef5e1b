//! Error rendering.
//!
//! Two paths, neither of which touches the negotiated output converter:
//! - typed handler failures become `"<status line> - <message>"` plain text
//! - faults (and panics) become the generic 500 page, with a trace in debug mode

use std::any::Any;
use std::error::Error as StdError;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::rest::converter::ConverterError;
use crate::rest::negotiation::UnknownFormat;
use crate::rest::outcome::ErrorKind;

pub type BoxError = Box<dyn StdError + Send + Sync>;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const TEXT_HTML: &str = "text/html; charset=utf-8";

/// Message sent when no security token could be resolved.
pub const UNAUTHENTICATED_MESSAGE: &str = "The request did not have a proper security token \
     nor oauth message and unauthenticated requests are not allowed";

/// Anything that went wrong outside the handler's typed outcome.
#[derive(Debug, Error)]
pub enum Fault {
    #[error(transparent)]
    Converter(#[from] ConverterError),

    #[error(transparent)]
    Format(#[from] UnknownFormat),

    #[error(transparent)]
    Handler(BoxError),
}

impl Fault {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Fault::Converter(_) => "converter",
            Fault::Format(_) => "format",
            Fault::Handler(_) => "handler",
        }
    }
}

/// Maps failures to HTTP responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorResponder {
    debug: bool,
}

impl ErrorResponder {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    /// Plain-text response for a typed failure.
    pub fn respond(&self, kind: ErrorKind, message: &str) -> Response {
        let status = kind.status();
        let body = format!("{} - {}", status_line(status), message);
        with_content_type(status, TEXT_PLAIN, body)
    }

    /// Response for a request without a usable security token.
    pub fn unauthenticated(&self) -> Response {
        self.respond(ErrorKind::Unauthorized, UNAUTHENTICATED_MESSAGE)
    }

    /// Generic 500 page for an uncaught failure.
    pub fn fault(&self, error: &(dyn StdError + 'static)) -> Response {
        let trace = self.debug.then(|| render_trace(error));
        self.internal_error(&error.to_string(), trace)
    }

    /// Generic 500 page for a panic payload.
    pub fn panic(&self, payload: Box<dyn Any + Send + 'static>) -> Response {
        let message = panic_message(payload.as_ref());
        let trace = self
            .debug
            .then(|| format!("#0 panicked: {message}"));
        self.internal_error(&message, trace)
    }

    fn internal_error(&self, message: &str, trace: Option<String>) -> Response {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let mut body = format!(
            "<h1>{}</h1>\n{}",
            status_line(status),
            html_escape::encode_text(message)
        );

        if let Some(trace) = trace {
            body.push_str("\n\n<br>\nDebug backtrace:\n<br>\n<pre>\n");
            body.push_str(&html_escape::encode_text(&trace));
            body.push_str("\n</pre>\n");
        }

        with_content_type(status, TEXT_HTML, body)
    }
}

/// `"404 Not Found"` style status line.
pub fn status_line(status: StatusCode) -> String {
    format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    )
}

/// One line per error in the `source()` chain, outermost first.
fn render_trace(error: &(dyn StdError + 'static)) -> String {
    let mut lines = Vec::new();
    let mut current = Some(error);
    while let Some(err) = current {
        lines.push(format!("#{} {}", lines.len(), err));
        current = err.source();
    }
    lines.join("\n")
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

fn with_content_type(status: StatusCode, content_type: &'static str, body: String) -> Response {
    let mut response = (status, body).into_response();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}
