//! Wire format negotiation.
//!
//! The request body and the response body are negotiated independently:
//!
//! - input: `Content-Type` decides; the `format` parameter is consulted only
//!   when no `Content-Type` was sent, and an unrecognized value is an error.
//! - output: the `format` parameter decides (form body, then query); an
//!   unrecognized value falls back to `Content-Type`, and nothing at all
//!   means json.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::rest::context::{media_type, RequestContext};

/// Name of the parameter carrying an explicit format.
pub const FORMAT_PARAM: &str = "format";

/// Wire formats understood by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    #[default]
    Json,
    Xml,
    Atom,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Json, Format::Xml, Format::Atom];

    /// Match a `format` parameter value. Case and surrounding whitespace are ignored.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "xml" => Some(Self::Xml),
            "atom" => Some(Self::Atom),
            _ => None,
        }
    }

    /// Map a `Content-Type` header. Anything not xml or atom is json.
    pub fn from_content_type(content_type: &str) -> Self {
        match media_type(content_type).as_str() {
            "application/atom+xml" => Self::Atom,
            "application/xml" => Self::Xml,
            _ => Self::Json,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Atom => "atom",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml => "application/xml",
            Self::Atom => "application/atom+xml",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownFormat(s.trim().to_ascii_lowercase()))
    }
}

/// A format was named explicitly but is not one we support.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown format param: {0}")]
pub struct UnknownFormat(pub String);

/// Reads format hints from one request without modifying it.
#[derive(Debug, Clone, Copy)]
pub struct FormatNegotiator<'a> {
    ctx: &'a RequestContext,
}

impl<'a> FormatNegotiator<'a> {
    pub fn new(ctx: &'a RequestContext) -> Self {
        Self { ctx }
    }

    /// Explicit `format` value, form body first, then query.
    ///
    /// Returned trimmed and lower-cased; blank values count as absent.
    pub fn requested_format(&self) -> Option<String> {
        let explicit = |v: &&str| !v.trim().is_empty();
        self.ctx
            .form_param(FORMAT_PARAM)
            .filter(explicit)
            .or_else(|| self.ctx.query_param(FORMAT_PARAM).filter(explicit))
            .map(|v| v.trim().to_ascii_lowercase())
    }

    /// Format used to render the response. Never fails.
    pub fn resolve_output_format(&self) -> Format {
        let Some(requested) = self.requested_format() else {
            return Format::Json;
        };

        Format::parse(&requested).unwrap_or_else(|| {
            self.ctx
                .content_type()
                .map(Format::from_content_type)
                .unwrap_or_default()
        })
    }

    /// Format used to parse the request body.
    pub fn resolve_input_format(&self) -> Result<Format, UnknownFormat> {
        if let Some(content_type) = self.ctx.content_type() {
            return Ok(Format::from_content_type(content_type));
        }

        match self.requested_format() {
            Some(requested) => requested.parse(),
            None => Ok(Format::Json),
        }
    }
}
