//! Handler results.

use std::fmt;

use axum::http::StatusCode;
use serde_json::Value;

/// Closed set of failures a handler can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    NotImplemented,
    InternalError,
}

impl ErrorKind {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wire code used by the social data services.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest => "badRequest",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "notFound",
            Self::NotImplemented => "notImplemented",
            Self::InternalError => "internalError",
        }
    }

    /// Parse a wire code or numeric status. Unrecognized codes are internal errors.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "badRequest" | "400" => Self::BadRequest,
            "unauthorized" | "401" => Self::Unauthorized,
            "forbidden" | "403" => Self::Forbidden,
            "notFound" | "404" => Self::NotFound,
            "notImplemented" | "501" => Self::NotImplemented,
            _ => Self::InternalError,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// What a handler produced for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseOutcome {
    Success(Value),
    Failure { kind: ErrorKind, message: String },
}

impl ResponseOutcome {
    pub fn success(payload: impl Into<Value>) -> Self {
        Self::Success(payload.into())
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}
