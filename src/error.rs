// Copyright 2018 Dmitry Tantsur <divius.inside@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error and Result implementations.

use std::fmt;

use reqwest::Error as HttpClientError;
use reqwest::StatusCode;

/// Kind of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A required field is missing or mutually exclusive fields are unset.
    ///
    /// Always raised before any network call.
    Validation,

    /// The underlying HTTP call failed (connection, DNS, TLS).
    Transport,

    /// The response status code is not the one the operation expects.
    ///
    /// The status and the raw body are available on the error.
    UnexpectedStatus,

    /// The response body could not be parsed into the expected shape.
    Decode,

    /// Configuration could not be loaded.
    InvalidConfig,

    /// A query that expects exactly one stack returned none.
    ResourceNotFound,

    /// A query that expects exactly one stack returned several.
    TooManyItems,
}

/// Error from an orchestration call.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    status: Option<StatusCode>,
    field: Option<&'static str>,
    body: Option<String>,
    message: Option<String>,
}

/// Result of an orchestration call.
pub type Result<T> = ::std::result::Result<T, Error>;

impl Error {
    /// Create a new error of the provided kind.
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Error {
        Error {
            kind,
            status: None,
            field: None,
            body: None,
            message: Some(message.into()),
        }
    }

    /// A validation error for the given field.
    pub(crate) fn validation<S: Into<String>>(field: &'static str, reason: S) -> Error {
        Error {
            field: Some(field),
            ..Error::new(ErrorKind::Validation, reason)
        }
    }

    /// An error for a status code that the operation does not accept.
    pub(crate) fn unexpected_status(status: StatusCode, expected: StatusCode, body: String) -> Error {
        Error {
            status: Some(status),
            body: Some(body),
            ..Error::new(
                ErrorKind::UnexpectedStatus,
                format!("expected HTTP {}, got {}", expected.as_u16(), status),
            )
        }
    }

    /// Error kind.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// HTTP status code (if any).
    #[inline]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// The field that failed validation (if any).
    #[inline]
    pub fn field(&self) -> Option<&'static str> {
        self.field
    }

    /// Raw response body (for unexpected status codes).
    #[inline]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Error message (if any).
    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl ErrorKind {
    /// Short description of the error kind.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "Input value(s) are invalid or missing",
            ErrorKind::Transport => "Error when accessing the server",
            ErrorKind::UnexpectedStatus => "Unexpected HTTP status code",
            ErrorKind::Decode => "Received invalid response",
            ErrorKind::InvalidConfig => "Invalid or missing configuration",
            ErrorKind::ResourceNotFound => "Requested resource was not found",
            ErrorKind::TooManyItems => "Request returned too many items",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if let Some(field) = self.field {
            write!(f, " ({})", field)?;
        }

        if let Some(ref msg) = self.message {
            write!(f, ": {}", msg)
        } else {
            Ok(())
        }
    }
}

impl ::std::error::Error for Error {}

impl From<HttpClientError> for Error {
    fn from(value: HttpClientError) -> Error {
        let kind = if value.is_decode() {
            ErrorKind::Decode
        } else {
            ErrorKind::Transport
        };

        Error {
            status: value.status(),
            ..Error::new(kind, value.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Error {
        Error::new(ErrorKind::Decode, value.to_string())
    }
}

impl From<osauth::Error> for Error {
    fn from(value: osauth::Error) -> Error {
        let kind = match value.kind() {
            osauth::ErrorKind::InvalidInput => ErrorKind::Validation,
            osauth::ErrorKind::InvalidConfig => ErrorKind::InvalidConfig,
            osauth::ErrorKind::InvalidResponse => ErrorKind::Decode,
            _ => ErrorKind::Transport,
        };
        Error::new(kind, value.to_string())
    }
}

#[cfg(test)]
mod test {
    use reqwest::StatusCode;

    use super::{Error, ErrorKind};

    #[test]
    fn test_validation_display() {
        let err = Error::validation("Name", "Required field 'Name' not provided");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.field(), Some("Name"));
        assert_eq!(
            err.to_string(),
            "Input value(s) are invalid or missing (Name): Required field 'Name' not provided"
        );
    }

    #[test]
    fn test_unexpected_status() {
        let err = Error::unexpected_status(
            StatusCode::OK,
            StatusCode::NO_CONTENT,
            "{}".to_string(),
        );
        assert_eq!(err.kind(), ErrorKind::UnexpectedStatus);
        assert_eq!(err.status(), Some(StatusCode::OK));
        assert_eq!(err.body(), Some("{}"));
        assert!(err.field().is_none());
    }

    #[test]
    fn test_from_json() {
        let err: Error = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_from_osauth() {
        let err: Error = osauth::Error::new(osauth::ErrorKind::InvalidConfig, "bad").into();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);

        let err: Error = osauth::Error::new(osauth::ErrorKind::EndpointNotFound, "none").into();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
