use std::error;
use std::fmt;

/// Error type for the mail send pipeline.
/// Each variant can store a message for logging purposes.
#[derive(Debug)]
pub enum Error {
    UrlParseError(String),
    RequestTimeout,
    RequestError(String),
    JsonEncodeError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::UrlParseError(_) => f.write_str("UrlParseError"),
            Error::RequestTimeout => f.write_str("RequestTimeout"),
            Error::RequestError(ref msg) => f.write_str(&format!("RequestError: {}", msg)),
            Error::JsonEncodeError(ref msg) => f.write_str(&format!("JsonEncodeError: {}", msg)),
        }
    }
}

impl error::Error for Error {}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::UrlParseError(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::RequestTimeout
        } else {
            Self::RequestError(err.to_string())
        }
    }
}

impl From<serde_json::error::Error> for Error {
    fn from(err: serde_json::error::Error) -> Self {
        Self::JsonEncodeError(err.to_string())
    }
}
