//! Query completion status and query errors.

use alloc::string::String;
use core::fmt;

/// Message reported for an errored query that carries neither a name nor a
/// message.
pub const DEFAULT_ERROR_MESSAGE: &str = "An unknown error occurred";

/// Whether a view's result is known to be complete.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum QueryStatus {
    /// The server confirmed the result.
    Complete,
    /// The result may still change as data arrives.
    #[default]
    Unknown,
    /// The query failed.
    Error,
}

impl QueryStatus {
    /// Returns the lowercase status name.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStatus::Complete => "complete",
            QueryStatus::Unknown => "unknown",
            QueryStatus::Error => "error",
        }
    }
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a query error originated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The application's query handler failed.
    App,
    /// The query could not be parsed.
    Parse,
}

impl ErrorKind {
    /// Returns the lowercase kind name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::App => "app",
            ErrorKind::Parse => "parse",
        }
    }
}

/// The failure descriptor a completion indicator rejects with.
#[derive(Clone, Debug, PartialEq)]
pub struct ErroredQuery {
    pub kind: ErrorKind,
    pub id: String,
    pub name: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
}

impl ErroredQuery {
    /// Creates a descriptor with no name, message or details.
    pub fn new(kind: ErrorKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            name: None,
            message: None,
            details: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// The error a view exposes while its status is `Error`.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryError {
    pub kind: ErrorKind,
    pub message: String,
    pub details: Option<String>,
}

impl From<&ErroredQuery> for QueryError {
    fn from(err: &ErroredQuery) -> Self {
        let message = err
            .name
            .as_deref()
            .or(err.message.as_deref())
            .unwrap_or(DEFAULT_ERROR_MESSAGE);
        Self {
            kind: err.kind,
            message: String::from(message),
            details: err.details.clone(),
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind.as_str(), self.message)
    }
}
