use crate::db::query::validate::{CapabilityRejection, PlanError};
use serde::Serialize;
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
///
/// Structured runtime error with a stable classification.
/// Every repository entry point returns this type; hosts render it through
/// [`Error::to_error_object`].
///

#[derive(Clone, Debug, ThisError)]
#[error("{message}")]
pub struct Error {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    /// The variant (if present) must correspond to `origin`.
    pub detail: Option<ErrorDetail>,
}

impl Error {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct a capability rejection for a plan the backend cannot run.
    #[must_use]
    pub fn capability(rejection: CapabilityRejection) -> Self {
        Self::from(PlanError::Capability(rejection))
    }

    /// Construct a repository-origin invalid-input error for a write request.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvalidInput,
            ErrorOrigin::Repository,
            message.into(),
        )
    }

    /// Construct a standardized not-found error for one document.
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        Self::new(
            ErrorClass::NotFound,
            ErrorOrigin::Repository,
            format!("resource of type '{resource}' with id '{id}' does not exist"),
        )
    }

    /// Construct an unsupported-operation error; relationship writes land here.
    pub fn unsupported(operation: &str, resource: &str) -> Self {
        Self::new(
            ErrorClass::UnsupportedOperation,
            ErrorOrigin::Repository,
            format!("operation '{operation}' is not supported for resource type '{resource}'"),
        )
    }

    /// Construct a cancellation error for an interrupted operation.
    #[must_use]
    pub fn canceled(operation: &'static str) -> Self {
        Self::new(
            ErrorClass::Canceled,
            ErrorOrigin::Interface,
            format!("{operation} canceled by caller"),
        )
    }

    /// Capability rejection carried by this error, if any.
    #[must_use]
    pub const fn rejection(&self) -> Option<&CapabilityRejection> {
        match &self.detail {
            Some(ErrorDetail::Plan(PlanError::Capability(rejection))) => Some(rejection),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    /// Machine-stable code: the rejection reason for capability errors,
    /// otherwise the class label.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.rejection()
            .map_or_else(|| self.class.code(), CapabilityRejection::reason_code)
    }

    /// Human-readable title: the per-rule title for capability errors,
    /// otherwise the class title.
    #[must_use]
    pub fn title(&self) -> &'static str {
        self.rejection()
            .map_or_else(|| self.class.title(), CapabilityRejection::title)
    }

    /// Render as a framework-neutral JSON:API error object.
    #[must_use]
    pub fn to_error_object(&self) -> ErrorObject {
        ErrorObject {
            status: self.class.status(),
            code: self.code(),
            title: self.title(),
            detail: self.message.clone(),
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

impl From<PlanError> for Error {
    fn from(err: PlanError) -> Self {
        let class = match err {
            PlanError::Capability(_) => ErrorClass::CapabilityRejected,
            PlanError::UnknownResourceType { .. }
            | PlanError::UnknownField { .. }
            | PlanError::ZeroPageSize => ErrorClass::InvalidQuery,
        };

        Self {
            class,
            origin: ErrorOrigin::Query,
            message: err.to_string(),
            detail: Some(ErrorDetail::Plan(err)),
        }
    }
}

impl From<CapabilityRejection> for Error {
    fn from(err: CapabilityRejection) -> Self {
        Self::capability(err)
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        let class = match err {
            StoreError::DuplicateKey { .. } => ErrorClass::Conflict,
            StoreError::Unavailable { .. } => ErrorClass::BackendUnavailable,
        };

        Self {
            class,
            origin: ErrorOrigin::Store,
            message: err.to_string(),
            detail: Some(ErrorDetail::Store(err)),
        }
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error detail carried by [`Error`].
///

#[derive(Clone, Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Plan(PlanError),

    #[error("{0}")]
    Store(StoreError),
}

///
/// StoreError
///
/// Document-store failures surfaced by a collection.
/// Always wrapped in [`ErrorDetail::Store`] once it leaves the store.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum StoreError {
    #[error("document with id '{id}' already exists")]
    DuplicateKey { id: String },

    #[error("document store unavailable: {message}")]
    Unavailable { message: String },
}

///
/// ErrorClass
///
/// Error taxonomy. Each class maps to exactly one HTTP status.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    CapabilityRejected,
    InvalidQuery,
    InvalidInput,
    NotFound,
    Conflict,
    UnsupportedOperation,
    BackendUnavailable,
    Canceled,
}

impl ErrorClass {
    #[must_use]
    pub const fn status(self) -> u16 {
        match self {
            Self::CapabilityRejected | Self::InvalidQuery => 400,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::InvalidInput => 422,
            Self::Canceled => 499,
            Self::UnsupportedOperation => 500,
            Self::BackendUnavailable => 503,
        }
    }

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::CapabilityRejected => "capability_rejected",
            Self::InvalidQuery => "invalid_query",
            Self::InvalidInput => "invalid_input",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::UnsupportedOperation => "unsupported_operation",
            Self::BackendUnavailable => "backend_unavailable",
            Self::Canceled => "canceled",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::CapabilityRejected => "query not supported by backend",
            Self::InvalidQuery => "invalid query",
            Self::InvalidInput => "invalid resource attributes",
            Self::NotFound => "resource not found",
            Self::Conflict => "resource already exists",
            Self::UnsupportedOperation => "operation not supported",
            Self::BackendUnavailable => "storage backend unavailable",
            Self::Canceled => "request canceled",
        }
    }

    /// Whether the failure is caused by the request rather than the server.
    #[must_use]
    pub const fn is_client_error(self) -> bool {
        let status = self.status();

        status >= 400 && status < 500
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Query,
    Repository,
    Store,
    Interface,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Query => "query",
            Self::Repository => "repository",
            Self::Store => "store",
            Self::Interface => "interface",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorObject
///
/// JSON:API error object as rendered by the host framework.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ErrorObject {
    pub status: u16,
    pub code: &'static str,
    pub title: &'static str,
    pub detail: String,
}

///
/// TESTS
///
