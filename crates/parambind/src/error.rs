//! Binding error types.
//!
//! [`BindError`] is returned by [`Parser::parse`](crate::Parser::parse) and
//! carries the source and parameter name of the failure. Coercion failures
//! wrap a [`CoerceError`], which in turn keeps the syntax/range
//! classification of numeric parse failures.

use http::{Method, StatusCode};
use std::any::type_name;
use std::fmt;
use thiserror::Error;

use crate::SourceKind;

/// Boxed error returned by custom [`UnmarshalText`](crate::UnmarshalText) implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Classification of a numeric (or boolean) parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumErrorKind {
    /// The text is not a valid literal for the destination type.
    Syntax,
    /// The text is a valid literal but does not fit the destination width.
    Range,
}

impl fmt::Display for NumErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "invalid syntax"),
            Self::Range => write!(f, "value out of range"),
        }
    }
}

/// A failed conversion of text into a number or boolean.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parsing {text:?}: {kind}")]
pub struct NumError {
    kind: NumErrorKind,
    text: String,
}

impl NumError {
    /// Creates a new numeric parse error.
    #[must_use]
    pub fn new(kind: NumErrorKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Returns the syntax/range classification.
    #[must_use]
    pub fn kind(&self) -> NumErrorKind {
        self.kind
    }

    /// Returns the text that failed to parse.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Error converting request text into a field value.
#[derive(Debug, Error)]
pub enum CoerceError {
    /// Text could not be parsed as the destination number or boolean.
    #[error("parsing into field of type {type_name}: {source}")]
    Number {
        /// Destination type.
        type_name: &'static str,
        /// Underlying parse failure.
        #[source]
        source: NumError,
    },

    /// More than one value was supplied for a single-valued field.
    #[error("too many parameters unmarshaling to {type_name}, expected up to 1 value")]
    TooManyValues {
        /// Destination type.
        type_name: &'static str,
        /// Number of values supplied.
        count: usize,
    },

    /// The destination type has no coercion strategy.
    #[error("unsupported field type {type_name}")]
    Unsupported {
        /// Destination type.
        type_name: &'static str,
    },

    /// One element of a multi-valued field failed.
    #[error("unmarshaling {index}th element: {source}")]
    Element {
        /// Zero-based position of the failing value.
        index: usize,
        /// Failure of that element.
        #[source]
        source: Box<CoerceError>,
    },

    /// A custom text unmarshaler rejected the value.
    #[error("unmarshaling text into {type_name}: {source}")]
    Text {
        /// Destination type.
        type_name: &'static str,
        /// Error returned by the unmarshaler.
        #[source]
        source: BoxError,
    },
}

impl CoerceError {
    pub(crate) fn number<T>(kind: NumErrorKind, text: &str) -> Self {
        Self::Number {
            type_name: type_name::<T>(),
            source: NumError::new(kind, text),
        }
    }

    pub(crate) fn too_many<T>(count: usize) -> Self {
        Self::TooManyValues {
            type_name: type_name::<T>(),
            count,
        }
    }

    pub(crate) fn unsupported<T: ?Sized>() -> Self {
        Self::Unsupported {
            type_name: type_name::<T>(),
        }
    }

    /// Returns the numeric classification, looking through element errors.
    #[must_use]
    pub fn num_error_kind(&self) -> Option<NumErrorKind> {
        match self {
            Self::Number { source, .. } => Some(source.kind()),
            Self::Element { source, .. } => source.num_error_kind(),
            _ => None,
        }
    }

    /// Returns true if the failure is an unsupported destination type.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        match self {
            Self::Unsupported { .. } => true,
            Self::Element { source, .. } => source.is_unsupported(),
            _ => false,
        }
    }
}

/// Broad classification of a [`BindError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindErrorKind {
    /// The parser or request cannot serve a tagged field.
    Configuration,
    /// The request body or query could not be read.
    SourceRead,
    /// Text could not be converted into the field type.
    Coercion,
    /// The field type has no coercion strategy.
    UnsupportedType,
    /// An embedded struct could not be allocated.
    Embedding,
}

/// Error returned when binding request parameters fails.
///
/// # Example
///
/// ```rust
/// use parambind::{BindError, BindErrorKind};
/// use http::StatusCode;
///
/// let err = BindError::PathLookupMissing { name: "user_id".into() };
/// assert_eq!(err.kind(), BindErrorKind::Configuration);
/// assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
/// assert!(err.to_string().contains("user_id"));
/// ```
#[derive(Debug, Error)]
pub enum BindError {
    /// A field is tagged for a path parameter but the parser has no path lookup.
    #[error("field was tagged for parsing the path parameter ({name}) but no path parameter lookup is defined")]
    PathLookupMissing {
        /// Path parameter name.
        name: String,
    },

    /// A field is tagged for a form parameter but the method carries no form.
    #[error("field was tagged for parsing the form parameter ({name}) but request method {method} is not POST, PUT or PATCH")]
    FormMethodNotAllowed {
        /// Form parameter name.
        name: String,
        /// Method of the request.
        method: Method,
    },

    /// The multipart body could not be parsed.
    #[error("parsing multipart form: {0}")]
    Multipart(#[from] multer::Error),

    /// The text values of a multipart form exceed the memory limit.
    #[error("multipart form values exceed the {limit} byte limit")]
    FormTooLarge {
        /// Configured limit in bytes.
        limit: u64,
    },

    /// The URL-encoded body could not be parsed.
    #[error("parsing form: {0}")]
    Form(String),

    /// The query string could not be parsed.
    #[error("parsing query: {0}")]
    Query(String),

    /// A parameter value could not be coerced into its field.
    #[error("unmarshaling {source_kind} parameter {name}: {error}")]
    Coerce {
        /// Where the value came from.
        source_kind: SourceKind,
        /// Parameter name.
        name: String,
        /// Coercion failure.
        #[source]
        error: CoerceError,
    },

    /// An unexported embedded `Option<Box<_>>` is `None` and cannot be allocated.
    #[error("cannot set embedded pointer to unexported struct: {type_name}")]
    UnexportedEmbedded {
        /// Name of the embedded struct.
        type_name: &'static str,
    },

    /// A [`Record`](crate::Record) hands out a different field than its shape declares.
    #[error("record access does not match the declared shape at field {field}")]
    ShapeMismatch {
        /// Declared field name.
        field: &'static str,
    },
}

impl BindError {
    pub(crate) fn coerce(source_kind: SourceKind, name: &str, error: CoerceError) -> Self {
        Self::Coerce {
            source_kind,
            name: name.to_string(),
            error,
        }
    }

    /// Returns the classification of this error.
    #[must_use]
    pub fn kind(&self) -> BindErrorKind {
        match self {
            Self::PathLookupMissing { .. }
            | Self::FormMethodNotAllowed { .. }
            | Self::ShapeMismatch { .. } => BindErrorKind::Configuration,
            Self::Multipart(_) | Self::FormTooLarge { .. } | Self::Form(_) | Self::Query(_) => {
                BindErrorKind::SourceRead
            }
            Self::Coerce { error, .. } if error.is_unsupported() => BindErrorKind::UnsupportedType,
            Self::Coerce { .. } => BindErrorKind::Coercion,
            Self::UnexportedEmbedded { .. } => BindErrorKind::Embedding,
        }
    }

    /// Returns the parameter source the error is attributed to, if any.
    #[must_use]
    pub fn source_kind(&self) -> Option<SourceKind> {
        match self {
            Self::PathLookupMissing { .. } => Some(SourceKind::Path),
            Self::FormMethodNotAllowed { .. }
            | Self::Multipart(_)
            | Self::FormTooLarge { .. }
            | Self::Form(_) => Some(SourceKind::Form),
            Self::Query(_) => Some(SourceKind::Query),
            Self::Coerce { source_kind, .. } => Some(*source_kind),
            Self::UnexportedEmbedded { .. } | Self::ShapeMismatch { .. } => None,
        }
    }

    /// Returns the parameter name if applicable.
    #[must_use]
    pub fn param_name(&self) -> Option<&str> {
        match self {
            Self::PathLookupMissing { name }
            | Self::FormMethodNotAllowed { name, .. }
            | Self::Coerce { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Returns the coercion failure if this is a coercion error.
    #[must_use]
    pub fn coerce_error(&self) -> Option<&CoerceError> {
        match self {
            Self::Coerce { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Returns the numeric syntax/range classification, if the failure has one.
    #[must_use]
    pub fn num_error_kind(&self) -> Option<NumErrorKind> {
        self.coerce_error().and_then(CoerceError::num_error_kind)
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            BindErrorKind::SourceRead | BindErrorKind::Coercion => StatusCode::BAD_REQUEST,
            BindErrorKind::Configuration
            | BindErrorKind::UnsupportedType
            | BindErrorKind::Embedding => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code suitable for error envelopes.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self.kind() {
            BindErrorKind::Configuration => "BINDING_MISCONFIGURED",
            BindErrorKind::SourceRead => "MALFORMED_PARAMETERS",
            BindErrorKind::Coercion => "INVALID_PARAMETER",
            BindErrorKind::UnsupportedType => "UNSUPPORTED_FIELD_TYPE",
            BindErrorKind::Embedding => "EMBEDDING_FAILED",
        }
    }
}
