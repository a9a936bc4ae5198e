use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt::{self, Display};

use support_desk_gateway::{ErrorKind as GatewayErrorKind, GatewayError};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input was rejected before anything was sent.
    Validation,
    /// The operation is not allowed in the current state.
    Usage,
    /// The gateway failed to serve the request.
    Remote(GatewayErrorKind),
    /// The conversation was cleared before the answer arrived.
    Discarded,
    /// The manager has shut down.
    Closed,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "Invalid input"),
            ErrorKind::Usage => write!(f, "Not allowed now"),
            ErrorKind::Remote(kind) => write!(f, "Remote error ({kind})"),
            ErrorKind::Discarded => write!(f, "Discarded"),
            ErrorKind::Closed => write!(f, "Closed"),
        }
    }
}

/// Describes why a chat or voice operation failed.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    reason: Option<String>,
    source: Option<Box<dyn GatewayError>>,
}

impl Error {
    /// Creates a new error with the `Validation` kind.
    #[inline]
    pub fn validation<S: Into<String>>(reason: S) -> Self {
        Self {
            kind: ErrorKind::Validation,
            reason: Some(reason.into()),
            source: None,
        }
    }

    /// Creates a new error with the `Usage` kind.
    #[inline]
    pub fn usage<S: Into<String>>(reason: S) -> Self {
        Self {
            kind: ErrorKind::Usage,
            reason: Some(reason.into()),
            source: None,
        }
    }

    #[inline]
    pub(crate) fn remote(err: Box<dyn GatewayError>) -> Self {
        Self {
            kind: ErrorKind::Remote(err.kind()),
            reason: Some(err.to_string()),
            source: Some(err),
        }
    }

    #[inline]
    pub(crate) fn discarded() -> Self {
        Self {
            kind: ErrorKind::Discarded,
            reason: None,
            source: None,
        }
    }

    #[inline]
    pub(crate) fn closed() -> Self {
        Self {
            kind: ErrorKind::Closed,
            reason: None,
            source: None,
        }
    }

    /// Returns the kind of this error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the reason for the error.
    #[inline]
    pub fn reason(&self) -> Cow<'_, str> {
        match self.reason.as_deref() {
            Some(reason) => Cow::Borrowed(reason),
            None => Cow::Owned(format!("{}", self.kind)),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "{}: {reason}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        let source: &(dyn StdError + 'static) = self.source.as_deref()?;
        Some(source)
    }
}
