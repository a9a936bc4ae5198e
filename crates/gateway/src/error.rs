use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// The kind of error a gateway call failed with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The gateway could not be reached, or the exchange was cut short.
    Transport,
    /// The gateway refused the request.
    Rejected,
    /// The gateway accepted the request but failed to serve it.
    Server,
    /// The gateway answered with something that could not be understood.
    InvalidResponse,
    /// Any other errors.
    Other,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Transport => write!(f, "gateway unreachable"),
            ErrorKind::Rejected => write!(f, "request rejected"),
            ErrorKind::Server => write!(f, "gateway failure"),
            ErrorKind::InvalidResponse => write!(f, "invalid response"),
            ErrorKind::Other => write!(f, "gateway error"),
        }
    }
}
