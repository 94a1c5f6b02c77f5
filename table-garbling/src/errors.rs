//! Errors that may be output by this library.

use scuttlebutt::Block;
use std::fmt::{self, Display, Formatter};

/// Errors raised by a protocol session, on either side.
#[derive(Debug)]
pub enum ProtocolError {
    /// An error occurred while sending or receiving a message.
    CommunicationError(String),
    /// The evaluator holds a label that matches none of the values the
    /// generator published. The parties have diverged and the run is over.
    DecodingFailed {
        /// Output index, or the nonce of the step that failed to decode.
        index: usize,
        /// The label the evaluator was holding.
        label: Block,
    },
    /// A point function was requested over more input labels than the
    /// session allows.
    OuterProductTooWide {
        /// Requested number of input labels.
        got: usize,
        /// Configured maximum.
        max: usize,
    },
    /// More bits were packed into a single label than it can hold.
    PackTooWide {
        /// Requested width.
        got: usize,
        /// Maximum width.
        max: usize,
    },
    /// The session configuration is inconsistent.
    InvalidConfig(String),
    /// Invalid argument.
    InvalidArg(String),
}

impl Display for ProtocolError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            ProtocolError::CommunicationError(s) => write!(f, "communication error: {}", s),
            ProtocolError::DecodingFailed { index, label } => {
                write!(f, "decoding failed at {}: unknown label {}", index, label)
            }
            ProtocolError::OuterProductTooWide { got, max } => write!(
                f,
                "point function over {} labels exceeds the maximum of {}",
                got, max
            ),
            ProtocolError::PackTooWide { got, max } => write!(
                f,
                "cannot pack {} bits into one label (maximum {})",
                got, max
            ),
            ProtocolError::InvalidConfig(s) => write!(f, "invalid configuration: {}", s),
            ProtocolError::InvalidArg(s) => write!(f, "invalid argument: {}", s),
        }
    }
}

impl std::error::Error for ProtocolError {}

impl From<std::io::Error> for ProtocolError {
    fn from(e: std::io::Error) -> ProtocolError {
        ProtocolError::CommunicationError(e.to_string())
    }
}
