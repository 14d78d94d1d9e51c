//! # Error classification.
//!
//! The retry loop only needs to know which of three buckets a caught error falls in.
//! Remote SDK error types implement [`Classify`] to provide that mapping; the crate
//! ships implementations for [`CallError`](crate::CallError) and [`std::io::Error`].

use std::io;

/// Retry-relevant class of a remote call failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Remote quota exceeded. Expected under normal load; retried.
    RateLimited,
    /// Connection or protocol-level I/O failure; retried.
    TransientNetwork,
    /// Operation-specific failure (malformed request, permission, ...). Never retried.
    Fatal,
}

impl ErrorClass {
    /// Whether errors of this class are retried by the caller.
    #[inline]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ErrorClass::Fatal)
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ErrorClass::RateLimited => "rate_limited",
            ErrorClass::TransientNetwork => "transient_network",
            ErrorClass::Fatal => "fatal",
        }
    }
}

/// Maps a caught error to its [`ErrorClass`].
///
/// # Example
/// ```
/// use drainvisor::{CallError, Classify, ErrorClass};
///
/// let err = CallError::from_status(429, "Quota exceeded for quota metric 'Read requests'");
/// assert_eq!(err.class(), ErrorClass::RateLimited);
/// ```
pub trait Classify {
    /// Returns the retry class of this error.
    fn class(&self) -> ErrorClass;
}

impl Classify for io::Error {
    fn class(&self) -> ErrorClass {
        match self.kind() {
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::NotConnected
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::TimedOut
            | io::ErrorKind::UnexpectedEof
            | io::ErrorKind::Interrupted => ErrorClass::TransientNetwork,
            _ => ErrorClass::Fatal,
        }
    }
}
