/// Classification for retry policy.
///
/// Used by the failover executor to decide what to do after a provider
/// attempt fails.
///
/// # Behavior Summary
///
/// | Class | Retry same provider? | Try next provider? |
/// |-------|---------------------|--------------------|
/// | `WithBackoff` | Yes, until the attempt budget is spent | Yes, afterwards |
/// | `NextProvider` | No | Yes |
/// | `Never` | No | Yes when a provider raised it |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Transient failure (timeout, connection reset, rate limiting).
    /// Retry the same provider with exponential backoff.
    WithBackoff,

    /// Provider-local failure that will not go away on retry
    /// (unsupported market, malformed symbol, empty result).
    NextProvider,

    /// Caller-side error (cancellation, invalid input) that retrying
    /// cannot fix. Raised by a provider it is treated like `NextProvider`.
    Never,
}

/// Coarse error kind recorded for every failed provider.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// Retry-worthy network or timeout failure.
    Transient,
    /// Provider-local failure, skipped without retry.
    Permanent,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transient => "TRANSIENT",
            ErrorKind::Permanent => "PERMANENT",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RetryClass> for ErrorKind {
    fn from(class: RetryClass) -> Self {
        match class {
            RetryClass::WithBackoff => ErrorKind::Transient,
            RetryClass::NextProvider | RetryClass::Never => ErrorKind::Permanent,
        }
    }
}
