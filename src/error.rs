use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;

/// Internal error type for generation requests
/// Implements Clone so it can be folded into a `Failure`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Request field failed the pre-dispatch guard
    InvalidInput(String)
  , /// No credential supplied with the request
    MissingApiKey
  , /// Network, DNS or connection failure
    HttpError(String)
  , /// Attempt exceeded the request timeout
    Timeout(u64)
  , /// Endpoint answered with a non-success status
    ApiError
    {   status: u16
      , body: String
    }
  , /// Response body did not have the expected shape
    ParseError
    {   message: String
      , trace: String
    }
  , /// Response parsed but carried no choices
    NoChoicesInResponse(String)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Generic error
    Other(String)
}

/// Caller-facing failure categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind
{   InvalidInput
  , TransportError
  , UpstreamError
  , UnexpectedError
}

impl fmt::Display for FailureKind
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   let name = match self
        {   FailureKind::InvalidInput => "InvalidInput"
          , FailureKind::TransportError => "TransportError"
          , FailureKind::UpstreamError => "UpstreamError"
          , FailureKind::UnexpectedError => "UnexpectedError"
        };
        f.write_str(name)
    }
}

impl Error
{   /// Build a parse error, capturing the source chain as a trace
    pub fn parse(
      context: &str
    , err: &(dyn std::error::Error + 'static)
    , body: &str
    ) -> Self
    {   Error::ParseError
        {   message: format!("{}: {}", context, err)
          , trace: diagnostic_trace(err, Some(body))
        }
    }

    /// Category this error is reported under
    pub fn kind(&self) -> FailureKind
    {   match self
        {   Error::InvalidInput(_)
          | Error::MissingApiKey => FailureKind::InvalidInput
          , Error::HttpError(_)
          | Error::Timeout(_) => FailureKind::TransportError
          , Error::ApiError { .. } => FailureKind::UpstreamError
          , Error::ParseError { .. }
          | Error::NoChoicesInResponse(_)
          | Error::InvalidConfiguration(_)
          | Error::Other(_) => FailureKind::UnexpectedError
        }
    }

    /// Whether another attempt could plausibly succeed
    pub fn is_transient(&self) -> bool
    {   match self
        {   Error::HttpError(_) | Error::Timeout(_) => true
          , Error::ApiError { status, .. } => {
              matches!(*status, 408 | 409 | 429) || *status >= 500
            }
          , _ => false
        }
    }

    /// Diagnostic trace for unexpected errors
    pub fn trace(&self) -> Option<String>
    {   match self
        {   Error::ParseError { trace, .. } => Some(trace.clone())
          , Error::NoChoicesInResponse(body) => {
              Some(format!("response body: {}", body))
            }
          , other if other.kind() == FailureKind::UnexpectedError => {
              Some(diagnostic_trace(other, None))
            }
          , _ => None
        }
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::InvalidInput(msg) => {
              write!(f, "Invalid input: {}", msg)
            }
          , Error::MissingApiKey => {
              write!(f, "Missing API key")
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::Timeout(secs) => {
              write!(f, "Request timed out after {}s", secs)
            }
          , Error::ApiError { status, body } => {
              write!(f,
                "Endpoint returned status {}: {}",
                status, body
              )
            }
          , Error::ParseError { message, .. } => {
              write!(f, "Parse error: {}", message)
            }
          , Error::NoChoicesInResponse(_) => {
              write!(f, "API response contained no choices")
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}

/// Render an error, its causes, an optional body and, when
/// RUST_BACKTRACE allows it, a backtrace
fn diagnostic_trace(
  err: &(dyn std::error::Error + 'static)
, body: Option<&str>
) -> String
{   let mut lines = vec![format!("{:?}", err)];
    let mut source = err.source();
    while let Some(cause) = source
    {   lines.push(format!("caused by: {}", cause));
        source = cause.source();
    }
    if let Some(body) = body
    {   lines.push(format!("response body: {}", body));
    }
    let backtrace = Backtrace::capture();
    if backtrace.status() == BacktraceStatus::Captured
    {   lines.push(backtrace.to_string());
    }
    lines.join("\n")
}
